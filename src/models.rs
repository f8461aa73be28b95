use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the four graded parts of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Attendance,
    Ca,
    Midterm,
    Endterm,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::Attendance,
        Component::Ca,
        Component::Midterm,
        Component::Endterm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Component::Attendance => "Attendance",
            Component::Ca => "CA",
            Component::Midterm => "Midterm",
            Component::Endterm => "Endterm",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "attendance" => Some(Component::Attendance),
            "ca" => Some(Component::Ca),
            "midterm" => Some(Component::Midterm),
            "endterm" => Some(Component::Endterm),
            _ => None,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Component weights as percentages of a subject's grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub attendance: f64,
    pub ca: f64,
    pub midterm: f64,
    pub endterm: f64,
}

impl Weights {
    pub fn new(attendance: f64, ca: f64, midterm: f64, endterm: f64) -> Self {
        Self {
            attendance,
            ca,
            midterm,
            endterm,
        }
    }

    /// Weight of a component; an unparseable (NaN) weight reads as 0.
    pub fn get(&self, component: Component) -> f64 {
        let raw = match component {
            Component::Attendance => self.attendance,
            Component::Ca => self.ca,
            Component::Midterm => self.midterm,
            Component::Endterm => self.endterm,
        };
        if raw.is_nan() {
            0.0
        } else {
            raw
        }
    }

    pub fn set(&mut self, component: Component, weight: f64) {
        match component {
            Component::Attendance => self.attendance = weight,
            Component::Ca => self.ca = weight,
            Component::Midterm => self.midterm = weight,
            Component::Endterm => self.endterm = weight,
        }
    }

    pub fn sum(&self) -> f64 {
        Component::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// A fully known mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub obtained: f64,
    pub total: f64,
}

impl Mark {
    pub fn new(obtained: f64, total: f64) -> Self {
        Self { obtained, total }
    }
}

/// A mark that may still be outstanding. Pending marks only know their total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PredictMark {
    Completed { obtained: f64, total: f64 },
    Pending { total: f64 },
}

impl PredictMark {
    pub fn completed(obtained: f64, total: f64) -> Self {
        PredictMark::Completed { obtained, total }
    }

    pub fn pending(total: f64) -> Self {
        PredictMark::Pending { total }
    }
}

impl Default for PredictMark {
    fn default() -> Self {
        PredictMark::Pending { total: 0.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marks<M> {
    pub attendance: M,
    /// Continuous assessment entries; the list length is the entry count.
    pub ca: Vec<M>,
    pub midterm: M,
    pub endterm: M,
}

impl<M> Marks<M> {
    /// Marks recorded for a component, CA yielding every entry.
    pub fn of(&self, component: Component) -> &[M] {
        match component {
            Component::Attendance => std::slice::from_ref(&self.attendance),
            Component::Ca => &self.ca,
            Component::Midterm => std::slice::from_ref(&self.midterm),
            Component::Endterm => std::slice::from_ref(&self.endterm),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord<M> {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    pub credit: f64,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default = "Marks::default", bound(deserialize = "M: Deserialize<'de> + Default"))]
    pub marks: Marks<M>,
}

/// Subject with every mark known, as consumed by the aggregator.
pub type Subject = SubjectRecord<Mark>;

/// Subject whose marks may be pending, as consumed by the predictor.
pub type PredictSubject = SubjectRecord<PredictMark>;

impl<M: Default> SubjectRecord<M> {
    pub fn builder(name: impl Into<String>, credit: f64) -> SubjectBuilder<M> {
        SubjectBuilder::new(name, credit)
    }
}

impl<M> SubjectRecord<M> {
    /// Name used in result rows; blank names fall back to their 1-based position.
    pub fn display_name(&self, position: usize) -> String {
        if self.name.trim().is_empty() {
            format!("Subject {position}")
        } else {
            self.name.clone()
        }
    }
}

pub struct SubjectBuilder<M> {
    id: Uuid,
    name: String,
    credit: f64,
    weights: Weights,
    marks: Marks<M>,
}

impl<M: Default> SubjectBuilder<M> {
    pub fn new(name: impl Into<String>, credit: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            credit,
            weights: Weights::default(),
            marks: Marks::default(),
        }
    }
}

impl<M> SubjectBuilder<M> {
    pub fn weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weight(mut self, component: Component, weight: f64) -> Self {
        self.weights.set(component, weight);
        self
    }

    /// Sets the mark of a component. For CA this appends another entry.
    pub fn mark(mut self, component: Component, mark: M) -> Self {
        match component {
            Component::Attendance => self.marks.attendance = mark,
            Component::Ca => self.marks.ca.push(mark),
            Component::Midterm => self.marks.midterm = mark,
            Component::Endterm => self.marks.endterm = mark,
        }
        self
    }

    pub fn build(self) -> SubjectRecord<M> {
        SubjectRecord {
            id: self.id,
            name: self.name,
            credit: self.credit,
            weights: self.weights,
            marks: self.marks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectResult {
    pub name: String,
    pub credit: f64,
    pub final_percentage: f64,
    pub grade_point: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub sgpa: f64,
    pub total_credits: f64,
    pub subject_results: Vec<SubjectResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Success,
    Impossible,
    Achieved,
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PredictionStatus::Success => "success",
            PredictionStatus::Impossible => "impossible",
            PredictionStatus::Achieved => "achieved",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredMark {
    pub subject_name: String,
    pub component_name: String,
    pub marks_needed: f64,
    pub total_marks: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub status: PredictionStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_marks: Vec<RequiredMark>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_weight_reads_as_zero() {
        let weights = Weights::new(f64::NAN, 30.0, 30.0, 40.0);
        assert_eq!(weights.get(Component::Attendance), 0.0);
        assert_eq!(weights.sum(), 100.0);
    }

    #[test]
    fn builder_appends_ca_entries() {
        let subject: Subject = Subject::builder("Physics", 3.0)
            .weight(Component::Ca, 100.0)
            .mark(Component::Ca, Mark::new(8.0, 10.0))
            .mark(Component::Ca, Mark::new(9.0, 10.0))
            .build();

        assert_eq!(subject.marks.ca.len(), 2);
        assert_eq!(subject.marks.of(Component::Ca)[1], Mark::new(9.0, 10.0));
        assert_eq!(subject.marks.of(Component::Midterm), &[Mark::default()]);
    }

    #[test]
    fn blank_names_fall_back_to_position() {
        let subject: Subject = Subject::builder("  ", 2.0).build();
        assert_eq!(subject.display_name(3), "Subject 3");
    }

    #[test]
    fn predict_subject_deserializes_tagged_marks() {
        let json = r#"{
            "name": "Chemistry",
            "credit": 4,
            "weights": { "midterm": 50, "endterm": 50 },
            "marks": {
                "midterm": { "status": "completed", "obtained": 40, "total": 50 },
                "endterm": { "status": "pending", "total": 100 }
            }
        }"#;

        let subject: PredictSubject = serde_json::from_str(json).unwrap();
        assert_eq!(subject.marks.midterm, PredictMark::completed(40.0, 50.0));
        assert_eq!(subject.marks.endterm, PredictMark::pending(100.0));
        assert_eq!(subject.marks.attendance, PredictMark::default());
        assert!(subject.marks.ca.is_empty());
        assert_eq!(subject.weights.attendance, 0.0);
    }

    #[test]
    fn component_parse_is_case_insensitive() {
        assert_eq!(Component::parse(" EndTerm "), Some(Component::Endterm));
        assert_eq!(Component::parse("quiz"), None);
    }
}
