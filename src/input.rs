use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;

use crate::models::{
    Component, Mark, PredictMark, PredictSubject, Subject, SubjectBuilder, SubjectRecord, Weights,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(InputFormat::Json),
            Some("csv") => Ok(InputFormat::Csv),
            _ => bail!(
                "cannot tell the format of {}; use a .json or .csv file",
                path.display()
            ),
        }
    }
}

/// Row layout of CSV input: one row per mark.
#[derive(Debug, serde::Deserialize)]
pub struct CsvRow {
    pub subject: String,
    pub credit: f64,
    pub component: String,
    pub weight: Option<f64>,
    pub obtained: Option<f64>,
    pub total: Option<f64>,
    pub status: Option<String>,
}

/// Mark types that can be read from a CSV row.
///
/// Blank numbers become NaN so the calculators report them as invalid marks.
pub trait CsvMark: Sized + Default {
    fn from_row(row: &CsvRow) -> anyhow::Result<Self>;
}

impl CsvMark for Mark {
    fn from_row(row: &CsvRow) -> anyhow::Result<Self> {
        if row_status(row)? == RowStatus::Pending {
            bail!(
                "subject \"{}\" has a pending {} mark; use the predict command",
                row.subject,
                row.component
            );
        }
        Ok(Mark::new(
            row.obtained.unwrap_or(f64::NAN),
            row.total.unwrap_or(f64::NAN),
        ))
    }
}

impl CsvMark for PredictMark {
    fn from_row(row: &CsvRow) -> anyhow::Result<Self> {
        let total = row.total.unwrap_or(f64::NAN);
        Ok(match row_status(row)? {
            RowStatus::Completed => PredictMark::completed(row.obtained.unwrap_or(f64::NAN), total),
            RowStatus::Pending => PredictMark::pending(total),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowStatus {
    Completed,
    Pending,
}

fn row_status(row: &CsvRow) -> anyhow::Result<RowStatus> {
    match row.status.as_deref().map(str::trim) {
        None | Some("") => Ok(RowStatus::Completed),
        Some(value) if value.eq_ignore_ascii_case("completed") => Ok(RowStatus::Completed),
        Some(value) if value.eq_ignore_ascii_case("pending") => Ok(RowStatus::Pending),
        Some(other) => bail!(
            "unknown status \"{other}\" for subject \"{}\"; expected completed or pending",
            row.subject
        ),
    }
}

pub fn load_subjects<M>(path: &Path) -> anyhow::Result<Vec<SubjectRecord<M>>>
where
    M: CsvMark + DeserializeOwned,
{
    let format = InputFormat::from_path(path)?;
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let subjects = match format {
        InputFormat::Json => read_json(file),
        InputFormat::Csv => read_csv(file),
    }
    .with_context(|| format!("failed to read {}", path.display()))?;

    tracing::info!("Loaded {} subjects from {}", subjects.len(), path.display());
    Ok(subjects)
}

pub fn read_json<M, R>(reader: R) -> anyhow::Result<Vec<SubjectRecord<M>>>
where
    M: DeserializeOwned + Default,
    R: Read,
{
    let subjects = serde_json::from_reader(reader)?;
    Ok(subjects)
}

struct Draft<M> {
    name: String,
    credit: f64,
    weights: HashMap<Component, f64>,
    marks: Vec<(Component, M)>,
}

impl<M: Default> Draft<M> {
    fn build(self) -> SubjectRecord<M> {
        let mut builder = SubjectBuilder::new(self.name, self.credit);
        for (component, weight) in self.weights {
            builder = builder.weight(component, weight);
        }
        for (component, mark) in self.marks {
            builder = builder.mark(component, mark);
        }
        builder.build()
    }
}

/// Groups rows by subject name, keeping first-appearance order.
pub fn read_csv<M, R>(reader: R) -> anyhow::Result<Vec<SubjectRecord<M>>>
where
    M: CsvMark,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut drafts: Vec<Draft<M>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let component = Component::parse(&row.component).with_context(|| {
            format!(
                "row {}: unknown component \"{}\"; expected attendance, ca, midterm or endterm",
                line + 1,
                row.component
            )
        })?;

        let index = *positions.entry(row.subject.clone()).or_insert_with(|| {
            drafts.push(Draft {
                name: row.subject.clone(),
                credit: row.credit,
                weights: HashMap::new(),
                marks: Vec::new(),
            });
            drafts.len() - 1
        });
        let draft = &mut drafts[index];

        if draft.credit.to_bits() != row.credit.to_bits() {
            bail!(
                "row {}: subject \"{}\" has conflicting credits {} and {}",
                line + 1,
                row.subject,
                draft.credit,
                row.credit
            );
        }

        if let Some(weight) = row.weight {
            let existing = *draft.weights.entry(component).or_insert(weight);
            if existing.to_bits() != weight.to_bits() {
                bail!(
                    "row {}: subject \"{}\" has conflicting {} weights {} and {}",
                    line + 1,
                    row.subject,
                    component,
                    existing,
                    weight
                );
            }
        }

        // weight-only rows leave the component's marks untouched
        if row.obtained.is_none() && row.total.is_none() {
            continue;
        }
        if component != Component::Ca && draft.marks.iter().any(|(seen, _)| *seen == component) {
            bail!(
                "row {}: subject \"{}\" has more than one {} mark",
                line + 1,
                row.subject,
                component
            );
        }

        let mark = M::from_row(&row).with_context(|| format!("row {}", line + 1))?;
        draft.marks.push((component, mark));
    }

    Ok(drafts.into_iter().map(Draft::build).collect())
}

/// Sample subjects for the calculator, used as a starting template.
pub fn sample_subjects() -> Vec<Subject> {
    vec![
        Subject::builder("Data Structures", 4.0)
            .weights(Weights::new(10.0, 30.0, 20.0, 40.0))
            .mark(Component::Attendance, Mark::new(9.0, 10.0))
            .mark(Component::Ca, Mark::new(12.0, 15.0))
            .mark(Component::Ca, Mark::new(13.0, 15.0))
            .mark(Component::Midterm, Mark::new(16.0, 20.0))
            .mark(Component::Endterm, Mark::new(68.0, 80.0))
            .build(),
        Subject::builder("Engineering Ethics", 2.0)
            .weights(Weights::new(0.0, 40.0, 0.0, 60.0))
            .mark(Component::Ca, Mark::new(18.0, 20.0))
            .mark(Component::Endterm, Mark::new(41.0, 50.0))
            .build(),
    ]
}

/// Sample subjects for the predictor, with the end-term still pending.
pub fn sample_predict_subjects() -> Vec<PredictSubject> {
    vec![
        PredictSubject::builder("Thermodynamics", 4.0)
            .weights(Weights::new(5.0, 25.0, 30.0, 40.0))
            .mark(Component::Attendance, PredictMark::completed(4.0, 5.0))
            .mark(Component::Ca, PredictMark::completed(8.0, 10.0))
            .mark(Component::Ca, PredictMark::pending(10.0))
            .mark(Component::Midterm, PredictMark::completed(22.0, 30.0))
            .mark(Component::Endterm, PredictMark::pending(100.0))
            .build(),
        PredictSubject::builder("Signals and Systems", 3.0)
            .weights(Weights::new(0.0, 0.0, 50.0, 50.0))
            .mark(Component::Midterm, PredictMark::completed(31.0, 50.0))
            .mark(Component::Endterm, PredictMark::pending(50.0))
            .build(),
    ]
}

pub fn write_template<T: serde::Serialize>(path: &Path, subjects: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(subjects)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
