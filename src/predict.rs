use crate::error::GradeError;
use crate::models::{
    Component, PredictMark, PredictSubject, PredictionResult, PredictionStatus, RequiredMark,
};
use crate::validate;

/// Order in which a subject's components are walked.
const COMPONENT_ORDER: [Component; 4] = [
    Component::Attendance,
    Component::Midterm,
    Component::Endterm,
    Component::Ca,
];

#[derive(Debug, Clone)]
struct PendingComponent {
    subject_name: String,
    component_name: String,
    total_marks: f64,
}

#[derive(Debug, Default)]
struct Tally {
    total_credits: f64,
    achieved: f64,
    remaining_weight: f64,
    pending: Vec<PendingComponent>,
}

/// Uniform score needed on every pending component to reach `target_sgpa`.
pub fn predict_required_marks(
    subjects: &[PredictSubject],
    target_sgpa: f64,
) -> Result<PredictionResult, GradeError> {
    let target = validate::check_target(target_sgpa)?;

    let mut tally = Tally::default();
    for (index, subject) in subjects.iter().enumerate() {
        tally_subject(&mut tally, subject, index + 1)?;
    }

    if tally.total_credits == 0.0 {
        return Err(GradeError::NoCredits);
    }

    let sum_needed = target * tally.total_credits;
    let remaining_needed = sum_needed - tally.achieved;
    tracing::debug!(
        achieved = tally.achieved,
        remaining_weight = tally.remaining_weight,
        remaining_needed,
        pending = tally.pending.len(),
        "prediction tally"
    );

    if remaining_needed <= 0.0 {
        return Ok(PredictionResult {
            status: PredictionStatus::Achieved,
            message: format!(
                "Congratulations! You have already achieved your desired SGPA of {target:.2}."
            ),
            required_percentage: None,
            required_marks: Vec::new(),
        });
    }

    if tally.pending.is_empty() {
        return Ok(PredictionResult {
            status: PredictionStatus::Impossible,
            message: "Desired SGPA is not met and there are no pending components to score in."
                .to_string(),
            required_percentage: None,
            required_marks: Vec::new(),
        });
    }

    let required_fraction = remaining_needed / tally.remaining_weight;
    let required_percentage = required_fraction * 100.0;

    if required_fraction > 1.0 {
        return Ok(PredictionResult {
            status: PredictionStatus::Impossible,
            message: format!(
                "It's impossible to achieve your desired SGPA. You would need to score {required_percentage:.2}% in all remaining components."
            ),
            required_percentage: None,
            required_marks: Vec::new(),
        });
    }

    let required_marks = tally
        .pending
        .into_iter()
        .map(|pending| RequiredMark {
            subject_name: pending.subject_name,
            component_name: pending.component_name,
            marks_needed: pending.total_marks * required_fraction,
            total_marks: pending.total_marks,
        })
        .collect();

    Ok(PredictionResult {
        status: PredictionStatus::Success,
        message: format!("To achieve an SGPA of {target:.2}, you need to score:"),
        required_percentage: Some(required_percentage),
        required_marks,
    })
}

fn tally_subject(
    tally: &mut Tally,
    subject: &PredictSubject,
    position: usize,
) -> Result<(), GradeError> {
    let name = subject.name.as_str();
    let credit = validate::check_credit(name, subject.credit)?;
    validate::check_weights(name, &subject.weights)?;
    tally.total_credits += credit;

    for component in COMPONENT_ORDER {
        let weight = subject.weights.get(component);
        if weight <= 0.0 {
            continue;
        }

        let marks = subject.marks.of(component);
        if marks.is_empty() {
            continue;
        }
        let unit_weight = weight / marks.len() as f64;
        for (entry, mark) in marks.iter().enumerate() {
            let label = match component {
                Component::Ca => format!("CA {}", entry + 1),
                other => other.label().to_string(),
            };

            match *mark {
                PredictMark::Completed { obtained, total } => {
                    check_completed(name, &label, obtained, total)?;
                    tally.achieved += credit * ((obtained / total) * unit_weight / 10.0);
                }
                PredictMark::Pending { total } => {
                    if !total.is_finite() || total <= 0.0 {
                        return Err(GradeError::InvalidTotal {
                            subject: validate::error_label(name),
                        });
                    }
                    tally.remaining_weight += (unit_weight / 10.0) * credit;
                    tally.pending.push(PendingComponent {
                        subject_name: subject.display_name(position),
                        component_name: label,
                        total_marks: total,
                    });
                }
            }
        }
    }

    Ok(())
}

/// Completed marks are not capped at their total; such entries are only logged.
fn check_completed(name: &str, label: &str, obtained: f64, total: f64) -> Result<(), GradeError> {
    let valid = obtained.is_finite() && total.is_finite() && obtained >= 0.0 && total > 0.0;
    if !valid {
        return Err(GradeError::InvalidCompletedMarks {
            subject: validate::error_label(name),
        });
    }
    if obtained > total {
        tracing::warn!(
            subject = %validate::error_label(name),
            component = label,
            obtained,
            total,
            "completed mark exceeds its total"
        );
    }
    Ok(())
}
