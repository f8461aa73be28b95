use crate::error::GradeError;
use crate::models::{AggregationResult, Component, Mark, Subject, SubjectResult};
use crate::validate;

/// Credit-weighted grade point average over fully marked subjects.
///
/// Stops at the first invalid subject.
pub fn compute_sgpa(subjects: &[Subject]) -> Result<AggregationResult, GradeError> {
    let mut weighted_sum = 0.0;
    let mut total_credits = 0.0;
    let mut subject_results = Vec::with_capacity(subjects.len());

    for (index, subject) in subjects.iter().enumerate() {
        let credit = validate::check_credit(&subject.name, subject.credit)?;
        validate::check_weights(&subject.name, &subject.weights)?;

        let final_percentage = final_percentage(subject)?;
        let grade_point = final_percentage / 10.0;
        tracing::debug!(
            subject = %subject.display_name(index + 1),
            final_percentage,
            grade_point,
            "subject graded"
        );

        weighted_sum += grade_point * credit;
        total_credits += credit;
        subject_results.push(SubjectResult {
            name: subject.display_name(index + 1),
            credit,
            final_percentage,
            grade_point,
        });
    }

    if total_credits == 0.0 {
        return Err(GradeError::NoCredits);
    }

    Ok(AggregationResult {
        sgpa: weighted_sum / total_credits,
        total_credits,
        subject_results,
    })
}

/// Weighted sum of component percentages, on a 0-100 scale.
pub fn final_percentage(subject: &Subject) -> Result<f64, GradeError> {
    let mut percentage = 0.0;

    for component in Component::ALL {
        let weight = subject.weights.get(component);
        if weight <= 0.0 {
            continue;
        }

        let combined = combine_marks(&subject.name, subject.marks.of(component))?;
        if combined.total > 0.0 {
            percentage += (combined.obtained / combined.total) * weight;
        }
    }

    Ok(percentage)
}

/// Sums obtained and total across entries, validating each entry and the pooled mark.
fn combine_marks(name: &str, marks: &[Mark]) -> Result<Mark, GradeError> {
    let mut combined = Mark::default();
    for mark in marks {
        validate::check_mark(name, mark)?;
        combined.obtained += mark.obtained;
        combined.total += mark.total;
    }
    validate::check_mark(name, &combined)?;
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weights;
    use approx::assert_abs_diff_eq;

    fn full_subject(name: &str, credit: f64, ratio: f64) -> Subject {
        Subject::builder(name, credit)
            .weights(Weights::new(10.0, 30.0, 20.0, 40.0))
            .mark(Component::Attendance, Mark::new(10.0 * ratio, 10.0))
            .mark(Component::Ca, Mark::new(30.0 * ratio, 30.0))
            .mark(Component::Midterm, Mark::new(20.0 * ratio, 20.0))
            .mark(Component::Endterm, Mark::new(40.0 * ratio, 40.0))
            .build()
    }

    #[test]
    fn single_subject_matches_hand_computation() {
        let subject = Subject::builder("Data Structures", 4.0)
            .weights(Weights::new(10.0, 30.0, 20.0, 40.0))
            .mark(Component::Attendance, Mark::new(9.0, 10.0))
            .mark(Component::Ca, Mark::new(24.0, 30.0))
            .mark(Component::Midterm, Mark::new(16.0, 20.0))
            .mark(Component::Endterm, Mark::new(35.0, 40.0))
            .build();

        let result = compute_sgpa(&[subject]).unwrap();
        assert_abs_diff_eq!(result.sgpa, 8.4, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_credits, 4.0);
        let row = &result.subject_results[0];
        assert_eq!(row.name, "Data Structures");
        assert_abs_diff_eq!(row.final_percentage, 84.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.grade_point, 8.4, epsilon = 1e-9);
    }

    #[test]
    fn equal_credits_average_grade_points() {
        let subjects = vec![
            full_subject("A", 3.0, 0.9),
            full_subject("B", 3.0, 0.7),
            full_subject("C", 3.0, 0.5),
        ];
        let result = compute_sgpa(&subjects).unwrap();
        assert_abs_diff_eq!(result.sgpa, 7.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_credits, 9.0);
    }

    #[test]
    fn credits_weight_the_average() {
        let subjects = vec![full_subject("A", 4.0, 1.0), full_subject("B", 1.0, 0.5)];
        let result = compute_sgpa(&subjects).unwrap();
        assert_abs_diff_eq!(result.sgpa, (10.0 * 4.0 + 5.0) / 5.0, epsilon = 1e-9);
    }

    #[test]
    fn ca_entries_are_pooled_before_weighting() {
        let subject = Subject::builder("Lab", 2.0)
            .weight(Component::Ca, 100.0)
            .mark(Component::Ca, Mark::new(10.0, 10.0))
            .mark(Component::Ca, Mark::new(0.0, 30.0))
            .build();
        // 10 / 40 of the CA weight
        assert_abs_diff_eq!(final_percentage(&subject).unwrap(), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_weight_ignores_marks() {
        let subject = Subject::builder("Seminar", 1.0)
            .weights(Weights::new(0.0, 0.0, 0.0, 100.0))
            .mark(Component::Attendance, Mark::new(50.0, 10.0))
            .mark(Component::Endterm, Mark::new(30.0, 60.0))
            .build();
        assert_abs_diff_eq!(final_percentage(&subject).unwrap(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_marks_contribute_nothing() {
        let subject = Subject::builder("Elective", 2.0)
            .weights(Weights::new(10.0, 30.0, 20.0, 40.0))
            .mark(Component::Endterm, Mark::new(40.0, 40.0))
            .build();
        let result = compute_sgpa(&[subject]).unwrap();
        let row = &result.subject_results[0];
        assert_abs_diff_eq!(row.final_percentage, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn percentages_stay_in_range() {
        for ratio in [0.0, 0.25, 0.5, 0.99, 1.0] {
            let result = compute_sgpa(&[full_subject("X", 3.0, ratio)]).unwrap();
            let row = &result.subject_results[0];
            assert!((0.0..=100.0 + 1e-9).contains(&row.final_percentage));
            assert_abs_diff_eq!(row.grade_point, row.final_percentage / 10.0);
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let subjects = vec![full_subject("A", 3.0, 0.83), full_subject("B", 2.5, 0.61)];
        assert_eq!(compute_sgpa(&subjects), compute_sgpa(&subjects));
    }

    #[test]
    fn first_invalid_subject_stops_processing() {
        let mut bad_weights = full_subject("Optics", 3.0, 0.8);
        bad_weights.weights.endterm = 42.0;
        let bad_credit = full_subject("", 0.0, 0.8);

        let subjects = [full_subject("A", 3.0, 0.8), bad_weights, bad_credit];
        assert_eq!(
            compute_sgpa(&subjects).unwrap_err(),
            GradeError::WeightMismatch {
                subject: "Optics".to_string()
            }
        );
    }

    #[test]
    fn over_full_marks_are_rejected() {
        let subject = Subject::builder("", 3.0)
            .weight(Component::Ca, 100.0)
            .mark(Component::Ca, Mark::new(5.0, 4.0))
            .mark(Component::Ca, Mark::new(1.0, 4.0))
            .build();
        assert_eq!(
            compute_sgpa(&[subject]).unwrap_err(),
            GradeError::InvalidMarks {
                subject: "Unnamed".to_string()
            }
        );
    }

    #[test]
    fn pooled_marks_must_stay_finite() {
        let subject = Subject::builder("Lab", 3.0)
            .weight(Component::Ca, 100.0)
            .mark(Component::Ca, Mark::new(1e308, 1e308))
            .mark(Component::Ca, Mark::new(1e308, 1e308))
            .build();
        assert_eq!(
            compute_sgpa(&[subject]).unwrap_err(),
            GradeError::InvalidMarks {
                subject: "Lab".to_string()
            }
        );
    }

    #[test]
    fn empty_input_has_no_credits() {
        assert_eq!(compute_sgpa(&[]).unwrap_err(), GradeError::NoCredits);
    }

    #[test]
    fn unnamed_subjects_are_numbered() {
        let subjects = vec![full_subject("Maths", 3.0, 0.9), full_subject("", 3.0, 0.9)];
        let result = compute_sgpa(&subjects).unwrap();
        assert_eq!(result.subject_results[1].name, "Subject 2");
    }
}
