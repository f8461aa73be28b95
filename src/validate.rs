use crate::error::GradeError;
use crate::models::{Mark, Weights};

/// Allowed distance of a weight sum from 100.
pub const WEIGHT_TOLERANCE: f64 = 0.01;

pub const MAX_GRADE_POINT: f64 = 10.0;

/// Label used for a subject inside error messages.
pub fn error_label(name: &str) -> String {
    if name.trim().is_empty() {
        "Unnamed".to_string()
    } else {
        name.to_string()
    }
}

pub fn check_credit(name: &str, credit: f64) -> Result<f64, GradeError> {
    if !credit.is_finite() || credit <= 0.0 {
        return Err(GradeError::InvalidCredit {
            subject: error_label(name),
        });
    }
    Ok(credit)
}

pub fn check_weights(name: &str, weights: &Weights) -> Result<(), GradeError> {
    if !weights_balanced(weights) {
        return Err(GradeError::WeightMismatch {
            subject: error_label(name),
        });
    }
    Ok(())
}

pub fn weights_balanced(weights: &Weights) -> bool {
    (weights.sum() - 100.0).abs() <= WEIGHT_TOLERANCE
}

/// A known mark must be finite, non-negative and not exceed its total.
pub fn check_mark(name: &str, mark: &Mark) -> Result<(), GradeError> {
    let valid = mark.obtained.is_finite()
        && mark.total.is_finite()
        && mark.obtained >= 0.0
        && mark.total >= 0.0
        && mark.obtained <= mark.total;
    if !valid {
        return Err(GradeError::InvalidMarks {
            subject: error_label(name),
        });
    }
    Ok(())
}

pub fn check_target(target: f64) -> Result<f64, GradeError> {
    if !target.is_finite() || !(0.0..=MAX_GRADE_POINT).contains(&target) {
        return Err(GradeError::InvalidTarget { target });
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_sum_tolerance() {
        assert!(weights_balanced(&Weights::new(10.0, 30.0, 20.0, 39.995)));
        assert!(weights_balanced(&Weights::new(10.0, 30.0, 20.0, 40.005)));
        assert!(!weights_balanced(&Weights::new(10.0, 30.0, 20.0, 38.0)));
        assert!(!weights_balanced(&Weights::new(10.0, 30.0, 20.0, 42.0)));
        let unbounded = Weights::new(f64::INFINITY, 0.0, 0.0, 0.0);
        assert!(!weights_balanced(&unbounded));
    }

    #[test]
    fn credit_must_be_positive_and_finite() {
        assert_eq!(check_credit("Maths", 3.0), Ok(3.0));
        assert_eq!(
            check_credit("", 0.0),
            Err(GradeError::InvalidCredit {
                subject: "Unnamed".to_string()
            })
        );
        assert!(check_credit("Maths", f64::NAN).is_err());
        assert!(check_credit("Maths", -1.0).is_err());
    }

    #[test]
    fn marks_are_bounded_by_total() {
        assert!(check_mark("Maths", &Mark::new(10.0, 10.0)).is_ok());
        assert!(check_mark("Maths", &Mark::new(0.0, 0.0)).is_ok());
        assert!(check_mark("Maths", &Mark::new(11.0, 10.0)).is_err());
        assert!(check_mark("Maths", &Mark::new(-1.0, 10.0)).is_err());
        assert!(check_mark("Maths", &Mark::new(f64::NAN, 10.0)).is_err());
    }

    #[test]
    fn target_range_is_inclusive() {
        assert!(check_target(0.0).is_ok());
        assert!(check_target(10.0).is_ok());
        assert!(check_target(10.01).is_err());
        assert!(check_target(-0.5).is_err());
        assert!(check_target(f64::INFINITY).is_err());
    }
}
