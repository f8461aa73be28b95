use thiserror::Error;

/// Validation failures raised by the aggregator and the predictor.
///
/// Subject names are already substituted with a generic label when blank.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    #[error("Invalid credit for subject \"{subject}\".")]
    InvalidCredit { subject: String },

    #[error("Total weightage for \"{subject}\" must be 100.")]
    WeightMismatch { subject: String },

    #[error("Invalid marks for \"{subject}\". Obtained cannot be greater than total.")]
    InvalidMarks { subject: String },

    #[error("Invalid completed marks for \"{subject}\".")]
    InvalidCompletedMarks { subject: String },

    #[error("Total marks for pending components of \"{subject}\" must be positive.")]
    InvalidTotal { subject: String },

    #[error("Total credits cannot be zero.")]
    NoCredits,

    #[error("Please enter a valid desired SGPA between 0 and 10 (got {target}).")]
    InvalidTarget { target: f64 },
}
