use ark_std::{error, fmt, string::String};
use honk_algebra::prelude::AlgebraError;

pub(crate) type Result<T> = core::result::Result<T, HonkError>;

#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum HonkError {
    /// Algebra error
    Algebra(AlgebraError),
    /// Mismatched polynomial lengths, entity counts or other broken preconditions.
    InvariantViolation(String),
    /// The verification key and the proof disagree on the circuit size.
    CircuitSizeMismatch { expected: u64, actual: u64 },
    /// The proof ran out of bytes or an element failed to decode.
    TranscriptError,
    /// Error occurred when prove.
    ProofError,
    /// Error occurred when setup.
    SetupError,
    /// Division by zero.
    DivisionByZero,
    /// The degree of the polynomial is higher than the maximum degree supported.
    DegreeError,
    /// The Gemini evaluation challenge lies in the small subgroup.
    ChallengeInSubgroup,
}

impl fmt::Display for HonkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use HonkError::*;
        match self {
            Algebra(e) => write!(f, "Algebra: {}", e),
            InvariantViolation(e) => write!(f, "Invariant violation: {}", e),
            CircuitSizeMismatch { expected, actual } => write!(
                f,
                "Circuit size mismatch: the key expects {} but the proof declares {}.",
                expected, actual
            ),
            TranscriptError => f.write_str("Transcript error."),
            ProofError => f.write_str("Proof error."),
            SetupError => f.write_str("Setup error."),
            DivisionByZero => f.write_str("Division by zero."),
            DegreeError => f.write_str(
                "The degree of the polynomial is higher than the maximum degree supported.",
            ),
            ChallengeInSubgroup => {
                f.write_str("The Gemini evaluation challenge is in the small subgroup.")
            }
        }
    }
}

impl error::Error for HonkError {}

impl From<AlgebraError> for HonkError {
    fn from(e: AlgebraError) -> HonkError {
        HonkError::Algebra(e)
    }
}
