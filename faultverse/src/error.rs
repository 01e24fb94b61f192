use pauliweb::WebError;
use thiserror::Error;

/// Errors raised while building, pushing out, comparing or exporting noise models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FaultError {
    #[error(transparent)]
    Web(#[from] WebError),

    #[error("the noise model and the flip operators are built on different diagrams")]
    DiagramMismatch,

    #[error("diagrams have {left} and {right} boundary edges")]
    BoundaryMismatch { left: usize, right: usize },

    #[error("{0} is not supported")]
    Unsupported(String),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("last operation on qubit {0} is not a measurement")]
    UnmeasuredQubit(usize),

    #[error("measurement record rec[-{lookback}] reaches before the first of {available} measurements")]
    MeasurementRecord { lookback: usize, available: usize },

    #[error("region {0} is neither a logical nor a detector")]
    UnlabelledRegion(usize),
}

pub type Result<T> = std::result::Result<T, FaultError>;

impl FaultError {
    pub fn parse(line: usize, message: impl Into<String>) -> FaultError {
        FaultError::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn unsupported(what: impl Into<String>) -> FaultError {
        FaultError::Unsupported(what.into())
    }
}
