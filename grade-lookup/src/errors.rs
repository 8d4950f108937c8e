use thiserror::Error;
use wire::{Reply, Status, WireError};

/// GradeError enumerates all possible errors returned by this library.
#[derive(Error, Debug)]
pub enum GradeError {
    #[error("Invalid command. Please try again.")]
    InvalidCommand,

    #[error("Credential digest must be 32 bytes, got {0}")]
    MalformedDigest(usize),

    #[error("No average recorded for {0}")]
    MissingAverage(String),

    /// Deliberately the same message whether the id or the password was wrong.
    #[error("Invalid student ID or password. Please try again.")]
    AuthFailed,

    #[error("Roster {0} has no usable header row")]
    MissingHeader(String),

    #[error("Server replied {status}: {message}")]
    Remote { status: Status, message: String },

    #[error("Connection closed before a reply arrived")]
    ConnectionClosed,

    #[error("Malformed grades: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Wire(#[from] WireError),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl GradeError {
    /// Where this error sits in the reply taxonomy.
    pub fn status(&self) -> Status {
        match self {
            GradeError::InvalidCommand | GradeError::MalformedDigest(_) => Status::ProtocolError,
            GradeError::MissingAverage(_) => Status::NotFound,
            GradeError::AuthFailed => Status::AuthFailed,
            GradeError::Remote { status, .. } => *status,
            GradeError::Wire(WireError::IOError(_)) | GradeError::IOError(_) => Status::IOError,
            GradeError::Wire(_) => Status::ProtocolError,
            GradeError::MissingHeader(_)
            | GradeError::ConnectionClosed
            | GradeError::Json(_)
            | GradeError::Csv(_) => Status::IOError,
        }
    }
}

impl From<GradeError> for Reply {
    fn from(error: GradeError) -> Self {
        match error.status() {
            Status::IOError => {
                Reply::error(Status::IOError, "Server error while handling command.")
            }
            status => Reply::error(status, error.to_string()),
        }
    }
}
