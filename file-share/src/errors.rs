use thiserror::Error;
use wire::{Reply, Status, WireError};

use crate::message::CommandCode;

/// FileError enumerates all possible errors returned by this library.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Unknown command {0}")]
    UnknownCommand(u8),

    #[error("{0:?} is a client side command")]
    LocalCommand(CommandCode),

    #[error("Request is missing its file name field")]
    MissingFilename,

    #[error("Invalid file name {0:?}")]
    InvalidFilename(String),

    #[error("Requested file {0} is not available")]
    NotFound(String),

    #[error("File {filename} is {size} bytes, over the {max} byte frame limit")]
    TooLarge { filename: String, size: u64, max: u64 },

    #[error("Not connected to a file sharing server")]
    NotConnected,

    #[error("Server replied {status}: {message}")]
    Remote { status: Status, message: String },

    #[error("Connection closed by the server")]
    ConnectionClosed,

    #[error(transparent)]
    Wire(#[from] WireError),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl FileError {
    /// Where this error sits in the reply taxonomy.
    pub fn status(&self) -> Status {
        match self {
            FileError::UnknownCommand(_)
            | FileError::LocalCommand(_)
            | FileError::MissingFilename
            | FileError::InvalidFilename(_)
            | FileError::TooLarge { .. } => Status::ProtocolError,
            FileError::NotFound(_) => Status::NotFound,
            FileError::Remote { status, .. } => *status,
            FileError::Wire(WireError::IOError(_)) | FileError::IOError(_) => Status::IOError,
            FileError::Wire(_) => Status::ProtocolError,
            FileError::NotConnected | FileError::ConnectionClosed => Status::IOError,
        }
    }

    /// True when the connection that produced this error can no longer be used.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FileError::ConnectionClosed | FileError::Wire(_) | FileError::IOError(_)
        )
    }
}

impl From<FileError> for Reply {
    fn from(error: FileError) -> Self {
        match error.status() {
            Status::IOError => {
                Reply::error(Status::IOError, "Server error while handling command.")
            }
            status => Reply::error(status, error.to_string()),
        }
    }
}
