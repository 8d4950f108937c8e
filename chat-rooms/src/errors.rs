use std::net::Ipv4Addr;

use thiserror::Error;
use wire::{Reply, Status, WireError};

/// DirectoryError enumerates all possible errors returned by this library.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Unknown command {0}")]
    UnknownCommand(u8),

    #[error("Invalid arguments {0:?}. Expected: name ip port")]
    InvalidArguments(String),

    #[error("Invalid room name {0:?}")]
    InvalidRoomName(String),

    #[error("{0} is not a multicast address")]
    NotMulticast(Ipv4Addr),

    #[error("No room named {0}")]
    RoomNotFound(String),

    #[error("Unable to parse room listing line {0:?}")]
    MalformedListing(String),

    #[error("Malformed chat datagram")]
    MalformedChat,

    #[error("Not connected to a chat room directory server")]
    NotConnected,

    #[error("Server replied {status}: {message}")]
    Remote { status: Status, message: String },

    #[error("Connection closed by the directory server")]
    ConnectionClosed,

    #[error(transparent)]
    Wire(#[from] WireError),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl DirectoryError {
    /// Where this error sits in the reply taxonomy.
    pub fn status(&self) -> Status {
        match self {
            DirectoryError::UnknownCommand(_)
            | DirectoryError::InvalidArguments(_)
            | DirectoryError::InvalidRoomName(_)
            | DirectoryError::NotMulticast(_)
            | DirectoryError::MalformedListing(_)
            | DirectoryError::MalformedChat => Status::ProtocolError,
            DirectoryError::RoomNotFound(_) => Status::NotFound,
            DirectoryError::Remote { status, .. } => *status,
            DirectoryError::Wire(WireError::IOError(_)) | DirectoryError::IOError(_) => {
                Status::IOError
            }
            DirectoryError::Wire(_) => Status::ProtocolError,
            DirectoryError::NotConnected | DirectoryError::ConnectionClosed => Status::IOError,
        }
    }
}

impl From<DirectoryError> for Reply {
    fn from(error: DirectoryError) -> Self {
        Reply::error(error.status(), error.to_string())
    }
}
