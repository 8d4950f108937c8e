use std::fmt;

use bytes::Bytes;

use crate::errors::WireError;

/// One byte tag plus an eight byte big-endian length.
pub const HEADER_LEN: usize = 1 + LENGTH_FIELD_LEN;
pub const LENGTH_FIELD_LEN: usize = 8;

/// Anything that travels inside the `[tag][length][payload]` envelope.
pub trait Envelope: Sized {
    fn tag(&self) -> u8;

    fn payload(&self) -> &[u8];

    fn from_parts(tag: u8, payload: Bytes) -> Result<Self, WireError>;
}

/// A client to server frame. The command code meaning is up to each lab.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Request {
    pub command: u8,
    pub payload: Bytes,
}

impl Request {
    pub fn new(command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }

    /// A request that is nothing but its command byte.
    pub fn bare(command: u8) -> Self {
        Self::new(command, Bytes::new())
    }
}

impl Envelope for Request {
    fn tag(&self) -> u8 {
        self.command
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn from_parts(tag: u8, payload: Bytes) -> Result<Self, WireError> {
        Ok(Self::new(tag, payload))
    }
}

/// Outcome of a request. Everything but `Ok` carries a human readable message.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Status {
    Ok = 0,
    ProtocolError = 1,
    NotFound = 2,
    AuthFailed = 3,
    IOError = 4,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl TryFrom<u8> for Status {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Ok),
            1 => Ok(Status::ProtocolError),
            2 => Ok(Status::NotFound),
            3 => Ok(Status::AuthFailed),
            4 => Ok(Status::IOError),
            other => Err(WireError::UnknownStatus(other)),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Ok => "ok",
            Status::ProtocolError => "protocol error",
            Status::NotFound => "not found",
            Status::AuthFailed => "authentication failed",
            Status::IOError => "i/o error",
        };
        f.write_str(name)
    }
}

/// A server to client frame.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Reply {
    pub status: Status,
    pub payload: Bytes,
}

impl Reply {
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self {
            status: Status::Ok,
            payload: payload.into(),
        }
    }

    pub fn empty() -> Self {
        Self::ok(Bytes::new())
    }

    pub fn error(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            payload: Bytes::from(message.into()),
        }
    }

    /// Payload rendered as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

impl Envelope for Reply {
    fn tag(&self) -> u8 {
        self.status as u8
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn from_parts(tag: u8, payload: Bytes) -> Result<Self, WireError> {
        Ok(Self {
            status: Status::try_from(tag)?,
            payload,
        })
    }
}
