use std::{fmt, str::FromStr};

use bytes::Bytes;
use wire::Request;

use crate::{errors::GradeError, types::Digest};

// Command byte of the request envelope.
pub const AVERAGE_CMD: u8 = 1;
pub const GRADES_CMD: u8 = 2;

/// The class averages a client may ask for by code.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum AverageCode {
    Midterm,
    Lab1,
    Lab2,
    Lab3,
    Lab4,
}

impl AverageCode {
    pub const ALL: [AverageCode; 5] = [
        AverageCode::Midterm,
        AverageCode::Lab1,
        AverageCode::Lab2,
        AverageCode::Lab3,
        AverageCode::Lab4,
    ];

    pub fn token(self) -> &'static str {
        match self {
            AverageCode::Midterm => "GMA",
            AverageCode::Lab1 => "GLA1",
            AverageCode::Lab2 => "GLA2",
            AverageCode::Lab3 => "GLA3",
            AverageCode::Lab4 => "GLA4",
        }
    }

    /// Roster column holding this average.
    pub fn assignment(self) -> &'static str {
        match self {
            AverageCode::Midterm => "Midterm",
            AverageCode::Lab1 => "Lab 1",
            AverageCode::Lab2 => "Lab 2",
            AverageCode::Lab3 => "Lab 3",
            AverageCode::Lab4 => "Lab 4",
        }
    }
}

impl FromStr for AverageCode {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|code| code.token().eq_ignore_ascii_case(s))
            .ok_or(GradeError::InvalidCommand)
    }
}

impl fmt::Display for AverageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GradeRequest {
    Average(AverageCode),
    Grades(Digest),
}

impl TryFrom<Request> for GradeRequest {
    type Error = GradeError;

    fn try_from(request: Request) -> Result<Self, Self::Error> {
        match request.command {
            AVERAGE_CMD => {
                let token =
                    std::str::from_utf8(&request.payload).map_err(|_| GradeError::InvalidCommand)?;
                Ok(GradeRequest::Average(token.parse()?))
            }
            GRADES_CMD => {
                let digest: Digest = request.payload[..]
                    .try_into()
                    .map_err(|_| GradeError::MalformedDigest(request.payload.len()))?;
                Ok(GradeRequest::Grades(digest))
            }
            _ => Err(GradeError::InvalidCommand),
        }
    }
}

impl From<GradeRequest> for Request {
    fn from(request: GradeRequest) -> Self {
        match request {
            GradeRequest::Average(code) => {
                Request::new(AVERAGE_CMD, Bytes::from_static(code.token().as_bytes()))
            }
            GradeRequest::Grades(digest) => Request::new(GRADES_CMD, digest.to_vec()),
        }
    }
}
