use thiserror::Error;

/// WireError enumerates all possible errors returned by the envelope codec.
#[derive(Error, Debug)]
pub enum WireError {
    /// Nom parser was unable to parse the in-bound frame header
    #[error("Unable to parse frame")]
    ParseFailure,

    #[error("Unknown reply status {0}")]
    UnknownStatus(u8),

    #[error("Frame of {length} bytes exceeds the {max} byte limit")]
    FrameTooLarge { length: u64, max: u64 },

    #[error("Text of {length} bytes does not fit a {width} byte field")]
    FieldOverflow { length: usize, width: usize },

    #[error("Field contains an embedded NUL byte")]
    EmbeddedNul,

    #[error("Field is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}
