use bytes::{BufMut, Bytes, BytesMut};
use wire::{field, Request};

use crate::{
    errors::FileError,
    parser::{parse_filename_field, parse_put},
};

/// Every file name on the wire occupies exactly this many bytes, NUL-padded.
pub const FILENAME_FIELD_LEN: usize = 127;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum CommandCode {
    Put = 1,
    Get = 2,
    Scan = 3,
    Connect = 4,
    LList = 5,
    RList = 6,
    Bye = 7,
}

impl TryFrom<u8> for CommandCode {
    type Error = FileError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CommandCode::Put),
            2 => Ok(CommandCode::Get),
            3 => Ok(CommandCode::Scan),
            4 => Ok(CommandCode::Connect),
            5 => Ok(CommandCode::LList),
            6 => Ok(CommandCode::RList),
            7 => Ok(CommandCode::Bye),
            other => Err(FileError::UnknownCommand(other)),
        }
    }
}

/// The commands a file sharing server answers. SCAN, CONNECT and LLIST never
/// leave the client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FileRequest {
    Get { filename: String },
    Put { filename: String, contents: Bytes },
    RList,
    Bye,
}

impl FileRequest {
    pub fn command(&self) -> CommandCode {
        match self {
            FileRequest::Get { .. } => CommandCode::Get,
            FileRequest::Put { .. } => CommandCode::Put,
            FileRequest::RList => CommandCode::RList,
            FileRequest::Bye => CommandCode::Bye,
        }
    }

    /// Builds the request envelope, checking the file name on the way.
    pub fn into_request(self) -> Result<Request, FileError> {
        let command = self.command() as u8;
        match self {
            FileRequest::Get { filename } => {
                Ok(Request::new(command, filename_field(&filename)?))
            }
            FileRequest::Put { filename, contents } => {
                let mut payload = BytesMut::with_capacity(FILENAME_FIELD_LEN + contents.len());
                payload.put_slice(&filename_field(&filename)?);
                payload.put_slice(&contents);
                Ok(Request::new(command, payload.freeze()))
            }
            FileRequest::RList | FileRequest::Bye => Ok(Request::bare(command)),
        }
    }
}

impl TryFrom<Request> for FileRequest {
    type Error = FileError;

    fn try_from(request: Request) -> Result<Self, Self::Error> {
        match CommandCode::try_from(request.command)? {
            CommandCode::Get => {
                let (_, field) =
                    parse_filename_field(&request.payload).map_err(|_| FileError::MissingFilename)?;
                Ok(FileRequest::Get {
                    filename: decode_filename(field)?,
                })
            }
            CommandCode::Put => {
                let (_, (field, _)) =
                    parse_put(&request.payload).map_err(|_| FileError::MissingFilename)?;
                Ok(FileRequest::Put {
                    filename: decode_filename(field)?,
                    contents: request.payload.slice(FILENAME_FIELD_LEN..),
                })
            }
            CommandCode::RList => Ok(FileRequest::RList),
            CommandCode::Bye => Ok(FileRequest::Bye),
            local => Err(FileError::LocalCommand(local)),
        }
    }
}

/// Rejects names that could escape the shared directory or collide with
/// in-progress uploads.
pub fn validate_filename(name: &str) -> Result<(), FileError> {
    let invalid = name.is_empty()
        || name.len() > FILENAME_FIELD_LEN
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0']);

    if invalid {
        Err(FileError::InvalidFilename(name.to_string()))
    } else {
        Ok(())
    }
}

fn filename_field(name: &str) -> Result<Vec<u8>, FileError> {
    validate_filename(name)?;
    Ok(field::encode_fixed(name, FILENAME_FIELD_LEN)?)
}

fn decode_filename(field: &[u8]) -> Result<String, FileError> {
    let name = field::decode_fixed(field)
        .map_err(|_| FileError::InvalidFilename(String::from_utf8_lossy(field).into_owned()))?;
    validate_filename(&name)?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_carries_a_fixed_width_name() {
        let request = FileRequest::Get {
            filename: "remotefile.txt".into(),
        }
        .into_request()
        .unwrap();

        assert_eq!(request.command, 2);
        assert_eq!(request.payload.len(), FILENAME_FIELD_LEN);
        assert_eq!(
            FileRequest::try_from(request).unwrap(),
            FileRequest::Get {
                filename: "remotefile.txt".into()
            }
        );
    }

    #[test]
    fn put_length_covers_name_and_contents() {
        let request = FileRequest::Put {
            filename: "notes.txt".into(),
            contents: Bytes::from_static(b"some notes"),
        }
        .into_request()
        .unwrap();

        assert_eq!(request.command, 1);
        assert_eq!(request.payload.len(), FILENAME_FIELD_LEN + 10);

        match FileRequest::try_from(request).unwrap() {
            FileRequest::Put { filename, contents } => {
                assert_eq!(filename, "notes.txt");
                assert_eq!(&contents[..], b"some notes");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn client_side_commands_are_refused() {
        for code in [CommandCode::Scan, CommandCode::Connect, CommandCode::LList] {
            assert!(matches!(
                FileRequest::try_from(Request::bare(code as u8)),
                Err(FileError::LocalCommand(c)) if c == code
            ));
        }
        assert!(matches!(
            FileRequest::try_from(Request::bare(0)),
            Err(FileError::UnknownCommand(0))
        ));
    }

    #[test]
    fn truncated_get_is_refused() {
        assert!(matches!(
            FileRequest::try_from(Request::new(2, &b"abc"[..])),
            Err(FileError::MissingFilename)
        ));
    }

    #[test]
    fn path_tricks_are_invalid() {
        for name in ["", ".", "..", "../etc/passwd", "a/b", "a\\b", ".hidden"] {
            assert!(validate_filename(name).is_err(), "{name:?} accepted");
        }
        assert!(validate_filename(&"x".repeat(128)).is_err());
        assert!(validate_filename("remotefile.txt").is_ok());
    }
}
