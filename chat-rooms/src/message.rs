use std::fmt::Write;

use wire::{Request, WireError};

use crate::{
    errors::DirectoryError,
    parser::parse_listing_line,
    types::{validate_room_name, ChatRoom},
};

pub const GETDIR_CMD: u8 = 1;
pub const MAKEROOM_CMD: u8 = 2;
pub const DELETEROOM_CMD: u8 = 3;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DirectoryRequest {
    GetDir,
    MakeRoom(ChatRoom),
    DeleteRoom(String),
}

impl TryFrom<Request> for DirectoryRequest {
    type Error = DirectoryError;

    fn try_from(request: Request) -> Result<Self, Self::Error> {
        let args = std::str::from_utf8(&request.payload).map_err(WireError::from)?;

        match request.command {
            GETDIR_CMD => Ok(DirectoryRequest::GetDir),
            MAKEROOM_CMD => Ok(DirectoryRequest::MakeRoom(ChatRoom::from_args(args)?)),
            DELETEROOM_CMD => {
                let name = args.trim();
                validate_room_name(name)?;
                Ok(DirectoryRequest::DeleteRoom(name.to_string()))
            }
            other => Err(DirectoryError::UnknownCommand(other)),
        }
    }
}

impl From<DirectoryRequest> for Request {
    fn from(request: DirectoryRequest) -> Self {
        match request {
            DirectoryRequest::GetDir => Request::bare(GETDIR_CMD),
            DirectoryRequest::MakeRoom(room) => Request::new(MAKEROOM_CMD, room.to_args()),
            DirectoryRequest::DeleteRoom(name) => Request::new(DELETEROOM_CMD, name),
        }
    }
}

/// GETDIR reply body, one `name: (ip, port)` line per room.
pub fn render_listing<'a>(rooms: impl IntoIterator<Item = &'a ChatRoom>) -> String {
    rooms.into_iter().fold(String::new(), |mut listing, room| {
        let _ = writeln!(listing, "{room}");
        listing
    })
}

pub fn parse_listing(listing: &str) -> Result<Vec<ChatRoom>, DirectoryError> {
    listing
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (_, (name, ip, port)) = parse_listing_line(line)
                .map_err(|_| DirectoryError::MalformedListing(line.to_string()))?;
            ChatRoom::new(name, ip, port)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn room(name: &str, last_octet: u8, port: u16) -> ChatRoom {
        ChatRoom::new(name, Ipv4Addr::new(239, 0, 0, last_octet), port).unwrap()
    }

    #[test]
    fn listing_parses_back() {
        let rooms = vec![room("alpha", 1, 4001), room("beta", 2, 4002)];
        let listing = render_listing(&rooms);

        assert_eq!(
            listing,
            "alpha: (239.0.0.1, 4001)\nbeta: (239.0.0.2, 4002)\n"
        );
        assert_eq!(parse_listing(&listing).unwrap(), rooms);
        assert!(parse_listing("").unwrap().is_empty());
        assert!(matches!(
            parse_listing("garbage\n"),
            Err(DirectoryError::MalformedListing(_))
        ));
    }

    #[test]
    fn decodes_requests() {
        let make = Request::new(MAKEROOM_CMD, "alpha 239.0.0.1 4001");
        assert_eq!(
            DirectoryRequest::try_from(make).unwrap(),
            DirectoryRequest::MakeRoom(room("alpha", 1, 4001))
        );

        let delete = Request::new(DELETEROOM_CMD, "alpha");
        assert_eq!(
            DirectoryRequest::try_from(delete).unwrap(),
            DirectoryRequest::DeleteRoom("alpha".into())
        );

        assert_eq!(
            DirectoryRequest::try_from(Request::bare(GETDIR_CMD)).unwrap(),
            DirectoryRequest::GetDir
        );
    }

    #[test]
    fn rejects_bad_requests() {
        assert!(matches!(
            DirectoryRequest::try_from(Request::bare(9)),
            Err(DirectoryError::UnknownCommand(9))
        ));
        assert!(matches!(
            DirectoryRequest::try_from(Request::new(DELETEROOM_CMD, "")),
            Err(DirectoryError::InvalidRoomName(_))
        ));
        assert!(matches!(
            DirectoryRequest::try_from(Request::new(MAKEROOM_CMD, vec![0xff, 0xfe])),
            Err(DirectoryError::Wire(WireError::InvalidUtf8(_)))
        ));
    }
}
