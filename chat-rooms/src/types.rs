use std::{
    fmt,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
};

use crate::{errors::DirectoryError, parser::parse_room_args};

/// Longest room name the directory accepts, in bytes.
pub const MAX_ROOM_NAME_LEN: usize = 64;

/// A chat room as the directory server knows it: a name and the multicast
/// group its members talk on.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ChatRoom {
    pub name: String,
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl ChatRoom {
    pub fn new(name: impl Into<String>, ip: Ipv4Addr, port: u16) -> Result<Self, DirectoryError> {
        let name = name.into();
        validate_room_name(&name)?;
        if !ip.is_multicast() {
            return Err(DirectoryError::NotMulticast(ip));
        }
        if port == 0 {
            return Err(DirectoryError::InvalidArguments(format!("{name} {ip} {port}")));
        }

        Ok(Self { name, ip, port })
    }

    /// Reads the `name ip port` form used by MAKEROOM and the shell.
    pub fn from_args(args: &str) -> Result<Self, DirectoryError> {
        let (_, (name, ip, port)) = parse_room_args(args)
            .map_err(|_| DirectoryError::InvalidArguments(args.trim().to_string()))?;
        Self::new(name, ip, port)
    }

    pub fn to_args(&self) -> String {
        format!("{} {} {}", self.name, self.ip, self.port)
    }

    pub fn group_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}

/// Listing form, `name: (ip, port)`.
impl fmt::Display for ChatRoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ({}, {})", self.name, self.ip, self.port)
    }
}

/// Room names travel space separated and are listed as `name: ...`, so
/// neither whitespace nor ':' may appear in one.
pub fn validate_room_name(name: &str) -> Result<(), DirectoryError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_ROOM_NAME_LEN
        && !name.chars().any(|c| c.is_whitespace() || c == ':' || c.is_control());

    if valid {
        Ok(())
    } else {
        Err(DirectoryError::InvalidRoomName(name.to_string()))
    }
}
