use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::chat::DEFAULT_TTL;

pub const DEFAULT_PORT: u16 = 30001;

pub fn default_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT)
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Used by `connect` when no address is typed.
    pub server_addr: SocketAddr,
    /// Multicast TTL for outgoing chat datagrams.
    pub ttl: u32,
    /// Starting user name; a random `User<n>` when unset.
    pub username: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: default_addr(),
            ttl: DEFAULT_TTL,
            username: None,
        }
    }
}
