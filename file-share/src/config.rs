use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use crate::discovery::DEFAULT_DISCOVERY_PORT;

pub const DEFAULT_PORT: u16 = 30001;
pub const DEFAULT_SERVER_DIR: &str = "server_dir";
pub const DEFAULT_CLIENT_DIR: &str = "client_dir";
pub const DEFAULT_SERVICE_NAME: &str = "File Sharing Service";
pub const DEFAULT_SCAN_WAIT: Duration = Duration::from_secs(2);

pub fn default_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT)
}

pub fn default_discovery_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_DISCOVERY_PORT)
}

pub fn default_scan_target() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), DEFAULT_DISCOVERY_PORT)
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub dir: PathBuf,
    pub discovery_addr: SocketAddr,
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            dir: PathBuf::from(DEFAULT_SERVER_DIR),
            discovery_addr: default_discovery_addr(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Used by `connect` when no scan has found anything.
    pub server_addr: SocketAddr,
    pub dir: PathBuf,
    pub scan_target: SocketAddr,
    pub scan_wait: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: default_addr(),
            dir: PathBuf::from(DEFAULT_CLIENT_DIR),
            scan_target: default_scan_target(),
            scan_wait: DEFAULT_SCAN_WAIT,
        }
    }
}
