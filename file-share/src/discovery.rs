//! Service announcement and discovery over UDP.
//!
//! A server answers the datagram `SERVICE DISCOVERY` with `<name>@<tcp port>`.
//! Clients broadcast the query and collect whatever answers arrive within a
//! short window.

use std::{
    collections::BTreeSet,
    io,
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use log::{debug, info, warn};
use tokio::{net::UdpSocket, time::Instant};
use tokio_util::sync::CancellationToken;

pub const SCAN_MSG: &[u8] = b"SERVICE DISCOVERY";
pub const DEFAULT_DISCOVERY_PORT: u16 = 30000;

const RECV_SIZE: usize = 1024;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ServiceRecord {
    pub name: String,
    pub addr: SocketAddr,
}

pub struct Announcer {
    socket: UdpSocket,
    announcement: Vec<u8>,
}

impl Announcer {
    pub async fn bind(addr: SocketAddr, service_name: &str, service_port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!(
            "Announcing {} on {} for port {}",
            service_name,
            socket.local_addr()?,
            service_port
        );

        Ok(Self {
            socket,
            announcement: format!("{service_name}@{service_port}").into_bytes(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Answers scans until `shutdown` fires.
    pub async fn run(self, shutdown: CancellationToken) -> io::Result<()> {
        let mut buf = vec![0; RECV_SIZE];

        loop {
            let (n, peer) = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Service announcer stopping");
                    return Ok(());
                }
                received = self.socket.recv_from(&mut buf) => received?,
            };

            if &buf[..n] != SCAN_MSG {
                debug!("Ignoring {} byte datagram from {}", n, peer);
                continue;
            }

            info!("Service scan received from {}", peer);
            if let Err(e) = self.socket.send_to(&self.announcement, peer).await {
                warn!("Unable to answer scan from {}: {}", peer, e);
            }
        }
    }
}

/// Reads `<name>@<port>`; the service lives on the port at the sender's address.
pub fn parse_announcement(datagram: &[u8], from: SocketAddr) -> Option<ServiceRecord> {
    let text = std::str::from_utf8(datagram).ok()?;
    let (name, port) = text.trim().rsplit_once('@')?;
    let port: u16 = port.parse().ok()?;

    Some(ServiceRecord {
        name: name.to_string(),
        addr: SocketAddr::new(from.ip(), port),
    })
}

/// Sends one scan to `target` (usually the broadcast address) and gathers
/// answers until `wait` has passed.
pub async fn scan_for_service(
    target: SocketAddr,
    wait: Duration,
) -> io::Result<Vec<ServiceRecord>> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    socket.send_to(SCAN_MSG, target).await?;
    debug!("Scan sent to {}", target);

    let deadline = Instant::now() + wait;
    let mut found = BTreeSet::new();
    let mut buf = vec![0; RECV_SIZE];

    while let Ok(received) = tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
        let (n, from) = match received {
            Ok(received) => received,
            Err(e) => {
                debug!("Scan receive failed: {}", e);
                continue;
            }
        };
        match parse_announcement(&buf[..n], from) {
            Some(record) => {
                found.insert(record);
            }
            None => debug!("Ignoring unrecognised reply from {}", from),
        }
    }

    Ok(found.into_iter().collect())
}
