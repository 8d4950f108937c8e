//! Multicast chat: every member of a room sends datagrams to the room's group
//! address and receives everything sent there, its own messages included.
//!
//! ```text
//! +---------------------------+----------------------+
//! | sender name (32 bytes,    | text (UTF-8, rest of |
//! | NUL padded)               | the datagram)        |
//! +---------------------------+----------------------+
//! ```

use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
};

use bytes::{BufMut, BytesMut};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::{net::UdpSocket, sync::mpsc, task::JoinHandle};
use tokio_util::{
    codec::{Decoder, Encoder},
    sync::CancellationToken,
    udp::UdpFramed,
};
use wire::field::{decode_fixed, encode_fixed};

use crate::{errors::DirectoryError, types::ChatRoom};

pub const SENDER_FIELD_LEN: usize = 32;
pub const DEFAULT_TTL: u32 = 1;

// Received messages the shell has not picked up yet.
const INCOMING_BACKLOG: usize = 64;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
}

/// A message as it arrived, with the address of the socket that sent it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Received {
    pub message: ChatMessage,
    pub from: SocketAddr,
}

#[derive(Clone, Debug, Default)]
pub struct ChatCodec {}

impl ChatCodec {
    pub fn new() -> Self {
        Self {}
    }
}

impl Decoder for ChatCodec {
    type Item = ChatMessage;
    type Error = DirectoryError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, DirectoryError> {
        if src.is_empty() {
            return Ok(None);
        }

        // One datagram is one message, so whatever happens the buffer is spent.
        let datagram = src.split();
        if datagram.len() < SENDER_FIELD_LEN {
            return Err(DirectoryError::MalformedChat);
        }

        let (sender, text) = datagram.split_at(SENDER_FIELD_LEN);
        Ok(Some(ChatMessage {
            sender: decode_fixed(sender)?,
            text: std::str::from_utf8(text)
                .map_err(wire::WireError::from)?
                .to_string(),
        }))
    }
}

impl Encoder<ChatMessage> for ChatCodec {
    type Error = DirectoryError;

    fn encode(&mut self, item: ChatMessage, dst: &mut BytesMut) -> Result<(), DirectoryError> {
        let sender = encode_fixed(&item.sender, SENDER_FIELD_LEN)?;

        dst.reserve(sender.len() + item.text.len());
        dst.put_slice(&sender);
        dst.put_slice(item.text.as_bytes());
        Ok(())
    }
}

/// Membership in one room's multicast group.
pub struct ChatSession {
    room: ChatRoom,
    username: String,
    sender: UdpFramed<ChatCodec>,
    send_port: u16,
    incoming: mpsc::Receiver<Received>,
    shutdown: CancellationToken,
    receiver: JoinHandle<()>,
}

impl ChatSession {
    pub async fn join(room: ChatRoom, username: &str) -> Result<Self, DirectoryError> {
        Self::join_with_ttl(room, username, DEFAULT_TTL).await
    }

    pub async fn join_with_ttl(
        room: ChatRoom,
        username: &str,
        ttl: u32,
    ) -> Result<Self, DirectoryError> {
        // Refuse a name that would not fit before touching the network.
        encode_fixed(username, SENDER_FIELD_LEN)?;

        let send_socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        send_socket.set_multicast_ttl_v4(ttl)?;
        send_socket.set_multicast_loop_v4(true)?;
        let send_port = send_socket.local_addr()?.port();

        let recv_socket = bind_group(&room)?;
        info!("Joined {} as {}", room, username);

        let (tx, incoming) = mpsc::channel(INCOMING_BACKLOG);
        let shutdown = CancellationToken::new();
        let receiver = tokio::spawn(receive(
            UdpFramed::new(recv_socket, ChatCodec::new()),
            tx,
            shutdown.clone(),
        ));

        Ok(Self {
            room,
            username: username.to_string(),
            sender: UdpFramed::new(send_socket, ChatCodec::new()),
            send_port,
            incoming,
            shutdown,
            receiver,
        })
    }

    pub fn room(&self) -> &ChatRoom {
        &self.room
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub async fn send(&mut self, text: &str) -> Result<(), DirectoryError> {
        let message = ChatMessage {
            sender: self.username.clone(),
            text: text.to_string(),
        };
        self.sender.send((message, self.room.group_addr())).await
    }

    /// Next datagram from the group, `None` once the receive task has stopped.
    /// This includes what this session sent itself; see [`ChatSession::is_own`].
    pub async fn recv(&mut self) -> Option<Received> {
        self.incoming.recv().await
    }

    /// Whether `received` is this session's own message coming back through
    /// multicast loopback. Two sockets on one host never share a send port,
    /// so another member with the same name is still told apart.
    pub fn is_own(&self, received: &Received) -> bool {
        received.from.port() == self.send_port && received.message.sender == self.username
    }

    /// Stops the receive task and drops both sockets, leaving the group.
    pub async fn leave(self) {
        self.shutdown.cancel();
        if let Err(e) = self.receiver.await {
            warn!("Chat receiver for {} ended badly: {}", self.room.name, e);
        }
        info!("Left {}", self.room);
    }
}

/// A socket on the room port that other processes on this host may share,
/// joined to the room's group on the default interface.
fn bind_group(room: &ChatRoom) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, room.port)).into())?;
    socket.join_multicast_v4(&room.ip, &Ipv4Addr::UNSPECIFIED)?;
    socket.set_nonblocking(true)?;

    UdpSocket::from_std(socket.into())
}

async fn receive(
    mut socket: UdpFramed<ChatCodec>,
    tx: mpsc::Sender<Received>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            frame = socket.next() => match frame {
                Some(Ok((message, from))) => {
                    debug!("Chat message from {}: {:?}", from, message);
                    if tx.send(Received { message, from }).await.is_err() {
                        break;
                    }
                }
                Some(Err(e)) => warn!("Dropping chat datagram: {}", e),
                None => break,
            }
        }
    }
}
