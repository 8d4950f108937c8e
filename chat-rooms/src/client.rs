use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use log::{debug, info};
use tokio::{
    io::AsyncWriteExt,
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};
use tokio_util::codec::{FramedRead, FramedWrite};
use wire::{Reply, ReplyCodec, RequestCodec, Status};

use crate::{
    errors::DirectoryError,
    message::{parse_listing, DirectoryRequest},
    types::ChatRoom,
};

/// A persistent connection to the chat room directory server.
pub struct DirectoryClient {
    peer: SocketAddr,
    server_reader: FramedRead<OwnedReadHalf, ReplyCodec>,
    server_writer: FramedWrite<OwnedWriteHalf, RequestCodec>,
}

impl DirectoryClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self, DirectoryError> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream.peer_addr()?;
        info!("Connected to directory server {}", peer);

        let (server_reader, server_writer) = stream.into_split();
        Ok(Self {
            peer,
            server_reader: FramedRead::new(server_reader, ReplyCodec::new()),
            server_writer: FramedWrite::new(server_writer, RequestCodec::new()),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    async fn round_trip(&mut self, request: DirectoryRequest) -> Result<Reply, DirectoryError> {
        debug!("Sending {:?} to {}", request, self.peer);
        self.server_writer.send(request.into()).await?;

        let reply = self
            .server_reader
            .next()
            .await
            .ok_or(DirectoryError::ConnectionClosed)??;

        match reply.status {
            Status::Ok => Ok(reply),
            status => Err(DirectoryError::Remote {
                status,
                message: reply.text(),
            }),
        }
    }

    pub async fn get_dir(&mut self) -> Result<Vec<ChatRoom>, DirectoryError> {
        let reply = self.round_trip(DirectoryRequest::GetDir).await?;
        parse_listing(&reply.text())
    }

    pub async fn make_room(&mut self, room: ChatRoom) -> Result<(), DirectoryError> {
        self.round_trip(DirectoryRequest::MakeRoom(room)).await?;
        Ok(())
    }

    pub async fn delete_room(&mut self, name: &str) -> Result<(), DirectoryError> {
        self.round_trip(DirectoryRequest::DeleteRoom(name.to_string()))
            .await?;
        Ok(())
    }

    /// Closes the connection; the directory protocol has no goodbye message.
    pub async fn close(self) -> Result<(), DirectoryError> {
        let mut server_writer = self.server_writer.into_inner();
        server_writer.shutdown().await?;
        info!("Closed connection to {}", self.peer);
        Ok(())
    }
}
