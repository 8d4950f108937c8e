use std::net::SocketAddr;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use log::{debug, info};
use tokio::net::{
    tcp::{OwnedReadHalf, OwnedWriteHalf},
    TcpStream,
};
use tokio_util::codec::{FramedRead, FramedWrite};
use wire::{codec::DEFAULT_MAX_LENGTH, Reply, ReplyCodec, RequestCodec, Status};

use crate::{
    errors::FileError,
    message::{FileRequest, FILENAME_FIELD_LEN},
};

/// A persistent connection to a file sharing server.
pub struct FileClient {
    peer: SocketAddr,
    max_frame_len: u64,
    server_reader: FramedRead<OwnedReadHalf, ReplyCodec>,
    server_writer: FramedWrite<OwnedWriteHalf, RequestCodec>,
}

impl FileClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self, FileError> {
        Self::connect_with_limit(addr, DEFAULT_MAX_LENGTH).await
    }

    /// Connects with frames capped at `max_frame_len` bytes in both directions.
    /// This has to match the server's limit.
    pub async fn connect_with_limit(
        addr: SocketAddr,
        max_frame_len: u64,
    ) -> Result<Self, FileError> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream.peer_addr()?;
        info!("Connected to {}", peer);

        let (server_reader, server_writer) = stream.into_split();
        Ok(Self {
            peer,
            max_frame_len,
            server_reader: FramedRead::new(
                server_reader,
                ReplyCodec::with_max_length(max_frame_len),
            ),
            server_writer: FramedWrite::new(
                server_writer,
                RequestCodec::with_max_length(max_frame_len),
            ),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    async fn round_trip(&mut self, request: FileRequest) -> Result<Reply, FileError> {
        debug!("Sending {:?} to {}", request.command(), self.peer);
        self.server_writer.send(request.into_request()?).await?;

        let reply = self
            .server_reader
            .next()
            .await
            .ok_or(FileError::ConnectionClosed)??;

        match reply.status {
            Status::Ok => Ok(reply),
            status => Err(FileError::Remote {
                status,
                message: reply.text(),
            }),
        }
    }

    /// Downloads a file; the codec keeps reading until the declared size has arrived.
    pub async fn get(&mut self, filename: &str) -> Result<Bytes, FileError> {
        let reply = self
            .round_trip(FileRequest::Get {
                filename: filename.to_string(),
            })
            .await?;
        Ok(reply.payload)
    }

    /// Uploads a file. Contents that would not fit in one frame next to the
    /// file name field are refused before anything is sent.
    pub async fn put(
        &mut self,
        filename: &str,
        contents: impl Into<Bytes>,
    ) -> Result<(), FileError> {
        let contents = contents.into();
        let frame_len = (FILENAME_FIELD_LEN + contents.len()) as u64;
        if frame_len > self.max_frame_len {
            return Err(FileError::TooLarge {
                filename: filename.to_string(),
                size: contents.len() as u64,
                max: self.max_frame_len.saturating_sub(FILENAME_FIELD_LEN as u64),
            });
        }

        self.round_trip(FileRequest::Put {
            filename: filename.to_string(),
            contents,
        })
        .await?;
        Ok(())
    }

    pub async fn rlist(&mut self) -> Result<Vec<String>, FileError> {
        let reply = self.round_trip(FileRequest::RList).await?;
        Ok(reply.text().lines().map(str::to_string).collect())
    }

    /// Says goodbye and drops the connection.
    pub async fn bye(mut self) -> Result<(), FileError> {
        self.round_trip(FileRequest::Bye).await?;
        info!("Closed connection to {}", self.peer);
        Ok(())
    }
}
