use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use log::debug;
use serde_json::{Map, Value};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use wire::{Reply, ReplyCodec, Request, RequestCodec, Status};

use crate::{
    auth::credential_digest,
    errors::GradeError,
    message::{AverageCode, GradeRequest},
    types::Grades,
};

/// Talks to the grade server, one short-lived connection per request.
#[derive(Clone, Debug)]
pub struct GradeClient {
    addr: SocketAddr,
}

impl GradeClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Sends one request and waits for the complete reply.
    pub async fn request(&self, request: GradeRequest) -> Result<Reply, GradeError> {
        let stream = TcpStream::connect(self.addr).await?;
        let (server_reader, server_writer) = stream.into_split();

        let mut server_reader = FramedRead::new(server_reader, ReplyCodec::new());
        let mut server_writer = FramedWrite::new(server_writer, RequestCodec::new());

        debug!("Sending {:?} to {}", request, self.addr);
        server_writer.send(Request::from(request)).await?;

        let reply = server_reader
            .next()
            .await
            .ok_or(GradeError::ConnectionClosed)??;
        Ok(reply)
    }

    pub async fn fetch_average(&self, code: AverageCode) -> Result<String, GradeError> {
        let reply = expect_ok(self.request(GradeRequest::Average(code)).await?)?;
        Ok(reply.text())
    }

    /// Hashes the credentials locally; only the digest leaves this process.
    pub async fn fetch_grades(&self, id: &str, password: &str) -> Result<Grades, GradeError> {
        let digest = credential_digest(id, password);
        let reply = expect_ok(self.request(GradeRequest::Grades(digest)).await?)?;

        let grades: Map<String, Value> = serde_json::from_slice(&reply.payload)?;
        Ok(grades
            .into_iter()
            .map(|(assignment, grade)| match grade {
                Value::String(grade) => (assignment, grade),
                other => (assignment, other.to_string()),
            })
            .collect())
    }
}

fn expect_ok(reply: Reply) -> Result<Reply, GradeError> {
    match reply.status {
        Status::Ok => Ok(reply),
        Status::AuthFailed => Err(GradeError::AuthFailed),
        status => Err(GradeError::Remote {
            status,
            message: reply.text(),
        }),
    }
}
