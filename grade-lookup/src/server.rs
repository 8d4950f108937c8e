use std::{net::SocketAddr, sync::Arc};

use futures::{SinkExt, StreamExt};
use log::{error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, FramedWrite};
use wire::{Reply, ReplyCodec, RequestCodec, Status};

use crate::{handlers::handle_request, roster::Roster};

/// Accepts connections forever, one task per client.
pub async fn run(listener: TcpListener, roster: Arc<Roster>) -> anyhow::Result<()> {
    info!("Listening for connections on {}", listener.local_addr()?);

    loop {
        // Asynchronously wait for an inbound TcpStream.
        let (stream, addr) = listener.accept().await?;

        // The roster is read-only, every task just gets another handle to it.
        let roster = Arc::clone(&roster);

        tokio::spawn(async move {
            info!("Connection received from {}", addr);
            if let Err(e) = process(stream, addr, roster).await {
                error!("an error occurred; error = {:?}", e);
            }
        });
    }
}

async fn process(stream: TcpStream, addr: SocketAddr, roster: Arc<Roster>) -> anyhow::Result<()> {
    let (client_reader, client_writer) = stream.into_split();

    let mut client_reader = FramedRead::new(client_reader, RequestCodec::new());
    let mut client_writer = FramedWrite::new(client_writer, ReplyCodec::new());

    while let Some(frame) = client_reader.next().await {
        match frame {
            Ok(request) => {
                let reply = handle_request(request, &roster);
                client_writer.send(reply).await?;
            }
            Err(e) => {
                // The stream position is unknown after a bad frame, so give up on it.
                warn!("Bad frame from {}: {}", addr, e);
                client_writer
                    .send(Reply::error(Status::ProtocolError, e.to_string()))
                    .await?;
                break;
            }
        }
    }

    info!("Closing client connection from {}", addr);
    Ok(())
}
