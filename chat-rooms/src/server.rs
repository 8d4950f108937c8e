use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use log::{error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, FramedWrite};
use wire::{Reply, ReplyCodec, RequestCodec, Status};

use crate::{handlers::handle_request, state::Db};

/// Accepts connections forever, one task per client.
pub async fn run(listener: TcpListener, db: Db) -> anyhow::Result<()> {
    info!("Chat Room Directory Server listening on {}", listener.local_addr()?);

    loop {
        let (stream, addr) = listener.accept().await?;

        // Clone the handle to the room directory.
        let db = db.clone();

        tokio::spawn(async move {
            info!("Connection received from {}", addr);
            if let Err(e) = process(stream, addr, db).await {
                error!("an error occurred; error = {:?}", e);
            }
        });
    }
}

async fn process(stream: TcpStream, addr: SocketAddr, db: Db) -> anyhow::Result<()> {
    let (client_reader, client_writer) = stream.into_split();

    let mut client_reader = FramedRead::new(client_reader, RequestCodec::new());
    let mut client_writer = FramedWrite::new(client_writer, ReplyCodec::new());

    while let Some(frame) = client_reader.next().await {
        match frame {
            Ok(request) => {
                let reply = handle_request(request, &db).await;
                client_writer.send(reply).await?;
            }
            Err(e) => {
                warn!("Bad frame from {}: {}", addr, e);
                client_writer
                    .send(Reply::error(Status::ProtocolError, e.to_string()))
                    .await?;
                break;
            }
        }
    }

    info!("Client {} disconnected", addr);
    Ok(())
}
