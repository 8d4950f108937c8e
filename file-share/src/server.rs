use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use log::{error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, FramedWrite};
use wire::{Reply, ReplyCodec, RequestCodec, Status};

use crate::{handlers::handle_request, message::CommandCode, state::SharedDir};

/// Accepts connections forever, one task per client.
pub async fn run(listener: TcpListener, dir: SharedDir) -> anyhow::Result<()> {
    info!("Listening on {} ...", listener.local_addr()?);

    loop {
        let (stream, addr) = listener.accept().await?;
        let dir = dir.clone();

        tokio::spawn(async move {
            info!("Connection received from {}.", addr);
            if let Err(e) = process(stream, addr, dir).await {
                error!("an error occurred; error = {:?}", e);
            }
        });
    }
}

async fn process(stream: TcpStream, addr: SocketAddr, dir: SharedDir) -> anyhow::Result<()> {
    let (client_reader, client_writer) = stream.into_split();

    let max_frame_len = dir.max_frame_len();
    let mut client_reader =
        FramedRead::new(client_reader, RequestCodec::with_max_length(max_frame_len));
    let mut client_writer =
        FramedWrite::new(client_writer, ReplyCodec::with_max_length(max_frame_len));

    while let Some(frame) = client_reader.next().await {
        let request = match frame {
            Ok(request) => request,
            Err(e) => {
                warn!("Bad frame from {}: {}", addr, e);
                client_writer
                    .send(Reply::error(Status::ProtocolError, e.to_string()))
                    .await?;
                break;
            }
        };

        let bye = request.command == CommandCode::Bye as u8;
        let reply = handle_request(request, &dir).await;
        client_writer.send(reply).await?;

        if bye {
            break;
        }
    }

    info!("Closing client connection from {} ...", addr);
    Ok(())
}
