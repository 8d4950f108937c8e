use std::net::{Ipv4Addr, SocketAddr};

use chat_rooms::{
    client::DirectoryClient,
    config::ClientConfig,
    errors::DirectoryError,
    message::{DELETEROOM_CMD, GETDIR_CMD, MAKEROOM_CMD},
    server,
    shell::Shell,
    state::Db,
    types::ChatRoom,
};
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, FramedWrite};
use wire::{ReplyCodec, Request, RequestCodec, Status};

async fn start_server() -> (SocketAddr, Db) {
    let db = Db::new();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::run(listener, db.clone()));

    (addr, db)
}

fn room(name: &str, port: u16) -> ChatRoom {
    ChatRoom::new(name, Ipv4Addr::new(239, 0, 0, 1), port).unwrap()
}

#[tokio::test]
async fn made_room_is_listed_once_then_deleted() {
    let (addr, _db) = start_server().await;
    let mut client = DirectoryClient::connect(addr).await.unwrap();

    assert!(client.get_dir().await.unwrap().is_empty());

    client.make_room(room("lobby", 5000)).await.unwrap();
    client.make_room(room("lobby", 5001)).await.unwrap();
    assert_eq!(client.get_dir().await.unwrap(), vec![room("lobby", 5001)]);

    client.delete_room("lobby").await.unwrap();
    assert!(client.get_dir().await.unwrap().is_empty());

    assert!(matches!(
        client.delete_room("lobby").await,
        Err(DirectoryError::Remote {
            status: Status::NotFound,
            ..
        })
    ));

    client.close().await.unwrap();
}

#[tokio::test]
async fn raw_replies_use_the_envelope() {
    let (addr, _db) = start_server().await;
    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, writer) = stream.into_split();
    let mut reader = FramedRead::new(reader, ReplyCodec::new());
    let mut writer = FramedWrite::new(writer, RequestCodec::new());

    writer
        .send(Request::new(MAKEROOM_CMD, "lobby 10.1.1.1 5000"))
        .await
        .unwrap();
    assert_eq!(
        reader.next().await.unwrap().unwrap().status,
        Status::ProtocolError
    );

    writer
        .send(Request::new(MAKEROOM_CMD, "lobby 239.1.1.1 5000"))
        .await
        .unwrap();
    assert_eq!(reader.next().await.unwrap().unwrap().status, Status::Ok);

    writer.send(Request::bare(GETDIR_CMD)).await.unwrap();
    let reply = reader.next().await.unwrap().unwrap();
    assert_eq!(reply.status, Status::Ok);
    assert_eq!(reply.text(), "lobby: (239.1.1.1, 5000)\n");

    writer
        .send(Request::new(DELETEROOM_CMD, "lobby"))
        .await
        .unwrap();
    assert_eq!(reader.next().await.unwrap().unwrap().status, Status::Ok);

    writer.send(Request::bare(42)).await.unwrap();
    assert_eq!(
        reader.next().await.unwrap().unwrap().status,
        Status::ProtocolError
    );
}

#[tokio::test]
async fn concurrent_clients_leave_a_consistent_directory() {
    let (addr, db) = start_server().await;

    let workers = (0..16u16).map(|i| {
        tokio::spawn(async move {
            let mut client = DirectoryClient::connect(addr).await.unwrap();
            for round in 0..10u16 {
                client.make_room(room(&format!("room{i}"), 5000 + round)).await.unwrap();
                client.make_room(room("shared", 6000 + i)).await.unwrap();
                // Odd workers delete their own room each round, so only even ones survive.
                if i % 2 == 1 {
                    client.delete_room(&format!("room{i}")).await.unwrap();
                }
            }
            client.close().await.unwrap();
        })
    });
    for worker in workers.collect::<Vec<_>>() {
        worker.await.unwrap();
    }

    let rooms = db.rooms().await;
    let names: Vec<_> = rooms.iter().map(|room| room.name.clone()).collect();
    let mut expected: Vec<_> = (0..16)
        .filter(|i| i % 2 == 0)
        .map(|i| format!("room{i}"))
        .chain(["shared".to_string()])
        .collect();
    expected.sort();
    assert_eq!(names, expected);

    for room in &rooms {
        if room.name != "shared" {
            assert_eq!(room.port, 5009);
        }
    }

    let mut client = DirectoryClient::connect(addr).await.unwrap();
    assert_eq!(client.get_dir().await.unwrap(), rooms);
}

#[tokio::test]
async fn shell_manages_rooms() {
    let (addr, db) = start_server().await;
    let mut shell = Shell::new(ClientConfig {
        server_addr: addr,
        username: Some("Alice".into()),
        ..ClientConfig::default()
    });

    let input = "getdir\nconnect\ngetdir\nmakeroom lobby 239.0.0.7 5007\ngetdir\n\
                 chat nowhere\ndeleteroom lobby\nbye\nq\n";
    let mut output = Vec::new();
    shell.run(input.as_bytes(), &mut output).await.unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("Not connected to a chat room directory server"));
    assert!(output.contains(&format!("Connected to {addr}.")));
    assert!(output.contains("There are currently no rooms available."));
    assert!(output.contains("lobby: (239.0.0.7, 5007)"));
    assert!(output.contains("No room named nowhere"));
    assert!(output.contains(&format!("Closed connection to {addr}.")));
    assert!(output.contains("[Alice, directory] Enter command: "));

    assert!(db.rooms().await.is_empty());
}
