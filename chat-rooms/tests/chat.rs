use std::{net::Ipv4Addr, time::Duration};

use chat_rooms::{
    chat::{ChatSession, Received},
    client::DirectoryClient,
    config::ClientConfig,
    server,
    shell::Shell,
    state::Db,
    types::ChatRoom,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream},
    net::TcpListener,
    time::timeout,
};

const WAIT: Duration = Duration::from_secs(5);

/// A room on an administratively scoped group, on a port nothing else uses.
fn test_room(name: &str, last_octet: u8) -> ChatRoom {
    let port = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    ChatRoom::new(name, Ipv4Addr::new(239, 255, 42, last_octet), port).unwrap()
}

/// Waits for the next message not sent by `session` itself.
async fn next_from_others(session: &mut ChatSession) -> Received {
    timeout(WAIT, async {
        loop {
            let received = session.recv().await.expect("receiver stopped");
            if !session.is_own(&received) {
                return received;
            }
        }
    })
    .await
    .expect("no message arrived")
}

#[tokio::test]
async fn members_exchange_messages_and_leave_promptly() {
    let room = test_room("lobby", 1);
    let mut alice = ChatSession::join(room.clone(), "Alice").await.unwrap();
    let mut bob = ChatSession::join(room.clone(), "Bob").await.unwrap();

    alice.send("ping").await.unwrap();
    let received = next_from_others(&mut bob).await;
    assert_eq!(received.message.sender, "Alice");
    assert_eq!(received.message.text, "ping");

    // Alice hears her own message through loopback and recognises it.
    let echo = timeout(WAIT, alice.recv()).await.unwrap().unwrap();
    assert_eq!(echo.message.text, "ping");
    assert!(alice.is_own(&echo));
    assert!(!bob.is_own(&echo));

    bob.send("pong").await.unwrap();
    let received = next_from_others(&mut alice).await;
    assert_eq!(received.message.sender, "Bob");
    assert_eq!(received.message.text, "pong");

    timeout(WAIT, alice.leave()).await.unwrap();
    timeout(WAIT, bob.leave()).await.unwrap();
}

#[tokio::test]
async fn another_member_with_the_same_name_is_not_an_echo() {
    let room = test_room("twins", 2);
    let mut first = ChatSession::join(room.clone(), "Bob").await.unwrap();
    let mut second = ChatSession::join(room.clone(), "Bob").await.unwrap();

    second.send("hello from the other Bob").await.unwrap();
    let received = next_from_others(&mut first).await;
    assert_eq!(received.message.sender, "Bob");
    assert_eq!(received.message.text, "hello from the other Bob");
    assert!(second.is_own(&received));

    timeout(WAIT, first.leave()).await.unwrap();
    timeout(WAIT, second.leave()).await.unwrap();
}

/// Reads shell output into `seen` until `needle` shows up.
async fn read_until(output: &mut DuplexStream, seen: &mut String, needle: &str) {
    let found = timeout(WAIT, async {
        let mut buf = [0u8; 1024];
        while !seen.contains(needle) {
            let n = output.read(&mut buf).await.unwrap();
            if n == 0 {
                return false;
            }
            seen.push_str(&String::from_utf8_lossy(&buf[..n]));
        }
        true
    })
    .await;
    assert_eq!(found, Ok(true), "waiting for {needle:?}, got:\n{seen}");
}

#[tokio::test]
async fn shell_chat_mode_prints_others_and_exits_to_the_directory() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::run(listener, Db::new()));

    let room = test_room("study", 3);
    let mut directory = DirectoryClient::connect(addr).await.unwrap();
    directory.make_room(room.clone()).await.unwrap();

    let (mut input, shell_input) = tokio::io::duplex(4096);
    let (shell_output, mut output) = tokio::io::duplex(64 * 1024);
    let mut shell = Shell::new(ClientConfig {
        server_addr: addr,
        username: Some("Alice".into()),
        ..ClientConfig::default()
    });
    let running =
        tokio::spawn(async move { shell.run(BufReader::new(shell_input), shell_output).await });

    let mut seen = String::new();
    input.write_all(b"connect\nchat study\n").await.unwrap();
    read_until(&mut output, &mut seen, "Entering chat room study").await;

    let mut bob = ChatSession::join(room.clone(), "Bob").await.unwrap();
    let mut other_alice = ChatSession::join(room.clone(), "Alice").await.unwrap();

    // Lines typed in chat mode go to the room.
    input.write_all(b"hey everyone\n").await.unwrap();
    let received = next_from_others(&mut bob).await;
    assert_eq!(received.message.sender, "Alice");
    assert_eq!(received.message.text, "hey everyone");

    bob.send("hi Alice").await.unwrap();
    read_until(&mut output, &mut seen, "Bob: hi Alice\n").await;

    other_alice.send("same name, different person").await.unwrap();
    read_until(&mut output, &mut seen, "Alice: same name, different person\n").await;
    assert!(!seen.contains("Alice: hey everyone"));

    input.write_all(b"/exit\n").await.unwrap();
    read_until(
        &mut output,
        &mut seen,
        "Left chat room study.\n[Alice, directory] Enter command: ",
    )
    .await;

    input.write_all(b"bye\nq\n").await.unwrap();
    drop(input);
    timeout(WAIT, running).await.unwrap().unwrap().unwrap();

    timeout(WAIT, bob.leave()).await.unwrap();
    timeout(WAIT, other_alice.leave()).await.unwrap();
}
