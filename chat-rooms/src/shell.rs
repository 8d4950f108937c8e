//! Interactive chat client. Three modes:
//!
//! - not connected: `connect [host:port]`, `name <username>`, `q`
//! - directory: `getdir`, `makeroom <name> <ip> <port>`, `deleteroom <name>`,
//!   `chat <name>`, `bye`
//! - chat: every line goes to the room, `/exit` returns to the directory

use std::{fmt, net::SocketAddr};

use rand::Rng;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use wire::field::encode_fixed;

use crate::{
    chat::{ChatSession, Received, SENDER_FIELD_LEN},
    client::DirectoryClient,
    config::ClientConfig,
    errors::DirectoryError,
    types::{validate_room_name, ChatRoom},
};

pub const PROMPT: &str = "Enter command: ";
pub const EXIT_CHAT: &str = "/exit";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShellCommand {
    Connect(Option<SocketAddr>),
    Name(String),
    GetDir,
    MakeRoom(ChatRoom),
    DeleteRoom(String),
    Chat(String),
    Bye,
    Quit,
}

/// Parses one input line; the command word is case-insensitive.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(command, rest)| (command, rest.trim()));
    if command.is_empty() {
        return Err("Empty command.".to_string());
    }

    let command = match (command.to_lowercase().as_str(), rest) {
        ("connect", "") => ShellCommand::Connect(None),
        ("connect", addr) => ShellCommand::Connect(Some(
            addr.parse()
                .map_err(|_| format!("Invalid address {addr}. Use host:port."))?,
        )),
        ("name", name) if !name.is_empty() && !name.contains(char::is_whitespace) => {
            ShellCommand::Name(name.to_string())
        }
        ("getdir", "") => ShellCommand::GetDir,
        ("makeroom", args) => {
            ShellCommand::MakeRoom(ChatRoom::from_args(args).map_err(|e| e.to_string())?)
        }
        ("deleteroom", name) => {
            validate_room_name(name).map_err(|e| e.to_string())?;
            ShellCommand::DeleteRoom(name.to_string())
        }
        ("chat", name) => {
            validate_room_name(name).map_err(|e| e.to_string())?;
            ShellCommand::Chat(name.to_string())
        }
        ("bye", "") => ShellCommand::Bye,
        ("q", "") | ("quit", "") => ShellCommand::Quit,
        _ => return Err("Invalid command. Please try again.".to_string()),
    };

    Ok(command)
}

pub fn random_username() -> String {
    format!("User{}", rand::thread_rng().gen_range(0..=100))
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    NotConnected,
    Directory,
    Chat(String),
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::NotConnected => f.write_str("not connected"),
            Mode::Directory => f.write_str("directory"),
            Mode::Chat(room) => write!(f, "chat {room}"),
        }
    }
}

enum ChatEvent {
    Line(Option<String>),
    Message(Option<Received>),
}

pub struct Shell {
    config: ClientConfig,
    username: String,
    directory: Option<DirectoryClient>,
    chat: Option<ChatSession>,
}

impl Shell {
    pub fn new(config: ClientConfig) -> Self {
        let username = config.username.clone().unwrap_or_else(random_username);
        Self {
            config,
            username,
            directory: None,
            chat: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn mode(&self) -> Mode {
        match (&self.chat, &self.directory) {
            (Some(session), _) => Mode::Chat(session.room().name.clone()),
            (None, Some(_)) => Mode::Directory,
            (None, None) => Mode::NotConnected,
        }
    }

    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        loop {
            if self.chat.is_some() {
                if !self.chat_step(&mut lines, &mut output).await? {
                    break;
                }
                continue;
            }

            let prompt = format!("[{}, {}] {}", self.username, self.mode(), PROMPT);
            output.write_all(prompt.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let response = match parse_command(&line) {
                Ok(ShellCommand::Quit) if self.directory.is_none() => break,
                Ok(command) => self.execute(command).await.unwrap_or_else(|e| e.to_string()),
                Err(message) => message,
            };

            output.write_all(response.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }

        self.leave_chat().await;
        if let Some(directory) = self.directory.take() {
            directory.close().await.ok();
        }
        output.flush().await
    }

    /// Runs one command and returns the text to show the user.
    pub async fn execute(&mut self, command: ShellCommand) -> Result<String, DirectoryError> {
        match command {
            ShellCommand::Connect(addr) => {
                if let Some(directory) = &self.directory {
                    return Ok(format!("Already connected to {}.", directory.peer_addr()));
                }
                let addr = addr.unwrap_or(self.config.server_addr);
                self.directory = Some(DirectoryClient::connect(addr).await?);
                Ok(format!("Connected to {addr}."))
            }
            ShellCommand::Name(name) => {
                encode_fixed(&name, SENDER_FIELD_LEN)?;
                self.username = name;
                Ok(format!("Chat name set to {}.", self.username))
            }
            ShellCommand::GetDir => {
                let rooms = self.client()?.get_dir().await;
                let rooms = self.forget_if_closed(rooms)?;
                if rooms.is_empty() {
                    return Ok("There are currently no rooms available.".to_string());
                }
                Ok(rooms
                    .iter()
                    .map(ChatRoom::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            ShellCommand::MakeRoom(room) => {
                let description = room.to_string();
                let result = self.client()?.make_room(room).await;
                self.forget_if_closed(result)?;
                Ok(format!("Created room {description}"))
            }
            ShellCommand::DeleteRoom(name) => {
                let result = self.client()?.delete_room(&name).await;
                self.forget_if_closed(result)?;
                Ok(format!("Deleted room {name}."))
            }
            ShellCommand::Chat(name) => {
                let rooms = self.client()?.get_dir().await;
                let room = self
                    .forget_if_closed(rooms)?
                    .into_iter()
                    .find(|room| room.name == name)
                    .ok_or(DirectoryError::RoomNotFound(name))?;

                let session =
                    ChatSession::join_with_ttl(room.clone(), &self.username, self.config.ttl)
                        .await?;
                self.chat = Some(session);
                Ok(format!(
                    "Entering chat room {room}. Type {EXIT_CHAT} to leave."
                ))
            }
            ShellCommand::Bye => match self.directory.take() {
                Some(directory) => {
                    let peer = directory.peer_addr();
                    directory.close().await?;
                    Ok(format!("Closed connection to {peer}."))
                }
                None => Err(DirectoryError::NotConnected),
            },
            ShellCommand::Quit => {
                Ok("Say bye to the directory server before quitting.".to_string())
            }
        }
    }

    /// Waits for whichever comes first, a typed line or a room message.
    /// Returns `false` once input has run out.
    async fn chat_step<R, W>(&mut self, lines: &mut Lines<R>, output: &mut W) -> io::Result<bool>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Some(session) = self.chat.as_mut() else {
            return Ok(true);
        };

        let event = tokio::select! {
            line = lines.next_line() => ChatEvent::Line(line?),
            message = session.recv() => ChatEvent::Message(message),
        };

        match event {
            ChatEvent::Line(None) => return Ok(false),
            ChatEvent::Line(Some(line)) if line.trim() == EXIT_CHAT => {
                if let Some(room) = self.leave_chat().await {
                    output
                        .write_all(format!("Left chat room {room}.\n").as_bytes())
                        .await?;
                }
            }
            ChatEvent::Line(Some(line)) => {
                if let Err(e) = session.send(&line).await {
                    output.write_all(format!("{e}\n").as_bytes()).await?;
                }
            }
            // Our own datagrams come back through multicast loopback.
            ChatEvent::Message(Some(received)) if session.is_own(&received) => {}
            ChatEvent::Message(Some(Received { message, .. })) => {
                let line = format!("{}: {}\n", message.sender, message.text);
                output.write_all(line.as_bytes()).await?;
            }
            ChatEvent::Message(None) => {
                self.leave_chat().await;
                output.write_all(b"Chat receiver stopped.\n").await?;
            }
        }

        output.flush().await?;
        Ok(true)
    }

    async fn leave_chat(&mut self) -> Option<String> {
        let session = self.chat.take()?;
        let room = session.room().name.clone();
        session.leave().await;
        Some(room)
    }

    fn client(&mut self) -> Result<&mut DirectoryClient, DirectoryError> {
        self.directory.as_mut().ok_or(DirectoryError::NotConnected)
    }

    /// Drops the directory connection when the server has gone away.
    fn forget_if_closed<T>(
        &mut self,
        result: Result<T, DirectoryError>,
    ) -> Result<T, DirectoryError> {
        if let Err(
            DirectoryError::ConnectionClosed | DirectoryError::IOError(_) | DirectoryError::Wire(_),
        ) = &result
        {
            self.directory = None;
        }
        result
    }
}
