//! Interactive front end: SCAN, CONNECT, LLIST, RLIST, GET, PUT and BYE typed
//! at a prompt. The protocol work lives in [`FileClient`] and [`discovery`].

use std::net::SocketAddr;

use tokio::{
    fs,
    io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
};

use crate::{
    client::FileClient,
    config::ClientConfig,
    discovery::{self, ServiceRecord},
    errors::FileError,
    message::validate_filename,
    state::list_dir,
};

pub const PROMPT: &str = "Enter command: ";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShellCommand {
    Scan,
    Connect(Option<SocketAddr>),
    LList,
    RList,
    Get { remote: String, local: Option<String> },
    Put { local: String, remote: Option<String> },
    Bye,
    Quit,
}

/// Parses one input line; the command word is case-insensitive.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err("Empty command.".to_string());
    };
    let args: Vec<&str> = words.collect();

    let command = match (command.to_lowercase().as_str(), args.as_slice()) {
        ("scan", []) => ShellCommand::Scan,
        ("connect", []) => ShellCommand::Connect(None),
        ("connect", [addr]) => ShellCommand::Connect(Some(
            addr.parse()
                .map_err(|_| format!("Invalid address {addr}. Use host:port."))?,
        )),
        ("llist", []) => ShellCommand::LList,
        ("rlist", []) => ShellCommand::RList,
        ("get", [remote]) => ShellCommand::Get {
            remote: remote.to_string(),
            local: None,
        },
        ("get", [remote, local]) => ShellCommand::Get {
            remote: remote.to_string(),
            local: Some(local.to_string()),
        },
        ("put", [local]) => ShellCommand::Put {
            local: local.to_string(),
            remote: None,
        },
        ("put", [local, remote]) => ShellCommand::Put {
            local: local.to_string(),
            remote: Some(remote.to_string()),
        },
        ("bye", []) => ShellCommand::Bye,
        ("q", []) | ("quit", []) => ShellCommand::Quit,
        _ => return Err("Invalid command. Please try again.".to_string()),
    };

    Ok(command)
}

pub struct Shell {
    config: ClientConfig,
    connection: Option<FileClient>,
    services: Vec<ServiceRecord>,
}

impl Shell {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            connection: None,
            services: Vec::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let response = match parse_command(&line) {
                Ok(ShellCommand::Quit) => {
                    self.execute(ShellCommand::Bye).await.ok();
                    break;
                }
                Ok(command) => self.execute(command).await.unwrap_or_else(|e| e.to_string()),
                Err(message) => message,
            };

            output.write_all(response.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }

        output.flush().await
    }

    /// Runs one command and returns the text to show the user.
    pub async fn execute(&mut self, command: ShellCommand) -> Result<String, FileError> {
        match command {
            ShellCommand::Scan => self.scan().await,
            ShellCommand::Connect(addr) => self.connect(addr).await,
            ShellCommand::LList => Ok(list_dir(&self.config.dir).await?.join("\n")),
            ShellCommand::RList => {
                let result = self.client()?.rlist().await;
                Ok(self.forget_if_fatal(result)?.join("\n"))
            }
            ShellCommand::Get { remote, local } => {
                let local = local.unwrap_or_else(|| remote.clone());
                validate_filename(&local)?;
                let result = self.client()?.get(&remote).await;
                let contents = self.forget_if_fatal(result)?;
                fs::create_dir_all(&self.config.dir).await?;
                fs::write(self.config.dir.join(&local), &contents).await?;
                Ok(format!(
                    "Received {} bytes. Creating file: {}",
                    contents.len(),
                    local
                ))
            }
            ShellCommand::Put { local, remote } => {
                let remote = remote.unwrap_or_else(|| local.clone());
                validate_filename(&local)?;
                let contents = fs::read(self.config.dir.join(&local)).await?;
                let size = contents.len();
                let result = self.client()?.put(&remote, contents).await;
                self.forget_if_fatal(result)?;
                Ok(format!("Sent {remote} ({size} bytes)."))
            }
            ShellCommand::Bye => match self.connection.take() {
                Some(client) => {
                    let peer = client.peer_addr();
                    client.bye().await?;
                    Ok(format!("Closed connection to {peer}."))
                }
                None => Err(FileError::NotConnected),
            },
            ShellCommand::Quit => Ok(String::new()),
        }
    }

    async fn scan(&mut self) -> Result<String, FileError> {
        self.services =
            discovery::scan_for_service(self.config.scan_target, self.config.scan_wait).await?;

        if self.services.is_empty() {
            return Ok("No services found.".to_string());
        }
        Ok(self
            .services
            .iter()
            .map(|service| format!("{} found at {}", service.name, service.addr))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn connect(&mut self, addr: Option<SocketAddr>) -> Result<String, FileError> {
        if let Some(client) = &self.connection {
            return Ok(format!("Already connected to {}.", client.peer_addr()));
        }

        let addr = addr
            .or_else(|| self.services.first().map(|service| service.addr))
            .unwrap_or(self.config.server_addr);

        let client = FileClient::connect(addr).await?;
        self.connection = Some(client);
        Ok(format!("Connected to {addr}."))
    }

    fn client(&mut self) -> Result<&mut FileClient, FileError> {
        self.connection.as_mut().ok_or(FileError::NotConnected)
    }

    /// Drops the connection when `result` says it is no longer usable.
    fn forget_if_fatal<T>(&mut self, result: Result<T, FileError>) -> Result<T, FileError> {
        if let Err(e) = &result {
            if e.is_fatal() {
                self.connection = None;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!(parse_command("SCAN"), Ok(ShellCommand::Scan));
        assert_eq!(parse_command("connect"), Ok(ShellCommand::Connect(None)));
        assert_eq!(
            parse_command("connect 127.0.0.1:30001"),
            Ok(ShellCommand::Connect(Some("127.0.0.1:30001".parse().unwrap())))
        );
        assert_eq!(
            parse_command("get remotefile.txt local.txt"),
            Ok(ShellCommand::Get {
                remote: "remotefile.txt".into(),
                local: Some("local.txt".into())
            })
        );
        assert_eq!(
            parse_command("Put notes.txt"),
            Ok(ShellCommand::Put {
                local: "notes.txt".into(),
                remote: None
            })
        );
        assert_eq!(parse_command("q"), Ok(ShellCommand::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("get").is_err());
        assert!(parse_command("connect nowhere").is_err());
        assert!(parse_command("rlist extra").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[tokio::test]
    async fn remote_commands_need_a_connection() {
        let mut shell = Shell::new(ClientConfig::default());
        assert!(matches!(
            shell.execute(ShellCommand::RList).await,
            Err(FileError::NotConnected)
        ));
        assert!(matches!(
            shell.execute(ShellCommand::Bye).await,
            Err(FileError::NotConnected)
        ));
    }
}
