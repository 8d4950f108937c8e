use std::net::SocketAddr;

use chat_rooms::{
    chat::DEFAULT_TTL,
    config::{self, ClientConfig, ServerConfig},
    server,
    shell::Shell,
    state::Db,
};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use tokio::{io::BufReader, net::TcpListener};

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat room directory and multicast chat", long_about = None)]
struct Args {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Keep the directory of chat rooms
    Server {
        /// Address to listen on
        #[arg(short, long, default_value_t = config::default_addr())]
        addr: SocketAddr,
    },
    /// Interactive client
    Client {
        /// Directory server used by `connect` without an address
        #[arg(short, long, default_value_t = config::default_addr())]
        addr: SocketAddr,
        /// Chat name; a random `User<n>` by default
        #[arg(short, long)]
        name: Option<String>,
        /// Multicast TTL for outgoing chat messages
        #[arg(long, default_value_t = DEFAULT_TTL)]
        ttl: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup the logging framework
    let env = Env::default()
        .filter_or("LOG_LEVEL", "info")
        .write_style_or("LOG_STYLE", "always");

    env_logger::init_from_env(env);

    match Args::parse().role {
        Role::Server { addr } => {
            let config = ServerConfig { addr };
            let listener = TcpListener::bind(config.addr).await?;

            tokio::select! {
                result = server::run(listener, Db::new()) => result,
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down.");
                    Ok(())
                }
            }
        }
        Role::Client { addr, name, ttl } => {
            let mut shell = Shell::new(ClientConfig {
                server_addr: addr,
                ttl,
                username: name,
            });
            let stdin = BufReader::new(tokio::io::stdin());
            shell.run(stdin, tokio::io::stdout()).await?;
            Ok(())
        }
    }
}
