use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use env_logger::Env;
use grade_lookup::{
    client::GradeClient,
    config::{self, ServerConfig, DEFAULT_ROSTER},
    roster::Roster,
    server, shell,
};
use log::{info, warn};
use tokio::{io::BufReader, net::TcpListener};

#[derive(Parser, Debug)]
#[command(author, version, about = "Course grade lookup over TCP", long_about = None)]
struct Args {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Load the grade roster and answer lookups
    Server {
        /// Address to listen on
        #[arg(short, long, default_value_t = config::default_addr())]
        addr: SocketAddr,
        /// CSV file with one row per student plus an Averages row
        #[arg(short, long, default_value = DEFAULT_ROSTER)]
        roster: PathBuf,
    },
    /// Interactive client
    Client {
        /// Grade server to query
        #[arg(short, long, default_value_t = config::default_addr())]
        addr: SocketAddr,
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
        Role::Server { addr, roster } => {
            let config = ServerConfig {
                addr,
                roster_path: roster,
            };

            let roster = Roster::load(&config.roster_path)?;
            info!(
                "Loaded {} students from {}, assignments: {}",
                roster.len(),
                config.roster_path.display(),
                roster.assignments().join(", ")
            );
            if roster.is_empty() {
                warn!("The roster has no students, every grades request will be refused");
            }

            let listener = TcpListener::bind(config.addr).await?;
            server::run(listener, Arc::new(roster)).await
        }
        Role::Client { addr } => {
            let client = GradeClient::new(addr);
            let stdin = BufReader::new(tokio::io::stdin());
            let passwords = shell::PasswordInput::for_stdin();
            shell::run_with(&client, stdin, tokio::io::stdout(), passwords).await?;
            Ok(())
        }
    }
}
