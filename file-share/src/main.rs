use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use env_logger::Env;
use file_share::{
    config::{
        self, ClientConfig, ServerConfig, DEFAULT_CLIENT_DIR, DEFAULT_SERVER_DIR,
        DEFAULT_SERVICE_NAME,
    },
    discovery::Announcer,
    server,
    shell::Shell,
    state::SharedDir,
};
use log::{error, info};
use tokio::{io::BufReader, net::TcpListener};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(author, version, about = "GET/PUT/RLIST file sharing over TCP", long_about = None)]
struct Args {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Share a directory and announce the service
    Server {
        /// Address to listen on
        #[arg(short, long, default_value_t = config::default_addr())]
        addr: SocketAddr,
        /// Directory to share
        #[arg(short, long, default_value = DEFAULT_SERVER_DIR)]
        dir: PathBuf,
        /// UDP address answering service scans
        #[arg(long, default_value_t = config::default_discovery_addr())]
        discovery_addr: SocketAddr,
        /// Name given in scan answers
        #[arg(long, default_value = DEFAULT_SERVICE_NAME)]
        name: String,
    },
    /// Interactive client
    Client {
        /// Server used by `connect` when no scan found one
        #[arg(short, long, default_value_t = config::default_addr())]
        addr: SocketAddr,
        /// Local directory for downloads and uploads
        #[arg(short, long, default_value = DEFAULT_CLIENT_DIR)]
        dir: PathBuf,
        /// Where scans are sent
        #[arg(long, default_value_t = config::default_scan_target())]
        scan_target: SocketAddr,
        /// How long a scan waits for answers, in milliseconds
        #[arg(long, default_value_t = 2000)]
        scan_wait_ms: u64,
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
        Role::Server {
            addr,
            dir,
            discovery_addr,
            name,
        } => {
            serve(ServerConfig {
                addr,
                dir,
                discovery_addr,
                service_name: name,
            })
            .await
        }
        Role::Client {
            addr,
            dir,
            scan_target,
            scan_wait_ms,
        } => {
            let mut shell = Shell::new(ClientConfig {
                server_addr: addr,
                dir,
                scan_target,
                scan_wait: Duration::from_millis(scan_wait_ms),
            });
            let stdin = BufReader::new(tokio::io::stdin());
            shell.run(stdin, tokio::io::stdout()).await?;
            Ok(())
        }
    }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let dir = SharedDir::open(&config.dir).await?;
    let listener = TcpListener::bind(config.addr).await?;
    let port = listener.local_addr()?.port();

    let announcer = Announcer::bind(config.discovery_addr, &config.service_name, port).await?;
    let shutdown = CancellationToken::new();
    let announcing = tokio::spawn(announcer.run(shutdown.clone()));

    let result = tokio::select! {
        result = server::run(listener, dir) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down.");
            Ok(())
        }
    };

    shutdown.cancel();
    if let Ok(Err(e)) = announcing.await {
        error!("Service announcer failed: {}", e);
    }

    result
}
