pub mod chat;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod message;
pub mod parser;
pub mod server;
pub mod shell;
pub mod state;
pub mod types;
