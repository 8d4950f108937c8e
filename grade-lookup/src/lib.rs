pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod message;
pub mod roster;
pub mod server;
pub mod shell;
pub mod types;
