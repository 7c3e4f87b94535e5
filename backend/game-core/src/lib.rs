//! Client protocol core for the snake game server.
//!
//! Frames travel as protobuf over WebSocket binary messages. Before a session
//! is live the client must answer a server challenge with a wallet signature;
//! [`engine::ProtocolEngine`] drives that handshake and publishes the resulting
//! player state through [`app_state::ApplicationState`].

pub mod app_state;
pub mod balance;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod observable;
pub mod proto;
pub mod session_store;
pub mod signer;
pub mod transport;

#[cfg(test)]
mod tests;

pub const DEFAULT_SERVER_HOSTNAME: &str = "localhost";
pub const DEFAULT_SERVER_PORT: u16 = 8999;
pub const DEFAULT_SERVER_URL: &str =
    const_format::concatcp!("ws://", DEFAULT_SERVER_HOSTNAME, ":", DEFAULT_SERVER_PORT);

pub const DEFAULT_RPC_PORT: u16 = 7545;
pub const DEFAULT_RPC_URL: &str =
    const_format::concatcp!("http://", DEFAULT_SERVER_HOSTNAME, ":", DEFAULT_RPC_PORT);
