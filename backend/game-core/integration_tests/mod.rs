mod error;
mod helpers;
mod websocket;
