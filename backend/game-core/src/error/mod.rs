pub mod balance;
pub mod codec;
pub mod config;
pub mod engine;
pub mod signer;
pub mod store;
pub mod transport;

pub use codec::{DecodeError, EncodeError, FieldViolation, SchemaError, ViolationReason};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Schema(#[from] codec::SchemaError),

    #[error(transparent)]
    Decode(#[from] codec::DecodeError),

    #[error(transparent)]
    Encode(#[from] codec::EncodeError),

    #[error(transparent)]
    Engine(#[from] engine::EngineError),

    #[error(transparent)]
    Transport(#[from] transport::TransportError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Signer(#[from] signer::SignerError),

    #[error(transparent)]
    Store(#[from] store::StoreError),

    #[error(transparent)]
    Balance(#[from] balance::BalanceError),

    #[error(transparent)]
    Model(#[from] models::ModelError),
}
