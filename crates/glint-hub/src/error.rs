//! Hub error types

use thiserror::Error;

use crate::registry::ConnectionId;

pub type Result<T> = std::result::Result<T, HubError>;

#[derive(Error, Debug)]
pub enum HubError {
    /// Connection handle already present in the registry.
    ///
    /// Should not occur under connect-once-per-socket discipline;
    /// treated as a logic error fatal to that connection attempt.
    #[error("connection {0} already registered")]
    DuplicateRegistration(ConnectionId),

    #[error("protocol error: {0}")]
    Protocol(#[from] glint_core::Error),

    #[error("transport error: {0}")]
    Transport(#[from] glint_transport::TransportError),

    #[error("store error: {0}")]
    Store(#[from] glint_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}
