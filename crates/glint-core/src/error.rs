//! Error types for GLINT core

use thiserror::Error;

/// Result type alias for GLINT core operations
pub type Result<T> = std::result::Result<T, Error>;

/// GLINT protocol error types
#[derive(Error, Debug)]
pub enum Error {
    /// Telemetry envelope decode failure
    #[error("telemetry decode error: {0}")]
    DecodeError(String),

    /// Telemetry envelope encode failure
    #[error("telemetry encode error: {0}")]
    EncodeError(String),

    /// Unknown connection role segment
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Endpoint path does not match `/ws/{role}/{instrument-id}`
    #[error("invalid endpoint path: {0}")]
    InvalidEndpointPath(String),

    /// Instrument identifier is not UUID-shaped
    #[error("invalid instrument id: {0}")]
    InvalidInstrumentId(String),

    /// Command-set entry without a `:` separator
    #[error("malformed command set entry: {0:?}")]
    MalformedCommandSet(String),
}
