//! GLINT Core
//!
//! Core types and wire encoding for the GLINT instrument hub.
//! Gauge Link for Instrument Telemetry.
//!
//! This crate provides:
//! - Connection roles and endpoint addressing ([`Role`], [`parse_endpoint_path`])
//! - The telemetry wire envelope ([`TelemetryEnvelope`], [`codec`])
//! - Device-profile command sets and the locate-device grammar
//!   ([`CommandSet`], [`LocateCommand`])

pub mod codec;
pub mod commands;
pub mod error;
pub mod types;

pub use commands::{CommandSet, LocateColor, LocateCommand};
pub use error::{Error, Result};
pub use types::{parse_endpoint_path, Role, Scalar, TelemetryEnvelope};

/// Default hub WebSocket port
pub const DEFAULT_WS_PORT: u16 = 9030;

/// Endpoint path prefix for hub connections (`/ws/{role}/{instrument-id}`)
pub const WS_PATH_PREFIX: &str = "/ws";

/// Status literal broadcast to clients when an instrument comes online
pub const STATUS_ONLINE: &str = "online";

/// Status literal broadcast to clients when an instrument goes offline
pub const STATUS_OFFLINE: &str = "offline";

/// Rejection text sent to clients when a command fails validation
pub const REJECTION_UNKNOWN_COMMAND: &str = "Error: unknown command";
