//! GLINT Hub
//!
//! The routing hub between measurement instruments and the clients
//! that observe and control them:
//! - Tracks every live connection by role and instrument id
//!   ([`ConnectionRegistry`])
//! - Fans messages out to matching connections ([`Hub::broadcast`])
//! - Validates client commands against the target's device profile
//!   ([`CommandValidator`])
//! - Derives and persists online/offline presence
//!   ([`PresenceTracker`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use glint_hub::{Hub, HubConfig};
//! use glint_store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = Hub::new(HubConfig::default(), Arc::new(MemoryStore::new()));
//!     hub.serve("0.0.0.0:9030").await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod hub;
pub mod presence;
pub mod registry;
pub mod validate;

pub use config::HubConfig;
pub use error::{HubError, Result};
pub use hub::Hub;
pub use presence::PresenceTracker;
pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry};
pub use validate::CommandValidator;
