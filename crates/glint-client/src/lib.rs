//! GLINT client library
//!
//! Connectors for the hub's two duplex endpoints:
//! - [`ClientLink`] observes one instrument's stream and sends it
//!   commands (`/ws/client/{id}`)
//! - [`InstrumentLink`] reports readings and receives forwarded
//!   commands (`/ws/instrument/{id}`)
//!
//! # Example
//!
//! ```no_run
//! use glint_client::ClientLink;
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), glint_client::ClientError> {
//! let mut link = ClientLink::connect("ws://127.0.0.1:9030", Uuid::new_v4()).await?;
//! link.send_command("tare").await?;
//! while let Some(text) = link.next_message().await {
//!     println!("{}", text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod link;

pub use error::{ClientError, Result};
pub use link::{ClientLink, InstrumentLink};
