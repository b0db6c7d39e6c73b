//! GLINT transport layer
//!
//! Duplex text-frame connections for the instrument hub. The hub is
//! written against the traits in [`traits`]; the WebSocket
//! implementation in [`websocket`] is the one transport GLINT ships.

pub mod error;
pub mod traits;
pub mod websocket;

pub use error::{Result, TransportError};
pub use traits::{
    Transport, TransportEvent, TransportReceiver, TransportSender, TransportServer,
};
pub use websocket::{WebSocketServer, WebSocketTransport};
