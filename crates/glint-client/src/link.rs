//! Hub endpoint connectors

use glint_core::{codec, Role, Scalar, TelemetryEnvelope};
use glint_transport::{
    Transport, TransportEvent, TransportReceiver, TransportSender, WebSocketTransport,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

fn endpoint_url(base_url: &str, role: Role, instrument_id: Uuid) -> String {
    format!(
        "{}/ws/{}/{}",
        base_url.trim_end_matches('/'),
        role.path_segment(),
        instrument_id
    )
}

async fn next_text(
    receiver: &mut glint_transport::websocket::WebSocketReceiver,
) -> Option<String> {
    loop {
        match receiver.recv().await? {
            TransportEvent::Data(text) => return Some(text),
            TransportEvent::Connected => continue,
            TransportEvent::Disconnected { reason } => {
                debug!("Link disconnected: {:?}", reason);
                return None;
            }
            TransportEvent::Error(e) => {
                debug!("Link transport error: {}", e);
                return None;
            }
        }
    }
}

/// A consumer connection observing and controlling one instrument.
pub struct ClientLink {
    instrument_id: Uuid,
    sender: glint_transport::websocket::WebSocketSender,
    receiver: glint_transport::websocket::WebSocketReceiver,
}

impl ClientLink {
    /// Connect to the hub's client endpoint for `instrument_id`.
    pub async fn connect(base_url: &str, instrument_id: Uuid) -> Result<Self> {
        let url = endpoint_url(base_url, Role::Client, instrument_id);
        let (sender, receiver) = WebSocketTransport::connect(&url).await?;
        Ok(Self {
            instrument_id,
            sender,
            receiver,
        })
    }

    pub fn instrument_id(&self) -> Uuid {
        self.instrument_id
    }

    /// Send a raw text command toward the instrument.
    pub async fn send_command(&self, command: &str) -> Result<()> {
        self.sender.send(command.to_string()).await?;
        Ok(())
    }

    /// Next text message from the hub: a forwarded reading, a status
    /// literal (`online`/`offline`), or a command rejection.
    /// `None` once the connection is gone.
    pub async fn next_message(&mut self) -> Option<String> {
        next_text(&mut self.receiver).await
    }

    pub async fn close(&self) -> Result<()> {
        self.sender.close().await?;
        Ok(())
    }
}

/// An instrument-side connection reporting readings to the hub.
pub struct InstrumentLink {
    instrument_id: Uuid,
    sender: glint_transport::websocket::WebSocketSender,
    receiver: glint_transport::websocket::WebSocketReceiver,
}

impl InstrumentLink {
    /// Connect to the hub's instrument endpoint for `instrument_id`.
    ///
    /// First contact with an unknown id makes the hub auto-register
    /// the instrument before routing begins.
    pub async fn connect(base_url: &str, instrument_id: Uuid) -> Result<Self> {
        let url = endpoint_url(base_url, Role::Instrument, instrument_id);
        let (sender, receiver) = WebSocketTransport::connect(&url).await?;
        Ok(Self {
            instrument_id,
            sender,
            receiver,
        })
    }

    pub fn instrument_id(&self) -> Uuid {
        self.instrument_id
    }

    /// Report one reading, wrapped in the telemetry envelope.
    pub async fn send_reading(&self, reading: impl Into<Scalar>) -> Result<()> {
        let text = codec::encode_telemetry(&TelemetryEnvelope::new(reading))?;
        self.sender.send(text).await?;
        Ok(())
    }

    /// Send a raw text frame. Tests use this to exercise the hub's
    /// handling of malformed telemetry.
    pub async fn send_raw(&self, text: &str) -> Result<()> {
        self.sender.send(text.to_string()).await?;
        Ok(())
    }

    /// Next command forwarded from a client, or `None` once the
    /// connection is gone.
    pub async fn next_command(&mut self) -> Option<String> {
        next_text(&mut self.receiver).await
    }

    pub async fn close(&self) -> Result<()> {
        self.sender.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls() {
        let id = Uuid::nil();
        assert_eq!(
            endpoint_url("ws://127.0.0.1:9030", Role::Client, id),
            format!("ws://127.0.0.1:9030/ws/client/{}", id)
        );
        assert_eq!(
            endpoint_url("ws://127.0.0.1:9030/", Role::Instrument, id),
            format!("ws://127.0.0.1:9030/ws/instrument/{}", id)
        );
    }
}
