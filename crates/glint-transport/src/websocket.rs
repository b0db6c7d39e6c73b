//! WebSocket transport implementation

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        handshake::server::{Request as HsRequest, Response as HsResponse},
        protocol::Message as WsMessage,
    },
};
use tracing::{debug, error, info};

use crate::error::{Result, TransportError};
use crate::traits::{
    Transport, TransportEvent, TransportReceiver, TransportSender, TransportServer,
};

/// Outbound channel capacity per connection.
///
/// Bounded so one stalled peer cannot buffer unbounded telemetry; the
/// hub applies a stall timeout on top when fanning out.
const CHANNEL_CAPACITY: usize = 100;

/// WebSocket sender half
pub struct WebSocketSender {
    tx: mpsc::Sender<WsMessage>,
    connected: Arc<Mutex<bool>>,
}

#[async_trait]
impl TransportSender for WebSocketSender {
    async fn send(&self, text: String) -> Result<()> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        self.tx
            .send(WsMessage::Text(text))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    fn is_connected(&self) -> bool {
        *self.connected.lock()
    }

    async fn close(&self) -> Result<()> {
        let _ = self.tx.send(WsMessage::Close(None)).await;
        *self.connected.lock() = false;
        Ok(())
    }
}

/// WebSocket receiver half
pub struct WebSocketReceiver {
    rx: mpsc::Receiver<TransportEvent>,
}

#[async_trait]
impl TransportReceiver for WebSocketReceiver {
    async fn recv(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }
}

/// Split a connected WebSocket stream into sender/receiver halves.
///
/// Spawns a writer task fed by a bounded channel (FIFO per peer) and a
/// reader task converting tungstenite frames into `TransportEvent`s.
fn spawn_io<S>(ws_stream: tokio_tungstenite::WebSocketStream<S>) -> (WebSocketSender, WebSocketReceiver)
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let (write, read) = ws_stream.split();

    let (send_tx, mut send_rx) = mpsc::channel::<WsMessage>(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(CHANNEL_CAPACITY);

    let connected = Arc::new(Mutex::new(true));
    let connected_write = connected.clone();
    let connected_read = connected.clone();

    tokio::spawn(async move {
        let mut write = write;
        while let Some(msg) = send_rx.recv().await {
            let closing = matches!(msg, WsMessage::Close(_));
            if let Err(e) = write.send(msg).await {
                error!("WebSocket write error: {}", e);
                break;
            }
            if closing {
                break;
            }
        }
        *connected_write.lock() = false;
    });

    tokio::spawn(async move {
        let mut read = read;

        let _ = event_tx.send(TransportEvent::Connected).await;

        while let Some(result) = read.next().await {
            match result {
                Ok(msg) => match msg {
                    WsMessage::Text(text) => {
                        let _ = event_tx.send(TransportEvent::Data(text)).await;
                    }
                    WsMessage::Binary(data) => {
                        // GLINT is a text protocol; tolerate binary frames
                        let text = String::from_utf8_lossy(&data).into_owned();
                        let _ = event_tx.send(TransportEvent::Data(text)).await;
                    }
                    WsMessage::Close(frame) => {
                        let reason = frame.map(|f| f.reason.to_string());
                        let _ = event_tx
                            .send(TransportEvent::Disconnected { reason })
                            .await;
                        break;
                    }
                    // Ping/pong handled by tungstenite
                    _ => {}
                },
                Err(e) => {
                    let _ = event_tx.send(TransportEvent::Error(e.to_string())).await;
                    let _ = event_tx
                        .send(TransportEvent::Disconnected {
                            reason: Some(e.to_string()),
                        })
                        .await;
                    break;
                }
            }
        }

        *connected_read.lock() = false;
    });

    (
        WebSocketSender {
            tx: send_tx,
            connected,
        },
        WebSocketReceiver { rx: event_rx },
    )
}

/// Client-side WebSocket transport
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    type Sender = WebSocketSender;
    type Receiver = WebSocketReceiver;

    async fn connect(url: &str) -> Result<(Self::Sender, Self::Receiver)> {
        info!("Connecting to {}", url);

        let (ws_stream, response) = connect_async(url)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        debug!("WebSocket connected, response: {:?}", response.status());

        Ok(spawn_io(ws_stream))
    }
}

/// WebSocket server
pub struct WebSocketServer {
    listener: tokio::net::TcpListener,
}

impl WebSocketServer {
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        info!("WebSocket server listening on {}", addr);

        Ok(Self { listener })
    }
}

#[async_trait]
impl TransportServer for WebSocketServer {
    type Sender = WebSocketSender;
    type Receiver = WebSocketReceiver;

    async fn accept(&mut self) -> Result<(Self::Sender, Self::Receiver, SocketAddr, String)> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        debug!("Accepted TCP connection from {}", addr);

        // Capture the request path during the upgrade; endpoint role
        // and instrument id are addressed by path.
        let mut path = String::new();
        let ws_stream = tokio_tungstenite::accept_hdr_async(
            stream,
            |req: &HsRequest, response: HsResponse| {
                path = req.uri().path().to_string();
                Ok(response)
            },
        )
        .await
        .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        info!("WebSocket client connected from {} ({})", addr, path);

        let (sender, receiver) = spawn_io(ws_stream);
        Ok((sender, receiver, addr, path))
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(TransportError::Io)
    }

    async fn close(&self) -> Result<()> {
        // TCP listener doesn't need explicit close
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accept_yields_request_path() {
        let mut server = WebSocketServer::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        let client = tokio::spawn(async move {
            WebSocketTransport::connect(&format!(
                "ws://127.0.0.1:{}/ws/client/00000000-0000-0000-0000-000000000001",
                port
            ))
            .await
            .unwrap()
        });

        let (_sender, _receiver, _addr, path) = server.accept().await.unwrap();
        assert_eq!(path, "/ws/client/00000000-0000-0000-0000-000000000001");

        client.await.unwrap();
    }

    #[tokio::test]
    async fn text_frames_round_trip() {
        let mut server = WebSocketServer::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        let client = tokio::spawn(async move {
            WebSocketTransport::connect(&format!("ws://127.0.0.1:{}/ws/echo/x", port))
                .await
                .unwrap()
        });

        let (server_tx, mut server_rx, _addr, _path) = server.accept().await.unwrap();
        let (client_tx, mut client_rx) = client.await.unwrap();

        client_tx.send("tare".to_string()).await.unwrap();
        loop {
            match server_rx.recv().await.unwrap() {
                TransportEvent::Data(text) => {
                    assert_eq!(text, "tare");
                    break;
                }
                TransportEvent::Connected => continue,
                other => panic!("unexpected event: {:?}", other),
            }
        }

        server_tx.send("online".to_string()).await.unwrap();
        loop {
            match client_rx.recv().await.unwrap() {
                TransportEvent::Data(text) => {
                    assert_eq!(text, "online");
                    break;
                }
                TransportEvent::Connected => continue,
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn close_surfaces_disconnect() {
        let mut server = WebSocketServer::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        let client = tokio::spawn(async move {
            WebSocketTransport::connect(&format!("ws://127.0.0.1:{}/ws/x/y", port))
                .await
                .unwrap()
        });

        let (_server_tx, mut server_rx, _addr, _path) = server.accept().await.unwrap();
        let (client_tx, _client_rx) = client.await.unwrap();

        client_tx.close().await.unwrap();

        loop {
            match server_rx.recv().await {
                Some(TransportEvent::Disconnected { .. }) | None => break,
                Some(_) => continue,
            }
        }
    }
}
