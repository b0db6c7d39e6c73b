//! Common test helpers for GLINT tests
//!
//! - Condition-based waiting (no hardcoded sleeps)
//! - RAII test hub with proper cleanup
//! - Seeded in-memory store access

use std::sync::Arc;
use std::time::{Duration, Instant};

use glint_client::{ClientError, ClientLink, InstrumentLink};
use glint_core::CommandSet;
use glint_hub::{Hub, HubConfig};
use glint_store::MemoryStore;
use uuid::Uuid;

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default condition check interval
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Find an available TCP port for testing
pub async fn find_available_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Wait for a condition with timeout - condition-based, not time-based
pub async fn wait_for<F, Fut>(check: F, interval: Duration, max_wait: Duration) -> bool
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    while start.elapsed() < max_wait {
        if check().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

/// A test hub that automatically cleans up on drop
pub struct TestHub {
    port: u16,
    store: Arc<MemoryStore>,
    hub: Arc<Hub>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestHub {
    /// Start a test hub on an ephemeral port with a fresh store.
    pub async fn start() -> Self {
        Self::start_with_config(HubConfig {
            name: "Test Hub".to_string(),
            send_stall_timeout: Duration::from_secs(2),
        })
        .await
    }

    /// Start a test hub with custom configuration
    pub async fn start_with_config(config: HubConfig) -> Self {
        let port = find_available_port().await;
        let addr = format!("127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let hub = Arc::new(Hub::new(config, store.clone()));

        let handle = {
            let hub = hub.clone();
            tokio::spawn(async move {
                let _ = hub.serve(&addr).await;
            })
        };

        // Wait for the listener to come up
        let ready = wait_for(
            || async move {
                tokio::net::TcpStream::connect(format!("127.0.0.1:{}", port))
                    .await
                    .is_ok()
            },
            DEFAULT_CHECK_INTERVAL,
            Duration::from_secs(5),
        )
        .await;
        assert!(ready, "test hub did not start listening");

        Self {
            port,
            store,
            hub,
            handle: Some(handle),
        }
    }

    /// WebSocket base URL for this hub
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The hub's backing store, for seeding profiles and inspecting
    /// presence/telemetry writes.
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Seed a device profile and point `instrument_id` at it.
    pub fn seed_profile(&self, instrument_id: Uuid, commands: &[(&str, &str)]) {
        let set: CommandSet = commands
            .iter()
            .map(|(c, d)| (c.to_string(), d.to_string()))
            .collect();
        let profile = self
            .store
            .insert_profile("Test", "T-1000", "scale", Some(&set));
        self.store.assign_profile(instrument_id, profile);
    }

    /// Connect a client link for `instrument_id`
    pub async fn connect_client(
        &self,
        instrument_id: Uuid,
    ) -> Result<ClientLink, ClientError> {
        ClientLink::connect(&self.url(), instrument_id).await
    }

    /// Connect an instrument link for `instrument_id`
    pub async fn connect_instrument(
        &self,
        instrument_id: Uuid,
    ) -> Result<InstrumentLink, ClientError> {
        InstrumentLink::connect(&self.url(), instrument_id).await
    }

    /// Stop the hub explicitly (also happens on drop)
    pub fn stop(&mut self) {
        self.hub.stop();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TestHub {
    fn drop(&mut self) {
        self.stop();
    }
}
