//! Main hub implementation
//!
//! One task per live connection, each running a receive loop. A
//! client connection forwards validated commands toward the
//! instrument; an instrument connection fans telemetry out to the
//! subscribed clients and drives presence. Any non-data event in a
//! receive loop funnels into a single teardown path: registry
//! removal plus, for instruments, the offline presence transition.

use std::sync::Arc;

use chrono::Utc;
use glint_core::{
    codec, parse_endpoint_path, Role, REJECTION_UNKNOWN_COMMAND, STATUS_OFFLINE, STATUS_ONLINE,
};
use glint_store::RecordStore;
use glint_transport::{
    TransportEvent, TransportReceiver, TransportSender, TransportServer, WebSocketServer,
};
use parking_lot::RwLock;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    config::HubConfig,
    error::Result,
    presence::PresenceTracker,
    registry::{ConnectionHandle, ConnectionRegistry},
    validate::CommandValidator,
};

/// GLINT routing hub
pub struct Hub {
    config: HubConfig,
    registry: Arc<ConnectionRegistry>,
    presence: Arc<PresenceTracker>,
    validator: Arc<CommandValidator>,
    store: Arc<dyn RecordStore>,
    running: Arc<RwLock<bool>>,
}

impl Hub {
    pub fn new(config: HubConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config,
            registry: Arc::new(ConnectionRegistry::new()),
            presence: Arc::new(PresenceTracker::new(store.clone())),
            validator: Arc::new(CommandValidator::new(store.clone())),
            store,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Start the hub on a WebSocket listener.
    pub async fn serve(&self, addr: &str) -> Result<()> {
        let server = WebSocketServer::bind(addr).await?;
        info!("{} listening on {}", self.config.name, addr);
        self.serve_on(server).await
    }

    /// Serve using any `TransportServer` implementation.
    pub async fn serve_on<S>(&self, mut server: S) -> Result<()>
    where
        S: TransportServer + 'static,
        S::Sender: 'static,
        S::Receiver: 'static,
    {
        info!("Hub accepting connections");
        *self.running.write() = true;

        while *self.running.read() {
            match server.accept().await {
                Ok((sender, receiver, addr, path)) => match parse_endpoint_path(&path) {
                    Ok((role, key)) => {
                        info!("New {} connection for {} from {}", role, key, addr);
                        self.handle_connection(Arc::new(sender), receiver, role, key);
                    }
                    Err(e) => {
                        warn!("Rejecting connection from {}: {}", addr, e);
                        let _ = sender.close().await;
                    }
                },
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Stop the hub
    pub fn stop(&self) {
        *self.running.write() = false;
    }

    /// Number of live connections for a role
    pub fn connection_count(&self, role: Role) -> usize {
        self.registry.count(role)
    }

    /// The connection registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Send `message` to every connection registered under `key` for
    /// `role`, as of call time.
    ///
    /// Best-effort and independent per recipient: a failed or stalled
    /// send is logged and that connection is dropped from the registry
    /// as if it had disconnected; it never aborts the fan-out. The
    /// recipient set is snapshotted first, so no registry lock is held
    /// across the sends.
    pub async fn broadcast(&self, key: Uuid, role: Role, message: &str) {
        let targets = self.registry.lookup(key, role);

        for handle in targets {
            let send = handle.send(message.to_string());
            match timeout(self.config.send_stall_timeout, send).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Dropping {} connection {}: send failed: {}", role, handle.id(), e);
                    self.registry.unregister(handle.id());
                }
                Err(_) => {
                    warn!("Dropping {} connection {}: send stalled", role, handle.id());
                    self.registry.unregister(handle.id());
                }
            }
        }
    }

    /// Internal clone for spawning connection tasks.
    /// Shares all Arc state with the original.
    fn clone_internal(&self) -> Self {
        Self {
            config: self.config.clone(),
            registry: Arc::clone(&self.registry),
            presence: Arc::clone(&self.presence),
            validator: Arc::clone(&self.validator),
            store: Arc::clone(&self.store),
            running: Arc::clone(&self.running),
        }
    }

    /// Spawn the receive loop for one accepted connection.
    fn handle_connection(
        &self,
        sender: Arc<dyn TransportSender>,
        mut receiver: impl TransportReceiver + 'static,
        role: Role,
        key: Uuid,
    ) {
        let hub = self.clone_internal();

        tokio::spawn(async move {
            let handle = ConnectionHandle::new(sender);
            let id = handle.id();

            if let Err(e) = hub.registry.register(handle.clone(), role, key) {
                error!("Registration failed for {} {}: {}", role, key, e);
                let _ = handle.close().await;
                return;
            }

            match role {
                Role::Client => hub.run_client(&mut receiver, key).await,
                Role::Instrument => hub.run_instrument(&mut receiver, key).await,
            }

            // Single teardown path, whatever ended the loop
            hub.registry.unregister(id);

            if role == Role::Instrument
                && hub.registry.lookup(key, Role::Instrument).is_empty()
            {
                if let Err(e) = hub.presence.mark_offline(key).await {
                    error!("Presence offline update failed for {}: {}", key, e);
                }
                hub.broadcast(key, Role::Client, STATUS_OFFLINE).await;
                info!("Instrument {} offline", key);
            }
        });
    }

    /// Client receive loop: each text frame is a raw command.
    async fn run_client(&self, receiver: &mut impl TransportReceiver, key: Uuid) {
        while *self.running.read() {
            match receiver.recv().await {
                Some(TransportEvent::Data(command)) => {
                    self.route_command(key, &command).await;
                }
                Some(TransportEvent::Connected) => {}
                Some(TransportEvent::Disconnected { reason }) => {
                    info!("Client for {} disconnected: {:?}", key, reason);
                    break;
                }
                Some(TransportEvent::Error(e)) => {
                    error!("Client transport error for {}: {}", key, e);
                    break;
                }
                None => break,
            }
        }
    }

    /// Validate a client command and forward or reject it.
    async fn route_command(&self, key: Uuid, command: &str) {
        let valid = match self.validator.validate(command, key).await {
            Ok(valid) => valid,
            Err(e) => {
                warn!("Command validation error for {}: {}", key, e);
                false
            }
        };

        if valid {
            debug!("Forwarding command to {}: {}", key, command);
            self.broadcast(key, Role::Instrument, command).await;
        } else {
            debug!("Rejecting command for {}: {}", key, command);
            self.broadcast(key, Role::Client, REJECTION_UNKNOWN_COMMAND)
                .await;
        }
    }

    /// Instrument receive loop: presence online, then telemetry until
    /// the connection ends. A decode or store failure is fatal to the
    /// connection; recovery in place is not attempted.
    async fn run_instrument(&self, receiver: &mut impl TransportReceiver, key: Uuid) {
        if let Err(e) = self.presence.mark_online(key).await {
            error!("Presence online update failed for {}: {}", key, e);
            return;
        }
        self.broadcast(key, Role::Client, STATUS_ONLINE).await;
        info!("Instrument {} online", key);

        while *self.running.read() {
            match receiver.recv().await {
                Some(TransportEvent::Data(text)) => {
                    let envelope = match codec::decode_telemetry(&text) {
                        Ok(envelope) => envelope,
                        Err(e) => {
                            warn!("Bad telemetry from {}: {}", key, e);
                            break;
                        }
                    };

                    let reading = envelope.data.to_string();
                    self.broadcast(key, Role::Client, &reading).await;

                    if let Err(e) = self
                        .store
                        .append_telemetry(key, &reading, Utc::now())
                        .await
                    {
                        error!("Telemetry log write failed for {}: {}", key, e);
                        break;
                    }
                }
                Some(TransportEvent::Connected) => {}
                Some(TransportEvent::Disconnected { reason }) => {
                    info!("Instrument {} disconnected: {:?}", key, reason);
                    break;
                }
                Some(TransportEvent::Error(e)) => {
                    error!("Instrument transport error for {}: {}", key, e);
                    break;
                }
                None => break,
            }
        }
    }
}
