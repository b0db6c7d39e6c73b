//! Connection registry
//!
//! Two independent concurrent maps, one per role, from connection id
//! to its subscription key and sender. Lookups scan by key: multiple
//! simultaneous connections per key per role are permitted. The
//! registry holds only the sender half; connection lifetime belongs
//! to the connection's own task.

use std::sync::Arc;

use dashmap::DashMap;
use glint_core::Role;
use glint_transport::TransportSender;
use uuid::Uuid;

use crate::error::{HubError, Result};

/// Connection identifier, assigned at accept time
pub type ConnectionId = Uuid;

/// Cheap-to-clone reference to a connection's sender half.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: Arc<dyn TransportSender>,
}

impl ConnectionHandle {
    pub fn new(sender: Arc<dyn TransportSender>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub async fn send(&self, text: String) -> glint_transport::Result<()> {
        self.sender.send(text).await
    }

    pub async fn close(&self) -> glint_transport::Result<()> {
        self.sender.close().await
    }

    pub fn is_connected(&self) -> bool {
        self.sender.is_connected()
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .finish()
    }
}

struct Entry {
    key: Uuid,
    handle: ConnectionHandle,
}

/// Registry of live connections.
#[derive(Default)]
pub struct ConnectionRegistry {
    clients: DashMap<ConnectionId, Entry>,
    instruments: DashMap<ConnectionId, Entry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map_for(&self, role: Role) -> &DashMap<ConnectionId, Entry> {
        match role {
            Role::Client => &self.clients,
            Role::Instrument => &self.instruments,
        }
    }

    /// Register a connection under a role and subscription key.
    ///
    /// A handle may appear in at most one mapping; the role is fixed
    /// for the connection's lifetime.
    pub fn register(&self, handle: ConnectionHandle, role: Role, key: Uuid) -> Result<()> {
        let id = handle.id();
        if self.clients.contains_key(&id) || self.instruments.contains_key(&id) {
            return Err(HubError::DuplicateRegistration(id));
        }
        self.map_for(role).insert(id, Entry { key, handle });
        Ok(())
    }

    /// Remove a connection from whichever mapping contains it.
    ///
    /// Idempotent: removing an absent id is a no-op. Returns the role
    /// and key that were registered, if any.
    pub fn unregister(&self, id: ConnectionId) -> Option<(Role, Uuid)> {
        if let Some((_, entry)) = self.clients.remove(&id) {
            return Some((Role::Client, entry.key));
        }
        if let Some((_, entry)) = self.instruments.remove(&id) {
            return Some((Role::Instrument, entry.key));
        }
        None
    }

    /// Snapshot of the handles registered under `key` for `role`.
    ///
    /// Ordering is unspecified. The snapshot is taken under the map's
    /// short internal shard locks, so callers can send on the handles
    /// without holding up registration traffic.
    pub fn lookup(&self, key: Uuid, role: Role) -> Vec<ConnectionHandle> {
        self.map_for(role)
            .iter()
            .filter(|entry| entry.value().key == key)
            .map(|entry| entry.value().handle.clone())
            .collect()
    }

    /// Number of live connections for a role.
    pub fn count(&self, role: Role) -> usize {
        self.map_for(role).len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty() && self.instruments.is_empty()
    }
}
