//! Presence tracking
//!
//! Derives online/offline transitions for an instrument id and
//! persists them through the record store. The store is also the
//! source of "does this instrument exist" truth on first contact:
//! an unknown id is auto-registered with a minimal record before it
//! is flipped online.

use std::sync::Arc;

use chrono::Utc;
use glint_store::{NewInstrument, RecordStore, StoreError};
use tracing::info;
use uuid::Uuid;

use crate::error::Result;

pub struct PresenceTracker {
    store: Arc<dyn RecordStore>,
}

impl PresenceTracker {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Flip an instrument online, auto-registering it on first contact.
    pub async fn mark_online(&self, id: Uuid) -> Result<()> {
        let now = Utc::now();

        if self.store.find_instrument(id).await?.is_none() {
            match self
                .store
                .create_instrument(NewInstrument::minimal(id, now))
                .await
            {
                Ok(_) => info!("Auto-registered new instrument {}", id),
                // lost a create race with a concurrent connection
                Err(StoreError::DuplicateInstrument(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.store.set_presence(id, true, now).await?;
        Ok(())
    }

    /// Flip an instrument offline.
    ///
    /// Resolves purely by id: teardown may run before the connect
    /// path finished, so no in-memory record reference is assumed.
    pub async fn mark_offline(&self, id: Uuid) -> Result<()> {
        self.store.set_presence(id, false, Utc::now()).await?;
        Ok(())
    }
}
