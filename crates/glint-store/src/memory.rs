//! In-memory record store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use glint_core::CommandSet;

use crate::error::{Result, StoreError};
use crate::records::{DeviceProfile, InstrumentRecord, NewInstrument, TelemetryEntry};
use crate::traits::RecordStore;

/// DashMap-backed store for the service binary and tests.
#[derive(Default)]
pub struct MemoryStore {
    instruments: DashMap<Uuid, InstrumentRecord>,
    profiles: DashMap<Uuid, DeviceProfile>,
    telemetry: Mutex<Vec<TelemetryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a device profile and return its id.
    pub fn insert_profile(
        &self,
        brand: &str,
        model: &str,
        category: &str,
        commands: Option<&CommandSet>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.profiles.insert(
            id,
            DeviceProfile {
                id,
                brand: brand.to_string(),
                model: model.to_string(),
                category: category.to_string(),
                commands: commands.map(CommandSet::to_delimited),
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Insert a profile whose `commands` column holds arbitrary text.
    /// Tests use this to model a corrupt profile row.
    pub fn insert_profile_raw(&self, commands: Option<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.profiles.insert(
            id,
            DeviceProfile {
                id,
                brand: "test".to_string(),
                model: "test".to_string(),
                category: "test".to_string(),
                commands,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Point an instrument at a profile, creating the record if needed.
    pub fn assign_profile(&self, instrument_id: Uuid, profile_id: Uuid) {
        let now = Utc::now();
        self.instruments
            .entry(instrument_id)
            .or_insert_with(|| NewInstrument::minimal(instrument_id, now).into_record(now))
            .profile = Some(profile_id);
    }

    /// Telemetry log for one instrument, oldest first, capped at `limit`.
    pub fn telemetry(&self, instrument_id: Uuid, limit: usize) -> Vec<TelemetryEntry> {
        self.telemetry
            .lock()
            .iter()
            .filter(|e| e.instrument_id == instrument_id)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_instrument(&self, id: Uuid) -> Result<Option<InstrumentRecord>> {
        Ok(self.instruments.get(&id).map(|r| r.clone()))
    }

    async fn create_instrument(&self, new: NewInstrument) -> Result<InstrumentRecord> {
        let id = new.id;
        if self.instruments.contains_key(&id) {
            return Err(StoreError::DuplicateInstrument(id));
        }
        let record = new.into_record(Utc::now());
        self.instruments.insert(id, record.clone());
        Ok(record)
    }

    async fn device_profile(&self, instrument_id: Uuid) -> Result<Option<DeviceProfile>> {
        let profile_id = match self.instruments.get(&instrument_id) {
            Some(record) => match record.profile {
                Some(profile_id) => profile_id,
                None => return Ok(None),
            },
            None => return Ok(None),
        };
        Ok(self.profiles.get(&profile_id).map(|p| p.clone()))
    }

    async fn append_telemetry(
        &self,
        instrument_id: Uuid,
        payload: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.telemetry.lock().push(TelemetryEntry {
            instrument_id,
            payload: payload.to_string(),
            timestamp,
        });
        Ok(())
    }

    async fn set_presence(
        &self,
        instrument_id: Uuid,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> Result<()> {
        match self.instruments.get_mut(&instrument_id) {
            Some(mut record) => {
                record.online = online;
                record.last_seen = Some(last_seen);
                Ok(())
            }
            None => Err(StoreError::InstrumentNotFound(instrument_id)),
        }
    }
}
