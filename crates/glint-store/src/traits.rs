//! The record-store collaborator interface consumed by the hub

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::records::{DeviceProfile, InstrumentRecord, NewInstrument};

/// Persistence operations the hub core calls out to.
///
/// Lookup misses are `Ok(None)`, not errors; the hub decides what a
/// miss means (auto-register on instrument connect, reject a command
/// on profile lookup).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch an instrument record by identifier.
    async fn find_instrument(&self, id: Uuid) -> Result<Option<InstrumentRecord>>;

    /// Create a new instrument record. Fails on a duplicate id.
    async fn create_instrument(&self, new: NewInstrument) -> Result<InstrumentRecord>;

    /// Fetch the device profile an instrument reports against.
    ///
    /// `Ok(None)` when the instrument is unknown, has no profile
    /// assigned, or the profile record is missing.
    async fn device_profile(&self, instrument_id: Uuid) -> Result<Option<DeviceProfile>>;

    /// Append one telemetry reading stamped with its receipt time.
    async fn append_telemetry(
        &self,
        instrument_id: Uuid,
        payload: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()>;

    /// Persist a presence transition and last-seen timestamp.
    async fn set_presence(
        &self,
        instrument_id: Uuid,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> Result<()>;
}
