//! Record types held by the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Completed the management-plane registration flow
    pub registered: bool,
    pub enabled: bool,
    pub online: bool,
    pub group: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    /// Device profile this instrument reports against
    pub profile: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating an instrument record.
///
/// `minimal` is what the hub auto-registers on first contact with an
/// unknown identifier: a placeholder name, not yet registered or
/// enabled, offline, no profile.
#[derive(Debug, Clone)]
pub struct NewInstrument {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub group: Option<String>,
    pub profile: Option<Uuid>,
}

impl NewInstrument {
    pub fn minimal(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: Some(format!("New Instrument {}", now.format("%Y-%m-%d %H:%M:%S"))),
            description: None,
            group: None,
            profile: None,
        }
    }

    pub fn into_record(self, now: DateTime<Utc>) -> InstrumentRecord {
        InstrumentRecord {
            id: self.id,
            name: self.name,
            description: self.description,
            registered: false,
            enabled: false,
            online: false,
            group: self.group,
            last_seen: None,
            profile: self.profile,
            created_at: now,
        }
    }
}

/// The declared capabilities of an instrument model.
///
/// `commands` holds the delimited `command:description;...` encoding;
/// `None` or empty means the model permits no commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub category: String,
    pub commands: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One persisted telemetry reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEntry {
    pub instrument_id: Uuid,
    pub payload: String,
    pub timestamp: DateTime<Utc>,
}
