//! Service configuration file
//!
//! Optional TOML file seeding the in-memory store:
//!
//! ```toml
//! bind = "0.0.0.0"
//! port = 9030
//!
//! [[profile]]
//! brand = "Saturius"
//! model = "EB6DCE-L"
//! category = "scale"
//! instruments = ["0b290bd0-2d51-47f5-b6dd-01a0f82fcbb2"]
//!
//! [profile.commands]
//! tare = "Zero the scale"
//! print = "Print a ticket"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use glint_core::CommandSet;
use glint_store::MemoryStore;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    #[serde(default, rename = "profile")]
    pub profiles: Vec<ProfileConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub brand: String,
    pub model: String,
    pub category: String,
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
    /// Instruments reporting against this profile
    #[serde(default)]
    pub instruments: Vec<Uuid>,
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).context("invalid config file")
    }

    /// Seed the store with the configured profiles and assignments.
    pub fn seed(&self, store: &MemoryStore) -> Result<()> {
        for profile in &self.profiles {
            let commands: CommandSet = profile
                .commands
                .iter()
                .map(|(c, d)| (c.clone(), d.clone()))
                .collect();
            let commands = (!commands.is_empty()).then_some(commands);

            let profile_id = store.insert_profile(
                &profile.brand,
                &profile.model,
                &profile.category,
                commands.as_ref(),
            );

            for instrument in &profile.instruments {
                store.assign_profile(*instrument, profile_id);
            }
        }
        Ok(())
    }
}
