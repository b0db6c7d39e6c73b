//! Command validation
//!
//! Two tiers: the locate-device grammar is accepted unconditionally
//! (the blink/identify feature is common to all hardware regardless
//! of declared capability); everything else must exactly match a key
//! in the target's device-profile command set.

use std::sync::Arc;

use glint_core::{CommandSet, LocateCommand};
use glint_store::RecordStore;
use uuid::Uuid;

use crate::error::Result;

pub struct CommandValidator {
    store: Arc<dyn RecordStore>,
}

impl CommandValidator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Decide whether `command` is legal for `instrument`.
    ///
    /// `Ok(false)` covers the no-profile, no-commands, and
    /// not-in-set cases. `Err` means the stored command set failed to
    /// parse; the caller rejects the command either way, but a corrupt
    /// profile is surfaced rather than silently treated as empty.
    pub async fn validate(&self, command: &str, instrument: Uuid) -> Result<bool> {
        if LocateCommand::parse(command).is_some() {
            return Ok(true);
        }

        let profile = self.store.device_profile(instrument).await?;
        let encoded = match profile.and_then(|p| p.commands) {
            Some(encoded) if !encoded.is_empty() => encoded,
            // absent profile or empty command set: nothing permitted
            _ => return Ok(false),
        };

        let commands = CommandSet::parse(&encoded)?;
        Ok(commands.contains(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_store::MemoryStore;

    fn store_with_commands(commands: Option<&str>) -> (Arc<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let instrument = Uuid::new_v4();
        let profile = store.insert_profile_raw(commands.map(String::from));
        store.assign_profile(instrument, profile);
        (store, instrument)
    }

    #[tokio::test]
    async fn profile_command_is_accepted() {
        let (store, instrument) = store_with_commands(Some("tare:Zero;print:Ticket"));
        let validator = CommandValidator::new(store);

        assert!(validator.validate("tare", instrument).await.unwrap());
        assert!(validator.validate("print", instrument).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_command_is_rejected() {
        let (store, instrument) = store_with_commands(Some("tare:Zero"));
        let validator = CommandValidator::new(store);

        assert!(!validator.validate("calibrate", instrument).await.unwrap());
        assert!(!validator.validate("TARE", instrument).await.unwrap());
        assert!(!validator.validate("tar", instrument).await.unwrap());
    }

    #[tokio::test]
    async fn no_profile_rejects_everything() {
        let store = Arc::new(MemoryStore::new());
        let validator = CommandValidator::new(store);

        assert!(!validator.validate("tare", Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn empty_command_set_rejects_everything() {
        let (store, instrument) = store_with_commands(None);
        let validator = CommandValidator::new(store);
        assert!(!validator.validate("tare", instrument).await.unwrap());

        let (store, instrument) = store_with_commands(Some(""));
        let validator = CommandValidator::new(store);
        assert!(!validator.validate("tare", instrument).await.unwrap());
    }

    #[tokio::test]
    async fn locate_commands_bypass_the_profile() {
        let (store, instrument) = store_with_commands(None);
        let validator = CommandValidator::new(store);

        assert!(validator
            .validate("find_my_instrument_red_2.5_3", instrument)
            .await
            .unwrap());
        assert!(validator
            .validate("find_my_instrument_green_1_10", Uuid::new_v4())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn malformed_command_set_is_a_hard_error() {
        let (store, instrument) = store_with_commands(Some("tare:Zero;corrupt"));
        let validator = CommandValidator::new(store);

        assert!(validator.validate("tare", instrument).await.is_err());
    }
}
