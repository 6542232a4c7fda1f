//! Stable per-client player identity.

use super::{errors::IdentityResult, storage::KeyValueStorage};
use crate::player::PlayerId;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Storage key of the persisted player id.
pub const PLAYER_ID_KEY: &str = "playerId";
/// Storage key of the persisted display name.
pub const PLAYER_NAME_KEY: &str = "playerUsername";

/// Snapshot of the local identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: PlayerId,
    pub name: String,
}

/// Hands out the local player id and name, persisting them on change.
#[derive(Clone)]
pub struct IdentityProvider {
    storage: Arc<dyn KeyValueStorage>,
}

impl IdentityProvider {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Returns the persisted id, generating and persisting one on first use.
    ///
    /// A stored value that is not a UUID is replaced. If the new id cannot be
    /// persisted it is still returned; the next call will generate another.
    pub fn get_or_create_id(&self) -> PlayerId {
        if let Some(id) = self
            .storage
            .get(PLAYER_ID_KEY)
            .and_then(|raw| Uuid::parse_str(&raw).ok())
        {
            return id;
        }

        let id = Uuid::new_v4();
        debug!("Generated player id {}", id);
        if let Err(e) = self.storage.set(PLAYER_ID_KEY, &id.to_string()) {
            warn!("Failed to persist player id: {}", e);
        }
        id
    }

    pub fn set_id(&self, id: PlayerId) -> IdentityResult<()> {
        self.storage.set(PLAYER_ID_KEY, &id.to_string())
    }

    /// Persisted display name, empty when none was chosen yet.
    pub fn name(&self) -> String {
        self.storage.get(PLAYER_NAME_KEY).unwrap_or_default()
    }

    /// Trims and persists the display name, returning what was stored.
    pub fn set_name(&self, name: &str) -> IdentityResult<String> {
        let name = name.trim().to_string();
        self.storage.set(PLAYER_NAME_KEY, &name)?;
        Ok(name)
    }

    /// Replaces both id and name, e.g. when rejoining as an earlier player.
    pub fn set_player_and_name(&self, id: PlayerId, name: &str) -> IdentityResult<()> {
        self.set_id(id)?;
        self.set_name(name)?;
        Ok(())
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.get_or_create_id(),
            name: self.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityError, MemoryStorage};
    use std::io;

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> IdentityResult<()> {
            Err(IdentityError::Io(io::Error::other("read-only")))
        }
    }

    fn provider() -> (IdentityProvider, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (IdentityProvider::new(storage.clone()), storage)
    }

    #[test]
    fn test_first_call_generates_and_persists() {
        let (identity, storage) = provider();

        let id = identity.get_or_create_id();

        assert_eq!(storage.get(PLAYER_ID_KEY), Some(id.to_string()));
    }

    #[test]
    fn test_invalid_stored_id_is_replaced() {
        let (identity, storage) = provider();
        storage.set(PLAYER_ID_KEY, "user-1").unwrap();

        let id = identity.get_or_create_id();

        assert_ne!(storage.get(PLAYER_ID_KEY), Some("user-1".to_string()));
        assert_eq!(storage.get(PLAYER_ID_KEY), Some(id.to_string()));
    }

    #[test]
    fn test_set_name_trims() {
        let (identity, storage) = provider();

        let stored = identity.set_name("   Pino   ").unwrap();

        assert_eq!(stored, "Pino");
        assert_eq!(identity.name(), "Pino");
        assert_eq!(storage.get(PLAYER_NAME_KEY), Some("Pino".to_string()));
    }

    #[test]
    fn test_name_defaults_to_empty() {
        let (identity, _) = provider();
        assert_eq!(identity.name(), "");
    }

    #[test]
    fn test_set_id_overrides_generated() {
        let (identity, _) = provider();
        identity.get_or_create_id();

        let chosen = Uuid::new_v4();
        identity.set_id(chosen).unwrap();

        assert_eq!(identity.get_or_create_id(), chosen);
    }

    #[test]
    fn test_set_player_and_name() {
        let (identity, _) = provider();
        let chosen = Uuid::new_v4();

        identity.set_player_and_name(chosen, "   Elmo  ").unwrap();

        assert_eq!(
            identity.identity(),
            Identity {
                id: chosen,
                name: "Elmo".to_string()
            }
        );
    }

    #[test]
    fn test_unavailable_storage_still_yields_id() {
        let identity = IdentityProvider::new(Arc::new(BrokenStorage));

        let first = identity.get_or_create_id();
        let second = identity.get_or_create_id();

        assert_ne!(first, second);
        assert!(identity.set_name("Ada").is_err());
    }
}
