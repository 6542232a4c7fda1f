//! Local player identity.
//!
//! Every client keeps a stable player id and display name in a small local
//! key-value store. The [`IdentityProvider`] is created once at startup and
//! handed to whatever needs the identity; nothing here is global.
//!
//! ## Example
//!
//! ```
//! use planning_poker::identity::{IdentityProvider, MemoryStorage};
//! use std::sync::Arc;
//!
//! let identity = IdentityProvider::new(Arc::new(MemoryStorage::new()));
//! let id = identity.get_or_create_id();
//! assert_eq!(identity.get_or_create_id(), id);
//!
//! identity.set_name("  Ada  ").unwrap();
//! assert_eq!(identity.name(), "Ada");
//! ```

pub mod errors;
pub mod provider;
pub mod storage;

pub use errors::{IdentityError, IdentityResult};
pub use provider::{Identity, IdentityProvider, PLAYER_ID_KEY, PLAYER_NAME_KEY};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
