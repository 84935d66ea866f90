//! # Preference Store
//!
//! Small key-value store for the handful of values Match Day Cover keeps between runs:
//! the last stadium and tier picked, unlocked achievements, and the wallet balance.
//!
//! ## Architecture
//!
//! - **PreferenceStore**: Abstract trait over string keys and values
//! - **FilePreferenceStore**: One JSON object on disk, rewritten on every change
//! - **MemoryPreferenceStore**: Map-backed store for tests and `--ephemeral` runs
//! - **Preferences**: Typed accessors over any store
//!
//! ## Usage
//!
//! ```rust
//! use preference_store::{FilePreferenceStore, PreferenceStore};
//! use tempfile::TempDir;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let temp_dir = TempDir::new()?;
//!     let store = FilePreferenceStore::open(temp_dir.path().join("preferences.json")).await?;
//!     store.set("last_stadium", "mum").await?;
//!     assert_eq!(store.get("last_stadium").await?.as_deref(), Some("mum"));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod preferences;
pub mod store;

pub use config::StoreConfig;
pub use error::{PreferenceError, Result};
pub use preferences::{keys, Preferences};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
