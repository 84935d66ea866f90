//! Typed accessors for the keys Match Day Cover persists

use cover_engine::{Achievement, TierId};
use tracing::warn;

use crate::error::Result;
use crate::store::PreferenceStore;

/// Key names
pub mod keys {
    pub const LAST_STADIUM: &str = "last_stadium";
    pub const LAST_TIER: &str = "last_tier";
    /// JSON list of achievement ids
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const WALLET: &str = "wallet";
}

/// Typed view over a preference store
///
/// Unreadable values fall back to their defaults with a warning instead of failing the run.
pub struct Preferences<S: PreferenceStore> {
    store: S,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn last_stadium(&self) -> Result<Option<String>> {
        self.store.get(keys::LAST_STADIUM).await
    }

    pub async fn set_last_stadium(&self, stadium_id: &str) -> Result<()> {
        self.store.set(keys::LAST_STADIUM, stadium_id).await
    }

    pub async fn last_tier(&self) -> Result<Option<TierId>> {
        let Some(raw) = self.store.get(keys::LAST_TIER).await? else {
            return Ok(None);
        };
        match raw.parse::<TierId>() {
            Ok(tier) => Ok(Some(tier)),
            Err(e) => {
                warn!("Ignoring stored tier {:?}: {}", raw, e);
                Ok(None)
            }
        }
    }

    pub async fn set_last_tier(&self, tier: TierId) -> Result<()> {
        self.store.set(keys::LAST_TIER, tier.as_str()).await
    }

    /// Wallet balance, or `default` when none is stored
    pub async fn wallet(&self, default: i64) -> Result<i64> {
        let Some(raw) = self.store.get(keys::WALLET).await? else {
            return Ok(default);
        };
        match raw.parse::<i64>() {
            Ok(wallet) => Ok(wallet),
            Err(e) => {
                warn!("Ignoring stored wallet {:?}: {}", raw, e);
                Ok(default)
            }
        }
    }

    pub async fn set_wallet(&self, wallet: i64) -> Result<()> {
        self.store.set(keys::WALLET, &wallet.to_string()).await
    }

    pub async fn achievements(&self) -> Result<Vec<Achievement>> {
        let Some(raw) = self.store.get(keys::ACHIEVEMENTS).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Achievement>>(&raw) {
            Ok(achievements) => Ok(achievements),
            Err(e) => {
                warn!("Ignoring stored achievements {:?}: {}", raw, e);
                Ok(Vec::new())
            }
        }
    }

    pub async fn set_achievements(&self, achievements: &[Achievement]) -> Result<()> {
        let raw = serde_json::to_string(achievements)?;
        self.store.set(keys::ACHIEVEMENTS, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPreferenceStore;

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let prefs = Preferences::new(MemoryPreferenceStore::new());
        assert_eq!(prefs.last_stadium().await.unwrap(), None);
        assert_eq!(prefs.last_tier().await.unwrap(), None);
        assert_eq!(prefs.wallet(25_000).await.unwrap(), 25_000);
        assert!(prefs.achievements().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let prefs = Preferences::new(MemoryPreferenceStore::new());
        prefs.set_last_stadium("che").await.unwrap();
        prefs.set_last_tier(TierId::Premium).await.unwrap();
        prefs.set_wallet(24_501).await.unwrap();
        prefs.set_achievements(&[Achievement::FirstPolicy, Achievement::BigClaim]).await.unwrap();

        assert_eq!(prefs.last_stadium().await.unwrap().as_deref(), Some("che"));
        assert_eq!(prefs.last_tier().await.unwrap(), Some(TierId::Premium));
        assert_eq!(prefs.wallet(0).await.unwrap(), 24_501);
        assert_eq!(
            prefs.achievements().await.unwrap(),
            vec![Achievement::FirstPolicy, Achievement::BigClaim]
        );
        assert_eq!(
            prefs.store().get(keys::ACHIEVEMENTS).await.unwrap().as_deref(),
            Some(r#"["first_policy","big_claim"]"#)
        );
    }

    #[tokio::test]
    async fn test_garbage_values_fall_back() {
        let store = MemoryPreferenceStore::new();
        store.set(keys::WALLET, "lots").await.unwrap();
        store.set(keys::LAST_TIER, "platinum").await.unwrap();
        store.set(keys::ACHIEVEMENTS, "first_policy").await.unwrap();

        let prefs = Preferences::new(store);
        assert_eq!(prefs.wallet(25_000).await.unwrap(), 25_000);
        assert_eq!(prefs.last_tier().await.unwrap(), None);
        assert!(prefs.achievements().await.unwrap().is_empty());
    }
}
