// Per-guild configuration: which channel standings get posted to and which
// tab is that guild's default. Storage goes behind a trait so the core can
// be tested with an in-memory map while production uses the JSON file store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    pub guild_id: u64,
    pub standings_channel_id: u64,
    /// Overrides the globally configured default tab when set.
    pub default_tab: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Settings not found")]
    NotFound,
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, guild_id: u64) -> Result<Option<GuildSettings>, StoreError>;
    async fn save(&self, settings: GuildSettings) -> Result<(), StoreError>;
    async fn delete(&self, guild_id: u64) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("No standings channel configured for this server")]
    NotConfigured,
}

pub struct SettingsService<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> SettingsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get(&self, guild_id: u64) -> Result<Option<GuildSettings>, SettingsError> {
        Ok(self.store.get(guild_id).await?)
    }

    /// Like the `get` variant, but missing configuration is an error. Used
    /// by operations that cannot proceed without a target channel.
    pub async fn require(&self, guild_id: u64) -> Result<GuildSettings, SettingsError> {
        self.store
            .get(guild_id)
            .await?
            .ok_or(SettingsError::NotConfigured)
    }

    /// Set or replace the standings channel. Re-running the command simply
    /// re-points the guild, so this is an upsert rather than create-once.
    pub async fn set_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
        default_tab: Option<String>,
    ) -> Result<(), SettingsError> {
        let default_tab = match default_tab {
            Some(tab) => Some(tab),
            None => self
                .store
                .get(guild_id)
                .await?
                .and_then(|existing| existing.default_tab),
        };

        self.store
            .save(GuildSettings {
                guild_id,
                standings_channel_id: channel_id,
                default_tab,
            })
            .await?;
        Ok(())
    }

    pub async fn clear(&self, guild_id: u64) -> Result<(), SettingsError> {
        match self.store.delete(guild_id).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(SettingsError::NotConfigured),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        map: Mutex<HashMap<u64, GuildSettings>>,
    }

    #[async_trait]
    impl SettingsStore for MemoryStore {
        async fn get(&self, guild_id: u64) -> Result<Option<GuildSettings>, StoreError> {
            Ok(self.map.lock().await.get(&guild_id).cloned())
        }

        async fn save(&self, settings: GuildSettings) -> Result<(), StoreError> {
            self.map.lock().await.insert(settings.guild_id, settings);
            Ok(())
        }

        async fn delete(&self, guild_id: u64) -> Result<(), StoreError> {
            self.map
                .lock()
                .await
                .remove(&guild_id)
                .map(|_| ())
                .ok_or(StoreError::NotFound)
        }
    }

    #[tokio::test]
    async fn set_channel_overwrites_previous_value() {
        let svc = SettingsService::new(MemoryStore::default());

        svc.set_channel(1, 100, None).await.unwrap();
        svc.set_channel(1, 200, None).await.unwrap();

        let settings = svc.require(1).await.unwrap();
        assert_eq!(settings.standings_channel_id, 200);
    }

    #[tokio::test]
    async fn reconfiguring_channel_keeps_existing_default_tab() {
        let svc = SettingsService::new(MemoryStore::default());

        svc.set_channel(1, 100, Some("D1".to_string())).await.unwrap();
        svc.set_channel(1, 200, None).await.unwrap();

        let settings = svc.require(1).await.unwrap();
        assert_eq!(settings.default_tab.as_deref(), Some("D1"));
    }

    #[tokio::test]
    async fn require_fails_when_unconfigured() {
        let svc = SettingsService::new(MemoryStore::default());

        assert!(matches!(
            svc.require(42).await.unwrap_err(),
            SettingsError::NotConfigured
        ));
    }

    #[tokio::test]
    async fn clear_removes_settings_and_reports_missing_ones() {
        let svc = SettingsService::new(MemoryStore::default());

        svc.set_channel(1, 100, None).await.unwrap();
        svc.clear(1).await.unwrap();

        assert!(svc.get(1).await.unwrap().is_none());
        assert!(matches!(
            svc.clear(1).await.unwrap_err(),
            SettingsError::NotConfigured
        ));
    }
}
