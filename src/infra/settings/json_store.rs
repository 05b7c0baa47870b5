use crate::core::settings::{GuildSettings, SettingsStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Guild settings persisted to a single pretty-printed JSON file, with an
/// in-memory cache in front of it. The file is tiny (one entry per guild),
/// so rewriting it on every change is fine.
pub struct JsonGuildSettingsStore {
    path: PathBuf,
    cache: RwLock<HashMap<u64, GuildSettings>>,
}

impl JsonGuildSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = if path.exists() {
            let file = std::fs::File::open(&path).expect("Failed to open guild settings file");
            let map: HashMap<u64, GuildSettings> =
                serde_json::from_reader(file).unwrap_or_default();
            RwLock::new(map)
        } else {
            RwLock::new(HashMap::new())
        };

        Self { path, cache }
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let cache = self.cache.read().await;
        let file = std::fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &*cache)?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonGuildSettingsStore {
    async fn get(&self, guild_id: u64) -> Result<Option<GuildSettings>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache.get(&guild_id).cloned())
    }

    async fn save(&self, settings: GuildSettings) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        cache.insert(settings.guild_id, settings);
        drop(cache); // Release lock before persisting
        self.persist().await
    }

    async fn delete(&self, guild_id: u64) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        let existed = cache.remove(&guild_id).is_some();
        drop(cache);
        if !existed {
            return Err(StoreError::NotFound);
        }

        self.persist().await
    }
}
