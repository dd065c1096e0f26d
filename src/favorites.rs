use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::channel::Channel;

/// What survives of a channel once favorited. Everything else is
/// re-resolved on the next visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: String,
    pub name: String,
}

impl From<&Channel> for FavoriteEntry {
    fn from(channel: &Channel) -> Self {
        Self {
            id: channel.id.clone(),
            name: channel.name.clone(),
        }
    }
}

/// Small persisted favorites set, keyed by channel id. Reads and writes are
/// serialized in invocation order; insertion order is kept for display.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn add(&self, entry: FavoriteEntry) -> Result<()>;
    async fn remove(&self, id: &str) -> Result<()>;
    async fn contains(&self, id: &str) -> bool;
    async fn all(&self) -> Vec<FavoriteEntry>;
}

/// Ephemeral store for hosts whose storage layer lives elsewhere.
#[derive(Default)]
pub struct MemoryFavorites {
    entries: RwLock<Vec<FavoriteEntry>>,
}

impl MemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoritesStore for MemoryFavorites {
    async fn add(&self, entry: FavoriteEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        if !entries.iter().any(|e| e.id == entry.id) {
            entries.push(entry);
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.entries.write().await.retain(|e| e.id != id);
        Ok(())
    }

    async fn contains(&self, id: &str) -> bool {
        self.entries.read().await.iter().any(|e| e.id == id)
    }

    async fn all(&self) -> Vec<FavoriteEntry> {
        self.entries.read().await.clone()
    }
}

/// Write-through JSON file store; survives across sessions.
pub struct JsonFavorites {
    path: PathBuf,
    entries: RwLock<Vec<FavoriteEntry>>,
}

impl JsonFavorites {
    /// Open (or create) the favorites file. A missing file is an empty set;
    /// a corrupt file is an error rather than silent data loss.
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt favorites file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e).context("reading favorites file"),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &[FavoriteEntry]) -> Result<()> {
        let json = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("writing favorites file {}", self.path.display()))
    }
}

#[async_trait]
impl FavoritesStore for JsonFavorites {
    async fn add(&self, entry: FavoriteEntry) -> Result<()> {
        // Hold the write lock across the file write so operations land in
        // invocation order.
        let mut entries = self.entries.write().await;
        if !entries.iter().any(|e| e.id == entry.id) {
            entries.push(entry);
            self.persist(&entries).await?;
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() != before {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    async fn contains(&self, id: &str) -> bool {
        self.entries.read().await.iter().any(|e| e.id == id)
    }

    async fn all(&self) -> Vec<FavoriteEntry> {
        self.entries.read().await.clone()
    }
}
