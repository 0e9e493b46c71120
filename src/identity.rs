use crate::protocol::PlayerId;
use anyhow::Context;
use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use uuid::Uuid;

pub const PLAYER_ID_KEY: &str = "playerId";

/// Source of the durable player token.
pub trait IdentityStore {
    /// Returns the persisted token, creating and persisting one first if
    /// none exists yet. Repeated calls return the same token.
    fn get_or_create(&mut self) -> anyhow::Result<PlayerId>;
}

/// Key/value document on disk holding the player token.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> anyhow::Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("corrupt identity file {}", self.path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err)
                .with_context(|| format!("failed reading identity file {}", self.path.display())),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating {}", parent.display()))?;
        }
        let encoded = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, encoded)
            .with_context(|| format!("failed writing identity file {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed replacing identity file {}", self.path.display()))?;
        Ok(())
    }
}

impl IdentityStore for FileIdentityStore {
    fn get_or_create(&mut self) -> anyhow::Result<PlayerId> {
        let mut entries = self.read_entries()?;
        if let Some(existing) = entries.get(PLAYER_ID_KEY) {
            return Ok(PlayerId::new(existing.clone()));
        }

        let fresh = Uuid::new_v4().to_string();
        entries.insert(PLAYER_ID_KEY.to_string(), fresh.clone());
        self.write_entries(&entries)?;
        log::info!("created player identity in {}", self.path.display());
        Ok(PlayerId::new(fresh))
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryIdentityStore {
    id: Option<PlayerId>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: PlayerId) -> Self {
        Self { id: Some(id) }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get_or_create(&mut self) -> anyhow::Result<PlayerId> {
        let id = self
            .id
            .get_or_insert_with(|| PlayerId::new(Uuid::new_v4().to_string()));
        Ok(id.clone())
    }
}
