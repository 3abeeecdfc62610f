/// In-memory store implementations for tests and local development without
/// a database.
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{InteractionStore, PreferenceStore};
use crate::models::{InteractionRecord, PreferenceProfile};

#[derive(Default)]
pub struct MemoryInteractionStore {
    rows: RwLock<HashMap<(Uuid, String), InteractionRecord>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: Uuid, content_id: &str) -> Option<InteractionRecord> {
        self.rows
            .read()
            .await
            .get(&(user_id, content_id.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn upsert(&self, record: &InteractionRecord) -> Result<()> {
        self.rows.write().await.insert(
            (record.user_id, record.content_id.clone()),
            record.clone(),
        );
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    rows: RwLock<HashMap<Uuid, PreferenceProfile>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<PreferenceProfile>> {
        Ok(self.rows.read().await.get(&user_id).cloned())
    }

    async fn save(&self, profile: &PreferenceProfile) -> Result<()> {
        self.rows
            .write()
            .await
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}
