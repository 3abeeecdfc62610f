/// Store abstractions for the two entities this service owns.
///
/// Trait-based so the service layer can run against PostgreSQL in production
/// and the in-memory store in tests.
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{InteractionRecord, PreferenceProfile};

mod memory;
mod postgres;

pub use memory::{MemoryInteractionStore, MemoryPreferenceStore};
pub use postgres::{PgInteractionStore, PgPreferenceStore};

/// Durable store for interaction rows, keyed by (user_id, content_id).
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Full-row replace. Later calls for the same key overwrite, never merge.
    async fn upsert(&self, record: &InteractionRecord) -> Result<()>;
}

/// Durable store for preference profiles, keyed by user_id.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<PreferenceProfile>>;

    async fn save(&self, profile: &PreferenceProfile) -> Result<()>;
}
