/// Redis cache for preference profiles
///
/// Write-through after each profile persist so the feed-ranking collaborator
/// can read the latest profile without hitting Postgres. Never read back by
/// this service; the database stays authoritative.
use anyhow::Result;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::models::PreferenceProfile;

#[derive(Clone)]
pub struct ProfileCache {
    redis: ConnectionManager,
    ttl_secs: u64,
}

impl ProfileCache {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    fn key(user_id: Uuid) -> String {
        format!("user:{}:preferences", user_id)
    }

    pub async fn store(&self, profile: &PreferenceProfile) -> Result<()> {
        let mut conn = self.redis.clone();
        let json = serde_json::to_string(profile)?;

        let _: () = conn
            .set_ex(Self::key(profile.user_id), json, self.ttl_secs)
            .await?;

        Ok(())
    }
}
