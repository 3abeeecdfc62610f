use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{InteractionStore, PreferenceStore};
use crate::models::{InteractionRecord, PreferenceProfile};

/// PostgreSQL-backed interaction store.
#[derive(Clone)]
pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InteractionStore for PgInteractionStore {
    async fn upsert(&self, record: &InteractionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO content_interactions (
                user_id, content_id, content_type,
                watch_duration_seconds, total_duration_seconds, watch_completion_rate,
                attention_score, liked, shared, skipped, tags, category, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            ON CONFLICT (user_id, content_id) DO UPDATE SET
                content_type = EXCLUDED.content_type,
                watch_duration_seconds = EXCLUDED.watch_duration_seconds,
                total_duration_seconds = EXCLUDED.total_duration_seconds,
                watch_completion_rate = EXCLUDED.watch_completion_rate,
                attention_score = EXCLUDED.attention_score,
                liked = EXCLUDED.liked,
                shared = EXCLUDED.shared,
                skipped = EXCLUDED.skipped,
                tags = EXCLUDED.tags,
                category = EXCLUDED.category,
                updated_at = NOW()
            "#,
        )
        .bind(record.user_id)
        .bind(&record.content_id)
        .bind(&record.content_type)
        .bind(record.watch_duration_seconds)
        .bind(record.total_duration_seconds)
        .bind(record.watch_completion_rate)
        .bind(record.attention_score)
        .bind(record.liked)
        .bind(record.shared)
        .bind(record.skipped)
        .bind(&record.tags)
        .bind(&record.category)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// PostgreSQL-backed preference profile store.
#[derive(Clone)]
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<PreferenceProfile>> {
        let profile = sqlx::query_as::<_, PreferenceProfile>(
            r#"
            SELECT user_id, engagement_score, focus_score, avg_watch_time_seconds,
                   total_content_views, liked_tags, disliked_tags,
                   preferred_categories, last_seen_content, updated_at
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn save(&self, profile: &PreferenceProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (
                user_id, engagement_score, focus_score, avg_watch_time_seconds,
                total_content_views, liked_tags, disliked_tags,
                preferred_categories, last_seen_content, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id) DO UPDATE SET
                engagement_score = EXCLUDED.engagement_score,
                focus_score = EXCLUDED.focus_score,
                avg_watch_time_seconds = EXCLUDED.avg_watch_time_seconds,
                total_content_views = EXCLUDED.total_content_views,
                liked_tags = EXCLUDED.liked_tags,
                disliked_tags = EXCLUDED.disliked_tags,
                preferred_categories = EXCLUDED.preferred_categories,
                last_seen_content = EXCLUDED.last_seen_content,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.user_id)
        .bind(profile.engagement_score)
        .bind(profile.focus_score)
        .bind(profile.avg_watch_time_seconds)
        .bind(profile.total_content_views)
        .bind(&profile.liked_tags)
        .bind(&profile.disliked_tags)
        .bind(&profile.preferred_categories)
        .bind(&profile.last_seen_content)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
