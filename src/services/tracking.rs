/// Interaction recorder
///
/// Durable per-(user, content) upsert of engagement facts, followed by
/// best-effort preference maintenance. The upsert is fatal on failure; a
/// preference failure is logged and the call still succeeds, because the
/// interaction row is the source of truth and the profile is derived.
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::db::InteractionStore;
use crate::error::{AppError, Result};
use crate::models::{
    Action, EngagementEvent, InteractionRecord, InteractionSummary, TrackInteractionRequest,
};
use crate::services::PreferenceUpdater;

/// Watch completion as a percentage, guarding unknown (zero) durations.
pub fn completion_rate(watch_duration: f64, total_duration: f64) -> f64 {
    if total_duration > 0.0 {
        watch_duration / total_duration * 100.0
    } else {
        0.0
    }
}

pub struct InteractionService {
    interactions: Arc<dyn InteractionStore>,
    preferences: PreferenceUpdater,
}

impl InteractionService {
    pub fn new(interactions: Arc<dyn InteractionStore>, preferences: PreferenceUpdater) -> Self {
        Self {
            interactions,
            preferences,
        }
    }

    /// Record one observed interaction and fold it into the user's
    /// preference profile.
    pub async fn record_interaction(
        &self,
        user_id: Uuid,
        req: &TrackInteractionRequest,
    ) -> Result<InteractionSummary> {
        if req.content_id.trim().is_empty() {
            return Err(AppError::Validation("contentId is required".to_string()));
        }
        if req.watch_duration < 0.0 || req.total_duration < 0.0 {
            return Err(AppError::Validation(
                "durations must be non-negative".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&req.attention_score) {
            return Err(AppError::Validation(
                "attentionScore must be within 0-100".to_string(),
            ));
        }

        let watch_completion_rate = completion_rate(req.watch_duration, req.total_duration);

        // Explicit actions override the caller-supplied booleans.
        let liked = match req.action {
            Action::Like => true,
            Action::Unlike => false,
            _ => req.liked,
        };
        let shared = match req.action {
            Action::Share => true,
            _ => req.shared,
        };

        let record = InteractionRecord {
            user_id,
            content_id: req.content_id.clone(),
            content_type: req.content_type.clone(),
            watch_duration_seconds: req.watch_duration,
            total_duration_seconds: req.total_duration,
            watch_completion_rate,
            attention_score: req.attention_score,
            liked,
            shared,
            skipped: req.skipped,
            tags: req.tags.clone(),
            category: req.category.clone(),
        };

        self.interactions
            .upsert(&record)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let event = EngagementEvent {
            content_id: record.content_id.clone(),
            watch_duration: req.watch_duration,
            completion_rate: watch_completion_rate,
            attention_score: req.attention_score,
            liked,
            shared,
            skipped: req.skipped,
            tags: req.tags.clone(),
            category: req.category.clone(),
            feedback: req.feedback,
        };

        if let Err(e) = self.preferences.apply_event(user_id, &event).await {
            warn!(
                user_id = %user_id,
                content_id = %req.content_id,
                error = %e,
                "Preference update failed; interaction already recorded"
            );
        }

        Ok(InteractionSummary {
            content_id: record.content_id,
            watch_completion_rate,
            attention_score: req.attention_score,
        })
    }

    /// Current preference profile for a user, defaulted when absent.
    pub async fn preference_profile(
        &self,
        user_id: Uuid,
    ) -> Result<crate::models::PreferenceProfile> {
        self.preferences
            .load_profile(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryInteractionStore, MemoryPreferenceStore};

    fn service() -> InteractionService {
        InteractionService::new(
            Arc::new(MemoryInteractionStore::new()),
            PreferenceUpdater::new(Arc::new(MemoryPreferenceStore::new())),
        )
    }

    #[test]
    fn completion_rate_guards_zero_duration() {
        assert_eq!(completion_rate(30.0, 0.0), 0.0);
        assert_eq!(completion_rate(40.0, 50.0), 80.0);
        assert_eq!(completion_rate(9.0, 10.0), 90.0);
    }

    #[tokio::test]
    async fn missing_content_id_is_rejected() {
        let service = service();
        let req = TrackInteractionRequest::default();

        let err = service
            .record_interaction(Uuid::new_v4(), &req)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn negative_durations_are_rejected() {
        let service = service();
        let req = TrackInteractionRequest {
            content_id: "c1".to_string(),
            watch_duration: -1.0,
            ..Default::default()
        };

        let err = service
            .record_interaction(Uuid::new_v4(), &req)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn like_action_overrides_supplied_flag() {
        let interactions = Arc::new(MemoryInteractionStore::new());
        let service = InteractionService::new(
            interactions.clone(),
            PreferenceUpdater::new(Arc::new(MemoryPreferenceStore::new())),
        );
        let user_id = Uuid::new_v4();

        let req = TrackInteractionRequest {
            content_id: "c1".to_string(),
            liked: false,
            action: Action::Like,
            ..Default::default()
        };
        service.record_interaction(user_id, &req).await.unwrap();
        assert!(interactions.get(user_id, "c1").await.unwrap().liked);

        let req = TrackInteractionRequest {
            content_id: "c1".to_string(),
            liked: true,
            action: Action::Unlike,
            ..Default::default()
        };
        service.record_interaction(user_id, &req).await.unwrap();
        assert!(!interactions.get(user_id, "c1").await.unwrap().liked);
    }

    #[tokio::test]
    async fn share_action_forces_shared_flag() {
        let interactions = Arc::new(MemoryInteractionStore::new());
        let service = InteractionService::new(
            interactions.clone(),
            PreferenceUpdater::new(Arc::new(MemoryPreferenceStore::new())),
        );
        let user_id = Uuid::new_v4();

        let req = TrackInteractionRequest {
            content_id: "c1".to_string(),
            action: Action::Share,
            ..Default::default()
        };
        service.record_interaction(user_id, &req).await.unwrap();

        assert!(interactions.get(user_id, "c1").await.unwrap().shared);
    }
}
