/// Preference updater
///
/// Maintains the per-user rolling preference profile from the stream of
/// recorded interactions. Maintenance is best-effort: the interaction row is
/// the source of truth and the profile is a derived cache, so the caller
/// logs and swallows any error raised here.
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::cache::ProfileCache;
use crate::db::PreferenceStore;
use crate::models::{EngagementEvent, Feedback, PreferenceProfile};

/// Retained fraction of the previous focus score per event.
const FOCUS_DECAY: f64 = 0.9;
/// Weight of the incoming attention score per event.
const FOCUS_ATTENTION_WEIGHT: f64 = 0.1;
/// Completion rate must be strictly above this to earn the engagement bonus.
const COMPLETION_BONUS_THRESHOLD: f64 = 80.0;
/// Recency list keeps this many most recent content IDs.
const LAST_SEEN_CAP: usize = 50;

const ENGAGEMENT_MIN: i32 = 0;
const ENGAGEMENT_MAX: i32 = 100;

/// Fold one engagement event into a profile.
///
/// Pure state transition; persistence is handled by [`PreferenceUpdater`].
pub fn fold_event(profile: &mut PreferenceProfile, event: &EngagementEvent) {
    // Every call counts as a view, including repeat views of the same
    // content. The running mean folds the new sample in with the
    // post-increment count.
    let views = profile.total_content_views + 1;
    profile.avg_watch_time_seconds =
        (profile.avg_watch_time_seconds * (views - 1) as f64 + event.watch_duration) / views as f64;
    profile.total_content_views = views;

    // Exponentially-weighted attention average. A zero attention score means
    // "no measurement", not "zero attention", so it leaves the score alone.
    if event.attention_score > 0.0 {
        profile.focus_score =
            profile.focus_score * FOCUS_DECAY + event.attention_score * FOCUS_ATTENTION_WEIGHT;
    }

    let mut boost = 0;
    if event.liked {
        boost += 2;
    }
    if event.shared {
        boost += 3;
    }
    if event.completion_rate > COMPLETION_BONUS_THRESHOLD {
        boost += 1;
    }
    if event.skipped {
        boost -= 1;
    }
    profile.engagement_score =
        (profile.engagement_score + boost).clamp(ENGAGEMENT_MIN, ENGAGEMENT_MAX);

    // Explicit feedback only acts when a category is present; feedback
    // without a category is a no-op on all three preference sets.
    if let (Some(feedback), Some(category)) = (event.feedback, &event.category) {
        let mut labels = event.tags.clone();
        if !labels.contains(category) {
            labels.push(category.clone());
        }

        match feedback {
            Feedback::More => {
                for label in &labels {
                    profile.disliked_tags.retain(|t| t != label);
                    if !profile.liked_tags.contains(label) {
                        profile.liked_tags.push(label.clone());
                    }
                }
                if !profile.preferred_categories.contains(category) {
                    profile.preferred_categories.push(category.clone());
                }
            }
            Feedback::Less => {
                for label in &labels {
                    profile.liked_tags.retain(|t| t != label);
                    if !profile.disliked_tags.contains(label) {
                        profile.disliked_tags.push(label.clone());
                    }
                }
                profile.preferred_categories.retain(|c| c != category);
            }
        }
    }

    // Move-to-front dedup, capped at the most recent entries.
    profile
        .last_seen_content
        .retain(|c| c != &event.content_id);
    profile
        .last_seen_content
        .insert(0, event.content_id.clone());
    profile.last_seen_content.truncate(LAST_SEEN_CAP);

    profile.updated_at = chrono::Utc::now();
}

/// Loads, updates, and persists preference profiles.
pub struct PreferenceUpdater {
    store: Arc<dyn PreferenceStore>,
    cache: Option<ProfileCache>,
}

impl PreferenceUpdater {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store, cache: None }
    }

    /// Attach a Redis cache that receives the updated profile after each
    /// persist, for downstream ranking consumers.
    pub fn with_cache(mut self, cache: ProfileCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Apply one event to the user's profile, creating the profile with
    /// all-default values if it does not exist yet.
    pub async fn apply_event(&self, user_id: Uuid, event: &EngagementEvent) -> Result<()> {
        let mut profile = self
            .store
            .get(user_id)
            .await?
            .unwrap_or_else(|| PreferenceProfile::new(user_id));

        fold_event(&mut profile, event);

        self.store.save(&profile).await?;

        // Cache write is best-effort even within best-effort maintenance:
        // the profile is already durably saved at this point.
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&profile).await {
                warn!(user_id = %user_id, error = %e, "Failed to cache preference profile");
            }
        }

        Ok(())
    }

    /// Current profile for a user, or the all-default profile when none has
    /// been created yet. Lazily-created profiles make "absent" and "default"
    /// observably the same.
    pub async fn load_profile(&self, user_id: Uuid) -> Result<PreferenceProfile> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .unwrap_or_else(|| PreferenceProfile::new(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(content_id: &str) -> EngagementEvent {
        EngagementEvent {
            content_id: content_id.to_string(),
            ..Default::default()
        }
    }

    fn profile() -> PreferenceProfile {
        PreferenceProfile::new(Uuid::new_v4())
    }

    #[test]
    fn incremental_mean_over_three_views() {
        let mut profile = profile();

        for (content_id, duration) in [("c1", 10.0), ("c2", 20.0), ("c3", 30.0)] {
            let mut e = event(content_id);
            e.watch_duration = duration;
            fold_event(&mut profile, &e);
        }

        assert_eq!(profile.total_content_views, 3);
        assert_eq!(profile.avg_watch_time_seconds, 20.0);
    }

    #[test]
    fn repeat_views_of_same_content_still_count() {
        let mut profile = profile();

        for _ in 0..3 {
            let mut e = event("c1");
            e.watch_duration = 12.0;
            fold_event(&mut profile, &e);
        }

        assert_eq!(profile.total_content_views, 3);
        assert_eq!(profile.last_seen_content, vec!["c1".to_string()]);
    }

    #[test]
    fn focus_score_ewma_skips_zero_attention() {
        let mut profile = profile();

        let mut e = event("c1");
        e.attention_score = 100.0;
        fold_event(&mut profile, &e);
        assert_eq!(profile.focus_score, 10.0);

        let e = event("c2");
        fold_event(&mut profile, &e);
        assert_eq!(profile.focus_score, 10.0);
    }

    #[test]
    fn engagement_score_clamps_at_upper_bound() {
        let mut profile = profile();

        for i in 0..30 {
            let mut e = event(&format!("c{}", i));
            e.shared = true;
            fold_event(&mut profile, &e);
            assert!(profile.engagement_score <= 100);
        }

        assert_eq!(profile.engagement_score, 100);
    }

    #[test]
    fn engagement_score_clamps_at_lower_bound() {
        let mut profile = profile();

        for i in 0..60 {
            let mut e = event(&format!("c{}", i));
            e.skipped = true;
            fold_event(&mut profile, &e);
            assert!(profile.engagement_score >= 0);
        }

        assert_eq!(profile.engagement_score, 0);
    }

    #[test]
    fn completion_bonus_requires_strictly_above_threshold() {
        let mut profile = profile();
        let mut e = event("c1");
        e.completion_rate = 80.0;
        fold_event(&mut profile, &e);
        assert_eq!(profile.engagement_score, 50);

        let mut e = event("c2");
        e.completion_rate = 81.0;
        fold_event(&mut profile, &e);
        assert_eq!(profile.engagement_score, 51);
    }

    #[test]
    fn more_feedback_moves_tag_out_of_disliked() {
        let mut profile = profile();
        profile.disliked_tags = vec!["sports".to_string()];

        let mut e = event("c1");
        e.category = Some("sports".to_string());
        e.feedback = Some(Feedback::More);
        fold_event(&mut profile, &e);

        assert!(profile.liked_tags.contains(&"sports".to_string()));
        assert!(!profile.disliked_tags.contains(&"sports".to_string()));
        assert!(profile.preferred_categories.contains(&"sports".to_string()));
    }

    #[test]
    fn less_feedback_moves_tags_and_drops_category() {
        let mut profile = profile();
        profile.liked_tags = vec!["sports".to_string(), "music".to_string()];
        profile.preferred_categories = vec!["sports".to_string()];

        let mut e = event("c1");
        e.tags = vec!["sports".to_string()];
        e.category = Some("sports".to_string());
        e.feedback = Some(Feedback::Less);
        fold_event(&mut profile, &e);

        assert_eq!(profile.liked_tags, vec!["music".to_string()]);
        assert!(profile.disliked_tags.contains(&"sports".to_string()));
        assert!(profile.preferred_categories.is_empty());
    }

    #[test]
    fn feedback_without_category_is_noop_on_sets() {
        let mut profile = profile();
        profile.liked_tags = vec!["music".to_string()];

        let mut e = event("c1");
        e.tags = vec!["sports".to_string()];
        e.feedback = Some(Feedback::More);
        fold_event(&mut profile, &e);

        assert_eq!(profile.liked_tags, vec!["music".to_string()]);
        assert!(profile.disliked_tags.is_empty());
        assert!(profile.preferred_categories.is_empty());
    }

    #[test]
    fn tag_sets_stay_mutually_exclusive() {
        let mut profile = profile();

        let mut e = event("c1");
        e.tags = vec!["gaming".to_string()];
        e.category = Some("gaming".to_string());
        e.feedback = Some(Feedback::More);
        fold_event(&mut profile, &e);

        let mut e = event("c2");
        e.tags = vec!["gaming".to_string()];
        e.category = Some("gaming".to_string());
        e.feedback = Some(Feedback::Less);
        fold_event(&mut profile, &e);

        assert!(!profile.liked_tags.contains(&"gaming".to_string()));
        assert!(profile.disliked_tags.contains(&"gaming".to_string()));
        for tag in &profile.liked_tags {
            assert!(!profile.disliked_tags.contains(tag));
        }
    }

    #[test]
    fn last_seen_caps_at_fifty_and_drops_oldest() {
        let mut profile = profile();

        for i in 0..51 {
            fold_event(&mut profile, &event(&format!("c{}", i)));
        }

        assert_eq!(profile.last_seen_content.len(), 50);
        assert!(!profile.last_seen_content.contains(&"c0".to_string()));
        assert_eq!(profile.last_seen_content[0], "c50");
    }

    #[test]
    fn last_seen_moves_existing_id_to_front() {
        let mut profile = profile();

        for i in 0..50 {
            fold_event(&mut profile, &event(&format!("c{}", i)));
        }
        fold_event(&mut profile, &event("c10"));

        assert_eq!(profile.last_seen_content.len(), 50);
        assert_eq!(profile.last_seen_content[0], "c10");
        assert_eq!(
            profile
                .last_seen_content
                .iter()
                .filter(|c| c.as_str() == "c10")
                .count(),
            1
        );
    }
}
