/// Data model for the engagement tracking service
///
/// Wire types use camelCase to match the web client payloads; storage rows
/// use the snake_case column names from the migrations.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client action accompanying a tracked view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Update,
    Like,
    Unlike,
    Share,
    Feedback,
}

/// Explicit "show me more/less of this" feedback on a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    More,
    Less,
}

/// Request body for `POST /api/v1/interactions`.
///
/// Everything except `contentId` is optional; omitted signal fields default
/// to zero/false/empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackInteractionRequest {
    pub content_id: String,
    pub content_type: String,
    pub watch_duration: f64,
    pub total_duration: f64,
    pub attention_score: f64,
    pub liked: bool,
    pub shared: bool,
    pub skipped: bool,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub action: Action,
    pub feedback: Option<Feedback>,
}

impl Default for TrackInteractionRequest {
    fn default() -> Self {
        Self {
            content_id: String::new(),
            content_type: "video".to_string(),
            watch_duration: 0.0,
            total_duration: 0.0,
            attention_score: 0.0,
            liked: false,
            shared: false,
            skipped: false,
            tags: Vec::new(),
            category: None,
            action: Action::Update,
            feedback: None,
        }
    }
}

/// One recorded observation of a user engaging with one piece of content.
/// Keyed by (user_id, content_id); repeated calls replace the whole row.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionRecord {
    pub user_id: Uuid,
    pub content_id: String,
    pub content_type: String,
    pub watch_duration_seconds: f64,
    pub total_duration_seconds: f64,
    pub watch_completion_rate: f64,
    pub attention_score: f64,
    pub liked: bool,
    pub shared: bool,
    pub skipped: bool,
    pub tags: Vec<String>,
    pub category: Option<String>,
}

/// Summary of a recorded interaction, returned to the caller. The client's
/// reward-issuance flow consumes these fields upstream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSummary {
    pub content_id: String,
    pub watch_completion_rate: f64,
    pub attention_score: f64,
}

/// Success envelope for the tracking endpoint.
#[derive(Debug, Serialize)]
pub struct TrackInteractionResponse {
    pub success: bool,
    pub interaction: InteractionSummary,
}

/// Signal payload handed to the preference updater after an interaction has
/// been durably recorded. `liked`/`shared` are the effective flags after
/// action resolution.
#[derive(Debug, Clone, Default)]
pub struct EngagementEvent {
    pub content_id: String,
    pub watch_duration: f64,
    pub completion_rate: f64,
    pub attention_score: f64,
    pub liked: bool,
    pub shared: bool,
    pub skipped: bool,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub feedback: Option<Feedback>,
}

/// Rolling per-user preference profile. Exactly one row per user, created
/// lazily on the first recorded interaction and mutated only through the
/// preference updater.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    pub user_id: Uuid,
    pub engagement_score: i32,
    pub focus_score: f64,
    pub avg_watch_time_seconds: f64,
    pub total_content_views: i64,
    pub liked_tags: Vec<String>,
    pub disliked_tags: Vec<String>,
    pub preferred_categories: Vec<String>,
    pub last_seen_content: Vec<String>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl PreferenceProfile {
    /// All-default profile for a user with no recorded interactions.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            engagement_score: 50,
            focus_score: 0.0,
            avg_watch_time_seconds: 0.0,
            total_content_views: 0,
            liked_tags: Vec::new(),
            disliked_tags: Vec::new(),
            preferred_categories: Vec::new(),
            last_seen_content: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_match_wire_contract() {
        let req: TrackInteractionRequest = serde_json::from_str(r#"{"contentId":"c1"}"#).unwrap();

        assert_eq!(req.content_id, "c1");
        assert_eq!(req.content_type, "video");
        assert_eq!(req.watch_duration, 0.0);
        assert_eq!(req.action, Action::Update);
        assert!(req.feedback.is_none());
        assert!(!req.liked && !req.shared && !req.skipped);
    }

    #[test]
    fn action_and_feedback_parse_lowercase() {
        let req: TrackInteractionRequest =
            serde_json::from_str(r#"{"contentId":"c1","action":"feedback","feedback":"more"}"#)
                .unwrap();

        assert_eq!(req.action, Action::Feedback);
        assert_eq!(req.feedback, Some(Feedback::More));
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = InteractionSummary {
            content_id: "c1".to_string(),
            watch_completion_rate: 90.0,
            attention_score: 90.0,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["contentId"], "c1");
        assert_eq!(json["watchCompletionRate"], 90.0);
        assert_eq!(json["attentionScore"], 90.0);
    }
}
