/// Preference profile read endpoint, consumed by feed ranking.
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::handlers::TrackingHandlerState;
use crate::middleware::UserId;

/// Current preference profile for the authenticated user. Users without a
/// recorded interaction get the all-default profile.
/// GET /api/v1/preferences
pub async fn get_preferences(
    state: web::Data<TrackingHandlerState>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let profile = state.service.preference_profile(user_id.0).await?;

    Ok(HttpResponse::Ok().json(profile))
}
