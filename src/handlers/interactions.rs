/// Interaction tracking endpoint
use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{TrackInteractionRequest, TrackInteractionResponse};
use crate::services::InteractionService;

pub struct TrackingHandlerState {
    pub service: Arc<InteractionService>,
}

/// Record one content interaction for the authenticated user.
/// POST /api/v1/interactions
pub async fn track_interaction(
    state: web::Data<TrackingHandlerState>,
    user_id: UserId,
    req: web::Json<TrackInteractionRequest>,
) -> Result<HttpResponse> {
    let interaction = state.service.record_interaction(user_id.0, &req).await?;

    Ok(HttpResponse::Ok().json(TrackInteractionResponse {
        success: true,
        interaction,
    }))
}
