//! AI troubleshooting endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::AppResult, AppState};

use super::CurrentUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssistantRequest {
    /// Description of the problem with the instrument
    #[validate(length(min = 1, message = "Describe the problem"))]
    pub problem: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssistantResponse {
    /// Markdown reply
    pub reply: String,
}

/// Ask the assistant for troubleshooting steps
#[utoipa::path(
    post,
    path = "/assistant",
    tag = "assistant",
    security(("bearer_auth" = [])),
    request_body = AssistantRequest,
    responses(
        (status = 200, description = "Assistant reply, or a fallback message", body = AssistantResponse)
    )
)]
pub async fn troubleshoot(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(request): Json<AssistantRequest>,
) -> AppResult<Json<AssistantResponse>> {
    request.validate()?;
    let reply = state
        .services
        .assistant
        .troubleshooting_steps(request.problem.trim())
        .await;
    Ok(Json(AssistantResponse { reply }))
}
