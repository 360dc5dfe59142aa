use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::advisors::chatbot::ChatbotOutput;
use crate::errors::AppError;
use crate::flow::registry::FlowInfo;
use crate::models::profile::UserProfileRow;
use crate::state::AppState;

#[derive(Serialize)]
pub struct FlowListResponse {
    pub flows: Vec<FlowInfo>,
}

/// GET /api/v1/flows
pub async fn handle_list_flows(State(state): State<AppState>) -> Json<FlowListResponse> {
    Json(FlowListResponse {
        flows: state.registry.describe(),
    })
}

/// POST /api/v1/flows/:name
/// Runs one flow on the request body and returns its validated output.
pub async fn handle_invoke_flow(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(input) = body?;
    let flow = state
        .registry
        .get(&name)
        .ok_or_else(|| AppError::NotFound(format!("Flow '{name}' not found")))?;
    let output = flow.invoke_json(input).await?;
    Ok(Json(output))
}

/// POST /api/v1/flows/chatbot/users/:user_id
/// Chatbot with context filled from the stored profile. Fields present in
/// the request body always win over stored ones.
pub async fn handle_chatbot_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatbotOutput>, AppError> {
    let Json(mut input) = body?;
    let Some(fields) = input.as_object_mut() else {
        return Err(AppError::Validation(
            "Request body must be a JSON object".to_string(),
        ));
    };

    match &state.profiles {
        Some(store) => match store.lookup(&user_id).await? {
            Some(profile) => fill_from_profile(fields, &profile),
            None => debug!(user_id = %user_id, "No stored profile; using request context only"),
        },
        None => warn!("Profile store not configured; using request context only"),
    }

    let output = state.advisors.chatbot.invoke(input).await?;
    Ok(Json(output))
}

fn fill_from_profile(fields: &mut Map<String, Value>, profile: &UserProfileRow) {
    let stored = [
        ("careerId", profile.career_id.clone()),
        ("year", profile.year.clone()),
        ("stage", profile.stage().map(|s| s.as_str().to_string())),
    ];
    for (key, value) in stored {
        let missing = matches!(fields.get(key), None | Some(Value::Null));
        match value {
            Some(value) if missing && !value.trim().is_empty() => {
                fields.insert(key.to_string(), Value::String(value));
            }
            _ => {}
        }
    }
}
