use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use models::SubstanceDose;
use serde_json::Value;

use crate::{errors::JsonApiError, state::ServerState};

#[utoipa::path(
    get, path = "/api/priorsubstances", tag = "substances",
    responses((status = 200, description = "Substance presets in insertion order", body = [crate::openapi::SubstanceDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<SubstanceDose>>, JsonApiError> {
    Ok(Json(state.nights.prior_substances().await?))
}

#[utoipa::path(
    post, path = "/api/priorsubstances", tag = "substances",
    request_body = crate::openapi::SubstanceDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::SubstanceDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn add(
    State(state): State<ServerState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SubstanceDose>), JsonApiError> {
    let Json(body) = body?;
    let saved = state.nights.add_prior_substance(body).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}
