use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use models::NightRecord;
use serde_json::{json, Value};
use tracing::info;

use crate::{errors::JsonApiError, state::ServerState};

#[utoipa::path(
    get, path = "/api/night", tag = "nights",
    responses(
        (status = 200, description = "Most recent night", body = crate::openapi::NightDoc),
        (status = 404, description = "No nights recorded", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn latest(State(state): State<ServerState>) -> Result<Json<NightRecord>, JsonApiError> {
    Ok(Json(state.nights.latest().await?))
}

#[utoipa::path(
    get, path = "/api/nights/{dateAwake}", tag = "nights",
    params(("dateAwake" = String, Path, description = "Wake instant as an ISO-8601 date or date-time")),
    responses(
        (status = 200, description = "Night", body = crate::openapi::NightDoc),
        (status = 400, description = "Unparseable date", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_night(
    State(state): State<ServerState>,
    Path(date_awake): Path<String>,
) -> Result<Json<NightRecord>, JsonApiError> {
    Ok(Json(state.nights.get(&date_awake).await?))
}

#[utoipa::path(
    put, path = "/api/nights", tag = "nights",
    request_body = crate::openapi::NightDoc,
    responses(
        (status = 200, description = "Stored, replacing any night with the same dateAwake", body = crate::openapi::NightDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn upsert(
    State(state): State<ServerState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<NightRecord>, JsonApiError> {
    let Json(body) = body?;
    Ok(Json(state.nights.upsert(body).await?))
}

#[utoipa::path(
    delete, path = "/api/nights/{dateAwake}", tag = "nights",
    params(("dateAwake" = String, Path, description = "Wake instant as an ISO-8601 date or date-time")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete_night(
    State(state): State<ServerState>,
    Path(date_awake): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.nights.delete(&date_awake).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Also mounted as `GET /api/clear` for older front ends.
#[utoipa::path(
    delete, path = "/api/nights", tag = "nights",
    responses((status = 200, description = "All nights removed", body = crate::openapi::DeletedDoc))
)]
pub async fn clear(State(state): State<ServerState>) -> Result<Json<Value>, JsonApiError> {
    let deleted = state.nights.clear().await?;
    info!(deleted, "clear_nights");
    Ok(Json(json!({"deleted": deleted})))
}

#[utoipa::path(
    get, path = "/api/weeks/{weekOf}", tag = "nights",
    params(("weekOf" = String, Path, description = "Any instant inside the week")),
    responses(
        (status = 200, description = "Nights of the week, oldest first", body = [crate::openapi::NightDoc]),
        (status = 400, description = "Unparseable date", body = crate::openapi::ErrorDoc),
        (status = 404, description = "No nights that week", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn week_of(
    State(state): State<ServerState>,
    Path(week_of): Path<String>,
) -> Result<Json<Vec<NightRecord>>, JsonApiError> {
    Ok(Json(state.nights.week_of(&week_of).await?))
}
