use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use service::nights::AnalyticsPoint;

use crate::{errors::JsonApiError, state::ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// Inclusive lower bound on dateAwake
    pub start: Option<String>,
    /// Exclusive upper bound on dateAwake, before tomorrow
    pub end: Option<String>,
}

#[utoipa::path(
    get, path = "/api/analytics/{property}", tag = "analytics",
    params(("property" = String, Path, description = "Night field, e.g. wokeUp or sleepQuality"), RangeQuery),
    responses(
        (status = 200, description = "One point per night where the property is set"),
        (status = 400, description = "Unknown property or invalid date range", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn analytics(
    State(state): State<ServerState>,
    Path(property): Path<String>,
    Query(q): Query<RangeQuery>,
) -> Result<Json<Vec<AnalyticsPoint>>, JsonApiError> {
    let (Some(start), Some(end)) = (q.start, q.end) else {
        return Err(JsonApiError::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            Some("start and end are required".into()),
        ));
    };
    let points = state.nights.analytics(&property, &start, &end, Utc::now()).await?;
    Ok(Json(points))
}
