use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc { pub error: String, pub message: Option<String> }

#[derive(Serialize, ToSchema)]
pub struct DeletedDoc { pub deleted: u64 }

#[derive(Serialize, ToSchema)]
pub struct InterruptionDoc {
    /// ISO-8601 duration, e.g. `PT3H`
    pub duration: String,
    pub notes: String,
}

#[derive(Serialize, ToSchema)]
pub struct SubstanceDoc {
    pub substance: String,
    pub time: Option<String>,
    pub quantity: Option<f64>,
}

/// A night keyed by the instant the sleeper woke up. Timestamps are
/// ISO-8601 strings; responses always use UTC with milliseconds.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NightDoc {
    pub date_awake: String,
    pub edited: bool,
    pub bed_time: Option<String>,
    pub fell_asleep_at: Option<String>,
    #[serde(rename = "interuptions")]
    pub interruptions: Vec<InterruptionDoc>,
    pub woke_up: Option<String>,
    pub got_up: Option<String>,
    pub rested_rating: Option<String>,
    pub sleep_quality: Option<String>,
    pub meds_and_alcohol: Vec<SubstanceDoc>,
    pub notes: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::nights::latest,
        crate::routes::nights::get_night,
        crate::routes::nights::upsert,
        crate::routes::nights::delete_night,
        crate::routes::nights::clear,
        crate::routes::nights::week_of,
        crate::routes::analytics::analytics,
        crate::routes::prior_substances::list,
        crate::routes::prior_substances::add,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            DeletedDoc,
            InterruptionDoc,
            SubstanceDoc,
            NightDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "nights"),
        (name = "analytics"),
        (name = "substances")
    )
)]
pub struct ApiDoc;
