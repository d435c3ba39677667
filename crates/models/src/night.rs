use chrono::{DateTime, Utc};
use sea_orm::{
    entity::prelude::*, sea_query::OnConflict, DatabaseConnection, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::record::{Interruption, NightRecord, SubstanceDose};

/// Stored night. Nested lists live in JSONB columns so the row mirrors the
/// document the front end edits.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "night")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub date_awake: DateTimeWithTimeZone,
    pub edited: bool,
    pub bed_time: Option<DateTimeWithTimeZone>,
    pub fell_asleep_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "JsonBinary")]
    pub interruptions: Json,
    pub woke_up: Option<DateTimeWithTimeZone>,
    pub got_up: Option<DateTimeWithTimeZone>,
    pub rested_rating: Option<String>,
    pub sleep_quality: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub meds_and_alcohol: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn stored(t: DateTime<Utc>) -> DateTimeWithTimeZone {
    t.fixed_offset()
}

fn loaded(t: DateTimeWithTimeZone) -> DateTime<Utc> {
    t.with_timezone(&Utc)
}

impl TryFrom<Model> for NightRecord {
    type Error = ModelError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let interruptions: Vec<Interruption> = serde_json::from_value(m.interruptions)
            .map_err(|e| ModelError::Db(format!("night {} has corrupt interruptions: {e}", m.id)))?;
        let meds_and_alcohol: Vec<SubstanceDose> = serde_json::from_value(m.meds_and_alcohol)
            .map_err(|e| ModelError::Db(format!("night {} has corrupt substances: {e}", m.id)))?;
        Ok(NightRecord {
            date_awake: loaded(m.date_awake),
            edited: m.edited,
            bed_time: m.bed_time.map(loaded),
            fell_asleep_at: m.fell_asleep_at.map(loaded),
            interruptions,
            woke_up: m.woke_up.map(loaded),
            got_up: m.got_up.map(loaded),
            rested_rating: m.rested_rating,
            sleep_quality: m.sleep_quality,
            meds_and_alcohol,
            notes: m.notes,
        })
    }
}

/// Build a fresh row for `record`. Identity and timestamps are set here;
/// on conflict only the record columns are overwritten.
fn active_model(record: &NightRecord) -> Result<ActiveModel, ModelError> {
    let interruptions = serde_json::to_value(&record.interruptions).map_err(|e| ModelError::Validation(e.to_string()))?;
    let meds = serde_json::to_value(&record.meds_and_alcohol).map_err(|e| ModelError::Validation(e.to_string()))?;
    let now = stored(Utc::now());
    Ok(ActiveModel {
        id: Set(Uuid::new_v4()),
        date_awake: Set(stored(record.date_awake)),
        edited: Set(record.edited),
        bed_time: Set(record.bed_time.map(stored)),
        fell_asleep_at: Set(record.fell_asleep_at.map(stored)),
        interruptions: Set(interruptions),
        woke_up: Set(record.woke_up.map(stored)),
        got_up: Set(record.got_up.map(stored)),
        rested_rating: Set(record.rested_rating.clone()),
        sleep_quality: Set(record.sleep_quality.clone()),
        meds_and_alcohol: Set(meds),
        notes: Set(record.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

/// Columns replaced when a night with the same `date_awake` already exists.
const REPLACED: [Column; 11] = [
    Column::Edited,
    Column::BedTime,
    Column::FellAsleepAt,
    Column::Interruptions,
    Column::WokeUp,
    Column::GotUp,
    Column::RestedRating,
    Column::SleepQuality,
    Column::MedsAndAlcohol,
    Column::Notes,
    Column::UpdatedAt,
];

/// Insert or fully replace the night keyed by `record.date_awake`.
/// An existing row keeps its id and `created_at`.
pub async fn upsert(db: &DatabaseConnection, record: &NightRecord) -> Result<Model, ModelError> {
    record.validate()?;
    let am = active_model(record)?;
    let saved = Entity::insert(am)
        .on_conflict(OnConflict::column(Column::DateAwake).update_columns(REPLACED).to_owned())
        .exec_with_returning(db)
        .await?;
    Ok(saved)
}

pub async fn find_by_date_awake(db: &DatabaseConnection, date_awake: DateTime<Utc>) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::DateAwake.eq(stored(date_awake)))
        .one(db)
        .await?;
    Ok(found)
}

pub async fn find_latest(db: &DatabaseConnection) -> Result<Option<Model>, ModelError> {
    let found = Entity::find().order_by_desc(Column::DateAwake).one(db).await?;
    Ok(found)
}

/// Nights with `start <= date_awake < end`, oldest first.
pub async fn find_in_range(db: &DatabaseConnection, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Model>, ModelError> {
    let rows = Entity::find()
        .filter(Column::DateAwake.gte(stored(start)))
        .filter(Column::DateAwake.lt(stored(end)))
        .order_by_asc(Column::DateAwake)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn delete_by_date_awake(db: &DatabaseConnection, date_awake: DateTime<Utc>) -> Result<bool, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::DateAwake.eq(stored(date_awake)))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

pub async fn delete_all(db: &DatabaseConnection) -> Result<u64, ModelError> {
    let res = Entity::delete_many().exec(db).await?;
    Ok(res.rows_affected)
}
