use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::record::SubstanceDose;

/// Substance preset offered by the front end when filling in a night.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prior_substance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub substance: String,
    pub time: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Double", nullable)]
    pub quantity: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SubstanceDose {
    fn from(m: Model) -> Self {
        SubstanceDose {
            substance: m.substance,
            time: m.time.map(|t| t.with_timezone(&Utc)),
            quantity: m.quantity,
        }
    }
}

pub async fn create(db: &DatabaseConnection, dose: &SubstanceDose) -> Result<Model, ModelError> {
    dose.validate()?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        substance: Set(dose.substance.clone()),
        time: Set(dose.time.map(|t| t.fixed_offset())),
        quantity: Set(dose.quantity),
        created_at: Set(Utc::now().fixed_offset()),
    };
    Ok(am.insert(db).await?)
}

/// All presets in insertion order.
pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    let rows = Entity::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}
