use chrono::{Duration, TimeZone, Utc};
use anyhow::Result;
use sea_orm::EntityTrait;

use super::setup_test_db;
use crate::record::{Interruption, NightRecord, SubstanceDose};
use crate::{night, prior_substance};

fn night_at(y: i32, m: u32, d: u32) -> NightRecord {
    let mut n = NightRecord::new(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap());
    n.edited = true;
    n
}

/// Upsert replaces in place: same id, one row, new content
#[tokio::test]
async fn test_night_upsert_replaces_by_date_awake() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let initial = night_at(1987, 3, 14);
    night::delete_by_date_awake(&db, initial.date_awake).await?;

    let first = night::upsert(&db, &initial).await?;

    let mut updated = initial.clone();
    updated.interruptions.push(Interruption { duration: "PT3H".into(), notes: "storm".into() });
    updated.meds_and_alcohol.push(SubstanceDose { substance: "tea".into(), time: None, quantity: Some(1.0) });
    updated.sleep_quality = Some("2".into());
    let second = night::upsert(&db, &updated).await?;

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);

    let found = night::find_by_date_awake(&db, initial.date_awake).await?.expect("night stored");
    let record = NightRecord::try_from(found)?;
    assert_eq!(record, updated);
    assert_eq!(record.interruptions[0].duration, "PT3H");

    assert!(night::delete_by_date_awake(&db, initial.date_awake).await?);
    assert!(night::find_by_date_awake(&db, initial.date_awake).await?.is_none());
    Ok(())
}

/// Range scan is half-open and ordered by wake date
#[tokio::test]
async fn test_night_range_is_half_open_and_ordered() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let days = [night_at(1988, 6, 9), night_at(1988, 6, 6), night_at(1988, 6, 7)];
    for n in &days {
        night::upsert(&db, n).await?;
    }

    let start = Utc.with_ymd_and_hms(1988, 6, 6, 0, 0, 0).unwrap();
    let rows = night::find_in_range(&db, start, start + Duration::days(3)).await?;
    let dates: Vec<_> = rows.iter().map(|m| m.date_awake.with_timezone(&Utc)).collect();
    assert_eq!(dates, vec![start, start + Duration::days(1)]);

    for n in &days {
        night::delete_by_date_awake(&db, n.date_awake).await?;
    }
    Ok(())
}

/// Presets are returned in insertion order without ids
#[tokio::test]
async fn test_prior_substance_create_and_list() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let name = format!("preset-{}", uuid::Uuid::new_v4());
    let dose = SubstanceDose { substance: name.clone(), time: None, quantity: Some(2.5) };
    let created = prior_substance::create(&db, &dose).await?;

    let all = prior_substance::list(&db).await?;
    let found: Vec<SubstanceDose> = all.into_iter().filter(|m| m.substance == name).map(Into::into).collect();
    assert_eq!(found, vec![dose]);

    prior_substance::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_prior_substance_requires_name() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let res = prior_substance::create(&db, &SubstanceDose::default()).await;
    assert!(matches!(res, Err(crate::errors::ModelError::Validation(_))));
    Ok(())
}
