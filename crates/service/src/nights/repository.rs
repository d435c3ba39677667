use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::debug;

use models::{night, prior_substance, NightRecord, SubstanceDose};

use crate::errors::ServiceError;

/// Persistence for nights and substance presets.
#[async_trait]
pub trait NightRepository: Send + Sync {
    async fn find(&self, date_awake: DateTime<Utc>) -> Result<Option<NightRecord>, ServiceError>;
    async fn latest(&self) -> Result<Option<NightRecord>, ServiceError>;
    /// Insert, or replace the night with the same `date_awake`.
    async fn upsert(&self, record: &NightRecord) -> Result<NightRecord, ServiceError>;
    /// Nights with `start <= date_awake < end`, ascending.
    async fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<NightRecord>, ServiceError>;
    async fn delete(&self, date_awake: DateTime<Utc>) -> Result<bool, ServiceError>;
    async fn clear(&self) -> Result<u64, ServiceError>;

    async fn prior_substances(&self) -> Result<Vec<SubstanceDose>, ServiceError>;
    async fn add_prior_substance(&self, dose: &SubstanceDose) -> Result<SubstanceDose, ServiceError>;
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmNightRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmNightRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn into_records(rows: Vec<night::Model>) -> Result<Vec<NightRecord>, ServiceError> {
    rows.into_iter()
        .map(|m| NightRecord::try_from(m).map_err(ServiceError::from))
        .collect()
}

#[async_trait]
impl NightRepository for SeaOrmNightRepository {
    async fn find(&self, date_awake: DateTime<Utc>) -> Result<Option<NightRecord>, ServiceError> {
        let found = night::find_by_date_awake(&self.db, date_awake).await?;
        Ok(found.map(NightRecord::try_from).transpose()?)
    }

    async fn latest(&self) -> Result<Option<NightRecord>, ServiceError> {
        let found = night::find_latest(&self.db).await?;
        Ok(found.map(NightRecord::try_from).transpose()?)
    }

    async fn upsert(&self, record: &NightRecord) -> Result<NightRecord, ServiceError> {
        let saved = night::upsert(&self.db, record).await?;
        debug!(id = %saved.id, "night row written");
        Ok(NightRecord::try_from(saved)?)
    }

    async fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<NightRecord>, ServiceError> {
        let rows = night::find_in_range(&self.db, start, end).await?;
        debug!(count = rows.len(), "night range scanned");
        into_records(rows)
    }

    async fn delete(&self, date_awake: DateTime<Utc>) -> Result<bool, ServiceError> {
        Ok(night::delete_by_date_awake(&self.db, date_awake).await?)
    }

    async fn clear(&self) -> Result<u64, ServiceError> {
        Ok(night::delete_all(&self.db).await?)
    }

    async fn prior_substances(&self) -> Result<Vec<SubstanceDose>, ServiceError> {
        let rows = prior_substance::list(&self.db).await?;
        Ok(rows.into_iter().map(SubstanceDose::from).collect())
    }

    async fn add_prior_substance(&self, dose: &SubstanceDose) -> Result<SubstanceDose, ServiceError> {
        let created = prior_substance::create(&self.db, dose).await?;
        Ok(created.into())
    }
}

/// In-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    pub struct MockNightRepository {
        nights: Mutex<BTreeMap<DateTime<Utc>, NightRecord>>, // key: date_awake
        presets: Mutex<Vec<SubstanceDose>>,
        failing: AtomicBool,
    }

    impl MockNightRepository {
        /// Repository whose every call fails like an unreachable database.
        pub fn failing() -> Self {
            let repo = Self::default();
            repo.set_failing(true);
            repo
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), ServiceError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("connection refused".into()));
            }
            Ok(())
        }

        fn nights(&self) -> Result<MutexGuard<'_, BTreeMap<DateTime<Utc>, NightRecord>>, ServiceError> {
            self.check()?;
            self.nights.lock().map_err(|_| ServiceError::Db("night store poisoned".into()))
        }

        fn presets(&self) -> Result<MutexGuard<'_, Vec<SubstanceDose>>, ServiceError> {
            self.check()?;
            self.presets.lock().map_err(|_| ServiceError::Db("preset store poisoned".into()))
        }
    }

    #[async_trait]
    impl NightRepository for MockNightRepository {
        async fn find(&self, date_awake: DateTime<Utc>) -> Result<Option<NightRecord>, ServiceError> {
            Ok(self.nights()?.get(&date_awake).cloned())
        }

        async fn latest(&self) -> Result<Option<NightRecord>, ServiceError> {
            Ok(self.nights()?.values().next_back().cloned())
        }

        async fn upsert(&self, record: &NightRecord) -> Result<NightRecord, ServiceError> {
            record.validate()?;
            self.nights()?.insert(record.date_awake, record.clone());
            Ok(record.clone())
        }

        async fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<NightRecord>, ServiceError> {
            if start >= end {
                return Ok(Vec::new());
            }
            Ok(self.nights()?.range(start..end).map(|(_, n)| n.clone()).collect())
        }

        async fn delete(&self, date_awake: DateTime<Utc>) -> Result<bool, ServiceError> {
            Ok(self.nights()?.remove(&date_awake).is_some())
        }

        async fn clear(&self) -> Result<u64, ServiceError> {
            let mut nights = self.nights()?;
            let n = nights.len() as u64;
            nights.clear();
            Ok(n)
        }

        async fn prior_substances(&self) -> Result<Vec<SubstanceDose>, ServiceError> {
            Ok(self.presets()?.clone())
        }

        async fn add_prior_substance(&self, dose: &SubstanceDose) -> Result<SubstanceDose, ServiceError> {
            dose.validate()?;
            self.presets()?.push(dose.clone());
            Ok(dose.clone())
        }
    }
}
