use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use common::time::{parse_instant, parse_zoned, start_of_day, week_window, WeekWindow};
use models::{NightProperty, NightRecord, SubstanceDose};
use tracing::{debug, info, instrument};

use super::domain::{AnalyticsPoint, WeekPolicy};
use super::repository::NightRepository;
use crate::errors::ServiceError;

/// Night business service independent of web framework.
///
/// Every method takes raw client input (date strings, JSON bodies) and does
/// the normalizing itself, so handlers only translate errors to statuses.
pub struct NightService {
    repo: Arc<dyn NightRepository>,
    week: WeekPolicy,
}

impl NightService {
    pub fn new(repo: Arc<dyn NightRepository>, week: WeekPolicy) -> Self { Self { repo, week } }

    pub fn week_policy(&self) -> WeekPolicy { self.week }

    /// Night whose wake instant equals `date_awake` after normalization.
    #[instrument(skip(self))]
    pub async fn get(&self, date_awake: &str) -> Result<NightRecord, ServiceError> {
        let key = parse_instant(date_awake)?;
        self.repo.find(key).await?.ok_or_else(|| ServiceError::not_found("night"))
    }

    /// Most recent night on record.
    pub async fn latest(&self) -> Result<NightRecord, ServiceError> {
        self.repo.latest().await?.ok_or_else(|| ServiceError::not_found("night"))
    }

    /// Normalize a request body and store it, replacing any night with the
    /// same wake date.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::nights::{NightService, WeekPolicy, repository::mock::MockNightRepository};
    /// let svc = NightService::new(Arc::new(MockNightRepository::default()), WeekPolicy::default());
    /// let body = serde_json::json!({"dateAwake": "2002-09-03", "sleepQuality": 4});
    /// let saved = tokio_test::block_on(svc.upsert(body)).unwrap();
    /// assert_eq!(saved.sleep_quality.as_deref(), Some("4"));
    /// ```
    #[instrument(skip(self, body))]
    pub async fn upsert(&self, body: serde_json::Value) -> Result<NightRecord, ServiceError> {
        let record = NightRecord::from_json(body)?;
        let saved = self.repo.upsert(&record).await?;
        info!(date_awake = %saved.date_awake, edited = saved.edited, "night_saved");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, date_awake: &str) -> Result<(), ServiceError> {
        let key = parse_instant(date_awake)?;
        if self.repo.delete(key).await? {
            info!(%key, "night_deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("night"))
        }
    }

    /// Remove every night; presets are kept.
    pub async fn clear(&self) -> Result<u64, ServiceError> {
        let removed = self.repo.clear().await?;
        info!(removed, "nights_cleared");
        Ok(removed)
    }

    /// Window of the week containing `day` under this service's policy.
    pub fn week_window(&self, day: &str) -> Result<WeekWindow, ServiceError> {
        let zoned = parse_zoned(day)?;
        week_window(zoned, self.week.starts_on, self.week.lead)
            .ok_or_else(|| ServiceError::Validation(format!("date out of range: {}", day.trim())))
    }

    /// Nights recorded in the calendar week containing `day`, oldest first.
    /// Missing days are left out; a week with no nights is not found.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::nights::{NightService, WeekPolicy, repository::mock::MockNightRepository};
    /// let svc = NightService::new(Arc::new(MockNightRepository::default()), WeekPolicy::default());
    /// for d in ["2002-09-02", "2002-09-05", "2002-09-10"] {
    ///     tokio_test::block_on(svc.upsert(serde_json::json!({"dateAwake": d}))).unwrap();
    /// }
    /// let week = tokio_test::block_on(svc.week_of("2002-09-03")).unwrap();
    /// assert_eq!(week.len(), 2);
    /// ```
    #[instrument(skip(self))]
    pub async fn week_of(&self, day: &str) -> Result<Vec<NightRecord>, ServiceError> {
        let window = self.week_window(day)?;
        let nights = self.repo.in_range(window.start, window.end).await?;
        debug!(start = %window.start, end = %window.end, count = nights.len(), "week_scanned");
        if nights.is_empty() {
            return Err(ServiceError::not_found("week"));
        }
        Ok(nights)
    }

    /// Values of one property for nights with `start <= dateAwake < end`.
    ///
    /// The range must be non-empty and lie before tomorrow (UTC) relative
    /// to `now`. Nights where the property is absent are skipped.
    #[instrument(skip(self, now))]
    pub async fn analytics(
        &self,
        property: &str,
        start: &str,
        end: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnalyticsPoint>, ServiceError> {
        let property: NightProperty = property.parse()?;
        let start = parse_instant(start)?;
        let end = parse_instant(end)?;
        let tomorrow = start_of_day(now) + Duration::days(1);
        if start >= tomorrow || end >= tomorrow || start >= end {
            return Err(ServiceError::Validation("invalid date range".into()));
        }

        let nights = self.repo.in_range(start, end).await?;
        let points: Vec<AnalyticsPoint> = nights
            .into_iter()
            .filter_map(|n| {
                n.property_value(property)
                    .map(|value| AnalyticsPoint { date_awake: n.date_awake, property, value })
            })
            .collect();
        debug!(%property, count = points.len(), "analytics_collected");
        Ok(points)
    }

    pub async fn prior_substances(&self) -> Result<Vec<SubstanceDose>, ServiceError> {
        self.repo.prior_substances().await
    }

    #[instrument(skip(self, body))]
    pub async fn add_prior_substance(&self, body: serde_json::Value) -> Result<SubstanceDose, ServiceError> {
        let dose: SubstanceDose = serde_json::from_value(body).map_err(|e| ServiceError::Validation(e.to_string()))?;
        let saved = self.repo.add_prior_substance(&dose).await?;
        info!(substance = %saved.substance, "prior_substance_added");
        Ok(saved)
    }
}
