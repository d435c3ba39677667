use chrono::{DateTime, Duration, Utc};
use common::time::{format_instant, WeekStart};
use models::NightProperty;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// How calendar weeks are cut.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeekPolicy {
    pub starts_on: WeekStart,
    /// Wake times this long before the first day still count toward the week.
    pub lead: Duration,
}

impl WeekPolicy {
    pub fn new(starts_on: WeekStart, lead_hours: u32) -> Self {
        Self { starts_on, lead: Duration::hours(i64::from(lead_hours)) }
    }
}

impl Default for WeekPolicy {
    fn default() -> Self { Self::new(WeekStart::Monday, 8) }
}

/// One graphable sample: a wake date and the value of the requested property.
/// Serializes as `{"dateAwake": ..., "<property>": value}`.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsPoint {
    pub date_awake: DateTime<Utc>,
    pub property: NightProperty,
    pub value: serde_json::Value,
}

impl Serialize for AnalyticsPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("dateAwake", &format_instant(&self.date_awake))?;
        map.serialize_entry(self.property.as_str(), &self.value)?;
        map.end()
    }
}
