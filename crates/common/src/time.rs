//! Date handling for night records.
//!
//! Wake dates reach the API as RFC 3339 strings from the front end, bare
//! calendar dates typed into URLs, or epoch milliseconds from older clients.
//! Everything is normalized to UTC instants here. Calendar-week windows are
//! computed in the offset the caller supplied, so a week requested from
//! `-04:00` starts at local midnight rather than UTC midnight.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("empty date string")]
    Empty,
    #[error("unrecognized date format: {0}")]
    Format(String),
    #[error("epoch milliseconds out of range: {0}")]
    OutOfRange(i64),
}

/// Offset-carrying forms that `parse_from_rfc3339` rejects (no seconds).
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];

/// Local forms, read as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a date string, keeping the offset it was written in.
/// Strings without an offset are taken as UTC. Precision is cut to
/// milliseconds, the precision instants are written back out with.
pub fn parse_zoned(text: &str) -> Result<DateTime<FixedOffset>, TimeParseError> {
    parse_zoned_exact(text).map(|dt| dt.trunc_subsecs(3))
}

fn parse_zoned_exact(text: &str) -> Result<DateTime<FixedOffset>, TimeParseError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(TimeParseError::Empty);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset());
    }
    Err(TimeParseError::Format(s.to_string()))
}

/// Parse a date string into a UTC instant.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, TimeParseError> {
    parse_zoned(text).map(|dt| dt.with_timezone(&Utc))
}

pub fn from_epoch_millis(ms: i64) -> Result<DateTime<Utc>, TimeParseError> {
    DateTime::from_timestamp_millis(ms).ok_or(TimeParseError::OutOfRange(ms))
}

/// Canonical wire form: RFC 3339, UTC, millisecond precision.
pub fn format_instant(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// First day of a calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    fn days_into_week(self, date: NaiveDate) -> i64 {
        let wd = date.weekday();
        i64::from(match self {
            WeekStart::Monday => wd.num_days_from_monday(),
            WeekStart::Sunday => wd.num_days_from_sunday(),
        })
    }
}

/// Half-open `[start, end)` range of wake instants belonging to one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WeekWindow {
    pub fn contains(&self, t: &DateTime<Utc>) -> bool {
        *t >= self.start && *t < self.end
    }
}

/// Window for the calendar week containing `day`'s local date.
///
/// The start is pulled back by `lead` so that a wake time recorded late on
/// the evening before the first day still lands in the week it belongs to.
/// `None` when either bound falls outside the representable range.
pub fn week_window(day: DateTime<FixedOffset>, starts_on: WeekStart, lead: Duration) -> Option<WeekWindow> {
    let local = day.date_naive();
    let first = local.checked_sub_signed(Duration::days(starts_on.days_into_week(local)))?;
    let offset = Duration::seconds(i64::from(day.offset().local_minus_utc()));
    let week_start = first.and_time(NaiveTime::MIN).and_utc().checked_sub_signed(offset)?;
    Some(WeekWindow {
        start: week_start.checked_sub_signed(lead)?,
        end: week_start.checked_add_signed(Duration::days(7))?,
    })
}

/// Serde adapter for instants: writes the canonical string, reads any
/// string form `parse_instant` accepts or integer/float epoch milliseconds.
pub mod serde_instant {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{format_instant, from_epoch_millis, parse_instant, TimeParseError};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawInstant {
        Millis(i64),
        Fractional(f64),
        Text(String),
    }

    impl RawInstant {
        fn into_instant(self) -> Result<Option<DateTime<Utc>>, TimeParseError> {
            match self {
                RawInstant::Millis(ms) => from_epoch_millis(ms).map(Some),
                RawInstant::Fractional(ms) => from_epoch_millis(ms.round() as i64).map(Some),
                RawInstant::Text(s) if s.trim().is_empty() => Ok(None),
                RawInstant::Text(s) => parse_instant(&s).map(Some),
            }
        }
    }

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_instant(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        RawInstant::deserialize(d)?
            .into_instant()
            .map_err(de::Error::custom)?
            .ok_or_else(|| de::Error::custom(TimeParseError::Empty))
    }

    /// Optional variant: `null`, absent and blank strings all read as `None`.
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(t: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
            match t {
                Some(t) => s.serialize_some(&format_instant(t)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<RawInstant>::deserialize(d)? {
                Some(raw) => raw.into_instant().map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let t = parse_instant("2002-09-03T00:00:00.000-04:00").unwrap();
        assert_eq!(t, utc(2002, 9, 3, 4));
        let z = parse_zoned("2002-09-03T00:00:00-04:00").unwrap();
        assert_eq!(z.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn parses_naive_and_date_only_as_utc() {
        assert_eq!(parse_instant("2002-09-03").unwrap(), utc(2002, 9, 3, 0));
        assert_eq!(parse_instant("2002-09-03T07:00:00").unwrap(), utc(2002, 9, 3, 7));
        assert_eq!(parse_instant("2002-09-03 07:00").unwrap(), utc(2002, 9, 3, 7));
        assert_eq!(parse_instant("  2002-09-03T07:00:00Z ").unwrap(), utc(2002, 9, 3, 7));
    }

    #[test]
    fn parses_offset_without_seconds() {
        assert_eq!(parse_instant("2002-09-03T07:00+02:00").unwrap(), utc(2002, 9, 3, 5));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_instant("   "), Err(TimeParseError::Empty));
        assert!(matches!(parse_instant("last tuesday"), Err(TimeParseError::Format(_))));
        assert!(matches!(parse_instant("2002-13-40"), Err(TimeParseError::Format(_))));
    }

    #[test]
    fn canonical_format_is_utc_millis() {
        let t = parse_instant("2002-09-03T00:00:00-04:00").unwrap();
        assert_eq!(format_instant(&t), "2002-09-03T04:00:00.000Z");
    }

    #[test]
    fn epoch_millis_round_trip() {
        let t = utc(2019, 5, 1, 6);
        assert_eq!(from_epoch_millis(t.timestamp_millis()).unwrap(), t);
        assert!(matches!(from_epoch_millis(i64::MAX), Err(TimeParseError::OutOfRange(_))));
    }

    #[test]
    fn monday_week_for_a_tuesday() {
        // 2002-09-03 is a Tuesday
        let day = parse_zoned("2002-09-03").unwrap();
        let w = week_window(day, WeekStart::Monday, Duration::hours(8)).unwrap();
        assert_eq!(w.start, utc(2002, 9, 1, 16));
        assert_eq!(w.end, utc(2002, 9, 9, 0));
        assert!(w.contains(&utc(2002, 9, 2, 0)));
        assert!(w.contains(&utc(2002, 9, 8, 0)));
        assert!(!w.contains(&utc(2002, 9, 9, 0)));
    }

    #[test]
    fn sunday_week_for_a_tuesday() {
        let day = parse_zoned("2002-09-03T12:00:00Z").unwrap();
        let w = week_window(day, WeekStart::Sunday, Duration::hours(8)).unwrap();
        assert_eq!(w.start, utc(2002, 8, 31, 16));
        assert_eq!(w.end, utc(2002, 9, 8, 0));
    }

    #[test]
    fn week_start_day_maps_to_itself() {
        let monday = parse_zoned("2002-09-02").unwrap();
        let w = week_window(monday, WeekStart::Monday, Duration::zero()).unwrap();
        assert_eq!(w.start, utc(2002, 9, 2, 0));
    }

    #[test]
    fn week_window_follows_local_offset() {
        // Sunday 22:00 at -04:00 is Monday 02:00 UTC but still the earlier week locally.
        let day = parse_zoned("2002-09-08T22:00:00-04:00").unwrap();
        let w = week_window(day, WeekStart::Monday, Duration::zero()).unwrap();
        assert_eq!(w.start, utc(2002, 9, 2, 4));
        assert_eq!(w.end, utc(2002, 9, 9, 4));
    }

    #[test]
    fn sub_millisecond_precision_is_dropped() {
        let t = parse_instant("2002-09-03T04:00:00.1234Z").unwrap();
        assert_eq!(format_instant(&t), "2002-09-03T04:00:00.123Z");
        assert_eq!(parse_instant(&format_instant(&t)).unwrap(), t);
        let naive = parse_instant("2002-09-03 04:00:00.999999").unwrap();
        assert_eq!(naive.timestamp_subsec_nanos(), 999_000_000);
    }

    #[test]
    fn week_window_at_the_calendar_edge_is_none() {
        let last = parse_zoned("+262142-12-31").unwrap();
        assert_eq!(week_window(last, WeekStart::Monday, Duration::hours(8)), None);
        let ordinary = parse_zoned("2002-09-03").unwrap();
        assert!(week_window(ordinary, WeekStart::Sunday, Duration::hours(8)).is_some());
    }

    #[test]
    fn start_of_day_truncates() {
        assert_eq!(start_of_day(utc(2020, 1, 5, 13)), utc(2020, 1, 5, 0));
    }

    #[test]
    fn week_start_reads_lowercase() {
        let w: WeekStart = serde_json::from_str("\"sunday\"").unwrap();
        assert_eq!(w, WeekStart::Sunday);
    }

    #[derive(serde::Deserialize)]
    struct Probe {
        #[serde(with = "serde_instant")]
        at: DateTime<Utc>,
        #[serde(default, with = "serde_instant::option")]
        maybe: Option<DateTime<Utc>>,
    }

    #[test]
    fn serde_adapter_accepts_strings_and_millis() {
        let ms = utc(2002, 9, 3, 0).timestamp_millis();
        let p: Probe = serde_json::from_value(serde_json::json!({"at": ms, "maybe": ""})).unwrap();
        assert_eq!(p.at, utc(2002, 9, 3, 0));
        assert_eq!(p.maybe, None);

        let p: Probe = serde_json::from_value(serde_json::json!({"at": "2002-09-03", "maybe": "2002-09-02T23:00:00Z"})).unwrap();
        assert_eq!(p.maybe, Some(utc(2002, 9, 2, 23)));

        assert!(serde_json::from_value::<Probe>(serde_json::json!({"at": ""})).is_err());
        assert!(serde_json::from_value::<Probe>(serde_json::json!({"at": null})).is_err());
    }
}
