//! Canonical in-memory shape of a night and the normalization applied to
//! whatever the front end sends.
//!
//! Wire names are camelCase and keep the front end's historical
//! `interuptions` spelling. Input is read leniently (see [`lenient`]);
//! output is always the canonical form.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use common::time::serde_instant;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// One night's sleep, keyed by the instant the subject woke up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightRecord {
    #[serde(with = "serde_instant")]
    pub date_awake: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub edited: bool,
    #[serde(default, with = "serde_instant::option", skip_serializing_if = "Option::is_none")]
    pub bed_time: Option<DateTime<Utc>>,
    #[serde(default, with = "serde_instant::option", skip_serializing_if = "Option::is_none")]
    pub fell_asleep_at: Option<DateTime<Utc>>,
    #[serde(rename = "interuptions", alias = "interruptions", default, deserialize_with = "lenient::list")]
    pub interruptions: Vec<Interruption>,
    #[serde(default, with = "serde_instant::option", skip_serializing_if = "Option::is_none")]
    pub woke_up: Option<DateTime<Utc>>,
    #[serde(default, with = "serde_instant::option", skip_serializing_if = "Option::is_none")]
    pub got_up: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub rested_rating: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub meds_and_alcohol: Vec<SubstanceDose>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A period awake during the night. `duration` is an ISO-8601 duration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interruption {
    #[serde(default, deserialize_with = "lenient::duration")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub notes: String,
}

/// A medication or drink taken around bed time. Also used for the
/// prior-substance presets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstanceDose {
    #[serde(default, deserialize_with = "lenient::string")]
    pub substance: String,
    #[serde(default, with = "serde_instant::option", skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
}

impl SubstanceDose {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.substance.is_empty() {
            return Err(ModelError::Validation("substance name required".into()));
        }
        if let Some(q) = self.quantity {
            if !q.is_finite() || q < 0.0 {
                return Err(ModelError::Validation(format!("invalid quantity for {}: {q}", self.substance)));
            }
        }
        Ok(())
    }
}

impl NightRecord {
    /// An unedited night with only its key set.
    pub fn new(date_awake: DateTime<Utc>) -> Self {
        Self {
            date_awake,
            edited: false,
            bed_time: None,
            fell_asleep_at: None,
            interruptions: Vec::new(),
            woke_up: None,
            got_up: None,
            rested_rating: None,
            sleep_quality: None,
            meds_and_alcohol: Vec::new(),
            notes: None,
        }
    }

    /// Parse a request body into the canonical shape and validate it.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ModelError> {
        let record: NightRecord = serde_json::from_value(value).map_err(|e| ModelError::Validation(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for dose in &self.meds_and_alcohol {
            dose.validate()?;
        }
        if let Some(i) = self.interruptions.iter().find(|i| !i.duration.is_empty() && !i.duration.starts_with('P')) {
            return Err(ModelError::Validation(format!("interruption duration is not ISO-8601: {}", i.duration)));
        }
        Ok(())
    }

    /// Value of one property in wire form, or `None` when it is absent.
    /// Lists are always present, even when empty.
    pub fn property_value(&self, property: NightProperty) -> Option<serde_json::Value> {
        let mut obj = match serde_json::to_value(self).ok()? {
            serde_json::Value::Object(map) => map,
            _ => return None,
        };
        obj.remove(property.as_str()).filter(|v| !v.is_null())
    }
}

/// Night fields that analytics can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NightProperty {
    Edited,
    BedTime,
    FellAsleepAt,
    Interruptions,
    WokeUp,
    GotUp,
    RestedRating,
    SleepQuality,
    MedsAndAlcohol,
    Notes,
}

impl NightProperty {
    pub const ALL: [NightProperty; 10] = [
        NightProperty::Edited,
        NightProperty::BedTime,
        NightProperty::FellAsleepAt,
        NightProperty::Interruptions,
        NightProperty::WokeUp,
        NightProperty::GotUp,
        NightProperty::RestedRating,
        NightProperty::SleepQuality,
        NightProperty::MedsAndAlcohol,
        NightProperty::Notes,
    ];

    /// Wire name as used in JSON bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            NightProperty::Edited => "edited",
            NightProperty::BedTime => "bedTime",
            NightProperty::FellAsleepAt => "fellAsleepAt",
            NightProperty::Interruptions => "interuptions",
            NightProperty::WokeUp => "wokeUp",
            NightProperty::GotUp => "gotUp",
            NightProperty::RestedRating => "restedRating",
            NightProperty::SleepQuality => "sleepQuality",
            NightProperty::MedsAndAlcohol => "medsAndAlcohol",
            NightProperty::Notes => "notes",
        }
    }
}

impl fmt::Display for NightProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NightProperty {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "interruptions" {
            return Ok(NightProperty::Interruptions);
        }
        NightProperty::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ModelError::Validation(format!("unknown night property: {s}")))
    }
}

/// Deserializers that accept the loose shapes older clients send.
pub mod lenient {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    impl Scalar {
        fn into_text(self) -> String {
            match self {
                Scalar::Bool(b) => b.to_string(),
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Text(s) => s.trim().to_string(),
            }
        }
    }

    /// Optional string; numbers become their decimal text, blanks become `None`.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Scalar>::deserialize(d)?.map(Scalar::into_text).filter(|s| !s.is_empty()))
    }

    /// Like [`text`] but collapsing `None` to the empty string.
    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(text(d)?.unwrap_or_default())
    }

    /// Optional number; numeric strings are parsed.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Scalar>::deserialize(d)? {
            None => Ok(None),
            Some(Scalar::Int(i)) => Ok(Some(i as f64)),
            Some(Scalar::Float(f)) => Ok(Some(f)),
            Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Scalar::Text(s)) => s.trim().parse::<f64>().map(Some).map_err(de::Error::custom),
            Some(Scalar::Bool(b)) => Err(de::Error::custom(format!("expected a number, got {b}"))),
        }
    }

    /// ISO-8601 duration; a bare number is taken as minutes.
    pub fn duration<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Option::<Scalar>::deserialize(d)? {
            None => Ok(String::new()),
            Some(Scalar::Int(m)) => Ok(format!("PT{m}M")),
            Some(Scalar::Float(m)) => Ok(format!("PT{m}M")),
            Some(Scalar::Text(s)) => Ok(s.trim().to_ascii_uppercase()),
            Some(Scalar::Bool(b)) => Err(de::Error::custom(format!("expected a duration, got {b}"))),
        }
    }

    /// Boolean that also accepts `"true"`/`"false"` and `0`/`1`.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Option::<Scalar>::deserialize(d)? {
            None => Ok(false),
            Some(Scalar::Bool(b)) => Ok(b),
            Some(Scalar::Int(i)) => Ok(i != 0),
            Some(Scalar::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" | "" => Ok(false),
                other => Err(de::Error::custom(format!("expected a boolean, got {other}"))),
            },
            Some(Scalar::Float(f)) => Err(de::Error::custom(format!("expected a boolean, got {f}"))),
        }
    }

    /// List where `null` means empty.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
    }
}
