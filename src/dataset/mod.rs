//! The persisted weather dataset and the merging of fetched observations.
//!
//! A [`Dataset`] maps a location key (`"City, Country"` as reported by the
//! upstream API) to a [`LocationHistory`], which maps a calendar date to the
//! [`DayRecord`] observed at noon on that day.

pub mod dates;

use std::collections::{btree_map, BTreeMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use dates::{resolve, Clock, DateWindow, Resolution, ResolvePolicy, SystemClock};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    locations: BTreeMap<String, LocationHistory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationHistory {
    days: BTreeMap<NaiveDate, DayRecord>,
}

/// Weather captured for one location on one date. Serialised with the field
/// names used by existing data files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(rename = "temp")]
    pub temperature_celsius: f64,
    #[serde(rename = "windspeed")]
    pub wind_speed_mps: f64,
    #[serde(rename = "gust")]
    pub gust_speed_mps: f64,
    pub wind_degree: u16,
    #[serde(rename = "wind_dir")]
    pub wind_direction: String,
    #[serde(rename = "air_pressure")]
    pub pressure_mb: f64,
    #[serde(rename = "humidity")]
    pub humidity_percent: u8,
    #[serde(rename = "uv")]
    pub uv_index: f64,
}

/// One day of raw noon observations, in the units the upstream API uses.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPayload {
    pub date: NaiveDate,
    pub temperature_celsius: f64,
    pub wind_speed_kph: f64,
    pub gust_speed_kph: f64,
    pub wind_degree: u16,
    pub wind_direction: String,
    pub pressure_mb: f64,
    pub humidity_percent: u8,
    pub uv_index: f64,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn get(&self, location: &str) -> Option<&LocationHistory> {
        self.locations.get(location)
    }

    #[cfg(test)]
    pub fn contains(&self, location: &str) -> bool {
        self.locations.contains_key(location)
    }

    /// Location keys in sorted order.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, LocationHistory> {
        self.locations.iter()
    }

    /// Merges payloads for `location`, replacing any record already stored
    /// for the same date.
    pub fn merge<'a, I>(&mut self, location: &str, payloads: I)
    where
        I: IntoIterator<Item = &'a DayPayload>,
    {
        let history = self.locations.entry(location.to_string()).or_default();

        for payload in payloads {
            history.insert(payload.date, DayRecord::from(payload));
        }
    }
}

impl LocationHistory {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<&DayRecord> {
        self.days.get(date)
    }

    pub fn insert(&mut self, date: NaiveDate, record: DayRecord) {
        self.days.insert(date, record);
    }

    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    /// Records in date order.
    pub fn iter(&self) -> btree_map::Iter<'_, NaiveDate, DayRecord> {
        self.days.iter()
    }
}

impl From<&DayPayload> for DayRecord {
    fn from(payload: &DayPayload) -> Self {
        DayRecord {
            temperature_celsius: payload.temperature_celsius,
            wind_speed_mps: kph_to_mps(payload.wind_speed_kph),
            gust_speed_mps: kph_to_mps(payload.gust_speed_kph),
            wind_degree: payload.wind_degree,
            wind_direction: payload.wind_direction.clone(),
            pressure_mb: payload.pressure_mb,
            humidity_percent: payload.humidity_percent,
            uv_index: payload.uv_index,
        }
    }
}

/// Converts km/h to m/s, rounded to one decimal place.
///
/// Rounding goes through the shortest decimal representation so ties resolve
/// the same way a correctly rounded `round(x, 1)` does.
pub fn kph_to_mps(kph: f64) -> f64 {
    let mps = kph / 3.6;
    format!("{:.1}", mps).parse().unwrap_or(mps)
}

// -- Tests -------------------------------------------------------------------
