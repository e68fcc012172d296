//! Print the observations stored for a location.

use std::fmt::Write;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use super::load_dataset;
use crate::{
    dataset::{DayRecord, LocationHistory},
    store::Store,
};

pub async fn view(store: &Store, location: &str) -> Result<String> {
    let dataset = load_dataset(store).await?;

    dataset
        .get(location)
        .map(|history| render_table(location, history))
        .ok_or_else(|| anyhow!("No data over this location, {}", location))
}

pub fn render_table(location: &str, history: &LocationHistory) -> String {
    render_rows(location, history.iter())
}

/// Same layout as [`render_table`], restricted to a single date.
pub fn render_day(location: &str, date: &NaiveDate, record: &DayRecord) -> String {
    render_rows(location, [(date, record)])
}

fn render_rows<'a, I>(location: &str, rows: I) -> String
where
    I: IntoIterator<Item = (&'a NaiveDate, &'a DayRecord)>,
{
    let mut out = String::new();

    let _ = writeln!(out, "{}", location);
    let _ = writeln!(
        out,
        "{:<10}  {:>7}  {:>6}  {:>6}  {:>4} {:<3}  {:>7}  {:>4}  {:>4}",
        "date", "temp C", "wind", "gust", "deg", "dir", "hPa", "hum%", "uv"
    );

    for (date, r) in rows {
        let _ = writeln!(
            out,
            "{:<10}  {:>7.1}  {:>6.1}  {:>6.1}  {:>4} {:<3}  {:>7.1}  {:>4}  {:>4.1}",
            date.to_string(),
            r.temperature_celsius,
            r.wind_speed_mps,
            r.gust_speed_mps,
            r.wind_degree,
            r.wind_direction,
            r.pressure_mb,
            r.humidity_percent,
            r.uv_index
        );
    }

    out
}

// -- Tests -------------------------------------------------------------------
