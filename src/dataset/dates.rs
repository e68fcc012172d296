//! Works out which dates must be requested to bring a dataset up to date.

use std::fmt;

use chrono::{Days, Local, NaiveDate, NaiveDateTime, Timelike};

use crate::error::InconsistentDataset;

use super::Dataset;

/// Source of the current local date and time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Inclusive range of dates to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Number of days covered, both ends included.
    pub fn days(&self) -> usize {
        (self.end - self.start).num_days().max(0) as usize + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Fetch(DateWindow),
    UpToDate,
}

/// Parameters of the resolver that are deployment choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvePolicy {
    /// Location whose history marks how far the dataset reaches. Must be
    /// present whenever the dataset is non-empty.
    pub anchor: String,
    /// Upper bound on how many days back an update reaches.
    pub backfill_days: u64,
    /// Hour of day from which today's observation counts as available.
    pub cutoff_hour: u32,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self {
            anchor: "Stockholm, Sweden".to_string(),
            backfill_days: 7,
            cutoff_hour: 12,
        }
    }
}

pub fn resolve(
    dataset: &Dataset,
    clock: &impl Clock,
    policy: &ResolvePolicy,
) -> Result<Resolution, InconsistentDataset> {
    let now = clock.now();
    let today = now.date();

    let end = if now.hour() >= policy.cutoff_hour {
        today
    } else {
        days_before(today, 1)
    };

    let earliest = days_before(today, policy.backfill_days);
    let start = if dataset.is_empty() {
        earliest
    } else {
        let history = dataset
            .get(&policy.anchor)
            .ok_or_else(|| InconsistentDataset {
                anchor: policy.anchor.clone(),
            })?;

        match history.latest_date() {
            Some(latest) => (latest + Days::new(1)).max(earliest),
            None => earliest,
        }
    };

    if start > end {
        return Ok(Resolution::UpToDate);
    }

    // A single-day window is widened so the previous day is re-fetched too;
    // the latest day is sometimes incomplete upstream.
    let start = if start == end {
        days_before(start, 1)
    } else {
        start
    };

    Ok(Resolution::Fetch(DateWindow { start, end }))
}

/// Saturates at the earliest representable date.
fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

// -- Tests -------------------------------------------------------------------
