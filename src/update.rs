//! Brings a dataset up to date by fetching each configured city in turn.

use crate::{
    dataset::{resolve, Clock, DateWindow, DayPayload, Dataset, Resolution, ResolvePolicy},
    error::{FetchError, InconsistentDataset},
    logging::UpdateLog,
};

/// Observations returned for one requested city.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedHistory {
    /// `"City, Country"` as reported upstream, which may differ from the
    /// name that was requested.
    pub location: String,
    pub days: Vec<DayPayload>,
}

/// Upstream service delivering one noon observation per day.
#[allow(async_fn_in_trait)]
pub trait HistorySource {
    async fn fetch(&self, location: &str, window: &DateWindow)
        -> Result<FetchedHistory, FetchError>;
}

#[derive(Debug)]
pub enum UpdateOutcome {
    /// Nothing to fetch, the dataset already reaches the latest available day.
    UpToDate,
    Updated { window: DateWindow },
    /// Fetching `location` failed. Cities merged before it stay merged.
    Failed { location: String, error: FetchError },
}

/// Fetches `window` for every city in `cities`, in order, merging each
/// response into `dataset`. The first failure stops the run.
pub async fn update<S, C, L>(
    dataset: &mut Dataset,
    cities: &[String],
    source: &S,
    clock: &C,
    policy: &ResolvePolicy,
    log: &L,
) -> Result<UpdateOutcome, InconsistentDataset>
where
    S: HistorySource,
    C: Clock,
    L: UpdateLog,
{
    let window = match resolve(dataset, clock, policy)? {
        Resolution::UpToDate => {
            log.info("Nothing to update, most recent data available");
            return Ok(UpdateOutcome::UpToDate);
        }
        Resolution::Fetch(window) => window,
    };

    log.info(&format!("Requesting {} for {} cities", window, cities.len()));
    let days = window.days();

    for city in cities {
        let fetched = match source.fetch(city, &window).await {
            Ok(fetched) if fetched.days.len() < days => Err(FetchError::ShortPayload {
                location: city.clone(),
                expected: days,
                found: fetched.days.len(),
            }),
            other => other,
        };

        match fetched {
            Ok(fetched) => {
                if fetched.days.len() > days {
                    log.warning(&format!(
                        "Response for {} holds {} days, keeping the first {}",
                        city,
                        fetched.days.len(),
                        days
                    ));
                }
                dataset.merge(&fetched.location, &fetched.days[..days]);
                log.info(&format!("Merged {} days for {}", days, fetched.location));
            }
            Err(error) => {
                log.error(&format!("Request failed for {}: {}", city, error));
                return Ok(UpdateOutcome::Failed {
                    location: city.clone(),
                    error,
                });
            }
        }
    }

    log.info("Requests successful");
    Ok(UpdateOutcome::Updated { window })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap};

    use chrono::Days;

    use super::*;
    use crate::{
        dataset::{dates::tests::FixedClock, tests::{date, payload}},
        logging::tests::{Level, RecordingLog},
    };

    /// Answers from a fixed table; cities without an entry fail with 500.
    #[derive(Default)]
    struct ScriptedSource {
        responses: HashMap<String, String>,
        extra_days: usize,
        missing_days: usize,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedSource {
        fn with(cities: &[(&str, &str)]) -> Self {
            ScriptedSource {
                responses: cities
                    .iter()
                    .map(|(city, country)| (city.to_string(), format!("{}, {}", city, country)))
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl HistorySource for ScriptedSource {
        async fn fetch(
            &self,
            location: &str,
            window: &DateWindow,
        ) -> Result<FetchedHistory, FetchError> {
            self.calls.borrow_mut().push(location.to_string());

            let Some(key) = self.responses.get(location) else {
                return Err(FetchError::Status {
                    location: location.to_string(),
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                });
            };

            let count = window.days() + self.extra_days - self.missing_days;
            let days = (0..count as u64)
                .map(|i| {
                    let day = window.start + Days::new(i);
                    payload(&day.to_string(), i as f64)
                })
                .collect();

            Ok(FetchedHistory {
                location: key.clone(),
                days,
            })
        }
    }

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    const SIX: [(&str, &str); 6] = [
        ("Stockholm", "Sweden"),
        ("London", "United Kingdom"),
        ("New York", "United States of America"),
        ("Los Angeles", "United States of America"),
        ("New Delhi", "India"),
        ("Tokyo", "Japan"),
    ];

    #[tokio::test]
    async fn should_fill_empty_dataset() {
        let source = ScriptedSource::with(&[("Stockholm", "Sweden")]);
        let clock = FixedClock::at("2024-09-17", 14);
        let log = RecordingLog::default();
        let mut dataset = Dataset::new();

        let outcome = update(
            &mut dataset,
            &cities(&["Stockholm"]),
            &source,
            &clock,
            &ResolvePolicy::default(),
            &log,
        )
        .await
        .unwrap();

        match outcome {
            UpdateOutcome::Updated { window } => {
                assert_eq!(window.start, date("2024-09-10"));
                assert_eq!(window.end, date("2024-09-17"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let history = dataset.get("Stockholm, Sweden").unwrap();
        assert_eq!(history.len(), 8);
        assert_eq!(history.earliest_date(), Some(date("2024-09-10")));
        assert_eq!(history.latest_date(), Some(date("2024-09-17")));
        assert!(!dataset.contains("Stockholm"));
    }

    #[tokio::test]
    async fn should_stop_at_first_failure_without_rollback() {
        let mut scripted: Vec<(&str, &str)> = SIX.to_vec();
        scripted.remove(2);
        let source = ScriptedSource::with(&scripted);
        let clock = FixedClock::at("2024-09-17", 14);
        let log = RecordingLog::default();
        let mut dataset = Dataset::new();
        let all: Vec<String> = SIX.iter().map(|(c, _)| c.to_string()).collect();

        let outcome = update(
            &mut dataset,
            &all,
            &source,
            &clock,
            &ResolvePolicy::default(),
            &log,
        )
        .await
        .unwrap();

        match outcome {
            UpdateOutcome::Failed { location, .. } => assert_eq!(location, "New York"),
            other => panic!("unexpected outcome {:?}", other),
        }

        assert_eq!(
            *source.calls.borrow(),
            cities(&["Stockholm", "London", "New York"])
        );
        assert_eq!(dataset.len(), 2);
        assert!(dataset.contains("Stockholm, Sweden"));
        assert!(dataset.contains("London, United Kingdom"));
        assert!(!dataset.contains("Tokyo, Japan"));
        assert!(log.contains(Level::Error, "New York"));
    }

    #[tokio::test]
    async fn should_be_up_to_date_on_rerun() {
        let source = ScriptedSource::with(&SIX);
        let clock = FixedClock::at("2024-09-17", 14);
        let log = RecordingLog::default();
        let all: Vec<String> = SIX.iter().map(|(c, _)| c.to_string()).collect();
        let mut dataset = Dataset::new();

        let first = update(&mut dataset, &all, &source, &clock, &ResolvePolicy::default(), &log)
            .await
            .unwrap();
        assert!(matches!(first, UpdateOutcome::Updated { .. }));
        assert_eq!(source.calls.borrow().len(), 6);

        let snapshot = dataset.clone();
        let second = update(&mut dataset, &all, &source, &clock, &ResolvePolicy::default(), &log)
            .await
            .unwrap();

        assert!(matches!(second, UpdateOutcome::UpToDate));
        assert_eq!(source.calls.borrow().len(), 6);
        assert_eq!(dataset, snapshot);
        assert!(log.contains(Level::Info, "Nothing to update"));
    }

    #[tokio::test]
    async fn should_merge_only_requested_days() {
        let source = ScriptedSource {
            extra_days: 3,
            ..ScriptedSource::with(&[("Tokyo", "Japan")])
        };
        let clock = FixedClock::at("2024-09-17", 14);
        let log = RecordingLog::default();
        let mut dataset = Dataset::new();

        update(
            &mut dataset,
            &cities(&["Tokyo"]),
            &source,
            &clock,
            &ResolvePolicy::default(),
            &log,
        )
        .await
        .unwrap();

        let history = dataset.get("Tokyo, Japan").unwrap();
        assert_eq!(history.len(), 8);
        assert_eq!(history.latest_date(), Some(date("2024-09-17")));
        assert!(log.contains(Level::Warning, "holds 11 days"));
    }

    #[tokio::test]
    async fn should_fail_on_short_payload() {
        let source = ScriptedSource {
            missing_days: 1,
            ..ScriptedSource::with(&[("Tokyo", "Japan")])
        };
        let clock = FixedClock::at("2024-09-17", 14);
        let mut dataset = Dataset::new();

        let outcome = update(
            &mut dataset,
            &cities(&["Tokyo"]),
            &source,
            &clock,
            &ResolvePolicy::default(),
            &RecordingLog::default(),
        )
        .await
        .unwrap();

        match outcome {
            UpdateOutcome::Failed {
                error: FetchError::ShortPayload { expected, found, .. },
                ..
            } => {
                assert_eq!(expected, 8);
                assert_eq!(found, 7);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(dataset.is_empty());
    }

    #[tokio::test]
    async fn should_report_inconsistent_dataset() {
        let source = ScriptedSource::with(&SIX);
        let clock = FixedClock::at("2024-09-17", 14);
        let mut dataset = Dataset::new();
        dataset.merge("Tokyo, Japan", &[payload("2024-09-16", 25.0)]);

        let err = update(
            &mut dataset,
            &cities(&["Tokyo"]),
            &source,
            &clock,
            &ResolvePolicy::default(),
            &RecordingLog::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.anchor, "Stockholm, Sweden");
        assert!(source.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn should_request_two_days_when_one_is_missing() {
        let source = ScriptedSource::with(&[("Stockholm", "Sweden")]);
        let clock = FixedClock::at("2024-09-17", 14);
        let mut dataset = Dataset::new();
        dataset.merge("Stockholm, Sweden", &[payload("2024-09-16", 9.0)]);

        let outcome = update(
            &mut dataset,
            &cities(&["Stockholm"]),
            &source,
            &clock,
            &ResolvePolicy::default(),
            &RecordingLog::default(),
        )
        .await
        .unwrap();

        match outcome {
            UpdateOutcome::Updated { window } => assert_eq!(window.days(), 2),
            other => panic!("unexpected outcome {:?}", other),
        }

        let history = dataset.get("Stockholm, Sweden").unwrap();
        assert_eq!(history.len(), 2);
        // Re-fetched day replaced the stored one.
        assert_eq!(
            history.get(&date("2024-09-16")).unwrap().temperature_celsius,
            0.0
        );
    }
}
