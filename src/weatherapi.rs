//! Client for the WeatherAPI.com history endpoint.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    dataset::{DateWindow, DayPayload},
    error::FetchError,
    update::{FetchedHistory, HistorySource},
};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("wxhist/", env!("CARGO_PKG_VERSION"));
/// Only the noon reading of each day is requested.
const OBSERVATION_HOUR: &str = "12";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    location: ResponseLocation,
    forecast: Forecast,
}

#[derive(Debug, Deserialize)]
struct ResponseLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: NaiveDate,
    hour: Vec<HourReading>,
}

#[derive(Debug, Deserialize)]
struct HourReading {
    temp_c: f64,
    wind_kph: f64,
    gust_kph: f64,
    wind_degree: u16,
    wind_dir: String,
    pressure_mb: f64,
    humidity: u8,
    uv: f64,
}

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl HistorySource for WeatherApiClient {
    async fn fetch(
        &self,
        location: &str,
        window: &DateWindow,
    ) -> Result<FetchedHistory, FetchError> {
        let url = format!("{}/history.json", self.base_url);
        let start = window.start.to_string();
        let end = window.end.to_string();

        tracing::debug!("Requesting history for {} ({})", location, window);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("dt", start.as_str()),
                ("end_dt", end.as_str()),
                ("hour", OBSERVATION_HOUR),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                location: location.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Transport {
            location: location.to_string(),
            source,
        })?;

        parse_history(location, &body)
    }
}

fn parse_history(location: &str, body: &[u8]) -> Result<FetchedHistory, FetchError> {
    let malformed = |message: String| FetchError::Malformed {
        location: location.to_string(),
        message,
    };

    let response: HistoryResponse =
        serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;

    let days = response
        .forecast
        .forecastday
        .into_iter()
        .map(|day| {
            let noon = day
                .hour
                .into_iter()
                .next()
                .ok_or_else(|| malformed(format!("no hourly reading for {}", day.date)))?;

            Ok(DayPayload {
                date: day.date,
                temperature_celsius: noon.temp_c,
                wind_speed_kph: noon.wind_kph,
                gust_speed_kph: noon.gust_kph,
                wind_degree: noon.wind_degree,
                wind_direction: noon.wind_dir,
                pressure_mb: noon.pressure_mb,
                humidity_percent: noon.humidity,
                uv_index: noon.uv,
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    Ok(FetchedHistory {
        location: format!("{}, {}", response.location.name, response.location.country),
        days,
    })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::dataset::tests::date;

    fn history_body() -> serde_json::Value {
        json!({
            "location": { "name": "Stockholm", "region": "Stockholm", "country": "Sweden" },
            "forecast": {
                "forecastday": [
                    {
                        "date": "2024-09-16",
                        "day": { "maxtemp_c": 18.0 },
                        "hour": [{
                            "time": "2024-09-16 12:00",
                            "temp_c": 15.3,
                            "wind_kph": 36.0,
                            "gust_kph": 108.0,
                            "wind_degree": 210,
                            "wind_dir": "SSW",
                            "pressure_mb": 1021.0,
                            "humidity": 63,
                            "uv": 4.0
                        }]
                    },
                    {
                        "date": "2024-09-17",
                        "hour": [{
                            "time": "2024-09-17 12:00",
                            "temp_c": 16.1,
                            "wind_kph": 10.1,
                            "gust_kph": 14.4,
                            "wind_degree": 90,
                            "wind_dir": "E",
                            "pressure_mb": 1019.0,
                            "humidity": 58,
                            "uv": 4.0
                        }]
                    }
                ]
            }
        })
    }

    fn window() -> DateWindow {
        DateWindow {
            start: date("2024-09-16"),
            end: date("2024-09-17"),
        }
    }

    #[test]
    fn should_parse_history_response() {
        let body = serde_json::to_vec(&history_body()).unwrap();
        let fetched = parse_history("Stockholm", &body).unwrap();

        assert_eq!(fetched.location, "Stockholm, Sweden");
        assert_eq!(fetched.days.len(), 2);
        assert_eq!(fetched.days[0].date, date("2024-09-16"));
        assert_eq!(fetched.days[0].temperature_celsius, 15.3);
        assert_eq!(fetched.days[0].wind_speed_kph, 36.0);
        assert_eq!(fetched.days[0].wind_direction, "SSW");
        assert_eq!(fetched.days[1].humidity_percent, 58);
    }

    #[test]
    fn should_reject_day_without_hours() {
        let mut body = history_body();
        body["forecast"]["forecastday"][1]["hour"] = json!([]);
        let body = serde_json::to_vec(&body).unwrap();

        let err = parse_history("Stockholm", &body).unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn should_reject_invalid_json() {
        let err = parse_history("Stockholm", b"<html>").unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[tokio::test]
    async fn should_request_noon_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history.json"))
            .and(query_param("key", "secret"))
            .and(query_param("q", "Stockholm"))
            .and(query_param("dt", "2024-09-16"))
            .and(query_param("end_dt", "2024-09-17"))
            .and(query_param("hour", "12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(history_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = WeatherApiClient::new(&server.uri(), "secret").unwrap();
        let fetched = client.fetch("Stockholm", &window()).await.unwrap();

        assert_eq!(fetched.location, "Stockholm, Sweden");
        assert_eq!(fetched.days.len(), 2);
    }

    #[tokio::test]
    async fn should_surface_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history.json"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = WeatherApiClient::new(&server.uri(), "bad-key").unwrap();
        let err = client.fetch("Stockholm", &window()).await.unwrap_err();

        match err {
            FetchError::Status { location, status } => {
                assert_eq!(location, "Stockholm");
                assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
