use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Number;
use tracing::{debug, warn};

use crate::{
    error::FetchError,
    model::{Credential, DEFAULT_COUNTRY, LocationQuery, WeatherResult, normalize_country},
};

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches current conditions from OpenWeather, one request per call.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    http: Client,
    endpoint: String,
    country: String,
}

impl Default for WeatherFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherFetcher {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    /// Point the fetcher at a different current-weather URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Country paired with postal codes.
    pub fn with_country(mut self, country: &str) -> Self {
        self.country = normalize_country(country);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Fetch current weather for `location`.
    ///
    /// Blank input fails with [`FetchError::InvalidInput`] before any request is
    /// sent. `timeout` bounds the whole request; `None` means [`DEFAULT_TIMEOUT`].
    pub async fn fetch(
        &self,
        location: &str,
        credential: &Credential,
        timeout: Option<Duration>,
    ) -> Result<WeatherResult, FetchError> {
        let query = LocationQuery::parse_with_country(location, &self.country)?;
        let (key, value) = query.query_param();
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);

        debug!(endpoint = %self.endpoint, %query, ?timeout, "requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                (key, value.as_str()),
                ("appid", credential.expose()),
                ("units", "metric"),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, timeout = e.is_timeout(), "request to provider failed");
                FetchError::NetworkError(e)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(FetchError::NetworkError)?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %truncate_body(&body), "provider returned an error");
            return Err(FetchError::from_status(status.as_u16()));
        }

        extract(&body, location.trim())
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    temp: Option<Number>,
    humidity: Option<Number>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWeather {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    main: Option<OwMain>,
    weather: Option<Vec<OwWeather>>,
}

/// Pull the reported fields out of a success body. Missing pieces become
/// `None`; only a body that is not a JSON object of the expected shape fails.
fn extract(body: &str, fallback_city: &str) -> Result<WeatherResult, FetchError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(FetchError::MalformedResponse)?;

    let main = parsed.main.unwrap_or_default();
    let description = parsed
        .weather
        .unwrap_or_default()
        .into_iter()
        .next()
        .unwrap_or_default()
        .description;

    Ok(WeatherResult {
        city: parsed.name.unwrap_or_else(|| fallback_city.to_string()),
        temperature_c: main.temp,
        humidity_pct: main.humidity,
        description,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
