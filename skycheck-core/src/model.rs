use serde::Serialize;
use serde_json::Number;
use std::fmt;

use crate::error::FetchError;

/// Country paired with postal codes when none is configured.
pub const DEFAULT_COUNTRY: &str = "IN";

/// Shape of the location the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    PostalCode { code: String, country: String },
    PlaceName(String),
}

impl LocationQuery {
    /// Classify raw input, pairing postal codes with [`DEFAULT_COUNTRY`].
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        Self::parse_with_country(input, DEFAULT_COUNTRY)
    }

    /// Classify raw input: all ASCII digits after trimming is a postal code,
    /// anything else non-empty is a place name.
    pub fn parse_with_country(input: &str, country: &str) -> Result<Self, FetchError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FetchError::InvalidInput);
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            Ok(LocationQuery::PostalCode {
                code: trimmed.to_string(),
                country: normalize_country(country),
            })
        } else {
            Ok(LocationQuery::PlaceName(trimmed.to_string()))
        }
    }

    /// Location-specific query parameter for the provider (`zip` or `q`).
    pub fn query_param(&self) -> (&'static str, String) {
        match self {
            LocationQuery::PostalCode { code, country } => ("zip", format!("{code},{country}")),
            LocationQuery::PlaceName(name) => ("q", name.clone()),
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::PostalCode { code, country } => write!(f, "postal code {code} ({country})"),
            LocationQuery::PlaceName(name) => write!(f, "{name}"),
        }
    }
}

/// Uppercased country code, or [`DEFAULT_COUNTRY`] when blank.
pub fn normalize_country(country: &str) -> String {
    let trimmed = country.trim();
    if trimmed.is_empty() {
        DEFAULT_COUNTRY.to_string()
    } else {
        trimmed.to_uppercase()
    }
}

/// Opaque provider API key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Normalized current-weather reading.
///
/// Measurements keep the provider's number as sent, so `25.0` and `40`
/// print the way they appeared in the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherResult {
    pub city: String,
    pub temperature_c: Option<Number>,
    pub humidity_pct: Option<Number>,
    pub description: Option<String>,
}
