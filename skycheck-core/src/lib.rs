//! Core library for the `skycheck` CLI.
//!
//! This crate defines:
//! - Location classification (postal code vs. place name)
//! - The current-weather fetcher and its error taxonomy
//! - Configuration & credential resolution
//!
//! It is used by `skycheck-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;

pub use config::{Config, CredentialSource};
pub use error::FetchError;
pub use fetcher::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, WeatherFetcher};
pub use model::{Credential, LocationQuery, WeatherResult};
