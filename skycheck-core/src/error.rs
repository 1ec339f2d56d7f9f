use thiserror::Error;

/// Ways a single fetch can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Location is empty.")]
    InvalidInput,

    #[error("Unauthorized: check your API key.")]
    Unauthorized,

    #[error("Location not found. Check the city or pincode.")]
    LocationNotFound,

    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// DNS, connect, timeout or body read failure.
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("Invalid JSON response from API.")]
    MalformedResponse(#[source] serde_json::Error),
}

impl FetchError {
    /// HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Unauthorized => Some(401),
            FetchError::LocationNotFound => Some(404),
            FetchError::HttpError(status) => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_status(status: u16) -> Self {
        match status {
            401 => FetchError::Unauthorized,
            404 => FetchError::LocationNotFound,
            other => FetchError::HttpError(other),
        }
    }
}
