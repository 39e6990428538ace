//! Error types and handling for the trip planner

use thiserror::Error;

/// Main error type for the trip planner
#[derive(Error, Debug)]
pub enum TripError {
    /// Malformed trip parameters, rejected at construction
    #[error("Invalid input: {message}")]
    InvalidRequest { message: String },

    /// Geocoding or POI service unreachable, rate-limited or returning garbage
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// The geocoder answered but knows no such place
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// Language-model planning failed; recovered locally, never shown to users
    #[error("Planner error: {message}")]
    Planner { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TripError {
    /// Create a new invalid request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a new upstream error for the named service
    pub fn upstream<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// Create a new planner error
    pub fn planner<S: Into<String>>(message: S) -> Self {
        Self::Planner {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Whether the error should be shown to the end user as a failure
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, TripError::Planner { .. } | TripError::Cache { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripError::InvalidRequest { message } => format!("Invalid input: {message}"),
            TripError::UpstreamUnavailable { service, .. } => {
                format!("{service} is not reachable right now. Please try again in a moment.")
            }
            TripError::LocationNotFound { query } => {
                format!("Could not find '{query}'. Please check the destination name.")
            }
            TripError::Planner { .. } => {
                "The planner ran into a problem; a rule-based plan was used instead.".to_string()
            }
            TripError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            TripError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<fjall::Error> for TripError {
    fn from(err: fjall::Error) -> Self {
        TripError::cache(err.to_string())
    }
}

impl From<postcard::Error> for TripError {
    fn from(err: postcard::Error) -> Self {
        TripError::cache(err.to_string())
    }
}
