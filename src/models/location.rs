//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

/// A resolved place on the map, usually the geocoded trip destination
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (city, region, etc.)
    pub name: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country: Option<String>,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
            country: None,
        }
    }

    /// Create location with country
    #[must_use]
    pub fn with_country(latitude: f64, longitude: f64, name: String, country: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
            country: Some(country),
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Great-circle distance to a coordinate pair in kilometers
    #[must_use]
    pub fn distance_km_to(&self, latitude: f64, longitude: f64) -> f64 {
        distance_km((self.latitude, self.longitude), (latitude, longitude))
    }

    /// Cache key for a free-text geocoding query
    #[must_use]
    pub fn cache_key(query: &str) -> String {
        let normalized = query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        format!("geocode:{normalized}")
    }
}

/// Haversine distance between two `(lat, lon)` pairs in kilometers
#[must_use]
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: from.0,
            longitude: from.1,
        },
        haversine::Location {
            latitude: to.0,
            longitude: to.1,
        },
        haversine::Units::Kilometers,
    )
}
