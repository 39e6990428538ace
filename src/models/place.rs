//! Candidate points of interest

use serde::{Deserialize, Serialize};

/// A candidate point of interest.
///
/// `id` is the stable identifier used to enforce that a place is scheduled at
/// most once per itinerary. Places coming from OpenStreetMap use
/// `"<element type>/<element id>"`, e.g. `node/240109189`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    /// Category tag such as `museum`, `park` or `historic_castle`
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Rating on a 0-5 scale
    pub rating: Option<f32>,
    /// Estimated visit cost per person (or flat, depending on category)
    pub estimated_cost: Option<f64>,
    /// Expected time on site in minutes
    pub visit_minutes: u32,
    pub opening_hours: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
}

impl Place {
    /// Upper bound of the rating scale
    pub const MAX_RATING: f32 = 5.0;

    /// Create a place with the mandatory fields
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            latitude,
            longitude,
            rating: None,
            estimated_cost: None,
            visit_minutes: 60,
            opening_hours: None,
            description: None,
            address: None,
        }
    }

    /// Set the rating, clamped to the 0-5 scale
    #[must_use]
    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating.clamp(0.0, Self::MAX_RATING));
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.estimated_cost = Some(cost.max(0.0));
        self
    }

    #[must_use]
    pub fn with_visit_minutes(mut self, minutes: u32) -> Self {
        self.visit_minutes = minutes;
        self
    }

    #[must_use]
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Distance to another place in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &Place) -> f64 {
        super::location::distance_km(self.coordinates(), other.coordinates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_is_clamped() {
        let place = Place::new("node/1", "Louvre", "museum", 48.86, 2.33).with_rating(7.5);
        assert_eq!(place.rating, Some(5.0));
    }

    #[test]
    fn test_negative_cost_is_floored() {
        let place = Place::new("node/1", "Louvre", "museum", 48.86, 2.33).with_cost(-3.0);
        assert_eq!(place.estimated_cost, Some(0.0));
    }
}
