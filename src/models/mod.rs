//! Data models for trip requests, places and itineraries

pub mod itinerary;
pub mod location;
pub mod place;
pub mod trip;

pub use itinerary::{CostBreakdown, DayPlan, Itinerary, StrategyKind, round_cents};
pub use location::{Location, distance_km};
pub use place::Place;
pub use trip::{Pace, TripRequest, TripRequestBuilder};
