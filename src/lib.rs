//! `TripPlanner` - day-by-day travel itineraries on a budget
//!
//! This library resolves a destination, gathers points of interest around it
//! from OpenStreetMap and spreads them over the trip days, either with a
//! deterministic rule-based allocator or with a language model whose
//! proposal is validated before use.

pub mod cache;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod models;
pub mod planner;
pub mod poi;
pub mod render;
pub mod service;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use config::TripPlannerConfig;
pub use error::TripError;
pub use geocoding::GeocodingClient;
pub use models::{DayPlan, Itinerary, Location, Pace, Place, StrategyKind, TripRequest};
pub use planner::{
    AllocationPolicy, Allocator, CostTable, ItineraryPlanner, LanguageModel, PlanningStrategy,
};
pub use poi::PoiClient;
pub use service::{PlannedTrip, SearchOptions, TripPlannerService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripError>;
