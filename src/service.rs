//! Trip planning service
//!
//! Runs the whole pipeline for one request: resolve the destination, fetch
//! candidate places around it and hand them to the planner.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::PersistentCache;
use crate::config::TripPlannerConfig;
use crate::geocoding::GeocodingClient;
use crate::models::{Itinerary, Location, TripRequest};
use crate::planner::{Allocator, GeminiClient, ItineraryPlanner, PlanningStrategy};
use crate::poi::PoiClient;
use crate::{TripError, http};

/// Search overrides for a single run
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Radius around the destination in meters
    pub radius_m: Option<u32>,
    /// Maximum number of candidate places
    pub limit: Option<usize>,
}

/// The destination as resolved plus the itinerary planned around it
#[derive(Debug, Clone, Serialize)]
pub struct PlannedTrip {
    pub center: Location,
    pub itinerary: Itinerary,
}

pub struct TripPlannerService {
    geocoder: GeocodingClient,
    poi: PoiClient,
    planner: ItineraryPlanner,
    radius_m: u32,
    limit: usize,
}

impl TripPlannerService {
    #[must_use]
    pub fn new(
        geocoder: GeocodingClient,
        poi: PoiClient,
        planner: ItineraryPlanner,
        radius_m: u32,
        limit: usize,
    ) -> Self {
        Self {
            geocoder,
            poi,
            planner,
            radius_m,
            limit,
        }
    }

    /// Build every client from configuration. Without an API key the
    /// rule-based planner is used; an unusable cache is skipped.
    pub fn from_config(config: &TripPlannerConfig) -> crate::Result<Self> {
        let geocoding_http =
            http::build_client(config.geocoding.timeout(), config.geocoding.max_retries)?;
        let mut geocoder = GeocodingClient::new(geocoding_http, config.geocoding.base_url.clone());

        if config.cache.enabled {
            match config.cache.path().map(PersistentCache::open) {
                Some(Ok(cache)) => geocoder = geocoder.with_cache(cache, config.cache.ttl()),
                Some(Err(e)) => warn!("Geocoding cache disabled: {e}"),
                None => warn!("Geocoding cache disabled: no cache directory"),
            }
        }

        let poi_http = http::build_client(config.poi.timeout(), config.poi.max_retries)?;
        let poi = PoiClient::new(poi_http, config.poi.servers.clone());

        let allocator = Allocator::new(config.allocation.clone(), config.costs.clone());
        let strategy = match config.planner.effective_api_key() {
            Some(key) => {
                let llm_http = http::build_client(config.planner.timeout(), config.planner.max_retries)?;
                let model = GeminiClient::new(
                    llm_http,
                    config.planner.base_url.clone(),
                    config.planner.model.clone(),
                    key,
                );
                info!("Language-model planning enabled ({})", config.planner.model);
                PlanningStrategy::LanguageModel(Arc::new(model))
            }
            None => {
                info!("No language-model API key configured, using rule-based planning");
                PlanningStrategy::RuleBased
            }
        };

        Ok(Self::new(
            geocoder,
            poi,
            ItineraryPlanner::new(allocator, strategy),
            config.poi.radius_m,
            config.poi.limit,
        ))
    }

    #[must_use]
    pub fn planner(&self) -> &ItineraryPlanner {
        &self.planner
    }

    /// Geocode, fetch candidates and plan
    pub async fn plan_trip(&self, request: &TripRequest, options: SearchOptions) -> crate::Result<PlannedTrip> {
        let center = self
            .geocoder
            .geocode(request.destination())
            .await?
            .ok_or_else(|| TripError::location_not_found(request.destination()))?;

        let radius_m = options.radius_m.unwrap_or(self.radius_m);
        let limit = options.limit.unwrap_or(self.limit);
        let interests: Vec<String> = request.interests().iter().cloned().collect();

        let places = self.poi.fetch_pois(&center, radius_m, &interests, limit).await?;
        if places.is_empty() {
            warn!(
                "No places found within {radius_m} m of {}; the itinerary will be empty",
                center.name
            );
        }

        let itinerary = self.planner.plan(request, &center, &places).await;
        info!(
            "Planned {} places over {} days for {} (total ${:.2} of ${:.2})",
            itinerary.total_places(),
            itinerary.num_days(),
            request.destination(),
            itinerary.total_cost(),
            itinerary.budget()
        );

        Ok(PlannedTrip { center, itinerary })
    }
}
