//! Overpass API client with mirror fallback

use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, info, instrument, warn};

use crate::models::{Location, Place};
use crate::{TripError, http};

use super::osm::{self, OverpassResponse};

const SERVICE: &str = "Overpass";

/// Fetches points of interest from the first Overpass mirror that answers
pub struct PoiClient {
    http: ClientWithMiddleware,
    servers: Vec<String>,
}

impl PoiClient {
    #[must_use]
    pub fn new(http: ClientWithMiddleware, servers: Vec<String>) -> Self {
        Self { http, servers }
    }

    #[must_use]
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// Places within `radius_m` meters of `center` matching `interests`.
    ///
    /// Mirrors are tried in order; the error of the last one is returned when
    /// none answers.
    #[instrument(skip(self, center, interests), fields(center = %center.format_coordinates()))]
    pub async fn fetch_pois(
        &self,
        center: &Location,
        radius_m: u32,
        interests: &[String],
        limit: usize,
    ) -> crate::Result<Vec<Place>> {
        let tags = osm::tags_for_interests(interests);
        let query = osm::build_query(center.latitude, center.longitude, radius_m, &tags, limit);
        debug!("Overpass query:\n{query}");

        let mut last_error = TripError::upstream(SERVICE, "no servers configured");
        for server in &self.servers {
            match self.query_server(server, &query).await {
                Ok(response) => {
                    let found = response.elements.len();
                    let places = parse_elements(response, limit);
                    info!("{server} returned {found} elements, {} usable places", places.len());
                    return Ok(places);
                }
                Err(e) => {
                    warn!("Overpass mirror {server} failed: {e}");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn query_server(&self, server: &str, query: &str) -> crate::Result<OverpassResponse> {
        let body = format!("data={}", urlencoding::encode(query));
        let request = self
            .http
            .post(server)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);

        let response = http::send(SERVICE, request).await?;
        http::json(SERVICE, response).await
    }
}

/// Convert up to `limit` elements, skipping the unusable ones
fn parse_elements(response: OverpassResponse, limit: usize) -> Vec<Place> {
    response
        .elements
        .into_iter()
        .take(limit)
        .filter_map(osm::Element::into_place)
        .collect()
}
