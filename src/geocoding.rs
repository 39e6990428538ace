//! Nominatim geocoding client

use std::time::Duration;

use rand::RngExt;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::cache::PersistentCache;
use crate::models::Location;
use crate::{TripError, http};

const SERVICE: &str = "Nominatim";

/// One hit from `/search?format=json`; coordinates arrive as strings
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    country_code: Option<String>,
}

impl SearchResult {
    fn into_location(self, query: &str) -> crate::Result<Location> {
        let parse = |value: &str, axis: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| TripError::upstream(SERVICE, format!("invalid {axis} '{value}'")))
        };
        let latitude = parse(&self.lat, "latitude")?;
        let longitude = parse(&self.lon, "longitude")?;

        let name = self.display_name.unwrap_or_else(|| query.to_string());
        Ok(match self.address.and_then(|a| a.country_code) {
            Some(country) => Location::with_country(latitude, longitude, name, country),
            None => Location::new(latitude, longitude, name),
        })
    }
}

/// Resolves free-text place names to coordinates
pub struct GeocodingClient {
    http: ClientWithMiddleware,
    base_url: String,
    cache: Option<(PersistentCache, Duration)>,
}

impl GeocodingClient {
    #[must_use]
    pub fn new(http: ClientWithMiddleware, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: None,
        }
    }

    /// Memoize successful lookups for about `ttl`
    #[must_use]
    pub fn with_cache(mut self, cache: PersistentCache, ttl: Duration) -> Self {
        self.cache = Some((cache, ttl));
        self
    }

    /// Best match for `name`, or `None` when the geocoder knows no such place
    #[instrument(skip(self))]
    pub async fn geocode(&self, name: &str) -> crate::Result<Option<Location>> {
        let query = name.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let key = Location::cache_key(query);
        if let Some((cache, _)) = &self.cache {
            match cache.get::<Location>(&key).await {
                Ok(Some(location)) => {
                    debug!("Using cached location for '{query}'");
                    return Ok(Some(location));
                }
                Ok(None) => {}
                Err(e) => warn!("Geocoding cache read failed: {e}"),
            }
        }

        let location = self.search(query).await?;

        if let (Some(location), Some((cache, ttl))) = (&location, &self.cache) {
            // +-10% so entries written together expire apart
            let jitter: f64 = rand::rng().random_range(0.9..1.1);
            let ttl = ttl.mul_f64(jitter);
            if let Err(e) = cache.put(&key, location.clone(), ttl).await {
                warn!("Geocoding cache write failed: {e}");
            }
        }

        Ok(location)
    }

    async fn search(&self, query: &str) -> crate::Result<Option<Location>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1&addressdetails=1",
            self.base_url,
            urlencoding::encode(query)
        );
        let request = self.http.get(url);

        let response = http::send(SERVICE, request).await?;
        let results: Vec<SearchResult> = http::json(SERVICE, response).await?;
        debug!("Geocoding '{query}' returned {} result(s)", results.len());

        let Some(best) = results.into_iter().next() else {
            return Ok(None);
        };
        let location = best.into_location(query)?;
        info!(
            "Resolved '{query}' to {} ({})",
            location.name,
            location.format_coordinates()
        );
        Ok(Some(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_parsing() {
        let raw = r#"[{"lat": "48.8588897", "lon": "2.3200410", "display_name": "Paris, Île-de-France, France",
                      "address": {"city": "Paris", "country_code": "fr"}}]"#;
        let results: Vec<SearchResult> = serde_json::from_str(raw).unwrap();
        let location = results.into_iter().next().unwrap().into_location("paris").unwrap();

        assert!((location.latitude - 48.8588897).abs() < 1e-9);
        assert_eq!(location.name, "Paris, Île-de-France, France");
        assert_eq!(location.country.as_deref(), Some("fr"));
    }

    #[test]
    fn test_missing_display_name_uses_query() {
        let result = SearchResult {
            lat: "41.9".into(),
            lon: "12.5".into(),
            display_name: None,
            address: None,
        };
        let location = result.into_location("Rome").unwrap();
        assert_eq!(location.name, "Rome");
        assert!(location.country.is_none());
    }

    #[test]
    fn test_bad_coordinates_are_upstream_errors() {
        let result = SearchResult {
            lat: "north".into(),
            lon: "12.5".into(),
            display_name: None,
            address: None,
        };
        assert!(matches!(
            result.into_location("Rome"),
            Err(TripError::UpstreamUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_query_is_not_sent() {
        let http = http::build_client(Duration::from_secs(1), 0).unwrap();
        let client = GeocodingClient::new(http, "http://127.0.0.1:9");
        assert_eq!(client.geocode("   ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cached_location_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let lisbon = Location::new(38.7223, -9.1393, "Lisbon".to_string());
        cache
            .put(&Location::cache_key("Lisbon"), lisbon.clone(), Duration::from_secs(60))
            .await
            .unwrap();

        // unroutable base URL: a network call would fail
        let http = http::build_client(Duration::from_secs(1), 0).unwrap();
        let client = GeocodingClient::new(http, "http://127.0.0.1:9")
            .with_cache(cache, Duration::from_secs(60));
        assert_eq!(client.geocode(" lisbon ").await.unwrap(), Some(lisbon));
    }
}
