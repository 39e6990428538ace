//! Configuration management for the trip planner
//!
//! Handles loading configuration from files and environment variables and
//! validates every setting before the clients are built.

use crate::TripError;
use crate::planner::{AllocationPolicy, CostTable};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Value shipped in the sample `.env`; treated as no key at all
const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripPlannerConfig {
    /// Nominatim geocoding settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Overpass point-of-interest settings
    #[serde(default)]
    pub poi: PoiConfig,
    /// Language-model planner settings
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Scoring weights and pace capacities
    #[serde(default)]
    pub allocation: AllocationPolicy,
    /// Per-category and per-day cost estimates
    #[serde(default)]
    pub costs: CostTable,
    /// Geocoding cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Nominatim geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_seconds: u32,
    /// Retries on transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Overpass point-of-interest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiConfig {
    /// Overpass interpreter endpoints, tried in order
    #[serde(default = "default_poi_servers")]
    pub servers: Vec<String>,
    /// Request timeout in seconds
    #[serde(default = "default_poi_timeout")]
    pub timeout_seconds: u32,
    /// Retries per mirror on transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Search radius around the destination in meters
    #[serde(default = "default_poi_radius")]
    pub radius_m: u32,
    /// Maximum number of places requested
    #[serde(default = "default_poi_limit")]
    pub limit: usize,
}

/// Language-model planner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Gemini API key; without one the rule-based planner is used
    pub api_key: Option<String>,
    #[serde(default = "default_planner_model")]
    pub model: String,
    #[serde(default = "default_planner_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_planner_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Geocoding cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Cache TTL in hours
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    1
}

fn default_poi_servers() -> Vec<String> {
    vec![
        "https://overpass.kumi.systems/api/interpreter".to_string(),
        "https://overpass-api.de/api/interpreter".to_string(),
        "https://maps.mail.ru/osm/tools/overpass/api/interpreter".to_string(),
    ]
}

fn default_poi_timeout() -> u32 {
    15
}

fn default_poi_radius() -> u32 {
    10_000
}

fn default_poi_limit() -> usize {
    50
}

fn default_planner_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_planner_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_planner_timeout() -> u32 {
    30
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u32 {
    168
}

fn default_cache_location() -> String {
    "~/.cache/tripplanner".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_geocoding_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            servers: default_poi_servers(),
            timeout_seconds: default_poi_timeout(),
            max_retries: default_max_retries(),
            radius_m: default_poi_radius(),
            limit: default_poi_limit(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_planner_model(),
            base_url: default_planner_base_url(),
            timeout_seconds: default_planner_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_hours: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl GeocodingConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}

impl PoiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}

impl PlannerConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }

    /// The API key if one is really configured
    #[must_use]
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 3600)
    }

    /// Cache directory with a leading `~` expanded
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        match self.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None if self.location == "~" => dirs::home_dir(),
            None => Some(PathBuf::from(&self.location)),
        }
    }
}

impl TripPlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPPLANNER_PLANNER__API_KEY, TRIPPLANNER_POI__SERVERS=a,b, ...
        builder = builder.add_source(
            Environment::with_prefix("TRIPPLANNER")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("poi.servers")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripPlannerConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        if config.planner.effective_api_key().is_none() {
            if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
                config.planner.api_key = Some(key);
            }
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripplanner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.poi.servers.is_empty() {
            self.poi.servers = default_poi_servers();
        }
        if self.poi.timeout_seconds == 0 {
            self.poi.timeout_seconds = default_poi_timeout();
        }
        if self.poi.radius_m == 0 {
            self.poi.radius_m = default_poi_radius();
        }
        if self.poi.limit == 0 {
            self.poi.limit = default_poi_limit();
        }
        if self.planner.model.is_empty() {
            self.planner.model = default_planner_model();
        }
        if self.planner.base_url.is_empty() {
            self.planner.base_url = default_planner_base_url();
        }
        if self.planner.timeout_seconds == 0 {
            self.planner.timeout_seconds = default_planner_timeout();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.allocation.validate().map_err(TripError::config)?;
        self.costs.validate().map_err(TripError::config)?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("Geocoding", self.geocoding.timeout_seconds),
            ("POI", self.poi.timeout_seconds),
            ("Planner", self.planner.timeout_seconds),
        ] {
            if timeout > 300 {
                return Err(TripError::config(format!("{name} timeout cannot exceed 300 seconds")).into());
            }
        }

        for (name, retries) in [
            ("Geocoding", self.geocoding.max_retries),
            ("POI", self.poi.max_retries),
            ("Planner", self.planner.max_retries),
        ] {
            if retries > 10 {
                return Err(TripError::config(format!("{name} max retries cannot exceed 10")).into());
            }
        }

        if self.poi.radius_m > 50_000 {
            return Err(TripError::config("POI search radius cannot exceed 50000 m").into());
        }

        if self.poi.limit > 500 {
            return Err(TripError::config("POI limit cannot exceed 500").into());
        }

        if self.cache.ttl_hours > 24 * 30 {
            return Err(TripError::config("Cache TTL cannot exceed 720 hours (30 days)").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = std::iter::once(("Geocoding", &self.geocoding.base_url))
            .chain(std::iter::once(("Planner", &self.planner.base_url)))
            .chain(self.poi.servers.iter().map(|server| ("Overpass server", server)));
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripError::config(format!(
                    "{name} URL '{url}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Copy safe to print: the API key is reduced to its last four characters
    #[must_use]
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        masked.planner.api_key = self.planner.effective_api_key().map(|key| {
            let tail: String = key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("****{tail}")
        });
        masked
    }
}
