//! Points of interest from OpenStreetMap

pub mod osm;
pub mod overpass;

pub use overpass::PoiClient;
