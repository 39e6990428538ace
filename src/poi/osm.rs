//! OpenStreetMap tag handling: interest mapping, Overpass QL and element parsing

use std::collections::HashMap;

use serde::Deserialize;

use crate::models::Place;

/// OSM `key=value` filters searched for each interest
const INTEREST_TAGS: &[(&str, &[&str])] = &[
    ("museums", &["tourism=museum"]),
    ("history", &["tourism=museum", "historic=monument", "historic=castle"]),
    ("culture", &["tourism=museum", "tourism=gallery", "tourism=theatre"]),
    ("art", &["tourism=gallery", "tourism=artwork"]),
    ("nature", &["leisure=park", "leisure=garden", "natural=beach"]),
    ("parks", &["leisure=park", "leisure=garden"]),
    ("outdoor", &["leisure=park", "natural=peak", "tourism=viewpoint"]),
    ("food", &["amenity=restaurant", "amenity=cafe", "amenity=bar"]),
    ("restaurants", &["amenity=restaurant", "amenity=cafe"]),
    ("architecture", &["tourism=attraction", "historic=building", "building=cathedral"]),
    ("religion", &["amenity=place_of_worship", "building=church", "building=mosque"]),
    ("sport", &["leisure=sports_centre", "leisure=stadium"]),
    ("shopping", &["shop=mall", "shop=department_store"]),
    ("entertainment", &["tourism=attraction", "leisure=amusement_arcade"]),
    ("amusements", &["tourism=theme_park", "leisure=amusement_arcade"]),
];

/// Searched when no interests were given
const DEFAULT_TAGS: &[&str] = &["tourism=museum", "amenity=restaurant", "leisure=park"];

/// Searched when interests were given but none is known
const FALLBACK_TAG: &str = "tourism=attraction";

/// Overpass gets slow with long unions, so only this many filters are sent
pub const MAX_QUERY_TAGS: usize = 3;

/// Query timeout passed to Overpass, in seconds
const QUERY_TIMEOUT_SECS: u32 = 10;

/// Map interests to OSM filters, keeping first-seen order without duplicates
#[must_use]
pub fn tags_for_interests<I, S>(interests: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut any = false;
    let mut tags: Vec<&'static str> = Vec::new();

    for interest in interests {
        any = true;
        let interest = interest.as_ref().to_lowercase();
        let Some((_, mapped)) = INTEREST_TAGS.iter().find(|(name, _)| *name == interest) else {
            continue;
        };
        for tag in *mapped {
            if !tags.contains(tag) {
                tags.push(tag);
            }
        }
    }

    match (any, tags.is_empty()) {
        (false, _) => DEFAULT_TAGS.to_vec(),
        (true, true) => vec![FALLBACK_TAG],
        (true, false) => tags,
    }
}

/// Build the Overpass QL union of node searches around a point
#[must_use]
pub fn build_query(latitude: f64, longitude: f64, radius_m: u32, tags: &[&str], limit: usize) -> String {
    let filters: Vec<String> = tags
        .iter()
        .take(MAX_QUERY_TAGS)
        .filter_map(|tag| tag.split_once('='))
        .map(|(key, value)| {
            format!("  node[\"{key}\"=\"{value}\"](around:{radius_m},{latitude},{longitude});")
        })
        .collect();

    format!(
        "[out:json][timeout:{QUERY_TIMEOUT_SECS}];\n(\n{}\n);\nout body {limit};",
        filters.join("\n")
    )
}

/// Overpass `[out:json]` response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl Element {
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
    }

    /// Convert to a [`Place`]; unnamed elements and elements without
    /// coordinates are skipped.
    #[must_use]
    pub fn into_place(self) -> Option<Place> {
        let name = self
            .tag("name")
            .or_else(|| self.tag("name:en"))
            .or_else(|| self.tag("official_name"))?
            .to_string();

        let (latitude, longitude) = match (&self.kind[..], self.lat, self.lon, &self.center) {
            ("node", Some(lat), Some(lon), _) => (lat, lon),
            (_, _, _, Some(center)) => (center.lat, center.lon),
            _ => return None,
        };

        let category = determine_category(&self.tags);
        let mut place = Place::new(
            format!("{}/{}", self.kind, self.id),
            name,
            category.clone(),
            latitude,
            longitude,
        )
        .with_visit_minutes(estimate_visit_minutes(&category));

        if let Some(cost) = posted_cost(&self.tags) {
            place = place.with_cost(cost);
        }
        place.opening_hours = self.tag("opening_hours").map(str::to_string);
        place.description = self
            .tag("description")
            .or_else(|| self.tag("wikipedia"))
            .map(str::to_string);
        place.address = self.tag("addr:street").map(str::to_string);

        Some(place)
    }
}

/// Category name derived from OSM tags, most specific first
#[must_use]
pub fn determine_category(tags: &HashMap<String, String>) -> String {
    let get = |key: &str| tags.get(key).map(String::as_str);

    let category = match (get("tourism"), get("amenity"), get("leisure")) {
        (Some("museum"), ..) => "museum",
        (Some("gallery"), ..) => "art_gallery",
        (Some("theatre"), ..) | (_, Some("theatre"), _) => "theatre",
        (Some("theme_park"), ..) => "theme_park",
        (Some("artwork"), ..) => "artwork",
        (Some("viewpoint"), ..) => "viewpoint",
        (Some("attraction"), ..) => "attraction",
        (_, Some("restaurant"), _) => "restaurant",
        (_, Some("cafe"), _) => "cafe",
        (_, Some("bar" | "pub"), _) => "bar",
        (_, Some("place_of_worship"), _) => "religious_site",
        (_, _, Some("park")) => "park",
        (_, _, Some("garden")) => "garden",
        (_, _, Some("sports_centre")) => "sports_centre",
        (_, _, Some("stadium")) => "stadium",
        (_, _, Some("amusement_arcade")) => "amusement_arcade",
        _ => {
            if let Some(historic) = get("historic") {
                return format!("historic_{historic}");
            }
            match (get("natural"), get("building")) {
                (Some("beach"), _) => "beach",
                (Some("peak"), _) => "peak",
                (_, Some("cathedral")) => "cathedral",
                (_, Some("church" | "mosque" | "synagogue" | "temple")) => "religious_site",
                _ if get("shop").is_some() => "shopping",
                _ => "attraction",
            }
        }
    };
    category.to_string()
}

/// Cost posted on the element: `fee=no` means free, otherwise the leading
/// number of `charge` if there is one
fn posted_cost(tags: &HashMap<String, String>) -> Option<f64> {
    if tags.get("fee").is_some_and(|fee| fee.trim().eq_ignore_ascii_case("no")) {
        return Some(0.0);
    }

    let charge = tags.get("charge")?;
    let number: String = charge
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Typical time on site in minutes
#[must_use]
pub fn estimate_visit_minutes(category: &str) -> u32 {
    const MINUTES: &[(&str, u32)] = &[
        ("museum", 120),
        ("art_gallery", 90),
        ("theatre", 150),
        ("theme_park", 240),
        ("park", 60),
        ("garden", 45),
        ("beach", 120),
        ("restaurant", 90),
        ("cafe", 45),
        ("bar", 60),
        ("religious", 45),
        ("cathedral", 45),
        ("historic", 60),
        ("attraction", 90),
        ("shopping", 90),
        ("viewpoint", 30),
    ];

    MINUTES
        .iter()
        .find(|(key, _)| category.contains(key))
        .map_or(60, |(_, minutes)| *minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_interest_tags_are_deduplicated_in_order() {
        let tags = tags_for_interests(["museums", "history", "Culture"]);
        assert_eq!(
            tags,
            vec![
                "tourism=museum",
                "historic=monument",
                "historic=castle",
                "tourism=gallery",
                "tourism=theatre",
            ]
        );
    }

    #[test]
    fn test_default_and_fallback_tags() {
        assert_eq!(tags_for_interests(Vec::<String>::new()), DEFAULT_TAGS.to_vec());
        assert_eq!(tags_for_interests(["jazz"]), vec![FALLBACK_TAG]);
    }

    #[test]
    fn test_query_uses_first_three_tags() {
        let query = build_query(
            48.8566,
            2.3522,
            5000,
            &["tourism=museum", "amenity=cafe", "leisure=park", "shop=mall"],
            40,
        );
        assert!(query.starts_with("[out:json][timeout:10];"));
        assert!(query.contains("node[\"tourism\"=\"museum\"](around:5000,48.8566,2.3522);"));
        assert!(query.contains("leisure"));
        assert!(!query.contains("shop"));
        assert!(query.ends_with("out body 40;"));
    }

    #[rstest]
    #[case(&[("tourism", "museum")], "museum")]
    #[case(&[("tourism", "gallery")], "art_gallery")]
    #[case(&[("amenity", "theatre")], "theatre")]
    #[case(&[("amenity", "place_of_worship"), ("building", "cathedral")], "religious_site")]
    #[case(&[("building", "cathedral")], "cathedral")]
    #[case(&[("historic", "castle")], "historic_castle")]
    #[case(&[("natural", "beach")], "beach")]
    #[case(&[("leisure", "stadium")], "stadium")]
    #[case(&[("shop", "mall")], "shopping")]
    #[case(&[("amenity", "bench")], "attraction")]
    fn test_determine_category(#[case] pairs: &[(&str, &str)], #[case] expected: &str) {
        assert_eq!(determine_category(&tags(pairs)), expected);
    }

    #[rstest]
    #[case(&[("fee", "no")], Some(0.0))]
    #[case(&[("fee", "yes"), ("charge", "12 EUR")], Some(12.0))]
    #[case(&[("charge", "€7,50")], Some(7.5))]
    #[case(&[("fee", "yes")], None)]
    fn test_posted_cost(#[case] pairs: &[(&str, &str)], #[case] expected: Option<f64>) {
        assert_eq!(posted_cost(&tags(pairs)), expected);
    }

    #[test]
    fn test_node_element_becomes_place() {
        let raw = r#"{
            "type": "node", "id": 240109189, "lat": 48.8606, "lon": 2.3376,
            "tags": {"tourism": "museum", "name": "Musée du Louvre",
                     "opening_hours": "Mo,Th,Sa,Su 09:00-18:00", "wikipedia": "fr:Musée du Louvre"}
        }"#;
        let element: Element = serde_json::from_str(raw).unwrap();
        let place = element.into_place().unwrap();

        assert_eq!(place.id, "node/240109189");
        assert_eq!(place.category, "museum");
        assert_eq!(place.visit_minutes, 120);
        assert_eq!(place.estimated_cost, None);
        assert_eq!(place.description.as_deref(), Some("fr:Musée du Louvre"));
    }

    #[test]
    fn test_way_uses_center_and_alternate_name() {
        let raw = r#"{
            "type": "way", "id": 42, "center": {"lat": 48.85, "lon": 2.34},
            "tags": {"leisure": "park", "name:en": "Luxembourg Garden", "fee": "no"}
        }"#;
        let element: Element = serde_json::from_str(raw).unwrap();
        let place = element.into_place().unwrap();

        assert_eq!(place.id, "way/42");
        assert_eq!(place.name, "Luxembourg Garden");
        assert_eq!(place.latitude, 48.85);
        assert_eq!(place.estimated_cost, Some(0.0));
    }

    #[test]
    fn test_unnamed_or_unlocated_elements_are_skipped() {
        let unnamed: Element =
            serde_json::from_str(r#"{"type":"node","id":1,"lat":1.0,"lon":2.0,"tags":{"tourism":"museum"}}"#)
                .unwrap();
        assert!(unnamed.into_place().is_none());

        let unlocated: Element =
            serde_json::from_str(r#"{"type":"way","id":2,"tags":{"name":"Somewhere"}}"#).unwrap();
        assert!(unlocated.into_place().is_none());
    }
}
