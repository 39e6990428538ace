//! Interest filtering and candidate scoring

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use crate::models::{Location, Place, TripRequest};

use super::{AllocationPolicy, CostTable};

/// Category keywords each interest covers. Matching is by substring, so
/// `historic` also covers `historic_castle`.
const INTEREST_CATEGORIES: &[(&str, &[&str])] = &[
    ("museums", &["museum"]),
    ("history", &["museum", "historic"]),
    ("culture", &["museum", "art_gallery", "theatre"]),
    ("art", &["art_gallery", "artwork"]),
    ("nature", &["park", "garden", "beach"]),
    ("parks", &["park", "garden"]),
    ("outdoor", &["park", "peak", "viewpoint"]),
    ("food", &["restaurant", "cafe", "bar"]),
    ("restaurants", &["restaurant", "cafe"]),
    ("architecture", &["attraction", "historic", "cathedral"]),
    ("religion", &["religious_site", "cathedral"]),
    ("sport", &["sports_centre", "stadium"]),
    ("shopping", &["shopping"]),
    ("entertainment", &["attraction", "amusement_arcade", "theatre"]),
    ("amusements", &["theme_park", "amusement_arcade"]),
];

/// Category keywords for an interest, if it's a known one
#[must_use]
pub fn interest_categories(interest: &str) -> Option<&'static [&'static str]> {
    INTEREST_CATEGORIES
        .iter()
        .find(|(name, _)| *name == interest)
        .map(|(_, categories)| *categories)
}

/// Whether a place satisfies a single interest
#[must_use]
pub fn matches_interest(place: &Place, interest: &str) -> bool {
    let category = place.category.to_lowercase();
    if let Some(keywords) = interest_categories(interest) {
        return keywords.iter().any(|k| category.contains(k));
    }

    // free-form interests: "castles" should still hit "Castle Hill"
    let stem = interest.strip_suffix('s').unwrap_or(interest);
    if stem.len() < 3 {
        return false;
    }
    category.contains(stem) || place.name.to_lowercase().contains(stem)
}

/// Number of requested interests a place satisfies
#[must_use]
pub fn interest_match_count(place: &Place, interests: &BTreeSet<String>) -> usize {
    interests
        .iter()
        .filter(|interest| matches_interest(place, interest))
        .count()
}

/// A candidate with its score and tie-break keys
#[derive(Debug, Clone)]
pub struct RankedPlace<'a> {
    pub place: &'a Place,
    pub score: f64,
    pub interest_matches: usize,
    pub distance_km: f64,
    /// Position in the caller's candidate list
    pub input_index: usize,
}

/// Score and order candidates, best first.
///
/// Places matching none of the requested interests are dropped; with no
/// interests every place passes. A repeated id keeps only its first
/// occurrence. Ordering is total: score, then rating, then
/// input order, so identical input always ranks identically.
#[must_use]
pub fn rank_places<'a>(
    request: &TripRequest,
    center: &Location,
    places: &'a [Place],
    policy: &AllocationPolicy,
    costs: &CostTable,
) -> Vec<RankedPlace<'a>> {
    let interests = request.interests();
    let budget_threshold = request.daily_budget() / 3.0;
    let mut seen: HashSet<&'a str> = HashSet::with_capacity(places.len());

    let mut ranked: Vec<RankedPlace<'a>> = places
        .iter()
        .enumerate()
        .filter_map(|(input_index, place)| {
            let interest_matches = interest_match_count(place, interests);
            if !interests.is_empty() && interest_matches == 0 {
                return None;
            }
            if !seen.insert(place.id.as_str()) {
                return None;
            }

            let distance_km = center.distance_km_to(place.latitude, place.longitude);
            let proximity = (5.0 * (1.0 - distance_km / policy.proximity_radius_km)).max(0.0);
            let rating = f64::from(place.rating.unwrap_or(0.0));

            let mut score = policy.rating_weight * rating
                + policy.proximity_weight * proximity
                + policy.interest_weight * interest_matches as f64;

            if costs.place_cost(place, request.group_size()) < budget_threshold {
                score += policy.budget_friendly_bonus;
            }

            Some(RankedPlace {
                place,
                score,
                interest_matches,
                distance_km,
                input_index,
            })
        })
        .collect();

    ranked.sort_by(|a, b| compare_ranked(a, b, policy.score_epsilon));
    ranked
}

/// Best-first ordering: score, rating, then input position
fn compare_ranked(a: &RankedPlace<'_>, b: &RankedPlace<'_>, epsilon: f64) -> Ordering {
    let by_score = if (a.score - b.score).abs() <= epsilon {
        Ordering::Equal
    } else {
        b.score.total_cmp(&a.score)
    };

    let rating = |r: &RankedPlace<'_>| r.place.rating.unwrap_or(-1.0);

    by_score
        .then_with(|| rating(b).total_cmp(&rating(a)))
        .then_with(|| a.input_index.cmp(&b.input_index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn center() -> Location {
        Location::new(48.8566, 2.3522, "Paris".to_string())
    }

    fn request(interests: &[&str]) -> TripRequest {
        TripRequest::builder(
            "Paris",
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
        )
        .budget(1200.0)
        .interests(interests.iter().copied())
        .build()
        .unwrap()
    }

    #[rstest]
    #[case("museum", "museums", true)]
    #[case("historic_castle", "history", true)]
    #[case("cafe", "food", true)]
    #[case("park", "food", false)]
    #[case("attraction", "architecture", true)]
    fn test_matches_interest(#[case] category: &str, #[case] interest: &str, #[case] hit: bool) {
        let place = Place::new("node/1", "Somewhere", category, 48.85, 2.35);
        assert_eq!(matches_interest(&place, interest), hit);
    }

    #[test]
    fn test_free_form_interest_matches_name() {
        let place = Place::new("node/1", "Jazz Club Étoile", "attraction", 48.85, 2.35);
        assert!(matches_interest(&place, "jazz"));
    }

    #[rstest]
    #[case("Parking Saint-Germain", "shopping", "parks")]
    #[case("Martin's Bar", "bar", "art")]
    #[case("Museum Café", "cafe", "museums")]
    fn test_known_interest_ignores_name(#[case] name: &str, #[case] category: &str, #[case] interest: &str) {
        let place = Place::new("node/1", name, category, 48.85, 2.35);
        assert!(!matches_interest(&place, interest));
    }

    #[rstest]
    fn test_repeated_id_ranked_once(center: Location) {
        let places = vec![
            Place::new("node/1", "Louvre", "museum", 48.8606, 2.3376).with_rating(4.8),
            Place::new("node/2", "Orsay", "museum", 48.86, 2.3266).with_rating(4.7),
            Place::new("node/1", "Louvre (duplicate)", "museum", 48.8606, 2.3376).with_rating(5.0),
        ];
        let ranked = rank_places(
            &request(&["museums"]),
            &center,
            &places,
            &AllocationPolicy::default(),
            &CostTable::default(),
        );

        assert_eq!(ranked.len(), 2);
        let louvre = ranked.iter().find(|r| r.place.id == "node/1").unwrap();
        assert_eq!(louvre.input_index, 0);
        assert_eq!(louvre.place.name, "Louvre");
    }

    #[rstest]
    fn test_filter_by_interest(center: Location) {
        let places = vec![
            Place::new("node/1", "Louvre", "museum", 48.8606, 2.3376),
            Place::new("node/2", "Parc Monceau", "park", 48.8797, 2.3088),
        ];
        let ranked = rank_places(
            &request(&["museums"]),
            &center,
            &places,
            &AllocationPolicy::default(),
            &CostTable::default(),
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].place.id, "node/1");
    }

    #[rstest]
    fn test_empty_interests_pass_everything(center: Location) {
        let places = vec![
            Place::new("node/1", "Louvre", "museum", 48.8606, 2.3376),
            Place::new("node/2", "Parc Monceau", "park", 48.8797, 2.3088),
        ];
        let ranked = rank_places(
            &request(&[]),
            &center,
            &places,
            &AllocationPolicy::default(),
            &CostTable::default(),
        );
        assert_eq!(ranked.len(), 2);
    }

    #[rstest]
    fn test_higher_rating_ranks_first(center: Location) {
        let places = vec![
            Place::new("node/1", "Small Museum", "museum", 48.8566, 2.3522).with_rating(3.0),
            Place::new("node/2", "Big Museum", "museum", 48.8566, 2.3522).with_rating(4.8),
        ];
        let ranked = rank_places(
            &request(&["museums"]),
            &center,
            &places,
            &AllocationPolicy::default(),
            &CostTable::default(),
        );
        assert_eq!(ranked[0].place.id, "node/2");
    }

    #[rstest]
    fn test_closer_place_ranks_first(center: Location) {
        let places = vec![
            Place::new("node/1", "Far Museum", "museum", 48.80, 2.12),
            Place::new("node/2", "Near Museum", "museum", 48.857, 2.352),
        ];
        let ranked = rank_places(
            &request(&["museums"]),
            &center,
            &places,
            &AllocationPolicy::default(),
            &CostTable::default(),
        );
        assert_eq!(ranked[0].place.id, "node/2");
        assert!(ranked[1].distance_km > ranked[0].distance_km);
    }

    #[rstest]
    fn test_ties_keep_input_order(center: Location) {
        let places = vec![
            Place::new("node/7", "Twin A", "museum", 48.8566, 2.3522),
            Place::new("node/3", "Twin B", "museum", 48.8566, 2.3522),
        ];
        let ranked = rank_places(
            &request(&["museums"]),
            &center,
            &places,
            &AllocationPolicy::default(),
            &CostTable::default(),
        );
        assert_eq!(ranked[0].input_index, 0);
        assert_eq!(ranked[1].input_index, 1);
    }

    #[rstest]
    fn test_interest_matches_add_up(center: Location) {
        let places = vec![
            Place::new("node/1", "Plain Museum", "museum", 48.8566, 2.3522),
            Place::new("node/2", "Castle Museum", "historic_castle", 48.8566, 2.3522),
        ];
        let ranked = rank_places(
            &request(&["history", "architecture"]),
            &center,
            &places,
            &AllocationPolicy::default(),
            &CostTable::default(),
        );
        assert_eq!(ranked[0].place.id, "node/2");
        assert_eq!(ranked[0].interest_matches, 2);
        assert_eq!(ranked[1].interest_matches, 1);
    }
}
