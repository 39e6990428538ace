//! Default visit costs per category and per-day fixed costs

use serde::{Deserialize, Serialize};

use crate::models::Place;

/// Whether a cost is paid by every traveller or once for the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostScaling {
    PerPerson,
    Flat,
}

/// Default cost for places whose category contains `category`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub category: String,
    pub cost: f64,
    pub scaling: CostScaling,
}

impl CategoryCost {
    fn new(category: &str, cost: f64, scaling: CostScaling) -> Self {
        Self {
            category: category.to_string(),
            cost,
            scaling,
        }
    }
}

/// Immutable cost policy handed to the allocator.
///
/// Categories are matched in order by substring, so `historic` covers
/// `historic_castle` and `historic_monument`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    /// Meals per person per planned day
    pub meal_per_person: f64,
    /// Local transport per person per planned day
    pub transport_per_person: f64,
    /// Used when no category matches
    pub fallback: CategoryCost,
    pub categories: Vec<CategoryCost>,
}

impl Default for CostTable {
    fn default() -> Self {
        use CostScaling::{Flat, PerPerson};

        Self {
            meal_per_person: 40.0,
            transport_per_person: 15.0,
            fallback: CategoryCost::new("other", 10.0, PerPerson),
            categories: vec![
                CategoryCost::new("museum", 15.0, PerPerson),
                CategoryCost::new("art_gallery", 12.0, PerPerson),
                CategoryCost::new("theatre", 30.0, PerPerson),
                CategoryCost::new("theme_park", 45.0, PerPerson),
                CategoryCost::new("park", 0.0, PerPerson),
                CategoryCost::new("garden", 5.0, PerPerson),
                CategoryCost::new("beach", 0.0, PerPerson),
                CategoryCost::new("restaurant", 25.0, PerPerson),
                CategoryCost::new("cafe", 15.0, PerPerson),
                CategoryCost::new("bar", 20.0, PerPerson),
                CategoryCost::new("religious_site", 0.0, PerPerson),
                CategoryCost::new("cathedral", 0.0, PerPerson),
                CategoryCost::new("historic", 10.0, Flat),
                CategoryCost::new("attraction", 10.0, PerPerson),
                CategoryCost::new("shopping", 20.0, Flat),
                CategoryCost::new("viewpoint", 0.0, Flat),
            ],
        }
    }
}

impl CostTable {
    /// Cost entry for a category
    #[must_use]
    pub fn lookup(&self, category: &str) -> &CategoryCost {
        let category = category.to_lowercase();
        self.categories
            .iter()
            .find(|entry| category.contains(&entry.category))
            .unwrap_or(&self.fallback)
    }

    /// Group-scaled cost of visiting a place
    #[must_use]
    pub fn place_cost(&self, place: &Place, group_size: u32) -> f64 {
        let entry = self.lookup(&place.category);
        let unit = place.estimated_cost.unwrap_or(entry.cost);
        match entry.scaling {
            CostScaling::PerPerson => unit * f64::from(group_size),
            CostScaling::Flat => unit,
        }
    }

    /// Group-scaled meal cost for one planned day
    #[must_use]
    pub fn daily_meals(&self, group_size: u32) -> f64 {
        self.meal_per_person * f64::from(group_size)
    }

    /// Group-scaled transport cost for one planned day
    #[must_use]
    pub fn daily_transport(&self, group_size: u32) -> f64 {
        self.transport_per_person * f64::from(group_size)
    }

    /// Meals plus transport for one planned day
    #[must_use]
    pub fn daily_fixed(&self, group_size: u32) -> f64 {
        self.daily_meals(group_size) + self.daily_transport(group_size)
    }

    pub fn validate(&self) -> Result<(), String> {
        let negative = std::iter::once(&self.fallback)
            .chain(&self.categories)
            .find(|entry| !entry.cost.is_finite() || entry.cost < 0.0);
        if let Some(entry) = negative {
            return Err(format!(
                "Cost for category '{}' must be a non-negative amount",
                entry.category
            ));
        }
        if self.meal_per_person < 0.0 || self.transport_per_person < 0.0 {
            return Err("Meal and transport costs cannot be negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("museum", 15.0)]
    #[case("art_gallery", 12.0)]
    #[case("historic_castle", 10.0)]
    #[case("park", 0.0)]
    #[case("something_else", 10.0)]
    fn test_lookup(#[case] category: &str, #[case] expected: f64) {
        let table = CostTable::default();
        assert_eq!(table.lookup(category).cost, expected);
    }

    #[test]
    fn test_per_person_cost_scales_with_group() {
        let table = CostTable::default();
        let museum = Place::new("node/1", "Louvre", "museum", 48.86, 2.33);
        assert_eq!(table.place_cost(&museum, 3), 45.0);
    }

    #[test]
    fn test_flat_cost_does_not_scale() {
        let table = CostTable::default();
        let castle = Place::new("node/2", "Vincennes", "historic_castle", 48.84, 2.43);
        assert_eq!(table.place_cost(&castle, 4), 10.0);
    }

    #[test]
    fn test_explicit_cost_overrides_default() {
        let table = CostTable::default();
        let museum = Place::new("node/1", "Orsay", "museum", 48.86, 2.32).with_cost(16.0);
        assert_eq!(table.place_cost(&museum, 2), 32.0);
    }

    #[test]
    fn test_daily_fixed() {
        let table = CostTable::default();
        assert_eq!(table.daily_fixed(2), 110.0);
    }

    #[test]
    fn test_validate_rejects_negative_cost() {
        let mut table = CostTable::default();
        table.categories[0].cost = -1.0;
        assert!(table.validate().is_err());
    }
}
