//! Tunable ranking and allocation policy

use serde::{Deserialize, Serialize};

use crate::models::Pace;

/// Number of places per day for a pace: `min` is the target, `max` a soft ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaceCapacity {
    pub min: usize,
    pub max: usize,
}

impl PaceCapacity {
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Scoring weights and day capacities used by the rule-based allocator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationPolicy {
    /// Weight of the 0-5 rating
    pub rating_weight: f64,
    /// Weight of the 0-5 proximity score
    pub proximity_weight: f64,
    /// Score added per matched interest
    pub interest_weight: f64,
    /// Bonus for places cheaper than a third of the daily budget
    pub budget_friendly_bonus: f64,
    /// Distance at which the proximity score reaches zero
    pub proximity_radius_km: f64,
    /// Scores closer than this are considered equal
    pub score_epsilon: f64,
    /// A day grows past its target only with candidates scoring at least
    /// this fraction of the day's best score
    pub stretch_ratio: f64,
    /// Fraction of the budget the trip may exceed before places stop being
    /// added; `None` reports overage without truncating
    pub budget_slack: Option<f64>,
    pub relaxed: PaceCapacity,
    pub moderate: PaceCapacity,
    pub packed: PaceCapacity,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            rating_weight: 1.0,
            proximity_weight: 1.0,
            interest_weight: 5.0,
            budget_friendly_bonus: 2.0,
            proximity_radius_km: 10.0,
            score_epsilon: 1e-9,
            stretch_ratio: 0.8,
            budget_slack: None,
            relaxed: PaceCapacity::new(2, 3),
            moderate: PaceCapacity::new(3, 4),
            packed: PaceCapacity::new(5, 6),
        }
    }
}

impl AllocationPolicy {
    #[must_use]
    pub fn capacity(&self, pace: Pace) -> PaceCapacity {
        match pace {
            Pace::Relaxed => self.relaxed,
            Pace::Moderate => self.moderate,
            Pace::Packed => self.packed,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, capacity) in [
            ("relaxed", self.relaxed),
            ("moderate", self.moderate),
            ("packed", self.packed),
        ] {
            if capacity.min == 0 || capacity.min > capacity.max {
                return Err(format!(
                    "Capacity for {name} pace must satisfy 1 <= min <= max, got {}..{}",
                    capacity.min, capacity.max
                ));
            }
        }

        let weights = [
            self.rating_weight,
            self.proximity_weight,
            self.interest_weight,
            self.budget_friendly_bonus,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("Scoring weights must be non-negative numbers".to_string());
        }

        if self.proximity_radius_km <= 0.0 {
            return Err("Proximity radius must be positive".to_string());
        }

        if !(0.0..=1.0).contains(&self.stretch_ratio) {
            return Err("Stretch ratio must be between 0 and 1".to_string());
        }

        if let Some(slack) = self.budget_slack {
            if !slack.is_finite() || slack < 0.0 {
                return Err("Budget slack cannot be negative".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacities() {
        let policy = AllocationPolicy::default();
        assert_eq!(policy.capacity(Pace::Relaxed), PaceCapacity::new(2, 3));
        assert_eq!(policy.capacity(Pace::Moderate), PaceCapacity::new(3, 4));
        assert_eq!(policy.capacity(Pace::Packed), PaceCapacity::new(5, 6));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_inverted_capacity_is_rejected() {
        let policy = AllocationPolicy {
            packed: PaceCapacity::new(6, 5),
            ..AllocationPolicy::default()
        };
        assert!(policy.validate().unwrap_err().contains("packed"));
    }

    #[test]
    fn test_negative_slack_is_rejected() {
        let policy = AllocationPolicy {
            budget_slack: Some(-0.1),
            ..AllocationPolicy::default()
        };
        assert!(policy.validate().is_err());
    }
}
