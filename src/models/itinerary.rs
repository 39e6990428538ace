//! Day plans and the finished itinerary

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{Place, TripRequest};

/// Which planning strategy produced an itinerary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RuleBased,
    LanguageModel,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::RuleBased => f.write_str("rule-based"),
            StrategyKind::LanguageModel => f.write_str("language model"),
        }
    }
}

/// One calendar day of the trip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPlan {
    /// 1-based day number
    pub day_index: u32,
    pub date: NaiveDate,
    /// Places in visiting order
    pub places: Vec<Place>,
    /// Group-scaled cost of the places
    pub activity_cost: f64,
    /// Group-scaled meal estimate
    pub meal_cost: f64,
    /// Group-scaled local transport estimate
    pub transport_cost: f64,
    /// Sum of activity, meal and transport costs
    pub estimated_cost: f64,
    pub notes: Option<String>,
}

impl DayPlan {
    /// A day with nothing planned and no cost
    #[must_use]
    pub fn empty(day_index: u32, date: NaiveDate) -> Self {
        Self {
            day_index,
            date,
            places: Vec::new(),
            activity_cost: 0.0,
            meal_cost: 0.0,
            transport_cost: 0.0,
            estimated_cost: 0.0,
            notes: None,
        }
    }

    #[must_use]
    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Expected time on site for the whole day, in minutes
    #[must_use]
    pub fn total_visit_minutes(&self) -> u32 {
        self.places.iter().map(|p| p.visit_minutes).sum()
    }
}

/// Cost split by kind across the whole trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub activities: f64,
    pub meals: f64,
    pub transport: f64,
}

/// The complete plan handed to presentation. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    request: TripRequest,
    days: Vec<DayPlan>,
    total_cost: f64,
    budget: f64,
    strategy: StrategyKind,
    fallback_used: bool,
    notes: String,
    created_at: DateTime<Utc>,
}

impl Itinerary {
    /// Assemble an itinerary from finished day plans
    #[must_use]
    pub fn new(
        request: TripRequest,
        days: Vec<DayPlan>,
        strategy: StrategyKind,
        fallback_used: bool,
    ) -> Self {
        let total_cost = round_cents(days.iter().map(|d| d.estimated_cost).sum());
        let budget = request.budget();
        let status = if total_cost <= budget {
            "within budget".to_string()
        } else {
            format!("over budget by ${:.2}", total_cost - budget)
        };
        let notes = format!(
            "Itinerary created for {} days with {} pace. Total cost is {status}.",
            request.num_days(),
            request.pace()
        );

        Self {
            request,
            days,
            total_cost,
            budget,
            strategy,
            fallback_used,
            notes,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn request(&self) -> &TripRequest {
        &self.request
    }

    #[must_use]
    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    #[must_use]
    pub fn budget(&self) -> f64 {
        self.budget
    }

    #[must_use]
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// True when the language model was configured but its plan was rejected
    #[must_use]
    pub fn fallback_used(&self) -> bool {
        self.fallback_used
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn total_places(&self) -> usize {
        self.days.iter().map(DayPlan::place_count).sum()
    }

    /// Every scheduled place, in day order
    pub fn places(&self) -> impl Iterator<Item = (&DayPlan, &Place)> {
        self.days
            .iter()
            .flat_map(|day| day.places.iter().map(move |place| (day, place)))
    }

    /// Remaining budget; negative when over budget
    #[must_use]
    pub fn budget_remaining(&self) -> f64 {
        round_cents(self.budget - self.total_cost)
    }

    /// Amount by which the plan exceeds the budget, zero otherwise
    #[must_use]
    pub fn overage(&self) -> f64 {
        round_cents((self.total_cost - self.budget).max(0.0))
    }

    #[must_use]
    pub fn is_within_budget(&self) -> bool {
        self.total_cost <= self.budget
    }

    #[must_use]
    pub fn budget_used_percentage(&self) -> f64 {
        if self.budget <= 0.0 {
            return 0.0;
        }
        self.total_cost / self.budget * 100.0
    }

    #[must_use]
    pub fn cost_per_person(&self) -> f64 {
        round_cents(self.total_cost / f64::from(self.request.group_size()))
    }

    #[must_use]
    pub fn cost_breakdown(&self) -> CostBreakdown {
        let sum = |f: fn(&DayPlan) -> f64| round_cents(self.days.iter().map(f).sum());
        CostBreakdown {
            activities: sum(|d| d.activity_cost),
            meals: sum(|d| d.meal_cost),
            transport: sum(|d| d.transport_cost),
        }
    }

    /// Check the structural invariants: one plan per trip day in order, and
    /// no place scheduled twice
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.days.len() != self.request.num_days() as usize {
            return Err(format!(
                "expected {} day plans, found {}",
                self.request.num_days(),
                self.days.len()
            ));
        }

        for (day, expected) in self.days.iter().zip(self.request.dates()) {
            if day.date != expected {
                return Err(format!(
                    "day {} is dated {} instead of {expected}",
                    day.day_index, day.date
                ));
            }
        }

        let mut seen = HashSet::new();
        for (day, place) in self.places() {
            if !seen.insert(place.id.as_str()) {
                return Err(format!(
                    "place '{}' scheduled again on day {}",
                    place.id, day.day_index
                ));
            }
        }

        Ok(())
    }
}

/// Round a currency amount to cents
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
