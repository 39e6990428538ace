//! Rule-based allocation of ranked places to trip days

use tracing::{debug, info};

use crate::models::{DayPlan, Itinerary, Location, Place, StrategyKind, TripRequest, round_cents};

use super::ranking::{RankedPlace, rank_places};
use super::{AllocationPolicy, CostTable};

/// Deterministic greedy planner. Pure and synchronous: no I/O, no shared
/// state, safe to call concurrently for different requests.
#[derive(Debug, Clone, Default)]
pub struct Allocator {
    policy: AllocationPolicy,
    costs: CostTable,
}

impl Allocator {
    #[must_use]
    pub fn new(policy: AllocationPolicy, costs: CostTable) -> Self {
        Self { policy, costs }
    }

    #[must_use]
    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    #[must_use]
    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    /// Build a complete rule-based itinerary
    #[must_use]
    pub fn itinerary(&self, request: &TripRequest, center: &Location, places: &[Place]) -> Itinerary {
        let days = self.allocate(request, center, places);
        Itinerary::new(request.clone(), days, StrategyKind::RuleBased, false)
    }

    /// Rank the candidates and walk them once, filling each day in turn.
    ///
    /// Always returns one plan per trip day; days left without candidates
    /// are empty.
    #[must_use]
    pub fn allocate(&self, request: &TripRequest, center: &Location, places: &[Place]) -> Vec<DayPlan> {
        let ranked = rank_places(request, center, places, &self.policy, &self.costs);
        info!(
            "Ranked {} of {} candidates for {} ({} days, {} pace)",
            ranked.len(),
            places.len(),
            request.destination(),
            request.num_days(),
            request.pace()
        );

        let assignment = self.assign(request, ranked);
        self.assemble(request, &assignment)
    }

    fn assign<'a>(&self, request: &TripRequest, mut remaining: Vec<RankedPlace<'a>>) -> Vec<Vec<&'a Place>> {
        let num_days = request.num_days() as usize;
        let capacity = self.policy.capacity(request.pace());
        let group = request.group_size();
        let budget_cap = self
            .policy
            .budget_slack
            .map(|slack| request.budget() * (1.0 + slack));

        let mut committed = 0.0;
        let mut days = Vec::with_capacity(num_days);

        for day_number in 0..num_days {
            let days_after = num_days - day_number - 1;
            let mut day: Vec<RankedPlace<'a>> = Vec::with_capacity(capacity.max);

            while !remaining.is_empty() && day.len() < capacity.max {
                let pick = self.pick_next(&remaining, day.last());
                let candidate = &remaining[pick];

                if day.len() >= capacity.min {
                    let best = day[0].score;
                    let enough_left = remaining.len() - 1 >= capacity.min * days_after;
                    if !enough_left || candidate.score < self.policy.stretch_ratio * best {
                        break;
                    }
                }

                if let Some(cap) = budget_cap {
                    let fixed = if day.is_empty() {
                        self.costs.daily_fixed(group)
                    } else {
                        0.0
                    };
                    let cost = self.costs.place_cost(candidate.place, group);
                    if committed + fixed + cost > cap {
                        debug!(
                            "Skipping {} ({:.2}): trip total would exceed {:.2}",
                            candidate.place.name,
                            cost,
                            cap
                        );
                        remaining.remove(pick);
                        continue;
                    }
                    committed += fixed + cost;
                }

                day.push(remaining.remove(pick));
            }

            debug!(
                "Day {}: {} places ({} candidates left)",
                day_number + 1,
                day.len(),
                remaining.len()
            );
            days.push(day.into_iter().map(|r| r.place).collect());
        }

        days
    }

    /// Index of the next candidate to schedule.
    ///
    /// Normally the head of the ranking. Among candidates ranked equal to the
    /// head (same score and rating) the one nearest to the previous stop of
    /// the day wins.
    fn pick_next(&self, remaining: &[RankedPlace<'_>], previous: Option<&RankedPlace<'_>>) -> usize {
        let Some(previous) = previous else {
            return 0;
        };

        let head = &remaining[0];
        let tied = remaining
            .iter()
            .take_while(|r| {
                (r.score - head.score).abs() <= self.policy.score_epsilon
                    && r.place.rating == head.place.rating
            })
            .count();

        (0..tied)
            .min_by(|&a, &b| {
                let da = previous.place.distance_km(remaining[a].place);
                let db = previous.place.distance_km(remaining[b].place);
                da.total_cmp(&db).then(a.cmp(&b))
            })
            .unwrap_or(0)
    }

    /// Turn per-day place lists into costed day plans.
    ///
    /// Days with at least one place carry the meal and transport estimate;
    /// an empty day costs nothing.
    #[must_use]
    pub fn assemble(&self, request: &TripRequest, assignment: &[Vec<&Place>]) -> Vec<DayPlan> {
        let group = request.group_size();

        request
            .dates()
            .enumerate()
            .map(|(offset, date)| {
                let day_index = offset as u32 + 1;
                let places: Vec<Place> = assignment
                    .get(offset)
                    .map(|day| day.iter().map(|&p| p.clone()).collect())
                    .unwrap_or_default();

                if places.is_empty() {
                    return DayPlan {
                        notes: Some("No activities planned".to_string()),
                        ..DayPlan::empty(day_index, date)
                    };
                }

                let activity_cost = round_cents(
                    places
                        .iter()
                        .map(|p| self.costs.place_cost(p, group))
                        .sum(),
                );
                let meal_cost = round_cents(self.costs.daily_meals(group));
                let transport_cost = round_cents(self.costs.daily_transport(group));

                DayPlan {
                    day_index,
                    date,
                    places,
                    activity_cost,
                    meal_cost,
                    transport_cost,
                    estimated_cost: round_cents(activity_cost + meal_cost + transport_cost),
                    notes: Some(format!(
                        "Includes meals (~${meal_cost:.0}) and transport (~${transport_cost:.0})"
                    )),
                }
            })
            .collect()
    }
}
