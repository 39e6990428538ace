//! Itinerary planning: ranking, day allocation and the language-model strategy
//!
//! The rule-based [`Allocator`] is always available. When a language model is
//! configured its proposal is validated against the candidate list; anything
//! unusable falls back to the rule-based plan.

pub mod allocator;
pub mod costs;
pub mod llm;
pub mod policy;
pub mod proposal;
pub mod ranking;

use std::sync::Arc;

use tracing::{info, instrument, warn};

pub use allocator::Allocator;
pub use costs::{CategoryCost, CostScaling, CostTable};
pub use llm::{GeminiClient, LanguageModel};
pub use policy::{AllocationPolicy, PaceCapacity};
pub use proposal::{PlanProposal, ProposalViolation, ProposedDay};

use crate::TripError;
use crate::models::{Itinerary, Location, Place, StrategyKind, TripRequest};

/// How the planner builds itineraries
#[derive(Clone)]
pub enum PlanningStrategy {
    RuleBased,
    LanguageModel(Arc<dyn LanguageModel>),
}

impl PlanningStrategy {
    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        match self {
            PlanningStrategy::RuleBased => StrategyKind::RuleBased,
            PlanningStrategy::LanguageModel(_) => StrategyKind::LanguageModel,
        }
    }
}

impl std::fmt::Debug for PlanningStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanningStrategy::RuleBased => f.write_str("RuleBased"),
            PlanningStrategy::LanguageModel(model) => {
                f.debug_tuple("LanguageModel").field(&model.name()).finish()
            }
        }
    }
}

/// Entry point for turning a request and its candidates into an itinerary
#[derive(Debug, Clone)]
pub struct ItineraryPlanner {
    allocator: Allocator,
    strategy: PlanningStrategy,
}

impl ItineraryPlanner {
    #[must_use]
    pub fn new(allocator: Allocator, strategy: PlanningStrategy) -> Self {
        Self {
            allocator,
            strategy,
        }
    }

    #[must_use]
    pub fn rule_based(allocator: Allocator) -> Self {
        Self::new(allocator, PlanningStrategy::RuleBased)
    }

    #[must_use]
    pub fn strategy(&self) -> &PlanningStrategy {
        &self.strategy
    }

    #[must_use]
    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// Plan the trip. Never fails: a model error or an invalid model
    /// proposal yields the rule-based itinerary with `fallback_used` set.
    #[instrument(skip_all, fields(destination = %request.destination(), candidates = places.len()))]
    pub async fn plan(&self, request: &TripRequest, center: &Location, places: &[Place]) -> Itinerary {
        let PlanningStrategy::LanguageModel(model) = &self.strategy else {
            return self.allocator.itinerary(request, center, places);
        };

        let ranked = ranking::rank_places(
            request,
            center,
            places,
            self.allocator.policy(),
            self.allocator.costs(),
        );
        if ranked.is_empty() {
            info!("No matching candidates, skipping {}", model.name());
            return self.allocator.itinerary(request, center, places);
        }

        match self.plan_with_model(model.as_ref(), request, &ranked).await {
            Ok(itinerary) => {
                info!(
                    "{} planned {} places over {} days",
                    model.name(),
                    itinerary.total_places(),
                    itinerary.num_days()
                );
                itinerary
            }
            Err(e) => {
                warn!("{} plan rejected, using rule-based plan: {e}", model.name());
                let days = self.allocator.allocate(request, center, places);
                Itinerary::new(request.clone(), days, StrategyKind::RuleBased, true)
            }
        }
    }

    async fn plan_with_model(
        &self,
        model: &dyn LanguageModel,
        request: &TripRequest,
        ranked: &[ranking::RankedPlace<'_>],
    ) -> crate::Result<Itinerary> {
        let costs = self.allocator.costs();
        let capacity = self.allocator.policy().capacity(request.pace());

        let prompt = llm::build_prompt(
            request,
            capacity,
            costs.daily_fixed(request.group_size()),
            ranked,
        );
        let reply = model.generate(llm::SYSTEM_PROMPT, &prompt).await?;

        let proposal = PlanProposal::from_model_text(&reply)
            .map_err(|e| TripError::planner(format!("unparseable reply: {e}")))?;
        let candidates: Vec<Place> = ranked.iter().map(|r| r.place.clone()).collect();
        let assignment = proposal
            .resolve(request.num_days(), capacity.max, &candidates)
            .map_err(|v| TripError::planner(v.to_string()))?;

        let days = self.allocator.assemble(request, &assignment);
        let itinerary = Itinerary::new(request.clone(), days, StrategyKind::LanguageModel, false);
        itinerary.check_invariants().map_err(TripError::planner)?;
        Ok(itinerary)
    }
}
