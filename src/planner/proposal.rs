//! Day assignments proposed by a language model, and their validation

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Place;

/// Model answer: which place ids to visit on which day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProposal {
    pub days: Vec<ProposedDay>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedDay {
    /// 1-based day number
    pub day: u32,
    #[serde(default)]
    pub place_ids: Vec<String>,
}

/// Why a proposal was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProposalViolation {
    #[error("expected {expected} days, got {actual}")]
    DayCount { expected: u32, actual: usize },

    #[error("day {day} is outside the trip")]
    DayOutOfRange { day: u32 },

    #[error("day {day} listed twice")]
    RepeatedDay { day: u32 },

    #[error("unknown place id '{id}' on day {day}")]
    UnknownPlace { day: u32, id: String },

    #[error("place '{id}' scheduled more than once (again on day {day})")]
    DuplicatePlace { day: u32, id: String },

    #[error("day {day} has {count} places, more than the limit of {limit}")]
    OverCapacity { day: u32, count: usize, limit: usize },
}

impl PlanProposal {
    /// Parse a model reply, tolerating a fenced ```json block around it
    pub fn from_model_text(text: &str) -> serde_json::Result<Self> {
        let trimmed = text.trim();
        let body = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|rest| rest.trim_end().strip_suffix("```"))
            .unwrap_or(trimmed);
        serde_json::from_str(body.trim())
    }

    /// Check the proposal against the trip shape and the candidate list and
    /// resolve it into per-day place lists in day order.
    pub fn resolve<'a>(
        &self,
        num_days: u32,
        max_per_day: usize,
        candidates: &'a [Place],
    ) -> Result<Vec<Vec<&'a Place>>, ProposalViolation> {
        if self.days.len() != num_days as usize {
            return Err(ProposalViolation::DayCount {
                expected: num_days,
                actual: self.days.len(),
            });
        }

        let by_id: HashMap<&str, &Place> =
            candidates.iter().map(|p| (p.id.as_str(), p)).collect();
        let mut resolved: Vec<Option<Vec<&Place>>> = vec![None; num_days as usize];
        let mut scheduled: HashSet<&str> = HashSet::new();

        for proposed in &self.days {
            let day = proposed.day;
            if day == 0 || day > num_days {
                return Err(ProposalViolation::DayOutOfRange { day });
            }

            let slot = &mut resolved[day as usize - 1];
            if slot.is_some() {
                return Err(ProposalViolation::RepeatedDay { day });
            }

            if proposed.place_ids.len() > max_per_day {
                return Err(ProposalViolation::OverCapacity {
                    day,
                    count: proposed.place_ids.len(),
                    limit: max_per_day,
                });
            }

            let mut places = Vec::with_capacity(proposed.place_ids.len());
            for id in &proposed.place_ids {
                let place = by_id
                    .get(id.as_str())
                    .ok_or_else(|| ProposalViolation::UnknownPlace {
                        day,
                        id: id.clone(),
                    })?;
                if !scheduled.insert(place.id.as_str()) {
                    return Err(ProposalViolation::DuplicatePlace {
                        day,
                        id: id.clone(),
                    });
                }
                places.push(*place);
            }
            *slot = Some(places);
        }

        // day count matched and no day repeated, so every slot is filled
        Ok(resolved.into_iter().map(Option::unwrap_or_default).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Place> {
        vec![
            Place::new("node/1", "Louvre", "museum", 48.8606, 2.3376),
            Place::new("node/2", "Orsay", "museum", 48.86, 2.3266),
            Place::new("node/3", "Le Procope", "restaurant", 48.853, 2.3388),
        ]
    }

    fn proposal(days: &[(u32, &[&str])]) -> PlanProposal {
        PlanProposal {
            days: days
                .iter()
                .map(|(day, ids)| ProposedDay {
                    day: *day,
                    place_ids: ids.iter().map(ToString::to_string).collect(),
                })
                .collect(),
            notes: None,
        }
    }

    #[test]
    fn test_valid_proposal_resolves_in_day_order() {
        let candidates = candidates();
        let resolved = proposal(&[(2, &["node/3"]), (1, &["node/1", "node/2"])])
            .resolve(2, 4, &candidates)
            .unwrap();

        assert_eq!(resolved[0].len(), 2);
        assert_eq!(resolved[1][0].id, "node/3");
    }

    #[test]
    fn test_empty_day_is_valid() {
        let candidates = candidates();
        let resolved = proposal(&[(1, &["node/1"]), (2, &[])])
            .resolve(2, 4, &candidates)
            .unwrap();
        assert!(resolved[1].is_empty());
    }

    #[test]
    fn test_duplicate_across_days_is_rejected() {
        let candidates = candidates();
        let err = proposal(&[(1, &["node/1"]), (2, &["node/1"])])
            .resolve(2, 4, &candidates)
            .unwrap_err();
        assert!(matches!(err, ProposalViolation::DuplicatePlace { day: 2, .. }));
    }

    #[test]
    fn test_wrong_day_count_is_rejected() {
        let candidates = candidates();
        let err = proposal(&[(1, &["node/1"])])
            .resolve(3, 4, &candidates)
            .unwrap_err();
        assert_eq!(err, ProposalViolation::DayCount { expected: 3, actual: 1 });
    }

    #[test]
    fn test_unknown_place_is_rejected() {
        let candidates = candidates();
        let err = proposal(&[(1, &["node/99"])])
            .resolve(1, 4, &candidates)
            .unwrap_err();
        assert!(matches!(err, ProposalViolation::UnknownPlace { .. }));
    }

    #[test]
    fn test_repeated_day_is_rejected() {
        let candidates = candidates();
        let err = proposal(&[(1, &["node/1"]), (1, &["node/2"])])
            .resolve(2, 4, &candidates)
            .unwrap_err();
        assert_eq!(err, ProposalViolation::RepeatedDay { day: 1 });
    }

    #[test]
    fn test_over_capacity_is_rejected() {
        let candidates = candidates();
        let err = proposal(&[(1, &["node/1", "node/2", "node/3"])])
            .resolve(1, 2, &candidates)
            .unwrap_err();
        assert!(matches!(err, ProposalViolation::OverCapacity { count: 3, .. }));
    }

    #[test]
    fn test_parse_fenced_reply() {
        let text = "```json\n{\"days\": [{\"day\": 1, \"place_ids\": [\"node/1\"]}]}\n```";
        let parsed = PlanProposal::from_model_text(text).unwrap();
        assert_eq!(parsed.days[0].place_ids, vec!["node/1".to_string()]);
        assert_eq!(parsed.notes, None);
    }
}
