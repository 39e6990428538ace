//! Trip request model and validation

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::TripError;

/// Requested density of activities per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Relaxed,
    Moderate,
    Packed,
}

impl Pace {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Pace::Relaxed => "relaxed",
            Pace::Moderate => "moderate",
            Pace::Packed => "packed",
        }
    }
}

impl Default for Pace {
    fn default() -> Self {
        Pace::Moderate
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pace {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relaxed" => Ok(Pace::Relaxed),
            "moderate" => Ok(Pace::Moderate),
            "packed" => Ok(Pace::Packed),
            other => Err(TripError::invalid_request(format!(
                "Pace must be one of relaxed, moderate, packed; got '{other}'"
            ))),
        }
    }
}

/// A validated trip request.
///
/// Fields are private so a constructed request can't be changed into an
/// invalid one; use [`TripRequest::new`] or [`TripRequest::builder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRequest {
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    budget: f64,
    group_size: u32,
    interests: BTreeSet<String>,
    pace: Pace,
}

impl TripRequest {
    /// Longest trip the planner accepts
    pub const MAX_DAYS: u32 = 60;

    /// Validate and build a trip request
    pub fn new(
        destination: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        budget: f64,
        group_size: u32,
        interests: impl IntoIterator<Item = impl AsRef<str>>,
        pace: Pace,
    ) -> crate::Result<Self> {
        let destination = destination.into().trim().to_string();
        if destination.is_empty() {
            return Err(TripError::invalid_request("Destination cannot be empty"));
        }

        if end_date < start_date {
            return Err(TripError::invalid_request(format!(
                "End date {end_date} is before start date {start_date}"
            )));
        }

        let span = (end_date - start_date).num_days() + 1;
        if span > i64::from(Self::MAX_DAYS) {
            return Err(TripError::invalid_request(format!(
                "Trips are limited to {} days, got {span}",
                Self::MAX_DAYS
            )));
        }

        if !budget.is_finite() || budget <= 0.0 {
            return Err(TripError::invalid_request(format!(
                "Budget must be a positive amount, got {budget}"
            )));
        }

        if group_size == 0 {
            return Err(TripError::invalid_request("Group size must be at least 1"));
        }

        let interests = interests
            .into_iter()
            .map(|i| i.as_ref().trim().to_lowercase())
            .filter(|i| !i.is_empty())
            .collect();

        Ok(Self {
            destination,
            start_date,
            end_date,
            budget,
            group_size,
            interests,
            pace,
        })
    }

    /// Start a builder with the required destination and dates
    #[must_use]
    pub fn builder(
        destination: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> TripRequestBuilder {
        TripRequestBuilder {
            destination: destination.into(),
            start_date,
            end_date,
            budget: 1000.0,
            group_size: 1,
            interests: Vec::new(),
            pace: Pace::default(),
        }
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    #[must_use]
    pub fn budget(&self) -> f64 {
        self.budget
    }

    #[must_use]
    pub fn group_size(&self) -> u32 {
        self.group_size
    }

    #[must_use]
    pub fn interests(&self) -> &BTreeSet<String> {
        &self.interests
    }

    #[must_use]
    pub fn pace(&self) -> Pace {
        self.pace
    }

    /// Inclusive number of calendar days in the trip
    #[must_use]
    pub fn num_days(&self) -> u32 {
        // bounded by MAX_DAYS at construction
        u32::try_from((self.end_date - self.start_date).num_days() + 1).unwrap_or(1)
    }

    /// Budget available per day
    #[must_use]
    pub fn daily_budget(&self) -> f64 {
        self.budget / f64::from(self.num_days())
    }

    /// Date of the 1-based trip day
    #[must_use]
    pub fn date_of_day(&self, day_index: u32) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(u64::from(day_index.saturating_sub(1))))
            .unwrap_or(self.end_date)
    }

    /// Iterate over every date of the trip in order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (1..=self.num_days()).map(|day| self.date_of_day(day))
    }
}

/// Builder for [`TripRequest`]; validation happens in [`TripRequestBuilder::build`]
#[derive(Debug, Clone)]
pub struct TripRequestBuilder {
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    budget: f64,
    group_size: u32,
    interests: Vec<String>,
    pace: Pace,
}

impl TripRequestBuilder {
    #[must_use]
    pub fn budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }

    #[must_use]
    pub fn group_size(mut self, group_size: u32) -> Self {
        self.group_size = group_size;
        self
    }

    #[must_use]
    pub fn interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }

    pub fn build(self) -> crate::Result<TripRequest> {
        TripRequest::new(
            self.destination,
            self.start_date,
            self.end_date,
            self.budget,
            self.group_size,
            self.interests,
            self.pace,
        )
    }
}
