//! The external planner interface.
//!
//! The flows only depend on the [`MealPlanner`] trait: a profile goes in and
//! a weekly plan comes out, or a meal slot goes in and candidate meals come
//! out. [`GeminiPlanner`] is the production implementation; tests supply
//! scripted fakes.
//!
//! ```text
//! Controller
//!     |
//!     v
//! Arc<dyn MealPlanner> --generate_plan(profile)------> WeeklyPlan
//!                      --meal_alternatives(request)--> Vec<Meal>
//! ```

pub mod gemini;
pub mod prompt;
pub mod schema;

pub use gemini::{GeminiConfig, GeminiPlanner};

use async_trait::async_trait;
use thiserror::Error;

use crate::plan::{Meal, MealSlot, PlanParseError, WeeklyPlan};
use crate::profile::UserProfile;

/// Failures of a planner call. None of them are retried automatically.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("planner credential is not configured")]
    MissingCredential,

    /// Transport failure. The request URL is stripped from the source.
    #[error("planner request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("planner API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("planner returned no data")]
    EmptyResponse,

    #[error("malformed planner response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for CollaboratorError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

impl From<PlanParseError> for CollaboratorError {
    fn from(err: PlanParseError) -> Self {
        match err {
            PlanParseError::EmptyResponse => Self::EmptyResponse,
            other @ PlanParseError::Malformed { .. } => Self::Malformed(other.to_string()),
        }
    }
}

/// Parameters for an alternatives lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativesRequest {
    pub profile: UserProfile,
    pub slot: MealSlot,
    /// Calories of the meal being replaced; the candidates aim for this.
    pub target_calories: u32,
    /// Name of the meal being replaced, so candidates differ from it.
    pub current_meal_name: String,
}

impl AlternativesRequest {
    pub fn for_meal(profile: &UserProfile, slot: MealSlot, current: &Meal) -> Self {
        Self {
            profile: profile.clone(),
            slot,
            target_calories: current.calories,
            current_meal_name: current.name.clone(),
        }
    }
}

/// An external service that writes meal plans.
///
/// The trait is object-safe so the controller can hold
/// `Arc<dyn MealPlanner>`.
#[async_trait]
pub trait MealPlanner: Send + Sync {
    /// Short name for logs, e.g. "gemini".
    fn name(&self) -> &str;

    /// Produce a complete 7-day plan for `profile`.
    async fn generate_plan(&self, profile: &UserProfile) -> Result<WeeklyPlan, CollaboratorError>;

    /// Produce candidate replacements for one meal slot. Three are asked
    /// for, but any count is a valid answer.
    async fn meal_alternatives(
        &self,
        request: &AlternativesRequest,
    ) -> Result<Vec<Meal>, CollaboratorError>;
}

// Compile-time assertion: MealPlanner must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn MealPlanner) {}
};
