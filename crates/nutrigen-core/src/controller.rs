//! Drives [`AppState`] by running planner calls for the effects the flows
//! request.
//!
//! Every asynchronous operation is split in three so callers (and tests)
//! can interleave user events with in-flight requests:
//!
//! 1. [`Controller::apply`] a user event and receive an [`Effect`],
//! 2. [`perform`] the effect against a planner, yielding a response event,
//! 3. [`Controller::apply`] the response event.
//!
//! [`Controller::dispatch`] runs all three back to back.

use std::sync::Arc;

use crate::collaborator::MealPlanner;
use crate::flow::{AppState, Effect, Event, Notice, TransitionError, transition};
use crate::plan::{MealSlot, WeeklyPlan};
use crate::profile::UserProfile;

/// Run the planner call described by `effect` and turn its outcome into the
/// event that reports it.
pub async fn perform(planner: &dyn MealPlanner, effect: Effect) -> Event {
    match effect {
        Effect::FetchPlan { token, profile } => match planner.generate_plan(&profile).await {
            Ok(plan) => Event::PlanGenerated { token, plan },
            Err(e) => {
                tracing::error!(planner = planner.name(), token = %token, error = %e, "plan generation failed");
                Event::GenerationFailed {
                    token,
                    detail: e.to_string(),
                }
            }
        },
        Effect::FetchAlternatives { token, request } => {
            match planner.meal_alternatives(&request).await {
                Ok(candidates) => Event::AlternativesLoaded { token, candidates },
                Err(e) => {
                    tracing::error!(planner = planner.name(), token = %token, error = %e, "alternatives request failed");
                    Event::AlternativesFailed {
                        token,
                        detail: e.to_string(),
                    }
                }
            }
        }
    }
}

/// Sole owner and writer of the application state.
pub struct Controller {
    state: AppState,
    planner: Arc<dyn MealPlanner>,
}

impl Controller {
    pub fn new(planner: Arc<dyn MealPlanner>) -> Self {
        Self {
            state: AppState::new(),
            planner,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.state.profile()
    }

    pub fn plan(&self) -> Option<&WeeklyPlan> {
        self.state.plan()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.state.notice.as_ref()
    }

    /// Apply one event. On error the state is left unchanged.
    pub fn apply(&mut self, event: Event) -> Result<Option<Effect>, TransitionError> {
        let next = transition(&self.state, event)?;
        self.state = next.state;
        Ok(next.effect)
    }

    /// Apply `event`, run the planner call it asks for, and apply the
    /// response.
    pub async fn dispatch(&mut self, event: Event) -> Result<(), TransitionError> {
        if let Some(effect) = self.apply(event)? {
            let response = perform(self.planner.as_ref(), effect).await;
            self.apply(response)?;
        }
        Ok(())
    }

    /// Submit `profile` and wait for the plan. A planner failure is not an
    /// error here: it returns the state to input with a notice set.
    pub async fn generate(&mut self, profile: UserProfile) -> Result<(), TransitionError> {
        self.dispatch(Event::Submit(profile)).await
    }

    /// Open the swap dialog for one meal and wait for candidates.
    pub async fn open_swap(&mut self, day_index: usize, slot: MealSlot) -> Result<(), TransitionError> {
        self.dispatch(Event::OpenSwap { day_index, slot }).await
    }

    pub fn select_alternative(&mut self, index: usize) -> Result<(), TransitionError> {
        self.apply(Event::SelectAlternative { index }).map(drop)
    }

    pub fn cancel_swap(&mut self) {
        self.apply_unconditional(Event::CancelSwap);
    }

    pub fn reset(&mut self) {
        tracing::debug!(stage = self.state.stage.name(), "reset");
        self.apply_unconditional(Event::Reset);
    }

    pub fn dismiss_notice(&mut self) {
        self.apply_unconditional(Event::DismissNotice);
    }

    /// For events that are accepted in every state and start no request.
    fn apply_unconditional(&mut self, event: Event) {
        if let Ok(next) = transition(&self.state, event) {
            self.state = next.state;
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("planner", &self.planner.name())
            .field("state", &self.state)
            .finish()
    }
}
