//! The transition function for [`AppState`].
//!
//! Enforces the stage graph:
//!
//! ```text
//! input      -> submitting   (submit)
//! submitting -> result       (plan generated, matching token)
//! submitting -> input        (generation failed, matching token)
//! any        -> input        (reset)
//! ```
//!
//! and, inside `result`, the swap graph:
//!
//! ```text
//! closed | fetching | choices -> fetching   (open swap, new token)
//! fetching -> choices                       (alternatives loaded, matching token)
//! fetching -> closed                        (alternatives failed, matching token)
//! choices  -> closed                        (select: plan store patched)
//! fetching | choices -> closed              (cancel)
//! ```
//!
//! Responses whose token is not the one being waited for are stale and
//! leave the state untouched.

use thiserror::Error;

use crate::collaborator::AlternativesRequest;
use crate::plan::{Meal, MealSlot, WeeklyPlan};
use crate::profile::{ProfileError, UserProfile};

use super::state::{AppState, Notice, RequestToken, Stage, SwapState, SwapTarget};

/// Inputs to the state machine: user intents and planner responses.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Submit(UserProfile),
    PlanGenerated {
        token: RequestToken,
        plan: WeeklyPlan,
    },
    GenerationFailed {
        token: RequestToken,
        detail: String,
    },
    Reset,
    OpenSwap {
        day_index: usize,
        slot: MealSlot,
    },
    AlternativesLoaded {
        token: RequestToken,
        candidates: Vec<Meal>,
    },
    AlternativesFailed {
        token: RequestToken,
        detail: String,
    },
    SelectAlternative {
        index: usize,
    },
    CancelSwap,
    DismissNotice,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submit(_) => "submit",
            Self::PlanGenerated { .. } => "plan_generated",
            Self::GenerationFailed { .. } => "generation_failed",
            Self::Reset => "reset",
            Self::OpenSwap { .. } => "open_swap",
            Self::AlternativesLoaded { .. } => "alternatives_loaded",
            Self::AlternativesFailed { .. } => "alternatives_failed",
            Self::SelectAlternative { .. } => "select_alternative",
            Self::CancelSwap => "cancel_swap",
            Self::DismissNotice => "dismiss_notice",
        }
    }
}

/// A planner call the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPlan {
        token: RequestToken,
        profile: UserProfile,
    },
    FetchAlternatives {
        token: RequestToken,
        request: AlternativesRequest,
    },
}

/// The state after an event, plus the planner call it requires, if any.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: AppState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn to(state: AppState) -> Self {
        Self {
            state,
            effect: None,
        }
    }

    fn with_effect(state: AppState, effect: Effect) -> Self {
        Self {
            state,
            effect: Some(effect),
        }
    }
}

/// Events that are not valid in the current state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("cannot {event} while in the {stage} stage")]
    WrongStage {
        event: &'static str,
        stage: &'static str,
    },

    #[error("no alternatives to choose from (swap is {swap})")]
    NoChoices { swap: &'static str },

    #[error("day index {day_index} out of range (plan has {days} days)")]
    DayOutOfRange { day_index: usize, days: usize },

    #[error("alternative {index} out of range ({count} available)")]
    CandidateOutOfRange { index: usize, count: usize },

    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

/// Apply `event` to `state`.
///
/// The input state is never modified; on error the caller keeps it as is.
pub fn transition(state: &AppState, event: Event) -> Result<Transition, TransitionError> {
    let mut next = state.clone();
    let event_name = event.name();

    match event {
        Event::Submit(profile) => {
            if !matches!(state.stage, Stage::Input) {
                return Err(wrong_stage(event_name, state));
            }
            profile.validate()?;

            let token = next.next_token();
            next.stage = Stage::Submitting {
                token,
                profile: profile.clone(),
            };
            next.store.clear();
            next.swap = SwapState::Closed;
            next.notice = None;
            tracing::info!(token = %token, agent = %profile.model, "plan generation submitted");
            Ok(Transition::with_effect(
                next,
                Effect::FetchPlan { token, profile },
            ))
        }

        Event::PlanGenerated { token, plan } => match &state.stage {
            Stage::Submitting {
                token: waiting,
                profile,
            } if *waiting == token => {
                tracing::info!(token = %token, days = plan.daily_plans.len(), "plan generated");
                next.stage = Stage::Result {
                    profile: profile.clone(),
                };
                next.store.set(plan);
                Ok(Transition::to(next))
            }
            _ => Ok(stale(state, event_name, token)),
        },

        Event::GenerationFailed { token, detail } => match &state.stage {
            Stage::Submitting { token: waiting, .. } if *waiting == token => {
                tracing::warn!(token = %token, error = %detail, "plan generation failed");
                next.stage = Stage::Input;
                next.store.clear();
                next.notice = Some(Notice::generation_failed(detail));
                Ok(Transition::to(next))
            }
            _ => Ok(stale(state, event_name, token)),
        },

        Event::Reset => {
            next.stage = Stage::Input;
            next.store.clear();
            next.swap = SwapState::Closed;
            next.notice = None;
            Ok(Transition::to(next))
        }

        Event::OpenSwap { day_index, slot } => {
            let Stage::Result { profile } = &state.stage else {
                return Err(wrong_stage(event_name, state));
            };
            let plan = state
                .store
                .current()
                .ok_or_else(|| wrong_stage(event_name, state))?;
            let day = plan
                .day(day_index)
                .ok_or(TransitionError::DayOutOfRange {
                    day_index,
                    days: plan.daily_plans.len(),
                })?;

            let meal = day.meals.get(slot).clone();
            let request = AlternativesRequest::for_meal(profile, slot, &meal);
            let token = next.next_token();

            if let Some(previous) = state.swap.target() {
                tracing::debug!(
                    day = previous.day_index,
                    slot = %previous.slot,
                    "superseding open swap"
                );
            }
            tracing::info!(token = %token, day = day_index, slot = %slot, "fetching alternatives");

            next.swap = SwapState::Fetching {
                token,
                target: SwapTarget {
                    day_index,
                    slot,
                    meal,
                },
            };
            Ok(Transition::with_effect(
                next,
                Effect::FetchAlternatives { token, request },
            ))
        }

        Event::AlternativesLoaded { token, candidates } => match &state.swap {
            SwapState::Fetching {
                token: waiting,
                target,
            } if *waiting == token => {
                tracing::info!(token = %token, count = candidates.len(), "alternatives loaded");
                next.swap = SwapState::Choices {
                    token,
                    target: target.clone(),
                    candidates,
                };
                Ok(Transition::to(next))
            }
            _ => Ok(stale(state, event_name, token)),
        },

        Event::AlternativesFailed { token, detail } => match &state.swap {
            SwapState::Fetching { token: waiting, .. } if *waiting == token => {
                tracing::warn!(token = %token, error = %detail, "alternatives fetch failed");
                next.swap = SwapState::Closed;
                next.notice = Some(Notice::swap_failed(detail));
                Ok(Transition::to(next))
            }
            _ => Ok(stale(state, event_name, token)),
        },

        Event::SelectAlternative { index } => {
            let SwapState::Choices {
                target, candidates, ..
            } = &state.swap
            else {
                return Err(TransitionError::NoChoices {
                    swap: state.swap.name(),
                });
            };
            let candidate = candidates
                .get(index)
                .cloned()
                .ok_or(TransitionError::CandidateOutOfRange {
                    index,
                    count: candidates.len(),
                })?;

            let old_name = target.meal.name.clone();
            let new_name = candidate.name.clone();
            if next
                .store
                .replace_meal(target.day_index, target.slot, candidate)
                .is_none()
            {
                return Err(wrong_stage(event_name, state));
            }
            next.swap = SwapState::Closed;
            tracing::info!(
                day = target.day_index,
                slot = %target.slot,
                from = %old_name,
                to = %new_name,
                "meal swapped"
            );
            Ok(Transition::to(next))
        }

        Event::CancelSwap => {
            next.swap = SwapState::Closed;
            Ok(Transition::to(next))
        }

        Event::DismissNotice => {
            next.notice = None;
            Ok(Transition::to(next))
        }
    }
}

fn wrong_stage(event: &'static str, state: &AppState) -> TransitionError {
    TransitionError::WrongStage {
        event,
        stage: state.stage.name(),
    }
}

fn stale(state: &AppState, event: &'static str, token: RequestToken) -> Transition {
    tracing::debug!(token = %token, event, "ignoring stale response");
    Transition::to(state.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{DailyPlan, DayMeals, Macronutrients};
    use std::sync::Arc;

    fn plan() -> WeeklyPlan {
        let meal = |name: &str, calories| Meal {
            name: name.to_string(),
            calories,
            macronutrients: Some(Macronutrients::new(10, 10, 10)),
            ..Meal::default()
        };
        WeeklyPlan {
            daily_plans: (1..=7)
                .map(|d| {
                    Arc::new(DailyPlan {
                        day: d,
                        total_calories: 1500,
                        total_macronutrients: Some(Macronutrients::new(30, 30, 30)),
                        meals: DayMeals {
                            breakfast: meal("粥", 400),
                            lunch: meal("面", 600),
                            dinner: meal("饭", 500),
                            snack: None,
                        },
                        nutrition_tips: String::new(),
                    })
                })
                .collect(),
            ..WeeklyPlan::default()
        }
    }

    fn apply(state: &AppState, event: Event) -> Transition {
        transition(state, event).unwrap()
    }

    fn result_state() -> AppState {
        let t = apply(&AppState::new(), Event::Submit(UserProfile::default()));
        let Some(Effect::FetchPlan { token, .. }) = t.effect else {
            panic!("expected a plan fetch");
        };
        apply(&t.state, Event::PlanGenerated { token, plan: plan() }).state
    }

    #[test]
    fn submit_rejects_invalid_profile() {
        let profile = UserProfile {
            age: 0,
            ..UserProfile::default()
        };
        let err = transition(&AppState::new(), Event::Submit(profile)).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidProfile(_)));
    }

    #[test]
    fn submit_twice_is_rejected() {
        let t = apply(&AppState::new(), Event::Submit(UserProfile::default()));
        let err = transition(&t.state, Event::Submit(UserProfile::default())).unwrap_err();
        assert_eq!(
            err,
            TransitionError::WrongStage {
                event: "submit",
                stage: "submitting"
            }
        );
    }

    #[test]
    fn tokens_increase() {
        let state = result_state();
        let first = apply(&state, Event::OpenSwap { day_index: 0, slot: MealSlot::Lunch });
        let second = apply(&first.state, Event::OpenSwap { day_index: 1, slot: MealSlot::Dinner });
        let token = |t: &Transition| match &t.effect {
            Some(Effect::FetchAlternatives { token, .. }) => *token,
            other => panic!("unexpected effect {other:?}"),
        };
        assert!(token(&second) > token(&first));
    }

    #[test]
    fn open_swap_outside_result_is_rejected() {
        let err = transition(
            &AppState::new(),
            Event::OpenSwap { day_index: 0, slot: MealSlot::Lunch },
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::WrongStage { stage: "input", .. }));
    }

    #[test]
    fn open_swap_checks_day_range() {
        let err = transition(
            &result_state(),
            Event::OpenSwap { day_index: 7, slot: MealSlot::Lunch },
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::DayOutOfRange { day_index: 7, days: 7 });
    }

    #[test]
    fn open_swap_requests_current_meal() {
        let t = apply(&result_state(), Event::OpenSwap { day_index: 2, slot: MealSlot::Breakfast });
        let Some(Effect::FetchAlternatives { request, .. }) = t.effect else {
            panic!("expected alternatives fetch");
        };
        assert_eq!(request.target_calories, 400);
        assert_eq!(request.current_meal_name, "粥");
        assert_eq!(t.state.swap.name(), "fetching");
        assert!(t.state.swap.candidates().is_empty());
    }

    #[test]
    fn select_outside_choices_is_rejected() {
        let err = transition(&result_state(), Event::SelectAlternative { index: 0 }).unwrap_err();
        assert_eq!(err, TransitionError::NoChoices { swap: "closed" });
    }

    #[test]
    fn select_checks_candidate_range() {
        let t = apply(&result_state(), Event::OpenSwap { day_index: 0, slot: MealSlot::Lunch });
        let Some(Effect::FetchAlternatives { token, .. }) = t.effect else {
            panic!("expected alternatives fetch");
        };
        let loaded = apply(
            &t.state,
            Event::AlternativesLoaded { token, candidates: vec![Meal::default()] },
        );
        let err = transition(&loaded.state, Event::SelectAlternative { index: 1 }).unwrap_err();
        assert_eq!(err, TransitionError::CandidateOutOfRange { index: 1, count: 1 });
    }

    #[test]
    fn reset_closes_swap_and_clears_plan() {
        let t = apply(&result_state(), Event::OpenSwap { day_index: 0, slot: MealSlot::Lunch });
        let reset = apply(&t.state, Event::Reset);
        assert_eq!(reset.state.stage, Stage::Input);
        assert!(!reset.state.swap.is_open());
        assert!(reset.state.store.is_empty());
        assert!(reset.state.profile().is_none());
    }

    #[test]
    fn reset_is_idempotent_from_input() {
        let reset = apply(&AppState::new(), Event::Reset);
        assert_eq!(reset.state.stage, Stage::Input);
        assert!(reset.effect.is_none());
    }

    #[test]
    fn generation_result_after_reset_is_ignored() {
        let submitted = apply(&AppState::new(), Event::Submit(UserProfile::default()));
        let Some(Effect::FetchPlan { token, .. }) = submitted.effect else {
            panic!("expected a plan fetch");
        };
        let reset = apply(&submitted.state, Event::Reset);
        let late = apply(&reset.state, Event::PlanGenerated { token, plan: plan() });
        assert_eq!(late.state.stage, Stage::Input);
        assert!(late.state.store.is_empty());
    }

    #[test]
    fn dismiss_clears_notice() {
        let submitted = apply(&AppState::new(), Event::Submit(UserProfile::default()));
        let Some(Effect::FetchPlan { token, .. }) = submitted.effect else {
            panic!("expected a plan fetch");
        };
        let failed = apply(
            &submitted.state,
            Event::GenerationFailed { token, detail: "boom".to_string() },
        );
        assert_eq!(
            failed.state.notice.as_ref().unwrap().message,
            Notice::GENERATION_FAILED
        );
        let dismissed = apply(&failed.state, Event::DismissNotice);
        assert!(dismissed.state.notice.is_none());
    }
}
