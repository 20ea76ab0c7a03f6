//! Application state held by the controller.

use std::fmt;

use crate::plan::{Meal, MealSlot, PlanStore, WeeklyPlan};
use crate::profile::UserProfile;

/// Identifies one outstanding planner request.
///
/// Tokens increase monotonically per [`AppState`]; a response is applied
/// only while its token is the one the state is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Top-level view: the profile form, the loading screen, or the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Stage {
    #[default]
    Input,
    Submitting {
        token: RequestToken,
        profile: UserProfile,
    },
    /// The plan itself lives in [`AppState::store`].
    Result { profile: UserProfile },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Submitting { .. } => "submitting",
            Self::Result { .. } => "result",
        }
    }
}

/// The meal a swap is aimed at.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapTarget {
    pub day_index: usize,
    pub slot: MealSlot,
    /// The meal occupying the slot when the swap was opened.
    pub meal: Meal,
}

/// Per-meal swap dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SwapState {
    #[default]
    Closed,
    Fetching {
        token: RequestToken,
        target: SwapTarget,
    },
    Choices {
        token: RequestToken,
        target: SwapTarget,
        candidates: Vec<Meal>,
    },
}

impl SwapState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Fetching { .. } => "fetching",
            Self::Choices { .. } => "choices",
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn target(&self) -> Option<&SwapTarget> {
        match self {
            Self::Closed => None,
            Self::Fetching { target, .. } | Self::Choices { target, .. } => Some(target),
        }
    }

    pub fn candidates(&self) -> &[Meal] {
        match self {
            Self::Choices { candidates, .. } => candidates,
            _ => &[],
        }
    }
}

/// Which flow raised a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Generation,
    Swap,
}

/// A dismissable failure message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// The underlying error, for logs and verbose output.
    pub detail: Option<String>,
}

impl Notice {
    pub const GENERATION_FAILED: &'static str = "生成失败，请检查API Key或稍后重试。";
    pub const SWAP_FAILED: &'static str = "获取备选菜谱失败，请重试";

    pub fn generation_failed(detail: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Generation,
            message: Self::GENERATION_FAILED.to_string(),
            detail: Some(detail.into()),
        }
    }

    pub fn swap_failed(detail: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Swap,
            message: Self::SWAP_FAILED.to_string(),
            detail: Some(detail.into()),
        }
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub stage: Stage,
    pub store: PlanStore,
    pub swap: SwapState,
    pub notice: Option<Notice>,
    pub(crate) last_token: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active profile, while submitting or showing a result.
    pub fn profile(&self) -> Option<&UserProfile> {
        match &self.stage {
            Stage::Input => None,
            Stage::Submitting { profile, .. } | Stage::Result { profile } => Some(profile),
        }
    }

    /// The displayed plan. Only present in the result stage.
    pub fn plan(&self) -> Option<&WeeklyPlan> {
        match self.stage {
            Stage::Result { .. } => self.store.current(),
            _ => None,
        }
    }

    pub(crate) fn next_token(&mut self) -> RequestToken {
        self.last_token += 1;
        RequestToken(self.last_token)
    }
}
