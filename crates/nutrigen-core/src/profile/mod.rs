//! The user profile submitted to drive plan generation.
//!
//! A [`UserProfile`] is built once from form input, validated, and then
//! treated as immutable for the lifetime of the plan it produced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Agent used when the profile does not name one.
pub const DEFAULT_AGENT: &str = "gemini-2.5-flash";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Biological sex, used for energy estimation by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Label used when describing the user to the planner.
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "男",
            Self::Female => "女",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Male => "male",
            Self::Female => "female",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(ProfileParseError::new("gender", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Weekly activity level, four steps from desk job to daily training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
}

impl ActivityLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Sedentary => "久坐不动 (办公室工作)",
            Self::LightlyActive => "轻度活动 (每周运动1-3次)",
            Self::ModeratelyActive => "中度活动 (每周运动3-5次)",
            Self::VeryActive => "高度活动 (每周运动6-7次)",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sedentary => "sedentary",
            Self::LightlyActive => "lightly_active",
            Self::ModeratelyActive => "moderately_active",
            Self::VeryActive => "very_active",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityLevel {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(Self::Sedentary),
            "lightly_active" => Ok(Self::LightlyActive),
            "moderately_active" => Ok(Self::ModeratelyActive),
            "very_active" => Ok(Self::VeryActive),
            other => Err(ProfileParseError::new("activity level", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// What the plan should optimise for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    Maintain,
    GainMuscle,
}

impl Goal {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoseWeight => "减脂",
            Self::Maintain => "维持",
            Self::GainMuscle => "增肌",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LoseWeight => "lose_weight",
            Self::Maintain => "maintain",
            Self::GainMuscle => "gain_muscle",
        };
        f.write_str(s)
    }
}

impl FromStr for Goal {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lose_weight" => Ok(Self::LoseWeight),
            "maintain" => Ok(Self::Maintain),
            "gain_muscle" => Ok(Self::GainMuscle),
            other => Err(ProfileParseError::new("goal", other)),
        }
    }
}

/// Error returned when parsing an invalid profile enum string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileParseError {
    pub field: &'static str,
    pub value: String,
}

impl ProfileParseError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for ProfileParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.field, self.value)
    }
}

impl std::error::Error for ProfileParseError {}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Errors from [`UserProfile::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("age must be a positive number of years")]
    InvalidAge,

    #[error("height must be a positive number of centimetres, got {0}")]
    InvalidHeight(f64),

    #[error("weight must be a positive number of kilograms, got {0}")]
    InvalidWeight(f64),
}

/// Body metrics and preferences describing the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub gender: Gender,
    /// Age in whole years.
    pub age: u32,
    /// Height in cm.
    pub height: f64,
    /// Weight in kg.
    pub weight: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    /// Comma-separated ingredients to avoid.
    #[serde(default)]
    pub dislikes: String,
    /// Free-text style preference, e.g. "low carb".
    #[serde(default)]
    pub diet_style: String,
    /// Identifier of the selected AI agent.
    #[serde(default)]
    pub model: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            gender: Gender::Female,
            age: 28,
            height: 162.0,
            weight: 55.0,
            activity_level: ActivityLevel::Sedentary,
            goal: Goal::LoseWeight,
            dislikes: String::new(),
            diet_style: String::new(),
            model: DEFAULT_AGENT.to_string(),
        }
    }
}

impl UserProfile {
    /// Check the numeric body metrics. Free-text fields are not inspected.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.age == 0 {
            return Err(ProfileError::InvalidAge);
        }
        if !(self.height > 0.0) {
            return Err(ProfileError::InvalidHeight(self.height));
        }
        if !(self.weight > 0.0) {
            return Err(ProfileError::InvalidWeight(self.weight));
        }
        Ok(())
    }

    /// Body-mass index, kg / m².
    pub fn bmi(&self) -> f64 {
        let metres = self.height / 100.0;
        self.weight / (metres * metres)
    }

    /// The dislike list split on commas (ASCII or full-width), trimmed.
    pub fn disliked_items(&self) -> Vec<&str> {
        self.dislikes
            .split([',', '，'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}
