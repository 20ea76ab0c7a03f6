//! Serde types for the weekly plan document.
//!
//! Field names follow the camelCase JSON the planner returns. Optional
//! fields carry a serde default so a sparse document still parses, but a
//! plan without `dailyPlans` or a day without `meals` is rejected. Numbers
//! are trusted as given and sums saturate instead of overflowing.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::shopping::ShoppingList;

/// Protein, fat and carbohydrate grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macronutrients {
    #[serde(default)]
    pub protein: u32,
    #[serde(default)]
    pub fat: u32,
    #[serde(default)]
    pub carbs: u32,
}

impl Macronutrients {
    pub const ZERO: Self = Self {
        protein: 0,
        fat: 0,
        carbs: 0,
    };

    pub fn new(protein: u32, fat: u32, carbs: u32) -> Self {
        Self {
            protein,
            fat,
            carbs,
        }
    }
}

impl Add for Macronutrients {
    type Output = Self;

    /// Component-wise and saturating; planner numbers are not range checked.
    fn add(self, rhs: Self) -> Self {
        Self {
            protein: self.protein.saturating_add(rhs.protein),
            fat: self.fat.saturating_add(rhs.fat),
            carbs: self.carbs.saturating_add(rhs.carbs),
        }
    }
}

impl Sum for Macronutrients {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// One line of a meal's ingredient list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub name: String,
    /// Free-text quantity, e.g. "50g" or "1个(约50g)".
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
}

/// A single dish. Swaps replace a meal wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub calories: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macronutrients: Option<Macronutrients>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub recipe_steps: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// The meals of one day. Only the three main slots count towards totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMeals {
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snack: Option<Meal>,
}

impl DayMeals {
    pub fn get(&self, slot: MealSlot) -> &Meal {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn get_mut(&mut self, slot: MealSlot) -> &mut Meal {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    /// Breakfast, lunch and dinner in order. The snack is never included.
    pub fn main_meals(&self) -> [&Meal; 3] {
        [&self.breakfast, &self.lunch, &self.dinner]
    }
}

/// One day of the weekly plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    /// 1..=7, Monday first.
    #[serde(default)]
    pub day: u8,
    #[serde(default)]
    pub total_calories: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_macronutrients: Option<Macronutrients>,
    pub meals: DayMeals,
    #[serde(default)]
    pub nutrition_tips: String,
}

impl DailyPlan {
    /// Sum of breakfast, lunch and dinner calories, saturating at `u32::MAX`.
    pub fn main_meal_calories(&self) -> u32 {
        self.meals
            .main_meals()
            .iter()
            .fold(0u32, |acc, m| acc.saturating_add(m.calories))
    }

    /// Component-wise macro sum of the three main meals; a meal without
    /// macro data contributes zero.
    pub fn main_meal_macronutrients(&self) -> Macronutrients {
        self.meals
            .main_meals()
            .iter()
            .map(|m| m.macronutrients.unwrap_or_default())
            .sum()
    }
}

/// The complete 7-day plan.
///
/// Days are shared behind [`Arc`] so that a swap copies only the day it
/// touches while older plan values stay valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    #[serde(default)]
    pub weekly_overview: String,
    pub daily_plans: Vec<Arc<DailyPlan>>,
    #[serde(default)]
    pub shopping_list: ShoppingList,
}

impl WeeklyPlan {
    pub fn day(&self, day_index: usize) -> Option<&DailyPlan> {
        self.daily_plans.get(day_index).map(Arc::as_ref)
    }

    pub fn days(&self) -> impl Iterator<Item = &DailyPlan> {
        self.daily_plans.iter().map(Arc::as_ref)
    }
}

// ---------------------------------------------------------------------------
// Meal slots
// ---------------------------------------------------------------------------

/// A swappable meal slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [Self; 3] = [Self::Breakfast, Self::Lunch, Self::Dinner];

    /// Capitalised form used when asking the planner for alternatives.
    pub fn capitalized(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        }
    }

    /// Short label shown on meal cards.
    pub fn badge(self) -> &'static str {
        match self {
            Self::Breakfast => "早",
            Self::Lunch => "午",
            Self::Dinner => "晚",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        };
        f.write_str(s)
    }
}

impl FromStr for MealSlot {
    type Err = MealSlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            _ => Err(MealSlotParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`MealSlot`] string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealSlotParseError(pub String);

impl fmt::Display for MealSlotParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid meal slot: {:?} (expected breakfast, lunch, or dinner)",
            self.0
        )
    }
}

impl std::error::Error for MealSlotParseError {}
