//! The weekly plan: data model, the plan store, response parsing, and
//! derived nutrition statistics.

pub mod parser;
pub mod shopping;
pub mod stats;
pub mod store;
pub mod types;

pub use parser::{PlanParseError, parse_alternatives, parse_weekly_plan};
pub use shopping::ShoppingList;
pub use stats::{MacroShare, WeeklyStats};
pub use store::{PlanStore, replace_meal};
pub use types::{
    DailyPlan, DayMeals, Ingredient, Macronutrients, Meal, MealSlot, MealSlotParseError,
    WeeklyPlan,
};
