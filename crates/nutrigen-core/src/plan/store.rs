//! The plan store and its single mutation: replace one meal and recompute
//! the day's totals.

use std::sync::Arc;

use super::types::{DailyPlan, Meal, MealSlot, WeeklyPlan};

/// Return a copy of `plan` with `slot` on day `day_index` replaced by
/// `new_meal`, and that day's totals recomputed.
///
/// - `total_calories` becomes breakfast + lunch + dinner (never the snack).
/// - `total_macronutrients` is recomputed only when `new_meal` carries macro
///   data, as the component-wise sum of the three main meals with missing
///   values counted as zero. Otherwise the previous totals are kept as-is.
///
/// Only the touched day is copied; the other days are shared with `plan`,
/// which is left unchanged.
///
/// # Panics
///
/// Panics if `day_index` does not index a day of `plan`. Callers obtain the
/// index from the plan they display, so a miss is a programming error.
pub fn replace_meal(
    plan: &WeeklyPlan,
    day_index: usize,
    slot: MealSlot,
    new_meal: Meal,
) -> WeeklyPlan {
    let day_count = plan.daily_plans.len();
    let current = plan.daily_plans.get(day_index).unwrap_or_else(|| {
        panic!("day index {day_index} out of range for a plan of {day_count} days")
    });

    let recompute_macros = new_meal.macronutrients.is_some();

    let mut day: DailyPlan = DailyPlan::clone(current);
    *day.meals.get_mut(slot) = new_meal;
    day.total_calories = day.main_meal_calories();
    if recompute_macros {
        day.total_macronutrients = Some(day.main_meal_macronutrients());
    }

    let mut next = plan.clone();
    next.daily_plans[day_index] = Arc::new(day);
    next
}

/// Holds the currently displayed plan.
///
/// There is one wholesale write ([`PlanStore::set`]) and one patch
/// ([`PlanStore::replace_meal`]); both replace the held value atomically.
#[derive(Debug, Default, Clone)]
pub struct PlanStore {
    current: Option<WeeklyPlan>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, plan: WeeklyPlan) {
        self.current = Some(plan);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&WeeklyPlan> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Apply [`replace_meal`] to the held plan and return the new value.
    ///
    /// Returns `None` when the store is empty.
    pub fn replace_meal(
        &mut self,
        day_index: usize,
        slot: MealSlot,
        new_meal: Meal,
    ) -> Option<&WeeklyPlan> {
        let current = self.current.as_ref()?;
        let next = replace_meal(current, day_index, slot, new_meal);
        self.current = Some(next);
        self.current.as_ref()
    }
}
