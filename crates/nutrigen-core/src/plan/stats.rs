//! Weekly nutrition summary derived from the day totals.

use super::types::{DailyPlan, Macronutrients, WeeklyPlan};

/// Percentage split of macronutrient grams. All zero when there is no data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroShare {
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl MacroShare {
    pub fn of(macros: &Macronutrients) -> Self {
        let total = f64::from(macros.protein) + f64::from(macros.fat) + f64::from(macros.carbs);
        if total == 0.0 {
            return Self::default();
        }
        let pct = |g: u32| f64::from(g) * 100.0 / total;
        Self {
            protein: pct(macros.protein),
            fat: pct(macros.fat),
            carbs: pct(macros.carbs),
        }
    }
}

/// Calorie trend and average macro distribution over the week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyStats {
    /// `(day number, total calories)` in plan order.
    pub calories_by_day: Vec<(u8, u32)>,
    pub max_calories: u32,
    pub average_calories: u32,
    /// Rounded per-day average; days without totals count as zero.
    pub average_macronutrients: Macronutrients,
    pub average_share: MacroShare,
}

impl WeeklyStats {
    pub fn from_plan(plan: &WeeklyPlan) -> Self {
        let days: Vec<&DailyPlan> = plan.days().collect();
        let calories_by_day: Vec<(u8, u32)> =
            days.iter().map(|d| (d.day, d.total_calories)).collect();
        let max_calories = calories_by_day.iter().map(|(_, c)| *c).max().unwrap_or(0);

        // Totals are accumulated in u64 so a week of large trusted values
        // cannot overflow; the average of u32 values always fits in u32.
        let count = days.len().max(1) as f64;
        let avg = |total: u64| (total as f64 / count).round() as u32;
        let sum_by = |f: fn(&Macronutrients) -> u32| -> u64 {
            days.iter()
                .map(|d| u64::from(f(&d.total_macronutrients.unwrap_or_default())))
                .sum()
        };

        let calorie_total: u64 = calories_by_day.iter().map(|(_, c)| u64::from(*c)).sum();
        let average_macronutrients = Macronutrients::new(
            avg(sum_by(|m| m.protein)),
            avg(sum_by(|m| m.fat)),
            avg(sum_by(|m| m.carbs)),
        );

        Self {
            calories_by_day,
            max_calories,
            average_calories: avg(calorie_total),
            average_macronutrients,
            average_share: MacroShare::of(&average_macronutrients),
        }
    }

    /// Bar height for a day relative to the highest-calorie day, 0..=100.
    pub fn relative_height(&self, calories: u32) -> f64 {
        if self.max_calories == 0 {
            0.0
        } else {
            f64::from(calories) * 100.0 / f64::from(self.max_calories)
        }
    }
}
