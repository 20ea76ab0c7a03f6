//! Compact plain-text views for the terminal.

use std::io::{self, Write};

use crate::plan::{DailyPlan, Macronutrients, Meal, MealSlot};

/// Ingredients listed on a card before the rest are elided.
pub const CARD_INGREDIENTS: usize = 4;

/// Chinese weekday name for a 1-based plan day, or `Day N` outside 1..=7.
pub fn weekday_label(day: u8) -> String {
    const NAMES: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];
    match day {
        1..=7 => format!("周{}", NAMES[usize::from(day - 1)]),
        _ => format!("Day {day}"),
    }
}

/// `蛋 25g · 碳 60g · 脂 15g`
pub fn macro_line(macros: &Macronutrients) -> String {
    format!(
        "蛋 {}g · 碳 {}g · 脂 {}g",
        macros.protein, macros.carbs, macros.fat
    )
}

/// The first [`CARD_INGREDIENTS`] ingredients joined, with `+N more` when
/// the meal has more.
pub fn ingredient_summary(meal: &Meal) -> String {
    let mut line = meal
        .ingredients
        .iter()
        .take(CARD_INGREDIENTS)
        .map(|i| format!("{} {}", i.name, i.amount).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("、");
    let hidden = meal.ingredients.len().saturating_sub(CARD_INGREDIENTS);
    if hidden > 0 {
        line.push_str(&format!(" +{hidden} more"));
    }
    line
}

/// Write a meal card. `label` prefixes the first line, e.g. the slot badge
/// or a candidate number.
pub fn write_meal_card<W: Write>(w: &mut W, label: &str, meal: &Meal) -> io::Result<()> {
    write!(w, "[{label}] {}  {} kcal", meal.name, meal.calories)?;
    if let Some(macros) = &meal.macronutrients {
        write!(w, "  {}", macro_line(macros))?;
    }
    writeln!(w)?;
    if !meal.description.is_empty() {
        writeln!(w, "     {}", meal.description)?;
    }
    if !meal.ingredients.is_empty() {
        writeln!(w, "     食材: {}", ingredient_summary(meal))?;
    }
    Ok(())
}

/// Write the header line and the three meal cards of one day.
pub fn write_day_summary<W: Write>(w: &mut W, day: &DailyPlan) -> io::Result<()> {
    write!(
        w,
        "{} (Day {})  {} kcal",
        weekday_label(day.day),
        day.day,
        day.total_calories
    )?;
    if let Some(macros) = &day.total_macronutrients {
        write!(w, "  {}", macro_line(macros))?;
    }
    writeln!(w)?;
    for slot in MealSlot::ALL {
        write_meal_card(w, slot.badge(), day.meals.get(slot))?;
    }
    Ok(())
}
