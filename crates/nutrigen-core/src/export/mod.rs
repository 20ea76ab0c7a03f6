//! Printable renderings of a finished plan.
//!
//! [`write_markdown`] produces the full document (the printable page); the
//! [`card`] helpers produce the compact terminal views.

pub mod card;

use std::io::{self, Write};

use crate::plan::{Meal, MealSlot, WeeklyPlan, WeeklyStats};
use crate::profile::UserProfile;

pub use card::{ingredient_summary, weekday_label, write_day_summary, write_meal_card};

/// Document title for a profile's goal.
pub fn title(profile: &UserProfile) -> String {
    format!("7天健康{}家常菜食谱", profile.goal.label())
}

/// Render `plan` for `profile` as a Markdown document.
pub fn write_markdown<W: Write>(
    w: &mut W,
    profile: &UserProfile,
    plan: &WeeklyPlan,
) -> io::Result<()> {
    writeln!(w, "# {}", title(profile))?;
    writeln!(w)?;
    writeln!(
        w,
        "`{}` `{} · {}岁` `BMI: {:.1}` `AI: {}`",
        profile.goal.label(),
        profile.gender.label(),
        profile.age,
        profile.bmi(),
        profile.model
    )?;
    if !plan.weekly_overview.is_empty() {
        writeln!(w)?;
        writeln!(w, "> {}", plan.weekly_overview)?;
    }

    write_stats(w, &WeeklyStats::from_plan(plan))?;

    for day in plan.days() {
        writeln!(w)?;
        writeln!(w, "## {} (Day {})", weekday_label(day.day), day.day)?;
        writeln!(w)?;
        write!(w, "**{} kcal**", day.total_calories)?;
        if let Some(m) = &day.total_macronutrients {
            write!(
                w,
                " · 蛋白质 {}g · 碳水 {}g · 脂肪 {}g",
                m.protein, m.carbs, m.fat
            )?;
        }
        writeln!(w)?;

        for slot in MealSlot::ALL {
            write_meal(w, slot.badge(), day.meals.get(slot))?;
        }
        if let Some(snack) = &day.meals.snack {
            write_meal(w, "加餐", snack)?;
        }

        if !day.nutrition_tips.is_empty() {
            writeln!(w)?;
            writeln!(w, "> 营养贴士: {}", day.nutrition_tips)?;
        }
    }

    if !plan.shopping_list.is_empty() {
        writeln!(w)?;
        writeln!(w, "## 本周采购清单")?;
        for (category, items) in plan.shopping_list.iter() {
            writeln!(w)?;
            writeln!(w, "### {category}")?;
            writeln!(w)?;
            for item in items {
                writeln!(w, "- [ ] {item}")?;
            }
        }
    }
    Ok(())
}

fn write_stats<W: Write>(w: &mut W, stats: &WeeklyStats) -> io::Result<()> {
    if stats.calories_by_day.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "## 本周营养概览")?;
    writeln!(w)?;
    writeln!(w, "| Day | kcal | |")?;
    writeln!(w, "|---|---|---|")?;
    for (day, calories) in &stats.calories_by_day {
        // Ten blocks for the highest-calorie day.
        let blocks = (stats.relative_height(*calories) / 10.0).round() as usize;
        writeln!(w, "| {day} | {calories} | {} |", "█".repeat(blocks))?;
    }
    writeln!(w)?;
    let avg = &stats.average_macronutrients;
    let share = &stats.average_share;
    writeln!(
        w,
        "日均 {} kcal · 蛋白质 {}g ({:.0}%) · 碳水 {}g ({:.0}%) · 脂肪 {}g ({:.0}%)",
        stats.average_calories,
        avg.protein,
        share.protein,
        avg.carbs,
        share.carbs,
        avg.fat,
        share.fat
    )
}

fn write_meal<W: Write>(w: &mut W, label: &str, meal: &Meal) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "### [{label}] {} ({} kcal)", meal.name, meal.calories)?;
    if !meal.description.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", meal.description)?;
    }
    if let Some(m) = &meal.macronutrients {
        writeln!(w)?;
        writeln!(w, "{}", card::macro_line(m))?;
    }
    if !meal.ingredients.is_empty() {
        writeln!(w)?;
        writeln!(w, "**食材**")?;
        writeln!(w)?;
        for ingredient in &meal.ingredients {
            writeln!(w, "- {} {}", ingredient.name, ingredient.amount)?;
        }
    }
    if !meal.recipe_steps.is_empty() {
        writeln!(w)?;
        writeln!(w, "**做法**")?;
        writeln!(w)?;
        for (i, step) in meal.recipe_steps.iter().enumerate() {
            writeln!(w, "{}. {step}", i + 1)?;
        }
    }
    Ok(())
}
