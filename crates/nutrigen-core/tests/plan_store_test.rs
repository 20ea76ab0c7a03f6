//! Integration tests for the plan store's replace-and-recompute operation.
//!
//! Day 1 of the shared fixture has breakfast 400, lunch 600, dinner 500
//! (total 1500 kcal, macros 80/50/170).

use std::sync::Arc;

use nutrigen_core::plan::{Macronutrients, MealSlot, PlanStore, WeeklyPlan, replace_meal};
use nutrigen_test_utils::{meal, sample_plan};

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[test]
fn replacing_with_meal_without_macros_keeps_previous_macro_totals() {
    let plan = sample_plan();
    let before = plan.day(0).unwrap().total_macronutrients;

    let next = replace_meal(&plan, 0, MealSlot::Lunch, meal("牛肉面", 750, None));

    let day = next.day(0).unwrap();
    assert_eq!(day.total_calories, 1650);
    assert_eq!(day.total_macronutrients, before);
    assert_eq!(day.total_macronutrients, Some(Macronutrients::new(80, 50, 170)));
}

#[test]
fn replacing_with_meal_with_macros_recomputes_both_totals() {
    let plan = sample_plan();

    let next = replace_meal(
        &plan,
        0,
        MealSlot::Breakfast,
        meal("全麦三明治", 350, Some((20, 10, 40))),
    );

    let day = next.day(0).unwrap();
    assert_eq!(day.total_calories, 350 + 600 + 500);
    assert_eq!(
        day.total_macronutrients,
        Some(Macronutrients::new(75, 45, 150))
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn calories_equal_sum_of_three_main_meals_after_any_swap() {
    let mut plan = sample_plan();
    let swaps = [
        (0, MealSlot::Breakfast, 320),
        (3, MealSlot::Dinner, 810),
        (6, MealSlot::Lunch, 0),
        (0, MealSlot::Dinner, 455),
    ];
    for (day_index, slot, calories) in swaps {
        plan = replace_meal(&plan, day_index, slot, meal("换", calories, None));
        let day = plan.day(day_index).unwrap();
        let expected: u32 = day.meals.main_meals().iter().map(|m| m.calories).sum();
        assert_eq!(day.total_calories, expected);
    }
}

#[test]
fn only_the_touched_slot_and_day_change() {
    let plan = sample_plan();
    let next = replace_meal(&plan, 2, MealSlot::Dinner, meal("红烧豆腐", 480, None));

    for (i, (old, new)) in plan.daily_plans.iter().zip(&next.daily_plans).enumerate() {
        if i == 2 {
            assert_eq!(new.meals.breakfast, old.meals.breakfast);
            assert_eq!(new.meals.lunch, old.meals.lunch);
            assert_eq!(new.meals.dinner.name, "红烧豆腐");
            assert_eq!(new.nutrition_tips, old.nutrition_tips);
            assert_eq!(new.day, old.day);
        } else {
            assert!(Arc::ptr_eq(old, new), "day {i} should be shared");
        }
    }
    assert_eq!(next.weekly_overview, plan.weekly_overview);
    assert_eq!(next.shopping_list, plan.shopping_list);
}

#[test]
fn input_plan_is_left_untouched() {
    let plan = sample_plan();
    let snapshot: WeeklyPlan = plan.clone();

    let _ = replace_meal(&plan, 0, MealSlot::Lunch, meal("饺子", 700, Some((1, 2, 3))));

    assert_eq!(plan, snapshot);
    assert_eq!(plan.day(0).unwrap().meals.lunch.calories, 600);
}

#[test]
fn repeating_the_same_replacement_is_idempotent() {
    let plan = sample_plan();
    let replacement = meal("馄饨", 520, Some((22, 14, 70)));

    let once = replace_meal(&plan, 1, MealSlot::Lunch, replacement.clone());
    let twice = replace_meal(&once, 1, MealSlot::Lunch, replacement);

    assert_eq!(once, twice);
}

#[test]
fn missing_macros_on_other_meals_count_as_zero() {
    let mut plan = sample_plan();
    plan = replace_meal(&plan, 0, MealSlot::Dinner, meal("白粥", 200, None));
    plan = replace_meal(&plan, 0, MealSlot::Lunch, meal("鸡蛋羹", 300, Some((12, 8, 4))));

    let day = plan.day(0).unwrap();
    // breakfast 25/15/60 + lunch 12/8/4 + dinner without data
    assert_eq!(
        day.total_macronutrients,
        Some(Macronutrients::new(37, 23, 64))
    );
    assert_eq!(day.total_calories, 400 + 300 + 200);
}

#[test]
fn totals_saturate_instead_of_overflowing() {
    let mut plan = sample_plan();
    plan = replace_meal(
        &plan,
        2,
        MealSlot::Breakfast,
        meal("超大份早餐", u32::MAX, Some((u32::MAX, 1, 1))),
    );
    assert_eq!(plan.day(2).unwrap().total_calories, u32::MAX);

    let next = replace_meal(&plan, 2, MealSlot::Lunch, meal("小份沙拉", 2, Some((1, 1, 1))));

    let day = next.day(2).unwrap();
    assert_eq!(day.total_calories, u32::MAX);
    // protein saturates; fat and carbs are 1 + 1 + dinner's 20 / 50
    assert_eq!(
        day.total_macronutrients,
        Some(Macronutrients::new(u32::MAX, 22, 52))
    );
}

#[test]
fn store_swaps_the_held_plan() {
    let mut store = PlanStore::new();
    store.set(sample_plan());
    let held_before = store.current().cloned().unwrap();

    let after = store
        .replace_meal(4, MealSlot::Breakfast, meal("豆浆油条", 520, None))
        .cloned()
        .unwrap();

    assert_eq!(after.day(4).unwrap().total_calories, 1620);
    assert_eq!(store.current(), Some(&after));
    assert_eq!(held_before.day(4).unwrap().total_calories, 1500);
}
