//! Response schemas sent with each request so the planner answers in the
//! shape [`crate::plan`] parses.

use serde_json::{Value, json};

/// Shopping list categories the plan schema asks for, in display order.
pub const SHOPPING_CATEGORIES: [&str; 5] = ["蔬菜豆菌", "肉蛋水产", "主食谷物", "水果乳品", "调味其他"];

fn macronutrients_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "protein": { "type": "INTEGER", "description": "Protein in grams" },
            "fat": { "type": "INTEGER", "description": "Fat in grams" },
            "carbs": { "type": "INTEGER", "description": "Carbohydrates in grams" }
        }
    })
}

fn ingredient_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "amount": { "type": "STRING", "description": "Precise amount e.g. '50g', '1个(约50g)'" },
            "category": { "type": "STRING" }
        }
    })
}

/// Schema of a single meal.
pub fn meal_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "calories": { "type": "INTEGER" },
            "macronutrients": macronutrients_schema(),
            "description": { "type": "STRING", "description": "Short description of the dish taste and look" },
            "recipeSteps": { "type": "ARRAY", "items": { "type": "STRING" } },
            "ingredients": { "type": "ARRAY", "items": ingredient_schema() }
        }
    })
}

/// Schema of the weekly plan document.
pub fn weekly_plan_schema() -> Value {
    let shopping_properties: serde_json::Map<String, Value> = SHOPPING_CATEGORIES
        .iter()
        .map(|c| {
            (
                (*c).to_string(),
                json!({ "type": "ARRAY", "items": { "type": "STRING" } }),
            )
        })
        .collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "weeklyOverview": { "type": "STRING" },
            "dailyPlans": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day": { "type": "INTEGER" },
                        "totalCalories": { "type": "INTEGER" },
                        "totalMacronutrients": macronutrients_schema(),
                        "nutritionTips": { "type": "STRING" },
                        "meals": {
                            "type": "OBJECT",
                            "properties": {
                                "breakfast": meal_schema(),
                                "lunch": meal_schema(),
                                "dinner": meal_schema()
                            }
                        }
                    }
                }
            },
            "shoppingList": {
                "type": "OBJECT",
                "properties": Value::Object(shopping_properties)
            }
        }
    })
}

/// Schema of the alternatives document: `{"alternatives": [meal, ...]}`.
pub fn alternatives_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "alternatives": { "type": "ARRAY", "items": meal_schema() }
        }
    })
}
