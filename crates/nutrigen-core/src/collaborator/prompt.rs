//! Prompt construction for the planner. Pure string building, no I/O.

use crate::profile::UserProfile;

use super::AlternativesRequest;

/// Requirements block of the weekly plan prompt.
const PLAN_REQUIREMENTS: &str = r#"Requirements:
1. **Sourcing**: All ingredients must be easily purchasable in standard Mainland China supermarkets (e.g., Yonghui, RT-Mart) or delivery apps (Meituan Maicai, Hema Fresh).
2. **Measurements**: Provide PRECISE measurements in grams (g) for all ingredients. e.g. "瘦肉 50g", "青菜 200g". Avoid vague terms like "some".
3. **Recipes**: Detailed step-by-step cooking instructions suitable for home kitchens.
4. **Nutrition**: Accurate Protein, Fat, Carbs calculation per meal.
5. **Language**: Strictly simplified Chinese (zh-CN).
6. **Completeness**: Ensure the plan covers Monday to Sunday.
"#;

/// Requirements block of the alternatives prompt.
const ALTERNATIVES_REQUIREMENTS: &str = r#"Requirements:
1. Chinese home cooking style (Mainland China standard).
2. Ingredients must be accessible in Chinese markets.
3. Return valid JSON array of meals with precise grams.
"#;

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

/// Dislikes normalised to a ", " separated list.
fn dislikes(profile: &UserProfile) -> String {
    profile.disliked_items().join(", ")
}

/// Build the weekly plan prompt.
///
/// `emulation_note`, when present, is placed first so the backing model
/// reads it before the role description.
pub fn build_plan_prompt(profile: &UserProfile, emulation_note: Option<&str>) -> String {
    let mut prompt = String::with_capacity(2048);

    if let Some(note) = emulation_note {
        prompt.push_str(note);
        prompt.push('\n');
    }

    prompt.push_str(
        "Role: You are a professional Chinese Dietitian and Chef (中国注册营养师 & 特级厨师).\n",
    );
    prompt.push_str(
        "Task: Create a strictly structured 7-day diet plan for a user in Mainland China.\n\n",
    );

    prompt.push_str("User Profile:\n");
    prompt.push_str(&format!("- Gender: {}\n", profile.gender.label()));
    prompt.push_str(&format!("- Age: {}\n", profile.age));
    prompt.push_str(&format!("- Height: {}cm\n", profile.height));
    prompt.push_str(&format!("- Weight: {}kg\n", profile.weight));
    prompt.push_str(&format!("- Activity: {}\n", profile.activity_level.label()));
    prompt.push_str(&format!("- Goal: {}\n", profile.goal.label()));
    prompt.push_str(&format!(
        "- Disliked Foods: {}\n",
        or_default(&dislikes(profile), "None")
    ));
    prompt.push_str(&format!(
        "- Preferred Style: {}\n\n",
        or_default(&profile.diet_style, "Chinese Home Cooking")
    ));

    prompt.push_str(PLAN_REQUIREMENTS);
    prompt.push_str("\nOutput: Return strictly valid JSON matching the schema.\n");
    prompt
}

/// Build the prompt asking for replacements of one meal.
pub fn build_alternatives_prompt(request: &AlternativesRequest) -> String {
    let profile = &request.profile;
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(&format!(
        "Task: Generate 3 DISTINCT alternative {} options for a user in China.\n",
        request.slot.capitalized()
    ));
    prompt.push_str(&format!(
        "Context: The user wants to replace \"{}\" but keep nutritional balance.\n",
        request.current_meal_name
    ));
    prompt.push_str(&format!(
        "Target Calories: Approximately {} kcal.\n",
        request.target_calories
    ));
    prompt.push_str(&format!("User Goal: {}.\n", profile.goal.label()));
    prompt.push_str(&format!(
        "Diet Style: {}.\n",
        or_default(&profile.diet_style, "Balanced")
    ));
    prompt.push_str(&format!("Dislikes: {}.\n\n", dislikes(profile)));
    prompt.push_str(ALTERNATIVES_REQUIREMENTS);
    prompt
}
