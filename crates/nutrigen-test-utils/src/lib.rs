//! Shared fixtures and a scripted planner for nutrigen integration tests.
//!
//! [`sample_plan`] builds a seven-day plan whose day 1 is the reference day
//! used throughout the plan store tests:
//!
//! | slot      | kcal | protein | fat | carbs |
//! |-----------|------|---------|-----|-------|
//! | breakfast | 400  | 25      | 15  | 60    |
//! | lunch     | 600  | 30      | 15  | 60    |
//! | dinner    | 500  | 25      | 20  | 50    |
//! | **total** | 1500 | 80      | 50  | 170   |

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use nutrigen_core::collaborator::{AlternativesRequest, CollaboratorError, MealPlanner};
use nutrigen_core::plan::{
    DailyPlan, DayMeals, Ingredient, Macronutrients, Meal, ShoppingList, WeeklyPlan,
};
use nutrigen_core::profile::UserProfile;

/// A meal with the given calories and optional `(protein, fat, carbs)`.
pub fn meal(name: &str, calories: u32, macros: Option<(u32, u32, u32)>) -> Meal {
    Meal {
        name: name.to_string(),
        calories,
        macronutrients: macros.map(|(p, f, c)| Macronutrients::new(p, f, c)),
        ingredients: vec![Ingredient {
            name: name.to_string(),
            amount: "100g".to_string(),
            category: "调味其他".to_string(),
        }],
        recipe_steps: vec![format!("烹制{name}")],
        description: format!("{name}，家常做法"),
    }
}

/// The reference day described in the module docs, numbered `day`.
pub fn sample_day(day: u8) -> DailyPlan {
    DailyPlan {
        day,
        total_calories: 1500,
        total_macronutrients: Some(Macronutrients::new(80, 50, 170)),
        meals: DayMeals {
            breakfast: meal("燕麦牛奶粥", 400, Some((25, 15, 60))),
            lunch: meal("番茄炒蛋盖饭", 600, Some((30, 15, 60))),
            dinner: meal("清蒸鲈鱼", 500, Some((25, 20, 50))),
            snack: None,
        },
        nutrition_tips: "少油少盐，多喝水".to_string(),
    }
}

/// A seven-day plan made of [`sample_day`]s.
pub fn sample_plan() -> WeeklyPlan {
    let mut shopping_list = ShoppingList::new();
    shopping_list.extend_category("蔬菜豆菌", vec!["番茄 500g".to_string()]);
    shopping_list.extend_category("肉蛋水产", vec!["鸡蛋 10个".to_string(), "鲈鱼 1条".to_string()]);
    shopping_list.extend_category("主食谷物", vec!["燕麦 350g".to_string()]);
    WeeklyPlan {
        weekly_overview: "以清淡家常菜为主，控制总热量。".to_string(),
        daily_plans: (1..=7).map(|d| Arc::new(sample_day(d))).collect(),
        shopping_list,
    }
}

/// Three distinct candidate meals around `calories`.
pub fn sample_alternatives(calories: u32) -> Vec<Meal> {
    vec![
        meal("鸡胸肉沙拉", calories, Some((35, 10, 20))),
        meal("虾仁炒西兰花", calories + 20, Some((30, 12, 25))),
        meal("豆腐蔬菜汤", calories.saturating_sub(30), None),
    ]
}

/// One scripted planner answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Plan(WeeklyPlan),
    Alternatives(Vec<Meal>),
    /// The planner answered without a usable body.
    Empty,
    /// The call failed with an API error carrying this message.
    Fail(String),
}

/// A call the fake planner received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GeneratePlan(UserProfile),
    MealAlternatives(AlternativesRequest),
}

/// A [`MealPlanner`] that answers from a script, in order, and records
/// every call. Running out of script is an API error.
#[derive(Debug, Default)]
pub struct FakePlanner {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl FakePlanner {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self::new(replies))
    }

    pub async fn push(&self, reply: Reply) {
        self.replies.lock().await.push_back(reply);
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    async fn next_reply(&self) -> Result<Reply, CollaboratorError> {
        match self.replies.lock().await.pop_front() {
            Some(Reply::Empty) => Err(CollaboratorError::EmptyResponse),
            Some(Reply::Fail(message)) => Err(CollaboratorError::Api {
                status: 500,
                message,
            }),
            Some(reply) => Ok(reply),
            None => Err(CollaboratorError::Api {
                status: 500,
                message: "fake planner has no scripted reply".to_string(),
            }),
        }
    }
}

#[async_trait]
impl MealPlanner for FakePlanner {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate_plan(&self, profile: &UserProfile) -> Result<WeeklyPlan, CollaboratorError> {
        self.calls
            .lock()
            .await
            .push(Call::GeneratePlan(profile.clone()));
        match self.next_reply().await? {
            Reply::Plan(plan) => Ok(plan),
            other => Err(CollaboratorError::Malformed(format!(
                "expected a plan reply, got {other:?}"
            ))),
        }
    }

    async fn meal_alternatives(
        &self,
        request: &AlternativesRequest,
    ) -> Result<Vec<Meal>, CollaboratorError> {
        self.calls
            .lock()
            .await
            .push(Call::MealAlternatives(request.clone()));
        match self.next_reply().await? {
            Reply::Alternatives(meals) => Ok(meals),
            other => Err(CollaboratorError::Malformed(format!(
                "expected an alternatives reply, got {other:?}"
            ))),
        }
    }
}
