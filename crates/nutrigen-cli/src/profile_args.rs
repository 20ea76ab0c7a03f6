//! Profile flags shared by `generate` and `run`.

use clap::Args;

use nutrigen_core::profile::{ActivityLevel, DEFAULT_AGENT, Gender, Goal, UserProfile};

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// male or female
    #[arg(long, default_value = "female")]
    pub gender: Gender,
    /// Age in years
    #[arg(long, default_value_t = 28)]
    pub age: u32,
    /// Height in cm
    #[arg(long, default_value_t = 162.0)]
    pub height: f64,
    /// Weight in kg
    #[arg(long, default_value_t = 55.0)]
    pub weight: f64,
    /// sedentary, lightly_active, moderately_active, or very_active
    #[arg(long, default_value = "sedentary")]
    pub activity: ActivityLevel,
    /// lose_weight, maintain, or gain_muscle
    #[arg(long, default_value = "lose_weight")]
    pub goal: Goal,
    /// Foods to avoid, comma-separated
    #[arg(long, default_value = "")]
    pub dislikes: String,
    /// Preferred style, e.g. "低碳水" or "川菜"
    #[arg(long, default_value = "")]
    pub style: String,
    /// AI agent id (see `nutrigen agents`)
    #[arg(long, default_value = DEFAULT_AGENT)]
    pub agent: String,
}

impl ProfileArgs {
    /// Validation happens when the profile is submitted.
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            gender: self.gender,
            age: self.age,
            height: self.height,
            weight: self.weight,
            activity_level: self.activity,
            goal: self.goal,
            dislikes: self.dislikes,
            diet_style: self.style,
            model: self.agent,
        }
    }
}
