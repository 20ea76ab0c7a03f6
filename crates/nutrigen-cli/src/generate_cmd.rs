use std::sync::Arc;

use anyhow::bail;

use nutrigen_core::Controller;
use nutrigen_core::collaborator::MealPlanner;
use nutrigen_core::profile::UserProfile;

use crate::export_cmd::{self, OutputFormat};

/// Execute `nutrigen generate`: one plan, written out, no session.
pub async fn run_generate(
    planner: Arc<dyn MealPlanner>,
    profile: UserProfile,
    format: OutputFormat,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let mut controller = Controller::new(planner);

    eprintln!("正在为您定制食谱... (agent: {})", profile.model);
    controller.generate(profile).await?;

    if let Some(notice) = controller.notice() {
        match &notice.detail {
            Some(detail) => bail!("{} ({detail})", notice.message),
            None => bail!("{}", notice.message),
        }
    }

    let (Some(profile), Some(plan)) = (controller.profile(), controller.plan()) else {
        bail!("plan generation finished without a result");
    };
    export_cmd::export_plan(profile, plan, format, output)
}
