use std::io::Write;

use anyhow::Context;
use serde::Serialize;

use nutrigen_core::export;
use nutrigen_core::plan::WeeklyPlan;
use nutrigen_core::profile::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Printable document with a shopping checklist
    Markdown,
    /// The profile and plan as JSON
    Json,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    profile: &'a UserProfile,
    plan: &'a WeeklyPlan,
}

/// Write `plan` in `format` to `writer`.
pub fn write_plan<W: Write>(
    writer: &mut W,
    profile: &UserProfile,
    plan: &WeeklyPlan,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Markdown => export::write_markdown(writer, profile, plan)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &JsonExport { profile, plan })
                .context("failed to serialize plan")?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Export to the file at `output`, or stdout when `None`.
pub fn export_plan(
    profile: &UserProfile,
    plan: &WeeklyPlan,
    format: OutputFormat,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create output file: {path}"))?,
        )
    } else {
        Box::new(std::io::stdout().lock())
    };

    write_plan(&mut writer, profile, plan, format)?;
    writer.flush()?;

    if let Some(path) = output {
        println!("Exported {} days to {path}", plan.daily_plans.len());
    }

    Ok(())
}
