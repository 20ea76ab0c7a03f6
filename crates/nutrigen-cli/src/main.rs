mod agents_cmd;
mod config;
mod export_cmd;
mod generate_cmd;
mod profile_args;
mod session_cmd;

#[cfg(test)]
mod test_util;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use nutrigen_core::agent::AgentTable;
use nutrigen_core::collaborator::{GeminiPlanner, MealPlanner};

use config::{CliOverrides, NutrigenConfig};
use export_cmd::OutputFormat;
use profile_args::ProfileArgs;

#[derive(Parser)]
#[command(name = "nutrigen", about = "AI meal planner: generate and edit a 7-day Chinese home-cooking plan")]
struct Cli {
    /// Gemini API key (overrides GEMINI_API_KEY / API_KEY env vars and the config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API base URL (overrides the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds, 0 for none
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a nutrigen config file from --api-key, --base-url and --timeout
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// List the selectable AI agents and the model serving each
    Agents,
    /// Generate a plan once and write it out
    Generate {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Generate a plan and browse, swap meals, and export interactively
    Run {
        #[command(flatten)]
        profile: ProfileArgs,
    },
}

/// Execute the `nutrigen init` command: write config file.
fn cmd_init(key: &str, base_url: Option<&str>, timeout_secs: Option<u64>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    let cfg = config::ConfigFile {
        gemini: config::GeminiSection {
            api_key: key.trim().to_string(),
            base_url: base_url.map(str::to_string),
            timeout_secs,
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  gemini.api_key = {}", mask_key(&cfg.gemini.api_key));
    println!();
    println!("Next: run `nutrigen run` to generate your first plan.");

    Ok(())
}

/// Show only the first and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Build the production planner from the resolved configuration.
fn build_planner(overrides: &CliOverrides) -> anyhow::Result<Arc<dyn MealPlanner>> {
    let resolved = NutrigenConfig::resolve(overrides)?;
    let planner = GeminiPlanner::new(resolved.gemini, AgentTable::builtin())?;
    Ok(Arc::new(planner))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let overrides = CliOverrides {
        api_key: cli.api_key,
        base_url: cli.base_url,
        timeout_secs: cli.timeout,
    };

    match cli.command {
        Commands::Init { force } => {
            let Some(key) = overrides.api_key.as_deref() else {
                anyhow::bail!("`nutrigen init` needs the key to store: pass --api-key <KEY>");
            };
            cmd_init(key, overrides.base_url.as_deref(), overrides.timeout_secs, force)?;
        }
        Commands::Agents => {
            agents_cmd::run_agents(&AgentTable::builtin());
        }
        Commands::Generate {
            profile,
            format,
            output,
        } => {
            let profile = profile.into_profile();
            let planner = build_planner(&overrides)?;
            generate_cmd::run_generate(planner, profile, format, output.as_deref()).await?;
        }
        Commands::Run { profile } => {
            let profile = profile.into_profile();
            let planner = build_planner(&overrides)?;
            session_cmd::run_session(planner, profile).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_key_hides_middle() {
        assert_eq!(mask_key("AIzaSyD-1234567890abcd"), "AIza...abcd");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn generate_parses_profile_flags() {
        let cli = Cli::try_parse_from([
            "nutrigen",
            "--api-key",
            "k",
            "generate",
            "--gender",
            "male",
            "--age",
            "40",
            "--goal",
            "gain_muscle",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        let Commands::Generate { profile, format, output } = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(format, OutputFormat::Json);
        assert!(output.is_none());
        let profile = profile.into_profile();
        assert_eq!(profile.age, 40);
        assert_eq!(profile.goal, nutrigen_core::profile::Goal::GainMuscle);
    }

    #[test]
    fn bad_enum_flag_is_rejected() {
        assert!(Cli::try_parse_from(["nutrigen", "run", "--gender", "other"]).is_err());
    }

    #[test]
    fn init_writes_config_and_refuses_overwrite() {
        let _lock = crate::test_util::lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        let first = cmd_init("key-1234567890", None, Some(60), false);
        let second = cmd_init("other", None, None, false);
        let loaded = config::load_config();

        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };
        first.unwrap();
        assert!(second.unwrap_err().to_string().contains("already exists"));
        let loaded = loaded.unwrap();
        assert_eq!(loaded.gemini.api_key, "key-1234567890");
        assert_eq!(loaded.gemini.timeout_secs, Some(60));
    }
}
