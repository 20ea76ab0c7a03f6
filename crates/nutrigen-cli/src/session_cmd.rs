//! `nutrigen run`: generate a plan, then browse and edit it from a prompt.
//!
//! The session lives in memory only; export the plan before quitting to
//! keep it.

use std::io::{BufRead, Write};
use std::sync::Arc;

use thiserror::Error;

use nutrigen_core::Controller;
use nutrigen_core::collaborator::MealPlanner;
use nutrigen_core::export;
use nutrigen_core::flow::{Stage, TransitionError};
use nutrigen_core::plan::{MealSlot, WeeklyStats};
use nutrigen_core::profile::UserProfile;

use crate::export_cmd::{self, OutputFormat};

const HELP: &str = "\
Commands:
  show               weekly overview and nutrition summary
  day N              meals of day N (1-7)
  swap DAY SLOT      replace a meal, e.g. `swap 3 lunch`
  shopping           this week's shopping list
  export [PATH]      write the plan as Markdown (stdout without PATH)
  generate           generate a new plan for the same profile
  reset              discard the plan
  help               this text
  quit               leave (the plan is not saved)
";

// ---------------------------------------------------------------------------
// Command parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Show,
    /// 0-based day index.
    Day(usize),
    Swap { day_index: usize, slot: MealSlot },
    Shopping,
    Export(Option<String>),
    Generate,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("unknown command {0:?}; type `help` for the list")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("day must be a number from 1, got {0:?}")]
    BadDay(String),

    #[error("{0}")]
    BadSlot(String),
}

fn parse_day(token: &str) -> Result<usize, CommandParseError> {
    match token.parse::<usize>() {
        Ok(day) if day >= 1 => Ok(day - 1),
        _ => Err(CommandParseError::BadDay(token.to_string())),
    }
}

/// Parse one input line. Blank lines are `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, CommandParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("show", []) => SessionCommand::Show,
        ("day", [n]) => SessionCommand::Day(parse_day(n)?),
        ("day", _) => return Err(CommandParseError::Usage("day N")),
        ("swap", [day, slot]) => SessionCommand::Swap {
            day_index: parse_day(day)?,
            slot: slot
                .parse()
                .map_err(|e: nutrigen_core::plan::MealSlotParseError| {
                    CommandParseError::BadSlot(e.to_string())
                })?,
        },
        ("swap", _) => return Err(CommandParseError::Usage("swap DAY breakfast|lunch|dinner")),
        ("shopping", []) => SessionCommand::Shopping,
        ("export", []) => SessionCommand::Export(None),
        ("export", [path]) => SessionCommand::Export(Some((*path).to_string())),
        ("export", _) => return Err(CommandParseError::Usage("export [PATH]")),
        ("generate", []) => SessionCommand::Generate,
        ("reset", []) => SessionCommand::Reset,
        ("help" | "?", _) => SessionCommand::Help,
        ("quit" | "exit" | "q", _) => SessionCommand::Quit,
        _ => return Err(CommandParseError::Unknown(line.trim().to_string())),
    };
    Ok(Some(command))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Execute `nutrigen run` on stdin/stdout.
pub async fn run_session(planner: Arc<dyn MealPlanner>, profile: UserProfile) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut session = Session::new(
        Controller::new(planner),
        profile,
        stdin.lock(),
        std::io::stdout(),
    );
    session.run().await
}

pub struct Session<R, W> {
    controller: Controller,
    profile: UserProfile,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(controller: Controller, profile: UserProfile, input: R, output: W) -> Self {
        Self {
            controller,
            profile,
            input,
            output,
        }
    }

    /// Generate, then read commands until `quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.generate().await?;
        if self.controller.plan().is_some() {
            self.show()?;
        }
        writeln!(self.output, "Type `help` for commands.")?;

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                break;
            };

            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(self.output, "{e}")?;
                    continue;
                }
            };
            if command == SessionCommand::Quit {
                break;
            }
            if let Err(e) = self.execute(command).await {
                writeln!(self.output, "{e:#}")?;
            }
            self.flush_notice()?;
        }
        Ok(())
    }

    async fn execute(&mut self, command: SessionCommand) -> anyhow::Result<()> {
        match command {
            SessionCommand::Show => self.show(),
            SessionCommand::Day(day_index) => self.show_day(day_index),
            SessionCommand::Swap { day_index, slot } => self.swap(day_index, slot).await,
            SessionCommand::Shopping => self.shopping(),
            SessionCommand::Export(path) => self.export(path.as_deref()),
            SessionCommand::Generate => self.generate().await,
            SessionCommand::Reset => {
                self.controller.reset();
                writeln!(self.output, "Plan discarded. Use `generate` for a new one.")?;
                Ok(())
            }
            SessionCommand::Help => {
                write!(self.output, "{HELP}")?;
                Ok(())
            }
            SessionCommand::Quit => Ok(()),
        }
    }

    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn flush_notice(&mut self) -> anyhow::Result<()> {
        if let Some(notice) = self.controller.notice() {
            writeln!(self.output, "! {}", notice.message)?;
            if let Some(detail) = &notice.detail {
                tracing::debug!(detail = %detail, "notice detail");
            }
            self.controller.dismiss_notice();
        }
        Ok(())
    }

    async fn generate(&mut self) -> anyhow::Result<()> {
        if matches!(self.controller.state().stage, Stage::Result { .. }) {
            self.controller.reset();
        }
        writeln!(
            self.output,
            "正在为您定制食谱... (agent: {})",
            self.profile.model
        )?;
        self.output.flush()?;
        self.controller.generate(self.profile.clone()).await?;
        self.flush_notice()
    }

    fn show(&mut self) -> anyhow::Result<()> {
        let (Some(profile), Some(plan)) = (self.controller.profile(), self.controller.plan()) else {
            return no_plan();
        };
        let stats = WeeklyStats::from_plan(plan);

        writeln!(self.output, "{}", export::title(profile))?;
        writeln!(
            self.output,
            "{} · {} · {}岁 · BMI {:.1} · AI: {}",
            profile.goal.label(),
            profile.gender.label(),
            profile.age,
            profile.bmi(),
            profile.model
        )?;
        if !plan.weekly_overview.is_empty() {
            writeln!(self.output, "\"{}\"", plan.weekly_overview)?;
        }
        writeln!(self.output)?;
        for (day, calories) in &stats.calories_by_day {
            let blocks = (stats.relative_height(*calories) / 5.0).round() as usize;
            writeln!(
                self.output,
                "  {} {:>5} kcal {}",
                export::weekday_label(*day),
                calories,
                "█".repeat(blocks)
            )?;
        }
        let avg = &stats.average_macronutrients;
        writeln!(
            self.output,
            "日均 {} kcal · 蛋白质 {}g · 碳水 {}g · 脂肪 {}g",
            stats.average_calories, avg.protein, avg.carbs, avg.fat
        )?;
        Ok(())
    }

    fn show_day(&mut self, day_index: usize) -> anyhow::Result<()> {
        let Some(plan) = self.controller.plan() else {
            return no_plan();
        };
        let Some(day) = plan.day(day_index) else {
            anyhow::bail!(
                "day {} out of range (plan has {} days)",
                day_index + 1,
                plan.daily_plans.len()
            );
        };
        export::write_day_summary(&mut self.output, day)?;
        if !day.nutrition_tips.is_empty() {
            writeln!(self.output, "  贴士: {}", day.nutrition_tips)?;
        }
        Ok(())
    }

    async fn swap(&mut self, day_index: usize, slot: MealSlot) -> anyhow::Result<()> {
        match self.controller.open_swap(day_index, slot).await {
            Ok(()) => {}
            Err(TransitionError::DayOutOfRange { days, .. }) => {
                anyhow::bail!("day {} out of range (plan has {days} days)", day_index + 1)
            }
            Err(TransitionError::WrongStage { .. }) => return no_plan(),
            Err(e) => return Err(e.into()),
        }

        let candidates = self.controller.state().swap.candidates().to_vec();
        if !self.controller.state().swap.is_open() {
            // Fetch failed; the notice says so.
            return Ok(());
        }
        if candidates.is_empty() {
            writeln!(self.output, "No alternatives returned.")?;
            self.controller.cancel_swap();
            return Ok(());
        }

        let current = self
            .controller
            .state()
            .swap
            .target()
            .map(|t| t.meal.name.clone())
            .unwrap_or_default();
        writeln!(self.output, "替换 {current}:")?;
        for (i, meal) in candidates.iter().enumerate() {
            export::write_meal_card(&mut self.output, &(i + 1).to_string(), meal)?;
        }

        loop {
            write!(self.output, "choose 1-{} or c to cancel: ", candidates.len())?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                self.controller.cancel_swap();
                return Ok(());
            };
            if answer.eq_ignore_ascii_case("c") || answer.is_empty() {
                self.controller.cancel_swap();
                writeln!(self.output, "Swap cancelled.")?;
                return Ok(());
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=candidates.len()).contains(&n) => {
                    self.controller.select_alternative(n - 1)?;
                    let day = self
                        .controller
                        .plan()
                        .and_then(|p| p.day(day_index))
                        .map(|d| d.total_calories)
                        .unwrap_or_default();
                    writeln!(
                        self.output,
                        "{} {} → {} (day total {day} kcal)",
                        export::weekday_label((day_index + 1) as u8),
                        slot.badge(),
                        candidates[n - 1].name
                    )?;
                    return Ok(());
                }
                _ => writeln!(self.output, "not a choice: {answer:?}")?,
            }
        }
    }

    fn shopping(&mut self) -> anyhow::Result<()> {
        let Some(plan) = self.controller.plan() else {
            return no_plan();
        };
        if plan.shopping_list.is_empty() {
            writeln!(self.output, "The shopping list is empty.")?;
            return Ok(());
        }
        writeln!(
            self.output,
            "本周采购清单 ({} items)",
            plan.shopping_list.item_count()
        )?;
        for (category, items) in plan.shopping_list.iter() {
            writeln!(self.output, "[{category}]")?;
            for item in items {
                writeln!(self.output, "  - {item}")?;
            }
        }
        Ok(())
    }

    fn export(&mut self, path: Option<&str>) -> anyhow::Result<()> {
        let (Some(profile), Some(plan)) = (self.controller.profile(), self.controller.plan()) else {
            return no_plan();
        };
        match path {
            Some(_) => export_cmd::export_plan(profile, plan, OutputFormat::Markdown, path),
            None => export_cmd::write_plan(&mut self.output, profile, plan, OutputFormat::Markdown),
        }
    }
}

fn no_plan() -> anyhow::Result<()> {
    anyhow::bail!("no plan yet; use `generate`")
}
