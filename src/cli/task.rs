//! Mutating commands: each loads the snapshot, applies one command and saves

use super::{open_session, parse_date, parse_scope, resolve_task, save_session, truncate_id};
use crate::app::{Command, Outcome, Session};
use crate::domain::{parse_weekday, EditScope, RecurrencePattern, TaskState};
use anyhow::{bail, Result};
use chrono::{NaiveDate, Weekday};
use clap::Args;

#[derive(Args)]
pub struct TargetArgs {
    /// Task id or unique id prefix
    pub id: String,

    /// Day the task is shown on (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<String>,

    /// Which occurrences of a recurring task to change
    #[arg(short, long, value_parser = parse_scope)]
    pub scope: Option<EditScope>,
}

#[derive(Args)]
pub struct RecurrenceArgs {
    /// Repeat every day
    #[arg(long, conflicts_with_all = ["weekly", "monthly"])]
    pub daily: bool,

    /// Repeat on these weekdays, e.g. "mon,wed,fri"
    #[arg(long, conflicts_with = "monthly")]
    pub weekly: Option<String>,

    /// Repeat on the same weekday of the same week each month
    #[arg(long)]
    pub monthly: bool,

    /// Last date an occurrence may fall on (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,
}

impl RecurrenceArgs {
    /// The requested pattern, `None` when no frequency flag was given
    pub fn pattern(&self) -> Result<Option<RecurrencePattern>> {
        let pattern = if self.daily {
            RecurrencePattern::daily()
        } else if let Some(days) = &self.weekly {
            RecurrencePattern::weekly(parse_weekdays(days)?)
        } else if self.monthly {
            RecurrencePattern::monthly_by_weekday()
        } else {
            if self.until.is_some() {
                bail!("--until needs --daily, --weekly or --monthly");
            }
            return Ok(None);
        };

        match &self.until {
            Some(until) => Ok(Some(pattern.until(parse_date(Some(until))?))),
            None => Ok(Some(pattern)),
        }
    }
}

fn parse_weekdays(value: &str) -> Result<Vec<Weekday>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|day| !day.is_empty())
        .map(|day| match parse_weekday(day) {
            Some(weekday) => Ok(weekday),
            None => bail!("Unknown weekday: {}", day),
        })
        .collect()
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,

    /// Day to add the task to (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<String>,

    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

#[derive(Args)]
pub struct SubtaskArgs {
    /// Parent task id or unique id prefix
    pub parent: String,

    /// Subtask title
    pub title: String,

    /// Day the parent is shown on (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<String>,

    #[arg(short, long, value_parser = parse_scope)]
    pub scope: Option<EditScope>,
}

#[derive(Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// New title
    #[arg(short, long)]
    pub title: String,
}

#[derive(Args)]
pub struct RepeatArgs {
    /// Task id or unique id prefix
    pub id: String,

    #[command(flatten)]
    pub recurrence: RecurrenceArgs,

    /// Stop repeating
    #[arg(long, conflicts_with_all = ["daily", "weekly", "monthly", "until"])]
    pub none: bool,
}

#[derive(Args)]
pub struct ExcludeArgs {
    /// Recurring task id or unique id prefix
    pub template: String,

    /// Occurrence to skip (YYYY-MM-DD)
    pub date: String,
}

/// Run one command against the stored data and save if it changed anything
fn apply(session: &mut Session, command: Command) -> Result<Outcome> {
    let outcome = session.apply(command)?;
    save_session(session)?;
    Ok(outcome)
}

fn report(outcome: &Outcome, verb: &str) {
    match outcome {
        Outcome::Applied { task_ids, .. } if task_ids.is_empty() => {
            println!("Nothing to {}.", verb)
        }
        Outcome::Applied { task_ids, .. } => {
            let ids: Vec<String> = task_ids.iter().map(truncate_id).collect();
            println!("{} {} task(s): {}", capitalize(verb), task_ids.len(), ids.join(", "));
        }
        Outcome::Undone(action) => println!("Undid {}", action.name()),
        Outcome::NothingToUndo => println!("Nothing to undo."),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolve the target of a per-task command against `--date`
fn target(session: &Session, args: &TargetArgs) -> Result<(uuid::Uuid, NaiveDate)> {
    let date = parse_date(args.date.as_deref())?;
    resolve_task(session, date, &args.id)
}

pub fn run_add(args: AddArgs) -> Result<()> {
    let date = parse_date(args.date.as_deref())?;
    let pattern = args.recurrence.pattern()?;
    let mut session = open_session()?;

    let id = session.add_task(date, &args.title)?;
    let label = pattern.as_ref().map(RecurrencePattern::label);
    if pattern.is_some() {
        session.set_recurrence(id, pattern)?;
    }
    save_session(&mut session)?;
    println!("Added {} on {}: {}", truncate_id(&id), date, args.title.trim());
    if let Some(label) = label {
        println!("Repeats {}", label);
    }
    Ok(())
}

pub fn run_subtask(args: SubtaskArgs) -> Result<()> {
    let mut session = open_session()?;
    let date = parse_date(args.date.as_deref())?;
    let (parent_id, date) = resolve_task(&session, date, &args.parent)?;
    let outcome = apply(
        &mut session,
        Command::AddSubtask {
            date,
            parent_id,
            title: args.title,
            scope: args.scope,
        },
    )?;
    report(&outcome, "added");
    Ok(())
}

pub fn run_state(args: TargetArgs, state: TaskState) -> Result<()> {
    let mut session = open_session()?;
    let (id, date) = target(&session, &args)?;
    let outcome = apply(
        &mut session,
        Command::ChangeState {
            date,
            id,
            state,
            scope: args.scope,
        },
    )?;
    report(&outcome, "updated");
    Ok(())
}

pub fn run_toggle(args: TargetArgs) -> Result<()> {
    let mut session = open_session()?;
    let (id, date) = target(&session, &args)?;
    let outcome = apply(&mut session, Command::ToggleComplete { date, id, scope: args.scope })?;
    report(&outcome, "toggled");
    Ok(())
}

pub fn run_start(args: TargetArgs) -> Result<()> {
    let mut session = open_session()?;
    let (id, date) = target(&session, &args)?;
    let outcome = apply(&mut session, Command::Start { date, id, scope: args.scope })?;
    report(&outcome, "started");
    Ok(())
}

pub fn run_edit(args: EditArgs) -> Result<()> {
    let mut session = open_session()?;
    let (id, date) = target(&session, &args.target)?;
    let outcome = apply(
        &mut session,
        Command::EditTitle {
            date,
            id,
            title: args.title,
            scope: args.target.scope,
        },
    )?;
    report(&outcome, "renamed");
    Ok(())
}

pub fn run_delete(args: TargetArgs) -> Result<()> {
    let mut session = open_session()?;
    let (id, date) = target(&session, &args)?;
    let outcome = apply(&mut session, Command::Delete { date, id, scope: args.scope })?;
    report(&outcome, "deleted");
    Ok(())
}

pub fn run_repeat(args: RepeatArgs) -> Result<()> {
    let pattern = args.recurrence.pattern()?;
    if pattern.is_none() && !args.none {
        bail!("Give --daily, --weekly <days>, --monthly or --none");
    }

    let mut session = open_session()?;
    let (id, _) = resolve_task(&session, session.today(), &args.id)?;
    apply(&mut session, Command::SetRecurrence { id, pattern: pattern.clone() })?;
    match pattern {
        Some(pattern) => println!("{} repeats {}", truncate_id(&id), pattern.label()),
        None => println!("{} no longer repeats", truncate_id(&id)),
    }
    Ok(())
}

pub fn run_exclude(args: ExcludeArgs) -> Result<()> {
    let date = parse_date(Some(&args.date))?;
    let mut session = open_session()?;
    let (template_id, _) = resolve_task(&session, date, &args.template)?;
    apply(&mut session, Command::Exclude { template_id, date })?;
    println!("Skipping {} on {}", truncate_id(&template_id), date);
    Ok(())
}
