//! Read-only commands, plus clearing a day's timeline

use super::{open_session, parse_date, save_session, truncate_id};
use crate::domain::Task;
use crate::report::{generate_report, month_overview, month_totals};
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// Day to show (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TimelineArgs {
    /// Day to show (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<String>,

    /// Remove every event of the day instead of showing them
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args)]
pub struct OverviewArgs {
    /// Month to show (YYYY-MM). Defaults to the current month.
    #[arg(short, long)]
    pub month: Option<String>,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Date to generate report for (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<String>,

    /// Output file path. Defaults to report-YYYY-MM-DD.md in the data directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn print_task(task: &Task, depth: usize) {
    let mut line = format!(
        "{}{} {} {}",
        "  ".repeat(depth),
        truncate_id(&task.id),
        task.state.checkbox(),
        task.title
    );
    if task.is_in_progress() {
        line.push_str("  (in progress)");
    }
    if let Some(pattern) = &task.recurrence {
        line.push_str(&format!("  [repeats {}]", pattern.label()));
    } else if task.is_recurring_instance {
        line.push_str("  [recurring]");
    }
    println!("{}", line);

    for child in &task.children {
        print_task(child, depth + 1);
    }
}

pub fn run_list(args: ListArgs) -> Result<()> {
    let date = parse_date(args.date.as_deref())?;
    let session = open_session()?;
    let tasks = session.tasks_for_date(date);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks on {}.", date);
        return Ok(());
    }

    let stats = session.stats_for_date(date);
    println!(
        "{}  {}/{} done ({}%)",
        date, stats.completed, stats.total, stats.percentage
    );
    println!("{}", "-".repeat(40));
    for task in &tasks {
        print_task(task, 0);
    }
    Ok(())
}

pub fn run_timeline(args: TimelineArgs) -> Result<()> {
    let date = parse_date(args.date.as_deref())?;
    let mut session = open_session()?;

    if args.clear {
        let removed = session.timeline.clear_date(date);
        if !removed.is_empty() {
            session.needs_save = true;
            save_session(&mut session)?;
        }
        println!("Cleared {} event(s) on {}.", removed.len(), date);
        return Ok(());
    }

    let events = session.events_for_date(date);
    if events.is_empty() {
        println!("No activity on {}.", date);
        return Ok(());
    }
    for event in events {
        println!("{}", event.describe());
    }
    Ok(())
}

/// Parse `YYYY-MM`, defaulting to the current month
fn parse_month(value: Option<&str>) -> Result<(i32, u32)> {
    let Some(value) = value else {
        let today = Local::now().date_naive();
        return Ok((today.year(), today.month()));
    };
    let first = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}'. Use YYYY-MM", value))?;
    Ok((first.year(), first.month()))
}

pub fn run_overview(args: OverviewArgs) -> Result<()> {
    let (year, month) = parse_month(args.month.as_deref())?;
    let session = open_session()?;
    let days = month_overview(&session, year, month);

    for day in &days {
        if day.stats.total == 0 {
            println!("{}  -", day.date.format("%a %d"));
            continue;
        }
        println!(
            "{}  {}/{} ({}%)",
            day.date.format("%a %d"),
            day.stats.completed,
            day.stats.total,
            day.stats.percentage
        );
    }

    let totals = month_totals(&days);
    println!("{}", "-".repeat(24));
    println!(
        "{}-{:02}  {}/{} ({}%)",
        year, month, totals.completed, totals.total, totals.percentage
    );
    Ok(())
}

pub fn run_report(args: ReportArgs) -> Result<()> {
    let date = parse_date(args.date.as_deref())?;
    let session = open_session()?;
    println!("Generating report for {}...", date);
    let path = generate_report(&session, date, args.output)?;
    println!("Report generated: {}", path.display());
    Ok(())
}
