use crate::app::Session;
use crate::domain::{Task, TaskStats};
use anyhow::Result;
use chrono::NaiveDate;
use std::path::PathBuf;

fn stats_line(stats: &TaskStats) -> String {
    format!(
        "- **Completed:** {}/{} tasks ({}%)\n",
        stats.completed, stats.total, stats.percentage
    )
}

fn push_task(report: &mut String, task: &Task, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{}- {} {}", indent, task.state.checkbox(), task.title);
    if task.is_in_progress() {
        line.push_str(" *(in progress)*");
    }
    if let Some(pattern) = &task.recurrence {
        line.push_str(&format!(" _(repeats {})_", pattern.label()));
    } else if task.is_recurring_instance {
        line.push_str(" _(recurring)_");
    }
    report.push_str(&line);
    report.push('\n');

    for child in &task.children {
        push_task(report, child, depth + 1);
    }
}

/// Markdown summary of one day: stats, the task trees and the timeline
pub fn render_day_markdown(session: &Session, date: NaiveDate) -> String {
    let tasks = session.tasks_for_date(date);
    let mut report = String::new();

    report.push_str(&format!("# Daily Report - {}\n\n", date));

    report.push_str("## Summary\n\n");
    report.push_str(&stats_line(&session.stats_for_date(date)));
    report.push('\n');

    report.push_str("## Tasks\n\n");
    if tasks.is_empty() {
        report.push_str("_No tasks._\n");
    }
    for task in &tasks {
        push_task(&mut report, task, 0);
    }
    report.push('\n');

    let events = session.events_for_date(date);
    if !events.is_empty() {
        report.push_str("## Timeline\n\n");
        for event in events {
            report.push_str(&format!("- {}\n", event.describe()));
        }
        report.push('\n');
    }

    report
}

/// Render the day and write it to `output_path`, or to
/// `report-YYYY-MM-DD.md` in the daybook directory
pub fn generate_report(
    session: &Session,
    date: NaiveDate,
    output_path: Option<PathBuf>,
) -> Result<PathBuf> {
    let report = render_day_markdown(session, date);
    let output = match output_path {
        Some(path) => path,
        None => crate::persistence::ensure_daybook_dir()?.join(format!("report-{}.md", date)),
    };
    crate::persistence::atomic_write(&output, &report)?;
    tracing::info!("wrote report for {} to {}", date, output.display());
    Ok(output)
}
