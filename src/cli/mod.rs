//! CLI command implementations

pub mod definition;
pub mod list;
pub mod task;

pub use definition::{Cli, Commands};

use crate::app::Session;
use crate::domain::{tree, EditScope, Task};
use crate::persistence::{data_file, load_snapshot, save_snapshot};
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use uuid::Uuid;

/// Load the stored snapshot into a fresh session
pub fn open_session() -> Result<Session> {
    let snapshot = load_snapshot(data_file()?)?;
    Ok(Session::from_snapshot(snapshot))
}

/// Persist the session if a command changed it
pub fn save_session(session: &mut Session) -> Result<()> {
    if session.needs_save {
        save_snapshot(data_file()?, &session.to_snapshot())?;
        session.needs_save = false;
    }
    Ok(())
}

/// Parse `YYYY-MM-DD`, defaulting to today
pub fn parse_date(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD", s)),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn parse_scope(value: &str) -> Result<EditScope, String> {
    EditScope::from_tag(value)
        .ok_or_else(|| format!("unknown scope '{}' (this, all, from-today)", value))
}

/// Find a task by full id or unique id prefix.
///
/// The day's visible tasks are searched first so unsaved recurring
/// occurrences can be addressed, then every stored task. Returns the id and
/// the date the task lives on.
pub fn resolve_task(session: &Session, date: NaiveDate, identifier: &str) -> Result<(Uuid, NaiveDate)> {
    let identifier = identifier.trim().to_lowercase();
    if identifier.is_empty() {
        bail!("Task id must not be empty");
    }

    let visible = session.tasks_for_date(date);
    let mut candidates: Vec<&Task> = tree::flatten(&visible);
    for day in session.tasks.dates() {
        for task in tree::flatten(session.tasks.tasks_for_date(day)) {
            if !candidates.iter().any(|c| c.id == task.id) {
                candidates.push(task);
            }
        }
    }

    if let Some(task) = candidates.iter().find(|t| t.id.to_string() == identifier) {
        return Ok((task.id, task.date));
    }

    let matches: Vec<&&Task> = candidates
        .iter()
        .filter(|t| t.id.to_string().starts_with(&identifier))
        .collect();
    match matches.as_slice() {
        [task] => Ok((task.id, task.date)),
        [] => bail!("Task not found: {}", identifier),
        _ => bail!(
            "Id prefix '{}' matches {} tasks; use more characters",
            identifier,
            matches.len()
        ),
    }
}

pub fn truncate_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}
