use super::enums::{Frequency, TaskState};
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Maximum title length, counted in characters after trimming
pub const MAX_TITLE_LEN: usize = 60;

/// Calendar rule attached to a template task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    pub frequency: Frequency,
    /// Weekdays a weekly rule fires on (empty = the template's own weekday)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<Weekday>,
    /// Last date (inclusive) an occurrence may fall on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Dates whose occurrence was removed; only ever grows
    #[serde(default)]
    pub excluded_dates: BTreeSet<NaiveDate>,
}

impl RecurrencePattern {
    pub fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    pub fn weekly(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut pattern = Self::new(Frequency::Weekly);
        for day in days {
            if !pattern.days_of_week.contains(&day) {
                pattern.days_of_week.push(day);
            }
        }
        pattern
            .days_of_week
            .sort_by_key(|day| day.num_days_from_monday());
        pattern
    }

    pub fn monthly_by_weekday() -> Self {
        Self::new(Frequency::MonthlyByWeekday)
    }

    fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            days_of_week: Vec::new(),
            end_date: None,
            excluded_dates: BTreeSet::new(),
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Suppress the occurrence on `date`. Returns false if it was already excluded.
    pub fn exclude(&mut self, date: NaiveDate) -> bool {
        self.excluded_dates.insert(date)
    }

    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.excluded_dates.contains(&date)
    }

    /// Short human label, e.g. "weekly (Mon, Thu) until 2024-06-30"
    pub fn label(&self) -> String {
        let mut label = self.frequency.name().to_string();
        if !self.days_of_week.is_empty() {
            let days: Vec<String> = self.days_of_week.iter().map(|d| d.to_string()).collect();
            label.push_str(&format!(" ({})", days.join(", ")));
        }
        if let Some(end) = self.end_date {
            label.push_str(&format!(" until {}", end));
        }
        label
    }
}

/// A task or subtask, owning its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub state: TaskState,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Local>>,
    #[serde(default)]
    pub children: Vec<Task>,
    /// Id of the owning task, resolved by search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub date: NaiveDate,
    /// Only root tasks carry a rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrencePattern>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_recurring_instance: bool,
    /// Template this occurrence was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_parent_id: Option<Uuid>,
}

impl Task {
    /// Create a fresh task. The title is trimmed and validated.
    pub fn new(title: &str, date: NaiveDate, state: TaskState) -> CoreResult<Self> {
        let title = validate_title(title)?;
        let now = Local::now();

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            state,
            created_at: now,
            updated_at: now,
            start_time: None,
            end_time: if state.is_closed() { Some(now) } else { None },
            children: Vec::new(),
            parent_id: None,
            date,
            recurrence: None,
            is_recurring_instance: false,
            recurring_parent_id: None,
        })
    }

    /// Root task bearing a recurrence rule
    pub fn is_template(&self) -> bool {
        self.parent_id.is_none() && self.recurrence.is_some()
    }

    /// Started and not yet closed
    pub fn is_in_progress(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_none()
    }
}

/// Partial update merged into a task. `None` leaves a field untouched;
/// `Some(None)` clears an optional timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub state: Option<TaskState>,
    pub start_time: Option<Option<DateTime<Local>>>,
    pub end_time: Option<Option<DateTime<Local>>>,
}

impl TaskUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// State transition: closed states stamp `end_time`, todo clears it
    pub fn state(state: TaskState) -> Self {
        Self {
            state: Some(state),
            end_time: Some(if state.is_closed() { Some(Local::now()) } else { None }),
            ..Self::default()
        }
    }

    /// Start: stamp `start_time`, clear `end_time`, back to todo
    pub fn start(at: DateTime<Local>) -> Self {
        Self {
            state: Some(TaskState::Todo),
            start_time: Some(Some(at)),
            end_time: Some(None),
            ..Self::default()
        }
    }

    /// Undo a start: clear `start_time` only
    pub fn unstart() -> Self {
        Self {
            start_time: Some(None),
            ..Self::default()
        }
    }

    pub fn touches_times(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }

    /// Check the update against `current` without applying it
    pub fn validate(&self, current: &Task) -> CoreResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if self.touches_times() {
            let start = self.start_time.unwrap_or(current.start_time);
            let end = self.end_time.unwrap_or(current.end_time);
            validate_times(start, end)?;
        }
        Ok(())
    }

    /// Merge into `task` and refresh `updated_at`. Call `validate` first.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(state) = self.state {
            task.state = state;
        }
        if let Some(start) = self.start_time {
            task.start_time = start;
        }
        if let Some(end) = self.end_time {
            task.end_time = end;
        }
        task.updated_at = Local::now();
    }
}

/// Trim and check a title: 1..=60 characters
pub fn validate_title(title: &str) -> CoreResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation("Task title cannot be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::validation(format!(
            "Task title cannot exceed {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// An end time must not precede the start time
pub fn validate_times(
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
) -> CoreResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(CoreError::validation("End time cannot be before start time"));
        }
    }
    Ok(())
}
