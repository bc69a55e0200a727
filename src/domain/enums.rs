use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Todo,
    Completed,
    Delegated,
    Delayed,
}

impl TaskState {
    /// Parse state from its lowercase tag like "completed"
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "todo" => Some(Self::Todo),
            "completed" | "done" => Some(Self::Completed),
            "delegated" => Some(Self::Delegated),
            "delayed" => Some(Self::Delayed),
            _ => None,
        }
    }

    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Completed => "completed",
            Self::Delegated => "delegated",
            Self::Delayed => "delayed",
        }
    }

    /// Whether a task in this state carries an `end_time`
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Completed | Self::Delegated | Self::Delayed)
    }

    /// Checkbox glyph for plain-text listings
    pub fn checkbox(&self) -> &'static str {
        match self {
            Self::Todo => "[ ]",
            Self::Completed => "[x]",
            Self::Delegated => "[>]",
            Self::Delayed => "[~]",
        }
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::Todo
    }
}

/// Kind of activity recorded in the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineEventType {
    Created,
    Started,
    Completed,
    Delegated,
    Delayed,
    Updated,
}

impl TimelineEventType {
    /// Event logged when a task transitions into `state`
    pub fn for_state(state: TaskState) -> Self {
        match state {
            TaskState::Todo => Self::Updated,
            TaskState::Completed => Self::Completed,
            TaskState::Delegated => Self::Delegated,
            TaskState::Delayed => Self::Delayed,
        }
    }

    /// Capitalized label ("Completed", "Started", ...)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Started => "Started",
            Self::Completed => "Completed",
            Self::Delegated => "Delegated",
            Self::Delayed => "Delayed",
            Self::Updated => "Updated",
        }
    }
}

/// How often a template task recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Frequency {
    Daily,
    Weekly,
    /// Same weekday at the same position in the month ("2nd Tuesday")
    MonthlyByWeekday,
}

impl Frequency {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" | "monthlybyweekday" => Some(Self::MonthlyByWeekday),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::MonthlyByWeekday => "monthly",
        }
    }
}

/// Reach of an edit made to an occurrence of a recurring task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditScope {
    /// Only the occurrence the user acted on
    This,
    /// The template and every materialized occurrence
    All,
    /// The template and materialized occurrences dated today or later
    FromToday,
}

impl EditScope {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "this" => Some(Self::This),
            "all" => Some(Self::All),
            "from-today" | "fromtoday" | "future" => Some(Self::FromToday),
            _ => None,
        }
    }
}

impl Default for EditScope {
    fn default() -> Self {
        Self::This
    }
}

/// User action recorded alongside an undo snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Add,
    Edit,
    Delete,
    ChangeState,
    Start,
    AddSubtask,
    Exclude,
    SetRecurrence,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Add => "add",
            ActionKind::Edit => "edit",
            ActionKind::Delete => "delete",
            ActionKind::ChangeState => "change state",
            ActionKind::Start => "start",
            ActionKind::AddSubtask => "add subtask",
            ActionKind::Exclude => "exclude occurrence",
            ActionKind::SetRecurrence => "set recurrence",
        }
    }
}

/// Parse a weekday from "mon", "Monday", "tue", ...
pub fn parse_weekday(tag: &str) -> Option<Weekday> {
    tag.trim().parse::<Weekday>().ok()
}
