pub mod enums;
pub mod forest;
pub mod recurrence;
pub mod task;
pub mod timeline;
pub mod tree;
pub mod undo;

pub use enums::{parse_weekday, ActionKind, EditScope, Frequency, TaskState, TimelineEventType};
pub use forest::TaskForest;
pub use recurrence::{
    ephemeral_instances, generate_instance, is_due, materialize, resolve_target, visible_tasks,
    RecurringTarget,
};
pub use task::{validate_title, validate_times, RecurrencePattern, Task, TaskUpdate, MAX_TITLE_LEN};
pub use timeline::{TimelineEvent, TimelineLog};
pub use tree::TaskStats;
pub use undo::{UndoEntry, UndoStack, DEFAULT_UNDO_DEPTH};
