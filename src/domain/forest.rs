use super::enums::TaskState;
use super::task::{RecurrencePattern, Task, TaskUpdate};
use super::tree::{self, TaskStats};
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Every persisted task tree, bucketed by calendar date.
///
/// Root order inside a bucket is insertion order, which is also display
/// order. Every operation validates before it mutates, so a failed call
/// leaves the forest untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskForest {
    days: BTreeMap<NaiveDate, Vec<Task>>,
}

impl TaskForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a validated task without inserting it
    pub fn create_task(title: &str, date: NaiveDate, state: TaskState) -> CoreResult<Task> {
        Task::new(title, date, state)
    }

    /// Append a root task to the bucket of its own date
    pub fn insert(&mut self, task: Task) {
        self.days.entry(task.date).or_default().push(task);
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(|tasks| tasks.is_empty())
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn tasks_for_date(&self, date: NaiveDate) -> &[Task] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All root tasks across every date, oldest date first
    pub fn roots(&self) -> impl Iterator<Item = &Task> {
        self.days.values().flatten()
    }

    /// Date bucket holding `id` anywhere in its trees
    pub fn date_of(&self, id: Uuid) -> Option<NaiveDate> {
        self.days
            .iter()
            .find(|(_, tasks)| tree::contains(tasks, id))
            .map(|(date, _)| *date)
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.days.values().find_map(|tasks| tree::find(tasks, id))
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.days
            .values_mut()
            .find_map(|tasks| tree::find_mut(tasks, id))
    }

    /// Root task whose tree contains `id`
    pub fn root_of(&self, id: Uuid) -> Option<&Task> {
        self.days.values().find_map(|tasks| tree::root_of(tasks, id))
    }

    /// Merge `update` into the task. Titles are re-validated and any time
    /// change is checked against the merged start/end pair.
    pub fn update_task(&mut self, id: Uuid, update: &TaskUpdate) -> CoreResult<()> {
        let task = self.get_mut(id).ok_or(CoreError::TaskNotFound(id))?;
        update.validate(task)?;
        update.apply_to(task);
        Ok(())
    }

    /// Remove the task and its subtree. Unknown ids are a no-op, since an
    /// occurrence that was never materialized has nothing to delete.
    pub fn delete_task(&mut self, id: Uuid) -> Vec<Task> {
        let Some(date) = self.date_of(id) else {
            tracing::debug!("delete of unknown task {} ignored", id);
            return Vec::new();
        };
        let mut removed = Vec::new();
        if let Some(tasks) = self.days.get_mut(&date) {
            removed = tree::delete(tasks, id);
            if tasks.is_empty() {
                self.days.remove(&date);
            }
        }
        removed
    }

    /// Create a child under `parent_id`, dated like its parent
    pub fn add_subtask(&mut self, parent_id: Uuid, title: &str) -> CoreResult<Uuid> {
        let parent = self.get(parent_id).ok_or(CoreError::ParentNotFound(parent_id))?;
        let child = Self::create_task(title, parent.date, TaskState::Todo)?;
        let child_id = child.id;
        let parent = self
            .get_mut(parent_id)
            .ok_or(CoreError::ParentNotFound(parent_id))?;
        parent.children.push(Task {
            parent_id: Some(parent_id),
            ..child
        });
        Ok(child_id)
    }

    /// Closed states stamp `end_time`; todo clears it
    pub fn change_state(&mut self, id: Uuid, state: TaskState) -> CoreResult<()> {
        self.update_task(id, &TaskUpdate::state(state))
    }

    /// Stamp `start_time`, clear `end_time`, force the state back to todo
    pub fn start_task(&mut self, id: Uuid, at: Option<DateTime<Local>>) -> CoreResult<()> {
        self.update_task(id, &TaskUpdate::start(at.unwrap_or_else(Local::now)))
    }

    /// Add `date` to the template's exclusions. Returns false when the date
    /// was already excluded.
    ///
    /// A missing id is `TaskNotFound`; a task without a recurrence rule is
    /// reported separately as `NotRecurring` rather than folded into
    /// `TaskNotFound`.
    pub fn exclude_instance(&mut self, template_id: Uuid, date: NaiveDate) -> CoreResult<bool> {
        let template = self
            .get_mut(template_id)
            .ok_or(CoreError::TaskNotFound(template_id))?;
        let pattern = template
            .recurrence
            .as_mut()
            .ok_or(CoreError::NotRecurring(template_id))?;
        Ok(pattern.exclude(date))
    }

    /// Attach (or with `None`, detach) a recurrence rule. Root tasks only.
    pub fn set_recurrence(
        &mut self,
        id: Uuid,
        pattern: Option<RecurrencePattern>,
    ) -> CoreResult<()> {
        let task = self.get_mut(id).ok_or(CoreError::TaskNotFound(id))?;
        if task.parent_id.is_some() {
            return Err(CoreError::validation("Only top-level tasks can recur"));
        }
        if task.is_recurring_instance {
            return Err(CoreError::validation(
                "An occurrence of a recurring task cannot carry its own rule",
            ));
        }
        task.recurrence = pattern;
        task.updated_at = Local::now();
        Ok(())
    }

    pub fn templates(&self) -> impl Iterator<Item = &Task> {
        self.roots().filter(|task| task.is_template())
    }

    /// Materialized occurrences of a template, every date
    pub fn instances_of(&self, template_id: Uuid) -> impl Iterator<Item = &Task> {
        self.roots()
            .filter(move |task| task.recurring_parent_id == Some(template_id))
    }

    pub fn instance_for(&self, template_id: Uuid, date: NaiveDate) -> Option<&Task> {
        self.tasks_for_date(date)
            .iter()
            .find(|task| task.recurring_parent_id == Some(template_id))
    }

    /// Completion over the persisted trees of one date
    pub fn stats_for_date(&self, date: NaiveDate) -> TaskStats {
        tree::stats(self.tasks_for_date(date))
    }

    /// Drop buckets left empty by earlier edits
    pub fn prune_empty(&mut self) {
        self.days.retain(|_, tasks| !tasks.is_empty());
    }
}
