use crate::domain::recurrence::{self, RecurringTarget};
use crate::domain::{
    tree, ActionKind, EditScope, RecurrencePattern, Task, TaskForest, TaskState, TaskStats,
    TaskUpdate, TimelineEvent, TimelineEventType, TimelineLog, UndoStack,
};
use crate::error::{CoreError, CoreResult};
use crate::persistence::{Settings, StorageSchema, SCHEMA_VERSION};
use chrono::{Local, NaiveDate};
use uuid::Uuid;

/// A discrete user command. Each one resolves to at most one paired
/// task/timeline mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTask {
        date: NaiveDate,
        title: String,
    },
    EditTitle {
        date: NaiveDate,
        id: Uuid,
        title: String,
        scope: Option<EditScope>,
    },
    ChangeState {
        date: NaiveDate,
        id: Uuid,
        state: TaskState,
        scope: Option<EditScope>,
    },
    ToggleComplete {
        date: NaiveDate,
        id: Uuid,
        scope: Option<EditScope>,
    },
    Start {
        date: NaiveDate,
        id: Uuid,
        scope: Option<EditScope>,
    },
    AddSubtask {
        date: NaiveDate,
        parent_id: Uuid,
        title: String,
        scope: Option<EditScope>,
    },
    Delete {
        date: NaiveDate,
        id: Uuid,
        scope: Option<EditScope>,
    },
    SetRecurrence {
        id: Uuid,
        pattern: Option<RecurrencePattern>,
    },
    Exclude {
        template_id: Uuid,
        date: NaiveDate,
    },
    Undo,
}

/// Result of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Tasks created, changed or removed by the action
    Applied { action: ActionKind, task_ids: Vec<Uuid> },
    Undone(ActionKind),
    NothingToUndo,
}

/// In-memory state of one session: the single writer of tasks and timeline.
///
/// Every mutating command snapshots both stores onto the undo stack first.
/// The same snapshot rolls a failed command back, so callers never observe
/// a half-applied change.
pub struct Session {
    pub tasks: TaskForest,
    pub timeline: TimelineLog,
    pub settings: Settings,
    undo: UndoStack,
    pub needs_save: bool,
    /// Fixed "today" for scoped edits (tests); the local date otherwise
    today_override: Option<NaiveDate>,
}

impl Session {
    pub fn new(tasks: TaskForest, timeline: TimelineLog, settings: Settings) -> Self {
        let undo = UndoStack::new(settings.undo_depth);
        Self {
            tasks,
            timeline,
            settings,
            undo,
            needs_save: false,
            today_override: None,
        }
    }

    pub fn from_snapshot(snapshot: StorageSchema) -> Self {
        Self::new(snapshot.tasks, snapshot.timeline, snapshot.settings)
    }

    pub fn to_snapshot(&self) -> StorageSchema {
        StorageSchema {
            version: SCHEMA_VERSION,
            tasks: self.tasks.clone(),
            timeline: self.timeline.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Pin the date "from today" edits measure against
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today_override = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    // Read side

    /// Persisted roots of `date` followed by its ephemeral occurrences
    pub fn tasks_for_date(&self, date: NaiveDate) -> Vec<Task> {
        recurrence::visible_tasks(&self.tasks, date)
    }

    pub fn stats_for_date(&self, date: NaiveDate) -> TaskStats {
        tree::stats(&self.tasks_for_date(date))
    }

    pub fn events_for_date(&self, date: NaiveDate) -> Vec<&TimelineEvent> {
        self.timeline.events_for_date(date)
    }

    /// Look a task up among persisted tasks, then among `date`'s ephemeral
    /// occurrences
    pub fn find_task(&self, date: NaiveDate, id: Uuid) -> Option<Task> {
        if let Some(task) = self.tasks.get(id) {
            return Some(task.clone());
        }
        recurrence::ephemeral_instances(&self.tasks, date)
            .iter()
            .find_map(|instance| tree::find(std::slice::from_ref(instance), id).cloned())
    }

    // Write side

    pub fn apply(&mut self, command: Command) -> CoreResult<Outcome> {
        match command {
            Command::AddTask { date, title } => self.add_task(date, &title).map(|id| Outcome::Applied {
                action: ActionKind::Add,
                task_ids: vec![id],
            }),
            Command::EditTitle {
                date,
                id,
                title,
                scope,
            } => self.edit_title(date, id, &title, scope).map(|ids| Outcome::Applied {
                action: ActionKind::Edit,
                task_ids: ids,
            }),
            Command::ChangeState {
                date,
                id,
                state,
                scope,
            } => self
                .change_state(date, id, state, scope)
                .map(|ids| Outcome::Applied {
                    action: ActionKind::ChangeState,
                    task_ids: ids,
                }),
            Command::ToggleComplete { date, id, scope } => {
                self.toggle_complete(date, id, scope).map(|ids| Outcome::Applied {
                    action: ActionKind::ChangeState,
                    task_ids: ids,
                })
            }
            Command::Start { date, id, scope } => self.start(date, id, scope).map(|ids| Outcome::Applied {
                action: ActionKind::Start,
                task_ids: ids,
            }),
            Command::AddSubtask {
                date,
                parent_id,
                title,
                scope,
            } => self
                .add_subtask(date, parent_id, &title, scope)
                .map(|ids| Outcome::Applied {
                    action: ActionKind::AddSubtask,
                    task_ids: ids,
                }),
            Command::Delete { date, id, scope } => self.delete(date, id, scope).map(|ids| Outcome::Applied {
                action: ActionKind::Delete,
                task_ids: ids,
            }),
            Command::SetRecurrence { id, pattern } => {
                self.set_recurrence(id, pattern).map(|()| Outcome::Applied {
                    action: ActionKind::SetRecurrence,
                    task_ids: vec![id],
                })
            }
            Command::Exclude { template_id, date } => {
                self.exclude(template_id, date).map(|_| Outcome::Applied {
                    action: ActionKind::Exclude,
                    task_ids: vec![template_id],
                })
            }
            Command::Undo => Ok(match self.undo() {
                Some(action) => Outcome::Undone(action),
                None => Outcome::NothingToUndo,
            }),
        }
    }

    /// Snapshot, run `body`, and restore the snapshot if it fails
    fn transact<T>(
        &mut self,
        action: ActionKind,
        body: impl FnOnce(&mut Self) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let evicted = self.undo.push(action, &self.tasks, &self.timeline);
        match body(self) {
            Ok(value) => {
                self.needs_save = true;
                Ok(value)
            }
            Err(err) => {
                if let Some(entry) = self.undo.pop() {
                    self.tasks = entry.previous_tasks;
                    self.timeline = entry.previous_timeline;
                }
                if let Some(oldest) = evicted {
                    self.undo.restore_oldest(oldest);
                }
                tracing::warn!("{} failed: {}", action.name(), err);
                Err(err)
            }
        }
    }

    fn recurring_target(&self, date: NaiveDate, id: Uuid) -> Option<RecurringTarget> {
        recurrence::resolve_target(&self.tasks, date, id)
    }

    /// State of `id` before the running action; occurrences that did not
    /// exist yet start as todo
    fn previous_state(&self, id: Uuid) -> TaskState {
        self.undo
            .last()
            .and_then(|entry| entry.previous_tasks.get(id))
            .map(|task| task.state)
            .unwrap_or(TaskState::Todo)
    }

    fn log(&mut self, id: Uuid, event_type: TimelineEventType, new_state: Option<TaskState>) {
        let Some(title) = self.tasks.get(id).map(|task| task.title.clone()) else {
            return;
        };
        let mut event = TimelineEvent::new(id, &title, event_type);
        if let Some(state) = new_state {
            event = event.with_states(self.previous_state(id), state);
        }
        self.timeline.add(event);
    }

    /// Update `id`, fanning out over its series when it has one
    fn update_scoped(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        update: &TaskUpdate,
        scope: Option<EditScope>,
    ) -> CoreResult<Vec<Uuid>> {
        match self.recurring_target(date, id) {
            Some(target) => {
                let today = self.today();
                recurrence::apply_update(
                    &mut self.tasks,
                    &target,
                    scope.unwrap_or_default(),
                    update,
                    today,
                )
            }
            None => {
                self.tasks.update_task(id, update)?;
                Ok(vec![id])
            }
        }
    }

    pub fn add_task(&mut self, date: NaiveDate, title: &str) -> CoreResult<Uuid> {
        let task = TaskForest::create_task(title, date, TaskState::Todo)?;
        self.transact(ActionKind::Add, |session| {
            let id = task.id;
            session.tasks.insert(task);
            session.log(id, TimelineEventType::Created, None);
            Ok(id)
        })
    }

    pub fn edit_title(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        title: &str,
        scope: Option<EditScope>,
    ) -> CoreResult<Vec<Uuid>> {
        let update = TaskUpdate::title(title);
        self.transact(ActionKind::Edit, |session| {
            let ids = session.update_scoped(date, id, &update, scope)?;
            for &touched in &ids {
                session.log(touched, TimelineEventType::Updated, None);
            }
            Ok(ids)
        })
    }

    pub fn change_state(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        state: TaskState,
        scope: Option<EditScope>,
    ) -> CoreResult<Vec<Uuid>> {
        self.transact(ActionKind::ChangeState, |session| {
            let ids = session.update_scoped(date, id, &TaskUpdate::state(state), scope)?;
            for &touched in &ids {
                session.log(touched, TimelineEventType::for_state(state), Some(state));
            }
            Ok(ids)
        })
    }

    /// Completed goes back to todo and takes its `completed` event with it;
    /// anything else becomes completed
    pub fn toggle_complete(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        scope: Option<EditScope>,
    ) -> CoreResult<Vec<Uuid>> {
        let current = self.find_task(date, id).ok_or(CoreError::TaskNotFound(id))?;
        if current.state != TaskState::Completed {
            return self.change_state(date, id, TaskState::Completed, scope);
        }

        self.transact(ActionKind::ChangeState, |session| {
            let ids =
                session.update_scoped(date, id, &TaskUpdate::state(TaskState::Todo), scope)?;
            for &touched in &ids {
                session
                    .timeline
                    .remove_last_by_type(touched, TimelineEventType::Completed);
            }
            Ok(ids)
        })
    }

    /// Start a task; starting one already in progress un-starts it and
    /// drops its latest `started` event
    pub fn start(&mut self, date: NaiveDate, id: Uuid, scope: Option<EditScope>) -> CoreResult<Vec<Uuid>> {
        let current = self.find_task(date, id).ok_or(CoreError::TaskNotFound(id))?;

        self.transact(ActionKind::Start, |session| {
            if current.is_in_progress() {
                let ids = session.update_scoped(date, id, &TaskUpdate::unstart(), scope)?;
                for &touched in &ids {
                    session
                        .timeline
                        .remove_last_by_type(touched, TimelineEventType::Started);
                }
                return Ok(ids);
            }

            let ids = session.update_scoped(date, id, &TaskUpdate::start(Local::now()), scope)?;
            for &touched in &ids {
                session.log(touched, TimelineEventType::Started, Some(TaskState::Todo));
            }
            Ok(ids)
        })
    }

    pub fn add_subtask(
        &mut self,
        date: NaiveDate,
        parent_id: Uuid,
        title: &str,
        scope: Option<EditScope>,
    ) -> CoreResult<Vec<Uuid>> {
        self.transact(ActionKind::AddSubtask, |session| {
            let ids = match session.recurring_target(date, parent_id) {
                Some(target) => {
                    let today = session.today();
                    recurrence::add_subtask(
                        &mut session.tasks,
                        &target,
                        scope.unwrap_or_default(),
                        title,
                        today,
                    )?
                }
                None => vec![session.tasks.add_subtask(parent_id, title)?],
            };
            for &added in &ids {
                session.log(added, TimelineEventType::Created, None);
            }
            Ok(ids)
        })
    }

    /// Delete a task (or occurrences of a series) along with the timeline
    /// events of everything removed. Unknown ids are a no-op.
    pub fn delete(&mut self, date: NaiveDate, id: Uuid, scope: Option<EditScope>) -> CoreResult<Vec<Uuid>> {
        self.transact(ActionKind::Delete, |session| {
            let removed = match session.recurring_target(date, id) {
                Some(target) => {
                    let today = session.today();
                    recurrence::delete(
                        &mut session.tasks,
                        &target,
                        scope.unwrap_or_default(),
                        today,
                    )?
                }
                None => session.tasks.delete_task(id),
            };

            let ids: Vec<Uuid> = removed.iter().flat_map(tree::subtree_ids).collect();
            for &gone in &ids {
                session.timeline.remove_by_task_id(gone);
            }
            Ok(ids)
        })
    }

    pub fn set_recurrence(&mut self, id: Uuid, pattern: Option<RecurrencePattern>) -> CoreResult<()> {
        self.transact(ActionKind::SetRecurrence, |session| {
            session.tasks.set_recurrence(id, pattern)
        })
    }

    pub fn exclude(&mut self, template_id: Uuid, date: NaiveDate) -> CoreResult<bool> {
        self.transact(ActionKind::Exclude, |session| {
            session.tasks.exclude_instance(template_id, date)
        })
    }

    /// Restore tasks and timeline to the state before the last action
    pub fn undo(&mut self) -> Option<ActionKind> {
        let entry = self.undo.pop()?;
        self.tasks = entry.previous_tasks;
        self.timeline = entry.previous_timeline;
        self.needs_save = true;
        tracing::info!("undid {}", entry.action.name());
        Some(entry.action)
    }
}
