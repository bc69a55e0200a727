//! Pure helpers over a slice of task trees. Nothing here owns state; the
//! forest passes its per-date vectors in.

use super::enums::TaskState;
use super::task::{Task, TaskUpdate};
use serde::Serialize;
use uuid::Uuid;

/// Completion summary over a flattened set of tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
}

impl TaskStats {
    pub fn from_counts(total: usize, completed: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            total,
            completed,
            percentage,
        }
    }

    /// Sum two summaries and recompute the percentage
    pub fn merge(self, other: TaskStats) -> Self {
        Self::from_counts(self.total + other.total, self.completed + other.completed)
    }
}

/// Depth-first search, parent before children
pub fn find(tasks: &[Task], id: Uuid) -> Option<&Task> {
    for task in tasks {
        if task.id == id {
            return Some(task);
        }
        if let Some(found) = find(&task.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut(tasks: &mut [Task], id: Uuid) -> Option<&mut Task> {
    for task in tasks.iter_mut() {
        if task.id == id {
            return Some(task);
        }
        if let Some(found) = find_mut(&mut task.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn contains(tasks: &[Task], id: Uuid) -> bool {
    find(tasks, id).is_some()
}

/// The root task whose subtree holds `id`
pub fn root_of(tasks: &[Task], id: Uuid) -> Option<&Task> {
    tasks.iter().find(|root| root.id == id || contains(&root.children, id))
}

/// First task in pre-order with exactly this title
pub fn find_by_title<'a>(tasks: &'a [Task], title: &str) -> Option<&'a Task> {
    flatten(tasks).into_iter().find(|task| task.title == title)
}

/// Merge `update` into the matching task and refresh its `updated_at`.
/// Returns false if `id` is absent.
pub fn update(tasks: &mut [Task], id: Uuid, update: &TaskUpdate) -> bool {
    match find_mut(tasks, id) {
        Some(task) => {
            update.apply_to(task);
            true
        }
        None => false,
    }
}

/// Remove every node with `id` together with its subtree.
/// Returns the removed subtrees (empty when nothing matched).
pub fn delete(tasks: &mut Vec<Task>, id: Uuid) -> Vec<Task> {
    let mut removed = Vec::new();
    let mut index = 0;
    while index < tasks.len() {
        if tasks[index].id == id {
            removed.push(tasks.remove(index));
        } else {
            removed.extend(delete(&mut tasks[index].children, id));
            index += 1;
        }
    }
    removed
}

/// Append `task` to the children of `parent_id`. Hands the task back if the
/// parent does not exist.
pub fn add_subtask(tasks: &mut [Task], parent_id: Uuid, mut task: Task) -> Result<(), Task> {
    match find_mut(tasks, parent_id) {
        Some(parent) => {
            task.parent_id = Some(parent_id);
            parent.children.push(task);
            Ok(())
        }
        None => Err(task),
    }
}

/// Pre-order traversal, parent before children
pub fn flatten(tasks: &[Task]) -> Vec<&Task> {
    let mut result = Vec::new();
    collect(tasks, &mut result);
    result
}

fn collect<'a>(tasks: &'a [Task], out: &mut Vec<&'a Task>) {
    for task in tasks {
        out.push(task);
        collect(&task.children, out);
    }
}

/// Ids of a task and all of its descendants, pre-order
pub fn subtree_ids(task: &Task) -> Vec<Uuid> {
    flatten(std::slice::from_ref(task))
        .into_iter()
        .map(|t| t.id)
        .collect()
}

pub fn stats(tasks: &[Task]) -> TaskStats {
    let flat = flatten(tasks);
    let completed = flat
        .iter()
        .filter(|task| task.state == TaskState::Completed)
        .count();
    TaskStats::from_counts(flat.len(), completed)
}
