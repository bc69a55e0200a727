//! Recurring tasks: which dates a template occurs on, the ephemeral
//! occurrences shown for a date, and how edits to an occurrence fan out
//! to the rest of the series.
//!
//! Occurrences are computed on read and only written into the forest
//! ("materialized") when something about them changes.

use super::enums::{EditScope, Frequency, TaskState};
use super::forest::TaskForest;
use super::task::{validate_title, Task, TaskUpdate};
use super::tree;
use crate::error::{CoreError, CoreResult};
use chrono::{Datelike, Local, NaiveDate};
use uuid::Uuid;

/// The recurring series an edited task belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringTarget {
    pub template_id: Uuid,
    /// Date of the occurrence the user acted on
    pub date: NaiveDate,
    /// Title of the targeted subtask, `None` when the occurrence itself is targeted.
    /// Subtask ids differ between occurrences, so the title is what links them.
    pub subtask_title: Option<String>,
}

/// Whether `template` has an occurrence on `target`
pub fn is_due(template: &Task, target: NaiveDate) -> bool {
    let Some(pattern) = &template.recurrence else {
        return false;
    };
    if pattern.is_excluded(target) || target < template.date {
        return false;
    }
    if let Some(end) = pattern.end_date {
        if target > end {
            return false;
        }
    }

    match pattern.frequency {
        Frequency::Daily => true,
        Frequency::Weekly => {
            if pattern.days_of_week.is_empty() {
                target.weekday() == template.date.weekday()
            } else {
                pattern.days_of_week.contains(&target.weekday())
            }
        }
        Frequency::MonthlyByWeekday => {
            target.weekday() == template.date.weekday()
                && week_of_month(target) == week_of_month(template.date)
        }
    }
}

/// 0 for days 1-7, 1 for days 8-14, ...
fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7
}

/// Stable id of the unmaterialized occurrence of `template_id` on `date`
pub fn occurrence_id(template_id: Uuid, date: NaiveDate) -> Uuid {
    Uuid::new_v5(&template_id, date.to_string().as_bytes())
}

/// Build the unpersisted occurrence of `template` on `target`.
///
/// The result depends only on its inputs: ids are derived from the template
/// id and date, and timestamps are copied from the template.
pub fn generate_instance(template: &Task, target: NaiveDate) -> Task {
    let id = occurrence_id(template.id, target);
    Task {
        id,
        title: template.title.clone(),
        state: TaskState::Todo,
        created_at: template.created_at,
        updated_at: template.updated_at,
        start_time: None,
        end_time: None,
        children: template
            .children
            .iter()
            .enumerate()
            .map(|(index, child)| instance_child(child, id, target, index))
            .collect(),
        parent_id: None,
        date: target,
        recurrence: None,
        is_recurring_instance: true,
        recurring_parent_id: Some(template.id),
    }
}

fn instance_child(source: &Task, parent_id: Uuid, date: NaiveDate, index: usize) -> Task {
    let id = Uuid::new_v5(&parent_id, index.to_string().as_bytes());
    Task {
        id,
        title: source.title.clone(),
        state: TaskState::Todo,
        created_at: source.created_at,
        updated_at: source.updated_at,
        start_time: None,
        end_time: None,
        children: source
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| instance_child(child, id, date, i))
            .collect(),
        parent_id: Some(parent_id),
        date,
        recurrence: None,
        is_recurring_instance: false,
        recurring_parent_id: None,
    }
}

/// Occurrences due on `date` that have not been materialized yet.
///
/// Scans every template on every date. The template's own date is skipped:
/// the template is that day's occurrence.
pub fn ephemeral_instances(forest: &TaskForest, date: NaiveDate) -> Vec<Task> {
    forest
        .templates()
        .filter(|template| template.date != date)
        .filter(|template| is_due(template, date))
        .filter(|template| forest.instance_for(template.id, date).is_none())
        .map(|template| generate_instance(template, date))
        .collect()
}

/// What a day shows: persisted roots in insertion order, then ephemeral
/// occurrences. A template whose own date was excluded is hidden.
pub fn visible_tasks(forest: &TaskForest, date: NaiveDate) -> Vec<Task> {
    let mut tasks: Vec<Task> = forest
        .tasks_for_date(date)
        .iter()
        .filter(|task| {
            !task
                .recurrence
                .as_ref()
                .is_some_and(|pattern| pattern.is_excluded(task.date))
        })
        .cloned()
        .collect();
    tasks.extend(ephemeral_instances(forest, date));
    tasks
}

/// Find the series `task_id` belongs to, looking at persisted tasks first
/// and then at the ephemeral occurrences of `date`. `None` means the task
/// has no recurring ancestor and plain store operations apply.
pub fn resolve_target(forest: &TaskForest, date: NaiveDate, task_id: Uuid) -> Option<RecurringTarget> {
    if let Some(root) = forest.root_of(task_id) {
        return target_for_root(forest, root, task_id);
    }
    ephemeral_instances(forest, date)
        .iter()
        .filter(|instance| tree::contains(std::slice::from_ref(*instance), task_id))
        .find_map(|instance| target_for_root(forest, instance, task_id))
}

fn target_for_root(forest: &TaskForest, root: &Task, task_id: Uuid) -> Option<RecurringTarget> {
    let template_id = if root.is_template() {
        root.id
    } else if root.is_recurring_instance {
        let id = root.recurring_parent_id?;
        // An occurrence whose series was deleted behaves like a plain task
        forest.get(id).filter(|template| template.is_template())?;
        id
    } else {
        return None;
    };

    let subtask_title = if root.id == task_id {
        None
    } else {
        Some(tree::find(&root.children, task_id)?.title.clone())
    };

    Some(RecurringTarget {
        template_id,
        date: root.date,
        subtask_title,
    })
}

fn lookup_template(forest: &TaskForest, template_id: Uuid) -> CoreResult<&Task> {
    let task = forest
        .get(template_id)
        .ok_or(CoreError::TaskNotFound(template_id))?;
    if !task.is_template() {
        return Err(CoreError::NotRecurring(template_id));
    }
    Ok(task)
}

/// Persist the occurrence of `template_id` on `date` and return its id.
/// Already-persisted occurrences are returned as they are.
///
/// On its own date the template stands in for the first occurrence. Acting
/// on that occurrence alone splits it off: the copy keeps the template's
/// current state and subtasks, and the date is excluded on the template so
/// later edits to the copy stay out of the series.
pub fn materialize(forest: &mut TaskForest, template_id: Uuid, date: NaiveDate) -> CoreResult<Uuid> {
    let template = lookup_template(forest, template_id)?;
    if let Some(existing) = forest.instance_for(template_id, date) {
        return Ok(existing.id);
    }
    if !is_due(template, date) {
        return Err(CoreError::validation(format!(
            "\"{}\" does not occur on {}",
            template.title, date
        )));
    }

    let first_occurrence = date == template.date;
    let mut instance = if first_occurrence {
        let mut first = template.clone();
        first.recurrence = None;
        first.is_recurring_instance = true;
        first.recurring_parent_id = Some(template_id);
        first
    } else {
        generate_instance(template, date)
    };
    stamp_fresh(&mut instance, None, Local::now());
    let id = instance.id;
    if first_occurrence {
        forest.exclude_instance(template_id, date)?;
    }
    tracing::debug!("materialized {} of template {} as {}", date, template_id, id);
    forest.insert(instance);
    Ok(id)
}

/// Give a materialized subtree its own ids and timestamps
fn stamp_fresh(task: &mut Task, parent_id: Option<Uuid>, now: chrono::DateTime<Local>) {
    task.id = Uuid::new_v4();
    task.parent_id = parent_id;
    task.created_at = now;
    task.updated_at = now;
    let id = task.id;
    for child in &mut task.children {
        stamp_fresh(child, Some(id), now);
    }
}

/// The occurrence as it is now, persisted or not
fn occurrence_preview(forest: &TaskForest, target: &RecurringTarget) -> CoreResult<Task> {
    let template = lookup_template(forest, target.template_id)?;
    if let Some(existing) = forest.instance_for(target.template_id, target.date) {
        return Ok(existing.clone());
    }
    if target.date == template.date {
        return Ok(template.clone());
    }
    Ok(generate_instance(template, target.date))
}

fn target_node<'a>(root: &'a Task, subtask_title: Option<&str>) -> Option<&'a Task> {
    match subtask_title {
        None => Some(root),
        Some(title) => tree::find_by_title(&root.children, title),
    }
}

fn node_id(forest: &TaskForest, root_id: Uuid, subtask_title: Option<&str>) -> Option<Uuid> {
    forest
        .get(root_id)
        .and_then(|root| target_node(root, subtask_title))
        .map(|node| node.id)
}

/// Template plus the materialized occurrences a series-wide scope reaches
fn series_roots(
    forest: &TaskForest,
    template_id: Uuid,
    scope: EditScope,
    today: NaiveDate,
) -> CoreResult<Vec<Uuid>> {
    lookup_template(forest, template_id)?;
    let mut roots = vec![template_id];
    roots.extend(
        forest
            .instances_of(template_id)
            .filter(|instance| scope != EditScope::FromToday || instance.date >= today)
            .map(|instance| instance.id),
    );
    Ok(roots)
}

/// Root ids an edit reaches, materializing the occurrence for `This`
fn scoped_roots(
    forest: &mut TaskForest,
    target: &RecurringTarget,
    scope: EditScope,
    today: NaiveDate,
) -> CoreResult<Vec<Uuid>> {
    match scope {
        EditScope::This => Ok(vec![materialize(forest, target.template_id, target.date)?]),
        EditScope::All | EditScope::FromToday => {
            series_roots(forest, target.template_id, scope, today)
        }
    }
}

/// Apply `update` to the targeted task across `scope`. Everything is
/// validated before anything is written. Returns the ids that changed.
pub fn apply_update(
    forest: &mut TaskForest,
    target: &RecurringTarget,
    scope: EditScope,
    update: &TaskUpdate,
    today: NaiveDate,
) -> CoreResult<Vec<Uuid>> {
    let title = target.subtask_title.as_deref();

    match scope {
        EditScope::This => {
            let preview = occurrence_preview(forest, target)?;
            let node = target_node(&preview, title).ok_or(CoreError::TaskNotFound(preview.id))?;
            update.validate(node)?;
        }
        EditScope::All | EditScope::FromToday => {
            for root_id in series_roots(forest, target.template_id, scope, today)? {
                if let Some(node) = forest.get(root_id).and_then(|root| target_node(root, title)) {
                    update.validate(node)?;
                }
            }
        }
    }

    let mut touched = Vec::new();
    for root_id in scoped_roots(forest, target, scope, today)? {
        let Some(id) = node_id(forest, root_id, title) else {
            continue;
        };
        forest.update_task(id, update)?;
        touched.push(id);
    }
    tracing::debug!(
        "{:?} edit on series {} touched {} task(s)",
        scope,
        target.template_id,
        touched.len()
    );
    Ok(touched)
}

/// Add a subtask under the targeted task across `scope`. Returns the new ids.
pub fn add_subtask(
    forest: &mut TaskForest,
    target: &RecurringTarget,
    scope: EditScope,
    title: &str,
    today: NaiveDate,
) -> CoreResult<Vec<Uuid>> {
    let title = validate_title(title)?;
    let parent_title = target.subtask_title.as_deref();

    let mut added = Vec::new();
    for root_id in scoped_roots(forest, target, scope, today)? {
        let Some(parent_id) = node_id(forest, root_id, parent_title) else {
            continue;
        };
        added.push(forest.add_subtask(parent_id, &title)?);
    }
    Ok(added)
}

/// Delete the targeted task across `scope` and return the removed subtrees.
///
/// Deleting one occurrence excludes its date from the template and drops the
/// persisted copy if there is one. Deleting the series removes the template
/// and the occurrences the scope reaches.
pub fn delete(
    forest: &mut TaskForest,
    target: &RecurringTarget,
    scope: EditScope,
    today: NaiveDate,
) -> CoreResult<Vec<Task>> {
    let template_id = target.template_id;
    let mut removed = Vec::new();

    match (target.subtask_title.as_deref(), scope) {
        (None, EditScope::This) => {
            lookup_template(forest, template_id)?;
            forest.exclude_instance(template_id, target.date)?;
            if let Some(id) = forest.instance_for(template_id, target.date).map(|t| t.id) {
                removed.extend(forest.delete_task(id));
            }
        }
        (None, EditScope::All | EditScope::FromToday) => {
            for id in series_roots(forest, template_id, scope, today)? {
                removed.extend(forest.delete_task(id));
            }
        }
        (Some(title), scope) => {
            for root_id in scoped_roots(forest, target, scope, today)? {
                if let Some(id) = node_id(forest, root_id, Some(title)) {
                    removed.extend(forest.delete_task(id));
                }
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::RecurrencePattern;
    use chrono::{Duration, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(title: &str, start: NaiveDate, pattern: RecurrencePattern) -> Task {
        let mut task = Task::new(title, start, TaskState::Todo).unwrap();
        task.recurrence = Some(pattern);
        task
    }

    /// Daily "Standup" from 2024-01-01 with one subtask "Notes"
    fn standup_forest() -> (TaskForest, Uuid) {
        let mut forest = TaskForest::new();
        let standup = template("Standup", date(2024, 1, 1), RecurrencePattern::daily());
        let id = standup.id;
        forest.insert(standup);
        forest.add_subtask(id, "Notes").unwrap();
        (forest, id)
    }

    fn root_target(template_id: Uuid, day: NaiveDate) -> RecurringTarget {
        RecurringTarget {
            template_id,
            date: day,
            subtask_title: None,
        }
    }

    #[test]
    fn test_weekly_monday() {
        // 2024-01-01 is a Monday
        let start = date(2024, 1, 1);
        let end = date(2024, 3, 25);
        let task = template(
            "Review",
            start,
            RecurrencePattern::weekly([Weekday::Mon]).until(end),
        );

        let mut day = start;
        while day <= end + Duration::days(14) {
            let expected = day.weekday() == Weekday::Mon && day <= end;
            assert_eq!(is_due(&task, day), expected, "{}", day);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_weekly_exclusion_hits_exactly_one_date() {
        let mut task = template("Review", date(2024, 1, 1), RecurrencePattern::weekly([Weekday::Mon]));
        task.recurrence.as_mut().unwrap().exclude(date(2024, 1, 15));
        assert!(is_due(&task, date(2024, 1, 8)));
        assert!(!is_due(&task, date(2024, 1, 15)));
        assert!(is_due(&task, date(2024, 1, 22)));
    }

    #[test]
    fn test_weekly_without_days_uses_template_weekday() {
        let task = template("Chores", date(2024, 1, 3), RecurrencePattern::weekly([]));
        assert!(is_due(&task, date(2024, 1, 10)));
        assert!(!is_due(&task, date(2024, 1, 11)));
    }

    #[test]
    fn test_daily_exclusion_scenario() {
        let mut task = template("Stretch", date(2024, 1, 1), RecurrencePattern::daily());
        assert!(is_due(&task, date(2024, 3, 15)));
        task.recurrence.as_mut().unwrap().exclude(date(2024, 3, 15));
        assert!(!is_due(&task, date(2024, 3, 15)));
        assert!(is_due(&task, date(2024, 3, 16)));
    }

    #[test]
    fn test_not_due_before_start() {
        let task = template("Stretch", date(2024, 1, 10), RecurrencePattern::daily());
        assert!(!is_due(&task, date(2024, 1, 9)));
        assert!(is_due(&task, date(2024, 1, 10)));
    }

    #[test]
    fn test_plain_task_never_due() {
        let task = Task::new("Once", date(2024, 1, 1), TaskState::Todo).unwrap();
        assert!(!is_due(&task, date(2024, 1, 1)));
    }

    #[test]
    fn test_monthly_by_weekday() {
        // Second Tuesday of January 2024
        let task = template("Book club", date(2024, 1, 9), RecurrencePattern::monthly_by_weekday());
        assert!(is_due(&task, date(2024, 2, 13)));
        assert!(is_due(&task, date(2024, 3, 12)));
        assert!(!is_due(&task, date(2024, 2, 6)));
        assert!(!is_due(&task, date(2024, 2, 14)));
    }

    #[test]
    fn test_generate_instance_is_deterministic() {
        let (forest, id) = standup_forest();
        let standup = forest.get(id).unwrap();
        let a = generate_instance(standup, date(2024, 1, 5));
        let b = generate_instance(standup, date(2024, 1, 5));
        assert_eq!(a, b);

        assert_ne!(a.id, standup.id);
        assert_eq!(a.date, date(2024, 1, 5));
        assert_eq!(a.state, TaskState::Todo);
        assert!(a.is_recurring_instance);
        assert_eq!(a.recurring_parent_id, Some(id));
        assert!(a.recurrence.is_none());
        assert_eq!(a.children.len(), 1);
        assert_ne!(a.children[0].id, standup.children[0].id);
        assert_eq!(a.children[0].parent_id, Some(a.id));
        assert!(a.children[0].recurring_parent_id.is_none());
    }

    #[test]
    fn test_ephemeral_listing_skips_template_day_and_materialized() {
        let (mut forest, id) = standup_forest();
        assert!(ephemeral_instances(&forest, date(2024, 1, 1)).is_empty());
        assert_eq!(ephemeral_instances(&forest, date(2024, 1, 2)).len(), 1);

        materialize(&mut forest, id, date(2024, 1, 2)).unwrap();
        assert!(ephemeral_instances(&forest, date(2024, 1, 2)).is_empty());
        assert_eq!(visible_tasks(&forest, date(2024, 1, 2)).len(), 1);
    }

    #[test]
    fn test_visible_tasks_hides_excluded_template_day() {
        let (mut forest, id) = standup_forest();
        assert_eq!(visible_tasks(&forest, date(2024, 1, 1)).len(), 1);
        forest.exclude_instance(id, date(2024, 1, 1)).unwrap();
        assert!(visible_tasks(&forest, date(2024, 1, 1)).is_empty());
        assert_eq!(visible_tasks(&forest, date(2024, 1, 2)).len(), 1);
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let (mut forest, id) = standup_forest();
        let day = date(2024, 1, 3);
        let first = materialize(&mut forest, id, day).unwrap();
        let second = materialize(&mut forest, id, day).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, occurrence_id(id, day));
        assert_eq!(forest.tasks_for_date(day).len(), 1);
    }

    #[test]
    fn test_materialize_template_day_splits_off_copy() {
        let (mut forest, id) = standup_forest();
        let day = date(2024, 1, 1);
        forest.change_state(id, TaskState::Delayed).unwrap();

        let first = materialize(&mut forest, id, day).unwrap();
        assert_ne!(first, id);
        assert_eq!(materialize(&mut forest, id, day).unwrap(), first);

        let copy = forest.get(first).unwrap();
        assert_eq!(copy.recurring_parent_id, Some(id));
        assert_eq!(copy.state, TaskState::Delayed);
        assert_eq!(copy.children[0].title, "Notes");
        assert_ne!(copy.children[0].id, forest.get(id).unwrap().children[0].id);

        let shown: Vec<Uuid> = visible_tasks(&forest, day).iter().map(|t| t.id).collect();
        assert_eq!(shown, vec![first]);
        assert_eq!(ephemeral_instances(&forest, date(2024, 1, 2)).len(), 1);
    }

    #[test]
    fn test_scope_this_on_template_day_stays_local() {
        let (mut forest, id) = standup_forest();
        let day = date(2024, 1, 1);
        let target = root_target(id, day);

        apply_update(&mut forest, &target, EditScope::This, &TaskUpdate::title("Renamed once"), day)
            .unwrap();
        add_subtask(&mut forest, &target, EditScope::This, "Only today", day).unwrap();
        let notes = RecurringTarget {
            subtask_title: Some("Notes".to_string()),
            ..target.clone()
        };
        delete(&mut forest, &notes, EditScope::This, day).unwrap();

        let copy = forest.instance_for(id, day).unwrap();
        assert_eq!(copy.title, "Renamed once");
        let titles: Vec<&str> = copy.children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Only today"]);

        let standup = forest.get(id).unwrap();
        assert_eq!(standup.title, "Standup");
        assert_eq!(standup.children.len(), 1);
        let later = &ephemeral_instances(&forest, date(2024, 1, 5))[0];
        assert_eq!(later.title, "Standup");
        assert_eq!(later.children[0].title, "Notes");
        assert_eq!(later.children.len(), 1);
    }

    #[test]
    fn test_delete_this_on_template_day_after_split() {
        let (mut forest, id) = standup_forest();
        let day = date(2024, 1, 1);
        let copy = materialize(&mut forest, id, day).unwrap();

        let removed = delete(&mut forest, &root_target(id, day), EditScope::This, day).unwrap();
        assert_eq!(removed[0].id, copy);
        assert!(visible_tasks(&forest, day).is_empty());
        assert!(forest.get(id).is_some());
        assert_eq!(visible_tasks(&forest, date(2024, 1, 2)).len(), 1);
    }

    #[test]
    fn test_materialize_rejects_dates_without_occurrence() {
        let (mut forest, id) = standup_forest();
        assert!(matches!(
            materialize(&mut forest, id, date(2023, 12, 31)),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_resolve_target_for_ephemeral_subtask() {
        let (forest, id) = standup_forest();
        let day = date(2024, 1, 4);
        let instances = ephemeral_instances(&forest, day);
        let instance = &instances[0];

        let root = resolve_target(&forest, day, instance.id).unwrap();
        assert_eq!(root, root_target(id, day));

        let sub = resolve_target(&forest, day, instance.children[0].id).unwrap();
        assert_eq!(sub.subtask_title.as_deref(), Some("Notes"));

        let plain = Task::new("Plain", day, TaskState::Todo).unwrap();
        let plain_id = plain.id;
        let mut forest = forest;
        forest.insert(plain);
        assert!(resolve_target(&forest, day, plain_id).is_none());
    }

    #[test]
    fn test_scope_this_touches_one_occurrence() {
        let (mut forest, id) = standup_forest();
        let day = date(2024, 1, 5);
        let touched = apply_update(
            &mut forest,
            &root_target(id, day),
            EditScope::This,
            &TaskUpdate::state(TaskState::Completed),
            date(2024, 1, 5),
        )
        .unwrap();

        assert_eq!(touched.len(), 1);
        let instance = forest.instance_for(id, day).unwrap();
        assert_eq!(instance.state, TaskState::Completed);
        assert_eq!(forest.get(id).unwrap().state, TaskState::Todo);
        assert_eq!(ephemeral_instances(&forest, date(2024, 1, 6))[0].state, TaskState::Todo);
    }

    #[test]
    fn test_scope_all_and_from_today() {
        let (mut forest, id) = standup_forest();
        let past = materialize(&mut forest, id, date(2024, 1, 2)).unwrap();
        let future = materialize(&mut forest, id, date(2024, 1, 20)).unwrap();
        let today = date(2024, 1, 10);

        apply_update(
            &mut forest,
            &root_target(id, date(2024, 1, 20)),
            EditScope::FromToday,
            &TaskUpdate::title("Daily sync"),
            today,
        )
        .unwrap();
        assert_eq!(forest.get(id).unwrap().title, "Daily sync");
        assert_eq!(forest.get(future).unwrap().title, "Daily sync");
        assert_eq!(forest.get(past).unwrap().title, "Standup");

        apply_update(
            &mut forest,
            &root_target(id, date(2024, 1, 20)),
            EditScope::All,
            &TaskUpdate::title("Team sync"),
            today,
        )
        .unwrap();
        assert_eq!(forest.get(past).unwrap().title, "Team sync");
        assert_eq!(ephemeral_instances(&forest, date(2024, 1, 30))[0].title, "Team sync");
    }

    #[test]
    fn test_invalid_scoped_edit_changes_nothing() {
        let (mut forest, id) = standup_forest();
        let before = forest.clone();
        let result = apply_update(
            &mut forest,
            &root_target(id, date(2024, 1, 7)),
            EditScope::This,
            &TaskUpdate::title(""),
            date(2024, 1, 7),
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(forest, before);
    }

    #[test]
    fn test_subtask_edit_correlates_by_title() {
        let (mut forest, id) = standup_forest();
        let instance = materialize(&mut forest, id, date(2024, 1, 3)).unwrap();
        let target = RecurringTarget {
            template_id: id,
            date: date(2024, 1, 3),
            subtask_title: Some("Notes".to_string()),
        };

        let touched = apply_update(
            &mut forest,
            &target,
            EditScope::All,
            &TaskUpdate::title("Minutes"),
            date(2024, 1, 1),
        )
        .unwrap();
        assert_eq!(touched.len(), 2);
        assert_eq!(forest.get(id).unwrap().children[0].title, "Minutes");
        assert_eq!(forest.get(instance).unwrap().children[0].title, "Minutes");
    }

    #[test]
    fn test_scoped_add_subtask() {
        let (mut forest, id) = standup_forest();
        let instance = materialize(&mut forest, id, date(2024, 1, 3)).unwrap();

        let added = add_subtask(
            &mut forest,
            &root_target(id, date(2024, 1, 8)),
            EditScope::This,
            "Blockers",
            date(2024, 1, 1),
        )
        .unwrap();
        assert_eq!(added.len(), 1);
        let materialized = forest.instance_for(id, date(2024, 1, 8)).unwrap();
        assert_eq!(materialized.children.len(), 2);
        assert_eq!(forest.get(id).unwrap().children.len(), 1);

        let added = add_subtask(
            &mut forest,
            &root_target(id, date(2024, 1, 3)),
            EditScope::All,
            "Demo",
            date(2024, 1, 1),
        )
        .unwrap();
        assert_eq!(added.len(), 3);
        assert_eq!(forest.get(instance).unwrap().children.last().unwrap().title, "Demo");
    }

    #[test]
    fn test_delete_this_excludes_date() {
        let (mut forest, id) = standup_forest();
        let day = date(2024, 1, 9);
        materialize(&mut forest, id, day).unwrap();

        let removed = delete(&mut forest, &root_target(id, day), EditScope::This, day).unwrap();
        assert_eq!(removed.len(), 1);
        assert!(forest.instance_for(id, day).is_none());
        assert!(!is_due(forest.get(id).unwrap(), day));
        assert!(visible_tasks(&forest, day).is_empty());
        assert_eq!(visible_tasks(&forest, date(2024, 1, 10)).len(), 1);
    }

    #[test]
    fn test_delete_ephemeral_this_removes_nothing_persisted() {
        let (mut forest, id) = standup_forest();
        let day = date(2024, 2, 1);
        let removed = delete(&mut forest, &root_target(id, day), EditScope::This, day).unwrap();
        assert!(removed.is_empty());
        assert!(forest.get(id).unwrap().recurrence.as_ref().unwrap().is_excluded(day));
    }

    #[test]
    fn test_delete_series_from_today() {
        let (mut forest, id) = standup_forest();
        let past = materialize(&mut forest, id, date(2024, 1, 2)).unwrap();
        let future = materialize(&mut forest, id, date(2024, 1, 20)).unwrap();

        let removed = delete(
            &mut forest,
            &root_target(id, date(2024, 1, 20)),
            EditScope::FromToday,
            date(2024, 1, 10),
        )
        .unwrap();
        assert_eq!(removed.len(), 2);
        assert!(forest.get(id).is_none());
        assert!(forest.get(future).is_none());
        assert!(forest.get(past).is_some());
        // The survivor no longer belongs to a series
        assert!(resolve_target(&forest, date(2024, 1, 2), past).is_none());
    }

    #[test]
    fn test_delete_series_all() {
        let (mut forest, id) = standup_forest();
        materialize(&mut forest, id, date(2024, 1, 2)).unwrap();
        delete(&mut forest, &root_target(id, date(2024, 1, 2)), EditScope::All, date(2024, 1, 10))
            .unwrap();
        assert!(forest.is_empty());
        assert!(ephemeral_instances(&forest, date(2024, 1, 3)).is_empty());
    }

    #[test]
    fn test_delete_subtask_this_materializes() {
        let (mut forest, id) = standup_forest();
        let day = date(2024, 1, 12);
        let target = RecurringTarget {
            template_id: id,
            date: day,
            subtask_title: Some("Notes".to_string()),
        };
        let removed = delete(&mut forest, &target, EditScope::This, day).unwrap();
        assert_eq!(removed.len(), 1);
        assert!(forest.instance_for(id, day).unwrap().children.is_empty());
        assert_eq!(forest.get(id).unwrap().children.len(), 1);
    }
}
