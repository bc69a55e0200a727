use super::enums::{TaskState, TimelineEventType};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One entry of the activity timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: Uuid,
    pub task_id: Uuid,
    /// Title at the time of the event; later renames do not touch it
    pub task_title: String,
    #[serde(rename = "type")]
    pub event_type: TimelineEventType,
    pub timestamp: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<TaskState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_state: Option<TaskState>,
}

impl TimelineEvent {
    /// New event stamped now
    pub fn new(task_id: Uuid, task_title: &str, event_type: TimelineEventType) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            task_title: task_title.to_string(),
            event_type,
            timestamp: Local::now(),
            previous_state: None,
            new_state: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_states(mut self, previous: TaskState, new: TaskState) -> Self {
        self.previous_state = Some(previous);
        self.new_state = Some(new);
        self
    }

    /// Bucket this event files under: the local date of its own timestamp
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// "09:05 AM - Completed: Buy milk (todo -> completed)"
    pub fn describe(&self) -> String {
        let state_info = match (self.previous_state, self.new_state) {
            (Some(prev), Some(new)) => format!(" ({} -> {})", prev.to_tag(), new.to_tag()),
            (None, Some(new)) => format!(" (-> {})", new.to_tag()),
            _ => String::new(),
        };
        format!(
            "{} - {}: {}{}",
            self.timestamp.format("%I:%M %p"),
            self.event_type.label(),
            self.task_title,
            state_info
        )
    }
}

/// Activity events bucketed by the date they happened on.
///
/// Buckets keep append order; sorting by timestamp happens on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimelineLog {
    days: BTreeMap<NaiveDate, Vec<TimelineEvent>>,
}

impl TimelineLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(|events| events.is_empty())
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Append under the event's own date
    pub fn add(&mut self, event: TimelineEvent) {
        self.days.entry(event.date()).or_default().push(event);
    }

    /// Events of one date in append order
    pub fn bucket(&self, date: NaiveDate) -> &[TimelineEvent] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Events of one date ordered by timestamp
    pub fn events_for_date(&self, date: NaiveDate) -> Vec<&TimelineEvent> {
        let mut events: Vec<&TimelineEvent> = self.bucket(date).iter().collect();
        events.sort_by_key(|event| event.timestamp);
        events
    }

    pub fn events_for_task(&self, task_id: Uuid) -> impl Iterator<Item = &TimelineEvent> {
        self.days
            .values()
            .flatten()
            .filter(move |event| event.task_id == task_id)
    }

    /// Drop every event of `task_id`; buckets left empty disappear.
    /// Returns how many events were removed.
    pub fn remove_by_task_id(&mut self, task_id: Uuid) -> usize {
        let before = self.len();
        for events in self.days.values_mut() {
            events.retain(|event| event.task_id != task_id);
        }
        self.days.retain(|_, events| !events.is_empty());
        before - self.len()
    }

    /// Remove the single most recent `event_type` event of `task_id`,
    /// scanning the newest date first. Older events stay.
    pub fn remove_last_by_type(
        &mut self,
        task_id: Uuid,
        event_type: TimelineEventType,
    ) -> Option<TimelineEvent> {
        let mut found = None;
        for (date, events) in self.days.iter_mut().rev() {
            if let Some(index) = events
                .iter()
                .rposition(|event| event.task_id == task_id && event.event_type == event_type)
            {
                found = Some((*date, events.remove(index)));
                break;
            }
        }

        let (date, removed) = found?;
        if self.days.get(&date).is_some_and(Vec::is_empty) {
            self.days.remove(&date);
        }
        Some(removed)
    }

    /// Remove a whole date's events
    pub fn clear_date(&mut self, date: NaiveDate) -> Vec<TimelineEvent> {
        self.days.remove(&date).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_files_under_event_date() {
        let mut log = TimelineLog::new();
        let task = Uuid::new_v4();
        // Logged late on the 1st for a task dated the 2nd
        log.add(TimelineEvent::new(task, "Prep", TimelineEventType::Created).at(at(2024, 1, 1, 23, 0)));
        assert_eq!(log.bucket(date(2024, 1, 1)).len(), 1);
        assert!(log.bucket(date(2024, 1, 2)).is_empty());
    }

    #[test]
    fn test_events_for_date_sorted_on_read() {
        let mut log = TimelineLog::new();
        let task = Uuid::new_v4();
        log.add(TimelineEvent::new(task, "B", TimelineEventType::Updated).at(at(2024, 1, 1, 15, 0)));
        log.add(TimelineEvent::new(task, "A", TimelineEventType::Created).at(at(2024, 1, 1, 9, 0)));

        assert_eq!(log.bucket(date(2024, 1, 1))[0].task_title, "B");
        let sorted = log.events_for_date(date(2024, 1, 1));
        assert_eq!(sorted[0].task_title, "A");
        assert_eq!(sorted[1].task_title, "B");
    }

    #[test]
    fn test_remove_by_task_id_drops_empty_buckets() {
        let mut log = TimelineLog::new();
        let gone = Uuid::new_v4();
        let kept = Uuid::new_v4();
        log.add(TimelineEvent::new(gone, "Gone", TimelineEventType::Created).at(at(2024, 1, 1, 9, 0)));
        log.add(TimelineEvent::new(gone, "Gone", TimelineEventType::Started).at(at(2024, 1, 2, 9, 0)));
        log.add(TimelineEvent::new(kept, "Kept", TimelineEventType::Created).at(at(2024, 1, 2, 10, 0)));

        assert_eq!(log.remove_by_task_id(gone), 2);
        assert_eq!(log.dates().collect::<Vec<_>>(), vec![date(2024, 1, 2)]);
        assert_eq!(log.len(), 1);
        assert_eq!(log.remove_by_task_id(gone), 0);
    }

    #[test]
    fn test_remove_last_by_type_keeps_older_events() {
        let mut log = TimelineLog::new();
        let task = Uuid::new_v4();
        let other = Uuid::new_v4();
        log.add(TimelineEvent::new(task, "Run", TimelineEventType::Started).at(at(2024, 1, 1, 8, 0)));
        log.add(TimelineEvent::new(task, "Run", TimelineEventType::Started).at(at(2024, 1, 2, 8, 0)));
        log.add(TimelineEvent::new(task, "Run", TimelineEventType::Started).at(at(2024, 1, 2, 12, 0)));
        log.add(TimelineEvent::new(other, "Walk", TimelineEventType::Started).at(at(2024, 1, 3, 8, 0)));

        let removed = log
            .remove_last_by_type(task, TimelineEventType::Started)
            .unwrap();
        assert_eq!(removed.timestamp, at(2024, 1, 2, 12, 0));
        assert_eq!(log.len(), 3);
        assert_eq!(log.events_for_task(task).count(), 2);
        assert_eq!(log.bucket(date(2024, 1, 2))[0].timestamp, at(2024, 1, 2, 8, 0));
        assert_eq!(log.bucket(date(2024, 1, 3)).len(), 1);
    }

    #[test]
    fn test_remove_last_by_type_drops_emptied_bucket() {
        let mut log = TimelineLog::new();
        let task = Uuid::new_v4();
        log.add(TimelineEvent::new(task, "Once", TimelineEventType::Completed).at(at(2024, 1, 5, 8, 0)));
        assert!(log.remove_last_by_type(task, TimelineEventType::Completed).is_some());
        assert_eq!(log.dates().count(), 0);
        assert!(log.remove_last_by_type(task, TimelineEventType::Completed).is_none());
    }

    #[test]
    fn test_describe() {
        let event = TimelineEvent::new(Uuid::new_v4(), "Buy milk", TimelineEventType::Completed)
            .at(at(2024, 1, 1, 9, 5))
            .with_states(TaskState::Todo, TaskState::Completed);
        assert_eq!(event.describe(), "09:05 AM - Completed: Buy milk (todo -> completed)");

        let created = TimelineEvent::new(Uuid::new_v4(), "Walk", TimelineEventType::Created)
            .at(at(2024, 1, 1, 14, 30));
        assert_eq!(created.describe(), "02:30 PM - Created: Walk");
    }

    #[test]
    fn test_serde_uses_type_field() {
        let mut log = TimelineLog::new();
        log.add(
            TimelineEvent::new(Uuid::new_v4(), "Ship", TimelineEventType::Delegated)
                .at(at(2024, 4, 2, 9, 0))
                .with_states(TaskState::Todo, TaskState::Delegated),
        );
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("\"type\":\"delegated\""));
        assert!(json.contains("\"previousState\":\"todo\""));
        let back: TimelineLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
