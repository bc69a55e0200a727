use super::files::{atomic_write, backup_file, read_file};
use super::settings::Settings;
use crate::domain::{TaskForest, TimelineLog};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current on-disk format version
pub const SCHEMA_VERSION: u32 = 1;

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything persisted between sessions (data.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSchema {
    #[serde(default = "schema_version")]
    pub version: u32,
    #[serde(default)]
    pub tasks: TaskForest,
    #[serde(default)]
    pub timeline: TimelineLog,
    #[serde(default)]
    pub settings: Settings,
}

/// Load the snapshot; a missing or empty file yields an empty one.
/// A file that fails to parse is backed up before the error is returned.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<StorageSchema> {
    let path = path.as_ref();
    let content = read_file(path)?;
    if content.trim().is_empty() {
        tracing::debug!("no snapshot at {}, starting empty", path.display());
        return Ok(StorageSchema {
            version: SCHEMA_VERSION,
            ..StorageSchema::default()
        });
    }

    let mut snapshot: StorageSchema = match serde_json::from_str(&content) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            let backup = backup_file(path)?;
            tracing::warn!("corrupt snapshot backed up to {}", backup.display());
            return Err(err).with_context(|| {
                format!(
                    "Failed to parse {} (a copy was saved to {})",
                    path.display(),
                    backup.display()
                )
            });
        }
    };

    if snapshot.version > SCHEMA_VERSION {
        anyhow::bail!(
            "{} was written by a newer version (format {}, this build reads {})",
            path.display(),
            snapshot.version,
            SCHEMA_VERSION
        );
    }
    snapshot.version = SCHEMA_VERSION;
    snapshot.tasks.prune_empty();
    Ok(snapshot)
}

/// Save the snapshot atomically
pub fn save_snapshot<P: AsRef<Path>>(path: P, snapshot: &StorageSchema) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    atomic_write(&path, &json)?;
    tracing::debug!("saved snapshot to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        RecurrencePattern, TaskState, TimelineEvent, TimelineEventType,
    };
    use chrono::{NaiveDate, Weekday};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_snapshot() {
        let temp_dir = tempdir().unwrap();
        let snapshot = load_snapshot(temp_dir.path().join("data.json")).unwrap();
        assert!(snapshot.tasks.is_empty());
        assert!(snapshot.timeline.is_empty());
        assert_eq!(snapshot.version, SCHEMA_VERSION);
        assert_eq!(snapshot.settings, Settings::default());
    }

    #[test]
    fn test_save_and_load_preserves_everything() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("data.json");
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let mut tasks = TaskForest::new();
        let mut template = TaskForest::create_task("Standup", day, TaskState::Todo).unwrap();
        let mut pattern = RecurrencePattern::weekly([Weekday::Mon, Weekday::Wed])
            .until(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        pattern.exclude(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        template.recurrence = Some(pattern);
        let template_id = template.id;
        tasks.insert(template);
        tasks.add_subtask(template_id, "Notes").unwrap();
        tasks.start_task(template_id, None).unwrap();

        let mut timeline = TimelineLog::new();
        timeline.add(
            TimelineEvent::new(template_id, "Standup", TimelineEventType::Started)
                .with_states(TaskState::Todo, TaskState::Todo),
        );

        let snapshot = StorageSchema {
            version: SCHEMA_VERSION,
            tasks,
            timeline,
            settings: Settings {
                theme: "light".to_string(),
                undo_depth: 20,
            },
        };
        save_snapshot(&path, &snapshot).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_corrupt_snapshot_is_backed_up() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("data.json");
        atomic_write(&path, "{ not json").unwrap();

        assert!(load_snapshot(&path).is_err());
        let backups = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .map(|e| e.file_name().to_string_lossy().contains(".bak."))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("data.json");
        atomic_write(&path, "{\"version\": 99}").unwrap();
        assert!(load_snapshot(&path).is_err());
    }
}
