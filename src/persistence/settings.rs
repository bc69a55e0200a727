use crate::domain::DEFAULT_UNDO_DEPTH;
use serde::{Deserialize, Serialize};

/// User settings stored alongside tasks and timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Palette name, consumed by the presentation layer
    pub theme: String,
    /// Undo steps kept per session
    pub undo_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            undo_depth: DEFAULT_UNDO_DEPTH,
        }
    }
}
