//! daybook - calendar task trees with recurring tasks, an activity timeline
//! and undo.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod report;

pub use error::{CoreError, CoreResult};
