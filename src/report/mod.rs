pub mod generator;
pub mod stats;

pub use generator::{generate_report, render_day_markdown};
pub use stats::{month_overview, month_totals, DayOverview};
