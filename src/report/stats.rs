use crate::app::Session;
use crate::domain::TaskStats;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Completion summary of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayOverview {
    pub date: NaiveDate,
    pub stats: TaskStats,
}

/// Every day of `year`-`month` with its stats, recurring occurrences included.
/// An invalid month yields an empty list.
pub fn month_overview(session: &Session, year: i32, month: u32) -> Vec<DayOverview> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|day| day.month() == month)
        .map(|date| DayOverview {
            date,
            stats: session.stats_for_date(date),
        })
        .collect()
}

/// Stats of a whole month folded into one summary
pub fn month_totals(days: &[DayOverview]) -> TaskStats {
    days.iter()
        .fold(TaskStats::default(), |acc, day| acc.merge(day.stats))
}
