//! Zero-filling and month-window helpers for case statistics.

use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use ventanilla_core::pqrsd::{CaseStatus, CaseType};
use ventanilla_core::types::Timestamp;
use ventanilla_db::models::pqrsd::{CaseTypeCount, MonthlyCount, StatusCount};

/// Number of calendar months in the public time series, current month included.
pub const STATS_MONTHS: u32 = 12;

/// Start of the first month of a `months`-long window ending with the month
/// of `now`, plus the `YYYY-MM` label of every month in the window.
///
/// Months are UTC calendar months. Returns `None` only for dates chrono
/// cannot represent.
pub fn month_window(now: Timestamp, months: u32) -> Option<(Timestamp, Vec<String>)> {
    let months = months.max(1) as i32;
    let current = now.year() * 12 + now.month0() as i32;
    let first = current - (months - 1);

    let start = NaiveDate::from_ymd_opt(first.div_euclid(12), first.rem_euclid(12) as u32 + 1, 1)?;
    let since = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));

    let labels = (first..=current)
        .map(|idx| format!("{:04}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1))
        .collect();
    Some((since, labels))
}

/// One entry per label, in label order, with missing months counted as zero.
pub fn fill_months(labels: &[String], counts: &[MonthlyCount]) -> Vec<MonthlyCount> {
    labels
        .iter()
        .map(|month| MonthlyCount {
            month: month.clone(),
            count: counts
                .iter()
                .find(|c| &c.month == month)
                .map_or(0, |c| c.count),
        })
        .collect()
}

/// One entry per known status, in workflow order.
pub fn fill_statuses(counts: &[StatusCount]) -> Vec<StatusCount> {
    CaseStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: status.as_str().to_string(),
            count: counts
                .iter()
                .find(|c| c.status == status.as_str())
                .map_or(0, |c| c.count),
        })
        .collect()
}

/// One entry per known case type, in declaration order.
pub fn fill_case_types(counts: &[CaseTypeCount]) -> Vec<CaseTypeCount> {
    CaseType::ALL
        .iter()
        .map(|case_type| CaseTypeCount {
            case_type: case_type.as_str().to_string(),
            count: counts
                .iter()
                .find(|c| c.case_type == case_type.as_str())
                .map_or(0, |c| c.count),
        })
        .collect()
}
