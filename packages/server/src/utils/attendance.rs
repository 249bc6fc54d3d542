use chrono::NaiveDate;
use common::JustificationStanding;

use crate::config::AttendanceConfig;

/// The parts of an absence the compliance summary looks at.
#[derive(Debug, Clone, Copy)]
pub struct AbsenceFacts {
    pub date: NaiveDate,
    pub accepted: bool,
    pub standing: JustificationStanding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplianceSummary {
    pub total: u64,
    pub justified: u64,
    pub pending: u64,
    pub unjustified: u64,
    pub consecutive: u64,
    pub compliant: bool,
}

/// Compute totals, the consecutive streak and compliance for one merchant.
///
/// `justified + pending + unjustified == total` always holds.
pub fn summarize(absences: &[AbsenceFacts], rules: &AttendanceConfig) -> ComplianceSummary {
    let total = absences.len() as u64;
    let justified = absences.iter().filter(|a| a.accepted).count() as u64;
    let pending = absences
        .iter()
        .filter(|a| !a.accepted && a.standing == JustificationStanding::PendingReview)
        .count() as u64;
    let unjustified = total - justified - pending;

    let unexcused: Vec<NaiveDate> = absences
        .iter()
        .filter(|a| !a.accepted)
        .map(|a| a.date)
        .collect();
    let consecutive = consecutive_streak(unexcused, rules.consecutive_gap_days);

    ComplianceSummary {
        total,
        justified,
        pending,
        unjustified,
        consecutive,
        compliant: consecutive < rules.consecutive_limit
            && unjustified < rules.unjustified_limit,
    }
}

/// Length of the run that starts at the most recent date and continues while
/// each step back in time is between 1 and `max_gap_days` days.
///
/// Fairs happen roughly weekly, so two absences a week or two apart are
/// "consecutive" even though the calendar days are not.
pub fn consecutive_streak(mut dates: Vec<NaiveDate>, max_gap_days: i64) -> u64 {
    if dates.is_empty() {
        return 0;
    }
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak = 1;
    for pair in dates.windows(2) {
        let gap = (pair[0] - pair[1]).num_days();
        if (1..=max_gap_days).contains(&gap) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
