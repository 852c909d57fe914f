//! Attendance accounting and projection.
//!
//! Every function here is pure: it reads a [`SubjectRecord`] (and, for the
//! weekly rollup, a reference date) and never mutates it.
//!
//! # Rounding
//!
//! Percentages are rounded to two decimal places, half away from zero
//! (`1/32` is `3.125%`, reported as `3.13`). The rounding is done in integer
//! hundredths so the same record always produces the same value in every
//! output.
//!
//! # On track
//!
//! Whether a subject is at or above its target is decided exactly,
//! `100 * attended >= target * total`, not from the rounded percentage.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::record::SubjectRecord;
use crate::types::{Outcome, Target};

/// A class count that may have no finite bound.
///
/// Serializes as a number, or the string `"all"` when unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    Classes(u64),
    /// Every remaining class (must-attend) or no limit (can-skip).
    Unbounded,
}

impl Allowance {
    pub const NONE: Self = Self::Classes(0);

    #[must_use]
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Classes(0))
    }
}

impl Serialize for Allowance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Classes(n) => serializer.serialize_u64(*n),
            Self::Unbounded => serializer.serialize_str("all"),
        }
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classes(n) => write!(f, "{n}"),
            Self::Unbounded => write!(f, "all"),
        }
    }
}

/// Where a subject stands against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    /// No classes recorded yet.
    NoData,
    OnTrack,
    BelowTarget,
}

/// Outcome of "what if I skip the next class".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkipProjection {
    pub would_stay_on_track: bool,
    pub projected_percentage: f64,
}

/// Attendance restricted to one Monday..Sunday week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub attended: u64,
    pub total: u64,
    pub percentage: f64,
}

/// Rounds `100 * part / whole` to two decimals, half away from zero.
///
/// Returns `0.0` when `whole` is zero.
#[expect(
    clippy::cast_precision_loss,
    reason = "hundredths of a percent stay far below 2^52"
)]
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let part = u128::from(part);
    let whole = u128::from(whole);
    let hundredths = (20_000 * part + whole) / (2 * whole);
    hundredths as f64 / 100.0
}

/// Attendance percentage over all recorded classes.
pub fn current_percentage(record: &SubjectRecord) -> f64 {
    percentage(u64::from(record.attended()), record.total())
}

fn meets(attended: u64, total: u64, target: Target) -> bool {
    100 * u128::from(attended) >= u128::from(target.get()) * u128::from(total)
}

/// Where the record stands against its target.
pub fn standing(record: &SubjectRecord) -> Standing {
    let total = record.total();
    if total == 0 {
        Standing::NoData
    } else if meets(u64::from(record.attended()), total, record.target()) {
        Standing::OnTrack
    } else {
        Standing::BelowTarget
    }
}

fn on_track(record: &SubjectRecord) -> bool {
    // An empty record is 0%, below any valid target.
    standing(record) == Standing::OnTrack
}

/// How many further classes can be missed while staying at or above target.
///
/// Zero when below target. With a 100% target the budget is unbounded until
/// the first miss, and zero afterwards.
pub fn can_skip_count(record: &SubjectRecord) -> Allowance {
    if !on_track(record) {
        return Allowance::NONE;
    }
    let target = record.target();
    if target.is_full() {
        return if record.missed() == 0 {
            Allowance::Unbounded
        } else {
            Allowance::NONE
        };
    }

    let reachable_total = 100 * u128::from(record.attended()) / u128::from(target.get());
    let budget = reachable_total.saturating_sub(u128::from(record.total()));
    Allowance::Classes(u64::try_from(budget).unwrap_or(u64::MAX))
}

/// How many consecutive classes must be attended to reach the target.
///
/// Zero when already at or above target. With a 100% target every remaining
/// class must be attended.
pub fn must_attend_count(record: &SubjectRecord) -> Allowance {
    if on_track(record) {
        return Allowance::NONE;
    }
    let target = record.target();
    if target.is_full() {
        return Allowance::Unbounded;
    }

    let target = u128::from(target.get());
    let deficit = (target * u128::from(record.total()))
        .saturating_sub(100 * u128::from(record.attended()));
    let needed = deficit / (100 - target) + 1;
    Allowance::Classes(u64::try_from(needed).unwrap_or(u64::MAX))
}

/// Projects the percentage if the next class were missed.
pub fn simulate_skip_next(record: &SubjectRecord) -> SkipProjection {
    let attended = u64::from(record.attended());
    let new_total = record.total() + 1;
    SkipProjection {
        would_stay_on_track: meets(attended, new_total, record.target()),
        projected_percentage: percentage(attended, new_total),
    }
}

/// First and last day of the Monday..Sunday week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_since_monday = date.weekday().num_days_from_monday();
    let monday = date - Duration::days(i64::from(days_since_monday));
    (monday, monday + Duration::days(6))
}

/// Attendance recorded in the week containing `reference`.
///
/// Only dated history counts; counters carried without history are ignored.
pub fn weekly_summary(record: &SubjectRecord, reference: NaiveDate) -> WeeklySummary {
    let (week_start, week_end) = week_bounds(reference);
    let (attended, total) = record
        .history()
        .range(week_start..=week_end)
        .fold((0_u64, 0_u64), |(attended, total), (_, outcome)| match outcome {
            Outcome::Attended => (attended + 1, total + 1),
            Outcome::Missed => (attended, total + 1),
        });

    WeeklySummary {
        week_start,
        week_end,
        attended,
        total,
        percentage: percentage(attended, total),
    }
}

/// The skip / must-attend advice shown next to a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    NotEnoughData,
    CanSkip { classes: Allowance, target: Target },
    MustAttend { classes: Allowance, target: Target },
}

/// Derives the advice for a record.
pub fn recommend(record: &SubjectRecord) -> Recommendation {
    let target = record.target();
    match standing(record) {
        Standing::NoData => Recommendation::NotEnoughData,
        Standing::OnTrack => Recommendation::CanSkip {
            classes: can_skip_count(record),
            target,
        },
        Standing::BelowTarget => Recommendation::MustAttend {
            classes: must_attend_count(record),
            target,
        },
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughData => write!(f, "Not enough data for prediction."),
            Self::CanSkip {
                classes: Allowance::Unbounded,
                target,
            } => write!(f, "You can miss classes freely without falling below {target}."),
            Self::CanSkip {
                classes: Allowance::Classes(n),
                target,
            } => write!(
                f,
                "You can miss {n} more class(es) without falling below {target}."
            ),
            Self::MustAttend {
                classes: Allowance::Unbounded,
                target,
            } => write!(f, "You must attend every remaining class to reach {target}."),
            Self::MustAttend {
                classes: Allowance::Classes(n),
                target,
            } => write!(f, "You must attend next {n} class(es) to reach {target}."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(attended: u32, missed: u32, target: i64) -> SubjectRecord {
        SubjectRecord::with_counts(attended, missed, Target::new(target).unwrap())
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn percentage_of_empty_record_is_zero() {
        assert!(current_percentage(&record(0, 0, 75)).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert!((current_percentage(&record(2, 1, 75)) - 66.67).abs() < 1e-9);
        assert!((current_percentage(&record(1, 2, 75)) - 33.33).abs() < 1e-9);
        assert!((current_percentage(&record(3, 1, 75)) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_rounds_half_up() {
        // 1/32 = 3.125%
        assert!((current_percentage(&record(1, 31, 75)) - 3.13).abs() < 1e-9);
        // 1/8 = 12.5% needs no rounding
        assert!((current_percentage(&record(1, 7, 75)) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn percentage_stays_in_range() {
        for attended in 0..20 {
            for missed in 0..20 {
                let pct = current_percentage(&record(attended, missed, 75));
                assert!((0.0..=100.0).contains(&pct), "{attended}/{missed} gave {pct}");
            }
        }
    }

    #[test]
    fn math_scenario_at_target() {
        let math = record(3, 1, 75);
        assert_eq!(standing(&math), Standing::OnTrack);
        assert_eq!(can_skip_count(&math), Allowance::Classes(0));
        assert_eq!(must_attend_count(&math), Allowance::NONE);

        let projection = simulate_skip_next(&math);
        assert!(!projection.would_stay_on_track);
        assert!((projection.projected_percentage - 60.0).abs() < 1e-9);
    }

    #[test]
    fn physics_scenario_below_target() {
        let physics = record(2, 2, 75);
        assert_eq!(standing(&physics), Standing::BelowTarget);
        assert_eq!(must_attend_count(&physics), Allowance::Classes(5));
        assert_eq!(can_skip_count(&physics), Allowance::NONE);
    }

    #[test]
    fn can_skip_with_surplus() {
        // 9/10 at 75%: floor(900/75) - 10 = 2
        assert_eq!(can_skip_count(&record(9, 1, 75)), Allowance::Classes(2));
        // 10/10 at 50%: floor(1000/50) - 10 = 10
        assert_eq!(can_skip_count(&record(10, 0, 50)), Allowance::Classes(10));
    }

    #[test]
    fn empty_record_must_attend_one() {
        let empty = record(0, 0, 75);
        assert_eq!(standing(&empty), Standing::NoData);
        assert_eq!(must_attend_count(&empty), Allowance::Classes(1));
        assert_eq!(can_skip_count(&empty), Allowance::NONE);
    }

    #[test]
    fn full_target_special_cases() {
        let perfect = record(4, 0, 100);
        assert_eq!(can_skip_count(&perfect), Allowance::Unbounded);
        assert_eq!(must_attend_count(&perfect), Allowance::NONE);

        let slipped = record(4, 1, 100);
        assert_eq!(can_skip_count(&slipped), Allowance::NONE);
        assert_eq!(must_attend_count(&slipped), Allowance::Unbounded);

        let empty = record(0, 0, 100);
        assert_eq!(must_attend_count(&empty), Allowance::Unbounded);
    }

    #[test]
    fn skip_and_attend_are_mutually_exclusive() {
        for target in [50, 60, 75, 85, 99, 100] {
            for attended in 0..15 {
                for missed in 0..15 {
                    let r = record(attended, missed, target);
                    assert!(
                        can_skip_count(&r).is_zero() || must_attend_count(&r).is_zero(),
                        "both nonzero for {attended}/{missed} at {target}"
                    );
                }
            }
        }
    }

    #[test]
    fn must_attend_reaches_target() {
        for target in [50, 60, 75, 90] {
            for attended in 0..12 {
                for missed in 1..12 {
                    let r = record(attended, missed, target);
                    if let Allowance::Classes(n) = must_attend_count(&r) {
                        if n == 0 {
                            continue;
                        }
                        let attended = u64::from(attended) + n;
                        let total = r.total() + n;
                        assert!(meets(attended, total, r.target()));
                    }
                }
            }
        }
    }

    #[test]
    fn can_skip_budget_keeps_target() {
        for target in [50, 65, 75, 90] {
            for attended in 1..15 {
                for missed in 0..5 {
                    let r = record(attended, missed, target);
                    if standing(&r) != Standing::OnTrack {
                        continue;
                    }
                    let Allowance::Classes(n) = can_skip_count(&r) else {
                        panic!("bounded target gave unbounded budget");
                    };
                    assert!(meets(u64::from(attended), r.total() + n, r.target()));
                    assert!(!meets(u64::from(attended), r.total() + n + 1, r.target()));
                }
            }
        }
    }

    #[test]
    fn simulate_skip_does_not_mutate() {
        let r = record(8, 1, 75);
        let before = r.clone();
        let projection = simulate_skip_next(&r);
        assert_eq!(r, before);
        assert!(projection.would_stay_on_track);
        assert!((projection.projected_percentage - 80.0).abs() < 1e-9);

        let tight = simulate_skip_next(&record(5, 1, 75));
        assert!(!tight.would_stay_on_track);
        assert!((tight.projected_percentage - 71.43).abs() < 1e-9);
    }

    #[test]
    fn simulate_skip_on_empty_record() {
        let projection = simulate_skip_next(&record(0, 0, 75));
        assert!(!projection.would_stay_on_track);
        assert!(projection.projected_percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn week_bounds_start_on_monday() {
        // 2025-03-05 is a Wednesday
        assert_eq!(
            week_bounds(date("2025-03-05")),
            (date("2025-03-03"), date("2025-03-09"))
        );
        assert_eq!(
            week_bounds(date("2025-03-03")),
            (date("2025-03-03"), date("2025-03-09"))
        );
        assert_eq!(
            week_bounds(date("2025-03-09")),
            (date("2025-03-03"), date("2025-03-09"))
        );
    }

    #[test]
    fn weekly_summary_counts_only_that_week() {
        let mut subjects = crate::Subjects::new();
        subjects.add_subject("Math", 75).unwrap();
        for (day, outcome) in [
            ("2025-03-02", Outcome::Attended), // previous Sunday
            ("2025-03-03", Outcome::Attended),
            ("2025-03-05", Outcome::Missed),
            ("2025-03-09", Outcome::Attended),
            ("2025-03-10", Outcome::Missed), // next Monday
        ] {
            subjects.record_outcome("Math", date(day), outcome).unwrap();
        }
        let summary = weekly_summary(subjects.get("Math").unwrap(), date("2025-03-06"));
        assert_eq!(summary.week_start, date("2025-03-03"));
        assert_eq!(summary.attended, 2);
        assert_eq!(summary.total, 3);
        assert!((summary.percentage - 66.67).abs() < 1e-9);
    }

    #[test]
    fn weekly_summary_of_empty_week() {
        let summary = weekly_summary(&record(5, 5, 75), date("2025-03-06"));
        assert_eq!(summary.total, 0);
        assert!(summary.percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn recommendation_wording() {
        assert_eq!(
            recommend(&record(0, 0, 75)).to_string(),
            "Not enough data for prediction."
        );
        assert_eq!(
            recommend(&record(9, 1, 75)).to_string(),
            "You can miss 2 more class(es) without falling below 75%."
        );
        assert_eq!(
            recommend(&record(2, 2, 75)).to_string(),
            "You must attend next 5 class(es) to reach 75%."
        );
        assert_eq!(
            recommend(&record(3, 1, 100)).to_string(),
            "You must attend every remaining class to reach 100%."
        );
    }
}
