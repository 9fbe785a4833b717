//! Weekly contribution streaks over a trailing window.
use crate::core::contribution::ContributionEvent;
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Number of weeks in the streak window, ending with the current week.
pub const STREAK_WEEKS: usize = 52;

/// A week counts toward a streak once its total reaches this amount.
pub const STREAK_THRESHOLD: Decimal = Decimal::ONE;

const LOW_HEAT_LIMIT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
const MEDIUM_HEAT_LIMIT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Display intensity of a week, used by the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeatLevel {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
    /// Monday of the week.
    pub week_start: NaiveDate,
    pub invested: Decimal,
}

impl WeekBucket {
    pub fn heat(&self) -> HeatLevel {
        if self.invested <= Decimal::ZERO {
            HeatLevel::None
        } else if self.invested < LOW_HEAT_LIMIT {
            HeatLevel::Low
        } else if self.invested < MEDIUM_HEAT_LIMIT {
            HeatLevel::Medium
        } else {
            HeatLevel::High
        }
    }

    pub fn counts(&self) -> bool {
        self.invested >= STREAK_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub current_streak: usize,
    pub longest_streak: usize,
    /// Exactly [`STREAK_WEEKS`] buckets, oldest first.
    pub weekly_totals: Vec<WeekBucket>,
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Buckets `events` by Monday-start week and computes the current and longest
/// run of weeks reaching [`STREAK_THRESHOLD`] within the window ending at the
/// week containing `today`.
pub fn calculate_streaks(events: &[ContributionEvent], today: NaiveDate) -> StreakSummary {
    let mut totals: HashMap<NaiveDate, Decimal> = HashMap::new();
    for event in events {
        let total = totals.entry(week_start(event.date)).or_default();
        match total.checked_add(event.amount) {
            Some(sum) => *total = sum,
            None => debug!(date = %event.date, "Weekly total overflow, skipping"),
        }
    }

    let current_week = week_start(today);
    let weekly_totals: Vec<WeekBucket> = (0..STREAK_WEEKS)
        .rev()
        .map(|weeks_back| {
            let week_start = current_week - Duration::weeks(weeks_back as i64);
            WeekBucket {
                week_start,
                invested: totals.get(&week_start).copied().unwrap_or_default(),
            }
        })
        .collect();

    let mut run = 0;
    let mut longest_streak = 0;
    for bucket in &weekly_totals {
        if bucket.counts() {
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            run = 0;
        }
    }

    StreakSummary {
        current_streak: run,
        longest_streak,
        weekly_totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn event(date: NaiveDate, amount: Decimal) -> ContributionEvent {
        ContributionEvent {
            date,
            amount,
            roundup: Decimal::ZERO,
            merchant: None,
            category: None,
        }
    }

    // A Wednesday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
    }

    fn weekly_events(weeks_back: impl Iterator<Item = i64>, amount: Decimal) -> Vec<ContributionEvent> {
        weeks_back
            .map(|w| event(today() - Duration::weeks(w), amount))
            .collect()
    }

    #[test]
    fn test_week_start_is_monday() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        assert_eq!(week_start(monday), monday);
        assert_eq!(week_start(today()), monday);
        assert_eq!(week_start(NaiveDate::from_ymd_opt(2025, 6, 22).unwrap()), monday);
        assert_eq!(
            week_start(NaiveDate::from_ymd_opt(2025, 6, 23).unwrap()),
            NaiveDate::from_ymd_opt(2025, 6, 23).unwrap()
        );
    }

    #[test]
    fn test_window_shape() {
        let summary = calculate_streaks(&[], today());
        assert_eq!(summary.weekly_totals.len(), STREAK_WEEKS);
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.longest_streak, 0);
        assert_eq!(
            summary.weekly_totals.last().unwrap().week_start,
            NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
        );
        assert!(
            summary
                .weekly_totals
                .windows(2)
                .all(|w| w[1].week_start - w[0].week_start == Duration::weeks(1))
        );
    }

    #[test]
    fn test_full_window_streak() {
        let events = weekly_events(0..52, dec!(1.00));
        let summary = calculate_streaks(&events, today());
        assert_eq!(summary.current_streak, 52);
        assert_eq!(summary.longest_streak, 52);
    }

    #[test]
    fn test_gap_resets_run() {
        // Weeks 0..=19 and 21..=51 back qualify; week 20 back falls short.
        let mut events = weekly_events((0..52).filter(|w| *w != 20), dec!(2));
        events.push(event(today() - Duration::weeks(20), dec!(0.99)));

        let summary = calculate_streaks(&events, today());
        assert_eq!(summary.current_streak, 20);
        assert_eq!(summary.longest_streak, 31);
    }

    #[test]
    fn test_current_streak_broken_this_week() {
        let events = weekly_events(1..10, dec!(5));
        let summary = calculate_streaks(&events, today());
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.longest_streak, 9);
    }

    #[test]
    fn test_small_amounts_add_up_within_a_week() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let events = vec![
            event(monday, dec!(0.40)),
            event(monday + Duration::days(2), dec!(0.35)),
            event(monday + Duration::days(6), dec!(0.25)),
        ];
        let summary = calculate_streaks(&events, today());
        let last = summary.weekly_totals.last().unwrap();
        assert_eq!(last.invested, dec!(1.00));
        assert_eq!(summary.current_streak, 1);
    }

    #[test]
    fn test_overflowing_week_keeps_running_total() {
        let huge = dec!(50000000000000000000000000000);
        let events = vec![event(today(), huge), event(today(), huge)];
        let summary = calculate_streaks(&events, today());
        assert_eq!(summary.weekly_totals.last().unwrap().invested, huge);
        assert_eq!(summary.current_streak, 1);
    }

    #[test]
    fn test_events_outside_window_are_ignored() {
        let events = vec![
            event(today() - Duration::weeks(52), dec!(100)),
            event(today() + Duration::weeks(1), dec!(100)),
        ];
        let summary = calculate_streaks(&events, today());
        assert!(summary.weekly_totals.iter().all(|w| w.invested.is_zero()));
        assert_eq!(summary.longest_streak, 0);
    }

    #[test]
    fn test_heat_levels() {
        let bucket = |invested| WeekBucket {
            week_start: today(),
            invested,
        };
        assert_eq!(bucket(dec!(0)).heat(), HeatLevel::None);
        assert_eq!(bucket(dec!(4.99)).heat(), HeatLevel::Low);
        assert_eq!(bucket(dec!(5)).heat(), HeatLevel::Medium);
        assert_eq!(bucket(dec!(19.99)).heat(), HeatLevel::Medium);
        assert_eq!(bucket(dec!(20)).heat(), HeatLevel::High);
    }
}
