//! Derived statistics over the exercise collection.
//!
//! Everything here is a pure function of the record slice and a supplied
//! `now`; the engine keeps no state of its own. Callers pass the raw
//! collection — dates are de-duplicated and sorted internally, so streak
//! figures are robust to duplicate-day and out-of-order input.

use crate::{Exercise, ExerciseStats, WeekStart};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Compute the full statistics block for the given collection
pub fn compute_stats(
    exercises: &[Exercise],
    now: DateTime<Utc>,
    week_start: WeekStart,
) -> ExerciseStats {
    let total_workouts = exercises.len() as u32;
    let total_duration: u32 = exercises.iter().map(|e| e.duration).sum();
    let total_calories: u32 = exercises
        .iter()
        .map(|e| e.calories_burned.unwrap_or(0))
        .sum();

    let average_intensity = if exercises.is_empty() {
        0.0
    } else {
        let ordinal_sum: u32 = exercises.iter().map(|e| e.intensity_level.ordinal()).sum();
        f64::from(ordinal_sum) / f64::from(total_workouts)
    };

    let today = now.date_naive();
    let week = today.week(week_start.weekday());
    let this_week_workouts = exercises
        .iter()
        .filter(|e| {
            let d = e.date.date_naive();
            d >= week.first_day() && d <= week.last_day()
        })
        .count() as u32;

    let this_month_workouts = exercises
        .iter()
        .filter(|e| {
            let d = e.date.date_naive();
            d.year() == today.year() && d.month() == today.month()
        })
        .count() as u32;

    let days: Vec<NaiveDate> = exercises.iter().map(|e| e.date.date_naive()).collect();
    let (current_streak, longest_streak) = streaks(&days, today);

    ExerciseStats {
        total_workouts,
        total_duration,
        total_calories,
        average_intensity,
        current_streak,
        longest_streak,
        this_week_workouts,
        this_month_workouts,
    }
}

/// Compute `(current, longest)` consecutive-day workout streaks
///
/// Input may contain duplicates and arrive in any order; it is reduced to
/// distinct calendar days sorted newest-first before scanning.
///
/// The current streak is anchored on `today`, or on yesterday as a one-day
/// grace when today has no workout yet. The grace applies only at the
/// anchor: once the walk starts, every prior day must be present, so a
/// single missed day mid-history ends the streak. Neither today nor
/// yesterday present yields 0.
///
/// The longest streak has no grace period: a run extends only when
/// adjacent distinct days differ by exactly one calendar day.
pub fn streaks(dates: &[NaiveDate], today: NaiveDate) -> (u32, u32) {
    let mut days = dates.to_vec();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    if days.is_empty() {
        return (0, 0);
    }

    let one_day = Duration::days(1);

    let mut current = 0;
    if days[0] == today || days[0] == today - one_day {
        let mut expected = days[0];
        for &day in &days {
            if day == expected {
                current += 1;
                expected = expected - one_day;
            } else {
                break;
            }
        }
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in days.windows(2) {
        if pair[0] - pair[1] == one_day {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }

    (current, longest)
}
