use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::calendar::{date_difference, JstClock};
use crate::models::{StreakInfo, StreakState};

/// Consecutive-day streak ending today or yesterday.
///
/// Yesterday is a grace anchor: a student who logged yesterday but has not
/// yet logged today still shows a live streak. The count drops to zero only
/// once a full calendar day passes with no entry at all.
pub fn current_streak(dates: &BTreeSet<NaiveDate>, clock: &JstClock) -> u32 {
    if dates.is_empty() {
        return 0;
    }

    let today = clock.today();
    let anchor = if dates.contains(&today) {
        today
    } else if dates.contains(&clock.yesterday()) {
        clock.yesterday()
    } else {
        return 0;
    };

    let mut streak = 0;
    let mut cursor = anchor;
    while dates.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

pub fn streak_state(last_study_date: Option<NaiveDate>, clock: &JstClock) -> StreakState {
    let Some(last) = last_study_date else {
        return StreakState::Reset;
    };
    match date_difference(last, clock.today()) {
        0 => StreakState::Active,
        1 => StreakState::Grace,
        _ => StreakState::Reset,
    }
}

/// Full streak history, recomputed from the raw date set on every call.
/// Any persisted streak counter elsewhere is a cache of this.
pub fn streak_info(dates: &BTreeSet<NaiveDate>, clock: &JstClock) -> StreakInfo {
    let last_study_date = dates.iter().next_back().copied();

    let mut max_streak = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for date in dates {
        run = match prev {
            Some(p) if date_difference(p, *date) == 1 => run + 1,
            _ => 1,
        };
        max_streak = max_streak.max(run);
        prev = Some(*date);
    }

    StreakInfo {
        current_streak: current_streak(dates, clock),
        total_days: dates.len(),
        last_study_date,
        state: streak_state(last_study_date, clock),
        max_streak,
    }
}
