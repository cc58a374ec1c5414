use chrono::NaiveDate;

use wyr_db::models::StreakUpdate;

pub const STREAK_BONUS_PER_DAY: i64 = 2;
pub const STREAK_BONUS_CAP: i64 = 50;

/// Where a voter sits relative to their last vote. Recomputed from
/// (streak, last_vote_date, today) on every vote; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakState {
    NoHistory,
    SameDay,
    ConsecutiveDay,
    GapBroken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: StreakState,
    pub streak: i64,
    pub last_vote_date: NaiveDate,
    pub bonus: i64,
}

impl Transition {
    /// The write to persist, or `None` when the stored state stays as is.
    pub fn update(&self) -> Option<StreakUpdate> {
        match self.state {
            StreakState::SameDay => None,
            _ => Some(StreakUpdate {
                streak: self.streak,
                last_vote_date: self.last_vote_date,
                bonus: self.bonus,
            }),
        }
    }
}

pub fn classify(last_vote_date: Option<NaiveDate>, today: NaiveDate) -> StreakState {
    let Some(last) = last_vote_date else {
        return StreakState::NoHistory;
    };

    // A stored date ahead of today (clock skew) counts as same-day
    match (today - last).num_days() {
        i64::MIN..=0 => StreakState::SameDay,
        1 => StreakState::ConsecutiveDay,
        _ => StreakState::GapBroken,
    }
}

pub fn bonus_for(streak: i64) -> i64 {
    (streak * STREAK_BONUS_PER_DAY).min(STREAK_BONUS_CAP)
}

/// Streak transition for a vote cast on `today`.
pub fn advance(streak: i64, last_vote_date: Option<NaiveDate>, today: NaiveDate) -> Transition {
    let state = classify(last_vote_date, today);
    match state {
        StreakState::NoHistory | StreakState::GapBroken => Transition {
            state,
            streak: 1,
            last_vote_date: today,
            bonus: 0,
        },
        StreakState::SameDay => Transition {
            state,
            streak,
            last_vote_date: last_vote_date.unwrap_or(today),
            bonus: 0,
        },
        StreakState::ConsecutiveDay => {
            let next = streak + 1;
            Transition {
                state,
                streak: next,
                last_vote_date: today,
                bonus: bonus_for(next),
            }
        }
    }
}
