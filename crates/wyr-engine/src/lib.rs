//! Voting & rewards engine.
//!
//! Orchestrates the business rules around chat events on top of the ledger
//! store:
//! - one vote per user per question, with a flat coin reward
//! - daily streak tracking with a capped bonus
//! - moderation of user-submitted questions
//! - daily question selection for the scheduler
//!
//! Side effects that are not part of the ledger (live result updates,
//! submitter notices, daily posts) go through [`Notifier`] and never fail a
//! call.

pub mod clock;
pub mod daily;
pub mod engine;
pub mod moderation;
pub mod notify;
pub mod streak;

pub use clock::{Clock, FixedClock, SystemClock};
pub use daily::{DailyPost, TestDailyOutcome};
pub use engine::{Engine, VOTE_REWARD, VoteOutcome, VoteResult};
pub use moderation::ReviewOutcome;
pub use notify::{NotifyError, Notifier, NullNotifier};
pub use streak::{StreakState, Transition};

pub use wyr_db::{Database, StoreError};
