use std::sync::Arc;

use tracing::debug;

use wyr_db::models::{QuestionRow, UserRow};
use wyr_db::{Database, StoreError};
use wyr_types::events::PollEvent;
use wyr_types::models::{Choice, QuestionId, QuestionPayload, Tally, UserId};

use crate::clock::{Clock, SystemClock};
use crate::notify::{Notifier, NullNotifier};
use crate::streak;

/// Flat coin reward for every accepted vote.
pub const VOTE_REWARD: i64 = 10;

/// Result of a vote event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded(VoteResult),
    /// The user had already voted on this question; nothing was written.
    AlreadyVoted { tally: Tally },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteResult {
    pub choice: Choice,
    pub tally: Tally,
    pub coins_awarded: i64,
    pub new_streak: i64,
    pub balance: i64,
}

/// Cheap to clone; all handles are shared.
#[derive(Clone)]
pub struct Engine {
    pub(crate) db: Arc<Database>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl Engine {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(NullNotifier),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // -- Votes --

    /// Record a vote, pay the flat reward and advance the voter's streak.
    ///
    /// The existence check is only a short-circuit: the store's primary key
    /// is what guarantees a single credit, and a duplicate caught there is
    /// reported as `AlreadyVoted` as well.
    pub fn cast_vote(&self, user_id: UserId, question_id: QuestionId, choice: Choice) -> Result<VoteOutcome, StoreError> {
        if self.db.has_voted(user_id, question_id)? {
            return Ok(VoteOutcome::AlreadyVoted {
                tally: self.db.tally(question_id)?,
            });
        }

        let today = self.clock.today();
        let receipt = match self.db.record_vote_with_rewards(
            user_id,
            question_id,
            choice,
            VOTE_REWARD,
            |before| streak::advance(before.streak, before.last_vote_date, today).update(),
        ) {
            Ok(receipt) => receipt,
            Err(StoreError::DuplicateVote { .. }) => {
                debug!("User {} lost a duplicate vote race on question {}", user_id, question_id);
                return Ok(VoteOutcome::AlreadyVoted {
                    tally: self.db.tally(question_id)?,
                });
            }
            Err(e) => return Err(e),
        };

        debug!(
            user_id,
            question_id,
            choice = %choice,
            coins = receipt.coins_awarded,
            streak = receipt.streak,
            "vote recorded"
        );

        self.notify(PollEvent::ResultsUpdated {
            question_id,
            results: receipt.tally.into(),
        });

        Ok(VoteOutcome::Recorded(VoteResult {
            choice,
            tally: receipt.tally,
            coins_awarded: receipt.coins_awarded,
            new_streak: receipt.streak,
            balance: receipt.balance,
        }))
    }

    pub fn tally(&self, question_id: QuestionId) -> Result<Tally, StoreError> {
        self.db.tally(question_id)
    }

    // -- Questions --

    pub fn add_question(&self, payload: &QuestionPayload) -> Result<QuestionId, StoreError> {
        self.db.add_question(payload)
    }

    pub fn question(&self, question_id: QuestionId) -> Result<QuestionRow, StoreError> {
        self.db
            .get_question(question_id)?
            .ok_or_else(|| StoreError::not_found("question", question_id))
    }

    /// `None` signals an empty question table.
    pub fn random_question(&self) -> Result<Option<QuestionRow>, StoreError> {
        self.db.random_question()
    }

    /// A random question plus its tally when `user_id` has already voted on it.
    pub fn random_question_for(&self, user_id: UserId) -> Result<Option<(QuestionRow, Option<Tally>)>, StoreError> {
        let Some(question) = self.db.random_question()? else {
            return Ok(None);
        };
        let tally = if self.db.has_voted(user_id, question.id)? {
            Some(self.db.tally(question.id)?)
        } else {
            None
        };
        Ok(Some((question, tally)))
    }

    // -- Users --

    /// Balance and streak for display; creates the user on first look.
    pub fn profile(&self, user_id: UserId) -> Result<UserRow, StoreError> {
        self.db.get_or_create_user(user_id)
    }

    pub fn leaderboard(&self, limit: u32) -> Result<Vec<UserRow>, StoreError> {
        self.db.leaderboard(limit)
    }

    /// Best-effort publish: failures are logged and swallowed.
    pub(crate) fn notify(&self, event: PollEvent) {
        if let Err(e) = self.notifier.publish(event) {
            debug!("Dropped event: {}", e);
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Days;

    use super::test_support::{FailingNotifier, harness, start_date};
    use super::*;
    use wyr_db::models::StreakUpdate;

    fn recorded(outcome: VoteOutcome) -> VoteResult {
        match outcome {
            VoteOutcome::Recorded(result) => result,
            other => panic!("expected a recorded vote, got {:?}", other),
        }
    }

    #[test]
    fn test_first_vote_awards_base_and_starts_streak() {
        let h = harness();
        let q = h.question("q?");

        let result = recorded(h.engine.cast_vote(1, q, Choice::A).unwrap());
        assert_eq!(result.coins_awarded, 10);
        assert_eq!(result.new_streak, 1);
        assert_eq!(result.balance, 10);
        assert_eq!(result.tally, Tally { a_votes: 1, b_votes: 0 });

        let user = h.engine.profile(1).unwrap();
        assert_eq!(user.last_vote_date, Some(start_date()));
        assert_eq!(user.total_votes, 1);
    }

    #[test]
    fn test_second_vote_is_rejected_without_mutation() {
        let h = harness();
        let q = h.question("q?");

        h.engine.cast_vote(1, q, Choice::A).unwrap();
        let before = h.engine.profile(1).unwrap();

        let outcome = h.engine.cast_vote(1, q, Choice::B).unwrap();
        assert_eq!(
            outcome,
            VoteOutcome::AlreadyVoted {
                tally: Tally { a_votes: 1, b_votes: 0 }
            }
        );
        assert_eq!(h.engine.profile(1).unwrap(), before);
        assert_eq!(h.engine.tally(q).unwrap().total(), 1);
    }

    #[test]
    fn test_consecutive_day_pays_bonus() {
        let h = harness();
        let q = h.question("q?");
        let yesterday = start_date().checked_sub_days(Days::new(1)).unwrap();
        h.engine
            .database()
            .apply_streak_transition(
                5,
                &StreakUpdate {
                    streak: 5,
                    last_vote_date: yesterday,
                    bonus: 0,
                },
            )
            .unwrap();

        let result = recorded(h.engine.cast_vote(5, q, Choice::B).unwrap());
        assert_eq!(result.new_streak, 6);
        assert_eq!(result.coins_awarded, 22);
        assert_eq!(result.balance, 22);
    }

    #[test]
    fn test_broken_streak_resets() {
        let h = harness();
        let q = h.question("q?");
        let three_days_ago = start_date().checked_sub_days(Days::new(3)).unwrap();
        h.engine
            .database()
            .apply_streak_transition(
                7,
                &StreakUpdate {
                    streak: 30,
                    last_vote_date: three_days_ago,
                    bonus: 0,
                },
            )
            .unwrap();

        let result = recorded(h.engine.cast_vote(7, q, Choice::A).unwrap());
        assert_eq!(result.new_streak, 1);
        assert_eq!(result.coins_awarded, 10);
    }

    #[test]
    fn test_same_day_votes_keep_streak() {
        let h = harness();
        let q1 = h.question("one?");
        let q2 = h.question("two?");

        recorded(h.engine.cast_vote(1, q1, Choice::A).unwrap());
        let second = recorded(h.engine.cast_vote(1, q2, Choice::A).unwrap());
        assert_eq!(second.new_streak, 1);
        assert_eq!(second.coins_awarded, 10);
        assert_eq!(second.balance, 20);
    }

    #[test]
    fn test_streak_over_several_days() {
        let h = harness();
        let questions: Vec<i64> = (0..4).map(|i| h.question(&format!("q{}?", i))).collect();

        let first = recorded(h.engine.cast_vote(1, questions[0], Choice::A).unwrap());
        assert_eq!(first.coins_awarded, 10);

        h.clock.advance_days(1);
        let second = recorded(h.engine.cast_vote(1, questions[1], Choice::A).unwrap());
        assert_eq!(second.new_streak, 2);
        assert_eq!(second.coins_awarded, 14);

        h.clock.advance_days(1);
        let third = recorded(h.engine.cast_vote(1, questions[2], Choice::B).unwrap());
        assert_eq!(third.new_streak, 3);
        assert_eq!(third.coins_awarded, 16);

        h.clock.advance_days(2);
        let fourth = recorded(h.engine.cast_vote(1, questions[3], Choice::B).unwrap());
        assert_eq!(fourth.new_streak, 1);
        assert_eq!(fourth.coins_awarded, 10);
        assert_eq!(fourth.balance, 10 + 14 + 16 + 10);
    }

    #[test]
    fn test_tally_matches_distinct_voters() {
        let h = harness();
        let q = h.question("q?");

        for user in 1..=5 {
            let choice = if user % 2 == 0 { Choice::A } else { Choice::B };
            h.engine.cast_vote(user, q, choice).unwrap();
            h.engine.cast_vote(user, q, Choice::A).unwrap();
        }

        let tally = h.engine.tally(q).unwrap();
        assert_eq!(tally, Tally { a_votes: 2, b_votes: 3 });
        assert_eq!(tally.total(), 5);
    }

    #[test]
    fn test_vote_on_unknown_question_fails() {
        let h = harness();
        let err = h.engine.cast_vote(1, 77, Choice::A).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "question", .. }));
    }

    #[test]
    fn test_concurrent_duplicate_votes_credit_once() {
        let h = harness();
        let q = h.question("q?");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = h.engine.clone();
                std::thread::spawn(move || engine.cast_vote(1, q, Choice::A).unwrap())
            })
            .collect();

        let recorded_count = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| matches!(o, VoteOutcome::Recorded(_)))
            .count();

        assert_eq!(recorded_count, 1);
        let user = h.engine.profile(1).unwrap();
        assert_eq!(user.coins, 10);
        assert_eq!(user.total_votes, 1);
        assert_eq!(h.engine.tally(q).unwrap().total(), 1);
    }

    #[test]
    fn test_vote_publishes_results() {
        let h = harness();
        let q = h.question("q?");
        h.engine.cast_vote(1, q, Choice::B).unwrap();
        h.engine.cast_vote(1, q, Choice::B).unwrap();

        let events = h.notifier.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            PollEvent::ResultsUpdated { question_id, results } => {
                assert_eq!(*question_id, q);
                assert_eq!(results.b_votes, 1);
                assert_eq!(results.b_percent, 100.0);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_notifier_failure_does_not_fail_vote() {
        let h = harness();
        let q = h.question("q?");
        let engine = h.engine.clone().with_notifier(Arc::new(FailingNotifier));

        let result = recorded(engine.cast_vote(1, q, Choice::A).unwrap());
        assert_eq!(result.coins_awarded, 10);
    }

    #[test]
    fn test_random_question_for_user() {
        let h = harness();
        assert!(h.engine.random_question_for(1).unwrap().is_none());

        let q = h.question("only?");
        let (question, tally) = h.engine.random_question_for(1).unwrap().unwrap();
        assert_eq!(question.id, q);
        assert!(tally.is_none());

        h.engine.cast_vote(1, q, Choice::A).unwrap();
        let (_, tally) = h.engine.random_question_for(1).unwrap().unwrap();
        assert_eq!(tally, Some(Tally { a_votes: 1, b_votes: 0 }));
    }

    #[test]
    fn test_leaderboard_ranks_by_coins() {
        let h = harness();
        let db = h.engine.database();
        db.add_coins(1, 100).unwrap();
        db.add_coins(2, 200).unwrap();
        db.add_coins(3, 150).unwrap();

        let coins: Vec<i64> = h.engine.leaderboard(3).unwrap().iter().map(|u| u.coins).collect();
        assert_eq!(coins, vec![200, 150, 100]);
    }
}
