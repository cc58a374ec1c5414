use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

use wyr_types::models::{Choice, QuestionId, QuestionPayload, Tally, UserId};

use crate::error::is_unique_violation;
use crate::models::{QuestionRow, QuestionStatsRow, StreakUpdate, UserRow, VoteReceipt};
use crate::{Database, Result, StoreError};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl Database {
    // -- Users --

    /// Returns the user, creating a zeroed row first if absent.
    pub fn get_or_create_user(&self, user_id: UserId) -> Result<UserRow> {
        self.with_conn_mut(|conn| {
            ensure_user(conn, user_id)?;
            query_user(conn, user_id)?.ok_or_else(|| StoreError::not_found("user", user_id))
        })
    }

    pub fn get_user(&self, user_id: UserId) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, user_id))
    }

    /// Credit (or debit) coins; returns the new balance.
    pub fn add_coins(&self, user_id: UserId, delta: i64) -> Result<i64> {
        self.transaction(|conn| {
            ensure_user(conn, user_id)?;
            add_coins(conn, user_id, delta)
        })
    }

    /// Persist a computed streak transition and credit its bonus in one
    /// transaction. Returns the new balance.
    pub fn apply_streak_transition(&self, user_id: UserId, update: &StreakUpdate) -> Result<i64> {
        self.transaction(|conn| {
            ensure_user(conn, user_id)?;
            apply_streak(conn, user_id, update)
        })
    }

    /// Users ordered by coins descending; ties keep user id order.
    pub fn leaderboard(&self, limit: u32) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, coins, streak, last_vote_date, total_votes
                 FROM users
                 ORDER BY coins DESC, user_id ASC
                 LIMIT ?1",
            )?;

            let raw = stmt
                .query_map([limit], raw_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            raw.into_iter().map(user_from_raw).collect()
        })
    }

    // -- Votes --

    pub fn has_voted(&self, user_id: UserId, question_id: QuestionId) -> Result<bool> {
        self.with_conn(|conn| has_voted(conn, user_id, question_id))
    }

    /// Insert a vote and bump the voter's lifetime count. The primary key on
    /// (user_id, question_id) rejects a second vote with `DuplicateVote`.
    pub fn record_vote(&self, user_id: UserId, question_id: QuestionId, choice: Choice) -> Result<()> {
        self.transaction(|conn| insert_vote(conn, user_id, question_id, choice))
    }

    /// Vote insert, base reward, streak transition and the resulting tally in
    /// a single transaction. `decide` sees the voter's pre-vote row and
    /// returns the streak write to apply, if any.
    pub fn record_vote_with_rewards<F>(
        &self,
        user_id: UserId,
        question_id: QuestionId,
        choice: Choice,
        base_coins: i64,
        decide: F,
    ) -> Result<VoteReceipt>
    where
        F: FnOnce(&UserRow) -> Option<StreakUpdate>,
    {
        self.transaction(|conn| {
            insert_vote(conn, user_id, question_id, choice)?;

            let before = query_user(conn, user_id)?
                .ok_or_else(|| StoreError::not_found("user", user_id))?;
            let update = decide(&before);

            let mut balance = add_coins(conn, user_id, base_coins)?;
            let mut streak = before.streak;
            let mut bonus = 0;
            if let Some(update) = update {
                balance = apply_streak(conn, user_id, &update)?;
                streak = update.streak;
                bonus = update.bonus;
            }

            let tally = query_tally(conn, question_id)?;

            Ok(VoteReceipt {
                tally,
                coins_awarded: base_coins + bonus,
                streak,
                balance,
            })
        })
    }

    /// Counts per choice; zero for choices nobody picked.
    pub fn tally(&self, question_id: QuestionId) -> Result<Tally> {
        self.with_conn(|conn| query_tally(conn, question_id))
    }

    // -- Questions --

    pub fn add_question(&self, payload: &QuestionPayload) -> Result<QuestionId> {
        self.with_conn_mut(|conn| insert_question(conn, payload))
    }

    pub fn get_question(&self, question_id: QuestionId) -> Result<Option<QuestionRow>> {
        self.with_conn(|conn| query_question(conn, question_id))
    }

    /// `None` when the question table is empty.
    pub fn random_question(&self) -> Result<Option<QuestionRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, question, option_a, option_b, category
                     FROM questions ORDER BY RANDOM() LIMIT 1",
                    [],
                    question_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn question_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM questions", [], |r| r.get(0))?;
            Ok(count as u64)
        })
    }

    /// Every question with its tally, in id order. Read-only; backs the
    /// reporting view.
    pub fn question_stats(&self) -> Result<Vec<QuestionStatsRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT q.id, q.question, q.option_a, q.option_b, q.category,
                        COALESCE(SUM(CASE WHEN v.choice = 'a' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN v.choice = 'b' THEN 1 ELSE 0 END), 0)
                 FROM questions q
                 LEFT JOIN votes v ON v.question_id = q.id
                 GROUP BY q.id
                 ORDER BY q.id",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(QuestionStatsRow {
                        question: question_from_row(row)?,
                        tally: Tally {
                            a_votes: row.get::<_, i64>(5)? as u64,
                            b_votes: row.get::<_, i64>(6)? as u64,
                        },
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

// -- Connection-level helpers, composable inside a transaction --

type RawUser = (i64, i64, i64, Option<String>, i64);

fn raw_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn user_from_raw((user_id, coins, streak, last_vote_date, total_votes): RawUser) -> Result<UserRow> {
    Ok(UserRow {
        user_id,
        coins,
        streak,
        last_vote_date: last_vote_date.map(parse_date).transpose()?,
        total_votes,
    })
}

pub(crate) fn parse_date(value: String) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|_| StoreError::Corrupt {
        column: "last_vote_date",
        value,
    })
}

pub(crate) fn question_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuestionRow> {
    Ok(QuestionRow {
        id: row.get(0)?,
        question: row.get(1)?,
        option_a: row.get(2)?,
        option_b: row.get(3)?,
        category: row.get(4)?,
    })
}

pub(crate) fn ensure_user(conn: &Connection, user_id: UserId) -> Result<()> {
    conn.execute("INSERT OR IGNORE INTO users (user_id) VALUES (?1)", [user_id])?;
    Ok(())
}

pub(crate) fn query_user(conn: &Connection, user_id: UserId) -> Result<Option<UserRow>> {
    let raw = conn
        .query_row(
            "SELECT user_id, coins, streak, last_vote_date, total_votes
             FROM users WHERE user_id = ?1",
            [user_id],
            raw_user,
        )
        .optional()?;

    raw.map(user_from_raw).transpose()
}

fn add_coins(conn: &Connection, user_id: UserId, delta: i64) -> Result<i64> {
    let balance = conn
        .query_row(
            "UPDATE users SET coins = coins + ?2 WHERE user_id = ?1 RETURNING coins",
            params![user_id, delta],
            |r| r.get(0),
        )
        .optional()?;

    balance.ok_or_else(|| StoreError::not_found("user", user_id))
}

fn apply_streak(conn: &Connection, user_id: UserId, update: &StreakUpdate) -> Result<i64> {
    let balance = conn
        .query_row(
            "UPDATE users
             SET streak = ?2, last_vote_date = ?3, coins = coins + ?4
             WHERE user_id = ?1
             RETURNING coins",
            params![
                user_id,
                update.streak,
                update.last_vote_date.format(DATE_FORMAT).to_string(),
                update.bonus
            ],
            |r| r.get(0),
        )
        .optional()?;

    balance.ok_or_else(|| StoreError::not_found("user", user_id))
}

fn has_voted(conn: &Connection, user_id: UserId, question_id: QuestionId) -> Result<bool> {
    let voted = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM votes WHERE user_id = ?1 AND question_id = ?2)",
        params![user_id, question_id],
        |r| r.get(0),
    )?;
    Ok(voted)
}

fn insert_vote(conn: &Connection, user_id: UserId, question_id: QuestionId, choice: Choice) -> Result<()> {
    if query_question(conn, question_id)?.is_none() {
        return Err(StoreError::not_found("question", question_id));
    }
    ensure_user(conn, user_id)?;

    conn.execute(
        "INSERT INTO votes (user_id, question_id, choice) VALUES (?1, ?2, ?3)",
        params![user_id, question_id, choice.as_str()],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            StoreError::DuplicateVote {
                user_id,
                question_id,
            }
        } else {
            e.into()
        }
    })?;

    conn.execute(
        "UPDATE users SET total_votes = total_votes + 1 WHERE user_id = ?1",
        [user_id],
    )?;
    Ok(())
}

fn query_tally(conn: &Connection, question_id: QuestionId) -> Result<Tally> {
    let mut stmt =
        conn.prepare("SELECT choice, COUNT(*) FROM votes WHERE question_id = ?1 GROUP BY choice")?;

    let counts = stmt
        .query_map([question_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut tally = Tally::default();
    for (choice, count) in counts {
        match choice.parse::<Choice>() {
            Ok(Choice::A) => tally.a_votes = count as u64,
            Ok(Choice::B) => tally.b_votes = count as u64,
            Err(_) => {
                return Err(StoreError::Corrupt {
                    column: "votes.choice",
                    value: choice,
                });
            }
        }
    }
    Ok(tally)
}

pub(crate) fn insert_question(conn: &Connection, payload: &QuestionPayload) -> Result<QuestionId> {
    conn.execute(
        "INSERT INTO questions (question, option_a, option_b, category) VALUES (?1, ?2, ?3, ?4)",
        params![
            payload.question,
            payload.option_a,
            payload.option_b,
            payload.category
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn query_question(conn: &Connection, question_id: QuestionId) -> Result<Option<QuestionRow>> {
    let row = conn
        .query_row(
            "SELECT id, question, option_a, option_b, category FROM questions WHERE id = ?1",
            [question_id],
            question_from_row,
        )
        .optional()?;
    Ok(row)
}
