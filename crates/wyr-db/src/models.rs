//! Database row types. These map directly to SQLite rows.
//! Distinct from the wyr-types API shapes to keep the DB layer independent.
use chrono::{DateTime, NaiveDate, Utc};

use wyr_types::api::{DailyConfigResponse, QuestionResponse, SubmissionResponse, UserResponse};
use wyr_types::models::{
    ChannelId, GuildId, QuestionId, QuestionPayload, SubmissionId, SubmissionStatus, Tally, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: UserId,
    pub coins: i64,
    pub streak: i64,
    pub last_vote_date: Option<NaiveDate>,
    pub total_votes: i64,
}

impl UserRow {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            coins: 0,
            streak: 0,
            last_vote_date: None,
            total_votes: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    pub id: QuestionId,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct SubmissionRow {
    pub id: SubmissionId,
    pub submitter_id: UserId,
    pub payload: QuestionPayload,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub question_id: Option<QuestionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyConfigRow {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct QuestionStatsRow {
    pub question: QuestionRow,
    pub tally: Tally,
}

/// New persisted streak state plus the bonus to credit with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub streak: i64,
    pub last_vote_date: NaiveDate,
    pub bonus: i64,
}

/// What a successful vote wrote, read back inside the same transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteReceipt {
    pub tally: Tally,
    pub coins_awarded: i64,
    pub streak: i64,
    pub balance: i64,
}

// -- Conversions into wire types --

impl From<QuestionRow> for QuestionResponse {
    fn from(row: QuestionRow) -> Self {
        Self {
            id: row.id,
            question: row.question,
            option_a: row.option_a,
            option_b: row.option_b,
            category: row.category,
        }
    }
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            coins: row.coins,
            streak: row.streak,
            last_vote_date: row.last_vote_date,
            total_votes: row.total_votes,
        }
    }
}

impl From<DailyConfigRow> for DailyConfigResponse {
    fn from(row: DailyConfigRow) -> Self {
        Self {
            guild_id: row.guild_id,
            channel_id: row.channel_id,
            enabled: row.enabled,
        }
    }
}

impl From<SubmissionRow> for SubmissionResponse {
    fn from(row: SubmissionRow) -> Self {
        Self {
            id: row.id,
            submitter_id: row.submitter_id,
            question: row.payload.question,
            option_a: row.payload.option_a,
            option_b: row.payload.option_b,
            category: row.payload.category,
            status: row.status,
            submitted_at: row.submitted_at,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            question_id: row.question_id,
        }
    }
}
