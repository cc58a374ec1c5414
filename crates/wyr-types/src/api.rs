use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    ChannelId, Choice, Decision, GuildId, QuestionId, QuestionPayload, SubmissionId,
    SubmissionStatus, Tally, UserId,
};

// -- Questions --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: QuestionId,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub category: String,
}

/// Vote counts plus the percentages the presentation layer renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsView {
    pub a_votes: u64,
    pub b_votes: u64,
    pub total_votes: u64,
    pub a_percent: f64,
    pub b_percent: f64,
}

impl From<Tally> for ResultsView {
    fn from(tally: Tally) -> Self {
        Self {
            a_votes: tally.a_votes,
            b_votes: tally.b_votes,
            total_votes: tally.total(),
            a_percent: tally.percent(Choice::A),
            b_percent: tally.percent(Choice::B),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RandomQuestionResponse {
    pub question: QuestionResponse,
    pub already_voted: bool,
    /// Only present when the requesting user has already voted.
    pub results: Option<ResultsView>,
}

pub type AddQuestionRequest = QuestionPayload;

#[derive(Debug, Serialize)]
pub struct AddQuestionResponse {
    pub question_id: QuestionId,
}

// -- Votes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CastVoteRequest {
    pub user_id: UserId,
    pub choice: Choice,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VoteResponse {
    Recorded {
        choice: Choice,
        results: ResultsView,
        coins_awarded: i64,
        new_streak: i64,
        balance: i64,
    },
    AlreadyVoted {
        results: ResultsView,
    },
}

// -- Users --

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub coins: i64,
    pub streak: i64,
    pub last_vote_date: Option<NaiveDate>,
    pub total_votes: i64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub coins: i64,
    pub streak: i64,
}

// -- Submissions --

#[derive(Debug, Deserialize)]
pub struct SubmitQuestionRequest {
    pub submitter_id: UserId,
    #[serde(flatten)]
    pub payload: QuestionPayload,
}

#[derive(Debug, Serialize)]
pub struct SubmitQuestionResponse {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: SubmissionId,
    pub submitter_id: UserId,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub category: String,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub question_id: Option<QuestionId>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewRequest {
    pub reviewer_id: UserId,
    pub decision: Decision,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    pub question_id: Option<QuestionId>,
}

// -- Daily questions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetDailyRequest {
    pub channel_id: ChannelId,
}

#[derive(Debug, Serialize)]
pub struct DailyConfigResponse {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct DailyTestResponse {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub question_id: QuestionId,
}

// -- Report --

#[derive(Debug, Serialize)]
pub struct QuestionReport {
    #[serde(flatten)]
    pub question: QuestionResponse,
    pub results: ResultsView,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub total_questions: usize,
    pub total_votes: u64,
    pub questions: Vec<QuestionReport>,
}
