use serde::{Deserialize, Serialize};

use crate::api::{QuestionResponse, ResultsView};
use crate::models::{ChannelId, GuildId, QuestionId, SubmissionId, SubmissionStatus, UserId};

/// Events pushed to platform adapters over the WebSocket feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PollEvent {
    /// Live results changed after a vote; the adapter re-renders the poll message.
    ResultsUpdated {
        question_id: QuestionId,
        results: ResultsView,
    },

    /// A question should be posted to a guild's daily channel.
    DailyQuestion {
        guild_id: GuildId,
        channel_id: ChannelId,
        question: QuestionResponse,
        test: bool,
    },

    /// A submission left the pending state; the adapter DMs the submitter.
    SubmissionReviewed {
        submission_id: SubmissionId,
        submitter_id: UserId,
        status: SubmissionStatus,
    },
}

impl PollEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResultsUpdated { .. } => "results_updated",
            Self::DailyQuestion { .. } => "daily_question",
            Self::SubmissionReviewed { .. } => "submission_reviewed",
        }
    }
}
