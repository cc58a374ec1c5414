use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Externally assigned chat-platform identities.
pub type UserId = i64;
pub type GuildId = i64;
pub type ChannelId = i64;

/// Store-assigned sequential identities.
pub type QuestionId = i64;
pub type SubmissionId = i64;

pub const DEFAULT_CATEGORY: &str = "General";

/// One of the two options a voter can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    #[serde(alias = "A")]
    A,
    #[serde(alias = "B")]
    B,
}

impl Choice {
    /// Stored form, matches the `votes.choice` CHECK constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Choice {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" | "A" => Ok(Self::A),
            "b" | "B" => Ok(Self::B),
            other => Err(ParseEnumError {
                kind: "choice",
                value: other.to_string(),
            }),
        }
    }
}

/// Moderation state of a submitted question. `Pending` is the only
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ParseEnumError {
                kind: "submission status",
                value: other.to_string(),
            }),
        }
    }
}

/// Reviewer verdict on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(self) -> SubmissionStatus {
        match self {
            Self::Approve => SubmissionStatus::Approved,
            Self::Reject => SubmissionStatus::Rejected,
        }
    }
}

/// Aggregate vote counts for one question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub a_votes: u64,
    pub b_votes: u64,
}

impl Tally {
    pub fn total(&self) -> u64 {
        self.a_votes + self.b_votes
    }

    pub fn count(&self, choice: Choice) -> u64 {
        match choice {
            Choice::A => self.a_votes,
            Choice::B => self.b_votes,
        }
    }

    /// Share of the vote in percent; 0 when nobody has voted yet.
    pub fn percent(&self, choice: Choice) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(choice) as f64 / total as f64 * 100.0
    }
}

/// Question text plus its two options, as submitted or added by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    #[serde(default = "default_category")]
    pub category: String,
}

impl QuestionPayload {
    pub fn new(question: &str, option_a: &str, option_b: &str, category: Option<&str>) -> Self {
        Self {
            question: question.to_string(),
            option_a: option_a.to_string(),
            option_b: option_b.to_string(),
            category: category.unwrap_or(DEFAULT_CATEGORY).to_string(),
        }
    }
}

pub fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}
