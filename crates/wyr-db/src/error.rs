use thiserror::Error;

use wyr_types::models::{QuestionId, SubmissionId, SubmissionStatus, UserId};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the ledger store. The core never retries; callers
/// decide what to do with transient `Sqlite` failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The (user, question) pair already has a vote.
    #[error("user {user_id} already voted on question {question_id}")]
    DuplicateVote {
        user_id: UserId,
        question_id: QuestionId,
    },

    /// A review was attempted on a submission that is no longer pending.
    #[error("submission {submission_id} is already {current}")]
    InvalidTransition {
        submission_id: SubmissionId,
        current: SubmissionStatus,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// A stored value could not be decoded (bad date, unknown enum tag).
    #[error("corrupt {column} value '{value}'")]
    Corrupt { column: &'static str, value: String },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// True when a write failed on a PRIMARY KEY / UNIQUE constraint.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}
