use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use wyr_types::models::{
    Decision, QuestionId, QuestionPayload, SubmissionId, SubmissionStatus, UserId,
};

use crate::models::SubmissionRow;
use crate::queries::insert_question;
use crate::{Database, Result, StoreError};

const SUBMISSION_COLUMNS: &str = "id, submitter_id, question, option_a, option_b, category, \
     status, submitted_at, reviewed_by, reviewed_at, question_id";

impl Database {
    // -- Submissions --

    pub fn submit_question(&self, submitter_id: UserId, payload: &QuestionPayload) -> Result<SubmissionId> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO submissions (submitter_id, question, option_a, option_b, category)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    submitter_id,
                    payload.question,
                    payload.option_a,
                    payload.option_b,
                    payload.category
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_submission(&self, submission_id: SubmissionId) -> Result<Option<SubmissionRow>> {
        self.with_conn(|conn| query_submission(conn, submission_id))
    }

    /// Pending submissions, oldest first.
    pub fn list_pending(&self, limit: u32) -> Result<Vec<SubmissionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions
                 WHERE status = 'pending'
                 ORDER BY submitted_at ASC, id ASC
                 LIMIT ?1"
            );
            collect_submissions(conn, &sql, [limit])
        })
    }

    /// All submissions from one user, newest first.
    pub fn submissions_by_user(&self, submitter_id: UserId) -> Result<Vec<SubmissionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions
                 WHERE submitter_id = ?1
                 ORDER BY submitted_at DESC, id DESC"
            );
            collect_submissions(conn, &sql, [submitter_id])
        })
    }

    /// Apply a reviewer's decision to a pending submission. Approval creates
    /// the question in the same transaction and returns its id. The write only
    /// matches while the row is still pending, so concurrent reviewers cannot
    /// both win.
    pub fn transition_submission(
        &self,
        submission_id: SubmissionId,
        decision: Decision,
        reviewer_id: UserId,
    ) -> Result<Option<QuestionId>> {
        match decision {
            Decision::Approve => self.approve_submission(submission_id, reviewer_id).map(Some),
            Decision::Reject => self.reject_submission(submission_id, reviewer_id).map(|()| None),
        }
    }

    pub fn reject_submission(&self, submission_id: SubmissionId, reviewer_id: UserId) -> Result<()> {
        self.transaction(|conn| {
            transition(conn, submission_id, SubmissionStatus::Rejected, reviewer_id, None)
        })
    }

    /// Create a question from the submission payload and mark the submission
    /// approved, atomically. Returns the new question id.
    pub fn approve_submission(&self, submission_id: SubmissionId, reviewer_id: UserId) -> Result<QuestionId> {
        self.transaction(|conn| {
            let submission = query_submission(conn, submission_id)?
                .ok_or_else(|| StoreError::not_found("submission", submission_id))?;
            if submission.status.is_terminal() {
                return Err(StoreError::InvalidTransition {
                    submission_id,
                    current: submission.status,
                });
            }

            let question_id = insert_question(conn, &submission.payload)?;
            transition(
                conn,
                submission_id,
                SubmissionStatus::Approved,
                reviewer_id,
                Some(question_id),
            )?;
            Ok(question_id)
        })
    }
}

fn transition(
    conn: &Connection,
    submission_id: SubmissionId,
    status: SubmissionStatus,
    reviewer_id: UserId,
    question_id: Option<QuestionId>,
) -> Result<()> {
    let changed = conn.execute(
        "UPDATE submissions
         SET status = ?2, reviewed_by = ?3, reviewed_at = datetime('now'), question_id = ?4
         WHERE id = ?1 AND status = 'pending'",
        params![submission_id, status.as_str(), reviewer_id, question_id],
    )?;

    if changed == 1 {
        return Ok(());
    }

    match query_submission(conn, submission_id)? {
        Some(row) => Err(StoreError::InvalidTransition {
            submission_id,
            current: row.status,
        }),
        None => Err(StoreError::not_found("submission", submission_id)),
    }
}

type RawSubmission = (
    i64,
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<i64>,
    Option<String>,
    Option<i64>,
);

/// SQLite's `datetime('now')` writes "YYYY-MM-DD HH:MM:SS" in UTC.
fn parse_timestamp(value: String, column: &'static str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = value.parse::<DateTime<Utc>>() {
        return Ok(ts);
    }
    NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|_| StoreError::Corrupt { column, value })
}

fn raw_submission(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSubmission> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

fn submission_from_raw(raw: RawSubmission) -> Result<SubmissionRow> {
    let (
        id,
        submitter_id,
        question,
        option_a,
        option_b,
        category,
        status,
        submitted_at,
        reviewed_by,
        reviewed_at,
        question_id,
    ) = raw;

    let status = status.parse::<SubmissionStatus>().map_err(|_| StoreError::Corrupt {
        column: "submissions.status",
        value: status.clone(),
    })?;
    let submitted_at = parse_timestamp(submitted_at, "submissions.submitted_at")?;
    let reviewed_at = reviewed_at
        .map(|ts| parse_timestamp(ts, "submissions.reviewed_at"))
        .transpose()?;

    Ok(SubmissionRow {
        id,
        submitter_id,
        payload: QuestionPayload {
            question,
            option_a,
            option_b,
            category,
        },
        status,
        submitted_at,
        reviewed_by,
        reviewed_at,
        question_id,
    })
}

fn query_submission(conn: &Connection, submission_id: SubmissionId) -> Result<Option<SubmissionRow>> {
    let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1");
    let raw = conn.query_row(&sql, [submission_id], raw_submission).optional()?;
    raw.map(submission_from_raw).transpose()
}

fn collect_submissions<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<SubmissionRow>> {
    let mut stmt = conn.prepare(sql)?;
    let raw = stmt
        .query_map(params, raw_submission)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    raw.into_iter().map(submission_from_raw).collect()
}
