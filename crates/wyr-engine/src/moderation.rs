use tracing::info;

use wyr_db::StoreError;
use wyr_db::models::SubmissionRow;
use wyr_types::events::PollEvent;
use wyr_types::models::{
    Decision, QuestionId, QuestionPayload, SubmissionId, SubmissionStatus, UserId,
};

use crate::engine::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub submission_id: SubmissionId,
    pub submitter_id: UserId,
    pub status: SubmissionStatus,
    /// Set when the submission was approved.
    pub question_id: Option<QuestionId>,
}

impl Engine {
    pub fn submit_question(&self, submitter_id: UserId, payload: &QuestionPayload) -> Result<SubmissionId, StoreError> {
        let id = self.db.submit_question(submitter_id, payload)?;
        info!("User {} submitted question {} for review", submitter_id, id);
        Ok(id)
    }

    pub fn pending_submissions(&self, limit: u32) -> Result<Vec<SubmissionRow>, StoreError> {
        self.db.list_pending(limit)
    }

    pub fn my_submissions(&self, submitter_id: UserId) -> Result<Vec<SubmissionRow>, StoreError> {
        self.db.submissions_by_user(submitter_id)
    }

    pub fn submission(&self, submission_id: SubmissionId) -> Result<SubmissionRow, StoreError> {
        self.db
            .get_submission(submission_id)?
            .ok_or_else(|| StoreError::not_found("submission", submission_id))
    }

    /// Apply a reviewer's decision. Only the first review of a submission
    /// succeeds; later ones fail with `InvalidTransition`.
    pub fn review_submission(
        &self,
        submission_id: SubmissionId,
        reviewer_id: UserId,
        decision: Decision,
    ) -> Result<ReviewOutcome, StoreError> {
        let submission = self.submission(submission_id)?;

        let question_id = self.db.transition_submission(submission_id, decision, reviewer_id)?;

        let outcome = ReviewOutcome {
            submission_id,
            submitter_id: submission.submitter_id,
            status: decision.target_status(),
            question_id,
        };
        info!(
            "Submission {} {} by reviewer {}",
            submission_id, outcome.status, reviewer_id
        );

        self.notify(PollEvent::SubmissionReviewed {
            submission_id,
            submitter_id: outcome.submitter_id,
            status: outcome.status,
        });

        Ok(outcome)
    }
}
