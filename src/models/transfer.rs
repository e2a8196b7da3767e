//! Domain types for the reconciliation pipeline
//!
//! Per learner, a candidate moves through:
//! `Candidate → {Create | Update | SkipUnchanged | SkipMissingStudent |
//! SkipMissingGrade}`; only Create/Update continue to submission, ending in
//! `Submitted-Success` or `RuleRejected`. There is no retry state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::registry::{CreateResultPayload, StudentRef, UpdateResultPayload};
use super::roster::LearnerSubmission;

/// Where a result is filed: a module instance directly, or an examination
/// round that is first expanded to the set of sections it covers. Exactly
/// one of the two per transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferTarget {
    Module { instance_uid: String },
    ExaminationRound { round_uid: String },
}

impl TransferTarget {
    /// The UID the registry search path is keyed on
    pub fn uid(&self) -> &str {
        match self {
            TransferTarget::Module { instance_uid } => instance_uid,
            TransferTarget::ExaminationRound { round_uid } => round_uid,
        }
    }
}

/// Candidate search mode; doubles as the classification mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Unprocessed candidates, eligible for a new draft
    Create,
    /// Candidates with an existing draft, eligible for update
    Update,
}

/// Why a learner was skipped without submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The stored coded grade already equals the resolved one
    Unchanged,
    /// No submission matches the candidate's learner id, or no actionable
    /// draft exists for the target instance
    MissingStudent,
    /// The submission has no grade, or the grade does not resolve in the
    /// candidate's scale
    MissingGrade,
}

/// Per-learner classification outcome. Derived, never stored; recomputed
/// on every preview and every transfer.
#[derive(Debug, Clone)]
pub enum Classification {
    Create(CreateOutcome),
    Update(UpdateOutcome),
    Skip(SkipReason),
}

/// Everything the builder needs to create a new draft
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub student: StudentRef,
    /// Result-container UID from the candidate
    pub result_uid: String,
    pub target_instance_uid: String,
    pub grade_id: i64,
    pub grade_scale_id: i64,
}

/// Everything the builder needs to update an existing draft
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub student: StudentRef,
    pub draft_uid: String,
    pub grade_id: i64,
    pub grade_scale_id: i64,
    pub last_modified: Option<String>,
}

/// Action the engine would take for a previewed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionMode {
    Create,
    Update,
}

/// A gradebook row annotated with the action the engine would take
#[derive(Debug, Clone)]
pub struct AnnotatedSubmission {
    pub submission: LearnerSubmission,
    pub mode: Option<ActionMode>,
}

/// Outcome of submitting one learner's result
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Success {
        result_uid: String,
        student_registry_id: String,
    },
    /// Business-rule rejection; carries the learner's identity for the
    /// authorizing user's review and the registry's message
    RuleRejected {
        student_name: String,
        student_registry_id: String,
        student_national_id: Option<String>,
        message: String,
    },
}

/// Aggregated result of a batch submission, in submission order
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub outcomes: Vec<SubmissionOutcome>,
    pub audit: TransferAudit,
}

impl TransferReport {
    pub fn successes(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SubmissionOutcome::Success { .. }))
            .count()
    }

    pub fn rejections(&self) -> usize {
        self.outcomes.len() - self.successes()
    }
}

/// Audit document written once, best-effort, after a batch completes.
/// Losing it must not fail the transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferAudit {
    pub timestamp: DateTime<Utc>,
    pub acting_user_id: i64,
    pub source_course_id: i64,
    pub source_assignment_id: i64,
    pub target: TransferTarget,
    pub examination_date: NaiveDate,
    pub created_payloads: Vec<CreateResultPayload>,
    pub updated_payloads: Vec<UpdateResultPayload>,
}
