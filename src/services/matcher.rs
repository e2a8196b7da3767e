//! Result matching and mode classification
//!
//! For each registry candidate, find the matching gradebook row by
//! institutional id and decide the action: create, update, or one of the
//! skip outcomes. Matching is exact learner-id equality only; no fuzzy or
//! name-based matching is ever performed, to avoid misfiling grades.
//!
//! The grade resolver is passed in as a closure over the cached catalog so
//! the classification itself stays synchronous and pure.

use crate::models::registry::{GradeScaleEntry, ResultCandidate, ResultDraft};
use crate::models::roster::LearnerSubmission;
use crate::models::transfer::{
    Classification, CreateOutcome, SearchMode, SkipReason, TransferTarget, UpdateOutcome,
};

/// The gradebook row matching a candidate's learner id, if any.
pub fn find_submission<'a>(
    candidate: &ResultCandidate,
    submissions: &'a [LearnerSubmission],
) -> Option<&'a LearnerSubmission> {
    submissions
        .iter()
        .find(|s| s.learner_id.as_deref() == Some(candidate.student.uid.as_str()))
}

fn draft_for_target<'a>(
    candidate: &'a ResultCandidate,
    target: &TransferTarget,
) -> Option<&'a ResultDraft> {
    match target {
        TransferTarget::Module { instance_uid } => candidate.draft_for_module(instance_uid),
        TransferTarget::ExaminationRound { round_uid } => {
            candidate.draft_for_examination_round(round_uid)
        }
    }
}

/// Classify one candidate against the submission set.
///
/// `resolve_grade` maps (scale id, letter grade) to the scale entry, or
/// `None` for an unmapped grade.
pub fn classify<F>(
    candidate: &ResultCandidate,
    submissions: &[LearnerSubmission],
    mode: SearchMode,
    target: &TransferTarget,
    resolve_grade: F,
) -> Classification
where
    F: FnOnce(i64, &str) -> Option<GradeScaleEntry>,
{
    let Some(submission) = find_submission(candidate, submissions) else {
        tracing::debug!(
            student = %candidate.student.uid,
            "No gradebook row for candidate"
        );
        return Classification::Skip(SkipReason::MissingStudent);
    };

    let letter = match submission.letter_grade.as_deref() {
        Some(letter) if !letter.trim().is_empty() => letter,
        _ => return Classification::Skip(SkipReason::MissingGrade),
    };

    let scale_id = candidate.reporting_context.grade_scale_id;
    let Some(entry) = resolve_grade(scale_id, letter) else {
        tracing::debug!(
            student = %candidate.student.uid,
            scale = scale_id,
            "Letter grade does not resolve in the candidate's scale"
        );
        return Classification::Skip(SkipReason::MissingGrade);
    };

    match mode {
        // The candidate set holds only unprocessed records; no draft
        // comparison applies.
        SearchMode::Create => Classification::Create(CreateOutcome {
            student: candidate.student.clone(),
            result_uid: candidate.uid.clone(),
            target_instance_uid: candidate.reporting_context.target_instance_uid.clone(),
            grade_id: entry.id,
            grade_scale_id: scale_id,
        }),

        SearchMode::Update => {
            // An absent draft is skipped, never dereferenced.
            let Some(draft) = draft_for_target(candidate, target) else {
                return Classification::Skip(SkipReason::MissingStudent);
            };

            if draft.grade_id == Some(entry.id) {
                tracing::debug!(
                    student = %candidate.student.uid,
                    grade = entry.id,
                    "Stored grade unchanged"
                );
                return Classification::Skip(SkipReason::Unchanged);
            }

            Classification::Update(UpdateOutcome {
                student: candidate.student.clone(),
                draft_uid: draft.uid.clone(),
                grade_id: entry.id,
                grade_scale_id: scale_id,
                last_modified: draft.last_modified.clone(),
            })
        }
    }
}
