//! Result-payload construction
//!
//! Builds the exact shape the registry expects for creating or updating a
//! single result. The examination date is a calendar date with no time
//! component and applies uniformly to every learner in the batch;
//! per-learner dates are corrected afterward directly in the registry if
//! needed.

use chrono::NaiveDate;

use crate::models::registry::{CreateResultPayload, UpdateResultPayload};
use crate::models::transfer::{CreateOutcome, UpdateOutcome};

pub fn build_create(outcome: &CreateOutcome, examination_date: NaiveDate) -> CreateResultPayload {
    CreateResultPayload {
        // The result-container uid doubles as the new draft's id.
        uid: outcome.result_uid.clone(),
        study_result_uid: outcome.result_uid.clone(),
        target_instance_uid: outcome.target_instance_uid.clone(),
        grade_id: outcome.grade_id,
        grade_scale_id: outcome.grade_scale_id,
        examination_date,
    }
}

pub fn build_update(outcome: &UpdateOutcome, examination_date: NaiveDate) -> UpdateResultPayload {
    UpdateResultPayload {
        result_uid: outcome.draft_uid.clone(),
        grade_id: outcome.grade_id,
        grade_scale_id: outcome.grade_scale_id,
        examination_date,
        // Echoed so the registry can detect a lost update.
        last_modified: outcome.last_modified.clone(),
    }
}
