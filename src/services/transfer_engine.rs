//! Transfer orchestration and the batch submission driver
//!
//! One engine handles both target kinds: a module instance (filed against
//! the course's module-round sections) and an examination round (expanded
//! through the registry to the section set it covers). The pipeline per
//! transfer: resolve eligible sections, run the create and update
//! candidate searches, classify each candidate against the submission set,
//! build payloads, submit them one at a time, then write the audit
//! document.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::error::{Result, TransferError};
use crate::models::registry::{CreateResultPayload, StudentRef, UpdateResultPayload};
use crate::models::roster::LearnerSubmission;
use crate::models::transfer::{
    ActionMode, AnnotatedSubmission, Classification, SearchMode, SubmissionOutcome,
    TransferAudit, TransferReport, TransferTarget,
};
use crate::services::audit_log::AuditStore;
use crate::services::course_structure::{self, module_round_section_ids};
use crate::services::grade_scale_cache::{find_grade, GradeScaleCache};
use crate::services::matcher;
use crate::services::registry_client::RegistryClient;
use crate::services::result_builder;
use crate::services::roster_client::RosterClient;

/// The reconciliation and transfer engine
pub struct TransferEngine {
    roster: Arc<RosterClient>,
    registry: Arc<RegistryClient>,
    scales: Arc<GradeScaleCache>,
    audit: AuditStore,
}

impl TransferEngine {
    pub fn new(
        roster: Arc<RosterClient>,
        registry: Arc<RegistryClient>,
        scales: Arc<GradeScaleCache>,
        audit: AuditStore,
    ) -> Self {
        Self {
            roster,
            registry,
            scales,
            audit,
        }
    }

    /// The section UIDs a candidate search may cover for this target.
    async fn eligible_sections(
        &self,
        course_id: i64,
        target: &TransferTarget,
    ) -> Result<Vec<String>> {
        match target {
            TransferTarget::Module { .. } => {
                let sections = self.roster.list_sections(course_id).await?;
                tracing::info!(
                    course = course_id,
                    sections = sections.len(),
                    "Fetched course sections"
                );
                Ok(module_round_section_ids(&sections))
            }
            TransferTarget::ExaminationRound { round_uid } => {
                Ok(self.registry.expand_examination_round(round_uid).await?)
            }
        }
    }

    /// Classify every candidate of one search mode. Returns the
    /// classifications in candidate order, paired with the candidate's
    /// learner id for annotation.
    async fn classify_candidates(
        &self,
        candidates: &[crate::models::registry::ResultCandidate],
        submissions: &[LearnerSubmission],
        mode: SearchMode,
        target: &TransferTarget,
    ) -> Result<Vec<(String, Classification)>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let catalog = self.scales.catalog().await?;

        Ok(candidates
            .iter()
            .map(|candidate| {
                let classification =
                    matcher::classify(candidate, submissions, mode, target, |scale, letter| {
                        find_grade(&catalog, scale, letter).cloned()
                    });
                (candidate.student.uid.clone(), classification)
            })
            .collect())
    }

    /// Preview: the submission set annotated per learner with the action a
    /// transfer would take. Recomputed on every call; nothing is stored.
    pub async fn get_results(
        &self,
        course_id: i64,
        assignment_id: i64,
        target: &TransferTarget,
    ) -> Result<Vec<AnnotatedSubmission>> {
        tracing::info!(
            course = course_id,
            assignment = assignment_id,
            "Getting results for preview"
        );

        let submissions = self.roster.fetch_grades(course_id, assignment_id).await?;
        let sections = self.eligible_sections(course_id, target).await?;

        let creates = self
            .registry
            .search(target, &sections, SearchMode::Create)
            .await?;
        let updates = self
            .registry
            .search(target, &sections, SearchMode::Update)
            .await?;

        tracing::info!(
            creates = creates.len(),
            updates = updates.len(),
            "Found candidate results in the registry"
        );

        let mut modes: HashMap<String, ActionMode> = HashMap::new();

        for (learner_id, classification) in self
            .classify_candidates(&creates, &submissions, SearchMode::Create, target)
            .await?
        {
            if matches!(classification, Classification::Create(_)) {
                modes.insert(learner_id, ActionMode::Create);
            }
        }

        for (learner_id, classification) in self
            .classify_candidates(&updates, &submissions, SearchMode::Update, target)
            .await?
        {
            if matches!(classification, Classification::Update(_)) {
                modes.insert(learner_id, ActionMode::Update);
            }
        }

        Ok(submissions
            .into_iter()
            .map(|submission| {
                let mode = submission
                    .learner_id
                    .as_deref()
                    .and_then(|id| modes.get(id).copied());
                AnnotatedSubmission { submission, mode }
            })
            .collect())
    }

    /// Run a full transfer: classify, submit, audit, report.
    pub async fn transfer_results(
        &self,
        course_id: i64,
        assignment_id: i64,
        target: &TransferTarget,
        examination_date: NaiveDate,
    ) -> Result<TransferReport> {
        tracing::info!(
            course = course_id,
            assignment = assignment_id,
            "Transferring results"
        );

        let submissions = self.roster.fetch_grades(course_id, assignment_id).await?;
        let acting_user = self.roster.current_user().await?;
        let sections = self.eligible_sections(course_id, target).await?;

        let create_candidates = self
            .registry
            .search(target, &sections, SearchMode::Create)
            .await?;
        let update_candidates = self
            .registry
            .search(target, &sections, SearchMode::Update)
            .await?;

        tracing::info!(
            creates = create_candidates.len(),
            updates = update_candidates.len(),
            "Found candidate results in the registry"
        );

        let mut creates: Vec<(CreateResultPayload, StudentRef)> = Vec::new();
        for (_, classification) in self
            .classify_candidates(&create_candidates, &submissions, SearchMode::Create, target)
            .await?
        {
            if let Classification::Create(outcome) = classification {
                let payload = result_builder::build_create(&outcome, examination_date);
                creates.push((payload, outcome.student));
            }
        }

        let mut updates: Vec<(UpdateResultPayload, StudentRef)> = Vec::new();
        for (_, classification) in self
            .classify_candidates(&update_candidates, &submissions, SearchMode::Update, target)
            .await?
        {
            if let Classification::Update(outcome) = classification {
                let payload = result_builder::build_update(&outcome, examination_date);
                updates.push((payload, outcome.student));
            }
        }

        let audit = TransferAudit {
            timestamp: Utc::now(),
            acting_user_id: acting_user.id,
            source_course_id: course_id,
            source_assignment_id: assignment_id,
            target: target.clone(),
            examination_date,
            created_payloads: creates.iter().map(|(p, _)| p.clone()).collect(),
            updated_payloads: updates.iter().map(|(p, _)| p.clone()).collect(),
        };

        self.submit(creates, updates, audit).await
    }

    /// Batch submission driver: one singleton call per learner, in order,
    /// rule rejections absorbed, anything else fatal. After both lists are
    /// processed the audit document is written best-effort.
    pub async fn submit(
        &self,
        creates: Vec<(CreateResultPayload, StudentRef)>,
        updates: Vec<(UpdateResultPayload, StudentRef)>,
        audit: TransferAudit,
    ) -> Result<TransferReport> {
        let mut outcomes: Vec<SubmissionOutcome> = Vec::new();

        tracing::info!(count = creates.len(), "Grades to be created");
        for (payload, student) in creates {
            match self.registry.create_result(payload).await {
                Ok(saved) => outcomes.push(SubmissionOutcome::Success {
                    result_uid: saved.uid,
                    student_registry_id: student.uid,
                }),
                Err(e) if e.is_rule_violation() => {
                    outcomes.push(rejection(student, &e));
                }
                Err(e) => return Err(TransferError::Registry(e)),
            }
        }

        tracing::info!(count = updates.len(), "Grades to be updated");
        for (payload, student) in updates {
            match self.registry.update_result(payload).await {
                Ok(saved) => outcomes.push(SubmissionOutcome::Success {
                    result_uid: saved.uid,
                    student_registry_id: student.uid,
                }),
                Err(e) if e.is_rule_violation() => {
                    outcomes.push(rejection(student, &e));
                }
                Err(e) => return Err(TransferError::Registry(e)),
            }
        }

        self.audit.record_best_effort(&audit).await;

        Ok(TransferReport { outcomes, audit })
    }

    /// Course structure for target selection (see `services::course_structure`).
    pub async fn course_structure(
        &self,
        course_id: i64,
    ) -> Result<crate::models::course::CourseStructure> {
        course_structure::course_structure(&self.roster, &self.registry, course_id).await
    }
}

fn rejection(student: StudentRef, error: &crate::error::RegistryError) -> SubmissionOutcome {
    let message = match error {
        crate::error::RegistryError::Rule { message } => message.clone(),
        other => other.to_string(),
    };

    SubmissionOutcome::RuleRejected {
        student_name: student.display_name(),
        student_registry_id: student.uid,
        student_national_id: student.national_id,
        message,
    }
}
