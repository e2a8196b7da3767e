//! Wire types for the degree-registry API
//!
//! The registry serializes PascalCase JSON. Learner results come back as
//! "candidates": one row per learner and reporting context, carrying zero
//! or one existing draft per target instance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Grade-scale catalog response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScaleCatalog {
    #[serde(default)]
    pub grade_scales: Vec<GradeScale>,
}

/// One grading scale: an ordered set of letter-code → internal-id entries.
/// The registry serializes the scale id as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GradeScale {
    pub id: String,
    #[serde(default)]
    pub grades: Vec<GradeScaleEntry>,
}

impl GradeScale {
    /// Numeric form of the scale id; `None` if the registry sent garbage.
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.trim().parse().ok()
    }
}

/// One entry of a grading scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GradeScaleEntry {
    pub id: i64,
    pub code: Option<String>,
}

/// Search request body for the paginated candidate search
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchCriteria {
    /// Processing-state filter: `UNPROCESSED` or `DRAFT`
    pub filtering: Vec<String>,
    /// Eligible section UIDs
    pub section_ids: Vec<String>,
    pub institution_id: i64,
    pub order_by: Vec<String>,
    pub page: u32,
    pub limit: u32,
}

/// One page of candidate search results
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<ResultCandidate>,
    pub total_count: u64,
}

/// A learner's existing result state in the registry for one target
/// instance. Read-only snapshot, fetched fresh per transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultCandidate {
    /// Result-container UID; doubles as the study-result id on create
    pub uid: String,
    pub student: StudentRef,
    pub reporting_context: ReportingContext,
    #[serde(default)]
    pub results_on_instances: Vec<InstanceResult>,
}

impl ResultCandidate {
    /// The existing draft filed against the given module instance, if any.
    pub fn draft_for_module(&self, instance_uid: &str) -> Option<&ResultDraft> {
        self.results_on_instances
            .iter()
            .filter_map(|r| r.draft.as_ref())
            .find(|d| d.module_instance_uid.as_deref() == Some(instance_uid))
    }

    /// The existing draft filed against the given examination round, if any.
    pub fn draft_for_examination_round(&self, round_uid: &str) -> Option<&ResultDraft> {
        self.results_on_instances
            .iter()
            .filter_map(|r| r.draft.as_ref())
            .find(|d| d.examination_round_uid.as_deref() == Some(round_uid))
    }
}

/// Learner identity as the registry reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StudentRef {
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    /// Shown only in rejection reports; never logged or persisted
    pub national_id: Option<String>,
}

impl StudentRef {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Which grade scale and target instance a candidate reports against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportingContext {
    pub grade_scale_id: i64,
    /// Module-instance UID the result is filed against
    pub target_instance_uid: String,
    /// Section (course-round) UID, present on examination-round lookups
    #[serde(default)]
    pub section_uid: Option<String>,
}

/// Per-instance result wrapper; the draft is absent for unprocessed rows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceResult {
    #[serde(default)]
    pub draft: Option<ResultDraft>,
}

/// An already-created but not-yet-finalized result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultDraft {
    pub uid: String,
    /// Currently stored coded grade
    pub grade_id: Option<i64>,
    /// Stored grade as a scale entry (carries the letter code)
    #[serde(default)]
    pub grade: Option<GradeScaleEntry>,
    #[serde(default)]
    pub module_instance_uid: Option<String>,
    #[serde(default)]
    pub examination_round_uid: Option<String>,
    /// Last-modified timestamp echoed back on update for lost-update
    /// detection
    pub last_modified: Option<String>,
}

/// One page of an examination round's reporting opportunities, used to
/// expand the round to its underlying section set
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OpportunityPage {
    #[serde(default)]
    pub results: Vec<Opportunity>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Opportunity {
    pub reporting_context: OpportunityContext,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OpportunityContext {
    pub section_uid: String,
}

/// Payload creating one new result draft
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateResultPayload {
    /// Result-container UID (doubles as the new draft id)
    pub uid: String,
    pub study_result_uid: String,
    pub target_instance_uid: String,
    pub grade_id: i64,
    pub grade_scale_id: i64,
    pub examination_date: NaiveDate,
}

/// Payload updating one existing draft
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateResultPayload {
    /// The draft's own UID
    pub result_uid: String,
    pub grade_id: i64,
    pub grade_scale_id: i64,
    pub examination_date: NaiveDate,
    /// Echo of the draft's last-modified timestamp; the registry rejects
    /// the write if the draft changed since it was read
    pub last_modified: Option<String>,
}

/// Envelope for the create endpoint. The registry accepts a batch but the
/// driver always submits a singleton to keep per-learner failures isolated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateEnvelope {
    pub institution_id: i64,
    pub results: Vec<CreateResultPayload>,
}

/// Envelope for the update endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateEnvelope {
    pub results: Vec<UpdateResultPayload>,
}

/// Response from the create/update endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaveResponse {
    #[serde(default)]
    pub results: Vec<SavedResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavedResult {
    pub uid: String,
}

/// Structured error body the registry attaches to non-2xx responses
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegistryErrorBody {
    pub error_group: Option<String>,
    pub message: Option<String>,
}

/// Bilingual display name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct LocalizedName {
    pub en: String,
    pub sv: String,
}

/// Date period of an examination round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatePeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Module instances reachable through one section (course round)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SectionModulesResponse {
    pub section_code: Option<String>,
    #[serde(default)]
    pub modules: Vec<ModuleInstance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleInstance {
    pub instance_uid: String,
    pub code: String,
    pub name: LocalizedName,
}

/// Examination-round metadata
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExaminationRoundResponse {
    pub uid: String,
    pub name: LocalizedName,
    pub period: Option<DatePeriod>,
    #[serde(default)]
    pub linked_modules: Vec<LinkedModule>,
}

/// A module reference linked to an examination round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkedModule {
    pub course_code: String,
    pub exam_code: String,
    pub section_code: String,
}
