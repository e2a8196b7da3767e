//! Course structure assembled for target selection
//!
//! The engine's caller presents these to the user when choosing what to
//! transfer: the course's assignments, the module instances reachable
//! through its sections, and its examination rounds.

use serde::Serialize;

use super::registry::{DatePeriod, LinkedModule, LocalizedName};

#[derive(Debug, Clone, Serialize)]
pub struct CourseStructure {
    pub name: String,
    pub assignments: Vec<AssignmentInfo>,
    pub modules: Vec<ModuleInfo>,
    pub examinations: Vec<ExaminationInfo>,
}

/// Assignment selectable as a grade source. Id `0` is the final-grade
/// pseudo-assignment backed by the gradebook's total column.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentInfo {
    pub id: i64,
    pub name: String,
    pub grading_type: String,
    pub published: bool,
}

/// A module instance with every section that maps to it, merged across the
/// course's sections
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInfo {
    pub instance_uid: String,
    pub code: String,
    pub name: LocalizedName,
    pub section_ids: Vec<String>,
}

/// An examination round of the course, deduplicated by UID
#[derive(Debug, Clone, Serialize)]
pub struct ExaminationInfo {
    pub round_uid: String,
    pub name: LocalizedName,
    pub period: Option<DatePeriod>,
    pub modules: Vec<LinkedModule>,
}
