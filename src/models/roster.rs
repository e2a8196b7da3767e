//! Wire types for the source roster API (learning-management gradebook)
//!
//! The roster serializes snake_case JSON. Only the fields the engine reads
//! are modeled; everything else in the responses is ignored.

use serde::Deserialize;

/// A section of a course in the roster. The external id is the opaque
/// identifier whose shape encodes whether the section maps to a module
/// round or an examination round (see `services::section_resolver`).
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub external_id: Option<String>,
}

/// User subobject embedded in submissions and enrollments
#[derive(Debug, Clone, Deserialize)]
pub struct RosterUser {
    pub id: i64,
    /// "Last, First" display form
    pub sortable_name: String,
    /// Institutional id; equals the learner's registry UID when present
    pub integration_id: Option<String>,
}

/// One gradebook row for an assignment
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRow {
    pub grade: Option<String>,
    pub user: RosterUser,
}

/// Grade summary of an enrollment (used for the total-grade column)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EnrollmentGrades {
    pub unposted_current_grade: Option<String>,
}

/// One enrollment row, read for the final-grade pseudo-assignment
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentRow {
    pub user: RosterUser,
    #[serde(default)]
    pub grades: Option<EnrollmentGrades>,
}

/// The authenticated roster user performing the transfer
#[derive(Debug, Clone, Deserialize)]
pub struct RosterProfile {
    pub id: i64,
    pub name: String,
}

/// An assignment of a course
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentRow {
    pub id: i64,
    pub name: String,
    pub grading_type: String,
    #[serde(default)]
    pub published: bool,
}

/// Course metadata
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRow {
    pub id: i64,
    pub name: String,
    pub grading_standard_id: Option<i64>,
}

/// One learner's row for one assignment, immutable once fetched.
///
/// `learner_id` is the institutional id; rows without one are kept so the
/// preview can show them, but they can never match a registry candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerSubmission {
    pub learner_id: Option<String>,
    pub display_name: String,
    pub letter_grade: Option<String>,
}

impl LearnerSubmission {
    pub fn from_submission(row: SubmissionRow) -> Self {
        Self {
            learner_id: row.user.integration_id,
            display_name: row.user.sortable_name,
            letter_grade: row.grade,
        }
    }

    pub fn from_enrollment(row: EnrollmentRow) -> Self {
        Self {
            learner_id: row.user.integration_id,
            display_name: row.user.sortable_name,
            letter_grade: row.grades.and_then(|g| g.unposted_current_grade),
        }
    }
}
