//! Domain and wire types for the transfer engine

pub mod course;
pub mod registry;
pub mod roster;
pub mod transfer;

pub use course::{AssignmentInfo, CourseStructure, ExaminationInfo, ModuleInfo};
pub use registry::{
    GradeScale, GradeScaleEntry, ReportingContext, ResultCandidate, ResultDraft, StudentRef,
};
pub use roster::LearnerSubmission;
pub use transfer::{
    ActionMode, AnnotatedSubmission, Classification, CreateOutcome, SearchMode, SkipReason,
    SubmissionOutcome, TransferAudit, TransferReport, TransferTarget, UpdateOutcome,
};
