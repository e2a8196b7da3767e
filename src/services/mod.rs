//! Component implementations of the reconciliation pipeline

pub mod audit_log;
pub mod course_structure;
pub mod grade_scale_cache;
pub mod matcher;
pub mod registry_client;
pub mod result_builder;
pub mod roster_client;
pub mod section_resolver;
pub mod transfer_engine;

pub use audit_log::AuditStore;
pub use grade_scale_cache::GradeScaleCache;
pub use registry_client::RegistryClient;
pub use roster_client::{RosterClient, FINAL_GRADE_ASSIGNMENT_ID};
pub use section_resolver::SectionKind;
pub use transfer_engine::TransferEngine;
