//! Course structure assembly
//!
//! Builds the selectable transfer targets for a course: its assignments
//! (plus the total-column pseudo-assignment when the course grades on a
//! standard), the module instances reachable through its sections, and its
//! examination rounds.

use crate::error::Result;
use crate::models::course::{AssignmentInfo, CourseStructure, ExaminationInfo, ModuleInfo};
use crate::models::roster::Section;
use crate::services::registry_client::RegistryClient;
use crate::services::roster_client::{RosterClient, FINAL_GRADE_ASSIGNMENT_ID};
use crate::services::section_resolver::{self, SectionKind};

pub async fn course_structure(
    roster: &RosterClient,
    registry: &RegistryClient,
    course_id: i64,
) -> Result<CourseStructure> {
    let course = roster.get_course(course_id).await?;
    let sections = roster.list_sections(course_id).await?;

    let mut assignments: Vec<AssignmentInfo> = roster
        .list_assignments(course_id)
        .await?
        .into_iter()
        .map(|a| AssignmentInfo {
            id: a.id,
            name: a.name,
            grading_type: a.grading_type,
            published: a.published,
        })
        .collect();

    // A course graded on a standard also offers its total column as a
    // source. The standard id can legitimately be 0.
    if course.grading_standard_id.is_some() {
        assignments.push(AssignmentInfo {
            id: FINAL_GRADE_ASSIGNMENT_ID,
            name: "Total column".to_string(),
            grading_type: "letter_grade".to_string(),
            published: true,
        });
    }

    let mut modules: Vec<ModuleInfo> = Vec::new();
    let mut examinations: Vec<ExaminationInfo> = Vec::new();

    for section in &sections {
        let Some(external_id) = section.external_id.as_deref() else {
            continue;
        };

        match section_resolver::classify(external_id) {
            Some(SectionKind::ModuleRound) => {
                let response = registry.list_section_modules(external_id).await?;
                for instance in response.modules {
                    merge_module(&mut modules, instance, external_id);
                }
            }
            Some(SectionKind::ExaminationRound) => {
                let Some(round_uid) = section_resolver::examination_round_id(external_id) else {
                    continue;
                };
                if examinations.iter().any(|e| e.round_uid == round_uid) {
                    continue;
                }
                let round = registry.get_examination_round(&round_uid).await?;
                examinations.push(ExaminationInfo {
                    round_uid: round.uid,
                    name: round.name,
                    period: round.period,
                    modules: round.linked_modules,
                });
            }
            None => {}
        }
    }

    tracing::info!(
        course = course_id,
        modules = modules.len(),
        examinations = examinations.len(),
        "Assembled course structure"
    );

    Ok(CourseStructure {
        name: course.name,
        assignments,
        modules,
        examinations,
    })
}

/// Merge a module instance into the accumulated list: one entry per
/// instance uid, with every contributing section id.
fn merge_module(
    modules: &mut Vec<ModuleInfo>,
    instance: crate::models::registry::ModuleInstance,
    section_id: &str,
) {
    if let Some(existing) = modules
        .iter_mut()
        .find(|m| m.instance_uid == instance.instance_uid)
    {
        if !existing.section_ids.iter().any(|s| s == section_id) {
            existing.section_ids.push(section_id.to_string());
        }
        return;
    }

    modules.push(ModuleInfo {
        instance_uid: instance.instance_uid,
        code: instance.code,
        name: instance.name,
        section_ids: vec![section_id.to_string()],
    });
}

/// The external ids of a course's module-round sections, in roster order.
pub fn module_round_section_ids(sections: &[Section]) -> Vec<String> {
    sections
        .iter()
        .filter_map(|s| s.external_id.as_deref())
        .filter(|id| section_resolver::classify(id) == Some(SectionKind::ModuleRound))
        .map(|id| id.to_string())
        .collect()
}
