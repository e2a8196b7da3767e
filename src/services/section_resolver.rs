//! Section classification by external-identifier shape
//!
//! Sections arrive from the roster tagged with an opaque external id whose
//! shape encodes its kind: module rounds are provisioned with a bare UUID
//! (anything `Uuid::parse_str` accepts), examination rounds with a
//! prefixed round code. Already-provisioned
//! sections must keep working, so two deprecated round encodings are still
//! recognized alongside the current one:
//!
//! - `ER.<uuid>` (current)
//! - `ER.<uuid>.ACC` (deprecated accessibility-cohort suffix)
//! - `ER-<uuid>` (legacy hyphen form)
//!
//! An id matching none of the patterns classifies as `None` and contributes
//! to neither the module nor the examination path.

use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

/// What kind of registry object a section maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    ModuleRound,
    ExaminationRound,
}

fn examination_round_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ER\.([a-z0-9-]+)(\.ACC)?$").unwrap())
}

fn legacy_examination_round_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ER-([a-z0-9-]+)$").unwrap())
}

/// Classify a section's external id, or `None` for unrecognized shapes.
pub fn classify(external_id: &str) -> Option<SectionKind> {
    if Uuid::parse_str(external_id).is_ok() {
        return Some(SectionKind::ModuleRound);
    }
    if examination_round_re().is_match(external_id)
        || legacy_examination_round_re().is_match(external_id)
    {
        return Some(SectionKind::ExaminationRound);
    }
    None
}

/// Extract the examination-round UID from any recognized round encoding.
pub fn examination_round_id(external_id: &str) -> Option<String> {
    if let Some(captures) = examination_round_re().captures(external_id) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }
    legacy_examination_round_re()
        .captures(external_id)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND_UID: &str = "199aee2c-8a2b-11e9-b5e5-9151d4b4b321";

    #[test]
    fn bare_uuid_is_a_module_round() {
        assert_eq!(classify(ROUND_UID), Some(SectionKind::ModuleRound));
    }

    #[test]
    fn current_encoding_is_an_examination_round() {
        let id = format!("ER.{ROUND_UID}");
        assert_eq!(classify(&id), Some(SectionKind::ExaminationRound));
        assert_eq!(examination_round_id(&id).as_deref(), Some(ROUND_UID));
    }

    #[test]
    fn deprecated_encodings_still_classify() {
        for id in [format!("ER.{ROUND_UID}.ACC"), format!("ER-{ROUND_UID}")] {
            assert_eq!(classify(&id), Some(SectionKind::ExaminationRound), "{id}");
            assert_eq!(
                examination_round_id(&id).as_deref(),
                Some(ROUND_UID),
                "{id}"
            );
        }
    }

    #[test]
    fn unrecognized_shapes_are_excluded() {
        for id in ["", "SEC-123", "ER.", "2024-spring", "ER.UPPER.CASE"] {
            assert_eq!(classify(id), None, "{id}");
            assert_eq!(examination_round_id(id), None, "{id}");
        }
    }
}
