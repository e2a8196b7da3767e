//! Error taxonomy for the transfer engine
//!
//! Each external collaborator gets its own closed error enum. The registry
//! distinguishes business-rule rejections (expected, per-record) from every
//! other failure (fatal to the operation in progress); the classification
//! happens once, when a response body is decoded, so callers match on
//! variants instead of inspecting raw error-group strings.

use thiserror::Error;

/// Errors from the degree-registry API
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Business-rule rejection for a single record. Caught by the batch
    /// transfer driver; never aborts a batch.
    #[error("Registry rejected the result: {message}")]
    Rule { message: String },

    /// The registry denied access for the authenticated client
    #[error("We got an authorization error from the registry ({message})")]
    Auth { message: String },

    /// Transport-level failure (connection, timeout, TLS)
    #[error("Network error contacting the registry: {0}")]
    Network(String),

    /// Unexpected HTTP status without a recognized error group
    #[error("We encountered an error when trying to access the registry (status {status})")]
    Api { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Failed to parse registry response: {0}")]
    Parse(String),
}

/// Error groups the registry reports for rule evaluation failures:
/// record state, domain rules, and value checks (e.g. an examination date
/// before the study start).
const RULE_ERROR_GROUPS: [&str; 3] = ["rules.state", "rules.domain", "rules.value"];

const AUTH_ERROR_GROUP: &str = "rules.authorization";

impl RegistryError {
    /// Classify a non-2xx registry response from its structured error body.
    pub fn from_error_body(status: u16, group: Option<&str>, message: &str, raw: &str) -> Self {
        match group {
            Some(g) if RULE_ERROR_GROUPS.contains(&g) => RegistryError::Rule {
                message: message.to_string(),
            },
            Some(g) if g == AUTH_ERROR_GROUP => RegistryError::Auth {
                message: message.to_string(),
            },
            _ => RegistryError::Api {
                status,
                body: raw.to_string(),
            },
        }
    }

    /// True for the per-record rejection kind the driver absorbs into the
    /// transfer report.
    pub fn is_rule_violation(&self) -> bool {
        matches!(self, RegistryError::Rule { .. })
    }
}

/// Errors from the source roster API
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Network error contacting the roster: {0}")]
    Network(String),

    #[error("We encountered an error when trying to access the roster (status {status})")]
    Api { status: u16, body: String },

    #[error("Failed to parse roster response: {0}")]
    Parse(String),
}

/// Audit store failures. Logged and swallowed by the driver; never
/// propagated to the engine caller.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to serialize audit document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration loading or validation error
#[derive(Debug, Error)]
#[error("Configuration error: {0}")]
pub struct ConfigError(pub String);

/// The only error type the engine API surfaces to its caller
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    /// Invalid caller input (e.g. a target id that is not a UUID)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Common result alias for engine operations
pub type Result<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_groups_classify_as_rule_violations() {
        for group in ["rules.state", "rules.domain", "rules.value"] {
            let err = RegistryError::from_error_body(400, Some(group), "rejected", "{}");
            assert!(err.is_rule_violation(), "group {group} should be a rule violation");
        }
    }

    #[test]
    fn authorization_group_classifies_as_auth() {
        let err = RegistryError::from_error_body(403, Some("rules.authorization"), "denied", "{}");
        assert!(matches!(err, RegistryError::Auth { .. }));
    }

    #[test]
    fn unknown_group_falls_back_to_api_error() {
        let err = RegistryError::from_error_body(500, Some("internal"), "boom", "{\"x\":1}");
        match err {
            RegistryError::Api { status, .. } => assert_eq!(status, 500),
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
