//! gradesync: grade reconciliation and transfer engine
//!
//! Transfers grade results from a source roster system (a
//! learning-management gradebook) to an authoritative degree registry, for
//! one assignment/target pairing at a time. The engine matches learner
//! records between the two systems, decides per learner whether a result
//! is created, updated or skipped, translates letter grades into the
//! registry's coded grade-scale ids, and submits the batch while isolating
//! per-record rule rejections.
//!
//! The embedding process (an HTTP API layer, not part of this crate)
//! constructs the clients once and drives [`TransferEngine`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use gradesync::config::{RegistryConfig, RosterConfig};
//! use gradesync::models::TransferTarget;
//! use gradesync::services::{AuditStore, GradeScaleCache, RegistryClient, RosterClient, TransferEngine};
//!
//! # async fn run(user_token: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(RegistryClient::new(&RegistryConfig::resolve(None)?)?);
//! let roster = Arc::new(RosterClient::new(&RosterConfig::resolve(None)?.base_url, user_token)?);
//! let scales = Arc::new(GradeScaleCache::new(Arc::clone(&registry)));
//! let pool = gradesync::db::init_audit_pool(std::path::Path::new("audit.db")).await?;
//! let engine = TransferEngine::new(roster, registry, scales, AuditStore::new(pool));
//!
//! let target = TransferTarget::Module { instance_uid: "…".into() };
//! let preview = engine.get_results(17, 3, &target).await?;
//! # let _ = preview;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{RegistryError, RosterError, TransferError};
pub use crate::models::transfer::{TransferReport, TransferTarget};
pub use crate::services::transfer_engine::TransferEngine;
