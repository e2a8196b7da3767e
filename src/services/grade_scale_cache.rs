//! Time-bounded cache of the registry's grade-scale catalog
//!
//! The catalog is fetched in one call, lazily, and reused until the TTL
//! expires. Safe for concurrent readers; two callers racing an expired
//! slot may both fetch, which is acceptable since the fetch is idempotent
//! and read-only on the registry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::error::RegistryError;
use crate::models::registry::{GradeScale, GradeScaleEntry};
use crate::services::registry_client::RegistryClient;

/// Default catalog lifetime
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

struct CachedCatalog {
    fetched_at: Instant,
    scales: Arc<Vec<GradeScale>>,
}

/// Process-wide memoized grade-scale catalog, constructed once and passed
/// by reference to the components that need it
pub struct GradeScaleCache {
    registry: Arc<RegistryClient>,
    ttl: Duration,
    slot: RwLock<Option<CachedCatalog>>,
}

impl GradeScaleCache {
    pub fn new(registry: Arc<RegistryClient>) -> Self {
        Self::with_ttl(registry, DEFAULT_TTL)
    }

    /// TTL override, used by tests to force expiry
    pub fn with_ttl(registry: Arc<RegistryClient>, ttl: Duration) -> Self {
        Self {
            registry,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// The cached catalog, fetching or refreshing it as needed. Callers
    /// that classify many candidates snapshot it once and resolve against
    /// the snapshot.
    pub async fn catalog(&self) -> Result<Arc<Vec<GradeScale>>, RegistryError> {
        {
            let slot = self.slot.read().await;
            if let Some(cached) = slot.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(Arc::clone(&cached.scales));
                }
            }
        }

        let scales = Arc::new(self.registry.fetch_grade_scales().await?);
        let mut slot = self.slot.write().await;
        *slot = Some(CachedCatalog {
            fetched_at: Instant::now(),
            scales: Arc::clone(&scales),
        });

        Ok(scales)
    }

    /// Resolve a scale id + letter grade to the scale entry. `Ok(None)`
    /// means the scale or the code is unknown: an unmapped grade the
    /// caller treats as "no action", not an error.
    pub async fn resolve(
        &self,
        scale_id: i64,
        letter_grade: &str,
    ) -> Result<Option<GradeScaleEntry>, RegistryError> {
        let catalog = self.catalog().await?;
        Ok(find_grade(&catalog, scale_id, letter_grade).cloned())
    }
}

/// Case-insensitive lookup of a letter code within a scale.
pub fn find_grade<'a>(
    scales: &'a [GradeScale],
    scale_id: i64,
    letter_grade: &str,
) -> Option<&'a GradeScaleEntry> {
    let scale = scales.iter().find(|s| s.numeric_id() == Some(scale_id))?;

    scale.grades.iter().find(|entry| {
        entry
            .code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(letter_grade))
    })
}
