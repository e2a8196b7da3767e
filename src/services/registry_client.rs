//! Degree-registry API client
//!
//! Client-certificate-authenticated channel to the registry. The search
//! endpoints are page-based: each call returns one page plus a total
//! count, and the client concatenates successive pages until the total is
//! reached. Ordering within the registry response is last-name,
//! first-name, national-id ascending and is preserved as-is.

use std::time::Duration;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::models::registry::{
    CreateEnvelope, CreateResultPayload, ExaminationRoundResponse, GradeScale, OpportunityPage,
    RegistryErrorBody, SaveResponse, SavedResult, ScaleCatalog, SearchCriteria, SearchResponse,
    SectionModulesResponse, UpdateEnvelope, UpdateResultPayload,
};
use crate::models::registry::ResultCandidate;
use crate::models::transfer::{SearchMode, TransferTarget};

/// Fixed page size of the candidate search
const SEARCH_PAGE_SIZE: u32 = 100;

/// Fixed page size of the examination-round expansion lookup
const EXPAND_PAGE_SIZE: u32 = 400;

const ORDER_BY: [&str; 3] = ["LAST_NAME_ASC", "FIRST_NAME_ASC", "NATIONAL_ID_ASC"];

impl SearchMode {
    /// Processing-state filter the registry expects for this mode
    fn filter_state(self) -> &'static str {
        match self {
            SearchMode::Create => "UNPROCESSED",
            SearchMode::Update => "DRAFT",
        }
    }
}

/// Registry API client
pub struct RegistryClient {
    http_client: reqwest::Client,
    base_url: String,
    institution_id: i64,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(30));

        if let Some(identity) = &config.identity {
            let identity =
                reqwest::Identity::from_pkcs12_der(&identity.pkcs12_der, &identity.passphrase)
                    .map_err(|e| RegistryError::Network(e.to_string()))?;
            builder = builder.identity(identity);
        }

        let http_client = builder
            .build()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            institution_id: config.institution_id,
        })
    }

    pub fn institution_id(&self) -> i64 {
        self.institution_id
    }

    /// Decode a response, classifying non-2xx bodies by their error group.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RegistryError> {
        let status = response.status();

        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let body: RegistryErrorBody = serde_json::from_str(&raw).unwrap_or(RegistryErrorBody {
                error_group: None,
                message: None,
            });
            return Err(RegistryError::from_error_body(
                status.as_u16(),
                body.error_group.as_deref(),
                body.message.as_deref().unwrap_or(&raw),
                &raw,
            ));
        }

        response
            .json()
            .await
            .map_err(|e| RegistryError::Parse(e.to_string()))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, RegistryError> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    /// Fetch the entire grade-scale catalog in one call.
    pub async fn fetch_grade_scales(&self) -> Result<Vec<GradeScale>, RegistryError> {
        tracing::info!("Fetching grade-scale catalog from the registry");
        let catalog: ScaleCatalog = self.get("/grading/scales").await?;
        Ok(catalog.grade_scales)
    }

    /// Paginated candidate search for a target, filtered by mode and by the
    /// caller's eligible section set. An empty section set short-circuits
    /// to an empty result without calling the registry.
    pub async fn search(
        &self,
        target: &TransferTarget,
        section_ids: &[String],
        mode: SearchMode,
    ) -> Result<Vec<ResultCandidate>, RegistryError> {
        if section_ids.is_empty() {
            return Ok(Vec::new());
        }

        let path = match target {
            TransferTarget::Module { instance_uid } => {
                format!("/results/candidates/module/{instance_uid}/search")
            }
            TransferTarget::ExaminationRound { round_uid } => {
                format!("/results/candidates/examination-round/{round_uid}/search")
            }
        };

        let mut candidates = Vec::new();
        let mut page: u32 = 0;

        loop {
            page += 1;
            let criteria = SearchCriteria {
                filtering: vec![mode.filter_state().to_string()],
                section_ids: section_ids.to_vec(),
                institution_id: self.institution_id,
                order_by: ORDER_BY.iter().map(|s| s.to_string()).collect(),
                page,
                limit: SEARCH_PAGE_SIZE,
            };

            let response = self
                .http_client
                .put(format!("{}{}", self.base_url, path))
                .json(&criteria)
                .send()
                .await
                .map_err(|e| RegistryError::Network(e.to_string()))?;

            let body: SearchResponse = Self::decode(response).await?;
            candidates.extend(body.results);

            if u64::from(page) * u64::from(SEARCH_PAGE_SIZE) >= body.total_count {
                break;
            }
        }

        tracing::debug!(
            candidates = candidates.len(),
            "Candidate search finished ({} pages)",
            page
        );

        Ok(candidates)
    }

    /// Expand an examination round to the authoritative set of section UIDs
    /// it covers, deduplicated in order of first appearance.
    pub async fn expand_examination_round(
        &self,
        round_uid: &str,
    ) -> Result<Vec<String>, RegistryError> {
        let mut sections: Vec<String> = Vec::new();
        let mut page: u32 = 0;

        loop {
            page += 1;
            let body: OpportunityPage = self
                .get(&format!(
                    "/examination-rounds/{round_uid}/opportunities?page={page}&limit={EXPAND_PAGE_SIZE}"
                ))
                .await?;

            for opportunity in body.results {
                let uid = opportunity.reporting_context.section_uid;
                if !sections.contains(&uid) {
                    sections.push(uid);
                }
            }

            if u64::from(page) * u64::from(EXPAND_PAGE_SIZE) >= body.total_count {
                break;
            }
        }

        tracing::debug!(
            round = round_uid,
            sections = sections.len(),
            "Examination round expanded"
        );

        Ok(sections)
    }

    /// Create one new result draft. The envelope is a singleton so a rule
    /// rejection stays scoped to one learner.
    pub async fn create_result(
        &self,
        payload: CreateResultPayload,
    ) -> Result<SavedResult, RegistryError> {
        let envelope = CreateEnvelope {
            institution_id: self.institution_id,
            results: vec![payload],
        };

        let response = self
            .http_client
            .post(format!("{}/results/create", self.base_url))
            .json(&envelope)
            .send()
            .await
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let body: SaveResponse = Self::decode(response).await?;
        body.results
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::Parse("empty create response".into()))
    }

    /// Update one existing draft. The registry verifies the last-modified
    /// echo and rejects a concurrently modified draft.
    pub async fn update_result(
        &self,
        payload: UpdateResultPayload,
    ) -> Result<SavedResult, RegistryError> {
        let envelope = UpdateEnvelope {
            results: vec![payload],
        };

        let response = self
            .http_client
            .put(format!("{}/results/update", self.base_url))
            .json(&envelope)
            .send()
            .await
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let body: SaveResponse = Self::decode(response).await?;
        body.results
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::Parse("empty update response".into()))
    }

    /// Module instances reachable through one section (course round).
    pub async fn list_section_modules(
        &self,
        section_uid: &str,
    ) -> Result<SectionModulesResponse, RegistryError> {
        self.get(&format!("/sections/{section_uid}/modules")).await
    }

    /// Metadata of one examination round.
    pub async fn get_examination_round(
        &self,
        round_uid: &str,
    ) -> Result<ExaminationRoundResponse, RegistryError> {
        self.get(&format!("/examination-rounds/{round_uid}")).await
    }
}
