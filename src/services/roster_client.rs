//! Source roster API client
//!
//! Authenticated with the acting user's bearer credential, so every call
//! happens with that user's permissions. List endpoints paginate with a
//! `Link` header; the client follows `rel="next"` until it disappears.
//! Retry/backoff policy belongs to the transport, not to this client.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::RosterError;
use crate::models::roster::{
    AssignmentRow, CourseRow, EnrollmentRow, LearnerSubmission, RosterProfile, Section,
    SubmissionRow,
};

const PAGE_SIZE: u32 = 100;

/// The assignment id reserved for the gradebook's total column
pub const FINAL_GRADE_ASSIGNMENT_ID: i64 = 0;

/// Roster API client bound to one user's credential
pub struct RosterClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RosterClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, RosterError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RosterError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn request(&self, url: &str) -> Result<reqwest::Response, RosterError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| RosterError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RosterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RosterError> {
        let response = self.request(&format!("{}{}", self.base_url, path)).await?;
        response
            .json()
            .await
            .map_err(|e| RosterError::Parse(e.to_string()))
    }

    /// Follow `Link: rel="next"` pagination, concatenating every page.
    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, RosterError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut url = format!("{}{}{}per_page={}", self.base_url, path, separator, PAGE_SIZE);
        let mut items = Vec::new();

        loop {
            let response = self.request(&url).await?;

            let next = response
                .headers()
                .get("link")
                .and_then(|v| v.to_str().ok())
                .and_then(next_link);

            let page: Vec<T> = response
                .json()
                .await
                .map_err(|e| RosterError::Parse(e.to_string()))?;
            items.extend(page);

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        Ok(items)
    }

    pub async fn get_course(&self, course_id: i64) -> Result<CourseRow, RosterError> {
        self.get_json(&format!("/courses/{course_id}")).await
    }

    pub async fn list_sections(&self, course_id: i64) -> Result<Vec<Section>, RosterError> {
        self.list(&format!("/courses/{course_id}/sections")).await
    }

    pub async fn list_assignments(
        &self,
        course_id: i64,
    ) -> Result<Vec<AssignmentRow>, RosterError> {
        self.list(&format!("/courses/{course_id}/assignments")).await
    }

    /// The authenticated user performing the transfer
    pub async fn current_user(&self) -> Result<RosterProfile, RosterError> {
        self.get_json("/users/self").await
    }

    /// One submission set per transfer attempt: the gradebook rows for an
    /// assignment, or the total-column grades for the final-grade
    /// pseudo-assignment (id 0).
    pub async fn fetch_grades(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Vec<LearnerSubmission>, RosterError> {
        if assignment_id == FINAL_GRADE_ASSIGNMENT_ID {
            let enrollments: Vec<EnrollmentRow> = self
                .list(&format!("/courses/{course_id}/enrollments"))
                .await?;

            tracing::info!(
                course = course_id,
                grades = enrollments.len(),
                "Fetched total-column grades"
            );

            return Ok(enrollments
                .into_iter()
                .map(LearnerSubmission::from_enrollment)
                .collect());
        }

        let submissions: Vec<SubmissionRow> = self
            .list(&format!(
                "/courses/{course_id}/assignments/{assignment_id}/submissions?include[]=user"
            ))
            .await?;

        tracing::info!(
            course = course_id,
            assignment = assignment_id,
            submissions = submissions.len(),
            "Fetched assignment submissions"
        );

        Ok(submissions
            .into_iter()
            .map(LearnerSubmission::from_submission)
            .collect())
    }
}

/// Extract the `rel="next"` URL from a `Link` header value.
fn next_link(header: &str) -> Option<String> {
    for part in header.split(',') {
        let Some((url_part, params)) = part.trim().split_once(';') else {
            continue;
        };
        if params.contains("rel=\"next\"") {
            return Some(
                url_part
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string(),
            );
        }
    }
    None
}
