//! In-process mock servers for the registry and roster APIs
//!
//! Both mocks bind an ephemeral port and serve the wire shapes the clients
//! expect. The registry mock is stateful: creating a result moves the
//! candidate from the unprocessed set to the draft set, so a second
//! transfer run sees the registry as it would really look.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use gradesync::config::RegistryConfig;
use gradesync::models::registry::{
    GradeScale, GradeScaleEntry, InstanceResult, ReportingContext, ResultCandidate, ResultDraft,
    StudentRef,
};
use gradesync::services::{AuditStore, GradeScaleCache, RegistryClient, RosterClient, TransferEngine};

pub const INSTITUTION_ID: i64 = 27;

/// Install a fmt subscriber once per test binary; `RUST_LOG` filters.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// Registry mock

#[derive(Default)]
pub struct RegistryData {
    pub scales: Vec<GradeScale>,
    pub scale_fetches: usize,
    pub create_candidates: Vec<ResultCandidate>,
    pub update_candidates: Vec<ResultCandidate>,
    pub search_requests: Vec<Value>,
    pub round_sections: Vec<String>,
    /// Payload uids (container uid on create, draft uid on update) the mock
    /// rejects with a business-rule error
    pub rejected_uids: HashSet<String>,
    pub create_requests: Vec<Value>,
    pub update_requests: Vec<Value>,
    /// Module instances served per section uid
    pub section_modules: HashMap<String, Value>,
    /// Round metadata served per round uid
    pub examination_round_info: HashMap<String, Value>,
    pub save_counter: usize,
}

pub type SharedRegistry = Arc<Mutex<RegistryData>>;

pub struct MockRegistry {
    pub state: SharedRegistry,
    pub base_url: String,
}

async fn get_scales(State(state): State<SharedRegistry>) -> Json<Value> {
    let mut data = state.lock().unwrap();
    data.scale_fetches += 1;
    Json(json!({ "GradeScales": data.scales.clone() }))
}

async fn search_candidates(
    State(state): State<SharedRegistry>,
    Path(_target_uid): Path<String>,
    Json(criteria): Json<Value>,
) -> Json<Value> {
    let mut data = state.lock().unwrap();
    data.search_requests.push(criteria.clone());

    let filtering = criteria["Filtering"][0].as_str().unwrap_or_default();
    let list = if filtering == "UNPROCESSED" {
        &data.create_candidates
    } else {
        &data.update_candidates
    };

    let page = criteria["Page"].as_u64().unwrap_or(1) as usize;
    let limit = criteria["Limit"].as_u64().unwrap_or(100) as usize;
    let slice: Vec<ResultCandidate> = list
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect();

    Json(json!({ "Results": slice, "TotalCount": list.len() }))
}

async fn opportunities(
    State(state): State<SharedRegistry>,
    Path(_round_uid): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let data = state.lock().unwrap();
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params
        .get("limit")
        .and_then(|p| p.parse().ok())
        .unwrap_or(400);

    let slice: Vec<Value> = data
        .round_sections
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .map(|uid| json!({ "ReportingContext": { "SectionUid": uid } }))
        .collect();

    Json(json!({ "Results": slice, "TotalCount": data.round_sections.len() }))
}

fn rule_rejection() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "ErrorGroup": "rules.value",
            "Message": "Examination date precedes the study start"
        })),
    )
}

async fn create_result(
    State(state): State<SharedRegistry>,
    Json(envelope): Json<Value>,
) -> impl IntoResponse {
    let mut data = state.lock().unwrap();
    data.create_requests.push(envelope.clone());

    let payload = envelope["Results"][0].clone();
    let uid = payload["Uid"].as_str().unwrap_or_default().to_string();

    if data.rejected_uids.contains(&uid) {
        return rule_rejection();
    }

    // The candidate now holds a draft: move it to the update set.
    if let Some(pos) = data.create_candidates.iter().position(|c| c.uid == uid) {
        let mut candidate = data.create_candidates.remove(pos);
        candidate.results_on_instances = vec![InstanceResult {
            draft: Some(ResultDraft {
                uid: format!("draft-{uid}"),
                grade_id: payload["GradeId"].as_i64(),
                grade: None,
                module_instance_uid: payload["TargetInstanceUid"].as_str().map(String::from),
                examination_round_uid: None,
                last_modified: Some("2026-06-05T12:00:00".into()),
            }),
        }];
        data.update_candidates.push(candidate);
    }

    data.save_counter += 1;
    let n = data.save_counter;
    (
        StatusCode::OK,
        Json(json!({ "Results": [{ "Uid": format!("saved-{n}") }] })),
    )
}

async fn update_result(
    State(state): State<SharedRegistry>,
    Json(envelope): Json<Value>,
) -> impl IntoResponse {
    let mut data = state.lock().unwrap();
    data.update_requests.push(envelope.clone());

    let payload = envelope["Results"][0].clone();
    let draft_uid = payload["ResultUid"].as_str().unwrap_or_default().to_string();

    if data.rejected_uids.contains(&draft_uid) {
        return rule_rejection();
    }

    for candidate in data.update_candidates.iter_mut() {
        for instance in candidate.results_on_instances.iter_mut() {
            if let Some(draft) = instance.draft.as_mut() {
                if draft.uid == draft_uid {
                    draft.grade_id = payload["GradeId"].as_i64();
                }
            }
        }
    }

    data.save_counter += 1;
    let n = data.save_counter;
    (
        StatusCode::OK,
        Json(json!({ "Results": [{ "Uid": format!("saved-{n}") }] })),
    )
}

async fn section_modules(
    State(state): State<SharedRegistry>,
    Path(section_uid): Path<String>,
) -> impl IntoResponse {
    match state.lock().unwrap().section_modules.get(&section_uid) {
        Some(body) => (StatusCode::OK, Json(body.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "ErrorGroup": "not_found", "Message": "unknown section" })),
        ),
    }
}

async fn examination_round(
    State(state): State<SharedRegistry>,
    Path(round_uid): Path<String>,
) -> impl IntoResponse {
    match state.lock().unwrap().examination_round_info.get(&round_uid) {
        Some(body) => (StatusCode::OK, Json(body.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "ErrorGroup": "not_found", "Message": "unknown round" })),
        ),
    }
}

impl MockRegistry {
    pub async fn spawn(data: RegistryData) -> Self {
        init_tracing();
        let state: SharedRegistry = Arc::new(Mutex::new(data));

        let app = Router::new()
            .route("/grading/scales", get(get_scales))
            .route("/sections/:uid/modules", get(section_modules))
            .route("/examination-rounds/:uid", get(examination_round))
            .route(
                "/results/candidates/module/:uid/search",
                put(search_candidates),
            )
            .route(
                "/results/candidates/examination-round/:uid/search",
                put(search_candidates),
            )
            .route("/examination-rounds/:uid/opportunities", get(opportunities))
            .route("/results/create", post(create_result))
            .route("/results/update", put(update_result))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{addr}"),
        }
    }

    pub fn client(&self) -> RegistryClient {
        RegistryClient::new(&RegistryConfig {
            base_url: self.base_url.clone(),
            institution_id: INSTITUTION_ID,
            identity: None,
        })
        .unwrap()
    }
}

// ---------------------------------------------------------------------------
// Roster mock

#[derive(Default)]
pub struct RosterData {
    pub course: Value,
    pub sections: Vec<Value>,
    pub assignments: Vec<Value>,
    pub submissions: Vec<Value>,
    pub enrollments: Vec<Value>,
    /// Split the submission list over two Link-paginated pages
    pub paginate_submissions: bool,
    pub base_url: String,
}

pub type SharedRoster = Arc<Mutex<RosterData>>;

pub struct MockRoster {
    pub state: SharedRoster,
    pub base_url: String,
}

async fn roster_course(
    State(state): State<SharedRoster>,
    Path(_course_id): Path<i64>,
) -> Json<Value> {
    Json(state.lock().unwrap().course.clone())
}

async fn roster_sections(
    State(state): State<SharedRoster>,
    Path(_course_id): Path<i64>,
) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().sections.clone()))
}

async fn roster_assignments(
    State(state): State<SharedRoster>,
    Path(_course_id): Path<i64>,
) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().assignments.clone()))
}

async fn roster_submissions(
    State(state): State<SharedRoster>,
    Path((course_id, assignment_id)): Path<(i64, i64)>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let data = state.lock().unwrap();

    if !data.paginate_submissions {
        return Json(Value::Array(data.submissions.clone())).into_response();
    }

    let half = data.submissions.len() / 2;
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);

    if page <= 1 {
        let next = format!(
            "{}/courses/{}/assignments/{}/submissions?include[]=user&per_page=100&page=2",
            data.base_url, course_id, assignment_id
        );
        let body = Json(Value::Array(data.submissions[..half].to_vec()));
        ([("link", format!("<{next}>; rel=\"next\""))], body).into_response()
    } else {
        Json(Value::Array(data.submissions[half..].to_vec())).into_response()
    }
}

async fn roster_enrollments(
    State(state): State<SharedRoster>,
    Path(_course_id): Path<i64>,
) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().enrollments.clone()))
}

async fn roster_self() -> Json<Value> {
    Json(json!({ "id": 42, "name": "Exa Miner" }))
}

impl MockRoster {
    pub async fn spawn(data: RosterData) -> Self {
        init_tracing();
        let state: SharedRoster = Arc::new(Mutex::new(data));

        let app = Router::new()
            .route("/courses/:course_id", get(roster_course))
            .route("/courses/:course_id/sections", get(roster_sections))
            .route("/courses/:course_id/assignments", get(roster_assignments))
            .route(
                "/courses/:course_id/assignments/:assignment_id/submissions",
                get(roster_submissions),
            )
            .route("/courses/:course_id/enrollments", get(roster_enrollments))
            .route("/users/self", get(roster_self))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");
        state.lock().unwrap().base_url = base_url.clone();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, base_url }
    }

    pub fn client(&self) -> RosterClient {
        RosterClient::new(&self.base_url, "test-token").unwrap()
    }
}

// ---------------------------------------------------------------------------
// Fixtures

/// Scale 7: A=101, F=105
pub fn default_scales() -> Vec<GradeScale> {
    vec![GradeScale {
        id: "7".into(),
        grades: vec![
            GradeScaleEntry {
                id: 101,
                code: Some("A".into()),
            },
            GradeScaleEntry {
                id: 105,
                code: Some("F".into()),
            },
        ],
    }]
}

pub fn candidate(student_uid: &str, module_uid: &str, draft: Option<ResultDraft>) -> ResultCandidate {
    ResultCandidate {
        uid: format!("container-{student_uid}"),
        student: StudentRef {
            uid: student_uid.to_string(),
            first_name: "First".into(),
            last_name: format!("Last-{student_uid}"),
            national_id: Some(format!("19900101-{student_uid}")),
        },
        reporting_context: ReportingContext {
            grade_scale_id: 7,
            target_instance_uid: module_uid.to_string(),
            section_uid: None,
        },
        results_on_instances: draft
            .map(|d| vec![InstanceResult { draft: Some(d) }])
            .unwrap_or_default(),
    }
}

pub fn draft(student_uid: &str, module_uid: &str, grade_id: i64) -> ResultDraft {
    ResultDraft {
        uid: format!("draft-container-{student_uid}"),
        grade_id: Some(grade_id),
        grade: None,
        module_instance_uid: Some(module_uid.to_string()),
        examination_round_uid: None,
        last_modified: Some("2026-05-02T10:00:00".into()),
    }
}

pub fn submission_row(learner_id: &str, grade: Option<&str>) -> Value {
    json!({
        "grade": grade,
        "user": {
            "id": 1000,
            "sortable_name": format!("Last-{learner_id}, First"),
            "integration_id": learner_id
        }
    })
}

pub fn section_row(id: i64, external_id: Option<&str>) -> Value {
    json!({ "id": id, "name": format!("Section {id}"), "external_id": external_id })
}

/// Build an engine wired to both mocks, with a file-backed audit store.
pub async fn build_engine(
    registry: &MockRegistry,
    roster: &MockRoster,
) -> (TransferEngine, sqlx::SqlitePool, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let pool = gradesync::db::init_audit_pool(&dir.path().join("audit.db"))
        .await
        .unwrap();

    let registry_client = Arc::new(registry.client());
    let scales = Arc::new(GradeScaleCache::new(Arc::clone(&registry_client)));
    let engine = TransferEngine::new(
        Arc::new(roster.client()),
        registry_client,
        scales,
        AuditStore::new(pool.clone()),
    );

    (engine, pool, dir)
}
