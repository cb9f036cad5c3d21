//! JSON HTTP API.
//!
//! Exposes the collection store, dashboard aggregation and the matching
//! workflow to an admin front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/dashboard` | Aggregate counts and recent enrollment |
//! | `GET`/`POST` | `/mentors` | List / create mentors |
//! | `GET`/`PUT`/`DELETE` | `/mentors/{id}` | Read / replace / delete a mentor |
//! | `GET`/`POST` | `/learners` | List / create learners |
//! | `GET`/`PUT`/`DELETE` | `/learners/{id}` | Read / replace / delete a learner |
//! | `POST` | `/learners/{id}/assign` | Record a mentor assignment |
//! | `POST` | `/recommendations` | One-shot recommendation for a learner |
//! | `GET`/`DELETE` | `/matching` | Matching workflow state / clear the selection |
//! | `GET`  | `/matching/pending` | Learners without a mentor |
//! | `POST` | `/matching/select` | Select a learner |
//! | `POST` | `/matching/generate` | Request recommendations for the selection |
//! | `POST` | `/matching/confirm` | Confirm one recommended mentor |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "mentor not found: m9" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `conflict` (409),
//! `internal` (500). Unreadable request bodies are `bad_request`.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mentor_match_core::models::{
    new_id, AssignmentStatus, Learner, LearnerDraft, Mentor, MentorDraft,
};
use mentor_match_core::recommend::Recommendation;
use mentor_match_core::stats::{dashboard_stats, DashboardStats};
use mentor_match_core::store::{MutationOutcome, Store};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::matchmaker::{GenerateOutcome, MatchError, MatchMaker, SessionView};
use crate::recommender::{create_recommender, Recommender};
use crate::seed::build_store;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub recommender: Arc<dyn Recommender>,
    pub matchmaker: Arc<MatchMaker>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, recommender: Arc<dyn Recommender>) -> Self {
        let matchmaker = Arc::new(MatchMaker::new(store.clone(), recommender.clone()));
        Self {
            store,
            recommender,
            matchmaker,
        }
    }

    /// Build the store and recommender described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = Arc::new(build_store(config));
        let recommender = create_recommender(&config.recommender)?;
        Ok(Self::new(store, recommender))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/dashboard", get(handle_dashboard))
        .route("/mentors", get(handle_list_mentors).post(handle_create_mentor))
        .route(
            "/mentors/{id}",
            get(handle_get_mentor)
                .put(handle_update_mentor)
                .delete(handle_delete_mentor),
        )
        .route("/learners", get(handle_list_learners).post(handle_create_learner))
        .route(
            "/learners/{id}",
            get(handle_get_learner)
                .put(handle_update_learner)
                .delete(handle_delete_learner),
        )
        .route("/learners/{id}/assign", post(handle_assign))
        .route("/recommendations", post(handle_recommend))
        .route("/matching", get(handle_matching_view).delete(handle_matching_clear))
        .route("/matching/pending", get(handle_matching_pending))
        .route("/matching/select", post(handle_matching_select))
        .route("/matching/generate", post(handle_matching_generate))
        .route("/matching/confirm", post(handle_matching_confirm))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    if !config.recommender.is_enabled() {
        tracing::warn!("recommender provider is disabled; recommendation requests will fail");
    }
    let listener = TcpListener::bind(&config.server.bind).await?;
    serve(listener, state).await
}

/// Serve the API on an already-bound listener.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    tracing::info!(
        addr = %listener.local_addr()?,
        recommender = state.recommender.name(),
        "mentor match API listening"
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn error(status: StatusCode, code: &str, message: impl Into<String>) -> AppError {
    AppError {
        status,
        code: code.to_string(),
        message: message.into(),
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    error(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn not_found(message: impl Into<String>) -> AppError {
    error(StatusCode::NOT_FOUND, "not_found", message)
}

fn conflict(message: impl Into<String>) -> AppError {
    error(StatusCode::CONFLICT, "conflict", message)
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{:#}", err), "request failed");
        error(StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string())
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::NoSelection | MatchError::NotACandidate(_) => bad_request(err.to_string()),
            MatchError::LearnerNotFound(_) => not_found(err.to_string()),
            MatchError::InProgress(_) => conflict(err.to_string()),
            MatchError::Internal(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

/// JSON request body whose rejections follow the error contract.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
struct AppJson<T>(T);

/// Map a mutation outcome onto the HTTP contract.
fn check(outcome: MutationOutcome, kind: &str, id: &str) -> Result<(), AppError> {
    match outcome {
        MutationOutcome::Applied => Ok(()),
        MutationOutcome::NotFound => Err(not_found(format!("{} not found: {}", kind, id))),
        MutationOutcome::DuplicateId => {
            Err(conflict(format!("{} id already exists: {}", kind, id)))
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /dashboard ============

async fn handle_dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let snapshot = state.store.snapshot().await?;
    Ok(Json(dashboard_stats(&snapshot)))
}

// ============ Mentors ============

async fn handle_list_mentors(State(state): State<AppState>) -> Result<Json<Vec<Mentor>>, AppError> {
    let snapshot = state.store.snapshot().await?;
    Ok(Json(snapshot.mentors.as_ref().clone()))
}

async fn handle_create_mentor(
    State(state): State<AppState>,
    AppJson(draft): AppJson<MentorDraft>,
) -> Result<(StatusCode, Json<Mentor>), AppError> {
    draft.validate().map_err(|e| bad_request(e.to_string()))?;
    let mentor = draft.into_mentor(new_id());
    let outcome = state.store.add_mentor(mentor.clone()).await?;
    check(outcome, "mentor", &mentor.id)?;
    tracing::info!(mentor_id = %mentor.id, "mentor added");
    Ok((StatusCode::CREATED, Json(mentor)))
}

async fn handle_get_mentor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Mentor>, AppError> {
    state
        .store
        .get_mentor(&id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("mentor not found: {}", id)))
}

async fn handle_update_mentor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(draft): AppJson<MentorDraft>,
) -> Result<Json<Mentor>, AppError> {
    draft.validate().map_err(|e| bad_request(e.to_string()))?;
    let mentor = draft.into_mentor(id.clone());
    let outcome = state.store.update_mentor(mentor.clone()).await?;
    check(outcome, "mentor", &id)?;
    Ok(Json(mentor))
}

async fn handle_delete_mentor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let outcome = state.store.delete_mentor(&id).await?;
    check(outcome, "mentor", &id)?;
    tracing::info!(mentor_id = %id, "mentor deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============ Learners ============

/// A learner together with the resolution of its assignment.
#[derive(Serialize)]
pub struct LearnerView {
    #[serde(flatten)]
    pub learner: Learner,
    pub assignment: AssignmentStatus,
}

impl LearnerView {
    fn new(learner: Learner, mentors: &[Mentor]) -> Self {
        let assignment = AssignmentStatus::resolve(&learner, mentors);
        Self {
            learner,
            assignment,
        }
    }
}

async fn learner_view(state: &AppState, id: &str) -> Result<Json<LearnerView>, AppError> {
    let snapshot = state.store.snapshot().await?;
    let learner = snapshot
        .learner(id)
        .cloned()
        .ok_or_else(|| not_found(format!("learner not found: {}", id)))?;
    Ok(Json(LearnerView::new(learner, &snapshot.mentors)))
}

async fn handle_list_learners(
    State(state): State<AppState>,
) -> Result<Json<Vec<LearnerView>>, AppError> {
    let snapshot = state.store.snapshot().await?;
    Ok(Json(
        snapshot
            .learners
            .iter()
            .map(|l| LearnerView::new(l.clone(), &snapshot.mentors))
            .collect(),
    ))
}

async fn handle_create_learner(
    State(state): State<AppState>,
    AppJson(draft): AppJson<LearnerDraft>,
) -> Result<(StatusCode, Json<Learner>), AppError> {
    draft.validate().map_err(|e| bad_request(e.to_string()))?;
    let learner = draft.into_learner(new_id());
    let outcome = state.store.add_learner(learner.clone()).await?;
    check(outcome, "learner", &learner.id)?;
    tracing::info!(learner_id = %learner.id, "learner added");
    Ok((StatusCode::CREATED, Json(learner)))
}

async fn handle_get_learner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LearnerView>, AppError> {
    learner_view(&state, &id).await
}

async fn handle_update_learner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(draft): AppJson<LearnerDraft>,
) -> Result<Json<Learner>, AppError> {
    draft.validate().map_err(|e| bad_request(e.to_string()))?;
    let learner = draft.into_learner(id.clone());
    let outcome = state.store.update_learner(learner.clone()).await?;
    check(outcome, "learner", &id)?;
    Ok(Json(learner))
}

async fn handle_delete_learner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let outcome = state.store.delete_learner(&id).await?;
    check(outcome, "learner", &id)?;
    tracing::info!(learner_id = %id, "learner deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignRequest {
    mentor_id: String,
}

async fn handle_assign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AssignRequest>,
) -> Result<Json<LearnerView>, AppError> {
    let outcome = state
        .store
        .assign_mentor_to_learner(&id, &req.mentor_id)
        .await?;
    check(outcome, "learner", &id)?;
    learner_view(&state, &id).await
}

// ============ Recommendations ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearnerRequest {
    learner_id: String,
}

/// Stateless recommendation: every current mentor is offered as a candidate.
async fn handle_recommend(
    State(state): State<AppState>,
    AppJson(req): AppJson<LearnerRequest>,
) -> Result<Json<Recommendation>, AppError> {
    let snapshot = state.store.snapshot().await?;
    let learner = snapshot
        .learner(&req.learner_id)
        .ok_or_else(|| not_found(format!("learner not found: {}", req.learner_id)))?;
    Ok(Json(
        state.recommender.recommend(learner, &snapshot.mentors).await,
    ))
}

// ============ Matching workflow ============

async fn handle_matching_view(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.matchmaker.view().await?))
}

async fn handle_matching_clear(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    state.matchmaker.clear()?;
    Ok(Json(state.matchmaker.view().await?))
}

async fn handle_matching_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<Learner>>, AppError> {
    Ok(Json(state.matchmaker.pending_learners().await?))
}

async fn handle_matching_select(
    State(state): State<AppState>,
    AppJson(req): AppJson<LearnerRequest>,
) -> Result<Json<SessionView>, AppError> {
    state.matchmaker.select(&req.learner_id).await?;
    Ok(Json(state.matchmaker.view().await?))
}

async fn handle_matching_generate(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    match state.matchmaker.generate().await? {
        GenerateOutcome::Completed(_) => Ok(Json(state.matchmaker.view().await?)),
        GenerateOutcome::Stale => Err(conflict(
            "the selected learner changed before recommendations arrived",
        )),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest {
    mentor_id: String,
}

async fn handle_matching_confirm(
    State(state): State<AppState>,
    AppJson(req): AppJson<ConfirmRequest>,
) -> Result<Json<Learner>, AppError> {
    Ok(Json(state.matchmaker.confirm(&req.mentor_id).await?))
}
