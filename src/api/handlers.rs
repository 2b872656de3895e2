//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ChatResponse, ConceptMergeRequest, CreateSessionResponse, DraftBody,
    ErrorResponse, HealthResponse, MessagesResponse, OptimizeCostRequest, PageQuery,
    QuickMessageRequest, SuccessResponse,
};
use super::AppState;
use crate::catalog::{
    community_stats, learning_progress, learning_stats, CatalogError, Challenge, CommunityEvent,
    CommunityStats, Contributor, Discovery, KnowledgeGraph, LearningActivity, LearningProgress,
    LearningStats, PerformanceMetrics, PostPage, Project, ProjectStats, TrendingTopic,
};
use crate::runtime::{SessionError, SseEvent};
use crate::toolkit::{self, CostReport, MergeResult, QuickAnswer, ToolkitError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

/// How many learning activities the feed shows
const ACTIVITY_FEED_LEN: u32 = 10;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat sessions
        .route("/api/chat/sessions", post(create_session))
        .route(
            "/api/chat/sessions/:id/messages",
            get(list_messages).post(send_chat),
        )
        .route(
            "/api/chat/sessions/:id/draft",
            get(get_draft).put(set_draft),
        )
        .route("/api/chat/sessions/:id/stream", get(stream_session))
        .route("/api/chat/sessions/:id/close", post(close_session))
        // Project catalog
        .route("/api/projects", get(list_projects))
        .route("/api/projects/categories", get(list_categories))
        .route("/api/projects/stats", get(project_stats))
        .route("/api/projects/:id", get(get_project))
        // Learning dashboard
        .route("/api/learning/stats", get(get_learning_stats))
        .route("/api/learning/activities", get(list_activities))
        .route("/api/learning/progress", get(get_learning_progress))
        .route("/api/learning/discoveries", get(list_discoveries))
        .route("/api/learning/knowledge-graph", get(get_knowledge_graph))
        .route(
            "/api/learning/performance-metrics",
            get(get_performance_metrics),
        )
        // Community
        .route("/api/community/posts", get(list_posts))
        .route("/api/community/stats", get(get_community_stats))
        .route("/api/community/top-contributors", get(list_contributors))
        .route("/api/community/trending", get(list_trending))
        .route("/api/community/challenges", get(list_challenges))
        .route("/api/community/events", get(list_events))
        // Scripted toolkit
        .route("/api/ai-chat/concept-merge", post(concept_merge))
        .route("/api/ai-chat/optimize-cost", post(optimize_cost))
        .route("/api/ai-chat/message", post(quick_message))
        // Meta
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Chat Sessions
// ============================================================

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let session_id = state.sessions.create_session().await?;
    let messages = state.sessions.list_messages(&session_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            messages,
        }),
    ))
}

async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessagesResponse>, AppError> {
    let snapshot = state.sessions.snapshot(&id).await?;
    Ok(Json(MessagesResponse {
        messages: snapshot.messages,
        reply_pending: snapshot.state.is_reply_pending(),
    }))
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let queued = !req.text.trim().is_empty();
    state.sessions.submit(&id, req.text).await?;
    Ok(Json(ChatResponse { queued }))
}

async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DraftBody>, AppError> {
    let text = state.sessions.draft(&id).await?;
    Ok(Json(DraftBody { text }))
}

async fn set_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DraftBody>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.set_draft(&id, req.text).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (snapshot, broadcast_rx) = state.sessions.subscribe(&id).await?;
    let init = SseEvent::Init {
        messages: snapshot.messages,
        state: snapshot.state,
    };
    Ok(sse_stream(init, broadcast_rx))
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.close(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Project Catalog
// ============================================================

async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.catalog.projects()?))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(state.catalog.project(id)?))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.catalog.categories()?))
}

async fn project_stats(State(state): State<AppState>) -> Result<Json<ProjectStats>, AppError> {
    Ok(Json(state.catalog.project_stats()?))
}

// ============================================================
// Learning Dashboard
// ============================================================

async fn get_learning_stats() -> Json<LearningStats> {
    Json(learning_stats(&mut rand::thread_rng()))
}

async fn list_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<LearningActivity>>, AppError> {
    Ok(Json(
        state
            .catalog
            .recent_activities(ACTIVITY_FEED_LEN, Utc::now())?,
    ))
}

async fn get_learning_progress() -> Json<LearningProgress> {
    Json(learning_progress(&mut rand::thread_rng()))
}

async fn list_discoveries(State(state): State<AppState>) -> Json<Vec<Discovery>> {
    Json(state.catalog.discoveries(Utc::now()))
}

async fn get_knowledge_graph(State(state): State<AppState>) -> Json<KnowledgeGraph> {
    Json(state.catalog.knowledge_graph())
}

async fn get_performance_metrics(State(state): State<AppState>) -> Json<PerformanceMetrics> {
    Json(state.catalog.performance_metrics())
}

// ============================================================
// Community
// ============================================================

async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostPage>, AppError> {
    Ok(Json(state.catalog.community_posts(
        query.page,
        query.per_page,
        Utc::now(),
    )?))
}

async fn get_community_stats() -> Json<CommunityStats> {
    Json(community_stats(&mut rand::thread_rng()))
}

async fn list_contributors(State(state): State<AppState>) -> Json<Vec<Contributor>> {
    Json(state.catalog.top_contributors())
}

async fn list_trending(State(state): State<AppState>) -> Json<Vec<TrendingTopic>> {
    Json(state.catalog.trending_topics())
}

async fn list_challenges(State(state): State<AppState>) -> Json<Vec<Challenge>> {
    Json(state.catalog.challenges())
}

async fn list_events(State(state): State<AppState>) -> Json<Vec<CommunityEvent>> {
    Json(state.catalog.events())
}

// ============================================================
// Scripted Toolkit
// ============================================================

async fn concept_merge(Json(req): Json<ConceptMergeRequest>) -> Result<Json<MergeResult>, AppError> {
    Ok(Json(toolkit::merge_concepts(&req.concept1, &req.concept2)?))
}

async fn optimize_cost(Json(req): Json<OptimizeCostRequest>) -> Result<Json<CostReport>, AppError> {
    Ok(Json(toolkit::optimize_costs(req.components.as_slice())?))
}

async fn quick_message(
    Json(req): Json<QuickMessageRequest>,
) -> Result<Json<QuickAnswer>, AppError> {
    Ok(Json(toolkit::quick_answer(&req.message, Utc::now())?))
}

// ============================================================
// Meta
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: state.sessions.session_count().await,
    })
}

async fn get_version() -> &'static str {
    concat!("techcraft ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) | SessionError::Closed(_) => AppError::NotFound(e.to_string()),
            SessionError::CapacityReached(_) => AppError::Unavailable(e.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::ProjectNotFound(_) => AppError::NotFound("Project not found".to_string()),
            other => {
                tracing::error!(error = %other, "Catalog query failed");
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl From<ToolkitError> for AppError {
    fn from(e: ToolkitError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
