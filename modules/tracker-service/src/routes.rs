//! Axum route handlers for the tracker HTTP API.

use crate::activities::{self, ActivityLog};
use crate::blog::{BlogArchive, DEFAULT_LIST_LIMIT};
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::gate::Authorizer;
use crate::storage::{FileStorage, Storage};
use crate::todos::TodoBoard;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracker_types::*;

pub struct AppState {
    pub activities: ActivityLog,
    pub blog: BlogArchive,
    pub todos: TodoBoard,
    pub authorizer: Arc<dyn Authorizer>,
    pub identity: Identity,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        activities: Arc<dyn Storage>,
        blog: Arc<dyn Storage>,
        todos: Arc<dyn Storage>,
        authorizer: Arc<dyn Authorizer>,
        identity: Identity,
    ) -> Self {
        Self {
            activities: ActivityLog::new(activities),
            blog: BlogArchive::new(blog),
            todos: TodoBoard::new(todos),
            authorizer,
            identity,
            start_time: Instant::now(),
        }
    }

    /// File-backed state under `config.data_dir`, with every collection seeded.
    pub fn open(config: &Config, authorizer: Arc<dyn Authorizer>) -> StoreResult<Self> {
        let state = Self::new(
            Arc::new(FileStorage::new(config.activities_path())),
            Arc::new(FileStorage::new(config.blog_path())),
            Arc::new(FileStorage::new(config.todos_path())),
            authorizer,
            config.identity.clone(),
        );
        state.initialize()?;
        Ok(state)
    }

    pub fn initialize(&self) -> StoreResult<()> {
        self.activities.store().initialize()?;
        self.blog.store().initialize()?;
        self.todos.store().initialize()?;
        Ok(())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/identity", get(identity))
        // Activities
        .route(
            "/api/activities",
            get(activities_list).post(activities_create),
        )
        .route("/api/activities/recent", get(activities_recent))
        // Blog
        .route("/api/blog", get(blog_list).post(blog_publish))
        .route("/api/blog/:id", get(blog_get))
        // Todos
        .route("/api/todos", get(todos_list).post(todos_create))
        .route(
            "/api/todos/:id",
            get(todos_get).put(todos_update).delete(todos_delete),
        )
        .with_state(state)
}

// =====================================================
// Errors
// =====================================================

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Map a store failure to a response. Server faults only ever expose
    /// `context`; the detail (paths, decode errors) goes to the log.
    fn from_store(err: StoreError, context: &str) -> Self {
        let status = match &err {
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Forbidden => StatusCode::FORBIDDEN,
            StoreError::Corrupt(_) | StoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if err.is_server_fault() {
            log::error!("{}: {}", context, err);
            context.to_string()
        } else {
            err.to_string()
        };
        Self { status, message }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Gate check for every mutating route. Runs before the body is decoded.
fn require_local(state: &AppState, caller: SocketAddr) -> Result<(), ApiError> {
    if state.authorizer.authorize(caller) {
        Ok(())
    } else {
        log::warn!("Rejected write from non-local caller {}", caller);
        Err(ApiError::from_store(StoreError::Forbidden, "Forbidden"))
    }
}

fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))
}

fn decode_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ApiError::bad_request(format!("Invalid query: {}", e.body_text())))
}

// =====================================================
// Service Endpoints
// =====================================================

// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// GET /api/identity
pub async fn identity(State(state): State<Arc<AppState>>) -> Json<Identity> {
    Json(state.identity.clone())
}

// =====================================================
// Activity Endpoints
// =====================================================

// GET /api/activities
pub async fn activities_list(State(state): State<Arc<AppState>>) -> ApiResult<ActivityCollection> {
    state
        .activities
        .list_all()
        .map(Json)
        .map_err(|e| ApiError::from_store(e, "Failed to read activities"))
}

// GET /api/activities/recent
pub async fn activities_recent(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Activity>> {
    state
        .activities
        .list_recent(activities::recent_window())
        .map(Json)
        .map_err(|e| ApiError::from_store(e, "Failed to read activities"))
}

// POST /api/activities
pub async fn activities_create(
    State(state): State<Arc<AppState>>,
    ConnectInfo(caller): ConnectInfo<SocketAddr>,
    payload: Result<Json<CreateActivityRequest>, JsonRejection>,
) -> ApiResult<ActivityCreated> {
    require_local(&state, caller)?;
    let req = decode(payload)?;

    let activity = state
        .activities
        .append(req)
        .map_err(|e| ApiError::from_store(e, "Failed to add activity"))?;
    log::info!("Logged {} activity {}", activity.kind, activity.id);

    Ok(Json(ActivityCreated {
        success: true,
        activity,
    }))
}

// =====================================================
// Blog Endpoints
// =====================================================

// GET /api/blog?limit=N
pub async fn blog_list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BlogListQuery>, QueryRejection>,
) -> ApiResult<BlogListing> {
    let query = decode_query(query)?;
    state
        .blog
        .list_summaries(query.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .map(Json)
        .map_err(|e| ApiError::from_store(e, "Failed to read blog posts"))
}

// GET /api/blog/:id
pub async fn blog_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<BlogPost> {
    state
        .blog
        .get_by_id(&id)
        .map(Json)
        .map_err(|e| ApiError::from_store(e, "Failed to read blog post"))
}

// POST /api/blog
pub async fn blog_publish(
    State(state): State<Arc<AppState>>,
    ConnectInfo(caller): ConnectInfo<SocketAddr>,
    payload: Result<Json<PublishPostRequest>, JsonRejection>,
) -> ApiResult<PostPublished> {
    require_local(&state, caller)?;
    let req = decode(payload)?;

    let post = state
        .blog
        .publish(req)
        .map_err(|e| ApiError::from_store(e, "Failed to publish post"))?;
    log::info!("Published blog post {} ({})", post.id, post.title);

    Ok(Json(PostPublished {
        success: true,
        post,
    }))
}

// =====================================================
// Todo Endpoints
// =====================================================

// GET /api/todos?status=S
pub async fn todos_list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TodoListQuery>, QueryRejection>,
) -> ApiResult<TodoListing> {
    let query = decode_query(query)?;
    state
        .todos
        .list_all(query.status.as_deref())
        .map(Json)
        .map_err(|e| ApiError::from_store(e, "Failed to read todos"))
}

// GET /api/todos/:id
pub async fn todos_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Todo> {
    state
        .todos
        .get_by_id(&id)
        .map(Json)
        .map_err(|e| ApiError::from_store(e, "Failed to read todo"))
}

// POST /api/todos
pub async fn todos_create(
    State(state): State<Arc<AppState>>,
    ConnectInfo(caller): ConnectInfo<SocketAddr>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    require_local(&state, caller)?;
    let req = decode(payload)?;

    let todo = state
        .todos
        .create(req)
        .map_err(|e| ApiError::from_store(e, "Failed to create todo"))?;
    log::info!("Created todo {} ({})", todo.id, todo.status);

    Ok((StatusCode::CREATED, Json(todo)))
}

// PUT /api/todos/:id
pub async fn todos_update(
    State(state): State<Arc<AppState>>,
    ConnectInfo(caller): ConnectInfo<SocketAddr>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> ApiResult<Todo> {
    require_local(&state, caller)?;
    let req = decode(payload)?;

    state
        .todos
        .update(&id, req)
        .map(Json)
        .map_err(|e| ApiError::from_store(e, "Failed to update todo"))
}

// DELETE /api/todos/:id
pub async fn todos_delete(
    State(state): State<Arc<AppState>>,
    ConnectInfo(caller): ConnectInfo<SocketAddr>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    require_local(&state, caller)?;

    state
        .todos
        .delete(&id)
        .map_err(|e| ApiError::from_store(e, "Failed to delete todo"))?;
    log::info!("Deleted todo {}", id);

    Ok(Json(Deleted { success: true }))
}
