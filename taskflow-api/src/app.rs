/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskflow_api::{app::{AppState, build_router}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskflow_shared::auth::{jwt, middleware::AuthContext};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /api/v1/
///     ├── /auth/                     # register, login, refresh, logout (public)
///     ├── /users/me                  # Profile (authenticated)
///     ├── /tasks                     # CRUD + trash/restore + duplicate
///     ├── /notes                     # CRUD + trash/restore + collaborators
///     ├── /folders                   # CRUD
///     ├── /teams                     # CRUD + members
///     └── /habits                    # CRUD + logs + analytics
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public; refresh/logout authenticate via the refresh token
    // in the body)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout));

    let user_routes = Router::new()
        .route("/me", get(routes::users::get_me))
        .route("/me", patch(routes::users::update_me));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route("/trash", get(routes::tasks::list_trashed_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/restore", post(routes::tasks::restore_task))
        .route("/:id/permanent", delete(routes::tasks::permanently_delete_task))
        .route("/:id/duplicate", post(routes::tasks::duplicate_task));

    let note_routes = Router::new()
        .route("/", get(routes::notes::list_notes).post(routes::notes::create_note))
        .route("/trash", get(routes::notes::list_trashed_notes))
        .route(
            "/:id",
            get(routes::notes::get_note)
                .patch(routes::notes::update_note)
                .delete(routes::notes::delete_note),
        )
        .route("/:id/restore", post(routes::notes::restore_note))
        .route("/:id/permanent", delete(routes::notes::permanently_delete_note))
        .route(
            "/:id/collaborators",
            get(routes::notes::list_collaborators).post(routes::notes::invite_collaborator),
        )
        .route(
            "/:id/collaborators/:user_id",
            delete(routes::notes::remove_collaborator),
        );

    let folder_routes = Router::new()
        .route(
            "/",
            get(routes::folders::list_folders).post(routes::folders::create_folder),
        )
        .route(
            "/:id",
            patch(routes::folders::update_folder).delete(routes::folders::delete_folder),
        );

    let team_routes = Router::new()
        .route("/", get(routes::teams::list_teams).post(routes::teams::create_team))
        .route(
            "/:id",
            get(routes::teams::get_team)
                .patch(routes::teams::update_team)
                .delete(routes::teams::delete_team),
        )
        .route(
            "/:id/members",
            get(routes::teams::list_members).post(routes::teams::add_member),
        )
        .route("/:id/members/:user_id", delete(routes::teams::remove_member));

    let habit_routes = Router::new()
        .route("/", get(routes::habits::list_habits).post(routes::habits::create_habit))
        .route("/analytics/summary", get(routes::habits::analytics_summary))
        .route("/analytics/heatmap", get(routes::habits::analytics_heatmap))
        .route(
            "/:id",
            get(routes::habits::get_habit)
                .patch(routes::habits::update_habit)
                .delete(routes::habits::delete_habit),
        )
        .route(
            "/:id/logs",
            get(routes::habits::list_logs).post(routes::habits::log_habit),
        )
        .route("/:id/logs/:date", delete(routes::habits::delete_log));

    // Everything except auth requires a valid access token
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/notes", note_routes)
        .nest("/folders", folder_routes)
        .nest("/teams", team_routes)
        .nest("/habits", habit_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the access token from the Authorization header,
/// then injects [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::Unauthorized("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext {
        user_id: claims.sub,
        session_id: claims.sid,
    };
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
