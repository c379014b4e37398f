pub mod auth;
pub mod config;
pub mod db;
pub mod loading;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    AuthResponse, AuthService, InMemoryUserStore, InvitationResponse, InviteUserRequest,
    JwtTokenService, LoginRequest, PgUserStore, RegisterRequest, SetPasswordRequest, TokenService,
    UserResponse, UserRole, UserStore,
};
use config::Config;
use loading::{DispatchedAction, LoadingState, LoadingStore};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::me_handler,
        auth::handlers::invite_handler,
        auth::handlers::setup_password_handler,
        loading::handlers::get_loading_handler,
        loading::handlers::dispatch_loading_handler,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            InviteUserRequest,
            SetPasswordRequest,
            AuthResponse,
            InvitationResponse,
            UserResponse,
            UserRole,
            LoadingState,
            DispatchedAction,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and password setup"),
        (name = "ui", description = "Dashboard loading indicator")
    ),
    info(
        title = "Content Portal API",
        version = "0.1.0",
        description = "Authentication backend for the content portal dashboard"
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub tokens: Arc<dyn TokenService>,
    pub loading: Arc<LoadingStore>,
}

impl AppState {
    pub fn new(user_store: Arc<dyn UserStore>, tokens: Arc<dyn TokenService>) -> Self {
        Self {
            auth: Arc::new(AuthService::new(user_store, tokens.clone())),
            tokens,
            loading: Arc::new(LoadingStore::new()),
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<dyn TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<LoadingStore> {
    fn from_ref(state: &AppState) -> Self {
        state.loading.clone()
    }
}

/// Maps all API endpoints to their handlers
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/auth/invite", post(auth::invite_handler))
        .route("/api/auth/setup-password", post(auth::setup_password_handler))
        .route("/api/ui/loading", get(loading::get_loading_handler))
        .route(
            "/api/ui/loading/dispatch",
            post(loading::dispatch_loading_handler),
        )
}

/// Creates and configures the application router
/// Adds Swagger UI, CORS and request tracing around the API routes
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Content Portal API - Starting...");

    let config = Config::from_env().expect("Invalid configuration");

    let user_store: Arc<dyn UserStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db_pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");

            db::run_migrations(&db_pool)
                .await
                .expect("Failed to run database migrations");

            Arc::new(PgUserStore::new(db_pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory only");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::with_durations(
        config.jwt_secret.clone(),
        config.session_token_ttl_secs,
        config.password_setup_token_ttl_secs,
    ));

    let state = AppState::new(user_store, tokens);

    if let Some(admin) = &config.admin {
        let created = state
            .auth
            .ensure_admin(&admin.email, &admin.password)
            .await
            .expect("Failed to create admin account");
        if !created {
            tracing::info!("Admin account {} already exists", admin.email);
        }
    }

    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Content Portal API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
