use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod render;
pub mod repository;
pub mod storage;

// Module for routing segregation (Public, Admin, Client).
pub mod routes;
use routes::{admin, client, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use guard::AccessGuard;
pub use render::ContentRenderer;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Auto-generates the OpenAPI document for the JSON endpoints, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_posts, handlers::list_testimonials, handlers::submit_contact,
        handlers::submit_enquiry, handlers::subscribe_newsletter, handlers::admin_list_posts,
        handlers::admin_get_post, handlers::create_post, handlers::update_post,
        handlers::delete_post, handlers::preview_post, handlers::create_testimonial,
        handlers::delete_testimonial, handlers::list_leads, handlers::upload_image
    ),
    components(
        schemas(
            models::Post, models::PostSummary, models::Testimonial, models::ContactMessage,
            models::Enquiry, models::Subscriber, models::CreatePostRequest,
            models::UpdatePostRequest, models::CreateTestimonialRequest, models::ContactRequest,
            models::EnquiryRequest, models::NewsletterRequest, models::LeadsOverview,
            models::UploadResponse, models::DashboardStats, auth::Role,
        )
    ),
    tags(
        (name = "marketing-site", description = "Marketing site and admin API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single, immutable container of shared services, cloned into every
/// request.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Postgres in deployments, in-memory for tests and
    /// database-less local runs.
    pub repo: RepositoryState,
    /// Storage Layer: S3/MinIO image uploads.
    pub storage: StorageState,
    /// Content renderer for post bodies. Read-only after startup.
    pub renderer: Arc<ContentRenderer>,
    /// Access guard for the `/admin` and `/client` families.
    pub guard: AccessGuard,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// new
    ///
    /// Builds the state with the built-in renderer and a JWT session
    /// verifier keyed by the configured secret.
    pub fn new(config: AppConfig, repo: RepositoryState, storage: StorageState) -> Self {
        let verifier = Arc::new(auth::JwtSessionVerifier::new(
            &config.session_secret,
            config.session_cookie.clone(),
        ));
        let guard = AccessGuard::new(verifier, config.guard_targets());

        Self {
            repo,
            storage,
            renderer: Arc::new(ContentRenderer::new()),
            guard,
            config,
        }
    }

    /// Replaces the content renderer, e.g. one carrying site-specific node types.
    pub fn with_renderer(mut self, renderer: ContentRenderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Replaces the access guard, e.g. one backed by a different verifier.
    pub fn with_guard(mut self, guard: AccessGuard) -> Self {
        self.guard = guard;
        self
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for AccessGuard {
    fn from_ref(app_state: &AppState) -> AccessGuard {
        app_state.guard.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware,
/// and registers the application state.
///
/// The access guard is layered onto the `/admin` and `/client` routers
/// only, together with their fallbacks, so every path in those families is
/// guarded and nothing else is.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let guarded = |router: Router<AppState>| {
        router
            .fallback(pages::not_found)
            .layer(middleware::from_fn_with_state(
                state.clone(),
                guard::access_guard,
            ))
    };

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: No middleware applied.
        .merge(public::public_routes())
        .nest(
            guard::ADMIN_PREFIX,
            guarded(admin::admin_routes(state.config.max_upload_bytes)),
        )
        .nest(guard::CLIENT_PREFIX, guarded(client::client_routes()))
        .fallback(pages::not_found)
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, carrying the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the `TraceLayer` span: HTTP method, URI and the `x-request-id`
/// header, so every log line of one request is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
