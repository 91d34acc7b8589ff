use crate::{AppState, handlers, pages};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

/// Admin Router Module
///
/// Routes for site administrators, nested under `/admin`.
///
/// Access Control:
/// The router is wrapped by the access guard where it is nested, so every
/// handler here can assume an admin session and read it with `AuthSession`.
pub fn admin_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // GET /admin
        // Forwards to the dashboard.
        .route("/", get(pages::admin_home))
        .route("/dashboard", get(pages::admin_dashboard))
        // --- Posts ---
        .route(
            "/api/posts",
            get(handlers::admin_list_posts).post(handlers::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::admin_get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        // GET /admin/api/posts/{id}/preview
        // Renders drafts too.
        .route("/api/posts/{id}/preview", get(handlers::preview_post))
        // --- Testimonials ---
        .route("/api/testimonials", post(handlers::create_testimonial))
        .route(
            "/api/testimonials/{id}",
            delete(handlers::delete_testimonial),
        )
        // --- Leads ---
        .route("/api/leads", get(handlers::list_leads))
        // POST /admin/api/uploads
        // Raw image body; larger bodies are rejected with 413 before the handler runs.
        .route(
            "/api/uploads",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}
