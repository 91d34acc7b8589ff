use crate::{AppState, handlers, pages};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable by anyone. Read handlers only ever see published
/// posts; the form endpoints validate their input before anything is stored.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // --- Pages ---
        .route("/", get(pages::home))
        .route("/blog", get(pages::blog_index))
        // GET /blog/{slug}
        // Unknown or unpublished slugs get the 404 page.
        .route("/blog/{slug}", get(pages::blog_post))
        // --- JSON API ---
        .route("/api/posts", get(handlers::list_posts))
        .route("/api/testimonials", get(handlers::list_testimonials))
        .route("/api/contact", post(handlers::submit_contact))
        .route("/api/enquiry", post(handlers::submit_enquiry))
        // POST /api/newsletter
        // A second subscription for the same address is a 409.
        .route("/api/newsletter", post(handlers::subscribe_newsletter))
}
