use crate::{AppState, pages};
use axum::{Router, routing::get};

/// Client Router Module
///
/// The signed-in client area, nested under `/client` and wrapped by the
/// access guard. Admin sessions are redirected to the admin dashboard
/// before reaching these handlers.
pub fn client_routes() -> Router<AppState> {
    Router::new().route("/", get(pages::client_landing))
}
