//! Role-based access guard for the `/admin` and `/client` route families.
//!
//! Per request: classify the path, resolve the session, decide. The guard
//! only ever forwards the request or answers with a redirect; it never
//! writes state and never lets a verifier failure through as an allow.

use axum::{
    extract::{OriginalUri, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{Role, Session, SessionVerifier, VerificationError, VerifierState};

pub const ADMIN_PREFIX: &str = "/admin";
pub const CLIENT_PREFIX: &str = "/client";

/// RouteClass
///
/// Which route family a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Admin,
    Client,
    Public,
}

/// classify
///
/// `/admin` and everything below it is `Admin`, likewise for `/client`.
/// Matching is per path segment, so `/administrator` is `Public`.
pub fn classify(path: &str) -> RouteClass {
    if has_prefix(path, ADMIN_PREFIX) {
        RouteClass::Admin
    } else if has_prefix(path, CLIENT_PREFIX) {
        RouteClass::Client
    } else {
        RouteClass::Public
    }
}

fn has_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// GuardTargets
///
/// Where the guard sends callers it turns away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardTargets {
    pub sign_in: String,
    pub client_landing: String,
    pub admin_dashboard: String,
}

impl Default for GuardTargets {
    fn default() -> Self {
        Self {
            sign_in: "/sign-in".to_string(),
            client_landing: "/client".to_string(),
            admin_dashboard: "/admin/dashboard".to_string(),
        }
    }
}

/// GuardDecision
///
/// The three terminal outcomes of a guarded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectSignIn(String),
    RedirectRoleMismatch(String),
}

/// decide
///
/// Pure decision over an already-resolved session:
/// - no session: sign in, then come back to `path`
/// - admin route without the admin role: client landing page
/// - client route without the client role: admin dashboard
/// - anything else passes
pub fn decide(
    class: RouteClass,
    session: &Session,
    path: &str,
    targets: &GuardTargets,
) -> GuardDecision {
    let Some(role) = session.role() else {
        return GuardDecision::RedirectSignIn(sign_in_redirect(targets, path));
    };

    match class {
        RouteClass::Admin if role != Role::Admin => {
            GuardDecision::RedirectRoleMismatch(targets.client_landing.clone())
        }
        RouteClass::Client if role != Role::Client => {
            GuardDecision::RedirectRoleMismatch(targets.admin_dashboard.clone())
        }
        _ => GuardDecision::Allow,
    }
}

/// sign_in_redirect
///
/// The sign-in location with the requested path as its `callbackUrl`.
pub fn sign_in_redirect(targets: &GuardTargets, path: &str) -> String {
    let separator = if targets.sign_in.contains('?') { '&' } else { '?' };
    format!(
        "{}{}callbackUrl={}",
        targets.sign_in,
        separator,
        percent_encode(path)
    )
}

/// Encodes every byte outside the RFC 3986 unreserved set.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// resolve_session
///
/// Runs the verifier and folds every failure, including a verifier that is
/// itself broken, into `Session::Absent`.
pub async fn resolve_session(verifier: &dyn SessionVerifier, headers: &HeaderMap) -> Session {
    match verifier.verify(headers).await {
        Ok(claims) => Session::Authenticated(claims),
        Err(VerificationError::Unavailable(reason)) => {
            tracing::warn!(%reason, "session verifier unavailable, treating request as signed out");
            Session::Absent
        }
        Err(e) => {
            tracing::debug!(error = %e, "no valid session");
            Session::Absent
        }
    }
}

/// AccessGuard
///
/// The guard's read-only dependencies: the verifier (holding the signing
/// secret) and the redirect targets. Cloned into every request cheaply.
#[derive(Clone)]
pub struct AccessGuard {
    verifier: VerifierState,
    targets: GuardTargets,
}

impl AccessGuard {
    pub fn new(verifier: VerifierState, targets: GuardTargets) -> Self {
        Self { verifier, targets }
    }

    pub fn targets(&self) -> &GuardTargets {
        &self.targets
    }

    /// Classify, resolve and decide for one request.
    pub async fn check(&self, path: &str, headers: &HeaderMap) -> (GuardDecision, Session) {
        let class = classify(path);
        let session = resolve_session(self.verifier.as_ref(), headers).await;
        let decision = decide(class, &session, path, &self.targets);
        (decision, session)
    }
}

/// access_guard
///
/// Axum middleware wrapping the `/admin` and `/client` routers. On allow, the
/// resolved claims are placed in the request extensions for the
/// `AuthSession` extractor and the request continues unmodified.
///
/// The routers are nested, so the full path comes from `OriginalUri`.
pub async fn access_guard(
    State(guard): State<AccessGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let (decision, session) = guard.check(&path, request.headers()).await;

    match decision {
        GuardDecision::Allow => {
            if let Session::Authenticated(claims) = session {
                request.extensions_mut().insert(claims);
            }
            next.run(request).await
        }
        GuardDecision::RedirectSignIn(location) => {
            tracing::info!(%path, %location, "unauthenticated request redirected to sign-in");
            Redirect::temporary(&location).into_response()
        }
        GuardDecision::RedirectRoleMismatch(location) => {
            tracing::info!(%path, %location, role = ?session.role(), "role does not match route family");
            Redirect::temporary(&location).into_response()
        }
    }
}
