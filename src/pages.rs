//! Server-rendered HTML pages.
//!
//! Post bodies go through the content renderer; every other dynamic value is
//! escaped by the `maud` templates. A post that fails to render is replaced by a fallback page,
//! never shown half-rendered.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    AppState,
    auth::AuthSession,
    models::{DashboardStats, Post, Testimonial},
    render::{Node, reading_time_minutes, safe_url},
};

const SITE_NAME: &str = "Northlight Studio";

fn layout(title: &str, main: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (SITE_NAME) }
            }
            body {
                header {
                    nav {
                        a href="/" { "Home" }
                        " "
                        a href="/blog" { "Blog" }
                    }
                }
                main { (main) }
                footer { p { "© " (SITE_NAME) } }
            }
        }
    }
}

fn post_date(post: &Post) -> String {
    post.created_at.format("%B %-d, %Y").to_string()
}

fn testimonial_card(t: &Testimonial) -> Markup {
    html! {
        figure.testimonial data-rating=(t.rating) {
            blockquote { (t.quote) }
            figcaption {
                (t.author)
                @if let Some(company) = &t.company { ", " (company) }
            }
        }
    }
}

fn post_card(post: &Post) -> Markup {
    html! {
        article {
            h2 { a href={ "/blog/" (post.slug) } { (post.title) } }
            time { (post_date(post)) }
            p { (post.excerpt) }
        }
    }
}

pub fn not_found_page() -> Markup {
    layout(
        "Not found",
        html! {
            h1 { "Page not found" }
            p { "The page you were looking for does not exist." }
        },
    )
}

/// Shown instead of a post whose stored body cannot be rendered.
pub fn content_unavailable_page() -> Markup {
    layout(
        "Content unavailable",
        html! {
            h1 { "Content unavailable" }
            p { "This article cannot be displayed right now. Please try again later." }
        },
    )
}

/// `body_html` is the content renderer's output and is embedded as is.
pub fn post_page(post: &Post, body_html: &str, reading_minutes: u32) -> Markup {
    let cover = post.cover_image.as_deref().and_then(safe_url);
    layout(
        &post.title,
        html! {
            article.post {
                h1 { (post.title) }
                p.meta { time { (post_date(post)) } " · " (reading_minutes) " min read" }
                @if let Some(src) = cover {
                    img.cover src=(src) alt="";
                }
                div.content { (PreEscaped(body_html)) }
            }
        },
    )
}

pub fn blog_index_page(posts: &[Post]) -> Markup {
    layout(
        "Blog",
        html! {
            h1 { "Blog" }
            @if posts.is_empty() {
                p { "No articles yet." }
            }
            @for post in posts { (post_card(post)) }
        },
    )
}

pub fn home_page(posts: &[Post], testimonials: &[Testimonial]) -> Markup {
    layout(
        "Home",
        html! {
            h1 { (SITE_NAME) }
            section.latest {
                h2 { "Latest articles" }
                @for post in posts.iter().take(3) { (post_card(post)) }
            }
            section.testimonials {
                h2 { "What our clients say" }
                @for t in testimonials { (testimonial_card(t)) }
            }
        },
    )
}

pub fn admin_dashboard_page(subject: &str, stats: &DashboardStats) -> Markup {
    layout(
        "Dashboard",
        html! {
            h1 { "Dashboard" }
            p { "Signed in as " (subject) }
            ul.stats {
                li { "Published posts: " (stats.published_posts) }
                li { "Drafts: " (stats.draft_posts) }
                li { "Testimonials: " (stats.testimonials) }
                li { "Contact messages: " (stats.contacts) }
                li { "Enquiries: " (stats.enquiries) }
                li { "Subscribers: " (stats.subscribers) }
            }
        },
    )
}

pub fn client_landing_page(subject: &str) -> Markup {
    layout(
        "Client area",
        html! {
            h1 { "Welcome back" }
            p { "Signed in as " (subject) }
            p { "Your project updates will appear here." }
        },
    )
}

fn unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(content_unavailable_page().into_string()),
    )
        .into_response()
}

// --- Page Handlers ---

/// home
///
/// [Public Page] Latest posts and testimonials.
pub async fn home(State(state): State<AppState>) -> Response {
    let posts = state.repo.list_published_posts().await;
    let testimonials = state.repo.list_testimonials().await;
    match (posts, testimonials) {
        (Ok(posts), Ok(testimonials)) => {
            Html(home_page(&posts, &testimonials).into_string()).into_response()
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "home page data unavailable");
            unavailable()
        }
    }
}

/// blog_index
///
/// [Public Page] Every published post, newest first.
pub async fn blog_index(State(state): State<AppState>) -> Response {
    match state.repo.list_published_posts().await {
        Ok(posts) => Html(blog_index_page(&posts).into_string()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "blog index unavailable");
            unavailable()
        }
    }
}

/// blog_post
///
/// [Public Page] A single published post. The stored body is parsed once,
/// rendered, and measured for reading time. Any render error replaces the
/// whole page with the fallback.
pub async fn blog_post(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let post = match state.repo.find_post_by_slug(&slug, false).await {
        Ok(Some(post)) => post,
        Ok(None) => return not_found().await.into_response(),
        Err(e) => {
            tracing::error!(%slug, error = %e, "post lookup failed");
            return unavailable();
        }
    };

    let rendered = Node::parse(&post.body).and_then(|document| {
        let html = state.renderer.render_node(&document)?;
        Ok((html, reading_time_minutes(&document)))
    });

    match rendered {
        Ok((html, minutes)) => Html(post_page(&post, &html, minutes).into_string()).into_response(),
        Err(e) => {
            tracing::error!(%slug, error = %e, "post body failed to render");
            unavailable()
        }
    }
}

/// admin_home
///
/// [Admin Page] `/admin` itself forwards to the dashboard.
pub async fn admin_home(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.config.admin_dashboard_path)
}

/// admin_dashboard
///
/// [Admin Page] Headline counters for the site.
pub async fn admin_dashboard(
    AuthSession(claims): AuthSession,
    State(state): State<AppState>,
) -> Response {
    match state.repo.get_stats().await {
        Ok(stats) => Html(admin_dashboard_page(&claims.sub, &stats).into_string()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "dashboard stats unavailable");
            unavailable()
        }
    }
}

/// client_landing
///
/// [Client Page] Landing page of the client area.
pub async fn client_landing(AuthSession(claims): AuthSession) -> Html<String> {
    Html(client_landing_page(&claims.sub).into_string())
}

/// not_found
///
/// Fallback for the guarded routers, so unknown paths under `/admin` and
/// `/client` still pass through the guard before answering 404.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(not_found_page().into_string()))
}
