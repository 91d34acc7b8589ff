use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Post
///
/// A blog post from the `posts` table. `body` is the serialized editor
/// document, rendered to HTML at page-render time.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    // URL segment under /blog. Unique.
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub cover_image: Option<String>,
    // Drafts are only visible in the admin area.
    pub published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Testimonial
///
/// A customer quote shown on the public site.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Testimonial {
    pub id: Uuid,
    pub author: String,
    pub company: Option<String>,
    pub quote: String,
    // 1 to 5 stars.
    pub rating: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ContactMessage
///
/// A submission of the contact form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Enquiry
///
/// A project enquiry: a contact message plus the service being asked about.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Enquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub service: String,
    pub budget: Option<String>,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Subscriber
///
/// A newsletter subscription. Emails are unique (case-insensitive).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreatePostRequest
///
/// Input payload for POST /admin/api/posts. When `excerpt` is omitted it is
/// derived from the document text.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub body: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// UpdatePostRequest
///
/// Partial update payload for PUT /admin/api/posts/{id}. Only the provided
/// fields change.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// CreateTestimonialRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateTestimonialRequest {
    pub author: String,
    #[serde(default)]
    pub company: Option<String>,
    pub quote: String,
    pub rating: i32,
}

/// ContactRequest
///
/// Input payload for POST /api/contact.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// EnquiryRequest
///
/// Input payload for POST /api/enquiry.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EnquiryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// NewsletterRequest
///
/// Input payload for POST /api/newsletter.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewsletterRequest {
    #[serde(default)]
    pub email: String,
}

// --- Output Schemas ---

/// PostSummary
///
/// A published post as listed on the blog index (GET /api/posts).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PostSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub reading_time_minutes: u32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// DashboardStats
///
/// Counters for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[ts(export)]
pub struct DashboardStats {
    pub published_posts: i64,
    pub draft_posts: i64,
    pub testimonials: i64,
    pub contacts: i64,
    pub enquiries: i64,
    pub subscribers: i64,
}

/// LeadsOverview
///
/// Everything the lead-capture forms have collected (GET /admin/api/leads).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LeadsOverview {
    pub contacts: Vec<ContactMessage>,
    pub enquiries: Vec<Enquiry>,
    pub subscribers: Vec<Subscriber>,
}

/// UploadResponse
///
/// The stored object's key and public URL (POST /admin/api/uploads).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UploadResponse {
    pub key: String,
    pub url: String,
}

// --- Validation ---

/// ValidationError
///
/// Names every required field that was missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing or invalid fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

/// Validate
///
/// Missing-field checking for request payloads.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Default)]
struct Checker {
    missing: Vec<&'static str>,
}

impl Checker {
    fn require(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.missing.push(field);
        }
        self
    }

    fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !is_plausible_email(value) {
            self.missing.push(field);
        }
        self
    }

    fn check(&mut self, field: &'static str, ok: bool) -> &mut Self {
        if !ok {
            self.missing.push(field);
        }
        self
    }

    fn finish(&mut self) -> Result<(), ValidationError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                missing: std::mem::take(&mut self.missing),
            })
        }
    }
}

/// Something before and after a single `@`, with a dot in the domain.
pub fn is_plausible_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Lower-case ASCII letters, digits and single inner hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Canonical form used for storage and uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl Validate for ContactRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Checker::default()
            .require("name", &self.name)
            .email("email", &self.email)
            .require("message", &self.message)
            .finish()
    }
}

impl Validate for EnquiryRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Checker::default()
            .require("name", &self.name)
            .email("email", &self.email)
            .require("service", &self.service)
            .require("message", &self.message)
            .finish()
    }
}

impl Validate for NewsletterRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Checker::default().email("email", &self.email).finish()
    }
}

impl Validate for CreateTestimonialRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Checker::default()
            .require("author", &self.author)
            .require("quote", &self.quote)
            .check("rating", (1..=5).contains(&self.rating))
            .finish()
    }
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Checker::default()
            .check("slug", is_valid_slug(&self.slug))
            .require("title", &self.title)
            .require("body", &self.body)
            .finish()
    }
}

impl Validate for UpdatePostRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checker = Checker::default();
        if let Some(slug) = &self.slug {
            checker.check("slug", is_valid_slug(slug));
        }
        if let Some(title) = &self.title {
            checker.require("title", title);
        }
        if let Some(body) = &self.body {
            checker.require("body", body);
        }
        checker.finish()
    }
}
