use crate::models::{
    ContactMessage, ContactRequest, CreatePostRequest, CreateTestimonialRequest, DashboardStats,
    Enquiry, EnquiryRequest, Post, Subscriber, Testimonial, UpdatePostRequest, normalize_email,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// StoreError
///
/// The closed set of failures the persistence layer reports. Callers match
/// on `DuplicateKey` instead of inspecting backend error codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique constraint (post slug, subscriber email) was violated.
    #[error("duplicate key")]
    DuplicateKey,
    #[error("record not found")]
    NotFound,
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers
/// work unchanged against Postgres or the in-memory store.
///
/// **Send + Sync + async_trait** are required to share the trait object
/// (`Arc<dyn Repository>`) across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Posts ---
    // Published posts only, newest first.
    async fn list_published_posts(&self) -> StoreResult<Vec<Post>>;
    // Admin listing, drafts included.
    async fn list_all_posts(&self) -> StoreResult<Vec<Post>>;
    // Drafts are only returned when `include_drafts` is set.
    async fn find_post_by_slug(&self, slug: &str, include_drafts: bool) -> StoreResult<Option<Post>>;
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>>;
    // Slug uniqueness violations surface as `DuplicateKey`.
    async fn create_post(&self, req: CreatePostRequest) -> StoreResult<Post>;
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> StoreResult<Post>;
    async fn delete_post(&self, id: Uuid) -> StoreResult<()>;

    // --- Testimonials ---
    async fn list_testimonials(&self) -> StoreResult<Vec<Testimonial>>;
    async fn create_testimonial(&self, req: CreateTestimonialRequest) -> StoreResult<Testimonial>;
    async fn delete_testimonial(&self, id: Uuid) -> StoreResult<()>;

    // --- Leads ---
    async fn create_contact(&self, req: ContactRequest) -> StoreResult<ContactMessage>;
    async fn create_enquiry(&self, req: EnquiryRequest) -> StoreResult<Enquiry>;
    // Email uniqueness violations surface as `DuplicateKey`.
    async fn create_subscriber(&self, email: &str) -> StoreResult<Subscriber>;
    async fn list_contacts(&self) -> StoreResult<Vec<ContactMessage>>;
    async fn list_enquiries(&self) -> StoreResult<Vec<Enquiry>>;
    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>>;

    async fn get_stats(&self) -> StoreResult<DashboardStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

const POST_COLUMNS: &str =
    "id, slug, title, excerpt, body, cover_image, published, created_at, updated_at";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Schema lives in
/// `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool).await?)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_published_posts(&self) -> StoreResult<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE published = true ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_all_posts(&self) -> StoreResult<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY published ASC, created_at DESC"
        );
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_post_by_slug(&self, slug: &str, include_drafts: bool) -> StoreResult<Option<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE slug = $1 AND (published = true OR $2)"
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .bind(include_drafts)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// create_post
    ///
    /// Inserts a new post. The `posts_slug_key` unique index turns a reused
    /// slug into `DuplicateKey`.
    async fn create_post(&self, req: CreatePostRequest) -> StoreResult<Post> {
        let sql = format!(
            "INSERT INTO posts (id, slug, title, excerpt, body, cover_image, published, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) RETURNING {POST_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.slug)
            .bind(req.title)
            .bind(req.excerpt.unwrap_or_default())
            .bind(req.body)
            .bind(req.cover_image)
            .bind(req.published)
            .fetch_one(&self.pool)
            .await?)
    }

    /// update_post
    ///
    /// Uses `COALESCE` so only the provided fields change.
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> StoreResult<Post> {
        let sql = format!(
            r#"
            UPDATE posts
            SET slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                excerpt = COALESCE($4, excerpt),
                body = COALESCE($5, body),
                cover_image = COALESCE($6, cover_image),
                published = COALESCE($7, published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(req.slug)
            .bind(req.title)
            .bind(req.excerpt)
            .bind(req.body)
            .bind(req.cover_image)
            .bind(req.published)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        match result.rows_affected() {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn list_testimonials(&self) -> StoreResult<Vec<Testimonial>> {
        Ok(sqlx::query_as::<_, Testimonial>(
            "SELECT id, author, company, quote, rating, created_at FROM testimonials ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_testimonial(&self, req: CreateTestimonialRequest) -> StoreResult<Testimonial> {
        Ok(sqlx::query_as::<_, Testimonial>(
            "INSERT INTO testimonials (id, author, company, quote, rating, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING id, author, company, quote, rating, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(req.author)
        .bind(req.company)
        .bind(req.quote)
        .bind(req.rating)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_testimonial(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        match result.rows_affected() {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn create_contact(&self, req: ContactRequest) -> StoreResult<ContactMessage> {
        Ok(sqlx::query_as::<_, ContactMessage>(
            "INSERT INTO contact_messages (id, name, email, phone, message, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING id, name, email, phone, message, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(normalize_email(&req.email))
        .bind(req.phone)
        .bind(req.message)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn create_enquiry(&self, req: EnquiryRequest) -> StoreResult<Enquiry> {
        Ok(sqlx::query_as::<_, Enquiry>(
            "INSERT INTO enquiries (id, name, email, company, service, budget, message, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) \
             RETURNING id, name, email, company, service, budget, message, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(normalize_email(&req.email))
        .bind(req.company)
        .bind(req.service)
        .bind(req.budget)
        .bind(req.message)
        .fetch_one(&self.pool)
        .await?)
    }

    /// create_subscriber
    ///
    /// The `subscribers_email_key` unique index on `lower(email)` turns a
    /// repeat subscription into `DuplicateKey`.
    async fn create_subscriber(&self, email: &str) -> StoreResult<Subscriber> {
        Ok(sqlx::query_as::<_, Subscriber>(
            "INSERT INTO subscribers (id, email, created_at) VALUES ($1, $2, NOW()) \
             RETURNING id, email, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(normalize_email(email))
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_contacts(&self) -> StoreResult<Vec<ContactMessage>> {
        Ok(sqlx::query_as::<_, ContactMessage>(
            "SELECT id, name, email, phone, message, created_at FROM contact_messages ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_enquiries(&self) -> StoreResult<Vec<Enquiry>> {
        Ok(sqlx::query_as::<_, Enquiry>(
            "SELECT id, name, email, company, service, budget, message, created_at FROM enquiries ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        Ok(sqlx::query_as::<_, Subscriber>(
            "SELECT id, email, created_at FROM subscribers ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// get_stats
    ///
    /// Compiles every dashboard counter.
    async fn get_stats(&self) -> StoreResult<DashboardStats> {
        Ok(DashboardStats {
            published_posts: self.count("SELECT COUNT(*) FROM posts WHERE published = true").await?,
            draft_posts: self.count("SELECT COUNT(*) FROM posts WHERE published = false").await?,
            testimonials: self.count("SELECT COUNT(*) FROM testimonials").await?,
            contacts: self.count("SELECT COUNT(*) FROM contact_messages").await?,
            enquiries: self.count("SELECT COUNT(*) FROM enquiries").await?,
            subscribers: self.count("SELECT COUNT(*) FROM subscribers").await?,
        })
    }
}

// --- In-memory store ---

#[derive(Default)]
struct Tables {
    posts: Vec<Post>,
    testimonials: Vec<Testimonial>,
    contacts: Vec<ContactMessage>,
    enquiries: Vec<Enquiry>,
    subscribers: Vec<Subscriber>,
}

/// MemoryRepository
///
/// An in-process `Repository` with the same uniqueness rules as the
/// Postgres schema. Backs the test suite, and local runs without a
/// `DATABASE_URL`.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first, as the SQL queries order them.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_published_posts(&self) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let published: Vec<Post> = tables.posts.iter().filter(|p| p.published).cloned().collect();
        Ok(newest_first(&published, |p| p.created_at))
    }

    async fn list_all_posts(&self) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts = newest_first(&tables.posts, |p| p.created_at);
        // Drafts first, as in the admin SQL ordering.
        posts.sort_by_key(|p| p.published);
        Ok(posts)
    }

    async fn find_post_by_slug(&self, slug: &str, include_drafts: bool) -> StoreResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .find(|p| p.slug == slug && (p.published || include_drafts))
            .cloned())
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, req: CreatePostRequest) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;
        if tables.posts.iter().any(|p| p.slug == req.slug) {
            return Err(StoreError::DuplicateKey);
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            slug: req.slug,
            title: req.title,
            excerpt: req.excerpt.unwrap_or_default(),
            body: req.body,
            cover_image: req.cover_image,
            published: req.published,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;
        if let Some(slug) = &req.slug {
            if tables.posts.iter().any(|p| p.id != id && &p.slug == slug) {
                return Err(StoreError::DuplicateKey);
            }
        }

        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(slug) = req.slug {
            post.slug = slug;
        }
        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(excerpt) = req.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(body) = req.body {
            post.body = body;
        }
        if let Some(cover_image) = req.cover_image {
            post.cover_image = Some(cover_image);
        }
        if let Some(published) = req.published {
            post.published = published;
        }
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_testimonials(&self) -> StoreResult<Vec<Testimonial>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.testimonials, |t| t.created_at))
    }

    async fn create_testimonial(&self, req: CreateTestimonialRequest) -> StoreResult<Testimonial> {
        let testimonial = Testimonial {
            id: Uuid::new_v4(),
            author: req.author,
            company: req.company,
            quote: req.quote,
            rating: req.rating,
            created_at: Utc::now(),
        };
        self.tables.write().await.testimonials.push(testimonial.clone());
        Ok(testimonial)
    }

    async fn delete_testimonial(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.testimonials.len();
        tables.testimonials.retain(|t| t.id != id);
        if tables.testimonials.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_contact(&self, req: ContactRequest) -> StoreResult<ContactMessage> {
        let contact = ContactMessage {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            phone: req.phone,
            message: req.message,
            created_at: Utc::now(),
        };
        self.tables.write().await.contacts.push(contact.clone());
        Ok(contact)
    }

    async fn create_enquiry(&self, req: EnquiryRequest) -> StoreResult<Enquiry> {
        let enquiry = Enquiry {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            company: req.company,
            service: req.service,
            budget: req.budget,
            message: req.message,
            created_at: Utc::now(),
        };
        self.tables.write().await.enquiries.push(enquiry.clone());
        Ok(enquiry)
    }

    async fn create_subscriber(&self, email: &str) -> StoreResult<Subscriber> {
        let email = normalize_email(email);
        let mut tables = self.tables.write().await;
        if tables.subscribers.iter().any(|s| s.email == email) {
            return Err(StoreError::DuplicateKey);
        }

        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            email,
            created_at: Utc::now(),
        };
        tables.subscribers.push(subscriber.clone());
        Ok(subscriber)
    }

    async fn list_contacts(&self) -> StoreResult<Vec<ContactMessage>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.contacts, |c| c.created_at))
    }

    async fn list_enquiries(&self) -> StoreResult<Vec<Enquiry>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.enquiries, |e| e.created_at))
    }

    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.subscribers, |s| s.created_at))
    }

    async fn get_stats(&self) -> StoreResult<DashboardStats> {
        let tables = self.tables.read().await;
        let published = tables.posts.iter().filter(|p| p.published).count() as i64;
        Ok(DashboardStats {
            published_posts: published,
            draft_posts: tables.posts.len() as i64 - published,
            testimonials: tables.testimonials.len() as i64,
            contacts: tables.contacts.len() as i64,
            enquiries: tables.enquiries.len() as i64,
            subscribers: tables.subscribers.len() as i64,
        })
    }
}
