use crate::{
    AppState,
    auth::AuthSession,
    error::{AppError, AppResult},
    models::{
        ContactMessage, ContactRequest, CreatePostRequest, CreateTestimonialRequest,
        Enquiry, EnquiryRequest, LeadsOverview, NewsletterRequest, Post, PostSummary, Subscriber,
        Testimonial, UpdatePostRequest, UploadResponse, Validate, ValidationError,
    },
    render::{Node, excerpt, reading_time_minutes},
    repository::StoreError,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::Html,
};
use uuid::Uuid;

/// Length of the excerpt derived from a post body when none is given.
const EXCERPT_CHARS: usize = 160;

fn summarize(post: Post) -> PostSummary {
    // Bodies are validated on write; a stored body that no longer parses
    // still lists, with the minimum reading time.
    let reading_time_minutes = Node::parse(&post.body)
        .map(|document| reading_time_minutes(&document))
        .unwrap_or(1);

    PostSummary {
        id: post.id,
        slug: post.slug,
        title: post.title,
        excerpt: post.excerpt,
        cover_image: post.cover_image,
        reading_time_minutes,
        created_at: post.created_at,
    }
}

fn excerpt_is_derived(post: &Post) -> bool {
    Node::parse(&post.body).is_ok_and(|document| excerpt(&document, EXCERPT_CHARS) == post.excerpt)
}

// --- Public Handlers ---

/// list_posts
///
/// [Public Route] Published posts, newest first, with reading time.
#[utoipa::path(
    get,
    path = "/api/posts",
    responses((status = 200, description = "Published posts", body = [PostSummary]))
)]
pub async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<PostSummary>>> {
    let posts = state.repo.list_published_posts().await?;
    Ok(Json(posts.into_iter().map(summarize).collect()))
}

/// list_testimonials
///
/// [Public Route] Every testimonial, newest first.
#[utoipa::path(
    get,
    path = "/api/testimonials",
    responses((status = 200, description = "Testimonials", body = [Testimonial]))
)]
pub async fn list_testimonials(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Testimonial>>> {
    Ok(Json(state.repo.list_testimonials().await?))
}

/// submit_contact
///
/// [Public Route] Stores a contact-form message. Every missing field is
/// reported at once.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored", body = ContactMessage),
        (status = 422, description = "Missing fields")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<(StatusCode, Json<ContactMessage>)> {
    payload.validate()?;
    let contact = state.repo.create_contact(payload).await?;
    tracing::info!(id = %contact.id, "contact message received");
    Ok((StatusCode::CREATED, Json(contact)))
}

/// submit_enquiry
///
/// [Public Route] Stores a project enquiry.
#[utoipa::path(
    post,
    path = "/api/enquiry",
    request_body = EnquiryRequest,
    responses(
        (status = 201, description = "Enquiry stored", body = Enquiry),
        (status = 422, description = "Missing fields")
    )
)]
pub async fn submit_enquiry(
    State(state): State<AppState>,
    Json(payload): Json<EnquiryRequest>,
) -> AppResult<(StatusCode, Json<Enquiry>)> {
    payload.validate()?;
    let enquiry = state.repo.create_enquiry(payload).await?;
    tracing::info!(id = %enquiry.id, service = %enquiry.service, "enquiry received");
    Ok((StatusCode::CREATED, Json(enquiry)))
}

/// subscribe_newsletter
///
/// [Public Route] Adds a newsletter subscriber. A repeat address is a 409.
#[utoipa::path(
    post,
    path = "/api/newsletter",
    request_body = NewsletterRequest,
    responses(
        (status = 201, description = "Subscribed", body = Subscriber),
        (status = 409, description = "Already subscribed"),
        (status = 422, description = "Missing or invalid email")
    )
)]
pub async fn subscribe_newsletter(
    State(state): State<AppState>,
    Json(payload): Json<NewsletterRequest>,
) -> AppResult<(StatusCode, Json<Subscriber>)> {
    payload.validate()?;
    match state.repo.create_subscriber(&payload.email).await {
        Ok(subscriber) => Ok((StatusCode::CREATED, Json(subscriber))),
        Err(StoreError::DuplicateKey) => Err(AppError::Conflict("already subscribed")),
        Err(e) => Err(e.into()),
    }
}

// --- Admin Handlers ---

/// admin_list_posts
///
/// [Admin Route] Every post, drafts first.
#[utoipa::path(
    get,
    path = "/admin/api/posts",
    responses((status = 200, description = "All posts", body = [Post]))
)]
pub async fn admin_list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(state.repo.list_all_posts().await?))
}

/// admin_get_post
#[utoipa::path(
    get,
    path = "/admin/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Post>> {
    state
        .repo
        .find_post(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("post"))
}

/// create_post
///
/// [Admin Route] Creates a post. The body must render with the site's
/// renderer before it is stored; the excerpt defaults to the opening text.
#[utoipa::path(
    post,
    path = "/admin/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 409, description = "Slug already in use"),
        (status = 422, description = "Missing fields or unrenderable body")
    )
)]
pub async fn create_post(
    AuthSession(claims): AuthSession,
    State(state): State<AppState>,
    Json(mut payload): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    payload.validate()?;
    let document = state.renderer.validate(&payload.body)?;

    if payload.excerpt.as_deref().is_none_or(|e| e.trim().is_empty()) {
        payload.excerpt = Some(excerpt(&document, EXCERPT_CHARS));
    }

    match state.repo.create_post(payload).await {
        Ok(post) => {
            tracing::info!(id = %post.id, slug = %post.slug, author = %claims.sub, "post created");
            Ok((StatusCode::CREATED, Json(post)))
        }
        Err(StoreError::DuplicateKey) => Err(AppError::Conflict("slug already in use")),
        Err(e) => Err(e.into()),
    }
}

/// update_post
///
/// [Admin Route] Partial update. A new body is validated like on create,
/// and refreshes the excerpt unless the stored one was written by hand.
#[utoipa::path(
    put,
    path = "/admin/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Slug already in use"),
        (status = 422, description = "Invalid fields or unrenderable body")
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdatePostRequest>,
) -> AppResult<Json<Post>> {
    payload.validate()?;
    if let Some(body) = &payload.body {
        let document = state.renderer.validate(body)?;

        // A derived excerpt follows the body; a hand-written one is kept.
        if payload.excerpt.as_deref().is_none_or(|e| e.trim().is_empty()) {
            let current = state
                .repo
                .find_post(id)
                .await?
                .ok_or(AppError::NotFound("post"))?;
            if payload.excerpt.is_some() || excerpt_is_derived(&current) {
                payload.excerpt = Some(excerpt(&document, EXCERPT_CHARS));
            }
        }
    }

    match state.repo.update_post(id, payload).await {
        Ok(post) => Ok(Json(post)),
        Err(StoreError::NotFound) => Err(AppError::NotFound("post")),
        Err(StoreError::DuplicateKey) => Err(AppError::Conflict("slug already in use")),
        Err(e) => Err(e.into()),
    }
}

/// delete_post
#[utoipa::path(
    delete,
    path = "/admin/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    match state.repo.delete_post(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound) => Err(AppError::NotFound("post")),
        Err(e) => Err(e.into()),
    }
}

/// preview_post
///
/// [Admin Route] The rendered body of any post, drafts included, as an HTML
/// fragment.
#[utoipa::path(
    get,
    path = "/admin/api/posts/{id}/preview",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Rendered HTML fragment", body = String, content_type = "text/html"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Body does not render")
    )
)]
pub async fn preview_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Html<String>> {
    let post = state
        .repo
        .find_post(id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    Ok(Html(state.renderer.render(&post.body)?))
}

/// create_testimonial
#[utoipa::path(
    post,
    path = "/admin/api/testimonials",
    request_body = CreateTestimonialRequest,
    responses(
        (status = 201, description = "Created", body = Testimonial),
        (status = 422, description = "Missing fields")
    )
)]
pub async fn create_testimonial(
    State(state): State<AppState>,
    Json(payload): Json<CreateTestimonialRequest>,
) -> AppResult<(StatusCode, Json<Testimonial>)> {
    payload.validate()?;
    let testimonial = state.repo.create_testimonial(payload).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

/// delete_testimonial
#[utoipa::path(
    delete,
    path = "/admin/api/testimonials/{id}",
    params(("id" = Uuid, Path, description = "Testimonial ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    match state.repo.delete_testimonial(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound) => Err(AppError::NotFound("testimonial")),
        Err(e) => Err(e.into()),
    }
}

/// list_leads
///
/// [Admin Route] Everything collected by the contact, enquiry and newsletter forms.
#[utoipa::path(
    get,
    path = "/admin/api/leads",
    responses((status = 200, description = "Leads", body = LeadsOverview))
)]
pub async fn list_leads(State(state): State<AppState>) -> AppResult<Json<LeadsOverview>> {
    Ok(Json(LeadsOverview {
        contacts: state.repo.list_contacts().await?,
        enquiries: state.repo.list_enquiries().await?,
        subscribers: state.repo.list_subscribers().await?,
    }))
}

/// Accepted image types and the extension their objects are stored under.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/avif", "avif"),
];

pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

/// upload_image
///
/// [Admin Route] Streams the raw request body to object storage.
///
/// *Security*: only image content types are accepted, and the object key is
/// a fresh UUID (`images/<uuid>.<ext>`) so client-supplied names never reach
/// the bucket. The body size is capped by the router's body limit.
#[utoipa::path(
    post,
    path = "/admin/api/uploads",
    request_body(content = Vec<u8>, content_type = "image/*"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 415, description = "Not an accepted image type"),
        (status = 422, description = "Empty body")
    )
)]
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let extension = image_extension(&content_type)
        .ok_or_else(|| AppError::UnsupportedMedia(content_type.clone()))?;

    if body.is_empty() {
        return Err(ValidationError {
            missing: vec!["body"],
        }
        .into());
    }

    let key = format!("images/{}.{}", Uuid::new_v4(), extension);
    let url = state.storage.upload(&key, &content_type, body).await?;

    Ok((StatusCode::CREATED, Json(UploadResponse { key, url })))
}
