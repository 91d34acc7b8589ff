/// Router Module Index
///
/// Splits the site into its three route families. Only the admin and
/// client routers sit behind the access guard; the layer is attached where
/// they are nested in `create_router`, so nothing under `/admin` or
/// `/client` can be reached without passing it.

/// Marketing pages, the blog and the public form endpoints.
pub mod public;

/// The `/admin` family: dashboard, post and testimonial management, leads
/// and image uploads. Admin role only.
pub mod admin;

/// The `/client` family. Client role only.
pub mod client;
