use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A blog post authored outside the application (one-off insertion script or
/// CLI). Read-only to the API: listed newest-first, fetched by slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    /// URL-safe unique identifier, e.g. `"best-value-whey-2026"`.
    pub slug: String,
    /// Raw HTML body. Not sanitized here; authored content is trusted.
    pub content: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub published_at: DateTime<Utc>,
}
