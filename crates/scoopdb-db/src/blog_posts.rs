//! Database operations for the `blog_posts` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `blog_posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlogPostRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub published_at: DateTime<Utc>,
}

impl From<BlogPostRow> for scoopdb_core::BlogPost {
    fn from(row: BlogPostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            excerpt: row.excerpt,
            featured_image: row.featured_image,
            published: row.published,
            published_at: row.published_at,
        }
    }
}

/// Returns all published posts, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_published_posts(pool: &PgPool) -> Result<Vec<BlogPostRow>, DbError> {
    let rows = sqlx::query_as::<_, BlogPostRow>(
        "SELECT id, title, slug, content, excerpt, featured_image, published, published_at \
         FROM blog_posts \
         WHERE published = TRUE \
         ORDER BY published_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single published post by slug.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no published post has the slug, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_published_post_by_slug(pool: &PgPool, slug: &str) -> Result<BlogPostRow, DbError> {
    let row = sqlx::query_as::<_, BlogPostRow>(
        "SELECT id, title, slug, content, excerpt, featured_image, published, published_at \
         FROM blog_posts \
         WHERE published = TRUE AND slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}
