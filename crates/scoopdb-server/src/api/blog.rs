use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// A post as listed on the blog index: everything but the full body.
#[derive(Debug, Serialize)]
pub(super) struct BlogPostSummary {
    id: Uuid,
    title: String,
    slug: String,
    excerpt: String,
    featured_image: Option<String>,
    published_at: DateTime<Utc>,
}

/// A full post, body included.
#[derive(Debug, Serialize)]
pub(super) struct BlogPostDetail {
    id: Uuid,
    title: String,
    slug: String,
    content: String,
    excerpt: String,
    featured_image: Option<String>,
    published_at: DateTime<Utc>,
}

/// `GET /api/v1/blog/posts` — published posts, newest first.
pub(super) async fn list_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<BlogPostSummary>>>, ApiError> {
    let rows = scoopdb_db::list_published_posts(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| BlogPostSummary {
            id: row.id,
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            featured_image: row.featured_image,
            published_at: row.published_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/blog/posts/{slug}` — one published post.
pub(super) async fn get_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<BlogPostDetail>>, ApiError> {
    let row = scoopdb_db::get_published_post_by_slug(&state.pool, &slug)
        .await
        .map_err(|e| match e {
            scoopdb_db::DbError::NotFound => ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no published post with slug {slug}"),
            ),
            other => map_db_error(req_id.0.clone(), &other),
        })?;

    Ok(Json(ApiResponse {
        data: BlogPostDetail {
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            excerpt: row.excerpt,
            featured_image: row.featured_image,
            published_at: row.published_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
