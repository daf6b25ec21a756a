mod admin;
mod blog;
mod chat;
mod products;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<scoopdb_core::AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "chat_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &scoopdb_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn admin_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/admin/refresh-prices", post(admin::refresh_prices))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/products", get(products::list_products))
        .route(
            "/api/v1/products/categories",
            get(products::list_categories),
        )
        .route("/api/v1/blog/posts", get(blog::list_posts))
        .route("/api/v1/blog/posts/{slug}", get(blog::get_post))
        .route(
            "/api/v1/chat",
            post(chat::converse).layer(axum::middleware::from_fn_with_state(
                rate_limit.clone(),
                enforce_rate_limit,
            )),
        );

    Router::new()
        .merge(public_routes)
        .merge(admin_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match scoopdb_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::products::{parse_view_state, ProductItem};
    use super::*;
    use scoopdb_core::{SortDirection, SortField};
    use uuid::Uuid;

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "no such post").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_upstream_error_maps_to_bad_gateway() {
        let response = ApiError::new("req-1", "upstream_error", "chat failed").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn api_error_unknown_code_maps_to_internal_error() {
        let response = ApiError::new("req-1", "mystery", "??").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn product_item_serializes_with_derived_metrics() {
        let product = scoopdb_core::Product {
            id: Uuid::new_v4(),
            name: "Impact Whey Isolate".to_string(),
            brand: "Myprotein".to_string(),
            category: "whey".to_string(),
            price: 60.0,
            weight_kg: 2.0,
            protein_per_100g: Some(80.0),
            serving_size_g: Some(25.0),
            kilojoules_per_serving: Some(387.0),
            is_natural: false,
            image_url: None,
            link: None,
        };
        let item = ProductItem::from_product(&product);
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["name"], "Impact Whey Isolate");
        assert!((json["price_per_kg"].as_f64().unwrap() - 30.0).abs() < 1e-9);
        assert!((json["protein_per_dollar"].as_f64().unwrap() - 26.666_666_666_666_668).abs() < 1e-9);
    }

    #[test]
    fn product_item_leaves_unavailable_metrics_null() {
        let product = scoopdb_core::Product {
            id: Uuid::new_v4(),
            name: "Broken".to_string(),
            brand: "Brand".to_string(),
            category: "whey".to_string(),
            price: 0.0,
            weight_kg: 1.0,
            protein_per_100g: Some(80.0),
            serving_size_g: None,
            kilojoules_per_serving: None,
            is_natural: false,
            image_url: None,
            link: None,
        };
        let item = ProductItem::from_product(&product);
        let json = serde_json::to_value(&item).expect("serialize");
        assert!(json["protein_per_dollar"].is_null());
    }

    #[test]
    fn parse_view_state_defaults_to_price_per_kg_descending() {
        let view = parse_view_state(None, None, None).expect("defaults should parse");
        assert!(view.categories.is_empty());
        assert_eq!(view.field, SortField::PricePerKg);
        assert_eq!(view.direction, SortDirection::Descending);
    }

    #[test]
    fn parse_view_state_splits_comma_separated_categories() {
        let view = parse_view_state(Some("whey, vegan,"), None, None).expect("should parse");
        assert!(view.categories.contains("whey"));
        assert!(view.categories.contains("vegan"));
        assert_eq!(view.categories.len(), 2);
    }

    #[test]
    fn parse_view_state_accepts_known_sort_and_direction() {
        let view = parse_view_state(None, Some("protein_per_dollar"), Some("asc"))
            .expect("should parse");
        assert_eq!(view.field, SortField::ProteinPerDollar);
        assert_eq!(view.direction, SortDirection::Ascending);
    }

    #[test]
    fn parse_view_state_rejects_unknown_sort_field() {
        let err = parse_view_state(None, Some("rating"), None).unwrap_err();
        assert!(err.contains("rating"));
    }

    #[test]
    fn parse_view_state_rejects_unknown_direction() {
        let err = parse_view_state(None, None, Some("sideways")).unwrap_err();
        assert!(err.contains("sideways"));
    }

    #[test]
    fn health_data_serializes() {
        let data = HealthData {
            status: "ok",
            database: "ok",
        };
        let meta = ResponseMeta::new("req-42".to_string());
        let json = serde_json::to_value(ApiResponse { data, meta }).expect("serialize");
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["meta"]["request_id"], "req-42");
        assert!(json["meta"]["timestamp"].as_str().is_some());
    }
}
