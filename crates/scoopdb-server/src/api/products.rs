use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scoopdb_core::{
    price_per_kg, protein_per_dollar, Product, SortDirection, SortField, ViewState,
};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// A product as rendered to API clients: stored fields plus the derived
/// value metrics, which are computed per response and never persisted.
#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    id: Uuid,
    name: String,
    brand: String,
    category: String,
    price: f64,
    weight_kg: f64,
    protein_per_100g: Option<f64>,
    serving_size_g: Option<f64>,
    kilojoules_per_serving: Option<f64>,
    is_natural: bool,
    image_url: Option<String>,
    link: Option<String>,
    price_per_kg: Option<f64>,
    protein_per_dollar: Option<f64>,
}

impl ProductItem {
    pub(super) fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            price: product.price,
            weight_kg: product.weight_kg,
            protein_per_100g: product.protein_per_100g,
            serving_size_g: product.serving_size_g,
            kilojoules_per_serving: product.kilojoules_per_serving,
            is_natural: product.is_natural,
            image_url: product.image_url.clone(),
            link: product.link.clone(),
            price_per_kg: price_per_kg(product),
            protein_per_dollar: protein_per_dollar(product),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    /// Comma-separated category selection; absent/empty means no filter.
    pub categories: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

/// Builds the engine's [`ViewState`] from raw query parameters.
///
/// Defaults: no category filter, sort by `price_per_kg`, descending.
/// Unknown sort fields and directions are rejected with a message naming
/// the offending value.
pub(super) fn parse_view_state(
    categories: Option<&str>,
    sort: Option<&str>,
    direction: Option<&str>,
) -> Result<ViewState, String> {
    let mut view = ViewState::default();

    if let Some(raw) = categories {
        view.categories = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
    }

    if let Some(raw) = sort {
        view.field = SortField::from_query(raw)
            .ok_or_else(|| format!("unknown sort field: {raw}"))?;
    }

    if let Some(raw) = direction {
        view.direction = SortDirection::from_query(raw)
            .ok_or_else(|| format!("unknown sort direction: {raw}"))?;
    }

    Ok(view)
}

/// `GET /api/v1/products` — the full snapshot, filtered and ranked in memory.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<ProductItem>>>, ApiError> {
    let view = parse_view_state(
        query.categories.as_deref(),
        query.sort.as_deref(),
        query.direction.as_deref(),
    )
    .map_err(|reason| ApiError::new(req_id.0.clone(), "validation_error", reason))?;

    let rows = scoopdb_db::list_products(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let snapshot: Vec<Product> = rows.into_iter().map(Into::into).collect();
    let data = scoopdb_core::rank(&snapshot, &view)
        .into_iter()
        .map(ProductItem::from_product)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/products/categories` — distinct categories, sorted.
pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let rows = scoopdb_db::list_products(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let snapshot: Vec<Product> = rows.into_iter().map(Into::into).collect();
    let data = scoopdb_core::categories(&snapshot);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
