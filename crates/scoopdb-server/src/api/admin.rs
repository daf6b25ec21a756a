use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;
use crate::refresh;

use super::{ApiResponse, AppState, ResponseMeta};

/// Result of a price-refresh run. `error` is set (and `summary` absent)
/// when the run could not start at all; per-product failures only lower
/// the `updated` count.
#[derive(Debug, Serialize)]
pub(super) struct RefreshData {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<RefreshSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshSummary {
    updated: usize,
    total: usize,
}

/// `POST /api/v1/admin/refresh-prices` — scrape and persist current prices.
///
/// Always answers 200 with a success flag, so the admin UI can render the
/// distinction between "environment can't scrape" and "scraped, n updated"
/// from one shape.
pub(super) async fn refresh_prices(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<RefreshData>> {
    let meta = ResponseMeta::new(req_id.0);

    let scraper = match refresh::build_scraper(&state.config) {
        Ok(scraper) => scraper,
        Err(e) => {
            tracing::error!(error = %e, "scraper unavailable in this environment");
            return Json(ApiResponse {
                data: RefreshData {
                    success: false,
                    summary: None,
                    error: Some(format!(
                        "price scraping is unavailable in this environment: {e}"
                    )),
                },
                meta,
            });
        }
    };

    match refresh::run_price_refresh(&state.pool, &scraper).await {
        Ok(outcome) => Json(ApiResponse {
            data: RefreshData {
                success: true,
                summary: Some(RefreshSummary {
                    updated: outcome.updated,
                    total: outcome.total,
                }),
                error: None,
            },
            meta,
        }),
        Err(e) => {
            tracing::error!(error = %e, "price refresh failed to start");
            Json(ApiResponse {
                data: RefreshData {
                    success: false,
                    summary: None,
                    error: Some("could not load products to refresh".to_owned()),
                },
                meta,
            })
        }
    }
}
