//! Price-refresh orchestration shared by the admin endpoint and the
//! scheduled job.

use rust_decimal::prelude::ToPrimitive;
use sqlx::PgPool;

use scoopdb_scraper::PriceScraper;

/// Outcome of one refresh pass over the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Products whose stored price actually changed.
    pub updated: usize,
    /// Products with a link that were attempted.
    pub total: usize,
}

/// Scrapes every product that has an outbound link and persists changed
/// prices.
///
/// The advertised value is a per-kg price; the stored price is
/// `per_kg * weight_kg`, rounded to cents by the database cast. A change
/// smaller than half a cent is treated as unchanged so repeated runs stay
/// idempotent. Per-product failures are logged and skipped; they never
/// abort the pass.
///
/// # Errors
///
/// Returns [`scoopdb_db::DbError`] only when the initial product listing
/// fails — with no snapshot there is nothing to refresh.
pub async fn run_price_refresh(
    pool: &PgPool,
    scraper: &PriceScraper,
) -> Result<RefreshOutcome, scoopdb_db::DbError> {
    let targets = scoopdb_db::list_scrapable_products(pool).await?;
    let total = targets.len();
    let mut updated = 0usize;

    for target in targets {
        let per_kg = match scraper.fetch_price_per_kg(&target.link).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(
                    product = %target.name,
                    url = %target.link,
                    error = %e,
                    "price scrape failed, skipping product"
                );
                continue;
            }
        };

        let weight_kg = target.weight_kg.to_f64().unwrap_or(0.0);
        let new_price = per_kg * weight_kg;
        let old_price = target.price.to_f64().unwrap_or(0.0);

        if (new_price - old_price).abs() < 0.005 {
            tracing::debug!(product = %target.name, price = new_price, "price unchanged");
            continue;
        }

        match scoopdb_db::update_product_price(pool, target.id, &format!("{new_price:.2}")).await {
            Ok(true) => {
                tracing::info!(
                    product = %target.name,
                    old_price,
                    new_price,
                    "price updated"
                );
                updated += 1;
            }
            Ok(false) => {
                tracing::warn!(product = %target.name, "product row vanished during refresh");
            }
            Err(e) => {
                tracing::error!(product = %target.name, error = %e, "price update failed");
            }
        }
    }

    Ok(RefreshOutcome { updated, total })
}

/// Builds a [`PriceScraper`] from app config.
///
/// # Errors
///
/// Returns [`scoopdb_scraper::ScrapeError`] if the HTTP client cannot be
/// constructed in this environment.
pub fn build_scraper(
    config: &scoopdb_core::AppConfig,
) -> Result<PriceScraper, scoopdb_scraper::ScrapeError> {
    PriceScraper::new(
        config.scraper_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_backoff_base_secs,
    )
}
