use clap::{Parser, Subcommand};
use rust_decimal::prelude::ToPrimitive;

#[derive(Debug, Parser)]
#[command(name = "scoopdb-cli")]
#[command(about = "scoopdb maintenance commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply migrations and insert the development seed catalog.
    Seed,
    /// Scrape current prices for every product with a link and persist changes.
    RefreshPrices,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = scoopdb_core::load_app_config()?;
    let pool = scoopdb_db::connect_pool(
        &config.database_url,
        scoopdb_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    scoopdb_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Seed => {
            let count = scoopdb_db::seed::seed_catalog(&pool).await?;
            println!("seeded {count} products");
        }
        Commands::RefreshPrices => {
            let (updated, total) = refresh_prices(&pool, &config).await?;
            println!("updated {updated} of {total} products");
        }
    }

    Ok(())
}

/// One refresh pass: scrape each linked product and persist changed prices.
/// Per-product failures are logged and skipped.
async fn refresh_prices(
    pool: &sqlx::PgPool,
    config: &scoopdb_core::AppConfig,
) -> anyhow::Result<(usize, usize)> {
    let scraper = scoopdb_scraper::PriceScraper::new(
        config.scraper_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_backoff_base_secs,
    )?;

    let targets = scoopdb_db::list_scrapable_products(pool).await?;
    let total = targets.len();
    let mut updated = 0usize;

    for target in targets {
        let per_kg = match scraper.fetch_price_per_kg(&target.link).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(product = %target.name, error = %e, "scrape failed, skipping");
                continue;
            }
        };

        let new_price = per_kg * target.weight_kg.to_f64().unwrap_or(0.0);
        let old_price = target.price.to_f64().unwrap_or(0.0);
        if (new_price - old_price).abs() < 0.005 {
            continue;
        }

        if scoopdb_db::update_product_price(pool, target.id, &format!("{new_price:.2}")).await? {
            tracing::info!(product = %target.name, old_price, new_price, "price updated");
            updated += 1;
        }
    }

    Ok((updated, total))
}
