//! Database operations for the `products` table.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `products` table.
///
/// Economic and nutritional columns are `NUMERIC` and surface here as
/// [`Decimal`]. The conversion to the domain [`scoopdb_core::Product`]
/// narrows them to `f64`; that is the documented precision boundary for
/// ratio arithmetic, matching the two-decimal scale the columns carry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: Decimal,
    pub weight_kg: Decimal,
    pub protein_per_100g: Option<Decimal>,
    pub serving_size_g: Option<Decimal>,
    pub kilojoules_per_serving: Option<Decimal>,
    pub is_natural: bool,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

impl From<ProductRow> for scoopdb_core::Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            category: row.category,
            price: row.price.to_f64().unwrap_or(0.0),
            weight_kg: row.weight_kg.to_f64().unwrap_or(0.0),
            protein_per_100g: row.protein_per_100g.and_then(|d| d.to_f64()),
            serving_size_g: row.serving_size_g.and_then(|d| d.to_f64()),
            kilojoules_per_serving: row.kilojoules_per_serving.and_then(|d| d.to_f64()),
            is_natural: row.is_natural,
            image_url: row.image_url,
            link: row.link,
        }
    }
}

/// A product reduced to what the price-refresh loop needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeTarget {
    pub id: Uuid,
    pub name: String,
    pub weight_kg: Decimal,
    pub price: Decimal,
    pub link: String,
}

/// Returns the full product snapshot in insertion order.
///
/// No filter or sort pushdown: ranking and filtering happen in memory over
/// this snapshot, in `scoopdb-core`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, brand, category, price, weight_kg, protein_per_100g, \
                serving_size_g, kilojoules_per_serving, is_natural, image_url, link \
         FROM products \
         ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns every product that has an outbound link to scrape.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scrapable_products(pool: &PgPool) -> Result<Vec<ScrapeTarget>, DbError> {
    let rows = sqlx::query_as::<_, ScrapeTarget>(
        "SELECT id, name, weight_kg, price, link \
         FROM products \
         WHERE link IS NOT NULL AND weight_kg > 0 \
         ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Updates a product's price, bumping `updated_at`.
///
/// The price arrives as a string and is cast to `NUMERIC(10,2)` inside the
/// statement so the database performs the rounding consistently.
///
/// Returns `true` if a row was updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_product_price(
    pool: &PgPool,
    product_id: Uuid,
    price: &str,
) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "UPDATE products \
         SET price = $2::numeric(10,2), updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(product_id)
    .bind(price)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row() -> ProductRow {
        ProductRow {
            id: Uuid::new_v4(),
            name: "Impact Whey Isolate".to_string(),
            brand: "Myprotein".to_string(),
            category: "whey".to_string(),
            price: Decimal::new(5995, 2),     // 59.95
            weight_kg: Decimal::new(100, 2),  // 1.00
            protein_per_100g: Some(Decimal::new(900, 1)), // 90.0
            serving_size_g: Some(Decimal::new(250, 1)),
            kilojoules_per_serving: None,
            is_natural: false,
            image_url: None,
            link: Some("https://au.myprotein.com/p/impact-whey-isolate".to_string()),
        }
    }

    #[test]
    fn row_converts_to_domain_product() {
        let product: scoopdb_core::Product = make_row().into();
        assert!((product.price - 59.95).abs() < 1e-9);
        assert!((product.weight_kg - 1.0).abs() < 1e-9);
        assert_eq!(product.protein_per_100g, Some(90.0));
        assert_eq!(product.kilojoules_per_serving, None);
        assert!(product.has_valid_economics());
    }

    #[test]
    fn missing_nutrition_columns_stay_none_after_conversion() {
        let mut row = make_row();
        row.protein_per_100g = None;
        row.serving_size_g = None;
        let product: scoopdb_core::Product = row.into();
        assert_eq!(product.protein_per_100g, None);
        assert_eq!(product.serving_size_g, None);
    }
}
