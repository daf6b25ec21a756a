//! Development seed data: a handful of real-shaped products and one blog
//! post, enough to exercise the ranking engine and the blog endpoints.

use sqlx::PgPool;

use crate::DbError;

struct SeedProduct {
    name: &'static str,
    brand: &'static str,
    category: &'static str,
    price: &'static str,
    weight_kg: &'static str,
    protein_per_100g: Option<&'static str>,
    serving_size_g: Option<&'static str>,
    kilojoules_per_serving: Option<&'static str>,
    is_natural: bool,
    link: Option<&'static str>,
}

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Impact Whey Isolate",
        brand: "Myprotein",
        category: "whey",
        price: "59.95",
        weight_kg: "1.00",
        protein_per_100g: Some("90.0"),
        serving_size_g: Some("25.0"),
        kilojoules_per_serving: Some("387.0"),
        is_natural: false,
        link: Some("https://au.myprotein.com/p/sports-nutrition/impact-whey-isolate/12313192/"),
    },
    SeedProduct {
        name: "WPI Natural Vanilla",
        brand: "Bulk Nutrients",
        category: "whey",
        price: "39.00",
        weight_kg: "1.00",
        protein_per_100g: Some("89.4"),
        serving_size_g: Some("30.0"),
        kilojoules_per_serving: Some("470.0"),
        is_natural: true,
        link: None,
    },
    SeedProduct {
        name: "Earth Protein Choc",
        brand: "Bulk Nutrients",
        category: "vegan",
        price: "35.00",
        weight_kg: "1.00",
        protein_per_100g: Some("72.1"),
        serving_size_g: Some("35.0"),
        kilojoules_per_serving: Some("560.0"),
        is_natural: true,
        link: None,
    },
    SeedProduct {
        name: "Micellar Casein",
        brand: "Myprotein",
        category: "casein",
        price: "74.99",
        weight_kg: "2.50",
        protein_per_100g: Some("79.0"),
        serving_size_g: Some("30.0"),
        kilojoules_per_serving: Some("440.0"),
        is_natural: false,
        link: None,
    },
];

/// Inserts the seed products and one published blog post.
///
/// Conflicts on `(brand, name)` update the economic/nutritional columns in
/// place, so re-seeding refreshes rather than duplicates. Everything runs in
/// one transaction; a failure rolls back the whole batch.
///
/// Returns the number of products processed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_catalog(pool: &PgPool) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for product in SEED_PRODUCTS {
        sqlx::query(
            "INSERT INTO products \
                 (name, brand, category, price, weight_kg, protein_per_100g, \
                  serving_size_g, kilojoules_per_serving, is_natural, link) \
             VALUES ($1, $2, $3, $4::numeric(10,2), $5::numeric(6,3), $6::numeric(5,1), \
                     $7::numeric(6,1), $8::numeric(7,1), $9, $10) \
             ON CONFLICT (brand, name) DO UPDATE SET \
                 category               = EXCLUDED.category, \
                 price                  = EXCLUDED.price, \
                 weight_kg              = EXCLUDED.weight_kg, \
                 protein_per_100g       = EXCLUDED.protein_per_100g, \
                 serving_size_g         = EXCLUDED.serving_size_g, \
                 kilojoules_per_serving = EXCLUDED.kilojoules_per_serving, \
                 is_natural             = EXCLUDED.is_natural, \
                 link                   = EXCLUDED.link, \
                 updated_at             = NOW()",
        )
        .bind(product.name)
        .bind(product.brand)
        .bind(product.category)
        .bind(product.price)
        .bind(product.weight_kg)
        .bind(product.protein_per_100g)
        .bind(product.serving_size_g)
        .bind(product.kilojoules_per_serving)
        .bind(product.is_natural)
        .bind(product.link)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    sqlx::query(
        "INSERT INTO blog_posts (title, slug, content, excerpt, published, published_at) \
         VALUES ($1, $2, $3, $4, TRUE, NOW()) \
         ON CONFLICT (slug) DO UPDATE SET \
             title      = EXCLUDED.title, \
             content    = EXCLUDED.content, \
             excerpt    = EXCLUDED.excerpt, \
             updated_at = NOW()",
    )
    .bind("How to read a protein powder label")
    .bind("how-to-read-a-protein-powder-label")
    .bind("<p>Protein per 100g beats protein per serving for comparing value: serving sizes vary wildly between brands.</p>")
    .bind("Protein per 100g beats protein per serving for comparing value.")
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(count)
}
