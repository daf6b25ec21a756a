use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A protein-powder product as listed in the catalog.
///
/// Products are written by the scraper, the seed data, or manual inserts;
/// the API only reads them. `price` and `weight_kg` are expected to be
/// positive — the derived value metrics are undefined otherwise, and
/// [`crate::price_per_kg`] / [`crate::protein_per_dollar`] guard for it.
///
/// Nutritional fields are optional because storefront listings are not
/// uniformly complete. Ranking substitutes `0.0` for a missing value so a
/// single incomplete record cannot break a sort pass; see [`crate::rank`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    /// Free-text classification tag (e.g. `"whey"`, `"vegan"`, `"casein"`).
    /// Drawn from an open set; there is no fixed enum.
    pub category: String,
    /// Listed price in the store currency.
    pub price: f64,
    /// Package weight in kilograms.
    pub weight_kg: f64,
    /// Grams of protein per 100g of powder.
    pub protein_per_100g: Option<f64>,
    /// Serving size in grams.
    pub serving_size_g: Option<f64>,
    /// Energy per serving in kilojoules.
    pub kilojoules_per_serving: Option<f64>,
    /// `true` when the product is free of artificial sweeteners.
    pub is_natural: bool,
    pub image_url: Option<String>,
    /// Outbound purchase URL; also the target for price scraping.
    pub link: Option<String>,
}

impl Product {
    /// Returns `true` when the economic fields allow derived metrics to be
    /// computed at all.
    #[must_use]
    pub fn has_valid_economics(&self) -> bool {
        self.price > 0.0 && self.weight_kg > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(price: f64, weight_kg: f64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Impact Whey Isolate".to_string(),
            brand: "Myprotein".to_string(),
            category: "whey".to_string(),
            price,
            weight_kg,
            protein_per_100g: Some(90.0),
            serving_size_g: Some(25.0),
            kilojoules_per_serving: Some(387.0),
            is_natural: false,
            image_url: None,
            link: Some("https://au.myprotein.com/p/impact-whey-isolate".to_string()),
        }
    }

    #[test]
    fn valid_economics_requires_positive_price_and_weight() {
        assert!(make_product(59.95, 1.0).has_valid_economics());
        assert!(!make_product(0.0, 1.0).has_valid_economics());
        assert!(!make_product(59.95, 0.0).has_valid_economics());
        assert!(!make_product(-1.0, 1.0).has_valid_economics());
    }

    #[test]
    fn serde_roundtrip_product() {
        let product = make_product(59.95, 1.0);
        let json = serde_json::to_string(&product).expect("serialization failed");
        let decoded: Product = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded.id, product.id);
        assert_eq!(decoded.name, product.name);
        assert_eq!(decoded.category, "whey");
        assert_eq!(decoded.protein_per_100g, Some(90.0));
    }
}
