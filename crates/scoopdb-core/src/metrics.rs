//! Derived per-product value metrics.
//!
//! These are pure functions of a [`Product`], recomputed on every use and
//! never persisted. No rounding is applied here; display rounding is a
//! presentation concern.

use crate::Product;

/// Normalized unit price: `price / weight_kg`.
///
/// Returns `None` when `weight_kg` is not positive, since the ratio is
/// undefined rather than an error.
#[must_use]
pub fn price_per_kg(product: &Product) -> Option<f64> {
    if product.weight_kg > 0.0 {
        Some(product.price / product.weight_kg)
    } else {
        None
    }
}

/// Grams of protein per unit currency: `(protein_per_100g * 10) / price_per_kg`.
///
/// The factor of 10 converts protein-per-100g into protein-per-kg so the
/// ratio is dimensionally consistent with the per-kg price.
///
/// Returns `None` when the per-kg price is undefined or not positive, or
/// when the product has no recorded protein content. "Metric unavailable",
/// not a crash.
#[must_use]
pub fn protein_per_dollar(product: &Product) -> Option<f64> {
    let per_kg = price_per_kg(product)?;
    if per_kg <= 0.0 {
        return None;
    }
    let protein = product.protein_per_100g?;
    Some((protein * 10.0) / per_kg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_product(price: f64, weight_kg: f64, protein: Option<f64>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Test Powder".to_string(),
            brand: "Test Brand".to_string(),
            category: "whey".to_string(),
            price,
            weight_kg,
            protein_per_100g: protein,
            serving_size_g: None,
            kilojoules_per_serving: None,
            is_natural: false,
            image_url: None,
            link: None,
        }
    }

    #[test]
    fn price_per_kg_divides_price_by_weight() {
        let product = make_product(60.0, 2.0, Some(80.0));
        assert_eq!(price_per_kg(&product), Some(30.0));
    }

    #[test]
    fn price_per_kg_undefined_for_zero_weight() {
        let product = make_product(60.0, 0.0, Some(80.0));
        assert_eq!(price_per_kg(&product), None);
    }

    #[test]
    fn protein_per_dollar_matches_manual_computation() {
        // price=$60, weight=2kg, protein=80g/100g:
        // price_per_kg = 30, protein_per_dollar = (80 * 10) / 30 = 26.67
        let product = make_product(60.0, 2.0, Some(80.0));
        let value = protein_per_dollar(&product).expect("metric should be defined");
        assert!((value - 26.666_666_666_666_668).abs() < 1e-9);
    }

    #[test]
    fn protein_per_dollar_unavailable_when_price_is_zero() {
        // price_per_kg computes to 0, which would divide by zero.
        let product = make_product(0.0, 2.0, Some(80.0));
        assert_eq!(protein_per_dollar(&product), None);
    }

    #[test]
    fn protein_per_dollar_unavailable_when_weight_is_zero() {
        let product = make_product(60.0, 0.0, Some(80.0));
        assert_eq!(protein_per_dollar(&product), None);
    }

    #[test]
    fn protein_per_dollar_unavailable_without_protein_content() {
        let product = make_product(60.0, 2.0, None);
        assert_eq!(protein_per_dollar(&product), None);
    }
}
