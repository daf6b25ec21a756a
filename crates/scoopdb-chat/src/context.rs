//! Builds the plain-text product context fed to the assistant.

use std::fmt::Write;

use scoopdb_core::{price_per_kg, protein_per_dollar, Product};

/// Standing instructions sent ahead of the product data on every request.
pub(crate) const SYSTEM_PROMPT: &str = "You are a protein-powder shopping assistant. \
Answer using only the product data provided. Compare products when relevant, \
highlight nutritional differences, call out price and value-for-money \
(protein per dollar), and keep replies short with clear line breaks. \
Use a friendly, casual Australian tone.";

/// Renders the full product snapshot as one plain-text block, one product
/// per paragraph, all fields included. Derived value metrics are computed
/// here so the model never has to do arithmetic.
#[must_use]
pub fn product_context(products: &[Product]) -> String {
    let mut out = String::new();
    for product in products {
        let _ = writeln!(out, "{} ({})", product.name, product.brand);
        let _ = writeln!(out, "- Category: {}", product.category);
        let _ = writeln!(out, "- Price: ${:.2}", product.price);
        let _ = writeln!(out, "- Weight: {}kg", product.weight_kg);
        if let Some(protein) = product.protein_per_100g {
            let _ = writeln!(out, "- Protein per 100g: {protein}g");
        }
        if let Some(serving) = product.serving_size_g {
            let _ = writeln!(out, "- Serving size: {serving}g");
        }
        if let Some(kj) = product.kilojoules_per_serving {
            let _ = writeln!(out, "- Kilojoules per serving: {kj}kJ");
        }
        if let Some(per_kg) = price_per_kg(product) {
            let _ = writeln!(out, "- Price per kg: ${per_kg:.2}");
        }
        if let Some(value) = protein_per_dollar(product) {
            let _ = writeln!(out, "- Protein per dollar: {value:.1}g");
        }
        let _ = writeln!(
            out,
            "- Artificial sweeteners: {}",
            if product.is_natural { "no" } else { "yes" }
        );
        if let Some(link) = &product.link {
            let _ = writeln!(out, "- Link: {link}");
        }
        out.push('\n');
    }
    out
}
