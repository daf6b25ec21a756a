//! Price extraction from storefront HTML.
//!
//! Storefront product pages advertise a normalized per-kilogram price such
//! as `$59.95/kg`. Some render an invisible left-to-right mark (U+200E, or
//! its `&lrm;` entity) between the amount and the unit, and review widgets
//! on the same page emit look-alike numbers ("4.5 out of 5"), so extraction
//! is anchored on the `$…/kg` shape and bounded to a plausible price band.

use std::sync::LazyLock;

use regex::Regex;

/// Per-kg prices outside this band are rejected as misparses (review
/// scores, bundle totals).
pub const MIN_PLAUSIBLE_PRICE: f64 = 5.0;
pub const MAX_PLAUSIBLE_PRICE: f64 = 500.0;

// "$59.95/kg" with an optional U+200E or "&lrm;" before the slash.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\d+\.\d{2})(?:\u{200e}|&lrm;)?\s*/\s*kg").expect("valid price regex")
});

/// Extracts the first plausible `$NN.NN/kg` price from a page body.
///
/// Candidates outside [`MIN_PLAUSIBLE_PRICE`]..=[`MAX_PLAUSIBLE_PRICE`] are
/// skipped rather than failing the whole scan, since pages routinely carry
/// several per-kg-looking numbers.
#[must_use]
pub fn extract_price_per_kg(body: &str) -> Option<f64> {
    for capture in PRICE_RE.captures_iter(body) {
        if let Ok(price) = capture[1].parse::<f64>() {
            if (MIN_PLAUSIBLE_PRICE..=MAX_PLAUSIBLE_PRICE).contains(&price) {
                return Some(price);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_per_kg_price() {
        let body = r#"<div class="price">$59.95/kg</div>"#;
        assert_eq!(extract_price_per_kg(body), Some(59.95));
    }

    #[test]
    fn extracts_price_with_lrm_mark() {
        // The storefront embeds U+200E between the amount and the unit.
        let body = "<div>$59.95\u{200e}/kg</div>";
        assert_eq!(extract_price_per_kg(body), Some(59.95));
    }

    #[test]
    fn extracts_price_with_lrm_entity_and_spacing() {
        let body = r"<span>$42.50&lrm; / kg</span>";
        assert_eq!(extract_price_per_kg(body), Some(42.50));
    }

    #[test]
    fn skips_implausible_candidates_and_takes_next() {
        // 4.50 looks like a review score; 750.00 is a bundle total.
        let body = "<div>$4.50/kg</div><div>$750.00/kg</div><div>$61.20/kg</div>";
        assert_eq!(extract_price_per_kg(body), Some(61.20));
    }

    #[test]
    fn ignores_prices_without_per_kg_unit() {
        let body = "<div>$59.95</div><div>4.5 out of 5</div>";
        assert_eq!(extract_price_per_kg(body), None);
    }

    #[test]
    fn returns_none_on_empty_body() {
        assert_eq!(extract_price_per_kg(""), None);
    }
}
