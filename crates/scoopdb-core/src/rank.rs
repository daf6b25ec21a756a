//! The ranking & filter engine.
//!
//! Transforms a product snapshot plus an explicit, immutable [`ViewState`]
//! into the ordered list the caller renders. Pure computation over in-memory
//! data: no I/O, no shared state, no errors for well-typed input.
//!
//! Ordering is total and deterministic. Missing or undefined sort-key values
//! rank as `0.0`, so one incomplete record sorts to an extreme instead of
//! failing the whole pass. This silently misranks incomplete records; it is
//! a documented trade-off, not validated-correct behavior.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{metrics, Product};

/// Direction a sort column resets to when the active field switches.
pub const DEFAULT_SORT_DIRECTION: SortDirection = SortDirection::Descending;

/// A sortable column. `PricePerKg` and `ProteinPerDollar` are derived from
/// stored fields at comparison time; the rest compare stored values directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Price,
    PricePerKg,
    ProteinPer100g,
    KilojoulesPerServing,
    ProteinPerDollar,
}

impl SortField {
    /// Extracts the comparison key for `product`.
    ///
    /// This is the single place that branches on field identity; the
    /// comparator itself only ever sees the extracted `f64`. Undefined
    /// metrics and missing fields yield `0.0`.
    #[must_use]
    pub fn key(self, product: &Product) -> f64 {
        match self {
            Self::Price => product.price,
            Self::PricePerKg => metrics::price_per_kg(product).unwrap_or(0.0),
            Self::ProteinPer100g => product.protein_per_100g.unwrap_or(0.0),
            Self::KilojoulesPerServing => product.kilojoules_per_serving.unwrap_or(0.0),
            Self::ProteinPerDollar => metrics::protein_per_dollar(product).unwrap_or(0.0),
        }
    }

    /// Parses the wire name used by the API (`"price_per_kg"` etc.).
    #[must_use]
    pub fn from_query(s: &str) -> Option<Self> {
        match s {
            "price" => Some(Self::Price),
            "price_per_kg" => Some(Self::PricePerKg),
            "protein_per_100g" => Some(Self::ProteinPer100g),
            "kilojoules_per_serving" => Some(Self::KilojoulesPerServing),
            "protein_per_dollar" => Some(Self::ProteinPerDollar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Parses the wire name used by the API (`"asc"` / `"desc"`).
    #[must_use]
    pub fn from_query(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Immutable view state: the selected category filter plus the active sort.
///
/// Callers hold one of these per page/request and derive the next state via
/// [`ViewState::toggle`]; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Selected categories. Empty means "no filter", not "exclude all".
    pub categories: BTreeSet<String>,
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            categories: BTreeSet::new(),
            field: SortField::PricePerKg,
            direction: DEFAULT_SORT_DIRECTION,
        }
    }
}

impl ViewState {
    /// Returns the state after a sort-column click: clicking the active
    /// column flips its direction, clicking a different column switches the
    /// field and resets the direction to [`DEFAULT_SORT_DIRECTION`].
    #[must_use]
    pub fn toggle(&self, field: SortField) -> Self {
        let direction = if field == self.field {
            self.direction.flipped()
        } else {
            DEFAULT_SORT_DIRECTION
        };
        Self {
            categories: self.categories.clone(),
            field,
            direction,
        }
    }

    fn passes(&self, product: &Product) -> bool {
        self.categories.is_empty() || self.categories.contains(&product.category)
    }
}

/// Applies the category filter and the active sort, returning references
/// into `products` in display order.
///
/// Filtering is order-preserving and runs before the sort. The sort is
/// stable: products with equal key values keep their relative input order in
/// both directions (reversing the comparator maps `Equal` to `Equal`, so
/// stability survives the descending case).
#[must_use]
pub fn rank<'a>(products: &'a [Product], view: &ViewState) -> Vec<&'a Product> {
    let mut selected: Vec<&Product> = products.iter().filter(|p| view.passes(p)).collect();
    selected.sort_by(|a, b| {
        let ordering = view.field.key(a).total_cmp(&view.field.key(b));
        match view.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    selected
}

/// Returns the distinct categories present in `products`, lexicographically
/// ordered. Recomputed per call; the category set is never cached.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let set: BTreeSet<&str> = products.iter().map(|p| p.category.as_str()).collect();
    set.into_iter().map(ToOwned::to_owned).collect()
}
