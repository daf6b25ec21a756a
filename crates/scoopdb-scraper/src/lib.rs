pub mod client;
pub mod error;
pub mod parse;
mod retry;

pub use client::PriceScraper;
pub use error::ScrapeError;
pub use parse::extract_price_per_kg;
