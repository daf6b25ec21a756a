mod app_config;
mod blog;
mod config;
mod metrics;
mod product;
pub mod rank;

pub use app_config::{AppConfig, Environment};
pub use blog::BlogPost;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use metrics::{price_per_kg, protein_per_dollar};
pub use product::Product;
pub use rank::{categories, rank, SortDirection, SortField, ViewState, DEFAULT_SORT_DIRECTION};
