pub mod client;
pub mod context;
pub mod error;
pub mod types;

pub use client::GeminiClient;
pub use context::product_context;
pub use error::ChatError;
pub use types::{ChatMessage, ChatRole};
