pub mod client;
pub mod config;
pub mod embed;
pub mod flow;
pub mod options;
pub mod transcript;

// Re-export main types for convenience
pub use client::{Channel, RecommendationClient};
pub use config::{Config, ContactInfo};
pub use flow::{Choice, Reaction, ShoppingFlow, ShoppingState, Step, TransitionPlan};
pub use options::{normalize, parse_products, CatalogOption, Product};
pub use transcript::{ChatMessage, ChatRole, Transcript};
