mod health;
mod ideas;
mod metrics;
mod trending;
pub mod user;

pub use health::health_handler;
pub use ideas::{image_handler, suggest_handler};
pub use metrics::metrics_handler;
pub use trending::trending_handler;
pub use user::UserKey;
