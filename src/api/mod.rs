//! API layer - HTTP endpoint handlers organized by domain.

mod health;
mod ingest;
mod metrics;
mod read;

pub use health::{health, status};
pub use ingest::publish_post;
pub use metrics::prometheus_metrics;
pub use read::{get_metrics, get_notifications, get_users};
