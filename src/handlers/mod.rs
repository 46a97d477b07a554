pub mod health;
pub mod metrics_handler;
pub mod pricing;

pub use pricing::AppState;
