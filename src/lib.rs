pub mod analysis;
pub mod app;
pub mod args;
pub mod cache;
pub mod clients;
pub mod config;
pub mod diff;
pub mod errors;
pub mod logging;
pub mod report;
pub mod validation;

// Re-export commonly used items for convenience
pub use app::{ArticleChecker, CheckOutcome};
pub use config::CheckerConfig;
pub use errors::CheckerError;
