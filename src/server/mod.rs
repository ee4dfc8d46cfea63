mod config;
mod daemon;
mod error;
mod routes;

pub use config::{DatastoreSection, LoggingSection, ServerConfig, ServerSection};
pub use daemon::Daemon;
pub use error::ApiError;
pub use routes::{build_router, AppState};
