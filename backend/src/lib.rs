pub mod constants;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use db::connection::get_db_pool;
pub use errors::{CoreError, CoreResult};
pub use handlers::AppState;
pub use utils::config::Config;

// Re-export common types
pub use anyhow::Result;
pub use chrono::{DateTime, Utc};
pub use sqlx::PgPool;
pub use uuid::Uuid;
