pub mod connection;
pub mod migrations;
pub mod profiles;
pub mod requests;
pub mod uploads;

pub use connection::{DatabaseConfig, get_db_pool};

use sqlx::PgPool;

/// Postgres-backed store. Uniqueness and compare-and-swap guarantees come
/// from the schema: a unique functional index on the unordered request pair,
/// a unique email index, and conditional `UPDATE ... WHERE` transitions.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
