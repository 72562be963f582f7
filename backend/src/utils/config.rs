use anyhow::Result;
use std::env;

use crate::constants::{DEFAULT_SERVER_PORT, DEFAULT_UPLOAD_TTL_MINUTES};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Public base URL of the external object store; upload and download
    /// URLs are issued against it.
    pub object_store_url: String,
    pub upload_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_SERVER_PORT),
            object_store_url: env::var("OBJECT_STORE_URL")
                .map_err(|_| anyhow::anyhow!("OBJECT_STORE_URL must be set"))?
                .trim_end_matches('/')
                .to_string(),
            upload_ttl_minutes: env::var("UPLOAD_TTL_MINUTES")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_TTL_MINUTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_UPLOAD_TTL_MINUTES),
        })
    }
}
