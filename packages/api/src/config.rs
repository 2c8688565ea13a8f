use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    /// Build absolute URLs from `X-Forwarded-Host` and `X-Forwarded-Proto`.
    /// Enable only behind a reverse proxy that overwrites them.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory uploaded images are written to.
    pub media_dir: PathBuf,
    /// URL path prefix stored images are served under.
    #[serde(default = "default_public_path")]
    pub public_path: String,
    /// Maximum accepted image size in bytes.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u64,
}

impl StorageConfig {
    /// Request body limit for upload routes. Base64 inflates payloads by a
    /// third, plus room for the surrounding JSON or multipart framing.
    pub fn body_limit(&self) -> usize {
        let limit = self.max_image_size.saturating_mul(4) / 3 + 64 * 1024;
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    /// Populate an empty database with demo fixtures on startup.
    #[serde(default)]
    pub demo_data: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_max_connections() -> u32 {
    20
}

fn default_public_path() -> String {
    "/media/images".into()
}

fn default_max_image_size() -> u64 {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("server.trust_forwarded_headers", false)?
            .set_default("database.url", "sqlite://hammer.db?mode=rwc")?
            .set_default("storage.media_dir", "./public/media/images")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., HAMMER__DATABASE__URL)
            .add_source(Environment::with_prefix("HAMMER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
