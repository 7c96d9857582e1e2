use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::engagement::LikeMode;
use crate::services::moderation::EpisodePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Operator recovery credential.
///
/// Any login that presents `secret` as its password resolves to the recovery
/// identity, whatever username was typed. Leaving `secret` unset disables it.
#[derive(Debug, Deserialize, Clone)]
pub struct RecoveryConfig {
    pub secret: Option<String>,
    pub username: String,
    pub email: String,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            secret: None,
            username: "recovery_admin".into(),
            email: "recovery@catalog.invalid".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued bearer tokens.
    pub token_ttl_hours: i64,
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory of the blob store.
    pub blob_dir: PathBuf,
    /// Per-upload limit in bytes.
    pub max_blob_size: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ModerationConfig {
    #[serde(default)]
    pub episode_policy: EpisodePolicy,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EngagementConfig {
    #[serde(default)]
    pub like_mode: LikeMode,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub moderation: ModerationConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_hours", 24 * 7)?
            .set_default("storage.blob_dir", "./data/blobs")?
            .set_default("storage.max_blob_size", 512 * 1024 * 1024_i64)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CATALOG__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("CATALOG").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
