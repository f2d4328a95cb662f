//! Server Configuration
//! Mission: Gather all runtime configuration from the environment in one place

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Runtime configuration, resolved once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub uploads_dir: String,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        let database_path = resolve_data_path(env::var("DATABASE_PATH").ok(), "storefront.db");
        let uploads_dir = resolve_data_path(env::var("UPLOADS_DIR").ok(), "uploads");

        // The signing secret is required. No fallback: a baked-in default would
        // silently ship every deployment with the same key.
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .context("JWT_SECRET must be set")?;

        Ok(Self {
            port,
            database_path,
            uploads_dir,
            jwt_secret,
        })
    }
}

fn default_data_path(filename: &str) -> String {
    // Anchor defaults to the crate directory so running from elsewhere doesn't
    // accidentally create a new empty DB in a different working directory.
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join(filename).to_string_lossy().to_string()
}

/// Resolve a data path from an env override, treating relative paths as
/// relative to the crate directory rather than the caller's cwd.
pub fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return default_data_path(default_filename);
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    base.join(p).to_string_lossy().to_string()
}

pub fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv::dotenv();

    // 2) Also try the crate-root .env (common when running with --manifest-path
    // from elsewhere).
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}
