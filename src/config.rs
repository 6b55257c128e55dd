//! Runtime configuration, read from environment variables.

use std::env;

use crate::population::DEFAULT_RANKING_SIZE;

/// Default port if not specified via environment variable.
pub const DEFAULT_PORT: u16 = 3000;

/// Default database path if not specified via environment variable.
pub const DEFAULT_DB_URL: &str = "sqlite:footprint.db?mode=rwc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `FOOTPRINT_PORT`
    pub port: u16,

    /// `FOOTPRINT_DATABASE_URL`
    pub database_url: String,

    /// `FOOTPRINT_RANKING_SIZE`: length of the admin performer lists.
    pub ranking_size: usize,

    /// `FOOTPRINT_SEED_DEFAULT_FACTORS`: load the starter catalog on startup.
    pub seed_default_factors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DB_URL.to_string(),
            ranking_size: DEFAULT_RANKING_SIZE,
            seed_default_factors: true,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            port: lookup("FOOTPRINT_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_url: lookup("FOOTPRINT_DATABASE_URL").unwrap_or(defaults.database_url),
            ranking_size: lookup("FOOTPRINT_RANKING_SIZE")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.ranking_size),
            seed_default_factors: lookup("FOOTPRINT_SEED_DEFAULT_FACTORS")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(defaults.seed_default_factors),
        }
    }
}
