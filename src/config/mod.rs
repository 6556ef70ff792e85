use std::env;
use std::path::PathBuf;

use crate::error::AppError;
use crate::validation::Policy;

/// Default maximum story depth (roots are depth 1).
pub const DEFAULT_DEPTH_LIMIT: usize = 4;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Story hierarchy limits
    pub hierarchy: HierarchyConfig,
    /// Validation policy defaults
    pub validation: ValidationConfig,
    /// Seed data location
    pub seed: SeedConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Story hierarchy limits
#[derive(Debug, Clone)]
pub struct HierarchyConfig {
    /// Maximum story depth (`HIERARCHY_DEPTH_LIMIT`)
    pub depth_limit: usize,
}

/// Validation policy defaults
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Policy used when a request names none (`VALIDATION_POLICY`)
    pub default_policy: Policy,
}

/// Seed data location
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Seed file loaded at startup and on reset (`SEED_PATH`)
    pub path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive (`LOG_LEVEL`)
    pub level: String,
    /// Output format (`LOG_FORMAT`)
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per line
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let hierarchy = HierarchyConfig {
            depth_limit: match env::var("HIERARCHY_DEPTH_LIMIT") {
                Ok(raw) => parse_depth_limit(&raw)?,
                Err(_) => DEFAULT_DEPTH_LIMIT,
            },
        };

        let validation = ValidationConfig {
            default_policy: match env::var("VALIDATION_POLICY") {
                Ok(raw) => raw.trim().parse().map_err(|_| AppError::Config {
                    message: format!("VALIDATION_POLICY must be 'warn' or 'block', got '{}'", raw),
                })?,
                Err(_) => Policy::Warn,
            },
        };

        let seed = SeedConfig {
            path: PathBuf::from(
                env::var("SEED_PATH").unwrap_or_else(|_| "./data/seed.json".to_string()),
            ),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(Config {
            hierarchy,
            validation,
            seed,
            logging,
        })
    }
}

/// Parse a depth limit; it must be a positive integer.
pub fn parse_depth_limit(raw: &str) -> Result<usize, AppError> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit >= 1 => Ok(limit),
        _ => Err(AppError::Config {
            message: format!(
                "HIERARCHY_DEPTH_LIMIT must be a positive integer, got '{}'",
                raw
            ),
        }),
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/seed.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
