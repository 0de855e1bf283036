use std::{env, path::PathBuf, str::FromStr};
use log::{info, debug};
use thiserror::Error;

/// Lower bound on PBKDF2 rounds for the signature asset vault.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("DOCSEAL_KDF_ITERATIONS must be at least {min}, got {value}")]
    IterationsTooLow { min: u32, value: u32 },
}

/// Process settings. Built once at startup and handed to each component's
/// constructor.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub public_key_path: PathBuf,
    pub private_key_path: PathBuf,
    pub signers_dir: PathBuf,
    pub output_dir: PathBuf,
    pub kdf_iterations: u32,
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            public_key_path: PathBuf::from("keys/public_key.pem"),
            private_key_path: PathBuf::from("keys/private_key.pem"),
            signers_dir: PathBuf::from("signers"),
            output_dir: PathBuf::from("output"),
            kdf_iterations: MIN_KDF_ITERATIONS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Starts `env_logger` from `LOG_LEVEL`. Call before [`Settings::from_env`]
/// so the resolved settings are logged.
pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::new().filter_or(LOG_LEVEL_VAR, DEFAULT_LOG_LEVEL));
}

impl Settings {
    /// Reads settings from the process environment. Call `dotenv().ok()`
    /// first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup, falling back to
    /// defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let settings = Settings {
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "SERVER_PORT", defaults.port)?,
            log_level: lookup(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            public_key_path: lookup("DOCSEAL_PUBLIC_KEY")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_key_path),
            private_key_path: lookup("DOCSEAL_PRIVATE_KEY")
                .map(PathBuf::from)
                .unwrap_or(defaults.private_key_path),
            signers_dir: lookup("DOCSEAL_SIGNERS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.signers_dir),
            output_dir: lookup("DOCSEAL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            kdf_iterations: parse_var(&lookup, "DOCSEAL_KDF_ITERATIONS", defaults.kdf_iterations)?,
            max_upload_bytes: parse_var(&lookup, "DOCSEAL_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        };

        if settings.kdf_iterations < MIN_KDF_ITERATIONS {
            return Err(ConfigError::IterationsTooLow {
                min: MIN_KDF_ITERATIONS,
                value: settings.kdf_iterations,
            });
        }

        info!("Public key path: {}", settings.public_key_path.display());
        info!("Signers directory: {}", settings.signers_dir.display());
        debug!("Output directory: {}", settings.output_dir.display());
        Ok(settings)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}
