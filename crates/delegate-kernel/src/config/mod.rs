//! Configuration loading
//!
//! Reads [`DelegateConfig`](crate::settings::DelegateConfig) (or any other
//! deserializable type) from YAML, TOML, JSON, INI, RON or JSON5.
//!
//! - Format is picked from the file extension
//! - `${VAR}` and `$VAR` references are substituted before parsing
//! - Later sources override earlier ones when merging
//! - `DELEGATE_`-prefixed environment variables override file values,
//!   with `__` separating nested keys (`DELEGATE_NEGOTIATION__PLATFORM_API_LEVEL`)

use crate::settings::DelegateConfig;
use config::{Config as Cfg, ConfigBuilder, Environment, File, builder::DefaultState};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::LazyLock;

pub use config::FileFormat;

/// Environment prefix for [`load_delegate_config`] overrides
pub const ENV_PREFIX: &str = "DELEGATE";

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

static BRACED_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("braced env var pattern is valid")
});

static BARE_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("bare env var pattern is valid")
});

/// Detect configuration format from file extension
///
/// `.yaml`/`.yml`, `.toml`, `.json`, `.ini`, `.ron` and `.json5` are
/// recognised, case-insensitively.
pub fn detect_format(path: &str) -> ConfigResult<FileFormat> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("No file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        "ini" => Ok(FileFormat::Ini),
        "ron" => Ok(FileFormat::Ron),
        "json5" => Ok(FileFormat::Json5),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Substitute environment variables in a string
///
/// `${VAR}` is replaced first, then `$VAR`. Unset variables are left as
/// written.
pub fn substitute_env_vars(content: &str) -> String {
    let braced = BRACED_VAR.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });

    BARE_VAR
        .replace_all(&braced, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

fn read_source(path: &str) -> ConfigResult<File<config::FileSourceString, FileFormat>> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    Ok(File::from_str(&substitute_env_vars(&content), format))
}

fn finish<T>(builder: ConfigBuilder<DefaultState>) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    builder
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::Serialization(e.to_string()))
}

/// Load configuration from a file
pub fn load_config<T>(path: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    finish(Cfg::builder().add_source(read_source(path)?))
}

/// Load configuration from a string with explicit format
pub fn from_str<T>(content: &str, format: FileFormat) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    finish(Cfg::builder().add_source(File::from_str(&substitute_env_vars(content), format)))
}

/// Merge in-memory sources; later sources override earlier ones
pub fn merge_configs<T>(sources: &[(&str, FileFormat)]) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let builder = sources
        .iter()
        .fold(Cfg::builder(), |builder, (content, format)| {
            builder.add_source(File::from_str(&substitute_env_vars(content), *format))
        });
    finish(builder)
}

/// Load several files; later files override earlier ones
pub fn load_merged<T>(paths: &[&str]) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let mut builder = Cfg::builder();
    for path in paths {
        builder = builder.add_source(read_source(path)?);
    }
    finish(builder)
}

/// Load a file, then apply `{env_prefix}_`-prefixed environment overrides
pub fn load_with_env<T>(path: &str, env_prefix: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    finish(
        Cfg::builder()
            .add_source(read_source(path)?)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ),
    )
}

/// Load and validate a [`DelegateConfig`].
///
/// Without a path only defaults and `DELEGATE_` environment overrides apply.
pub fn load_delegate_config(path: Option<&str>) -> ConfigResult<DelegateConfig> {
    let config: DelegateConfig = match path {
        Some(path) => load_with_env(path, ENV_PREFIX)?,
        None => finish(
            Cfg::builder().add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ),
        )?,
    };

    config.validate().map_err(ConfigError::Invalid)?;
    tracing::debug!(
        source = %config.source,
        option = %config.target_device_option,
        devices = config.devices.len(),
        "loaded delegate configuration"
    );
    Ok(config)
}
