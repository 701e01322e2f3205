use std::path::{Path, PathBuf};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Prefix shared by every environment variable the uploader reads.
pub const ENV_PREFIX: &str = "IMGUPLOADER_";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub watch_path: PathBuf,
    pub bucket: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("could not determine home directory")]
    HomeDirectory,
    #[error("cannot expand user-specific home dir in {0}")]
    UserHomeDirectory(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

pub fn get_config() -> Result<Config, ConfigError> {
    from_vars(std::env::vars())
}

/// Builds the configuration from `(name, value)` pairs. Only names carrying
/// `ENV_PREFIX` are considered; `IMGUPLOADER_WATCH_PATH` maps to `watch_path`.
pub fn from_vars<I>(vars: I) -> Result<Config, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let fields: Map<String, Value> = vars
        .into_iter()
        .filter_map(|(name, value)| {
            name.strip_prefix(ENV_PREFIX)
                .map(|field| (field.to_lowercase(), Value::String(value)))
        })
        .collect();

    let mut configuration: Config = serde_json::from_value(Value::Object(fields))?;

    if configuration.watch_path.as_os_str().is_empty() {
        return Err(ConfigError::Empty("IMGUPLOADER_WATCH_PATH"));
    }
    if configuration.bucket.trim().is_empty() {
        return Err(ConfigError::Empty("IMGUPLOADER_BUCKET"));
    }

    configuration.watch_path = expand_home(&configuration.watch_path)?;
    Ok(configuration)
}

/// Expand a leading `~` to the current user's home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    let raw = path.to_string_lossy();
    if !raw.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let rest = &raw[1..];
    if !rest.is_empty() && !rest.starts_with('/') {
        return Err(ConfigError::UserHomeDirectory(raw.into_owned()));
    }

    let mut expanded = dirs::home_dir().ok_or(ConfigError::HomeDirectory)?;
    let rest = rest.trim_start_matches('/');
    if !rest.is_empty() {
        expanded.push(rest);
    }
    Ok(expanded)
}
