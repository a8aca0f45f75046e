use config::{Config, Environment, File, Map};
use gantry_domain::constants::{CONFIG_FILE, ENV_PREFIX, PORT_ENV};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Custom error type for config loading.
#[gantry_derive::gantry_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
    #[error("Invalid PORT value{}: '{value}' is not a port number", format_context(.context))]
    InvalidPort { value: String, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader.
///
/// Sources, lowest to highest precedence:
/// 1. **Base file**: `server.{toml,json,yaml,...}` (or the given path). Optional.
/// 2. **Environment**: variables prefixed with `GANTRY__`; nested keys use double
///    underscores (`GANTRY__DATABASE__URL` maps to `database.url`).
/// 3. **`PORT`**: overrides `server.port` when set and non-empty.
///
/// By default variables are read from the process environment. [`ConfigLoader::vars`]
/// replaces it with an explicit map.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    vars: Option<Map<String, String>>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Base file path; the extension may be omitted.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads variables from `vars` instead of the process environment.
    #[must_use]
    pub fn vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Builds and deserializes the layered configuration.
    ///
    /// # Errors
    /// * [`ConfigError::InvalidPort`] if `PORT` is set to something other than a `u16`.
    /// * [`ConfigError::Config`] if a source is malformed or the result does not match `T`.
    pub fn load<T>(&self) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let path = self.path.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let port = port_override(self.var(PORT_ENV).as_deref())?;

        let mut builder = Config::builder()
            .add_source(File::from(path.as_path()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .convert_case(config::Case::Snake)
                    .try_parsing(true)
                    .source(self.vars.clone()),
            );

        if let Some(port) = port {
            debug!(port, "Applying PORT override");
            builder = builder
                .set_override("server.port", i64::from(port))
                .context("Applying PORT override")?;
        }

        info!("Loading config from {}", path.display());

        let config = builder
            .build()
            .context("Failed to build config")?
            .try_deserialize::<T>()
            .context("Failed to deserialize config")?;

        Ok(config)
    }

    fn var(&self, key: &str) -> Option<String> {
        match &self.vars {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        }
    }
}

/// Loads configuration from `path` (default `server`) and the process environment.
///
/// # Errors
/// See [`ConfigLoader::load`].
///
/// # Example
/// ```rust
/// use gantry_kernel::config::load_config;
/// use gantry_kernel::domain::config::ApiConfig;
///
/// let cfg: ApiConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader.path(path).load(),
        None => loader.load(),
    }
}

/// Unset or blank keeps the layered value.
fn port_override(raw: Option<&str>) -> Result<Option<u16>, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<u16>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidPort { value: raw.to_owned(), context: None })
}
