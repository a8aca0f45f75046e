//! Well-known names and defaults.

/// URL prefix the backoffice is mounted under.
pub const ADMIN_ROOT_PATH: &str = "/admin";

/// Listener port when neither the config file nor `PORT` provides one.
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable that overrides the listener port.
pub const PORT_ENV: &str = "PORT";

/// Prefix of structured environment overrides (`GANTRY__SERVER__ADDRESS`).
pub const ENV_PREFIX: &str = "GANTRY";

/// Base name of the optional configuration file (`server.toml`, `server.json`, ...).
pub const CONFIG_FILE: &str = "server";

/// `OpenAPI` tag of the system endpoints.
pub const SYSTEM_TAG: &str = "System";
