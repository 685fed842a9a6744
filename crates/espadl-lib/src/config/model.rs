use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Settings that may come from a config file or `ESPADL_*` environment variables.
/// Command-line flags take precedence over every field.
#[derive(Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub host: Option<String>,
    pub email: Option<String>,
    pub order: Option<String>,
    pub target_directory: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub checksum: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("email", &self.email)
            .field("order", &self.order)
            .field("target_directory", &self.target_directory)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("checksum", &self.checksum)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
