use super::Config;
use crate::error::EspaError;
use config::Config as ConfigBuilder;

const ENV_PREFIX: &str = "ESPADL";

/// Keys that may be set through `ESPADL_<KEY>`. Other `ESPADL_*` variables are ignored.
const ENV_KEYS: [&str; 8] = [
    "host",
    "email",
    "order",
    "target_directory",
    "username",
    "password",
    "checksum",
    "timeout_secs",
];

/// Loads settings from the optional config file, overlaid with `ESPADL_*` environment variables.
pub fn load_config(config_path: Option<&str>) -> Result<Config, EspaError> {
    load_config_with_env(config_path, std::env::vars())
}

pub(crate) fn load_config_with_env(
    config_path: Option<&str>,
    env: impl IntoIterator<Item = (String, String)>,
) -> Result<Config, EspaError> {
    let mut builder = ConfigBuilder::builder();
    if let Some(config_path) = config_path {
        builder = builder.add_source(config::File::with_name(config_path));
    }

    // Values stay strings until deserialized, so a numeric password keeps its leading zeros.
    let config_builder = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).source(Some(known_env_vars(env))))
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}

fn known_env_vars(env: impl IntoIterator<Item = (String, String)>) -> config::Map<String, String> {
    env.into_iter()
        .filter(|(name, _)| {
            name.strip_prefix(ENV_PREFIX)
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|key| ENV_KEYS.contains(&key.to_ascii_lowercase().as_str()))
        })
        .collect()
}
