use crate::cli::args::Command;
use crate::cli::params::DownloadParams;
use crate::config::{Config, load_config};
use crate::error::EspaError;
use crate::service::{Credentials, DEFAULT_HOST, OrderSelector};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Merges the command line with the config file and environment, then validates the result.
///
/// Nothing here touches the network or the target directory.
pub fn resolve_command(command: Command) -> Result<DownloadParams, EspaError> {
    let config = load_config(command.config_path.as_deref())?;
    resolve_with_config(command, config)
}

pub(crate) fn resolve_with_config(
    command: Command,
    config: Config,
) -> Result<DownloadParams, EspaError> {
    let email = non_blank(command.email.or(config.email));
    let order = non_blank(command.order.or(config.order));
    let target_directory = command
        .target_directory
        .map(PathBuf::from)
        .or(config.target_directory)
        .filter(|path| !path.as_os_str().is_empty());
    let username = non_blank(command.username.or(config.username));
    let password = command.password.or(config.password).filter(|p| !p.is_empty());

    let missing: Vec<&str> = [
        ("--email", email.is_none()),
        ("--order", order.is_none()),
        ("--target_directory", target_directory.is_none()),
        ("--username", username.is_none()),
        ("--password", password.is_none()),
    ]
    .into_iter()
    .filter_map(|(flag, absent)| absent.then_some(flag))
    .collect();

    let (Some(email), Some(order), Some(target_directory), Some(username), Some(password)) =
        (email, order, target_directory, username, password)
    else {
        return Err(EspaError::CliArgumentValidation {
            details: format!("Missing required input(s): {}", missing.join(", ")),
        });
    };

    let selector: OrderSelector = order
        .parse()
        .map_err(|details| EspaError::CliArgumentValidation { details })?;

    let timeout_secs = command
        .timeout_secs
        .or(config.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(EspaError::CliArgumentValidation {
            details: "timeout must be greater than 0.".to_string(),
        });
    }

    let host = non_blank(command.host.or(config.host)).unwrap_or_else(|| DEFAULT_HOST.to_string());

    Ok(DownloadParams {
        host,
        email,
        selector,
        target_directory,
        credentials: Credentials::new(username, password),
        verify_checksums: command.checksum || config.checksum.unwrap_or(false),
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
