mod args;
mod download;
mod params;
mod resolved_command;

pub use args::{Args, Command, parse_args, parse_command_from};
pub use download::{execute, run_download};
pub use params::DownloadParams;
pub use resolved_command::{DEFAULT_TIMEOUT_SECS, resolve_command};
