use clap::{ArgAction, Parser};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

const AFTER_HELP: &str = "\
Retrieves all completed scenes for the user/order and places them into the
target directory. Scenes are organized by order.

It is safe to cancel and restart the client, as it will only download scenes
one time (per directory).

*** Important ***
If you intend to automate execution of this program, please take care to
ensure only 1 instance runs at a time against a target directory. Also please
do not schedule execution more frequently than once per hour.

Any option may also be set in a --config file or through ESPADL_* environment
variables (for example ESPADL_PASSWORD).

Example:
  espadl -e your_email@server.com -o ALL -d /some/directory/with/free/space -u user -p pass";

/// Download inputs as given on the command line, before config merging and validation.
#[derive(Debug, Clone, Default)]
pub struct Command {
    pub config_path: Option<String>,
    pub email: Option<String>,
    pub order: Option<String>,
    pub target_directory: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub checksum: bool,
    pub timeout_secs: Option<u64>,
}

pub struct Args {
    pub command: Command,
}

#[derive(Debug, Parser)]
#[command(
    name = "espadl",
    version,
    about = "Download all available (completed) scenes of ESPA orders",
    after_help = AFTER_HELP
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count
    )]
    verbose: u8,

    #[arg(
        short = 'e',
        long = "email",
        value_name = "EMAIL",
        help = "Email address of the user that submitted the order"
    )]
    email: Option<String>,

    #[arg(
        short = 'o',
        long = "order",
        value_name = "ORDER",
        help = "Which order to download (use ALL for every order)"
    )]
    order: Option<String>,

    #[arg(
        short = 'd',
        long = "target_directory",
        visible_alias = "target-directory",
        value_name = "DIR",
        help = "Where to store the downloaded scenes"
    )]
    target_directory: Option<String>,

    #[arg(
        short = 'u',
        long = "username",
        value_name = "USER",
        help = "EE/ESPA account username"
    )]
    username: Option<String>,

    #[arg(
        short = 'p',
        long = "password",
        value_name = "PASSWORD",
        help = "EE/ESPA account password"
    )]
    password: Option<String>,

    #[arg(
        short = 'c',
        long = "checksum",
        help = "Also download checksum files and verify each scene against them",
        action = ArgAction::SetTrue
    )]
    checksum: bool,

    #[arg(
        short = 'i',
        long = "host",
        value_name = "URL",
        help = "Base URL of the ESPA service (default: https://espa.cr.usgs.gov)"
    )]
    host: Option<String>,

    #[arg(
        long = "config",
        value_name = "FILE",
        help = "Reads settings from a YAML, TOML or JSON file"
    )]
    config: Option<String>,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help = "Timeout for order service requests (default: 60)"
    )]
    timeout: Option<u64>,
}

impl From<Cli> for Command {
    fn from(cli: Cli) -> Self {
        Command {
            config_path: cli.config,
            email: cli.email,
            order: cli.order,
            target_directory: cli.target_directory,
            username: cli.username,
            password: cli.password,
            host: cli.host,
            checksum: cli.checksum,
            timeout_secs: cli.timeout,
        }
    }
}

/// Parses a command line without touching the global logger.
pub fn parse_command_from<I, T>(args: I) -> Result<Command, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args).map(Command::from)
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(log_level, rust_log.as_deref()))
        .init();

    Args {
        command: cli.into(),
    }
}

/// `RUST_LOG` wins when set; otherwise the verbosity flag decides.
fn build_env_filter(log_level: Level, rust_log: Option<&str>) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(log_level.into());
    if let Some(rust_log) = rust_log {
        return builder.parse_lossy(rust_log);
    }

    let mut env_filter = builder.parse_lossy("");
    if log_level < Level::TRACE {
        // Connection pool chatter drowns out the per-file progress otherwise.
        if let Ok(directive) = "hyper_util=info".parse::<Directive>() {
            env_filter = env_filter.add_directive(directive);
        }
    }
    env_filter
}
