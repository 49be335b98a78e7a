use clap::{Arg, CommandFactory, Parser};
use dops::sort::SortDirection;
use std::path::PathBuf;

pub const DOCKER_HEADING: &str = "Options (docker ps):";
pub const EXTRA_HEADING: &str = "Options (extra):";

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.4.2" for releases, "0.4.2@abc1234 2024-01-15 14:30" for dev builds
pub fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "dops",
    bin_name = "dops",
    disable_help_flag = true,
    disable_version_flag = true
)]
#[command(about = "List docker containers, in the widest format your terminal fits", long_about = None)]
pub struct Cli {
    /// Show all containers (default shows just running)
    #[arg(short, long, help_heading = DOCKER_HEADING)]
    pub all: bool,

    /// Filter output based on conditions provided (name=value)
    #[arg(short, long = "filter", value_name = "FILTER", help_heading = DOCKER_HEADING)]
    pub filters: Vec<String>,

    /// Output format; repeat it and the first one that fits the terminal is used
    #[arg(long = "format", value_name = "FORMAT", help_heading = DOCKER_HEADING)]
    pub formats: Vec<String>,

    /// Show n last created containers (includes all states)
    #[arg(short = 'n', long, value_name = "N", help_heading = DOCKER_HEADING)]
    pub last: Option<usize>,

    /// Show the latest created container (includes all states)
    #[arg(short, long, help_heading = DOCKER_HEADING)]
    pub latest: bool,

    /// Don't truncate output (container ids, sha256 image references, commands)
    #[arg(long, help_heading = DOCKER_HEADING)]
    pub no_trunc: bool,

    /// Only display container IDs
    #[arg(short, long, help_heading = DOCKER_HEADING)]
    pub quiet: bool,

    /// Display total file sizes
    #[arg(short, long, help_heading = DOCKER_HEADING)]
    pub size: bool,

    /// Do not print any output
    #[arg(long, help_heading = EXTRA_HEADING)]
    pub silent: bool,

    /// Timezone for dates: local, UTC or an offset like +02:00
    #[arg(long, value_name = "TZ", help_heading = EXTRA_HEADING)]
    pub timezone: Option<String>,

    /// Enable/disable colored output
    #[arg(
        long,
        value_name = "true|false",
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = EXTRA_HEADING
    )]
    pub color: Option<bool>,

    /// Disable colored output
    #[arg(long, help_heading = EXTRA_HEADING)]
    pub no_color: bool,

    /// Docker socket location (default: $DOCKER_HOST or /var/run/docker.sock)
    #[arg(long, value_name = "PATH", help_heading = EXTRA_HEADING)]
    pub socket: Option<String>,

    /// Datetime output format (strftime syntax)
    #[arg(long, value_name = "FORMAT", help_heading = EXTRA_HEADING)]
    pub timeformat: Option<String>,

    /// Do not print the table header
    #[arg(long, help_heading = EXTRA_HEADING)]
    pub no_header: bool,

    /// Do not print the line under the header
    #[arg(long, help_heading = EXTRA_HEADING)]
    pub simple_header: bool,

    /// Sort by a format key (repeatable, first is most significant)
    #[arg(long = "sort", value_name = "KEY", help_heading = EXTRA_HEADING)]
    pub sort: Vec<String>,

    /// Direction for the matching --sort
    #[arg(long = "sort-direction", value_name = "ASC|DESC", help_heading = EXTRA_HEADING)]
    pub sort_direction: Vec<SortDirection>,

    /// Refresh periodically (500ms, 2s, 1m; default from config, 2s)
    #[arg(
        long,
        value_name = "INTERVAL",
        num_args = 0..=1,
        default_missing_value = "",
        help_heading = EXTRA_HEADING
    )]
    pub watch: Option<String>,

    /// Read containers from a saved API response instead of the daemon (- for stdin)
    #[arg(long, value_name = "FILE", help_heading = EXTRA_HEADING)]
    pub input: Option<PathBuf>,

    /// List the available format keys
    #[arg(long, help_heading = EXTRA_HEADING)]
    pub keys: bool,

    /// Log debug output to stderr
    #[arg(short, long, help_heading = EXTRA_HEADING)]
    pub verbose: bool,

    /// Print help
    #[arg(short, long, help_heading = EXTRA_HEADING)]
    pub help: bool,

    /// Print version
    #[arg(short = 'V', long, help_heading = EXTRA_HEADING)]
    pub version: bool,
}

/// One line of the options listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionLine {
    pub heading: String,
    pub label: String,
    pub help: String,
}

/// All options in declaration order, labelled the way help shows them.
pub fn option_lines() -> Vec<OptionLine> {
    let cmd = Cli::command();
    cmd.get_arguments()
        .filter(|arg| !arg.is_hide_set())
        .map(|arg| OptionLine {
            heading: arg
                .get_help_heading()
                .unwrap_or(EXTRA_HEADING)
                .to_string(),
            label: option_label(arg),
            help: arg.get_help().map(|h| h.to_string()).unwrap_or_default(),
        })
        .collect()
}

fn option_label(arg: &Arg) -> String {
    let short = arg
        .get_short()
        .map(|c| format!("-{}, ", c))
        .unwrap_or_else(|| "    ".to_string());
    let long = arg
        .get_long()
        .map(|l| format!("--{}", l))
        .unwrap_or_default();
    let value = match arg.get_value_names() {
        Some(names) if arg.get_action().takes_values() => {
            let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
            let optional = arg.get_num_args().is_some_and(|n| n.min_values() == 0);
            if optional {
                format!(" [{}]", names.join(" "))
            } else {
                format!(" <{}>", names.join(" "))
            }
        }
        _ => String::new(),
    };
    format!("{}{}{}", short, long, value)
}
