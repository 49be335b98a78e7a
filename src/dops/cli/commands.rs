//! # CLI Layer
//!
//! This module is **one possible UI client** for dops. Everything below
//! `dops::api` is terminal agnostic; this is the place that:
//! - Parses arguments and merges them with `config.json`
//! - Decides on colors from the terminal and the flags
//! - Writes to stdout/stderr and owns the `--watch` runtime
//!
//! ## Structure
//!
//! - `run()`: entry point called by `main.rs`
//! - `init_context()`: turns flags plus config into a ready [`DopsApi`]
//! - `render_once()` / `render_watch()`: the two ways of producing output

use super::print::{print_messages, print_output, print_warnings};
use super::render::{render_help, render_keys, Message};
use super::setup::{get_version, Cli};
use clap::Parser;
use console::Term;
use dops::api::{DopsApi, TerminalWidth};
use dops::config::{config_dir, parse_interval, DopsConfig};
use dops::error::{DopsError, Result};
use dops::fields::{FieldRegistry, RenderOptions, TimeZoneSpec};
use dops::format::{parse_formats, with_size_column};
use dops::render::ViewSpec;
use dops::sort::build_sort_keys;
use dops::source::file::JsonFileSource;
use dops::source::socket::DockerSocketSource;
use dops::source::{ListOptions, RecordSource};
use dops::table::TableStyle;
use dops::watch::{spawn_interrupt_listener, watch, Cycle, WatchOutcome};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const ID_LIST_FORMAT: &str = "idlist";

struct AppContext {
    api: DopsApi<Box<dyn RecordSource>>,
    use_color: bool,
    silent: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.version {
        println!("dops {}", get_version());
        return Ok(());
    }

    let use_color = init_color(&cli);
    if cli.help {
        print!("{}", render_help(&FieldRegistry::new(), use_color)?);
        return Ok(());
    }
    if cli.keys {
        print!("{}", render_keys(&FieldRegistry::new(), use_color)?);
        return Ok(());
    }

    let config = match config_dir() {
        Some(dir) => DopsConfig::load(dir)?,
        None => DopsConfig::default(),
    };

    let interval = match cli.watch.as_deref() {
        None => None,
        Some("") => Some(config.watch_interval()?),
        Some(value) => Some(parse_interval(value)?),
    };

    let ctx = init_context(&cli, &config, use_color)?;
    let warnings = unknown_sort_keys(&cli.sort, ctx.api.registry());
    if !warnings.is_empty() && !cli.silent {
        print_warnings(&warnings, use_color);
    }

    match interval {
        None => render_once(&ctx),
        Some(interval) => render_watch(&ctx, interval),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "dops=debug" } else { "dops=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// `--no-color` beats `--color`, which beats terminal detection.
fn init_color(cli: &Cli) -> bool {
    let use_color = if cli.no_color {
        false
    } else {
        cli.color
            .unwrap_or_else(|| Term::stdout().features().colors_supported())
    };
    console::set_colors_enabled(use_color);
    colored::control::set_override(use_color);
    use_color
}

/// Formats in order of preference: `-q`, then `--format`, then config.
fn resolve_formats(cli: &Cli, config: &DopsConfig) -> Vec<String> {
    if cli.quiet {
        return vec![ID_LIST_FORMAT.to_string()];
    }
    if !cli.formats.is_empty() {
        return cli.formats.clone();
    }
    if cli.size {
        return config.formats.iter().map(|f| with_size_column(f)).collect();
    }
    config.formats.clone()
}

fn unknown_sort_keys(keys: &[String], registry: &FieldRegistry) -> Vec<Message> {
    keys.iter()
        .filter(|key| !registry.contains(key))
        .map(|key| Message::warning(format!("Unknown sort key ignored: {}", key)))
        .collect()
}

fn init_context(cli: &Cli, config: &DopsConfig, use_color: bool) -> Result<AppContext> {
    let formats = resolve_formats(cli, config);
    tracing::debug!(?formats, "format candidates");

    let mut list = ListOptions {
        all: cli.all,
        size: cli.size,
        limit: if cli.latest { Some(1) } else { cli.last },
        ..ListOptions::default()
    };
    for filter in &cli.filters {
        list.add_filter(filter)?;
    }

    let options = RenderOptions {
        truncate: !cli.no_trunc,
        use_color,
        time_format: cli
            .timeformat
            .clone()
            .unwrap_or_else(|| config.time_format.clone()),
        timezone: cli
            .timezone
            .as_deref()
            .unwrap_or(&config.timezone)
            .parse::<TimeZoneSpec>()?,
        now: None,
    };
    options.validate()?;

    let view = ViewSpec::new(parse_formats(&formats, &config.column_widths))
        .with_sort_keys(build_sort_keys(&cli.sort, &cli.sort_direction))
        .with_table_style(TableStyle {
            header: config.header && !cli.no_header,
            separator: config.separator && !cli.simple_header,
        });

    let source: Box<dyn RecordSource> = match &cli.input {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => {
            let source =
                DockerSocketSource::from_env(cli.socket.as_deref().or(config.socket.as_deref()))?;
            tracing::debug!(socket = %source.socket().display(), "using docker socket");
            Box::new(source)
        }
    };

    Ok(AppContext {
        api: DopsApi::new(source, view, list, options),
        use_color,
        silent: cli.silent,
    })
}

/// Fetches are async, so both modes run on one current-thread runtime.
fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

fn render_once(ctx: &AppContext) -> Result<()> {
    runtime()?.block_on(async {
        let output = ctx.api.render(&TerminalWidth).await?;
        print_output(&output, ctx.silent)?;
        Ok::<(), DopsError>(())
    })
}

fn render_watch(ctx: &AppContext, interval: Duration) -> Result<()> {
    let outcome = runtime()?.block_on(async {
        let token = CancellationToken::new();
        let listener = spawn_interrupt_listener(token.clone());
        let result = watch(interval, &token, |cycle| async move {
            // render before clearing so a slow daemon does not leave a blank screen
            let output = ctx.api.render(&TerminalWidth).await?;
            if cycle == Cycle::Refresh && !ctx.silent {
                Term::stdout().clear_screen()?;
            }
            print_output(&output, ctx.silent)?;
            Ok::<(), DopsError>(())
        })
        .await;
        listener.abort();
        result
    })?;

    match outcome {
        WatchOutcome::Canceled if !ctx.silent => {
            println!();
            print_messages(&[Message::info("Watch canceled with Ctrl+C")], ctx.use_color);
        }
        WatchOutcome::Canceled => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["dops"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn config() -> DopsConfig {
        DopsConfig {
            formats: vec![
                "table {{.Names}}\t{{.State}}".to_string(),
                "{{.Names}}".to_string(),
            ],
            ..DopsConfig::default()
        }
    }

    #[test]
    fn quiet_wins_over_format() {
        let cli = parse(&["-q", "--format", "{{.Names}}"]);
        assert_eq!(resolve_formats(&cli, &config()), vec!["idlist"]);
    }

    #[test]
    fn command_line_formats_replace_config() {
        let cli = parse(&["--format", "{{.ID}}"]);
        assert_eq!(resolve_formats(&cli, &config()), vec!["{{.ID}}"]);
    }

    #[test]
    fn size_flag_extends_config_tables() {
        let cli = parse(&["-s"]);
        assert_eq!(
            resolve_formats(&cli, &config()),
            vec!["table {{.Names}}\t{{.State}}\t{{.Size}}", "{{.Names}}"]
        );
    }

    #[test]
    fn size_flag_leaves_explicit_formats_alone() {
        let cli = parse(&["-s", "--format", "table {{.Names}}"]);
        assert_eq!(resolve_formats(&cli, &config()), vec!["table {{.Names}}"]);
    }

    #[test]
    fn context_merges_flags_and_config() {
        let cli = parse(&["--input", "-", "-l", "-f", "status=exited", "--no-header"]);
        let ctx = init_context(&cli, &config(), false).unwrap();
        let list = ctx.api.list_options();
        assert_eq!(list.limit, Some(1));
        assert_eq!(list.filters["status"], vec!["exited"]);
        assert!(!ctx.silent);
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let cli = parse(&["--input", "-", "--timezone", "Mars/Olympus"]);
        assert!(init_context(&cli, &config(), false).is_err());
    }

    #[test]
    fn unknown_sort_keys_are_reported() {
        let keys = vec!["Names".to_string(), "Colour".to_string()];
        let warnings = unknown_sort_keys(&keys, &FieldRegistry::new());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].content, "Unknown sort key ignored: Colour");
    }

    #[test]
    fn bad_filter_is_rejected() {
        let cli = parse(&["--input", "-", "-f", "nonsense"]);
        assert!(init_context(&cli, &config(), false).is_err());
    }
}
