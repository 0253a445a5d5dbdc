mod cli;
mod core;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::config::AppConfig;

#[derive(Parser)]
#[command(name = "curt", about = "AWS CUR cost tracking CLI for grantees", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the mirror and render cost reports (default)
    Report {
        /// Grantee to report on (default: all configured)
        #[arg(short, long)]
        grantee: Option<String>,

        /// Skip the download pass and report on mirrored files only
        #[arg(long)]
        offline: bool,

        /// Show the full daily series
        #[arg(short, long)]
        all: bool,
    },
    /// Download manifests and cost files without reporting
    Fetch {
        /// Grantee to sync (default: all configured)
        #[arg(short, long)]
        grantee: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate a sample config file
    Init,
    /// Validate config file
    Check,
}

/// Initialise the global `tracing` subscriber from the configured log
/// level; `--verbose` forces `debug`.
fn init_logging(log_level: &str, verbose: bool) {
    let directive = if verbose { "debug" } else { log_level };
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = AppConfig::load()
        .map(|c| c.settings.log_level)
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&log_level, cli.verbose);

    let output_opts = cli::output::OutputOptions {
        format: if cli.json {
            cli::output::OutputFormat::Json
        } else {
            match cli.format.as_deref() {
                Some("json") => cli::output::OutputFormat::Json,
                _ => cli::output::OutputFormat::Text,
            }
        },
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color),
        verbose: cli.verbose,
    };

    match cli.command {
        None | Some(Commands::Report { .. }) => {
            let (grantee, offline, all) = match cli.command {
                Some(Commands::Report {
                    grantee,
                    offline,
                    all,
                }) => (grantee, offline, all),
                _ => (None, false, false),
            };
            cli::report_cmd::run(grantee, offline, all, &output_opts).await?;
        }
        Some(Commands::Fetch { grantee }) => {
            cli::fetch_cmd::run(grantee, &output_opts).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init => cli::config_cmd::init(&output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
        },
    }

    Ok(())
}
