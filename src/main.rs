//! CLI entry point for the EC dashboard.
//!
//! Loads a data directory of per-school environment logs and a growth
//! workbook, then prints one of the dashboard views or exports the tables.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use ec_dashboard::{
    config::{DashboardConfig, DuplicatePolicy},
    output::{
        export_environment_csv, export_growth_xlsx, write_environment_text, write_growth_text,
        write_json, write_overview_text,
    },
    session::Session,
    views,
};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ec_dashboard")]
#[command(about = "Summaries and charts for school plant-growth EC experiments", long_about = None)]
struct Cli {
    /// Directory holding the environment CSVs and the growth workbook
    /// [env: EC_DASHBOARD_DATA_DIR, default: data]
    #[arg(short, long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// What to do when two environment files name the same school
    #[arg(long, global = true, value_enum, default_value_t = DuplicatePolicy::Append)]
    on_duplicate: DuplicatePolicy,

    /// Output format for views
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the schools present in both data sets
    Schools,
    /// Experiment overview: per-school EC and individual counts, headline metrics
    Overview,
    /// Environment averages by school, with a time series for one school
    Environment {
        /// "All" or a school name
        #[arg(short, long, default_value = "All")]
        school: String,
    },
    /// Mean fresh weight by EC, distributions and trait correlations
    Growth,
    /// Write the combined environment table as CSV
    ExportEnvironment {
        #[arg(short, long, default_value = "environment_all.csv")]
        output: PathBuf,
    },
    /// Write the combined growth table, with EC, as an xlsx workbook
    ExportGrowth {
        #[arg(short, long, default_value = "growth_all.xlsx")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ec_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ec_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::resolve(cli.data_dir, cli.on_duplicate);

    if let Err(e) = run(&config, cli.format, cli.command) {
        error!(error = %e, "Dashboard stopped");
        return Err(e);
    }
    Ok(())
}

/// Opens the session and runs one command. Any load failure stops here,
/// before anything is printed.
fn run(config: &DashboardConfig, format: Format, command: Commands) -> Result<()> {
    let session = Session::open(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Schools => match format {
            Format::Json => write_json(&mut out, session.reconciliation())?,
            Format::Text => {
                for school in session.common_schools() {
                    writeln!(out, "{school}")?;
                }
                for school in session.missing_environment() {
                    writeln!(out, "{school} (no environment data)")?;
                }
            }
        },
        Commands::Overview => {
            let view = views::overview(&session)?;
            match format {
                Format::Json => write_json(&mut out, &view)?,
                Format::Text => write_overview_text(&mut out, &view)?,
            }
        }
        Commands::Environment { school } => {
            let selection = session.select(&school)?;
            let view = views::environment(&session, &selection)?;
            match format {
                Format::Json => write_json(&mut out, &view)?,
                Format::Text => write_environment_text(&mut out, &view)?,
            }
        }
        Commands::Growth => {
            let view = views::growth(&session)?;
            match format {
                Format::Json => write_json(&mut out, &view)?,
                Format::Text => write_growth_text(&mut out, &view)?,
            }
        }
        Commands::ExportEnvironment { output } => {
            let rows = export_environment_csv(&session, &output)?;
            info!(rows, output = %output.display(), "Export complete");
        }
        Commands::ExportGrowth { output } => {
            export_growth_xlsx(&session, &output)?;
            info!(output = %output.display(), "Export complete");
        }
    }

    Ok(())
}
