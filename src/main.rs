//! tabriff: render a Songsterr track as compact riff tablature.
//!
//! Reads a Songsterr track JSON file and prints either the riff sheet (riffs
//! written once, followed by the play order) or the full tab.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use tabriff::{build_riff_sheet, render_full_tab, render_tab, track_from_file, RenderOptions, TabError};

/// Render Songsterr tracks as text tablature riffs
#[derive(Parser)]
#[command(name = "tabriff")]
#[command(about = "Render a Songsterr track as compact riff tablature")]
#[command(version)]
struct Cli {
    /// Songsterr track JSON file
    file: PathBuf,

    /// JSON file with render options; flags below override it
    #[arg(long)]
    options: Option<PathBuf>,

    /// Maximum line width in columns
    #[arg(short = 'w', long)]
    max_width: Option<usize>,

    /// Leave out the tuning column
    #[arg(long)]
    hide_tuning: bool,

    /// Start a riff on a new line instead of splitting it
    #[arg(long)]
    avoid_splitting_riffs: bool,

    /// Print every bar in play order instead of riffs
    #[arg(long)]
    full_tab: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Log pipeline stages (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("tabriff: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String, TabError> {
    let options = resolve_options(cli)?;
    debug!(?options, file = %cli.file.display(), "rendering");

    let track = track_from_file(&cli.file)?;
    let tab = render_tab(&track)?;

    if cli.full_tab {
        return match cli.format {
            OutputFormat::Text => Ok(render_full_tab(&tab, &options)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&tab)?),
        };
    }

    let sheet = build_riff_sheet(&tab)?;
    if cli.format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&sheet)?);
    }

    let minimum = sheet.minimum_line_width(&options);
    if options.max_line_width < minimum {
        warn!(
            requested = options.max_line_width,
            minimum, "some lines are wider than the requested width"
        );
    }
    Ok(sheet.render(&options))
}

/// Options file first, then explicit flags on top.
fn resolve_options(cli: &Cli) -> Result<RenderOptions, TabError> {
    let mut options = match &cli.options {
        Some(path) => load_options(path)?,
        None => RenderOptions::default(),
    };
    if let Some(width) = cli.max_width {
        options.max_line_width = width;
    }
    options.hide_tuning |= cli.hide_tuning;
    options.avoid_splitting_riffs |= cli.avoid_splitting_riffs;
    Ok(options)
}

fn load_options(path: &Path) -> Result<RenderOptions, TabError> {
    let json = std::fs::read_to_string(path).map_err(|source| TabError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}
