use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheetview_core::{PreviewKind, PreviewSession, Previewer, ViewerConfig, ViewerState, resolve_file_url};
use std::fs;
use std::path::{Path, PathBuf};

mod formatter;

#[derive(Parser)]
#[command(name = "sheetview")]
#[command(about = "Render styled previews of spreadsheet documents", long_about = None)]
#[command(version)]
struct Cli {
    /// URL, object-storage path or local spreadsheet file
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Save the original document bytes into this directory
    #[arg(short, long, value_name = "DIR")]
    download: Option<PathBuf>,

    /// Log pipeline steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored summary with a plain-text grid
    Text,
    /// Complete HTML viewer page
    Html,
    /// JSON description of the viewer state
    Json,
}

/// Where the document bytes come from
#[derive(Debug, PartialEq)]
enum Source {
    Local(PathBuf),
    Remote(String),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        ViewerConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("sheetview.toml");
        if default_config_path.exists() {
            ViewerConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            ViewerConfig::default()
        }
    };

    config.validate().context("Invalid configuration")?;

    let source = resolve_source(&cli.source, &config)?;
    let previewer = Previewer::with_config(config).context("Failed to set up the loader")?;

    let mut session = PreviewSession::new();
    let label = match &source {
        Source::Local(path) => {
            let label = path.display().to_string();
            let token = session.open(&label);
            let state = preview_local(&previewer, path)?;
            session.complete(token, state);
            label
        }
        Source::Remote(url) => {
            let token = session.open(url);
            session.complete(token, previewer.preview_url(url));
            url.clone()
        }
    };
    let state = session.state();

    if let Some(dir) = &cli.download {
        match state.download() {
            Some(download) => {
                let path = download
                    .save_into(dir)
                    .with_context(|| format!("Failed to save download into {}", dir.display()))?;
                eprintln!("Saved {}", path.display());
            }
            None => log::warn!("nothing to download for {}", label),
        }
    }

    if cli.output.is_some() {
        colored::control::set_override(false);
    }

    let rendered = match cli.format {
        OutputFormat::Text => formatter::format_text(&cli.source, state),
        OutputFormat::Html => formatter::format_html(state, &previewer.config().render),
        OutputFormat::Json => formatter::format_json(&cli.source, state)?,
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write output to {}", path.display()))?,
        None => print!("{}", rendered),
    }

    // Exit with appropriate code
    let exit_code = match state {
        ViewerState::Ready(_) | ViewerState::Unsupported { .. } => 0,
        _ => 1,
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

/// Local files win over object paths of the same name
fn resolve_source(reference: &str, config: &ViewerConfig) -> Result<Source> {
    let path = Path::new(reference);
    if path.is_file() {
        return Ok(Source::Local(path.to_path_buf()));
    }

    resolve_file_url(reference, &config.storage)
        .map(Source::Remote)
        .with_context(|| {
            format!(
                "Cannot resolve '{}': not a local file, URL, or resolvable object path",
                reference
            )
        })
}

fn preview_local(previewer: &Previewer, path: &Path) -> Result<ViewerState> {
    let label = path.display().to_string();
    let kind = PreviewKind::detect(&label);
    if kind != PreviewKind::Spreadsheet {
        return Ok(ViewerState::Unsupported { url: label, kind });
    }

    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(previewer.preview_bytes(&label, bytes))
}
