//! Command-line interface.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;

use crate::classify::{ClassifierConfig, DEFAULT_CATEGORY, DEFAULT_POSTCODE_PATTERN};
use crate::config::{Config, OutputPaths};

#[derive(Parser, Debug)]
#[command(name = "osm_wrangle")]
#[command(about = "Convert an OpenStreetMap XML export into CSV tables for bulk loading")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to a .osm file. Defaults to the only .osm file in the current folder.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Directory for nodes.csv, nodes_tags.csv, ways.csv, ways_nodes.csv and ways_tags.csv
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Check every element against the table schema (roughly 10x slower; try it on a sample)
    #[arg(long)]
    pub validate: bool,

    /// Tag type for keys without a lowercase `prefix:` namespace
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    pub default_tag_type: String,

    /// Regex whose first match replaces addr:postcode values
    #[arg(long, default_value = DEFAULT_POSTCODE_PATTERN)]
    pub postcode_pattern: String,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors, and hide the progress spinner
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Resolves the input path and builds the run configuration.
    pub fn into_config(self) -> Result<Config> {
        let input = match self.input {
            Some(path) => path,
            None => {
                let cwd = std::env::current_dir().context("reading current directory")?;
                find_default_osm(&cwd)?
            }
        };

        let classifier = ClassifierConfig {
            default_category: self.default_tag_type,
            postcode_pattern: self.postcode_pattern,
            ..ClassifierConfig::default()
        };

        Ok(Config::new(input, OutputPaths::in_dir(self.output_dir))
            .with_validation(self.validate)
            .with_classifier(classifier))
    }
}

fn find_default_osm(folder: &Path) -> Result<PathBuf> {
    let mut osm_files = Vec::new();
    for entry in folder
        .read_dir()
        .with_context(|| format!("listing {}", folder.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("osm") {
            osm_files.push(path);
        }
    }
    osm_files.sort();

    match osm_files.len() {
        0 => bail!("no .osm files found in {}", folder.display()),
        1 => {
            let path = osm_files.remove(0);
            debug!(path = %path.display(), "using the only .osm file found");
            Ok(path)
        }
        _ => bail!("multiple .osm files found; pass INPUT explicitly"),
    }
}

/// Set up structured logging on stderr. `RUST_LOG` overrides the CLI level.
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("osm_wrangle={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();
}
