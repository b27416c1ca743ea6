use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use osm_wrangle::cli::{setup_logging, Args};
use osm_wrangle::{process_map_with_progress, ProcessStats};
use tracing::info;

const PROGRESS_EVERY: usize = 10_000;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// The spinner text after the first element and then every `PROGRESS_EVERY`.
fn progress_message(stats: &ProcessStats) -> Option<String> {
    let elements = stats.elements();
    (elements == 1 || elements % PROGRESS_EVERY == 0).then(|| {
        format!(
            "{elements} elements, {} nodes, {} ways",
            stats.nodes, stats.ways
        )
    })
}

fn run() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args);

    let bar = progress_bar(args.quiet);
    let config = args.into_config()?;

    let result = process_map_with_progress(&config, |stats| {
        if let Some(message) = progress_message(stats) {
            bar.set_message(message);
        }
    });
    bar.finish_and_clear();

    let stats = result.with_context(|| format!("converting {}", config.input.display()))?;
    info!(
        "wrote {} nodes and {} ways to {}",
        stats.nodes,
        stats.ways,
        config.output.dir().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(nodes: usize) -> ProcessStats {
        ProcessStats {
            nodes,
            ..ProcessStats::default()
        }
    }

    #[test]
    fn first_element_sets_the_message() {
        assert_eq!(
            progress_message(&stats(1)).as_deref(),
            Some("1 elements, 1 nodes, 0 ways")
        );
    }

    #[test]
    fn message_refreshes_periodically() {
        assert_eq!(progress_message(&stats(2)), None);
        assert_eq!(progress_message(&stats(PROGRESS_EVERY - 1)), None);
        assert!(progress_message(&stats(PROGRESS_EVERY)).is_some());
        assert!(progress_message(&stats(2 * PROGRESS_EVERY)).is_some());
    }
}
