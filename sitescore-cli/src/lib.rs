//! Command-line interface for scoring solar sites offline.
//!
//! Three subcommands share one configuration model: flags, a config file and
//! `SITESCORE_*` environment variables are layered with `ortho_config`, the
//! request is read as JSON and the result is printed as pretty JSON on
//! stdout. Engine logs go to stderr.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod heatmap;
mod nationwide;
mod score;

pub use error::CliError;

use heatmap::{HeatmapArgs, run_heatmap};
use nationwide::{NationwideArgs, run_nationwide};
use score::{ScoreArgs, run_score};

pub(crate) const ARG_REQUEST: &str = "request";
pub(crate) const ARG_HISTORY_DB: &str = "history-db";
pub(crate) const ARG_HISTORY_DAYS: &str = "history-days";
pub(crate) const ARG_HISTORY_LIMIT: &str = "history-limit";
pub(crate) const ARG_DATA_SOURCES: &str = "data-sources";
pub(crate) const ARG_STRICT: &str = "strict";
pub(crate) const ARG_CELL_SIZE: &str = "cell-size";
pub(crate) const ARG_STRATEGY: &str = "strategy";
pub(crate) const ARG_MAX_CELLS: &str = "max-cells";
pub(crate) const ARG_PLANT_SIZE: &str = "plant-size";
pub(crate) const ARG_SUMMARY: &str = "summary";
pub(crate) const ENV_SCORE_REQUEST: &str = "SITESCORE_CMDS_SCORE_REQUEST_PATH";
pub(crate) const ENV_HEATMAP_REQUEST: &str = "SITESCORE_CMDS_HEATMAP_REQUEST_PATH";
pub(crate) const ENV_HEATMAP_MAX_CELLS: &str = "SITESCORE_CMDS_HEATMAP_MAX_CELLS";

/// Run the sitescore CLI with the current process arguments and environment.
///
/// # Errors
/// Returns a [`CliError`] when argument parsing, configuration layering,
/// request loading, scoring or output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Score(args) => run_score(args),
        Command::Heatmap(args) => run_heatmap(args),
        Command::Nationwide(args) => run_nationwide(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "sitescore",
    about = "Score solar plant sites, areas and the national grid",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one site, or a batch of sites in order.
    Score(ScoreArgs),
    /// Build a suitability heatmap over a polygon.
    Heatmap(HeatmapArgs),
    /// Score the national grid for a plant size.
    Nationwide(NationwideArgs),
}

#[cfg(test)]
mod tests;
