//! Heatmap command implementation for the sitescore CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sitescore_core::SiteMeasurements;
use sitescore_grid::{CellStrategy, GridConfig, HeatmapEngine, HeatmapResult, SitePolygon};
use sitescore_scorer::SiteScorer;

use crate::fs::{load_request, require_existing, write_json};
use crate::{
    ARG_CELL_SIZE, ARG_MAX_CELLS, ARG_REQUEST, ARG_STRATEGY, CliError, ENV_HEATMAP_MAX_CELLS,
    ENV_HEATMAP_REQUEST,
};

/// Per-cell scoring strategy as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum StrategyArg {
    /// Score the centroid once and re-estimate terrain per cell.
    FastEstimate,
    /// Run the full composite for every cell.
    FullRecompute,
}

impl From<StrategyArg> for CellStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::FastEstimate => Self::FastEstimate,
            StrategyArg::FullRecompute => Self::FullRecompute,
        }
    }
}

/// CLI arguments for the `heatmap` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "heatmap",
    long_about = "Rasterise a site polygon into grid cells, score every \
                 cell and report the optimal cell with spatial statistics. \
                 The JSON request holds the polygon vertices and the site \
                 measurements; flags override the request's cell size and \
                 strategy.",
    about = "Build a suitability heatmap over a polygon"
)]
#[ortho_config(prefix = "SITESCORE")]
pub(crate) struct HeatmapArgs {
    /// Path to a JSON file holding `polygon` and `site`.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Requested cell edge length in metres.
    #[arg(long = ARG_CELL_SIZE, value_name = "metres")]
    #[serde(default)]
    pub(crate) cell_size: Option<f64>,
    /// How each cell is scored.
    #[arg(long = ARG_STRATEGY, value_enum, value_name = "strategy")]
    #[serde(default)]
    pub(crate) strategy: Option<StrategyArg>,
    /// Upper bound on the number of cells.
    #[arg(long = ARG_MAX_CELLS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_cells: Option<usize>,
}

impl HeatmapArgs {
    pub(crate) fn into_config(self) -> Result<HeatmapConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        HeatmapConfig::try_from(merged)
    }
}

/// Resolved `heatmap` command configuration.
///
/// Cell size and strategy stay optional so the request file can supply
/// them when no layer does.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HeatmapConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) cell_size_m: Option<f64>,
    pub(crate) strategy: Option<CellStrategy>,
    pub(crate) grid: GridConfig,
}

impl HeatmapConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_REQUEST)
    }
}

impl TryFrom<HeatmapArgs> for HeatmapConfig {
    type Error = CliError;

    fn try_from(args: HeatmapArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_HEATMAP_REQUEST,
        })?;
        let mut grid = GridConfig::default();
        if let Some(max_cells) = args.max_cells {
            if max_cells == 0 {
                return Err(CliError::InvalidArgument {
                    field: ARG_MAX_CELLS,
                    env: ENV_HEATMAP_MAX_CELLS,
                    expected: "at least 1",
                });
            }
            grid.max_cells = max_cells;
        }
        Ok(Self {
            request_path,
            cell_size_m: args.cell_size,
            strategy: args.strategy.map(CellStrategy::from),
            grid,
        })
    }
}

/// A `heatmap` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct HeatmapRequest {
    pub(crate) polygon: SitePolygon,
    pub(crate) site: SiteMeasurements,
    #[serde(default)]
    pub(crate) cell_size_m: Option<f64>,
    #[serde(default)]
    pub(crate) strategy: Option<CellStrategy>,
}

pub(crate) fn run_heatmap(args: HeatmapArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_heatmap_with(args, &mut stdout)
}

pub(crate) fn run_heatmap_with(args: HeatmapArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let heatmap = execute_heatmap(args)?;
    write_json(writer, &heatmap)
}

fn execute_heatmap(args: HeatmapArgs) -> Result<HeatmapResult, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let request: HeatmapRequest = load_request(&config.request_path)?;

    let cell_size_m = config
        .cell_size_m
        .or(request.cell_size_m)
        .unwrap_or(config.grid.default_cell_m);
    let strategy = config.strategy.or(request.strategy).unwrap_or_default();
    let engine = HeatmapEngine::new(SiteScorer::without_calibration())
        .with_config(config.grid)
        .with_strategy(strategy);
    Ok(engine.compute(&request.polygon, &request.site, cell_size_m))
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<HeatmapConfig, CliError> {
    let merged = HeatmapArgs::merge_from_layers(layers).map_err(CliError::from)?;
    HeatmapConfig::try_from(merged)
}
