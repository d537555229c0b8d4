//! Nationwide command implementation for the sitescore CLI.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sitescore_core::measurement::DEFAULT_PLANT_CAPACITY_KW;
use sitescore_grid::{NationwideCell, NationwideGrid, NationwideHeatmap, ScoreStatistics};

use crate::fs::write_json;
use crate::{ARG_PLANT_SIZE, ARG_SUMMARY, CliError};

/// CLI arguments for the `nationwide` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "nationwide",
    long_about = "Score a fixed 0.75-degree grid over India from regional \
                 climate estimates. Use --summary to omit the full cell \
                 list and print only the aggregate and top cells.",
    about = "Score the national grid for a plant size"
)]
#[ortho_config(prefix = "SITESCORE")]
pub(crate) struct NationwideArgs {
    /// Plant capacity in kW.
    #[arg(long = ARG_PLANT_SIZE, value_name = "kw")]
    #[serde(default)]
    pub(crate) plant_size: Option<f64>,
    /// Print only the aggregate and the best cells.
    #[arg(long = ARG_SUMMARY)]
    #[serde(default)]
    pub(crate) summary: bool,
}

impl NationwideArgs {
    pub(crate) fn into_config(self) -> Result<NationwideConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(NationwideConfig::from(merged))
    }
}

/// Resolved `nationwide` command configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NationwideConfig {
    pub(crate) plant_size_kw: f64,
    pub(crate) summary: bool,
}

impl From<NationwideArgs> for NationwideConfig {
    fn from(args: NationwideArgs) -> Self {
        Self {
            plant_size_kw: args.plant_size.unwrap_or(DEFAULT_PLANT_CAPACITY_KW),
            summary: args.summary,
        }
    }
}

/// Aggregate view of a national heatmap without the cell list.
#[derive(Debug, Serialize)]
pub(crate) struct NationwideSummary<'a> {
    pub(crate) cell_count: usize,
    pub(crate) grid_resolution_deg: f64,
    pub(crate) score_mean: f64,
    pub(crate) statistics: ScoreStatistics,
    pub(crate) spatial_confidence: f64,
    pub(crate) confidence_calibration: f64,
    pub(crate) top_cells: &'a [NationwideCell],
    pub(crate) top_regions: &'a [&'static str],
    pub(crate) plant_size_kw: f64,
    pub(crate) note: &'static str,
}

impl<'a> From<&'a NationwideHeatmap> for NationwideSummary<'a> {
    fn from(heatmap: &'a NationwideHeatmap) -> Self {
        Self {
            cell_count: heatmap.cell_count(),
            grid_resolution_deg: heatmap.grid_resolution_deg,
            score_mean: heatmap.score_mean,
            statistics: heatmap.statistics,
            spatial_confidence: heatmap.spatial_confidence,
            confidence_calibration: heatmap.confidence_calibration,
            top_cells: &heatmap.top_cells,
            top_regions: &heatmap.top_regions,
            plant_size_kw: heatmap.plant_size_kw,
            note: heatmap.note,
        }
    }
}

pub(crate) fn run_nationwide(args: NationwideArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_nationwide_with(args, &NationwideGrid::new(), &mut stdout)
}

pub(crate) fn run_nationwide_with(
    args: NationwideArgs,
    grid: &NationwideGrid,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let heatmap = grid.compute(config.plant_size_kw);
    if config.summary {
        write_json(writer, &NationwideSummary::from(heatmap.as_ref()))
    } else {
        write_json(writer, heatmap.as_ref())
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<NationwideConfig, CliError> {
    let merged = NationwideArgs::merge_from_layers(layers).map_err(CliError::from)?;
    Ok(NationwideConfig::from(merged))
}
