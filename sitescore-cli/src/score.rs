//! Score command implementation for the sitescore CLI.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sitescore_core::{ScoreResult, SiteMeasurements};
use sitescore_scorer::{
    DEFAULT_HISTORY_LIMIT, DEFAULT_HISTORY_WINDOW, HistoryQuery, RegionalCalibrator, ScoreOptions,
    SiteScorer,
};

use crate::fs::{load_request, require_existing, write_json};
use crate::{
    ARG_DATA_SOURCES, ARG_HISTORY_DAYS, ARG_HISTORY_DB, ARG_HISTORY_LIMIT, ARG_REQUEST,
    ARG_STRICT, CliError, ENV_SCORE_REQUEST,
};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
const DEFAULT_DATA_SOURCES: u8 = 3;

/// CLI arguments for the `score` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "score",
    long_about = "Score a site, or an ordered batch of sites, described by a \
                 JSON request. Sites with a location are calibrated against \
                 earlier scores in the same 5-degree region; --history-db \
                 warms that calibration from stored results first.",
    about = "Score one site or a batch of sites"
)]
#[ortho_config(prefix = "SITESCORE")]
pub(crate) struct ScoreArgs {
    /// Path to a JSON file holding one site or an array of sites.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// SQLite database with an `analysis_results` table used for seeding.
    #[arg(long = ARG_HISTORY_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) history_db: Option<Utf8PathBuf>,
    /// Only seed from results newer than this many days.
    #[arg(long = ARG_HISTORY_DAYS, value_name = "days")]
    #[serde(default)]
    pub(crate) history_days: Option<u64>,
    /// Maximum number of historical results read.
    #[arg(long = ARG_HISTORY_LIMIT, value_name = "rows")]
    #[serde(default)]
    pub(crate) history_limit: Option<u32>,
    /// Number of live upstream sources that supplied the measurements.
    #[arg(long = ARG_DATA_SOURCES, value_name = "count")]
    #[serde(default)]
    pub(crate) data_sources: Option<u8>,
    /// Fail instead of reporting constraint violations on the result.
    #[arg(long = ARG_STRICT)]
    #[serde(default)]
    pub(crate) strict: bool,
}

impl ScoreArgs {
    pub(crate) fn into_config(self) -> Result<ScoreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ScoreConfig::try_from(merged)
    }
}

/// Where to read calibration history from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HistorySettings {
    pub(crate) database: Utf8PathBuf,
    pub(crate) query: HistoryQuery,
}

/// Resolved `score` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScoreConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) history: Option<HistorySettings>,
    pub(crate) data_sources: u8,
    pub(crate) strict: bool,
}

impl ScoreConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_REQUEST)?;
        if let Some(history) = &self.history {
            require_existing(&history.database, ARG_HISTORY_DB)?;
        }
        Ok(())
    }

    const fn options(&self) -> ScoreOptions {
        ScoreOptions {
            apply_calibration: true,
            run_constraints: true,
            data_sources: self.data_sources,
        }
    }
}

impl TryFrom<ScoreArgs> for ScoreConfig {
    type Error = CliError;

    fn try_from(args: ScoreArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_SCORE_REQUEST,
        })?;
        let history = args.history_db.map(|database| HistorySettings {
            database,
            query: HistoryQuery {
                max_age: args.history_days.map_or(DEFAULT_HISTORY_WINDOW, |days| {
                    Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY))
                }),
                limit: args.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            },
        });
        Ok(Self {
            request_path,
            history,
            data_sources: args.data_sources.unwrap_or(DEFAULT_DATA_SOURCES),
            strict: args.strict,
        })
    }
}

/// A `score` request: one site or an ordered batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum ScoreRequest {
    Single(SiteMeasurements),
    Batch(Vec<SiteMeasurements>),
}

/// Output mirroring the shape of the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum ScoreOutput {
    Single(ScoreResult),
    Batch(Vec<ScoreResult>),
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_score_with(args, &mut stdout)
}

pub(crate) fn run_score_with(args: ScoreArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let output = execute_score(args)?;
    write_json(writer, &output)
}

fn execute_score(args: ScoreArgs) -> Result<ScoreOutput, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let request: ScoreRequest = load_request(&config.request_path)?;
    let scorer = build_scorer(&config)?;
    let options = config.options();
    let score_one = |site: &SiteMeasurements| -> Result<ScoreResult, CliError> {
        if config.strict {
            Ok(scorer.score_strict(site, options)?)
        } else {
            Ok(scorer.score(site, options)?)
        }
    };
    match request {
        ScoreRequest::Single(site) => score_one(&site).map(ScoreOutput::Single),
        ScoreRequest::Batch(sites) => sites
            .iter()
            .map(score_one)
            .collect::<Result<Vec<_>, _>>()
            .map(ScoreOutput::Batch),
    }
}

fn build_scorer(config: &ScoreConfig) -> Result<SiteScorer, CliError> {
    let calibrator = Arc::new(RegionalCalibrator::default());
    if let Some(history) = &config.history {
        seed_calibrator(&calibrator, &history.database, &history.query)?;
    }
    Ok(SiteScorer::new(calibrator))
}

#[cfg(feature = "store-sqlite")]
fn seed_calibrator(
    calibrator: &RegionalCalibrator,
    database: &Utf8Path,
    query: &HistoryQuery,
) -> Result<usize, CliError> {
    let history = sitescore_scorer::SqliteHistory::open(database)?;
    Ok(calibrator.seed_from(&history, query)?)
}

#[cfg(not(feature = "store-sqlite"))]
fn seed_calibrator(
    _calibrator: &RegionalCalibrator,
    _database: &Utf8Path,
    _query: &HistoryQuery,
) -> Result<usize, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "seeding calibration from --history-db",
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ScoreConfig, CliError> {
    let merged = ScoreArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ScoreConfig::try_from(merged)
}
