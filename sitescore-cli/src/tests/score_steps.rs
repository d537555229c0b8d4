//! Behaviour-driven step definitions driving the score CLI scenarios.

#[cfg(feature = "store-sqlite")]
use super::helpers::{DELHI, write_history};
use super::helpers::{Workspace, strong_site, weak_site, write_json, write_utf8};
use super::*;
use crate::score::run_score_with;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sitescore_core::ConstraintCode;
use sitescore_scorer::ScoreError;
use std::cell::RefCell;

#[derive(Debug)]
struct ScoreWorld {
    workspace: Workspace,
    request_path: Utf8PathBuf,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl ScoreWorld {
    fn new() -> Self {
        let workspace = Workspace::new();
        let request_path = workspace.path("site.json");
        Self {
            workspace,
            request_path,
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec![
            "sitescore".to_owned(),
            "score".to_owned(),
            self.request_path.as_str().to_owned(),
        ];
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn output(&self) -> serde_json::Value {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        if let Err(err) = result {
            panic!("expected success, found {err:?}");
        }
        serde_json::from_slice(&self.stdout.borrow()).expect("stdout should be JSON")
    }
}

#[fixture]
fn world() -> ScoreWorld {
    ScoreWorld::new()
}

#[given("a suitable site request exists on disk")]
fn suitable_site_request(#[from(world)] world: &ScoreWorld) {
    let site = serde_json::to_value(strong_site()).expect("site JSON");
    write_json(&world.request_path, &site);
}

#[given("an unsuitable site request exists on disk")]
fn unsuitable_site_request(#[from(world)] world: &ScoreWorld) {
    let site = serde_json::to_value(weak_site()).expect("site JSON");
    write_json(&world.request_path, &site);
}

#[given("a batch of {count} identical site requests exists on disk")]
fn batch_site_request(count: usize, #[from(world)] world: &ScoreWorld) {
    let site = serde_json::to_value(strong_site()).expect("site JSON");
    let batch = serde_json::Value::Array(vec![site; count]);
    write_json(&world.request_path, &batch);
}

#[given("the score request contains invalid JSON")]
fn invalid_score_request(#[from(world)] world: &ScoreWorld) {
    write_utf8(&world.request_path, b"{ not valid json");
}

#[cfg(feature = "store-sqlite")]
#[given("a history database records strong scores near the site")]
fn history_database(#[from(world)] world: &ScoreWorld) {
    let database = world.workspace.path("history.db");
    write_history(&database, DELHI, 90.0, 10);
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_HISTORY_DB}"), database.as_str().to_owned()]);
}

#[given("strict scoring is enabled")]
fn strict_scoring(#[from(world)] world: &ScoreWorld) {
    world.cli_args.borrow_mut().push(format!("--{ARG_STRICT}"));
}

#[when("I run the score command")]
fn run_score_command(#[from(world)] world: &ScoreWorld) {
    let parsed = Cli::try_parse_from(world.build_command_line()).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Score(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_score_with(args, &mut *buffer)
        }
        other => panic!("expected score command, found {other:?}"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command prints an A+ score without calibration")]
fn prints_uncalibrated_grade(#[from(world)] world: &ScoreWorld) {
    let output = world.output();
    assert_eq!(output["grade"], "A+");
    assert_eq!(output["is_suitable"], true);
    assert_eq!(output["calibration_adjustment"].as_f64(), Some(0.0));
    assert_eq!(output["regional_stats"]["samples"], 1);
}

#[then("the score carries the regional calibration adjustment")]
fn carries_calibration(#[from(world)] world: &ScoreWorld) {
    let output = world.output();
    let adjustment = output["calibration_adjustment"]
        .as_f64()
        .expect("adjustment is a number");
    assert!((adjustment - 2.0).abs() < 0.011, "adjustment {adjustment}");
    assert_eq!(output["regional_stats"]["samples"], 11);
    let raw = output["raw_score"].as_u64().expect("raw score");
    let score = output["score"].as_u64().expect("score");
    assert_eq!(score, raw.saturating_add(2).min(100));
}

#[then("the output lists {count} results calibrated in order")]
fn batch_results(count: usize, #[from(world)] world: &ScoreWorld) {
    let output = world.output();
    let results = output.as_array().expect("batch output is an array");
    assert_eq!(results.len(), count);
    for (index, result) in results.iter().enumerate() {
        assert_eq!(
            result["regional_stats"]["samples"].as_u64(),
            u64::try_from(index.saturating_add(1)).ok()
        );
    }
}

#[then("the command fails with the violated constraints")]
fn fails_with_violations(#[from(world)] world: &ScoreWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::Rejected(ScoreError::Rejected { violations }) => {
            assert!(
                violations
                    .iter()
                    .any(|violation| violation.code == ConstraintCode::LowIrradiance),
                "violations {violations:?}"
            );
        }
        other => panic!("expected Rejected, found {other:?}"),
    }
    assert!(world.stdout.borrow().is_empty());
}

#[then("the command fails because the request JSON is invalid")]
fn fails_invalid_json(#[from(world)] world: &ScoreWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::ParseRequest { path, .. } => assert_eq!(*path, world.request_path),
        other => panic!("expected ParseRequest, found {other:?}"),
    }
}

macro_rules! register_score_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/score_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: ScoreWorld) {
            let _ = world;
        }
    };
}

register_score_scenario!(scoring_single_site, "scoring a single site");
register_score_scenario!(scoring_batch, "scoring a batch of sites");
#[cfg(feature = "store-sqlite")]
register_score_scenario!(
    seeding_from_history,
    "seeding calibration from a history database"
);
register_score_scenario!(strict_rejection, "strict scoring rejects an unsuitable site");
register_score_scenario!(malformed_request, "rejecting a malformed score request");
