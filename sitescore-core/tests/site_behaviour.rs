//! Behavioural coverage for factor scoring and the constraint filter.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sitescore_core::{
    ConstraintCode, ConstraintReport, FactorScores, SiteMeasurements, check_constraints,
    score_factors,
};

/// Measurements under test, mutated by `Given` steps.
#[fixture]
pub fn site() -> RefCell<SiteMeasurements> {
    RefCell::new(SiteMeasurements::new(5.5, 3.5, 600.0))
}

/// Outcome of the constraint filter.
#[fixture]
pub fn report() -> RefCell<Option<ConstraintReport>> {
    RefCell::new(None)
}

/// Outcome of factor scoring.
#[fixture]
pub fn factors() -> RefCell<Option<FactorScores>> {
    RefCell::new(None)
}

#[given("a well-placed site")]
fn well_placed(site: &RefCell<SiteMeasurements>) {
    *site.borrow_mut() = SiteMeasurements::new(5.5, 3.5, 600.0)
        .with_temperature(22.0)
        .with_cloud_cover(30.0)
        .with_slope(2.0)
        .with_grid_distance(5.0)
        .with_plant_capacity(10.0)
        .with_available_area(200.0);
}

#[given("the solar irradiance drops to {value}")]
fn irradiance_drops(value: f64, site: &RefCell<SiteMeasurements>) {
    site.borrow_mut().solar_irradiance = value;
}

#[given("the slope rises to {value}")]
fn slope_rises(value: f64, site: &RefCell<SiteMeasurements>) {
    site.borrow_mut().slope_deg = Some(value);
}

#[given("the plant capacity grows to {value}")]
fn plant_grows(value: f64, site: &RefCell<SiteMeasurements>) {
    site.borrow_mut().plant_capacity_kw = Some(value);
}

#[given("the cloud cover rises to {value}")]
fn cloud_rises(value: f64, site: &RefCell<SiteMeasurements>) {
    site.borrow_mut().cloud_cover_pct = Some(value);
}

#[when("the constraints are checked")]
fn check(site: &RefCell<SiteMeasurements>, report: &RefCell<Option<ConstraintReport>>) {
    *report.borrow_mut() = Some(check_constraints(&site.borrow().resolve()));
}

#[when("the factors are scored")]
fn score(site: &RefCell<SiteMeasurements>, factors: &RefCell<Option<FactorScores>>) {
    *factors.borrow_mut() = Some(score_factors(&site.borrow().resolve()));
}

fn recorded_report(report: &RefCell<Option<ConstraintReport>>) -> ConstraintReport {
    report
        .borrow()
        .clone()
        .unwrap_or_else(|| panic!("constraints must be checked first"))
}

fn recorded_factors(factors: &RefCell<Option<FactorScores>>) -> FactorScores {
    factors
        .borrow()
        .unwrap_or_else(|| panic!("factors must be scored first"))
}

#[then("the site is suitable")]
fn suitable(report: &RefCell<Option<ConstraintReport>>) {
    let outcome = recorded_report(report);
    assert!(outcome.is_suitable(), "{:?}", outcome.violations);
}

#[then("{count} violation is reported")]
fn one_violation(count: usize, report: &RefCell<Option<ConstraintReport>>) {
    assert_eq!(recorded_report(report).violations.len(), count);
}

#[then("{count} violations are reported")]
fn many_violations(count: usize, report: &RefCell<Option<ConstraintReport>>) {
    assert_eq!(recorded_report(report).violations.len(), count);
}

#[then("the violation concerns low irradiance")]
fn concerns_irradiance(report: &RefCell<Option<ConstraintReport>>) {
    let outcome = recorded_report(report);
    assert!(outcome.contains(ConstraintCode::LowIrradiance));
    let Some(violation) = outcome.violations.first() else {
        panic!("a violation must be present");
    };
    assert!(violation.reason.contains("Solar irradiance"));
}

#[then("the solar factor is {expected}")]
fn solar_is(expected: f64, factors: &RefCell<Option<FactorScores>>) {
    assert_eq!(recorded_factors(factors).solar, expected);
}

#[then("the wind factor is {expected}")]
fn wind_is(expected: f64, factors: &RefCell<Option<FactorScores>>) {
    assert_eq!(recorded_factors(factors).wind, expected);
}

#[then("the slope factor is {expected}")]
fn slope_is(expected: f64, factors: &RefCell<Option<FactorScores>>) {
    assert_eq!(recorded_factors(factors).slope, expected);
}

#[then("the cloud factor is below {limit}")]
fn cloud_below(limit: f64, factors: &RefCell<Option<FactorScores>>) {
    let cloud = recorded_factors(factors).cloud;
    assert!(cloud < limit, "cloud factor {cloud}");
}

#[scenario(path = "tests/features/constraints.feature", index = 0)]
fn well_placed_site_passes(
    site: RefCell<SiteMeasurements>,
    report: RefCell<Option<ConstraintReport>>,
) {
    let _ = (site, report);
}

#[scenario(path = "tests/features/constraints.feature", index = 1)]
fn weak_irradiance_is_flagged(
    site: RefCell<SiteMeasurements>,
    report: RefCell<Option<ConstraintReport>>,
) {
    let _ = (site, report);
}

#[scenario(path = "tests/features/constraints.feature", index = 2)]
fn cramped_steep_site_breaches_two(
    site: RefCell<SiteMeasurements>,
    report: RefCell<Option<ConstraintReport>>,
) {
    let _ = (site, report);
}

#[scenario(path = "tests/features/factors.feature", index = 0)]
fn reference_site_peaks(site: RefCell<SiteMeasurements>, factors: RefCell<Option<FactorScores>>) {
    let _ = (site, factors);
}

#[scenario(path = "tests/features/factors.feature", index = 1)]
fn heavy_cloud_depresses_cloud(
    site: RefCell<SiteMeasurements>,
    factors: RefCell<Option<FactorScores>>,
) {
    let _ = (site, factors);
}
