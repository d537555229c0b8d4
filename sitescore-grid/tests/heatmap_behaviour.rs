//! Behavioural coverage for polygon rasterisation and heatmap aggregation.

use std::cell::{Cell, RefCell};

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sitescore_core::SiteMeasurements;
use sitescore_grid::{CellStrategy, HeatmapEngine, HeatmapResult, SitePolygon};
use sitescore_scorer::SiteScorer;

const JAIPUR: Coord<f64> = Coord { x: 75.8, y: 26.9 };

/// Polygon under test.
#[fixture]
pub fn polygon() -> RefCell<Option<SitePolygon>> {
    RefCell::new(None)
}

/// Strategy used for every cell.
#[fixture]
pub fn strategy() -> Cell<CellStrategy> {
    Cell::new(CellStrategy::FastEstimate)
}

/// Outcome of the heatmap computation.
#[fixture]
pub fn heatmap() -> RefCell<Option<HeatmapResult>> {
    RefCell::new(None)
}

fn store(polygon: &RefCell<Option<SitePolygon>>, vertices: Vec<Coord<f64>>) {
    let built = SitePolygon::new(vertices)
        .unwrap_or_else(|err| panic!("scenario polygons must be valid: {err}"));
    *polygon.borrow_mut() = Some(built);
}

#[given("a triangle with legs of {legs} degrees at the origin")]
fn origin_triangle(legs: f64, polygon: &RefCell<Option<SitePolygon>>) {
    store(
        polygon,
        vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.0, y: legs },
            Coord { x: legs, y: 0.0 },
        ],
    );
}

#[given("a square field {side} degrees wide near Jaipur")]
#[expect(clippy::float_arithmetic, reason = "corners are offsets from Jaipur")]
fn square_field(side: f64, polygon: &RefCell<Option<SitePolygon>>) {
    store(
        polygon,
        vec![
            JAIPUR,
            Coord { x: JAIPUR.x + side, y: JAIPUR.y },
            Coord { x: JAIPUR.x + side, y: JAIPUR.y + side },
            Coord { x: JAIPUR.x, y: JAIPUR.y + side },
        ],
    );
}

#[given("cells are fully recomputed")]
fn fully_recomputed(strategy: &Cell<CellStrategy>) {
    strategy.set(CellStrategy::FullRecompute);
}

#[when("a heatmap is computed with {cell_size} metre cells")]
fn compute(
    cell_size: f64,
    polygon: &RefCell<Option<SitePolygon>>,
    strategy: &Cell<CellStrategy>,
    heatmap: &RefCell<Option<HeatmapResult>>,
) {
    let site = SiteMeasurements::new(5.8, 4.0, 320.0)
        .with_cloud_cover(22.0)
        .with_slope(1.0)
        .with_grid_distance(10.0);
    let engine = HeatmapEngine::new(SiteScorer::without_calibration()).with_strategy(strategy.get());
    let result = match polygon.borrow().as_ref() {
        Some(shape) => engine.compute(shape, &site, cell_size),
        None => panic!("a polygon must be given first"),
    };
    *heatmap.borrow_mut() = Some(result);
}

fn computed(heatmap: &RefCell<Option<HeatmapResult>>) -> HeatmapResult {
    heatmap
        .borrow()
        .clone()
        .unwrap_or_else(|| panic!("a heatmap must be computed first"))
}

#[then("at least {count} cell is produced")]
fn at_least(count: usize, heatmap: &RefCell<Option<HeatmapResult>>) {
    assert!(computed(heatmap).cells.len() >= count);
}

#[then("no more than {count} cells are produced")]
fn at_most(count: usize, heatmap: &RefCell<Option<HeatmapResult>>) {
    let cells = computed(heatmap).cells.len();
    assert!(cells <= count, "{cells} cells");
}

#[then("the cells are ordered best first")]
fn ordered(heatmap: &RefCell<Option<HeatmapResult>>) {
    let result = computed(heatmap);
    let scores: Vec<u8> = result.cells.iter().map(|cell| cell.score()).collect();
    assert!(scores.windows(2).all(|pair| matches!(pair, [first, second] if first >= second)));
}

#[then("the resolution is coarser than {metres} metres")]
fn coarser(metres: f64, heatmap: &RefCell<Option<HeatmapResult>>) {
    assert!(computed(heatmap).resolution_m > metres);
}

#[then("the optimal cell is the first cell")]
fn optimal_first(heatmap: &RefCell<Option<HeatmapResult>>) {
    let result = computed(heatmap);
    let (Some(first), Some(optimal)) = (result.cells.first(), result.optimal.as_ref()) else {
        panic!("heatmap must hold at least one cell");
    };
    assert_eq!(first.location, optimal.location);
    assert_eq!(first.score(), optimal.score);
}

#[scenario(path = "tests/features/heatmap.feature", index = 0)]
fn tiny_triangle(
    polygon: RefCell<Option<SitePolygon>>,
    strategy: Cell<CellStrategy>,
    heatmap: RefCell<Option<HeatmapResult>>,
) {
    let _ = (polygon, strategy, heatmap);
}

#[scenario(path = "tests/features/heatmap.feature", index = 1)]
fn large_field(
    polygon: RefCell<Option<SitePolygon>>,
    strategy: Cell<CellStrategy>,
    heatmap: RefCell<Option<HeatmapResult>>,
) {
    let _ = (polygon, strategy, heatmap);
}

#[scenario(path = "tests/features/heatmap.feature", index = 2)]
fn full_recompute(
    polygon: RefCell<Option<SitePolygon>>,
    strategy: Cell<CellStrategy>,
    heatmap: RefCell<Option<HeatmapResult>>,
) {
    let _ = (polygon, strategy, heatmap);
}
