use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use glucochart::compositor::{SubsetGeometry, compute_subset};
use glucochart::core::{
    ChartLayout, DoseEvent, GlucoseSample, PredictionKind, PredictionSeries, ScheduledBasalEntry,
    TempTargetWindow, Viewport,
};
use glucochart::{ChartInputs, Compositor, GeometrySubset, SubsetState};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("valid date")
}

fn dec(text: &str) -> Decimal {
    text.parse().expect("valid decimal")
}

fn populated_inputs() -> ChartInputs {
    let mut inputs = ChartInputs::new(base());
    inputs.glucose = vec![
        GlucoseSample::new(base() - Duration::hours(2), 110.0).expect("valid sample"),
        GlucoseSample::new(base() - Duration::hours(1), 150.0).expect("valid sample"),
        GlucoseSample::new(base(), 130.0).expect("valid sample"),
    ];
    inputs.boluses = vec![
        DoseEvent::new(base() - Duration::minutes(90), dec("2.0")).expect("valid dose"),
    ];
    inputs.basal_profile = vec![
        ScheduledBasalEntry::new(0, dec("0.8")).expect("valid entry"),
        ScheduledBasalEntry::new(360, dec("1.0")).expect("valid entry"),
    ];
    inputs.temp_targets = vec![
        TempTargetWindow::new(base() - Duration::hours(1), 120.0, 90.0, 110.0)
            .expect("valid target"),
    ];
    inputs.predictions = Some(PredictionSeries {
        iob: vec![130.0, 135.0, 140.0],
        ..PredictionSeries::default()
    });
    inputs.delivered_at = Some(base());
    inputs.max_basal = dec("2.0");
    inputs
}

fn viewport() -> Viewport {
    Viewport::new(1000, 600, 5)
}

#[test]
fn subsets_start_idle_with_empty_geometry() {
    let compositor = Compositor::new(2);

    for subset in GeometrySubset::ALL {
        assert_eq!(compositor.state(subset), SubsetState::Idle);
        let published = compositor.current(subset);
        assert_eq!(published.seq, 0);
        assert_eq!(published.geometry, SubsetGeometry::Empty);
    }
}

#[test]
fn trigger_all_publishes_every_subset() {
    let compositor = Compositor::new(4);
    let inputs = Arc::new(populated_inputs());

    compositor.trigger_all(&inputs, viewport(), ChartLayout::default());
    compositor.wait_idle();

    for subset in GeometrySubset::ALL {
        assert_eq!(compositor.state(subset), SubsetState::Published);
        assert_eq!(compositor.current(subset).seq, 1);
    }

    let geometry = compositor.geometry();
    assert!(!geometry.basal().expect("basal published").effective_path.is_empty());
    assert!(!geometry.glucose().expect("glucose published").dots.is_empty());
    assert_eq!(geometry.boluses().expect("boluses published").len(), 1);
    assert_eq!(
        geometry.temp_target_bands().expect("bands published").len(),
        1
    );
    assert_eq!(
        geometry
            .predictions(PredictionKind::Iob)
            .expect("iob published")
            .len(),
        3
    );
    assert!(
        geometry
            .predictions(PredictionKind::Uam)
            .expect("uam published")
            .is_empty()
    );
}

#[test]
fn repeated_triggers_advance_the_sequence() {
    let compositor = Compositor::new(2);
    let inputs = Arc::new(populated_inputs());

    compositor.trigger(
        &[GeometrySubset::GlucoseDots],
        &inputs,
        viewport(),
        ChartLayout::default(),
    );
    compositor.trigger(
        &[GeometrySubset::GlucoseDots],
        &inputs,
        viewport(),
        ChartLayout::default(),
    );
    compositor.wait_idle();

    assert_eq!(compositor.current(GeometrySubset::GlucoseDots).seq, 2);
    // Untouched subsets keep their initial state.
    assert_eq!(compositor.state(GeometrySubset::BolusDots), SubsetState::Idle);
}

#[test]
fn degraded_inputs_publish_empty_geometry() {
    let compositor = Compositor::new(2);
    let mut inputs = populated_inputs();
    inputs.max_basal = Decimal::ZERO;
    let inputs = Arc::new(inputs);

    compositor.trigger(
        &[GeometrySubset::BasalPath],
        &inputs,
        viewport(),
        ChartLayout::default(),
    );
    compositor.wait_idle();

    let published = compositor.current(GeometrySubset::BasalPath);
    assert_eq!(published.seq, 1);
    assert_eq!(published.geometry, SubsetGeometry::Empty);
    assert_eq!(
        compositor.state(GeometrySubset::BasalPath),
        SubsetState::Published
    );
}

#[test]
fn empty_inputs_still_publish() {
    let compositor = Compositor::new(1);
    let inputs = Arc::new(ChartInputs::new(base()));

    compositor.trigger_all(&inputs, viewport(), ChartLayout::default());
    compositor.wait_idle();

    let basal = compositor.current(GeometrySubset::BasalPath);
    assert_eq!(
        basal.geometry,
        SubsetGeometry::Basal(glucochart::compositor::BasalGeometry::default())
    );

    let glucose = compositor.geometry();
    let glucose = glucose.glucose().expect("glucose published");
    assert!(glucose.dots.is_empty());
    assert!(!glucose.grid_line_ys.is_empty());
}

#[test]
fn snapshot_reads_are_stable_across_later_publishes() {
    let compositor = Compositor::new(2);
    let inputs = Arc::new(populated_inputs());

    compositor.trigger_all(&inputs, viewport(), ChartLayout::default());
    compositor.wait_idle();
    let before = compositor.geometry();

    let mut updated = populated_inputs();
    updated.glucose.push(
        GlucoseSample::new(base() + Duration::minutes(5), 125.0).expect("valid sample"),
    );
    let updated = Arc::new(updated);
    compositor.trigger_all(&updated, viewport(), ChartLayout::default());
    compositor.wait_idle();

    // The old bundle still reads the geometry captured at collection time.
    assert_eq!(
        before
            .subset(GeometrySubset::GlucoseDots)
            .expect("collected")
            .seq,
        1
    );
    assert_eq!(compositor.current(GeometrySubset::GlucoseDots).seq, 2);
    assert_eq!(
        before.glucose().expect("glucose published").dots.len(),
        3
    );
    assert_eq!(
        compositor
            .geometry()
            .glucose()
            .expect("glucose published")
            .dots
            .len(),
        4
    );
}

#[test]
fn compute_subset_is_deterministic() {
    let inputs = populated_inputs();

    let first = compute_subset(
        GeometrySubset::BasalPath,
        &inputs,
        viewport(),
        ChartLayout::default(),
    )
    .expect("computation");
    let second = compute_subset(
        GeometrySubset::BasalPath,
        &inputs,
        viewport(),
        ChartLayout::default(),
    )
    .expect("computation");

    assert_eq!(first, second);
}

#[test]
fn compute_subset_defaults_predictions_to_empty() {
    let mut inputs = populated_inputs();
    inputs.predictions = None;
    inputs.delivered_at = None;

    let geometry = compute_subset(
        GeometrySubset::PredictionDots(PredictionKind::Iob),
        &inputs,
        viewport(),
        ChartLayout::default(),
    )
    .expect("computation");

    assert_eq!(geometry, SubsetGeometry::PredictionDots(Vec::new()));
}

#[test]
fn invalid_viewport_fails_computation() {
    let inputs = populated_inputs();

    let result = compute_subset(
        GeometrySubset::GlucoseDots,
        &inputs,
        Viewport::new(0, 0, 0),
        ChartLayout::default(),
    );
    assert!(result.is_err());
}

#[test]
fn geometry_snapshot_serializes_with_subset_labels() {
    let compositor = Compositor::new(2);
    let inputs = Arc::new(populated_inputs());

    compositor.trigger_all(&inputs, viewport(), ChartLayout::default());
    compositor.wait_idle();

    let json = compositor
        .geometry()
        .to_json_pretty()
        .expect("serialization");
    assert!(json.contains("\"basal_path\""));
    assert!(json.contains("\"glucose_dots\""));
    assert!(json.contains("\"prediction_dots_uam\""));
}
