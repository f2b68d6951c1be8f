use chrono::{DateTime, Duration, Offset, TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;
use glucochart::compositor::compute_subset;
use glucochart::core::basal::{effective_rate_breakpoints, project_basal_staircase};
use glucochart::core::projectors::project_glucose_dots;
use glucochart::core::{
    ChartLayout, CoordinateMapper, GlucoseSample, ScheduledBasalEntry, TempBasalOverride,
    TimeWindow, ValueBounds, Viewport,
};
use glucochart::{ChartInputs, GeometrySubset};
use std::hint::black_box;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("valid date")
}

fn dec(text: &str) -> Decimal {
    text.parse().expect("valid decimal")
}

fn day_of_samples() -> Vec<GlucoseSample> {
    (0..288i64)
        .map(|i| {
            let time = base() - Duration::days(1) + Duration::minutes(i * 5);
            let value = 120.0 + 40.0 * (i % 48) as f64 / 48.0;
            GlucoseSample::new(time, value).expect("valid generated sample")
        })
        .collect()
}

fn test_mapper() -> CoordinateMapper {
    CoordinateMapper::new(
        Viewport::new(1920, 1080, 5),
        ChartLayout::default(),
        ValueBounds::new(70.0, 450.0).expect("valid bounds"),
        (base() - Duration::days(1)).timestamp() as f64,
    )
    .expect("valid mapper")
}

fn bench_mapper_round_trip(c: &mut Criterion) {
    let mapper = test_mapper();
    let time = base().timestamp() as f64;

    c.bench_function("mapper_round_trip", |b| {
        b.iter(|| {
            let x = mapper.time_to_x(black_box(time));
            let y = mapper.value_to_y(black_box(142.5));
            let _ = mapper.x_to_time(x);
            let _ = mapper.y_to_value(y);
        })
    });
}

fn bench_basal_reconstruction_day(c: &mut Criterion) {
    let schedule: Vec<ScheduledBasalEntry> = (0..24)
        .map(|hour| {
            ScheduledBasalEntry::new(hour * 60, Decimal::new(i64::from(hour % 15) + 5, 1))
                .expect("valid generated entry")
        })
        .collect();
    let overrides: Vec<TempBasalOverride> = (0..48i64)
        .map(|i| {
            TempBasalOverride::new(
                base() - Duration::days(1) + Duration::minutes(i * 30),
                20.0,
                Decimal::new(i % 25, 1),
            )
            .expect("valid generated override")
        })
        .collect();
    let start = (base() - Duration::days(1)).timestamp() as f64;
    let window = TimeWindow::new(start, start + 108_000.0).expect("valid window");
    let mapper = test_mapper();
    let offset = Utc.fix();

    c.bench_function("basal_reconstruction_day", |b| {
        b.iter(|| {
            let breakpoints = effective_rate_breakpoints(
                black_box(&schedule),
                black_box(&overrides),
                black_box(window),
                offset,
            )
            .expect("reconstruction should succeed");
            let _ = project_basal_staircase(&breakpoints, window.end, &mapper, 2.5)
                .expect("projection should succeed");
        })
    });
}

fn bench_glucose_projection_288(c: &mut Criterion) {
    let samples = day_of_samples();
    let mapper = test_mapper();

    c.bench_function("glucose_projection_288", |b| {
        b.iter(|| {
            let _ = project_glucose_dots(black_box(&samples), black_box(&mapper));
        })
    });
}

fn bench_full_subset_compute(c: &mut Criterion) {
    let mut inputs = ChartInputs::new(base());
    inputs.glucose = day_of_samples();
    inputs.basal_profile = vec![
        ScheduledBasalEntry::new(0, dec("0.8")).expect("valid entry"),
        ScheduledBasalEntry::new(360, dec("1.0")).expect("valid entry"),
    ];
    inputs.max_basal = dec("2.0");
    let viewport = Viewport::new(1920, 1080, 5);
    let layout = ChartLayout::default();

    c.bench_function("full_subset_compute", |b| {
        b.iter(|| {
            for subset in GeometrySubset::ALL {
                let _ = compute_subset(black_box(subset), black_box(&inputs), viewport, layout)
                    .expect("computation should succeed");
            }
        })
    });
}

criterion_group!(
    benches,
    bench_mapper_round_trip,
    bench_basal_reconstruction_day,
    bench_glucose_projection_288,
    bench_full_subset_compute
);
criterion_main!(benches);
