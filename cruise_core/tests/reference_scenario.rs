//! End-to-end checks of the reference cruise control scenario

use approx::assert_relative_eq;
use cruise_core::{
    run_sweep, Rk4, Saturation, ScenarioConfig, SimError, Solver, TimeSeries, TrackingMetrics,
};

fn reference_series() -> TimeSeries {
    ScenarioConfig::default().build().unwrap().run().unwrap()
}

#[test]
fn reference_run_tracks_every_segment() {
    let series = reference_series();
    let metrics = TrackingMetrics::from_series(&series);

    let starts: Vec<usize> = metrics.segments.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0, 51, 101, 151, 201]);
    assert_eq!(metrics.segments.last().unwrap().end, 300);

    for segment in &metrics.segments {
        assert!(
            segment.final_error.abs() < 1.0,
            "segment at {} ended {} m/s off target",
            segment.start,
            segment.final_error
        );
    }

    let per_segment: usize = metrics.segments.iter().map(|s| s.saturated_steps).sum();
    assert_eq!(per_segment, metrics.saturated_steps);
    assert!(metrics.saturated_steps >= 2);
}

#[test]
fn reference_run_saturates_both_bounds() {
    let series = reference_series();

    assert!(series.saturation.contains(&Saturation::Upper));
    assert!(series.saturation.contains(&Saturation::Lower));
    assert!(series.command.iter().all(|u| (-50.0..=100.0).contains(u)));
}

#[test]
fn scenario_file_round_trip_reproduces_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reference.toml");
    let text = ScenarioConfig::default().to_toml_string().unwrap();
    std::fs::write(&path, text).unwrap();

    let loaded = ScenarioConfig::load(&path).unwrap();
    let series = loaded.build().unwrap().run().unwrap();
    assert_eq!(series, reference_series());
}

#[test]
fn csv_export_has_one_row_per_time_point() {
    let series = reference_series();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("series.csv");

    series.export_csv(&path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["time", "setpoint", "velocity", "error", "integral", "command", "saturation"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 301);
    assert_eq!(&rows[1][6], "upper");

    let final_velocity: f64 = rows[300][2].parse().unwrap();
    assert_relative_eq!(final_velocity, series.velocity[300]);
}

#[test]
fn fixed_step_solver_matches_adaptive() {
    let mut config = ScenarioConfig::default();
    config.solver = Solver::Rk4(Rk4::new(20));
    let fixed = config.build().unwrap().run().unwrap();
    let adaptive = reference_series();

    for (a, b) in adaptive.velocity.iter().zip(&fixed.velocity) {
        assert_relative_eq!(*a, *b, epsilon = 1e-4);
    }
}

#[test]
fn sweep_reports_failures_per_scenario() {
    let mut bad_schedule = ScenarioConfig::default();
    bad_schedule.clock.nsteps = 101;

    let results = run_sweep(&[ScenarioConfig::default(), bad_schedule]);
    assert_eq!(results[0].as_ref().unwrap(), &reference_series());
    assert!(matches!(results[1], Err(SimError::Config(_))));
}

#[test]
fn bundled_scenarios_load() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../scenarios");

    let reference = ScenarioConfig::load(&dir.join("reference.toml")).unwrap();
    assert_eq!(reference, ScenarioConfig::default());

    let heavy = ScenarioConfig::load(&dir.join("heavy_rk4.toml")).unwrap();
    assert_eq!(heavy.solver, Solver::Rk4(Rk4::new(20)));
    let series = heavy.build().unwrap().run().unwrap();
    assert_eq!(series.len(), 301);
    assert_eq!(series.setpoint[121], 30.0);
}
