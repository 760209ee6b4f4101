//! One-at-a-time sensitivity study tests.
//!
//! Covers ordering, failure isolation, thread-count independence and the
//! direction of the parameter/KPI correlations.

use cho_fermentation_sim::{
    analysis::{Kpi, SensitivityRunner, SweepParameter},
    config::{ParameterSet, ValidationError},
};

fn mu_max_study() -> SensitivityRunner {
    SensitivityRunner::new(ParameterSet::reference()).sweep(SweepParameter::MuMax, vec![0.02, 0.035, 0.05])
}

#[test]
fn test_higher_mu_max_raises_peak_density() {
    let result = mu_max_study().run();
    assert_eq!(result.completed().count(), 3);

    let peaks = result.kpi_series(SweepParameter::MuMax, Kpi::PeakViableDensity);
    for pair in peaks.windows(2) {
        assert!(
            pair[1].1 > pair[0].1,
            "peak Xv should rise with mu_max: {:?} -> {:?}",
            pair[0],
            pair[1]
        );
    }

    let r = result
        .correlation(SweepParameter::MuMax, Kpi::PeakViableDensity)
        .expect("correlation should be defined for three distinct runs");
    assert!(r > 0.5, "mu_max vs peak density should correlate positively, got {}", r);

    let r_titer = result.correlation(SweepParameter::MuMax, Kpi::FinalTiter).unwrap();
    assert!(r_titer > 0.9, "faster growth gives more titer, got {}", r_titer);
}

#[test]
fn test_failed_overrides_are_recorded_without_aborting() {
    let result = SensitivityRunner::new(ParameterSet::reference())
        .sweep(SweepParameter::Yxs, vec![1.0e8, -1.0, 3.0e8])
        .sweep(SweepParameter::Temperature, vec![60.0, 36.0])
        .run();

    assert_eq!(result.runs.len(), 5, "every override must produce a run");
    assert_eq!(result.failures().count(), 2);
    assert_eq!(result.completed().count(), 3);

    match result.runs[1].error() {
        Some(ValidationError::NonPositive { field, value }) => {
            assert_eq!(*field, "Yxs");
            assert_eq!(*value, -1.0);
        }
        other => panic!("expected a NonPositive Yxs error, got {:?}", other),
    }
    assert!(matches!(
        result.runs[3].error(),
        Some(ValidationError::OutOfRange { field: "temperature", .. })
    ));
}

#[test]
fn test_runs_follow_declaration_order() {
    let result = SensitivityRunner::new(ParameterSet::reference())
        .sweep(SweepParameter::Ph, vec![7.3, 6.9])
        .sweep(SweepParameter::KdBase, vec![0.004, 0.001, 0.002])
        .run();

    let order: Vec<(SweepParameter, f64)> = result
        .runs
        .iter()
        .map(|run| (run.override_.parameter, run.override_.value))
        .collect();
    assert_eq!(
        order,
        vec![
            (SweepParameter::Ph, 7.3),
            (SweepParameter::Ph, 6.9),
            (SweepParameter::KdBase, 0.004),
            (SweepParameter::KdBase, 0.001),
            (SweepParameter::KdBase, 0.002),
        ]
    );

    // Only the swept field differs from the base
    for run in &result.runs {
        assert_eq!(
            run.override_.parameter.value_of(&run.parameters),
            Some(run.override_.value)
        );
        assert_eq!(run.parameters.kinetics.mu_max_per_h, 0.035);
    }
}

#[test]
fn test_thread_count_does_not_change_results() {
    let serial = mu_max_study().with_threads(1).run();
    let parallel = mu_max_study().with_threads(4).run();
    let global = mu_max_study().run();
    assert_eq!(serial, parallel, "results must not depend on worker count");
    assert_eq!(serial, global);
}

#[test]
fn test_kpi_matrix_is_symmetric_with_unit_diagonal() {
    let result = mu_max_study().run();
    let matrix = &result.kpi_kpi;
    assert_eq!(matrix.rows, matrix.columns);

    let diagonal = matrix
        .get("peak_viable_density", "peak_viable_density")
        .expect("peak density varies across runs");
    assert!((diagonal - 1.0).abs() < 1e-9);

    for (i, row) in matrix.values.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            assert_eq!(*value, matrix.values[j][i], "matrix must be symmetric at ({}, {})", i, j);
        }
    }
}

#[test]
fn test_single_run_sweep_has_undefined_correlations() {
    let result = SensitivityRunner::new(ParameterSet::reference())
        .sweep(SweepParameter::Qp, vec![2.0e-10])
        .run();
    assert_eq!(result.completed().count(), 1);
    assert_eq!(result.correlation(SweepParameter::Qp, Kpi::FinalTiter), None);
}

#[test]
fn test_empty_study() {
    let result = SensitivityRunner::new(ParameterSet::reference()).run();
    assert!(result.runs.is_empty());
    assert!(result.parameter_kpi.is_empty());
}
