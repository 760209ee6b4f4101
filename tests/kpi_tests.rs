//! KPI extraction tests against simulated batches.

use cho_fermentation_sim::{
    analysis::{calculate_kpis, Kpi, SimulationRun},
    bioprocess::simulate,
    config::{ParameterSet, SimulationParameters},
};

#[test]
fn test_kpis_are_a_pure_function_of_the_series() {
    let series = simulate(&ParameterSet::reference());
    let first = calculate_kpis(&series);
    let second = calculate_kpis(&series);
    assert_eq!(first, second, "repeated KPI extraction must agree");
}

#[test]
fn test_kpis_agree_with_series() {
    let run = SimulationRun::execute(ParameterSet::reference());
    let kpis = &run.kpis;
    let series = &run.series;

    let max_xv = series.viable_density().into_iter().fold(f64::MIN, f64::max);
    assert_eq!(kpis.peak_viable_density, max_xv, "peak must equal max Xv");

    let at_peak = series
        .iter()
        .find(|s| s.time_h == kpis.time_of_peak_h)
        .expect("peak time should be a sample time");
    assert_eq!(at_peak.Xv, kpis.peak_viable_density);

    assert_eq!(kpis.final_titer, series.final_state().P);
    assert!(
        (kpis.final_viability + kpis.final_dead_fraction - 1.0).abs() < 1e-12,
        "viability and dead fraction should sum to 1"
    );
    assert!(
        kpis.min_viability <= kpis.mean_viability && kpis.mean_viability <= 1.0,
        "min {} <= mean {} <= 1",
        kpis.min_viability,
        kpis.mean_viability
    );
    assert_eq!(kpis.clamped_intervals, 0);
}

#[test]
fn test_ivcd_is_bounded_by_peak_times_duration() {
    let run = SimulationRun::execute(ParameterSet::reference());
    let ivcd = run.kpis.get(Kpi::IntegralViableCellDensity);
    assert!(ivcd > 0.0);
    assert!(
        ivcd < run.kpis.peak_viable_density * 288.0,
        "IVCD {:.3e} cannot exceed peak × horizon",
        ivcd
    );
}

#[test]
fn test_product_yield_uses_consumed_substrate() {
    let run = SimulationRun::execute(ParameterSet::reference());
    let consumed = run.series.initial_state().S - run.series.final_state().S;
    let expected = run.series.final_state().P / consumed;
    assert!(
        (run.kpis.product_yield - expected).abs() < 1e-12 * expected.abs().max(1.0),
        "yield should be P_final / consumed substrate"
    );
}

#[test]
fn test_no_substrate_gives_zero_yield() {
    let mut raw = SimulationParameters::default();
    raw.initial.S0 = 0.0;
    let run = SimulationRun::execute(ParameterSet::new(raw).unwrap());

    assert_eq!(run.kpis.product_yield, 0.0, "no consumption means zero yield");
    assert!(run.kpis.final_titer > 0.0, "product still forms from seed cells");
    assert_eq!(run.kpis.time_of_peak_h, 0.0, "starving culture peaks at inoculation");
}

#[test]
fn test_named_kpis_follow_report_order() {
    let kpis = calculate_kpis(&simulate(&ParameterSet::reference()));
    let names: Vec<&str> = kpis.named().into_iter().map(|(name, _)| name).collect();
    let expected: Vec<&str> = Kpi::ALL.iter().map(|kpi| kpi.name()).collect();
    assert_eq!(names, expected);
}
