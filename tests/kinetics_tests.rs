//! Rate-equation tests for the growth, death, substrate and product terms.
//!
//! Checks the boundary behaviour of the Monod/Haldane substrate terms and the
//! derivative vector at hand-computable states.

#![allow(non_snake_case)]

use cho_fermentation_sim::{
    bioprocess::{haldane, haldane_optimum, monod, KineticModel},
    config::{DeathCoupling, ParameterSet, SimulationParameters},
    state::SimulationState,
};

fn params_with(configure: impl FnOnce(&mut SimulationParameters)) -> ParameterSet {
    let mut raw = SimulationParameters::default();
    configure(&mut raw);
    ParameterSet::new(raw).expect("test parameters should validate")
}

fn state(Xv: f64, S: f64) -> SimulationState {
    SimulationState {
        time_h: 0.0,
        Xv,
        Xd: 0.0,
        S,
        P: 0.0,
    }
}

// ============================================================================
// Substrate Terms
// ============================================================================

#[test]
fn test_monod_is_monotone_and_saturating() {
    let ks = 0.5;
    let mut previous = monod(0.0, ks);
    assert_eq!(previous, 0.0, "Monod term must vanish without substrate");

    for i in 1..=200 {
        let s = i as f64 * 0.1;
        let value = monod(s, ks);
        assert!(
            value > previous,
            "Monod term should increase with substrate: f({}) = {} <= {}",
            s,
            value,
            previous
        );
        assert!(value < 1.0, "Monod term must stay below 1, got {}", value);
        previous = value;
    }

    assert!(
        (monod(ks, ks) - 0.5).abs() < 1e-12,
        "Monod term at S = Ks should be one half"
    );
}

#[test]
fn test_haldane_peaks_at_optimum() {
    let (ks, ki) = (0.5, 8.0);
    let s_opt = haldane_optimum(ks, ki);
    assert!((s_opt - 2.0).abs() < 1e-12, "sqrt(0.5 * 8) should be 2, got {}", s_opt);

    let peak = haldane(s_opt, ks, ki);
    for &s in &[0.5, 1.0, 1.9, 2.1, 4.0, 10.0, 50.0] {
        assert!(
            haldane(s, ks, ki) < peak,
            "Haldane term at S = {} should be below the peak at S = {}",
            s,
            s_opt
        );
    }

    // Strictly decreasing beyond the optimum
    let mut previous = peak;
    for i in 1..=50 {
        let s = s_opt + i as f64 * 0.5;
        let value = haldane(s, ks, ki);
        assert!(value < previous, "Haldane term should decrease beyond optimum at S = {}", s);
        previous = value;
    }
}

#[test]
fn test_substrate_terms_reject_non_positive_substrate() {
    for &s in &[0.0, -1e-12, -3.0] {
        assert_eq!(monod(s, 0.5), 0.0, "Monod term must be 0 at S = {}", s);
        assert_eq!(haldane(s, 0.5, 8.0), 0.0, "Haldane term must be 0 at S = {}", s);
    }
}

// ============================================================================
// Derivatives
// ============================================================================

#[test]
fn test_zero_substrate_stops_growth_but_not_production() {
    for ki in [None, Some(8.0)] {
        let params = params_with(|p| p.kinetics.Ki = ki);
        let model = KineticModel::new(&params);
        let rates = model.rates(&state(1.0e6, 0.0), 1.0);

        assert_eq!(rates.mu_per_h, 0.0, "mu must be 0 without substrate (Ki = {:?})", ki);
        assert_eq!(rates.dS_dt, 0.0, "no substrate uptake without growth (Ki = {:?})", ki);
        assert!(
            (rates.dP_dt - 1.0e-10 * 1.0e6).abs() < 1e-18,
            "product formation is growth-independent: expected qp * Xv, got {}",
            rates.dP_dt
        );
        assert!(
            rates.dXv_dt < 0.0,
            "viable cells should only die without substrate, got dXv/dt = {}",
            rates.dXv_dt
        );
    }
}

#[test]
fn test_mass_balance_between_viable_and_dead() {
    let params = ParameterSet::reference();
    let model = KineticModel::new(&params);
    let rates = model.rates(&state(2.0e6, 3.0), 0.8);

    // dXv/dt + dXd/dt is exactly the growth term
    let growth = rates.mu_per_h * 2.0e6;
    assert!(
        (rates.dXv_dt + rates.dXd_dt - growth).abs() < 1e-6,
        "death should move cells from Xv to Xd without loss"
    );
    assert!(
        (rates.dS_dt + growth / 2.0e8).abs() < 1e-15,
        "substrate uptake should be growth / Yxs"
    );
}

#[test]
fn test_empty_culture_has_zero_rates() {
    let params = ParameterSet::reference();
    let rates = KineticModel::new(&params).rates(&state(0.0, 4.0), 1.0);
    assert_eq!(rates.dXv_dt, 0.0);
    assert_eq!(rates.dXd_dt, 0.0);
    assert_eq!(rates.dS_dt, 0.0);
    assert_eq!(rates.dP_dt, 0.0);
}

#[test]
fn test_death_coupling_variants() {
    let linear = params_with(|p| p.options.death_coupling = DeathCoupling::Linear);
    let reciprocal = params_with(|p| p.options.death_coupling = DeathCoupling::Reciprocal);
    let kd_base = 0.002;

    for &stress in &[1.0, 0.5, 0.1] {
        let kd_linear = KineticModel::new(&linear).specific_death_rate(stress);
        let kd_reciprocal = KineticModel::new(&reciprocal).specific_death_rate(stress);

        assert!(
            (kd_linear - kd_base * (2.0 - stress)).abs() < 1e-15,
            "linear coupling at stress {}: got {}",
            stress,
            kd_linear
        );
        assert!(
            (kd_reciprocal - kd_base / stress).abs() < 1e-12,
            "reciprocal coupling at stress {}: got {}",
            stress,
            kd_reciprocal
        );
        assert!(
            kd_reciprocal >= kd_linear - 1e-15,
            "reciprocal coupling is never milder than linear"
        );
    }
}

#[test]
fn test_stress_coupled_productivity() {
    let coupled = params_with(|p| p.options.product_stress_coupled = true);
    let model = KineticModel::new(&coupled);
    assert!((model.specific_productivity(0.25) - 0.25e-10).abs() < 1e-20);

    let uncoupled = ParameterSet::reference();
    let model = KineticModel::new(&uncoupled);
    assert_eq!(model.specific_productivity(0.25), 1.0e-10);
}
