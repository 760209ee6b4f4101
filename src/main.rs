//! CHO Fermentation Simulator - Entry point
//!
//! CLI Usage:
//!   cargo run                                        # Reference batch, KPI summary
//!   cargo run -- -p data/parameters/reference.json   # Batch from a parameter file
//!   cargo run -- -s mu_max=0.02,0.035,0.05           # One-at-a-time sensitivity sweep
//!   cargo run -- --shift temperature=33@72 -o exports

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use cho_fermentation_sim::{
    analysis::{Kpi, ParameterSweep, SensitivityRunner, SimulationRun, SweepParameter},
    bioprocess::{EnvironmentReadings, StepShiftProfile, StressModel},
    config::{EnvironmentalFactor, ParameterSet, SimulationParameters},
    export,
};

/// Parsed command-line options
#[derive(Debug, Default)]
struct CliOptions {
    params_path: Option<PathBuf>,
    sweeps: Vec<ParameterSweep>,
    shift: Option<(EnvironmentalFactor, f64, f64)>,
    export_dir: Option<PathBuf>,
    threads: Option<usize>,
}

fn print_help() {
    println!("CHO Fermentation Simulator");
    println!();
    println!("Usage: cho-fermentation-sim [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -p, --params FILE          Load parameters from a JSON file");
    println!("  -s, --sweep NAME=V1,V2,..  Add a one-at-a-time sweep (repeatable)");
    println!("      --shift FACTOR=V@H     Step an environmental factor to V at hour H");
    println!("  -o, --export DIR           Write CSV/JSON results into DIR");
    println!("  -j, --threads N            Worker threads for sensitivity runs");
    println!("  --help, -h                 Show this help");
    println!();
    println!("Sweep parameters:");
    let names: Vec<&str> = SweepParameter::ALL.iter().map(|p| p.name()).collect();
    println!("  {}", names.join(", "));
}

/// Parse `NAME=V1,V2,...`
fn parse_sweep(arg: &str) -> Result<ParameterSweep> {
    let (name, values) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("sweep '{}' must look like NAME=V1,V2", arg))?;
    let parameter: SweepParameter = name.parse()?;
    let values = values
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid value '{}' in sweep {}", v, name))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ParameterSweep::new(parameter, values))
}

/// Parse `FACTOR=VALUE@HOUR`
fn parse_shift(arg: &str) -> Result<(EnvironmentalFactor, f64, f64)> {
    let (name, rest) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("shift '{}' must look like FACTOR=VALUE@HOUR", arg))?;
    let (value, hour) = rest
        .split_once('@')
        .ok_or_else(|| anyhow!("shift '{}' is missing @HOUR", arg))?;
    let factor = EnvironmentalFactor::ALL
        .into_iter()
        .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| anyhow!("unknown environmental factor '{}'", name))?;
    Ok((factor, value.trim().parse()?, hour.trim().parse()?))
}

/// Parse CLI arguments
fn parse_args() -> Result<CliOptions> {
    let args: Vec<String> = std::env::args().collect();
    let mut options = CliOptions::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || -> Result<String> {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| anyhow!("{} expects a value", flag))
        };
        match flag {
            "-p" | "--params" => options.params_path = Some(PathBuf::from(value()?)),
            "-s" | "--sweep" => options.sweeps.push(parse_sweep(&value()?)?),
            "--shift" => options.shift = Some(parse_shift(&value()?)?),
            "-o" | "--export" => options.export_dir = Some(PathBuf::from(value()?)),
            "-j" | "--threads" => options.threads = Some(value()?.parse()?),
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => bail!("unknown argument '{}' (try --help)", other),
        }
        i += 1;
    }

    Ok(options)
}

fn print_parameters(params: &ParameterSet) {
    let k = params.kinetics();
    println!("Kinetics:");
    println!("  mu_max  = {:.4} 1/h", k.mu_max_per_h);
    println!("  Ks      = {:.3}", k.Ks);
    match k.Ki {
        Some(ki) => println!("  Ki      = {:.3} (Haldane)", ki),
        None => println!("  Ki      = none (Monod)"),
    }
    println!("  kd_base = {:.4} 1/h", k.kd_base_per_h);
    println!("  Yxs     = {:.3e} cells/unit", k.Yxs);
    println!("  qp      = {:.3e} units/cell/h", k.qp);

    let stress = StressModel::new(params)
        .evaluate(&EnvironmentReadings::from_setpoints(params.environment()));
    println!("Environment:");
    for factor in EnvironmentalFactor::ALL {
        let sp = params.environment().get(factor);
        println!(
            "  {:<17} {:>7.2} (optimum {:.2}, σ {:.2}) score {:.3}",
            factor.name(),
            sp.current_value,
            sp.optimum,
            sp.tolerance_width,
            stress.score(factor)
        );
    }
    println!(
        "  combined stress multiplier {:.4} (limited by {})",
        stress.combined,
        stress.dominant_factor().name()
    );
}

fn print_run(run: &SimulationRun) {
    println!("\n=== KPIs ===");
    for kpi in Kpi::ALL {
        println!("  {:<45} {:>12.4e}", kpi.label(), run.kpis.get(kpi));
    }

    let anomalies = run.series.anomalies();
    if anomalies.is_empty() {
        println!("\n✓ No negative overshoot; trajectory is untruncated");
    } else {
        println!(
            "\n⚠️  {} interval(s) clamped at zero, first at t = {} h",
            anomalies.len(),
            anomalies[0].time_h
        );
    }
}

fn run_sensitivity(options: &CliOptions, params: &ParameterSet) -> Result<()> {
    let mut runner = SensitivityRunner::new(params.clone()).with_sweeps(options.sweeps.clone());
    if let Some(threads) = options.threads {
        runner = runner.with_threads(threads);
    }

    let start_time = Instant::now();
    let result = runner.run();
    println!("\n=== Sensitivity study ({:.2?}) ===", start_time.elapsed());

    println!(
        "  {:<24} {:>10} {:>14} {:>14} {:>10}",
        "parameter", "value", "peak Xv", "final titer", "viability"
    );
    for run in &result.runs {
        match run.kpis() {
            Some(kpis) => println!(
                "  {:<24} {:>10.4} {:>14.4e} {:>14.4e} {:>10.3}",
                run.override_.parameter.name(),
                run.override_.value,
                kpis.peak_viable_density,
                kpis.final_titer,
                kpis.final_viability
            ),
            None => println!(
                "  {:<24} {:>10.4} rejected: {}",
                run.override_.parameter.name(),
                run.override_.value,
                run.error().map(ToString::to_string).unwrap_or_default()
            ),
        }
    }

    println!("\nParameter × KPI correlation:");
    let matrix = &result.parameter_kpi;
    for (row, values) in matrix.rows.iter().zip(&matrix.values) {
        let cells: Vec<String> = values
            .iter()
            .map(|v| v.map(|r| format!("{:+.2}", r)).unwrap_or_else(|| "  n/a".to_string()))
            .collect();
        println!("  {:<24} {}", row, cells.join(" "));
    }
    println!("  columns: {}", matrix.columns.join(", "));

    if let Some(dir) = &options.export_dir {
        let csv_path = export::export_sensitivity_csv(&result, dir)?;
        let json_path = export::export_sensitivity_json(&result, dir)?;
        println!("\nExported {} and {}", csv_path.display(), json_path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let options = parse_args()?;

    println!("=== CHO Fermentation Simulator ===\n");

    let raw = match &options.params_path {
        Some(path) => SimulationParameters::load(path)?,
        None => SimulationParameters::default(),
    };
    let params = ParameterSet::new(raw).context("invalid simulation parameters")?;
    print_parameters(&params);

    let start_time = Instant::now();
    let run = match options.shift {
        Some((factor, value, hour)) => {
            println!("Step shift: {} → {} at t = {} h", factor.name(), value, hour);
            let profile = StepShiftProfile::new(&params, factor, hour, value);
            SimulationRun::execute_with_profile(params.clone(), &profile)
        }
        None => SimulationRun::execute(params.clone()),
    };
    log::info!("Batch simulated in {:.2?}", start_time.elapsed());
    print_run(&run);

    if let Some(dir) = &options.export_dir {
        let mut exporter = export::CsvExporter::new(dir, 6)?;
        exporter.write_series(&run.series)?;
        let csv_path = exporter.finish()?;
        let json_path = export::export_run_json(&run, dir)?;
        println!("\nExported {} and {}", csv_path.display(), json_path.display());
    }

    if !options.sweeps.is_empty() {
        run_sensitivity(&options, &params)?;
    }

    Ok(())
}
