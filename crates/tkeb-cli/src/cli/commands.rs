use super::demo_flow::DemoFlow;
use super::CliError;
use anyhow::Context;
use std::path::PathBuf;
use tkeb_core::numerics::stable_sum;
use tkeb_core::{
    BudgetEngine, BudgetParams, BudgetStep, BudgetTerm, MeanState, MemorySink, SingleRankReduction,
    StatisticsSink,
};

#[derive(clap::Args)]
pub(super) struct DemoArgs {
    /// Number of vertical levels
    #[arg(long, default_value_t = 16)]
    levels: usize,

    /// Horizontal points in x
    #[arg(long, default_value_t = 32)]
    nx: usize,

    /// Horizontal points in y
    #[arg(long, default_value_t = 16)]
    ny: usize,

    /// Domain depth in meters
    #[arg(long, default_value_t = 1000.0)]
    depth: f64,

    /// Number of diagnostic steps
    #[arg(long, default_value_t = 4)]
    steps: usize,

    /// Simulation time between steps in seconds
    #[arg(long, default_value_t = 2.0)]
    interval: f64,

    /// Advance the demo flow without running the budget diagnostic
    #[arg(long)]
    no_budget: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Also write the full step records as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum OutputFormat {
    Table,
    Json,
}

pub(super) fn run_demo_command(args: DemoArgs) -> Result<i32, CliError> {
    if args.nx < 4 || args.ny < 4 {
        return Err(CliError::Usage(
            "the demo flow needs at least 4 points in each horizontal direction".to_string(),
        ));
    }
    if args.steps == 0 {
        return Err(CliError::Usage("--steps must be at least 1".to_string()));
    }
    if !(args.interval.is_finite() && args.interval > 0.0) {
        return Err(CliError::Usage(
            "--interval must be a positive duration".to_string(),
        ));
    }

    let flow = DemoFlow::new(args.nx, args.ny, args.levels, args.depth);
    let grid = flow.grid()?;
    let engine = BudgetEngine::new(BudgetParams::default())?;
    let reduction = SingleRankReduction::new(args.nx, args.ny);
    let mut mean = MeanState::new(args.levels);
    let mut sink = MemorySink::new();

    for step_index in 0..args.steps {
        let time = step_index as f64 * args.interval;
        if args.no_budget {
            tracing::info!(time, "budget diagnostic disabled, skipping step");
            continue;
        }
        let fields = flow.fields_at(time, &grid);
        let step = engine.exec_step(&fields.snapshot(), &grid, &reduction, &mut mean, time)?;
        tracing::info!(time, warnings = step.warnings.len(), "diagnostic step done");
        sink.publish(step);
    }

    let steps = sink.into_steps();
    match args.format {
        OutputFormat::Table => render_table(&steps, &grid),
        OutputFormat::Json => {
            let encoded =
                serde_json::to_string_pretty(&steps).context("encoding step records")?;
            println!("{encoded}");
        }
    }

    if let Some(path) = &args.output {
        let encoded = serde_json::to_string_pretty(&steps).context("encoding step records")?;
        std::fs::write(path, encoded)
            .with_context(|| format!("writing step records to '{}'", path.display()))?;
    }

    Ok(0)
}

/// One row per step: the dz-weighted column integral of every term, in
/// W m⁻² per unit density. Transport terms should sit near zero.
fn render_table(steps: &[BudgetStep], grid: &tkeb_core::VerticalGrid) {
    print!("{:>10}", "time");
    for term in BudgetTerm::ALL {
        print!("{:>13}", term.as_str());
    }
    println!("{:>10}", "warnings");

    for step in steps {
        print!("{:>10.2}", step.time);
        for term in BudgetTerm::ALL {
            let integral = step
                .profile(term)
                .map(|profile| column_integral(&profile.values, grid))
                .unwrap_or(f64::NAN);
            print!("{integral:>13.4e}");
        }
        println!("{:>10}", step.warnings.len());
    }
}

fn column_integral(values: &[f64], grid: &tkeb_core::VerticalGrid) -> f64 {
    let weighted: Vec<f64> = values
        .iter()
        .zip(grid.dz())
        .map(|(value, dz)| value * dz)
        .collect();
    stable_sum(&weighted)
}

pub(super) fn run_terms_command() -> Result<i32, CliError> {
    for term in BudgetTerm::ALL {
        println!("{:<10} {}", term.as_str(), describe(term));
    }
    Ok(0)
}

fn describe(term: BudgetTerm) -> &'static str {
    match term {
        BudgetTerm::Shear => "shear production against the mean velocity gradient",
        BudgetTerm::Buoyancy => "buoyancy production from the vertical heat flux",
        BudgetTerm::TurbulentTransport => "vertical transport by the turbulence itself",
        BudgetTerm::PressureTransport => "vertical transport by pressure fluctuations",
        BudgetTerm::ViscousTransport => "diffusive redistribution by viscosity",
        BudgetTerm::Dissipation => "viscous destruction, always a sink",
        BudgetTerm::Storage => "measured tendency between consecutive steps",
    }
}
