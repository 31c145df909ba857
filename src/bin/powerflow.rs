// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use powerflow::debug::format_ybus;
use powerflow::{
    load_case, make_ybus, printpf, runpf_ybus, Alg, NetworkModel, PFOptBuilder, VoltageBand,
};
use spsolve::rlu::RLU;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Networks up to this size have their admittance matrix printed.
const YBUS_PRINT_MAX_BUSES: usize = 10;

/// Steady-state AC power flow.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Power Flow
    #[clap(name = "pf")]
    PowerFlow(PfArgs),
}

#[derive(Args)]
struct PfArgs {
    /// JSON case file, or a directory holding bus.csv and branch.csv.
    #[arg(required = true)]
    input: PathBuf,

    /// Write the JSON result to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// AC power flow algorithm.
    #[arg(long, value_enum, default_value_t = Alg::NR)]
    pub alg: Alg,

    /// Termination tolerance (p.u. mismatch for NR, p.u. voltage change for GS).
    #[arg(long)]
    pub tol: Option<f64>,

    /// Maximum number of iterations.
    #[arg(long)]
    pub max_it: Option<usize>,

    /// Gauss-Seidel acceleration factor.
    #[arg(long)]
    pub accel: Option<f64>,

    /// Do not enforce generator reactive power limits.
    #[arg(long, default_value_t = false)]
    pub no_qlim: bool,

    /// Lower bound of the nominal voltage band (p.u.).
    #[arg(long, default_value_t = 0.95)]
    pub vmin: f64,

    /// Upper bound of the nominal voltage band (p.u.).
    #[arg(long, default_value_t = 1.05)]
    pub vmax: f64,
}

fn main() {
    env_logger::Builder::from_default_env()
        .format_level(false)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match execute(&cli) {
        Ok(_) => {
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(2);
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let Commands::PowerFlow(args) = &cli.command;

    let (buses, branches) = load_case(&args.input)?;

    let mut builder = PFOptBuilder::default();
    builder
        .algorithm(args.alg)
        .enforce_q_limits(!args.no_qlim)
        .voltage_band(VoltageBand {
            vmin: args.vmin,
            vmax: args.vmax,
        });
    if let Some(tol) = args.tol {
        builder.tolerance(tol);
    }
    if let Some(max_it) = args.max_it {
        builder.max_it(max_it);
    }
    if let Some(accel) = args.accel {
        builder.acceleration(accel);
    }
    let opt = builder.build()?;

    let net = NetworkModel::new(buses, branches)?;
    let y_bus = make_ybus(&net);
    if net.n_bus() <= YBUS_PRINT_MAX_BUSES {
        println!("{}", format_ybus(&y_bus, &net, YBUS_PRINT_MAX_BUSES));
    }

    let solver = RLU::default();
    let result = runpf_ybus(&net, &y_bus, &opt, &solver, None, None)?;

    let stdout = std::io::stdout();
    printpf(&result, &mut stdout.lock())?;

    if let Some(out_path) = &args.output {
        let file = File::create(out_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &result)?;
    }

    if !result.converged {
        return Err(anyhow::anyhow!(
            "power flow did not converge in {} iterations",
            result.iterations
        ));
    }

    Ok(())
}
