//! Print magnitude thresholds of the target luminosity function

use std::path::PathBuf;

use clap::Parser;
use lf_math::AxisRange;
use log::info;
use luminosity::{LuminosityConfig, TargetLuminosityFunction};

#[derive(Parser, Debug)]
#[command(author, version, about = "Magnitude thresholds for a range of number densities")]
struct Args {
    /// Tabulated cumulative luminosity function (magnitude, log10 density)
    #[arg(long)]
    table: PathBuf,

    /// Schechter parameter file (3 header lines, then Phi_star,M_star,alpha,P,Q)
    #[arg(long)]
    params: PathBuf,

    /// Optional JSON configuration overriding the default grids
    #[arg(long)]
    config: Option<PathBuf>,

    /// Redshift at which to evaluate the thresholds
    #[arg(long, default_value_t = 0.1)]
    redshift: f64,

    /// log10 number densities [h^3/Mpc^3] (start:stop:step)
    #[arg(long, default_value = "-5:-1:0.5", allow_hyphen_values = true)]
    densities: AxisRange,

    /// Also rescale each threshold magnitude to this redshift
    #[arg(long)]
    rescale_to: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => LuminosityConfig::load_from_file(path)?,
        None => LuminosityConfig::default(),
    };

    info!("Building target luminosity function from {}", args.table.display());
    let lf = TargetLuminosityFunction::from_files(&args.table, &args.params, &config)?;

    let log_densities = args.densities.to_vec()?;
    let thresholds: Vec<(f64, f64, bool)> = log_densities
        .iter()
        .map(|&log_n| {
            let (m, in_bounds) = lf.magnitude_checked(10f64.powf(log_n), args.redshift);
            (log_n, m, in_bounds)
        })
        .collect();

    let rescaled = match args.rescale_to {
        Some(z) => {
            let mags: Vec<f64> = thresholds.iter().map(|&(_, m, _)| m).collect();
            let original = vec![args.redshift; mags.len()];
            let target = vec![z; mags.len()];
            Some(lf.rescale_magnitude(&mags, &original, &target)?)
        }
        None => None,
    };

    println!("Magnitude thresholds at z = {}", args.redshift);
    match args.rescale_to {
        Some(z) => println!(
            "{:>10} {:>10} {:>9} {:>12}",
            "log10(n)",
            "M",
            "in_table",
            format!("M(z={z})")
        ),
        None => println!("{:>10} {:>10} {:>9}", "log10(n)", "M", "in_table"),
    }

    for (i, &(log_n, m, in_bounds)) in thresholds.iter().enumerate() {
        match &rescaled {
            Some(rescaled) => {
                println!("{log_n:>10.3} {m:>10.4} {in_bounds:>9} {:>12.4}", rescaled[i])
            }
            None => println!("{log_n:>10.3} {m:>10.4} {in_bounds:>9}"),
        }
    }

    Ok(())
}
