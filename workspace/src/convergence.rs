use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use convord::{
    config::Config,
    driver,
    estimate::mean_order,
    report::Format,
    sample::Norm,
};
use tracing_subscriber::EnvFilter;

/// Estimate observed orders of convergence and write a report.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Run configuration (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Report destination; overrides `output.path`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format, `ndjson` or `table`; overrides `output.format`.
    #[arg(short, long)]
    format: Option<Format>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(path) = args.output { config.output.path = path; }
    if let Some(format) = args.format { config.output.format = format; }
    tracing::info!(
        config = %args.config.display(),
        spacings = config.hs.len(),
        tests = config.tests.len(),
        "loaded configuration"
    );

    let report = driver::execute(&config).context("convergence run failed")?;

    for section in report.sections() {
        let means: Vec<String>
            = Norm::ALL.iter()
            .map(|&norm| {
                let mean
                    = mean_order(section.estimates(), norm)
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_else(|| "-".to_string());
                format!("{} = {}", norm.label(), mean)
            })
            .collect();
        println!(
            "{}: mean order {}",
            section.series().name(),
            means.join(", "),
        );
    }
    println!(
        "{} report written to {}",
        config.output.format,
        config.output.path.display(),
    );
    Ok(())
}
