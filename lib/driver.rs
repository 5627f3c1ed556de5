//! Ties an [`ErrorSource`] to the estimator and the report.
//!
//! Data flow one way: the source is queried once per grid spacing, every
//! series is passed to the estimator, and the finished [`Report`] is written
//! in one piece. Any failure aborts the run before anything is written.

use chrono::{ Local, NaiveDate };
use tracing::info;
use crate::{
    config::{ Config, SourceConfig },
    error::RunError,
    report::{ Report, Section },
    source::{ collect_series, ErrorSource, LiveSource, SyntheticSource },
};

pub type RunResult<T> = Result<T, RunError>;

/// Build the [`ErrorSource`] described by a configuration.
///
/// In synthetic mode this reads and parses the baseline document.
pub fn open_source(config: &Config) -> RunResult<Box<dyn ErrorSource>> {
    let source: Box<dyn ErrorSource>
        = match &config.source {
            SourceConfig::Synthetic { baseline, .. } => {
                let params
                    = config.source.synthetic_params()
                    .unwrap_or_default();
                info!(
                    baseline = %baseline.display(),
                    h_ref = params.h_ref,
                    order = params.order,
                    "using SYNTHETIC data scaled from a baseline reading; \
                    orders reflect the assumed order, not measured convergence"
                );
                Box::new(SyntheticSource::load(baseline, &config.tests, params)?)
            },
            SourceConfig::Live { program, args } => {
                info!(program = %program.display(), "measuring with solver");
                Box::new(LiveSource::new(program.clone(), args.iter().cloned()))
            },
        };
    Ok(source)
}

/// Collect every series from `source` and assemble the report.
pub fn run<E>(config: &Config, source: &mut E, date: NaiveDate)
    -> RunResult<Report>
where E: ErrorSource + ?Sized
{
    config.validate()?;
    let series = collect_series(source, &config.hs, &config.tests)?;
    let sections: Vec<Section>
        = series.into_iter().map(Section::new).collect();
    Ok(Report::new(date, source.mode(), sections))
}

/// Perform a complete run: open the configured source, build the report,
/// and write it to the configured output.
pub fn execute(config: &Config) -> RunResult<Report> {
    config.validate()?;
    let mut source = open_source(config)?;
    let report = run(config, &mut source, Local::now().date_naive())?;
    report.write_file(&config.output.path, config.output.format)?;
    info!(
        path = %config.output.path.display(),
        format = %config.output.format,
        "report written"
    );
    Ok(report)
}
