//! Sources of raw per-resolution error values.
//!
//! An [`ErrorSource`] is asked for one batch of samples per grid spacing,
//! covering every configured test case. Two sources are provided:
//! - [`SyntheticSource`] reads a single reference (L2, L∞) pair per test case
//!   from a static baseline document and scales it by an assumed order. The
//!   data it produces are a demonstration, not a measurement.
//! - [`LiveSource`] runs an external solver once per grid spacing and reads
//!   the pair for each test case from its standard output.

use std::{
    fs,
    path::{ Path, PathBuf },
    process::{ Command, Stdio },
};
use serde::{ Deserialize, Serialize };
use tracing::{ debug, info, warn };
use crate::{
    error::{ Location, ParseError, SampleError, SourceError },
    parse::{
        NormPair, ParserVersion, ResultParser, ResultsLineParser, TableRowParser,
    },
    sample::{ GridSample, TestSeries },
    DEF_FLOOR,
    DEF_H_REF,
    DEF_ORDER,
};

pub type SourceResult<T> = Result<T, SourceError>;

/// Whether a source's data were measured or synthesized.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Scaled from a single baseline reading by an assumed order.
    Synthetic,
    /// Produced by running the solver at each grid spacing.
    Measured,
}

/// Provider of [`GridSample`]s.
pub trait ErrorSource {
    /// Whether this source measures or synthesizes its data.
    fn mode(&self) -> SourceMode;

    /// Return one sample at spacing `h` for each entry of `tests`, in the same
    /// order.
    fn samples_at(&mut self, h: f64, tests: &[String])
        -> SourceResult<Vec<GridSample>>;
}

impl<E> ErrorSource for Box<E>
where E: ErrorSource + ?Sized
{
    fn mode(&self) -> SourceMode { (**self).mode() }

    fn samples_at(&mut self, h: f64, tests: &[String])
        -> SourceResult<Vec<GridSample>>
    {
        (**self).samples_at(h, tests)
    }
}

/// Query `source` once per spacing in `hs` and assemble one [`TestSeries`] per
/// test case, with samples in the order of `hs`.
///
/// The first failure aborts collection.
pub fn collect_series<E>(source: &mut E, hs: &[f64], tests: &[String])
    -> SourceResult<Vec<TestSeries>>
where E: ErrorSource + ?Sized
{
    let mut series: Vec<TestSeries>
        = tests.iter().map(TestSeries::new).collect();
    for (k, &h) in hs.iter().enumerate() {
        let samples = source.samples_at(h, tests)?;
        if samples.len() != tests.len() {
            return Err(SourceError::Incomplete {
                h,
                expected: tests.len(),
                got: samples.len(),
            });
        }
        for (s, sample) in series.iter_mut().zip(samples) {
            debug!(test = s.name(), h, l2 = sample.l2(), linf = sample.linf());
            s.push(sample)?;
        }
        info!("processed h = {} ({}/{})", h, k + 1, hs.len());
    }
    Ok(series)
}

fn to_sample(h: f64, pair: NormPair) -> SourceResult<GridSample> {
    Ok(GridSample::new(h, pair.l2, pair.linf)?)
}

/// Parameters for scaling a baseline reading into a synthetic series.
///
/// A sample at spacing `h` is `max(e_ref, floor) * (h / h_ref)^order` in each
/// norm.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SyntheticParams {
    /// Spacing at which the baseline values are taken to apply.
    pub h_ref: f64,
    /// Assumed order of convergence.
    pub order: f64,
    /// Lower bound applied to the baseline values before scaling.
    pub floor: f64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self { h_ref: DEF_H_REF, order: DEF_ORDER, floor: DEF_FLOOR }
    }
}

/// Synthesizes series from one reference reading per test case.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    baselines: Vec<(String, NormPair)>,
    params: SyntheticParams,
    format: &'static str,
    version: ParserVersion,
}

impl SyntheticSource {
    /// Read the reference pair for every test case from a baseline document.
    ///
    /// The document is parsed once; a test case missing from it is reported
    /// as [`SourceError::DataNotFound`] at `location`.
    pub fn from_document<P>(
        text: &str,
        tests: &[String],
        parser: &P,
        params: SyntheticParams,
        location: Location,
    ) -> SourceResult<Self>
    where P: ResultParser + ?Sized
    {
        let baselines: Vec<(String, NormPair)>
            = tests.iter()
            .map(|test| -> SourceResult<(String, NormPair)> {
                let pair
                    = parser.extract(text, test)
                    .map_err(|source| SourceError::DataNotFound {
                        test: test.clone(),
                        location: location.clone(),
                        source,
                    })?;
                debug!(
                    test = test.as_str(),
                    format = parser.format(),
                    version = %parser.version(),
                    l2 = pair.l2,
                    linf = pair.linf,
                    "read baseline"
                );
                SampleError::check_norm(pair.l2)?;
                SampleError::check_norm(pair.linf)?;
                if pair.l2 < params.floor || pair.linf < params.floor {
                    warn!(
                        test = test.as_str(),
                        floor = params.floor,
                        "baseline below floor; clamping before scaling"
                    );
                }
                Ok((test.clone(), pair))
            })
            .collect::<SourceResult<_>>()?;
        Ok(Self {
            baselines,
            params,
            format: parser.format(),
            version: parser.version(),
        })
    }

    /// Read and parse a baseline document of typeset table rows from disk.
    pub fn load<Q>(path: Q, tests: &[String], params: SyntheticParams)
        -> SourceResult<Self>
    where Q: AsRef<Path>
    {
        let path = path.as_ref();
        let text
            = fs::read_to_string(path)
            .map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_document(
            &text,
            tests,
            &TableRowParser,
            params,
            Location::Baseline(path.to_path_buf()),
        )
    }

    /// Reference pair read for a test case, before flooring.
    pub fn baseline(&self, test: &str) -> Option<NormPair> {
        self.baselines.iter()
            .find(|(name, _)| name == test)
            .map(|(_, pair)| *pair)
    }

    fn synthesize(&self, h: f64, test: &str) -> SourceResult<GridSample> {
        let base
            = self.baseline(test)
            .ok_or_else(|| SourceError::DataNotFound {
                test: test.to_string(),
                location: Location::Spacing(h),
                source: ParseError::NotFound {
                    test: test.to_string(),
                    format: self.format,
                    version: self.version,
                },
            })?;
        let SyntheticParams { h_ref, order, floor } = self.params;
        let scale = (h / h_ref).powf(order);
        to_sample(h, NormPair {
            l2: base.l2.max(floor) * scale,
            linf: base.linf.max(floor) * scale,
        })
    }
}

impl ErrorSource for SyntheticSource {
    fn mode(&self) -> SourceMode { SourceMode::Synthetic }

    fn samples_at(&mut self, h: f64, tests: &[String])
        -> SourceResult<Vec<GridSample>>
    {
        SampleError::check_spacing(h)?;
        tests.iter().map(|test| self.synthesize(h, test)).collect()
    }
}

/// Measures series by running an external solver once per grid spacing.
///
/// The solver is run as `<program> <args...> --h=<h>` and must print one line
/// `RESULTS: <TestName> L2=<float> Linf=<float>` per test case. Runs are
/// sequential and block until the solver exits.
#[derive(Clone, Debug)]
pub struct LiveSource<P = ResultsLineParser> {
    program: PathBuf,
    args: Vec<String>,
    parser: P,
}

impl LiveSource {
    /// Create a new source reading the standard `RESULTS:` lines.
    pub fn new<Q, I, S>(program: Q, args: I) -> Self
    where
        Q: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_parser(program, args, ResultsLineParser)
    }
}

impl<P> LiveSource<P>
where P: ResultParser
{
    /// Create a new source with a custom output parser.
    pub fn with_parser<Q, I, S>(program: Q, args: I, parser: P) -> Self
    where
        Q: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            parser,
        }
    }

    fn failure(&self, h: f64, reason: String) -> SourceError {
        SourceError::CollaboratorFailure {
            program: self.program.display().to_string(),
            h,
            reason,
        }
    }

    // run the solver at one spacing and return its standard output
    fn invoke(&self, h: f64) -> SourceResult<String> {
        let output
            = Command::new(&self.program)
            .args(&self.args)
            .arg(format!("--h={}", h))
            .stdin(Stdio::null())
            .output()
            .map_err(|err| self.failure(h, format!("could not start: {}", err)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last
                = stderr.lines().rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("no error output");
            return Err(self.failure(
                h, format!("{}: {}", output.status, last.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl<P> ErrorSource for LiveSource<P>
where P: ResultParser
{
    fn mode(&self) -> SourceMode { SourceMode::Measured }

    fn samples_at(&mut self, h: f64, tests: &[String])
        -> SourceResult<Vec<GridSample>>
    {
        SampleError::check_spacing(h)?;
        let stdout = self.invoke(h)?;
        tests.iter()
            .map(|test| {
                let pair
                    = self.parser.extract(&stdout, test)
                    .map_err(|source| SourceError::DataNotFound {
                        test: test.clone(),
                        location: Location::Spacing(h),
                        source,
                    })?;
                to_sample(h, pair)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASELINE: &str = "\
        Minkowski & 1e-4 & 2e-4 \\\\\n\
        Schwarzschild & 0 & 3e-6 \\\\\n";

    fn names(tests: &[&str]) -> Vec<String> {
        tests.iter().map(|s| s.to_string()).collect()
    }

    fn synthetic(tests: &[String]) -> SourceResult<SyntheticSource> {
        SyntheticSource::from_document(
            BASELINE,
            tests,
            &TableRowParser,
            SyntheticParams::default(),
            Location::Baseline(PathBuf::from("validation_results.tex")),
        )
    }

    #[test]
    fn synthetic_scaling() {
        let tests = names(&["Minkowski"]);
        let mut src = synthetic(&tests).unwrap();
        assert_eq!(src.mode(), SourceMode::Synthetic);
        let s = src.samples_at(0.1, &tests).unwrap();
        assert!((s[0].l2() - 1e-2).abs() < 1e-15);
        assert!((s[0].linf() - 2e-2).abs() < 1e-15);
        let s = src.samples_at(0.05, &tests).unwrap();
        assert!((s[0].l2() - 2.5e-3).abs() < 1e-15);
    }

    #[test]
    fn synthetic_floor() {
        let tests = names(&["Schwarzschild"]);
        let mut src = synthetic(&tests).unwrap();
        assert_eq!(src.baseline("Schwarzschild").unwrap().l2, 0.0);
        let s = src.samples_at(0.01, &tests).unwrap();
        assert_eq!(s[0].l2(), 1e-5);
        assert_eq!(s[0].linf(), 1e-5);
    }

    #[test]
    fn synthetic_missing_test() {
        let tests = names(&["Minkowski", "Kerr"]);
        let err = synthetic(&tests).unwrap_err();
        match err {
            SourceError::DataNotFound { test, location, .. } => {
                assert_eq!(test, "Kerr");
                assert!(matches!(location, Location::Baseline(_)));
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn synthetic_unknown_test_at_query() {
        let mut src = synthetic(&names(&["Minkowski"])).unwrap();
        let err = src.samples_at(0.1, &names(&["Kerr"])).unwrap_err();
        assert!(err.to_string().contains("Kerr"));
        assert!(err.to_string().contains("h = 0.1"));
        assert!(matches!(
            err,
            SourceError::DataNotFound {
                source: ParseError::NotFound {
                    format: "table-row",
                    version: ParserVersion(1),
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn collect_in_configured_order() {
        let tests = names(&["Schwarzschild", "Minkowski"]);
        let mut src = synthetic(&tests).unwrap();
        let series = collect_series(&mut src, &[0.1, 0.05, 0.025], &tests).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name(), "Schwarzschild");
        assert_eq!(series[1].name(), "Minkowski");
        let hs: Vec<f64> = series[1].samples().iter().map(|s| s.h()).collect();
        assert_eq!(hs, vec![0.1, 0.05, 0.025]);
    }

    #[test]
    fn collect_rejects_repeated_spacing() {
        let tests = names(&["Minkowski"]);
        let mut src = synthetic(&tests).unwrap();
        let err = collect_series(&mut src, &[0.1, 0.1], &tests).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Sample(SampleError::DuplicateSpacing { .. }),
        ));
    }

    struct Short;

    impl ErrorSource for Short {
        fn mode(&self) -> SourceMode { SourceMode::Measured }

        fn samples_at(&mut self, h: f64, _tests: &[String])
            -> SourceResult<Vec<GridSample>>
        {
            Ok(vec![GridSample::new(h, 1.0, 1.0)?])
        }
    }

    #[test]
    fn collect_rejects_incomplete_batches() {
        let tests = names(&["a", "b"]);
        let err = collect_series(&mut Short, &[0.1], &tests).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Incomplete { expected: 2, got: 1, .. },
        ));
    }

    #[test]
    fn live_missing_program() {
        let tests = names(&["Minkowski"]);
        let mut src = LiveSource::new(
            "/nonexistent/convord-solver", Vec::<String>::new());
        assert_eq!(src.mode(), SourceMode::Measured);
        let err = src.samples_at(0.1, &tests).unwrap_err();
        assert!(matches!(
            err,
            SourceError::CollaboratorFailure { h, .. } if h == 0.1
        ));
    }

    #[cfg(unix)]
    #[test]
    fn live_reads_results_lines() {
        // `sh -c` binds the trailing `--h=<h>` argument to `$0`
        let script = r#"h="${0#--h=}"; echo "step 1"; echo "RESULTS: Minkowski L2=$h Linf=1e-3""#;
        let tests = names(&["Minkowski"]);
        let mut src = LiveSource::new("sh", ["-c", script]);
        let s = src.samples_at(0.05, &tests).unwrap();
        assert_eq!(s[0].h(), 0.05);
        assert_eq!(s[0].l2(), 0.05);
        assert_eq!(s[0].linf(), 1e-3);
    }

    #[cfg(unix)]
    #[test]
    fn live_failure_status() {
        let tests = names(&["Minkowski"]);
        let mut src = LiveSource::new("sh", ["-c", "echo diverged >&2; exit 3"]);
        let err = src.samples_at(0.1, &tests).unwrap_err();
        match err {
            SourceError::CollaboratorFailure { reason, .. } => {
                assert!(reason.contains("diverged"));
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn live_missing_pattern() {
        let tests = names(&["Minkowski", "Schwarzschild"]);
        let mut src = LiveSource::new(
            "sh", ["-c", "echo 'RESULTS: Minkowski L2=1 Linf=2'"]);
        let err = src.samples_at(0.025, &tests).unwrap_err();
        match err {
            SourceError::DataNotFound { test, location, .. } => {
                assert_eq!(test, "Schwarzschild");
                assert_eq!(location, Location::Spacing(0.025));
            },
            other => panic!("unexpected error {other:?}"),
        }
    }
}
