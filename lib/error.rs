//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use std::{ fmt, io, path::PathBuf };
use ndarray as nd;
use thiserror::Error;
use crate::{ parse::ParserVersion, Arr1 };

/// Returned when spacing and error columns passed to
/// [`observed_orders`][crate::estimate::observed_orders] differ in length.
#[derive(Debug, Error)]
#[error("spacing and error columns differ in length; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, T>(h: &Arr1<S>, e: &Arr1<T>) -> Result<(), Self>
    where
        S: nd::Data<Elem = f64>,
        T: nd::Data<Elem = f64>,
    {
        (h.len() == e.len()).then_some(()).ok_or(Self(h.len(), e.len()))
    }
}

/// Returned when a [`GridSample`][crate::sample::GridSample] or
/// [`TestSeries`][crate::sample::TestSeries] would hold invalid values.
#[derive(Debug, Error)]
pub enum SampleError {
    /// Returned when a grid spacing is non-positive or non-finite.
    #[error("grid spacing must be finite and greater than 0; got {0}")]
    BadSpacing(f64),

    /// Returned when an error norm is negative or non-finite.
    #[error("error norms must be finite and non-negative; got {0}")]
    BadNorm(f64),

    /// Returned when a series already holds a sample at the same spacing.
    #[error("series '{test}' already has a sample at h = {h}")]
    DuplicateSpacing { test: String, h: f64 },
}

impl SampleError {
    pub(crate) fn check_spacing(h: f64) -> Result<(), Self> {
        (h.is_finite() && h > 0.0).then_some(()).ok_or(Self::BadSpacing(h))
    }

    pub(crate) fn check_norm(e: f64) -> Result<(), Self> {
        (e.is_finite() && e >= 0.0).then_some(()).ok_or(Self::BadNorm(e))
    }
}

/// Returned from a [`ResultParser`][crate::parse::ResultParser].
#[derive(Debug, Error)]
pub enum ParseError {
    /// Returned when no line of the input matches the parser's pattern for a
    /// test case.
    #[error("no line matching the {format} {version} pattern for '{test}'")]
    NotFound { test: String, format: &'static str, version: ParserVersion },

    /// Returned when a matched field cannot be read as a number.
    #[error("could not read '{text}' as a number for '{test}'")]
    BadNumber { test: String, text: String },

    /// [`regex::Error`].
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Where a source looked for a test case's error values.
#[derive(Clone, Debug, PartialEq)]
pub enum Location {
    /// The static baseline document at the given path.
    Baseline(PathBuf),
    /// The external computation's output at the given grid spacing.
    Spacing(f64),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Baseline(path)
                => write!(f, "in baseline document {}", path.display()),
            Self::Spacing(h) => write!(f, "in solver output for h = {}", h),
        }
    }
}

/// Returned from an [`ErrorSource`][crate::source::ErrorSource].
#[derive(Debug, Error)]
pub enum SourceError {
    /// Returned when a configured test case's error values cannot be located
    /// in an input document or external output.
    #[error("could not find results for '{test}' {location}: {source}")]
    DataNotFound {
        test: String,
        location: Location,
        source: ParseError,
    },

    /// Returned when the external computation cannot be invoked or exits with
    /// a failure status.
    #[error("solver '{program}' failed for h = {h}: {reason}")]
    CollaboratorFailure {
        program: String,
        h: f64,
        reason: String,
    },

    /// Returned when a source hands back the wrong number of samples for one
    /// grid spacing.
    #[error("expected {expected} samples at h = {h}; got {got}")]
    Incomplete { h: f64, expected: usize, got: usize },

    /// Returned when a baseline document cannot be read.
    #[error("could not read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// [`SampleError`]
    #[error("sample error: {0}")]
    Sample(#[from] SampleError),
}

/// Returned when loading or validating a [`Config`][crate::config::Config].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when a configuration file cannot be read.
    #[error("could not read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// [`toml::de::Error`].
    #[error("malformed configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Returned when a configuration file declares an unsupported schema.
    #[error("unsupported schema_version {found}; expected {expected}")]
    SchemaVersion { found: u32, expected: u32 },

    /// Returned when no grid spacings are configured.
    #[error("at least one grid spacing is required")]
    NoSpacings,

    /// Returned when the same grid spacing is configured twice.
    #[error("grid spacing {0} is configured more than once")]
    DuplicateSpacing(f64),

    /// Returned when no test cases are configured.
    #[error("at least one test case is required")]
    NoTests,

    /// Returned when a test case name is empty.
    #[error("test case names must be non-empty")]
    EmptyTestName,

    /// Returned when the same test case is configured twice.
    #[error("test case '{0}' is configured more than once")]
    DuplicateTest(String),

    /// Returned when a synthetic-mode parameter is out of range.
    #[error("synthetic parameter `{name}` is out of range; got {value}")]
    BadSynthetic { name: &'static str, value: f64 },

    /// [`SampleError`]
    #[error("sample error: {0}")]
    Sample(#[from] SampleError),
}

impl ConfigError {
    pub(crate) fn check_synthetic(name: &'static str, value: f64, ok: bool)
        -> Result<(), Self>
    {
        (ok && value.is_finite()).then_some(())
            .ok_or(Self::BadSynthetic { name, value })
    }
}

/// Returned when writing or reading a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// [`std::io::Error`].
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// [`serde_json::Error`].
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// [`tempfile::PersistError`].
    #[error("could not move report into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Returned when a record stream is out of the header/test/order order.
    #[error("malformed report at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Returned from a full run of the [driver][crate::driver].
#[derive(Debug, Error)]
pub enum RunError {
    /// [`ConfigError`]
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// [`SourceError`]
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// [`ReportError`]
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}
