//! Run configuration.
//!
//! A [`Config`] is an explicit value handed to the [driver][crate::driver],
//! fixed for the duration of a run. It is usually loaded from a TOML file:
//! ```toml
//! schema_version = 1
//! hs = [0.1, 0.05, 0.025, 0.0125]
//! tests = ["Minkowski", "Schwarzschild"]
//!
//! [source]
//! mode = "live"
//! program = "./warp-solver-validation"
//! args = ["--quiet"]
//!
//! [output]
//! path = "convergence.ndjson"
//! format = "ndjson"
//! ```
//! There is no default source; synthetic data must be requested explicitly
//! with `mode = "synthetic"` and a `baseline` document.

use std::{
    collections::HashSet,
    fs,
    path::{ Path, PathBuf },
};
use serde::Deserialize;
use crate::{
    error::{ ConfigError, SampleError },
    report::Format,
    source::SyntheticParams,
    DEF_FLOOR,
    DEF_H_REF,
    DEF_ORDER,
};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Version of the configuration file layout understood by this crate.
pub const SCHEMA_VERSION: u32 = 1;

fn def_h_ref() -> f64 { DEF_H_REF }

fn def_order() -> f64 { DEF_ORDER }

fn def_floor() -> f64 { DEF_FLOOR }

fn def_output_path() -> PathBuf { PathBuf::from("convergence.ndjson") }

/// Where error values come from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase", deny_unknown_fields)]
pub enum SourceConfig {
    /// Scale one reading per test case from a baseline document.
    Synthetic {
        baseline: PathBuf,
        #[serde(default = "def_h_ref")]
        h_ref: f64,
        #[serde(default = "def_order")]
        order: f64,
        #[serde(default = "def_floor")]
        floor: f64,
    },
    /// Run an external solver once per grid spacing.
    Live {
        program: PathBuf,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl SourceConfig {
    /// Synthetic mode with default scaling parameters.
    pub fn synthetic<P>(baseline: P) -> Self
    where P: Into<PathBuf>
    {
        let SyntheticParams { h_ref, order, floor } = SyntheticParams::default();
        Self::Synthetic { baseline: baseline.into(), h_ref, order, floor }
    }

    /// Live mode.
    pub fn live<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Live {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Scaling parameters, if in synthetic mode.
    pub fn synthetic_params(&self) -> Option<SyntheticParams> {
        match self {
            Self::Synthetic { h_ref, order, floor, .. }
                => Some(SyntheticParams { h_ref: *h_ref, order: *order, floor: *floor }),
            Self::Live { .. } => None,
        }
    }
}

/// Where and how the report is written.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "def_output_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: Format,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { path: def_output_path(), format: Format::default() }
    }
}

/// Configuration for one run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub schema_version: u32,
    /// Grid spacings, in the order samples are collected.
    pub hs: Vec<f64>,
    /// Test case names, in the order they are reported.
    pub tests: Vec<String>,
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Create a new configuration with default output settings.
    pub fn new<I, S>(hs: Vec<f64>, tests: I, source: SourceConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema_version: SCHEMA_VERSION,
            hs,
            tests: tests.into_iter().map(Into::into).collect(),
            source,
            output: OutputConfig::default(),
        }
    }

    /// Set the report destination.
    pub fn with_output<P>(mut self, path: P, format: Format) -> Self
    where P: Into<PathBuf>
    {
        self.output = OutputConfig { path: path.into(), format };
        self
    }

    /// Parse and validate a configuration from TOML.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a configuration file.
    ///
    /// Relative `baseline` and `output.path` entries, and a relative `program`
    /// naming more than a bare command, are taken relative to the file's
    /// directory.
    pub fn load<P>(path: P) -> ConfigResult<Self>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let text
            = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            config.resolve_relative_to(dir);
        }
        Ok(config)
    }

    fn resolve_relative_to(&mut self, dir: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() { *p = dir.join(&*p); }
        };
        match &mut self.source {
            SourceConfig::Synthetic { baseline, .. } => join(baseline),
            SourceConfig::Live { program, .. } => {
                if program.components().count() > 1 { join(program); }
            },
        }
        join(&mut self.output.path);
    }

    /// Check every invariant of the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        (self.schema_version == SCHEMA_VERSION).then_some(())
            .ok_or(ConfigError::SchemaVersion {
                found: self.schema_version,
                expected: SCHEMA_VERSION,
            })?;

        (!self.hs.is_empty()).then_some(()).ok_or(ConfigError::NoSpacings)?;
        for (k, &h) in self.hs.iter().enumerate() {
            SampleError::check_spacing(h)?;
            if self.hs[..k].contains(&h) {
                return Err(ConfigError::DuplicateSpacing(h));
            }
        }

        (!self.tests.is_empty()).then_some(()).ok_or(ConfigError::NoTests)?;
        let mut seen: HashSet<&str> = HashSet::new();
        for test in self.tests.iter() {
            if test.trim().is_empty() { return Err(ConfigError::EmptyTestName); }
            if !seen.insert(test.as_str()) {
                return Err(ConfigError::DuplicateTest(test.clone()));
            }
        }

        if let Some(SyntheticParams { h_ref, order, floor })
            = self.source.synthetic_params()
        {
            ConfigError::check_synthetic("h_ref", h_ref, h_ref > 0.0)?;
            ConfigError::check_synthetic("order", order, true)?;
            ConfigError::check_synthetic("floor", floor, floor >= 0.0)?;
        }
        Ok(())
    }
}
