//! Provides functions and higher-level constructs for estimating the observed
//! order of convergence of a numerical PDE solver from its errors at several
//! grid spacings, and for writing the results as a structured report.
//!
//! A run is composed of three stages, driven by [`driver`]:
//! - An error [source] produces one (L2, L∞) pair per test case per grid
//!   spacing, either by running the solver ([`source::LiveSource`]) or by
//!   scaling a baseline reading ([`source::SyntheticSource`]).
//! - The [estimator][estimate] computes the order observed between each pair
//!   of adjacent resolutions.
//! - The [report] renders everything as newline-delimited JSON or as
//!   plain-text tables.
//!
//! See [`docs`] for background.

pub mod config;
pub mod driver;
pub mod error;
pub mod estimate;
pub mod parse;
pub mod report;
pub mod sample;
pub mod source;

pub mod docs;

pub(crate) const DEF_H_REF: f64 = 0.01;
pub(crate) const DEF_ORDER: f64 = 2.0;
pub(crate) const DEF_FLOOR: f64 = 1e-5;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
