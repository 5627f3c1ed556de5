//! Per-resolution error measurements and the ordered series they form.

use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::error::SampleError;

pub type SampleResult<T> = Result<T, SampleError>;

/// Selects one of the two error norms carried by a [`GridSample`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Norm {
    /// Root-mean-square deviation from the reference solution.
    L2,
    /// Maximum absolute deviation from the reference solution.
    Linf,
}

impl Norm {
    pub const ALL: [Self; 2] = [Self::L2, Self::Linf];

    /// Field name under which this norm's error is serialized.
    pub fn label(&self) -> &'static str {
        match self {
            Self::L2 => "L2",
            Self::Linf => "Linf",
        }
    }
}

#[derive(Deserialize)]
struct RawGridSample {
    h: f64,
    #[serde(rename = "L2")]
    l2: f64,
    #[serde(rename = "Linf")]
    linf: f64,
}

impl TryFrom<RawGridSample> for GridSample {
    type Error = SampleError;

    fn try_from(raw: RawGridSample) -> SampleResult<Self> {
        Self::new(raw.h, raw.l2, raw.linf)
    }
}

/// Error norms measured (or synthesized) at a single grid spacing.
///
/// Values are validated on construction and cannot be changed afterward.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGridSample")]
pub struct GridSample {
    h: f64,
    #[serde(rename = "L2")]
    l2: f64,
    #[serde(rename = "Linf")]
    linf: f64,
}

impl GridSample {
    /// Create a new sample.
    ///
    /// Fails if `h` is not finite and positive, or if either norm is not
    /// finite and non-negative.
    pub fn new(h: f64, l2: f64, linf: f64) -> SampleResult<Self> {
        SampleError::check_spacing(h)?;
        SampleError::check_norm(l2)?;
        SampleError::check_norm(linf)?;
        Ok(Self { h, l2, linf })
    }

    /// Grid spacing.
    pub fn h(&self) -> f64 { self.h }

    /// L2 error.
    pub fn l2(&self) -> f64 { self.l2 }

    /// L∞ error.
    pub fn linf(&self) -> f64 { self.linf }

    /// Error in the given norm.
    pub fn norm(&self, norm: Norm) -> f64 {
        match norm {
            Norm::L2 => self.l2,
            Norm::Linf => self.linf,
        }
    }
}

/// The samples collected for one named test case, in configured order.
///
/// Order is significant: observed orders are computed between adjacent
/// entries. No two samples share a grid spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct TestSeries {
    name: String,
    samples: Vec<GridSample>,
}

impl TestSeries {
    /// Create a new, empty series.
    pub fn new<S>(name: S) -> Self
    where S: Into<String>
    {
        Self { name: name.into(), samples: Vec::new() }
    }

    /// Create a series from samples in order.
    pub fn from_samples<S, I>(name: S, samples: I) -> SampleResult<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = GridSample>,
    {
        let mut series = Self::new(name);
        samples.into_iter().try_for_each(|sample| series.push(sample))?;
        Ok(series)
    }

    /// Append a sample.
    ///
    /// Fails if the series already holds a sample at the same grid spacing.
    pub fn push(&mut self, sample: GridSample) -> SampleResult<()> {
        if self.samples.iter().any(|s| s.h == sample.h) {
            return Err(SampleError::DuplicateSpacing {
                test: self.name.clone(),
                h: sample.h,
            });
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Name of the test case.
    pub fn name(&self) -> &str { &self.name }

    /// Samples in series order.
    pub fn samples(&self) -> &[GridSample] { &self.samples }

    pub fn len(&self) -> usize { self.samples.len() }

    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    /// Grid spacings in series order.
    pub fn spacings(&self) -> nd::Array1<f64> {
        self.samples.iter().map(|s| s.h).collect()
    }

    /// Errors in the given norm, in series order.
    pub fn errors(&self, norm: Norm) -> nd::Array1<f64> {
        self.samples.iter().map(|s| s.norm(norm)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            GridSample::new(0.0, 1.0, 1.0),
            Err(SampleError::BadSpacing(_)),
        ));
        assert!(matches!(
            GridSample::new(-0.1, 1.0, 1.0),
            Err(SampleError::BadSpacing(_)),
        ));
        assert!(matches!(
            GridSample::new(0.1, -1e-3, 1.0),
            Err(SampleError::BadNorm(_)),
        ));
        assert!(matches!(
            GridSample::new(0.1, 1.0, f64::NAN),
            Err(SampleError::BadNorm(_)),
        ));
        assert!(GridSample::new(0.1, 0.0, 0.0).is_ok());
    }

    #[test]
    fn series_rejects_duplicate_spacing() {
        let mut series = TestSeries::new("Minkowski");
        series.push(GridSample::new(0.1, 1.0, 2.0).unwrap()).unwrap();
        series.push(GridSample::new(0.05, 0.5, 1.0).unwrap()).unwrap();
        let err = series.push(GridSample::new(0.1, 3.0, 3.0).unwrap());
        assert!(matches!(
            err,
            Err(SampleError::DuplicateSpacing { ref test, h })
                if test == "Minkowski" && h == 0.1
        ));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn columns_follow_series_order() {
        let series = TestSeries::from_samples(
            "Schwarzschild",
            [
                GridSample::new(0.05, 2.0, 4.0).unwrap(),
                GridSample::new(0.1, 8.0, 16.0).unwrap(),
            ],
        ).unwrap();
        assert_eq!(series.spacings(), nd::array![0.05, 0.1]);
        assert_eq!(series.errors(Norm::L2), nd::array![2.0, 8.0]);
        assert_eq!(series.errors(Norm::Linf), nd::array![4.0, 16.0]);
    }

    #[test]
    fn deserialization_validates() {
        let ok: GridSample
            = serde_json::from_str(r#"{"h":0.1,"L2":0.01,"Linf":0.02}"#)
            .unwrap();
        assert_eq!(ok, GridSample::new(0.1, 0.01, 0.02).unwrap());
        let bad = serde_json::from_str::<GridSample>(
            r#"{"h":-0.1,"L2":0.01,"Linf":0.02}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn labels_name_serialized_fields() {
        let sample = GridSample::new(0.1, 0.01, 0.02).unwrap();
        let value = serde_json::to_value(sample).unwrap();
        for norm in Norm::ALL {
            assert_eq!(value[norm.label()], sample.norm(norm));
        }
    }
}
