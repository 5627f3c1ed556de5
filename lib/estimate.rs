//! Observed orders of convergence between adjacent resolutions.
//!
//! For a norm *e* sampled at spacings *h*, the order observed between entries
//! `i - 1` and `i` of a series is
//! ```text
//!     ln(e[i] / e[i-1])
//! p = -----------------
//!     ln(h[i] / h[i-1])
//! ```
//! with exact zeros handled separately; see [`Order`].
//!
//! ```
//! use convord::{
//!     estimate::{ Order, estimate },
//!     sample::{ GridSample, TestSeries },
//! };
//!
//! let series = TestSeries::from_samples(
//!     "Minkowski",
//!     [
//!         GridSample::new(0.1, 1e-2, 2e-2).unwrap(),
//!         GridSample::new(0.05, 2.5e-3, 5e-3).unwrap(),
//!     ],
//! ).unwrap();
//! let orders = estimate(&series);
//! assert_eq!(orders.len(), 1);
//! match orders[0].l2 {
//!     Order::Computed(p) => assert!((p - 2.0).abs() < 1e-6),
//!     _ => unreachable!(),
//! }
//! ```

use std::fmt;
use ndarray as nd;
use crate::{
    Arr1,
    error::LengthError,
    sample::{ Norm, TestSeries },
};

pub type EstimateResult<T> = Result<T, LengthError>;

/// Outcome of estimating the order between two adjacent samples in one norm.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Order {
    /// A finite observed order.
    Computed(f64),
    /// Both errors are exactly zero.
    PerfectConvergence,
    /// Exactly one error is zero, or the log-ratio is not a finite number.
    Undefined,
}

impl Order {
    /// The finite order, if one was computed.
    ///
    /// This is the collapse to `null` used in line-delimited reports.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Computed(p) => Some(*p),
            Self::PerfectConvergence | Self::Undefined => None,
        }
    }
}

// precision applies to computed orders only; width and alignment apply to all
impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String
            = match self {
                Self::Computed(p)
                    => format!("{:.*}", f.precision().unwrap_or(2), p),
                Self::PerfectConvergence => "inf".to_string(),
                Self::Undefined => "n/a".to_string(),
            };
        let w = f.width().unwrap_or(0);
        match f.align() {
            Some(fmt::Alignment::Right) => write!(f, "{:>w$}", s),
            Some(fmt::Alignment::Center) => write!(f, "{:^w$}", s),
            _ => write!(f, "{:<w$}", s),
        }
    }
}

/// Compute the order observed between two samples of a single norm.
pub fn observed_order(h_prev: f64, h_next: f64, e_prev: f64, e_next: f64)
    -> Order
{
    match (e_prev == 0.0, e_next == 0.0) {
        (true, true) => Order::PerfectConvergence,
        (true, false) | (false, true) => Order::Undefined,
        (false, false) => {
            let p = (e_next / e_prev).ln() / (h_next / h_prev).ln();
            if p.is_finite() { Order::Computed(p) } else { Order::Undefined }
        },
    }
}

/// Compute the orders observed between all adjacent entries of a pair of
/// spacing and error arrays.
///
/// Returns one fewer entry than the arrays hold, or nothing if they hold fewer
/// than two.
pub fn observed_orders<S, T>(h: &Arr1<S>, e: &Arr1<T>)
    -> EstimateResult<Vec<Order>>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    LengthError::check(h, e)?;
    let orders: Vec<Order>
        = h.iter().zip(h.iter().skip(1))
        .zip(e.iter().zip(e.iter().skip(1)))
        .map(|((hk, hkp1), (ek, ekp1))| observed_order(*hk, *hkp1, *ek, *ekp1))
        .collect();
    Ok(orders)
}

/// Orders observed between one pair of adjacent samples in a [`TestSeries`].
#[derive(Clone, Debug, PartialEq)]
pub struct OrderEstimate {
    /// Name of the test case.
    pub test: String,
    /// Spacing of the earlier sample.
    pub h1: f64,
    /// Spacing of the later sample.
    pub h2: f64,
    /// Order in the L2 norm.
    pub l2: Order,
    /// Order in the L∞ norm.
    pub linf: Order,
}

impl OrderEstimate {
    /// Order in the given norm.
    pub fn order(&self, norm: Norm) -> Order {
        match norm {
            Norm::L2 => self.l2,
            Norm::Linf => self.linf,
        }
    }
}

/// Compute one [`OrderEstimate`] per adjacent pair of samples in a series.
///
/// A series with fewer than two samples yields nothing.
pub fn estimate(series: &TestSeries) -> Vec<OrderEstimate> {
    let samples = series.samples();
    samples.iter().zip(samples.iter().skip(1))
        .map(|(prev, next)| {
            let order = |norm: Norm| {
                observed_order(prev.h(), next.h(), prev.norm(norm), next.norm(norm))
            };
            OrderEstimate {
                test: series.name().to_string(),
                h1: prev.h(),
                h2: next.h(),
                l2: order(Norm::L2),
                linf: order(Norm::Linf),
            }
        })
        .collect()
}

/// Mean of the computed orders in one norm, ignoring degenerate pairs.
///
/// Returns `None` if no order was computed.
pub fn mean_order(estimates: &[OrderEstimate], norm: Norm) -> Option<f64> {
    let computed: nd::Array1<f64>
        = estimates.iter()
        .filter_map(|est| est.order(norm).value())
        .collect();
    computed.mean()
}
