//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Observed order](#observed-order)
//! - [Degenerate cases](#degenerate-cases)
//! - [Synthetic data](#synthetic-data)
//!
//! # Background
//! A consistent discretization of a PDE with formal order of accuracy *p* has,
//! in the asymptotic regime, a discretization error that behaves like
//! ```text
//! e(h) ≈ C hᵖ
//! ```
//! where *h* is the grid spacing and *C* is a constant independent of *h*.
//! Verifying a solver (e.g. an evolution code for the Einstein equations)
//! amounts to checking that the errors measured against a known exact solution
//! actually shrink at this rate as the grid is refined. Two norms of the error
//! field are tracked independently:
//! ```text
//!          ________________
//!         /  1   N
//! L2   = / --- Σ  |u[i] - u*(x[i])|²
//!       √   N  i=1
//!
//! L∞   = max |u[i] - u*(x[i])|
//!         i
//! ```
//! with *u* the numerical and *u*\* the exact solution. The L∞ norm is
//! sensitive to localized features (e.g. near a horizon or an excision
//! boundary) that the L2 norm averages away, so the two may converge at
//! different rates.
//!
//! # Observed order
//! Given errors *e*₁ and *e*₂ at spacings *h*₁ and *h*₂, eliminating *C* from
//! the two copies of the asymptotic relation gives the order observed between
//! the two resolutions,
//! ```text
//!     ln(e₂ / e₁)
//! p = -----------
//!     ln(h₂ / h₁)
//! ```
//! For a refinement factor of 2 (*h*₂ = *h*₁/2) a second-order scheme should
//! give *p* ≈ 2, i.e. each halving of the spacing divides the error by four.
//! Only adjacent entries of a series are compared, so for *N* resolutions one
//! obtains *N* - 1 estimates; a sequence of estimates that settles toward the
//! formal order indicates that the coarsest grids are already in the
//! asymptotic regime.
//!
//! # Degenerate cases
//! Errors are non-negative, so the logarithm can fail only through exact
//! zeros:
//! - *e*₁ = *e*₂ = 0: the solver reproduces the exact solution at both
//!   resolutions (as happens for flat space in many formulations). The order
//!   is formally infinite; this is reported as
//!   [`Order::PerfectConvergence`][crate::estimate::Order::PerfectConvergence].
//! - exactly one of *e*₁, *e*₂ is zero: the ratio is 0 or ∞ and no order can be
//!   assigned; this is
//!   [`Order::Undefined`][crate::estimate::Order::Undefined].
//! - any other non-finite result (e.g. *h*₁ = *h*₂) is also
//!   [`Order::Undefined`][crate::estimate::Order::Undefined].
//!
//! Neither case is an error. In line-delimited reports both become `null`,
//! since JSON has no representation for infinities.
//!
//! # Synthetic data
//! Without access to the solver, a single reference pair (*e*<sub>ref</sub>
//! measured at *h*<sub>ref</sub>) can be turned into a series by assuming an
//! order *q*,
//! ```text
//! e(h) = max(e_ref, floor) (h / h_ref)^q
//! ```
//! Estimating orders from such a series returns *q* exactly, by construction;
//! it exercises the reporting pipeline but says nothing about the solver.
//! Reports built this way are marked `"mode": "synthetic"`.
