// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

//! Measured quantities with first-order propagation of uncertainty.
//!
//! A [`Measurement`] pairs a nominal value with its standard uncertainty,
//! either as single `f64`s or as `ndarray` arrays of the same shape.
//! The usual operators, the functions in this crate, and the vector,
//! reduction, and grid helpers all return new measurements whose
//! uncertainties are propagated from their operands.
//!
//! ```
//! # use ndarray::array;
//! # use scimeasure::{Measurement, nansum, sqrt};
//! #
//! let side = Measurement::new(4.0, 0.4);
//! let root = sqrt(side);
//! assert_eq!(*root.value(), 2.0);
//!
//! let readings = Measurement::new(array![1.0, f64::NAN, 2.0], array![0.1, 0.1, 0.1]);
//! let total = nansum(&readings);
//! assert_eq!(*total.value(), 3.0);
//! ```
//!
//! Elementwise kernels over arrays run on the rayon thread pool when the
//! default `rayon` feature is enabled.

mod compare;
mod error;
mod float;
mod grid;
mod math;
mod measurement;
mod numeric;
mod ops;
mod reduce;
mod storage;
mod vector;

pub use compare::Operand;
pub use error::MeasurementError;
pub use float::{MeasurementArray, MeasurementArray1, MeasurementArray2, MeasurementArrayD};
pub use grid::meshgrid;
pub use math::{Propagate, arcsin, arctan, arctan2, cos, deg2rad, exp, ln, log10, sin, sqrt};
pub use measurement::{Element, Measurement};
pub use numeric::Uncertain;
pub use reduce::nansum;
pub use storage::Storage;
pub use vector::{cross, dot};
