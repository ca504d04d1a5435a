// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;

use ndarray::{Array, Dimension};

use crate::{Measurement, numeric::Uncertain, storage::Storage};

// Ordering and equality only ever look at the nominal value.

impl<R: Uncertain> PartialEq<R> for Measurement<f64> {
    fn eq(&self, other: &R) -> bool {
        self.value == other.number()
    }
}

impl<R: Uncertain> PartialOrd<R> for Measurement<f64> {
    fn partial_cmp(&self, other: &R) -> Option<Ordering> {
        self.value.partial_cmp(&other.number())
    }
}

impl PartialEq<Measurement<f64>> for f64 {
    fn eq(&self, other: &Measurement<f64>) -> bool {
        *self == other.value
    }
}

impl PartialOrd<Measurement<f64>> for f64 {
    fn partial_cmp(&self, other: &Measurement<f64>) -> Option<Ordering> {
        self.partial_cmp(&other.value)
    }
}

/// The right-hand side of an elementwise comparison.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a, T> {
    /// Another measurement of the same shape.
    Measured(&'a Measurement<T>),
    /// A plain value of the same shape.
    Plain(&'a T),
    /// A single number, compared against every element.
    Scalar(f64),
}

impl<'a, T> From<&'a Measurement<T>> for Operand<'a, T> {
    fn from(m: &'a Measurement<T>) -> Self {
        Operand::Measured(m)
    }
}

impl<'a, D: Dimension> From<&'a Array<f64, D>> for Operand<'a, Array<f64, D>> {
    fn from(a: &'a Array<f64, D>) -> Self {
        Operand::Plain(a)
    }
}

impl<T> From<f64> for Operand<'_, T> {
    fn from(n: f64) -> Self {
        Operand::Scalar(n)
    }
}

impl<T: Storage> Measurement<T> {
    /// Compares the nominal value with `rhs`, ignoring any uncertainty.
    ///
    /// Returns a `bool` for a scalar measurement and an array of `bool` for an
    /// array measurement.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is an array or array measurement of a different shape.
    ///
    /// # Example
    ///
    /// ```
    /// # use ndarray::array;
    /// # use scimeasure::Measurement;
    /// #
    /// let m = Measurement::new(array![1.0, 2.0, 3.0], array![0.5, 0.5, 0.5]);
    /// assert_eq!(m.greater_than(1.5), array![false, true, true]);
    /// ```
    pub fn greater_than<'a>(&self, rhs: impl Into<Operand<'a, T>>) -> T::Mask
    where
        T: 'a,
    {
        self.compare_nominal(rhs.into(), |a, b| a > b)
    }

    /// Compares the nominal value with `rhs`, ignoring any uncertainty.
    ///
    /// `m.less_than(x)` is the reflected form of `x > m`.
    pub fn less_than<'a>(&self, rhs: impl Into<Operand<'a, T>>) -> T::Mask
    where
        T: 'a,
    {
        self.compare_nominal(rhs.into(), |a, b| a < b)
    }

    fn compare_nominal<F>(&self, rhs: Operand<'_, T>, f: F) -> T::Mask
    where
        F: Fn(f64, f64) -> bool,
    {
        match rhs {
            Operand::Measured(m) => self.value.compare(&m.value, f),
            Operand::Plain(p) => self.value.compare(p, f),
            Operand::Scalar(n) => self.value.compare_scalar(n, f),
        }
    }
}
