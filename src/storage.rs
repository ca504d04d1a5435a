// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use std::fmt::Debug;

use ndarray::{Array, Dimension, Zip};

// Runs a zipped kernel over all elements, in parallel when the `rayon`
// feature is enabled.
macro_rules! drive {
    ($zip:expr, $f:expr) => {{
        #[cfg(feature = "rayon")]
        $zip.par_for_each($f);
        #[cfg(not(feature = "rayon"))]
        $zip.for_each($f);
    }};
}

/// Backing storage for the value and uncertainty of a
/// [`Measurement`](crate::Measurement).
///
/// Implemented for `f64`, holding a single measurement, and for
/// `ndarray::Array<f64, D>`, holding one measurement per element.
/// Every propagation rule is written once as a kernel over plain `f64`s and
/// handed to the storage, which applies it to each element independently.
/// Each output element depends only on the corresponding input elements, so
/// the array implementation is free to evaluate kernels in parallel.
///
/// Array implementations panic if the operands do not share a shape, in the
/// same way that `ndarray`'s own operators do.
pub trait Storage: Clone + Debug + Default {
    /// The result of an elementwise comparison: `bool` for a scalar, an array
    /// of `bool` for an array.
    type Mask;

    /// Returns the number of elements. A scalar has one.
    fn len(&self) -> usize;

    /// Returns the shape. A scalar has an empty shape.
    fn shape(&self) -> Vec<usize>;

    /// Applies `f` to every (value, uncertainty) pair.
    fn map_pair<F>(value: &Self, uncertainty: &Self, f: F) -> (Self, Self)
    where
        F: Fn(f64, f64) -> (f64, f64) + Sync + Send;

    /// Applies `f` to every (value, uncertainty, plain operand) triple.
    fn zip_plain<F>(value: &Self, uncertainty: &Self, plain: &Self, f: F) -> (Self, Self)
    where
        F: Fn(f64, f64, f64) -> (f64, f64) + Sync + Send;

    /// Applies `f` to the (value, uncertainty) pairs of two measurements.
    fn zip_pairs<F>(lhs: (&Self, &Self), rhs: (&Self, &Self), f: F) -> (Self, Self)
    where
        F: Fn(f64, f64, f64, f64) -> (f64, f64) + Sync + Send;

    /// Computes `a * b - c * d` elementwise.
    fn cross_term(a: &Self, b: &Self, c: &Self, d: &Self) -> Self;

    fn compare<F>(&self, other: &Self, f: F) -> Self::Mask
    where
        F: Fn(f64, f64) -> bool;

    fn compare_scalar<F>(&self, other: f64, f: F) -> Self::Mask
    where
        F: Fn(f64, f64) -> bool;

    /// Folds over every element in logical order.
    fn fold<B, F>(&self, init: B, f: F) -> B
    where
        F: FnMut(B, f64) -> B;
}

impl Storage for f64 {
    type Mask = bool;

    #[inline]
    fn len(&self) -> usize {
        1
    }

    #[inline]
    fn shape(&self) -> Vec<usize> {
        Vec::new()
    }

    #[inline]
    fn map_pair<F>(value: &Self, uncertainty: &Self, f: F) -> (Self, Self)
    where
        F: Fn(f64, f64) -> (f64, f64) + Sync + Send,
    {
        f(*value, *uncertainty)
    }

    #[inline]
    fn zip_plain<F>(value: &Self, uncertainty: &Self, plain: &Self, f: F) -> (Self, Self)
    where
        F: Fn(f64, f64, f64) -> (f64, f64) + Sync + Send,
    {
        f(*value, *uncertainty, *plain)
    }

    #[inline]
    fn zip_pairs<F>(lhs: (&Self, &Self), rhs: (&Self, &Self), f: F) -> (Self, Self)
    where
        F: Fn(f64, f64, f64, f64) -> (f64, f64) + Sync + Send,
    {
        f(*lhs.0, *lhs.1, *rhs.0, *rhs.1)
    }

    #[inline]
    fn cross_term(a: &Self, b: &Self, c: &Self, d: &Self) -> Self {
        a * b - c * d
    }

    #[inline]
    fn compare<F>(&self, other: &Self, f: F) -> bool
    where
        F: Fn(f64, f64) -> bool,
    {
        f(*self, *other)
    }

    #[inline]
    fn compare_scalar<F>(&self, other: f64, f: F) -> bool
    where
        F: Fn(f64, f64) -> bool,
    {
        f(*self, other)
    }

    #[inline]
    fn fold<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, f64) -> B,
    {
        f(init, *self)
    }
}

impl<D: Dimension> Storage for Array<f64, D> {
    type Mask = Array<bool, D>;

    fn len(&self) -> usize {
        self.len()
    }

    fn shape(&self) -> Vec<usize> {
        self.shape().to_vec()
    }

    fn map_pair<F>(value: &Self, uncertainty: &Self, f: F) -> (Self, Self)
    where
        F: Fn(f64, f64) -> (f64, f64) + Sync + Send,
    {
        let mut out_value = Array::zeros(value.raw_dim());
        let mut out_uncertainty = Array::zeros(value.raw_dim());
        drive!(
            Zip::from(&mut out_value)
                .and(&mut out_uncertainty)
                .and(value)
                .and(uncertainty),
            |ov, ou, &v, &u| {
                (*ov, *ou) = f(v, u);
            }
        );
        (out_value, out_uncertainty)
    }

    fn zip_plain<F>(value: &Self, uncertainty: &Self, plain: &Self, f: F) -> (Self, Self)
    where
        F: Fn(f64, f64, f64) -> (f64, f64) + Sync + Send,
    {
        let mut out_value = Array::zeros(value.raw_dim());
        let mut out_uncertainty = Array::zeros(value.raw_dim());
        drive!(
            Zip::from(&mut out_value)
                .and(&mut out_uncertainty)
                .and(value)
                .and(uncertainty)
                .and(plain),
            |ov, ou, &v, &u, &p| {
                (*ov, *ou) = f(v, u, p);
            }
        );
        (out_value, out_uncertainty)
    }

    fn zip_pairs<F>(lhs: (&Self, &Self), rhs: (&Self, &Self), f: F) -> (Self, Self)
    where
        F: Fn(f64, f64, f64, f64) -> (f64, f64) + Sync + Send,
    {
        let mut out_value = Array::zeros(lhs.0.raw_dim());
        let mut out_uncertainty = Array::zeros(lhs.0.raw_dim());
        drive!(
            Zip::from(&mut out_value)
                .and(&mut out_uncertainty)
                .and(lhs.0)
                .and(lhs.1)
                .and(rhs.0)
                .and(rhs.1),
            |ov, ou, &v1, &u1, &v2, &u2| {
                (*ov, *ou) = f(v1, u1, v2, u2);
            }
        );
        (out_value, out_uncertainty)
    }

    fn cross_term(a: &Self, b: &Self, c: &Self, d: &Self) -> Self {
        let mut out = Array::zeros(a.raw_dim());
        drive!(
            Zip::from(&mut out).and(a).and(b).and(c).and(d),
            |o, &a, &b, &c, &d| {
                *o = a * b - c * d;
            }
        );
        out
    }

    fn compare<F>(&self, other: &Self, f: F) -> Array<bool, D>
    where
        F: Fn(f64, f64) -> bool,
    {
        Zip::from(self).and(other).map_collect(|&a, &b| f(a, b))
    }

    fn compare_scalar<F>(&self, other: f64, f: F) -> Array<bool, D>
    where
        F: Fn(f64, f64) -> bool,
    {
        self.mapv(|a| f(a, other))
    }

    fn fold<B, F>(&self, init: B, f: F) -> B
    where
        F: FnMut(B, f64) -> B,
    {
        self.iter().copied().fold(init, f)
    }
}
