// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use ndarray::{Array, Dimension};
use num_traits::{Inv, One, Pow, Zero};

use crate::{Measurement, error::MeasurementError, storage::Storage};

/// Per-element propagation rules.
///
/// Each rule takes the value and uncertainty of a measurement, plus either a
/// second measurement or a plain operand, and returns the propagated value and
/// uncertainty.
/// Errors of two measurements are assumed independent and are combined in
/// quadrature.
pub(crate) mod kernel {
    #[inline]
    pub(crate) fn quadrature(a: f64, b: f64) -> f64 {
        (a * a + b * b).sqrt()
    }

    #[inline]
    pub(crate) fn add(v1: f64, u1: f64, v2: f64, u2: f64) -> (f64, f64) {
        (v1 + v2, quadrature(u1, u2))
    }

    #[inline]
    pub(crate) fn sub(v1: f64, u1: f64, v2: f64, u2: f64) -> (f64, f64) {
        (v1 - v2, quadrature(u1, u2))
    }

    #[inline]
    pub(crate) fn mul(v1: f64, u1: f64, v2: f64, u2: f64) -> (f64, f64) {
        let value = v1 * v2;
        (value, (quadrature(u1 / v1, u2 / v2) * value).abs())
    }

    #[inline]
    pub(crate) fn div(v1: f64, u1: f64, v2: f64, u2: f64) -> (f64, f64) {
        let value = v1 / v2;
        (value, (quadrature(u1 / v1, u2 / v2) * value).abs())
    }

    // Plain operand on the right

    #[inline]
    pub(crate) fn add_plain(v: f64, u: f64, p: f64) -> (f64, f64) {
        (v + p, u)
    }

    #[inline]
    pub(crate) fn sub_plain(v: f64, u: f64, p: f64) -> (f64, f64) {
        (v - p, u)
    }

    #[inline]
    pub(crate) fn mul_plain(v: f64, u: f64, p: f64) -> (f64, f64) {
        (v * p, (u * p).abs())
    }

    #[inline]
    pub(crate) fn div_plain(v: f64, u: f64, p: f64) -> (f64, f64) {
        (v / p, (u / p).abs())
    }

    // Plain operand on the left

    #[inline]
    pub(crate) fn add_reflected(v: f64, u: f64, p: f64) -> (f64, f64) {
        (p + v, u)
    }

    /// `p - m` is evaluated as `m * -1 + p`.
    #[inline]
    pub(crate) fn sub_reflected(v: f64, u: f64, p: f64) -> (f64, f64) {
        let (v, u) = mul_plain(v, u, -1.0);
        add_plain(v, u, p)
    }

    #[inline]
    pub(crate) fn mul_reflected(v: f64, u: f64, p: f64) -> (f64, f64) {
        (p * v, (p * u).abs())
    }

    /// `p / m` is evaluated as `p * m^-1`.
    #[inline]
    pub(crate) fn div_reflected(v: f64, u: f64, p: f64) -> (f64, f64) {
        let (v, u) = powf(v, u, -1.0);
        mul_reflected(v, u, p)
    }

    #[inline]
    pub(crate) fn powf(v: f64, u: f64, power: f64) -> (f64, f64) {
        let value = v.powf(power);
        (value, (value * power * u / v).abs())
    }

    #[inline]
    pub(crate) fn powi(v: f64, u: f64, power: i32) -> (f64, f64) {
        let value = v.powi(power);
        (value, (value * f64::from(power) * u / v).abs())
    }
}

macro_rules! impl_arithmetic {
    ($Op:ident, $op:ident, $checked:ident, $both:path, $plain:path, $reflected:path) => {
        impl<T: Storage> $Op for Measurement<T> {
            type Output = Self;

            fn $op(self, rhs: Self) -> Self {
                self.combine(&rhs, $both)
            }
        }

        impl<T: Storage> $Op<&Measurement<T>> for Measurement<T> {
            type Output = Self;

            fn $op(self, rhs: &Self) -> Self {
                self.combine(rhs, $both)
            }
        }

        impl<T: Storage> $Op for &Measurement<T> {
            type Output = Measurement<T>;

            fn $op(self, rhs: Self) -> Measurement<T> {
                self.combine(rhs, $both)
            }
        }

        impl<D: Dimension> $Op<Array<f64, D>> for Measurement<Array<f64, D>> {
            type Output = Self;

            fn $op(self, rhs: Array<f64, D>) -> Self {
                self.combine_plain(&rhs, $plain)
            }
        }

        impl<D: Dimension> $Op<&Array<f64, D>> for &Measurement<Array<f64, D>> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: &Array<f64, D>) -> Measurement<Array<f64, D>> {
                self.combine_plain(rhs, $plain)
            }
        }

        impl<D: Dimension> $Op<Measurement<Array<f64, D>>> for Array<f64, D> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: Measurement<Array<f64, D>>) -> Measurement<Array<f64, D>> {
                rhs.combine_plain(&self, $reflected)
            }
        }

        impl<D: Dimension> $Op<&Measurement<Array<f64, D>>> for &Array<f64, D> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: &Measurement<Array<f64, D>>) -> Measurement<Array<f64, D>> {
                rhs.combine_plain(self, $reflected)
            }
        }

        impl<T: Storage> Measurement<T> {
            /// Like the operator, but fails with
            /// [`MeasurementError::ShapeMismatch`] instead of panicking when
            /// the operands have different shapes.
            pub fn $checked(&self, rhs: &Self) -> Result<Self, MeasurementError> {
                self.check_shape(rhs)?;
                Ok(self.combine(rhs, $both))
            }
        }
    };
}

impl_arithmetic!(Add, add, checked_add, kernel::add, kernel::add_plain, kernel::add_reflected);
impl_arithmetic!(Sub, sub, checked_sub, kernel::sub, kernel::sub_plain, kernel::sub_reflected);
impl_arithmetic!(Mul, mul, checked_mul, kernel::mul, kernel::mul_plain, kernel::mul_reflected);
impl_arithmetic!(Div, div, checked_div, kernel::div, kernel::div_plain, kernel::div_reflected);

macro_rules! impl_arithmetic_scalar {
    ($t:ty, $Op:ident, $op:ident, $plain:path, $reflected:path) => {
        impl<T: Storage> $Op<$t> for Measurement<T> {
            type Output = Self;

            fn $op(self, rhs: $t) -> Self {
                let rhs = f64::from(rhs);
                self.propagate(move |v, u| $plain(v, u, rhs))
            }
        }

        impl<T: Storage> $Op<$t> for &Measurement<T> {
            type Output = Measurement<T>;

            fn $op(self, rhs: $t) -> Measurement<T> {
                let rhs = f64::from(rhs);
                self.propagate(move |v, u| $plain(v, u, rhs))
            }
        }

        impl<T: Storage> $Op<Measurement<T>> for $t {
            type Output = Measurement<T>;

            fn $op(self, rhs: Measurement<T>) -> Measurement<T> {
                let lhs = f64::from(self);
                rhs.propagate(move |v, u| $reflected(v, u, lhs))
            }
        }

        impl<T: Storage> $Op<&Measurement<T>> for $t {
            type Output = Measurement<T>;

            fn $op(self, rhs: &Measurement<T>) -> Measurement<T> {
                let lhs = f64::from(self);
                rhs.propagate(move |v, u| $reflected(v, u, lhs))
            }
        }
    };
    ($t:ty) => {
        impl_arithmetic_scalar!($t, Add, add, kernel::add_plain, kernel::add_reflected);
        impl_arithmetic_scalar!($t, Sub, sub, kernel::sub_plain, kernel::sub_reflected);
        impl_arithmetic_scalar!($t, Mul, mul, kernel::mul_plain, kernel::mul_reflected);
        impl_arithmetic_scalar!($t, Div, div, kernel::div_plain, kernel::div_reflected);
    };
}

impl_arithmetic_scalar!(f64);
impl_arithmetic_scalar!(i32);

// A single measurement is broadcast over every element of the array operand.
macro_rules! impl_arithmetic_broadcast {
    ($Op:ident, $op:ident, $both:path, $plain:path, $reflected:path) => {
        impl<D: Dimension> $Op<&Measurement<Array<f64, D>>> for &Measurement<f64> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: &Measurement<Array<f64, D>>) -> Measurement<Array<f64, D>> {
                let (sv, su) = (self.value, self.uncertainty);
                rhs.propagate(move |v, u| $both(sv, su, v, u))
            }
        }

        impl<D: Dimension> $Op<Measurement<Array<f64, D>>> for Measurement<f64> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: Measurement<Array<f64, D>>) -> Measurement<Array<f64, D>> {
                $Op::$op(&self, &rhs)
            }
        }

        impl<D: Dimension> $Op<&Measurement<f64>> for &Measurement<Array<f64, D>> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: &Measurement<f64>) -> Measurement<Array<f64, D>> {
                let (sv, su) = (rhs.value, rhs.uncertainty);
                self.propagate(move |v, u| $both(v, u, sv, su))
            }
        }

        impl<D: Dimension> $Op<Measurement<f64>> for Measurement<Array<f64, D>> {
            type Output = Self;

            fn $op(self, rhs: Measurement<f64>) -> Self {
                $Op::$op(&self, &rhs)
            }
        }

        impl<D: Dimension> $Op<&Array<f64, D>> for &Measurement<f64> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: &Array<f64, D>) -> Measurement<Array<f64, D>> {
                let (sv, su) = (self.value, self.uncertainty);
                Measurement::from_parts(Storage::map_pair(rhs, rhs, move |p, _| $plain(sv, su, p)))
            }
        }

        impl<D: Dimension> $Op<Array<f64, D>> for Measurement<f64> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: Array<f64, D>) -> Measurement<Array<f64, D>> {
                $Op::$op(&self, &rhs)
            }
        }

        impl<D: Dimension> $Op<&Measurement<f64>> for &Array<f64, D> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: &Measurement<f64>) -> Measurement<Array<f64, D>> {
                let (sv, su) = (rhs.value, rhs.uncertainty);
                Measurement::from_parts(Storage::map_pair(self, self, move |p, _| $reflected(sv, su, p)))
            }
        }

        impl<D: Dimension> $Op<Measurement<f64>> for Array<f64, D> {
            type Output = Measurement<Array<f64, D>>;

            fn $op(self, rhs: Measurement<f64>) -> Measurement<Array<f64, D>> {
                $Op::$op(&self, &rhs)
            }
        }
    };
}

impl_arithmetic_broadcast!(Add, add, kernel::add, kernel::add_plain, kernel::add_reflected);
impl_arithmetic_broadcast!(Sub, sub, kernel::sub, kernel::sub_plain, kernel::sub_reflected);
impl_arithmetic_broadcast!(Mul, mul, kernel::mul, kernel::mul_plain, kernel::mul_reflected);
impl_arithmetic_broadcast!(Div, div, kernel::div, kernel::div_plain, kernel::div_reflected);

macro_rules! impl_assign {
    ($OpAssign:ident, $op_assign:ident, $Op:ident, $op:ident) => {
        impl<T: Storage, R> $OpAssign<R> for Measurement<T>
        where
            Measurement<T>: $Op<R, Output = Measurement<T>>,
        {
            fn $op_assign(&mut self, rhs: R) {
                let lhs = std::mem::take(self);
                *self = $Op::$op(lhs, rhs);
            }
        }
    };
}

impl_assign!(AddAssign, add_assign, Add, add);
impl_assign!(SubAssign, sub_assign, Sub, sub);
impl_assign!(MulAssign, mul_assign, Mul, mul);
impl_assign!(DivAssign, div_assign, Div, div);

impl<T: Storage> Neg for Measurement<T> {
    type Output = Self;

    fn neg(self) -> Self {
        self.propagate(|v, u| (-v, u))
    }
}

impl<T: Storage> Neg for &Measurement<T> {
    type Output = Measurement<T>;

    fn neg(self) -> Measurement<T> {
        self.propagate(|v, u| (-v, u))
    }
}

impl<T: Storage> Measurement<T> {
    /// Raises the measurement to a plain power.
    ///
    /// The uncertainty is `|v^p · p · u / v|`.
    /// Raising to the power of another measurement is not supported.
    pub fn powf(&self, power: f64) -> Self {
        self.propagate(move |v, u| kernel::powf(v, u, power))
    }

    /// Raises the measurement to an integer power.
    pub fn powi(&self, power: i32) -> Self {
        self.propagate(move |v, u| kernel::powi(v, u, power))
    }

    /// Returns the absolute value, leaving the uncertainty unchanged.
    pub fn abs(&self) -> Self {
        self.propagate(|v, u| (v.abs(), u))
    }

    fn check_shape(&self, rhs: &Self) -> Result<(), MeasurementError> {
        let expected = self.shape();
        let found = rhs.shape();
        if expected == found {
            Ok(())
        } else {
            Err(MeasurementError::ShapeMismatch { expected, found })
        }
    }
}

impl<T: Storage> Pow<f64> for Measurement<T> {
    type Output = Self;

    fn pow(self, rhs: f64) -> Self {
        self.powf(rhs)
    }
}

impl<T: Storage> Pow<f64> for &Measurement<T> {
    type Output = Measurement<T>;

    fn pow(self, rhs: f64) -> Measurement<T> {
        self.powf(rhs)
    }
}

impl<T: Storage> Pow<i32> for Measurement<T> {
    type Output = Self;

    fn pow(self, rhs: i32) -> Self {
        self.powi(rhs)
    }
}

impl<T: Storage> Pow<i32> for &Measurement<T> {
    type Output = Measurement<T>;

    fn pow(self, rhs: i32) -> Measurement<T> {
        self.powi(rhs)
    }
}

impl<T: Storage> Inv for Measurement<T> {
    type Output = Self;

    #[inline]
    fn inv(self) -> Self {
        self.powf(-1.0)
    }
}

impl<T: Storage> Inv for &Measurement<T> {
    type Output = Measurement<T>;

    #[inline]
    fn inv(self) -> Measurement<T> {
        self.powf(-1.0)
    }
}

impl Zero for Measurement<f64> {
    #[inline]
    fn zero() -> Self {
        Self::exact(0.0)
    }

    /// Returns true if the value is zero, regardless of any uncertainty.
    #[inline]
    fn is_zero(&self) -> bool {
        self.value == 0.0
    }
}

impl One for Measurement<f64> {
    #[inline]
    fn one() -> Self {
        Self::exact(1.0)
    }
}
