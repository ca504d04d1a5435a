// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use std::{
    f64::consts::{LN_10, PI},
    ops::{Div, Mul},
};

use crate::{Measurement, ops::kernel, storage::Storage};

/// Uncertainty-aware mathematical functions.
///
/// Implemented for plain `f64`s, which behave exactly like the corresponding
/// `f64` methods, and for measurements (owned or by reference), which
/// propagate the uncertainty to first order as `|f'(v)| · u`.
/// The free functions of this module ([`cos`], [`sin`], ...) dispatch to
/// whichever implementation matches their argument.
///
/// Domain errors are not reported: evaluating a function outside its domain
/// yields NaN, just as it does for `f64`.
pub trait Propagate {
    type Output;

    fn cos(self) -> Self::Output;

    fn sin(self) -> Self::Output;

    fn arctan(self) -> Self::Output;

    /// Four-quadrant arctangent of `self / other`.
    fn arctan2(self, other: Self) -> Self::Output;

    fn arcsin(self) -> Self::Output;

    fn sqrt(self) -> Self::Output;

    fn ln(self) -> Self::Output;

    fn log10(self) -> Self::Output;

    fn exp(self) -> Self::Output;
}

impl Propagate for f64 {
    type Output = f64;

    fn cos(self) -> f64 {
        f64::cos(self)
    }

    fn sin(self) -> f64 {
        f64::sin(self)
    }

    fn arctan(self) -> f64 {
        f64::atan(self)
    }

    fn arctan2(self, other: f64) -> f64 {
        f64::atan2(self, other)
    }

    fn arcsin(self) -> f64 {
        f64::asin(self)
    }

    fn sqrt(self) -> f64 {
        f64::sqrt(self)
    }

    fn ln(self) -> f64 {
        f64::ln(self)
    }

    fn log10(self) -> f64 {
        f64::log10(self)
    }

    fn exp(self) -> f64 {
        f64::exp(self)
    }
}

impl<T: Storage> Measurement<T> {
    /// Returns `(cos v, |sin v · u|)`.
    pub fn cos(&self) -> Self {
        self.propagate(|v, u| (v.cos(), (v.sin() * u).abs()))
    }

    /// Returns `(sin v, |cos v · u|)`.
    pub fn sin(&self) -> Self {
        self.propagate(|v, u| (v.sin(), (v.cos() * u).abs()))
    }

    /// Returns `(atan v, |u / (1 + v²)|)`.
    pub fn arctan(&self) -> Self {
        self.propagate(|v, u| (v.atan(), (u / (1.0 + v * v)).abs()))
    }

    /// Four-quadrant arctangent of `self / other`.
    ///
    /// The uncertainty is derived from the ratio `z = self / other`, itself
    /// propagated as a division of measurements, as `|u_z / (1 + v_z²)|`.
    pub fn arctan2(&self, other: &Self) -> Self {
        self.combine(other, |vx, ux, vy, uy| {
            let (zv, zu) = kernel::div(vx, ux, vy, uy);
            (vx.atan2(vy), (zu / (1.0 + zv * zv)).abs())
        })
    }

    /// Returns `(asin v, |u / sqrt(1 - v²)|)`.
    pub fn arcsin(&self) -> Self {
        self.propagate(|v, u| (v.asin(), (u / (1.0 - v * v).sqrt()).abs()))
    }

    /// Returns `(sqrt v, 0.5 · |u / sqrt v|)`.
    pub fn sqrt(&self) -> Self {
        self.propagate(|v, u| {
            let root = v.sqrt();
            (root, 0.5 * (u / root).abs())
        })
    }

    /// Returns `(ln v, |u / v|)`.
    pub fn ln(&self) -> Self {
        self.propagate(|v, u| (v.ln(), (u / v).abs()))
    }

    /// Returns `(log10 v, |u / (ln 10 · v)|)`.
    pub fn log10(&self) -> Self {
        self.propagate(|v, u| (v.log10(), (u / (LN_10 * v)).abs()))
    }

    /// Returns `(e^v, |e^v| · u)`.
    pub fn exp(&self) -> Self {
        self.propagate(|v, u| {
            let value = v.exp();
            (value, value.abs() * u)
        })
    }
}

macro_rules! impl_propagate {
    ($($f:ident),*) => {
        impl<T: Storage> Propagate for Measurement<T> {
            type Output = Self;

            $(
                fn $f(self) -> Self {
                    Measurement::$f(&self)
                }
            )*

            fn arctan2(self, other: Self) -> Self {
                Measurement::arctan2(&self, &other)
            }
        }

        impl<T: Storage> Propagate for &Measurement<T> {
            type Output = Measurement<T>;

            $(
                fn $f(self) -> Measurement<T> {
                    Measurement::$f(self)
                }
            )*

            fn arctan2(self, other: Self) -> Measurement<T> {
                Measurement::arctan2(self, other)
            }
        }
    };
}

impl_propagate!(cos, sin, arctan, arcsin, sqrt, ln, log10, exp);

pub fn cos<X: Propagate>(x: X) -> X::Output {
    x.cos()
}

pub fn sin<X: Propagate>(x: X) -> X::Output {
    x.sin()
}

pub fn arctan<X: Propagate>(x: X) -> X::Output {
    x.arctan()
}

/// Four-quadrant arctangent of `x / y`.
pub fn arctan2<X: Propagate>(x: X, y: X) -> X::Output {
    x.arctan2(y)
}

pub fn arcsin<X: Propagate>(x: X) -> X::Output {
    x.arcsin()
}

pub fn sqrt<X: Propagate>(x: X) -> X::Output {
    x.sqrt()
}

pub fn ln<X: Propagate>(x: X) -> X::Output {
    x.ln()
}

pub fn log10<X: Propagate>(x: X) -> X::Output {
    x.log10()
}

pub fn exp<X: Propagate>(x: X) -> X::Output {
    x.exp()
}

/// Converts degrees to radians as `x · π / 180`.
///
/// For a measurement this is an ordinary multiplication and division by
/// plain numbers, so the uncertainty is scaled by the same factor.
pub fn deg2rad<X>(x: X) -> <X::Output as Div<f64>>::Output
where
    X: Mul<f64>,
    X::Output: Div<f64>,
{
    x * PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn plain_numbers_are_untouched() {
        assert_eq!(cos(0.0), 1.0);
        assert_eq!(sin(0.5), 0.5_f64.sin());
        assert_eq!(arctan(1.0), FRAC_PI_4);
        assert_eq!(arctan2(1.0, -1.0), 1.0_f64.atan2(-1.0));
        assert_eq!(sqrt(9.0), 3.0);
        assert_relative_eq!(deg2rad(180.0), PI, max_relative = 1e-12);
    }

    #[test]
    fn cosine() {
        let result = cos(Measurement::new(0.0, 0.1));
        assert_eq!(*result.value(), 1.0);
        assert_eq!(*result.uncertainty(), 0.0);
        let result = cos(Measurement::new(PI / 2.0, 0.1));
        assert_abs_diff_eq!(*result.value(), 0.0, epsilon = 1e-15);
        assert_relative_eq!(*result.uncertainty(), 0.1, max_relative = 1e-12);
    }

    #[test]
    fn sine() {
        let result = sin(&Measurement::new(0.0, 0.1));
        assert_eq!(*result.value(), 0.0);
        assert_eq!(*result.uncertainty(), 0.1);
        let result = Measurement::new(-PI / 2.0, 0.2).sin();
        assert_relative_eq!(*result.value(), -1.0, max_relative = 1e-12);
        assert_abs_diff_eq!(*result.uncertainty(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn arctangent() {
        let result = arctan(Measurement::new(1.0, 0.2));
        assert_relative_eq!(*result.value(), FRAC_PI_4, max_relative = 1e-12);
        assert_relative_eq!(*result.uncertainty(), 0.1, max_relative = 1e-12);
    }

    #[test]
    fn arctangent_of_negative_uncertainty() {
        let a = [
            Measurement::new(1.0, 1.0),
            Measurement::new(2.0, 0.0),
            Measurement::new(3.0, 2.0),
        ];
        let b = [
            Measurement::new(4.0, 0.0),
            Measurement::new(5.0, 1.0),
            Measurement::new(6.0, 1.0),
        ];
        // The cross product leaves -3 ± -2 in the first component
        let c = crate::cross(&a, &b);
        assert_eq!(*c[0].uncertainty(), -2.0);
        let result = arctan(c[0]);
        assert_relative_eq!(*result.value(), (-3.0_f64).atan(), max_relative = 1e-12);
        assert_relative_eq!(*result.uncertainty(), 0.2, max_relative = 1e-12);
    }

    #[test]
    fn arctangent2() {
        let x = Measurement::new(1.0, 0.1);
        let y = Measurement::new(1.0, 0.1);
        let result = arctan2(&x, &y);
        assert_relative_eq!(*result.value(), FRAC_PI_4, max_relative = 1e-12);
        // z = 1 ± 0.1·√2
        assert_relative_eq!(*result.uncertainty(), 0.1 * 2.0_f64.sqrt() / 2.0, max_relative = 1e-12);
        // Second quadrant keeps the sign information of both parts
        let result = arctan2(Measurement::new(1.0, 0.1), Measurement::new(-1.0, 0.1));
        assert_relative_eq!(*result.value(), 3.0 * FRAC_PI_4, max_relative = 1e-12);
        assert!(*result.uncertainty() >= 0.0);
    }

    #[test]
    fn arcsine() {
        let result = arcsin(Measurement::new(0.5, 0.3));
        assert_relative_eq!(*result.value(), PI / 6.0, max_relative = 1e-12);
        assert_relative_eq!(*result.uncertainty(), 0.3 / 0.75_f64.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn arcsine_outside_domain_is_nan() {
        let result = arcsin(Measurement::new(2.0, 0.1));
        assert!(result.value().is_nan());
        assert!(result.uncertainty().is_nan());
    }

    #[test]
    fn square_root() {
        let result = sqrt(Measurement::new(4.0, 0.4));
        assert_eq!(*result.value(), 2.0);
        assert_relative_eq!(*result.uncertainty(), 0.1, max_relative = 1e-12);
    }

    #[test]
    fn natural_log() {
        let n1 = Measurement::new(20.0, 2.0);
        let n2 = Measurement::new(30.0, 5.0);
        let result = ln(n1 / n2);
        assert_relative_eq!(*result.uncertainty(), 0.194365063161, max_relative = 1e-9);
    }

    #[test]
    fn log_base10() {
        let n1 = Measurement::new(20.0, 2.0);
        let n2 = Measurement::new(30.0, 5.0);
        let result = log10(n1 / n2);
        assert_relative_eq!(*result.uncertainty(), 0.08441167440582, max_relative = 1e-9);
    }

    #[test]
    fn exponential() {
        let n1 = Measurement::new(20.0, 2.0);
        let n2 = Measurement::new(30.0, 5.0);
        let result = exp(n1 / n2);
        assert_relative_eq!(*result.uncertainty(), 0.25238096660761, max_relative = 1e-9);
    }

    #[test]
    fn degrees_to_radians() {
        let result = deg2rad(Measurement::new(180.0, 18.0));
        assert_relative_eq!(*result.value(), PI, max_relative = 1e-12);
        assert_relative_eq!(*result.uncertainty(), PI / 10.0, max_relative = 1e-12);
        let result = deg2rad(&Measurement::new(array![90.0, -45.0], array![9.0, 4.5]));
        assert_relative_eq!(result.value()[0], PI / 2.0, max_relative = 1e-12);
        assert_relative_eq!(result.value()[1], -PI / 4.0, max_relative = 1e-12);
        assert_relative_eq!(result.uncertainty()[1], PI / 40.0, max_relative = 1e-12);
    }

    #[test]
    fn elementwise_over_arrays() {
        let m = Measurement::new(array![0.0, 4.0, 9.0], array![0.1, 0.4, 0.6]);
        let result = sqrt(&m);
        assert_eq!(result.value(), &array![0.0, 2.0, 3.0]);
        // The derivative diverges at zero
        assert!(result.uncertainty()[0].is_infinite());
        assert_relative_eq!(result.uncertainty()[1], 0.1, max_relative = 1e-12);
        assert_relative_eq!(result.uncertainty()[2], 0.1, max_relative = 1e-12);
    }
}
