// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use crate::Measurement;

/// A trait for single numbers that may have an associated uncertainty.
///
/// A plain `f64` is an exact number with zero uncertainty, which lets it take
/// part in comparisons with a [`Measurement`] on either side.
pub trait Uncertain {
    /// Returns the number without its uncertainty.
    fn number(&self) -> f64;

    /// Returns the absolute uncertainty.
    fn absolute_uncertainty(&self) -> f64;

    /// Returns the relative uncertainty, `|u / v|`.
    ///
    /// This is infinite or NaN for a number of zero.
    #[inline]
    fn relative_uncertainty(&self) -> f64 {
        (self.absolute_uncertainty() / self.number()).abs()
    }

    /// Returns true if the uncertainty is zero.
    #[inline]
    fn is_exact(&self) -> bool {
        self.absolute_uncertainty() == 0.0
    }
}

impl Uncertain for f64 {
    #[inline]
    fn number(&self) -> f64 {
        *self
    }

    #[inline]
    fn absolute_uncertainty(&self) -> f64 {
        0.0
    }
}

impl Uncertain for Measurement<f64> {
    #[inline]
    fn number(&self) -> f64 {
        self.value
    }

    #[inline]
    fn absolute_uncertainty(&self) -> f64 {
        self.uncertainty
    }
}
