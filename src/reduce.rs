// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use crate::{Measurement, storage::Storage};

/// Sums every element of a measurement, treating NaN as missing data.
///
/// NaN values are skipped in the sum of values. Uncertainties are combined in
/// quadrature over the finite entries only, so an element with a finite value
/// but a non-finite uncertainty still contributes its value.
/// An infinite value is not skipped and makes the sum infinite.
///
/// Returns a scalar measurement; the sum of an empty array is `0 ± 0`.
pub fn nansum<T: Storage>(m: &Measurement<T>) -> Measurement<f64> {
    let (value, skipped) = m.value.fold((0.0, 0_usize), |(sum, skipped), v| {
        if v.is_nan() {
            (sum, skipped + 1)
        } else {
            (sum + v, skipped)
        }
    });
    let (squares, excluded) = m.uncertainty.fold((0.0, 0_usize), |(acc, excluded), u| {
        if u.is_finite() {
            (acc + u * u, excluded)
        } else {
            (acc, excluded + 1)
        }
    });
    if skipped > 0 || excluded > 0 {
        log::debug!(
            "nansum over {} elements skipped {skipped} NaN values and {excluded} non-finite uncertainties",
            m.len()
        );
    }
    Measurement::from_parts((value, squares.sqrt()))
}

impl<T: Storage> Measurement<T> {
    /// See [`nansum`].
    pub fn nansum(&self) -> Measurement<f64> {
        nansum(self)
    }
}
