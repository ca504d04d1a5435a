// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use ndarray::{Array1, Array2};

use crate::Measurement;

// Cartesian ("xy") meshgrid: rows follow `y`, columns follow `x`.
fn mesh(x: &Array1<f64>, y: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let shape = (y.len(), x.len());
    (
        Array2::from_shape_fn(shape, |(_, j)| x[j]),
        Array2::from_shape_fn(shape, |(i, _)| y[i]),
    )
}

/// Builds coordinate grids from two rows of measurements.
///
/// Uses Cartesian indexing, so both grids have shape `(y.len(), x.len())`:
/// `xg` repeats `x` along every row and `yg` repeats `y` along every column.
/// The value grids and the uncertainty grids are each the meshgrid of the
/// corresponding component rows.
///
/// # Example
///
/// ```
/// # use ndarray::array;
/// # use scimeasure::{Measurement, meshgrid};
/// #
/// let x = Measurement::new(array![1.0, 2.0], array![0.1, 0.2]);
/// let y = Measurement::new(array![3.0, 4.0, 5.0], array![0.3, 0.4, 0.5]);
/// let (xg, yg) = meshgrid(&x, &y);
/// assert_eq!(xg.shape(), vec![3, 2]);
/// assert_eq!(yg.value()[[2, 0]], 5.0);
/// ```
pub fn meshgrid(
    x: &Measurement<Array1<f64>>,
    y: &Measurement<Array1<f64>>,
) -> (Measurement<Array2<f64>>, Measurement<Array2<f64>>) {
    log::trace!("meshgrid of {} by {} points", x.len(), y.len());
    let (xv, yv) = mesh(&x.value, &y.value);
    let (xu, yu) = mesh(&x.uncertainty, &y.uncertainty);
    (
        Measurement::from_parts((xv, xu)),
        Measurement::from_parts((yv, yu)),
    )
}
