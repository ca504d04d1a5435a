// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

//! Helpers for 3D vectors whose components are measurements.

use ndarray::{Array, Axis, RemoveAxis};

use crate::{Measurement, error::MeasurementError, storage::Storage};

/// Cross product of two 3-vectors of measurements.
///
/// This is a simplification, not a propagation of uncertainty: the values and
/// the uncertainties are cross-multiplied as two separate vectors, so the
/// uncertainty of the result is the cross product of the uncertainty vectors.
/// Components of the result's uncertainty can therefore be negative.
///
/// # Example
///
/// ```
/// # use scimeasure::{Measurement, cross};
/// #
/// let x = [
///     Measurement::new(1.0, 0.1),
///     Measurement::exact(0.0),
///     Measurement::exact(0.0),
/// ];
/// let y = [
///     Measurement::exact(0.0),
///     Measurement::new(1.0, 0.1),
///     Measurement::exact(0.0),
/// ];
/// let z = cross(&x, &y);
/// assert_eq!(*z[2].value(), 1.0);
/// ```
pub fn cross<T: Storage>(a: &[Measurement<T>; 3], b: &[Measurement<T>; 3]) -> [Measurement<T>; 3] {
    let component = |i: usize, j: usize| {
        Measurement::from_parts((
            T::cross_term(&a[i].value, &b[j].value, &a[j].value, &b[i].value),
            T::cross_term(&a[i].uncertainty, &b[j].uncertainty, &a[j].uncertainty, &b[i].uncertainty),
        ))
    };
    log::trace!("cross product of {a:?} and {b:?}");
    [component(1, 2), component(2, 0), component(0, 1)]
}

/// Dot product of two 3-vectors of measurements.
///
/// Built from the ordinary operators, so the uncertainty is propagated through
/// each product and sum.
pub fn dot<T: Storage>(a: &[Measurement<T>; 3], b: &[Measurement<T>; 3]) -> Measurement<T> {
    &(&(&a[0] * &b[0]) + &(&a[1] * &b[1])) + &(&a[2] * &b[2])
}

impl<D: RemoveAxis> Measurement<Array<f64, D>> {
    /// Splits a measurement whose first axis has length 3 into the three
    /// vector components taken by [`cross`] and [`dot`].
    ///
    /// # Example
    ///
    /// ```
    /// # use ndarray::array;
    /// # use scimeasure::{Measurement, dot};
    /// #
    /// let a = Measurement::new(array![1.0, 2.0, 3.0], array![0.1, 0.2, 0.3]);
    /// let b = Measurement::exact(array![4.0, 5.0, 6.0]);
    /// let d = dot(&a.components()?, &b.components()?);
    /// assert_eq!(d.value()[()], 32.0);
    /// # Ok::<(), scimeasure::MeasurementError>(())
    /// ```
    pub fn components(&self) -> Result<[Measurement<Array<f64, D::Smaller>>; 3], MeasurementError> {
        let found = self.value.shape().to_vec();
        if found.first() != Some(&3) {
            let mut expected = found.clone();
            match expected.first_mut() {
                Some(n) => *n = 3,
                None => expected.push(3),
            }
            return Err(MeasurementError::ShapeMismatch { expected, found });
        }
        let component = |i: usize| {
            Measurement::from_parts((
                self.value.index_axis(Axis(0), i).to_owned(),
                self.uncertainty.index_axis(Axis(0), i).to_owned(),
            ))
        };
        Ok([component(0), component(1), component(2)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn vector(values: [f64; 3], uncertainties: [f64; 3]) -> [Measurement; 3] {
        [0, 1, 2].map(|i| Measurement::new(values[i], uncertainties[i]))
    }

    #[test]
    fn cross_of_values_and_of_uncertainties() {
        let a = vector([1.0, 2.0, 3.0], [1.0, 0.0, 2.0]);
        let b = vector([4.0, 5.0, 6.0], [0.0, 1.0, 1.0]);
        let c = cross(&a, &b);
        assert_eq!(c.map(|m| *m.value()), [-3.0, 6.0, -3.0]);
        assert_eq!(c.map(|m| *m.uncertainty()), [-2.0, -1.0, 1.0]);
    }

    #[test]
    fn cross_of_parallel_vectors_is_zero() {
        let a = vector([1.0, 2.0, 3.0], [0.5, 1.0, 1.5]);
        let b = vector([2.0, 4.0, 6.0], [1.0, 2.0, 3.0]);
        let c = cross(&a, &b);
        assert_eq!(c.map(|m| *m.value()), [0.0, 0.0, 0.0]);
        assert_eq!(c.map(|m| *m.uncertainty()), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn cross_over_arrays() {
        let a = [
            Measurement::new(array![1.0, 0.0], array![0.0, 0.0]),
            Measurement::new(array![0.0, 1.0], array![0.0, 0.0]),
            Measurement::new(array![0.0, 0.0], array![0.0, 0.0]),
        ];
        let b = [
            Measurement::new(array![0.0, 1.0], array![0.0, 0.0]),
            Measurement::new(array![1.0, 0.0], array![0.0, 0.0]),
            Measurement::new(array![0.0, 0.0], array![0.0, 0.0]),
        ];
        let c = cross(&a, &b);
        assert_eq!(c[2].value(), &array![1.0, -1.0]);
        assert_eq!(c[0].value(), &array![0.0, 0.0]);
    }

    #[test]
    fn dot_propagates_through_operators() {
        let a = vector([1.0, 2.0, 3.0], [0.1, 0.2, 0.3]);
        let b = vector([4.0, 5.0, 6.0], [0.0, 0.0, 0.0]);
        let d = dot(&a, &b);
        assert_eq!(*d.value(), 32.0);
        // 0.4² + 1.0² + 1.8²
        assert_relative_eq!(*d.uncertainty(), 4.4_f64.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn components_of_vector_measurement() {
        let a = Measurement::new(array![1.0, 2.0, 3.0], array![1.0, 0.0, 2.0]);
        let b = Measurement::new(array![4.0, 5.0, 6.0], array![0.0, 1.0, 1.0]);
        let c = cross(&a.components().unwrap(), &b.components().unwrap());
        assert_eq!(c.clone().map(|m| m.value()[()]), [-3.0, 6.0, -3.0]);
        assert_eq!(c.map(|m| m.uncertainty()[()]), [-2.0, -1.0, 1.0]);
    }

    #[test]
    fn components_along_first_axis() {
        // One vector per column
        let a = Measurement::new(
            array![[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]],
            array![[0.1, 0.0], [0.0, 0.1], [0.0, 0.0]],
        );
        let [x, y, z] = a.components().unwrap();
        assert_eq!(x.value(), &array![1.0, 0.0]);
        assert_eq!(y.uncertainty(), &array![0.0, 0.1]);
        assert_eq!(z.shape(), vec![2]);
    }

    #[test]
    fn components_need_three_rows() {
        let a = Measurement::new(array![[1.0, 2.0], [3.0, 4.0]], array![[0.1, 0.2], [0.3, 0.4]]);
        assert_eq!(
            a.components().unwrap_err(),
            MeasurementError::ShapeMismatch {
                expected: vec![3, 2],
                found: vec![2, 2],
            }
        );
    }
}
