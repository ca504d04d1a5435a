// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use std::{fmt, str::FromStr};

use ndarray::{Array, Array1, Dimension, NdIndex, SliceArg, Zip};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{DeserializeAs, DisplayFromStr, SerializeAs};

use crate::{error::MeasurementError, storage::Storage};

/// A measured value together with its standard uncertainty.
///
/// Represents a quantity of the form _v_ ± _u_, where both the value and the
/// uncertainty are either a single `f64` or an `ndarray::Array<f64, D>` of the
/// same shape.
///
/// Arithmetic, comparison, and the functions in this crate propagate the
/// uncertainty to first order, treating the errors of different operands as
/// independent and combining them in quadrature.
/// Every operation returns a new `Measurement`; the only way to modify one in
/// place is [`Measurement::set`].
///
/// Non-finite results (from division by zero or from a function evaluated
/// outside its domain) are propagated as NaN or infinity rather than reported
/// as errors, so they can be filtered downstream with finiteness checks.
///
/// # Example
///
/// ```
/// # use scimeasure::Measurement;
/// #
/// let length = Measurement::new(20.0, 2.0);
/// let width = Measurement::new(30.0, 5.0);
/// let area = length * width;
/// assert_eq!(*area.value(), 600.0);
/// assert!((*area.uncertainty() - 116.619037896906).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Measurement<T = f64> {
    pub(crate) value: T,
    pub(crate) uncertainty: T,
}

impl<T: Storage> Measurement<T> {
    /// Creates a `Measurement` from a value and its uncertainty.
    ///
    /// # Panics
    ///
    /// This function panics if the value and uncertainty do not have the same
    /// shape. Use [`Measurement::try_new`] to handle this case.
    pub fn new(value: T, uncertainty: T) -> Self {
        Self::try_new(value, uncertainty).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Creates a `Measurement` from a value and its uncertainty, failing with
    /// [`MeasurementError::ShapeMismatch`] if their shapes differ.
    ///
    /// Both fields are stored as given.
    pub fn try_new(value: T, uncertainty: T) -> Result<Self, MeasurementError> {
        let expected = value.shape();
        let found = uncertainty.shape();
        if expected != found {
            return Err(MeasurementError::ShapeMismatch { expected, found });
        }
        Ok(Self { value, uncertainty })
    }

    /// Creates a `Measurement` with zero uncertainty.
    pub fn exact(value: T) -> Self {
        let (value, uncertainty) = T::map_pair(&value, &value, |v, _| (v, 0.0));
        Self { value, uncertainty }
    }

    // Shapes are the caller's responsibility.
    #[inline]
    pub(crate) fn from_parts((value, uncertainty): (T, T)) -> Self {
        Self { value, uncertainty }
    }

    /// Returns the nominal value.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the absolute uncertainty.
    #[inline]
    pub fn uncertainty(&self) -> &T {
        &self.uncertainty
    }

    /// Consumes the `Measurement`, returning the value and the uncertainty.
    #[inline]
    pub fn into_parts(self) -> (T, T) {
        (self.value, self.uncertainty)
    }

    /// Returns the number of elements in the value.
    #[inline]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn shape(&self) -> Vec<usize> {
        self.value.shape()
    }

    #[inline]
    pub(crate) fn propagate<F>(&self, f: F) -> Self
    where
        F: Fn(f64, f64) -> (f64, f64) + Sync + Send,
    {
        Self::from_parts(T::map_pair(&self.value, &self.uncertainty, f))
    }

    #[inline]
    pub(crate) fn combine<F>(&self, rhs: &Self, f: F) -> Self
    where
        F: Fn(f64, f64, f64, f64) -> (f64, f64) + Sync + Send,
    {
        Self::from_parts(T::zip_pairs(
            (&self.value, &self.uncertainty),
            (&rhs.value, &rhs.uncertainty),
            f,
        ))
    }

    #[inline]
    pub(crate) fn combine_plain<F>(&self, plain: &T, f: F) -> Self
    where
        F: Fn(f64, f64, f64) -> (f64, f64) + Sync + Send,
    {
        Self::from_parts(T::zip_plain(&self.value, &self.uncertainty, plain, f))
    }
}

/// An item that can be written into a single element of a measurement array.
#[derive(Clone, Copy, Debug)]
pub enum Element {
    /// Writes the value and the uncertainty into their own slots.
    Measured(Measurement<f64>),
    /// Writes the same number into both the value and the uncertainty slot.
    Bare(f64),
}

impl From<Measurement<f64>> for Element {
    fn from(m: Measurement<f64>) -> Self {
        Element::Measured(m)
    }
}

impl From<f64> for Element {
    fn from(n: f64) -> Self {
        Element::Bare(n)
    }
}

impl<D: Dimension> Measurement<Array<f64, D>> {
    /// Returns a copy of the element at `index`, or `None` if the index is out
    /// of bounds.
    ///
    /// The returned `Measurement` does not share storage with `self`, so
    /// modifying one never affects the other.
    pub fn get<I>(&self, index: I) -> Option<Measurement<f64>>
    where
        I: NdIndex<D> + Copy,
    {
        Some(Measurement {
            value: *self.value.get(index)?,
            uncertainty: *self.uncertainty.get(index)?,
        })
    }

    /// Overwrites the element at `index`.
    ///
    /// A [`Measurement`] writes its value and uncertainty into the
    /// corresponding slots.
    /// A bare `f64` is written into *both* the value and the uncertainty slot,
    /// so `m.set(0, 9.0)` leaves the element as 9 ± 9.
    ///
    /// # Example
    ///
    /// ```
    /// # use ndarray::array;
    /// # use scimeasure::Measurement;
    /// #
    /// let mut m = Measurement::new(array![1.0, 2.0], array![0.1, 0.2]);
    /// m.set(0, Measurement::new(9.0, 2.0)).unwrap();
    /// m.set(1, 7.0).unwrap();
    /// assert_eq!(m.value(), &array![9.0, 7.0]);
    /// assert_eq!(m.uncertainty(), &array![2.0, 7.0]);
    /// ```
    pub fn set<I>(&mut self, index: I, item: impl Into<Element>) -> Result<(), MeasurementError>
    where
        I: NdIndex<D> + Copy,
    {
        if self.value.get(index).is_none() || self.uncertainty.get(index).is_none() {
            return Err(MeasurementError::IndexOutOfBounds {
                shape: self.value.shape().to_vec(),
            });
        }
        let (value, uncertainty) = match item.into() {
            Element::Measured(m) => (m.value, m.uncertainty),
            Element::Bare(n) => (n, n),
        };
        self.value[index] = value;
        self.uncertainty[index] = uncertainty;
        Ok(())
    }

    /// Returns an owned copy of a slice of the measurement, taken with the
    /// same slice argument for the value and the uncertainty.
    ///
    /// # Panics
    ///
    /// Panics if the slice is out of bounds, as `ndarray`'s `slice` does.
    pub fn slice<I>(&self, info: I) -> Measurement<Array<f64, I::OutDim>>
    where
        I: SliceArg<D>,
    {
        Measurement {
            value: self.value.slice(&info).to_owned(),
            uncertainty: self.uncertainty.slice(&info).to_owned(),
        }
    }

    /// Collects the elements where `mask` is `true` into a one-dimensional
    /// measurement, in logical order.
    pub fn extract(&self, mask: &Array<bool, D>) -> Result<Measurement<Array1<f64>>, MeasurementError> {
        if mask.shape() != self.value.shape() {
            return Err(MeasurementError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                found: mask.shape().to_vec(),
            });
        }
        let mut value = Vec::new();
        let mut uncertainty = Vec::new();
        Zip::from(mask)
            .and(&self.value)
            .and(&self.uncertainty)
            .for_each(|&keep, &v, &u| {
                if keep {
                    value.push(v);
                    uncertainty.push(u);
                }
            });
        log::trace!("extracted {} of {} elements", value.len(), self.value.len());
        Ok(Measurement {
            value: Array1::from(value),
            uncertainty: Array1::from(uncertainty),
        })
    }

    /// Iterates over the elements in logical order.
    pub fn iter(&self) -> impl Iterator<Item = Measurement<f64>> + '_ {
        self.value
            .iter()
            .zip(self.uncertainty.iter())
            .map(|(&value, &uncertainty)| Measurement { value, uncertainty })
    }
}

impl FromIterator<Measurement<f64>> for Measurement<Array1<f64>> {
    fn from_iter<I: IntoIterator<Item = Measurement<f64>>>(iter: I) -> Self {
        let (value, uncertainty): (Vec<f64>, Vec<f64>) = iter
            .into_iter()
            .map(|m| (m.value, m.uncertainty))
            .unzip();
        Measurement {
            value: Array1::from(value),
            uncertainty: Array1::from(uncertainty),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Measurement<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}±{}", self.value, self.uncertainty)
    }
}

impl FromStr for Measurement<f64> {
    type Err = MeasurementError;

    /// Parses a measurement from a string.
    ///
    /// Accepted forms:
    /// - `"1.5±0.2"` or `"1.5 +/- 0.2"`, each part a plain float
    /// - `"0.251(3)"`, the concise form, where the digits in parentheses are
    ///   the uncertainty in units of the last decimal place; an exponent may
    ///   follow, as in `"6.971(12)e-7"`
    /// - a bare float, which is exact
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || MeasurementError::Parse(s.into());
        let s = s.trim();

        let separated = Regex::new(r"^(\S+?)\s*(?:±|\+/-)\s*(\S+)$").map_err(|_e| parse_error())?;
        if let Some(caps) = separated.captures(s) {
            let value = f64::from_str(&caps[1]).map_err(|_e| parse_error())?;
            let uncertainty = f64::from_str(&caps[2]).map_err(|_e| parse_error())?;
            if uncertainty < 0.0 {
                return Err(parse_error());
            }
            return Ok(Self { value, uncertainty });
        }

        let concise = Regex::new(r"^([+-]?)(\d+)(?:\.(\d+))?\((\d+)\)(?:[eE]([+-]?\d+))?$")
            .map_err(|_e| parse_error())?;
        if let Some(caps) = concise.captures(s) {
            // Example given with "6.971(12)e-7"
            let sign = &caps[1]; // ""
            let int = &caps[2]; // "6"
            let frac = caps.get(3).map_or("", |m| m.as_str()); // "971"
            let digits = &caps[4]; // "12"
            let exponent = caps
                .get(5)
                .map_or(Ok(0), |m| i32::from_str(m.as_str()))
                .map_err(|_e| parse_error())?; // -7
            // Both parts share the scale of the last given decimal place, -10
            let scale = exponent - frac.len() as i32;
            let value = f64::from_str(&format!("{sign}{int}{frac}e{scale}")).map_err(|_e| parse_error())?;
            let uncertainty = f64::from_str(&format!("{digits}e{scale}")).map_err(|_e| parse_error())?;
            return Ok(Self { value, uncertainty });
        }

        let value = f64::from_str(s).map_err(|_e| parse_error())?;
        Ok(Self::exact(value))
    }
}

impl Serialize for Measurement<f64> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DisplayFromStr::serialize_as(self, serializer)
    }
}

impl<'de> Deserialize<'de> for Measurement<f64> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        DisplayFromStr::deserialize_as(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, s};

    #[test]
    fn new_scalar() {
        let m = Measurement::new(30.0, 2.0);
        assert_eq!(*m.value(), 30.0);
        assert_eq!(*m.uncertainty(), 2.0);
        assert_eq!(m.len(), 1);
        assert!(m.shape().is_empty());
    }

    #[test]
    fn new_array() {
        let m = Measurement::new(array![1.0, 2.0, 3.0], array![0.1, 0.2, 0.3]);
        assert_eq!(m.len(), 3);
        assert_eq!(m.shape(), vec![3]);
        assert!(!m.is_empty());
    }

    #[test]
    fn exact() {
        let m = Measurement::exact(array![1.0, 2.0]);
        assert_eq!(m.uncertainty(), &array![0.0, 0.0]);
        assert_eq!(*Measurement::exact(4.0).uncertainty(), 0.0);
    }

    #[test]
    fn try_new_shape_mismatch() {
        let result = Measurement::try_new(array![1.0, 2.0, 3.0], array![0.1, 0.2]);
        assert_eq!(
            result.unwrap_err(),
            MeasurementError::ShapeMismatch {
                expected: vec![3],
                found: vec![2],
            }
        );
    }

    #[test]
    #[should_panic(expected = "Shape mismatch")]
    fn new_shape_mismatch_panics() {
        let _m = Measurement::new(array![[1.0, 2.0]], array![[0.1], [0.2]]);
    }

    #[test]
    fn get() {
        let m = Measurement::new(array![[1.0, 2.0], [3.0, 4.0]], array![[0.1, 0.2], [0.3, 0.4]]);
        let e = m.get([1, 0]).unwrap();
        assert_eq!(*e.value(), 3.0);
        assert_eq!(*e.uncertainty(), 0.3);
        assert!(m.get([2, 0]).is_none());
    }

    #[test]
    fn set_measurement() {
        let mut m = Measurement::new(array![1.0, 2.0, 3.0], array![0.1, 0.2, 0.3]);
        m.set(0, Measurement::new(9.0, 2.0)).unwrap();
        assert_eq!(m.value(), &array![9.0, 2.0, 3.0]);
        assert_eq!(m.uncertainty(), &array![2.0, 0.2, 0.3]);
    }

    #[test]
    fn set_bare_writes_both_slots() {
        let mut m = Measurement::new(array![1.0, 2.0, 3.0], array![0.1, 0.2, 0.3]);
        m.set(0, 9.0).unwrap();
        assert_eq!(m.value(), &array![9.0, 2.0, 3.0]);
        assert_eq!(m.uncertainty(), &array![9.0, 0.2, 0.3]);
    }

    #[test]
    fn set_out_of_bounds() {
        let mut m = Measurement::new(array![1.0, 2.0, 3.0], array![0.1, 0.2, 0.3]);
        assert_eq!(
            m.set(5, 1.0).unwrap_err(),
            MeasurementError::IndexOutOfBounds { shape: vec![3] }
        );
        // Unchanged
        assert_eq!(m.value(), &array![1.0, 2.0, 3.0]);
    }

    #[test]
    fn get_is_a_copy() {
        let mut m = Measurement::new(array![1.0, 2.0], array![0.1, 0.2]);
        let e = m.get(0).unwrap();
        m.set(0, 5.0).unwrap();
        assert_eq!(*e.value(), 1.0);
    }

    #[test]
    fn slice() {
        let m = Measurement::new(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], array![[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]);
        let row = m.slice(s![1, 1..]);
        assert_eq!(row.value(), &array![5.0, 6.0]);
        assert_eq!(row.uncertainty(), &array![0.5, 0.6]);
    }

    #[test]
    fn extract() {
        let m = Measurement::new(array![[1.0, 2.0], [3.0, 4.0]], array![[0.1, 0.2], [0.3, 0.4]]);
        let mask = m.value().mapv(|v| v > 1.5);
        let selected = m.extract(&mask).unwrap();
        assert_eq!(selected.value(), &array![2.0, 3.0, 4.0]);
        assert_eq!(selected.uncertainty(), &array![0.2, 0.3, 0.4]);
        assert!(m.extract(&array![[true, false]]).is_err());
    }

    #[test]
    fn iter_and_collect() {
        let m = Measurement::new(array![1.0, 2.0], array![0.1, 0.2]);
        let doubled: Measurement<Array1<f64>> = m.iter().map(|e| e * 2.0).collect();
        assert_eq!(doubled.value(), &array![2.0, 4.0]);
        assert_eq!(doubled.uncertainty(), &array![0.2, 0.4]);
    }

    #[test]
    fn debug() {
        let m = Measurement::new(20.0, 2.0);
        assert_eq!(format!("{m:?}"), "Measurement { value: 20.0, uncertainty: 2.0 }");
    }

    #[test]
    fn display() {
        assert_eq!(Measurement::new(20.0, 2.0).to_string(), "20±2");
        assert_eq!(Measurement::new(1.5, 0.25).to_string(), "1.5±0.25");
        assert_eq!(Measurement::new(1.0, f64::NAN).to_string(), "1±NaN");
    }

    #[test]
    fn from_str_separated() {
        let m = <Measurement>::from_str("1.5±0.2").unwrap();
        assert_eq!(*m.value(), 1.5);
        assert_eq!(*m.uncertainty(), 0.2);
        let m = <Measurement>::from_str(" -1.5e3 +/- 2e1 ").unwrap();
        assert_eq!(*m.value(), -1500.0);
        assert_eq!(*m.uncertainty(), 20.0);
    }

    #[test]
    fn from_str_concise() {
        let m = <Measurement>::from_str("0.251(3)").unwrap();
        assert_relative_eq!(*m.value(), 0.251);
        assert_relative_eq!(*m.uncertainty(), 0.003);
        let m = <Measurement>::from_str("6.971(12)e-7").unwrap();
        assert_relative_eq!(*m.value(), 6.971e-7);
        assert_relative_eq!(*m.uncertainty(), 1.2e-9);
        let m = <Measurement>::from_str("-42(5)").unwrap();
        assert_eq!(*m.value(), -42.0);
        assert_eq!(*m.uncertainty(), 5.0);
    }

    #[test]
    fn from_str_exact() {
        let m = <Measurement>::from_str("-3.14").unwrap();
        assert_eq!(*m.value(), -3.14);
        assert_eq!(*m.uncertainty(), 0.0);
    }

    #[test]
    fn from_str_invalid() {
        assert!(<Measurement>::from_str("not a number").is_err());
        assert!(<Measurement>::from_str("1±-2").is_err());
        assert!(<Measurement>::from_str("1±x").is_err());
    }

    #[test]
    fn display_round_trip() {
        let m = Measurement::new(0.1 + 0.2, 1.0 / 3.0);
        let parsed = <Measurement>::from_str(&m.to_string()).unwrap();
        assert_eq!(*parsed.value(), *m.value());
        assert_eq!(*parsed.uncertainty(), *m.uncertainty());
    }

    #[test]
    fn negative_zero_uncertainty_round_trip() {
        let m = Measurement::new(1.0, -0.0);
        assert_eq!(m.to_string(), "1±-0");
        let parsed = <Measurement>::from_str(&m.to_string()).unwrap();
        assert_eq!(*parsed.value(), 1.0);
        assert_eq!(*parsed.uncertainty(), 0.0);
    }

    #[test]
    fn serde() {
        let m = Measurement::new(1.5, 0.2);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"1.5±0.2\"");
        let back: Measurement = serde_json::from_str(&json).unwrap();
        assert_eq!(*back.value(), 1.5);
        assert_eq!(*back.uncertainty(), 0.2);
        assert!(serde_json::from_str::<Measurement>("\"oops\"").is_err());
    }
}
