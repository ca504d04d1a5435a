// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use ndarray::{Array, Ix1, Ix2, IxDyn};

use crate::Measurement;

/// A measurement holding one value and one uncertainty per array element.
pub type MeasurementArray<D> = Measurement<Array<f64, D>>;

pub type MeasurementArray1 = MeasurementArray<Ix1>;

pub type MeasurementArray2 = MeasurementArray<Ix2>;

pub type MeasurementArrayD = MeasurementArray<IxDyn>;
