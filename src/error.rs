// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use std::{error::Error, fmt};

#[derive(Clone, Debug, PartialEq)]
pub enum MeasurementError {
    Parse(String),
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    IndexOutOfBounds {
        shape: Vec<usize>,
    },
}

impl fmt::Display for MeasurementError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MeasurementError::Parse(string) => write!(f, "Failed to parse: {string}"),
            MeasurementError::ShapeMismatch { expected, found } => {
                write!(f, "Shape mismatch: expected {expected:?}, found {found:?}")
            }
            MeasurementError::IndexOutOfBounds { shape } => {
                write!(f, "Index out of bounds for shape {shape:?}")
            }
        }
    }
}

impl Error for MeasurementError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let e = MeasurementError::ShapeMismatch {
            expected: vec![3],
            found: vec![2],
        };
        assert_eq!(e.to_string(), "Shape mismatch: expected [3], found [2]");
        let e = MeasurementError::Parse("1±x".into());
        assert_eq!(e.to_string(), "Failed to parse: 1±x");
    }
}
