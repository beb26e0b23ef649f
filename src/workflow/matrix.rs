//! Build matrix expansion
//!
//! A matrix is a cross product of environment axes (operating system,
//! runtime version). Every combination becomes an independent cell with
//! its own workspace; cell failure never stops sibling cells unless
//! `fail_fast` is explicitly enabled.

use crate::workflow::errors::ValidationError;
use crate::workflow::types::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for matrix execution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Matrix {
    /// Axes of the matrix
    pub axes: Vec<MatrixAxis>,

    /// Combinations excluded from the cross product
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub excludes: Vec<MatrixExclude>,

    /// Stop sibling cells when one cell fails. Disabled by default:
    /// each cell reports its own outcome.
    #[serde(default)]
    pub fail_fast: bool,
}

/// A single axis of the matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixAxis {
    /// Name of the axis
    pub name: String,
    /// Values for this axis
    pub values: Vec<String>,
}

/// Exclusion rule for the matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixExclude {
    /// Key-value pairs that should be excluded together
    pub conditions: Vec<(String, String)>,
}

/// One combination of axis values
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatrixCell {
    /// Axis name and selected value, in axis order
    pub values: Vec<(String, String)>,
}

impl MatrixCell {
    /// Stable cell name built from the axis values, used for workspace
    /// directories and artifact naming (`ubuntu-latest-3.11`).
    #[must_use]
    pub fn name(&self) -> String {
        self.values
            .iter()
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Returns the value selected for an axis
    #[must_use]
    pub fn get(&self, axis: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == axis)
            .map(|(_, v)| v.as_str())
    }

    /// Environment variables exported into the cell, one
    /// `MATRIX_<AXIS>` entry per axis value.
    #[must_use]
    pub fn env(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(k, v)| (axis_env_key(k), v.clone()))
            .collect()
    }

    /// Returns true for the implicit cell of a job without axes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Environment variable name an axis is exported under
/// (`python-version` becomes `MATRIX_PYTHON_VERSION`).
#[must_use]
pub fn axis_env_key(axis: &str) -> String {
    let key: String = axis
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("MATRIX_{key}")
}

impl fmt::Display for MatrixCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(default)");
        }
        let pairs = self
            .values
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{pairs}")
    }
}

impl Matrix {
    /// Creates a new empty matrix configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an axis to the matrix
    #[must_use]
    pub fn axis(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.axes.push(MatrixAxis {
            name: name.into(),
            values,
        });
        self
    }

    /// Adds an exclusion rule
    #[must_use]
    pub fn exclude(mut self, conditions: Vec<(String, String)>) -> Self {
        self.excludes.push(MatrixExclude { conditions });
        self
    }

    /// Enables fail-fast across cells
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Expands the matrix into its cells.
    ///
    /// The result is the cross product of all axes minus the excluded
    /// combinations, in axis declaration order. A matrix without axes
    /// expands to a single implicit cell so the job still runs once.
    #[must_use]
    pub fn expand(&self) -> Vec<MatrixCell> {
        if self.axes.is_empty() {
            return vec![MatrixCell::default()];
        }

        let mut combinations: Vec<Vec<(String, String)>> = vec![vec![]];

        for axis in &self.axes {
            let mut next = Vec::with_capacity(combinations.len() * axis.values.len());
            for combo in &combinations {
                for value in &axis.values {
                    let mut cell = combo.clone();
                    cell.push((axis.name.clone(), value.clone()));
                    next.push(cell);
                }
            }
            combinations = next;
        }

        combinations
            .into_iter()
            .filter(|combo| !self.is_excluded(combo))
            .map(|values| MatrixCell { values })
            .collect()
    }

    fn is_excluded(&self, combo: &[(String, String)]) -> bool {
        self.excludes.iter().any(|exclude| {
            exclude
                .conditions
                .iter()
                .all(|(key, value)| combo.iter().any(|(k, v)| k == key && v == value))
        })
    }
}

impl Validate for Matrix {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        for axis in &self.axes {
            if axis.name.is_empty() {
                return Err(ValidationError::EmptyName);
            }
            if axis.values.is_empty() {
                return Err(ValidationError::EmptyAxis {
                    axis: axis.name.clone(),
                });
            }
        }
        Ok(())
    }
}
