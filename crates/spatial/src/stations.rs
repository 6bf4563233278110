//! Station metadata.

use std::collections::HashSet;

use crate::error::SpatialError;

/// Ordered set of measurement stations.
///
/// Per-step values are passed separately as `&[f64]` aligned with this
/// order, with `NaN` marking a station that reported nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSet {
    /// Station identifiers, unique.
    ids: Vec<String>,
    /// Projected x coordinates (metres).
    x: Vec<f64>,
    /// Projected y coordinates (metres).
    y: Vec<f64>,
    /// Station elevations (metres).
    elevation: Vec<f64>,
}

impl StationSet {
    /// Creates a station set.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the set is empty, the arrays differ in
    /// length, an identifier repeats, or a coordinate or elevation is not
    /// finite.
    pub fn new(
        ids: Vec<String>,
        x: Vec<f64>,
        y: Vec<f64>,
        elevation: Vec<f64>,
    ) -> Result<Self, SpatialError> {
        if ids.is_empty() {
            return Err(SpatialError::EmptyStations);
        }
        for (field, len) in [("x", x.len()), ("y", y.len()), ("elevation", elevation.len())] {
            if len != ids.len() {
                return Err(SpatialError::LengthMismatch {
                    expected: ids.len(),
                    got: len,
                    field: field.to_string(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if !seen.insert(id.as_str()) {
                return Err(SpatialError::DuplicateStationId { id: id.clone() });
            }
            for (field, v) in [("x", x[i]), ("y", y[i]), ("elevation", elevation[i])] {
                if !v.is_finite() {
                    return Err(SpatialError::NonFiniteStation {
                        id: id.clone(),
                        field: field.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            ids,
            x,
            y,
            elevation,
        })
    }

    /// Returns the number of stations.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the set has no stations.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the station identifiers.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Returns the x coordinates.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Returns the y coordinates.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Returns the elevations.
    pub fn elevation(&self) -> &[f64] {
        &self.elevation
    }

    /// Returns the station coordinates as `[x, y]` pairs.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y]).collect()
    }

    /// Returns the position of station `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|s| s == id)
    }

    /// Returns the named stations in alphabetical id order.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidConfig`] if an id is not in the set,
    /// and [`SpatialError`] construction errors for an empty or repeated
    /// selection.
    pub fn select(&self, ids: &[String]) -> Result<Self, SpatialError> {
        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();

        let mut positions = Vec::with_capacity(sorted.len());
        for id in sorted {
            let i = self.position(id).ok_or_else(|| SpatialError::InvalidConfig {
                reason: format!("station {id:?} is not in the station set"),
            })?;
            positions.push(i);
        }

        Self::new(
            positions.iter().map(|&i| self.ids[i].clone()).collect(),
            positions.iter().map(|&i| self.x[i]).collect(),
            positions.iter().map(|&i| self.y[i]).collect(),
            positions.iter().map(|&i| self.elevation[i]).collect(),
        )
    }
}
