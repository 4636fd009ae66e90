//! Spatial weights
//!
//! [`SpatialWeights`] encodes which observations are neighbors and with
//! what weight, in the neighbor-list shape the external statistics
//! engine consumes. Building weights *from geometry* (contiguity,
//! distance bands) belongs to that engine; this type only carries the
//! structure and computes spatial lags for the Moran scatter plot.

use crate::error::{Error, Result};

/// Neighbor-list spatial weights for `n` observations.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialWeights {
    neighbors: Vec<Vec<usize>>,
    weights: Vec<Vec<f64>>,
}

impl SpatialWeights {
    /// Binary weights from neighbor lists (weight 1.0 per neighbor).
    pub fn from_neighbors(neighbors: Vec<Vec<usize>>) -> Result<Self> {
        let n = neighbors.len();
        for (i, nbrs) in neighbors.iter().enumerate() {
            if let Some(&j) = nbrs.iter().find(|&&j| j >= n) {
                return Err(Error::InvalidParameter {
                    name: "neighbors",
                    value: format!("{i} -> {j}"),
                    reason: format!("neighbor index out of range for {n} observations"),
                });
            }
        }
        let weights = neighbors.iter().map(|nbrs| vec![1.0; nbrs.len()]).collect();
        Ok(Self { neighbors, weights })
    }

    /// Explicit weights per neighbor. Shapes must agree row by row.
    pub fn with_weights(neighbors: Vec<Vec<usize>>, weights: Vec<Vec<f64>>) -> Result<Self> {
        if neighbors.len() != weights.len() {
            return Err(Error::LengthMismatch {
                what: "weights rows",
                expected: neighbors.len(),
                actual: weights.len(),
            });
        }
        for (nbrs, ws) in neighbors.iter().zip(&weights) {
            if nbrs.len() != ws.len() {
                return Err(Error::LengthMismatch {
                    what: "weights row",
                    expected: nbrs.len(),
                    actual: ws.len(),
                });
            }
        }
        let mut w = Self::from_neighbors(neighbors)?;
        w.weights = weights;
        Ok(w)
    }

    /// Weights with no neighbors (placeholder when only precomputed
    /// statistics are available).
    pub fn empty(n: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); n],
            weights: vec![Vec::new(); n],
        }
    }

    /// Number of observations.
    pub fn n(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbor indices of observation `i`.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    /// Weights of observation `i`, aligned with `neighbors(i)`.
    pub fn weights(&self, i: usize) -> &[f64] {
        &self.weights[i]
    }

    /// Rescale each row so its weights sum to 1. Rows with no
    /// neighbors (islands) are left as-is.
    pub fn row_standardize(&mut self) {
        for ws in &mut self.weights {
            let total: f64 = ws.iter().sum();
            if total > 0.0 {
                for w in ws.iter_mut() {
                    *w /= total;
                }
            }
        }
    }

    /// Spatial lag of `y`: the weighted sum of each observation's
    /// neighbor values. With row-standardized weights this is the
    /// neighborhood average.
    pub fn spatial_lag(&self, y: &[f64]) -> Result<Vec<f64>> {
        if y.len() != self.n() {
            return Err(Error::LengthMismatch {
                what: "series",
                expected: self.n(),
                actual: y.len(),
            });
        }
        Ok(self
            .neighbors
            .iter()
            .zip(&self.weights)
            .map(|(nbrs, ws)| nbrs.iter().zip(ws).map(|(&j, w)| y[j] * w).sum())
            .collect())
    }
}
