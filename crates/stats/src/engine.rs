//! The engine seam
//!
//! Spatial-weights construction, Moran/Gi* math and permutation
//! testing are the job of an external statistics engine. This module
//! defines the trait boundary that engine plugs into, plus
//! [`PrecomputedResults`], an implementation that serves results an
//! engine already produced (e.g. loaded from its JSON dump).

use crate::results::{GetisOrd, GlobalMoran, LocalMoran};
use arealis_core::{Error, Result, SpatialWeights};
use serde::{Deserialize, Serialize};

/// Boundary to the external spatial-statistics computation.
///
/// Implementations receive the value series and weights and return
/// raw, un-gated statistics; all post-processing stays on this side of
/// the seam.
pub trait AutocorrEngine {
    /// Global Moran's I with simulated p-value.
    fn global_moran(&self, y: &[f64], w: &SpatialWeights) -> Result<GlobalMoran>;

    /// Local Moran (LISA) per observation.
    fn local_moran(&self, y: &[f64], w: &SpatialWeights) -> Result<LocalMoran>;

    /// Getis-Ord G / Gi* per observation (`star` includes self-weight).
    fn g_local(&self, y: &[f64], w: &SpatialWeights, star: bool) -> Result<GetisOrd>;
}

/// Previously computed engine output.
///
/// Ignores the `(y, w)` inputs and serves whatever was loaded;
/// requesting a statistic that was not loaded is an error. Deserialize
/// directly from an engine dump:
///
/// ```json
/// { "local_moran": { "is": [...], "p_sim": [...], "quadrants": [...] } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrecomputedResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_moran: Option<GlobalMoran>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_moran: Option<LocalMoran>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub g_local: Option<GetisOrd>,
}

impl PrecomputedResults {
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(which: &str) -> Error {
        Error::Algorithm(format!("no precomputed {which} result loaded"))
    }
}

impl AutocorrEngine for PrecomputedResults {
    fn global_moran(&self, _y: &[f64], _w: &SpatialWeights) -> Result<GlobalMoran> {
        self.global_moran
            .clone()
            .ok_or_else(|| Self::missing("global Moran"))
    }

    fn local_moran(&self, _y: &[f64], _w: &SpatialWeights) -> Result<LocalMoran> {
        self.local_moran
            .clone()
            .ok_or_else(|| Self::missing("local Moran"))
    }

    fn g_local(&self, _y: &[f64], _w: &SpatialWeights, _star: bool) -> Result<GetisOrd> {
        self.g_local.clone().ok_or_else(|| Self::missing("Gi*"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precomputed_serves_loaded_results() {
        let engine = PrecomputedResults {
            global_moran: Some(GlobalMoran { i: 0.4, expected: -0.1, p_sim: 0.002 }),
            local_moran: None,
            g_local: None,
        };
        let w = SpatialWeights::empty(0);
        let gm = engine.global_moran(&[], &w).unwrap();
        assert_eq!(gm.i, 0.4);
        assert!(engine.local_moran(&[], &w).is_err());
        assert!(engine.g_local(&[], &w, true).is_err());
    }

    #[test]
    fn precomputed_deserializes_partial_dump() {
        let json = r#"{ "g_local": { "z_scores": [2.5], "p_sim": [0.01] } }"#;
        let engine: PrecomputedResults = serde_json::from_str(json).unwrap();
        assert!(engine.global_moran.is_none());
        assert_eq!(engine.g_local.unwrap().len(), 1);
    }
}
