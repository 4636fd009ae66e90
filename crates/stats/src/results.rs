//! Raw statistic results
//!
//! Carriers for the output of the external spatial-statistics engine:
//! global Moran's I, local Moran (LISA) and Getis-Ord Gi*. These are
//! plain data; the permutation testing that produced the simulated
//! p-values happened on the other side of the [`crate::AutocorrEngine`]
//! seam.

use arealis_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Global Moran's I for a series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalMoran {
    /// Moran's I statistic (-1 to +1)
    pub i: f64,
    /// Expected I under spatial randomness, -1/(n-1)
    pub expected: f64,
    /// Simulated (permutation) p-value
    pub p_sim: f64,
}

/// Local Moran (LISA) statistics, one entry per observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalMoran {
    /// Local I values
    pub is: Vec<f64>,
    /// Simulated p-values
    pub p_sim: Vec<f64>,
    /// Raw quadrant codes: 1=High-High, 2=Low-High, 3=Low-Low, 4=High-Low
    pub quadrants: Vec<u8>,
}

impl LocalMoran {
    pub fn len(&self) -> usize {
        self.is.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is.is_empty()
    }

    /// Check internal length agreement and, if given, agreement with an
    /// expected observation count.
    pub fn validate(&self, expected: Option<usize>) -> Result<()> {
        validate_lengths("local Moran result", self.is.len(), self.p_sim.len())?;
        validate_lengths("local Moran result", self.is.len(), self.quadrants.len())?;
        if let Some(n) = expected {
            validate_lengths("local Moran result", n, self.is.len())?;
        }
        Ok(())
    }
}

/// Getis-Ord Gi* statistics, one entry per observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetisOrd {
    /// Gi* Z-scores
    pub z_scores: Vec<f64>,
    /// Simulated p-values
    pub p_sim: Vec<f64>,
}

impl GetisOrd {
    pub fn len(&self) -> usize {
        self.z_scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_scores.is_empty()
    }

    pub fn validate(&self, expected: Option<usize>) -> Result<()> {
        validate_lengths("Gi* result", self.z_scores.len(), self.p_sim.len())?;
        if let Some(n) = expected {
            validate_lengths("Gi* result", n, self.z_scores.len())?;
        }
        Ok(())
    }
}

fn validate_lengths(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch { what, expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_moran_validates_lengths() {
        let lm = LocalMoran {
            is: vec![0.4, -0.1],
            p_sim: vec![0.01, 0.3],
            quadrants: vec![1, 2],
        };
        assert!(lm.validate(Some(2)).is_ok());
        assert!(lm.validate(Some(3)).is_err());

        let ragged = LocalMoran {
            is: vec![0.4, -0.1],
            p_sim: vec![0.01],
            quadrants: vec![1, 2],
        };
        assert!(ragged.validate(None).is_err());
    }

    #[test]
    fn getis_ord_validates_lengths() {
        let gi = GetisOrd {
            z_scores: vec![2.5, -0.3],
            p_sim: vec![0.01, 0.6],
        };
        assert!(gi.validate(Some(2)).is_ok());
        assert!(gi.validate(Some(1)).is_err());
    }

    #[test]
    fn results_deserialize_from_engine_json() {
        let json = r#"{ "i": 0.32, "expected": -0.02, "p_sim": 0.001 }"#;
        let gm: GlobalMoran = serde_json::from_str(json).unwrap();
        assert_eq!(gm.i, 0.32);

        let json = r#"{ "z_scores": [2.5, -3.0], "p_sim": [0.01, 0.04] }"#;
        let gi: GetisOrd = serde_json::from_str(json).unwrap();
        assert_eq!(gi.len(), 2);
    }
}
