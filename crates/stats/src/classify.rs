//! Significance-gated classification
//!
//! The one piece of decision logic in the post-processing layer:
//! turning raw LISA quadrant codes and Gi* Z-scores into display
//! categories and colors. Significance gates every assignment — an
//! observation whose simulated p-value fails the 0.05 threshold is
//! "Not significant" no matter what the raw statistic says.

use serde::{Deserialize, Serialize};

/// Significance threshold for the simulated p-value.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Two-tailed 95% critical value of the standard normal.
pub const Z_CRITICAL: f64 = 1.96;

/// Display color for non-significant observations.
pub const NONSIGNIFICANT_COLOR: &str = "lightgray";

/// LISA cluster quadrant after significance gating.
///
/// Codes follow the Moran scatter quadrants: 1=High-High, 2=Low-High,
/// 3=Low-Low, 4=High-Low. Code 0 means "not significant".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cluster {
    NotSignificant,
    HighHigh,
    LowHigh,
    LowLow,
    HighLow,
}

impl Cluster {
    /// All clusters in code order (0..=4), useful for legends.
    pub const ALL: &'static [Cluster] = &[
        Self::NotSignificant,
        Self::HighHigh,
        Self::LowHigh,
        Self::LowLow,
        Self::HighLow,
    ];

    /// Map a raw quadrant code. Codes outside 1..=4 (including 0)
    /// fall through to `NotSignificant`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::HighHigh,
            2 => Self::LowHigh,
            3 => Self::LowLow,
            4 => Self::HighLow,
            _ => Self::NotSignificant,
        }
    }

    /// Gated quadrant code (0 for not significant).
    pub fn code(&self) -> u8 {
        match self {
            Self::NotSignificant => 0,
            Self::HighHigh => 1,
            Self::LowHigh => 2,
            Self::LowLow => 3,
            Self::HighLow => 4,
        }
    }

    /// Display color (CSS color string, as consumed by both chart
    /// backends).
    pub fn color(&self) -> &'static str {
        match self {
            Self::NotSignificant => NONSIGNIFICANT_COLOR,
            Self::HighHigh => "rgb(23, 28, 66)",
            Self::LowHigh => "rgb(72, 202, 228)",
            Self::LowLow => "rgb(224, 30, 55)",
            Self::HighLow => "rgb(120, 14, 40)",
        }
    }

    /// Short label for legends and merged properties.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotSignificant => "Not significant",
            Self::HighHigh => "HH",
            Self::LowHigh => "LH",
            Self::LowLow => "LL",
            Self::HighLow => "HL",
        }
    }
}

/// Hotspot category from a Gi* Z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GiCategory {
    Hotspot,
    Coldspot,
    NotSignificant,
}

impl GiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hotspot => "Hotspot",
            Self::Coldspot => "Coldspot",
            Self::NotSignificant => "Not significant",
        }
    }
}

/// Classify one observation's LISA result.
///
/// The raw quadrant survives only when the simulated p-value clears
/// [`SIGNIFICANCE_LEVEL`]; otherwise the observation is reset to
/// `NotSignificant` (code 0, lightgray). A NaN p-value never clears
/// the threshold.
pub fn classify_cluster(quadrant: u8, p_sim: f64) -> Cluster {
    if p_sim < SIGNIFICANCE_LEVEL {
        Cluster::from_code(quadrant)
    } else {
        Cluster::NotSignificant
    }
}

/// Classify one observation's Gi* result.
///
/// Total over every `(z, p_sim)` pair: values that satisfy neither
/// strict inequality (including NaN) are `NotSignificant`.
pub fn classify_hotspot(z: f64, p_sim: f64) -> GiCategory {
    if z > Z_CRITICAL && p_sim < SIGNIFICANCE_LEVEL {
        GiCategory::Hotspot
    } else if z < -Z_CRITICAL && p_sim < SIGNIFICANCE_LEVEL {
        GiCategory::Coldspot
    } else {
        GiCategory::NotSignificant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significant_quadrants_keep_code_and_color() {
        let expected = [
            (1, "rgb(23, 28, 66)"),
            (2, "rgb(72, 202, 228)"),
            (3, "rgb(224, 30, 55)"),
            (4, "rgb(120, 14, 40)"),
        ];
        for (code, color) in expected {
            let c = classify_cluster(code, 0.01);
            assert_eq!(c.code(), code);
            assert_eq!(c.color(), color);
        }
    }

    #[test]
    fn insignificant_p_resets_every_quadrant() {
        for code in 0..=4u8 {
            let c = classify_cluster(code, 0.2);
            assert_eq!(c, Cluster::NotSignificant);
            assert_eq!(c.code(), 0);
            assert_eq!(c.color(), "lightgray");
        }
    }

    #[test]
    fn threshold_is_strict() {
        // p == 0.05 does not clear the gate
        assert_eq!(classify_cluster(1, 0.05), Cluster::NotSignificant);
        assert_eq!(classify_cluster(1, 0.049999), Cluster::HighHigh);
    }

    #[test]
    fn out_of_range_code_goes_gray_even_when_significant() {
        let c = classify_cluster(7, 0.01);
        assert_eq!(c, Cluster::NotSignificant);
        assert_eq!(c.color(), "lightgray");
        assert_eq!(c.code(), 0);
    }

    #[test]
    fn nan_p_value_is_not_significant() {
        assert_eq!(classify_cluster(1, f64::NAN), Cluster::NotSignificant);
        assert_eq!(classify_hotspot(3.0, f64::NAN), GiCategory::NotSignificant);
    }

    #[test]
    fn hotspot_requires_both_thresholds() {
        assert_eq!(classify_hotspot(2.5, 0.01), GiCategory::Hotspot);
        assert_eq!(classify_hotspot(-3.0, 0.04), GiCategory::Coldspot);
        // High z, weak significance
        assert_eq!(classify_hotspot(2.5, 0.2), GiCategory::NotSignificant);
        // Significant but unremarkable z
        assert_eq!(classify_hotspot(1.5, 0.01), GiCategory::NotSignificant);
        assert_eq!(classify_hotspot(-1.5, 0.01), GiCategory::NotSignificant);
    }

    #[test]
    fn z_critical_is_strict() {
        assert_eq!(classify_hotspot(1.96, 0.01), GiCategory::NotSignificant);
        assert_eq!(classify_hotspot(-1.96, 0.01), GiCategory::NotSignificant);
        assert_eq!(classify_hotspot(1.961, 0.01), GiCategory::Hotspot);
        assert_eq!(classify_hotspot(-1.961, 0.01), GiCategory::Coldspot);
    }

    #[test]
    fn cluster_code_round_trips_through_gating() {
        // code 0 and color lightgray always coincide
        for code in 0..=10u8 {
            for &p in &[0.001, 0.049, 0.05, 0.5, 1.0] {
                let c = classify_cluster(code, p);
                assert_eq!(c.code() == 0, c.color() == "lightgray");
            }
        }
    }

    #[test]
    fn labels() {
        assert_eq!(Cluster::HighHigh.label(), "HH");
        assert_eq!(Cluster::NotSignificant.label(), "Not significant");
        assert_eq!(GiCategory::Hotspot.label(), "Hotspot");
        assert_eq!(GiCategory::NotSignificant.label(), "Not significant");
        assert_eq!(Cluster::ALL.len(), 5);
    }
}
