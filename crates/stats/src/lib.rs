//! # Arealis Stats
//!
//! Spatial-autocorrelation post-processing for Arealis.
//!
//! - **results**: raw statistic carriers (global Moran, LISA, Gi*)
//! - **engine**: the trait seam to the external statistics engine
//! - **classify**: significance-gated cluster/hotspot classification
//! - **dispatch**: metric-name routing and table annotation
//!
//! The statistics themselves (weights construction, Moran's I, Gi*,
//! permutation testing) are computed behind [`AutocorrEngine`]; this
//! crate thresholds p-values, maps quadrant codes to colors and
//! labels, and categorizes Z-scores into hotspots and coldspots.

pub mod classify;
pub mod dispatch;
pub mod engine;
pub mod results;

pub use classify::{
    classify_cluster, classify_hotspot, Cluster, GiCategory, NONSIGNIFICANT_COLOR,
    SIGNIFICANCE_LEVEL, Z_CRITICAL,
};
pub use dispatch::{autocorr_stats, columns, AutocorrOutput, Metric};
pub use engine::{AutocorrEngine, PrecomputedResults};
pub use results::{GetisOrd, GlobalMoran, LocalMoran};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classify::{classify_cluster, classify_hotspot, Cluster, GiCategory};
    pub use crate::dispatch::{autocorr_stats, AutocorrOutput, Metric};
    pub use crate::engine::{AutocorrEngine, PrecomputedResults};
    pub use crate::results::{GetisOrd, GlobalMoran, LocalMoran};
    pub use arealis_core::prelude::*;
}
