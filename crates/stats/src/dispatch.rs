//! Metric dispatch
//!
//! Routes a metric name to the corresponding statistic + classifier
//! and returns the annotated attribute table (or, for the global case,
//! the raw statistic paired with the table unchanged).

use crate::classify::{classify_cluster, classify_hotspot};
use crate::engine::AutocorrEngine;
use crate::results::GlobalMoran;
use arealis_core::{AttrTable, AttributeValue, Error, Result, SpatialWeights};
use std::str::FromStr;

/// Column names written by [`autocorr_stats`].
pub mod columns {
    /// Local Moran's I value
    pub const LISA: &str = "lisa";
    /// Simulated p-value of the local Moran statistic
    pub const LISA_P: &str = "lisa_p_sim";
    /// Gated quadrant code (0 when not significant)
    pub const QUADRANT: &str = "quadrant";
    /// Cluster label ("HH", "LH", "LL", "HL", "Not significant")
    pub const CLUSTER: &str = "cluster";
    /// Display color per observation
    pub const COLOR: &str = "color";
    /// Gi* Z-score
    pub const GI_STAR: &str = "gi_star";
    /// Simulated p-value of the Gi* statistic
    pub const GI_P: &str = "gi_p_sim";
    /// Hotspot category label
    pub const CATEGORY: &str = "category";
}

/// Recognized autocorrelation metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    GlobalMoransI,
    LocalMoransI,
    GLocal,
}

impl Metric {
    pub const ALL: &'static [Metric] = &[Self::GlobalMoransI, Self::LocalMoransI, Self::GLocal];

    /// The metric's wire name, as accepted by [`Metric::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::GlobalMoransI => "Global Morans I",
            Self::LocalMoransI => "Local Morans I",
            Self::GLocal => "G_local",
        }
    }

    /// Quoted metric names as an English list ("'a', 'b' or 'c'"),
    /// used in the unknown-metric error.
    fn options() -> String {
        let names: Vec<String> = Self::ALL.iter().map(|m| format!("'{}'", m.name())).collect();
        match names.split_last() {
            Some((last, rest)) if !rest.is_empty() => {
                format!("{} or {}", rest.join(", "), last)
            }
            Some((last, _)) => last.clone(),
            None => String::new(),
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Global Morans I" => Ok(Self::GlobalMoransI),
            "Local Morans I" => Ok(Self::LocalMoransI),
            "G_local" => Ok(Self::GLocal),
            other => Err(Error::UnknownMetric {
                metric: other.to_string(),
                options: Metric::options(),
            }),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Output of [`autocorr_stats`].
#[derive(Debug, Clone)]
pub enum AutocorrOutput {
    /// Global statistic plus the table, unchanged
    Global { moran: GlobalMoran, table: AttrTable },
    /// Table annotated with per-observation statistics
    Table(AttrTable),
}

impl AutocorrOutput {
    /// The table, whichever variant carries it.
    pub fn table(&self) -> &AttrTable {
        match self {
            Self::Global { table, .. } => table,
            Self::Table(table) => table,
        }
    }

    pub fn into_table(self) -> AttrTable {
        match self {
            Self::Global { table, .. } => table,
            Self::Table(table) => table,
        }
    }
}

/// Compute one autocorrelation metric and annotate the table.
///
/// - `Global Morans I`: returns the raw statistic and the table
///   unchanged.
/// - `Local Morans I`: annotates `lisa`, `lisa_p_sim`, `quadrant`
///   (significance-gated), `cluster` and `color` columns.
/// - `G_local`: annotates `gi_star`, `gi_p_sim` and `category` columns.
///
/// The table is consumed and returned; callers wanting to keep the
/// input pass a clone, matching the per-call copy semantics of the
/// original analysis flow.
pub fn autocorr_stats(
    engine: &dyn AutocorrEngine,
    y: &[f64],
    w: &SpatialWeights,
    mut table: AttrTable,
    metric: Metric,
) -> Result<AutocorrOutput> {
    match metric {
        Metric::GlobalMoransI => {
            let moran = engine.global_moran(y, w)?;
            Ok(AutocorrOutput::Global { moran, table })
        }
        Metric::LocalMoransI => {
            let lisa = engine.local_moran(y, w)?;
            lisa.validate(Some(table.len()))?;

            let clusters: Vec<_> = lisa
                .quadrants
                .iter()
                .zip(&lisa.p_sim)
                .map(|(&q, &p)| classify_cluster(q, p))
                .collect();

            table.set_f64_column(columns::LISA, &lisa.is)?;
            table.set_f64_column(columns::LISA_P, &lisa.p_sim)?;
            table.set_column(
                columns::QUADRANT,
                clusters.iter().map(|c| AttributeValue::Int(c.code() as i64)).collect(),
            )?;
            table.set_column(
                columns::CLUSTER,
                clusters.iter().map(|c| c.label().into()).collect(),
            )?;
            table.set_column(
                columns::COLOR,
                clusters.iter().map(|c| c.color().into()).collect(),
            )?;
            Ok(AutocorrOutput::Table(table))
        }
        Metric::GLocal => {
            let gi = engine.g_local(y, w, true)?;
            gi.validate(Some(table.len()))?;

            let categories: Vec<_> = gi
                .z_scores
                .iter()
                .zip(&gi.p_sim)
                .map(|(&z, &p)| classify_hotspot(z, p).label())
                .collect();

            table.set_f64_column(columns::GI_STAR, &gi.z_scores)?;
            table.set_f64_column(columns::GI_P, &gi.p_sim)?;
            table.set_str_column(columns::CATEGORY, &categories)?;
            Ok(AutocorrOutput::Table(table))
        }
    }
}
