//! # Arealis Charts
//!
//! Chart-specification builders for Arealis analysis results, in two
//! flavors:
//!
//! - [`plotly`]: typed figure models serializing to Plotly JSON
//!   (choroplethmap + scatter traces over a `map` layout)
//! - [`vega`]: Vega-Lite v5 specs over merged-property GeoJSON
//!
//! Both backends render the same three analysis views — variable
//! distribution map, Moran/LISA composite, Gi* hotspot map — plus a
//! dropdown-driven category line chart on the Vega side. Nothing here
//! renders pixels; the output is a specification for the host
//! environment's charting runtime.

pub mod plotly;
pub mod vega;

pub use plotly::{distribution_map, hotspot_map, lisa_figure, Figure, MapView};
pub use vega::MapProjection;
