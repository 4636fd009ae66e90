//! Plotly figure assembly
//!
//! Lightweight serde models for the subset of the Plotly figure schema
//! the analysis charts need (choroplethmap and scatter traces over a
//! `map` layout), plus builders for the three figures: variable
//! distribution map, Moran/LISA composite, and Gi* hotspot map.
//! Serializing a [`Figure`] yields JSON any Plotly runtime can render.

use arealis_core::{AttrTable, Error, Result};
use arealis_stats::{columns, Cluster, GlobalMoran};
use serde::Serialize;
use serde_json::Value;

// --- figure schema -------------------------------------------------------

/// A colorscale as `(position, color)` stops, positions in [0, 1].
pub type ColorScale = Vec<(f64, String)>;

/// A complete Plotly figure: traces plus layout.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Choroplethmap(ChoroplethTrace),
    Scatter(ScatterTrace),
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ChoroplethTrace {
    pub geojson: Value,
    pub locations: Vec<String>,
    pub z: Vec<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zmin: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zmax: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<ColorScale>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ScatterTrace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<MarkerLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerLine {
    pub width: f64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct LineStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ColorBar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickvals: Option<Vec<f64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticktext: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapLayout>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct MapLayout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<MapCenter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Domain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<[f64; 2]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub xref: String,
    pub yref: String,
    pub showarrow: bool,
}

// --- map view ------------------------------------------------------------

/// Camera for the map layouts.
#[derive(Debug, Clone, Copy)]
pub struct MapView {
    pub center: MapCenter,
    pub zoom: f64,
}

impl MapView {
    /// Contiguous United States.
    pub fn conus() -> Self {
        Self {
            center: MapCenter { lat: 37.0902, lon: -95.7129 },
            zoom: 4.0,
        }
    }

    pub fn new(lat: f64, lon: f64, zoom: f64) -> Self {
        Self {
            center: MapCenter { lat, lon },
            zoom,
        }
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::conus()
    }
}

fn map_layout(view: MapView) -> MapLayout {
    MapLayout {
        style: Some("carto-positron".into()),
        center: Some(view.center),
        zoom: Some(view.zoom),
        domain: None,
    }
}

// --- colorscales ---------------------------------------------------------

/// Diverging "balance" palette (navy through gray to dark red).
const BALANCE_COLORS: &[&str] = &[
    "rgb(23, 28, 66)",
    "rgb(41, 58, 143)",
    "rgb(11, 102, 189)",
    "rgb(69, 144, 185)",
    "rgb(142, 181, 194)",
    "rgb(210, 216, 219)",
    "rgb(230, 210, 204)",
    "rgb(213, 157, 137)",
    "rgb(196, 101, 72)",
    "rgb(172, 43, 36)",
    "rgb(120, 14, 40)",
];

/// Balance diverging colorscale with evenly spaced stops.
pub fn balance_colorscale() -> ColorScale {
    let last = (BALANCE_COLORS.len() - 1) as f64;
    BALANCE_COLORS
        .iter()
        .enumerate()
        .map(|(i, &c)| (i as f64 / last, c.to_string()))
        .collect()
}

/// Discrete colorscale over the gated quadrant codes 0..=4.
pub fn lisa_colorscale() -> ColorScale {
    Cluster::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64 * 0.25, c.color().to_string()))
        .collect()
}

/// Coldspot-to-hotspot colorscale for Gi* Z-scores.
pub fn hotspot_colorscale() -> ColorScale {
    vec![
        (0.0, "rgb(23, 28, 66)".to_string()),
        (0.5, "lightgray".to_string()),
        (1.0, "rgb(120, 0, 0)".to_string()),
    ]
}

// --- builders ------------------------------------------------------------

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch { what, expected, actual });
    }
    Ok(())
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

fn median(values: &[f64]) -> f64 {
    let mut vals: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = vals.len();
    if n % 2 == 0 {
        (vals[n / 2 - 1] + vals[n / 2]) / 2.0
    } else {
        vals[n / 2]
    }
}

/// Choropleth map of a variable of interest across regions.
///
/// `locations` must match the feature ids of `geojson`; `names` feeds
/// the hover text.
pub fn distribution_map(
    geojson: &Value,
    locations: &[String],
    names: &[String],
    values: &[f64],
    value_name: &str,
    view: MapView,
) -> Result<Figure> {
    check_len("locations", values.len(), locations.len())?;
    check_len("names", values.len(), names.len())?;

    let trace = Trace::Choroplethmap(ChoroplethTrace {
        geojson: geojson.clone(),
        locations: locations.to_vec(),
        z: values.to_vec(),
        colorscale: Some(balance_colorscale()),
        marker: Some(Marker {
            opacity: Some(0.8),
            line: Some(MarkerLine { width: 0.5 }),
            ..Marker::default()
        }),
        text: Some(names.to_vec()),
        hoverinfo: Some("text+z".into()),
        colorbar: Some(ColorBar {
            title: Some(format!("Value of {value_name}")),
            ..ColorBar::default()
        }),
        ..ChoroplethTrace::default()
    });

    let layout = Layout {
        map: Some(map_layout(view)),
        margin: Some(Margin { l: 0, r: 0, t: 0, b: 0 }),
        paper_bgcolor: Some("rgba(0, 0, 0, 0)".into()),
        font: Some(Font { color: "black".into() }),
        ..Layout::default()
    };

    Ok(Figure { data: vec![trace], layout })
}

/// Moran scatter plot beside the LISA cluster map.
///
/// Expects a table annotated by the `Local Morans I` dispatch (the
/// gated `quadrant` column drives the cluster map) plus the observed
/// and spatially lagged value columns.
pub fn lisa_figure(
    table: &AttrTable,
    moran: &GlobalMoran,
    geojson: &Value,
    value_col: &str,
    lag_col: &str,
    name_col: &str,
    view: MapView,
) -> Result<Figure> {
    if table.is_empty() {
        return Err(Error::Other("cannot build a LISA figure from an empty table".into()));
    }
    let observed = table.f64_column(value_col)?;
    let lagged = table.f64_column(lag_col)?;
    let names = table.str_column(name_col)?;
    let quadrants = table.f64_column(columns::QUADRANT)?;

    let (lo, hi) = min_max(&observed);
    let (lag_lo, lag_hi) = min_max(&lagged);

    let points = Trace::Scatter(ScatterTrace {
        x: observed,
        y: lagged,
        mode: Some("markers".into()),
        text: Some(names.clone()),
        marker: Some(Marker {
            size: Some(8.0),
            color: Some("rgba(23, 28, 66, 0.7)".into()),
            ..Marker::default()
        }),
        showlegend: Some(false),
        xaxis: Some("x".into()),
        yaxis: Some("y".into()),
        ..ScatterTrace::default()
    });

    // Identity reference line over the observed range
    let reference = Trace::Scatter(ScatterTrace {
        x: vec![lo, hi],
        y: vec![lag_lo, lag_hi],
        mode: Some("lines".into()),
        line: Some(LineStyle {
            color: Some("rgba(0, 0, 0, 0.6)".into()),
            dash: Some("dash".into()),
        }),
        showlegend: Some(false),
        xaxis: Some("x".into()),
        yaxis: Some("y".into()),
        ..ScatterTrace::default()
    });

    let clusters = Trace::Choroplethmap(ChoroplethTrace {
        geojson: geojson.clone(),
        locations: table.ids().to_vec(),
        z: quadrants,
        zmin: Some(0.0),
        zmax: Some(4.0),
        colorscale: Some(lisa_colorscale()),
        marker: Some(Marker {
            opacity: Some(0.8),
            line: Some(MarkerLine { width: 0.5 }),
            ..Marker::default()
        }),
        text: Some(names),
        hoverinfo: Some("text+z".into()),
        showscale: Some(false),
        ..ChoroplethTrace::default()
    });

    let layout = Layout {
        xaxis: Some(Axis {
            title: Some(format!("Observed values ({value_col})")),
            domain: Some([0.0, 0.45]),
        }),
        yaxis: Some(Axis {
            title: Some(format!("Spatial lag ({lag_col})")),
            domain: None,
        }),
        map: Some(MapLayout {
            domain: Some(Domain {
                x: Some([0.55, 1.0]),
                y: None,
            }),
            ..map_layout(view)
        }),
        paper_bgcolor: Some("rgba(0, 0, 0, 0)".into()),
        font: Some(Font { color: "black".into() }),
        annotations: Some(vec![
            Annotation {
                text: format!(
                    "Moran's I Scatter Plot: {:.3}, p-value: {}",
                    moran.i, moran.p_sim
                ),
                x: 0.225,
                y: 1.05,
                xref: "paper".into(),
                yref: "paper".into(),
                showarrow: false,
            },
            Annotation {
                text: "LISA Cluster Map".into(),
                x: 0.775,
                y: 1.05,
                xref: "paper".into(),
                yref: "paper".into(),
                showarrow: false,
            },
        ]),
        ..Layout::default()
    };

    Ok(Figure {
        data: vec![points, reference, clusters],
        layout,
    })
}

/// Hot/coldspot choropleth from Gi* Z-scores.
///
/// The colorbar anchors its ticks at the minimum, median and maximum
/// Z-score, labeled Coldspot / Not significant / Hotspot.
pub fn hotspot_map(
    geojson: &Value,
    locations: &[String],
    names: &[String],
    z_scores: &[f64],
    view: MapView,
) -> Result<Figure> {
    if z_scores.is_empty() {
        return Err(Error::Other("cannot build a hotspot map from no Z-scores".into()));
    }
    check_len("locations", z_scores.len(), locations.len())?;
    check_len("names", z_scores.len(), names.len())?;

    let hover: Vec<String> = names
        .iter()
        .zip(z_scores)
        .map(|(name, z)| format!("Region: {name}<br>Z-score: {z:.2}"))
        .collect();

    let (z_lo, z_hi) = min_max(z_scores);
    let z_mid = median(z_scores);

    let trace = Trace::Choroplethmap(ChoroplethTrace {
        geojson: geojson.clone(),
        locations: locations.to_vec(),
        z: z_scores.to_vec(),
        colorscale: Some(hotspot_colorscale()),
        marker: Some(Marker {
            opacity: Some(1.0),
            line: Some(MarkerLine { width: 0.5 }),
            ..Marker::default()
        }),
        text: Some(hover),
        hoverinfo: Some("text".into()),
        colorbar: Some(ColorBar {
            title: Some("Categories".into()),
            tickvals: Some(vec![z_lo, z_mid, z_hi]),
            ticktext: Some(vec![
                "Coldspot".into(),
                "Not significant".into(),
                "Hotspot".into(),
            ]),
        }),
        ..ChoroplethTrace::default()
    });

    let layout = Layout {
        title: Some("Hot and coldspot identification by Gi*".into()),
        map: Some(map_layout(view)),
        ..Layout::default()
    };

    Ok(Figure { data: vec![trace], layout })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn geojson() -> Value {
        json!({ "type": "FeatureCollection", "features": [] })
    }

    #[test]
    fn distribution_map_serializes_choropleth() {
        let fig = distribution_map(
            &geojson(),
            &["06".into(), "48".into()],
            &["California".into(), "Texas".into()],
            &[71_228.0, 64_034.0],
            "income",
            MapView::conus(),
        )
        .unwrap();

        let json = serde_json::to_value(&fig).unwrap();
        assert_eq!(json["data"][0]["type"], "choroplethmap");
        assert_eq!(json["data"][0]["hoverinfo"], "text+z");
        assert_eq!(json["data"][0]["colorbar"]["title"], "Value of income");
        assert_eq!(json["layout"]["map"]["style"], "carto-positron");
        assert_eq!(json["layout"]["map"]["center"]["lat"], 37.0902);
        // Options left unset must not appear
        assert!(json["data"][0].get("showscale").is_none());
    }

    #[test]
    fn distribution_map_checks_lengths() {
        let result = distribution_map(
            &geojson(),
            &["06".into()],
            &["California".into(), "Texas".into()],
            &[1.0, 2.0],
            "income",
            MapView::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn lisa_figure_has_scatter_line_and_map() {
        let mut table = AttrTable::new(vec!["06".into(), "48".into(), "36".into()]);
        table.set_f64_column("income", &[1.0, 5.0, 3.0]).unwrap();
        table.set_f64_column("income_lag", &[2.0, 4.0, 3.0]).unwrap();
        table.set_str_column("state", &["CA", "TX", "NY"]).unwrap();
        table.set_f64_column(columns::QUADRANT, &[1.0, 0.0, 3.0]).unwrap();

        let moran = GlobalMoran { i: 0.3117, expected: -0.5, p_sim: 0.008 };
        let fig = lisa_figure(
            &table,
            &moran,
            &geojson(),
            "income",
            "income_lag",
            "state",
            MapView::conus(),
        )
        .unwrap();

        let json = serde_json::to_value(&fig).unwrap();
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
        assert_eq!(json["data"][0]["type"], "scatter");
        assert_eq!(json["data"][1]["mode"], "lines");
        assert_eq!(json["data"][1]["x"], json!([1.0, 5.0]));
        assert_eq!(json["data"][2]["type"], "choroplethmap");
        assert_eq!(json["data"][2]["z"], json!([1.0, 0.0, 3.0]));
        // Discrete LISA scale: 5 stops, lightgray first
        let scale = json["data"][2]["colorscale"].as_array().unwrap();
        assert_eq!(scale.len(), 5);
        assert_eq!(scale[0][1], "lightgray");
        assert_eq!(scale[1][1], "rgb(23, 28, 66)");
        // Subplot split between scatter axes and map domain
        assert_eq!(json["layout"]["xaxis"]["domain"], json!([0.0, 0.45]));
        assert_eq!(json["layout"]["map"]["domain"]["x"], json!([0.55, 1.0]));
        let title = json["layout"]["annotations"][0]["text"].as_str().unwrap();
        assert!(title.contains("0.312"), "Moran's I rounded to 3 places: {title}");
    }

    #[test]
    fn lisa_figure_requires_quadrant_column() {
        let mut table = AttrTable::new(vec!["06".into()]);
        table.set_f64_column("income", &[1.0]).unwrap();
        table.set_f64_column("income_lag", &[1.0]).unwrap();
        table.set_str_column("state", &["CA"]).unwrap();

        let moran = GlobalMoran { i: 0.1, expected: -1.0, p_sim: 0.5 };
        let result = lisa_figure(
            &table, &moran, &geojson(), "income", "income_lag", "state",
            MapView::default(),
        );
        assert!(matches!(result, Err(Error::ColumnNotFound { .. })));
    }

    #[test]
    fn hotspot_map_colorbar_ticks() {
        let fig = hotspot_map(
            &geojson(),
            &["06".into(), "48".into(), "36".into()],
            &["CA".into(), "TX".into(), "NY".into()],
            &[2.5, -3.0, 0.3],
            MapView::conus(),
        )
        .unwrap();

        let json = serde_json::to_value(&fig).unwrap();
        assert_eq!(json["data"][0]["colorbar"]["tickvals"], json!([-3.0, 0.3, 2.5]));
        assert_eq!(
            json["data"][0]["colorbar"]["ticktext"],
            json!(["Coldspot", "Not significant", "Hotspot"])
        );
        let hover = json["data"][0]["text"][1].as_str().unwrap();
        assert!(hover.contains("TX") && hover.contains("-3.00"), "{hover}");
    }

    #[test]
    fn empty_inputs_rejected() {
        // Unguarded, the min/max fold would put infinities (JSON null)
        // into the reference line and colorbar ticks
        let table = AttrTable::new(vec![]);
        let moran = GlobalMoran { i: 0.0, expected: 0.0, p_sim: 1.0 };
        let result = lisa_figure(
            &table, &moran, &geojson(), "income", "income_lag", "state",
            MapView::default(),
        );
        assert!(matches!(result, Err(Error::Other(_))));

        let result = hotspot_map(&geojson(), &[], &[], &[], MapView::default());
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[test]
    fn balance_scale_spans_unit_interval() {
        let scale = balance_colorscale();
        assert_eq!(scale.first().unwrap().0, 0.0);
        assert_eq!(scale.last().unwrap().0, 1.0);
        assert_eq!(scale.first().unwrap().1, "rgb(23, 28, 66)");
    }
}
