//! Vega-Lite spec assembly
//!
//! Builders producing Vega-Lite v5 specifications over GeoJSON
//! features whose properties were merged from an annotated table
//! (`FeatureCollection::merge_table`). Specs are plain
//! `serde_json::Value`s ready for any Vega-Lite embedder.

use arealis_core::{AttrTable, Error, Result};
use arealis_stats::{columns, Cluster, GlobalMoran};
use serde_json::{json, Value};

const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Mercator projection parameters for the geoshape charts.
#[derive(Debug, Clone, Copy)]
pub struct MapProjection {
    /// Center as `[longitude, latitude]`
    pub center: [f64; 2],
    pub scale: f64,
}

impl MapProjection {
    /// Contiguous United States.
    pub fn conus() -> Self {
        Self {
            center: [-95.7129, 37.0902],
            scale: 500.0,
        }
    }
}

impl Default for MapProjection {
    fn default() -> Self {
        Self::conus()
    }
}

fn projection_json(proj: MapProjection) -> Value {
    json!({
        "type": "mercator",
        "center": proj.center,
        "scale": proj.scale,
    })
}

fn features_of(geojson: &Value) -> Result<&Vec<Value>> {
    geojson
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Other("GeoJSON has no 'features' array".into()))
}

/// Choropleth of a variable of interest.
///
/// Encodes `properties.{value_field}` quantitatively over the feature
/// shapes; `name_field` feeds the tooltip.
pub fn distribution_map(
    geojson: &Value,
    value_field: &str,
    name_field: &str,
    proj: MapProjection,
) -> Result<Value> {
    let features = features_of(geojson)?;
    Ok(json!({
        "$schema": SCHEMA,
        "data": { "values": features },
        "mark": { "type": "geoshape", "stroke": "black", "strokeWidth": 0.5 },
        "encoding": {
            "color": {
                "field": format!("properties.{value_field}"),
                "type": "quantitative",
                "title": format!("Value of {value_field}"),
                "scale": { "scheme": "tealblues" },
            },
            "tooltip": [
                {
                    "field": format!("properties.{name_field}"),
                    "type": "nominal",
                    "title": "Region",
                },
                {
                    "field": format!("properties.{value_field}"),
                    "type": "quantitative",
                    "title": format!("Value of {value_field}"),
                    "format": ",.2f",
                },
            ],
        },
        "width": 800,
        "height": 500,
        "projection": projection_json(proj),
    }))
}

/// Moran scatter plot concatenated with the LISA cluster map.
///
/// The scatter reads from the annotated table; the map encodes the
/// merged `properties.cluster` label with the quadrant color mapping.
pub fn lisa_view(
    table: &AttrTable,
    moran: &GlobalMoran,
    geojson: &Value,
    value_col: &str,
    lag_col: &str,
    name_col: &str,
    proj: MapProjection,
) -> Result<Value> {
    let observed = table.f64_column(value_col)?;
    let lagged = table.f64_column(lag_col)?;
    let names = table.str_column(name_col)?;
    let features = features_of(geojson)?;

    let rows: Vec<Value> = names
        .iter()
        .zip(observed.iter().zip(&lagged))
        .map(|(name, (&v, &l))| {
            json!({ "name": name, "value": v, "lag": l })
        })
        .collect();

    // Shared extent for the identity reference line
    let lo = observed
        .iter()
        .chain(&lagged)
        .copied()
        .fold(f64::INFINITY, f64::min);
    let hi = observed
        .iter()
        .chain(&lagged)
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    // Cluster labels and colors in code order
    let domain: Vec<&str> = Cluster::ALL.iter().map(|c| c.label()).collect();
    let range: Vec<&str> = Cluster::ALL.iter().map(|c| c.color()).collect();

    let scatter = json!({
        "layer": [
            {
                "data": { "values": rows },
                "mark": { "type": "circle", "size": 60, "color": "rgba(23, 28, 66, 0.7)" },
                "encoding": {
                    "x": {
                        "field": "value",
                        "type": "quantitative",
                        "title": format!("Observed values ({value_col})"),
                    },
                    "y": {
                        "field": "lag",
                        "type": "quantitative",
                        "title": format!("Spatial lag ({lag_col})"),
                    },
                    "tooltip": [
                        { "field": "name", "type": "nominal", "title": "Region" },
                    ],
                },
            },
            {
                "data": { "values": [
                    { "value": lo, "lag": lo },
                    { "value": hi, "lag": hi },
                ] },
                "mark": { "type": "line", "color": "black", "opacity": 0.7 },
                "encoding": {
                    "x": { "field": "value", "type": "quantitative" },
                    "y": { "field": "lag", "type": "quantitative" },
                },
            },
        ],
        "width": 400,
        "height": 400,
        "title": format!(
            "Moran's I Scatter Plot: {:.3}, p-value: {}",
            moran.i, moran.p_sim
        ),
    });

    let cluster_field = format!("properties.{}", columns::CLUSTER);
    let lisa_map = json!({
        "data": { "values": features },
        "mark": { "type": "geoshape", "stroke": "black", "strokeWidth": 0.5 },
        "encoding": {
            "color": {
                "field": cluster_field,
                "type": "nominal",
                "title": "Cluster",
                "scale": { "domain": domain, "range": range },
                "legend": { "orient": "bottom" },
            },
            "tooltip": [
                {
                    "field": format!("properties.{name_col}"),
                    "type": "nominal",
                    "title": "Region",
                },
                { "field": cluster_field, "type": "nominal", "title": "Cluster" },
            ],
        },
        "width": 400,
        "height": 400,
        "title": "LISA Cluster Map",
        "projection": projection_json(proj),
    });

    Ok(json!({
        "$schema": SCHEMA,
        "hconcat": [scatter, lisa_map],
        "resolve": { "scale": { "color": "independent" } },
    }))
}

/// Hot/coldspot geoshape map over a Z-score property.
///
/// The continuous scale is anchored at the observed Z extent with a
/// neutral midpoint at zero.
pub fn hotspot_map(
    geojson: &Value,
    z_field: &str,
    name_field: &str,
    proj: MapProjection,
) -> Result<Value> {
    let features = features_of(geojson)?;
    let prop = format!("properties.{z_field}");

    let z_values: Vec<f64> = features
        .iter()
        .filter_map(|f| {
            f.get("properties")
                .and_then(|p| p.get(z_field))
                .and_then(Value::as_f64)
        })
        .collect();
    if z_values.is_empty() {
        return Err(Error::ColumnNotFound {
            name: format!("properties.{z_field}"),
        });
    }
    let z_min = z_values.iter().copied().fold(f64::INFINITY, f64::min);
    let z_max = z_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(json!({
        "$schema": SCHEMA,
        "data": { "values": features },
        "mark": { "type": "geoshape", "stroke": "black", "strokeWidth": 0.5 },
        "encoding": {
            "color": {
                "field": prop,
                "type": "quantitative",
                "title": "Z-score",
                "scale": {
                    "domain": [z_min, 0.0, z_max],
                    "range": ["rgb(23, 28, 66)", "lightgray", "rgb(224, 30, 55)"],
                },
            },
            "tooltip": [
                {
                    "field": format!("properties.{name_field}"),
                    "type": "nominal",
                    "title": "Region",
                },
                { "field": prop, "type": "quantitative", "title": "Z-score", "format": ".2f" },
            ],
        },
        "width": 800,
        "height": 500,
        "title": "Hot and coldspot identification by Gi*",
        "projection": projection_json(proj),
    }))
}

/// Time-series line chart with a dropdown selecting the grouping
/// category.
///
/// `rows` is an array of objects carrying `date_field`, `value_field`
/// and every column named in `category_fields`. The chart folds the
/// category columns, filters to the dropdown-selected one, and sums
/// the value per date and category value.
pub fn category_line_chart(
    rows: &Value,
    date_field: &str,
    value_field: &str,
    category_fields: &[&str],
) -> Result<Value> {
    if !rows.is_array() {
        return Err(Error::Other("chart rows must be a JSON array".into()));
    }
    let first = category_fields
        .first()
        .ok_or_else(|| Error::InvalidParameter {
            name: "category_fields",
            value: "[]".into(),
            reason: "at least one grouping column is required".into(),
        })?;

    Ok(json!({
        "$schema": SCHEMA,
        "data": { "values": rows },
        "params": [
            {
                "name": "grouping",
                "value": first,
                "bind": {
                    "input": "select",
                    "options": category_fields,
                    "name": "Group by ",
                },
            },
        ],
        "transform": [
            { "fold": category_fields, "as": ["category_col", "category_value"] },
            { "filter": "datum.category_col == grouping" },
            {
                "aggregate": [
                    { "op": "sum", "field": value_field, "as": "total_value" },
                ],
                "groupby": [date_field, "category_value"],
            },
        ],
        "mark": "line",
        "encoding": {
            "x": { "field": date_field, "type": "temporal", "title": "Date" },
            "y": { "field": "total_value", "type": "quantitative", "title": "Total value" },
            "color": { "field": "category_value", "type": "nominal", "title": "Category" },
            "tooltip": [
                { "field": "category_value", "type": "nominal", "title": "Category" },
                { "field": "total_value", "type": "quantitative", "title": "Total value", "format": ",.2f" },
                { "field": date_field, "type": "temporal", "title": "Date", "format": "%Y-%m-%d" },
            ],
        },
        "width": 800,
        "height": 400,
        "title": "Total value over time by category",
    }))
}
