//! Vector data structures: features, collections, GeoJSON
//!
//! A [`Feature`] carries a geometry plus a properties mapping; a
//! [`FeatureCollection`] is what the chart builders consume as the
//! geometry side of an analysis. Collections can be simplified for
//! display, merged with an attribute table, and serialized to GeoJSON.

use crate::error::{Error, Result};
use crate::table::{AttrTable, AttributeValue};
use geo::Simplify;
use geo_types::{
    Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use serde_json::{json, Value};
use std::collections::HashMap;

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Builder-style id setter
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Find a feature by id.
    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id.as_deref() == Some(id))
    }

    /// Simplify every geometry in place using Douglas-Peucker.
    ///
    /// Interior rings that collapse below a valid ring (4 coordinates)
    /// are dropped.
    pub fn simplify(&mut self, tolerance: f64) {
        for feature in &mut self.features {
            if let Some(geom) = feature.geometry.take() {
                feature.geometry = Some(simplify_dp(&geom, tolerance));
            }
        }
    }

    /// Copy every column of `table` into the matching features'
    /// properties, keyed by observation id.
    ///
    /// Features whose id has no table row are left untouched; table rows
    /// without a matching feature are ignored. This produces the
    /// merged-properties geometry that the Vega-Lite backend encodes.
    pub fn merge_table(&mut self, table: &AttrTable) {
        for feature in &mut self.features {
            let Some(id) = feature.id.clone() else { continue };
            let Some(idx) = table.row_index(&id) else { continue };
            for (name, value) in table.row(idx) {
                feature.properties.insert(name.to_string(), value.clone());
            }
        }
    }

    /// Serialize to a GeoJSON `FeatureCollection` value.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .features
            .iter()
            .map(|f| {
                let properties: serde_json::Map<String, Value> = f
                    .properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                let mut obj = json!({
                    "type": "Feature",
                    "geometry": f.geometry.as_ref().map(geometry_to_json),
                    "properties": properties,
                });
                if let Some(id) = &f.id {
                    obj["id"] = Value::from(id.clone());
                }
                obj
            })
            .collect();
        json!({ "type": "FeatureCollection", "features": features })
    }

    /// Parse a GeoJSON `FeatureCollection` value.
    ///
    /// Only the geometry types used for areal data are understood
    /// (Point, LineString, Polygon and their Multi variants); anything
    /// else is an error.
    pub fn from_geojson(value: &Value) -> Result<Self> {
        let features = value
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Other("GeoJSON has no 'features' array".into()))?;

        let mut collection = FeatureCollection::new();
        for raw in features {
            let mut feature = match raw.get("geometry") {
                Some(g) if !g.is_null() => Feature::new(geometry_from_json(g)?),
                _ => Feature::empty(),
            };
            feature.id = raw.get("id").map(json_id_to_string);
            if let Some(props) = raw.get("properties").and_then(Value::as_object) {
                for (k, v) in props {
                    feature.properties.insert(k.clone(), json_to_attribute(v));
                }
            }
            collection.push(feature);
        }
        Ok(collection)
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

// --- simplification ------------------------------------------------------

/// Simplify a geometry using Douglas-Peucker.
pub fn simplify_dp(geom: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    match geom {
        Geometry::LineString(ls) => Geometry::LineString(ls.simplify(&tolerance)),
        Geometry::Polygon(p) => Geometry::Polygon(simplify_polygon_dp(p, tolerance)),
        Geometry::MultiLineString(mls) => {
            let simplified: Vec<LineString<f64>> =
                mls.0.iter().map(|ls| ls.simplify(&tolerance)).collect();
            Geometry::MultiLineString(MultiLineString::new(simplified))
        }
        Geometry::MultiPolygon(mp) => {
            let simplified: Vec<Polygon<f64>> = mp
                .0
                .iter()
                .map(|p| simplify_polygon_dp(p, tolerance))
                .collect();
            Geometry::MultiPolygon(MultiPolygon::new(simplified))
        }
        other => other.clone(),
    }
}

fn simplify_polygon_dp(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    let exterior = polygon.exterior().simplify(&tolerance);
    let interiors: Vec<LineString<f64>> = polygon
        .interiors()
        .iter()
        .map(|ring| ring.simplify(&tolerance))
        .filter(|ring| ring.0.len() >= 4) // Must remain valid ring
        .collect();
    Polygon::new(exterior, interiors)
}

// --- GeoJSON geometry conversion -----------------------------------------

fn coord_json(c: &geo_types::Coord<f64>) -> Value {
    json!([c.x, c.y])
}

fn ring_json(ls: &LineString<f64>) -> Value {
    Value::Array(ls.0.iter().map(coord_json).collect())
}

fn polygon_rings_json(p: &Polygon<f64>) -> Value {
    let mut rings = vec![ring_json(p.exterior())];
    rings.extend(p.interiors().iter().map(ring_json));
    Value::Array(rings)
}

/// Convert a geometry into a GeoJSON geometry object.
pub fn geometry_to_json(geom: &Geometry<f64>) -> Value {
    match geom {
        Geometry::Point(p) => json!({ "type": "Point", "coordinates": [p.x(), p.y()] }),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.0.iter().map(|p| json!([p.x(), p.y()])).collect::<Vec<_>>(),
        }),
        Geometry::LineString(ls) => json!({
            "type": "LineString",
            "coordinates": ring_json(ls),
        }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.0.iter().map(ring_json).collect::<Vec<_>>(),
        }),
        Geometry::Polygon(p) => json!({
            "type": "Polygon",
            "coordinates": polygon_rings_json(p),
        }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(polygon_rings_json).collect::<Vec<_>>(),
        }),
        Geometry::GeometryCollection(gc) => json!({
            "type": "GeometryCollection",
            "geometries": gc.0.iter().map(geometry_to_json).collect::<Vec<_>>(),
        }),
        Geometry::Line(l) => json!({
            "type": "LineString",
            "coordinates": [[l.start.x, l.start.y], [l.end.x, l.end.y]],
        }),
        Geometry::Rect(r) => json!({
            "type": "Polygon",
            "coordinates": polygon_rings_json(&r.to_polygon()),
        }),
        Geometry::Triangle(t) => json!({
            "type": "Polygon",
            "coordinates": polygon_rings_json(&t.to_polygon()),
        }),
    }
}

fn parse_coord(v: &Value) -> Result<geo_types::Coord<f64>> {
    let arr = v
        .as_array()
        .filter(|a| a.len() >= 2)
        .ok_or_else(|| Error::Other("invalid GeoJSON coordinate".into()))?;
    let x = arr[0].as_f64().ok_or_else(|| Error::Other("non-numeric coordinate".into()))?;
    let y = arr[1].as_f64().ok_or_else(|| Error::Other("non-numeric coordinate".into()))?;
    Ok(geo_types::Coord { x, y })
}

fn parse_ring(v: &Value) -> Result<LineString<f64>> {
    let coords = v
        .as_array()
        .ok_or_else(|| Error::Other("invalid GeoJSON ring".into()))?
        .iter()
        .map(parse_coord)
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::new(coords))
}

fn parse_polygon(v: &Value) -> Result<Polygon<f64>> {
    let rings = v
        .as_array()
        .ok_or_else(|| Error::Other("invalid GeoJSON polygon".into()))?;
    if rings.is_empty() {
        return Err(Error::Other("polygon with no rings".into()));
    }
    let exterior = parse_ring(&rings[0])?;
    let interiors = rings[1..].iter().map(parse_ring).collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a GeoJSON geometry object.
pub fn geometry_from_json(value: &Value) -> Result<Geometry<f64>> {
    let type_ = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Other("GeoJSON geometry has no 'type'".into()))?;
    let coords = value
        .get("coordinates")
        .ok_or_else(|| Error::Other("GeoJSON geometry has no 'coordinates'".into()))?;

    match type_ {
        "Point" => {
            let c = parse_coord(coords)?;
            Ok(Geometry::Point(Point::new(c.x, c.y)))
        }
        "MultiPoint" => {
            let pts = coords
                .as_array()
                .ok_or_else(|| Error::Other("invalid MultiPoint".into()))?
                .iter()
                .map(|v| parse_coord(v).map(|c| Point::new(c.x, c.y)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::MultiPoint(MultiPoint::new(pts)))
        }
        "LineString" => Ok(Geometry::LineString(parse_ring(coords)?)),
        "MultiLineString" => {
            let lines = coords
                .as_array()
                .ok_or_else(|| Error::Other("invalid MultiLineString".into()))?
                .iter()
                .map(parse_ring)
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::MultiLineString(MultiLineString::new(lines)))
        }
        "Polygon" => Ok(Geometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or_else(|| Error::Other("invalid MultiPolygon".into()))?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon::new(polys)))
        }
        other => Err(Error::Other(format!("unsupported GeoJSON geometry type: {other}"))),
    }
}

fn json_id_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_to_attribute(v: &Value) -> AttributeValue {
    match v {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttributeValue::Int(i)
            } else {
                AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => AttributeValue::String(s.clone()),
        other => AttributeValue::String(other.to_string()),
    }
}
