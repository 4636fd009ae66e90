//! End-to-end analysis flow: stub engine -> classification -> charts

use arealis_charts::plotly::{self, MapView};
use arealis_charts::vega::{self, MapProjection};
use arealis_core::{AttrTable, FeatureCollection, Result, SpatialWeights};
use arealis_core::vector::Feature;
use arealis_stats::{
    autocorr_stats, columns, AutocorrEngine, AutocorrOutput, GetisOrd, GlobalMoran, LocalMoran,
    Metric,
};
use geo_types::{Geometry, LineString, Polygon};
use std::str::FromStr;

/// Stand-in for the external statistics engine: fixed outputs for a
/// four-observation layout with one significant high cluster, one
/// significant low outlier, and two insignificant regions.
struct StubEngine;

impl AutocorrEngine for StubEngine {
    fn global_moran(&self, _y: &[f64], _w: &SpatialWeights) -> Result<GlobalMoran> {
        Ok(GlobalMoran { i: 0.42, expected: -1.0 / 3.0, p_sim: 0.004 })
    }

    fn local_moran(&self, _y: &[f64], _w: &SpatialWeights) -> Result<LocalMoran> {
        Ok(LocalMoran {
            is: vec![0.9, -0.6, 0.1, 0.05],
            p_sim: vec![0.01, 0.02, 0.31, 0.55],
            quadrants: vec![1, 2, 3, 1],
        })
    }

    fn g_local(&self, _y: &[f64], _w: &SpatialWeights, _star: bool) -> Result<GetisOrd> {
        Ok(GetisOrd {
            z_scores: vec![2.7, -2.4, 0.5, -0.2],
            p_sim: vec![0.008, 0.03, 0.4, 0.7],
        })
    }
}

fn unit_square(x0: f64, y0: f64) -> Geometry<f64> {
    Geometry::Polygon(Polygon::new(
        LineString::from(vec![
            (x0, y0),
            (x0 + 1.0, y0),
            (x0 + 1.0, y0 + 1.0),
            (x0, y0 + 1.0),
            (x0, y0),
        ]),
        vec![],
    ))
}

fn fixture() -> (AttrTable, SpatialWeights, FeatureCollection) {
    let ids = ["01", "02", "03", "04"];
    let mut table = AttrTable::new(ids.iter().map(|s| s.to_string()).collect());
    table.set_f64_column("rate", &[9.0, 2.0, 5.0, 5.5]).unwrap();
    table
        .set_str_column("name", &["North", "South", "East", "West"])
        .unwrap();

    // Ring contiguity, row-standardized
    let mut w = SpatialWeights::from_neighbors(vec![
        vec![1, 3],
        vec![0, 2],
        vec![1, 3],
        vec![2, 0],
    ])
    .unwrap();
    w.row_standardize();

    let mut fc = FeatureCollection::new();
    for (i, id) in ids.iter().enumerate() {
        fc.push(Feature::new(unit_square(i as f64, 0.0)).with_id(*id));
    }
    (table, w, fc)
}

#[test]
fn lisa_flow_produces_gated_figure() {
    let (mut table, w, mut fc) = fixture();
    let y = table.f64_column("rate").unwrap();
    let lag = w.spatial_lag(&y).unwrap();
    table.set_f64_column("rate_lag", &lag).unwrap();

    let moran = StubEngine.global_moran(&y, &w).unwrap();
    let out = autocorr_stats(&StubEngine, &y, &w, table, Metric::LocalMoransI).unwrap();
    let annotated = out.into_table();

    // Gating: rows 2 and 3 are insignificant, row 3's raw HH is reset
    assert_eq!(
        annotated.f64_column(columns::QUADRANT).unwrap(),
        vec![1.0, 2.0, 0.0, 0.0]
    );

    fc.merge_table(&annotated);
    let geojson = fc.to_geojson();

    let fig = plotly::lisa_figure(
        &annotated,
        &moran,
        &geojson,
        "rate",
        "rate_lag",
        "name",
        MapView::conus(),
    )
    .unwrap();
    let fig = serde_json::to_value(&fig).unwrap();
    assert_eq!(fig["data"][2]["z"], serde_json::json!([1.0, 2.0, 0.0, 0.0]));

    let spec = vega::lisa_view(
        &annotated,
        &moran,
        &geojson,
        "rate",
        "rate_lag",
        "name",
        MapProjection::conus(),
    )
    .unwrap();
    let map_features = spec["hconcat"][1]["data"]["values"].as_array().unwrap();
    assert_eq!(map_features.len(), 4);
    assert_eq!(map_features[0]["properties"]["cluster"], "HH");
    assert_eq!(map_features[2]["properties"]["cluster"], "Not significant");
}

#[test]
fn hotspot_flow_labels_categories() {
    let (table, w, mut fc) = fixture();
    let y = table.f64_column("rate").unwrap();

    let out = autocorr_stats(&StubEngine, &y, &w, table, Metric::GLocal).unwrap();
    let annotated = out.into_table();

    assert_eq!(
        annotated.str_column(columns::CATEGORY).unwrap(),
        vec!["Hotspot", "Coldspot", "Not significant", "Not significant"]
    );

    fc.merge_table(&annotated);
    let geojson = fc.to_geojson();

    let names = annotated.str_column("name").unwrap();
    let z = annotated.f64_column(columns::GI_STAR).unwrap();
    let fig =
        plotly::hotspot_map(&geojson, annotated.ids(), &names, &z, MapView::conus()).unwrap();
    let fig = serde_json::to_value(&fig).unwrap();
    assert_eq!(
        fig["data"][0]["colorbar"]["ticktext"],
        serde_json::json!(["Coldspot", "Not significant", "Hotspot"])
    );

    let spec = vega::hotspot_map(&geojson, columns::GI_STAR, "name", MapProjection::conus())
        .unwrap();
    assert_eq!(
        spec["encoding"]["color"]["scale"]["domain"],
        serde_json::json!([-2.4, 0.0, 2.7])
    );
}

#[test]
fn metric_dispatch_covers_all_names() {
    let (table, w, _) = fixture();
    let y = table.f64_column("rate").unwrap();

    for name in ["Global Morans I", "Local Morans I", "G_local"] {
        let metric = Metric::from_str(name).unwrap();
        let out = autocorr_stats(&StubEngine, &y, &w, table.clone(), metric).unwrap();
        match (metric, out) {
            (Metric::GlobalMoransI, AutocorrOutput::Global { .. }) => {}
            (Metric::LocalMoransI | Metric::GLocal, AutocorrOutput::Table(_)) => {}
            (m, _) => panic!("unexpected output shape for {m}"),
        }
    }

    assert!(Metric::from_str("foo").is_err());
}
