//! Build a LISA figure from canned engine results and print the
//! Plotly JSON.
//!
//! Run with: cargo run --example lisa_demo -p arealis-charts

use arealis_charts::plotly::{lisa_figure, MapView};
use arealis_core::vector::Feature;
use arealis_core::{AttrTable, FeatureCollection, SpatialWeights};
use arealis_stats::{autocorr_stats, GlobalMoran, LocalMoran, Metric, PrecomputedResults};
use geo_types::{Geometry, LineString, Polygon};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ids = ["01", "02", "03", "04"];
    let mut table = AttrTable::new(ids.iter().map(|s| s.to_string()).collect());
    table.set_f64_column("rate", &[9.0, 2.0, 5.0, 5.5])?;
    table.set_str_column("name", &["North", "South", "East", "West"])?;

    let mut w = SpatialWeights::from_neighbors(vec![
        vec![1, 3],
        vec![0, 2],
        vec![1, 3],
        vec![2, 0],
    ])?;
    w.row_standardize();

    let y = table.f64_column("rate")?;
    let lag = w.spatial_lag(&y)?;
    table.set_f64_column("rate_lag", &lag)?;

    // Results an external engine would have produced
    let engine = PrecomputedResults {
        global_moran: Some(GlobalMoran { i: 0.42, expected: -1.0 / 3.0, p_sim: 0.004 }),
        local_moran: Some(LocalMoran {
            is: vec![0.9, -0.6, 0.1, 0.05],
            p_sim: vec![0.01, 0.02, 0.31, 0.55],
            quadrants: vec![1, 2, 3, 1],
        }),
        g_local: None,
    };

    let moran = engine.global_moran.clone().unwrap();
    let annotated =
        autocorr_stats(&engine, &y, &w, table, Metric::LocalMoransI)?.into_table();

    let mut fc = FeatureCollection::new();
    for (i, id) in ids.iter().enumerate() {
        let x0 = i as f64;
        let square = Polygon::new(
            LineString::from(vec![
                (x0, 0.0),
                (x0 + 1.0, 0.0),
                (x0 + 1.0, 1.0),
                (x0, 1.0),
                (x0, 0.0),
            ]),
            vec![],
        );
        fc.push(Feature::new(Geometry::Polygon(square)).with_id(*id));
    }
    fc.merge_table(&annotated);

    let figure = lisa_figure(
        &annotated,
        &moran,
        &fc.to_geojson(),
        "rate",
        "rate_lag",
        "name",
        MapView::conus(),
    )?;

    println!("{}", serde_json::to_string_pretty(&figure)?);
    Ok(())
}
