//! Arealis CLI - spatial autocorrelation maps from JSON inputs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use arealis_charts::plotly::MapView;
use arealis_charts::vega::MapProjection;
use arealis_charts::{plotly, vega};
use arealis_core::{AttrTable, FeatureCollection, SpatialWeights};
use arealis_stats::{autocorr_stats, AutocorrOutput, GlobalMoran, Metric, PrecomputedResults};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "arealis")]
#[command(author, version, about = "Spatial autocorrelation analysis and charts", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// Plotly figure JSON
    Plotly,
    /// Vega-Lite v5 spec JSON
    Vega,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate a table with one autocorrelation metric
    Classify {
        /// Metric name: 'Global Morans I', 'Local Morans I' or 'G_local'
        metric: String,
        /// Attribute table JSON
        #[arg(short, long)]
        table: PathBuf,
        /// Precomputed engine results JSON
        #[arg(short, long)]
        stats: PathBuf,
        /// Output file (annotated table JSON); stdout for the global metric
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Choropleth map of a variable of interest
    DistMap {
        /// GeoJSON file with feature ids matching the table
        #[arg(short, long)]
        geojson: PathBuf,
        /// Attribute table JSON
        #[arg(short, long)]
        table: PathBuf,
        /// Column holding the variable of interest
        #[arg(long)]
        value_col: String,
        /// Column holding region names (hover text)
        #[arg(long, default_value = "name")]
        name_col: String,
        #[arg(short, long, value_enum, default_value_t = Backend::Plotly)]
        backend: Backend,
        /// Output figure/spec JSON
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Moran scatter plot and LISA cluster map
    LisaMap {
        #[arg(short, long)]
        geojson: PathBuf,
        #[arg(short, long)]
        table: PathBuf,
        /// Precomputed engine results JSON (global + local Moran)
        #[arg(short, long)]
        stats: PathBuf,
        #[arg(long)]
        value_col: String,
        /// Column holding the spatially lagged variable
        #[arg(long)]
        lag_col: String,
        #[arg(long, default_value = "name")]
        name_col: String,
        #[arg(short, long, value_enum, default_value_t = Backend::Plotly)]
        backend: Backend,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Gi* hotspot / coldspot map
    HotspotMap {
        #[arg(short, long)]
        geojson: PathBuf,
        #[arg(short, long)]
        table: PathBuf,
        /// Precomputed engine results JSON (Gi*)
        #[arg(short, long)]
        stats: PathBuf,
        #[arg(long, default_value = "name")]
        name_col: String,
        #[arg(short, long, value_enum, default_value_t = Backend::Plotly)]
        backend: Backend,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Simplify the geometries of a GeoJSON file for display
    Simplify {
        /// Input GeoJSON
        input: PathBuf,
        /// Output GeoJSON
        output: PathBuf,
        /// Douglas-Peucker tolerance in coordinate units
        #[arg(short = 'e', long, default_value = "0.01")]
        tolerance: f64,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn read_table(path: &Path) -> Result<AttrTable> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("parsing table {}", path.display()))
}

fn read_stats(path: &Path) -> Result<PrecomputedResults> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("parsing stats {}", path.display()))
}

fn global_moran_of(stats: &PrecomputedResults, path: &Path) -> Result<GlobalMoran> {
    stats
        .global_moran
        .clone()
        .with_context(|| format!("{} carries no 'global_moran' result", path.display()))
}

/// Run the dispatcher over precomputed results. The value series and
/// weights are unused by [`PrecomputedResults`], so placeholders of the
/// right length suffice.
fn classify_table(
    stats: &PrecomputedResults,
    table: AttrTable,
    metric: Metric,
) -> Result<AutocorrOutput> {
    let n = table.len();
    let out = autocorr_stats(stats, &vec![0.0; n], &SpatialWeights::empty(n), table, metric)?;
    Ok(out)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Classify { metric, table, stats, output } => {
            let metric = Metric::from_str(&metric)?;
            let table = read_table(&table)?;
            let stats = read_stats(&stats)?;
            info!("Classifying {} observations with {}", table.len(), metric);

            match classify_table(&stats, table, metric)? {
                AutocorrOutput::Global { moran, .. } => {
                    println!("Global Moran's I: {:.4}", moran.i);
                    println!("Expected I: {:.4}", moran.expected);
                    println!("Simulated p-value: {}", moran.p_sim);
                }
                AutocorrOutput::Table(annotated) => {
                    let value = serde_json::to_value(&annotated)?;
                    match output {
                        Some(path) => write_json(&path, &value)?,
                        None => println!("{}", serde_json::to_string_pretty(&value)?),
                    }
                }
            }
        }

        Commands::DistMap { geojson, table, value_col, name_col, backend, output } => {
            let geojson = read_json(&geojson)?;
            let table = read_table(&table)?;
            let values = table.f64_column(&value_col)?;
            let names = table.str_column(&name_col)?;

            let spec = match backend {
                Backend::Plotly => {
                    let fig = plotly::distribution_map(
                        &geojson,
                        table.ids(),
                        &names,
                        &values,
                        &value_col,
                        MapView::conus(),
                    )?;
                    serde_json::to_value(&fig)?
                }
                Backend::Vega => {
                    let mut fc = FeatureCollection::from_geojson(&geojson)?;
                    fc.merge_table(&table);
                    vega::distribution_map(
                        &fc.to_geojson(),
                        &value_col,
                        &name_col,
                        MapProjection::conus(),
                    )?
                }
            };
            write_json(&output, &spec)?;
        }

        Commands::LisaMap {
            geojson, table, stats, value_col, lag_col, name_col, backend, output,
        } => {
            let geojson_path = geojson;
            let geojson = read_json(&geojson_path)?;
            let table = read_table(&table)?;
            let stats_path = stats;
            let stats = read_stats(&stats_path)?;
            let moran = global_moran_of(&stats, &stats_path)?;

            let annotated = classify_table(&stats, table, Metric::LocalMoransI)?.into_table();
            info!("LISA classification done for {} observations", annotated.len());

            let spec = match backend {
                Backend::Plotly => {
                    let fig = plotly::lisa_figure(
                        &annotated,
                        &moran,
                        &geojson,
                        &value_col,
                        &lag_col,
                        &name_col,
                        MapView::conus(),
                    )?;
                    serde_json::to_value(&fig)?
                }
                Backend::Vega => {
                    let mut fc = FeatureCollection::from_geojson(&geojson)?;
                    fc.merge_table(&annotated);
                    vega::lisa_view(
                        &annotated,
                        &moran,
                        &fc.to_geojson(),
                        &value_col,
                        &lag_col,
                        &name_col,
                        MapProjection::conus(),
                    )?
                }
            };
            write_json(&output, &spec)?;
        }

        Commands::HotspotMap { geojson, table, stats, name_col, backend, output } => {
            let geojson = read_json(&geojson)?;
            let table = read_table(&table)?;
            let stats = read_stats(&stats)?;

            let annotated = classify_table(&stats, table, Metric::GLocal)?.into_table();
            let names = annotated.str_column(&name_col)?;
            let z_scores = annotated.f64_column(arealis_stats::columns::GI_STAR)?;

            let spec = match backend {
                Backend::Plotly => {
                    let fig = plotly::hotspot_map(
                        &geojson,
                        annotated.ids(),
                        &names,
                        &z_scores,
                        MapView::conus(),
                    )?;
                    serde_json::to_value(&fig)?
                }
                Backend::Vega => {
                    let mut fc = FeatureCollection::from_geojson(&geojson)?;
                    fc.merge_table(&annotated);
                    vega::hotspot_map(
                        &fc.to_geojson(),
                        arealis_stats::columns::GI_STAR,
                        &name_col,
                        MapProjection::conus(),
                    )?
                }
            };
            write_json(&output, &spec)?;
        }

        Commands::Simplify { input, output, tolerance } => {
            let value = read_json(&input)?;
            let mut fc = FeatureCollection::from_geojson(&value)?;
            info!("Simplifying {} features (tolerance {})", fc.len(), tolerance);
            fc.simplify(tolerance);
            write_json(&output, &fc.to_geojson())?;
        }
    }

    Ok(())
}
