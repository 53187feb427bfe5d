//! Command-line driver for the map engine.
//!
//! Resolves value maps, highlight sets and painted boundary layers against a
//! data directory and prints them as JSON on stdout. Logs go to stderr.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use choro_core::catalog::MetricKey;
use choro_core::filter::{FilterKind, FilterState};
use choro_core::session::PaintedRegion;
use choro_core::{ActiveSelection, DataStore, EngineConfig, FsFetcher, GradientFamily, MapType, Session, ValueResolver};

#[derive(Parser, Debug)]
#[command(name = "choro", about = "Choropleth metric resolver")]
struct Cli {
    /// JSON engine config; unset fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing `data/`. Overrides the config file.
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the metric catalog.
    Catalog,
    /// Resolve the value map for the selected metric.
    Values(ViewArgs),
    /// Print the regions that pass every active filter.
    Highlight(FilterArgs),
    /// Style every region of a boundary layer.
    Paint(PaintArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct SelectArgs {
    /// Metric key, e.g. `crime` or `jul-feels`. Defaults to January weather.
    #[arg(short, long, conflicts_with_all = ["month", "no_metric"])]
    metric: Option<MetricKey>,

    /// Month index (0 = January) for the feels-like temperature.
    #[arg(long, conflicts_with = "no_metric")]
    month: Option<usize>,

    /// Turn value colouring off.
    #[arg(long)]
    no_metric: bool,
}

/// Filter flags. Threshold text is read the way the control panel reads it:
/// blank, unparsable or zero input leaves the filter without a threshold.
#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Keep regions with potable tap water.
    #[arg(long)]
    potable_water: bool,
    #[arg(long, value_name = "MIN")]
    democracy_above: Option<String>,
    #[arg(long, value_name = "MAX")]
    cost_below: Option<String>,
    #[arg(long, value_name = "MIN")]
    hdi_above: Option<String>,
    #[arg(long, value_name = "MAX")]
    crime_below: Option<String>,
    #[arg(long, value_name = "MIN")]
    corruption_above: Option<String>,
}

impl FilterArgs {
    fn state(&self) -> FilterState {
        let mut state = FilterState::new();
        state.set_enabled(FilterKind::PotableWater, self.potable_water);
        let thresholds = [
            (FilterKind::DemocracyIndex, &self.democracy_above),
            (FilterKind::CostOfLiving, &self.cost_below),
            (FilterKind::Hdi, &self.hdi_above),
            (FilterKind::Crime, &self.crime_below),
            (FilterKind::Corruption, &self.corruption_above),
        ];
        for (kind, text) in thresholds {
            if let Some(text) = text {
                state.set_enabled(kind, true).set_threshold_text(kind, text);
            }
        }
        state
    }
}

#[derive(Args, Debug, Clone, Default)]
struct ViewArgs {
    #[command(flatten)]
    select: SelectArgs,
    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(Args, Debug, Clone)]
struct PaintArgs {
    #[command(flatten)]
    view: ViewArgs,

    #[arg(long, value_enum, default_value_t = MapChoice::Countries)]
    map_type: MapChoice,

    /// Include popup text for each region.
    #[arg(long)]
    popups: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum MapChoice {
    Countries,
    Subdivisions,
}

impl From<MapChoice> for MapType {
    fn from(choice: MapChoice) -> Self {
        match choice {
            MapChoice::Countries => MapType::Countries,
            MapChoice::Subdivisions => MapType::Subdivisions,
        }
    }
}

// ── Output shapes ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CatalogEntry {
    key: MetricKey,
    name: &'static str,
    column: usize,
    min: f64,
    max: f64,
    gradient: GradientFamily,
    reversed: bool,
    source: &'static str,
}

#[derive(Serialize)]
struct ValuesReport<'a> {
    selection: ActiveSelection,
    metric: Option<MetricKey>,
    values: BTreeMap<&'a str, f64>,
}

#[derive(Serialize)]
struct PaintedRow {
    #[serde(flatten)]
    region: PaintedRegion,
    fill_css: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    popup: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(root) = &cli.data_root {
        config.data_root = root.clone();
    }

    match cli.command {
        Command::Catalog => emit(&catalog()),
        Command::Values(view) => run_values(&config, &view).await,
        Command::Highlight(filters) => run_highlight(&config, &filters).await,
        Command::Paint(args) => run_paint(&config, &args).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn resolver(config: &EngineConfig) -> ValueResolver<FsFetcher> {
    info!(root = %config.data_root.display(), "opening data store");
    ValueResolver::new(Arc::new(DataStore::from_config(config)))
}

fn session_for(config: &EngineConfig, view: &ViewArgs) -> Result<Session> {
    let mut session = Session::new(config.palette());
    let select = &view.select;
    if select.no_metric {
        session.clear_metric();
    } else if let Some(key) = select.metric {
        session.select(key);
    } else if let Some(month) = select.month {
        session.scrub(month).context("invalid --month")?;
    }
    session.set_filters(view.filters.state());
    Ok(session)
}

fn catalog() -> Vec<CatalogEntry> {
    MetricKey::ALL
        .into_iter()
        .map(|key| {
            let metric = key.metric();
            CatalogEntry {
                key,
                name: metric.name,
                column: metric.column,
                min: metric.min,
                max: metric.max,
                gradient: key.gradient(),
                reversed: key.is_reversed(),
                source: key.table_source().path(),
            }
        })
        .collect()
}

async fn run_values(config: &EngineConfig, view: &ViewArgs) -> Result<()> {
    let resolver = resolver(config);
    let mut session = session_for(config, view)?;
    session.refresh(&resolver).await;

    emit(&ValuesReport {
        selection: session.selection(),
        metric: session.values_key(),
        values: session.values().iter().collect(),
    })
}

async fn run_highlight(config: &EngineConfig, filters: &FilterArgs) -> Result<()> {
    let resolver = resolver(config);
    let predicates = choro_core::build_predicates(&filters.state());
    let highlights = resolver.highlight(&predicates).await;

    let mut names: Vec<&str> = highlights.iter().collect();
    names.sort_unstable();
    emit(&names)
}

async fn run_paint(config: &EngineConfig, args: &PaintArgs) -> Result<()> {
    let resolver = resolver(config);
    let mut session = session_for(config, &args.view)?;
    let map_type = MapType::from(args.map_type);
    session.set_map_type(map_type);

    let layer = session
        .layer(&resolver)
        .await
        .with_context(|| format!("cannot load {map_type}"))?;
    session.refresh(&resolver).await;

    let rows: Vec<PaintedRow> = layer
        .regions()
        .zip(session.paint(&layer))
        .map(|(names, region)| PaintedRow {
            fill_css: region.style.fill.to_css(),
            popup: args.popups.then(|| session.popup_for(&names)),
            region,
        })
        .collect();
    info!(regions = rows.len(), "painted layer");
    emit(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use choro_core::filter::Predicate;
    use choro_core::MonthIndex;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("choro").chain(args.iter().copied())).unwrap()
    }

    fn view(cli: Cli) -> ViewArgs {
        match cli.command {
            Command::Values(view) => view,
            other => panic!("expected values, got {other:?}"),
        }
    }

    #[test]
    fn threshold_text_follows_panel_rules() {
        let state = FilterArgs {
            potable_water: true,
            hdi_above: Some("0.8".into()),
            crime_below: Some("0".into()),
            cost_below: Some("abc".into()),
            ..FilterArgs::default()
        }
        .state();

        let predicates = choro_core::build_predicates(&state);
        assert_eq!(predicates.len(), 2);
        assert!(predicates.contains(&Predicate::Above { column: 5, threshold: 0.8 }));
        assert!(state.toggle(FilterKind::Crime).enabled);
        assert_eq!(state.toggle(FilterKind::Crime).threshold, None);
    }

    #[test]
    fn selection_flags() {
        let config = EngineConfig::default();

        let session = session_for(&config, &view(parse(&["values"]))).unwrap();
        assert_eq!(session.selection(), ActiveSelection::initial());

        let session = session_for(&config, &view(parse(&["values", "--month", "6"]))).unwrap();
        assert_eq!(session.selection().month(), MonthIndex::new(6).ok());

        let session = session_for(&config, &view(parse(&["values", "-m", "hdi"]))).unwrap();
        assert_eq!(session.selection(), ActiveSelection::Named(MetricKey::Hdi));

        let session = session_for(&config, &view(parse(&["values", "--no-metric"]))).unwrap();
        assert!(session.selection().is_none());

        assert!(session_for(&config, &view(parse(&["values", "--month", "12"]))).is_err());
    }

    #[test]
    fn conflicting_selection_is_rejected() {
        let args = ["choro", "values", "--metric", "crime", "--no-metric"];
        assert!(Cli::try_parse_from(args).is_err());
        assert!(Cli::try_parse_from(["choro", "values", "--metric", "nope"]).is_err());
    }

    #[test]
    fn catalog_lists_every_key() {
        let entries = catalog();
        assert_eq!(entries.len(), MetricKey::ALL.len());
        let hdi = entries.iter().find(|e| e.key == MetricKey::Hdi).unwrap();
        assert!(hdi.reversed);
        assert_eq!(hdi.source, "data/countries_values.csv");
    }
}
