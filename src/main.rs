//! CLI entry point for the Bicing statistics tool.
//!
//! Each subcommand is one dashboard view: it loads the CSV inputs it needs,
//! applies the requested filters and prints or writes the resulting table.

use anyhow::{Result, bail};
use bicing_stats::aggregate::{
    self, RankingMetric, hourly_mean, hourly_mean_by_holiday, hourly_mean_by_season,
    neighborhood_turnover, rank_problem_stations, rank_turnover, snapshot, snapshot_summary,
    weekday_hour_heatmap,
};
use bicing_stats::config::Config;
use bicing_stats::evaluation::evaluate;
use bicing_stats::fetch::BasicClient;
use bicing_stats::filter::{self, DateRange, HourRange, Query, StationSelector, filter_markers};
use bicing_stats::loader::Loader;
use bicing_stats::model::{Observation, StationType};
use bicing_stats::output::{print_json, print_pretty, write_csv, write_json};
use bicing_stats::report::Report;
use bicing_stats::source::{DataSource, TextEncoding, read_source};
use bicing_stats::table::RawTable;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bicing_stats")]
#[command(about = "Availability statistics for Barcelona's Bicing stations", long_about = None)]
struct Cli {
    /// JSON config file (environment variables still override it)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List map markers, optionally restricted to station types
    Stations {
        /// Markers CSV (path or URL)
        #[arg(long)]
        markers: Option<String>,

        /// Station types to keep
        #[arg(long, value_delimiter = ',', default_values_t = [StationType::New, StationType::Old])]
        types: Vec<StationType>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Availability of every station at one date and hour
    Snapshot {
        #[command(flatten)]
        inputs: InputArgs,

        /// Date to show (defaults to the first date in the data)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Hour of day
        #[arg(long, default_value_t = 12)]
        hour: u32,

        /// Restrict to one station name
        #[arg(long)]
        station_name: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Mean availability per hour of day
    Hourly {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Additional grouping
        #[arg(long, value_enum, default_value_t = HourlyGrouping::None)]
        by: HourlyGrouping,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Weekday x hour mean availability matrix
    Heatmap {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Top stations by turnover or by chronic empty/full ratio
    Rankings {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, value_enum, default_value_t = MetricArg::Turnover)]
        metric: MetricArg,

        /// Number of stations to list
        #[arg(long)]
        top: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Mean station turnover per neighborhood
    Neighborhoods {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        top: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Compute every report over one load and write them as JSON files
    Report {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Directory to write the report files into
        #[arg(short = 'd', long, default_value = "reports")]
        out_dir: PathBuf,
    },
    /// Score a prediction CSV against ground truth joined on `Id`
    Evaluate {
        /// CSV with `Id`, `Predicted` and optionally `True`
        #[arg(long)]
        predictions: String,

        /// CSV with `Id` and `True`
        #[arg(long)]
        truth: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Which observation table to use
    #[arg(long, value_enum, default_value_t = Dataset::History)]
    dataset: Dataset,

    /// Availability history CSV (path or URL)
    #[arg(long)]
    availability: Option<String>,

    /// Station metadata CSV (path or URL)
    #[arg(long)]
    stations: Option<String>,

    /// Pre-joined interactive CSV (path or URL)
    #[arg(long)]
    interactive: Option<String>,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long, conflicts_with = "station_name")]
    station_id: Option<i64>,

    #[arg(long)]
    station_name: Option<String>,

    /// First date, inclusive
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last date, inclusive
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Hour window such as `7-9` (no overnight wrap)
    #[arg(long, value_parser = parse_hours)]
    hours: Option<(u32, u32)>,

    /// Station types to keep
    #[arg(long, value_delimiter = ',')]
    types: Vec<StationType>,
}

#[derive(Args)]
struct OutputArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Dataset {
    /// Availability history joined with station metadata
    History,
    /// Pre-joined interactive dataset
    Interactive,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum HourlyGrouping {
    None,
    Season,
    Holiday,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Turnover,
    Empty,
    Full,
}

fn parse_hours(s: &str) -> Result<(u32, u32), String> {
    let (start, end) = match s.split_once('-') {
        Some((a, b)) => (a.trim(), b.trim()),
        None => (s.trim(), s.trim()),
    };
    let start = start.parse().map_err(|_| format!("invalid start hour '{start}'"))?;
    let end = end.parse().map_err(|_| format!("invalid end hour '{end}'"))?;
    Ok((start, end))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bicing_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bicing_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .from_env();

    if let Err(e) = run(cli.command, &config).await {
        error!(error = %e, "Report aborted");
        return Err(e);
    }

    Ok(())
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    let mut loader = Loader::new(BasicClient::with_timeout(config.http_timeout())?);

    match command {
        Commands::Stations {
            markers,
            types,
            output,
        } => {
            let source = DataSource::parse(markers.as_deref().unwrap_or(&config.markers));
            let markers = loader.markers(&source).await?;
            let types: BTreeSet<StationType> = types.into_iter().collect();
            emit_rows(filter_markers(&markers, &types), &output, "stations")?;
        }
        Commands::Snapshot {
            inputs,
            date,
            hour,
            station_name,
            output,
        } => {
            let observations = load_observations(&mut loader, &inputs, config).await?;
            let Some(date) = date.or_else(|| filter::available_dates(&observations).first().copied())
            else {
                warn!("No observations loaded");
                eprintln!("No data.");
                return Ok(());
            };

            let mut query = Query::all()
                .with_dates(DateRange::single(date))
                .with_hours(HourRange::single(hour)?);
            if let Some(name) = station_name {
                query = query.with_station(StationSelector::Name(name));
            }
            let subset = filter::apply(&observations, &query);

            let view = snapshot(&subset);
            if let Report::Ready(v) = &view {
                info!(
                    %date,
                    hour,
                    mean_available = v.summary.mean_available_kpi,
                    stations = v.summary.stations,
                    "Snapshot"
                );
            }
            let what = format!("{date} at {hour}h");
            if output.format == Format::Csv {
                // CSV holds the detail rows only; the KPI stays on stderr
                if let Report::Ready(v) = &view {
                    eprintln!(
                        "Mean available bikes: {} across {} stations",
                        v.summary.mean_available_kpi, v.summary.stations
                    );
                }
                emit_rows(view.map(|v| v.rows), &output, &what)?;
            } else {
                emit_value(view, &output, &what)?;
            }
        }
        Commands::Hourly {
            inputs,
            filters,
            by,
            output,
        } => {
            let subset = filtered(&mut loader, &inputs, &filters, config).await?;
            match by {
                HourlyGrouping::None => emit_rows(hourly_mean(&subset), &output, "hourly means")?,
                HourlyGrouping::Season => {
                    emit_rows(hourly_mean_by_season(&subset), &output, "hourly means by season")?
                }
                HourlyGrouping::Holiday => {
                    emit_rows(hourly_mean_by_holiday(&subset), &output, "hourly means by holiday")?
                }
            }
        }
        Commands::Heatmap {
            inputs,
            filters,
            output,
        } => {
            let subset = filtered(&mut loader, &inputs, &filters, config).await?;
            let heatmap = weekday_hour_heatmap(&subset);
            if output.format == Format::Csv {
                emit_rows(heatmap.map(|m| m.cells()), &output, "heatmap")?;
            } else {
                emit_value(heatmap, &output, "heatmap")?;
            }
        }
        Commands::Rankings {
            inputs,
            filters,
            metric,
            top,
            output,
        } => {
            let subset = filtered(&mut loader, &inputs, &filters, config).await?;
            let n = top.unwrap_or(config.top_n);
            let ranking = match metric {
                MetricArg::Turnover => rank_turnover(&subset, n),
                MetricArg::Empty => {
                    rank_problem_stations(&subset, RankingMetric::EmptyRatio, config.problem_threshold, n)
                }
                MetricArg::Full => {
                    rank_problem_stations(&subset, RankingMetric::FullRatio, config.problem_threshold, n)
                }
            };
            emit_rows(ranking, &output, "ranking")?;
        }
        Commands::Neighborhoods {
            inputs,
            filters,
            top,
            output,
        } => {
            let subset = filtered(&mut loader, &inputs, &filters, config).await?;
            let n = top.unwrap_or(config.top_n);
            let rows = neighborhood_turnover(&subset).map(|mut rows| {
                rows.truncate(n);
                rows
            });
            emit_rows(rows, &output, "neighborhoods")?;
        }
        Commands::Report {
            inputs,
            filters,
            out_dir,
        } => {
            let subset = filtered(&mut loader, &inputs, &filters, config).await?;
            write_all_reports(&subset, config, &out_dir)?;
        }
        Commands::Evaluate {
            predictions,
            truth,
            output,
        } => {
            let predictions = read_table(loader.client(), &predictions).await?;
            let truth = match truth {
                Some(t) => Some(read_table(loader.client(), &t).await?),
                None => None,
            };
            let summary = evaluate(&predictions, truth.as_ref())?;
            if output.format == Format::Csv {
                emit_rows(summary.map(|s| s.rows), &output, "evaluation")?;
            } else {
                emit_value(summary, &output, "evaluation")?;
            }
        }
    }

    Ok(())
}

/// Prediction files are read once per command, outside the loader cache.
async fn read_table(client: &BasicClient, source: &str) -> Result<RawTable> {
    let bytes = read_source(client, &DataSource::parse(source)).await?;
    Ok(RawTable::from_csv_str(&TextEncoding::Utf8.decode(&bytes))?)
}

async fn load_observations(
    loader: &mut Loader<BasicClient>,
    inputs: &InputArgs,
    config: &Config,
) -> Result<Vec<Observation>> {
    let observations = match inputs.dataset {
        Dataset::History => {
            let availability =
                DataSource::parse(inputs.availability.as_deref().unwrap_or(&config.availability));
            let stations = DataSource::parse(inputs.stations.as_deref().unwrap_or(&config.stations));
            loader.observations(&availability, &stations).await?
        }
        Dataset::Interactive => {
            let source =
                DataSource::parse(inputs.interactive.as_deref().unwrap_or(&config.interactive));
            loader.interactive_observations(&source).await?
        }
    };

    if observations.is_empty() {
        warn!("No observations after join");
    }
    Ok(observations)
}

fn build_query(filters: &FilterArgs) -> Result<Query> {
    let mut query = Query::all();

    if let Some(id) = filters.station_id {
        query = query.with_station(StationSelector::Id(id));
    } else if let Some(name) = &filters.station_name {
        query = query.with_station(StationSelector::Name(name.clone()));
    }

    match (filters.from, filters.to) {
        (Some(from), Some(to)) => query = query.with_dates(DateRange::new(from, to)),
        (Some(from), None) => query = query.with_dates(DateRange::new(from, NaiveDate::MAX)),
        (None, Some(to)) => query = query.with_dates(DateRange::new(NaiveDate::MIN, to)),
        (None, None) => {}
    }

    if let Some((start, end)) = filters.hours {
        query = query.with_hours(HourRange::new(start, end)?);
    }

    if !filters.types.is_empty() {
        query = query.with_types(filters.types.iter().copied());
    }

    Ok(query)
}

async fn filtered(
    loader: &mut Loader<BasicClient>,
    inputs: &InputArgs,
    filters: &FilterArgs,
    config: &Config,
) -> Result<Vec<Observation>> {
    // Reject bad queries before loading anything.
    let query = build_query(filters)?;
    let observations = load_observations(loader, inputs, config).await?;
    let subset = filter::apply(&observations, &query);
    print_pretty(&query);
    Ok(subset)
}

fn emit_rows<T: Serialize>(report: Report<Vec<T>>, output: &OutputArgs, what: &str) -> Result<()> {
    let Report::Ready(rows) = report else {
        warn!(what, "No data");
        eprintln!("No data for {what}.");
        return Ok(());
    };

    match (&output.output, output.format) {
        (Some(path), Format::Csv) => write_csv(path, &rows),
        (Some(path), Format::Json) => write_json(path, &rows),
        (None, Format::Json) => print_json(&rows),
        (None, Format::Csv) => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}

fn emit_value<T: Serialize>(report: Report<T>, output: &OutputArgs, what: &str) -> Result<()> {
    let Report::Ready(value) = report else {
        warn!(what, "No data");
        eprintln!("No data for {what}.");
        return Ok(());
    };

    match (&output.output, output.format) {
        (_, Format::Csv) => bail!("{what} cannot be written as CSV"),
        (Some(path), Format::Json) => write_json(path, &value),
        (None, Format::Json) => print_json(&value),
    }
}

/// Writes every report, `NoData` ones included, as `<name>.json`.
fn write_all_reports(subset: &[Observation], config: &Config, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let n = config.top_n;
    let threshold = config.problem_threshold;

    write_json(&out_dir.join("summary.json"), &snapshot_summary(subset))?;
    write_json(&out_dir.join("hourly.json"), &hourly_mean(subset))?;
    write_json(&out_dir.join("hourly_by_season.json"), &hourly_mean_by_season(subset))?;
    write_json(&out_dir.join("hourly_by_holiday.json"), &hourly_mean_by_holiday(subset))?;
    write_json(&out_dir.join("heatmap.json"), &weekday_hour_heatmap(subset))?;
    write_json(&out_dir.join("ranking_turnover.json"), &rank_turnover(subset, n))?;
    write_json(
        &out_dir.join("ranking_empty.json"),
        &rank_problem_stations(subset, RankingMetric::EmptyRatio, threshold, n),
    )?;
    write_json(
        &out_dir.join("ranking_full.json"),
        &rank_problem_stations(subset, RankingMetric::FullRatio, threshold, n),
    )?;
    write_json(&out_dir.join("neighborhoods.json"), &neighborhood_turnover(subset))?;
    write_json(&out_dir.join("saturation.json"), &aggregate::station_saturation(subset))?;

    info!(out_dir = %out_dir.display(), rows = subset.len(), "Reports written");
    Ok(())
}
