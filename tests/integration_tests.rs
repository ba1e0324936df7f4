use std::collections::BTreeSet;
use std::path::PathBuf;

use bicing_stats::aggregate::{
    RankingMetric, hourly_mean, hourly_mean_by_holiday, hourly_mean_by_season, neighborhood_turnover,
    rank_problem_stations, rank_turnover, snapshot, snapshot_rows, snapshot_summary, station_turnover,
    weekday_hour_heatmap,
};
use bicing_stats::calendar::{DayOfWeek, Season};
use bicing_stats::evaluation::evaluate;
use bicing_stats::fetch::BasicClient;
use bicing_stats::filter::{self, DateRange, HourRange, Query, StationSelector, filter_markers};
use bicing_stats::join::{join_stations, with_calendar};
use bicing_stats::level::AvailabilityLevel;
use bicing_stats::loader::Loader;
use bicing_stats::model::{Observation, StationType};
use bicing_stats::schema::{normalize_availability, normalize_markers, normalize_stations};
use bicing_stats::source::{DataSource, TextEncoding};
use bicing_stats::table::RawTable;
use bicing_stats::PipelineError;
use chrono::NaiveDate;

fn fixture(name: &str) -> DataSource {
    DataSource::Local(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name))
}

/// The availability fixture starts with a UTF-8 BOM.
fn availability_table() -> RawTable {
    let text = TextEncoding::Utf8.decode(include_bytes!("fixtures/availability.csv"));
    RawTable::from_csv_str(&text).unwrap()
}

fn history() -> Vec<Observation> {
    let availability = normalize_availability(&availability_table()).unwrap();
    let stations =
        normalize_stations(&RawTable::from_csv_str(include_str!("fixtures/stations.csv")).unwrap()).unwrap();
    with_calendar(join_stations(&availability.records, &stations.records))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_normalize_drops_unparseable_rows() {
    let availability = normalize_availability(&availability_table()).unwrap();

    assert_eq!(availability.stats.total_rows, 7);
    assert_eq!(availability.stats.dropped, 1);
    // 5.5 rounds half to even
    let station_7: Vec<u32> = availability
        .records
        .iter()
        .filter(|o| o.station_id == 7)
        .map(|o| o.available_bikes)
        .collect();
    assert_eq!(station_7, vec![6, 6]);
}

#[test]
fn test_join_keeps_only_known_stations() {
    let observations = history();
    assert_eq!(observations.len(), 5);
    assert!(observations.iter().all(|o| o.station_id != 99));

    let sants = observations.iter().find(|o| o.station_id == 7).unwrap();
    assert_eq!(sants.station_type, Some(StationType::Old));
    assert_eq!(sants.neighborhood(), "Sants");
}

#[test]
fn test_single_station_pipeline() {
    let observations = history();
    let query = Query::all().with_station(StationSelector::Id(42));
    let subset = filter::apply(&observations, &query);

    let hourly = hourly_mean(&subset).ready().unwrap();
    let means: Vec<(u32, f64)> = hourly.iter().map(|h| (h.hour, h.mean_available)).collect();
    assert_eq!(means, vec![(0, 10.0), (1, 4.0), (2, 0.0)]);

    let turnover = station_turnover(&subset).ready().unwrap();
    assert_eq!(turnover[0].turnover, 5.0);

    let empty = rank_problem_stations(&subset, RankingMetric::EmptyRatio, 0.10, 10)
        .ready()
        .unwrap();
    assert_eq!(empty.len(), 1);
    assert_eq!(empty[0].station_id, 42);
    assert_eq!(empty[0].display, "33%");
    assert!((empty[0].metric_value - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_rankings_across_stations() {
    let observations = history();

    let turnover = rank_turnover(&observations, 10).ready().unwrap();
    let order: Vec<i64> = turnover.iter().map(|r| r.station_id).collect();
    assert_eq!(order, vec![42, 7]);
    assert_eq!(turnover[0].display, "5.00");
    assert_eq!(turnover[1].rank, 2);

    // station 7 sits at its own maximum in every sample
    let full = rank_problem_stations(&observations, RankingMetric::FullRatio, 0.10, 10)
        .ready()
        .unwrap();
    assert_eq!(full[0].station_id, 7);
    assert_eq!(full[0].display, "100%");
    assert_eq!(full[1].display, "33%");

    let top_one = rank_turnover(&observations, 1).ready().unwrap();
    assert_eq!(top_one.len(), 1);
}

#[test]
fn test_neighborhood_turnover_ordering() {
    let rows = neighborhood_turnover(&history()).ready().unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.neighborhood.as_str()).collect();
    assert_eq!(names, vec!["Eixample", "Sants"]);
    assert_eq!(rows[0].mean_turnover, 5.0);
}

#[test]
fn test_heatmap_cells() {
    let heatmap = weekday_hour_heatmap(&history()).ready().unwrap();
    // 2024-03-06 is a Wednesday
    assert_eq!(heatmap.get(DayOfWeek::Wed, 0), Some(8.0));
    assert_eq!(heatmap.get(DayOfWeek::Wed, 2), Some(0.0));
    assert_eq!(heatmap.get(DayOfWeek::Mon, 0), None);
    assert_eq!(heatmap.filled(), 3);
    assert_eq!(heatmap.cells().len(), 7 * 24);
}

#[test]
fn test_empty_filter_is_no_data() {
    let observations = history();
    let query = Query::all().with_hours(HourRange::new(7, 9).unwrap());
    let subset = filter::apply(&observations, &query);

    assert!(subset.is_empty());
    assert!(hourly_mean(&subset).is_no_data());
    assert!(weekday_hour_heatmap(&subset).is_no_data());
    assert!(rank_turnover(&subset, 10).is_no_data());
    assert!(snapshot_summary(&subset).is_no_data());
}

#[test]
fn test_overnight_hour_range_rejected() {
    assert!(matches!(HourRange::new(22, 2), Err(PipelineError::InvalidQuery(_))));
}

#[test]
fn test_snapshot_view() {
    let observations = history();
    let query = Query::all()
        .with_dates(DateRange::single(date(2024, 3, 6)))
        .with_hours(HourRange::single(0).unwrap());
    let subset = filter::apply(&observations, &query);

    let summary = snapshot_summary(&subset).ready().unwrap();
    assert_eq!(summary.stations, 2);
    assert_eq!(summary.mean_available_kpi, 8);

    let rows = snapshot_rows(&subset).ready().unwrap();
    assert_eq!(rows[0].station_id, 42);
    assert_eq!(rows[0].level, AvailabilityLevel::from_count(10));

    let view = snapshot(&subset).ready().unwrap();
    assert_eq!(view.summary, summary);
    assert_eq!(view.rows, rows);
}

#[test]
fn test_markers_positional_headers_and_type_filter() {
    let markers = normalize_markers(&RawTable::from_csv_str(include_str!("fixtures/markers.csv")).unwrap())
        .unwrap();
    assert_eq!(markers.records.len(), 2);

    let only_new: BTreeSet<StationType> = [StationType::New].into();
    let filtered = filter_markers(&markers.records, &only_new).ready().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Placa Catalunya");

    assert!(filter_markers(&markers.records, &BTreeSet::new()).is_no_data());
}

#[test]
fn test_evaluation_matches_exact_ids() {
    let predictions = RawTable::from_csv_str(include_str!("fixtures/predictions.csv")).unwrap();
    let truth = RawTable::from_csv_str(include_str!("fixtures/truth.csv")).unwrap();

    let summary = evaluate(&predictions, Some(&truth)).unwrap().ready().unwrap();
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.unmatched, 1);
    assert!((summary.mae - 0.5).abs() < 1e-9);
    assert!((summary.rmse - 0.5f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_evaluation_without_truth_column() {
    let predictions = RawTable::from_csv_str(include_str!("fixtures/predictions.csv")).unwrap();
    assert!(matches!(
        evaluate(&predictions, None),
        Err(PipelineError::MissingColumn { .. })
    ));
}

#[tokio::test]
async fn test_loader_reads_local_history_once() {
    let mut loader = Loader::new(BasicClient::new());
    let availability = fixture("availability.csv");
    let stations = fixture("stations.csv");

    let first = loader.observations(&availability, &stations).await.unwrap();
    let second = loader.observations(&availability, &stations).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
    assert_eq!(loader.cache_hits(), 2);
}

#[tokio::test]
async fn test_interactive_dataset_calendar_features() {
    let mut loader = Loader::new(BasicClient::new());
    let observations = loader
        .interactive_observations(&fixture("interactive.csv"))
        .await
        .unwrap();
    assert_eq!(observations.len(), 4);

    let easter = observations
        .iter()
        .find(|o| o.bucket.date == date(2024, 3, 31))
        .unwrap();
    assert!(easter.bucket.is_holiday);
    assert_eq!(easter.bucket.season, Season::Spring);
    assert_eq!(easter.bucket.weekday, DayOfWeek::Sun);

    let august = observations
        .iter()
        .find(|o| o.bucket.date == date(2024, 8, 15))
        .unwrap();
    assert!(august.bucket.is_holiday);
    assert_eq!(august.bucket.season, Season::Summer);

    let by_holiday = hourly_mean_by_holiday(&observations).ready().unwrap();
    assert!(by_holiday.iter().any(|r| r.is_holiday && r.hour == 10 && r.mean_available == 5.0));

    let by_season = hourly_mean_by_season(&observations).ready().unwrap();
    assert!(by_season.iter().any(|r| r.season == Season::Autumn && r.hour == 11));

    let old_only = Query::all().with_types([StationType::Old]);
    let subset = filter::apply(&observations, &old_only);
    assert_eq!(subset.len(), 1);
    assert_eq!(subset[0].name, "Rambla");
}

#[tokio::test]
async fn test_missing_required_column_aborts_load() {
    let mut loader = Loader::new(BasicClient::new());
    // the stations file has no `mean_available_docks`
    let result = loader.availability(&fixture("stations.csv")).await;
    assert!(matches!(result, Err(PipelineError::MissingColumn { .. })));
}
