//! Source -> bytes -> raw table -> typed records, memoized per run.

use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheKey, LoadCache};
use crate::error::Result;
use crate::fetch::HttpClient;
use crate::join::{join_stations, with_calendar};
use crate::model::{AvailabilityObservation, JoinedObservation, Observation, StationMarker, StationRecord};
use crate::schema::{
    Normalized, normalize_availability, normalize_interactive, normalize_markers, normalize_stations,
};
use crate::source::{DataSource, TextEncoding, read_source};
use crate::table::RawTable;

/// Loads the dashboard's CSV inputs, reusing anything already loaded from
/// the same source with the same parameters.
pub struct Loader<C> {
    client: C,
    markers: LoadCache<StationMarker>,
    stations: LoadCache<StationRecord>,
    availability: LoadCache<AvailabilityObservation>,
    interactive: LoadCache<JoinedObservation>,
}

async fn load_cached<C, T, F>(
    client: &C,
    cache: &mut LoadCache<T>,
    source: &DataSource,
    encoding: TextEncoding,
    dataset: &str,
    normalize: F,
) -> Result<Arc<Vec<T>>>
where
    C: HttpClient,
    F: FnOnce(&RawTable) -> Result<Normalized<T>>,
{
    let key = CacheKey::new(source.identifier(), format!("{dataset}:{encoding:?}"));
    if let Some(hit) = cache.get(&key) {
        info!(dataset, source = %source, rows = hit.len(), "Cache hit");
        return Ok(hit);
    }

    let bytes = read_source(client, source).await?;
    let raw = RawTable::from_csv_str(&encoding.decode(&bytes))?;
    let normalized = normalize(&raw)?;

    info!(
        dataset,
        source = %source,
        rows = normalized.stats.kept,
        dropped = normalized.stats.dropped,
        "Loaded"
    );
    Ok(cache.insert(key, normalized.records))
}

impl<C: HttpClient> Loader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            markers: LoadCache::new(),
            stations: LoadCache::new(),
            availability: LoadCache::new(),
            interactive: LoadCache::new(),
        }
    }

    pub async fn markers(&mut self, source: &DataSource) -> Result<Arc<Vec<StationMarker>>> {
        load_cached(
            &self.client,
            &mut self.markers,
            source,
            TextEncoding::Latin1,
            "markers",
            normalize_markers,
        )
        .await
    }

    pub async fn stations(&mut self, source: &DataSource) -> Result<Arc<Vec<StationRecord>>> {
        load_cached(
            &self.client,
            &mut self.stations,
            source,
            TextEncoding::Latin1,
            "stations",
            normalize_stations,
        )
        .await
    }

    pub async fn availability(&mut self, source: &DataSource) -> Result<Arc<Vec<AvailabilityObservation>>> {
        load_cached(
            &self.client,
            &mut self.availability,
            source,
            TextEncoding::Utf8,
            "availability",
            normalize_availability,
        )
        .await
    }

    pub async fn interactive(&mut self, source: &DataSource) -> Result<Arc<Vec<JoinedObservation>>> {
        load_cached(
            &self.client,
            &mut self.interactive,
            source,
            TextEncoding::Utf8,
            "interactive",
            normalize_interactive,
        )
        .await
    }

    /// Availability history joined with station metadata, with calendar
    /// features attached.
    #[tracing::instrument(skip_all, fields(availability = %availability, stations = %stations))]
    pub async fn observations(
        &mut self,
        availability: &DataSource,
        stations: &DataSource,
    ) -> Result<Vec<Observation>> {
        let avail = self.availability(availability).await?;
        let stations = self.stations(stations).await?;
        Ok(with_calendar(join_stations(&avail, &stations)))
    }

    /// The pre-joined interactive dataset with calendar features.
    pub async fn interactive_observations(&mut self, source: &DataSource) -> Result<Vec<Observation>> {
        let joined = self.interactive(source).await?;
        Ok(with_calendar(joined.as_ref().clone()))
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn cache_hits(&self) -> usize {
        self.markers.hits() + self.stations.hits() + self.availability.hits() + self.interactive.hits()
    }
}
