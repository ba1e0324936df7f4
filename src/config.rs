use serde::Deserialize;
use std::time::Duration;

use crate::aggregate::PROBLEM_THRESHOLD;
use crate::error::{PipelineError, Result};

/// Input locations and report parameters.
///
/// Loaded from an optional JSON file, then overridden by environment
/// variables:
/// ```json
/// {
///   "availability": "https://example.org/final_sorted.csv",
///   "top_n": 5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub markers: String,
    pub stations: String,
    pub availability: String,
    pub interactive: String,
    pub top_n: usize,
    pub problem_threshold: f64,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markers: "data/markers_combinado.csv".to_string(),
            stations: "data/Informacio_Estacions_Bicing_2025.csv".to_string(),
            availability: "data/final_sorted.csv".to_string(),
            interactive: "data/bicing_interactive_dataset.csv".to_string(),
            top_n: 10,
            problem_threshold: PROBLEM_THRESHOLD,
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads the config from a JSON file at `path`; missing keys keep their
    /// defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Io {
            path: path.into(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies `BICING_*` overrides read through `lookup`.
    ///
    /// Unparseable numeric values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BICING_MARKERS") {
            self.markers = v;
        }
        if let Some(v) = lookup("BICING_STATIONS") {
            self.stations = v;
        }
        if let Some(v) = lookup("BICING_AVAILABILITY") {
            self.availability = v;
        }
        if let Some(v) = lookup("BICING_INTERACTIVE") {
            self.interactive = v;
        }
        if let Some(v) = lookup("BICING_TOP_N").and_then(|v| v.parse().ok()) {
            self.top_n = v;
        }
        if let Some(v) = lookup("BICING_HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.http_timeout_secs = v;
        }
        self
    }

    pub fn from_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
