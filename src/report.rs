//! Outcome of a computation over a possibly empty table.

use serde::Serialize;

/// Either nothing matched, or a computed value.
///
/// "No rows" is a normal, presentable state rather than an error, so every
/// aggregation hands it back explicitly instead of operating on an empty
/// table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Report<T> {
    NoData,
    Ready(T),
}

impl<T> Report<T> {
    /// Runs `compute` only when `rows` is non-empty.
    pub fn guard<R, F>(rows: &[R], compute: F) -> Report<T>
    where
        F: FnOnce(&[R]) -> T,
    {
        if rows.is_empty() {
            Report::NoData
        } else {
            Report::Ready(compute(rows))
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Report::NoData)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Report<U> {
        match self {
            Report::NoData => Report::NoData,
            Report::Ready(v) => Report::Ready(f(v)),
        }
    }

    pub fn as_ref(&self) -> Report<&T> {
        match self {
            Report::NoData => Report::NoData,
            Report::Ready(v) => Report::Ready(v),
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Report::NoData => None,
            Report::Ready(v) => Some(v),
        }
    }
}

impl<T> Report<Vec<T>> {
    /// `NoData` for an empty vector.
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Report::NoData
        } else {
            Report::Ready(rows)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_skips_compute_on_empty() {
        let rows: Vec<u32> = vec![];
        let report: Report<u32> = Report::guard(&rows, |_| panic!("must not run"));
        assert!(report.is_no_data());
    }

    #[test]
    fn test_guard_runs_on_rows() {
        let report = Report::guard(&[1u32, 2, 3], |r| r.iter().sum::<u32>());
        assert_eq!(report, Report::Ready(6));
        assert_eq!(report.map(|v| v * 2).ready(), Some(12));
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let empty: Report<Vec<u8>> = Report::NoData;
        assert_eq!(serde_json::to_string(&empty).unwrap(), r#"{"status":"no_data"}"#);
        let ready = Report::Ready(vec![1]);
        assert_eq!(
            serde_json::to_string(&ready).unwrap(),
            r#"{"status":"ready","data":[1]}"#
        );
    }
}
