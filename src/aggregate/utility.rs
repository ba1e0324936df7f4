use std::collections::BTreeMap;

use crate::model::Observation;

/// Arithmetic mean, `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of `available_bikes` per key, keys in ascending order.
pub fn mean_available_by<K, F>(observations: &[Observation], key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&Observation) -> K,
{
    let mut sums: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for obs in observations {
        let entry = sums.entry(key(obs)).or_insert((0.0, 0));
        entry.0 += obs.available_bikes as f64;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(k, (sum, count))| (k, sum / count as f64))
        .collect()
}

/// Groups observations per station, each group sorted by timestamp.
pub fn by_station(observations: &[Observation]) -> BTreeMap<i64, Vec<&Observation>> {
    let mut groups: BTreeMap<i64, Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        groups.entry(obs.station_id).or_default().push(obs);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|o| o.timestamp);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_undefined() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_values() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}
