// Sample domain model and record normalization
use super::variable::Variable;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Key layout used by the history store. Lexicographic order of keys in this
/// format equals chronological order, which range queries rely on.
pub const KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A keyed record set as delivered by the store, in delivery order.
pub type RecordSet = Vec<(String, serde_json::Value)>;

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub key: String,
    pub at: Option<NaiveDateTime>,
    values: BTreeMap<Variable, f64>,
}

impl Sample {
    pub fn new(key: impl Into<String>, values: impl IntoIterator<Item = (Variable, f64)>) -> Self {
        let key = key.into();
        let at = parse_key(&key);
        Self {
            key,
            at,
            values: values.into_iter().collect(),
        }
    }

    fn from_record(key: String, record: &serde_json::Value) -> Self {
        let values = Variable::ALL
            .into_iter()
            .filter_map(|v| record.get(v.key()).and_then(|x| x.as_f64()).map(|x| (v, x)));
        Self::new(key, values)
    }

    pub fn value(&self, variable: Variable) -> Option<f64> {
        self.values.get(&variable).copied()
    }

    /// `HH:MM` label, without the date.
    pub fn time_of_day(&self) -> String {
        match self.at {
            Some(at) => at.format("%H:%M").to_string(),
            None => self.key.get(11..16).unwrap_or(&self.key).to_string(),
        }
    }

    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.at.is_some_and(|at| at.date() == day)
    }
}

/// Parse a store key. Accepts the canonical layout, a minute-precision variant
/// and full RFC 3339 strings (the offset is dropped).
pub fn parse_key(key: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(key, KEY_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(key, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(key).ok().map(|dt| dt.naive_local()))
}

/// Build the store key for a day and a time of day.
pub fn range_key(day: NaiveDate, time: NaiveTime) -> String {
    NaiveDateTime::new(day, time).format(KEY_FORMAT).to_string()
}

/// Turn a raw record set into samples ordered by timestamp.
///
/// Records with an empty key are dropped; anything else yields a sample, with
/// missing or non-numeric fields simply absent. The sort is stable, so equal
/// timestamps keep delivery order. Keys that do not parse sort last.
pub fn normalize(records: RecordSet) -> Vec<Sample> {
    let mut samples: Vec<Sample> = records
        .into_iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, record)| Sample::from_record(key, &record))
        .collect();

    samples.sort_by(|a, b| match (a.at, b.at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_set(entries: &[(&str, serde_json::Value)]) -> RecordSet {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_normalize_sorts_by_timestamp() {
        let records = record_set(&[
            ("2024-01-01T09:00:00", json!({"temp": 22.0})),
            ("2024-01-01T07:30:00", json!({"temp": 19.0})),
            ("2024-01-01T08:00", json!({"temp": 20.0})),
        ]);

        let samples = normalize(records);
        let keys: Vec<&str> = samples.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["2024-01-01T07:30:00", "2024-01-01T08:00", "2024-01-01T09:00:00"]
        );
    }

    #[test]
    fn test_normalize_drops_empty_keys_only() {
        let records = record_set(&[
            ("", json!({"temp": 1.0})),
            ("2024-01-01T08:00:00", json!(null)),
            ("2024-01-01T08:01:00", json!({"hum": "wet"})),
            ("2024-01-01T08:02:00", json!({"co2": 512})),
        ]);

        let samples = normalize(records);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].value(Variable::Temp), None);
        assert_eq!(samples[1].value(Variable::Hum), None);
        assert_eq!(samples[2].value(Variable::Co2), Some(512.0));
    }

    #[test]
    fn test_normalize_ties_keep_delivery_order() {
        let records = record_set(&[
            ("2024-01-01T08:00:00", json!({"temp": 1.0})),
            ("2024-01-01T08:00", json!({"temp": 2.0})),
            ("garbage", json!({"temp": 3.0})),
            ("2024-01-01T07:00:00", json!({"temp": 4.0})),
        ]);

        let values: Vec<Option<f64>> = normalize(records)
            .iter()
            .map(|s| s.value(Variable::Temp))
            .collect();
        assert_eq!(values, vec![Some(4.0), Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn test_time_of_day_and_range_key() {
        let sample = Sample::new("2024-03-05T14:07:59", Vec::new());
        assert_eq!(sample.time_of_day(), "14:07");
        assert!(sample.is_on(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()));

        let key = range_key(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        );
        assert_eq!(key, "2024-03-05T08:30:00");
    }
}
