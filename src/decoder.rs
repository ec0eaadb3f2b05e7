use crate::errors::ChartError;
use crate::models::{NutritionRecord, Observation};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Decodes the serialized payload embedded in the chart's hosting element.
///
/// Source order is preserved. Absent or `null` numeric fields become `None`;
/// a recorded `0` stays `Some(0.0)`.
pub fn decode(raw: Option<&str>) -> Result<Vec<Observation>, ChartError> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Err(ChartError::MissingPayload),
    };

    let records: Vec<NutritionRecord> = serde_json::from_str(raw)
        .map_err(|err| ChartError::MalformedPayload(err.to_string()))?;

    let mut seen = HashSet::with_capacity(records.len());
    let mut observations = Vec::with_capacity(records.len());
    for record in records {
        let date = parse_day(&record.date)?;
        if !seen.insert(date) {
            return Err(ChartError::MalformedPayload(format!("duplicate date {date}")));
        }
        observations.push(Observation::new(date, record.calories, record.weight));
    }

    Ok(observations)
}

/// Normalizes date text to a calendar day.
///
/// Accepts plain ISO dates, RFC 3339 timestamps (the day in the timestamp's
/// own offset) and naive date-times.
pub fn parse_day(text: &str) -> Result<NaiveDate, ChartError> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, DAY_FORMAT) {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }
    Err(ChartError::MalformedPayload(format!("invalid date {text:?}")))
}

/// Stable sort by date, for sources that cannot guarantee chronological order.
pub fn sort_chronologically(observations: &mut [Observation]) {
    observations.sort_by_key(|observation| observation.date);
}

/// Serializes a series back into the payload format.
pub fn encode(observations: &[Observation]) -> Result<String, ChartError> {
    let records: Vec<NutritionRecord> = observations
        .iter()
        .map(|observation| NutritionRecord {
            date: observation.date.format(DAY_FORMAT).to_string(),
            calories: observation.calories,
            weight: observation.weight,
        })
        .collect();
    serde_json::to_string(&records).map_err(|err| ChartError::MalformedPayload(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn decode_preserves_order_and_missing_values() {
        let raw = r#"[
            {"date":"2024-07-13","calories":null,"weight":93.75},
            {"date":"2024-07-12","calories":2000,"weight":94.1},
            {"date":"2024-07-14"}
        ]"#;
        let series = decode(Some(raw)).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series[0], Observation::new(day(2024, 7, 13), None, Some(93.75)));
        assert_eq!(series[1], Observation::new(day(2024, 7, 12), Some(2000.0), Some(94.1)));
        assert_eq!(series[2], Observation::empty(day(2024, 7, 14)));
    }

    #[test]
    fn decode_keeps_recorded_zero() {
        let series = decode(Some(r#"[{"date":"2024-07-12","calories":0,"weight":0}]"#)).unwrap();
        assert_eq!(series[0].calories, Some(0.0));
        assert_eq!(series[0].weight, Some(0.0));
    }

    #[test]
    fn decode_normalizes_timestamps_to_days() {
        let raw = r#"[
            {"date":"2024-07-12T00:00:00Z","calories":1800},
            {"date":"2024-07-13T23:30:00+02:00"},
            {"date":"2024-07-14T08:15:00"}
        ]"#;
        let dates: Vec<_> = decode(Some(raw)).unwrap().into_iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![day(2024, 7, 12), day(2024, 7, 13), day(2024, 7, 14)]);
    }

    #[test]
    fn decode_requires_payload() {
        assert_eq!(decode(None), Err(ChartError::MissingPayload));
        assert_eq!(decode(Some("")), Err(ChartError::MissingPayload));
        assert_eq!(decode(Some("   ")), Err(ChartError::MissingPayload));
    }

    #[test]
    fn decode_rejects_malformed_input() {
        for raw in [
            "not json",
            r#"{"date":"2024-07-12"}"#,
            r#"[{"date":"2024-13-45","calories":1}]"#,
            r#"[{"date":"yesterday"}]"#,
            r#"[{"date":"2024-07-12"},{"date":"2024-07-12T10:00:00Z"}]"#,
        ] {
            assert!(
                matches!(decode(Some(raw)), Err(ChartError::MalformedPayload(_))),
                "expected malformed for {raw}"
            );
        }
    }

    #[test]
    fn sort_orders_by_date() {
        let mut series = vec![
            Observation::empty(day(2024, 7, 14)),
            Observation::empty(day(2024, 7, 12)),
            Observation::empty(day(2024, 7, 13)),
        ];
        sort_chronologically(&mut series);
        let dates: Vec<_> = series.iter().map(|o| o.date.day0()).collect();
        assert_eq!(dates, vec![11, 12, 13]);
    }

    #[test]
    fn encode_writes_plain_dates_and_nulls() {
        let series = vec![Observation::new(day(2024, 7, 12), Some(2000.0), None)];
        let encoded = encode(&series).unwrap();
        assert_eq!(encoded, r#"[{"date":"2024-07-12","calories":2000.0,"weight":null}]"#);
        assert_eq!(decode(Some(&encoded)).unwrap(), series);
    }
}
