//! Aggregates over accepted records

use crate::syntax::ValidatedRow;
use crate::tokens::FieldKind;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Bucket for accepted records without a vehicle type
pub const UNSPECIFIED_VEHICLE: &str = "No especificado";

/// Flag values counted as "involved"
const AFFIRMATIVE_FLAGS: [&str; 3] = ["si", "true", "1"];

/// Counter keyed by string, iterated in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    buckets: Vec<(String, usize)>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        match self.buckets.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, count)) => *count += 1,
            None => self.buckets.push((key.to_string(), 1)),
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.buckets
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.buckets.iter().map(|(key, count)| (key.as_str(), *count))
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// `key: count` pairs joined by `, `
    pub fn describe(&self) -> String {
        self.iter()
            .map(|(key, count)| format!("{}: {}", key, count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (key, count) in &self.buckets {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Raw numeric aggregates for charts and tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedData {
    pub severity_counts: Tally,
    pub vehicle_type_counts: Tally,
    pub alcohol_involved: usize,
    pub speeding_involved: usize,
    pub total_casualties: i64,
}

impl DetailedData {
    pub fn from_rows(rows: &[ValidatedRow]) -> Self {
        let mut data = DetailedData::default();

        for row in rows {
            let severity = row
                .value_of(FieldKind::Severity)
                .unwrap_or_default()
                .to_lowercase();
            data.severity_counts.increment(&severity);

            let vehicle = row
                .non_empty(FieldKind::VehicleType)
                .unwrap_or(UNSPECIFIED_VEHICLE);
            data.vehicle_type_counts.increment(vehicle);

            if is_affirmative(row.value_of(FieldKind::AlcoholInvolved)) {
                data.alcohol_involved += 1;
            }
            if is_affirmative(row.value_of(FieldKind::Speeding)) {
                data.speeding_involved += 1;
            }

            let casualties = row
                .value_of(FieldKind::Casualties)
                .map(lenient_int)
                .unwrap_or(0);
            data.total_casualties = data.total_casualties.saturating_add(casualties);
        }

        data
    }
}

fn is_affirmative(value: Option<&str>) -> bool {
    value
        .map(|v| AFFIRMATIVE_FLAGS.contains(&v.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Leading integer of `value`, or 0 when there is none
///
/// Skips leading whitespace, accepts one sign, and stops at the first
/// non-digit. Saturates instead of overflowing.
pub fn lenient_int(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::FieldToken;
    use crate::utils::CellLocation;

    fn row(number: usize, fields: &[(&str, &str)]) -> ValidatedRow {
        let tokens = fields
            .iter()
            .enumerate()
            .map(|(i, (name, value))| FieldToken::new(*name, *value, CellLocation::new(number, i + 1)))
            .collect();
        ValidatedRow::new(number, tokens)
    }

    #[test]
    fn test_lenient_int() {
        assert_eq!(lenient_int("2"), 2);
        assert_eq!(lenient_int("  12abc"), 12);
        assert_eq!(lenient_int("-3"), -3);
        assert_eq!(lenient_int("+7"), 7);
        assert_eq!(lenient_int("abc"), 0);
        assert_eq!(lenient_int(""), 0);
        assert_eq!(lenient_int("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_tally_keeps_first_seen_order() {
        let mut tally = Tally::new();
        for key in ["grave", "leve", "grave", "fatal"] {
            tally.increment(key);
        }

        assert_eq!(tally.describe(), "grave: 2, leve: 1, fatal: 1");
        assert_eq!(tally.total(), 4);
        assert_eq!(
            serde_json::to_string(&tally).unwrap(),
            r#"{"grave":2,"leve":1,"fatal":1}"#
        );
    }

    #[test]
    fn test_detailed_data_over_rows() {
        let rows = vec![
            row(1, &[("gravedad", "Leve"), ("tipo_vehiculo", "auto"), ("victimas", "2"), ("alcohol_involucrado", "SI")]),
            row(2, &[("gravedad", "leve"), ("tipo_vehiculo", ""), ("victimas", "3"), ("exceso_velocidad", "true")]),
            row(3, &[("victimas", "x"), ("exceso_velocidad", "0")]),
        ];

        let data = DetailedData::from_rows(&rows);

        assert_eq!(data.severity_counts.get("leve"), 2);
        assert_eq!(data.severity_counts.get(""), 1);
        assert_eq!(data.severity_counts.total(), rows.len());
        assert_eq!(data.vehicle_type_counts.get("auto"), 1);
        assert_eq!(data.vehicle_type_counts.get(UNSPECIFIED_VEHICLE), 2);
        assert_eq!(data.alcohol_involved, 1);
        assert_eq!(data.speeding_involved, 1);
        assert_eq!(data.total_casualties, 5);
    }

    #[test]
    fn test_vehicle_type_key_is_raw_value() {
        let rows = vec![row(1, &[("tipo_vehiculo", "Moto")]), row(2, &[("tipo_vehiculo", "moto")])];
        let data = DetailedData::from_rows(&rows);
        assert_eq!(data.vehicle_type_counts.len(), 2);
    }
}
