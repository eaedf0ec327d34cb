//! Coherence predicate table
//!
//! One predicate per field kind that carries a business rule. Predicates
//! assume the value already passed its format rule and run only on
//! non-empty values.

use crate::tokens::FieldKind;
use chrono::{DateTime, NaiveDate, Utc};

pub const SEVERITY_LEVELS: [&str; 4] = ["leve", "moderado", "grave", "fatal"];
pub const WEATHER_CONDITIONS: [&str; 5] = ["soleado", "nublado", "lluvioso", "nevado", "niebla"];
pub const ROAD_CONDITIONS: [&str; 5] = ["seco", "mojado", "hielo", "nieve", "obra"];

pub const MIN_DRIVER_AGE: u32 = 16;
pub const MAX_DRIVER_AGE: u32 = 100;

/// A semantic check bound to a field kind
pub struct CoherenceRule {
    pub kind: FieldKind,
    pub message: &'static str,
    check: fn(&str, DateTime<Utc>) -> bool,
}

impl CoherenceRule {
    /// Whether `value` is coherent as of `now`
    pub fn holds(&self, value: &str, now: DateTime<Utc>) -> bool {
        (self.check)(value, now)
    }
}

pub static COHERENCE_RULES: [CoherenceRule; 6] = [
    CoherenceRule {
        kind: FieldKind::Date,
        message: "La fecha no es válida o es en el futuro",
        check: date_not_in_future,
    },
    CoherenceRule {
        kind: FieldKind::Time,
        message: "La hora no tiene un formato válido",
        check: |value, _| time_in_range(value),
    },
    CoherenceRule {
        kind: FieldKind::DriverAge,
        message: "La edad del conductor debe estar entre 16 y 100 años",
        check: |value, _| driver_age_in_range(value),
    },
    CoherenceRule {
        kind: FieldKind::Severity,
        message: "La gravedad debe ser: leve, moderado, grave o fatal",
        check: |value, _| is_member(value, &SEVERITY_LEVELS),
    },
    CoherenceRule {
        kind: FieldKind::WeatherCondition,
        message: "La condición climática no es válida",
        check: |value, _| is_member(value, &WEATHER_CONDITIONS),
    },
    CoherenceRule {
        kind: FieldKind::RoadCondition,
        message: "La condición de la vía no es válida",
        check: |value, _| is_member(value, &ROAD_CONDITIONS),
    },
];

pub fn rule_for(kind: FieldKind) -> Option<&'static CoherenceRule> {
    COHERENCE_RULES.iter().find(|rule| rule.kind == kind)
}

/// A real calendar date whose midnight UTC is not after `now`
pub fn date_not_in_future(value: &str, now: DateTime<Utc>) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc() <= now)
        .unwrap_or(false)
}

/// `HH:MM` with hour in [0, 24) and minute in [0, 60)
pub fn time_in_range(value: &str) -> bool {
    let mut parts = value.split(':');
    let hour = parts.next().and_then(|h| h.parse::<u32>().ok());
    let minute = parts.next().and_then(|m| m.parse::<u32>().ok());

    matches!((hour, minute), (Some(h), Some(m)) if h < 24 && m < 60)
}

pub fn driver_age_in_range(value: &str) -> bool {
    value
        .parse::<u32>()
        .map(|age| (MIN_DRIVER_AGE..=MAX_DRIVER_AGE).contains(&age))
        .unwrap_or(false)
}

/// Case-insensitive membership
pub fn is_member(value: &str, allowed: &[&str]) -> bool {
    let lowered = value.to_lowercase();
    allowed.iter().any(|candidate| *candidate == lowered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_date_predicate() {
        assert!(date_not_in_future("2023-05-01", now()));
        assert!(date_not_in_future("2024-06-15", now()));
        assert!(!date_not_in_future("2024-06-16", now()));
        assert!(!date_not_in_future("2099-01-01", now()));
        assert!(!date_not_in_future("2023-02-30", now()));
        assert!(!date_not_in_future("2023-13-01", now()));
    }

    #[test]
    fn test_time_predicate() {
        assert!(time_in_range("00:00"));
        assert!(time_in_range("23:59"));
        assert!(!time_in_range("24:00"));
        assert!(!time_in_range("25:61"));
        assert!(!time_in_range("12:60"));
    }

    #[test]
    fn test_age_predicate_bounds() {
        assert!(driver_age_in_range("16"));
        assert!(driver_age_in_range("100"));
        assert!(driver_age_in_range("030"));
        assert!(!driver_age_in_range("15"));
        assert!(!driver_age_in_range("101"));
    }

    #[test]
    fn test_membership_is_case_insensitive() {
        assert!(is_member("LEVE", &SEVERITY_LEVELS));
        assert!(is_member("Niebla", &WEATHER_CONDITIONS));
        assert!(is_member("obra", &ROAD_CONDITIONS));
        assert!(!is_member("catastrofico", &SEVERITY_LEVELS));
        assert!(!is_member(" seco", &ROAD_CONDITIONS));
    }

    #[test]
    fn test_rule_table_covers_business_kinds_only() {
        assert!(rule_for(FieldKind::Severity).is_some());
        assert!(rule_for(FieldKind::Date).is_some());
        assert!(rule_for(FieldKind::Casualties).is_none());
        assert!(rule_for(FieldKind::VehicleType).is_none());
        assert!(rule_for(FieldKind::Identifier).is_none());
        assert!(rule_for(FieldKind::Unknown).is_none());
    }
}
