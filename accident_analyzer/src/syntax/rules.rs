//! Format rule table
//!
//! Each rule binds a field kind to an anchored pattern and the message
//! reported when a value does not match. Kinds without an entry (location,
//! vehicle type, severity, weather, road condition) accept any text here.

use crate::tokens::FieldKind;
use regex::Regex;
use std::sync::OnceLock;

pub struct FormatRule {
    pub kind: FieldKind,
    pub pattern: &'static str,
    pub message: &'static str,
}

const FLAG_PATTERN: &str = r"^(?i:si|no|true|false|1|0)$";

pub const FORMAT_RULES: &[FormatRule] = &[
    FormatRule {
        kind: FieldKind::Identifier,
        pattern: r"^ACC-[0-9]{4}-[0-9]{6}$",
        message: "ID del accidente debe tener formato ACC-YYYY-XXXXXX",
    },
    FormatRule {
        kind: FieldKind::Date,
        pattern: r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$",
        message: "La fecha debe tener formato YYYY-MM-DD",
    },
    FormatRule {
        kind: FieldKind::Time,
        pattern: r"^[0-9]{2}:[0-9]{2}$",
        message: "La hora debe tener formato HH:MM",
    },
    FormatRule {
        kind: FieldKind::DriverAge,
        pattern: r"^[0-9]{1,3}$",
        message: "La edad del conductor debe ser un número entre 1 y 999",
    },
    FormatRule {
        kind: FieldKind::Casualties,
        pattern: r"^[0-9]+$",
        message: "El número de víctimas debe ser un numero entero",
    },
    FormatRule {
        kind: FieldKind::AlcoholInvolved,
        pattern: FLAG_PATTERN,
        message: "Alcohol involucrado debe ser si/no, true/false, o 1/0",
    },
    FormatRule {
        kind: FieldKind::Speeding,
        pattern: FLAG_PATTERN,
        message: "Exceso de velocidad debe ser si/no, true/false, o 1/0",
    },
];

/// A rule with its pattern compiled
pub struct CompiledRule {
    pub rule: &'static FormatRule,
    regex: Regex,
}

impl CompiledRule {
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

static COMPILED_RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();

fn compiled_rules() -> &'static [CompiledRule] {
    COMPILED_RULES.get_or_init(|| {
        FORMAT_RULES
            .iter()
            .map(|rule| CompiledRule {
                rule,
                regex: Regex::new(rule.pattern).expect("format rule patterns are valid"),
            })
            .collect()
    })
}

/// The rule registered for a kind, if any
pub fn rule_for(kind: FieldKind) -> Option<&'static CompiledRule> {
    compiled_rules().iter().find(|compiled| compiled.rule.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts(kind: FieldKind, value: &str) -> bool {
        rule_for(kind).map(|r| r.matches(value)).unwrap_or(true)
    }

    #[test]
    fn test_identifier_rule() {
        assert!(accepts(FieldKind::Identifier, "ACC-2024-000001"));
        assert!(!accepts(FieldKind::Identifier, "BAD-ID"));
        assert!(!accepts(FieldKind::Identifier, "acc-2024-000001"));
        assert!(!accepts(FieldKind::Identifier, "ACC-2024-0000011"));
        assert!(!accepts(FieldKind::Identifier, " ACC-2024-000001"));
    }

    #[test]
    fn test_date_and_time_rules_are_shape_only() {
        assert!(accepts(FieldKind::Date, "2099-01-01"));
        assert!(accepts(FieldKind::Date, "2023-02-30"));
        assert!(!accepts(FieldKind::Date, "2023/05/01"));
        assert!(!accepts(FieldKind::Date, ""));
        assert!(accepts(FieldKind::Time, "25:61"));
        assert!(!accepts(FieldKind::Time, "9:30"));
    }

    #[test]
    fn test_numeric_rules() {
        assert!(accepts(FieldKind::DriverAge, "7"));
        assert!(accepts(FieldKind::DriverAge, "999"));
        assert!(!accepts(FieldKind::DriverAge, "1000"));
        assert!(!accepts(FieldKind::DriverAge, "-3"));
        assert!(accepts(FieldKind::Casualties, "0"));
        assert!(accepts(FieldKind::Casualties, "12345"));
        assert!(!accepts(FieldKind::Casualties, "2.5"));
    }

    #[test]
    fn test_digit_rules_reject_non_ascii_digits() {
        assert!(!accepts(FieldKind::Casualties, "٣"));
        assert!(!accepts(FieldKind::DriverAge, "３０"));
    }

    #[test]
    fn test_flag_rules_are_case_insensitive() {
        for value in ["si", "SI", "No", "TRUE", "false", "1", "0"] {
            assert!(accepts(FieldKind::AlcoholInvolved, value), "{}", value);
            assert!(accepts(FieldKind::Speeding, value), "{}", value);
        }
        assert!(!accepts(FieldKind::AlcoholInvolved, "yes"));
        assert!(!accepts(FieldKind::Speeding, "sino"));
    }

    #[test]
    fn test_free_text_kinds_have_no_rule() {
        for kind in [
            FieldKind::Location,
            FieldKind::VehicleType,
            FieldKind::Severity,
            FieldKind::WeatherCondition,
            FieldKind::RoadCondition,
            FieldKind::Unknown,
        ] {
            assert!(rule_for(kind).is_none());
        }
    }
}
