//! Closed set of semantic field kinds
//!
//! Field names are classified by their trimmed, lower-cased form. Names that
//! are not part of the accident schema classify as `Unknown`; they are carried
//! through every stage but no rule ever applies to them.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKind {
    #[serde(rename = "id")]
    Identifier,
    #[serde(rename = "fecha")]
    Date,
    #[serde(rename = "hora")]
    Time,
    #[serde(rename = "ubicacion")]
    Location,
    #[serde(rename = "tipo_vehiculo")]
    VehicleType,
    #[serde(rename = "gravedad")]
    Severity,
    #[serde(rename = "victimas")]
    Casualties,
    #[serde(rename = "condicion_climatica")]
    WeatherCondition,
    #[serde(rename = "condicion_via")]
    RoadCondition,
    #[serde(rename = "edad_conductor")]
    DriverAge,
    #[serde(rename = "alcohol_involucrado")]
    AlcoholInvolved,
    #[serde(rename = "exceso_velocidad")]
    Speeding,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl FieldKind {
    /// Every recognized kind, in schema order
    pub const RECOGNIZED: [FieldKind; 12] = [
        FieldKind::Identifier,
        FieldKind::Date,
        FieldKind::Time,
        FieldKind::Location,
        FieldKind::VehicleType,
        FieldKind::Severity,
        FieldKind::Casualties,
        FieldKind::WeatherCondition,
        FieldKind::RoadCondition,
        FieldKind::DriverAge,
        FieldKind::AlcoholInvolved,
        FieldKind::Speeding,
    ];

    /// Canonical field name, also the token type tag in reports
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldKind::Identifier => "id",
            FieldKind::Date => "fecha",
            FieldKind::Time => "hora",
            FieldKind::Location => "ubicacion",
            FieldKind::VehicleType => "tipo_vehiculo",
            FieldKind::Severity => "gravedad",
            FieldKind::Casualties => "victimas",
            FieldKind::WeatherCondition => "condicion_climatica",
            FieldKind::RoadCondition => "condicion_via",
            FieldKind::DriverAge => "edad_conductor",
            FieldKind::AlcoholInvolved => "alcohol_involucrado",
            FieldKind::Speeding => "exceso_velocidad",
            FieldKind::Unknown => "UNKNOWN",
        }
    }

    /// Classify a raw field name; never fails
    pub fn classify(field_name: &str) -> Self {
        let normalized = field_name.trim().to_lowercase();
        Self::RECOGNIZED
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .unwrap_or(FieldKind::Unknown)
    }

    pub fn is_recognized(self) -> bool {
        self != FieldKind::Unknown
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
