//! Human-readable summary block

use super::aggregates::DetailedData;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    #[serde(rename = "Total de accidentes analizados")]
    pub total_analyzed: usize,
    #[serde(rename = "Accidentes validos")]
    pub valid: usize,
    #[serde(rename = "Accidentes con errores")]
    pub with_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessSummary {
    #[serde(rename = "Total de accidentes analizados")]
    pub total_analyzed: usize,
    #[serde(rename = "Accidentes validos")]
    pub valid: usize,
    #[serde(rename = "Total de victimas")]
    pub total_casualties: i64,
    #[serde(rename = "Accidentes con alcohol involucrado")]
    pub alcohol_involved: usize,
    #[serde(rename = "Accidentes con exceso de velocidad")]
    pub speeding_involved: usize,
    #[serde(rename = "Accidentes por gravedad")]
    pub by_severity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Summary {
    Error(ErrorSummary),
    Success(SuccessSummary),
}

impl Summary {
    /// Every input row counted as erroneous
    pub fn for_error(record_count: usize) -> Self {
        Summary::Error(ErrorSummary {
            total_analyzed: record_count,
            valid: 0,
            with_errors: record_count,
        })
    }

    pub fn for_success(record_count: usize, accepted: usize, data: &DetailedData) -> Self {
        Summary::Success(SuccessSummary {
            total_analyzed: record_count,
            valid: accepted,
            total_casualties: data.total_casualties,
            alcohol_involved: data.alcohol_involved,
            speeding_involved: data.speeding_involved,
            by_severity: data.severity_counts.describe(),
        })
    }

    pub fn total_analyzed(&self) -> usize {
        match self {
            Summary::Error(s) => s.total_analyzed,
            Summary::Success(s) => s.total_analyzed,
        }
    }

    pub fn valid(&self) -> usize {
        match self {
            Summary::Error(s) => s.valid,
            Summary::Success(s) => s.valid,
        }
    }
}
