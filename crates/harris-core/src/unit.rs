//! Stratigraphic units: the flat storage record and the typed node built from it.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Location};
use crate::error::RecordError;
use crate::kind::UnitKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unit identifier: the unit number, kept as text.
///
/// Archaeological numbering is not always numeric (`"12a"`, `"SF3"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    /// Create from any string, trimming surrounding whitespace
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// Borrow the identifier text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UnitId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for UnitId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat unit record as returned by the storage collaborator.
///
/// Every field is text; numbers and nulls coming from the store are
/// normalised to strings (null → empty). Field aliases accept the column
/// names used by the recording database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitRecord {
    /// Site identifier
    #[serde(alias = "sito", deserialize_with = "lenient_string")]
    pub site: String,
    /// Excavation area
    #[serde(deserialize_with = "lenient_string")]
    pub area: String,
    /// Unit number
    #[serde(alias = "us", deserialize_with = "lenient_string")]
    pub unit: String,
    /// Unit kind code (`US`, `USM`, ...)
    #[serde(alias = "unita_tipo", deserialize_with = "lenient_string")]
    pub unit_type: String,
    /// Stratigraphic description
    #[serde(alias = "d_stratigrafica", deserialize_with = "lenient_string")]
    pub stratigraphic_description: String,
    /// Interpretive description
    #[serde(alias = "d_interpretativa", deserialize_with = "lenient_string")]
    pub interpretive_description: String,
    /// Initial period code
    #[serde(alias = "periodo_iniziale", deserialize_with = "lenient_string")]
    pub period_initial: String,
    /// Initial phase code
    #[serde(alias = "fase_iniziale", deserialize_with = "lenient_string")]
    pub phase_initial: String,
    /// Final period code
    #[serde(alias = "periodo_finale", deserialize_with = "lenient_string")]
    pub period_final: String,
    /// Final phase code
    #[serde(alias = "fase_finale", deserialize_with = "lenient_string")]
    pub phase_final: String,
    /// Raw relationship text
    #[serde(alias = "rapporti", deserialize_with = "lenient_string")]
    pub relationships: String,
}

impl UnitRecord {
    /// Record with site and unit number, everything else empty
    pub fn new(site: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            unit: unit.into(),
            ..Self::default()
        }
    }

    /// Set the raw relationship text
    #[must_use]
    pub fn with_relationships(mut self, text: impl Into<String>) -> Self {
        self.relationships = text.into();
        self
    }

    /// Set initial period and phase
    #[must_use]
    pub fn with_period(mut self, period: impl Into<String>, phase: impl Into<String>) -> Self {
        self.period_initial = period.into();
        self.phase_initial = phase.into();
        self
    }

    /// Set the unit kind code
    #[must_use]
    pub fn with_kind(mut self, code: impl Into<String>) -> Self {
        self.unit_type = code.into();
        self
    }

    /// Set the excavation area
    #[must_use]
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    /// Set the interpretive description
    #[must_use]
    pub fn with_interpretation(mut self, text: impl Into<String>) -> Self {
        self.interpretive_description = text.into();
        self
    }
}

/// Accept text, numbers, booleans or null (→ empty) as a string
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => String::new(),
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(n)) => n.to_string(),
        Some(Raw::Bool(b)) => b.to_string(),
    })
}

/// Chronological assignment of a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Chronology {
    /// Initial period code
    pub period_initial: String,
    /// Initial phase code
    pub phase_initial: String,
    /// Final period code
    pub period_final: String,
    /// Final phase code
    pub phase_final: String,
}

impl Chronology {
    /// `period-phase` code shown in extended labels, empty when undated
    #[must_use]
    pub fn code(&self) -> String {
        match (self.period_initial.is_empty(), self.phase_initial.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.period_initial.clone(),
            (true, false) => format!("-{}", self.phase_initial),
            (false, false) => format!("{}-{}", self.period_initial, self.phase_initial),
        }
    }
}

/// A stratigraphic unit loaded into a graph. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    /// Unit number
    pub id: UnitId,
    /// Site identifier
    pub site: String,
    /// Excavation area
    pub area: String,
    /// Unit kind
    pub kind: UnitKind,
    /// Stratigraphic description
    pub stratigraphic_description: String,
    /// Interpretive description
    pub interpretive_description: String,
    /// Period and phase codes
    pub chronology: Chronology,
    /// Raw relationship text
    pub relationships: String,
}

impl Unit {
    /// Convert a storage record.
    ///
    /// `index` is the record's position in the input, used in error messages.
    /// An unknown kind code is not fatal: the unit becomes an ordinary layer
    /// and a diagnostic is returned.
    pub fn from_record(
        record: UnitRecord,
        index: usize,
    ) -> Result<(Self, Option<Diagnostic>), RecordError> {
        let site = record.site.trim().to_string();
        if site.is_empty() {
            return Err(RecordError::EmptySite { index });
        }
        let id = UnitId::new(&record.unit);
        if id.as_str().is_empty() {
            return Err(RecordError::EmptyUnitNumber { site, index });
        }

        let (kind, diagnostic) = match UnitKind::from_code(&record.unit_type) {
            Some(kind) => (kind, None),
            None => (
                UnitKind::Layer,
                Some(Diagnostic::new(
                    DiagnosticKind::UnknownUnitKind,
                    Location::unit(&id),
                    format!("unknown unit kind '{}', treated as US", record.unit_type.trim()),
                )),
            ),
        };

        let unit = Self {
            id,
            site,
            area: record.area.trim().to_string(),
            kind,
            stratigraphic_description: record.stratigraphic_description,
            interpretive_description: record.interpretive_description,
            chronology: Chronology {
                period_initial: record.period_initial.trim().to_string(),
                phase_initial: record.phase_initial.trim().to_string(),
                period_final: record.period_final.trim().to_string(),
                phase_final: record.phase_final.trim().to_string(),
            },
            relationships: record.relationships,
        };
        Ok((unit, diagnostic))
    }

    /// Short definition: interpretation if recorded, else the stratigraphic description
    #[must_use]
    pub fn short_definition(&self) -> &str {
        let interpretive = self.interpretive_description.trim();
        if interpretive.is_empty() {
            self.stratigraphic_description.trim()
        } else {
            interpretive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_without_unit_number_is_rejected() {
        let err = Unit::from_record(UnitRecord::new("Pompeii", "  "), 4).unwrap_err();
        assert_eq!(
            err,
            RecordError::EmptyUnitNumber {
                site: "Pompeii".to_string(),
                index: 4
            }
        );
    }

    #[test]
    fn unknown_kind_falls_back_to_layer() {
        let record = UnitRecord::new("S", "3").with_kind("WALLISH");
        let (unit, diag) = Unit::from_record(record, 0).unwrap();
        assert_eq!(unit.kind, UnitKind::Layer);
        assert_eq!(diag.unwrap().kind, DiagnosticKind::UnknownUnitKind);
    }

    #[test]
    fn record_accepts_database_column_names_and_numbers() {
        let json = r#"{"sito": "S", "us": 12, "unita_tipo": "USM",
                       "periodo_iniziale": 2, "fase_iniziale": null, "rapporti": "Copre 3"}"#;
        let record: UnitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.unit, "12");
        assert_eq!(record.period_initial, "2");
        assert_eq!(record.phase_initial, "");
        assert_eq!(record.relationships, "Copre 3");
    }

    #[test]
    fn chronology_code_composition() {
        let mut c = Chronology::default();
        assert_eq!(c.code(), "");
        c.period_initial = "3".into();
        assert_eq!(c.code(), "3");
        c.phase_initial = "1".into();
        assert_eq!(c.code(), "3-1");
    }

    #[test]
    fn short_definition_prefers_interpretation() {
        let record = UnitRecord {
            stratigraphic_description: "brown silt".into(),
            ..UnitRecord::new("S", "1")
        };
        let (unit, _) = Unit::from_record(record.clone(), 0).unwrap();
        assert_eq!(unit.short_definition(), "brown silt");
        let (unit, _) = Unit::from_record(record.with_interpretation("floor"), 0).unwrap();
        assert_eq!(unit.short_definition(), "floor");
    }
}
