//! Chronological grouping
//!
//! Units are bucketed by the label their initial `(period, phase)` maps to in
//! the site periodization. Units with no entry land in [`UNDATED_LABEL`].
//! Buckets are ordered by the smallest `(period, phase)` among their units,
//! then by label; missing values compare as [`SORT_SENTINEL`] so undated
//! material always sorts last.

use crate::diagnostics::{Analysis, Diagnostic, DiagnosticKind, Location};
use crate::graph::StratigraphicGraph;
use crate::unit::{lenient_string, UnitId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label for units without a periodization entry
pub const UNDATED_LABEL: &str = "Non datato";

/// Stand-in for a missing period or phase in sort keys
pub const SORT_SENTINEL: &str = "\u{10FFFF}";

/// One row of a site periodization table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEntry {
    /// Period code
    #[serde(alias = "periodo", deserialize_with = "lenient_string")]
    pub period: String,
    /// Phase code
    #[serde(default, alias = "fase", deserialize_with = "lenient_string")]
    pub phase: String,
    /// Human-readable label
    #[serde(alias = "datazione_estesa")]
    pub label: String,
}

/// `(period, phase)` → label map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PeriodEntry>", into = "Vec<PeriodEntry>")]
pub struct PeriodLookup {
    entries: IndexMap<(String, String), String>,
}

impl PeriodLookup {
    /// Empty lookup
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; keys are trimmed
    pub fn insert(&mut self, period: &str, phase: &str, label: impl Into<String>) {
        self.entries
            .insert((period.trim().to_string(), phase.trim().to_string()), label.into());
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, period: &str, phase: &str, label: impl Into<String>) -> Self {
        self.insert(period, phase, label);
        self
    }

    /// Label for a `(period, phase)` pair
    #[must_use]
    pub fn get(&self, period: &str, phase: &str) -> Option<&str> {
        self.entries
            .get(&(period.trim().to_string(), phase.trim().to_string()))
            .map(String::as_str)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<PeriodEntry>> for PeriodLookup {
    fn from(entries: Vec<PeriodEntry>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<PeriodLookup> for Vec<PeriodEntry> {
    fn from(lookup: PeriodLookup) -> Self {
        lookup
            .entries
            .into_iter()
            .map(|((period, phase), label)| PeriodEntry { period, phase, label })
            .collect()
    }
}

impl Extend<PeriodEntry> for PeriodLookup {
    fn extend<I: IntoIterator<Item = PeriodEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(&entry.period, &entry.phase, entry.label);
        }
    }
}

impl FromIterator<PeriodEntry> for PeriodLookup {
    fn from_iter<I: IntoIterator<Item = PeriodEntry>>(iter: I) -> Self {
        let mut lookup = Self::new();
        lookup.extend(iter);
        lookup
    }
}

/// Bucket order key: `(period, phase, label)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SortKey {
    /// Smallest period among the bucket's units
    pub period: String,
    /// Phase paired with that period
    pub phase: String,
    /// Label, final tiebreaker
    pub label: String,
}

/// One chronological bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodBucket {
    /// Label shown as row header
    pub label: String,
    /// Ordering key
    pub sort_key: SortKey,
    /// Member units in graph insertion order
    pub units: Vec<UnitId>,
}

/// Buckets in sort order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodGrouping {
    buckets: Vec<PeriodBucket>,
    #[serde(skip)]
    membership: HashMap<UnitId, usize>,
}

impl PeriodGrouping {
    /// Buckets, earliest first
    #[inline]
    #[must_use]
    pub fn buckets(&self) -> &[PeriodBucket] {
        &self.buckets
    }

    /// Buckets in row order: earliest first, or latest first when `reverse`
    pub fn ordered(&self, reverse: bool) -> Box<dyn Iterator<Item = &PeriodBucket> + '_> {
        if reverse {
            Box::new(self.buckets.iter().rev())
        } else {
            Box::new(self.buckets.iter())
        }
    }

    /// Bucket holding a unit
    #[must_use]
    pub fn bucket_of(&self, unit: &str) -> Option<&PeriodBucket> {
        self.membership.get(unit).map(|&i| &self.buckets[i])
    }

    /// Label of the bucket holding a unit
    #[must_use]
    pub fn label_of(&self, unit: &str) -> Option<&str> {
        self.bucket_of(unit).map(|b| b.label.as_str())
    }

    /// Sort key of a label
    #[must_use]
    pub fn sort_key(&self, label: &str) -> Option<&SortKey> {
        self.buckets
            .iter()
            .find(|b| b.label == label)
            .map(|b| &b.sort_key)
    }

    /// `label → units` in bucket order
    #[must_use]
    pub fn to_map(&self) -> IndexMap<String, Vec<UnitId>> {
        self.buckets
            .iter()
            .map(|b| (b.label.clone(), b.units.clone()))
            .collect()
    }

    /// Number of buckets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True when no unit was grouped
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Stateless period grouper
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodGrouper;

impl PeriodGrouper {
    /// Create a grouper
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Group the units of a graph.
    ///
    /// A unit that records a period or phase missing from the lookup raises
    /// an `Undated` diagnostic; a unit with no chronology at all does not.
    #[must_use]
    pub fn group(
        &self,
        graph: &StratigraphicGraph,
        lookup: &PeriodLookup,
    ) -> Analysis<PeriodGrouping> {
        let mut staged: IndexMap<String, (SortKey, Vec<UnitId>)> = IndexMap::new();
        let mut diagnostics = Vec::new();

        for unit in graph.nodes() {
            let period = unit.chronology.period_initial.trim();
            let phase = unit.chronology.phase_initial.trim();

            let (label, candidate) = match lookup.get(period, phase) {
                Some(label) => (label.to_string(), (sentinel(period), sentinel(phase))),
                None => {
                    if !period.is_empty() || !phase.is_empty() {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::Undated,
                            Location::unit(&unit.id),
                            format!(
                                "period '{period}' phase '{phase}' not in periodization, \
                                 grouped as '{UNDATED_LABEL}'"
                            ),
                        ));
                    }
                    (
                        UNDATED_LABEL.to_string(),
                        (SORT_SENTINEL.to_string(), SORT_SENTINEL.to_string()),
                    )
                }
            };

            let (key, units) = staged.entry(label.clone()).or_insert_with(|| {
                (
                    SortKey {
                        period: candidate.0.clone(),
                        phase: candidate.1.clone(),
                        label,
                    },
                    Vec::new(),
                )
            });
            if (candidate.0.as_str(), candidate.1.as_str())
                < (key.period.as_str(), key.phase.as_str())
            {
                key.period = candidate.0;
                key.phase = candidate.1;
            }
            units.push(unit.id.clone());
        }

        let mut buckets: Vec<PeriodBucket> = staged
            .into_iter()
            .map(|(label, (sort_key, units))| PeriodBucket {
                label,
                sort_key,
                units,
            })
            .collect();
        buckets.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));

        let membership = buckets
            .iter()
            .enumerate()
            .flat_map(|(i, b)| b.units.iter().map(move |u| (u.clone(), i)))
            .collect();

        tracing::debug!(
            site = graph.site(),
            buckets = buckets.len(),
            undated = diagnostics.len(),
            "grouped units by period"
        );
        Analysis::new(PeriodGrouping { buckets, membership }, diagnostics)
    }
}

/// Group with a default grouper
#[must_use]
pub fn group(graph: &StratigraphicGraph, lookup: &PeriodLookup) -> Analysis<PeriodGrouping> {
    PeriodGrouper::new().group(graph, lookup)
}

fn sentinel(value: &str) -> String {
    if value.is_empty() {
        SORT_SENTINEL.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitRecord;
    use pretty_assertions::assert_eq;

    fn graph(units: &[(&str, &str, &str)]) -> StratigraphicGraph {
        StratigraphicGraph::build(
            units
                .iter()
                .map(|(id, period, phase)| UnitRecord::new("S", *id).with_period(*period, *phase)),
        )
        .unwrap()
        .value
    }

    fn labels(grouping: &PeriodGrouping) -> Vec<&str> {
        grouping.buckets().iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn unmatched_phase_is_undated() {
        let lookup = PeriodLookup::new().with("1", "1", "Roman");
        let out = group(&graph(&[("U", "1", "2")]), &lookup);
        assert_eq!(out.value.label_of("U"), Some(UNDATED_LABEL));
        assert_eq!(out.of_kind(DiagnosticKind::Undated).count(), 1);
    }

    #[test]
    fn buckets_sort_by_minimum_period_then_label() {
        let lookup = PeriodLookup::new()
            .with("2", "1", "Medieval")
            .with("1", "1", "Roman")
            .with("1", "2", "Roman")
            .with("1", "1", "Roman");
        let g = graph(&[("A", "2", "1"), ("B", "1", "2"), ("C", "", ""), ("D", "1", "1")]);
        let out = group(&g, &lookup).value;
        assert_eq!(labels(&out), ["Roman", "Medieval", UNDATED_LABEL]);

        let roman = out.sort_key("Roman").unwrap();
        assert_eq!((roman.period.as_str(), roman.phase.as_str()), ("1", "1"));
        assert_eq!(out.buckets()[0].units, vec![UnitId::from("B"), UnitId::from("D")]);
    }

    #[test]
    fn empty_chronology_is_undated_silently() {
        let out = group(&graph(&[("A", "", "")]), &PeriodLookup::new());
        assert_eq!(out.value.label_of("A"), Some(UNDATED_LABEL));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn missing_phase_sorts_after_recorded_phase() {
        let lookup = PeriodLookup::new()
            .with("1", "", "Period 1")
            .with("1", "2", "Period 1, phase 2");
        let out = group(&graph(&[("A", "1", ""), ("B", "1", "2")]), &lookup).value;
        assert_eq!(labels(&out), ["Period 1, phase 2", "Period 1"]);
    }

    #[test]
    fn reverse_inverts_row_order_only() {
        let lookup = PeriodLookup::new().with("1", "", "Early").with("2", "", "Late");
        let out = group(&graph(&[("A", "2", ""), ("B", "1", "")]), &lookup).value;
        let forward: Vec<_> = out.ordered(false).map(|b| b.label.as_str()).collect();
        let backward: Vec<_> = out.ordered(true).map(|b| b.label.as_str()).collect();
        assert_eq!(forward, ["Early", "Late"]);
        assert_eq!(backward, ["Late", "Early"]);
    }

    #[test]
    fn grouping_is_reproducible() {
        let lookup = PeriodLookup::new().with("1", "1", "Roman");
        let g = graph(&[("A", "1", "1"), ("B", "3", ""), ("C", "1", "1")]);
        assert_eq!(group(&g, &lookup).value, group(&g, &lookup).value);
    }

    #[test]
    fn lookup_deserializes_from_table_rows() {
        let json = r#"[{"periodo": "1", "fase": "1", "datazione_estesa": "Roman"},
                       {"period": "2", "label": "Late"}]"#;
        let lookup: PeriodLookup = serde_json::from_str(json).unwrap();
        assert_eq!(lookup.get("1", "1"), Some("Roman"));
        assert_eq!(lookup.get("2", ""), Some("Late"));
    }
}
