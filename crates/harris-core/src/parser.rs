//! Relationship parser
//!
//! Turns a unit's free-text relationship field into typed relations:
//!
//! ```text
//! "Copre 2, 3; Tagliato da 7?"  →  (covers, 2) (covers, 3) (cut by, 7, uncertain)
//! ```
//!
//! Clauses are separated by `,` `;` or newlines. A clause either starts with a
//! keyword from the fixed table or, when it is a single bare token, continues
//! the previous clause's keyword. A keyword later in a clause starts a new
//! relation (`Covers 2 Cuts 3`). Square brackets and quotes are ignored so
//! list-shaped fields (`[['Copre', '2']]`) parse the same way.
//!
//! Ordinary malformed input never fails: problems become diagnostics and the
//! remaining clauses are still parsed.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Location};
use crate::error::ParseError;
use crate::kind::{Certainty, RelationKind};
use crate::unit::UnitId;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Connector words skipped between two targets (`Copre 2 e 3`)
const CONNECTORS: &[&str] = &["e", "and", "&"];

/// One parsed relation: `(kind, target, certainty)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParsedRelation {
    /// Relationship kind
    pub kind: RelationKind,
    /// Target unit number
    pub target: UnitId,
    /// Certainty marker
    pub certainty: Certainty,
}

/// Relations plus the diagnostics raised while parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// At most one relation per `(kind, target)`, in first-seen order
    pub relations: Vec<ParsedRelation>,
    /// Side-channel findings
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// True when parsing raised no diagnostics
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Stateless relationship parser.
///
/// Optionally knows the set of unit numbers of the site, in which case
/// targets outside it are flagged (but still returned).
#[derive(Debug, Clone, Default)]
pub struct RelationshipParser {
    known_units: Option<HashSet<String>>,
}

impl RelationshipParser {
    /// Parser without target resolution
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that flags targets outside `units`
    pub fn with_known_units<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            known_units: Some(
                units
                    .into_iter()
                    .map(|u| u.as_ref().trim().to_string())
                    .collect(),
            ),
        }
    }

    /// Parse raw bytes, failing only if they are not UTF-8
    pub fn parse_bytes(&self, raw: &[u8]) -> Result<ParseOutcome, ParseError> {
        let text = std::str::from_utf8(raw).map_err(|e| ParseError::Encoding {
            valid_up_to: e.valid_up_to(),
        })?;
        Ok(self.parse(text))
    }

    /// Parse a relationship field
    #[must_use]
    pub fn parse(&self, raw: &str) -> ParseOutcome {
        let mut state = ParseState::default();

        let cleaned: String = raw
            .chars()
            .map(|c| if matches!(c, '[' | ']' | '\'' | '"') { ' ' } else { c })
            .collect();

        for clause in cleaned.split([',', ';', '\n', '\r']) {
            let collapsed = clause.split_whitespace().collect::<Vec<_>>().join(" ");
            if collapsed.is_empty() {
                continue;
            }
            let opens_with_keyword =
                RelationKind::match_prefix(&collapsed.to_ascii_lowercase()).is_some();
            let continues = state.active.is_some() && !collapsed.contains(' ');
            if !opens_with_keyword && !continues {
                state.close_keyword();
                state.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnknownKeyword,
                    Location::Field,
                    format!("no relationship keyword in clause '{collapsed}'"),
                ));
                continue;
            }
            self.walk_clause(&mut state, &collapsed);
        }

        state.close_keyword();
        tracing::trace!(
            relations = state.relations.len(),
            diagnostics = state.diagnostics.len(),
            "parsed relationship field"
        );
        ParseOutcome {
            relations: state.relations,
            diagnostics: state.diagnostics,
        }
    }

    /// Walk one clause token by token. A keyword anywhere switches the
    /// active kind; a connector is skipped only between two targets.
    fn walk_clause(&self, state: &mut ParseState, clause: &str) {
        let mut rest = clause;
        let mut targets = 0usize;
        while !rest.is_empty() {
            if let Some((kind, len)) = RelationKind::match_prefix(&rest.to_ascii_lowercase()) {
                state.open_keyword(kind);
                targets = 0;
                rest = rest[len..].trim_start_matches([':', ' ']);
                continue;
            }
            let (token, tail) = rest.split_once(' ').unwrap_or((rest, ""));
            rest = tail;
            if targets > 0 && !tail.is_empty() && is_connector(token) {
                continue;
            }
            self.push_target(state, token);
            targets += 1;
        }
    }

    fn push_target(&self, state: &mut ParseState, token: &str) {
        let Some(kind) = state.active else {
            return;
        };

        let (text, certainty) = match token.strip_suffix('?') {
            Some(stripped) => (stripped, Certainty::Uncertain),
            None => (token, Certainty::Certain),
        };

        state.active_has_target = true;
        if !is_valid_identifier(text) {
            state.diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedTarget,
                Location::Field,
                format!("'{token}' is not a unit identifier ({kind})"),
            ));
            return;
        }

        let target = UnitId::new(text);
        if let Some(known) = &self.known_units {
            if !known.contains(target.as_str()) {
                state.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnresolvedTarget,
                    Location::Field,
                    format!("target {target} ({kind}) is not a known unit"),
                ));
            }
        }

        match state.seen.get(&(kind, target.clone())) {
            Some(&idx) => {
                let existing = &mut state.relations[idx];
                if certainty == Certainty::Certain {
                    existing.certainty = Certainty::Certain;
                }
                state.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::DuplicateClause,
                    Location::Field,
                    format!("duplicate clause '{kind} {target}' ignored"),
                ));
            }
            None => {
                state.seen.insert((kind, target.clone()), state.relations.len());
                state.relations.push(ParsedRelation {
                    kind,
                    target,
                    certainty,
                });
            }
        }
    }
}

#[derive(Default)]
struct ParseState {
    active: Option<RelationKind>,
    active_has_target: bool,
    relations: Vec<ParsedRelation>,
    seen: HashMap<(RelationKind, UnitId), usize>,
    diagnostics: Vec<Diagnostic>,
}

impl ParseState {
    fn open_keyword(&mut self, kind: RelationKind) {
        self.close_keyword();
        self.active = Some(kind);
    }

    fn close_keyword(&mut self) {
        if let Some(kind) = self.active.take() {
            if !self.active_has_target {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MalformedTarget,
                    Location::Field,
                    format!("keyword '{kind}' has no target"),
                ));
            }
        }
        self.active_has_target = false;
    }
}

fn is_connector(token: &str) -> bool {
    CONNECTORS.iter().any(|c| token.eq_ignore_ascii_case(c))
}

/// Unit identifiers: letters, digits and `- _ . /`, at least one alphanumeric
fn is_valid_identifier(text: &str) -> bool {
    !text.is_empty()
        && text.chars().any(char::is_alphanumeric)
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
}

/// Parse with a default parser
#[must_use]
pub fn parse(raw: &str) -> ParseOutcome {
    RelationshipParser::new().parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rel(kind: RelationKind, target: &str) -> ParsedRelation {
        ParsedRelation {
            kind,
            target: UnitId::from(target),
            certainty: Certainty::Certain,
        }
    }

    #[test]
    fn duplicate_clause_yields_one_relation() {
        let out = parse("Covers 2, Covers 2");
        assert_eq!(out.relations, vec![rel(RelationKind::Covers, "2")]);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::DuplicateClause);
    }

    #[test]
    fn continuation_targets_inherit_keyword() {
        let out = parse("Copre 2, 3; Tagliato da 7 e 8");
        assert_eq!(
            out.relations,
            vec![
                rel(RelationKind::Covers, "2"),
                rel(RelationKind::Covers, "3"),
                rel(RelationKind::CutBy, "7"),
                rel(RelationKind::CutBy, "8"),
            ]
        );
        assert!(out.is_clean());
    }

    #[test]
    fn list_shaped_field_is_accepted() {
        let out = parse("[['Copre', '2'], ['Si lega a', '5']]");
        assert_eq!(
            out.relations,
            vec![rel(RelationKind::Covers, "2"), rel(RelationKind::BondsTo, "5")]
        );
        assert!(out.is_clean());
    }

    #[test]
    fn unknown_keyword_is_skipped_not_fatal() {
        let out = parse("Overlaps 4, Cuts 5");
        assert_eq!(out.relations, vec![rel(RelationKind::Cuts, "5")]);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::UnknownKeyword);
    }

    #[test]
    fn bare_token_without_keyword_is_unknown() {
        let out = parse("4, Cuts 5");
        assert_eq!(out.relations, vec![rel(RelationKind::Cuts, "5")]);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::UnknownKeyword);
    }

    #[test]
    fn uncertain_marker_and_upgrade() {
        let out = parse("Fills 9?");
        assert_eq!(out.relations[0].certainty, Certainty::Uncertain);

        let out = parse("Fills 9?, Fills 9");
        assert_eq!(out.relations.len(), 1);
        assert_eq!(out.relations[0].certainty, Certainty::Certain);
    }

    #[test]
    fn malformed_target_is_reported() {
        let out = parse("Covers ##, Covers 3");
        assert_eq!(out.relations, vec![rel(RelationKind::Covers, "3")]);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::MalformedTarget);
    }

    #[test]
    fn keyword_without_target_is_reported() {
        let out = parse("Covers");
        assert!(out.relations.is_empty());
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::MalformedTarget);
    }

    #[test]
    fn target_case_is_preserved() {
        let out = parse("COVERS 12A");
        assert_eq!(out.relations, vec![rel(RelationKind::Covers, "12A")]);
    }

    #[test]
    fn unresolved_targets_are_flagged_but_kept() {
        let parser = RelationshipParser::with_known_units(["1", "2"]);
        let out = parser.parse("Covers 2, Covers 99");
        assert_eq!(out.relations.len(), 2);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::UnresolvedTarget);
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let err = RelationshipParser::new()
            .parse_bytes(&[b'C', 0xff, 0xfe])
            .unwrap_err();
        assert_eq!(err, ParseError::Encoding { valid_up_to: 1 });
    }

    #[test]
    fn connector_letter_is_a_target_on_its_own() {
        let out = parse("Cuts E");
        assert_eq!(out.relations, vec![rel(RelationKind::Cuts, "E")]);
        assert!(out.is_clean());

        let out = parse("Covers 2, E");
        assert_eq!(
            out.relations,
            vec![rel(RelationKind::Covers, "2"), rel(RelationKind::Covers, "E")]
        );
        assert!(out.is_clean());

        let out = parse("Covers 2 E");
        assert_eq!(
            out.relations,
            vec![rel(RelationKind::Covers, "2"), rel(RelationKind::Covers, "E")]
        );
    }

    #[test]
    fn connector_between_targets_is_skipped() {
        let out = parse("Copre 2 e 3");
        assert_eq!(
            out.relations,
            vec![rel(RelationKind::Covers, "2"), rel(RelationKind::Covers, "3")]
        );
        assert!(out.is_clean());

        let out = parse("Covers A and B & C");
        assert_eq!(out.relations.len(), 3);
        assert!(out.is_clean());
    }

    #[test]
    fn keyword_inside_clause_starts_new_relation() {
        let out = parse("Covers 2 Cuts 3");
        assert_eq!(
            out.relations,
            vec![rel(RelationKind::Covers, "2"), rel(RelationKind::Cuts, "3")]
        );
        assert!(out.is_clean());

        let out = parse("Copre 4 e 5 tagliato da 6");
        assert_eq!(
            out.relations,
            vec![
                rel(RelationKind::Covers, "4"),
                rel(RelationKind::Covers, "5"),
                rel(RelationKind::CutBy, "6"),
            ]
        );
    }

    #[test]
    fn keyword_inside_clause_without_target_is_reported() {
        let out = parse("Covers 2 Cuts");
        assert_eq!(out.relations, vec![rel(RelationKind::Covers, "2")]);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::MalformedTarget);
    }

    #[test]
    fn empty_field_is_empty() {
        let out = parse("   ");
        assert!(out.relations.is_empty());
        assert!(out.is_clean());
    }
}
