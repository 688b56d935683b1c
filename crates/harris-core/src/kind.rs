//! Fixed vocabularies: relationship kinds, unit kinds, certainty.
//!
//! The keyword table defined here is the single source of truth for the
//! text→kind mapping. The serializer derives its styles from
//! [`RelationKind::family`], so the two can never drift apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stratigraphic relationship kind.
///
/// Ordering kinds state that the source is later than the target
/// (`Covers`, `Cuts`, `Fills`, `RestsOn`); their inverses state the
/// opposite. `Equals` and `BondsTo` are symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Source lies physically over the target.
    Covers,
    /// Inverse of `Covers`.
    CoveredBy,
    /// Source is a negative interface cutting the target.
    Cuts,
    /// Inverse of `Cuts`.
    CutBy,
    /// Source fills the target cut.
    Fills,
    /// Inverse of `Fills`.
    FilledBy,
    /// Same unit recorded twice (symmetric).
    Equals,
    /// Structures bonded together (symmetric).
    BondsTo,
    /// Source abuts against the target.
    RestsOn,
    /// Inverse of `RestsOn`.
    Supports,
}

/// How a relation kind orders its two endpoints in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The source unit is later (stratigraphically above) the target.
    SourceLater,
    /// The source unit is earlier (stratigraphically below) the target.
    SourceEarlier,
    /// No temporal order; both units are contemporary.
    Symmetric,
}

/// Visual family shared by a kind and its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationFamily {
    /// covers / covered by
    Superposition,
    /// cuts / cut by
    Cut,
    /// fills / filled by
    Fill,
    /// rests on / supports
    Abutment,
    /// equals
    Equivalence,
    /// bonds to
    Bond,
}

/// Keyword → kind table, lowercase, single spaces.
///
/// Italian recording vocabulary first, English equivalents after.
const KEYWORDS: &[(&str, RelationKind)] = &[
    ("copre", RelationKind::Covers),
    ("coperto da", RelationKind::CoveredBy),
    ("taglia", RelationKind::Cuts),
    ("tagliato da", RelationKind::CutBy),
    ("riempie", RelationKind::Fills),
    ("riempito da", RelationKind::FilledBy),
    ("uguale a", RelationKind::Equals),
    ("si lega a", RelationKind::BondsTo),
    ("si appoggia a", RelationKind::RestsOn),
    ("gli si appoggia", RelationKind::Supports),
    ("covers", RelationKind::Covers),
    ("covered by", RelationKind::CoveredBy),
    ("cuts", RelationKind::Cuts),
    ("cut by", RelationKind::CutBy),
    ("fills", RelationKind::Fills),
    ("filled by", RelationKind::FilledBy),
    ("equals", RelationKind::Equals),
    ("same as", RelationKind::Equals),
    ("bonds to", RelationKind::BondsTo),
    ("bonds with", RelationKind::BondsTo),
    ("rests on", RelationKind::RestsOn),
    ("abuts", RelationKind::RestsOn),
    ("supports", RelationKind::Supports),
    ("abutted by", RelationKind::Supports),
];

impl RelationKind {
    /// Every kind, in declaration order.
    pub const ALL: [RelationKind; 10] = [
        RelationKind::Covers,
        RelationKind::CoveredBy,
        RelationKind::Cuts,
        RelationKind::CutBy,
        RelationKind::Fills,
        RelationKind::FilledBy,
        RelationKind::Equals,
        RelationKind::BondsTo,
        RelationKind::RestsOn,
        RelationKind::Supports,
    ];

    /// The reciprocal kind the target unit is expected to record.
    ///
    /// Symmetric kinds are their own inverse.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Covers => Self::CoveredBy,
            Self::CoveredBy => Self::Covers,
            Self::Cuts => Self::CutBy,
            Self::CutBy => Self::Cuts,
            Self::Fills => Self::FilledBy,
            Self::FilledBy => Self::Fills,
            Self::Equals => Self::Equals,
            Self::BondsTo => Self::BondsTo,
            Self::RestsOn => Self::Supports,
            Self::Supports => Self::RestsOn,
        }
    }

    /// Temporal orientation of the relation.
    #[must_use]
    pub fn orientation(self) -> Orientation {
        match self {
            Self::Covers | Self::Cuts | Self::Fills | Self::RestsOn => Orientation::SourceLater,
            Self::CoveredBy | Self::CutBy | Self::FilledBy | Self::Supports => {
                Orientation::SourceEarlier
            }
            Self::Equals | Self::BondsTo => Orientation::Symmetric,
        }
    }

    /// True for `Equals` and `BondsTo`.
    #[inline]
    #[must_use]
    pub fn is_symmetric(self) -> bool {
        matches!(self.orientation(), Orientation::Symmetric)
    }

    /// The form of this kind whose source is the later unit.
    ///
    /// Symmetric kinds are returned unchanged.
    #[must_use]
    pub fn canonical(self) -> Self {
        match self.orientation() {
            Orientation::SourceEarlier => self.inverse(),
            _ => self,
        }
    }

    /// Visual family, shared with the inverse kind.
    #[must_use]
    pub fn family(self) -> RelationFamily {
        match self {
            Self::Covers | Self::CoveredBy => RelationFamily::Superposition,
            Self::Cuts | Self::CutBy => RelationFamily::Cut,
            Self::Fills | Self::FilledBy => RelationFamily::Fill,
            Self::RestsOn | Self::Supports => RelationFamily::Abutment,
            Self::Equals => RelationFamily::Equivalence,
            Self::BondsTo => RelationFamily::Bond,
        }
    }

    /// Negative interfaces (cuts) are drawn dashed.
    #[inline]
    #[must_use]
    pub fn is_negative(self) -> bool {
        matches!(self.family(), RelationFamily::Cut)
    }

    /// Stable English label, used in descriptions and the legend.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Covers => "covers",
            Self::CoveredBy => "covered by",
            Self::Cuts => "cuts",
            Self::CutBy => "cut by",
            Self::Fills => "fills",
            Self::FilledBy => "filled by",
            Self::Equals => "equals",
            Self::BondsTo => "bonds to",
            Self::RestsOn => "rests on",
            Self::Supports => "supports",
        }
    }

    /// Look up a keyword exactly (case-insensitive, whitespace-normalized).
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let normalized = normalize_keyword(keyword);
        KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == normalized)
            .map(|(_, kind)| *kind)
    }

    /// Match the longest keyword at the start of `clause`.
    ///
    /// `clause` must already be lowercase with single spaces. Returns the kind
    /// and the byte length of the matched keyword. A keyword only matches on a
    /// word boundary, so `"covers2"` is not `"covers"` followed by `2`.
    pub(crate) fn match_prefix(clause: &str) -> Option<(Self, usize)> {
        KEYWORDS
            .iter()
            .filter(|(kw, _)| {
                clause.starts_with(kw)
                    && clause[kw.len()..]
                        .chars()
                        .next()
                        .map_or(true, |c| c.is_whitespace() || c == ':')
            })
            .max_by_key(|(kw, _)| kw.len())
            .map(|(kw, kind)| (*kind, kw.len()))
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase and collapse internal whitespace.
pub(crate) fn normalize_keyword(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Confidence attached to a recorded relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Certainty {
    /// Recorded without reservation.
    #[default]
    Certain,
    /// Recorded with a `?` marker.
    Uncertain,
}

/// Kind of stratigraphic unit. A flat vocabulary, not a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Ordinary deposit (US).
    #[default]
    Layer,
    /// Masonry structure (USM).
    Masonry,
    /// Virtual or negative reconstruction unit (USV).
    Virtual,
    /// Documentary source (DOC).
    Documentary,
    /// Special find (SF).
    SpecialFind,
    /// Aggregation node grouping several units (CON).
    Aggregation,
    /// Extraction node (EXTRACTOR).
    Extraction,
}

impl UnitKind {
    /// Map a recording code to a kind. Case-insensitive.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "" | "US" => Some(Self::Layer),
            "USM" => Some(Self::Masonry),
            "USV" | "USVS" | "USVN" => Some(Self::Virtual),
            "DOC" => Some(Self::Documentary),
            "SF" | "VSF" => Some(Self::SpecialFind),
            "CON" => Some(Self::Aggregation),
            "EXTRACTOR" => Some(Self::Extraction),
            _ => None,
        }
    }

    /// Canonical recording code, used in extended labels.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Layer => "US",
            Self::Masonry => "USM",
            Self::Virtual => "USV",
            Self::Documentary => "DOC",
            Self::SpecialFind => "SF",
            Self::Aggregation => "CON",
            Self::Extraction => "EXTRACTOR",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
