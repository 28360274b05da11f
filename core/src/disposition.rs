//! Disposition classification.
//!
//! RULE: Every raw CCRB disposition string maps to exactly one
//! `Disposition` through the fixed table below. An unlisted string is an
//! error, never a default: disposition drives the outcome label.
//!
//! `None` (nothing recorded) and `Pending` (not yet decided as of some
//! cutoff) are distinct classes. `Pending` is produced by the censoring
//! filter; `None` comes only from the raw data.

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Substantiated,
    NotSubstantiated,
    Truncated,
    Pending,
    /// No disposition recorded on the source row.
    None,
}

/// Raw CCRB allegation disposition strings and their collapsed class.
const RAW_DISPOSITIONS: &[(&str, Disposition)] = &[
    ("Unsubstantiated",                          Disposition::NotSubstantiated),
    ("Exonerated",                               Disposition::NotSubstantiated),
    ("Complainant Uncooperative",                Disposition::Truncated),
    ("Complaint Withdrawn",                      Disposition::Truncated),
    ("Complainant Unavailable",                  Disposition::Truncated),
    ("Unfounded",                                Disposition::NotSubstantiated),
    ("Closed - Pending Litigation",              Disposition::Truncated),
    ("Miscellaneous - Subject Resigned",         Disposition::Substantiated),
    ("Within NYPD Guidelines",                   Disposition::NotSubstantiated),
    ("Substantiated (Formalized Training)",      Disposition::Substantiated),
    ("Alleged Victim Uncooperative",             Disposition::Truncated),
    ("Unable to Determine",                      Disposition::NotSubstantiated),
    ("Substantiated (Command Discipline B)",     Disposition::Substantiated),
    ("Alleged Victim Unavailable",               Disposition::Truncated),
    ("Substantiated (Charges)",                  Disposition::Substantiated),
    ("Miscellaneous - Subject Terminated",       Disposition::Substantiated),
    ("Miscellaneous",                            Disposition::NotSubstantiated),
    ("Substantiated (Command Discipline)",       Disposition::Substantiated),
    ("Miscellaneous - Subject Retired",          Disposition::Substantiated),
    ("Victim Unidentified",                      Disposition::Truncated),
    ("Substantiated (Command Discipline A)",     Disposition::Substantiated),
    ("Substantiated (Command Lvl Instructions)", Disposition::Substantiated),
    ("Substantiated (Instructions)",             Disposition::Substantiated),
    ("Substantiated (No Recommendations)",       Disposition::Substantiated),
    ("Witness Uncooperative",                    Disposition::Truncated),
    ("Witness Unavailable",                      Disposition::Truncated),
    ("Officer(s) Unidentified",                  Disposition::Truncated),
    ("none",                                     Disposition::None),
    ("Formalized Training",                      Disposition::Substantiated),
    ("Mediation Attempted",                      Disposition::Truncated),
    ("Mediated",                                 Disposition::Substantiated),
    ("Administratively Closed",                  Disposition::Truncated),
];

impl Disposition {
    /// Map a raw CCRB disposition string to its class.
    pub fn classify(raw: &str) -> PipelineResult<Self> {
        RAW_DISPOSITIONS
            .iter()
            .find(|(label, _)| *label == raw)
            .map(|(_, d)| *d)
            .ok_or_else(|| PipelineError::UnknownDisposition { raw: raw.to_string() })
    }

    /// Classify a possibly missing raw string. Missing means "none".
    pub fn classify_optional(raw: Option<&str>) -> PipelineResult<Self> {
        Self::classify(raw.unwrap_or("none"))
    }

    /// Parse an already-collapsed label as written by the cleaning step.
    pub fn from_collapsed(label: &str) -> PipelineResult<Self> {
        match label {
            "substantiated"     => Ok(Self::Substantiated),
            "not_substantiated" => Ok(Self::NotSubstantiated),
            "truncated"         => Ok(Self::Truncated),
            "pending"           => Ok(Self::Pending),
            "none"              => Ok(Self::None),
            _ => Err(PipelineError::UnknownDisposition { raw: label.to_string() }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substantiated    => "substantiated",
            Self::NotSubstantiated => "not_substantiated",
            Self::Truncated        => "truncated",
            Self::Pending          => "pending",
            Self::None             => "none",
        }
    }

    /// Severity rank: pending < truncated < not_substantiated < substantiated.
    /// `None` has no rank and never wins a complaint-level max.
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            Self::Pending          => Some(1),
            Self::Truncated        => Some(2),
            Self::NotSubstantiated => Some(3),
            Self::Substantiated    => Some(4),
            Self::None             => None,
        }
    }

    /// Complaint-level disposition: the highest-ranked of its allegations.
    /// Returns `None` when no allegation carries a ranked disposition.
    pub fn complaint_level<I>(dispositions: I) -> Option<Disposition>
    where
        I: IntoIterator<Item = Disposition>,
    {
        dispositions
            .into_iter()
            .filter_map(|d| d.ordinal().map(|rank| (rank, d)))
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, d)| d)
    }

    pub fn raw_vocabulary() -> impl Iterator<Item = &'static str> {
        RAW_DISPOSITIONS.iter().map(|(label, _)| *label)
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
