//! The enumerated panel schema.
//!
//! RULE: Every feature/outcome column is a `PanelField`, a
//! (window, metric) pair, and its name is derived from that pair once,
//! when the schema is built. Nothing else in the crate assembles column
//! names from strings.
//!
//! Names are dot-delimited: `<window>.<source block>.<metric>`, e.g.
//! `past_year.complaints.disposition_substantiated`.

use crate::{
    allegation::FadoCategory,
    disposition::Disposition,
    error::{PipelineError, PipelineResult},
    lawsuit::LawsuitAllegation,
};
use std::collections::HashMap;

// ── Windows ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowLabel {
    PastYear,
    PastTwoYears,
    PastFiveYears,
    FutureOneYear,
    FutureTwoYears,
}

impl WindowLabel {
    pub fn trailing(years: u32) -> PipelineResult<Self> {
        match years {
            1 => Ok(Self::PastYear),
            2 => Ok(Self::PastTwoYears),
            5 => Ok(Self::PastFiveYears),
            _ => Err(PipelineError::UnsupportedWindow { direction: "trailing", years }),
        }
    }

    pub fn forward(years: u32) -> PipelineResult<Self> {
        match years {
            1 => Ok(Self::FutureOneYear),
            2 => Ok(Self::FutureTwoYears),
            _ => Err(PipelineError::UnsupportedWindow { direction: "forward", years }),
        }
    }

    pub fn years(&self) -> u32 {
        match self {
            Self::PastYear | Self::FutureOneYear => 1,
            Self::PastTwoYears | Self::FutureTwoYears => 2,
            Self::PastFiveYears => 5,
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Self::FutureOneYear | Self::FutureTwoYears)
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::PastYear       => "past_year",
            Self::PastTwoYears   => "past_two_years",
            Self::PastFiveYears  => "past_five_years",
            Self::FutureOneYear  => "future_one_year",
            Self::FutureTwoYears => "future_two_years",
        }
    }
}

// ── Metrics ──────────────────────────────────────────────────────────────────

/// Allegation-level count blocks. Each counts complaints per FADO category,
/// restricted to allegations carrying the block's disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllegationBlock {
    All,
    Substantiated,
    Truncated,
    NotSubstantiated,
    Pending,
}

impl AllegationBlock {
    pub const ALL: [AllegationBlock; 5] = [
        AllegationBlock::All,
        AllegationBlock::Substantiated,
        AllegationBlock::Truncated,
        AllegationBlock::NotSubstantiated,
        AllegationBlock::Pending,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::All              => 0,
            Self::Substantiated    => 1,
            Self::Truncated        => 2,
            Self::NotSubstantiated => 3,
            Self::Pending          => 4,
        }
    }

    /// `None` for the unrestricted block.
    pub fn disposition(&self) -> Option<Disposition> {
        match self {
            Self::All              => None,
            Self::Substantiated    => Some(Disposition::Substantiated),
            Self::Truncated        => Some(Disposition::Truncated),
            Self::NotSubstantiated => Some(Disposition::NotSubstantiated),
            Self::Pending          => Some(Disposition::Pending),
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::All              => "all_allegations",
            Self::Substantiated    => "substantiated_allegations",
            Self::Truncated        => "truncated_allegations",
            Self::NotSubstantiated => "notsubstantiated_allegations",
            Self::Pending          => "pending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Complaints whose complaint-level disposition is this ranked class.
    ComplaintDisposition(Disposition),
    ComplaintTotal,
    AllegationCount(AllegationBlock, FadoCategory),
    LawsuitPayout,
    LawsuitAllegation(LawsuitAllegation),
    LawsuitPending,
    LawsuitClosed,
    LawsuitHighPayout,
    LawsuitTotal,
}

/// Complaint-level disposition columns, most severe first.
pub const COMPLAINT_DISPOSITIONS: [Disposition; 4] = [
    Disposition::Substantiated,
    Disposition::NotSubstantiated,
    Disposition::Truncated,
    Disposition::Pending,
];

/// Columns kept in the outcome panel for each forward window.
pub const RETAINED_OUTCOME_METRICS: [Metric; 5] = [
    Metric::ComplaintTotal,
    Metric::ComplaintDisposition(Disposition::Substantiated),
    Metric::LawsuitTotal,
    Metric::LawsuitPayout,
    Metric::LawsuitHighPayout,
];

impl Metric {
    /// Every metric the aggregator produces, in column order.
    pub fn all() -> Vec<Metric> {
        let mut metrics = Vec::with_capacity(39);
        metrics.extend(COMPLAINT_DISPOSITIONS.iter().map(|d| Metric::ComplaintDisposition(*d)));
        metrics.push(Metric::ComplaintTotal);
        for block in AllegationBlock::ALL {
            metrics.extend(FadoCategory::ALL.iter().map(|f| Metric::AllegationCount(block, *f)));
        }
        metrics.push(Metric::LawsuitPayout);
        metrics.extend(LawsuitAllegation::ALL.iter().map(|a| Metric::LawsuitAllegation(*a)));
        metrics.push(Metric::LawsuitPending);
        metrics.push(Metric::LawsuitClosed);
        metrics.push(Metric::LawsuitHighPayout);
        metrics.push(Metric::LawsuitTotal);
        metrics
    }

    /// Column name below the window prefix.
    pub fn name(&self) -> String {
        match self {
            Self::ComplaintDisposition(d) => format!("complaints.disposition_{}", d.as_str()),
            Self::ComplaintTotal => "complaints.total".to_string(),
            Self::AllegationCount(block, fado) => format!("{}.{}", block.prefix(), fado.column()),
            Self::LawsuitPayout => "lawsuits.officer_payout".to_string(),
            Self::LawsuitAllegation(a) => format!("lawsuits.{}", a.column()),
            Self::LawsuitPending => "lawsuits.pending".to_string(),
            Self::LawsuitClosed => "lawsuits.closed".to_string(),
            Self::LawsuitHighPayout => "lawsuits.high_payout_suit".to_string(),
            Self::LawsuitTotal => "lawsuits.total".to_string(),
        }
    }

    pub fn is_lawsuit(&self) -> bool {
        matches!(
            self,
            Self::LawsuitPayout
                | Self::LawsuitAllegation(_)
                | Self::LawsuitPending
                | Self::LawsuitClosed
                | Self::LawsuitHighPayout
                | Self::LawsuitTotal
        )
    }
}

// ── Schema ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelField {
    pub window: WindowLabel,
    pub metric: Metric,
}

impl PanelField {
    pub fn name(&self) -> String {
        format!("{}.{}", self.window.prefix(), self.metric.name())
    }
}

/// An ordered set of panel columns with their precomputed names.
#[derive(Debug, Clone)]
pub struct PanelSchema {
    fields: Vec<PanelField>,
    names:  Vec<String>,
    index:  HashMap<PanelField, usize>,
}

impl PanelSchema {
    /// Window-major: all metrics of the first window, then the next.
    pub fn new(windows: &[WindowLabel], metrics: &[Metric]) -> Self {
        let fields: Vec<PanelField> = windows
            .iter()
            .flat_map(|w| metrics.iter().map(move |m| PanelField { window: *w, metric: *m }))
            .collect();
        let names = fields
            .iter()
            .map(PanelField::name)
            .collect();
        let index = fields.iter().enumerate().map(|(i, f)| (*f, i)).collect();
        Self { fields, names, index }
    }

    pub fn fields(&self) -> &[PanelField] {
        &self.fields
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, field: &PanelField) -> Option<usize> {
        self.index.get(field).copied()
    }

    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
