//! Officer-period aggregation.
//!
//! Collapses one window's filtered events to one summary per officer.
//! Only officers with at least one event appear in the output; callers
//! zero-fill everyone else when merging onto the observation table.
//!
//! Counts and sums only. No averages or ratios at this layer.

use crate::{
    allegation::{AllegationEvent, FadoCategory},
    disposition::Disposition,
    lawsuit::LawsuitAllegation,
    schema::{AllegationBlock, Metric, COMPLAINT_DISPOSITIONS},
    types::{ComplaintId, TaxId},
    window::WindowedLawsuit,
};
use std::collections::BTreeMap;

// ── Summaries ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintSummary {
    /// Complaint-level disposition counts, indexed like `COMPLAINT_DISPOSITIONS`.
    pub by_disposition: [u64; 4],
    /// Distinct complaints, including those with no ranked disposition.
    pub total:          u64,
    /// `[block][fado]`: complaints with at least one allegation of that
    /// category inside the block.
    pub fado_counts:    [[u64; 5]; 5],
}

impl ComplaintSummary {
    pub fn disposition_count(&self, disposition: Disposition) -> u64 {
        COMPLAINT_DISPOSITIONS
            .iter()
            .position(|d| *d == disposition)
            .map(|i| self.by_disposition[i])
            .unwrap_or(0)
    }

    pub fn allegation_count(&self, block: AllegationBlock, fado: FadoCategory) -> u64 {
        self.fado_counts[block.index()][fado.index()]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LawsuitSummary {
    pub officer_payout: f64,
    /// Indexed by `LawsuitAllegation::index()`.
    pub allegations:    [u64; 4],
    pub pending:        u64,
    pub closed:         u64,
    pub high_payout:    u64,
    pub total:          u64,
}

impl LawsuitSummary {
    pub fn allegation_count(&self, kind: LawsuitAllegation) -> u64 {
        self.allegations[kind.index()]
    }
}

/// Everything one officer did within one window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfficerPeriodSummary {
    pub complaints: ComplaintSummary,
    pub lawsuits:   LawsuitSummary,
}

impl OfficerPeriodSummary {
    pub fn value(&self, metric: Metric) -> f64 {
        let c = &self.complaints;
        let l = &self.lawsuits;
        match metric {
            Metric::ComplaintDisposition(d)      => c.disposition_count(d) as f64,
            Metric::ComplaintTotal               => c.total as f64,
            Metric::AllegationCount(block, fado) => c.allegation_count(block, fado) as f64,
            Metric::LawsuitPayout                => l.officer_payout,
            Metric::LawsuitAllegation(kind)      => l.allegation_count(kind) as f64,
            Metric::LawsuitPending               => l.pending as f64,
            Metric::LawsuitClosed                => l.closed as f64,
            Metric::LawsuitHighPayout            => l.high_payout as f64,
            Metric::LawsuitTotal                 => l.total as f64,
        }
    }
}

// ── Allegations ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct ComplaintGroup {
    fado_present: [[bool; 5]; 5],
    dispositions: Vec<Disposition>,
}

/// Per-officer complaint and allegation-type counts.
///
/// Allegations are first grouped by (complaint, officer): a complaint with
/// several allegations of one category counts once for that category, and
/// its complaint-level disposition is the highest-ranked allegation
/// disposition.
pub fn summarize_allegations(allegations: &[AllegationEvent]) -> BTreeMap<TaxId, ComplaintSummary> {
    let mut groups: BTreeMap<(TaxId, ComplaintId), ComplaintGroup> = BTreeMap::new();
    for a in allegations {
        let group = groups.entry((a.tax_id, a.complaint_id)).or_default();
        let fado = a.fado.index();
        group.fado_present[AllegationBlock::All.index()][fado] = true;
        if let Some(block) = block_for(a.disposition) {
            group.fado_present[block.index()][fado] = true;
        }
        group.dispositions.push(a.disposition);
    }

    let mut summaries: BTreeMap<TaxId, ComplaintSummary> = BTreeMap::new();
    for ((tax_id, _), group) in groups {
        let summary = summaries.entry(tax_id).or_default();
        summary.total += 1;
        if let Some(level) = Disposition::complaint_level(group.dispositions.iter().copied()) {
            if let Some(i) = COMPLAINT_DISPOSITIONS.iter().position(|d| *d == level) {
                summary.by_disposition[i] += 1;
            }
        }
        for (block, row) in group.fado_present.iter().enumerate() {
            for (fado, present) in row.iter().enumerate() {
                if *present {
                    summary.fado_counts[block][fado] += 1;
                }
            }
        }
    }
    summaries
}

fn block_for(disposition: Disposition) -> Option<AllegationBlock> {
    AllegationBlock::ALL
        .into_iter()
        .find(|b| b.disposition() == Some(disposition))
}

// ── Lawsuits ─────────────────────────────────────────────────────────────────

pub fn summarize_lawsuits(lawsuits: &[WindowedLawsuit]) -> BTreeMap<TaxId, LawsuitSummary> {
    let mut summaries: BTreeMap<TaxId, LawsuitSummary> = BTreeMap::new();
    for suit in lawsuits {
        let s = summaries.entry(suit.event.tax_id).or_default();
        s.officer_payout += suit.event.officer_payout;
        for kind in LawsuitAllegation::ALL {
            if suit.event.has_allegation(kind) {
                s.allegations[kind.index()] += 1;
            }
        }
        if suit.pending {
            s.pending += 1;
        } else {
            s.closed += 1;
        }
        if suit.event.high_payout_suit {
            s.high_payout += 1;
        }
        s.total += 1;
    }
    summaries
}

// ── Combined ─────────────────────────────────────────────────────────────────

/// Outer-join of the complaint and lawsuit summaries for one window.
pub fn summarize_period(
    allegations: &[AllegationEvent],
    lawsuits: &[WindowedLawsuit],
) -> BTreeMap<TaxId, OfficerPeriodSummary> {
    let mut combined: BTreeMap<TaxId, OfficerPeriodSummary> = BTreeMap::new();
    for (tax_id, complaints) in summarize_allegations(allegations) {
        combined.entry(tax_id).or_default().complaints = complaints;
    }
    for (tax_id, suits) in summarize_lawsuits(lawsuits) {
        combined.entry(tax_id).or_default().lawsuits = suits;
    }
    combined
}
