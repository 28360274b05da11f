//! Time-window filtering with right-censoring.
//!
//! RULE: A `Knowledge::Censored` pass may only use what was knowable on
//! the window's end date. Events filed after the end are dropped, and any
//! disposition or payout not final by the end is masked. A
//! `Knowledge::Omniscient` pass uses final outcomes directly.
//!
//! Filters return new vectors; inputs are never mutated.

use crate::{
    allegation::AllegationEvent,
    disposition::Disposition,
    error::{PipelineError, PipelineResult},
    lawsuit::LawsuitEvent,
    types::Date,
};
use chrono::Months;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Knowledge {
    /// As known on the window end date. Used for features.
    Censored,
    /// Full hindsight. Used for outcome labels.
    Omniscient,
}

/// A closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Date,
    pub end:   Date,
}

impl TimeWindow {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// `[as_of - years, as_of]`.
    pub fn trailing(as_of: Date, years: u32) -> PipelineResult<Self> {
        Ok(Self::new(shift_months(as_of, -(12 * years as i32))?, as_of))
    }

    /// `[as_of, as_of + years]`.
    pub fn forward(as_of: Date, years: u32) -> PipelineResult<Self> {
        Ok(Self::new(as_of, shift_months(as_of, 12 * years as i32)?))
    }

    /// Both endpoints moved forward by `months`.
    pub fn offset_months(&self, months: u32) -> PipelineResult<Self> {
        if months == 0 {
            return Ok(*self);
        }
        Ok(Self::new(
            shift_months(self.start, months as i32)?,
            shift_months(self.end, months as i32)?,
        ))
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    fn contains_opt(&self, date: Option<Date>) -> bool {
        date.is_some_and(|d| self.contains(d))
    }

    /// True when `date` is known and not after the window end.
    fn resolved_by_end(&self, date: Option<Date>) -> bool {
        date.is_some_and(|d| d <= self.end)
    }
}

/// Calendar month arithmetic; day-of-month clamps to the target month's end.
pub fn shift_months(date: Date, months: i32) -> PipelineResult<Date> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or(PipelineError::DateOutOfRange { date, months })
}

// ── Allegations ──────────────────────────────────────────────────────────────

pub fn filter_allegations(
    allegations: &[AllegationEvent],
    window: TimeWindow,
    knowledge: Knowledge,
) -> Vec<AllegationEvent> {
    allegations
        .iter()
        .filter(|a| window.contains_opt(a.incident_date))
        .filter_map(|a| censor_allegation(a, window, knowledge))
        .collect()
}

fn censor_allegation(
    allegation: &AllegationEvent,
    window: TimeWindow,
    knowledge: Knowledge,
) -> Option<AllegationEvent> {
    match knowledge {
        Knowledge::Omniscient => Some(allegation.clone()),
        Knowledge::Censored => {
            if !window.resolved_by_end(allegation.received_date) {
                return None;
            }
            let mut visible = allegation.clone();
            if !window.resolved_by_end(allegation.close_date) {
                visible.disposition = Disposition::Pending;
            }
            Some(visible)
        }
    }
}

// ── Lawsuits ─────────────────────────────────────────────────────────────────

/// A lawsuit as seen through one window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedLawsuit {
    pub event:   LawsuitEvent,
    pub pending: bool,
}

impl WindowedLawsuit {
    pub fn closed(&self) -> bool {
        !self.pending
    }
}

pub fn filter_lawsuits(
    lawsuits: &[LawsuitEvent],
    window: TimeWindow,
    knowledge: Knowledge,
) -> Vec<WindowedLawsuit> {
    lawsuits
        .iter()
        .filter(|l| window.contains_opt(l.lit_start))
        .map(|l| censor_lawsuit(l, window, knowledge))
        .collect()
}

fn censor_lawsuit(lawsuit: &LawsuitEvent, window: TimeWindow, knowledge: Knowledge) -> WindowedLawsuit {
    match knowledge {
        Knowledge::Omniscient => WindowedLawsuit {
            event: lawsuit.clone(),
            pending: lawsuit.disp_date.is_none(),
        },
        Knowledge::Censored => {
            let mut visible = lawsuit.clone();
            let pending = !window.resolved_by_end(lawsuit.disp_date);
            if pending {
                visible.officer_payout = 0.0;
                visible.high_payout_suit = false;
            }
            WindowedLawsuit { event: visible, pending }
        }
    }
}

// ── Date index ───────────────────────────────────────────────────────────────

/// Events sorted by their relevance date, so a window can be sliced with
/// two binary searches instead of a full scan. Events without a relevance
/// date are left out; they never match any window.
#[derive(Debug, Clone)]
pub struct DateIndex<T> {
    events: Vec<T>,
    dates:  Vec<Date>,
}

impl<T: Clone> DateIndex<T> {
    pub fn new(events: &[T], relevance: impl Fn(&T) -> Option<Date>) -> Self {
        let mut dated: Vec<(Date, T)> = events
            .iter()
            .filter_map(|e| relevance(e).map(|d| (d, e.clone())))
            .collect();
        // Stable sort keeps input order among same-day events.
        dated.sort_by_key(|(d, _)| *d);
        let (dates, events) = dated.into_iter().unzip();
        Self { events, dates }
    }

    /// Events whose relevance date lies in `[window.start, window.end]`.
    pub fn slice(&self, window: TimeWindow) -> &[T] {
        let lo = self.dates.partition_point(|d| *d < window.start);
        let hi = self.dates.partition_point(|d| *d <= window.end);
        &self.events[lo..hi.max(lo)]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl DateIndex<AllegationEvent> {
    pub fn allegations(events: &[AllegationEvent]) -> Self {
        Self::new(events, |a| a.incident_date)
    }
}

impl DateIndex<LawsuitEvent> {
    pub fn lawsuits(events: &[LawsuitEvent]) -> Self {
        Self::new(events, |l| l.lit_start)
    }
}
