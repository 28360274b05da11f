//! Panel builder trait and the shared window-pass machinery.
//!
//! RULE: Every panel (features, outcomes) implements `PanelBuilder`.
//! The engine runs builders in registration order. Builders only read
//! `PanelInputs`; each returns a fresh `PanelTable` with one row per
//! observation and 0.0 wherever an officer had no activity.

use crate::{
    aggregate::{summarize_period, OfficerPeriodSummary},
    allegation::AllegationEvent,
    error::PipelineResult,
    lawsuit::LawsuitEvent,
    observation::{ObservationKey, ObservationTable},
    panel::PanelTable,
    schema::{Metric, PanelSchema, WindowLabel},
    types::{Date, TaxId},
    window::{filter_allegations, filter_lawsuits, DateIndex, Knowledge, TimeWindow},
};
use std::collections::BTreeMap;

/// Immutable, date-indexed inputs shared by every builder.
pub struct PanelInputs<'a> {
    pub observations: &'a ObservationTable,
    allegations: DateIndex<AllegationEvent>,
    lawsuits:    DateIndex<LawsuitEvent>,
}

impl<'a> PanelInputs<'a> {
    pub fn new(
        observations: &'a ObservationTable,
        allegations: &[AllegationEvent],
        lawsuits: &[LawsuitEvent],
    ) -> Self {
        Self {
            observations,
            allegations: DateIndex::allegations(allegations),
            lawsuits: DateIndex::lawsuits(lawsuits),
        }
    }

    pub fn allegations_in(&self, window: TimeWindow) -> &[AllegationEvent] {
        self.allegations.slice(window)
    }

    pub fn lawsuits_in(&self, window: TimeWindow) -> &[LawsuitEvent] {
        self.lawsuits.slice(window)
    }
}

/// The contract every panel builder must fulfill.
pub trait PanelBuilder {
    /// Stable name; also the output snapshot table.
    fn name(&self) -> &'static str;

    fn schema(&self) -> &PanelSchema;

    fn build(&self, inputs: &PanelInputs<'_>) -> PipelineResult<PanelTable>;
}

/// One window length evaluated at every observation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPass {
    pub label:     WindowLabel,
    pub knowledge: Knowledge,
    /// Applied to lawsuit windows only.
    pub lawsuit_offset_months: u32,
}

impl WindowPass {
    pub fn window(&self, as_of: Date) -> PipelineResult<TimeWindow> {
        if self.label.is_forward() {
            TimeWindow::forward(as_of, self.label.years())
        } else {
            TimeWindow::trailing(as_of, self.label.years())
        }
    }

    /// Filter and aggregate both sources for one as-of date.
    pub fn summarize(
        &self,
        inputs: &PanelInputs<'_>,
        as_of: Date,
    ) -> PipelineResult<BTreeMap<TaxId, OfficerPeriodSummary>> {
        let window = self.window(as_of)?;
        let lawsuit_window = window.offset_months(self.lawsuit_offset_months)?;

        let allegations =
            filter_allegations(inputs.allegations_in(window), window, self.knowledge);
        let lawsuits =
            filter_lawsuits(inputs.lawsuits_in(lawsuit_window), lawsuit_window, self.knowledge);

        log::debug!(
            "{} @ {as_of}: [{} .. {}] {} allegations, {} lawsuits",
            self.label.prefix(),
            window.start,
            window.end,
            allegations.len(),
            lawsuits.len(),
        );
        Ok(summarize_period(&allegations, &lawsuits))
    }
}

/// Run every pass at every observation date and merge the results onto a
/// zero-filled panel shaped by `schema`.
///
/// Officers with activity but no observation row for that date are
/// dropped, as in a left merge onto the observation table.
pub fn build_window_panel(
    inputs: &PanelInputs<'_>,
    passes: &[WindowPass],
    schema: &PanelSchema,
) -> PipelineResult<PanelTable> {
    let observations = inputs.observations;
    let mut table = PanelTable::zeroed(observations, schema.names().to_vec());

    // Column positions each pass writes, resolved once.
    let targets: Vec<Vec<(usize, Metric)>> = passes
        .iter()
        .map(|pass| {
            schema
                .fields()
                .iter()
                .enumerate()
                .filter(|(_, f)| f.window == pass.label)
                .map(|(i, f)| (i, f.metric))
                .collect()
        })
        .collect();

    let mut unmatched = 0usize;
    for as_of in observations.dates() {
        for (pass, columns) in passes.iter().zip(&targets) {
            if columns.is_empty() {
                continue;
            }
            for (tax_id, summary) in pass.summarize(inputs, as_of)? {
                let Some(row) = observations.position(&ObservationKey::new(tax_id, as_of)) else {
                    unmatched += 1;
                    continue;
                };
                for (col, metric) in columns {
                    table.set(row, *col, summary.value(*metric));
                }
            }
        }
    }

    if unmatched > 0 {
        log::debug!("{unmatched} officer-window summaries had no observation row");
    }
    Ok(table)
}
