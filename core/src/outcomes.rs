//! Outcome builder: forward-window labels.
//!
//! For each observation date and each forward length N, the window is
//! `[date, date + N years]`, evaluated with full hindsight. Lawsuit
//! windows are shifted forward by the configured offset to allow for the
//! lag between an incident and the suit being filed; allegation windows
//! never are.
//!
//! Only `RETAINED_OUTCOME_METRICS` reach the output panel.

use crate::{
    builder::{build_window_panel, PanelBuilder, PanelInputs, WindowPass},
    config::OutcomeConfig,
    error::PipelineResult,
    panel::PanelTable,
    schema::{PanelSchema, WindowLabel, RETAINED_OUTCOME_METRICS},
    window::Knowledge,
};

pub struct OutcomeBuilder {
    passes: Vec<WindowPass>,
    schema: PanelSchema,
}

impl OutcomeBuilder {
    pub fn new(config: &OutcomeConfig) -> PipelineResult<Self> {
        let labels = config
            .forward_years
            .iter()
            .map(|y| WindowLabel::forward(*y))
            .collect::<PipelineResult<Vec<_>>>()?;
        let offset = config.effective_lawsuit_offset();
        let passes = labels
            .iter()
            .map(|label| WindowPass {
                label: *label,
                knowledge: Knowledge::Omniscient,
                lawsuit_offset_months: offset,
            })
            .collect();
        Ok(Self {
            passes,
            schema: PanelSchema::new(&labels, &RETAINED_OUTCOME_METRICS),
        })
    }
}

impl PanelBuilder for OutcomeBuilder {
    fn name(&self) -> &'static str {
        "outcomes"
    }

    fn schema(&self) -> &PanelSchema {
        &self.schema
    }

    fn build(&self, inputs: &PanelInputs<'_>) -> PipelineResult<PanelTable> {
        let table = build_window_panel(inputs, &self.passes, &self.schema)?;
        log::info!(
            "outcomes: {} rows x {} columns over {} windows",
            table.len(),
            table.columns().len(),
            self.passes.len(),
        );
        Ok(table)
    }
}
