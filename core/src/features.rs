//! Feature builder: trailing-window behavioural history.
//!
//! For each observation date and each trailing length N, the window is
//! `[date - N years, date]`, evaluated censored: only what was on file
//! by the observation date, with unresolved dispositions and payouts
//! masked.

use crate::{
    builder::{build_window_panel, PanelBuilder, PanelInputs, WindowPass},
    config::FeatureConfig,
    error::PipelineResult,
    panel::PanelTable,
    schema::{Metric, PanelSchema, WindowLabel},
    window::Knowledge,
};

pub struct FeatureBuilder {
    passes: Vec<WindowPass>,
    schema: PanelSchema,
}

impl FeatureBuilder {
    pub fn new(config: &FeatureConfig) -> PipelineResult<Self> {
        let labels = config
            .trailing_years
            .iter()
            .map(|y| WindowLabel::trailing(*y))
            .collect::<PipelineResult<Vec<_>>>()?;
        let passes = labels
            .iter()
            .map(|label| WindowPass {
                label: *label,
                knowledge: Knowledge::Censored,
                lawsuit_offset_months: 0,
            })
            .collect();
        Ok(Self {
            passes,
            schema: PanelSchema::new(&labels, &Metric::all()),
        })
    }
}

impl PanelBuilder for FeatureBuilder {
    fn name(&self) -> &'static str {
        "features"
    }

    fn schema(&self) -> &PanelSchema {
        &self.schema
    }

    fn build(&self, inputs: &PanelInputs<'_>) -> PipelineResult<PanelTable> {
        let table = build_window_panel(inputs, &self.passes, &self.schema)?;
        log::info!(
            "features: {} rows x {} columns over {} windows",
            table.len(),
            table.columns().len(),
            self.passes.len(),
        );
        Ok(table)
    }
}
