//! Modeling dataset assembly: the hand-off to model training.
//!
//! Joins features and outcomes onto the observation table, keeps only
//! observations where the officer was presumably on the force, and
//! restricts to the prediction date range.

use crate::{
    allegation::parse_optional_date,
    config::ModelingConfig,
    disposition::Disposition,
    error::{PipelineError, PipelineResult},
    folds::FoldAssignment,
    observation::ObservationTable,
    panel::PanelTable,
    schema::{AllegationBlock, Metric, PanelField, PanelSchema, WindowLabel},
    types::{Date, TaxId},
};
use serde::Deserialize;
use std::collections::HashMap;

// ── Career dates ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CareerDates {
    pub tax_id:            TaxId,
    pub career_start_date: Option<Date>,
    pub career_end_date:   Option<Date>,
}

impl CareerDates {
    /// Active iff both dates are known and `date` lies between them.
    pub fn active_on(&self, date: Date) -> bool {
        match (self.career_start_date, self.career_end_date) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CareerDatesRecord {
    pub tax_id:            TaxId,
    pub career_start_date: Option<String>,
    pub career_end_date:   Option<String>,
}

impl CareerDatesRecord {
    pub fn into_career_dates(self) -> PipelineResult<CareerDates> {
        Ok(CareerDates {
            tax_id: self.tax_id,
            career_start_date: parse_optional_date(
                "career_start_date",
                self.career_start_date.as_deref(),
            )?,
            career_end_date: parse_optional_date(
                "career_end_date",
                self.career_end_date.as_deref(),
            )?,
        })
    }
}

// ── Feature sets and targets ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSet {
    /// Every trailing-window column.
    All,
    /// Substantiated complaint counts and the substantiated allegation block.
    SubstantiatedComplaints,
    /// Complaint and allegation trailing columns, without lawsuits or the
    /// pending allegation block.
    ComplaintsOnly,
}

impl FeatureSet {
    pub fn includes(&self, field: &PanelField) -> bool {
        if field.window.is_forward() {
            return false;
        }
        match self {
            Self::All => true,
            Self::SubstantiatedComplaints => matches!(
                field.metric,
                Metric::ComplaintDisposition(Disposition::Substantiated)
                    | Metric::AllegationCount(AllegationBlock::Substantiated, _)
            ),
            Self::ComplaintsOnly => !field.metric.is_lawsuit()
                && !matches!(field.metric, Metric::AllegationCount(AllegationBlock::Pending, _)),
        }
    }

    /// Column names from `schema` that belong to this set, in schema order.
    pub fn columns(&self, schema: &PanelSchema) -> Vec<String> {
        schema
            .fields()
            .iter()
            .zip(schema.names())
            .filter(|(f, _)| self.includes(f))
            .map(|(_, n)| n.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTarget {
    /// Any substantiated complaint within two years.
    SustainedComplaints,
    /// Any high-payout lawsuit within two years.
    ExpensiveLawsuit,
}

impl ModelTarget {
    pub fn field(&self) -> PanelField {
        let metric = match self {
            Self::SustainedComplaints => Metric::ComplaintDisposition(Disposition::Substantiated),
            Self::ExpensiveLawsuit => Metric::LawsuitHighPayout,
        };
        PanelField { window: WindowLabel::FutureTwoYears, metric }
    }

    pub fn column(&self) -> String {
        self.field().name()
    }
}

// ── Dataset ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ModelingDataset {
    table: PanelTable,
}

impl ModelingDataset {
    /// Left-join features then outcomes onto the observation table.
    pub fn assemble(
        observations: &ObservationTable,
        features: &PanelTable,
        outcomes: &PanelTable,
    ) -> Self {
        let base = PanelTable::zeroed(observations, Vec::new());
        Self { table: base.left_join(features).left_join(outcomes) }
    }

    /// Keep observations inside the officer's career span. Officers with no
    /// career record, or a missing start or end date, are dropped.
    pub fn restrict_to_active(self, careers: &[CareerDates]) -> Self {
        let by_officer: HashMap<TaxId, &CareerDates> =
            careers.iter().map(|c| (c.tax_id, c)).collect();
        let table = self.table.filter_rows(|k| {
            by_officer
                .get(&k.tax_id)
                .is_some_and(|c| c.active_on(k.observation_date))
        });
        Self { table }
    }

    /// Keep observations dated within `[start, end]`.
    pub fn restrict_to_range(self, start: Date, end: Date) -> Self {
        let table = self
            .table
            .filter_rows(|k| start <= k.observation_date && k.observation_date <= end);
        Self { table }
    }

    pub fn for_modeling(
        observations: &ObservationTable,
        features: &PanelTable,
        outcomes: &PanelTable,
        careers: &[CareerDates],
        config: &ModelingConfig,
    ) -> Self {
        let dataset = Self::assemble(observations, features, outcomes)
            .restrict_to_active(careers)
            .restrict_to_range(config.prediction_start, config.prediction_end);
        log::info!(
            "modeling dataset: {} active observations in [{}, {}]",
            dataset.table.len(),
            config.prediction_start,
            config.prediction_end,
        );
        dataset
    }

    pub fn table(&self) -> &PanelTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Binary label per row: at least one event in the target window.
    pub fn labels(&self, target: ModelTarget) -> PipelineResult<Vec<bool>> {
        let column = target.column();
        let values = self
            .table
            .column(&column)
            .ok_or_else(|| PipelineError::Config(format!("dataset has no column '{column}'")))?;
        Ok(values.into_iter().map(|v| v >= 1.0).collect())
    }

    /// Row-major matrix of the requested columns.
    pub fn feature_matrix(&self, columns: &[String]) -> PipelineResult<Vec<Vec<f64>>> {
        let positions = columns
            .iter()
            .map(|c| {
                self.table
                    .column_index(c)
                    .ok_or_else(|| PipelineError::Config(format!("dataset has no column '{c}'")))
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        Ok((0..self.table.len())
            .map(|r| {
                let row = self.table.row(r);
                positions.iter().map(|p| row[*p]).collect()
            })
            .collect())
    }

    /// One grouped fold assignment per Monte Carlo iteration.
    pub fn fold_assignments(&self, config: &ModelingConfig) -> PipelineResult<Vec<FoldAssignment>> {
        (0..config.mc_iters)
            .map(|i| {
                FoldAssignment::assign(self.table.keys(), config.n_splits, config.random_state, i)
            })
            .collect()
    }
}
