//! The pipeline engine.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   1. Observation table (built once, reused by later runs)
//!   2. Feature builder   -> `features`
//!   3. Outcome builder   -> `outcomes`
//!   4. Modeling dataset  -> `modeling_dataset`, `cv_fold`
//!      (only when career dates have been imported)
//!
//! RULES:
//!   - Builders execute in registration order and only read `PanelInputs`.
//!   - Builders never write to the store; the engine persists their output.
//!   - All randomness (fold assignment) is seeded from the config.

use crate::{
    builder::{PanelBuilder, PanelInputs},
    config::PipelineConfig,
    dataset::ModelingDataset,
    error::{PipelineError, PipelineResult},
    features::FeatureBuilder,
    manifest::{PanelManifest, RunManifest},
    observation::ObservationTable,
    outcomes::OutcomeBuilder,
    panel::PanelTable,
    store::PanelStore,
    types::RunId,
};
use std::collections::{BTreeSet, HashMap};

pub const MODELING_TABLE: &str = "modeling_dataset";

pub struct PipelineEngine {
    pub run_id: RunId,
    config:     PipelineConfig,
    builders:   Vec<Box<dyn PanelBuilder>>,
    store:      PanelStore,
}

impl PipelineEngine {
    pub fn new(run_id: RunId, config: PipelineConfig, store: PanelStore) -> Self {
        Self { run_id, config, builders: Vec::new(), store }
    }

    /// Engine with the feature and outcome builders registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(run_id: RunId, config: PipelineConfig, store: PanelStore) -> PipelineResult<Self> {
        config.validate()?;
        let features = FeatureBuilder::new(&config.features)?;
        let outcomes = OutcomeBuilder::new(&config.outcomes)?;
        let mut engine = Self::new(run_id, config, store);
        engine.register(Box::new(features));
        engine.register(Box::new(outcomes));
        Ok(engine)
    }

    pub fn new_run_id() -> RunId {
        format!("run-{}", uuid::Uuid::new_v4())
    }

    pub fn register(&mut self, builder: Box<dyn PanelBuilder>) {
        self.builders.push(builder);
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &PanelStore {
        &self.store
    }

    /// Load the stored observation table, or build it from the roster and
    /// the configured dates and store it.
    pub fn ensure_observation_table(&self) -> PipelineResult<ObservationTable> {
        if let Some(existing) = self.store.load_observation_table()? {
            log::info!("reusing stored observation table: {} rows", existing.len());
            return Ok(existing);
        }
        let roster = self.store.roster_tax_ids()?;
        if roster.is_empty() {
            return Err(PipelineError::Config(
                "roster is empty; cannot build the observation table".into(),
            ));
        }
        let dates = self.config.observation.observation_dates()?;
        let table = ObservationTable::cross_product(&roster, &dates);
        self.store.write_observation_table(&table)?;
        log::info!(
            "built observation table: {} officers x {} dates = {} rows",
            roster.len(),
            dates.len(),
            table.len(),
        );
        Ok(table)
    }

    /// Run every registered builder and persist the results.
    pub fn run(&self) -> PipelineResult<RunManifest> {
        let config_json = serde_json::to_string(&self.config)?;
        self.store
            .insert_run(&self.run_id, env!("CARGO_PKG_VERSION"), &config_json)?;

        let observations = self.ensure_observation_table()?;
        let allegations = self.store.load_allegations()?;
        let lawsuits = self.store.load_lawsuits()?;
        log::info!(
            "run {}: {} allegations, {} lawsuits",
            self.run_id,
            allegations.len(),
            lawsuits.len(),
        );

        let inputs = PanelInputs::new(&observations, &allegations, &lawsuits);
        let mut built: HashMap<&'static str, PanelTable> = HashMap::new();
        let mut panels = Vec::with_capacity(self.builders.len());
        for builder in &self.builders {
            let table = builder.build(&inputs)?;
            self.store.write_panel(builder.name(), &table)?;
            panels.push(PanelManifest {
                name: builder.name().to_string(),
                rows: table.len(),
                columns: table.columns().len(),
            });
            built.insert(builder.name(), table);
        }

        let modeling_rows = match (built.get("features"), built.get("outcomes")) {
            (Some(features), Some(outcomes)) => {
                self.prepare_modeling(&observations, features, outcomes)?
            }
            _ => None,
        };

        let manifest = RunManifest {
            run_id: self.run_id.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            officers: observations.tax_ids().len(),
            observation_dates: observations.dates(),
            allegations: allegations.len(),
            lawsuits: lawsuits.len(),
            panels,
            modeling_rows,
        };
        self.store
            .save_manifest(&self.run_id, &serde_json::to_string(&manifest)?)?;
        log::info!("run {} complete", self.run_id);
        Ok(manifest)
    }

    /// Assemble and store the modeling dataset and its folds. Returns
    /// `None` when no career dates are on file.
    fn prepare_modeling(
        &self,
        observations: &ObservationTable,
        features: &PanelTable,
        outcomes: &PanelTable,
    ) -> PipelineResult<Option<usize>> {
        let careers = self.store.load_career_dates()?;
        if careers.is_empty() {
            log::info!("no career dates on file; skipping modeling dataset");
            return Ok(None);
        }
        let dataset = ModelingDataset::for_modeling(
            observations,
            features,
            outcomes,
            &careers,
            &self.config.modeling,
        );
        self.store.write_panel(MODELING_TABLE, dataset.table())?;

        let officers: BTreeSet<_> = dataset.table().keys().iter().map(|k| k.tax_id).collect();
        if officers.len() < self.config.modeling.n_splits {
            log::warn!(
                "{} active officers cannot fill {} folds; no folds written",
                officers.len(),
                self.config.modeling.n_splits,
            );
        } else {
            let folds = dataset.fold_assignments(&self.config.modeling)?;
            self.store.write_fold_assignments(&folds)?;
            log::info!("wrote {} fold assignments", folds.len());
        }
        Ok(Some(dataset.len()))
    }

    /// The manifest recorded for this engine's run, if it has completed.
    pub fn stored_manifest(&self) -> PipelineResult<Option<RunManifest>> {
        match self.store.manifest_json(&self.run_id)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
