//! Run manifest, recorded as JSON on the run row once a run completes.
//!
//! It captures what each builder wrote so a later reader can check a
//! snapshot without loading the wide tables.

use crate::types::{Date, RunId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelManifest {
    pub name:    String,
    pub rows:    usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id:            RunId,
    pub version:           String,
    pub officers:          usize,
    pub observation_dates: Vec<Date>,
    pub allegations:       usize,
    pub lawsuits:          usize,
    pub panels:            Vec<PanelManifest>,
    /// Rows kept for modeling; `None` when that step was not run.
    pub modeling_rows:     Option<usize>,
}

impl RunManifest {
    pub fn panel(&self, name: &str) -> Option<&PanelManifest> {
        self.panels.iter().find(|p| p.name == name)
    }
}
