//! Pipeline configuration.
//!
//! Loaded from a single JSON file. Every section is optional and falls
//! back to the study defaults, so `{}` is a valid config.
//! In tests, use `PipelineConfig::default()`.

use crate::{
    error::{PipelineError, PipelineResult},
    schema::WindowLabel,
    types::Date,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservationConfig {
    pub start_year: i32,
    pub end_year:   i32,
    /// Month and day of the annual as-of date.
    pub as_of_month: u32,
    pub as_of_day:   u32,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            start_year: 2013,
            end_year: 2020,
            as_of_month: 1,
            as_of_day: 1,
        }
    }
}

impl ObservationConfig {
    /// The annual as-of dates, ascending.
    pub fn observation_dates(&self) -> PipelineResult<Vec<Date>> {
        (self.start_year..=self.end_year)
            .map(|year| {
                Date::from_ymd_opt(year, self.as_of_month, self.as_of_day).ok_or_else(|| {
                    PipelineError::Config(format!(
                        "invalid as-of date {year}-{:02}-{:02}",
                        self.as_of_month, self.as_of_day
                    ))
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeatureConfig {
    pub trailing_years: Vec<u32>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { trailing_years: vec![1, 2, 5] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutcomeConfig {
    pub forward_years: Vec<u32>,
    /// Shift lawsuit windows forward to absorb filing latency.
    pub use_lawsuit_offset: bool,
    pub lawsuit_offset_months: u32,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            forward_years: vec![1, 2],
            use_lawsuit_offset: true,
            lawsuit_offset_months: 6,
        }
    }
}

impl OutcomeConfig {
    /// Months added to both lawsuit window endpoints, 0 when disabled.
    pub fn effective_lawsuit_offset(&self) -> u32 {
        if self.use_lawsuit_offset {
            self.lawsuit_offset_months
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LawsuitConfig {
    /// Total city payout at or above which a suit counts as high-payout.
    pub high_payout_threshold: f64,
    /// Divide each docket's payout evenly among its named officers.
    pub split_payout_across_officers: bool,
}

impl Default for LawsuitConfig {
    fn default() -> Self {
        Self {
            high_payout_threshold: 50_000.0,
            split_payout_across_officers: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelingConfig {
    pub prediction_start: Date,
    pub prediction_end:   Date,
    /// Monte Carlo repetitions of the grouped fold split.
    pub mc_iters:         u32,
    pub n_splits:         usize,
    pub random_state:     u64,
}

impl Default for ModelingConfig {
    fn default() -> Self {
        Self {
            prediction_start: Date::from_ymd_opt(2014, 12, 31).unwrap_or(Date::MIN),
            prediction_end: Date::from_ymd_opt(2019, 1, 2).unwrap_or(Date::MIN),
            mc_iters: 5,
            n_splits: 3,
            random_state: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub observation: ObservationConfig,
    pub features:    FeatureConfig,
    pub outcomes:    OutcomeConfig,
    pub lawsuits:    LawsuitConfig,
    pub modeling:    ModelingConfig,
}

impl PipelineConfig {
    /// Load from a JSON file and validate.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        let obs = &self.observation;
        if obs.end_year < obs.start_year {
            return Err(PipelineError::Config(format!(
                "observation end_year {} precedes start_year {}",
                obs.end_year, obs.start_year
            )));
        }
        obs.observation_dates()?;

        if self.features.trailing_years.is_empty() {
            return Err(PipelineError::Config("no trailing feature windows".into()));
        }
        for years in &self.features.trailing_years {
            WindowLabel::trailing(*years)?;
        }
        reject_repeats("trailing_years", &self.features.trailing_years)?;

        if self.outcomes.forward_years.is_empty() {
            return Err(PipelineError::Config("no forward outcome windows".into()));
        }
        for years in &self.outcomes.forward_years {
            WindowLabel::forward(*years)?;
        }
        reject_repeats("forward_years", &self.outcomes.forward_years)?;

        if !(self.lawsuits.high_payout_threshold > 0.0) {
            return Err(PipelineError::Config(format!(
                "high_payout_threshold must be positive, got {}",
                self.lawsuits.high_payout_threshold
            )));
        }

        let modeling = &self.modeling;
        if modeling.n_splits < 2 {
            return Err(PipelineError::Config(format!(
                "n_splits must be at least 2, got {}",
                modeling.n_splits
            )));
        }
        if modeling.prediction_end < modeling.prediction_start {
            return Err(PipelineError::Config(format!(
                "prediction_end {} precedes prediction_start {}",
                modeling.prediction_end, modeling.prediction_start
            )));
        }
        Ok(())
    }
}

/// Each window length may appear once; a repeat would repeat its columns.
fn reject_repeats(field: &str, years: &[u32]) -> PipelineResult<()> {
    let mut seen = BTreeSet::new();
    for y in years {
        if !seen.insert(*y) {
            return Err(PipelineError::Config(format!("{field} lists {y} more than once")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"outcomes": {"use_lawsuit_offset": false}}"#).unwrap();
        assert_eq!(config.outcomes.forward_years, vec![1, 2]);
        assert_eq!(config.outcomes.effective_lawsuit_offset(), 0);
    }

    #[test]
    fn unsupported_window_is_rejected() {
        let mut config = PipelineConfig::default();
        config.features.trailing_years = vec![1, 3];
        assert!(matches!(
            config.validate(),
            Err(PipelineError::UnsupportedWindow { years: 3, .. })
        ));
    }

    #[test]
    fn repeated_window_is_rejected() {
        let mut config = PipelineConfig::default();
        config.features.trailing_years = vec![1, 1];
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));

        let mut config = PipelineConfig::default();
        config.outcomes.forward_years = vec![2, 1, 2];
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn default_study_has_eight_annual_dates() {
        let dates = ObservationConfig::default().observation_dates().unwrap();
        assert_eq!(dates.len(), 8);
        assert_eq!(dates[0], Date::from_ymd_opt(2013, 1, 1).unwrap());
        assert_eq!(dates[7], Date::from_ymd_opt(2020, 1, 1).unwrap());
    }
}
