//! Lawsuit events and their preparation from raw city exports.
//!
//! Each annual export covers a rolling five-year span, so the same
//! (docket, officer) pair shows up in several exports. The latest export
//! carries the most up-to-date disposition and payout and wins.

use crate::{
    allegation::parse_optional_date,
    config::LawsuitConfig,
    error::PipelineResult,
    types::{Date, DocketNumber, TaxId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Allegation types flagged on a lawsuit. A suit may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawsuitAllegation {
    UseOfForce,
    AssaultBattery,
    MaliciousProsecution,
    FalseArrestImprison,
}

impl LawsuitAllegation {
    pub const ALL: [LawsuitAllegation; 4] = [
        LawsuitAllegation::UseOfForce,
        LawsuitAllegation::AssaultBattery,
        LawsuitAllegation::MaliciousProsecution,
        LawsuitAllegation::FalseArrestImprison,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::UseOfForce           => 0,
            Self::AssaultBattery       => 1,
            Self::MaliciousProsecution => 2,
            Self::FalseArrestImprison  => 3,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::UseOfForce           => "use_of_force_allegation",
            Self::AssaultBattery       => "assault_battery_allegation",
            Self::MaliciousProsecution => "malicious_prosecution_allegation",
            Self::FalseArrestImprison  => "false_arrest_imprison_allegation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawsuitEvent {
    pub docket_number:    DocketNumber,
    pub tax_id:           TaxId,
    /// Filing date. Suits without one never fall in a window.
    pub lit_start:        Option<Date>,
    /// Disposition date. `None` while the suit is pending.
    pub disp_date:        Option<Date>,
    /// This officer's share of the city payout.
    pub officer_payout:   f64,
    pub high_payout_suit: bool,
    /// Indexed by `LawsuitAllegation::index()`.
    pub allegations:      [bool; 4],
}

impl LawsuitEvent {
    pub fn has_allegation(&self, kind: LawsuitAllegation) -> bool {
        self.allegations[kind.index()]
    }
}

/// One row of a raw lawsuit export.
#[derive(Debug, Clone, Deserialize)]
pub struct LawsuitExportRow {
    pub docket_number:     DocketNumber,
    pub tax_id:            Option<TaxId>,
    pub lit_start:         Option<String>,
    pub disp_date:         Option<String>,
    pub total_city_payout: Option<f64>,
    #[serde(default)]
    pub use_of_force_allegation: Option<String>,
    #[serde(default)]
    pub assault_battery_allegation: Option<String>,
    #[serde(default)]
    pub malicious_prosecution_allegation: Option<String>,
    #[serde(default)]
    pub false_arrest_imprison_allegation: Option<String>,
    pub export_year:       i32,
}

impl LawsuitExportRow {
    fn allegation_flags(&self) -> [bool; 4] {
        let yes = |v: &Option<String>| v.as_deref().map(str::trim) == Some("Y");
        [
            yes(&self.use_of_force_allegation),
            yes(&self.assault_battery_allegation),
            yes(&self.malicious_prosecution_allegation),
            yes(&self.false_arrest_imprison_allegation),
        ]
    }
}

/// Turn raw export rows into deduplicated, payout-apportioned events.
///
/// Output is sorted by (docket_number, tax_id).
pub fn prepare_lawsuits(
    rows: Vec<LawsuitExportRow>,
    config: &LawsuitConfig,
) -> PipelineResult<Vec<LawsuitEvent>> {
    let total_rows = rows.len();

    // Latest export wins; among equal export years the later row wins.
    let mut latest: HashMap<(DocketNumber, TaxId), LawsuitExportRow> = HashMap::new();
    let mut missing_officer = 0usize;
    for row in rows {
        let Some(tax_id) = row.tax_id else {
            missing_officer += 1;
            continue;
        };
        let key = (row.docket_number.clone(), tax_id);
        match latest.get(&key) {
            Some(existing) if existing.export_year > row.export_year => {}
            _ => {
                latest.insert(key, row);
            }
        }
    }

    if missing_officer > 0 {
        log::warn!("lawsuit prep: dropped {missing_officer} rows without a tax_id");
    }

    let mut officers_per_docket: HashMap<&str, usize> = HashMap::new();
    for (docket, _) in latest.keys() {
        *officers_per_docket.entry(docket.as_str()).or_insert(0) += 1;
    }

    let mut events = Vec::with_capacity(latest.len());
    for ((docket, tax_id), row) in &latest {
        let lit_start = parse_optional_date("lit_start", row.lit_start.as_deref())?;
        let disp_date = parse_optional_date("disp_date", row.disp_date.as_deref())?;
        if lit_start.is_none() {
            log::warn!("lawsuit prep: docket {docket} (tax_id {tax_id}) has no filing date");
        }

        let total = row.total_city_payout.unwrap_or(0.0);
        let (officer_payout, high_payout_suit) = if disp_date.is_none() {
            (0.0, false)
        } else {
            let share = if config.split_payout_across_officers {
                total / officers_per_docket[docket.as_str()] as f64
            } else {
                total
            };
            (share, total >= config.high_payout_threshold)
        };

        events.push(LawsuitEvent {
            docket_number: docket.clone(),
            tax_id: *tax_id,
            lit_start,
            disp_date,
            officer_payout,
            high_payout_suit,
            allegations: row.allegation_flags(),
        });
    }

    events.sort_by(|a, b| {
        a.docket_number
            .cmp(&b.docket_number)
            .then(a.tax_id.cmp(&b.tax_id))
    });

    log::info!(
        "lawsuit prep: {total_rows} export rows -> {} (docket, officer) events",
        events.len()
    );
    Ok(events)
}
