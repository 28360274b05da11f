//! Allegation events: one row per (complaint, officer, allegation).

use crate::{
    disposition::Disposition,
    error::{PipelineError, PipelineResult},
    types::{ComplaintId, Date, TaxId, DATE_FORMAT},
};
use serde::{Deserialize, Serialize};

/// CCRB "FADO" allegation category. Exactly one per allegation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadoCategory {
    AbuseOfAuthority,
    Discourtesy,
    Force,
    OffensiveLanguage,
    UntruthfulStatement,
}

impl FadoCategory {
    pub const ALL: [FadoCategory; 5] = [
        FadoCategory::AbuseOfAuthority,
        FadoCategory::Discourtesy,
        FadoCategory::Force,
        FadoCategory::OffensiveLanguage,
        FadoCategory::UntruthfulStatement,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::AbuseOfAuthority    => 0,
            Self::Discourtesy         => 1,
            Self::Force               => 2,
            Self::OffensiveLanguage   => 3,
            Self::UntruthfulStatement => 4,
        }
    }

    /// Output column name, e.g. `FADO_force`.
    pub fn column(&self) -> &'static str {
        match self {
            Self::AbuseOfAuthority    => "FADO_abuse_of_authority",
            Self::Discourtesy         => "FADO_discourtesy",
            Self::Force               => "FADO_force",
            Self::OffensiveLanguage   => "FADO_offensive_language",
            Self::UntruthfulStatement => "FADO_untruthful_statement",
        }
    }

    /// Parse either the raw CCRB spelling ("Abuse of Authority") or the
    /// snake-cased form.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().replace(' ', "_").as_str() {
            "abuse_of_authority"   => Some(Self::AbuseOfAuthority),
            "discourtesy"          => Some(Self::Discourtesy),
            "force"                => Some(Self::Force),
            "offensive_language"   => Some(Self::OffensiveLanguage),
            "untruthful_statement" => Some(Self::UntruthfulStatement),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        &self.column()["FADO_".len()..]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllegationEvent {
    pub complaint_id:  ComplaintId,
    pub tax_id:        TaxId,
    /// When the misconduct occurred. Rows without one never fall in a window.
    pub incident_date: Option<Date>,
    /// When the complaint was filed with the CCRB.
    pub received_date: Option<Date>,
    /// When the disposition became final. `None` while still open.
    pub close_date:    Option<Date>,
    pub fado:          FadoCategory,
    pub disposition:   Disposition,
}

/// One row of the cleaned allegation extract as delivered by the cleaner.
///
/// Either `ccrb_disposition__collapsed` or the raw
/// `ccrb_allegation_disposition` must describe the disposition; a record with
/// neither is classified as "none".
#[derive(Debug, Clone, Deserialize)]
pub struct AllegationRecord {
    pub complaint_id:  ComplaintId,
    pub tax_id:        Option<TaxId>,
    pub incident_date: Option<String>,
    pub received_date: Option<String>,
    pub close_date:    Option<String>,
    pub fado_type:     String,
    #[serde(default, rename = "ccrb_disposition__collapsed")]
    pub disposition_collapsed: Option<String>,
    #[serde(default)]
    pub ccrb_allegation_disposition: Option<String>,
}

impl AllegationRecord {
    /// Convert to an event. Returns `Ok(None)` for rows with no identified
    /// officer; those are not usable by the panel.
    pub fn into_event(self) -> PipelineResult<Option<AllegationEvent>> {
        let Some(tax_id) = self.tax_id else {
            return Ok(None);
        };

        let disposition = match self.disposition_collapsed.as_deref() {
            Some(label) => Disposition::from_collapsed(label)?,
            None => Disposition::classify_optional(self.ccrb_allegation_disposition.as_deref())?,
        };

        let fado = FadoCategory::parse(&self.fado_type).ok_or_else(|| {
            PipelineError::UnknownFadoType {
                complaint_id: self.complaint_id,
                raw: self.fado_type.clone(),
            }
        })?;

        Ok(Some(AllegationEvent {
            complaint_id: self.complaint_id,
            tax_id,
            incident_date: parse_optional_date("incident_date", self.incident_date.as_deref())?,
            received_date: parse_optional_date("received_date", self.received_date.as_deref())?,
            close_date: parse_optional_date("close_date", self.close_date.as_deref())?,
            fado,
            disposition,
        }))
    }
}

/// Parse an ISO date; empty strings count as missing.
pub(crate) fn parse_optional_date(column: &str, value: Option<&str>) -> PipelineResult<Option<Date>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => Date::parse_from_str(v, DATE_FORMAT)
            .map(Some)
            .map_err(|_| PipelineError::InvalidDate {
                column: column.to_string(),
                value: v.to_string(),
            }),
    }
}
