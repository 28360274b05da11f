use super::PanelStore;
use crate::{
    allegation::{parse_optional_date, AllegationEvent, FadoCategory},
    dataset::CareerDates,
    disposition::Disposition,
    error::{PipelineError, PipelineResult},
    lawsuit::LawsuitEvent,
    observation::{ObservationKey, ObservationTable},
    types::{Date, TaxId, DATE_FORMAT},
};
use rusqlite::params;

fn date_text(date: Option<Date>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

/// Row-mapper conversion failures are carried out as rusqlite errors and
/// unwrapped back into `PipelineError` by the caller.
fn conversion_error(e: PipelineError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
}

fn unwrap_conversion(e: rusqlite::Error) -> PipelineError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(_, _, inner) => {
            match inner.downcast::<PipelineError>() {
                Ok(pipeline) => *pipeline,
                Err(other) => PipelineError::Other(anyhow::anyhow!(other.to_string())),
            }
        }
        other => PipelineError::Database(other),
    }
}

fn stored_date(column: &str, value: Option<String>) -> rusqlite::Result<Option<Date>> {
    parse_optional_date(column, value.as_deref()).map_err(conversion_error)
}

fn allegation_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<AllegationEvent> {
    let fado_text: String = row.get(5)?;
    let fado = FadoCategory::parse(&fado_text).ok_or_else(|| {
        conversion_error(PipelineError::UnknownFadoType {
            complaint_id: row.get(0).unwrap_or_default(),
            raw: fado_text.clone(),
        })
    })?;
    let disposition_text: String = row.get(6)?;
    Ok(AllegationEvent {
        complaint_id: row.get(0)?,
        tax_id: row.get(1)?,
        incident_date: stored_date("incident_date", row.get(2)?)?,
        received_date: stored_date("received_date", row.get(3)?)?,
        close_date: stored_date("close_date", row.get(4)?)?,
        fado,
        disposition: Disposition::from_collapsed(&disposition_text).map_err(conversion_error)?,
    })
}

fn lawsuit_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<LawsuitEvent> {
    Ok(LawsuitEvent {
        docket_number: row.get(0)?,
        tax_id: row.get(1)?,
        lit_start: stored_date("lit_start", row.get(2)?)?,
        disp_date: stored_date("disp_date", row.get(3)?)?,
        officer_payout: row.get(4)?,
        high_payout_suit: row.get::<_, i32>(5)? != 0,
        allegations: [
            row.get::<_, i32>(6)? != 0,
            row.get::<_, i32>(7)? != 0,
            row.get::<_, i32>(8)? != 0,
            row.get::<_, i32>(9)? != 0,
        ],
    })
}

impl PanelStore {
    // ── Allegations ────────────────────────────────────────────────

    pub fn insert_allegations(&self, allegations: &[AllegationEvent]) -> PipelineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO allegation (
                    complaint_id, tax_id, incident_date, received_date, close_date,
                    fado, disposition
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for a in allegations {
                stmt.execute(params![
                    a.complaint_id,
                    a.tax_id,
                    date_text(a.incident_date),
                    date_text(a.received_date),
                    date_text(a.close_date),
                    a.fado.as_str(),
                    a.disposition.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// All allegations in insertion order.
    pub fn load_allegations(&self) -> PipelineResult<Vec<AllegationEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT complaint_id, tax_id, incident_date, received_date, close_date,
                    fado, disposition
             FROM allegation ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], allegation_row_mapper)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(unwrap_conversion)?;
        Ok(rows)
    }

    // ── Lawsuits ───────────────────────────────────────────────────

    /// Insert or replace by (docket_number, tax_id).
    pub fn upsert_lawsuits(&self, lawsuits: &[LawsuitEvent]) -> PipelineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO lawsuit (
                    docket_number, tax_id, lit_start, disp_date, officer_payout,
                    high_payout_suit, use_of_force_allegation, assault_battery_allegation,
                    malicious_prosecution_allegation, false_arrest_imprison_allegation
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(docket_number, tax_id) DO UPDATE SET
                    lit_start = excluded.lit_start,
                    disp_date = excluded.disp_date,
                    officer_payout = excluded.officer_payout,
                    high_payout_suit = excluded.high_payout_suit,
                    use_of_force_allegation = excluded.use_of_force_allegation,
                    assault_battery_allegation = excluded.assault_battery_allegation,
                    malicious_prosecution_allegation = excluded.malicious_prosecution_allegation,
                    false_arrest_imprison_allegation = excluded.false_arrest_imprison_allegation",
            )?;
            for l in lawsuits {
                stmt.execute(params![
                    &l.docket_number,
                    l.tax_id,
                    date_text(l.lit_start),
                    date_text(l.disp_date),
                    l.officer_payout,
                    l.high_payout_suit as i32,
                    l.allegations[0] as i32,
                    l.allegations[1] as i32,
                    l.allegations[2] as i32,
                    l.allegations[3] as i32,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// All lawsuits ordered by (docket_number, tax_id).
    pub fn load_lawsuits(&self) -> PipelineResult<Vec<LawsuitEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT docket_number, tax_id, lit_start, disp_date, officer_payout,
                    high_payout_suit, use_of_force_allegation, assault_battery_allegation,
                    malicious_prosecution_allegation, false_arrest_imprison_allegation
             FROM lawsuit ORDER BY docket_number ASC, tax_id ASC",
        )?;
        let rows = stmt
            .query_map([], lawsuit_row_mapper)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(unwrap_conversion)?;
        Ok(rows)
    }

    // ── Roster and career dates ────────────────────────────────────

    pub fn insert_roster(&self, tax_ids: &[TaxId]) -> PipelineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO roster (tax_id) VALUES (?1)")?;
            for id in tax_ids {
                stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn roster_tax_ids(&self) -> PipelineResult<Vec<TaxId>> {
        let mut stmt = self.conn.prepare("SELECT tax_id FROM roster ORDER BY tax_id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<TaxId>, _>>()?;
        Ok(ids)
    }

    pub fn upsert_career_dates(&self, careers: &[CareerDates]) -> PipelineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO career_dates (tax_id, career_start_date, career_end_date)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(tax_id) DO UPDATE SET
                    career_start_date = excluded.career_start_date,
                    career_end_date = excluded.career_end_date",
            )?;
            for c in careers {
                stmt.execute(params![
                    c.tax_id,
                    date_text(c.career_start_date),
                    date_text(c.career_end_date),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load_career_dates(&self) -> PipelineResult<Vec<CareerDates>> {
        let mut stmt = self.conn.prepare(
            "SELECT tax_id, career_start_date, career_end_date
             FROM career_dates ORDER BY tax_id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CareerDates {
                    tax_id: row.get(0)?,
                    career_start_date: stored_date("career_start_date", row.get(1)?)?,
                    career_end_date: stored_date("career_end_date", row.get(2)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(unwrap_conversion)?;
        Ok(rows)
    }

    // ── Observation table ──────────────────────────────────────────

    /// Write the observation table once. Returns false (and writes
    /// nothing) if one is already stored.
    pub fn write_observation_table(&self, table: &ObservationTable) -> PipelineResult<bool> {
        if self.row_count("observation")? > 0 {
            return Ok(false);
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO observation (tax_id, observation_date) VALUES (?1, ?2)",
            )?;
            for key in table.keys() {
                stmt.execute(params![key.tax_id, key.observation_date.format(DATE_FORMAT).to_string()])?;
            }
        }
        tx.commit()?;
        Ok(true)
    }

    pub fn load_observation_table(&self) -> PipelineResult<Option<ObservationTable>> {
        let mut stmt = self.conn.prepare(
            "SELECT tax_id, observation_date FROM observation ORDER BY rowid ASC",
        )?;
        let keys = stmt
            .query_map([], |row| {
                let date_text: String = row.get(1)?;
                let date = stored_date("observation_date", Some(date_text))?.ok_or_else(|| {
                    conversion_error(PipelineError::InvalidDate {
                        column: "observation_date".into(),
                        value: String::new(),
                    })
                })?;
                Ok(ObservationKey::new(row.get(0)?, date))
            })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(unwrap_conversion)?;
        if keys.is_empty() {
            return Ok(None);
        }
        Ok(Some(ObservationTable::from_keys(keys)))
    }
}
