use super::PanelStore;
use crate::{
    error::{PipelineError, PipelineResult},
    folds::FoldAssignment,
    observation::ObservationKey,
    panel::PanelTable,
    types::{Date, DATE_FORMAT},
};
use rusqlite::{params, params_from_iter, types::Value};

/// Quote an SQL identifier. Panel column names contain dots.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl PanelStore {
    // ── Wide panels ────────────────────────────────────────────────

    /// Replace `table` with the contents of `panel`: the key columns
    /// followed by one REAL column per panel column, in panel order.
    pub fn write_panel(&self, table: &str, panel: &PanelTable) -> PipelineResult<()> {
        let ident = quote_ident(table);
        let column_defs: Vec<String> = panel
            .columns()
            .iter()
            .map(|c| format!("{} REAL NOT NULL DEFAULT 0", quote_ident(c)))
            .collect();
        let mut create = format!(
            "CREATE TABLE {ident} (tax_id INTEGER NOT NULL, observation_date TEXT NOT NULL"
        );
        for def in &column_defs {
            create.push_str(", ");
            create.push_str(def);
        }
        create.push_str(", PRIMARY KEY (tax_id, observation_date))");

        let placeholders = vec!["?"; panel.columns().len() + 2].join(", ");
        let insert = format!("INSERT INTO {ident} VALUES ({placeholders})");

        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {ident};"))?;
        tx.execute(&create, [])?;
        {
            let mut stmt = tx.prepare(&insert)?;
            for (key, row) in panel.rows() {
                let mut values = Vec::with_capacity(row.len() + 2);
                values.push(Value::Integer(key.tax_id));
                values.push(Value::Text(key.observation_date.format(DATE_FORMAT).to_string()));
                values.extend(row.iter().map(|v| Value::Real(*v)));
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        log::debug!("wrote panel '{table}': {} rows", panel.len());
        Ok(())
    }

    /// Read a panel written by `write_panel`, in its stored row order.
    pub fn load_panel(&self, table: &str) -> PipelineResult<PanelTable> {
        if !self.table_exists(table)? {
            return Err(PipelineError::MissingSnapshot { table: table.to_string() });
        }
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid ASC", quote_ident(table)))?;
        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .skip(2)
            .map(|c| c.to_string())
            .collect();
        let width = columns.len();

        let raw = stmt
            .query_map([], |row| {
                let tax_id: i64 = row.get(0)?;
                let date: String = row.get(1)?;
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(row.get::<_, f64>(i + 2)?);
                }
                Ok((tax_id, date, values))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let rows = raw
            .into_iter()
            .map(|(tax_id, date, values)| {
                let observation_date = Date::parse_from_str(&date, DATE_FORMAT).map_err(|_| {
                    PipelineError::InvalidDate {
                        column: "observation_date".into(),
                        value: date.clone(),
                    }
                })?;
                Ok((ObservationKey::new(tax_id, observation_date), values))
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        Ok(PanelTable::from_parts(columns, rows))
    }

    // ── Folds ──────────────────────────────────────────────────────

    pub fn write_fold_assignments(&self, assignments: &[FoldAssignment]) -> PipelineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cv_fold", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO cv_fold (iteration, tax_id, fold) VALUES (?1, ?2, ?3)")?;
            for assignment in assignments {
                for (tax_id, fold) in assignment.officers() {
                    stmt.execute(params![assignment.iteration, tax_id, fold as i64])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// (iteration, tax_id, fold) ordered by iteration then officer.
    pub fn load_fold_rows(&self) -> PipelineResult<Vec<(u32, i64, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT iteration, tax_id, fold FROM cv_fold ORDER BY iteration ASC, tax_id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)? as u32,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)? as usize,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
