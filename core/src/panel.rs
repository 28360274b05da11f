//! Wide numeric panels keyed by observation.
//!
//! A `PanelTable` always has exactly one row per observation-table row,
//! in the observation table's order. Cells default to 0.0; there is no
//! null.

use crate::{
    observation::{ObservationKey, ObservationTable},
    types::{Date, TaxId},
};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelTable {
    columns: Vec<String>,
    keys:    Vec<ObservationKey>,
    /// Row-major, `keys.len()` rows of `columns.len()` values.
    values:  Vec<Vec<f64>>,
}

impl PanelTable {
    /// All-zero panel over every observation.
    pub fn zeroed(observations: &ObservationTable, columns: Vec<String>) -> Self {
        let width = columns.len();
        Self {
            keys: observations.keys().to_vec(),
            values: vec![vec![0.0; width]; observations.len()],
            columns,
        }
    }

    /// Rebuild from stored parts. Rows shorter than the header are padded
    /// with zeros.
    pub fn from_parts(columns: Vec<String>, rows: Vec<(ObservationKey, Vec<f64>)>) -> Self {
        let width = columns.len();
        let (keys, values) = rows
            .into_iter()
            .map(|(k, mut v)| {
                v.resize(width, 0.0);
                (k, v)
            })
            .unzip();
        Self { columns, keys, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn keys(&self) -> &[ObservationKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        self.values[row][column] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = (&ObservationKey, &[f64])> {
        self.keys.iter().zip(self.values.iter().map(Vec::as_slice))
    }

    /// Cell lookup by key and column name.
    pub fn get(&self, tax_id: TaxId, observation_date: Date, column: &str) -> Option<f64> {
        let key = ObservationKey::new(tax_id, observation_date);
        let row = self.keys.iter().position(|k| *k == key)?;
        let col = self.column_index(column)?;
        Some(self.values[row][col])
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let col = self.column_index(name)?;
        Some(self.values.iter().map(|r| r[col]).collect())
    }

    /// Left join `other` onto this panel by key; unmatched cells are 0.
    /// Column names of `other` that already exist here are skipped.
    pub fn left_join(&self, other: &PanelTable) -> PanelTable {
        let other_rows: HashMap<&ObservationKey, usize> =
            other.keys.iter().enumerate().map(|(i, k)| (k, i)).collect();
        let added: Vec<usize> = (0..other.columns.len())
            .filter(|i| !self.columns.contains(&other.columns[*i]))
            .collect();

        let mut columns = self.columns.clone();
        columns.extend(added.iter().map(|i| other.columns[*i].clone()));

        let values = self
            .keys
            .iter()
            .zip(&self.values)
            .map(|(key, row)| {
                let mut joined = row.clone();
                match other_rows.get(key) {
                    Some(r) => joined.extend(added.iter().map(|c| other.values[*r][*c])),
                    None => joined.extend(std::iter::repeat(0.0).take(added.len())),
                }
                joined
            })
            .collect();

        PanelTable { columns, keys: self.keys.clone(), values }
    }

    /// Keep only rows whose key satisfies `keep`.
    pub fn filter_rows(&self, keep: impl Fn(&ObservationKey) -> bool) -> PanelTable {
        let (keys, values) = self
            .keys
            .iter()
            .zip(&self.values)
            .filter(|(k, _)| keep(k))
            .map(|(k, v)| (*k, v.clone()))
            .unzip();
        PanelTable { columns: self.columns.clone(), keys, values }
    }
}
