//! The observation table: the (officer, as-of date) backbone.
//!
//! RULE: The table is built once and read-only afterwards. Every feature
//! and outcome row is keyed to one of its rows.

use crate::types::{Date, TaxId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObservationKey {
    pub tax_id:           TaxId,
    pub observation_date: Date,
}

impl ObservationKey {
    pub fn new(tax_id: TaxId, observation_date: Date) -> Self {
        Self { tax_id, observation_date }
    }
}

/// One officer in the roster extract.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RosterRecord {
    pub tax_id: TaxId,
}

#[derive(Debug, Clone)]
pub struct ObservationTable {
    keys:  Vec<ObservationKey>,
    index: HashMap<ObservationKey, usize>,
}

impl ObservationTable {
    /// Every officer crossed with every date, officer-major.
    /// Duplicate ids or dates are collapsed.
    pub fn cross_product(tax_ids: &[TaxId], dates: &[Date]) -> Self {
        let ids: BTreeSet<TaxId> = tax_ids.iter().copied().collect();
        let dates: BTreeSet<Date> = dates.iter().copied().collect();
        let keys = ids
            .iter()
            .flat_map(|id| dates.iter().map(move |d| ObservationKey::new(*id, *d)))
            .collect();
        Self::from_keys(keys)
    }

    /// Wrap keys loaded from storage. Order is kept; duplicates are dropped.
    pub fn from_keys(keys: Vec<ObservationKey>) -> Self {
        let mut index = HashMap::with_capacity(keys.len());
        let mut unique = Vec::with_capacity(keys.len());
        for key in keys {
            if !index.contains_key(&key) {
                index.insert(key, unique.len());
                unique.push(key);
            }
        }
        Self { keys: unique, index }
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

    pub fn position(&self, key: &ObservationKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Distinct observation dates, ascending.
    pub fn dates(&self) -> Vec<Date> {
        let set: BTreeSet<Date> = self.keys.iter().map(|k| k.observation_date).collect();
        set.into_iter().collect()
    }

    /// Distinct officers, ascending.
    pub fn tax_ids(&self) -> Vec<TaxId> {
        let set: BTreeSet<TaxId> = self.keys.iter().map(|k| k.tax_id).collect();
        set.into_iter().collect()
    }
}
