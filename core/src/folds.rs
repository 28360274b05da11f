//! Officer-grouped cross-validation folds.
//!
//! All rows of one officer land in the same fold, so a model is never
//! scored on an officer it was trained on. For each Monte Carlo
//! iteration, officers first get a shuffled pseudo-id; groups are then
//! visited largest first (pseudo-id breaks ties) and each is placed in
//! the fold holding the fewest rows so far.

use crate::{
    error::{PipelineError, PipelineResult},
    observation::ObservationKey,
    rng::IterationRng,
    types::TaxId,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct FoldAssignment {
    pub iteration: u32,
    pub n_splits:  usize,
    fold_of:       BTreeMap<TaxId, usize>,
}

impl FoldAssignment {
    pub fn assign(
        keys: &[ObservationKey],
        n_splits: usize,
        random_state: u64,
        iteration: u32,
    ) -> PipelineResult<Self> {
        let mut rows_per_officer: BTreeMap<TaxId, usize> = BTreeMap::new();
        for key in keys {
            *rows_per_officer.entry(key.tax_id).or_insert(0) += 1;
        }
        if n_splits < 2 || rows_per_officer.len() < n_splits {
            return Err(PipelineError::Config(format!(
                "cannot split {} officers into {n_splits} folds",
                rows_per_officer.len()
            )));
        }

        let mut officers: Vec<TaxId> = rows_per_officer.keys().copied().collect();
        IterationRng::new(random_state, iteration).shuffle(&mut officers);

        // (rows, pseudo_id, tax_id), largest group first.
        let mut groups: Vec<(usize, usize, TaxId)> = officers
            .iter()
            .enumerate()
            .map(|(pseudo_id, tax_id)| (rows_per_officer[tax_id], pseudo_id, *tax_id))
            .collect();
        groups.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut fold_rows = vec![0usize; n_splits];
        let mut fold_of = BTreeMap::new();
        for (rows, _, tax_id) in groups {
            let lightest = (0..n_splits)
                .min_by_key(|f| (fold_rows[*f], *f))
                .unwrap_or(0);
            fold_rows[lightest] += rows;
            fold_of.insert(tax_id, lightest);
        }

        log::debug!("iteration {iteration}: fold sizes {fold_rows:?}");
        Ok(Self { iteration, n_splits, fold_of })
    }

    pub fn fold_of(&self, tax_id: TaxId) -> Option<usize> {
        self.fold_of.get(&tax_id).copied()
    }

    pub fn officers(&self) -> impl Iterator<Item = (TaxId, usize)> + '_ {
        self.fold_of.iter().map(|(t, f)| (*t, *f))
    }

    /// `(train_rows, test_rows)` row indices into `keys`, one pair per fold.
    pub fn splits(&self, keys: &[ObservationKey]) -> Vec<(Vec<usize>, Vec<usize>)> {
        (0..self.n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) = (0..keys.len())
                    .partition(|i| self.fold_of(keys[*i].tax_id) == Some(fold));
                (train, test)
            })
            .collect()
    }
}
