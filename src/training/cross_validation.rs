//! Stratified k-fold splitter

use crate::error::{ChurnError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single train/test split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Stratified, unshuffled k-fold splitter.
///
/// Each class is dealt round-robin over the folds in row order, classes in
/// label order, so every fold keeps roughly the overall class balance and
/// the assignment depends on `y` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossValidator {
    n_splits: usize,
}

impl Default for CrossValidator {
    fn default() -> Self {
        Self { n_splits: 5 }
    }
}

impl CrossValidator {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate train/test splits for labels `y`
    pub fn split(&self, y: &Array1<f64>) -> Result<Vec<CVSplit>> {
        let n_splits = self.n_splits;
        let n_samples = y.len();
        if n_splits < 2 {
            return Err(ChurnError::InvalidParameter {
                name: "n_splits".to_string(),
                value: n_splits.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if n_samples < n_splits {
            return Err(ChurnError::InvalidParameter {
                name: "n_samples".to_string(),
                value: n_samples.to_string(),
                reason: format!("must be >= n_splits ({})", n_splits),
            });
        }

        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in y.iter().enumerate() {
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }

        if let Some((class, indices)) = class_indices.iter().find(|(_, v)| v.len() < n_splits) {
            return Err(ChurnError::DegenerateFit(format!(
                "class {} has {} members, fewer than {} folds",
                class,
                indices.len(),
                n_splits
            )));
        }

        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        for indices in class_indices.values() {
            for (i, &idx) in indices.iter().enumerate() {
                folds[i % n_splits].push(idx);
            }
        }
        for fold in &mut folds {
            fold.sort_unstable();
        }

        let splits = (0..n_splits)
            .map(|fold_idx| {
                let test_indices = folds[fold_idx].clone();
                let train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                CVSplit {
                    train_indices,
                    test_indices,
                    fold_idx,
                }
            })
            .collect();

        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folds_cover_every_index_once() {
        let y = Array1::from_vec((0..23).map(|i| (i % 4 == 0) as u8 as f64).collect());
        let splits = CrossValidator::new(3).split(&y).unwrap();

        assert_eq!(splits.len(), 3);
        let mut seen: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..23).collect::<Vec<_>>());
        for split in &splits {
            assert_eq!(split.train_indices.len() + split.test_indices.len(), 23);
            assert!(split.test_indices.iter().all(|i| !split.train_indices.contains(i)));
        }
    }

    #[test]
    fn test_stratified_keeps_class_balance() {
        let y = Array1::from_vec((0..100).map(|i| if i % 4 == 0 { 1.0 } else { 0.0 }).collect());
        let splits = CrossValidator::default().split(&y).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            let positives = split.test_indices.iter().filter(|&&i| y[i] == 1.0).count();
            assert_eq!(split.test_indices.len(), 20);
            assert_eq!(positives, 5);
        }
    }

    #[test]
    fn test_round_robin_assignment() {
        let y = Array1::from_vec(vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
        let splits = CrossValidator::new(2).split(&y).unwrap();
        // Class 0 rows 0, 2, 4, 5 alternate; class 1 rows 1, 3 alternate.
        assert_eq!(splits[0].test_indices, vec![0, 1, 4]);
        assert_eq!(splits[1].test_indices, vec![2, 3, 5]);
        assert_eq!(splits[0].train_indices, vec![2, 3, 5]);
    }

    #[test]
    fn test_invalid_splits() {
        let y = Array1::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        assert!(CrossValidator::new(1).split(&y).is_err());
        assert!(CrossValidator::new(5).split(&y).is_err());

        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 1.0]);
        assert!(matches!(
            CrossValidator::new(2).split(&y),
            Err(ChurnError::DegenerateFit(_))
        ));
    }
}
