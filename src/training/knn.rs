//! K-Nearest Neighbors classifier
//!
//! Euclidean distance with uniform neighbour weights. The positive-class
//! probability is the share of churned neighbours.

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

use super::models::{check_prediction_input, check_training_input, Classifier};
use crate::error::{ChurnError, Result};

/// K-Nearest Neighbors Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNClassifier {
    n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KNNClassifier {
    pub fn new(n_neighbors: usize) -> Result<Self> {
        if n_neighbors == 0 {
            return Err(ChurnError::InvalidParameter {
                name: "n_neighbors".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            n_neighbors,
            x_train: None,
            y_train: None,
        })
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Fit the classifier (stores training data)
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_training_input(x, y)?;
        if x.nrows() < self.n_neighbors {
            return Err(ChurnError::DegenerateFit(format!(
                "KNN needs at least {} training rows, got {}",
                self.n_neighbors,
                x.nrows()
            )));
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        debug!(k = self.n_neighbors, n_samples = x.nrows(), "KNN fitted");
        Ok(self)
    }

    fn fitted(&self) -> Result<(&Array2<f64>, &Array1<f64>)> {
        match (&self.x_train, &self.y_train) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(ChurnError::ModelNotFitted),
        }
    }

    /// Share of positive neighbours per row (parallelized over rows)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (x_train, y_train) = self.fitted()?;
        check_prediction_input(x, x_train.ncols())?;
        let k = self.n_neighbors;

        let probs: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let neighbors = find_k_nearest(x.row(i), x_train, y_train, k);
                positive_share(&neighbors)
            })
            .collect();

        Ok(Array1::from_vec(probs))
    }

    /// Predict class labels; class 1 only on a strict positive majority
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }
}

impl Classifier for KNNClassifier {
    fn n_features(&self) -> usize {
        self.x_train.as_ref().map_or(0, |x| x.ncols())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        KNNClassifier::predict(self, x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Option<Array1<f64>>> {
        KNNClassifier::predict_proba(self, x).map(Some)
    }
}

/// Max-heap entry keyed on distance, then training row index
#[derive(PartialEq)]
struct Neighbor {
    dist: f64,
    index: usize,
    label: f64,
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .partial_cmp(&other.dist)
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }
}

/// Find k nearest neighbors with a bounded max-heap, O(n log k).
/// Equal distances keep the earlier training row.
fn find_k_nearest(
    point: ArrayView1<f64>,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<Neighbor> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (index, row) in x_train.rows().into_iter().enumerate() {
        let dist = euclidean(point, row);
        let candidate = Neighbor {
            dist,
            index,
            label: y_train[index],
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(top) = heap.peek() {
            if candidate < *top {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    heap.into_vec()
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

fn positive_share(neighbors: &[Neighbor]) -> f64 {
    if neighbors.is_empty() {
        return 0.0;
    }
    let positives = neighbors.iter().filter(|n| n.label == 1.0).count();
    positives as f64 / neighbors.len() as f64
}
