//! Paired features and labels

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::DatasetError;
use crate::labels;

/// Features (one row per sample) with their labels
///
/// Every reordering goes through a single index list, so row `i` of the
/// features always stays with entry `i` of the labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledData {
    features: Array2<f64>,
    labels: Array1<f64>,
}

impl LabeledData {
    pub fn new(features: Array2<f64>, labels: Array1<f64>) -> Result<Self, DatasetError> {
        if features.nrows() != labels.len() {
            return Err(DatasetError::LengthMismatch {
                features: features.nrows(),
                labels: labels.len(),
            });
        }
        Ok(LabeledData { features, labels })
    }

    /// Builds a dataset from {0, 1} labels, stored as {-1, +1}
    pub fn from_binary_labels(
        features: Array2<f64>,
        binary: &Array1<i64>,
    ) -> Result<Self, DatasetError> {
        let quantum = labels::convert_to_quantum(binary).mapv(|q| q as f64);
        Self::new(features, quantum)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// A fresh random ordering of the sample indices
    pub fn permutation<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);
        indices
    }

    /// Rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> LabeledData {
        LabeledData {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// A copy with rows reordered by a random permutation
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> LabeledData {
        let order = self.permutation(rng);
        self.select(&order)
    }

    /// Contiguous chunks of `batch_size` taken along `order`; the last may be shorter
    pub fn batches<'a>(
        &'a self,
        order: &'a [usize],
        batch_size: usize,
    ) -> impl Iterator<Item = LabeledData> + 'a {
        order.chunks(batch_size.max(1)).map(move |chunk| self.select(chunk))
    }

    /// Iterates over `(feature row, label)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = (Vec<f64>, f64)> + '_ {
        self.features
            .outer_iter()
            .zip(self.labels.iter())
            .map(|(row, &label)| (row.to_vec(), label))
    }

    /// Splits into `(train, test)` after shuffling; `test_ratio` of the samples go to test
    pub fn train_test_split<R: Rng + ?Sized>(
        &self,
        test_ratio: f64,
        rng: &mut R,
    ) -> Result<(LabeledData, LabeledData), DatasetError> {
        if !(0.0..=1.0).contains(&test_ratio) {
            return Err(DatasetError::InvalidSplit(test_ratio.to_string()));
        }

        let n_test = (self.len() as f64 * test_ratio).round() as usize;
        let n_train = self.len() - n_test;
        let order = self.permutation(rng);

        Ok((self.select(&order[..n_train]), self.select(&order[n_train..])))
    }
}
