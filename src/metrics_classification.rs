//! Common metrics for performance evaluation of classifier
//!
//! Scoring is essential for classification tasks. This module implements the confusion matrix and
//! the scores derived from it: precision, recall, accuracy and f1-score.
use std::collections::HashMap;
use std::fmt;

use ndarray::prelude::*;
use ndarray::Data;

use crate::dataset::{DatasetBase, Label, Records};
use crate::error::{Error, Result};

/// Return tuple of class index for each element of prediction and ground_truth
fn map_prediction_to_idx<L: Label>(
    prediction: &[L],
    ground_truth: &[L],
    classes: &[L],
) -> Vec<Option<(usize, usize)>> {
    // create a map from class label to index
    let set = classes
        .iter()
        .enumerate()
        .map(|(a, b)| (b, a))
        .collect::<HashMap<_, usize>>();

    // indices for every prediction
    ground_truth
        .iter()
        .zip(prediction.iter())
        .map(|(a, b)| set.get(&a).and_then(|x| set.get(&b).map(|y| (*x, *y))))
        .collect::<Vec<Option<_>>>()
}

/// Confusion matrix for multi-label evaluation
///
/// A confusion matrix shows predictions in a matrix, where rows correspond to target and columns
/// to predicted. The diagonal entries are correct predictions.
pub struct ConfusionMatrix<A> {
    matrix: Array2<f32>,
    members: Array1<A>,
}

impl<A> ConfusionMatrix<A> {
    /// Calculate precision for every class
    pub fn precision(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(0));

        self.matrix
            .diag()
            .iter()
            .zip(sum.iter())
            .map(|(a, b)| if *b > 0.0 { a / b } else { 0.0 })
            .collect()
    }

    /// Calculate recall for every class
    pub fn recall(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(1));

        self.matrix
            .diag()
            .iter()
            .zip(sum.iter())
            .map(|(a, b)| if *b > 0.0 { a / b } else { 0.0 })
            .collect()
    }

    /// Return mean accuracy
    pub fn accuracy(&self) -> f32 {
        self.matrix.diag().sum() / self.matrix.sum()
    }

    /// Return beta score for every class
    pub fn f_score(&self, beta: f32) -> Array1<f32> {
        let sb = beta * beta;
        let precision = self.precision();
        let recall = self.recall();

        precision
            .iter()
            .zip(recall.iter())
            .map(|(p, r)| {
                if p + r > 0.0 {
                    (1.0 + sb) * (p * r) / (sb * p + r)
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Return beta=1 score for every class
    pub fn f1_score(&self) -> Array1<f32> {
        self.f_score(1.0)
    }

    /// Return the classes in the order of the matrix rows and columns
    pub fn members(&self) -> &Array1<A> {
        &self.members
    }
}

/// Print a confusion matrix
impl<A: fmt::Display> fmt::Debug for ConfusionMatrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let len = self.matrix.len_of(Axis(0));
        writeln!(f)?;
        write!(f, "{: <10}", "classes")?;
        for i in 0..len {
            write!(f, " | {: <10}", self.members[i])?;
        }
        writeln!(f)?;

        for i in 0..len {
            write!(f, "{: <10}", self.members[i])?;

            for j in 0..len {
                write!(f, " | {: <10}", self.matrix[(i, j)])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Classification for multi-label evaluation
///
/// Contains a routine to calculate the confusion matrix, all other scores are derived from it.
pub trait ToConfusionMatrix<A, T> {
    fn confusion_matrix(&self, ground_truth: T) -> Result<ConfusionMatrix<A>>;
}

impl<L: Label + Ord, S: Data<Elem = L>, T: Data<Elem = L>> ToConfusionMatrix<L, &ArrayBase<S, Ix1>>
    for ArrayBase<T, Ix1>
{
    fn confusion_matrix(&self, ground_truth: &ArrayBase<S, Ix1>) -> Result<ConfusionMatrix<L>> {
        if self.len() != ground_truth.len() {
            return Err(Error::MismatchedShapes(self.len(), ground_truth.len()));
        }

        let prediction = self.to_vec();
        let ground_truth = ground_truth.to_vec();

        // create a sorted set of all labels seen in targets and predictions
        let mut classes = ground_truth
            .iter()
            .chain(prediction.iter())
            .cloned()
            .collect::<Vec<_>>();
        classes.sort();
        classes.dedup();

        // find indices to labels
        let indices = map_prediction_to_idx(&prediction, &ground_truth, &classes);

        // count each index tuple in the confusion matrix
        let mut confusion_matrix = Array2::zeros((classes.len(), classes.len()));
        for (i1, i2) in indices.into_iter().flatten() {
            confusion_matrix[(i1, i2)] += 1.0;
        }

        Ok(ConfusionMatrix {
            matrix: confusion_matrix,
            members: Array1::from(classes),
        })
    }
}

impl<L: Label + Ord, R: Records, S: Data<Elem = L>, T: Data<Elem = L>>
    ToConfusionMatrix<L, &DatasetBase<R, ArrayBase<S, Ix1>>> for ArrayBase<T, Ix1>
{
    fn confusion_matrix(
        &self,
        ground_truth: &DatasetBase<R, ArrayBase<S, Ix1>>,
    ) -> Result<ConfusionMatrix<L>> {
        self.confusion_matrix(ground_truth.targets())
    }
}

#[cfg(test)]
mod tests {
    use super::ToConfusionMatrix;
    use crate::Dataset;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    #[test]
    fn test_confusion_matrix() {
        let ground_truth = array![1usize, 1, 0, 1, 0, 1];
        let predicted = array![0usize, 1, 0, 1, 0, 1];

        let cm = predicted.confusion_matrix(&ground_truth).unwrap();

        assert_eq!(cm.members(), &array![0, 1]);
        assert_abs_diff_eq!(cm.accuracy(), 5.0 / 6.0_f32);
        assert_abs_diff_eq!(cm.precision(), array![2.0 / 3.0, 1.0], epsilon = 1e-6);
        assert_abs_diff_eq!(cm.recall(), array![1.0, 0.75], epsilon = 1e-6);
        assert_abs_diff_eq!(cm.f1_score(), array![0.8, 0.857_142_9], epsilon = 1e-6);
    }

    #[test]
    fn test_confusion_matrix_against_dataset() {
        let dataset = Dataset::new(array![[0.], [1.], [2.]], array![true, false, true]);
        let predicted = array![true, true, true];

        let cm = predicted.confusion_matrix(&dataset).unwrap();
        assert_abs_diff_eq!(cm.accuracy(), 2.0 / 3.0_f32);
    }

    #[test]
    fn test_mismatched_lengths() {
        let ground_truth: Array1<usize> = array![0, 1, 0];
        let predicted: Array1<usize> = array![0, 1];

        assert!(predicted.confusion_matrix(&ground_truth).is_err());
    }
}
