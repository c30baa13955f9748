//! Datasets
//!
//! This module implements the dataset struct and various helper traits to extend its
//! functionality.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ScalarOperand};

use num_traits::{FromPrimitive, NumAssignOps, NumCast};
use rand::distributions::uniform::SampleUniform;

use std::cmp::PartialOrd;
use std::fmt;
use std::hash::Hash;
use std::iter::Sum;

mod impl_dataset;
mod impl_records;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. They are used in the records of a
/// dataset and for split thresholds of fitted trees.
pub trait Float:
    FromPrimitive
    + num_traits::Float
    + PartialOrd
    + Sync
    + Send
    + Default
    + fmt::Display
    + fmt::Debug
    + Sum
    + NumAssignOps
    + SampleUniform
    + ScalarOperand
    + approx::AbsDiffEq
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}

impl Float for f64 {}

/// Discrete labels
///
/// Labels are countable, comparable and hashable. Boolean (binary task) and usize class indices
/// are supported.
pub trait Label: PartialEq + Eq + Hash + Clone {}

impl Label for bool {}
impl Label for usize {}

/// DatasetBase
///
/// This is the fundamental structure of a dataset. It contains a number of records about the data
/// and may contain targets, weights and feature names. In order to keep the type complexity low
/// the dataset base is only generic over the records and targets and introduces a trait bound on
/// the records. `weights` and `feature_names`, on the other hand, are always assumed to be owned
/// and copied when views are created.
///
/// # Fields
///
/// * `records`: a two-dimensional matrix with dimensionality (nsamples, nfeatures)
/// * `targets`: a one-dimensional array with one target per sample
/// * `weights`: optional weights for each sample with dimensionality (nsamples)
/// * `feature_names`: optional descriptive feature names with dimensionality (nfeatures)
///
/// # Trait bounds
///
/// * `R: Records`: generic over feature matrices
/// * `T`: generic over anything which can be used as targets, mostly `ndarray` vectors
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBase<R, T>
where
    R: Records,
{
    pub records: R,
    pub targets: T,

    pub weights: Array1<f32>,
    feature_names: Vec<String>,
}

/// Dataset
///
/// The most commonly used typed of dataset. It contains a number of records
/// stored as an `Array2` and each record corresponds to a single target stored
/// in an `Array1`.
pub type Dataset<D, T> = DatasetBase<Array2<D>, Array1<T>>;

/// DatasetView
///
/// A read only view of a Dataset
pub type DatasetView<'a, D, T> = DatasetBase<ArrayView2<'a, D>, ArrayView1<'a, T>>;

/// Record trait
pub trait Records: Sized {
    type Elem;

    fn nsamples(&self) -> usize;
    fn nfeatures(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array2};
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn dataset_implements_required_methods() {
        let mut rng = SmallRng::seed_from_u64(42);

        let dataset = Dataset::new(array![[1., 2.], [3., 4.], [5., 6.]], array![0usize, 1, 1]);
        assert_eq!(dataset.nsamples(), 3);
        assert_eq!(dataset.nfeatures(), 2);

        // Shuffle keeps records and targets aligned
        let shuffled = dataset.shuffle(&mut rng);
        for (row, target) in shuffled.records().rows().into_iter().zip(shuffled.targets()) {
            let expected = if row[0] < 2. { 0 } else { 1 };
            assert_eq!(*target, expected);
        }

        let linspace: Array1<f64> = Array1::linspace(0.0, 0.8, 100);
        let records = Array2::from_shape_vec((50, 2), linspace.to_vec()).unwrap();
        let targets: Array1<f64> = Array1::linspace(0.0, 0.8, 50);
        let dataset = Dataset::from((records, targets));

        // Split with ratio view
        let dataset_view = dataset.view();
        let (train, val) = dataset_view.split_with_ratio(0.5);
        assert_eq!(train.nsamples(), 25);
        assert_eq!(val.nsamples(), 25);

        // Split with ratio
        let (train, val) = dataset.split_with_ratio(0.25);
        assert_eq!(train.targets().dim(), 13);
        assert_eq!(val.targets().dim(), 37);
        assert_eq!(train.records().dim().0, 13);
        assert_eq!(val.records().dim().0, 37);
        assert_abs_diff_eq!(
            val.records()[(0, 0)],
            train.records()[(12, 1)] + 0.8 / 99.,
            epsilon = 1e-12
        );
    }

    #[test]
    fn feature_names_default_to_indices() {
        let dataset = Dataset::new(array![[1., 2., 3.]], array![true]);
        assert_eq!(
            dataset.feature_names(),
            vec!["feature-0", "feature-1", "feature-2"]
        );

        let dataset = dataset.with_feature_names(vec!["temp", "bpm", "spo2"]);
        assert_eq!(dataset.feature_names(), vec!["temp", "bpm", "spo2"]);
    }

    #[test]
    fn label_frequencies_respect_weights() {
        let dataset = Dataset::new(
            array![[1., 2.], [2., 1.], [0., 0.], [2., 2.]],
            array![0usize, 1, 2, 2],
        );

        assert_eq!(dataset.labels(), vec![0, 1, 2]);

        let freqs = dataset.label_frequencies();
        assert_eq!(*freqs.get(&0).unwrap() as usize, 1);
        assert_eq!(*freqs.get(&1).unwrap() as usize, 1);
        assert_eq!(*freqs.get(&2).unwrap() as usize, 2);

        let dataset = dataset.with_weights(array![1., 1., 0.5, 3.]);
        let freqs = dataset.label_frequencies();
        assert_abs_diff_eq!(*freqs.get(&2).unwrap(), 3.5);
        assert_abs_diff_eq!(dataset.weight_for(3), 3.);
    }

    #[test]
    fn select_keeps_weights_and_names() {
        let dataset = Dataset::new(array![[1.], [2.], [3.]], array![0usize, 1, 0])
            .with_weights(array![0.5, 1., 2.])
            .with_feature_names(vec!["temp"]);

        let selected = dataset.select(&[2, 2, 0]);
        assert_eq!(selected.records(), &array![[3.], [3.], [1.]]);
        assert_eq!(selected.targets(), &array![0, 0, 0]);
        assert_eq!(selected.weights(), Some(&[2., 2., 0.5][..]));
        assert_eq!(selected.feature_names(), vec!["temp"]);
    }

    #[test]
    fn map_targets_keeps_records() {
        let dataset = Dataset::new(array![[1.], [2.]], array![true, false]);
        let mapped = dataset.map_targets(|x| *x as usize);

        assert_eq!(mapped.targets(), &array![1, 0]);
        assert_eq!(mapped.records(), &array![[1.], [2.]]);
    }
}
