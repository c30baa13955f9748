use super::{Dataset, DatasetBase, DatasetView, Label, Records};
use crate::traits::{Predict, PredictInplace};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use rand::{seq::SliceRandom, Rng};
use std::collections::HashMap;

/// Implementation without constraints on records and targets
///
/// This implementation block provides methods for the creation and mutation of datasets. This
/// includes swapping the targets, return the records etc.
impl<R: Records, T> DatasetBase<R, T> {
    /// Create a new dataset from records and targets
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = Dataset::new(records, targets);
    /// ```
    pub fn new(records: R, targets: T) -> DatasetBase<R, T> {
        DatasetBase {
            records,
            targets,
            weights: Array1::zeros(0),
            feature_names: Vec::new(),
        }
    }

    /// Returns reference to targets
    pub fn targets(&self) -> &T {
        &self.targets
    }

    /// Returns reference to records
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Return optional weights for all records
    pub fn weights(&self) -> Option<&[f32]> {
        if !self.weights.is_empty() {
            self.weights.as_slice()
        } else {
            None
        }
    }

    /// Return a single weight
    ///
    /// The weight of the `idx`th record is returned. If no weights are specified, then all
    /// records are unweighted and return `1.0`.
    pub fn weight_for(&self, idx: usize) -> f32 {
        self.weights.get(idx).copied().unwrap_or(1.0)
    }

    /// Returns feature names
    ///
    /// A feature name gives a human-readable string describing the purpose of a single feature.
    /// This allow the reader to understand its purpose while analysing results, for example
    /// exported decision trees.
    pub fn feature_names(&self) -> Vec<String> {
        if !self.feature_names.is_empty() {
            self.feature_names.clone()
        } else {
            (0..self.records.nfeatures())
                .map(|idx| format!("feature-{}", idx))
                .collect()
        }
    }

    /// Return the number of samples in the dataset
    pub fn nsamples(&self) -> usize {
        self.records.nsamples()
    }

    /// Return the number of features of every record
    pub fn nfeatures(&self) -> usize {
        self.records.nfeatures()
    }

    /// Updates the weights of a dataset
    pub fn with_weights(mut self, weights: Array1<f32>) -> DatasetBase<R, T> {
        self.weights = weights;

        self
    }

    /// Updates the feature names of a dataset
    pub fn with_feature_names<I: Into<String>>(mut self, names: Vec<I>) -> DatasetBase<R, T> {
        let feature_names = names.into_iter().map(|x| x.into()).collect();

        self.feature_names = feature_names;

        self
    }
}

impl<F: Clone, L: Clone, D: Data<Elem = F>, S: Data<Elem = L>>
    DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>
{
    /// Creates a view of a dataset
    pub fn view(&self) -> DatasetView<'_, F, L> {
        DatasetBase::new(self.records.view(), self.targets.view())
            .with_weights(self.weights.clone())
            .with_feature_names(self.feature_names.clone())
    }

    /// Select the given rows into a new, owned dataset
    ///
    /// Indices may repeat, which is how bootstrap samples are drawn. Weights follow their
    /// records and feature names are kept.
    pub fn select(&self, indices: &[usize]) -> Dataset<F, L> {
        let records = self.records.select(Axis(0), indices);
        let targets = self.targets.select(Axis(0), indices);
        let weights = if self.weights.is_empty() {
            Array1::zeros(0)
        } else {
            self.weights.select(Axis(0), indices)
        };

        DatasetBase::new(records, targets)
            .with_weights(weights)
            .with_feature_names(self.feature_names.clone())
    }

    /// Shuffle the samples of a dataset
    pub fn shuffle<R: Rng>(&self, rng: &mut R) -> Dataset<F, L> {
        let mut indices = (0..self.nsamples()).collect::<Vec<_>>();
        indices.shuffle(rng);

        self.select(&indices)
    }

    /// Map targets with a function `f`
    ///
    /// # Example
    ///
    /// ```
    /// use ndarray::array;
    /// use sepsis_forest::Dataset;
    ///
    /// let dataset = Dataset::new(array![[38.5, 110.], [36.6, 72.]], array![1usize, 0])
    ///     .map_targets(|x| *x == 1);
    ///
    /// // dataset has now boolean targets
    /// assert_eq!(dataset.targets(), &array![true, false]);
    /// ```
    pub fn map_targets<T, G: FnMut(&L) -> T>(
        self,
        fnc: G,
    ) -> DatasetBase<ArrayBase<D, Ix2>, Array1<T>> {
        let DatasetBase {
            records,
            targets,
            weights,
            feature_names,
        } = self;

        DatasetBase {
            records,
            targets: targets.map(fnc),
            weights,
            feature_names,
        }
    }
}

impl<F: Clone, L: Label, D: Data<Elem = F>, S: Data<Elem = L>>
    DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>
{
    /// Return the distinct labels in order of their first appearance
    pub fn labels(&self) -> Vec<L> {
        let mut labels: Vec<L> = Vec::new();
        for label in self.targets.iter() {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }

        labels
    }

    /// Calculates label frequencies from a dataset
    ///
    /// The frequencies are weighted with the sample weights, unweighted samples count as `1.0`.
    pub fn label_frequencies(&self) -> HashMap<L, f32> {
        let mut freqs = HashMap::new();

        for (idx, label) in self.targets.iter().enumerate() {
            *freqs.entry(label.clone()).or_insert(0.0) += self.weight_for(idx);
        }

        freqs
    }
}

impl<F: Clone, L: Clone> Dataset<F, L> {
    /// Split dataset into two disjoint chunks
    ///
    /// This function splits the observations in a dataset into two disjoint chunks. The splitting
    /// threshold is calculated with the `ratio`. For example a ratio of `0.9` allocates 90% to the
    /// first chunks and 10% to the second. This is often used in training, validation splitting
    /// procedures.
    pub fn split_with_ratio(self, ratio: f32) -> (Self, Self) {
        let n = (self.nsamples() as f32 * ratio).ceil() as usize;
        let n = n.min(self.nsamples());

        let first = (0..n).collect::<Vec<_>>();
        let second = (n..self.nsamples()).collect::<Vec<_>>();

        (self.select(&first), self.select(&second))
    }
}

impl<'a, F, L> DatasetView<'a, F, L> {
    /// Split dataset view into two disjoint views
    ///
    /// The first view holds `ceil(nsamples * ratio)` observations, the second view the rest.
    pub fn split_with_ratio(&self, ratio: f32) -> (Self, Self) {
        let n = (self.nsamples() as f32 * ratio).ceil() as usize;
        let n = n.min(self.nsamples());

        let (first_records, second_records) = self.records.split_at(Axis(0), n);
        let (first_targets, second_targets) = self.targets.split_at(Axis(0), n);

        let (first_weights, second_weights) = if self.weights.is_empty() {
            (Array1::zeros(0), Array1::zeros(0))
        } else {
            let (first, second) = self.weights.view().split_at(Axis(0), n);
            (first.to_owned(), second.to_owned())
        };

        let first = DatasetBase::new(first_records, first_targets)
            .with_weights(first_weights)
            .with_feature_names(self.feature_names.clone());
        let second = DatasetBase::new(second_records, second_targets)
            .with_weights(second_weights)
            .with_feature_names(self.feature_names.clone());

        (first, second)
    }
}

impl<F, L> From<(Array2<F>, Array1<L>)> for Dataset<F, L> {
    fn from(rec_tar: (Array2<F>, Array1<L>)) -> Self {
        DatasetBase::new(rec_tar.0, rec_tar.1)
    }
}

impl<'a, D: Data, T, O> Predict<&'a ArrayBase<D, Ix2>, T> for O
where
    O: PredictInplace<ArrayBase<D, Ix2>, T>,
{
    fn predict(&self, records: &'a ArrayBase<D, Ix2>) -> T {
        let mut targets = self.default_target(records);
        self.predict_inplace(records, &mut targets);
        targets
    }
}

impl<'a, R: Records, T, S, O> Predict<&'a DatasetBase<R, T>, S> for O
where
    O: PredictInplace<R, S>,
{
    fn predict(&self, ds: &'a DatasetBase<R, T>) -> S {
        let mut targets = self.default_target(&ds.records);
        self.predict_inplace(&ds.records, &mut targets);
        targets
    }
}

impl<D: Data, T, O> Predict<ArrayBase<D, Ix2>, DatasetBase<ArrayBase<D, Ix2>, T>> for O
where
    O: PredictInplace<ArrayBase<D, Ix2>, T>,
{
    fn predict(&self, records: ArrayBase<D, Ix2>) -> DatasetBase<ArrayBase<D, Ix2>, T> {
        let mut targets = self.default_target(&records);
        self.predict_inplace(&records, &mut targets);
        DatasetBase::new(records, targets)
    }
}
