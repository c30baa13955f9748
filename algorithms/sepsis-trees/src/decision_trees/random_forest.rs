//! Random Forest Classifier
//!
//! An ensemble of decision trees, each trained on a bootstrap sample of the data and drawing a
//! random subset of candidate features at every split.

use std::marker::PhantomData;

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use rand::{rngs::SmallRng, rngs::StdRng, Rng, SeedableRng};
use sepsis_forest::prelude::*;
use sepsis_forest::{Dataset, ParamGuard};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use super::algorithm::{resolve_n_classes, DecisionTree};
use super::{DecisionTreeParams, MaxFeatures, SplitQuality};

/// A fitted ensemble of decision trees
///
/// All trees share the same number of classes, so their per-node class weights line up
/// regardless of which classes ended up in a bootstrap sample.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestClassifier<F: Float> {
    trees: Vec<DecisionTree<F>>,
    n_classes: usize,
    num_features: usize,
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestValidParams<F> {
    n_trees: usize,
    max_depth: Option<usize>,
    max_features: MaxFeatures,
    bootstrap: bool,
    n_classes: Option<usize>,
    split_quality: SplitQuality,
    seed: u64,
    phantom: PhantomData<F>,
}

impl<F: Float> RandomForestValidParams<F> {
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub fn n_classes(&self) -> Option<usize> {
        self.n_classes
    }

    pub fn split_quality(&self) -> SplitQuality {
        self.split_quality
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Parameters of a single member tree
    fn tree_params(&self, n_classes: Option<usize>, seed: u64) -> DecisionTreeParams<F> {
        DecisionTree::params()
            .split_quality(self.split_quality)
            .max_depth(self.max_depth)
            .max_features(self.max_features)
            .n_classes(n_classes)
            .seed(seed)
    }
}

/// The set of hyperparameters that can be specified for fitting a
/// [random forest](struct.RandomForestClassifier.html).
///
/// ### Example
///
/// ```rust
/// use sepsis_trees::{MaxFeatures, RandomForestParams};
/// use sepsis_forest::prelude::*;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let dataset = sepsis_datasets::sepsis(300, &mut StdRng::seed_from_u64(42));
///
/// let forest = RandomForestParams::new(10)
///     .max_features(MaxFeatures::Sqrt)
///     .n_classes(Some(2))
///     .fit(&dataset)
///     .unwrap();
///
/// assert_eq!(forest.ntrees(), 10);
/// let accuracy = forest.predict(&dataset).confusion_matrix(&dataset).unwrap().accuracy();
/// assert!(accuracy > 0.9);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestParams<F> {
    inner: RandomForestValidParams<F>,
}

impl<F: Float> RandomForestParams<F> {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `max_depth = None`
    /// * `max_features = MaxFeatures::Sqrt`
    /// * `bootstrap = true`
    /// * `n_classes = None`
    /// * `split_quality = SplitQuality::Gini`
    /// * `seed = 42`
    pub fn new(n_trees: usize) -> Self {
        Self {
            inner: RandomForestValidParams {
                n_trees,
                max_depth: None,
                max_features: MaxFeatures::Sqrt,
                bootstrap: true,
                n_classes: None,
                split_quality: SplitQuality::Gini,
                seed: 42,
                phantom: PhantomData,
            },
        }
    }

    /// Sets the optional limit to the depth of every tree
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.inner.max_depth = depth;
        self
    }

    /// Sets the number of features drawn as split candidates at every node
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.inner.max_features = max_features;
        self
    }

    /// Whether every tree is fitted on a bootstrap sample or on the whole dataset
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.inner.bootstrap = bootstrap;
        self
    }

    /// Fixes the number of classes shared by all trees
    ///
    /// When `None`, the number of classes is the largest label of the full dataset plus one.
    pub fn n_classes(mut self, n_classes: Option<usize>) -> Self {
        self.inner.n_classes = n_classes;
        self
    }

    pub fn split_quality(mut self, split_quality: SplitQuality) -> Self {
        self.inner.split_quality = split_quality;
        self
    }

    /// Sets the seed of the generator from which every tree draws its own seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.inner.seed = seed;
        self
    }
}

impl<F: Float> RandomForestClassifier<F> {
    #[allow(clippy::new_ret_no_self)]
    pub fn params(n_trees: usize) -> RandomForestParams<F> {
        RandomForestParams::new(n_trees)
    }
}

impl<F: Float> ParamGuard for RandomForestParams<F> {
    type Checked = RandomForestValidParams<F>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.inner.n_trees == 0 {
            return Err(Error::Parameters(
                "The number of trees should be at least one".to_string(),
            ));
        }
        self.inner
            .tree_params(self.inner.n_classes, self.inner.seed)
            .check()?;

        Ok(&self.inner)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.inner)
    }
}

/// Draws `nsamples` rows with replacement
fn bootstrap<F: Float, D, T>(
    dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>,
    rng: &mut impl Rng,
) -> Dataset<F, usize>
where
    D: Data<Elem = F>,
    T: Data<Elem = usize>,
{
    let n = dataset.nsamples();
    let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

    dataset.select(&indices)
}

impl<F: Float, D, T> Fit<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>, Error>
    for RandomForestValidParams<F>
where
    D: Data<Elem = F>,
    T: Data<Elem = usize>,
{
    type Object = RandomForestClassifier<F>;

    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>,
    ) -> Result<Self::Object> {
        if dataset.targets().len() != dataset.nsamples() {
            return Err(Error::MismatchedShapes(
                dataset.nsamples(),
                dataset.targets().len(),
            ));
        }

        // resolved on the full dataset, a bootstrap sample may miss the largest label
        let n_classes = resolve_n_classes(self.n_classes, dataset.targets().iter().copied())?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_trees);

        for _ in 0..self.n_trees {
            let tree_seed = rng.gen::<u64>();
            let params = self.tree_params(Some(n_classes), tree_seed);

            let tree = if self.bootstrap {
                let mut tree_rng = SmallRng::seed_from_u64(tree_seed);
                params.fit(&bootstrap(dataset, &mut tree_rng))?
            } else {
                params.fit(dataset)?
            };
            trees.push(tree);
        }

        Ok(RandomForestClassifier {
            trees,
            n_classes,
            num_features: dataset.nfeatures(),
        })
    }
}

impl<F: Float> RandomForestClassifier<F> {
    /// The fitted trees in the order they were grown
    pub fn trees(&self) -> &[DecisionTree<F>] {
        &self.trees
    }

    pub fn ntrees(&self) -> usize {
        self.trees.len()
    }

    /// Width of the class weights of every node of every tree
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Mean of the feature importances of all trees
    pub fn feature_importance(&self) -> Vec<F> {
        let mut importance = vec![F::zero(); self.num_features];
        for tree in &self.trees {
            for (acc, imp) in importance.iter_mut().zip(tree.feature_importance()) {
                *acc += imp;
            }
        }

        let ntrees = F::cast(self.trees.len());
        importance.into_iter().map(|x| x / ntrees).collect()
    }

    /// Mean of the class probabilities predicted by every tree
    pub fn predict_probabilities(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let mut probabilities = Array2::zeros((x.nrows(), self.n_classes));
        for tree in &self.trees {
            probabilities += &tree.predict_probabilities(x);
        }

        probabilities / F::cast(self.trees.len())
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<usize>>
    for RandomForestClassifier<F>
{
    /// Predicts the class with the largest mean probability, the first one on ties
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        let probabilities = self.predict_probabilities(x);
        for (row, target) in probabilities.axis_iter(Axis(0)).zip(y.iter_mut()) {
            let mut best = 0;
            for (class, p) in row.iter().enumerate() {
                if *p > row[best] {
                    best = class;
                }
            }
            *target = best;
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use ndarray_rand::{rand_distr::Uniform, RandomExt};

    fn two_blobs(n: usize) -> Dataset<f64, usize> {
        let mut rng = SmallRng::seed_from_u64(1);
        let records = Array::random_using((n, 3), Uniform::new(0., 1.), &mut rng);
        let targets = records
            .rows()
            .into_iter()
            .map(|row| (row[0] > 0.5) as usize)
            .collect::<Array1<_>>();

        Dataset::new(records, targets)
    }

    #[test]
    fn rejects_zero_trees() {
        assert!(RandomForestParams::<f64>::new(0).check().is_err());
        assert!(RandomForestParams::<f64>::new(1)
            .max_features(MaxFeatures::Count(0))
            .check()
            .is_err());
    }

    #[test]
    fn same_seed_same_forest() -> Result<()> {
        let dataset = two_blobs(100);

        let first = RandomForestParams::new(5).seed(3).fit(&dataset)?;
        let second = RandomForestParams::new(5).seed(3).fit(&dataset)?;
        let other = RandomForestParams::new(5).seed(4).fit(&dataset)?;

        assert_eq!(first, second);
        assert_ne!(first, other);

        Ok(())
    }

    #[test]
    fn trees_differ_within_a_forest() -> Result<()> {
        let dataset = two_blobs(100);
        let forest = RandomForestParams::new(2).fit(&dataset)?;

        assert_eq!(forest.ntrees(), 2);
        assert_ne!(forest.trees()[0], forest.trees()[1]);

        Ok(())
    }

    #[test]
    fn probabilities_are_averaged() -> Result<()> {
        let dataset = two_blobs(200);
        let forest = RandomForestParams::new(10).fit(&dataset)?;

        let probabilities = forest.predict_probabilities(dataset.records());
        assert_eq!(probabilities.dim(), (200, 2));
        for row in probabilities.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-6);
        }

        let cm = forest.predict(&dataset).confusion_matrix(&dataset)?;
        assert!(cm.accuracy() > 0.95);

        let importance = forest.feature_importance();
        assert_eq!(importance.len(), dataset.nfeatures());
        assert!(importance[0] > importance[1] && importance[0] > importance[2]);

        Ok(())
    }

    #[test]
    fn without_bootstrap_every_tree_sees_all_rows() -> Result<()> {
        let dataset = two_blobs(50);
        let forest = RandomForestParams::new(3)
            .bootstrap(false)
            .max_features(MaxFeatures::All)
            .fit(&dataset)?;

        for tree in forest.trees() {
            let weight: f32 = tree.root_node().class_weights().iter().sum();
            assert_abs_diff_eq!(weight, 50.0);
        }

        Ok(())
    }

    #[test]
    fn single_class_keeps_pinned_width() -> Result<()> {
        let dataset = Dataset::new(array![[1., 2.], [3., 4.], [5., 6.]], array![0usize, 0, 0]);
        let forest = RandomForestParams::new(4).n_classes(Some(2)).fit(&dataset)?;

        assert_eq!(forest.n_classes(), 2);
        for tree in forest.trees() {
            assert_eq!(tree.node_count(), 1);
            assert_eq!(tree.root_node().class_weights().len(), 2);
        }
        assert_eq!(forest.predict(dataset.records()), array![0usize, 0, 0]);

        Ok(())
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let dataset: Dataset<f64, usize> = Dataset::new(Array2::zeros((0, 3)), Array1::zeros(0));
        let result = RandomForestParams::new(3).fit(&dataset);

        assert!(matches!(result, Err(Error::NotEnoughSamples)));
    }
}
