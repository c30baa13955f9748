//! Decision trees fitted on an arena of nodes
//!
use std::collections::HashSet;

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

use super::NodeIter;
use super::{DecisionTreeValidParams, SplitQuality};
use sepsis_forest::{
    error::{Error, Result},
    traits::*,
    DatasetBase, Float,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// RowMask tracks observations
///
/// The decision tree algorithm splits observations at a certain split value for a specific feature. The
/// left and right children can then only use a certain number of observations. In order to track
/// that, the observations are masked with a boolean vector, hiding all observations which are not
/// applicable in a lower tree.
struct RowMask {
    mask: Vec<bool>,
    nsamples: usize,
}

impl RowMask {
    /// Generates a RowMask without hidden observations
    ///
    /// ### Parameters
    ///
    /// * `nsamples`: the total number of observations
    ///
    fn all(nsamples: usize) -> Self {
        RowMask {
            mask: vec![true; nsamples],
            nsamples,
        }
    }

    /// Generates a RowMask where all observations are hidden
    ///
    /// ### Parameters
    ///
    /// * `nsamples`: the total number of observations
    fn none(nsamples: usize) -> Self {
        RowMask {
            mask: vec![false; nsamples],
            nsamples: 0,
        }
    }

    /// Sets the observation at the specified index as visible
    ///
    /// ### Panics
    ///
    /// If `idx` is out of bounds
    ///
    fn mark(&mut self, idx: usize) {
        self.mask[idx] = true;
        self.nsamples += 1;
    }
}

/// Sorted values of observations with indices (always for a particular feature)
struct SortedIndex<F: Float> {
    sorted_values: Vec<(usize, F)>,
}

impl<F: Float> SortedIndex<F> {
    /// Sorts the values of a given feature in ascending order
    ///
    /// ### Returns
    ///
    /// A sorted vector of (index, value) pairs obtained by sorting the observations by
    /// the value of the specified feature.
    fn of_array_column(x: &ArrayBase<impl Data<Elem = F>, Ix2>, feature_idx: usize) -> Self {
        let sliced_column: Vec<F> = x.index_axis(Axis(1), feature_idx).to_vec();
        let mut pairs: Vec<(usize, F)> = sliced_column.into_iter().enumerate().collect();
        pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Greater));

        SortedIndex {
            sorted_values: pairs,
        }
    }

    /// The sorted (index, value) pairs of the observations visible in `mask`
    fn visible(&self, mask: &RowMask) -> Vec<(usize, F)> {
        self.sorted_values
            .iter()
            .filter(|(idx, _)| mask.mask[*idx])
            .copied()
            .collect()
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
/// A node in the arena of a decision tree
///
/// Children are referenced by their index in the arena. Internal nodes always have both
/// children, leaves have none.
pub struct TreeNode<F> {
    feature_idx: usize,
    split_value: F,
    impurity_decrease: F,
    left_child: Option<usize>,
    right_child: Option<usize>,
    class_weights: Vec<f32>,
    depth: usize,
}

impl<F: Float> TreeNode<F> {
    fn leaf(class_weights: Vec<f32>, depth: usize) -> Self {
        TreeNode {
            feature_idx: 0,
            split_value: F::zero(),
            impurity_decrease: F::zero(),
            left_child: None,
            right_child: None,
            class_weights,
            depth,
        }
    }

    /// Returns true if the node has no children
    pub fn is_leaf(&self) -> bool {
        self.left_child.is_none() && self.right_child.is_none()
    }

    /// Returns the depth of the node in the decision tree
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the arena indices of both children, first left then right
    pub fn children(&self) -> [Option<usize>; 2] {
        [self.left_child, self.right_child]
    }

    /// Return the split (feature index, value) and its impurity decrease
    pub fn split(&self) -> (usize, F, F) {
        (self.feature_idx, self.split_value, self.impurity_decrease)
    }

    /// Weighted number of training samples of every class which reached this node
    pub fn class_weights(&self) -> &[f32] {
        &self.class_weights
    }

    /// Returns the class with the largest weight, the first one on ties
    pub fn prediction(&self) -> usize {
        find_modal_class(&self.class_weights)
    }

    /// Returns the class weights of this node normalised to sum up to one
    pub fn probabilities(&self) -> Vec<f32> {
        let total = self.class_weights.iter().sum::<f32>();
        if total > 0.0 {
            self.class_weights.iter().map(|w| w / total).collect()
        } else {
            vec![0.0; self.class_weights.len()]
        }
    }
}

/// Everything the recursive node fitting needs besides the mask, the depth and the arena
struct NodeBuilder<'a, F: Float, D: Data<Elem = F>, T: Data<Elem = usize>> {
    data: &'a DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>,
    hyperparameters: &'a DecisionTreeValidParams<F>,
    sorted_indices: Vec<SortedIndex<F>>,
    n_classes: usize,
    nodes: Vec<TreeNode<F>>,
}

impl<'a, F: Float, D: Data<Elem = F>, T: Data<Elem = usize>> NodeBuilder<'a, F, D, T> {
    /// Weighted class frequencies of the visible observations
    fn class_weights(&self, mask: &RowMask) -> Vec<f32> {
        let mut weights = vec![0.0; self.n_classes];
        for (idx, class) in self.data.targets().iter().enumerate() {
            if mask.mask[idx] {
                weights[*class] += self.data.weight_for(idx);
            }
        }

        weights
    }

    fn impurity(&self, class_freq: &[f32]) -> f32 {
        match self.hyperparameters.split_quality() {
            SplitQuality::Gini => gini_impurity(class_freq),
            SplitQuality::Entropy => entropy(class_freq),
        }
    }

    /// Recursively fits the node and returns its index in the arena
    ///
    /// The node is pushed before its children, so the arena is in depth-first pre-order with
    /// the root at index zero.
    fn fit(&mut self, mask: &RowMask, depth: usize, rng: &mut SmallRng) -> usize {
        // compute weighted frequencies for target classes
        let parent_class_freq = self.class_weights(mask);
        let node_idx = self.nodes.len();
        self.nodes
            .push(TreeNode::leaf(parent_class_freq.clone(), depth));

        let parent_score = self.impurity(&parent_class_freq);

        // stay a leaf when we don't have enough samples, the maximal depth is reached or the
        // node is already pure
        if (mask.nsamples as f32) < self.hyperparameters.min_weight_split()
            || self
                .hyperparameters
                .max_depth()
                .map(|max_depth| depth >= max_depth)
                .unwrap_or(false)
            || parent_score <= f32::EPSILON
        {
            return node_idx;
        }

        let best = self.find_best_split(mask, &parent_class_freq, rng);

        // At this point the best split (if any) of the drawn candidate features is stored in
        // `best`. The impurity decrease is `impurity of the node before splitting - impurity of
        // the split`. If it is above the threshold set in the parameters, the split is applied
        // and `fit` is recursively called in the two resulting subtrees. Otherwise the node stays
        // a leaf.
        let (best_feature_idx, best_split_value, best_score) = match best {
            Some(best) => best,
            None => return node_idx,
        };

        let impurity_decrease = F::cast(parent_score) - F::cast(best_score);
        if impurity_decrease < self.hyperparameters.min_impurity_decrease() {
            return node_idx;
        }

        // determine new masks for the left and right subtrees
        let nsamples = self.data.nsamples();
        let mut left_mask = RowMask::none(nsamples);
        let mut right_mask = RowMask::none(nsamples);

        for i in 0..nsamples {
            if mask.mask[i] {
                if self.data.records()[(i, best_feature_idx)] <= best_split_value {
                    left_mask.mark(i);
                } else {
                    right_mask.mark(i);
                }
            }
        }

        if left_mask.nsamples == 0 || right_mask.nsamples == 0 {
            return node_idx;
        }

        // Recurse and refit on left and right subtrees
        let left_child = self.fit(&left_mask, depth + 1, rng);
        let right_child = self.fit(&right_mask, depth + 1, rng);

        let node = &mut self.nodes[node_idx];
        node.feature_idx = best_feature_idx;
        node.split_value = best_split_value;
        node.impurity_decrease = impurity_decrease;
        node.left_child = Some(left_child);
        node.right_child = Some(right_child);

        node_idx
    }

    /// Searches the drawn candidate features for the split with the lowest weighted impurity
    ///
    /// Returns `(feature index, split value, score)` of the best split, if any.
    fn find_best_split(
        &self,
        mask: &RowMask,
        parent_class_freq: &[f32],
        rng: &mut SmallRng,
    ) -> Option<(usize, F, f32)> {
        let nfeatures = self.sorted_indices.len();
        let n_candidates = self.hyperparameters.max_features().resolve(nfeatures);

        let mut features = (0..nfeatures).collect::<Vec<_>>();
        if n_candidates < nfeatures {
            features.shuffle(rng);
        }

        // We keep a running total of the aggregate weight in the right split
        // to avoid having to sum over the class frequencies
        let total_weight = parent_class_freq.iter().sum::<f32>();
        let target = self.data.targets();

        let mut best = None;
        let mut n_visited = 0;

        for feature_idx in features {
            if n_visited >= n_candidates {
                break;
            }

            let sorted_values = self.sorted_indices[feature_idx].visible(mask);

            // constant features do not count as a drawn candidate
            let is_constant = match (sorted_values.first(), sorted_values.last()) {
                (Some(first), Some(last)) => (last.1 - first.1).abs() < F::cast(1e-5),
                _ => true,
            };
            if is_constant {
                continue;
            }
            n_visited += 1;

            let mut right_class_freq = parent_class_freq.to_vec();
            let mut left_class_freq = vec![0.0; parent_class_freq.len()];

            let mut weight_on_right_side = total_weight;
            let mut weight_on_left_side = 0.0;

            // We start by putting all available observations in the right subtree
            // and then move the (sorted by `feature_idx`) observations one by one to
            // the left subtree and evaluate the quality of the resulting split. At each
            // iteration, the obtained split is compared with `best`, in order
            // to find the best possible split.
            // The resulting split will then have the observations with a value of their `feature_idx`
            // feature smaller than the split value in the left subtree and the others still in the right
            // subtree
            for i in 0..sorted_values.len() - 1 {
                // (index of the observation, value of its `feature_idx` feature)
                let (presorted_index, value) = sorted_values[i];
                let next_value = sorted_values[i + 1].1;

                // Target and weight of the current observation
                let sample_class = target[presorted_index];
                let sample_weight = self.data.weight_for(presorted_index);

                // Move the observation from the right subtree to the left subtree
                right_class_freq[sample_class] -= sample_weight;
                weight_on_right_side -= sample_weight;

                left_class_freq[sample_class] += sample_weight;
                weight_on_left_side += sample_weight;

                // Continue if the next value is equal, so that equal values end up in the same subtree
                if (next_value - value).abs() < F::cast(1e-5) {
                    continue;
                }

                // If the split would result in too few samples in a leaf
                // then skip computing the quality
                if weight_on_right_side < self.hyperparameters.min_weight_leaf()
                    || weight_on_left_side < self.hyperparameters.min_weight_leaf()
                {
                    continue;
                }

                // Calculate the quality of each resulting subset of the dataset
                let left_score = self.impurity(&left_class_freq);
                let right_score = self.impurity(&right_class_freq);

                // Weight the qualities based on the number of samples in each subset
                let w = weight_on_left_side / total_weight;
                let score = w * left_score + (1.0 - w) * right_score;

                // Take the midpoint from this value and the next one as split_value
                let split_value = (value + next_value) / F::cast(2.0);

                // override best indices when score improved
                best = match best.take() {
                    None => Some((feature_idx, split_value, score)),
                    Some((_, _, best_score)) if score < best_score => {
                        Some((feature_idx, split_value, score))
                    }
                    x => x,
                };
            }
        }

        best
    }
}

/// A fitted decision tree model for classification.
///
/// ### Structure
/// A decision tree structure is a binary tree where:
/// * Each internal node specifies a decision, represented by a choice of a feature and a "split value" such that all observations for which
/// `feature <= split_value` is true fall in the left subtree, while the others fall in the right subtree.
///
/// * every node keeps the weighted class counts of the training samples which reached it, leaf nodes predict the class with
///   the largest count
///
/// The nodes live in a single arena, a `Vec` in depth-first pre-order with the root at index zero. Children are referenced
/// by their index, which makes the tree trivial to flatten into parallel arrays (see [`to_arrays`](DecisionTree::to_arrays)).
///
/// ### Algorithm
///
/// Starting with a single root node, decision trees are trained recursively by applying the following rule to every
/// node considered:
///
/// * Draw the candidate features (all of them by default, see [`MaxFeatures`](crate::MaxFeatures));
/// * Find the best split value for each candidate feature of the observations belonging in the node;
/// * Select the feature (and its best split value) that maximizes the quality of the split;
/// * If the score of the split is sufficiently larger than the score of the unsplit node, then two child nodes are generated, the left one
///   containing all observations with `feature <= split value` and the right one containing the rest.
/// * If no suitable split is found, the node is marked as leaf.
///
/// The [quality score](enum.SplitQuality.html) used can be specified in the [parameters](struct.DecisionTreeParams.html).
///
/// ### Predictions
///
/// To predict the label of a sample, the tree is traversed from the root to a leaf, choosing between left and right children according to
/// the values of the features of the sample. The final prediction for the sample is the prediction of the reached leaf.
///
/// ### Example
///
/// Here is an example on how to train a decision tree from its parameters:
///
/// ```rust
///
/// use sepsis_trees::DecisionTree;
/// use sepsis_forest::prelude::*;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// // Generate the dataset
/// let dataset = sepsis_datasets::sepsis(200, &mut StdRng::seed_from_u64(42));
/// // Fit the tree
/// let tree = DecisionTree::params().fit(&dataset).unwrap();
/// // Get accuracy on training set
/// let accuracy = tree.predict(&dataset).confusion_matrix(&dataset).unwrap().accuracy();
///
/// assert!(accuracy > 0.9);
///
/// ```
///
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree<F: Float> {
    nodes: Vec<TreeNode<F>>,
    num_features: usize,
    n_classes: usize,
    feature_names: Vec<String>,
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<usize>>
    for DecisionTree<F>
{
    /// Make predictions for each row of a matrix of features `x`.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            *target = self.nodes[self.leaf_for(&row)].prediction();
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

impl<F: Float, D, T> Fit<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>, Error> for DecisionTreeValidParams<F>
where
    D: Data<Elem = F>,
    T: Data<Elem = usize>,
{
    type Object = DecisionTree<F>;

    /// Fit a decision tree using `hyperparamters` on the dataset consisting of
    /// a matrix of features `x` and an array of labels `y`.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>) -> Result<Self::Object> {
        let x = dataset.records();
        if dataset.nsamples() == 0 {
            return Err(Error::NotEnoughSamples);
        }
        if dataset.targets().len() != dataset.nsamples() {
            return Err(Error::MismatchedShapes(
                dataset.nsamples(),
                dataset.targets().len(),
            ));
        }

        let n_classes = resolve_n_classes(self.n_classes(), dataset.targets().iter().copied())?;
        let sorted_indices: Vec<_> = (0..(x.ncols()))
            .map(|feature_idx| SortedIndex::of_array_column(x, feature_idx))
            .collect();

        let mut builder = NodeBuilder {
            data: dataset,
            hyperparameters: self,
            sorted_indices,
            n_classes,
            nodes: Vec::new(),
        };

        let mut rng = SmallRng::seed_from_u64(self.seed());
        builder.fit(&RowMask::all(x.nrows()), 0, &mut rng);

        Ok(DecisionTree {
            nodes: builder.nodes,
            num_features: x.ncols(),
            n_classes,
            feature_names: dataset.feature_names(),
        })
    }
}

/// Determines the number of classes of a classification task
///
/// Without a configured number of classes, it is the largest label plus one. A configured
/// number has to cover every label.
pub(crate) fn resolve_n_classes(
    n_classes: Option<usize>,
    labels: impl Iterator<Item = usize>,
) -> Result<usize> {
    let max_label = labels.max().ok_or(Error::NotEnoughSamples)?;

    match n_classes {
        Some(n_classes) if max_label >= n_classes => Err(Error::Parameters(format!(
            "Label {} is out of range for {} classes",
            max_label, n_classes
        ))),
        Some(n_classes) => Ok(n_classes),
        None => Ok(max_label + 1),
    }
}

impl<F: Float> DecisionTree<F> {
    /// Create a node iterator in depth-first pre-order, following the child links from the root
    pub fn iter_nodes(&self) -> NodeIter<'_, F> {
        NodeIter::new(&self.nodes)
    }

    /// Return the arena of nodes, indexed by node id
    pub fn nodes(&self) -> &[TreeNode<F>] {
        &self.nodes
    }

    /// Return the number of nodes in this tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return features_idx of this tree
    pub fn features(&self) -> Vec<usize> {
        // vector of feature indexes to return
        let mut fitted_features = HashSet::new();

        for node in self.iter_nodes().filter(|node| !node.is_leaf()) {
            fitted_features.insert(node.feature_idx);
        }

        let mut fitted_features = fitted_features.into_iter().collect::<Vec<_>>();
        fitted_features.sort_unstable();
        fitted_features
    }

    /// Return the mean impurity decrease for each feature
    pub fn mean_impurity_decrease(&self) -> Vec<F> {
        // total impurity decrease for each feature
        let mut impurity_decrease = vec![F::zero(); self.num_features];
        let mut num_nodes = vec![0; self.num_features];

        for node in self.iter_nodes().filter(|node| !node.is_leaf()) {
            // add feature impurity decrease to list
            impurity_decrease[node.feature_idx] += node.impurity_decrease;
            num_nodes[node.feature_idx] += 1;
        }

        impurity_decrease
            .into_iter()
            .zip(num_nodes.into_iter())
            .map(|(val, n)| if n == 0 { F::zero() } else { val / F::cast(n) })
            .collect()
    }

    /// Return the relative impurity decrease for each feature
    ///
    /// A tree without any split has no importances, all of them are zero.
    pub fn relative_impurity_decrease(&self) -> Vec<F> {
        let mean_impurity_decrease = self.mean_impurity_decrease();
        let sum: F = mean_impurity_decrease.iter().cloned().sum();

        if sum <= F::zero() {
            return mean_impurity_decrease;
        }

        mean_impurity_decrease
            .into_iter()
            .map(|x| x / sum)
            .collect()
    }

    /// Return the feature importance, i.e. the relative impurity decrease, for each feature
    pub fn feature_importance(&self) -> Vec<F> {
        self.relative_impurity_decrease()
    }

    /// Return root node of the tree
    pub fn root_node(&self) -> &TreeNode<F> {
        &self.nodes[0]
    }

    /// Return max depth of the tree
    pub fn max_depth(&self) -> usize {
        self.iter_nodes()
            .fold(0, |max, node| usize::max(max, node.depth))
    }

    /// Return the width of the per-node class weights
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the names of the features the tree was fitted on
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Class probabilities for each row of `x`, from the class weights of the reached leaves
    pub fn predict_probabilities(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let mut probabilities = Array2::zeros((x.nrows(), self.n_classes));

        for (row, mut out) in x.rows().into_iter().zip(probabilities.rows_mut()) {
            let leaf = &self.nodes[self.leaf_for(&row)];
            for (p, prob) in out.iter_mut().zip(leaf.probabilities()) {
                *p = F::cast(prob);
            }
        }

        probabilities
    }

    /// Walks the arena from the root and returns the index of the leaf reached by `x`
    fn leaf_for(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> usize {
        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            idx = match (node.left_child, node.right_child) {
                (Some(left), Some(right)) => {
                    if x[node.feature_idx] <= node.split_value {
                        left
                    } else {
                        right
                    }
                }
                _ => return idx,
            };
        }
    }
}

/// Finds the most frequent class for the class frequencies. If two
/// classes have the same weight then the first class found with that
/// frequency is returned.
fn find_modal_class(class_freq: &[f32]) -> usize {
    class_freq
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_idx, best_freq), (idx, freq)| {
            if *freq > best_freq {
                (idx, *freq)
            } else {
                (best_idx, best_freq)
            }
        })
        .0
}

/// Given the class frequencies calculates the gini impurity of the subset.
fn gini_impurity(class_freq: &[f32]) -> f32 {
    let n_samples = class_freq.iter().sum::<f32>();
    if n_samples <= 0.0 {
        return 0.0;
    }

    let purity = class_freq
        .iter()
        .map(|x| x / n_samples)
        .map(|x| x * x)
        .sum::<f32>();

    1.0 - purity
}

/// Given the class frequencies calculates the entropy of the subset.
fn entropy(class_freq: &[f32]) -> f32 {
    let n_samples = class_freq.iter().sum::<f32>();
    if n_samples <= 0.0 {
        return 0.0;
    }

    class_freq
        .iter()
        .map(|x| x / n_samples)
        .map(|x| if x > 0.0 { -x * x.log2() } else { 0.0 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::MaxFeatures;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, s, Array, Array1, Array2};
    use rand::rngs::SmallRng;
    use sepsis_forest::{metrics::ToConfusionMatrix, Dataset, ParamGuard};

    use ndarray_rand::{rand::SeedableRng, rand_distr::Uniform, RandomExt};

    #[test]
    fn prediction_for_rows_example() {
        let class_freq = [6.0, 2.0];
        assert_eq!(find_modal_class(&class_freq), 0);

        // ties resolve to the first class
        assert_eq!(find_modal_class(&[1.0, 3.0, 3.0]), 1);
    }

    #[test]
    fn gini_impurity_example() {
        let class_freq = [6.0, 2.0, 0.0];

        // Class 0 occurs 75% of the time
        // Class 1 occurs 25% of the time
        // Class 2 occurs 0% of the time
        // Gini impurity is 1 - 0.75*0.75 - 0.25*0.25 - 0*0 = 0.375
        assert_abs_diff_eq!(gini_impurity(&class_freq), 0.375, epsilon = 1e-5);
    }

    #[test]
    fn entropy_example() {
        let class_freq = [6.0, 2.0, 0.0];

        // Class 0 occurs 75% of the time
        // Class 1 occurs 25% of the time
        // Class 2 occurs 0% of the time
        // Entropy is -0.75*log2(0.75) - 0.25*log2(0.25) - 0*log2(0) = 0.81127812
        assert_abs_diff_eq!(entropy(&class_freq), 0.81127, epsilon = 1e-5);

        // If split is perfect then entropy is zero
        let perfect_class_freq = [8.0, 0.0, 0.0];

        assert_abs_diff_eq!(entropy(&perfect_class_freq), 0.0, epsilon = 1e-5);
    }

    #[test]
    /// Single feature test
    ///
    /// Generate a dataset where a single feature perfectly correlates
    /// with the target while the remaining features are random gaussian
    /// noise and do not add any information.
    fn single_feature_random_noise_binary() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);

        // generate data with 9 white noise and a single correlated feature
        let mut data = Array::random_using((50, 10), Uniform::new(-4., 4.), &mut rng);
        data.slice_mut(s![.., 8]).assign(
            &(0..50)
                .map(|x| if x < 25 { 0.0 } else { 1.0 })
                .collect::<Array1<_>>(),
        );

        let targets = (0..50).map(|x| (x >= 25) as usize).collect::<Array1<_>>();
        let dataset = Dataset::new(data, targets);

        let model = DecisionTree::params().max_depth(Some(2)).fit(&dataset)?;

        // we should only use feature index 8 here
        assert_eq!(&model.features(), &[8]);

        let ground_truth = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];

        for (imp, truth) in model.feature_importance().iter().zip(&ground_truth) {
            assert_abs_diff_eq!(imp, truth, epsilon = 1e-15);
        }

        // check for perfect accuracy
        let cm = model
            .predict(dataset.records())
            .confusion_matrix(&dataset)?;
        assert_abs_diff_eq!(cm.accuracy(), 1.0, epsilon = 1e-15);

        Ok(())
    }

    #[test]
    /// Check that for random data the max depth is used
    fn check_max_depth() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);

        // create very sparse data
        let data = Array::random_using((50, 50), Uniform::new(-1., 1.), &mut rng);
        let targets = (0..50).collect::<Array1<usize>>();

        let dataset = Dataset::new(data, targets);

        // check that the provided depth is actually used
        for max_depth in &[1, 5, 10, 20] {
            let model = DecisionTree::params()
                .max_depth(Some(*max_depth))
                .min_impurity_decrease(1e-10f64)
                .min_weight_split(1e-10)
                .fit(&dataset)?;
            assert_eq!(model.max_depth(), *max_depth);
        }

        Ok(())
    }

    #[test]
    /// Small perfectly separable dataset test
    ///
    /// This dataset of three elements is perfectly using the second feature.
    fn perfectly_separable_small() -> Result<()> {
        let data = array![[1., 2., 3.], [1., 2., 4.], [1., 3., 3.5]];
        let targets = array![0usize, 0, 1];

        let dataset = Dataset::new(data.clone(), targets);
        let model = DecisionTree::params().max_depth(Some(1)).fit(&dataset)?;

        assert_eq!(model.predict(&data), array![0usize, 0, 1]);

        // one split on the second feature and two pure leaves
        assert_eq!(model.node_count(), 3);
        assert_eq!(model.root_node().split().0, 1);
        assert_abs_diff_eq!(model.root_node().split().1, 2.5);
        assert_eq!(model.nodes()[1].class_weights(), &[2.0, 0.0]);
        assert_eq!(model.nodes()[2].class_weights(), &[0.0, 1.0]);

        Ok(())
    }

    #[test]
    /// The arena is in pre-order and every internal node has both children behind itself
    fn arena_is_in_pre_order() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);
        let data = Array::random_using((200, 3), Uniform::new(0., 1.), &mut rng);
        let targets = data
            .rows()
            .into_iter()
            .map(|row| (row[0] + row[1] > 1.0) as usize)
            .collect::<Array1<_>>();
        let dataset = Dataset::new(data, targets);

        let model = DecisionTree::params().fit(&dataset)?;

        assert!(model.node_count() > 3);
        for (idx, node) in model.nodes().iter().enumerate() {
            match node.children() {
                [Some(left), Some(right)] => {
                    assert_eq!(left, idx + 1);
                    assert!(right > left);
                    assert_eq!(model.nodes()[left].depth(), node.depth() + 1);

                    // the weights of the children add up to the parent
                    let children_weight: f32 = model.nodes()[left]
                        .class_weights()
                        .iter()
                        .chain(model.nodes()[right].class_weights())
                        .sum();
                    let weight: f32 = node.class_weights().iter().sum();
                    assert_abs_diff_eq!(children_weight, weight);
                }
                [None, None] => {}
                _ => panic!("node {} has a single child", idx),
            }
        }

        // every node is reachable from the root exactly once
        assert_eq!(model.iter_nodes().count(), model.node_count());

        Ok(())
    }

    #[test]
    /// Subsampled candidate features still find a perfect fit, given enough depth
    fn max_features_subsampling_is_seeded() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);
        let data = Array::random_using((100, 4), Uniform::new(0., 1.), &mut rng);
        let targets = data
            .rows()
            .into_iter()
            .map(|row| (row[2] > 0.5) as usize)
            .collect::<Array1<_>>();
        let dataset = Dataset::new(data, targets);

        let params = DecisionTree::params()
            .max_features(MaxFeatures::Count(1))
            .seed(7);

        let first = params.fit(&dataset)?;
        let second = params.fit(&dataset)?;
        assert_eq!(first, second);

        let cm = first.predict(&dataset).confusion_matrix(&dataset)?;
        assert!(cm.accuracy() > 0.9);

        Ok(())
    }

    #[test]
    /// A single class results in a single leaf which still carries every class
    fn single_class_results_in_single_leaf() -> Result<()> {
        let data = array![[1., 2.], [2., 1.], [3., 0.]];
        let dataset = Dataset::new(data.clone(), array![0usize, 0, 0]);

        let model = DecisionTree::params().n_classes(Some(2)).fit(&dataset)?;

        assert_eq!(model.node_count(), 1);
        assert!(model.root_node().is_leaf());
        assert_eq!(model.root_node().class_weights(), &[3.0, 0.0]);
        assert_eq!(model.feature_importance(), vec![0.0, 0.0]);
        assert_eq!(model.predict(&data), array![0usize, 0, 0]);

        Ok(())
    }

    #[test]
    fn labels_out_of_class_range_are_rejected() {
        let dataset = Dataset::new(array![[1.], [2.]], array![0usize, 2]);

        let result = DecisionTree::params().n_classes(Some(2)).fit(&dataset);
        assert!(matches!(result, Err(Error::Parameters(_))));
    }

    #[test]
    fn sample_weights_shift_the_prediction() -> Result<()> {
        let data = array![[1.], [1.], [1.]];
        let dataset = Dataset::new(data.clone(), array![0usize, 1, 1]).with_weights(array![5., 1., 1.]);

        let model = DecisionTree::params().fit(&dataset)?;
        assert_eq!(model.predict(&data), array![0usize, 0, 0]);

        let probabilities = model.predict_probabilities(&data);
        assert_abs_diff_eq!(probabilities.row(0)[0], 5. / 7., epsilon = 1e-6);

        Ok(())
    }

    #[test]
    /// Small toy dataset from scikit-sklearn
    fn toy_dataset() -> Result<()> {
        let data = array![
            [0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 1.0, -14.0, 0.0, -4.0, 0.0, 0.0, 0.0, 0.0,],
            [0.0, 0.0, 5.0, 3.0, 0.0, -4.0, 0.0, 0.0, 1.0, -5.0, 0.2, 0.0, 4.0, 1.0,],
            [-1.0, -1.0, 0.0, 0.0, -4.5, 0.0, 0.0, 2.1, 1.0, 0.0, 0.0, -4.5, 0.0, 1.0,],
            [-1.0, -1.0, 0.0, -1.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.2, 0.0, 0.0, 1.0,],
            [-1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0,],
            [-1.0, -2.0, 0.0, 4.0, -3.0, 10.0, 4.0, 0.0, -3.2, 0.0, 4.0, 3.0, -4.0, 1.0,],
            [2.11, 0.0, -6.0, -0.5, 0.0, 11.0, 0.0, 0.0, -3.2, 6.0, 0.5, 0.0, -3.0, 1.0,],
            [2.11, 0.0, -6.0, -0.5, 0.0, 11.0, 0.0, 0.0, -3.2, 6.0, 0.0, 0.0, -2.0, 1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 11.0, 0.0, 0.0, -3.2, 6.0, 0.0, 0.0, -2.0, 1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 11.0, 0.0, 0.0, -3.2, 6.0, 0.5, 0.0, -1.0, 0.0,],
            [2.0, 8.0, 5.0, 1.0, 0.5, -4.0, 10.0, 0.0, 1.0, -5.0, 3.0, 0.0, 2.0, 0.0,],
            [2.0, 0.0, 1.0, 1.0, 1.0, -1.0, 1.0, 0.0, 0.0, -2.0, 3.0, 0.0, 1.0, 0.0,],
            [2.0, 0.0, 1.0, 2.0, 3.0, -1.0, 10.0, 2.0, 0.0, -1.0, 1.0, 2.0, 2.0, 0.0,],
            [1.0, 1.0, 0.0, 2.0, 2.0, -1.0, 1.0, 2.0, 0.0, -5.0, 1.0, 2.0, 3.0, 0.0,],
            [3.0, 1.0, 0.0, 3.0, 0.0, -4.0, 10.0, 0.0, 1.0, -5.0, 3.0, 0.0, 3.0, 1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 1.0, 0.0, 0.0, -3.2, 6.0, 0.5, 0.0, -3.0, 1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 1.0, 0.0, 0.0, -3.2, 6.0, 1.5, 1.0, -1.0, -1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 10.0, 0.0, 0.0, -3.2, 6.0, 0.5, 0.0, -1.0, -1.0,],
            [2.0, 0.0, 5.0, 1.0, 0.5, -2.0, 10.0, 0.0, 1.0, -5.0, 3.0, 1.0, 0.0, -1.0,],
            [2.0, 0.0, 1.0, 1.0, 1.0, -2.0, 1.0, 0.0, 0.0, -2.0, 0.0, 0.0, 0.0, 1.0,],
            [2.0, 1.0, 1.0, 1.0, 2.0, -1.0, 10.0, 2.0, 0.0, -1.0, 0.0, 2.0, 1.0, 1.0,],
            [1.0, 1.0, 0.0, 0.0, 1.0, -3.0, 1.0, 2.0, 0.0, -5.0, 1.0, 2.0, 1.0, 1.0,],
            [3.0, 1.0, 0.0, 1.0, 0.0, -4.0, 1.0, 0.0, 1.0, -2.0, 0.0, 0.0, 1.0, 0.0,]
        ];

        let targets = array![
            1usize, 1, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0
        ];

        let dataset = Dataset::new(data, targets);
        let model = DecisionTree::params().fit(&dataset)?;
        let prediction = model.predict(&dataset);

        let cm = prediction.confusion_matrix(&dataset)?;
        assert!(cm.accuracy() > 0.95);

        Ok(())
    }

    #[test]
    /// Multilabel classification
    fn multilabel_four_uniform() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut data = Array2::random_using((40, 2), Uniform::new(-1., 1.), &mut rng);

        data.outer_iter_mut().enumerate().for_each(|(i, mut p)| {
            if i < 10 {
                p += &array![-2., -2.]
            } else if i < 20 {
                p += &array![-2., 2.];
            } else if i < 30 {
                p += &array![2., -2.];
            } else {
                p += &array![2., 2.];
            }
        });

        let targets = (0..40)
            .map(|x| match x {
                x if x < 10 => 0,
                x if x < 20 => 1,
                x if x < 30 => 2,
                _ => 3,
            })
            .collect::<Array1<usize>>();

        let dataset = Dataset::new(data.clone(), targets);

        let model = DecisionTree::params().fit(&dataset)?;
        let prediction = model.predict(data);

        assert_eq!(model.n_classes(), 4);
        let cm = prediction.targets().confusion_matrix(&dataset)?;
        assert!(cm.accuracy() > 0.99);

        Ok(())
    }

    #[test]
    #[should_panic]
    /// Check that a small or negative impurity decrease panics
    fn panic_min_impurity_decrease() {
        DecisionTree::<f64>::params()
            .min_impurity_decrease(0.0)
            .check()
            .unwrap();
    }
}
