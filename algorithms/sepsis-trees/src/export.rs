//! Flattening fitted trees into parallel arrays
//!
//! Every tree becomes five arrays indexed by node id. Node ids follow the depth-first pre-order
//! of the fitted tree, so the root is node `0` and a left child always directly follows its
//! parent. Leaves mark their missing children with [`TREE_LEAF`], their missing split feature
//! with [`TREE_UNDEFINED`] and their threshold with `TREE_UNDEFINED as f64`.
//!
//! ```rust
//! use sepsis_trees::{DecisionTree, TREE_LEAF};
//! use sepsis_forest::prelude::*;
//! use ndarray::array;
//!
//! let dataset = Dataset::new(array![[1.], [2.], [8.], [9.]], array![0usize, 0, 1, 1]);
//! let arrays = DecisionTree::params().fit(&dataset).unwrap().to_arrays();
//!
//! assert_eq!(arrays.children_left, vec![1, TREE_LEAF, TREE_LEAF]);
//! assert_eq!(arrays.threshold[0], 5.0);
//! assert_eq!(arrays.value[1], vec![vec![2.0, 0.0]]);
//! ```

use serde_crate::{Deserialize, Serialize};

use sepsis_forest::{
    error::{Error, Result},
    Float,
};

use crate::{DecisionTree, RandomForestClassifier};

/// Child id of a leaf
pub const TREE_LEAF: i64 = -1;
/// Feature id of a leaf, also used as its threshold
pub const TREE_UNDEFINED: i64 = -2;

/// A single tree as parallel arrays indexed by node id
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "serde_crate")]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Weighted class counts of the training samples reaching each node, shaped
    /// `[node][output][class]` with a single output
    pub value: Vec<Vec<Vec<f64>>>,
}

/// All trees of a forest, in the order they were grown
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "serde_crate")]
pub struct ForestArrays {
    pub trees: Vec<TreeArrays>,
}

impl<F: Float> DecisionTree<F> {
    /// Flattens the tree, with node ids equal to the arena indices
    pub fn to_arrays(&self) -> TreeArrays {
        let n = self.node_count();
        let mut arrays = TreeArrays {
            children_left: Vec::with_capacity(n),
            children_right: Vec::with_capacity(n),
            feature: Vec::with_capacity(n),
            threshold: Vec::with_capacity(n),
            value: Vec::with_capacity(n),
        };

        for node in self.nodes() {
            match node.children() {
                [Some(left), Some(right)] => {
                    let (feature, threshold, _) = node.split();
                    arrays.children_left.push(left as i64);
                    arrays.children_right.push(right as i64);
                    arrays.feature.push(feature as i64);
                    arrays.threshold.push(threshold.to_f64().unwrap_or(f64::NAN));
                }
                _ => {
                    arrays.children_left.push(TREE_LEAF);
                    arrays.children_right.push(TREE_LEAF);
                    arrays.feature.push(TREE_UNDEFINED);
                    arrays.threshold.push(TREE_UNDEFINED as f64);
                }
            }

            let counts = node.class_weights().iter().map(|w| *w as f64).collect();
            arrays.value.push(vec![counts]);
        }

        arrays
    }
}

impl<F: Float> RandomForestClassifier<F> {
    /// Flattens every tree of the forest
    pub fn to_arrays(&self) -> ForestArrays {
        ForestArrays {
            trees: self.trees().iter().map(DecisionTree::to_arrays).collect(),
        }
    }
}

impl TreeArrays {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Width of the class counts of every node
    pub fn n_classes(&self) -> usize {
        self.value
            .first()
            .and_then(|outputs| outputs.first())
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Checks that the arrays describe a single binary tree rooted at node `0`
    ///
    /// All arrays have the same non-zero length and every node has a single output of the
    /// same width. A node is either a leaf with all sentinels set, or an internal node with
    /// both children and a finite threshold. Following the children from the root reaches
    /// every node exactly once.
    pub fn validate(&self) -> Result<()> {
        let n = self.node_count();
        if n == 0 {
            return Err(Error::InvalidTree("the tree has no nodes".to_string()));
        }
        for (name, len) in [
            ("children_right", self.children_right.len()),
            ("feature", self.feature.len()),
            ("threshold", self.threshold.len()),
            ("value", self.value.len()),
        ] {
            if len != n {
                return Err(Error::InvalidTree(format!(
                    "{} has {} entries, but there are {} nodes",
                    name, len, n
                )));
            }
        }

        let n_classes = self.n_classes();
        for (id, outputs) in self.value.iter().enumerate() {
            if outputs.len() != 1 || outputs[0].len() != n_classes || n_classes == 0 {
                return Err(Error::InvalidTree(format!(
                    "node {} should have a single output of {} classes",
                    id, n_classes
                )));
            }
        }

        for id in 0..n {
            let (left, right) = (self.children_left[id], self.children_right[id]);
            let is_leaf = left == TREE_LEAF || right == TREE_LEAF;

            if is_leaf {
                if left != TREE_LEAF
                    || right != TREE_LEAF
                    || self.feature[id] != TREE_UNDEFINED
                    || self.threshold[id] != TREE_UNDEFINED as f64
                {
                    return Err(Error::InvalidTree(format!(
                        "leaf {} has inconsistent sentinels",
                        id
                    )));
                }
                continue;
            }

            for child in [left, right] {
                if child <= 0 || child as usize >= n {
                    return Err(Error::InvalidTree(format!(
                        "node {} references child {} outside of 1..{}",
                        id, child, n
                    )));
                }
            }
            if self.feature[id] < 0 {
                return Err(Error::InvalidTree(format!(
                    "internal node {} has no split feature",
                    id
                )));
            }
            if !self.threshold[id].is_finite() {
                return Err(Error::InvalidTree(format!(
                    "internal node {} has threshold {}",
                    id, self.threshold[id]
                )));
            }
        }

        // every node reachable exactly once, which rules out cycles and shared children
        let mut visited = vec![false; n];
        let mut stack = vec![0usize];
        while let Some(id) = stack.pop() {
            if visited[id] {
                return Err(Error::InvalidTree(format!(
                    "node {} is reachable more than once",
                    id
                )));
            }
            visited[id] = true;

            if self.children_left[id] != TREE_LEAF {
                stack.push(self.children_right[id] as usize);
                stack.push(self.children_left[id] as usize);
            }
        }
        if let Some(orphan) = visited.iter().position(|v| !v) {
            return Err(Error::InvalidTree(format!(
                "node {} is not reachable from the root",
                orphan
            )));
        }

        Ok(())
    }

    /// Class counts of the leaf reached by the sample `x`
    ///
    /// Goes left while `x[feature] <= threshold`. Fails on a feature outside of `x`, on arrays
    /// too short for a visited node or when the walk takes more steps than there are nodes.
    pub fn leaf_value(&self, x: &[f64]) -> Result<&[f64]> {
        let missing = |id: usize, name: &str| {
            Error::InvalidTree(format!("node {} has no entry in {}", id, name))
        };

        let mut id = 0usize;
        for _ in 0..=self.node_count() {
            let left = *self.children_left.get(id).ok_or_else(|| missing(id, "children_left"))?;
            if left == TREE_LEAF {
                return self
                    .value
                    .get(id)
                    .and_then(|outputs| outputs.first())
                    .map(Vec::as_slice)
                    .ok_or_else(|| missing(id, "value"));
            }

            let right = *self.children_right.get(id).ok_or_else(|| missing(id, "children_right"))?;
            let feature = *self.feature.get(id).ok_or_else(|| missing(id, "feature"))?;
            let threshold = *self.threshold.get(id).ok_or_else(|| missing(id, "threshold"))?;
            if feature < 0 {
                return Err(Error::InvalidTree(format!(
                    "internal node {} has no split feature",
                    id
                )));
            }

            let feature = feature as usize;
            let value = x.get(feature).ok_or(Error::MismatchedShapes(feature + 1, x.len()))?;
            let next = if *value <= threshold { left } else { right };
            if next < 0 {
                return Err(Error::InvalidTree(format!(
                    "node {} references child {}",
                    id, next
                )));
            }
            id = next as usize;
        }

        Err(Error::InvalidTree(
            "the walk from the root does not end in a leaf".to_string(),
        ))
    }

    /// Class probabilities of the leaf reached by the sample `x`
    pub fn predict_proba_row(&self, x: &[f64]) -> Result<Vec<f64>> {
        let counts = self.leaf_value(x)?;
        let total = counts.iter().sum::<f64>();

        Ok(if total > 0.0 {
            counts.iter().map(|c| c / total).collect()
        } else {
            vec![0.0; counts.len()]
        })
    }

    /// Class with the largest count in the leaf reached by the sample `x`, the first one on ties
    pub fn predict_row(&self, x: &[f64]) -> Result<usize> {
        let counts = self.leaf_value(x)?;
        Ok(argmax(counts))
    }
}

impl ForestArrays {
    pub fn ntrees(&self) -> usize {
        self.trees.len()
    }

    /// Validates every tree and checks that all of them share the same number of classes
    pub fn validate(&self) -> Result<()> {
        let n_classes = self.trees.first().map(TreeArrays::n_classes);
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|err| Error::InvalidTree(format!("tree {}: {}", idx, err)))?;
            if Some(tree.n_classes()) != n_classes {
                return Err(Error::InvalidTree(format!(
                    "tree {} has {} classes instead of {}",
                    idx,
                    tree.n_classes(),
                    n_classes.unwrap_or(0)
                )));
            }
        }

        Ok(())
    }

    /// Mean of the class probabilities of all trees for the sample `x`
    pub fn predict_proba_row(&self, x: &[f64]) -> Result<Vec<f64>> {
        let mut mean: Vec<f64> = Vec::new();
        for tree in &self.trees {
            let probabilities = tree.predict_proba_row(x)?;
            if mean.is_empty() {
                mean = vec![0.0; probabilities.len()];
            }
            for (acc, p) in mean.iter_mut().zip(probabilities) {
                *acc += p;
            }
        }

        let ntrees = self.trees.len() as f64;
        Ok(mean.into_iter().map(|p| p / ntrees).collect())
    }

    /// Class with the largest mean probability for the sample `x`
    pub fn predict_row(&self, x: &[f64]) -> Result<usize> {
        Ok(argmax(&self.predict_proba_row(x)?))
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = idx;
        }
    }
    best
}
