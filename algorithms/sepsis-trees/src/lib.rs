//!
//! # Decision tree learning
//! `sepsis-trees` provides pure Rust implementations of decision tree learning for
//! classification, and a random forest built upon them.
//!
//! Decision Trees (DTs) are a non-parametric supervised learning method. The goal is to create a
//! model that predicts the value of a target variable by learning simple decision rules
//! inferred from the data features.
//!
//! # Current state
//!
//! `sepsis-trees` currently provides
//!
//! * an [implementation](DecisionTree) of single-tree fitting for classification, storing the
//!   nodes in an arena in depth-first pre-order
//! * a [random forest](RandomForestClassifier) of bootstrapped trees with per-split feature
//!   subsampling
//! * an [export](export) of fitted trees into parallel arrays, which serialize to JSON
//!

mod decision_trees;
pub mod export;

pub use decision_trees::*;
pub use decision_trees::random_forest::{
    RandomForestClassifier, RandomForestParams, RandomForestValidParams,
};
pub use export::{ForestArrays, TreeArrays, TREE_LEAF, TREE_UNDEFINED};

pub use sepsis_forest::error::Result;
