//! `sepsis-forest` is the core of a small toolkit that synthesizes vital-sign
//! data, fits a random forest to it and exports the fitted trees.
//!
//! This crate holds what every other crate in the workspace builds upon:
//!
//! * [`DatasetBase`] and its aliases, pairing a record matrix with targets,
//!   sample weights and feature names
//! * the [`Fit`](traits::Fit), [`Predict`](traits::Predict) and
//!   [`PredictInplace`](traits::PredictInplace) traits
//! * [`ParamGuard`], separating unchecked hyperparameters from checked ones
//! * the common [`Error`](error::Error) type
//! * classification metrics such as the [`ConfusionMatrix`](metrics::ConfusionMatrix)
//!
//! The tree learners live in `sepsis-trees`, the synthetic data generator in
//! `sepsis-datasets` and the end-to-end pipeline in `sepsis-train`.

pub mod dataset;
pub mod error;
mod metrics_classification;
mod param_guard;
pub mod prelude;
pub mod traits;

#[cfg(feature = "benchmarks")]
pub mod benchmarks;

pub use dataset::{Dataset, DatasetBase, DatasetView, Float, Label};
pub use param_guard::ParamGuard;

/// Common metrics functions for classification
pub mod metrics {
    pub use crate::metrics_classification::{ConfusionMatrix, ToConfusionMatrix};
}
