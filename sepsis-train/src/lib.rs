//! `sepsis-train` synthesizes vital signs, fits a random forest on them and writes the fitted
//! trees to a JSON document.
//!
//! The pipeline is a straight line of stages, each a public function:
//!
//! 1. [`synthesize`] draws the samples and labels them
//! 2. [`holdout_split`] shuffles and splits them into train and test parts, which are only
//!    reported, the forest is fitted on every sample
//! 3. [`train`] fits the forest
//! 4. [`io::write_forest`] writes the exported trees
//!
//! [`run`] chains them for a set of [`PipelineParams`].

pub mod error;
pub mod io;
pub mod logging;
mod params;

use std::path::PathBuf;

use rand::{rngs::StdRng, Rng, SeedableRng};
use sepsis_forest::{traits::Fit, Dataset};
use sepsis_trees::{ForestArrays, RandomForestClassifier, RandomForestParams};
use tracing::{debug, info};

pub use error::{Result, TrainError};
pub use io::{read_forest, write_forest};
pub use params::{PipelineParams, PipelineValidParams, DEFAULT_OUTPUT};

/// What a pipeline run produced
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub n_samples: usize,
    pub n_positives: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub n_trees: usize,
    /// Number of nodes summed over all trees
    pub n_nodes: usize,
    pub output: PathBuf,
}

/// Draws and labels `n_samples` vital signs
pub fn synthesize(n_samples: usize, rng: &mut impl Rng) -> Dataset<f64, usize> {
    let dataset = sepsis_datasets::sepsis(n_samples, rng);
    info!(
        samples = dataset.nsamples(),
        positives = count_positives(&dataset),
        "synthesized vital signs"
    );
    debug!(classes = ?dataset.labels(), features = ?dataset.feature_names(), "assembled dataset");

    dataset
}

/// Shuffles `dataset` and splits it into a train part of `train_ratio` and a test part
pub fn holdout_split(
    dataset: &Dataset<f64, usize>,
    train_ratio: f32,
    rng: &mut impl Rng,
) -> (Dataset<f64, usize>, Dataset<f64, usize>) {
    let (train, test) = dataset.shuffle(rng).split_with_ratio(train_ratio);
    info!(
        train = train.nsamples(),
        test = test.nsamples(),
        "computed hold-out split, the forest is fitted on all samples"
    );

    (train, test)
}

/// Fits a forest of binary classification trees
///
/// The number of classes is pinned to two, so every node carries two class counts even if
/// the dataset holds a single class.
pub fn train(
    params: &PipelineValidParams,
    dataset: &Dataset<f64, usize>,
) -> Result<RandomForestClassifier<f64>> {
    let forest = RandomForestParams::new(params.n_trees())
        .n_classes(Some(2))
        .seed(params.seed())
        .fit(dataset)
        .map_err(TrainError::Model)?;

    let n_nodes: usize = forest.trees().iter().map(|tree| tree.node_count()).sum();
    info!(trees = forest.ntrees(), nodes = n_nodes, "fitted random forest");
    debug!(importance = ?forest.feature_importance(), "feature importance of temp, bpm, spo2");

    Ok(forest)
}

/// Fits the forest on `dataset` and writes its trees to the configured output
pub fn fit_and_write(
    params: &PipelineValidParams,
    dataset: &Dataset<f64, usize>,
) -> Result<ForestArrays> {
    let forest = train(params, dataset)?;
    let arrays = forest.to_arrays();

    write_forest(params.output(), &arrays)?;
    info!(path = %params.output().display(), "wrote forest");

    Ok(arrays)
}

/// Runs every stage of the pipeline
///
/// A single generator seeded with `seed` draws the samples and the split, the forest derives
/// the seeds of its trees from the same `seed`.
pub fn run(params: &PipelineValidParams) -> Result<TrainingSummary> {
    let mut rng = StdRng::seed_from_u64(params.seed());

    let dataset = synthesize(params.n_samples(), &mut rng);
    let (train, test) = holdout_split(&dataset, params.train_ratio(), &mut rng);
    let arrays = fit_and_write(params, &dataset)?;

    Ok(TrainingSummary {
        n_samples: dataset.nsamples(),
        n_positives: count_positives(&dataset),
        n_train: train.nsamples(),
        n_test: test.nsamples(),
        n_trees: arrays.ntrees(),
        n_nodes: arrays.trees.iter().map(|tree| tree.node_count()).sum(),
        output: params.output().to_path_buf(),
    })
}

fn count_positives(dataset: &Dataset<f64, usize>) -> usize {
    dataset
        .label_frequencies()
        .get(&1)
        .map(|weight| *weight as usize)
        .unwrap_or(0)
}
