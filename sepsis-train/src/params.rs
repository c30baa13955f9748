use std::path::{Path, PathBuf};

use sepsis_forest::{
    error::{Error, Result},
    ParamGuard,
};

/// File the forest is written to, relative to the working directory
pub const DEFAULT_OUTPUT: &str = "random_forest_sepsis.json";

/// Checked parameters of a pipeline run
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineValidParams {
    n_samples: usize,
    seed: u64,
    n_trees: usize,
    train_ratio: f32,
    output: PathBuf,
}

impl PipelineValidParams {
    /// Number of synthesized samples
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Seed of the generator for the samples and the split, and of the forest
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Share of the samples in the training part of the split
    pub fn train_ratio(&self) -> f32 {
        self.train_ratio
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// Parameters of a pipeline run
///
/// ```
/// use sepsis_forest::ParamGuard;
/// use sepsis_train::PipelineParams;
///
/// let params = PipelineParams::default().n_trees(10).check().unwrap();
///
/// assert_eq!(params.n_samples(), 1000);
/// assert_eq!(params.n_trees(), 10);
/// assert_eq!(params.output().to_str(), Some("random_forest_sepsis.json"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineParams(PipelineValidParams);

impl Default for PipelineParams {
    /// 1000 samples, seed 42, 100 trees, a 75/25 split, written to [`DEFAULT_OUTPUT`]
    fn default() -> Self {
        Self(PipelineValidParams {
            n_samples: 1000,
            seed: 42,
            n_trees: 100,
            train_ratio: 0.75,
            output: PathBuf::from(DEFAULT_OUTPUT),
        })
    }
}

impl PipelineParams {
    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.0.n_samples = n_samples;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    pub fn n_trees(mut self, n_trees: usize) -> Self {
        self.0.n_trees = n_trees;
        self
    }

    pub fn train_ratio(mut self, train_ratio: f32) -> Self {
        self.0.train_ratio = train_ratio;
        self
    }

    pub fn output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.0.output = output.into();
        self
    }
}

impl ParamGuard for PipelineParams {
    type Checked = PipelineValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_samples == 0 {
            Err(Error::Parameters(
                "The number of samples should be at least one".to_string(),
            ))
        } else if self.0.n_trees == 0 {
            Err(Error::Parameters(
                "The number of trees should be at least one".to_string(),
            ))
        } else if !(self.0.train_ratio > 0.0 && self.0.train_ratio <= 1.0) {
            Err(Error::Parameters(format!(
                "The train ratio should be in (0, 1], but was {}",
                self.0.train_ratio
            )))
        } else if self.0.output.as_os_str().is_empty() {
            Err(Error::Parameters("The output path is empty".to_string()))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
