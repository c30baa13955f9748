//! `sepsis-datasets` synthesizes labelled vital-sign datasets ready to be used in tests,
//! benchmarks and the training pipeline.
//!
//! ## Current State
//!
//! Every sample carries three vital signs drawn uniformly and independently:
//!
//! * `temp`: body temperature in `[25, 40)`
//! * `bpm`: integer heart rate in `[50, 120)`
//! * `spo2`: oxygen saturation in `[85, 100)`
//!
//! and a binary label computed by [`sepsis_label`]. Datasets are returned as a
//! [`sepsis_forest::Dataset`] with named features, in the column order above.
//!
//! ## Using a dataset
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let (train, valid) = sepsis_datasets::sepsis(1000, &mut rng).split_with_ratio(0.8);
//!
//! assert_eq!(train.nsamples(), 800);
//! assert_eq!(valid.feature_names(), vec!["temp", "bpm", "spo2"]);
//! ```

pub mod generate;

pub use generate::{assemble, sepsis, sepsis_label, vital_signs, VitalSigns, FEATURE_NAMES};
