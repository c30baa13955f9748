//! Utility functions for randomly generating vital signs

use ndarray::{Array, Array1, Array2};
use ndarray_rand::{rand_distr::Uniform, RandomExt};
use rand::Rng;
use sepsis_forest::Dataset;

/// Column names of an assembled dataset, in column order
pub const FEATURE_NAMES: [&str; 3] = ["temp", "bpm", "spo2"];

/// A single synthesized sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalSigns {
    pub temp: f64,
    pub bpm: u32,
    pub spo2: f64,
    pub sepsis: bool,
}

/// Labels a sample as septic when temperature and heart rate are both out of their normal
/// ranges while the oxygen saturation is low.
///
/// ```
/// use sepsis_datasets::sepsis_label;
///
/// assert!(sepsis_label(29.0, 101, 89.0));
/// // boundaries of the normal ranges are still normal
/// assert!(!sepsis_label(30.0, 101, 89.0));
/// assert!(!sepsis_label(29.0, 100, 89.0));
/// assert!(!sepsis_label(29.0, 101, 90.0));
/// ```
pub fn sepsis_label(temp: f64, bpm: u32, spo2: f64) -> bool {
    (temp < 30.0 || temp > 35.0) && (bpm < 70 || bpm > 100) && spo2 < 90.0
}

/// Draws `n` labelled samples from `rng`
///
/// All temperatures are drawn first, then all heart rates and then all saturations.
pub fn vital_signs(n: usize, rng: &mut impl Rng) -> Vec<VitalSigns> {
    let temp: Array1<f64> = Array::random_using(n, Uniform::new(25.0, 40.0), rng);
    let bpm: Array1<u32> = Array::random_using(n, Uniform::new(50, 120), rng);
    let spo2: Array1<f64> = Array::random_using(n, Uniform::new(85.0, 100.0), rng);

    temp.iter()
        .zip(bpm.iter())
        .zip(spo2.iter())
        .map(|((&temp, &bpm), &spo2)| VitalSigns {
            temp,
            bpm,
            spo2,
            sepsis: sepsis_label(temp, bpm, spo2),
        })
        .collect()
}

/// Packs samples into a dataset with the records `temp`, `bpm`, `spo2` and the label as
/// `0` or `1`, keeping the order of the samples.
pub fn assemble(samples: &[VitalSigns]) -> Dataset<f64, usize> {
    let records = Array2::from_shape_fn((samples.len(), FEATURE_NAMES.len()), |(i, j)| {
        let sample = &samples[i];
        match j {
            0 => sample.temp,
            1 => sample.bpm as f64,
            _ => sample.spo2,
        }
    });
    let targets = samples
        .iter()
        .map(|sample| sample.sepsis as usize)
        .collect::<Array1<_>>();

    Dataset::new(records, targets).with_feature_names(FEATURE_NAMES.to_vec())
}

/// Synthesizes and assembles `n` samples
pub fn sepsis(n: usize, rng: &mut impl Rng) -> Dataset<f64, usize> {
    assemble(&vital_signs(n, rng))
}
