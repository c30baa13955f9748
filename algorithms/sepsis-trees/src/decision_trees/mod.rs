mod algorithm;
mod hyperparams;
mod iter;
pub mod random_forest;

pub use algorithm::*;
pub use hyperparams::*;
pub use iter::*;
