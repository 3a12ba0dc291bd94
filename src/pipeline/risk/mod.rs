pub mod thresholds;
pub mod classifier;

pub use thresholds::*;
pub use classifier::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThresholdError {
    #[error("Failed to read threshold settings {0}: {1}")]
    Read(String, String),

    #[error("Threshold settings parse error: {0}")]
    Parse(String),
}
