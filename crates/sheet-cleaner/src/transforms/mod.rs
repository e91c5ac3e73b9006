//! Value transforms applied after imputation and row discarding.
//!
//! - [`MinMaxNormalizer`] rescales numeric columns to [0, 1]
//! - [`CategoryEncoder`] maps category labels to integer codes

mod encode;
mod normalize;

pub use encode::{CategoryEncoder, EncodingOutcome};
pub use normalize::{MinMaxNormalizer, NormalizationOutcome};
