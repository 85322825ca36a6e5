//! Data preprocessing module
//!
//! Turns customer records into model input:
//! - Categorical label encoding (first-occurrence codes)
//! - Fixed-order feature vector assembly, per record and in batch
//! - Seeded train/test split
//! - Standard scaling with statistics frozen at fit time

mod encoder;
mod features;
mod scaler;
mod split;

pub use encoder::{CategoricalEncoders, LabelEncoder};
pub use features::{
    encode, feature_matrix, feature_vector, fit_encode, EncodedFeatureSet, FEATURE_COLUMNS,
    N_FEATURES,
};
pub use scaler::StandardScaler;
pub use split::{train_test_split, TrainTestSplit};
