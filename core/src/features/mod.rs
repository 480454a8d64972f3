//! Feature normalization: binary recoding, one-hot expansion of code
//! lists, min-max rescaling and the closed feature vocabulary.

pub mod binary;
pub mod multilabel;
pub mod rescale;
pub mod vocabulary;

pub use binary::{make_binary_column, BinaryPolicy};
pub use multilabel::{codes_of, observed_codes, MultiLabelBinarizer};
pub use rescale::{continuous_values, ColumnRange, MinMaxScaler};
pub use vocabulary::FEATURES;
