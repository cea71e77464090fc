pub mod classifiers;
pub mod config;
pub mod error;
pub mod generic_types;
pub mod logging;
pub mod options;
pub mod pipeline;

pub use classifiers::{
    ConfusionCounters, ConfusionMatrix, Metric, ModelBuilder, NaiveBayes, ProbabilityModel, Summary,
    Vocabulary, VocabularyAggregator,
};
pub use error::{ClassifierError, Result};
pub use generic_types::{Label, Tokenizer};
