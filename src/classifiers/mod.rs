pub mod evaluation;
pub mod model;
pub mod naive_bayes;
pub mod vocabulary;

pub use evaluation::{ConfusionCounters, ConfusionMatrix, Metric, Summary};
pub use model::{ClassPriors, ModelBuilder, ProbabilityModel, WordLikelihood};
pub use naive_bayes::{classify, Classification, NaiveBayes};
pub use vocabulary::{ClassStatistics, FrequencyTable, Vocabulary, VocabularyAggregator};
