use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::classifiers::model::{ModelBuilder, ProbabilityModel};
use crate::classifiers::vocabulary::Vocabulary;
use crate::error::Result;
use crate::generic_types::{Label, Tokenizer};

/// Outcome of scoring one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub decision: Label,
    pub log_real: f64,
    pub log_spam: f64,
}

/// Score a tokenized document against `model`.
///
/// Tokens the model has never seen are skipped rather than penalized. Real wins
/// only on a strictly greater score, so ties (and NaN) resolve to spam.
pub fn classify<'a, I>(document: I, model: &ProbabilityModel) -> Classification
where
    I: IntoIterator<Item = &'a str>,
{
    let priors = model.priors();
    let mut log_real = priors.real.ln();
    let mut log_spam = priors.spam.ln();

    // Reference penalty for a word neither class has counted.
    let not_in = (1.0 / model.total_words() as f64).ln();

    for token in document {
        let Some(likelihood) = model.get(token) else {
            continue;
        };

        if likelihood.real_count == 0 && likelihood.spam_count == 0 {
            log_real += not_in;
            log_spam += not_in;
        } else {
            log_real += likelihood.real.ln();
            log_spam += likelihood.spam.ln();
        }
    }

    if log_real == f64::NEG_INFINITY || log_spam == f64::NEG_INFINITY {
        debug!("Zero probability reached: log_real={}, log_spam={}", log_real, log_spam);
    }

    let decision = if log_real > log_spam { Label::Real } else { Label::Spam };
    Classification { decision, log_real, log_spam }
}

#[derive(Debug, Clone)]
/// Struct for the Naive Bayes Classifier
pub struct NaiveBayes {
    model: Arc<ProbabilityModel>,
}

impl NaiveBayes {
    pub fn new(model: Arc<ProbabilityModel>) -> Self {
        NaiveBayes { model }
    }

    /// Train the classifier from an aggregated vocabulary
    pub fn train(vocab: &Vocabulary, builder: &ModelBuilder) -> Result<Self> {
        let model = builder.build(vocab)?;
        Ok(NaiveBayes::new(Arc::new(model)))
    }

    /// Classify a given line of text
    pub fn classify(&self, text: &str) -> Classification {
        classify(Tokenizer::tokenize(text), &self.model)
    }

    pub fn model(&self) -> &Arc<ProbabilityModel> {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::vocabulary::VocabularyAggregator;

    const EPS: f64 = 1e-12;

    fn train(real: &[&str], spam: &[&str], smoothing: u32) -> NaiveBayes {
        let agg = VocabularyAggregator::new();
        agg.ingest_lines(real.iter().map(|s| Ok(s.to_string())), Label::Real).unwrap();
        agg.ingest_lines(spam.iter().map(|s| Ok(s.to_string())), Label::Spam).unwrap();
        let vocab = agg.finish().unwrap();
        NaiveBayes::train(&vocab, &ModelBuilder::new(smoothing)).unwrap()
    }

    fn scenario(smoothing: u32) -> NaiveBayes {
        train(&["buy now", "meeting today"], &["buy cheap now", "buy buy now"], smoothing)
    }

    #[test]
    fn test_scores_sum_log_likelihoods() {
        let nb = scenario(1);
        let c = nb.classify("buy cheap");
        let expected_real = 0.5f64.ln() + (2.0f64 / 9.0).ln() + (1.0f64 / 9.0).ln();
        let expected_spam = 0.5f64.ln() + (4.0f64 / 11.0).ln() + (2.0f64 / 11.0).ln();
        assert!((c.log_real - expected_real).abs() < EPS);
        assert!((c.log_spam - expected_spam).abs() < EPS);
        assert_eq!(c.decision, Label::Spam);

        assert_eq!(nb.classify("meeting today").decision, Label::Real);
    }

    #[test]
    fn test_out_of_vocabulary_uses_priors_only() {
        let nb = train(&["hello there", "see you", "lunch"], &["win"], 1);
        let c = nb.classify("zebra QUANTUM xylophone");
        let priors = nb.model().priors();
        assert_eq!(c.log_real, priors.real.ln());
        assert_eq!(c.log_spam, priors.spam.ln());
        assert_eq!(c.decision, Label::Real);
    }

    #[test]
    fn test_tie_resolves_to_spam() {
        // Equal priors, empty document
        let nb = scenario(1);
        let c = nb.classify("");
        assert_eq!(c.log_real, c.log_spam);
        assert_eq!(c.decision, Label::Spam);
    }

    #[test]
    fn test_zero_smoothing_propagates_negative_infinity() {
        let nb = scenario(0);
        let c = nb.classify("buy cheap now");
        assert_eq!(c.log_real, f64::NEG_INFINITY);
        assert!(c.log_spam.is_finite());
        assert_eq!(c.decision, Label::Spam);

        let c = nb.classify("meeting");
        assert_eq!(c.log_spam, f64::NEG_INFINITY);
        assert_eq!(c.decision, Label::Real);

        // Both zeroed: -inf > -inf is false
        let c = nb.classify("meeting cheap");
        assert_eq!(c.decision, Label::Spam);
    }

    #[test]
    fn test_reclassification_is_idempotent() {
        let nb = scenario(2);
        let first = nb.classify("buy now meeting cheap unknown");
        for _ in 0..10 {
            assert_eq!(nb.classify("buy now meeting cheap unknown"), first);
        }
    }

    #[test]
    fn test_free_function_matches_wrapper() {
        let nb = scenario(1);
        let tokens = ["buy", "today"];
        assert_eq!(classify(tokens, nb.model()), nb.classify("buy today"));
    }
}
