use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::classifiers::vocabulary::{FrequencyTable, Vocabulary};
use crate::error::{ClassifierError, Result};

pub const DEFAULT_PARTITIONS: usize = 4;

/// Smoothed likelihoods of one word, plus the raw counts they came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordLikelihood {
    pub real: f64,
    pub spam: f64,
    pub real_count: u64,
    pub spam_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassPriors {
    pub real: f64,
    pub spam: f64,
}

/// Trained model. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityModel {
    likelihoods: HashMap<String, WordLikelihood>,
    priors: ClassPriors,
    total_words: u64,
    smoothing: u32,
}

impl ProbabilityModel {
    pub fn get(&self, word: &str) -> Option<&WordLikelihood> {
        self.likelihoods.get(word)
    }

    pub fn priors(&self) -> ClassPriors {
        self.priors
    }

    /// Number of training tokens across both classes.
    pub fn total_words(&self) -> u64 {
        self.total_words
    }

    pub fn smoothing(&self) -> u32 {
        self.smoothing
    }

    pub fn vocabulary_size(&self) -> usize {
        self.likelihoods.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WordLikelihood)> {
        self.likelihoods.iter().map(|(w, l)| (w.as_str(), l))
    }
}

/// Builds a `ProbabilityModel` from training counts with Laplace smoothing.
#[derive(Debug, Clone, Copy)]
pub struct ModelBuilder {
    smoothing: u32,
    partitions: usize,
}

impl ModelBuilder {
    pub fn new(smoothing: u32) -> Self {
        Self { smoothing, partitions: DEFAULT_PARTITIONS }
    }

    /// Number of vocabulary shards computed in parallel. Does not affect the result.
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn build(&self, vocab: &Vocabulary) -> Result<ProbabilityModel> {
        let priors = class_priors(
            vocab.real_stats.documents,
            vocab.spam_stats.documents,
            self.smoothing,
        )?;

        let likelihoods = likelihood_table(
            &vocab.real,
            &vocab.spam,
            vocab.real_stats.total_words,
            vocab.spam_stats.total_words,
            self.smoothing,
            self.partitions,
        )?;

        info!(
            "Model built: {} words, P(real)={:.6}, P(spam)={:.6}, smoothing={}",
            likelihoods.len(),
            priors.real,
            priors.spam,
            self.smoothing
        );

        Ok(ProbabilityModel {
            likelihoods,
            priors,
            total_words: vocab.total_words(),
            smoothing: self.smoothing,
        })
    }
}

/// P(real) = (realDocs + a) / (realDocs + spamDocs + 2a), P(spam) likewise.
pub fn class_priors(real_documents: u64, spam_documents: u64, smoothing: u32) -> Result<ClassPriors> {
    let a = smoothing as f64;
    let denominator = real_documents as f64 + spam_documents as f64 + 2.0 * a;
    if denominator == 0.0 {
        return Err(ClassifierError::EmptyTrainingData(
            "no training documents in either class".to_string(),
        ));
    }
    Ok(ClassPriors {
        real: (real_documents as f64 + a) / denominator,
        spam: (spam_documents as f64 + a) / denominator,
    })
}

/// Smoothed P(w|real) and P(w|spam) for every word in the union of both tables.
///
/// The union is split into `partitions` disjoint shards; each rayon task owns
/// its output map and the shards are merged after the join.
pub fn likelihood_table(
    real: &FrequencyTable,
    spam: &FrequencyTable,
    real_total_words: u64,
    spam_total_words: u64,
    smoothing: u32,
    partitions: usize,
) -> Result<HashMap<String, WordLikelihood>> {
    if partitions == 0 {
        return Err(ClassifierError::InvalidParameter(
            "partitions must be at least 1".to_string(),
        ));
    }

    let mut union: Vec<&str> = real.words().collect();
    union.extend(spam.words().filter(|w| !real.contains(w)));
    let vocab_size = union.len() as f64;
    if union.is_empty() {
        return Ok(HashMap::new());
    }

    let a = smoothing as f64;
    let real_denominator = real_total_words as f64 + a * vocab_size;
    let spam_denominator = spam_total_words as f64 + a * vocab_size;
    if real_denominator == 0.0 {
        return Err(ClassifierError::EmptyTrainingData("real corpus has no words".to_string()));
    }
    if spam_denominator == 0.0 {
        return Err(ClassifierError::EmptyTrainingData("spam corpus has no words".to_string()));
    }

    // Round-robin assignment keeps shard sizes within one word of each other.
    let mut shards: Vec<Vec<&str>> = vec![Vec::with_capacity(union.len() / partitions + 1); partitions];
    for (i, word) in union.into_iter().enumerate() {
        shards[i % partitions].push(word);
    }

    let computed: Vec<HashMap<String, WordLikelihood>> = shards
        .into_par_iter()
        .enumerate()
        .map(|(shard, words)| {
            let mut out = HashMap::with_capacity(words.len());
            for word in words {
                let real_count = real.count(word);
                let spam_count = spam.count(word);
                // Zero counts reduce to a / denominator, the unseen-in-class case.
                let likelihood = WordLikelihood {
                    real: (a + real_count as f64) / real_denominator,
                    spam: (a + spam_count as f64) / spam_denominator,
                    real_count,
                    spam_count,
                };
                out.insert(word.to_string(), likelihood);
            }
            debug!("Shard {} computed {} words", shard, out.len());
            out
        })
        .collect();

    let mut table = HashMap::with_capacity(vocab_size as usize);
    for shard in computed {
        table.extend(shard);
    }
    Ok(table)
}
