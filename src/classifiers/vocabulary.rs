use std::collections::HashMap;
use std::io::{self, BufRead};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{ClassifierError, Result};
use crate::generic_types::{Label, Tokenizer};

/// Word -> occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, word: &str) {
        match self.counts.get_mut(word) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(word.to_string(), 1);
            }
        }
    }

    /// Count for `word`, zero when unseen.
    pub fn count(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassStatistics {
    pub total_words: u64,
    pub documents: u64,
}

/// Everything the training corpora contributed: per-class tables, the union
/// table and per-class totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    pub real: FrequencyTable,
    pub spam: FrequencyTable,
    pub combined: FrequencyTable,
    pub real_stats: ClassStatistics,
    pub spam_stats: ClassStatistics,
}

impl Vocabulary {
    /// Number of distinct words across both classes.
    pub fn size(&self) -> usize {
        self.combined.len()
    }

    pub fn total_words(&self) -> u64 {
        self.real_stats.total_words + self.spam_stats.total_words
    }

    /// Apply one document's tokens to the tables of `label`.
    fn apply(&mut self, tokens: &[&str], label: Label) {
        let (table, stats) = match label {
            Label::Real => (&mut self.real, &mut self.real_stats),
            Label::Spam => (&mut self.spam, &mut self.spam_stats),
        };
        for token in tokens {
            table.increment(token);
            self.combined.increment(token);
        }
        stats.total_words += tokens.len() as u64;
        stats.documents += 1;
    }
}

/// Shared accumulator for training corpora. Clones share the same tables, so
/// each producer thread gets its own handle.
#[derive(Debug, Clone, Default)]
pub struct VocabularyAggregator {
    inner: Arc<Mutex<Vocabulary>>,
}

impl VocabularyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest every line of one labeled corpus. Returns the number of documents
    /// (non-blank lines) added. The first read error aborts ingestion.
    pub fn ingest_lines<I, S>(&self, lines: I, label: Label) -> Result<u64>
    where
        I: IntoIterator<Item = io::Result<S>>,
        S: AsRef<str>,
    {
        let mut documents = 0u64;
        for line in lines {
            let line = line?;
            let tokens: Vec<&str> = Tokenizer::tokenize(line.as_ref()).collect();
            if tokens.is_empty() {
                continue;
            }

            // One lock per document; tokenizing happens outside it.
            let mut vocab = self.inner.lock().map_err(|_| ClassifierError::Poisoned)?;
            vocab.apply(&tokens, label);
            documents += 1;
        }
        debug!("Ingested {} {} documents", documents, label);
        Ok(documents)
    }

    pub fn ingest_reader<R: BufRead>(&self, reader: R, label: Label) -> Result<u64> {
        self.ingest_lines(reader.lines(), label)
    }

    /// Snapshot of the accumulated tables. Call once all producers have joined.
    pub fn finish(self) -> Result<Vocabulary> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().map_err(|_| ClassifierError::Poisoned),
            Err(shared) => {
                let vocab = shared.lock().map_err(|_| ClassifierError::Poisoned)?;
                Ok(vocab.clone())
            }
        }
    }
}
