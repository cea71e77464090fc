// Run orchestration:
// - Train: both training corpora are ingested concurrently into one shared
//   VocabularyAggregator, then the model is built on a blocking thread.
// - Evaluate: both validation corpora are classified concurrently against the
//   shared model; the only shared mutable state is the ConfusionCounters.
//
// File reading and tokenizing are CPU/blocking work, so each corpus runs in
// tokio's blocking pool.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::task;
use tracing::{debug, info};

use crate::classifiers::evaluation::{ConfusionCounters, Summary};
use crate::classifiers::model::ModelBuilder;
use crate::classifiers::naive_bayes::NaiveBayes;
use crate::classifiers::vocabulary::VocabularyAggregator;
use crate::config::Config;
use crate::error::{ClassifierError, Result};
use crate::generic_types::Label;
use crate::logging::Logger;

/// The four corpus files of a run.
#[derive(Debug, Clone)]
pub struct Corpora {
    pub real_training: PathBuf,
    pub spam_training: PathBuf,
    pub real_validation: PathBuf,
    pub spam_validation: PathBuf,
}

// -----------------------------------------------------------------------------
// Progress
// -----------------------------------------------------------------------------

/// One spinner per corpus, all drawn through a shared MultiProgress.
#[derive(Clone)]
pub struct Progress {
    multi: MultiProgress,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        let multi = if enabled {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        Self { multi }
    }

    fn corpus_bar(&self, message: String) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} lines {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

fn open_corpus(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| ClassifierError::Io(e).with_path(path))
}

// -----------------------------------------------------------------------------
// Training
// -----------------------------------------------------------------------------

/// Ingest one training corpus file into `aggregator`.
pub fn ingest_corpus(
    aggregator: &VocabularyAggregator,
    path: &Path,
    label: Label,
    pb: &ProgressBar,
) -> Result<u64> {
    let reader = open_corpus(path)?;
    aggregator
        .ingest_lines(reader.lines().inspect(|_| pb.inc(1)), label)
        .map_err(|e| e.with_path(path))
}

/// Train on both corpora concurrently and build the model.
pub async fn train(real: &Path, spam: &Path, builder: ModelBuilder, progress: &Progress) -> Result<NaiveBayes> {
    info!("Training on {} (real) and {} (spam)", real.display(), spam.display());
    let aggregator = VocabularyAggregator::new();

    let spawn_ingest = |path: &Path, label: Label| {
        let aggregator = aggregator.clone();
        let path = path.to_path_buf();
        let pb = progress.corpus_bar(format!("training {}", label));
        task::spawn_blocking(move || {
            Logger::with_span(&label.to_string(), || {
                let docs = ingest_corpus(&aggregator, &path, label, &pb);
                pb.finish();
                docs
            })
        })
    };

    let real_task = spawn_ingest(real, Label::Real);
    let spam_task = spawn_ingest(spam, Label::Spam);
    let (real_docs, spam_docs) = tokio::try_join!(real_task, spam_task)?;
    let (real_docs, spam_docs) = (real_docs?, spam_docs?);

    let vocab = aggregator.finish()?;
    info!(
        "Vocabulary: {} words; real {} docs / {} words; spam {} docs / {} words",
        vocab.size(),
        real_docs,
        vocab.real_stats.total_words,
        spam_docs,
        vocab.spam_stats.total_words
    );

    let nb = task::spawn_blocking(move || NaiveBayes::train(&vocab, &builder)).await??;
    info!(
        "Model ready: {} words, smoothing {}",
        nb.model().vocabulary_size(),
        nb.model().smoothing()
    );
    Ok(nb)
}

// -----------------------------------------------------------------------------
// Evaluation
// -----------------------------------------------------------------------------

/// Classify every line and record the outcome against `truth`. A line with no
/// tokens is still a document and is decided by the priors alone.
/// Returns the number of documents classified.
pub fn evaluate_lines<I, S>(nb: &NaiveBayes, lines: I, truth: Label, counters: &ConfusionCounters) -> Result<u64>
where
    I: IntoIterator<Item = io::Result<S>>,
    S: AsRef<str>,
{
    let mut documents = 0u64;
    for line in lines {
        let line = line?;
        let result = nb.classify(line.as_ref());
        counters.record(result.decision, truth);
        documents += 1;
    }
    debug!("Classified {} {} documents", documents, truth);
    Ok(documents)
}

fn evaluate_corpus(
    nb: &NaiveBayes,
    path: &Path,
    truth: Label,
    counters: &ConfusionCounters,
    pb: &ProgressBar,
) -> Result<u64> {
    let reader = open_corpus(path)?;
    evaluate_lines(nb, reader.lines().inspect(|_| pb.inc(1)), truth, counters)
        .map_err(|e| e.with_path(path))
}

/// Classify both validation corpora concurrently and summarize.
pub async fn evaluate(nb: &NaiveBayes, real: &Path, spam: &Path, progress: &Progress) -> Result<Summary> {
    info!("Evaluating on {} (real) and {} (spam)", real.display(), spam.display());
    let counters = Arc::new(ConfusionCounters::new());

    let spawn_eval = |path: &Path, truth: Label| {
        let nb = nb.clone();
        let counters = Arc::clone(&counters);
        let path = path.to_path_buf();
        let pb = progress.corpus_bar(format!("validating {}", truth));
        task::spawn_blocking(move || {
            Logger::with_span(&truth.to_string(), || {
                let docs = evaluate_corpus(&nb, &path, truth, &counters, &pb);
                pb.finish();
                docs
            })
        })
    };

    let real_task = spawn_eval(real, Label::Real);
    let spam_task = spawn_eval(spam, Label::Spam);
    let (real_docs, spam_docs) = tokio::try_join!(real_task, spam_task)?;
    info!("Classified {} real and {} spam documents", real_docs?, spam_docs?);

    Ok(counters.summarize())
}

/// Train, then evaluate, with the settings in `config`.
pub async fn run(corpora: &Corpora, config: &Config) -> Result<Summary> {
    config.validate()?;
    let progress = Progress::new(config.report.progress);
    let builder = ModelBuilder::new(config.training.smoothing).with_partitions(config.training.partitions);

    let nb = train(&corpora.real_training, &corpora.spam_training, builder, &progress).await?;
    evaluate(&nb, &corpora.real_validation, &corpora.spam_validation, &progress).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::evaluation::{ConfusionMatrix, Metric};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_corpus(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn corpora(dir: &TempDir, real_valid: &[&str], spam_valid: &[&str]) -> Corpora {
        Corpora {
            real_training: write_corpus(
                dir,
                "real_train.txt",
                &["meeting moved to monday", "lunch with the team today", "see the report attached"],
            ),
            spam_training: write_corpus(
                dir,
                "spam_train.txt",
                &["buy cheap pills now", "win money now", "cheap cheap offer click now"],
            ),
            real_validation: write_corpus(dir, "real_valid.txt", real_valid),
            spam_validation: write_corpus(dir, "spam_valid.txt", spam_valid),
        }
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let corpora = corpora(
            &dir,
            &["team meeting today", "report for monday", "", "buy lunch now"],
            &["cheap pills", "click now to win", "see the team"],
        );

        let summary = run(&corpora, &Config::default()).await.unwrap();
        assert_eq!(
            summary.counters,
            ConfusionMatrix { true_positive: 2, false_negative: 2, true_negative: 2, false_positive: 1 }
        );
        assert_eq!(summary.accuracy, Metric::Value(4.0 / 7.0));
        assert!(summary.undefined_metrics().is_empty());
    }

    #[tokio::test]
    async fn test_partitions_do_not_change_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let corpora = corpora(&dir, &["team meeting today", "win the report"], &["cheap offer now", "lunch now"]);

        let mut config = Config::default();
        config.training.partitions = 1;
        let single = run(&corpora, &config).await.unwrap();
        config.training.partitions = 16;
        let sharded = run(&corpora, &config).await.unwrap();
        assert_eq!(single, sharded);
    }

    #[tokio::test]
    async fn test_empty_spam_validation_is_degenerate() {
        let dir = tempfile::tempdir().unwrap();
        let corpora = corpora(&dir, &["team meeting today", "cheap pills now"], &[]);

        let summary = run(&corpora, &Config::default()).await.unwrap();
        assert_eq!(summary.specificity, Metric::Undefined);
        assert_eq!(summary.sensitivity, Metric::Value(0.5));
        assert_eq!(summary.undefined_metrics(), vec!["specificity"]);
    }

    #[tokio::test]
    async fn test_missing_corpus_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut corpora = corpora(&dir, &["a"], &["b"]);
        corpora.spam_training = dir.path().join("does_not_exist.txt");

        let err = run(&corpora, &Config::default()).await.unwrap_err();
        match err {
            ClassifierError::Corpus { path, source } => {
                assert!(path.ends_with("does_not_exist.txt"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_train_counts_documents() {
        let dir = tempfile::tempdir().unwrap();
        let corpora = corpora(&dir, &[], &[]);
        let nb = train(&corpora.real_training, &corpora.spam_training, ModelBuilder::new(1), &Progress::new(false))
            .await
            .unwrap();
        let priors = nb.model().priors();
        assert!((priors.real - 0.5).abs() < 1e-12);
        assert_eq!(nb.model().total_words(), 13 + 12);
        assert_eq!(nb.model().smoothing(), 1);
    }

    #[test]
    fn test_evaluate_lines_counts_blank_lines() {
        let vocab = {
            let agg = VocabularyAggregator::new();
            agg.ingest_lines(["good day", "fine day"].iter().map(|s| Ok(s.to_string())), Label::Real).unwrap();
            agg.ingest_lines(["bad deal"].iter().map(|s| Ok(s.to_string())), Label::Spam).unwrap();
            agg.finish().unwrap()
        };
        // P(real) = 3/5, so a tokenless line goes to real on the priors
        let nb = NaiveBayes::train(&vocab, &ModelBuilder::new(1)).unwrap();
        let counters = ConfusionCounters::new();
        let lines: Vec<io::Result<String>> =
            vec![Ok("good".into()), Ok(String::new()), Ok("   ".into()), Ok("bad".into())];
        let docs = evaluate_lines(&nb, lines, Label::Real, &counters).unwrap();
        assert_eq!(docs, 4);
        assert_eq!(counters.snapshot(), ConfusionMatrix { true_positive: 3, false_negative: 1, ..Default::default() });
    }
}
