use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::pipeline::Corpora;

/// Train a real/spam Naive Bayes classifier and score it on held-out corpora.
#[derive(Parser, Debug)]
#[command(name = "nb-classify", version)]
pub struct Options {
    /// Training corpus of real documents, one per line
    pub real_training: PathBuf,

    /// Training corpus of spam documents, one per line
    pub spam_training: PathBuf,

    /// Validation corpus of real documents
    pub real_validation: PathBuf,

    /// Validation corpus of spam documents
    pub spam_validation: PathBuf,

    /// Laplace smoothing constant (overrides the config file)
    pub smoothing: Option<u32>,

    /// Vocabulary shards used while building the model
    #[arg(short, long)]
    pub partitions: Option<usize>,

    /// Config file (defaults to ./nb_classify.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// trace | debug | info | warn | error
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Show per-corpus progress spinners
    #[arg(long)]
    pub progress: bool,
}

impl Options {
    /// Command-line values win over file and environment settings.
    pub fn apply(&self, config: &mut Config) {
        if let Some(smoothing) = self.smoothing {
            config.training.smoothing = smoothing;
        }
        if let Some(partitions) = self.partitions {
            config.training.partitions = partitions;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        config.report.json |= self.json;
        config.report.progress |= self.progress;
    }

    pub fn corpora(&self) -> Corpora {
        Corpora {
            real_training: self.real_training.clone(),
            spam_training: self.spam_training.clone(),
            real_validation: self.real_validation.clone(),
            spam_validation: self.spam_validation.clone(),
        }
    }
}
