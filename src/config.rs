use std::fmt;
use std::path::Path;

use serde::Deserialize;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};

use crate::classifiers::model::DEFAULT_PARTITIONS;
use crate::error::{ClassifierError, Result};

const DEFAULT_CONFIG_FILE: &str = "nb_classify";
const ENV_PREFIX: &str = "NB";

#[derive(Debug, Clone, Hash, Deserialize)]
pub struct TrainingConfig {
    /// Laplace smoothing constant.
    pub smoothing: u32,
    /// Vocabulary shards computed in parallel while building the model.
    pub partitions: usize,
}

#[derive(Clone, Hash, Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Hash, Deserialize)]
pub struct ReportConfig {
    pub json: bool,
    pub progress: bool,
}

#[derive(Debug, Clone, Hash, Deserialize)]
pub struct Config {
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Defaults, then `path` (or `nb_classify.toml` if present), then `NB_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Builder
        let mut builder = ConfigBuilder::<DefaultState>::default()
            .set_default("training.smoothing", 1i64)?
            .set_default("training.partitions", DEFAULT_PARTITIONS as i64)?
            .set_default("logging.level", "info")?
            .set_default("report.json", false)?
            .set_default("report.progress", false)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        // NB_TRAINING__SMOOTHING=2 -> training.smoothing
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder
            .build()
            .map_err(|e| ConfigError::FileParse { uri: path.map(|p| p.display().to_string()), cause: Box::new(e) })?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.training.partitions == 0 {
            return Err(ClassifierError::InvalidParameter(
                "training.partitions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            training: TrainingConfig { smoothing: 1, partitions: DEFAULT_PARTITIONS },
            logging: LoggingConfig { level: "info".to_string() },
            report: ReportConfig { json: false, progress: false },
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "smoothing={} partitions={} log={}",
            self.training.smoothing, self.training.partitions, self.logging.level
        )
    }
}
