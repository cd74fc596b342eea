use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use config::{Config, File};
use serde::Deserialize;

/// Max length of runs that are left out of the report by default
const DEFAULT_SKIP_MAX_LENGTHS: [usize; 1] = [1024];
/// Max length assumed when a result file name does not carry one
const DEFAULT_MAX_LENGTH: usize = 100;

/// Configuration for the lexcon evaluator.
///
/// Read from the `lexcon_eval` section of a configuration file, with
/// environment overrides such as `LEXCON_EVAL__OUTPUT_DIR`.
#[derive(Clone, Debug, Deserialize)]
pub struct LexconEvalConfig {
    /// Directory holding the generation result files (`*.jsonl`)
    pub output_dir: PathBuf,

    /// Path of the `tokenizer.json` file to use for each model name, as it
    /// appears in the result file names
    #[serde(default)]
    pub tokenizers: HashMap<String, PathBuf>,

    /// Result files generated with one of these max lengths are skipped
    #[serde(default = "default_skip_max_lengths")]
    pub skip_max_lengths: Vec<usize>,

    /// Max length assumed for result files without a `-maxlen` suffix
    #[serde(default = "default_max_length")]
    pub default_max_length: usize,
}

fn default_skip_max_lengths() -> Vec<usize> {
    DEFAULT_SKIP_MAX_LENGTHS.to_vec()
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

impl LexconEvalConfig {
    /// Constructor
    pub fn new(output_dir: PathBuf, tokenizers: HashMap<String, PathBuf>) -> Self {
        Self {
            output_dir,
            tokenizers,
            skip_max_lengths: default_skip_max_lengths(),
            default_max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Creates a new `LexconEvalConfig` instance from a configuration file.
    ///
    /// # Arguments
    ///
    /// * `config_file_path` - Path to the configuration file, in any format
    ///   supported by the `config` crate (TOML, YAML, JSON), containing a
    ///   `lexcon_eval` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// `lexcon_eval` section is missing or malformed.
    pub fn from_file_path<P: AsRef<Path>>(
        config_file_path: P,
    ) -> Result<Self, config::ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(config_file_path.as_ref()))
            .add_source(
                config::Environment::with_prefix("LEXCON_EVAL")
                    .keep_prefix(true)
                    .separator("__"),
            );
        let config = builder.build()?;
        config.get::<Self>("lexcon_eval")
    }

    /// Tokenizer path configured for `model`. Model names are matched case
    /// insensitively, since configuration keys are normalized to lowercase.
    pub fn tokenizer_path(&self, model: &str) -> Option<&Path> {
        self.tokenizers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(model))
            .map(|(_, path)| path.as_path())
    }
}
