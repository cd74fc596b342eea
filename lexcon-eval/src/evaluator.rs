use std::{collections::HashMap, sync::Arc};

use tokenizers::Tokenizer;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use crate::{
    config::LexconEvalConfig,
    descriptor::RunDescriptor,
    errors::EvalError,
    metrics::{evaluate_records, EvaluationMode, ReportRow},
    records::read_records,
};

const RESULT_FILE_EXTENSION: &str = "jsonl";

/// `Evaluator` - scores every generation result file of the configured
/// output directory.
pub struct Evaluator {
    /// Evaluator configuration
    config: LexconEvalConfig,
    /// Tokenizers already loaded, keyed by lowercase model name
    tokenizers: HashMap<String, Arc<Tokenizer>>,
}

impl Evaluator {
    /// Constructor
    pub fn new(config: LexconEvalConfig) -> Self {
        Self {
            config,
            tokenizers: HashMap::new(),
        }
    }

    /// Evaluator configuration
    pub fn config(&self) -> &LexconEvalConfig {
        &self.config
    }

    /// Loads the tokenizer configured for `model`, once per model
    fn tokenizer(&mut self, model: &str) -> Result<Option<Arc<Tokenizer>>, EvalError> {
        let key = model.to_lowercase();
        if let Some(tokenizer) = self.tokenizers.get(&key) {
            return Ok(Some(tokenizer.clone()));
        }
        let Some(path) = self.config.tokenizer_path(model) else {
            return Ok(None);
        };
        let tokenizer = Arc::new(Tokenizer::from_file(path)?);
        self.tokenizers.insert(key, tokenizer.clone());
        Ok(Some(tokenizer))
    }

    /// Evaluates every result file in the output directory, in `mode`.
    ///
    /// Files whose name does not describe a run, runs generated with a
    /// skipped max length, and models without a configured tokenizer are
    /// left out. Rows are sorted by file name.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&mut self, mode: EvaluationMode) -> Result<Vec<ReportRow>, EvalError> {
        let mut entries = tokio::fs::read_dir(&self.config.output_dir).await?;
        let mut tasks = JoinSet::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RESULT_FILE_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let file_name = file_name.to_string();
            let Some(descriptor) =
                RunDescriptor::parse(&file_name, self.config.default_max_length)
            else {
                info!(
                    target = "lexcon_eval",
                    event = "file-skipped",
                    "Skipping {file_name}, no run settings in its name"
                );
                continue;
            };
            if self.config.skip_max_lengths.contains(&descriptor.max_length) {
                info!(
                    target = "lexcon_eval",
                    event = "file-skipped",
                    "Skipping {file_name}, max length {} is excluded",
                    descriptor.max_length
                );
                continue;
            }
            let Some(tokenizer) = self.tokenizer(&descriptor.model)? else {
                warn!(
                    target = "lexcon_eval",
                    event = "file-skipped",
                    "No tokenizer configured for model {}, skipping {file_name}",
                    descriptor.model
                );
                continue;
            };

            let records = read_records(&path).await?;
            info!(
                target = "lexcon_eval",
                event = "file-evaluation-start",
                num_records = records.len(),
                "Evaluating {file_name}"
            );
            tasks.spawn_blocking(move || {
                let metrics = evaluate_records(tokenizer.as_ref(), &records, mode)?;
                Ok::<_, EvalError>(ReportRow {
                    file_name,
                    descriptor,
                    metrics,
                })
            });
        }

        let mut rows = Vec::with_capacity(tasks.len());
        while let Some(result) = tasks.join_next().await {
            rows.push(result??);
        }
        rows.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        info!(
            target = "lexcon_eval",
            event = "evaluation-done",
            num_files = rows.len(),
            "Evaluated {} result files in {}",
            rows.len(),
            self.config.output_dir.display()
        );
        Ok(rows)
    }
}
