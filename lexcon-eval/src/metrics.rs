use std::fmt;

use clap::ValueEnum;
use lexcon_constraints::{satisfies_ordered, satisfies_template, TokenId, TokenResolver};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{descriptor::RunDescriptor, errors::EvalError, records::GenerationRecord};

/// Which kind of constraint the outputs were generated with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Template segments must follow the prompt at fixed offsets
    Template,
    /// Segments must appear after the prompt in order
    Ordered,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => write!(f, "template"),
            Self::Ordered => write!(f, "ordered"),
        }
    }
}

/// `FileMetrics` - constraint satisfaction and latency over one result file
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FileMetrics {
    /// Number of evaluated outputs
    pub outputs: usize,
    /// Number of outputs satisfying their constraint
    pub satisfied: usize,
    /// Fraction of outputs satisfying their constraint
    pub accuracy: f64,
    /// Average generation time per output, in seconds
    pub time_per_sentence: f64,
    /// Average generation time per output token, in seconds
    pub time_per_token: f64,
}

/// `ReportRow` - metrics of a result file, with the run settings it encodes
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    /// Result file name
    pub file_name: String,
    /// Run settings parsed from the file name
    pub descriptor: RunDescriptor,
    /// Computed metrics
    pub metrics: FileMetrics,
}

fn resolve<R>(resolver: &R, text: &str) -> Result<Vec<TokenId>, EvalError>
where
    R: TokenResolver + ?Sized,
{
    resolver.resolve(text).map_err(|e| EvalError::Resolve {
        text: text.to_string(),
        source: e.into(),
    })
}

/// Token a constraint segment requires. A non-empty segment that encodes to
/// no token at all stays in the constraint as `Unresolved`, which no output
/// token equals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExpectedToken {
    Id(TokenId),
    Unresolved,
}

fn expected_tokens<R>(resolver: &R, segment: &str) -> Result<Vec<ExpectedToken>, EvalError>
where
    R: TokenResolver + ?Sized,
{
    let token_ids = resolve(resolver, segment)?;
    if token_ids.is_empty() {
        trace!(
            target = "lexcon_eval",
            event = "segment-unresolved",
            segment,
            "Segment encodes to no token, it cannot be satisfied"
        );
        return Ok(vec![ExpectedToken::Unresolved]);
    }
    Ok(token_ids.into_iter().map(ExpectedToken::Id).collect())
}

/// Template slots of a record, every token of a segment is a concrete slot
fn template_slots<R>(
    resolver: &R,
    segments: &[String],
) -> Result<Vec<Option<ExpectedToken>>, EvalError>
where
    R: TokenResolver + ?Sized,
{
    let mut slots = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.is_empty() {
            slots.push(None);
        } else {
            slots.extend(expected_tokens(resolver, segment)?.into_iter().map(Some));
        }
    }
    Ok(slots)
}

/// Tokens an ordered record requires, in order. Empty segments carry no
/// requirement.
fn ordered_tokens<R>(resolver: &R, segments: &[String]) -> Result<Vec<ExpectedToken>, EvalError>
where
    R: TokenResolver + ?Sized,
{
    let mut tokens = Vec::with_capacity(segments.len());
    for segment in segments.iter().filter(|segment| !segment.is_empty()) {
        tokens.extend(expected_tokens(resolver, segment)?);
    }
    Ok(tokens)
}

fn as_expected(token_ids: &[TokenId]) -> Vec<ExpectedToken> {
    token_ids.iter().copied().map(ExpectedToken::Id).collect()
}

/// Computes satisfaction and latency metrics over `records`
pub fn evaluate_records<R>(
    resolver: &R,
    records: &[GenerationRecord],
    mode: EvaluationMode,
) -> Result<FileMetrics, EvalError>
where
    R: TokenResolver + ?Sized,
{
    let mut outputs = 0;
    let mut satisfied = 0;
    let mut total_tokens = 0;
    let mut total_time = 0.0;

    for record in records {
        let prompt = as_expected(&resolve(resolver, &record.starting_text)?);
        let template = match mode {
            EvaluationMode::Template => template_slots(resolver, &record.template)?,
            EvaluationMode::Ordered => vec![],
        };
        let expected = match mode {
            EvaluationMode::Template => vec![],
            EvaluationMode::Ordered => ordered_tokens(resolver, &record.template)?,
        };

        for output in &record.generated_outputs {
            let tokens = as_expected(&resolve(resolver, output)?);
            outputs += 1;
            total_time += record.time_taken;
            total_tokens += tokens.len();

            let is_satisfied = match mode {
                EvaluationMode::Template => satisfies_template(&prompt, &tokens, &template),
                EvaluationMode::Ordered => satisfies_ordered(&prompt, &tokens, &expected),
            };
            trace!(
                target = "lexcon_eval",
                event = "output-evaluated",
                satisfied = is_satisfied,
                num_tokens = tokens.len(),
            );
            if is_satisfied {
                satisfied += 1;
            }
        }
    }

    if outputs == 0 {
        return Ok(FileMetrics::default());
    }
    Ok(FileMetrics {
        outputs,
        satisfied,
        accuracy: satisfied as f64 / outputs as f64,
        time_per_sentence: total_time / outputs as f64,
        time_per_token: if total_tokens > 0 {
            total_time / total_tokens as f64
        } else {
            0.0
        },
    })
}

/// Renders report rows as a plain text table
pub fn render_table(rows: &[ReportRow], mode: EvaluationMode) -> String {
    let mut table = format!("=== Computed Metrics for mode: {mode} ===\n\n");
    table.push_str(&format!(
        "{:<32} {:>5} {:>7} {:>6} {:>8} {:>15} {:>12}\n",
        "Model", "Beams", "Returns", "MaxLen", "Accuracy", "TimePerSentence", "TimePerToken"
    ));
    for row in rows {
        table.push_str(&format!(
            "{:<32} {:>5} {:>7} {:>6} {:>8.4} {:>15.6} {:>12.6}\n",
            row.descriptor.model,
            row.descriptor.beams,
            row.descriptor.returns,
            row.descriptor.max_length,
            row.metrics.accuracy,
            row.metrics.time_per_sentence,
            row.metrics.time_per_token,
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_tokenizer;

    fn record(template: &[&str], outputs: &[&str]) -> GenerationRecord {
        GenerationRecord {
            starting_text: "the cat".to_string(),
            template: template.iter().map(|s| s.to_string()).collect(),
            generated_outputs: outputs.iter().map(|s| s.to_string()).collect(),
            time_taken: 2.0,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_template_metrics() {
        let tokenizer = test_tokenizer();
        let records = [record(
            &["sat", "", "the"],
            &["the cat sat on the mat", "the cat on the mat sat"],
        )];
        let metrics = evaluate_records(&tokenizer, &records, EvaluationMode::Template).unwrap();
        assert_eq!(metrics.outputs, 2);
        assert_eq!(metrics.satisfied, 1);
        assert_close(metrics.accuracy, 0.5);
        assert_close(metrics.time_per_sentence, 2.0);
        assert_close(metrics.time_per_token, 4.0 / 12.0);
    }

    #[test]
    fn test_segment_without_tokens_is_never_satisfied() {
        let tokenizer = test_tokenizer();
        let records = [record(&[" ", "the"], &["the cat the", "the cat sat the"])];

        // the blank segment keeps its slot, so "the" is expected at offset 1
        let template = evaluate_records(&tokenizer, &records, EvaluationMode::Template).unwrap();
        assert_eq!(template.outputs, 2);
        assert_eq!(template.satisfied, 0);

        let ordered = evaluate_records(&tokenizer, &records, EvaluationMode::Ordered).unwrap();
        assert_eq!(ordered.satisfied, 0);
        assert_close(ordered.accuracy, 0.0);

        let records = [record(&["", "the"], &["the cat sat the"])];
        let ordered = evaluate_records(&tokenizer, &records, EvaluationMode::Ordered).unwrap();
        assert_eq!(ordered.satisfied, 1);
    }

    #[test]
    fn test_ordered_metrics() {
        let tokenizer = test_tokenizer();
        let records = [record(
            &["on", "mat"],
            &["the cat sat on the mat", "the cat on the mat sat"],
        )];
        let ordered = evaluate_records(&tokenizer, &records, EvaluationMode::Ordered).unwrap();
        assert_eq!(ordered.satisfied, 2);
        assert_close(ordered.accuracy, 1.0);

        let template = evaluate_records(&tokenizer, &records, EvaluationMode::Template).unwrap();
        assert_eq!(template.satisfied, 0);
    }

    #[test]
    fn test_output_not_continuing_prompt_fails() {
        let tokenizer = test_tokenizer();
        let records = [record(&["sat"], &["a cat sat"])];
        let metrics = evaluate_records(&tokenizer, &records, EvaluationMode::Ordered).unwrap();
        assert_eq!(metrics.satisfied, 0);
    }

    struct OfflineResolver;

    impl TokenResolver for OfflineResolver {
        type Error = std::io::Error;

        fn resolve(&self, _text: &str) -> Result<Vec<TokenId>, Self::Error> {
            Err(std::io::Error::other("tokenizer unavailable"))
        }
    }

    #[test]
    fn test_resolve_failure_keeps_source() {
        let records = [record(&["sat"], &["the cat sat"])];
        let error = evaluate_records(&OfflineResolver, &records, EvaluationMode::Ordered)
            .unwrap_err();
        match &error {
            EvalError::Resolve { text, .. } => assert_eq!(text, "the cat"),
            other => panic!("Unexpected error: {other:?}"),
        }
        let source = std::error::Error::source(&error).expect("Missing error source");
        assert_eq!(source.to_string(), "tokenizer unavailable");
    }

    #[test]
    fn test_no_outputs() {
        let tokenizer = test_tokenizer();
        let metrics = evaluate_records(&tokenizer, &[], EvaluationMode::Template).unwrap();
        assert_eq!(metrics, FileMetrics::default());
    }

    #[test]
    fn test_render_table() {
        let rows = vec![ReportRow {
            file_name: "x-modelgpt2-beams3-ret3-maxlen100.jsonl".to_string(),
            descriptor: RunDescriptor {
                model: "gpt2".to_string(),
                beams: 3,
                returns: 3,
                max_length: 100,
            },
            metrics: FileMetrics {
                outputs: 4,
                satisfied: 3,
                accuracy: 0.75,
                time_per_sentence: 1.5,
                time_per_token: 0.125,
            },
        }];
        let table = render_table(&rows, EvaluationMode::Ordered);
        assert!(table.starts_with("=== Computed Metrics for mode: ordered ==="));
        let line = table.lines().last().unwrap();
        assert!(line.starts_with("gpt2"));
        assert!(line.contains("0.7500"));
        assert!(line.contains("1.500000"));
        assert!(line.contains("0.125000"));
    }
}
