use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::EvalError;

/// `GenerationRecord` - one line of a generation result file: the prompt,
/// the constraint segments it was generated with, and the returned outputs.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GenerationRecord {
    /// Prompt the generation started from
    pub starting_text: String,
    /// Constraint segments, an empty segment stands for a wildcard
    pub template: Vec<String>,
    /// Decoded outputs, prompt included
    pub generated_outputs: Vec<String>,
    /// Wall clock generation time, in seconds
    pub time_taken: f64,
}

/// Parses JSON lines into records, blank lines are skipped
pub fn parse_records(contents: &str, path: &Path) -> Result<Vec<GenerationRecord>, EvalError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line.trim()).map_err(|source| EvalError::Record {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// Reads every record of a generation result file
pub async fn read_records(path: &Path) -> Result<Vec<GenerationRecord>, EvalError> {
    let contents = tokio::fs::read_to_string(path).await?;
    parse_records(&contents, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records() {
        let contents = r#"{"starting_text": "the cat", "template": ["", " sat"], "generated_outputs": ["the cat sat"], "time_taken": 0.5}

{"starting_text": "a", "template": [], "generated_outputs": [], "time_taken": 0.0, "sentence": "ignored"}
"#;
        let records = parse_records(contents, Path::new("run.jsonl")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].template, vec!["".to_string(), " sat".to_string()]);
        assert_eq!(records[0].generated_outputs, vec!["the cat sat".to_string()]);
        assert!(records[1].generated_outputs.is_empty());
    }

    #[test]
    fn test_parse_records_reports_line() {
        let contents = "{\"starting_text\": \"a\", \"template\": [], \"generated_outputs\": [], \"time_taken\": 1}\nnot json\n";
        match parse_records(contents, Path::new("run.jsonl")) {
            Err(EvalError::Record { line, path, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(path, Path::new("run.jsonl"));
            }
            other => panic!("Unexpected result: {other:?}"),
        }
    }
}
