use tracing::warn;

const MODEL_TAG: &str = "model";
const BEAMS_TAG: &str = "-beams";
const RETURNS_TAG: &str = "-ret";
const MAX_LENGTH_TAG: &str = "-maxlen";

/// `RunDescriptor` - generation settings encoded in a result file name, as in
/// `because_mode_gen-modelgpt2-beams3-ret3-maxlen100.jsonl`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunDescriptor {
    /// Model name
    pub model: String,
    /// Number of beams
    pub beams: usize,
    /// Number of returned sequences
    pub returns: usize,
    /// Max generation length
    pub max_length: usize,
}

impl RunDescriptor {
    /// Extracts `model<NAME>-beams<N>-ret<N>[-maxlen<N>]` from `file_name`.
    /// The model name is the shortest one that makes the rest match.
    pub fn parse(file_name: &str, default_max_length: usize) -> Option<Self> {
        file_name
            .match_indices(MODEL_TAG)
            .find_map(|(start, _)| {
                let rest = &file_name[start + MODEL_TAG.len()..];
                rest.match_indices(BEAMS_TAG)
                    .filter(|(end, _)| *end > 0)
                    .find_map(|(end, _)| {
                        let (beams, tail) = split_number(&rest[end + BEAMS_TAG.len()..])?;
                        let (returns, tail) = split_number(tail.strip_prefix(RETURNS_TAG)?)?;
                        let max_length = match tail.strip_prefix(MAX_LENGTH_TAG) {
                            Some(digits) if digits.starts_with(|c: char| c.is_ascii_digit()) => {
                                split_number(digits)?.0
                            }
                            _ => default_max_length,
                        };
                        Some(Self {
                            model: rest[..end].to_string(),
                            beams,
                            returns,
                            max_length,
                        })
                    })
            })
    }
}

/// Splits the leading decimal number off `input`. A number that does not fit
/// a `usize` is rejected and logged, so the file it came from is skipped.
fn split_number(input: &str) -> Option<(usize, &str)> {
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let digits = &input[..end];
    match digits.parse() {
        Ok(number) => Some((number, &input[end..])),
        Err(e) => {
            if !digits.is_empty() {
                warn!(
                    target = "lexcon_eval",
                    event = "run-number-rejected",
                    digits,
                    "Rejected run setting {digits} in file name: {e}"
                );
            }
            None
        }
    }
}
