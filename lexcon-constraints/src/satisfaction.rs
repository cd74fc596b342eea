//! Checks whether finished outputs satisfy a constraint, independently of
//! the per-step state machines.

/// Returns the part of `output` generated after `prompt`, or `None` if the
/// output does not start with the prompt.
fn continuation<'a, T: PartialEq>(prompt: &[T], output: &'a [T]) -> Option<&'a [T]> {
    output.strip_prefix(prompt)
}

/// Checks that `output` continues `prompt` with the template: every concrete
/// slot matches the continuation token at the same index, wildcards match
/// anything. The continuation may run past the template.
pub fn satisfies_template<T: PartialEq>(
    prompt: &[T],
    output: &[T],
    template: &[Option<T>],
) -> bool {
    let Some(generated) = continuation(prompt, output) else {
        return false;
    };
    if generated.len() < template.len() {
        return false;
    }
    template
        .iter()
        .zip(generated)
        .all(|(expected, token)| expected.as_ref().map_or(true, |expected| expected == token))
}

/// Checks that `output` continues `prompt` and that `expected` occurs in the
/// continuation in order, with any tokens in between.
pub fn satisfies_ordered<T: PartialEq>(prompt: &[T], output: &[T], expected: &[T]) -> bool {
    let Some(generated) = continuation(prompt, output) else {
        return false;
    };
    let mut remaining = expected.iter().peekable();
    for token in generated {
        if remaining.peek() == Some(&token) {
            remaining.next();
        }
    }
    remaining.peek().is_none()
}
