use std::collections::HashMap;

use tokenizers::Tokenizer;
use tracing::{debug, warn};

use crate::{
    errors::{ResolverError, ValidationError},
    ordered::OrderedConstraint,
    template::TemplateConstraint,
    types::{Slot, TokenId},
};

/// `TokenResolver` - maps a text segment to vocabulary token ids
pub trait TokenResolver {
    type Error: Into<ResolverError>;

    /// Resolves `segment` into the token ids it encodes to, without special tokens
    fn resolve(&self, segment: &str) -> Result<Vec<TokenId>, Self::Error>;
}

impl TokenResolver for Tokenizer {
    type Error = tokenizers::Error;

    fn resolve(&self, segment: &str) -> Result<Vec<TokenId>, Self::Error> {
        let encoding = self.encode(segment, false)?;
        Ok(encoding.get_ids().to_vec())
    }
}

/// Lookup table resolver, a segment resolves to a single id or to nothing
impl TokenResolver for HashMap<String, TokenId> {
    type Error = std::convert::Infallible;

    fn resolve(&self, segment: &str) -> Result<Vec<TokenId>, Self::Error> {
        Ok(self.get(segment).copied().into_iter().collect())
    }
}

/// Resolves a non-empty segment to exactly one token id
fn resolve_single<R>(resolver: &R, segment: &str) -> Result<TokenId, ValidationError>
where
    R: TokenResolver + ?Sized,
{
    let token_ids = resolver
        .resolve(segment)
        .map_err(|e| ValidationError::Resolver {
            segment: segment.to_string(),
            source: e.into(),
        })?;
    if let [token] = token_ids[..] {
        return Ok(token);
    }
    warn!(
        target = "lexcon_constraints",
        event = "ambiguous-segment",
        segment,
        num_token_ids = token_ids.len(),
        "Segment does not resolve to a single token"
    );
    Err(ValidationError::AmbiguousSegment {
        segment: segment.to_string(),
        token_ids,
    })
}

/// Builds a `TemplateConstraint` out of text segments. An empty segment is a
/// wildcard, any other segment must resolve to exactly one token.
pub fn build_template<R, S>(
    resolver: &R,
    segments: &[S],
) -> Result<TemplateConstraint, ValidationError>
where
    R: TokenResolver + ?Sized,
    S: AsRef<str>,
{
    let slots = segments
        .iter()
        .map(|segment| match segment.as_ref() {
            "" => Ok(Slot::Wildcard),
            segment => resolve_single(resolver, segment).map(Slot::Token),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let constraint = TemplateConstraint::new(slots)?;
    debug!(
        target = "lexcon_constraints",
        event = "template-built",
        seqlen = constraint.slots().len(),
        "Built template constraint"
    );
    Ok(constraint)
}

/// Builds an `OrderedConstraint` out of text segments. Every segment must
/// resolve to exactly one token, empty segments are rejected.
pub fn build_ordered<R, S>(
    resolver: &R,
    segments: &[S],
) -> Result<OrderedConstraint, ValidationError>
where
    R: TokenResolver + ?Sized,
    S: AsRef<str>,
{
    let token_ids = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| match segment.as_ref() {
            "" => Err(ValidationError::WildcardSegment(index)),
            segment => resolve_single(resolver, segment),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let constraint = OrderedConstraint::new(token_ids)?;
    debug!(
        target = "lexcon_constraints",
        event = "ordered-built",
        seqlen = constraint.token_ids().len(),
        "Built ordered constraint"
    );
    Ok(constraint)
}

/// Builds one `TemplateConstraint` per segment list
pub fn build_template_list<R, S>(
    resolver: &R,
    templates: &[Vec<S>],
) -> Result<Vec<TemplateConstraint>, ValidationError>
where
    R: TokenResolver + ?Sized,
    S: AsRef<str>,
{
    templates
        .iter()
        .map(|segments| build_template(resolver, segments))
        .collect()
}

/// Builds one `OrderedConstraint` per segment list
pub fn build_ordered_list<R, S>(
    resolver: &R,
    sequences: &[Vec<S>],
) -> Result<Vec<OrderedConstraint>, ValidationError>
where
    R: TokenResolver + ?Sized,
    S: AsRef<str>,
{
    sequences
        .iter()
        .map(|segments| build_ordered(resolver, segments))
        .collect()
}

/// Converts template segments into ordered segments by dropping wildcards
pub fn template_to_ordered_segments<S: AsRef<str>>(segments: &[S]) -> Vec<String> {
    segments
        .iter()
        .map(AsRef::as_ref)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
