use thiserror::Error;

use crate::types::TokenId;

/// Error raised by a token resolver, kept as the source of construction errors
pub type ResolverError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building constraints, before any per-beam state exists.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Constraint must contain at least one slot")]
    EmptyConstraint,
    #[error("Segment `{segment}` must resolve to exactly one token, got `{token_ids:?}`")]
    AmbiguousSegment {
        segment: String,
        token_ids: Vec<TokenId>,
    },
    #[error("Ordered constraints do not accept wildcard segments (segment index `{0}`)")]
    WildcardSegment(usize),
    #[error("Ordered constraints do not accept wildcard slots (slot index `{0}`)")]
    WildcardInOrdered(usize),
    #[error("Failed to resolve segment `{segment}`: `{source}`")]
    Resolver {
        segment: String,
        #[source]
        source: ResolverError,
    },
}
