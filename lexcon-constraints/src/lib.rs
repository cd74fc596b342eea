//! Lexical constraints for beam-search decoding.
//!
//! A decoder attaches one constraint state per beam and per constraint, and
//! drives every state through the [`Constraint`] trait: it queries
//! [`Constraint::does_advance`] / [`Constraint::advance`] while scoring
//! candidates, commits the emitted token with [`Constraint::update`], ranks
//! beams with [`Constraint::remaining`] and forks states with
//! [`Constraint::copy`].

pub mod builder;
pub mod constraint;
pub mod errors;
pub mod list_state;
pub mod ordered;
pub mod satisfaction;
pub mod template;
pub mod traits;
pub mod types;

pub use builder::{
    build_ordered, build_ordered_list, build_template, build_template_list,
    template_to_ordered_segments, TokenResolver,
};
pub use constraint::{ConstraintKind, LexicalConstraint};
pub use errors::{ResolverError, ValidationError};
pub use list_state::ConstraintListState;
pub use ordered::OrderedConstraint;
pub use satisfaction::{satisfies_ordered, satisfies_template};
pub use template::TemplateConstraint;
pub use traits::Constraint;
pub use types::{ForcedToken, Slot, TokenId, UpdateOutcome};
