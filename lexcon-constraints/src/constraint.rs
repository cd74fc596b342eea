use std::fmt;

use crate::{
    ordered::OrderedConstraint,
    template::TemplateConstraint,
    traits::Constraint,
    types::{ForcedToken, TokenId, UpdateOutcome},
};

/// Kind of a `LexicalConstraint`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Template,
    Ordered,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => write!(f, "template"),
            Self::Ordered => write!(f, "ordered"),
        }
    }
}

/// `LexicalConstraint` - any constraint that can be attached to a beam.
///
/// Decoders store one of these per (beam, constraint) pair and drive it
/// through the `Constraint` trait, without caring about the variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexicalConstraint {
    Template(TemplateConstraint),
    Ordered(OrderedConstraint),
}

impl LexicalConstraint {
    /// Getter for the constraint kind
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Template(_) => ConstraintKind::Template,
            Self::Ordered(_) => ConstraintKind::Ordered,
        }
    }
}

impl From<TemplateConstraint> for LexicalConstraint {
    fn from(constraint: TemplateConstraint) -> Self {
        Self::Template(constraint)
    }
}

impl From<OrderedConstraint> for LexicalConstraint {
    fn from(constraint: OrderedConstraint) -> Self {
        Self::Ordered(constraint)
    }
}

impl Constraint for LexicalConstraint {
    fn advance(&self) -> Option<ForcedToken> {
        match self {
            Self::Template(constraint) => constraint.advance(),
            Self::Ordered(constraint) => constraint.advance(),
        }
    }

    fn does_advance(&self, token: TokenId) -> bool {
        match self {
            Self::Template(constraint) => constraint.does_advance(token),
            Self::Ordered(constraint) => constraint.does_advance(token),
        }
    }

    fn update(&mut self, token: TokenId) -> UpdateOutcome {
        match self {
            Self::Template(constraint) => constraint.update(token),
            Self::Ordered(constraint) => constraint.update(token),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Template(constraint) => constraint.reset(),
            Self::Ordered(constraint) => constraint.reset(),
        }
    }

    fn seqlen(&self) -> usize {
        match self {
            Self::Template(constraint) => constraint.seqlen(),
            Self::Ordered(constraint) => constraint.seqlen(),
        }
    }

    fn position(&self) -> usize {
        match self {
            Self::Template(constraint) => constraint.position(),
            Self::Ordered(constraint) => constraint.position(),
        }
    }

    fn completed(&self) -> bool {
        match self {
            Self::Template(constraint) => constraint.completed(),
            Self::Ordered(constraint) => constraint.completed(),
        }
    }
}
