use std::sync::Arc;

use tracing::trace;

use crate::{
    errors::ValidationError,
    traits::Constraint,
    types::{ForcedToken, Slot, TokenId, UpdateOutcome},
};

/// `TemplateConstraint` - forces a fixed skeleton of concrete tokens and
/// wildcards to be generated contiguously.
///
/// A concrete slot that is not matched discards all progress, so matching
/// restarts from the first slot of the template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateConstraint {
    /// Template slots, shared between copies
    slots: Arc<[Slot]>,
    /// Number of slots matched so far
    position: usize,
}

impl TemplateConstraint {
    /// Constructor
    pub fn new<I, S>(slots: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Slot>,
    {
        let slots: Arc<[Slot]> = slots.into_iter().map(Into::into).collect();
        if slots.is_empty() {
            return Err(ValidationError::EmptyConstraint);
        }
        Ok(Self { slots, position: 0 })
    }

    /// Getter for `slots`
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot at the current position, `None` once completed
    fn current_slot(&self) -> Option<&Slot> {
        self.slots.get(self.position)
    }
}

impl Constraint for TemplateConstraint {
    fn advance(&self) -> Option<ForcedToken> {
        self.current_slot().map(|slot| match slot {
            Slot::Token(token) => ForcedToken::Token(*token),
            Slot::Wildcard => ForcedToken::Any,
        })
    }

    fn does_advance(&self, token: TokenId) -> bool {
        self.current_slot().is_some_and(|slot| slot.accepts(token))
    }

    fn update(&mut self, token: TokenId) -> UpdateOutcome {
        let Some(&slot) = self.current_slot() else {
            return UpdateOutcome::terminal();
        };

        if slot.accepts(token) {
            self.position += 1;
            return UpdateOutcome::new(true, self.completed(), false);
        }

        trace!(
            target = "lexcon_constraints",
            event = "template-reset",
            position = self.position,
            token,
            "Template slot mismatch, discarding progress"
        );
        self.position = 0;
        UpdateOutcome::new(false, false, true)
    }

    fn reset(&mut self) {
        self.position = 0;
    }

    fn seqlen(&self) -> usize {
        self.slots.len()
    }

    fn position(&self) -> usize {
        self.position
    }
}
