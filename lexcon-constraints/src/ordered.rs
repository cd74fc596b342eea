use std::sync::Arc;

use crate::{
    errors::ValidationError,
    traits::Constraint,
    types::{ForcedToken, Slot, TokenId, UpdateOutcome},
};

/// `OrderedConstraint` - requires a sequence of tokens to appear in the
/// output in the given relative order, with any tokens in between.
///
/// Non-matching tokens are ignored and never discard progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedConstraint {
    /// Required tokens, shared between copies
    token_ids: Arc<[TokenId]>,
    /// Number of required tokens matched so far
    position: usize,
}

impl OrderedConstraint {
    /// Constructor
    pub fn new<I>(token_ids: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = TokenId>,
    {
        let token_ids: Arc<[TokenId]> = token_ids.into_iter().collect();
        if token_ids.is_empty() {
            return Err(ValidationError::EmptyConstraint);
        }
        Ok(Self {
            token_ids,
            position: 0,
        })
    }

    /// Builds an ordered constraint out of template slots, which must all be concrete
    pub fn from_slots<I, S>(slots: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Slot>,
    {
        let token_ids = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                let slot: Slot = slot.into();
                slot.token()
                    .ok_or(ValidationError::WildcardInOrdered(index))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(token_ids)
    }

    /// Getter for `token_ids`
    pub fn token_ids(&self) -> &[TokenId] {
        &self.token_ids
    }

    /// Token required at the current position, `None` once completed
    fn current_token(&self) -> Option<TokenId> {
        self.token_ids.get(self.position).copied()
    }
}

impl Constraint for OrderedConstraint {
    fn advance(&self) -> Option<ForcedToken> {
        self.current_token().map(ForcedToken::Token)
    }

    fn does_advance(&self, token: TokenId) -> bool {
        self.current_token() == Some(token)
    }

    fn update(&mut self, token: TokenId) -> UpdateOutcome {
        let Some(required) = self.current_token() else {
            return UpdateOutcome::terminal();
        };
        if required != token {
            return UpdateOutcome::new(false, false, false);
        }
        self.position += 1;
        UpdateOutcome::new(true, self.completed(), false)
    }

    fn reset(&mut self) {
        self.position = 0;
    }

    fn seqlen(&self) -> usize {
        self.token_ids.len()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn completed(&self) -> bool {
        self.position >= self.token_ids.len()
    }
}
