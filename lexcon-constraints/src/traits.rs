use crate::types::{ForcedToken, TokenId, UpdateOutcome};

/// `Constraint` - the operations a beam-search decoder uses to drive a
/// lexical constraint.
///
/// Querying (`advance`, `does_advance`, `remaining`) never mutates state;
/// `update` is the only transition and must be applied in emission order.
/// Every operation is total: unknown token ids simply never match.
pub trait Constraint: Clone {
    /// The value the constraint currently forces, `None` once completed
    fn advance(&self) -> Option<ForcedToken>;

    /// Whether `update(token)` would move the position forward right now
    fn does_advance(&self, token: TokenId) -> bool;

    /// Commits an emitted token
    fn update(&mut self, token: TokenId) -> UpdateOutcome;

    /// Discards all progress
    fn reset(&mut self);

    /// Number of slots in the constraint
    fn seqlen(&self) -> usize;

    /// Number of slots already matched
    fn position(&self) -> usize;

    /// Number of slots left to match
    fn remaining(&self) -> usize {
        self.seqlen() - self.position()
    }

    /// Whether every slot has been matched
    fn completed(&self) -> bool {
        self.position() == self.seqlen()
    }

    /// New state over the same payload. A stateful copy keeps the current
    /// position, otherwise the copy starts from scratch.
    fn copy(&self, stateful: bool) -> Self {
        let mut copy = self.clone();
        if !stateful {
            copy.reset();
        }
        copy
    }
}
