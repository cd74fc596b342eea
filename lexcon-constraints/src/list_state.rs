use std::sync::Arc;

use tracing::trace;

use crate::{constraint::LexicalConstraint, traits::Constraint, types::TokenId};

/// `ConstraintListState` - progress of one beam over every constraint
/// attached to a generation request.
///
/// At most one constraint is in progress at a time. Tokens are committed to
/// the in-progress constraint only; when none is in progress, the first
/// pending constraint that the token advances is picked up.
#[derive(Clone, Debug)]
pub struct ConstraintListState {
    /// Fresh constraints, shared between copies
    constraints: Arc<[LexicalConstraint]>,
    /// Length of the longest constraint
    max_seqlen: usize,
    /// Constraints already satisfied
    complete_constraints: Vec<LexicalConstraint>,
    /// Constraint currently being matched
    inprogress_constraint: Option<LexicalConstraint>,
    /// Constraints not started yet
    pending_constraints: Vec<LexicalConstraint>,
    /// Whether every constraint is satisfied
    completed: bool,
}

impl ConstraintListState {
    /// Constructor
    pub fn new<I>(constraints: I) -> Self
    where
        I: IntoIterator<Item = LexicalConstraint>,
    {
        let constraints: Arc<[LexicalConstraint]> = constraints.into_iter().collect();
        let max_seqlen = constraints
            .iter()
            .map(Constraint::seqlen)
            .max()
            .unwrap_or(0);
        let mut this = Self {
            constraints,
            max_seqlen,
            complete_constraints: vec![],
            inprogress_constraint: None,
            pending_constraints: vec![],
            completed: false,
        };
        this.init_state();
        this
    }

    fn init_state(&mut self) {
        self.complete_constraints.clear();
        self.inprogress_constraint = None;
        self.pending_constraints = self
            .constraints
            .iter()
            .map(|constraint| constraint.copy(false))
            .collect();
        self.completed = self.pending_constraints.is_empty();
    }

    /// Score used to rank beams by constraint progress: every satisfied
    /// constraint weighs as much as the longest constraint, plus the
    /// progress of the constraint in progress.
    pub fn bank(&self) -> usize {
        let inprogress = self
            .inprogress_constraint
            .as_ref()
            .map_or(0, Constraint::position);
        self.complete_constraints.len() * self.max_seqlen + inprogress
    }

    /// Concrete tokens that would advance this beam's constraints. Empty
    /// when nothing can be forced, either because every constraint is
    /// satisfied or because the current slot is a wildcard.
    pub fn advance(&self) -> Vec<TokenId> {
        let mut tokens = Vec::new();
        let candidates = match &self.inprogress_constraint {
            Some(constraint) => std::slice::from_ref(constraint),
            None => self.pending_constraints.as_slice(),
        };
        for constraint in candidates {
            if let Some(token) = constraint.advance().and_then(|forced| forced.token()) {
                if !tokens.contains(&token) {
                    tokens.push(token);
                }
            }
        }
        tokens
    }

    /// Commits an emitted token. Returns `(completed, stepped)`, where
    /// `completed` is set once a constraint is completed by this token.
    pub fn add(&mut self, token: TokenId) -> (bool, bool) {
        if self.completed {
            return (true, false);
        }

        if let Some(mut constraint) = self.inprogress_constraint.take() {
            let outcome = constraint.update(token);
            if outcome.reset {
                trace!(
                    target = "lexcon_constraints",
                    event = "constraint-reset",
                    token,
                    "In-progress constraint reset, returning it to pending"
                );
                self.pending_constraints.push(constraint.copy(false));
            } else if outcome.completed {
                self.complete_constraints.push(constraint);
                self.completed = self.pending_constraints.is_empty();
            } else {
                self.inprogress_constraint = Some(constraint);
            }
            return (outcome.completed, outcome.stepped);
        }

        let Some(index) = self
            .pending_constraints
            .iter()
            .position(|constraint| constraint.does_advance(token))
        else {
            return (false, false);
        };

        let mut constraint = self.pending_constraints.remove(index);
        let outcome = constraint.update(token);
        debug_assert!(outcome.stepped, "`does_advance` and `update` disagree");
        if outcome.completed {
            self.complete_constraints.push(constraint);
            self.completed = self.pending_constraints.is_empty();
        } else {
            trace!(
                target = "lexcon_constraints",
                event = "constraint-started",
                token,
                kind = %constraint.kind(),
                "Pending constraint is now in progress"
            );
            self.inprogress_constraint = Some(constraint);
        }
        (outcome.completed, outcome.stepped)
    }

    /// Restarts from scratch and replays `token_ids`
    pub fn reset(&mut self, token_ids: &[TokenId]) {
        self.init_state();
        for token in token_ids {
            self.add(*token);
            if self.completed {
                break;
            }
        }
    }

    /// New list state over the same constraints. A stateful copy keeps the
    /// progress of every constraint, otherwise it starts from scratch.
    pub fn copy(&self, stateful: bool) -> Self {
        if stateful {
            return self.clone();
        }
        let mut copy = self.clone();
        copy.init_state();
        copy
    }

    /// Whether every constraint is satisfied
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Getter for `max_seqlen`
    pub fn max_seqlen(&self) -> usize {
        self.max_seqlen
    }

    /// Number of satisfied constraints
    pub fn num_completed(&self) -> usize {
        self.complete_constraints.len()
    }

    /// Number of constraints not started yet
    pub fn num_pending(&self) -> usize {
        self.pending_constraints.len()
    }

    /// Getter for `inprogress_constraint`
    pub fn inprogress(&self) -> Option<&LexicalConstraint> {
        self.inprogress_constraint.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constraint::ConstraintKind, ordered::OrderedConstraint, template::TemplateConstraint,
    };

    fn template(slots: &[Option<TokenId>]) -> LexicalConstraint {
        TemplateConstraint::new(slots.iter().copied())
            .expect("Failed to build template")
            .into()
    }

    fn ordered(token_ids: &[TokenId]) -> LexicalConstraint {
        OrderedConstraint::new(token_ids.iter().copied())
            .expect("Failed to build ordered constraint")
            .into()
    }

    #[test]
    fn test_initial_state() {
        let state =
            ConstraintListState::new([template(&[Some(5), None, Some(3)]), ordered(&[7, 8])]);
        assert_eq!(state.max_seqlen(), 3);
        assert_eq!(state.num_pending(), 2);
        assert_eq!(state.num_completed(), 0);
        assert_eq!(state.bank(), 0);
        assert!(!state.completed());
        assert!(state.inprogress().is_none());
        assert_eq!(state.advance(), vec![5, 7]);
    }

    #[test]
    fn test_empty_list_is_completed() {
        let mut state = ConstraintListState::new([]);
        assert!(state.completed());
        assert_eq!(state.add(1), (true, false));
        assert!(state.advance().is_empty());
    }

    #[test]
    fn test_ordered_then_template() {
        let mut state =
            ConstraintListState::new([ordered(&[7, 8]), template(&[Some(5), None])]);

        // unrelated token, nothing starts
        assert_eq!(state.add(1), (false, false));
        assert_eq!(state.advance(), vec![7, 5]);

        assert_eq!(state.add(7), (false, true));
        assert_eq!(
            state.inprogress().map(LexicalConstraint::kind),
            Some(ConstraintKind::Ordered)
        );
        assert_eq!(state.advance(), vec![8]);
        assert_eq!(state.bank(), 1);

        // filler tokens are ignored by the ordered constraint
        assert_eq!(state.add(5), (false, false));
        assert_eq!(state.add(8), (true, true));
        assert_eq!(state.num_completed(), 1);
        assert_eq!(state.bank(), 2);
        assert!(!state.completed());

        assert_eq!(state.add(5), (false, true));
        assert!(state.advance().is_empty());
        assert_eq!(state.add(42), (true, true));
        assert!(state.completed());
        assert_eq!(state.bank(), 4);
        assert_eq!(state.add(7), (true, false));
    }

    #[test]
    fn test_template_reset_returns_to_pending() {
        let mut state = ConstraintListState::new([template(&[Some(5), Some(6)])]);
        assert_eq!(state.add(5), (false, true));
        assert_eq!(state.num_pending(), 0);
        assert_eq!(state.add(9), (false, false));
        assert!(state.inprogress().is_none());
        assert_eq!(state.num_pending(), 1);
        assert_eq!(state.bank(), 0);

        assert_eq!(state.add(5), (false, true));
        assert_eq!(state.add(6), (true, true));
        assert!(state.completed());
    }

    #[test]
    fn test_reset_replays_tokens() {
        let mut state = ConstraintListState::new([ordered(&[1, 2]), ordered(&[3])]);
        state.add(1);
        state.add(2);
        state.add(3);
        assert!(state.completed());

        state.reset(&[1, 4]);
        assert!(!state.completed());
        assert_eq!(state.bank(), 1);
        assert_eq!(state.num_pending(), 1);
    }

    #[test]
    fn test_copy() {
        let mut state = ConstraintListState::new([ordered(&[1, 2]), ordered(&[3])]);
        state.add(1);

        let mut stateful = state.copy(true);
        let stateless = state.copy(false);
        assert_eq!(stateful.bank(), 1);
        assert_eq!(stateless.bank(), 0);
        assert_eq!(stateless.num_pending(), 2);

        stateful.add(2);
        assert_eq!(stateful.num_completed(), 1);
        assert_eq!(state.num_completed(), 0);
        assert_eq!(state.inprogress().map(Constraint::position), Some(1));
    }
}
