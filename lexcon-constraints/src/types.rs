/// Vocabulary token identifier. Constraints only ever compare ids for equality.
pub type TokenId = u32;

/// `Slot` - a single position of a template
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// A concrete token that must be emitted at this position
    Token(TokenId),
    /// Any token is accepted at this position
    Wildcard,
}

impl Slot {
    /// Checks if `token` is accepted by this slot
    pub fn accepts(&self, token: TokenId) -> bool {
        match self {
            Self::Token(required) => *required == token,
            Self::Wildcard => true,
        }
    }

    /// The concrete token of the slot, if any
    pub fn token(&self) -> Option<TokenId> {
        match self {
            Self::Token(token) => Some(*token),
            Self::Wildcard => None,
        }
    }

    /// Checks if the slot is a wildcard
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl From<TokenId> for Slot {
    fn from(token: TokenId) -> Self {
        Self::Token(token)
    }
}

impl From<Option<TokenId>> for Slot {
    fn from(token: Option<TokenId>) -> Self {
        token.map_or(Self::Wildcard, Self::Token)
    }
}

/// `ForcedToken` - what a constraint requires at its current position.
///
/// Constraints return `Option<ForcedToken>` from `advance`, where `None`
/// means the constraint is completed and nothing is left to force.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForcedToken {
    /// The next token must be this one for the constraint to make progress
    Token(TokenId),
    /// No restriction at this position, the decoder applies no bias
    Any,
}

impl ForcedToken {
    /// The concrete forced token, if any
    pub fn token(&self) -> Option<TokenId> {
        match self {
            Self::Token(token) => Some(*token),
            Self::Any => None,
        }
    }
}

/// `UpdateOutcome` - result of committing a token to a constraint state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Whether the position advanced on this call
    pub stepped: bool,
    /// Whether the constraint is completed after this call
    pub completed: bool,
    /// Whether all progress was discarded on this call
    pub reset: bool,
}

impl UpdateOutcome {
    /// Constructor
    pub const fn new(stepped: bool, completed: bool, reset: bool) -> Self {
        Self {
            stepped,
            completed,
            reset,
        }
    }

    /// Outcome of any update on an already completed constraint
    pub const fn terminal() -> Self {
        Self::new(false, true, false)
    }
}

impl From<UpdateOutcome> for (bool, bool, bool) {
    fn from(outcome: UpdateOutcome) -> Self {
        (outcome.stepped, outcome.completed, outcome.reset)
    }
}
