//! Error types

use std::time::Duration;

/// A proposed action whose shape, counts, or sizes are malformed. The
/// engine discards the whole action and applies the phase default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    #[error("card list holds {count} cards, limit is {max}")]
    TooManyCards { count: usize, max: usize },

    #[error("defence pairs {cards} cards with {indexes} indexes")]
    LengthMismatch { cards: usize, indexes: usize },
}

/// A failed decision call. The engine substitutes the phase default and
/// the game continues.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BotFault {
    /// The strategy panicked during a decision or notification call.
    #[error("strategy panicked: {0}")]
    Panicked(String),

    /// The call completed after its wall-clock deadline; its result is
    /// abandoned.
    #[error("deadline of {0:?} expired")]
    DeadlineExpired(Duration),

    /// The returned action failed structural validation.
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
}

/// A terminal engine failure. Unlike [`BotFault`], these signal an
/// invariant breach in state construction and must propagate.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("a game needs 2 to 8 seats, got {0}")]
    SeatCount(usize),

    #[error("state has {expected} seats but {got} strategies were supplied")]
    StrategyCount { expected: usize, got: usize },

    #[error("seat {0} must open the attack with an empty hand")]
    EmptyFirstAttack(usize),
}
