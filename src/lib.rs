//! The game of durak, played by bots.
//!
//! The [`engine`] owns all authoritative state and advances it one atomic
//! step at a time. Each seat is driven by a [`Strategy`], which the engine
//! talks to only through the [`protocol`] dispatcher: events and state
//! snapshots in, actions and log lines out. Strategies are fully
//! sandboxed; a panicking, stalling, or rule-breaking bot costs its seat
//! the move, never the game.

pub mod action;
pub mod card;
pub mod deck;
pub mod engine;
pub mod error;
pub mod event;
pub mod log;
pub mod protocol;
pub mod strategy;
pub mod table;

pub use self::card::{Card, Rank, Suit};
pub use self::engine::{GameState, StepOptions};
pub use self::event::Event;
pub use self::strategy::Strategy;
