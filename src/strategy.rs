//! The capability surface a bot implements.

use crate::card::Card;
use crate::protocol::Perspective;

mod naive;
pub use naive::Naive;
#[cfg(test)]
pub mod scripted;

/// A seat's decision maker.
///
/// One instance is constructed per game, per seat; instances are never
/// shared between seats or games. The three decision methods are required;
/// the notification hooks default to no-ops. Every call receives a
/// [`Perspective`] carrying copies of the visible state, the seat's full
/// event history, and a log-append hook.
pub trait Strategy {
    /// Open a new attack. The engine requires at least one card to land on
    /// the table; if none of the returned cards is accepted, it forces an
    /// arbitrary card from the hand instead.
    fn first_attack(&mut self, view: &Perspective) -> Vec<Card>;

    /// Join an existing attack. An empty list passes.
    fn optional_attack(&mut self, view: &Perspective) -> Vec<Card>;

    /// Answer an attack. Return cards plus the attack slot each one covers.
    /// Empty cards take; cards without indexes forward.
    fn defence(&mut self, view: &Perspective) -> (Vec<Card>, Vec<usize>);

    fn on_game_init(&mut self, _view: &Perspective) {}
    fn on_first_attack(&mut self, _view: &Perspective, _seat: usize, _cards: &[Card]) {}
    fn on_optional_attack(&mut self, _view: &Perspective, _seat: usize, _cards: &[Card]) {}
    fn on_defence(&mut self, _view: &Perspective, _seat: usize, _cards: &[Card], _indexes: &[usize]) {
    }
    fn on_take(&mut self, _view: &Perspective, _seat: usize, _cards: &[Card]) {}
    fn on_forward(&mut self, _view: &Perspective, _seat: usize, _cards: &[Card]) {}
    fn on_pass(&mut self, _view: &Perspective, _seat: usize) {}
    fn on_burn(&mut self, _view: &Perspective, _cards: &[Card]) {}
    fn on_drawn_to_hand(&mut self, _view: &Perspective, _cards: &[Card]) {}
    fn on_winner(&mut self, _view: &Perspective, _seat: usize) {}
}
