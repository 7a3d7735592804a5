//! Events flowing from the engine to each seat's protocol dispatcher.

use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank};

/// An event delivered to a seat.
///
/// The three `Request*` variants demand a decision; everything else is a
/// passive notification that must not produce an action. The enum is
/// closed, so an unknown tag cannot reach a dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// One-shot game setup, delivered to every seat before the first turn.
    GameInit {
        seats: usize,
        seat: usize,
        hand: Vec<Card>,
        trump_card: Card,
        attacker: usize,
        /// Rank of the lowest trump dealt to any hand, if one was dealt.
        lowest_trump: Option<Rank>,
    },
    /// The seat must open the attack with at least one card.
    RequestFirstAttack,
    /// The seat may join the attack, or pass with an empty list.
    RequestOptionalAttack,
    /// The seat must defend, take, or forward.
    RequestDefence,
    /// A seat opened a new attack.
    FirstAttack { seat: usize, cards: Vec<Card> },
    /// A seat joined the attack.
    OptionalAttack { seat: usize, cards: Vec<Card> },
    /// The defender covered attack slots.
    Defence {
        seat: usize,
        cards: Vec<Card>,
        indexes: Vec<usize>,
    },
    /// The defender picked up the table.
    Take { seat: usize, cards: Vec<Card> },
    /// The defender redirected the attack to the next seat.
    Forward { seat: usize, cards: Vec<Card> },
    /// An attacker declined to add cards.
    Pass { seat: usize },
    /// The round ended with every attack covered; the cards left play.
    Burn { cards: Vec<Card> },
    /// Cards drawn from the deck into this seat's hand.
    DrawnToHand { cards: Vec<Card> },
    /// A seat emptied its hand with the deck exhausted.
    Winner { seat: usize },
}

impl Event {
    /// Returns true for the variants that demand a decision.
    pub fn is_decision(&self) -> bool {
        matches!(
            self,
            Event::RequestFirstAttack | Event::RequestOptionalAttack | Event::RequestDefence
        )
    }
}
