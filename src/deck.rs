//! The draw pile.

use itertools::iproduct;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank, Suit};

/// The draw pile. Cards are dealt from the front; the revealed trump card
/// sits at the back and is the very last card drawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl FromIterator<Card> for Deck {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        let cards = iter.into_iter().collect();
        Self { cards }
    }
}

impl Deck {
    /// Builds the full 52-card pack, in rank-major index order.
    pub fn full() -> Self {
        iproduct!(Rank::all_ranks(), Suit::all_suits())
            .map(|(&rank, &suit)| Card { rank, suit })
            .collect()
    }

    /// The number of cards remaining in the deck.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns true if the deck holds no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Shuffles the deck.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Removes and returns the front card, if any.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// The card at the back of the deck, drawn last.
    pub fn back(&self) -> Option<Card> {
        self.cards.last().copied()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_full_deck() {
        let deck = Deck::full();
        assert_eq!(deck.len(), 52);
        let unique: HashSet<_> = deck.cards.iter().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_draw_from_front() {
        let mut deck = Deck::full();
        let front = deck.cards[0];
        let back = deck.back().unwrap();
        assert_eq!(deck.draw(), Some(front));
        assert_eq!(deck.len(), 51);
        assert_eq!(deck.back(), Some(back));
    }

    #[test]
    fn test_draw_empty() {
        let mut deck = Deck::default();
        assert!(deck.is_empty());
        assert_eq!(deck.draw(), None);
    }
}
