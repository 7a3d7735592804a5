//! A built-in strategy that plays the cheapest legal card.

use crate::card::{fmt_cards, Card};
use crate::protocol::Perspective;
use crate::table::valid_to_defend;

use super::Strategy;

/// Attacks with its lowest card, joins attacks whenever a rank matches,
/// forwards when it can, and defends each slot with the cheapest card that
/// beats it. Trump cards are spent last.
#[derive(Debug, Default)]
pub struct Naive;

impl Naive {
    /// Sort key: non-trump cards by rank first, trump cards after.
    fn weight(card: Card, view: &Perspective) -> (bool, usize) {
        (card.suit == view.trump_suit(), card.rank.index())
    }

    fn cheapest_beating(
        view: &Perspective,
        attacker: Card,
        spent: &[Card],
    ) -> Option<Card> {
        view.hand()
            .iter()
            .filter(|c| !spent.contains(c))
            .filter(|c| valid_to_defend(**c, attacker, view.trump_suit()))
            .min_by_key(|c| Self::weight(**c, view))
            .copied()
    }
}

impl Strategy for Naive {
    fn first_attack(&mut self, view: &Perspective) -> Vec<Card> {
        let Some(card) = view
            .hand()
            .iter()
            .min_by_key(|c| Self::weight(**c, view))
            .copied()
        else {
            return vec![];
        };
        view.log(format!("opening with {card}"));
        vec![card]
    }

    fn optional_attack(&mut self, view: &Perspective) -> Vec<Card> {
        let on_table = |card: &Card| {
            view.attack()
                .iter()
                .chain(view.defence())
                .flatten()
                .any(|t| t.rank == card.rank)
        };
        let joining = view
            .hand()
            .iter()
            .filter(|c| on_table(c))
            .min_by_key(|c| Self::weight(**c, view))
            .copied();
        match joining {
            Some(card) => {
                view.log(format!("joining with {card}"));
                vec![card]
            }
            None => {
                view.log("passing");
                vec![]
            }
        }
    }

    fn defence(&mut self, view: &Perspective) -> (Vec<Card>, Vec<usize>) {
        // Forward rather than defend, when the option is open.
        if !view.defence().iter().any(Option::is_some) {
            if let Some(rank) = view.attack().iter().flatten().next().map(|c| c.rank) {
                if let Some(card) = view.hand().iter().find(|c| c.rank == rank) {
                    view.log(format!("forwarding with {card}"));
                    return (vec![*card], vec![]);
                }
            }
        }

        let mut cards = vec![];
        let mut indexes = vec![];
        for (index, slot) in view.attack().iter().enumerate() {
            let attacker = match (slot, view.defence().get(index)) {
                (Some(attacker), Some(None)) => *attacker,
                _ => continue,
            };
            match Self::cheapest_beating(view, attacker, &cards) {
                Some(card) => {
                    cards.push(card);
                    indexes.push(index);
                }
                None => {
                    view.log("taking");
                    return (vec![], vec![]);
                }
            }
        }
        view.log(format!("defending with {}", fmt_cards(&cards)));
        (cards, indexes)
    }
}
