//! Actions proposed by a strategy.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::error::ProtocolViolation;

/// The hard cap on cards in any proposed list. Matches the table's largest
/// possible attack.
pub const MAX_CARD_LIST: usize = 6;

/// An action proposed by a strategy in response to a decision event.
///
/// Actions are *proposals*: the engine applies them through the table
/// mutators and keeps only the accepted subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Open or join the attack with a card list.
    Attack(Vec<Card>),
    /// Cover attack slots; `indexes[i]` names the slot `cards[i]` answers.
    Defend { cards: Vec<Card>, indexes: Vec<usize> },
    /// Pick up every card on the table, ending the round.
    Take,
    /// Decline to join the attack.
    Pass,
    /// Redirect the attack to the next seat with matching-rank cards.
    Forward(Vec<Card>),
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Attack(_) => "attack",
            Action::Defend { .. } => "defend",
            Action::Take => "take",
            Action::Pass => "pass",
            Action::Forward(_) => "forward",
        })
    }
}

impl Action {
    /// Checks the action's shape and counts. Violations trigger the
    /// engine's phase fallback before any rule evaluation happens.
    pub fn validate(&self) -> Result<(), ProtocolViolation> {
        match self {
            Action::Attack(cards) | Action::Forward(cards) => check_len(cards),
            Action::Defend { cards, indexes } => {
                check_len(cards)?;
                if cards.len() != indexes.len() {
                    return Err(ProtocolViolation::LengthMismatch {
                        cards: cards.len(),
                        indexes: indexes.len(),
                    });
                }
                Ok(())
            }
            Action::Take | Action::Pass => Ok(()),
        }
    }
}

fn check_len(cards: &[Card]) -> Result<(), ProtocolViolation> {
    if cards.len() > MAX_CARD_LIST {
        Err(ProtocolViolation::TooManyCards {
            count: cards.len(),
            max: MAX_CARD_LIST,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use assert_matches::assert_matches;

    use super::*;

    fn cards(n: usize) -> Vec<Card> {
        use crate::card::{Rank, Suit};
        itertools::iproduct!(Rank::all_ranks(), Suit::all_suits())
            .map(|(&rank, &suit)| Card::new(rank, suit))
            .take(n)
            .collect()
    }

    #[test]
    fn test_validate_sizes() {
        assert_matches!(Action::Attack(cards(6)).validate(), Ok(()));
        assert_matches!(
            Action::Attack(cards(7)).validate(),
            Err(ProtocolViolation::TooManyCards { count: 7, max: 6 })
        );
        assert_matches!(Action::Forward(cards(7)).validate(), Err(_));
        assert_matches!(Action::Take.validate(), Ok(()));
        assert_matches!(Action::Pass.validate(), Ok(()));
    }

    #[test]
    fn test_validate_defend_lengths() {
        let card = Card::from_str("7♣").unwrap();
        let ok = Action::Defend {
            cards: vec![card],
            indexes: vec![0],
        };
        assert_matches!(ok.validate(), Ok(()));
        let bad = Action::Defend {
            cards: vec![card],
            indexes: vec![],
        };
        assert_matches!(bad.validate(), Err(ProtocolViolation::LengthMismatch { .. }));
    }
}
