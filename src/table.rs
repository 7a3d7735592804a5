//! The table: paired attack/defence slot arrays, plus the rule predicates
//! and mutators that admit cards onto them.
//!
//! Every mutator takes a *proposed* card list and returns only the subset it
//! actually accepted; rejected cards are silently dropped. The slot arrays
//! always have equal length, and a defence card can only ever sit opposite
//! an occupied attack slot.

use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank, Suit};

/// Returns true if `card` may join the attack: an empty attack is
/// unconstrained, otherwise the rank must already be on the table (on
/// either side).
pub fn valid_to_attack(card: Card, attack: &[Option<Card>], defence: &[Option<Card>]) -> bool {
    if attack.iter().all(Option::is_none) {
        return true;
    }
    attack
        .iter()
        .chain(defence.iter())
        .flatten()
        .any(|c| c.rank == card.rank)
}

/// Returns true if `defender` beats `attacker`: same suit and strictly
/// higher rank, or trump against non-trump.
pub fn valid_to_defend(defender: Card, attacker: Card, trump: Suit) -> bool {
    (defender.suit == attacker.suit && defender.rank > attacker.rank)
        || (defender.suit == trump && attacker.suit != trump)
}

fn remove_from_hand(hand: &mut Vec<Card>, card: Card) -> bool {
    match hand.iter().position(|&c| c == card) {
        Some(index) => {
            hand.remove(index);
            true
        }
        None => false,
    }
}

/// The attack/defence slot arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    attack: Vec<Option<Card>>,
    defence: Vec<Option<Card>>,
}

impl Table {
    /// The attack slots.
    pub fn attack(&self) -> &[Option<Card>] {
        &self.attack
    }

    /// The defence slots.
    pub fn defence(&self) -> &[Option<Card>] {
        &self.defence
    }

    /// The number of slots.
    pub fn len(&self) -> usize {
        self.attack.len()
    }

    /// Returns true if the table holds no slots at all.
    pub fn is_empty(&self) -> bool {
        self.attack.is_empty()
    }

    /// Returns true if no attack slot is occupied. Marks "no active round."
    pub fn is_clear(&self) -> bool {
        self.attack.iter().all(Option::is_none)
    }

    /// Returns true if every attack slot is either matched by a defence
    /// card or empty.
    pub fn all_covered(&self) -> bool {
        self.attack
            .iter()
            .enumerate()
            .all(|(i, slot)| slot.is_none() || matches!(self.defence.get(i), Some(Some(_))))
    }

    /// Returns true if any defence slot is occupied.
    pub fn any_defended(&self) -> bool {
        self.defence.iter().any(Option::is_some)
    }

    /// The number of occupied attack slots.
    pub fn occupied_attacks(&self) -> usize {
        self.attack.iter().flatten().count()
    }

    /// All cards on the table, attack side first.
    pub fn cards(&self) -> Vec<Card> {
        self.attack
            .iter()
            .chain(self.defence.iter())
            .flatten()
            .copied()
            .collect()
    }

    /// The rank of the opening attack, which forwarded cards must match.
    pub fn attack_rank(&self) -> Option<Rank> {
        self.attack.iter().flatten().next().map(|c| c.rank)
    }

    /// Replaces the slot arrays with `size` empty slots.
    pub fn reset(&mut self, size: usize) {
        self.attack = vec![None; size];
        self.defence = vec![None; size];
    }

    /// Grows the slot arrays to at least `size` slots.
    pub fn pad_to(&mut self, size: usize) {
        if self.attack.len() < size {
            self.attack.resize(size, None);
        }
        if self.defence.len() < size {
            self.defence.resize(size, None);
        }
    }

    /// Shrinks the slot arrays to at most `size` slots. Occupied attack
    /// slots form a prefix, so only empty slots are dropped.
    pub fn truncate_to(&mut self, size: usize) {
        debug_assert!(self.attack.iter().skip(size).all(Option::is_none));
        self.attack.truncate(size);
        self.defence.truncate(size);
    }

    /// Removes all slots.
    pub fn clear(&mut self) {
        self.attack.clear();
        self.defence.clear();
    }

    /// Scans `proposed` in order, accepting each card that is held, rule
    /// valid, and has a free slot; accepted cards fill the lowest free index.
    /// A fully occupied table accepts nothing.
    pub fn attack_with(&mut self, proposed: &[Card], hand: &mut Vec<Card>) -> Vec<Card> {
        if !self.attack.is_empty() && self.attack.iter().all(Option::is_some) {
            return vec![];
        }
        let mut accepted = vec![];
        for &card in proposed {
            if !hand.contains(&card) {
                continue;
            }
            if !valid_to_attack(card, &self.attack, &self.defence) {
                continue;
            }
            let Some(index) = self.attack.iter().position(Option::is_none) else {
                break;
            };
            remove_from_hand(hand, card);
            self.attack[index] = Some(card);
            accepted.push(card);
        }
        accepted
    }

    /// Pairs each index with the matching proposed card, accepting the pair
    /// only if the card is held, the attack slot is occupied, the defence
    /// slot is free, and the card legally beats the attack card.
    pub fn defend_with(
        &mut self,
        proposed: &[Card],
        indexes: &[usize],
        hand: &mut Vec<Card>,
        trump: Suit,
    ) -> (Vec<Card>, Vec<usize>) {
        let mut accepted = vec![];
        let mut accepted_indexes = vec![];
        for (&index, &card) in indexes.iter().zip(proposed) {
            if self.defend_one(index, card, hand, trump) {
                accepted.push(card);
                accepted_indexes.push(index);
            }
        }
        (accepted, accepted_indexes)
    }

    fn defend_one(&mut self, index: usize, card: Card, hand: &mut Vec<Card>, trump: Suit) -> bool {
        if !hand.contains(&card) {
            return false;
        }
        let attacker = match (self.attack.get(index), self.defence.get(index)) {
            (Some(&Some(attacker)), Some(None)) => attacker,
            _ => return false,
        };
        if !valid_to_defend(card, attacker, trump) {
            return false;
        }
        remove_from_hand(hand, card);
        self.defence[index] = Some(card);
        true
    }

    /// Accepts up to `capacity` held cards matching the opening attack rank,
    /// appending them into open (or new) attack slots in order.
    pub fn forward_with(
        &mut self,
        proposed: &[Card],
        hand: &mut Vec<Card>,
        capacity: usize,
    ) -> Vec<Card> {
        let Some(rank) = self.attack_rank() else {
            return vec![];
        };
        let mut accepted = vec![];
        for &card in proposed {
            if accepted.len() >= capacity {
                break;
            }
            if card.rank != rank || !hand.contains(&card) {
                continue;
            }
            remove_from_hand(hand, card);
            let index = self.attack.iter().position(Option::is_none).unwrap_or_else(|| {
                self.attack.push(None);
                self.defence.push(None);
                self.attack.len() - 1
            });
            self.attack[index] = Some(card);
            accepted.push(card);
        }
        accepted
    }
}
