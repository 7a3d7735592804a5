//! The standard 52-card pack.

use std::fmt::Display;
use std::str::FromStr;

use ansi_term::ANSIString;
use serde::{Deserialize, Serialize};

/// Card rank, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Returns an array of all ranks, in ascending order.
    pub fn all_ranks() -> &'static [Rank] {
        static RANKS: [Rank; 13] = [
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Jack,
            Rank::Queen,
            Rank::King,
            Rank::Ace,
        ];
        &RANKS
    }

    /// The rank's position in ascending order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        };
        f.write_str(sym)
    }
}

impl FromStr for Rank {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "10" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            _ => return Err(ParseCardError(s.into())),
        })
    }
}

/// Card suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    /// Returns an array of all suits, in index order.
    pub fn all_suits() -> &'static [Suit] {
        static SUITS: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];
        &SUITS
    }

    /// The suit's position in index order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = match self {
            Suit::Club => "♣",
            Suit::Diamond => "♦",
            Suit::Heart => "♥",
            Suit::Spade => "♠",
        };
        f.write_str(sym)
    }
}

impl TryFrom<char> for Suit {
    type Error = ParseCardError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Ok(match c {
            '♣' => Suit::Club,
            '♦' => Suit::Diamond,
            '♥' => Suit::Heart,
            '♠' => Suit::Spade,
            _ => return Err(ParseCardError(c.into())),
        })
    }
}

/// The error returned when a card token fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid card token {0:?}")]
pub struct ParseCardError(String);

/// A playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    /// Card rank.
    pub rank: Rank,
    /// Card suit.
    pub suit: Suit,
}

impl Card {
    /// Creates a new [`Card`].
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Returns a string representation of the card, decorated with ANSI color codes.
    pub fn to_ansi_string(self) -> ANSIString<'static> {
        use ansi_term::Colour::Red;
        match self.suit {
            Suit::Club | Suit::Spade => self.to_string().into(),
            Suit::Diamond | Suit::Heart => Red.paint(self.to_string()),
        }
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses a 2-3 character token: a rank symbol followed by a suit glyph.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let suit_char = chars.next_back().ok_or_else(|| ParseCardError(s.into()))?;
        let rank = chars.as_str().parse()?;
        let suit = Suit::try_from(suit_char)?;
        Ok(Card { rank, suit })
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Formats a card list for log entries.
pub fn fmt_cards(cards: &[Card]) -> String {
    let mut out = String::new();
    for (i, card) in cards.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&card.to_string());
    }
    out
}

#[cfg(test)]
mod test {
    use itertools::iproduct;

    use super::*;

    #[test]
    fn test_token_round_trip() {
        for (&rank, &suit) in iproduct!(Rank::all_ranks(), Suit::all_suits()) {
            let card = Card::new(rank, suit);
            let token = card.to_string();
            assert!(token.chars().count() <= 3, "token too long: {token}");
            assert_eq!(token.parse::<Card>().unwrap(), card);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Card>().is_err());
        assert!("♠".parse::<Card>().is_err());
        assert!("1♠".parse::<Card>().is_err());
        assert!("10x".parse::<Card>().is_err());
        assert!("A♠♠".parse::<Card>().is_err());
    }

    #[test]
    fn test_serde_token() {
        let card = Card::new(Rank::Ten, Suit::Heart);
        let ser = serde_json::to_string(&card).unwrap();
        assert_eq!(ser, "\"10♥\"");
        let de: Card = serde_json::from_str(&ser).unwrap();
        assert_eq!(de, card);
    }

    #[test]
    fn test_rank_order() {
        assert!(Rank::Two < Rank::Ten);
        assert!(Rank::Ten < Rank::Jack);
        assert!(Rank::King < Rank::Ace);
        assert_eq!(Rank::Two.index(), 0);
        assert_eq!(Rank::Ace.index(), 12);
        assert_eq!(Suit::Club.index(), 0);
        assert_eq!(Suit::Spade.index(), 3);
    }
}
