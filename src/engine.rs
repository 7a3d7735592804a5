//! The turn engine: the single authoritative game state and the step
//! function that advances it.
//!
//! One call to [`GameState::advance`] performs one atomic step: it selects
//! the active phase, asks the acting seat's strategy for a decision under
//! the engine's fault envelope, applies whatever subset of the proposal
//! the table accepts, notifies every other active seat, and handles
//! round-end dealing and winner detection. A misbehaving strategy
//! degrades to the phase default (take, forced card, or pass); the only
//! fatal path is a seat asked to open an attack with an empty hand.

use std::cmp::min;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::card::{fmt_cards, Card, Rank, Suit};
use crate::deck::Deck;
use crate::error::EngineError;
use crate::event::Event;
use crate::log::{LogEntry, LogSource};
use crate::protocol::{self, SeatContext, Snapshot};
use crate::strategy::Strategy;
use crate::table::Table;


/// Cards dealt to each seat, and the top-up target after every round.
pub const HAND_SIZE: usize = 6;
/// Attack slots available until the first burn of the game.
pub const MAX_ATTACK_SIZE: usize = 5;
/// Attack slots available once any burn has occurred.
pub const MAX_ATTACK_SIZE_AFTER_BURN: usize = 6;

/// Per-step knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepOptions {
    /// Wall-clock budget for each strategy call. A call that finishes
    /// late is abandoned, not interrupted.
    pub deadline: Option<Duration>,
}

/// Whether a seat is still playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Active,
    /// Hand emptied with the deck exhausted. Skipped by turn rotation but
    /// retained for display.
    Won,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeatRecord {
    status: SeatStatus,
    log: Vec<LogEntry>,
    ctx: SeatContext,
}

/// The authoritative state of one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    hands: Vec<Vec<Card>>,
    table: Table,
    deck: Deck,
    trump_card: Card,
    lowest_trump: Option<Rank>,
    attacker: usize,
    defender: usize,
    turn: usize,
    burn_occurred: bool,
    burned: usize,
    seats: Vec<SeatRecord>,
    init_done: bool,
}

impl GameState {
    /// Creates a fresh game: shuffled pack, [`HAND_SIZE`] cards per seat
    /// dealt from the front, trump revealed at the back of the deck. The
    /// starting attacker is the seat holding the lowest trump (ties by
    /// seat order); if no trump was dealt, a uniformly random seat.
    pub fn new<R: Rng + ?Sized>(num_seats: usize, rng: &mut R) -> Result<Self, EngineError> {
        if !(2..=8).contains(&num_seats) {
            return Err(EngineError::SeatCount(num_seats));
        }
        let mut deck = Deck::full();
        deck.shuffle(rng);
        let trump_card = deck.back().expect("full deck");

        let mut hands = vec![vec![]; num_seats];
        for _ in 0..HAND_SIZE {
            for hand in hands.iter_mut() {
                if let Some(card) = deck.draw() {
                    hand.push(card);
                }
            }
        }

        let mut attacker = rng.gen_range(0..num_seats);
        let mut lowest_trump = None;
        for (seat, hand) in hands.iter().enumerate() {
            for card in hand {
                if card.suit == trump_card.suit && lowest_trump.map_or(true, |r| card.rank < r) {
                    lowest_trump = Some(card.rank);
                    attacker = seat;
                }
            }
        }
        let defender = (attacker + 1) % num_seats;

        let seats = (0..num_seats)
            .map(|seat| SeatRecord {
                status: SeatStatus::Active,
                log: vec![],
                ctx: SeatContext::new(seat, trump_card, attacker, lowest_trump),
            })
            .collect();

        Ok(Self {
            hands,
            table: Table::default(),
            deck,
            trump_card,
            lowest_trump,
            attacker,
            defender,
            turn: attacker,
            burn_occurred: false,
            burned: 0,
            seats,
            init_done: false,
        })
    }

    /// Creates a fresh game from the thread RNG.
    pub fn random(num_seats: usize) -> Result<Self, EngineError> {
        Self::new(num_seats, &mut rand::thread_rng())
    }

    /// The number of seats at the table.
    pub fn seat_count(&self) -> usize {
        self.hands.len()
    }

    /// A seat's hand.
    pub fn hand(&self, seat: usize) -> &[Card] {
        &self.hands[seat]
    }

    /// The table's slot arrays.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Cards left in the deck.
    pub fn deck_count(&self) -> usize {
        self.deck.len()
    }

    /// The revealed trump card.
    pub fn trump_card(&self) -> Card {
        self.trump_card
    }

    /// The trump suit.
    pub fn trump_suit(&self) -> Suit {
        self.trump_card.suit
    }

    /// Rank of the lowest trump dealt at the start, if any was dealt.
    pub fn lowest_trump(&self) -> Option<Rank> {
        self.lowest_trump
    }

    /// The seat that opened (or will open) the current attack.
    pub fn attacker(&self) -> usize {
        self.attacker
    }

    /// The seat currently defending.
    pub fn defender(&self) -> usize {
        self.defender
    }

    /// The seat acting next.
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Cards permanently removed from play by burns.
    pub fn burned_cards(&self) -> usize {
        self.burned
    }

    /// Returns true once any burn has occurred this game.
    pub fn burn_occurred(&self) -> bool {
        self.burn_occurred
    }

    /// A seat's status.
    pub fn status(&self, seat: usize) -> SeatStatus {
        self.seats[seat].status
    }

    /// A seat's cumulative log.
    pub fn log(&self, seat: usize) -> &[LogEntry] {
        &self.seats[seat].log
    }

    /// Returns true when at most one seat still holds cards and the deck
    /// is exhausted. Termination is observed here by the caller; the
    /// engine itself keeps stepping.
    pub fn is_over(&self) -> bool {
        self.deck.is_empty() && self.hands.iter().filter(|h| !h.is_empty()).count() <= 1
    }

    /// Advances the game by one atomic step.
    ///
    /// `bots[i]` decides for seat `i`. This is the sole mutation entry
    /// point; faults in strategies never escape it. The only error is a
    /// fatal invariant breach.
    pub fn advance(
        &mut self,
        bots: &mut [Box<dyn Strategy>],
        opts: &StepOptions,
    ) -> Result<(), EngineError> {
        let n = self.hands.len();
        if bots.len() != n {
            return Err(EngineError::StrategyCount {
                expected: n,
                got: bots.len(),
            });
        }

        let cap = if self.burn_occurred {
            MAX_ATTACK_SIZE_AFTER_BURN
        } else {
            MAX_ATTACK_SIZE
        };
        let max_attack = min(self.hands[self.defender].len(), cap);
        if self.table.is_clear() {
            self.table.reset(max_attack);
        } else {
            self.table.pad_to(max_attack);
        }

        if !self.init_done {
            for seat in 0..n {
                let event = Event::GameInit {
                    seats: n,
                    seat,
                    hand: self.hands[seat].clone(),
                    trump_card: self.trump_card,
                    attacker: self.attacker,
                    lowest_trump: self.lowest_trump,
                };
                self.notify(bots, seat, &event, opts);
            }
            self.init_done = true;
        }

        let mut end_of_round = false;
        let mut defence_successful = true;

        if self.turn == self.defender {
            self.defence_phase(bots, opts, &mut end_of_round, &mut defence_successful);
        } else {
            self.attack_phase(bots, opts)?;
        }

        if end_of_round {
            self.deal_all(bots, opts);
            self.table.clear();
            self.attacker = if defence_successful {
                self.defender
            } else {
                self.next_seat(self.defender)
            };
            self.defender = self.next_seat(self.attacker);
            self.turn = self.attacker;
        } else {
            self.turn = self.next_seat(self.turn);
        }

        if self.deck.is_empty() {
            self.detect_winners(bots, opts);
        }
        Ok(())
    }

    /// The defender either burns (table fully covered), defends, forwards,
    /// or takes. Every failure path collapses into a take.
    fn defence_phase(
        &mut self,
        bots: &mut [Box<dyn Strategy>],
        opts: &StepOptions,
        end_of_round: &mut bool,
        defence_successful: &mut bool,
    ) {
        let defender = self.defender;
        if self.table.all_covered() {
            let cards = self.table.cards();
            self.burned += cards.len();
            self.burn_occurred = true;
            self.broadcast(bots, &Event::Burn { cards: cards.clone() }, opts);
            self.log_game(defender, format!("burned {}", fmt_cards(&cards)));
            *end_of_round = true;
            // A burn counts as a successful defence: the defender attacks
            // next, exactly as after covering every slot.
            return;
        }

        let action = self.decide(bots, defender, Event::RequestDefence, opts, "defence");
        match action {
            Some(Action::Defend { cards, indexes }) => {
                let (accepted, accepted_indexes) = self.table.defend_with(
                    &cards,
                    &indexes,
                    &mut self.hands[defender],
                    self.trump_card.suit,
                );
                if accepted.is_empty() {
                    self.take(bots, opts, end_of_round, defence_successful);
                } else {
                    self.log_game(defender, format!("defended with {}", fmt_cards(&accepted)));
                    self.broadcast(
                        bots,
                        &Event::Defence {
                            seat: defender,
                            cards: accepted,
                            indexes: accepted_indexes,
                        },
                        opts,
                    );
                }
            }
            Some(Action::Forward(cards)) => {
                let next = self.next_seat(defender);
                let capacity =
                    self.hands[next].len() as isize - self.table.occupied_attacks() as isize;
                if self.table.any_defended() || capacity <= 0 {
                    self.take(bots, opts, end_of_round, defence_successful);
                    return;
                }
                let accepted =
                    self.table
                        .forward_with(&cards, &mut self.hands[defender], capacity as usize);
                if accepted.is_empty() {
                    self.take(bots, opts, end_of_round, defence_successful);
                } else {
                    self.log_game(defender, format!("forwarded {}", fmt_cards(&accepted)));
                    self.broadcast(
                        bots,
                        &Event::Forward {
                            seat: defender,
                            cards: accepted,
                        },
                        opts,
                    );
                    self.defender = next;
                    let allowed = self.hands[next].len();
                    self.table.truncate_to(allowed);
                }
            }
            // Take, a misdirected action, or any fault.
            _ => self.take(bots, opts, end_of_round, defence_successful),
        }
    }

    /// An attacker opens (mandatory, force-backed) or joins (optional) the
    /// attack.
    fn attack_phase(
        &mut self,
        bots: &mut [Box<dyn Strategy>],
        opts: &StepOptions,
    ) -> Result<(), EngineError> {
        let seat = self.turn;
        let first = self.table.is_clear();
        let (event, phase) = if first {
            (Event::RequestFirstAttack, "first attack")
        } else {
            (Event::RequestOptionalAttack, "optional attack")
        };

        let action = self.decide(bots, seat, event, opts, phase);
        let accepted = match action {
            Some(Action::Attack(cards)) => self.table.attack_with(&cards, &mut self.hands[seat]),
            _ => vec![],
        };

        if first {
            let accepted = if accepted.is_empty() {
                let forced = self.hands[seat]
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .ok_or(EngineError::EmptyFirstAttack(seat))?;
                let placed = self.table.attack_with(&[forced], &mut self.hands[seat]);
                debug_assert_eq!(placed, vec![forced]);
                self.log_game(seat, format!("forced attack with {forced}"));
                placed
            } else {
                accepted
            };
            self.log_game(seat, format!("attacked with {}", fmt_cards(&accepted)));
            self.broadcast(bots, &Event::FirstAttack { seat, cards: accepted }, opts);
        } else if accepted.is_empty() {
            self.log_game(seat, "passed".to_string());
            self.broadcast(bots, &Event::Pass { seat }, opts);
        } else {
            self.log_game(seat, format!("attacked with {}", fmt_cards(&accepted)));
            self.broadcast(bots, &Event::OptionalAttack { seat, cards: accepted }, opts);
        }
        Ok(())
    }

    /// Moves every card on the table into the defender's hand. The table
    /// itself is cleared by round-end housekeeping.
    fn take(
        &mut self,
        bots: &mut [Box<dyn Strategy>],
        opts: &StepOptions,
        end_of_round: &mut bool,
        defence_successful: &mut bool,
    ) {
        let defender = self.defender;
        let cards = self.table.cards();
        self.broadcast(
            bots,
            &Event::Take {
                seat: defender,
                cards: cards.clone(),
            },
            opts,
        );
        self.log_game(defender, format!("took {}", fmt_cards(&cards)));
        self.hands[defender].extend(cards);
        *end_of_round = true;
        *defence_successful = false;
    }

    /// Tops every hand up to [`HAND_SIZE`] in seat order from the original
    /// attacker, skipping the defender, who draws last.
    fn deal_all(&mut self, bots: &mut [Box<dyn Strategy>], opts: &StepOptions) {
        let n = self.hands.len();
        let (attacker, defender) = (self.attacker, self.defender);
        for offset in 0..n {
            let seat = (attacker + offset) % n;
            if seat == defender {
                continue;
            }
            self.deal_to(bots, seat, opts);
        }
        self.deal_to(bots, defender, opts);
    }

    fn deal_to(&mut self, bots: &mut [Box<dyn Strategy>], seat: usize, opts: &StepOptions) {
        let mut drawn = vec![];
        while self.hands[seat].len() + drawn.len() < HAND_SIZE {
            match self.deck.draw() {
                Some(card) => drawn.push(card),
                None => break,
            }
        }
        if drawn.is_empty() {
            return;
        }
        self.hands[seat].extend(&drawn);
        self.log_game(seat, format!("drew {}", fmt_cards(&drawn)));
        self.notify(bots, seat, &Event::DrawnToHand { cards: drawn }, opts);
    }

    /// Marks seats whose hands just emptied as winners, then pulls the
    /// attacker, defender, and turn pointers onto seats still holding
    /// cards. Runs only once the deck is exhausted.
    fn detect_winners(&mut self, bots: &mut [Box<dyn Strategy>], opts: &StepOptions) {
        let n = self.hands.len();
        for seat in 0..n {
            if self.hands[seat].is_empty() && self.seats[seat].status != SeatStatus::Won {
                self.seats[seat].status = SeatStatus::Won;
                self.log_game(seat, "won the game".to_string());
                self.broadcast(bots, &Event::Winner { seat }, opts);
            }
        }
        if self.hands.iter().all(Vec::is_empty) {
            return;
        }
        self.attacker = self.closest_holding(self.attacker);
        self.defender = self.closest_holding(self.defender);
        self.turn = self.closest_holding(self.turn);
    }

    /// The next seat in rotation. Once the deck is empty, seats with empty
    /// hands are skipped.
    fn next_seat(&self, seat: usize) -> usize {
        let n = self.hands.len();
        if !self.deck.is_empty() {
            return (seat + 1) % n;
        }
        for offset in 1..=n {
            let next = (seat + offset) % n;
            if !self.hands[next].is_empty() {
                return next;
            }
        }
        seat
    }

    /// The nearest seat at or after `seat` that still holds cards.
    fn closest_holding(&self, seat: usize) -> usize {
        let n = self.hands.len();
        for offset in 0..n {
            let s = (seat + offset) % n;
            if !self.hands[s].is_empty() {
                return s;
            }
        }
        seat
    }

    /// Seats that still take part in play: everyone while the deck holds
    /// cards, otherwise seats with non-empty hands.
    fn active_seats(&self) -> Vec<usize> {
        (0..self.hands.len())
            .filter(|&s| !self.deck.is_empty() || !self.hands[s].is_empty())
            .collect()
    }

    fn snapshot_for(&self, seat: usize) -> Snapshot {
        Snapshot {
            hand: self.hands[seat].clone(),
            attack: self.table.attack().to_vec(),
            defence: self.table.defence().to_vec(),
            hand_sizes: self.hands.iter().map(Vec::len).collect(),
            defender: self.defender,
            deck_count: self.deck.len(),
        }
    }

    /// Requests a decision from one seat. A fault or a structurally
    /// invalid action is logged and collapsed to `None`, which the caller
    /// turns into the phase default.
    fn decide(
        &mut self,
        bots: &mut [Box<dyn Strategy>],
        seat: usize,
        event: Event,
        opts: &StepOptions,
        phase: &str,
    ) -> Option<Action> {
        let snapshot = self.snapshot_for(seat);
        let result = protocol::guard(
            bots[seat].as_mut(),
            &mut self.seats[seat].ctx,
            &event,
            snapshot,
            opts.deadline,
        );
        match result {
            Ok(outcome) => {
                self.merge_bot_log(seat, outcome.log);
                let action = outcome.action?;
                match action.validate() {
                    Ok(()) => Some(action),
                    Err(violation) => {
                        self.log_game(seat, format!("rejected {phase} action: {violation}"));
                        None
                    }
                }
            }
            Err(fault) => {
                self.log_game(seat, format!("{phase} fault: {fault}"));
                None
            }
        }
    }

    /// Delivers a notification to one seat, ignoring any action it might
    /// illegally produce. Faults are logged and swallowed.
    fn notify(
        &mut self,
        bots: &mut [Box<dyn Strategy>],
        seat: usize,
        event: &Event,
        opts: &StepOptions,
    ) {
        let snapshot = self.snapshot_for(seat);
        let result = protocol::guard(
            bots[seat].as_mut(),
            &mut self.seats[seat].ctx,
            event,
            snapshot,
            opts.deadline,
        );
        match result {
            Ok(outcome) => self.merge_bot_log(seat, outcome.log),
            Err(fault) => self.log_game(seat, format!("notification fault: {fault}")),
        }
    }

    fn broadcast(&mut self, bots: &mut [Box<dyn Strategy>], event: &Event, opts: &StepOptions) {
        for seat in self.active_seats() {
            self.notify(bots, seat, event, opts);
        }
    }

    fn log_game(&mut self, seat: usize, text: String) {
        self.seats[seat].log.push(LogEntry::new(LogSource::Game, text));
    }

    fn merge_bot_log(&mut self, seat: usize, lines: Vec<String>) {
        for line in lines {
            self.seats[seat].log.push(LogEntry::new(LogSource::Bot, line));
        }
    }
}
