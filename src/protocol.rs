//! The per-seat protocol dispatcher.
//!
//! The engine talks to a strategy through exactly one door: an [`Event`]
//! plus a [`Snapshot`] of the visible state goes in, an optional [`Action`]
//! and a batch of log lines come out. The seat's [`SeatContext`] is owned
//! by the engine and threaded through every call, so a strategy never
//! depends on its own object surviving between steps.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::card::{Card, Rank, Suit};
use crate::error::BotFault;
use crate::event::Event;
use crate::strategy::Strategy;

/// Copies of the state visible to one seat for one call. Strategies never
/// see references into engine state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub hand: Vec<Card>,
    pub attack: Vec<Option<Card>>,
    pub defence: Vec<Option<Card>>,
    pub hand_sizes: Vec<usize>,
    pub defender: usize,
    pub deck_count: usize,
}

/// The engine-owned record standing in for a bot's private memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatContext {
    seat: usize,
    trump_card: Card,
    attacker: usize,
    lowest_trump: Option<Rank>,
    /// Append-only history of every event this seat has received.
    events: Vec<Event>,
}

impl SeatContext {
    /// Creates the context for one seat.
    pub fn new(seat: usize, trump_card: Card, attacker: usize, lowest_trump: Option<Rank>) -> Self {
        Self {
            seat,
            trump_card,
            attacker,
            lowest_trump,
            events: vec![],
        }
    }

    /// The full raw event history, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Read-only accessors handed to every strategy call.
pub struct Perspective<'a> {
    ctx: &'a SeatContext,
    snapshot: &'a Snapshot,
    lines: RefCell<Vec<String>>,
}

impl<'a> Perspective<'a> {
    fn new(ctx: &'a SeatContext, snapshot: &'a Snapshot) -> Self {
        Self {
            ctx,
            snapshot,
            lines: RefCell::new(vec![]),
        }
    }

    /// This seat's index.
    pub fn my_seat(&self) -> usize {
        self.ctx.seat
    }

    /// The revealed trump card.
    pub fn trump_card(&self) -> Card {
        self.ctx.trump_card
    }

    /// The trump suit.
    pub fn trump_suit(&self) -> Suit {
        self.ctx.trump_card.suit
    }

    /// The seat that opened (or will open) the current attack.
    pub fn attacker(&self) -> usize {
        self.ctx.attacker
    }

    /// The seat currently defending.
    pub fn defender(&self) -> usize {
        self.snapshot.defender
    }

    /// This seat's hand.
    pub fn hand(&self) -> &[Card] {
        &self.snapshot.hand
    }

    /// The attack slots.
    pub fn attack(&self) -> &[Option<Card>] {
        &self.snapshot.attack
    }

    /// The defence slots.
    pub fn defence(&self) -> &[Option<Card>] {
        &self.snapshot.defence
    }

    /// Every seat's hand size.
    pub fn hand_sizes(&self) -> &[usize] {
        &self.snapshot.hand_sizes
    }

    /// Cards left in the deck.
    pub fn deck_count(&self) -> usize {
        self.snapshot.deck_count
    }

    /// Rank of the lowest trump dealt at the start, if any.
    pub fn lowest_trump(&self) -> Option<Rank> {
        self.ctx.lowest_trump
    }

    /// The full raw event history, including the event being handled.
    pub fn events(&self) -> &[Event] {
        self.ctx.events()
    }

    /// Appends a line to this seat's log. Lines are merged by the engine
    /// and never influence rule evaluation.
    pub fn log(&self, line: impl Into<String>) {
        self.lines.borrow_mut().push(line.into());
    }

    fn into_lines(self) -> Vec<String> {
        self.lines.into_inner()
    }
}

/// The result of one dispatched call.
#[derive(Debug)]
pub struct Outcome {
    /// A canonical action for decision events, `None` for notifications.
    pub action: Option<Action>,
    /// Log lines the strategy emitted during the call.
    pub log: Vec<String>,
}

/// Delivers one event to one seat.
///
/// Decision events call the matching required method and canonicalize its
/// return: an empty card list on optional attack or defence becomes
/// Pass/Take, and defence cards without indexes become a Forward.
/// Notification events call the optional observer hook and never produce
/// an action.
pub fn dispatch(
    strategy: &mut dyn Strategy,
    ctx: &mut SeatContext,
    event: &Event,
    snapshot: Snapshot,
) -> Outcome {
    ctx.events.push(event.clone());
    match event {
        Event::GameInit { attacker, .. } | Event::FirstAttack { seat: attacker, .. } => {
            ctx.attacker = *attacker;
        }
        Event::RequestFirstAttack => ctx.attacker = ctx.seat,
        _ => (),
    }

    let view = Perspective::new(ctx, &snapshot);
    let action = match event {
        Event::RequestFirstAttack => Some(Action::Attack(strategy.first_attack(&view))),
        Event::RequestOptionalAttack => {
            let cards = strategy.optional_attack(&view);
            Some(if cards.is_empty() {
                Action::Pass
            } else {
                Action::Attack(cards)
            })
        }
        Event::RequestDefence => {
            let (cards, indexes) = strategy.defence(&view);
            Some(if cards.is_empty() {
                Action::Take
            } else if indexes.is_empty() {
                Action::Forward(cards)
            } else {
                Action::Defend { cards, indexes }
            })
        }
        Event::GameInit { .. } => {
            strategy.on_game_init(&view);
            None
        }
        Event::FirstAttack { seat, cards } => {
            strategy.on_first_attack(&view, *seat, cards);
            None
        }
        Event::OptionalAttack { seat, cards } => {
            strategy.on_optional_attack(&view, *seat, cards);
            None
        }
        Event::Defence {
            seat,
            cards,
            indexes,
        } => {
            strategy.on_defence(&view, *seat, cards, indexes);
            None
        }
        Event::Take { seat, cards } => {
            strategy.on_take(&view, *seat, cards);
            None
        }
        Event::Forward { seat, cards } => {
            strategy.on_forward(&view, *seat, cards);
            None
        }
        Event::Pass { seat } => {
            strategy.on_pass(&view, *seat);
            None
        }
        Event::Burn { cards } => {
            strategy.on_burn(&view, cards);
            None
        }
        Event::DrawnToHand { cards } => {
            strategy.on_drawn_to_hand(&view, cards);
            None
        }
        Event::Winner { seat } => {
            strategy.on_winner(&view, *seat);
            None
        }
    };
    let log = view.into_lines();
    Outcome { action, log }
}

/// Dispatches under the engine's fault envelope: a panic becomes
/// [`BotFault::Panicked`], and a call that outlives the optional deadline
/// has its completed result abandoned. Faults never propagate further.
pub fn guard(
    strategy: &mut dyn Strategy,
    ctx: &mut SeatContext,
    event: &Event,
    snapshot: Snapshot,
    deadline: Option<Duration>,
) -> Result<Outcome, BotFault> {
    let start = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        dispatch(strategy, ctx, event, snapshot)
    }));
    match result {
        Err(payload) => Err(BotFault::Panicked(panic_text(payload))),
        Ok(outcome) => match deadline {
            Some(limit) if start.elapsed() > limit => Err(BotFault::DeadlineExpired(limit)),
            _ => Ok(outcome),
        },
    }
}

fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).into()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".into()
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use assert_matches::assert_matches;

    use crate::strategy::scripted::{Panics, Scripted, Sleepy};

    use super::*;

    fn card(s: &str) -> Card {
        Card::from_str(s).unwrap()
    }

    fn ctx() -> SeatContext {
        SeatContext::new(1, card("9♠"), 0, None)
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            hand: vec![card("7♣"), card("8♦")],
            attack: vec![Some(card("7♥")), None],
            defence: vec![None, None],
            hand_sizes: vec![2, 2],
            defender: 1,
            deck_count: 0,
        }
    }

    #[test]
    fn test_canonicalize_empty_defence_to_take() {
        let mut bot = Scripted::default().defends(&[], &[]);
        let out = dispatch(&mut bot, &mut ctx(), &Event::RequestDefence, snapshot());
        assert_eq!(out.action, Some(Action::Take));
    }

    #[test]
    fn test_canonicalize_cards_without_indexes_to_forward() {
        let mut bot = Scripted::default().defends(&["7♣"], &[]);
        let out = dispatch(&mut bot, &mut ctx(), &Event::RequestDefence, snapshot());
        assert_eq!(out.action, Some(Action::Forward(vec![card("7♣")])));
    }

    #[test]
    fn test_canonicalize_empty_optional_attack_to_pass() {
        let mut bot = Scripted::default().joins(&[]);
        let out = dispatch(
            &mut bot,
            &mut ctx(),
            &Event::RequestOptionalAttack,
            snapshot(),
        );
        assert_eq!(out.action, Some(Action::Pass));
    }

    #[test]
    fn test_notifications_produce_no_action() {
        let mut bot = Scripted::default();
        let event = Event::Pass { seat: 0 };
        let out = dispatch(&mut bot, &mut ctx(), &event, snapshot());
        assert_eq!(out.action, None);
    }

    #[test]
    fn test_event_history_accumulates() {
        let mut bot = Scripted::default().joins(&[]).joins(&[]);
        let mut ctx = ctx();
        dispatch(&mut bot, &mut ctx, &Event::Pass { seat: 0 }, snapshot());
        dispatch(
            &mut bot,
            &mut ctx,
            &Event::RequestOptionalAttack,
            snapshot(),
        );
        assert_eq!(ctx.events().len(), 2);
        assert_eq!(ctx.events()[0], Event::Pass { seat: 0 });
    }

    #[test]
    fn test_guard_catches_panic() {
        let mut bot = Panics;
        let result = guard(
            &mut bot,
            &mut ctx(),
            &Event::RequestDefence,
            snapshot(),
            None,
        );
        assert_matches!(result, Err(BotFault::Panicked(_)));
    }

    #[test]
    fn test_guard_abandons_late_result() {
        let mut bot = Sleepy(Duration::from_millis(20));
        let result = guard(
            &mut bot,
            &mut ctx(),
            &Event::RequestDefence,
            snapshot(),
            Some(Duration::from_millis(1)),
        );
        assert_matches!(result, Err(BotFault::DeadlineExpired(_)));
    }

    #[test]
    fn test_guard_passes_prompt_result() {
        let mut bot = Scripted::default().defends(&[], &[]);
        let result = guard(
            &mut bot,
            &mut ctx(),
            &Event::RequestDefence,
            snapshot(),
            Some(Duration::from_secs(5)),
        );
        assert_matches!(result, Ok(Outcome { action: Some(Action::Take), .. }));
    }

    #[test]
    fn test_attacker_tracking() {
        let mut bot = Scripted::default().opens(&["7♣"]);
        let mut ctx = ctx();
        dispatch(
            &mut bot,
            &mut ctx,
            &Event::FirstAttack {
                seat: 3,
                cards: vec![card("7♥")],
            },
            snapshot(),
        );
        assert_eq!(ctx.attacker, 3);
        dispatch(&mut bot, &mut ctx, &Event::RequestFirstAttack, snapshot());
        assert_eq!(ctx.attacker, 1);
    }
}
