//! Canned strategies, for testing.

use std::collections::VecDeque;
use std::str::FromStr;
use std::time::Duration;

use crate::card::Card;
use crate::protocol::Perspective;

use super::Strategy;

fn cards(tokens: &[&str]) -> Vec<Card> {
    tokens
        .iter()
        .map(|s| Card::from_str(s).expect("valid card token"))
        .collect()
}

/// Replays queued decisions in order. An exhausted queue opens with
/// nothing, passes, and takes.
#[derive(Debug, Default)]
pub struct Scripted {
    opens: VecDeque<Vec<Card>>,
    joins: VecDeque<Vec<Card>>,
    defences: VecDeque<(Vec<Card>, Vec<usize>)>,
}

impl Scripted {
    pub fn opens(mut self, tokens: &[&str]) -> Self {
        self.opens.push_back(cards(tokens));
        self
    }

    pub fn joins(mut self, tokens: &[&str]) -> Self {
        self.joins.push_back(cards(tokens));
        self
    }

    pub fn defends(mut self, tokens: &[&str], indexes: &[usize]) -> Self {
        self.defences.push_back((cards(tokens), indexes.to_vec()));
        self
    }
}

impl Strategy for Scripted {
    fn first_attack(&mut self, _: &Perspective) -> Vec<Card> {
        self.opens.pop_front().unwrap_or_default()
    }

    fn optional_attack(&mut self, _: &Perspective) -> Vec<Card> {
        self.joins.pop_front().unwrap_or_default()
    }

    fn defence(&mut self, _: &Perspective) -> (Vec<Card>, Vec<usize>) {
        self.defences.pop_front().unwrap_or_default()
    }
}

/// Panics on every decision call.
#[derive(Debug, Default)]
pub struct Panics;

impl Strategy for Panics {
    fn first_attack(&mut self, _: &Perspective) -> Vec<Card> {
        panic!("scripted failure");
    }

    fn optional_attack(&mut self, _: &Perspective) -> Vec<Card> {
        panic!("scripted failure");
    }

    fn defence(&mut self, _: &Perspective) -> (Vec<Card>, Vec<usize>) {
        panic!("scripted failure");
    }
}

/// Sleeps through every decision call, then answers sensibly. Pair with a
/// short deadline to exercise the abandon path.
#[derive(Debug)]
pub struct Sleepy(pub Duration);

impl Strategy for Sleepy {
    fn first_attack(&mut self, view: &Perspective) -> Vec<Card> {
        std::thread::sleep(self.0);
        view.hand().first().copied().into_iter().collect()
    }

    fn optional_attack(&mut self, _: &Perspective) -> Vec<Card> {
        std::thread::sleep(self.0);
        vec![]
    }

    fn defence(&mut self, _: &Perspective) -> (Vec<Card>, Vec<usize>) {
        std::thread::sleep(self.0);
        (vec![], vec![])
    }
}
