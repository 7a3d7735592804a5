use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::SeedableRng;

use durak::engine::{GameState, SeatStatus, StepOptions};
use durak::strategy::{Naive, Strategy};

mod args;
use self::args::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut state = match args.seed {
        Some(seed) => GameState::new(args.seats, &mut StdRng::seed_from_u64(seed))?,
        None => GameState::random(args.seats)?,
    };
    let mut bots: Vec<Box<dyn Strategy>> = (0..args.seats)
        .map(|_| Box::new(Naive) as Box<dyn Strategy>)
        .collect();
    let opts = StepOptions {
        deadline: args.deadline_ms.map(Duration::from_millis),
    };

    let mut steps = 0;
    while !state.is_over() && steps < args.max_steps {
        state.advance(&mut bots, &opts)?;
        steps += 1;
    }

    if args.json {
        let out = serde_json::to_string_pretty(&state).context("serializing game state")?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "trump {}, {} steps, {} cards burned",
        state.trump_card().to_ansi_string(),
        steps,
        state.burned_cards()
    );
    for seat in 0..state.seat_count() {
        let status = match state.status(seat) {
            SeatStatus::Won => "won",
            SeatStatus::Active => "active",
        };
        let holding = state
            .hand(seat)
            .iter()
            .map(|c| c.to_ansi_string().to_string())
            .join(" ");
        println!("\nseat {seat} ({status}): {holding}");
        for entry in state.log(seat) {
            println!("  {entry}");
        }
    }
    Ok(())
}
