//! Generate a battle from the built-in text, play it, then replay it.
//!
//! Run with: cargo run --example replay

use battle_narrative::{BattleEngine, BattleError, BattleOutcome, KartLoadout, Side};

fn main() -> Result<(), BattleError> {
    let engine = BattleEngine::builder().build()?;

    let outcome = BattleOutcome::new("12", "40", Side::Away, "83811");
    let loadouts = [
        KartLoadout::new("Zippy")
            .with_weapon("laser")
            .with_weapon("rocket")
            .with_shield("kevlar"),
        KartLoadout::new("Dent").with_weapon("flamethrower"),
    ];

    let mut session = engine.load(&outcome, &loadouts)?;

    println!("=== First showing ===\n");
    let mut first = Vec::new();
    while let Some(narrative) = session.next() {
        for line in &narrative.lines {
            println!("{}", line);
        }
        println!();
        first.push(narrative.clone());
    }

    session.reset();
    let replayed: Vec<_> = std::iter::from_fn(|| session.next().cloned()).collect();

    println!("=== Replay ===\n");
    println!(
        "{} rounds, identical to the first showing: {}",
        replayed.len(),
        replayed == first
    );
    println!("Winner: {}", session.winner_name());

    Ok(())
}
