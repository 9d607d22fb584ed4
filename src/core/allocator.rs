//! Round allocation: spreads a decided battle over an ordered list of rounds.
//!
//! The winner attacks until their damage reaches `winner_threshold`; the
//! loser attacks until theirs reaches the lower `loser_threshold`, and that
//! last loser round is dropped. Everything but the winner's final round is
//! shuffled, then the winner's final round closes the fight.

use crate::core::rng::RandomSource;
use crate::core::rules::BattleRules;
use crate::schema::loadout::{KartLoadout, ShieldTag, WeaponTag};
use crate::schema::outcome::Side;
use crate::schema::round::Round;

/// The result of allocating one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Rounds in play order; the last one is the winner's finishing round.
    pub rounds: Vec<Round>,
    /// The winner's round scores in generation order.
    pub winner_scores: Vec<u32>,
    /// The loser's round scores in generation order, including the dropped
    /// final round.
    pub loser_scores: Vec<u32>,
}

/// Allocate the rounds of a battle won by `winner`.
///
/// `loadouts` is indexed by `Side::index`. Empty weapon or shield pools fall
/// back to `general` and `evade`, so allocation always completes.
pub fn allocate<R: RandomSource + ?Sized>(
    rng: &mut R,
    winner: Side,
    loadouts: &[KartLoadout; 2],
    rules: &BattleRules,
) -> Allocation {
    let loser = winner.opponent();

    let mut winner_rounds = draw_phase(rng, winner, loadouts, rules.winner_threshold, rules);
    let mut loser_rounds = draw_phase(rng, loser, loadouts, rules.loser_threshold, rules);

    let winner_scores: Vec<u32> = winner_rounds.iter().map(|r| r.score).collect();
    let loser_scores: Vec<u32> = loser_rounds.iter().map(|r| r.score).collect();

    loser_rounds.pop();
    let finishing = winner_rounds.pop();

    let mut rounds = winner_rounds;
    rounds.append(&mut loser_rounds);
    rng.shuffle(&mut rounds);
    rounds.extend(finishing);

    apply_running_totals(&mut rounds);

    tracing::trace!(
        %winner,
        winner_rounds = winner_scores.len(),
        loser_rounds = loser_scores.len(),
        total_rounds = rounds.len(),
        "allocated battle rounds"
    );

    Allocation {
        rounds,
        winner_scores,
        loser_scores,
    }
}

/// Draw rounds for `aggressor` until their cumulative score reaches
/// `threshold`. At least one round is always drawn.
pub fn draw_phase<R: RandomSource + ?Sized>(
    rng: &mut R,
    aggressor: Side,
    loadouts: &[KartLoadout; 2],
    threshold: u32,
    rules: &BattleRules,
) -> Vec<Round> {
    let attacker = &loadouts[aggressor.index()];
    let defender = &loadouts[aggressor.opponent().index()];

    let mut rounds = Vec::new();
    let mut total = 0u32;
    loop {
        let round = draw_round(rng, aggressor, attacker, defender, rules);
        total += round.score;
        rounds.push(round);
        if total >= threshold {
            break;
        }
    }

    tracing::trace!(%aggressor, rounds = rounds.len(), total, threshold, "drew phase");
    rounds
}

fn draw_round<R: RandomSource + ?Sized>(
    rng: &mut R,
    aggressor: Side,
    attacker: &KartLoadout,
    defender: &KartLoadout,
    rules: &BattleRules,
) -> Round {
    let missed = rng.int(0, rules.shield_chance as i64) == 0;
    let score = if missed {
        0
    } else {
        let (low, high) = rules.score_range;
        rng.int(low as i64, high as i64) as u32
    };

    let weapon = match rng.pick(&attacker.weapons) {
        Some(weapon) if !rolls_bump(rng, attacker.weapons.len(), rules) => weapon.clone(),
        _ => WeaponTag::general(),
    };

    let shield = if score == 0 {
        Some(
            rng.pick(&defender.shields)
                .cloned()
                .unwrap_or_else(ShieldTag::evade),
        )
    } else {
        None
    };

    Round {
        aggressor,
        score,
        weapon,
        shield,
        running_totals: [0, 0],
    }
}

/// Whether an attack with a specific weapon gets narrated as `general`.
///
/// Pool sizes past the end of the bump table still consume a draw but
/// never bump.
fn rolls_bump<R: RandomSource + ?Sized>(rng: &mut R, pool_size: usize, rules: &BattleRules) -> bool {
    match rules.bump_chance_by_weapon_count.get(pool_size) {
        Some(&chance) => rng.int(0, chance as i64) == 0,
        None => {
            rng.next_unit();
            false
        }
    }
}

/// Fill in each round's cumulative per-side damage, in play order.
pub fn apply_running_totals(rounds: &mut [Round]) {
    let mut totals = [0u32; 2];
    for round in rounds.iter_mut() {
        totals[round.aggressor.index()] += round.score;
        round.running_totals = totals;
    }
}
