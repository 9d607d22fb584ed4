//! Narrative rendering: turns allocated rounds into lines of battle text.

use crate::core::rng::RandomSource;
use crate::core::rules::BattleRules;
use crate::core::template::{Bindings, Template, TemplateCategory, TemplatePool};
use crate::schema::loadout::{EVADE_TAG, GENERAL_TAG};
use crate::schema::outcome::Side;
use crate::schema::round::{Round, RoundNarrative};

/// Renders rounds of one battle against a template pool.
#[derive(Debug, Clone)]
pub struct NarrativeRenderer<'a> {
    pool: &'a TemplatePool,
    names: [&'a str; 2],
    winner: Side,
    color_commentary_threshold: u32,
}

impl<'a> NarrativeRenderer<'a> {
    /// `names` are the display names of each side, indexed by `Side::index`.
    pub fn new(
        pool: &'a TemplatePool,
        names: [&'a str; 2],
        winner: Side,
        rules: &BattleRules,
    ) -> Self {
        Self {
            pool,
            names,
            winner,
            color_commentary_threshold: rules.color_commentary_threshold,
        }
    }

    /// Render every round in order; the last round also announces the winner.
    pub fn render_all<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        rounds: Vec<Round>,
    ) -> Vec<RoundNarrative> {
        let count = rounds.len();
        rounds
            .into_iter()
            .enumerate()
            .map(|(i, round)| {
                let lines = self.render_round(rng, &round, i + 1 == count);
                RoundNarrative { round, lines }
            })
            .collect()
    }

    /// Render one round.
    ///
    /// Always yields the attack line, then either the shield line (a miss)
    /// or the hit line plus optional color commentary, then the victory
    /// line when `is_last`.
    pub fn render_round<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        round: &Round,
        is_last: bool,
    ) -> Vec<String> {
        let names = Bindings {
            aggressor: Some(self.names[round.aggressor.index()]),
            victim: Some(self.names[round.victim().index()]),
            ..Bindings::default()
        };
        let weapon = round.weapon.as_str();
        let mut lines = Vec::with_capacity(4);

        if let Some(attack) = self.sample(rng, TemplateCategory::Attack, weapon, GENERAL_TAG) {
            lines.push(attack.render(&names));
        }

        if let Some(shield) = &round.shield {
            let line = self.sample(rng, TemplateCategory::Shield, shield.as_str(), EVADE_TAG);
            if let Some(line) = line {
                lines.push(line.render(&names));
            }
        } else {
            if let Some(hit) = self.sample(rng, TemplateCategory::Hit, weapon, GENERAL_TAG) {
                // Hit types follow the weapon, even when its hit line fell back.
                let hit_type = self
                    .pool
                    .bucket(TemplateCategory::HitType, weapon)
                    .and_then(|types| rng.pick(types))
                    .map(|t| t.render(&names));
                lines.push(hit.render(&Bindings {
                    hit_type: hit_type.as_deref(),
                    ..names
                }));
            }

            if round.score >= self.color_commentary_threshold {
                let color = self.sample(rng, TemplateCategory::Color, weapon, GENERAL_TAG);
                if let Some(color) = color {
                    let mut line = color.render(&names);
                    line.push_str(self.pool.exclamation());
                    lines.push(line);
                }
            }
        }

        if is_last {
            lines.push(self.pool.battle_won().render(&Bindings {
                winner: Some(self.names[self.winner.index()]),
                ..Bindings::default()
            }));
        }

        lines
    }

    /// Pick a template from `category.tag`, or from `category.fallback` when
    /// the tag has no bucket.
    fn sample<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        category: TemplateCategory,
        tag: &str,
        fallback: &'static str,
    ) -> Option<&'a Template> {
        let bucket = match self.pool.bucket(category, tag) {
            Some(bucket) => bucket,
            None => {
                // Most weapons have no color commentary of their own.
                if category != TemplateCategory::Color {
                    tracing::warn!(%category, tag, fallback, "no templates for tag, using fallback");
                }
                self.pool.bucket(category, fallback)?
            }
        };
        rng.pick(bucket)
    }
}
