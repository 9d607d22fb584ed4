//! Battle sessions: Outcome → Rounds → Narrative orchestration.
//!
//! A `BattleEngine` owns the read-only template pool and rules; each
//! `BattleSession` is one fully generated battle with a replay cursor.

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::core::allocator;
use crate::core::renderer::NarrativeRenderer;
use crate::core::rng::SeededRng;
use crate::core::rules::{BattleRules, RulesError};
use crate::core::template::{TemplateError, TemplatePool};
use crate::schema::loadout::{KartConfig, KartLoadout};
use crate::schema::outcome::{BattleOutcome, Side};
use crate::schema::round::RoundNarrative;

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("invalid battle outcome: {0}")]
    InvalidOutcome(String),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("rules error: {0}")]
    Rules(#[from] RulesError),
}

/// Shared, immutable narration setup. Built via `BattleEngine::builder()`.
#[derive(Debug, Clone)]
pub struct BattleEngine {
    templates: Arc<TemplatePool>,
    rules: Arc<BattleRules>,
}

/// Builder for constructing a `BattleEngine`.
#[derive(Debug, Default)]
pub struct BattleEngineBuilder {
    templates_paths: Vec<String>,
    rules_path: Option<String>,
    /// Directly provided templates (for testing without files).
    templates: Option<TemplatePool>,
    /// Directly provided rules (for testing without files).
    rules: Option<BattleRules>,
}

impl BattleEngine {
    pub fn builder() -> BattleEngineBuilder {
        BattleEngineBuilder::default()
    }

    pub fn templates(&self) -> &TemplatePool {
        &self.templates
    }

    pub fn rules(&self) -> &BattleRules {
        &self.rules
    }

    /// Generate the narrative for a battle.
    pub fn load(
        &self,
        outcome: &BattleOutcome,
        loadouts: &[KartLoadout; 2],
    ) -> Result<BattleSession, BattleError> {
        BattleSession::load(outcome, loadouts, &self.templates, &self.rules)
    }

    /// Generate the narrative for a battle from kart titles and raw slot
    /// configurations, both indexed by `Side::index`.
    pub fn load_from_configs(
        &self,
        outcome: &BattleOutcome,
        titles: [&str; 2],
        configs: &[KartConfig; 2],
    ) -> Result<BattleSession, BattleError> {
        let slots = &self.rules.slots;
        let loadouts = [
            KartLoadout::from_config(titles[0], &configs[0], slots),
            KartLoadout::from_config(titles[1], &configs[1], slots),
        ];
        self.load(outcome, &loadouts)
    }
}

impl BattleEngineBuilder {
    /// Add a template file; files are merged over the built-in pool in the
    /// order given.
    pub fn templates_path(mut self, path: &str) -> Self {
        self.templates_paths.push(path.to_string());
        self
    }

    pub fn rules_path(mut self, path: &str) -> Self {
        self.rules_path = Some(path.to_string());
        self
    }

    /// Provide templates directly, replacing the built-in pool.
    pub fn with_templates(mut self, templates: TemplatePool) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Provide rules directly.
    pub fn with_rules(mut self, rules: BattleRules) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn build(self) -> Result<BattleEngine, BattleError> {
        let mut templates = match self.templates {
            Some(templates) => templates,
            None => TemplatePool::builtin()?,
        };
        for path in &self.templates_paths {
            templates.merge(TemplatePool::load_from_ron(Path::new(path))?);
        }
        templates.validate()?;

        let rules = match (self.rules, &self.rules_path) {
            (Some(rules), _) => rules,
            (None, Some(path)) => BattleRules::load_from_ron(Path::new(path))?,
            (None, None) => BattleRules::default(),
        };
        rules.validate()?;

        tracing::debug!(
            templates = templates.len(),
            winner_threshold = rules.winner_threshold,
            loser_threshold = rules.loser_threshold,
            "battle engine ready"
        );

        Ok(BattleEngine {
            templates: Arc::new(templates),
            rules: Arc::new(rules),
        })
    }
}

/// One generated battle and a cursor over its rounds.
///
/// The narrative is produced once, at load; `next` and `reset` only move
/// the cursor, so a replay shows exactly the same fight.
#[derive(Debug, Clone)]
pub struct BattleSession {
    outcome: BattleOutcome,
    names: [String; 2],
    rounds: Vec<RoundNarrative>,
    cursor: usize,
    finished: bool,
}

impl BattleSession {
    /// Allocate and render a whole battle.
    ///
    /// Fails before generating anything if the outcome has no seed, the
    /// pool lacks a fallback bucket or the rules are invalid.
    pub fn load(
        outcome: &BattleOutcome,
        loadouts: &[KartLoadout; 2],
        templates: &TemplatePool,
        rules: &BattleRules,
    ) -> Result<BattleSession, BattleError> {
        if outcome.seed.is_empty() {
            return Err(BattleError::InvalidOutcome(
                "battle seed is empty".to_string(),
            ));
        }
        templates.validate()?;
        rules.validate()?;

        let loadouts = [
            loadouts[0].without_empty(&rules.slots),
            loadouts[1].without_empty(&rules.slots),
        ];
        let names = [
            loadouts[0].display_name.clone(),
            loadouts[1].display_name.clone(),
        ];

        let mut rng = SeededRng::from_seed_str(&outcome.seed);
        let allocation = allocator::allocate(&mut rng, outcome.winner, &loadouts, rules);
        let renderer = NarrativeRenderer::new(
            templates,
            [names[0].as_str(), names[1].as_str()],
            outcome.winner,
            rules,
        );
        let rounds = renderer.render_all(&mut rng, allocation.rounds);

        tracing::debug!(
            seed = %outcome.seed,
            winner = %outcome.winner,
            rounds = rounds.len(),
            "generated battle narrative"
        );

        Ok(BattleSession {
            outcome: outcome.clone(),
            names,
            rounds,
            cursor: 0,
            finished: false,
        })
    }

    /// The round at the cursor, advancing it. `None` once every round has
    /// been returned.
    pub fn next(&mut self) -> Option<&RoundNarrative> {
        let round = self.rounds.get(self.cursor)?;
        self.cursor += 1;
        if self.cursor >= self.rounds.len() {
            self.finished = true;
        }
        Some(round)
    }

    /// Rewind to the first round without regenerating anything.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.finished = false;
    }

    /// Mark the battle finished, e.g. when the viewer skips to the result.
    pub fn end(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn rounds(&self) -> &[RoundNarrative] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn outcome(&self) -> &BattleOutcome {
        &self.outcome
    }

    pub fn winner(&self) -> Side {
        self.outcome.winner
    }

    pub fn names(&self) -> [&str; 2] {
        [self.names[0].as_str(), self.names[1].as_str()]
    }

    pub fn winner_name(&self) -> &str {
        &self.names[self.outcome.winner.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(seed: &str) -> BattleOutcome {
        BattleOutcome::new("7", "13", Side::Home, seed)
    }

    fn loadouts() -> [KartLoadout; 2] {
        [
            KartLoadout::new("Zippy").with_weapon("laser").with_shield("kevlar"),
            KartLoadout::new("Dent").with_weapon("axe").with_weapon("WeaponEmpty"),
        ]
    }

    fn engine() -> BattleEngine {
        BattleEngine::builder().build().unwrap()
    }

    #[test]
    fn empty_seed_is_rejected() {
        let err = engine().load(&outcome(""), &loadouts()).unwrap_err();
        assert!(matches!(err, BattleError::InvalidOutcome(_)));
    }

    #[test]
    fn whitespace_seed_is_still_a_seed() {
        let session = engine().load(&outcome("  "), &loadouts()).unwrap();
        assert!(!session.is_empty());
    }

    #[test]
    fn rules_that_cannot_finish_are_rejected() {
        let pool = TemplatePool::builtin().unwrap();
        let never_hits = BattleRules {
            shield_chance: 0,
            ..BattleRules::default()
        };
        let no_damage = BattleRules {
            score_range: (0, 0),
            ..BattleRules::default()
        };
        for rules in [never_hits, no_damage] {
            let err = BattleSession::load(&outcome("1"), &loadouts(), &pool, &rules).unwrap_err();
            assert!(matches!(err, BattleError::Rules(RulesError::Invalid(_))));
        }
    }

    #[test]
    fn cursor_walks_and_finishes() {
        let mut session = engine().load(&outcome("4242"), &loadouts()).unwrap();
        let total = session.len();
        assert!(total > 0);

        let mut seen = 0;
        while !session.is_finished() {
            assert!(session.next().is_some());
            seen += 1;
        }
        assert_eq!(seen, total);
        assert!(session.next().is_none());
        assert_eq!(session.cursor(), total);
    }

    #[test]
    fn reset_replays_the_same_rounds() {
        let mut session = engine().load(&outcome("replay"), &loadouts()).unwrap();
        let first: Vec<RoundNarrative> = std::iter::from_fn(|| session.next().cloned()).collect();
        session.reset();
        assert!(!session.is_finished());
        let second: Vec<RoundNarrative> = std::iter::from_fn(|| session.next().cloned()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn end_marks_finished_without_moving_cursor() {
        let mut session = engine().load(&outcome("skip"), &loadouts()).unwrap();
        session.next();
        session.end();
        assert!(session.is_finished());
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn empty_marked_weapons_never_appear() {
        for seed in 0..50 {
            let session = engine().load(&outcome(&seed.to_string()), &loadouts()).unwrap();
            assert!(session
                .rounds()
                .iter()
                .all(|r| r.round.weapon.as_str() != "WeaponEmpty"));
        }
    }

    #[test]
    fn names_come_from_configs() {
        let configs = [
            KartConfig {
                left: Some("WeaponRocket".to_string()),
                right: Some("ShieldKitten".to_string()),
                front: None,
            },
            KartConfig::default(),
        ];
        let session = engine()
            .load_from_configs(
                &outcome("titles"),
                ["A NEAR Kart Called Zippy", "A NEAR Kart Called Dent"],
                &configs,
            )
            .unwrap();
        assert_eq!(session.names(), ["Zippy", "Dent"]);
        assert_eq!(session.winner_name(), "Zippy");
    }

    #[test]
    fn builder_rejects_pool_without_fallbacks() {
        let pool = TemplatePool::parse_ron(r#"(attack: { "laser": ["{aggressor} zaps"] })"#).unwrap();
        let err = BattleEngine::builder().with_templates(pool).build().unwrap_err();
        assert!(matches!(
            err,
            BattleError::Template(TemplateError::EmptyTemplateCategory { .. })
        ));
    }
}
