//! Battle rules: the tunable constants of round allocation and rendering.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::loadout::SlotConventions;

/// Constants governing how a decided battle is spread over rounds.
///
/// The defaults reproduce the live game. The gap between
/// `winner_threshold` and `loser_threshold`, together with dropping the
/// loser's last round, is what keeps the loser from ever landing a
/// finishing blow; change them together or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    /// An attack misses when `int(0, shield_chance)` rolls 0.
    pub shield_chance: u32,
    /// Bump odds by weapon-pool size: the attack is narrated as `general`
    /// when `int(0, table[len])` rolls 0. Pool sizes past the table never bump.
    pub bump_chance_by_weapon_count: Vec<u32>,
    /// Inclusive damage range of a landed hit.
    pub score_range: (u32, u32),
    pub winner_threshold: u32,
    pub loser_threshold: u32,
    /// Hits at or above this score get a color commentary line.
    pub color_commentary_threshold: u32,
    /// Power each kart starts with, for remaining-power displays.
    pub starting_power: u32,
    pub slots: SlotConventions,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            shield_chance: 5,
            bump_chance_by_weapon_count: vec![2, 4, 8],
            score_range: (10, 30),
            winner_threshold: 100,
            loser_threshold: 90,
            color_commentary_threshold: 26,
            starting_power: 100,
            slots: SlotConventions::default(),
        }
    }
}

impl BattleRules {
    /// Load rules from a RON file. Missing fields take their defaults.
    pub fn load_from_ron(path: &Path) -> Result<BattleRules, RulesError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<BattleRules, RulesError> {
        let rules: BattleRules = ron::from_str(input)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Reject rule sets under which allocation could not terminate or
    /// could let the loser finish the fight.
    pub fn validate(&self) -> Result<(), RulesError> {
        let (low, high) = self.score_range;
        if low == 0 || low > high {
            return Err(RulesError::Invalid(format!(
                "score_range must satisfy 0 < low <= high, got ({}, {})",
                low, high
            )));
        }
        if self.shield_chance == 0 {
            return Err(RulesError::Invalid(
                "shield_chance must be at least 1".to_string(),
            ));
        }
        if self.loser_threshold >= self.winner_threshold {
            return Err(RulesError::Invalid(format!(
                "loser_threshold ({}) must be below winner_threshold ({})",
                self.loser_threshold, self.winner_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("invalid battle rules: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let rules = BattleRules::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.winner_threshold, 100);
        assert_eq!(rules.loser_threshold, 90);
        assert_eq!(rules.bump_chance_by_weapon_count, vec![2, 4, 8]);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let rules = BattleRules::parse_ron("(color_commentary_threshold: 28)").unwrap();
        assert_eq!(rules.color_commentary_threshold, 28);
        assert_eq!(rules.score_range, (10, 30));
        assert_eq!(rules.slots.empty_suffix, "Empty");
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let err = BattleRules::parse_ron("(winner_threshold: 80, loser_threshold: 90)");
        assert!(matches!(err, Err(RulesError::Invalid(_))));
    }

    #[test]
    fn zero_damage_range_rejected() {
        let rules = BattleRules {
            score_range: (0, 0),
            ..BattleRules::default()
        };
        assert!(rules.validate().is_err());
    }
}
