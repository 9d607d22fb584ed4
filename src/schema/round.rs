use serde::{Deserialize, Serialize};

use super::loadout::{ShieldTag, WeaponTag};
use super::outcome::Side;

/// One exchange of the fight: `aggressor` attacks the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub aggressor: Side,
    /// Damage dealt this round; `0` means the attack was evaded or blocked.
    pub score: u32,
    pub weapon: WeaponTag,
    /// Set exactly when `score == 0`.
    pub shield: Option<ShieldTag>,
    /// Cumulative damage dealt by each side (indexed by `Side::index`),
    /// including this round, in final play order.
    pub running_totals: [u32; 2],
}

impl Round {
    pub fn victim(&self) -> Side {
        self.aggressor.opponent()
    }

    pub fn is_evaded(&self) -> bool {
        self.score == 0
    }

    /// The side that took damage this round, if any.
    pub fn hit_side(&self) -> Option<Side> {
        if self.score > 0 {
            Some(self.victim())
        } else {
            None
        }
    }

    /// Power left to each side after this round, indexed by `Side::index`.
    pub fn remaining_power(&self, starting_power: u32) -> [u32; 2] {
        let power = |side: Side| {
            starting_power.saturating_sub(self.running_totals[side.opponent().index()])
        };
        [power(Side::Home), power(Side::Away)]
    }
}

/// A round together with its rendered lines, in reveal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundNarrative {
    pub round: Round,
    pub lines: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(aggressor: Side, score: u32, totals: [u32; 2]) -> Round {
        Round {
            aggressor,
            score,
            weapon: WeaponTag::general(),
            shield: if score == 0 { Some(ShieldTag::evade()) } else { None },
            running_totals: totals,
        }
    }

    #[test]
    fn remaining_power_clamps_at_zero() {
        let r = round(Side::Home, 30, [115, 40]);
        assert_eq!(r.remaining_power(100), [60, 0]);
    }

    #[test]
    fn hit_side_is_victim_only_on_damage() {
        assert_eq!(round(Side::Away, 12, [0, 12]).hit_side(), Some(Side::Home));
        let miss = round(Side::Away, 0, [0, 0]);
        assert_eq!(miss.hit_side(), None);
        assert!(miss.is_evaded());
    }
}
