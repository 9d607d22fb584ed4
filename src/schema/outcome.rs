use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two karts in a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// Both sides, in index order.
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    /// Position of this side in two-element arrays (`0` = home, `1` = away).
    pub fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Away => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    pub fn from_index(index: u8) -> Option<Side> {
        match index {
            0 => Some(Self::Home),
            1 => Some(Self::Away),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Side::from_index(value).ok_or_else(|| format!("side must be 0 or 1, got {}", value))
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> u8 {
        side.index() as u8
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::Away => f.write_str("away"),
        }
    }
}

/// A settled battle result, supplied by whatever authority decided it.
///
/// The engine never decides the winner; it only narrates this record.
/// `seed` is the sole source of randomness for the narration and must be
/// identical for every viewer of the same battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub home_id: String,
    pub away_id: String,
    pub winner: Side,
    pub seed: String,
    #[serde(default)]
    pub prize: Option<String>,
    #[serde(default)]
    pub extra: Option<String>,
}

impl BattleOutcome {
    pub fn new(
        home_id: impl Into<String>,
        away_id: impl Into<String>,
        winner: Side,
        seed: impl Into<String>,
    ) -> Self {
        Self {
            home_id: home_id.into(),
            away_id: away_id.into(),
            winner,
            seed: seed.into(),
            prize: None,
            extra: None,
        }
    }

    pub fn loser(&self) -> Side {
        self.winner.opponent()
    }

    /// Parse an outcome from RON. `prize` and `extra` may be written as bare
    /// strings.
    pub fn parse_ron(input: &str) -> Result<BattleOutcome, ron::error::SpannedError> {
        ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .from_str(input)
    }
}
