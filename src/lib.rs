//! Battle Narrative Engine: deterministic narration of decided kart battles.
//!
//! Given a battle whose winner is already settled, reconstructs a plausible
//! round-by-round fight (scores, weapon and shield choices, narrated text)
//! that is consistent with the outcome and reproducible from the battle seed
//! alone, so every viewer of the same battle sees the same fight.

pub mod core;
pub mod schema;

pub use crate::core::session::{BattleEngine, BattleError, BattleSession};
pub use crate::core::template::{TemplateError, TemplatePool};
pub use crate::schema::loadout::{KartConfig, KartLoadout, ShieldTag, WeaponTag};
pub use crate::schema::outcome::{BattleOutcome, Side};
pub use crate::schema::round::{Round, RoundNarrative};
