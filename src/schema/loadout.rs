use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag naming the generic attack bucket, used when no specific weapon applies.
pub const GENERAL_TAG: &str = "general";
/// Tag naming the generic defence bucket, used when the defender has no shield.
pub const EVADE_TAG: &str = "evade";

/// A weapon identifier as used for template lookup (`laser`, `rocket`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeaponTag(pub String);

impl WeaponTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn general() -> Self {
        Self(GENERAL_TAG.to_string())
    }

    pub fn is_general(&self) -> bool {
        self.0 == GENERAL_TAG
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeaponTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A shield identifier as used for template lookup (`kevlar`, `kitten`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShieldTag(pub String);

impl ShieldTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn evade() -> Self {
        Self(EVADE_TAG.to_string())
    }

    pub fn is_evade(&self) -> bool {
        self.0 == EVADE_TAG
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Naming conventions for raw equipment slot identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConventions {
    pub weapon_prefix: String,
    pub shield_prefix: String,
    /// Identifiers ending with this marker are unequipped slots.
    pub empty_suffix: String,
    /// Stripped from kart titles to form display names.
    pub title_prefix: String,
}

impl Default for SlotConventions {
    fn default() -> Self {
        Self {
            weapon_prefix: "Weapon".to_string(),
            shield_prefix: "Shield".to_string(),
            empty_suffix: "Empty".to_string(),
            title_prefix: "A NEAR Kart Called ".to_string(),
        }
    }
}

impl SlotConventions {
    pub fn is_empty_slot(&self, identifier: &str) -> bool {
        !self.empty_suffix.is_empty() && identifier.ends_with(&self.empty_suffix)
    }

    pub fn display_name(&self, title: &str) -> String {
        title.replacen(&self.title_prefix, "", 1)
    }
}

/// Raw equipment slots of a kart, as configured on chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KartConfig {
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
    #[serde(default)]
    pub front: Option<String>,
}

impl KartConfig {
    /// Slot identifiers in the fixed order `left`, `right`, `front`.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        [&self.left, &self.right, &self.front]
            .into_iter()
            .filter_map(|slot| slot.as_deref())
    }
}

/// The equipment one side brings to a battle, minus empty slots.
///
/// Both pools are ordered; order matters because weapon and shield draws
/// index into them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KartLoadout {
    pub display_name: String,
    #[serde(default)]
    pub weapons: Vec<WeaponTag>,
    #[serde(default)]
    pub shields: Vec<ShieldTag>,
}

impl KartLoadout {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            weapons: Vec::new(),
            shields: Vec::new(),
        }
    }

    pub fn with_weapon(mut self, tag: impl Into<String>) -> Self {
        self.weapons.push(WeaponTag::new(tag));
        self
    }

    pub fn with_shield(mut self, tag: impl Into<String>) -> Self {
        self.shields.push(ShieldTag::new(tag));
        self
    }

    /// Build a loadout from a kart's title and slot configuration.
    ///
    /// `WeaponLaser` becomes weapon `laser`, `ShieldKevlar` becomes shield
    /// `kevlar`; empty slots and identifiers with neither prefix are skipped.
    pub fn from_config(title: &str, config: &KartConfig, conventions: &SlotConventions) -> Self {
        let mut loadout = KartLoadout::new(conventions.display_name(title));

        for identifier in config.slots() {
            if conventions.is_empty_slot(identifier) {
                continue;
            }
            if let Some(weapon) = identifier.strip_prefix(&conventions.weapon_prefix) {
                loadout.weapons.push(WeaponTag::new(weapon.to_lowercase()));
            } else if let Some(shield) = identifier.strip_prefix(&conventions.shield_prefix) {
                loadout.shields.push(ShieldTag::new(shield.to_lowercase()));
            }
        }

        loadout
    }

    /// Copy of this loadout with any empty-marked tags removed.
    pub fn without_empty(&self, conventions: &SlotConventions) -> KartLoadout {
        KartLoadout {
            display_name: self.display_name.clone(),
            weapons: self
                .weapons
                .iter()
                .filter(|w| !conventions.is_empty_slot(w.as_str()))
                .cloned()
                .collect(),
            shields: self
                .shields
                .iter()
                .filter(|s| !conventions.is_empty_slot(s.as_str()))
                .cloned()
                .collect(),
        }
    }
}
