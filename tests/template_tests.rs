//! Template content integration tests: the shipped battle text and fixtures.
use battle_narrative::core::template::{
    Placeholder, TemplateCategory, TemplatePool, REQUIRED_BUCKETS,
};
use std::path::Path;

#[test]
fn shipped_text_file_loads_and_validates() {
    let pool = TemplatePool::load_from_ron(Path::new("content/battle_text.ron")).unwrap();
    assert!(pool.validate().is_ok());
    assert!(!pool.is_empty());

    let expected_weapons = [
        "general",
        "laser",
        "rocket",
        "fist",
        "flamethrower",
        "aceed",
        "flipper",
        "sword",
        "axe",
        "hammer",
    ];
    for weapon in &expected_weapons {
        assert!(
            pool.bucket(TemplateCategory::Attack, weapon).is_some(),
            "Missing attack bucket: {}",
            weapon
        );
        assert!(
            pool.bucket(TemplateCategory::Hit, weapon).is_some(),
            "Missing hit bucket: {}",
            weapon
        );
    }

    for shield in ["evade", "kitten", "kevlar"] {
        assert!(
            pool.bucket(TemplateCategory::Shield, shield).is_some(),
            "Missing shield bucket: {}",
            shield
        );
    }
}

#[test]
fn every_hittyped_line_has_hit_types() {
    let pool = TemplatePool::builtin().unwrap();
    for tag in pool.tags(TemplateCategory::Hit) {
        let uses_hit_type = pool
            .bucket(TemplateCategory::Hit, tag)
            .unwrap()
            .iter()
            .any(|t| t.uses(Placeholder::HitTyped));
        if uses_hit_type {
            assert!(
                pool.bucket(TemplateCategory::HitType, tag).is_some(),
                "hit.{} uses {{hittyped}} but has no hittype bucket",
                tag
            );
        }
    }
}

#[test]
fn attack_tags_have_matching_hit_tags() {
    let pool = TemplatePool::builtin().unwrap();
    assert_eq!(
        pool.tags(TemplateCategory::Attack),
        pool.tags(TemplateCategory::Hit)
    );
}

#[test]
fn battle_lines_never_name_the_winner() {
    let pool = TemplatePool::builtin().unwrap();
    for category in TemplateCategory::ALL {
        for tag in pool.tags(category) {
            for template in pool.bucket(category, tag).unwrap() {
                assert!(!template.uses(Placeholder::Winner), "{}.{}", category, tag);
            }
        }
    }
    assert!(pool.battle_won().uses(Placeholder::Winner));
}

#[test]
fn fallback_fixture_contains_exactly_the_required_buckets() {
    let pool = TemplatePool::load_from_ron(Path::new("tests/fixtures/fallback_only.ron")).unwrap();
    assert!(pool.validate().is_ok());
    for (category, tag) in REQUIRED_BUCKETS {
        assert_eq!(pool.tags(category), vec![tag]);
    }
    assert!(pool.tags(TemplateCategory::HitType).is_empty());
}

#[test]
fn flat_table_matches_structured_file() {
    let flat = TemplatePool::from_flat_entries([
        ("text_battle_attack_general_1", "{aggressor} tries to ram {victim}"),
        ("text_battle_hit_general_1", "{victim} suffers damage"),
        ("text_battle_shield_evade_1", "{victim} dodges"),
        ("text_battle_color_general_1", "Bosh"),
        ("text_battle_battle_won", "{winner} wins the battle!!"),
        ("text_you_lost", "Defeated"),
    ])
    .unwrap();
    assert!(flat.validate().is_ok());
    assert_eq!(flat.len(), 4);
}
