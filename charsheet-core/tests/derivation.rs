//! End-to-end derivation through the public API.
//!
//! Run with: `cargo test -p charsheet-core --test derivation`

use charsheet_core::{
    derive_stats, Ability, AbilityScores, Background, BuildState, CharacterClass, ClassInput,
    ClassLevel, Edition, LevelUpRecord, Skill,
};

fn build(edition: Edition, levels: &[(&str, i32)]) -> BuildState {
    BuildState {
        ability_scores: AbilityScores::new(12, 14, 13, 10, 16, 15),
        classes: ClassInput::Levels(
            levels
                .iter()
                .map(|(class_id, level)| ClassLevel::new(*class_id, *level))
                .collect(),
        ),
        edition,
        ..BuildState::default()
    }
}

// =============================================================================
// PROFICIENCY AND HIT POINTS
// =============================================================================

#[test]
fn proficiency_bonus_never_decreases_with_level() {
    for edition in Edition::all() {
        let mut previous = 0;
        for level in 1..=20 {
            let stats = derive_stats(&build(*edition, &[("Rogue", level)]));
            assert!(stats.proficiency_bonus >= previous, "{edition} level {level}");
            previous = stats.proficiency_bonus;
        }
        assert_eq!(previous, 6);
    }
}

#[test]
fn proficiency_uses_total_character_level() {
    let stats = derive_stats(&build(Edition::Srd2014, &[("Fighter", 3), ("Cleric", 2)]));
    assert_eq!(stats.total_level, 5);
    assert_eq!(stats.proficiency_bonus, 3);
}

#[test]
fn out_of_range_levels_are_clamped() {
    let stats = derive_stats(&build(Edition::Srd2014, &[("Wizard", 0)]));
    assert_eq!(stats.total_level, 1);
    assert_eq!(stats.spell_slots, vec![2, 0, 0, 0, 0, 0, 0, 0, 0]);

    let stats = derive_stats(&build(Edition::Srd2014, &[("Wizard", 99)]));
    assert_eq!(stats.total_level, 20);
    assert_eq!(stats.spell_slots, vec![4, 3, 3, 3, 3, 2, 2, 1, 1]);
}

#[test]
fn constitution_applies_to_every_level() {
    // Con 13 = +1. Barbarian d12: 12 + 3 * 7, plus 4.
    let stats = derive_stats(&build(Edition::Srd2024, &[("Barbarian", 4)]));
    assert_eq!(stats.max_hp, 37);
}

// =============================================================================
// SPELL SLOTS
// =============================================================================

#[test]
fn only_non_casters_have_no_slots_or_spellcasting() {
    for edition in Edition::all() {
        let stats = derive_stats(&build(*edition, &[("Barbarian", 8), ("Monk", 4), ("Rogue", 2)]));
        assert!(stats.spell_slots.is_empty());
        assert!(stats.pact_magic_slots.is_none());
        assert!(stats.spellcasting.is_none());
    }
}

#[test]
fn full_caster_level_five_matches_table() {
    for class_id in ["Bard", "Cleric", "Druid", "Sorcerer", "Wizard"] {
        let stats = derive_stats(&build(Edition::Srd2014, &[(class_id, 5)]));
        assert_eq!(stats.spell_slots, vec![4, 3, 2, 0, 0, 0, 0, 0, 0], "{class_id}");
    }
}

#[test]
fn half_casters_share_the_multiclass_table() {
    // Paladin 6 + Ranger 4 = 3 + 2 = caster level 5
    let stats = derive_stats(&build(Edition::Srd2014, &[("Paladin", 6), ("Ranger", 4)]));
    assert_eq!(stats.spell_slots, vec![4, 3, 2, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn pact_and_shared_pools_stay_separate() {
    let baseline = derive_stats(&build(Edition::Srd2014, &[("Warlock", 1), ("Sorcerer", 6)]));
    for warlock_level in 2..=14 {
        let levels = [("Warlock", warlock_level), ("Sorcerer", 6)];
        let stats = derive_stats(&build(Edition::Srd2014, &levels));
        assert_eq!(stats.spell_slots, baseline.spell_slots);
        assert!(stats.pact_magic_slots.is_some());
    }

    let baseline = derive_stats(&build(Edition::Srd2014, &[("Warlock", 5), ("Sorcerer", 1)]));
    for sorcerer_level in 2..=15 {
        let levels = [("Warlock", 5), ("Sorcerer", sorcerer_level)];
        let stats = derive_stats(&build(Edition::Srd2014, &levels));
        assert_eq!(stats.pact_magic_slots, baseline.pact_magic_slots);
    }
}

// =============================================================================
// SPELLCASTING
// =============================================================================

#[test]
fn prepared_count_is_at_least_one() {
    for edition in Edition::all() {
        for class in CharacterClass::all() {
            let Some(rule) = edition.rules().class_rule(*class) else {
                continue;
            };
            if rule.prepared_spell_formula.is_none() {
                continue;
            }
            let mut state = build(*edition, &[(class.name(), 1)]);
            state.ability_scores = AbilityScores::new(1, 1, 1, 1, 1, 1);
            let spellcasting = derive_stats(&state).spellcasting.expect("caster");
            assert_eq!(spellcasting.prepared_count, 1, "{edition} {class}");
        }
    }
}

#[test]
fn cantrips_between_breakpoints_report_zero() {
    let at = |level| {
        derive_stats(&build(Edition::Srd2014, &[("Druid", level)]))
            .spellcasting
            .expect("druid casts")
            .cantrips_known
    };
    assert_eq!(at(1), 2);
    assert_eq!(at(3), 0);
    assert_eq!(at(4), 3);
    assert_eq!(at(9), 0);
    assert_eq!(at(10), 4);
}

#[test]
fn edition_changes_prepared_formula() {
    // Wis 16 = +3
    let legacy = derive_stats(&build(Edition::Srd2014, &[("Cleric", 9)]));
    let revised = derive_stats(&build(Edition::Srd2024, &[("Cleric", 9)]));
    assert_eq!(legacy.spellcasting.map(|s| s.prepared_count), Some(12));
    assert_eq!(revised.spellcasting.map(|s| s.prepared_count), Some(7));
}

#[test]
fn first_declared_caster_sets_ability() {
    let levels = [("Rogue", 1), ("Druid", 2), ("Sorcerer", 2)];
    let stats = derive_stats(&build(Edition::Srd2014, &levels));
    let spellcasting = stats.spellcasting.expect("caster");
    assert_eq!(spellcasting.ability, Some(Ability::Wisdom));
    // 8 + 3 + 3
    assert_eq!(spellcasting.save_dc, Some(14));
    assert_eq!(stats.saving_throw_proficiencies, vec![Ability::Dexterity, Ability::Intelligence]);
}

// =============================================================================
// CLASS INPUT AND SKILLS
// =============================================================================

#[test]
fn progression_log_collapses_to_highest_level() {
    let state = BuildState {
        classes: ClassInput::Progression(
            (1..=3)
                .map(|level| LevelUpRecord {
                    class_id: "Wizard".to_string(),
                    level,
                })
                .collect(),
        ),
        ..BuildState::default()
    };
    assert_eq!(state.class_levels(), vec![ClassLevel::new("Wizard", 3)]);
    assert_eq!(derive_stats(&state).total_level, 3);
}

#[test]
fn shared_skill_appears_once() {
    let mut state = build(Edition::Srd2014, &[("Cleric", 1)]);
    state.background = Some(Background::Acolyte);
    state.selected_skills = vec![Skill::Insight, Skill::Medicine];
    let stats = derive_stats(&state);
    assert_eq!(stats.skill_proficiencies, vec![Skill::Insight, Skill::Medicine, Skill::Religion]);
}

#[test]
fn derived_json_is_stable() {
    let json = r#"{
        "abilityScores": {"strength": 10, "dexterity": 16, "constitution": 12,
                          "intelligence": 13, "wisdom": 10, "charisma": 14},
        "classes": {"kind": "levels", "entries": [
            {"classId": "Rogue", "level": 4},
            {"classId": "Warlock", "level": 3},
            {"classId": "Fighter", "level": 3, "spellcastingTier": "quarter"}
        ]},
        "background": "Criminal",
        "selectedSkills": ["Stealth", "Acrobatics"],
        "expertise": ["Stealth", "Deception"],
        "edition": "2014"
    }"#;
    let state: BuildState = serde_json::from_str(json).unwrap();

    let first = serde_json::to_string(&derive_stats(&state)).unwrap();
    let second = serde_json::to_string(&derive_stats(&state)).unwrap();
    assert_eq!(first, second);

    let stats = derive_stats(&state);
    // Fighter 3 as a third caster contributes 1.
    assert_eq!(stats.spell_slots, vec![2, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(stats.pact_magic_slots.map(|p| (p.slots, p.slot_level)), Some((2, 2)));
    // Criminal grants Deception, so it qualifies for expertise.
    assert_eq!(stats.expertise_skills, vec![Skill::Stealth, Skill::Deception]);
}
