//! Build state in, derived stats out.
//!
//! [`derive_stats`] is the single entry point the UI layer calls after every
//! edit. It normalizes the classes once, then runs each calculator over the
//! same resolved list. Nothing is cached between calls.

use crate::build_state::{resolve_classes, BuildState, ResolvedClass};
use crate::caster::CasterTier;
use crate::edition::{EditionRuleSet, PactMagicSlots};
use crate::spell_slots::{
    multiclass_spell_slots, pact_magic_slots, single_class_spell_slots, SpellSlotInfo,
};
use crate::spellcasting::{spellcasting_details, SpellcastingDetails};
use crate::vitals::{
    expertise_skills, hit_dice_pool, max_hit_points, proficiency_bonus, saving_throw_proficiencies,
    skill_proficiencies, HitDicePool,
};
use crate::world::{Ability, Skill};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Per-class view of a character's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassProgress {
    pub class_id: String,
    pub level: u8,
    pub hit_die: u8,
    pub caster_tier: CasterTier,
    pub subclass_unlocked: bool,
    pub ability_score_improvements: u8,
    /// This class's own slot table, ignoring multiclassing.
    pub spell_slots: Vec<SpellSlotInfo>,
}

impl ClassProgress {
    fn new(class: &ResolvedClass, rules: &EditionRuleSet) -> Self {
        let rule = class.class.and_then(|class| rules.class_rule(class));
        Self {
            class_id: class.class_id.clone(),
            level: class.level,
            hit_die: class.hit_die,
            caster_tier: class.caster_tier,
            subclass_unlocked: rule.is_some_and(|rule| rule.subclass_unlocked(class.level)),
            ability_score_improvements: rule
                .map_or(0, |rule| rule.ability_score_improvements(class.level)),
            spell_slots: single_class_spell_slots(class.caster_tier, i32::from(class.level), rules),
        }
    }
}

/// Everything computed from a [`BuildState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub total_level: u32,
    pub proficiency_bonus: i32,
    #[serde(rename = "maxHP")]
    pub max_hp: i32,
    pub ability_modifiers: BTreeMap<Ability, i32>,
    /// Shared pool; index 0 holds 1st-level slots.
    pub spell_slots: Vec<u8>,
    pub pact_magic_slots: Option<PactMagicSlots>,
    pub spellcasting: Option<SpellcastingDetails>,
    pub saving_throw_proficiencies: Vec<Ability>,
    pub skill_proficiencies: Vec<Skill>,
    pub expertise_skills: Vec<Skill>,
    pub hit_dice: Vec<HitDicePool>,
    pub class_progress: Vec<ClassProgress>,
}

/// Recompute every derived statistic from scratch.
pub fn derive_stats(state: &BuildState) -> DerivedStats {
    let rules = state.edition.rules();
    let classes = resolve_classes(&state.class_levels(), rules);

    let total_level: u32 = classes.iter().map(|class| u32::from(class.level)).sum();
    let proficiency = proficiency_bonus(i32::try_from(total_level).unwrap_or(i32::MAX), rules);

    let scores = &state.ability_scores;
    let ability_modifiers = Ability::all()
        .into_iter()
        .map(|ability| (ability, scores.modifier(ability)))
        .collect();

    let spellcasting = spellcasting_details(&classes, scores, proficiency, rules);
    let skills = skill_proficiencies(&state.selected_skills, state.background);
    let expertise = expertise_skills(&state.expertise, &skills);

    let stats = DerivedStats {
        total_level,
        proficiency_bonus: proficiency,
        max_hp: max_hit_points(&classes, scores.modifier(Ability::Constitution)),
        ability_modifiers,
        spell_slots: multiclass_spell_slots(&classes, rules),
        pact_magic_slots: pact_magic_slots(&classes, rules),
        spellcasting: spellcasting.is_spellcaster().then_some(spellcasting),
        saving_throw_proficiencies: saving_throw_proficiencies(&classes, rules),
        skill_proficiencies: skills,
        expertise_skills: expertise,
        hit_dice: hit_dice_pool(&classes),
        class_progress: classes
            .iter()
            .map(|class| ClassProgress::new(class, rules))
            .collect(),
    };

    trace!(
        edition = %state.edition,
        classes = classes.len(),
        total_level,
        max_hp = stats.max_hp,
        "derived character stats"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_state::{ClassInput, ClassLevel};
    use crate::edition::Edition;
    use crate::world::{AbilityScores, Background};

    fn state(levels: Vec<ClassLevel>) -> BuildState {
        BuildState {
            ability_scores: AbilityScores::new(10, 14, 14, 16, 12, 8),
            classes: ClassInput::Levels(levels),
            ..BuildState::default()
        }
    }

    #[test]
    fn test_empty_build() {
        let stats = derive_stats(&BuildState::default());
        assert_eq!(stats.total_level, 0);
        assert_eq!(stats.proficiency_bonus, 2);
        assert_eq!(stats.max_hp, 0);
        assert!(stats.spell_slots.is_empty());
        assert!(stats.spellcasting.is_none());
        assert!(stats.class_progress.is_empty());
    }

    #[test]
    fn test_non_caster_has_no_spellcasting() {
        let stats = derive_stats(&state(vec![
            ClassLevel::new("Fighter", 6),
            ClassLevel::new("Rogue", 3),
        ]));
        assert!(stats.spell_slots.is_empty());
        assert_eq!(stats.pact_magic_slots, None);
        assert_eq!(stats.spellcasting, None);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["spellSlots"], serde_json::json!([]));
        assert!(json["spellcasting"].is_null());
        assert!(json["pactMagicSlots"].is_null());
    }

    #[test]
    fn test_warlock_wizard_multiclass() {
        let stats = derive_stats(&state(vec![
            ClassLevel::new("Warlock", 3),
            ClassLevel::new("Wizard", 5),
        ]));
        assert_eq!(stats.total_level, 8);
        assert_eq!(stats.proficiency_bonus, 3);
        assert_eq!(stats.spell_slots, vec![4, 3, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(stats.pact_magic_slots, Some(PactMagicSlots { slots: 2, slot_level: 2 }));
        // Warlock is first, so Charisma drives the numbers.
        let spellcasting = stats.spellcasting.unwrap();
        assert_eq!(spellcasting.ability, Some(Ability::Charisma));
        assert_eq!(spellcasting.save_dc, Some(10));
        assert_eq!(stats.saving_throw_proficiencies, vec![Ability::Wisdom, Ability::Charisma]);
        assert_eq!(
            stats.hit_dice,
            vec![HitDicePool { die: 8, count: 3 }, HitDicePool { die: 6, count: 5 }]
        );
    }

    #[test]
    fn test_class_progress() {
        let mut build = state(vec![ClassLevel::new("Fighter", 6), ClassLevel::new("Wizard", 1)]);
        build.edition = Edition::Srd2014;
        let stats = derive_stats(&build);

        let fighter = &stats.class_progress[0];
        assert!(fighter.subclass_unlocked);
        assert_eq!(fighter.ability_score_improvements, 2);
        assert!(fighter.spell_slots.is_empty());

        let wizard = &stats.class_progress[1];
        assert!(!wizard.subclass_unlocked);
        assert_eq!(wizard.spell_slots.len(), 9);
        assert_eq!(wizard.spell_slots[0].maximum, 2);
    }

    #[test]
    fn test_skills_and_expertise() {
        let mut build = state(vec![ClassLevel::new("Rogue", 1)]);
        build.background = Some(Background::Acolyte);
        build.selected_skills = vec![Skill::Insight, Skill::Stealth];
        build.expertise = vec![Skill::Stealth, Skill::Arcana];
        let stats = derive_stats(&build);
        assert_eq!(
            stats.skill_proficiencies,
            vec![Skill::Insight, Skill::Stealth, Skill::Religion]
        );
        assert_eq!(stats.expertise_skills, vec![Skill::Stealth]);
    }

    #[test]
    fn test_output_uses_camel_case() {
        let stats = derive_stats(&state(vec![ClassLevel::new("Cleric", 1)]));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["maxHP"], 10);
        assert_eq!(json["proficiencyBonus"], 2);
        assert_eq!(json["spellcasting"]["saveDC"], 11);
        assert_eq!(json["spellcasting"]["preparedCount"], 2);
        assert_eq!(json["abilityModifiers"]["Intelligence"], 3);
    }

    #[test]
    fn test_extreme_scores_do_not_overflow() {
        let mut build = state(vec![ClassLevel::new("Fighter", 20)]);
        build.ability_scores = AbilityScores::new(10, 10, 2_000_000_000, 10, 10, 10);
        assert_eq!(derive_stats(&build).max_hp, i32::MAX);

        let mut build = state(vec![ClassLevel::new("Wizard", 1)]);
        build.ability_scores = AbilityScores::new(10, 10, i32::MIN, i32::MAX, 10, 10);
        let stats = derive_stats(&build);
        assert_eq!(stats.ability_modifiers[&Ability::Constitution], i32::MIN / 2);
        assert_eq!(stats.max_hp, 1);
        let spellcasting = stats.spellcasting.unwrap();
        assert_eq!(spellcasting.save_dc, Some(8 + 2 + (i32::MAX - 10) / 2));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let build = state(vec![
            ClassLevel::new("Paladin", 6),
            ClassLevel::new("Sorcerer", 3),
            ClassLevel::new("Warlock", 2),
        ]);
        let first = serde_json::to_string(&derive_stats(&build)).unwrap();
        let second = serde_json::to_string(&derive_stats(&build)).unwrap();
        assert_eq!(first, second);
    }
}
