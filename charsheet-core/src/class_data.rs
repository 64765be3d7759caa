//! D&D 5e class data for each supported edition.
//!
//! Hit dice, spellcasting, saving throw proficiencies, skill menus and
//! progression milestones for the twelve SRD classes.

use crate::caster::CasterTier;
use crate::edition::{ClassRule, Edition, PreparedSpellFormula, SkillChoices};
use crate::world::{Ability, CharacterClass, Skill};

const STANDARD_ASI_2014: &[u8] = &[4, 8, 12, 16, 19];
const FIGHTER_ASI_2014: &[u8] = &[4, 6, 8, 12, 14, 16, 19];
const ROGUE_ASI_2014: &[u8] = &[4, 8, 10, 12, 16, 19];

// Level 19 is the Epic Boon in 2024.
const STANDARD_ASI_2024: &[u8] = &[4, 8, 12, 16];
const FIGHTER_ASI_2024: &[u8] = &[4, 6, 8, 12, 14, 16];
const ROGUE_ASI_2024: &[u8] = &[4, 8, 10, 12, 16];

const BARD_CANTRIPS: &[(u8, u8)] = &[(1, 2), (4, 3), (10, 4)];
const CLERIC_CANTRIPS: &[(u8, u8)] = &[(1, 3), (4, 4), (10, 5)];
const DRUID_CANTRIPS: &[(u8, u8)] = &[(1, 2), (4, 3), (10, 4)];
const SORCERER_CANTRIPS: &[(u8, u8)] = &[(1, 4), (4, 5), (10, 6)];
const WARLOCK_CANTRIPS: &[(u8, u8)] = &[(1, 2), (4, 3), (10, 4)];
const WIZARD_CANTRIPS: &[(u8, u8)] = &[(1, 3), (4, 4), (10, 5)];
const NO_CANTRIPS: &[(u8, u8)] = &[];

const ALL_SKILLS: &[Skill] = &[
    Skill::Acrobatics, Skill::AnimalHandling, Skill::Arcana, Skill::Athletics,
    Skill::Deception, Skill::History, Skill::Insight, Skill::Intimidation,
    Skill::Investigation, Skill::Medicine, Skill::Nature, Skill::Perception,
    Skill::Performance, Skill::Persuasion, Skill::Religion, Skill::SleightOfHand,
    Skill::Stealth, Skill::Survival,
];

impl CharacterClass {
    /// Static rules for this class in `edition`.
    pub fn rule(&self, edition: Edition) -> ClassRule {
        let legacy = edition == Edition::Srd2014;
        let standard_asi = if legacy { STANDARD_ASI_2014 } else { STANDARD_ASI_2024 };

        // Every 2024 caster prepares modifier + proficiency bonus spells.
        let prepared = |legacy_formula: Option<PreparedSpellFormula>| {
            if legacy {
                legacy_formula
            } else {
                Some(PreparedSpellFormula::ModifierPlusProficiency)
            }
        };

        match self {
            CharacterClass::Barbarian => ClassRule {
                class: *self,
                hit_die: 12,
                spellcasting_tier: CasterTier::None,
                spellcasting_ability: None,
                prepared_spell_formula: None,
                cantrips_by_level: NO_CANTRIPS,
                saving_throw_proficiencies: [Ability::Strength, Ability::Constitution],
                skill_choices: SkillChoices {
                    count: 2,
                    options: &[
                        Skill::AnimalHandling,
                        Skill::Athletics,
                        Skill::Intimidation,
                        Skill::Nature,
                        Skill::Perception,
                        Skill::Survival,
                    ],
                },
                subclass_level: 3,
                ability_score_improvement_levels: standard_asi,
            },
            CharacterClass::Bard => ClassRule {
                class: *self,
                hit_die: 8,
                spellcasting_tier: CasterTier::Full,
                spellcasting_ability: Some(Ability::Charisma),
                prepared_spell_formula: prepared(None),
                cantrips_by_level: BARD_CANTRIPS,
                saving_throw_proficiencies: [Ability::Dexterity, Ability::Charisma],
                skill_choices: SkillChoices {
                    count: 3,
                    options: ALL_SKILLS,
                },
                subclass_level: 3,
                ability_score_improvement_levels: standard_asi,
            },
            CharacterClass::Cleric => ClassRule {
                class: *self,
                hit_die: 8,
                spellcasting_tier: CasterTier::Full,
                spellcasting_ability: Some(Ability::Wisdom),
                prepared_spell_formula: prepared(Some(PreparedSpellFormula::ModifierPlusLevel)),
                cantrips_by_level: CLERIC_CANTRIPS,
                saving_throw_proficiencies: [Ability::Wisdom, Ability::Charisma],
                skill_choices: SkillChoices {
                    count: 2,
                    options: &[
                        Skill::History,
                        Skill::Insight,
                        Skill::Medicine,
                        Skill::Persuasion,
                        Skill::Religion,
                    ],
                },
                subclass_level: if legacy { 1 } else { 3 },
                ability_score_improvement_levels: standard_asi,
            },
            CharacterClass::Druid => ClassRule {
                class: *self,
                hit_die: 8,
                spellcasting_tier: CasterTier::Full,
                spellcasting_ability: Some(Ability::Wisdom),
                prepared_spell_formula: prepared(Some(PreparedSpellFormula::ModifierPlusLevel)),
                cantrips_by_level: DRUID_CANTRIPS,
                saving_throw_proficiencies: [Ability::Intelligence, Ability::Wisdom],
                skill_choices: SkillChoices {
                    count: 2,
                    options: &[
                        Skill::Arcana,
                        Skill::AnimalHandling,
                        Skill::Insight,
                        Skill::Medicine,
                        Skill::Nature,
                        Skill::Perception,
                        Skill::Religion,
                        Skill::Survival,
                    ],
                },
                subclass_level: if legacy { 2 } else { 3 },
                ability_score_improvement_levels: standard_asi,
            },
            CharacterClass::Fighter => ClassRule {
                class: *self,
                hit_die: 10,
                spellcasting_tier: CasterTier::None,
                spellcasting_ability: None,
                prepared_spell_formula: None,
                cantrips_by_level: NO_CANTRIPS,
                saving_throw_proficiencies: [Ability::Strength, Ability::Constitution],
                skill_choices: SkillChoices {
                    count: 2,
                    options: if legacy {
                        &[
                            Skill::Acrobatics,
                            Skill::AnimalHandling,
                            Skill::Athletics,
                            Skill::History,
                            Skill::Insight,
                            Skill::Intimidation,
                            Skill::Perception,
                            Skill::Survival,
                        ]
                    } else {
                        &[
                            Skill::Acrobatics,
                            Skill::AnimalHandling,
                            Skill::Athletics,
                            Skill::History,
                            Skill::Insight,
                            Skill::Intimidation,
                            Skill::Persuasion,
                            Skill::Perception,
                            Skill::Survival,
                        ]
                    },
                },
                subclass_level: 3,
                ability_score_improvement_levels: if legacy {
                    FIGHTER_ASI_2014
                } else {
                    FIGHTER_ASI_2024
                },
            },
            CharacterClass::Monk => ClassRule {
                class: *self,
                hit_die: 8,
                spellcasting_tier: CasterTier::None,
                spellcasting_ability: None,
                prepared_spell_formula: None,
                cantrips_by_level: NO_CANTRIPS,
                saving_throw_proficiencies: [Ability::Strength, Ability::Dexterity],
                skill_choices: SkillChoices {
                    count: 2,
                    options: &[
                        Skill::Acrobatics,
                        Skill::Athletics,
                        Skill::History,
                        Skill::Insight,
                        Skill::Religion,
                        Skill::Stealth,
                    ],
                },
                subclass_level: 3,
                ability_score_improvement_levels: standard_asi,
            },
            CharacterClass::Paladin => ClassRule {
                class: *self,
                hit_die: 10,
                spellcasting_tier: CasterTier::Half,
                spellcasting_ability: Some(Ability::Charisma),
                prepared_spell_formula: prepared(Some(PreparedSpellFormula::ModifierPlusHalfLevel)),
                cantrips_by_level: NO_CANTRIPS,
                saving_throw_proficiencies: [Ability::Wisdom, Ability::Charisma],
                skill_choices: SkillChoices {
                    count: 2,
                    options: &[
                        Skill::Athletics,
                        Skill::Insight,
                        Skill::Intimidation,
                        Skill::Medicine,
                        Skill::Persuasion,
                        Skill::Religion,
                    ],
                },
                subclass_level: 3,
                ability_score_improvement_levels: standard_asi,
            },
            CharacterClass::Ranger => ClassRule {
                class: *self,
                hit_die: 10,
                spellcasting_tier: CasterTier::Half,
                spellcasting_ability: Some(Ability::Wisdom),
                prepared_spell_formula: prepared(None),
                cantrips_by_level: NO_CANTRIPS,
                saving_throw_proficiencies: [Ability::Strength, Ability::Dexterity],
                skill_choices: SkillChoices {
                    count: 3,
                    options: &[
                        Skill::AnimalHandling,
                        Skill::Athletics,
                        Skill::Insight,
                        Skill::Investigation,
                        Skill::Nature,
                        Skill::Perception,
                        Skill::Stealth,
                        Skill::Survival,
                    ],
                },
                subclass_level: 3,
                ability_score_improvement_levels: standard_asi,
            },
            CharacterClass::Rogue => ClassRule {
                class: *self,
                hit_die: 8,
                spellcasting_tier: CasterTier::None,
                spellcasting_ability: None,
                prepared_spell_formula: None,
                cantrips_by_level: NO_CANTRIPS,
                saving_throw_proficiencies: [Ability::Dexterity, Ability::Intelligence],
                skill_choices: SkillChoices {
                    count: 4,
                    options: &[
                        Skill::Acrobatics,
                        Skill::Athletics,
                        Skill::Deception,
                        Skill::Insight,
                        Skill::Intimidation,
                        Skill::Investigation,
                        Skill::Perception,
                        Skill::Performance,
                        Skill::Persuasion,
                        Skill::SleightOfHand,
                        Skill::Stealth,
                    ],
                },
                subclass_level: 3,
                ability_score_improvement_levels: if legacy {
                    ROGUE_ASI_2014
                } else {
                    ROGUE_ASI_2024
                },
            },
            CharacterClass::Sorcerer => ClassRule {
                class: *self,
                hit_die: 6,
                spellcasting_tier: CasterTier::Full,
                spellcasting_ability: Some(Ability::Charisma),
                prepared_spell_formula: prepared(None),
                cantrips_by_level: SORCERER_CANTRIPS,
                saving_throw_proficiencies: [Ability::Constitution, Ability::Charisma],
                skill_choices: SkillChoices {
                    count: 2,
                    options: &[
                        Skill::Arcana,
                        Skill::Deception,
                        Skill::Insight,
                        Skill::Intimidation,
                        Skill::Persuasion,
                        Skill::Religion,
                    ],
                },
                subclass_level: if legacy { 1 } else { 3 },
                ability_score_improvement_levels: standard_asi,
            },
            CharacterClass::Warlock => ClassRule {
                class: *self,
                hit_die: 8,
                spellcasting_tier: CasterTier::Pact,
                spellcasting_ability: Some(Ability::Charisma),
                prepared_spell_formula: prepared(None),
                cantrips_by_level: WARLOCK_CANTRIPS,
                saving_throw_proficiencies: [Ability::Wisdom, Ability::Charisma],
                skill_choices: SkillChoices {
                    count: 2,
                    options: &[
                        Skill::Arcana,
                        Skill::Deception,
                        Skill::History,
                        Skill::Intimidation,
                        Skill::Investigation,
                        Skill::Nature,
                        Skill::Religion,
                    ],
                },
                subclass_level: if legacy { 1 } else { 3 },
                ability_score_improvement_levels: standard_asi,
            },
            CharacterClass::Wizard => ClassRule {
                class: *self,
                hit_die: 6,
                spellcasting_tier: CasterTier::Full,
                spellcasting_ability: Some(Ability::Intelligence),
                prepared_spell_formula: prepared(Some(PreparedSpellFormula::ModifierPlusLevel)),
                cantrips_by_level: WIZARD_CANTRIPS,
                saving_throw_proficiencies: [Ability::Intelligence, Ability::Wisdom],
                skill_choices: SkillChoices {
                    count: 2,
                    options: if legacy {
                        &[
                            Skill::Arcana,
                            Skill::History,
                            Skill::Insight,
                            Skill::Investigation,
                            Skill::Medicine,
                            Skill::Religion,
                        ]
                    } else {
                        &[
                            Skill::Arcana,
                            Skill::History,
                            Skill::Insight,
                            Skill::Investigation,
                            Skill::Medicine,
                            Skill::Nature,
                            Skill::Religion,
                        ]
                    },
                },
                subclass_level: if legacy { 2 } else { 3 },
                ability_score_improvement_levels: standard_asi,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_classes_have_data() {
        for edition in Edition::all() {
            for class in CharacterClass::all() {
                let rule = class.rule(*edition);
                assert!(matches!(rule.hit_die, 6 | 8 | 10 | 12));
                assert!(rule.skill_choices.count > 0);
                assert!(rule.skill_choices.options.len() >= rule.skill_choices.count);
                assert!(!rule.ability_score_improvement_levels.is_empty());
            }
        }
    }

    #[test]
    fn test_casters_declare_an_ability() {
        for class in CharacterClass::all() {
            let rule = class.rule(Edition::Srd2014);
            assert_eq!(
                rule.spellcasting_ability.is_some(),
                rule.spellcasting_tier != CasterTier::None,
                "{class}"
            );
        }
    }

    #[test]
    fn test_fighter_data() {
        let rule = CharacterClass::Fighter.rule(Edition::Srd2014);
        assert_eq!(rule.saving_throw_proficiencies, [Ability::Strength, Ability::Constitution]);
        assert_eq!(rule.skill_choices.count, 2);
        assert_eq!(rule.hit_die, 10);
        assert_eq!(rule.ability_score_improvements(20), 7);
        let revised = CharacterClass::Fighter.rule(Edition::Srd2024);
        assert_eq!(revised.ability_score_improvements(20), 6);
    }

    #[test]
    fn test_wizard_prepared_formula_by_edition() {
        assert_eq!(
            CharacterClass::Wizard.rule(Edition::Srd2014).prepared_spell_formula,
            Some(PreparedSpellFormula::ModifierPlusLevel)
        );
        assert_eq!(
            CharacterClass::Wizard.rule(Edition::Srd2024).prepared_spell_formula,
            Some(PreparedSpellFormula::ModifierPlusProficiency)
        );
    }

    #[test]
    fn test_known_casters_do_not_prepare_in_2014() {
        for class in [
            CharacterClass::Bard,
            CharacterClass::Sorcerer,
            CharacterClass::Warlock,
            CharacterClass::Ranger,
        ] {
            assert_eq!(class.rule(Edition::Srd2014).prepared_spell_formula, None);
            assert!(class.rule(Edition::Srd2024).prepared_spell_formula.is_some());
        }
    }

    #[test]
    fn test_subclass_levels() {
        assert_eq!(CharacterClass::Cleric.rule(Edition::Srd2014).subclass_level, 1);
        assert_eq!(CharacterClass::Wizard.rule(Edition::Srd2014).subclass_level, 2);
        for class in CharacterClass::all() {
            assert_eq!(class.rule(Edition::Srd2024).subclass_level, 3);
        }
    }

    #[test]
    fn test_cantrip_table_is_exact_match() {
        let wizard = CharacterClass::Wizard.rule(Edition::Srd2014);
        assert_eq!(wizard.cantrips_at(1), 3);
        assert_eq!(wizard.cantrips_at(3), 0);
        assert_eq!(wizard.cantrips_at(4), 4);
        assert_eq!(wizard.cantrips_at(10), 5);
        assert_eq!(wizard.cantrips_at(11), 0);
    }

    #[test]
    fn test_rogue_gets_4_skills() {
        let rule = CharacterClass::Rogue.rule(Edition::Srd2024);
        assert_eq!(rule.skill_choices.count, 4);
    }
}
