//! Spellcasting ability, save DC, attack bonus and spell counts.

use crate::build_state::ResolvedClass;
use crate::edition::{ClassRule, EditionRuleSet};
use crate::world::{Ability, AbilityScores};
use serde::{Deserialize, Serialize};

/// The character's spellcasting numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellcastingDetails {
    pub ability: Option<Ability>,
    #[serde(rename = "saveDC")]
    pub save_dc: Option<i32>,
    pub attack_bonus: Option<i32>,
    pub prepared_count: u32,
    pub cantrips_known: u32,
}

impl SpellcastingDetails {
    /// Not a spellcaster.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_spellcaster(&self) -> bool {
        self.ability.is_some()
    }
}

/// The first class, in declared order, whose rule names a spellcasting
/// ability. Later casting classes are ignored.
pub fn primary_spellcasting_class<'a>(
    classes: &'a [ResolvedClass],
    rules: &'a EditionRuleSet,
) -> Option<(&'a ResolvedClass, &'a ClassRule, Ability)> {
    classes.iter().find_map(|class| {
        let rule = rules.class_rule(class.class?)?;
        let ability = rule.spellcasting_ability?;
        Some((class, rule, ability))
    })
}

pub fn spellcasting_details(
    classes: &[ResolvedClass],
    scores: &AbilityScores,
    proficiency_bonus: i32,
    rules: &EditionRuleSet,
) -> SpellcastingDetails {
    let Some((class, rule, ability)) = primary_spellcasting_class(classes, rules) else {
        return SpellcastingDetails::none();
    };

    let modifier = scores.modifier(ability);
    let prepared_count = rule
        .prepared_spell_formula
        .map_or(0, |formula| formula.prepared_count(modifier, class.level, proficiency_bonus));

    SpellcastingDetails {
        ability: Some(ability),
        save_dc: Some(8 + proficiency_bonus + modifier),
        attack_bonus: Some(proficiency_bonus + modifier),
        prepared_count,
        cantrips_known: u32::from(rule.cantrips_at(class.level)),
    }
}
