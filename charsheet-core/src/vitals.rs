//! Proficiency bonus, hit points, saving throws and skills.

use crate::build_state::ResolvedClass;
use crate::edition::EditionRuleSet;
use crate::world::{Ability, Background, Skill};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Proficiency bonus at a total character level.
pub fn proficiency_bonus(total_level: i32, rules: &EditionRuleSet) -> i32 {
    rules.proficiency_bonus(total_level)
}

/// Maximum hit points.
///
/// The character's very first level (first level of the first class) takes
/// the full hit die; every later level takes the fixed average `die / 2 + 1`.
/// The Constitution modifier applies to every level, and no level adds less
/// than 1. The total saturates at `i32::MAX`.
pub fn max_hit_points(classes: &[ResolvedClass], constitution_modifier: i32) -> i32 {
    let mut total: i32 = 0;
    for (index, class) in classes.iter().enumerate() {
        let die = i32::from(class.hit_die);
        let average = die / 2 + 1;
        for level in 1..=class.level {
            let roll = if index == 0 && level == 1 { die } else { average };
            total = total.saturating_add(roll.saturating_add(constitution_modifier).max(1));
        }
    }
    total
}

/// Saving throws from the first class only. Unknown classes grant none.
pub fn saving_throw_proficiencies(
    classes: &[ResolvedClass],
    rules: &EditionRuleSet,
) -> Vec<Ability> {
    classes
        .first()
        .and_then(|class| class.class)
        .and_then(|class| rules.class_rule(class))
        .map(|rule| rule.saving_throw_proficiencies.to_vec())
        .unwrap_or_default()
}

/// Selected class skills followed by background skills, each skill once.
pub fn skill_proficiencies(selected: &[Skill], background: Option<Background>) -> Vec<Skill> {
    let granted = background.map(|background| background.skill_proficiencies());
    let mut skills: Vec<Skill> = Vec::with_capacity(selected.len() + 2);
    for skill in selected.iter().chain(granted.iter().flatten()) {
        if !skills.contains(skill) {
            skills.push(*skill);
        }
    }
    skills
}

/// Expertise picks that are also proficient, each once, in pick order.
pub fn expertise_skills(expertise: &[Skill], proficient: &[Skill]) -> Vec<Skill> {
    let mut skills = Vec::new();
    for skill in expertise {
        if proficient.contains(skill) && !skills.contains(skill) {
            skills.push(*skill);
        }
    }
    skills
}

/// Hit dice available to spend, grouped by die size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitDicePool {
    pub die: u8,
    pub count: u32,
}

/// Largest die first.
pub fn hit_dice_pool(classes: &[ResolvedClass]) -> Vec<HitDicePool> {
    let mut by_die: BTreeMap<u8, u32> = BTreeMap::new();
    for class in classes {
        *by_die.entry(class.hit_die).or_default() += u32::from(class.level);
    }
    by_die
        .into_iter()
        .rev()
        .map(|(die, count)| HitDicePool { die, count })
        .collect()
}
