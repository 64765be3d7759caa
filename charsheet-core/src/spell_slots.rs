//! Spell slot aggregation.
//!
//! Full, half and third casters share one slot table indexed by an
//! effective caster level. Pact casters have their own table and never
//! feed the shared pool, so a character can hold both resources at once.

use crate::build_state::ResolvedClass;
use crate::caster::CasterTier;
use crate::edition::{clamp_level, EditionRuleSet, PactMagicSlots};
use serde::{Deserialize, Serialize};

/// One spell level's slots in a single-class view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellSlotInfo {
    /// Spell level, 1 through 9.
    pub level: u8,
    pub maximum: u8,
    /// No slots of this level yet.
    pub locked: bool,
}

/// Levels a class adds to the effective caster level.
pub fn caster_level_contribution(tier: CasterTier, level: i32) -> u32 {
    let level = u32::from(clamp_level(level));
    match tier {
        CasterTier::Full => level,
        CasterTier::Half => level / 2,
        CasterTier::Third => level / 3,
        CasterTier::Pact | CasterTier::None => 0,
    }
}

/// Sum of every class's contribution.
pub fn effective_caster_level(classes: &[ResolvedClass]) -> u32 {
    classes
        .iter()
        .map(|class| caster_level_contribution(class.caster_tier, i32::from(class.level)))
        .sum()
}

fn shared_row(caster_level: u32, rules: &EditionRuleSet) -> Option<[u8; 9]> {
    if caster_level == 0 {
        return None;
    }
    let caster_level = i32::try_from(caster_level).unwrap_or(i32::MAX);
    Some(rules.spell_slot_row(caster_level))
}

/// Slots for a single class, with a lock flag per spell level.
///
/// Pact and non-casters get an empty list, as does a half or third caster
/// too low in level to contribute. An effective caster level of 0 is not
/// rounded up to the first row, so a level 1 Paladin has no slots.
pub fn single_class_spell_slots(
    tier: CasterTier,
    level: i32,
    rules: &EditionRuleSet,
) -> Vec<SpellSlotInfo> {
    let Some(row) = shared_row(caster_level_contribution(tier, level), rules) else {
        return Vec::new();
    };
    row.iter()
        .zip(1u8..)
        .map(|(&maximum, level)| SpellSlotInfo {
            level,
            maximum,
            locked: maximum == 0,
        })
        .collect()
}

/// Shared-pool slots for the whole character, indexed from 1st level.
/// Empty when no class contributes.
pub fn multiclass_spell_slots(classes: &[ResolvedClass], rules: &EditionRuleSet) -> Vec<u8> {
    shared_row(effective_caster_level(classes), rules)
        .map(|row| row.to_vec())
        .unwrap_or_default()
}

/// The separate pact pool, keyed by the combined level of pact classes.
pub fn pact_magic_slots(
    classes: &[ResolvedClass],
    rules: &EditionRuleSet,
) -> Option<PactMagicSlots> {
    let pact_level: i32 = classes
        .iter()
        .filter(|class| class.caster_tier == CasterTier::Pact)
        .map(|class| i32::from(class.level))
        .sum();
    if pact_level == 0 {
        return None;
    }
    rules.pact_slots(pact_level)
}
