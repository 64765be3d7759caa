//! Per-edition rule tables.
//!
//! Each supported edition has one immutable [`EditionRuleSet`], built on
//! first use and shared for the life of the process. Lookups never fail:
//! a class missing from a rule set is `None`, and callers fall back to
//! conservative defaults.

use crate::caster::CasterTier;
use crate::world::{Ability, CharacterClass, Skill};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Lowest and highest character/class level the tables cover.
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 20;

/// Number of spell levels (1st through 9th).
pub const SPELL_LEVELS: usize = 9;

/// Clamp any level-like input into the table domain `[1, 20]`.
pub fn clamp_level(level: i32) -> u8 {
    level.clamp(i32::from(MIN_LEVEL), i32::from(MAX_LEVEL)) as u8
}

/// Supported ruleset editions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Edition {
    /// The 2014 Player's Handbook / SRD 5.1.
    #[default]
    #[serde(rename = "2014")]
    Srd2014,
    /// The 2024 Player's Handbook / SRD 5.2.
    #[serde(rename = "2024")]
    Srd2024,
}

impl Edition {
    pub fn tag(&self) -> &'static str {
        match self {
            Edition::Srd2014 => "2014",
            Edition::Srd2024 => "2024",
        }
    }

    pub fn all() -> &'static [Edition] {
        &[Edition::Srd2014, Edition::Srd2024]
    }

    /// The immutable rule set for this edition.
    pub fn rules(self) -> &'static EditionRuleSet {
        match self {
            Edition::Srd2014 => &SRD_2014,
            Edition::Srd2024 => &SRD_2024,
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// How many spells a class may have prepared at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreparedSpellFormula {
    /// Ability modifier + class level.
    ModifierPlusLevel,
    /// Ability modifier + half the class level, rounded down.
    ModifierPlusHalfLevel,
    /// Ability modifier + proficiency bonus.
    ModifierPlusProficiency,
}

impl PreparedSpellFormula {
    /// Evaluate the formula. Never returns less than 1.
    pub fn prepared_count(
        &self,
        ability_modifier: i32,
        class_level: u8,
        proficiency_bonus: i32,
    ) -> u32 {
        let raw = match self {
            PreparedSpellFormula::ModifierPlusLevel => ability_modifier + i32::from(class_level),
            PreparedSpellFormula::ModifierPlusHalfLevel => {
                ability_modifier + i32::from(class_level) / 2
            }
            PreparedSpellFormula::ModifierPlusProficiency => ability_modifier + proficiency_bonus,
        };
        raw.max(1) as u32
    }
}

/// Skills a class lets the player pick from, and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillChoices {
    pub count: usize,
    pub options: &'static [Skill],
}

/// Static per-class rules for one edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRule {
    pub class: CharacterClass,
    pub hit_die: u8,
    pub spellcasting_tier: CasterTier,
    pub spellcasting_ability: Option<Ability>,
    pub prepared_spell_formula: Option<PreparedSpellFormula>,
    /// Sparse `(class level, cantrips known)` pairs.
    pub cantrips_by_level: &'static [(u8, u8)],
    pub saving_throw_proficiencies: [Ability; 2],
    pub skill_choices: SkillChoices,
    pub subclass_level: u8,
    pub ability_score_improvement_levels: &'static [u8],
}

impl ClassRule {
    /// Cantrips known at exactly `level`.
    ///
    /// The table is matched exactly: a level between two breakpoints yields 0
    /// rather than the previous breakpoint's count.
    pub fn cantrips_at(&self, level: u8) -> u8 {
        self.cantrips_by_level
            .iter()
            .find(|(at, _)| *at == level)
            .map_or(0, |(_, count)| *count)
    }

    pub fn subclass_unlocked(&self, level: u8) -> bool {
        level >= self.subclass_level
    }

    /// Ability score improvements earned by `level`.
    pub fn ability_score_improvements(&self, level: u8) -> u8 {
        self.ability_score_improvement_levels
            .iter()
            .filter(|at| **at <= level)
            .count() as u8
    }
}

/// Pact magic slots at one warlock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PactMagicSlots {
    pub slots: u8,
    pub slot_level: u8,
}

/// Every table the derivation engine needs for one edition.
#[derive(Debug, Clone)]
pub struct EditionRuleSet {
    pub edition: Edition,
    pub classes: HashMap<CharacterClass, ClassRule>,
    /// Row `n - 1` holds the bonus at character level `n`.
    pub proficiency_bonus_by_level: &'static [i32],
    /// Row `n - 1` holds the 1st..9th level slots at caster level `n`.
    pub multiclass_spell_slots_by_caster_level: &'static [[u8; SPELL_LEVELS]],
    /// Row `n - 1` holds the pact slots at pact-class level `n`.
    pub pact_magic_slots_by_level: &'static [PactMagicSlots],
}

impl EditionRuleSet {
    fn build(edition: Edition) -> Self {
        let classes = CharacterClass::all()
            .iter()
            .map(|class| (*class, class.rule(edition)))
            .collect();
        Self {
            edition,
            classes,
            proficiency_bonus_by_level: &PROFICIENCY_BONUS,
            multiclass_spell_slots_by_caster_level: &MULTICLASS_SPELL_SLOTS,
            pact_magic_slots_by_level: &PACT_MAGIC_SLOTS,
        }
    }

    pub fn class_rule(&self, class: CharacterClass) -> Option<&ClassRule> {
        self.classes.get(&class)
    }

    /// Rule for a free-form class id; `None` for anything not in the table.
    pub fn class_rule_by_id(&self, class_id: &str) -> Option<&ClassRule> {
        CharacterClass::from_name(class_id).and_then(|class| self.class_rule(class))
    }

    /// Proficiency bonus at a (clamped) character level.
    pub fn proficiency_bonus(&self, level: i32) -> i32 {
        let level = clamp_level(level);
        self.proficiency_bonus_by_level
            .get(usize::from(level) - 1)
            .copied()
            // ceil(1 + level / 4)
            .unwrap_or_else(|| 1 + (i32::from(level) + 3) / 4)
    }

    /// Shared spell-slot row at a (clamped) caster level.
    pub fn spell_slot_row(&self, caster_level: i32) -> [u8; SPELL_LEVELS] {
        let level = clamp_level(caster_level);
        self.multiclass_spell_slots_by_caster_level
            .get(usize::from(level) - 1)
            .copied()
            .unwrap_or([0; SPELL_LEVELS])
    }

    /// Pact magic slots at a (clamped) pact-class level.
    pub fn pact_slots(&self, level: i32) -> Option<PactMagicSlots> {
        let level = clamp_level(level);
        self.pact_magic_slots_by_level
            .get(usize::from(level) - 1)
            .copied()
    }
}

static SRD_2014: LazyLock<EditionRuleSet> =
    LazyLock::new(|| EditionRuleSet::build(Edition::Srd2014));
static SRD_2024: LazyLock<EditionRuleSet> =
    LazyLock::new(|| EditionRuleSet::build(Edition::Srd2024));

// ============================================================================
// Edition-wide tables (identical in both editions)
// ============================================================================

const PROFICIENCY_BONUS: [i32; 20] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6];

/// The multiclass spellcaster table; also the full-caster progression.
const MULTICLASS_SPELL_SLOTS: [[u8; SPELL_LEVELS]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0], // 1
    [3, 0, 0, 0, 0, 0, 0, 0, 0], // 2
    [4, 2, 0, 0, 0, 0, 0, 0, 0], // 3
    [4, 3, 0, 0, 0, 0, 0, 0, 0], // 4
    [4, 3, 2, 0, 0, 0, 0, 0, 0], // 5
    [4, 3, 3, 0, 0, 0, 0, 0, 0], // 6
    [4, 3, 3, 1, 0, 0, 0, 0, 0], // 7
    [4, 3, 3, 2, 0, 0, 0, 0, 0], // 8
    [4, 3, 3, 3, 1, 0, 0, 0, 0], // 9
    [4, 3, 3, 3, 2, 0, 0, 0, 0], // 10
    [4, 3, 3, 3, 2, 1, 0, 0, 0], // 11
    [4, 3, 3, 3, 2, 1, 0, 0, 0], // 12
    [4, 3, 3, 3, 2, 1, 1, 0, 0], // 13
    [4, 3, 3, 3, 2, 1, 1, 0, 0], // 14
    [4, 3, 3, 3, 2, 1, 1, 1, 0], // 15
    [4, 3, 3, 3, 2, 1, 1, 1, 0], // 16
    [4, 3, 3, 3, 2, 1, 1, 1, 1], // 17
    [4, 3, 3, 3, 3, 1, 1, 1, 1], // 18
    [4, 3, 3, 3, 3, 2, 1, 1, 1], // 19
    [4, 3, 3, 3, 3, 2, 2, 1, 1], // 20
];

const fn pact(slots: u8, slot_level: u8) -> PactMagicSlots {
    PactMagicSlots { slots, slot_level }
}

const PACT_MAGIC_SLOTS: [PactMagicSlots; 20] = [
    pact(1, 1), // 1
    pact(2, 1), // 2
    pact(2, 2), // 3
    pact(2, 2), // 4
    pact(2, 3), // 5
    pact(2, 3), // 6
    pact(2, 4), // 7
    pact(2, 4), // 8
    pact(2, 5), // 9
    pact(2, 5), // 10
    pact(3, 5), // 11
    pact(3, 5), // 12
    pact(3, 5), // 13
    pact(3, 5), // 14
    pact(3, 5), // 15
    pact(3, 5), // 16
    pact(4, 5), // 17
    pact(4, 5), // 18
    pact(4, 5), // 19
    pact(4, 5), // 20
];
