//! Player-editable build state and class normalization.
//!
//! Classes arrive either as per-class totals or as a level-up log. Both
//! shapes are collapsed once, here, into one [`ClassLevel`] per class, and
//! then resolved against an edition's rule tables.

use crate::caster::{classify_caster, CasterRefinement, CasterTier};
use crate::edition::{clamp_level, Edition, EditionRuleSet};
use crate::world::{AbilityScores, Background, CharacterClass, Skill};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

/// Hit die used for classes the rule tables don't know.
pub const DEFAULT_HIT_DIE: u8 = 8;

/// Levels held in one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassLevel {
    pub class_id: String,
    pub level: i32,
    /// Overrides the tier from the rule tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spellcasting_tier: Option<CasterTier>,
    /// Overrides the hit die from the rule tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_die: Option<u8>,
}

impl ClassLevel {
    pub fn new(class_id: impl Into<String>, level: i32) -> Self {
        Self {
            class_id: class_id.into(),
            level,
            spellcasting_tier: None,
            hit_die: None,
        }
    }

    pub fn with_tier(mut self, tier: CasterTier) -> Self {
        self.spellcasting_tier = Some(tier);
        self
    }

    pub fn with_hit_die(mut self, hit_die: u8) -> Self {
        self.hit_die = Some(hit_die);
        self
    }

    fn same_class(&self, class_id: &str) -> bool {
        self.class_id.trim().eq_ignore_ascii_case(class_id.trim())
    }
}

/// One row of a level-up log: the character gained `level` in `class_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpRecord {
    pub class_id: String,
    pub level: i32,
}

/// The two shapes class data can arrive in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "camelCase")]
pub enum ClassInput {
    Levels(Vec<ClassLevel>),
    Progression(Vec<LevelUpRecord>),
}

impl Default for ClassInput {
    fn default() -> Self {
        ClassInput::Levels(Vec::new())
    }
}

impl ClassInput {
    /// One entry per class, in first-appearance order.
    ///
    /// Repeated classes keep the highest level recorded (not the sum), and
    /// the first override seen for tier or hit die. Levels are clamped to
    /// `[1, 20]`; entries with a blank class id are dropped.
    pub fn normalize(&self) -> Vec<ClassLevel> {
        let rows: Vec<ClassLevel> = match self {
            ClassInput::Levels(levels) => levels.clone(),
            ClassInput::Progression(records) => records
                .iter()
                .map(|record| ClassLevel::new(record.class_id.clone(), record.level))
                .collect(),
        };

        let mut merged: Vec<ClassLevel> = Vec::with_capacity(rows.len());
        for row in rows {
            let class_id = row.class_id.trim();
            if class_id.is_empty() {
                continue;
            }
            match merged.iter_mut().find(|existing| existing.same_class(class_id)) {
                Some(existing) => {
                    existing.level = existing.level.max(row.level);
                    existing.spellcasting_tier =
                        existing.spellcasting_tier.or(row.spellcasting_tier);
                    existing.hit_die = existing.hit_die.or(row.hit_die);
                }
                None => merged.push(ClassLevel {
                    class_id: class_id.to_string(),
                    ..row
                }),
            }
        }

        for entry in &mut merged {
            entry.level = i32::from(clamp_level(entry.level));
        }
        merged
    }
}

/// A normalized class with its rule-table data attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClass {
    pub class_id: String,
    /// `None` for classes outside the SRD list.
    pub class: Option<CharacterClass>,
    pub level: u8,
    pub hit_die: u8,
    pub caster_tier: CasterTier,
}

/// Attach hit die and caster tier to each class.
///
/// Explicit values on the record win, then the edition's class rule, then
/// the built-in caster map and [`DEFAULT_HIT_DIE`].
pub fn resolve_classes(levels: &[ClassLevel], rules: &EditionRuleSet) -> Vec<ResolvedClass> {
    levels
        .iter()
        .map(|entry| {
            let rule = rules.class_rule_by_id(&entry.class_id);
            let hit_die = entry
                .hit_die
                .filter(|die| *die > 0)
                .or(rule.map(|rule| rule.hit_die))
                .unwrap_or(DEFAULT_HIT_DIE);
            let caster_tier = entry
                .spellcasting_tier
                .or(rule.map(|rule| rule.spellcasting_tier))
                .unwrap_or_else(|| classify_caster(&entry.class_id));

            ResolvedClass {
                class_id: entry.class_id.clone(),
                class: rule.map(|rule| rule.class),
                level: clamp_level(entry.level),
                hit_die,
                caster_tier,
            }
        })
        .collect()
}

/// Everything the player edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildState {
    pub ability_scores: AbilityScores,
    pub classes: ClassInput,
    /// Unknown ids grant no skills instead of rejecting the document.
    #[serde(deserialize_with = "lenient_background")]
    pub background: Option<Background>,
    /// Class skills picked by the player.
    pub selected_skills: Vec<Skill>,
    pub expertise: Vec<Skill>,
    pub edition: Edition,
}

impl BuildState {
    pub fn class_levels(&self) -> Vec<ClassLevel> {
        self.classes.normalize()
    }

    /// Class ids currently held, in order.
    pub fn class_ids(&self) -> Vec<String> {
        self.class_levels()
            .into_iter()
            .map(|entry| entry.class_id)
            .collect()
    }

    /// Apply a tier that was looked up in the background.
    ///
    /// The refinement only lands if its class is still part of the build;
    /// otherwise it is stale and discarded. Returns whether it was applied.
    /// A progression log is collapsed to per-class levels on first apply.
    pub fn apply_caster_refinement(&mut self, refinement: &CasterRefinement) -> bool {
        let mut levels = match &self.classes {
            ClassInput::Levels(levels) => levels.clone(),
            ClassInput::Progression(_) => self.classes.normalize(),
        };

        let mut applied = false;
        for entry in levels.iter_mut().filter(|entry| entry.same_class(&refinement.class_id)) {
            entry.spellcasting_tier = Some(refinement.tier);
            applied = true;
        }

        if applied {
            debug!(
                class = %refinement.class_id,
                tier = %refinement.tier,
                "applied caster refinement"
            );
            self.classes = ClassInput::Levels(levels);
        } else {
            debug!(class = %refinement.class_id, "discarded stale caster refinement");
        }
        applied
    }
}

fn lenient_background<'de, D>(deserializer: D) -> Result<Option<Background>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(id) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let background = Background::from_name(&id);
    if background.is_none() {
        warn!(background = %id, "unknown background, granting no skills");
    }
    Ok(background)
}
