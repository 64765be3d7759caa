//! D&D 5e character rules derivation engine.
//!
//! This crate provides:
//! - Per-edition rule tables for the twelve SRD classes (2014 and 2024)
//! - Multiclass spell slot and pact magic aggregation
//! - Spellcasting, hit point, saving throw and skill derivation
//! - Optional caster-tier refinement through the SRD content API
//!
//! # Quick Start
//!
//! ```ignore
//! use charsheet_core::{derive_stats, BuildState, ClassInput, ClassLevel};
//!
//! let state = BuildState {
//!     classes: ClassInput::Levels(vec![ClassLevel::new("Wizard", 5)]),
//!     ..BuildState::default()
//! };
//!
//! let stats = derive_stats(&state);
//! assert_eq!(stats.spell_slots, vec![4, 3, 2, 0, 0, 0, 0, 0, 0]);
//! ```

pub mod build_state;
pub mod cache;
pub mod caster;
pub mod class_data;
pub mod content;
pub mod derive;
pub mod edition;
pub mod spell_slots;
pub mod spellcasting;
pub mod vitals;
pub mod world;

// Primary public API
pub use build_state::{BuildState, ClassInput, ClassLevel, LevelUpRecord, ResolvedClass};
pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use caster::{classify_caster, CasterClassifier, CasterRefinement, CasterTier};
pub use content::{ContentConfig, ContentError, RulesContentSource, SrdContentSource};
pub use derive::{derive_stats, ClassProgress, DerivedStats};
pub use edition::{ClassRule, Edition, EditionRuleSet, PactMagicSlots, PreparedSpellFormula};
pub use spell_slots::SpellSlotInfo;
pub use spellcasting::SpellcastingDetails;
pub use vitals::HitDicePool;
pub use world::{Ability, AbilityScores, Background, CharacterClass, Skill};
