//! Background caster-tier refinement against fake content services.
//!
//! Run with: `cargo test -p charsheet-core --test caster_refinement`

use async_trait::async_trait;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use charsheet_core::caster::DEFAULT_CACHE_TTL;
use charsheet_core::{
    derive_stats, BuildState, CasterClassifier, CasterTier, ClassInput, ClassLevel, ContentConfig,
    ContentError, ManualClock, RulesContentSource, SrdContentSource, TtlCache,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Answers from a fixed table and counts every lookup.
struct ScriptedSource {
    answers: HashMap<&'static str, CasterTier>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(answers: &[(&'static str, CasterTier)]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RulesContentSource for ScriptedSource {
    async fn caster_tier(&self, class_name: &str) -> Result<CasterTier, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(class_name)
            .copied()
            .ok_or_else(|| ContentError::Request(format!("no answer for {class_name}")))
    }
}

fn classifier(source: Arc<ScriptedSource>) -> (Arc<ManualClock>, CasterClassifier) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let cache = TtlCache::with_clock(DEFAULT_CACHE_TTL, clock.clone());
    (clock, CasterClassifier::new(source, cache))
}

// =============================================================================
// CLASSIFIER + BUILD STATE
// =============================================================================

#[tokio::test]
async fn refinement_changes_derived_slots() {
    // The service knows a homebrew class casts as a half caster.
    let source = Arc::new(ScriptedSource::new(&[("spellblade", CasterTier::Half)]));
    let (_clock, classifier) = classifier(source.clone());

    let mut state = BuildState {
        classes: ClassInput::Levels(vec![ClassLevel::new("Spellblade", 6)]),
        ..BuildState::default()
    };
    assert!(derive_stats(&state).spell_slots.is_empty());

    let refinements = classifier
        .refine_all(state.class_ids().iter().map(String::as_str))
        .await;
    for refinement in &refinements {
        assert!(state.apply_caster_refinement(refinement));
    }

    assert_eq!(derive_stats(&state).spell_slots, vec![4, 2, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn cache_serves_repeat_lookups_until_expiry() {
    let source = Arc::new(ScriptedSource::new(&[("wizard", CasterTier::Full)]));
    let (clock, classifier) = classifier(source.clone());

    for _ in 0..3 {
        assert_eq!(classifier.classify("Wizard").await, CasterTier::Full);
    }
    assert_eq!(source.calls(), 1);

    clock.advance(Duration::from_secs(60 * 60));
    assert_eq!(classifier.classify("wizard").await, CasterTier::Full);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn failing_source_degrades_to_builtin_map() {
    let source = Arc::new(ScriptedSource::new(&[]));
    let (_clock, classifier) = classifier(source.clone());

    let refinements = classifier.refine_all(["Warlock", "Paladin", "Barbarian"]).await;
    let tiers: Vec<CasterTier> = refinements.iter().map(|r| r.tier).collect();
    assert_eq!(tiers, vec![CasterTier::Pact, CasterTier::Half, CasterTier::None]);

    // Failures are not cached.
    classifier.classify("Warlock").await;
    assert_eq!(source.calls(), 4);
}

#[tokio::test]
async fn late_refinement_for_removed_class_is_discarded() {
    let source = Arc::new(ScriptedSource::new(&[("ranger", CasterTier::Full)]));
    let (_clock, classifier) = classifier(source);

    let mut state = BuildState {
        classes: ClassInput::Levels(vec![ClassLevel::new("Ranger", 5)]),
        ..BuildState::default()
    };
    let pending = classifier.refine("Ranger");

    // The player swaps classes before the answer lands.
    state.classes = ClassInput::Levels(vec![ClassLevel::new("Fighter", 5)]);
    let before = derive_stats(&state);

    let refinement = pending.await;
    assert!(!state.apply_caster_refinement(&refinement));
    assert_eq!(derive_stats(&state), before);
}

#[tokio::test]
async fn disabled_config_never_calls_out() {
    let config = ContentConfig::default()
        .with_base_url("http://127.0.0.1:9")
        .with_enabled(false);
    let classifier = CasterClassifier::from_config(&config);
    assert_eq!(classifier.classify("Sorcerer").await, CasterTier::Full);
}

// =============================================================================
// SRD-BACKED SOURCE
// =============================================================================

async fn class(Path(index): Path<String>) -> Response {
    let spellcasting = match index.as_str() {
        "fighter" | "rogue" => None,
        "wizard" | "warlock" | "paladin" | "mystery" => Some(json!({
            "level": 1,
            "spellcasting_ability": {"index": "int", "name": "INT"}
        })),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let mut body = json!({"index": index, "name": index, "hit_die": 8});
    if let Some(spellcasting) = spellcasting {
        body["spellcasting"] = spellcasting;
    }
    Json(body).into_response()
}

async fn class_level(Path((index, level)): Path<(String, u8)>) -> Response {
    let slots: [u8; 9] = match index.as_str() {
        "wizard" => [4, 3, 3, 3, 3, 2, 2, 1, 1],
        "paladin" => [4, 3, 3, 3, 2, 0, 0, 0, 0],
        "warlock" => [0, 0, 0, 0, 4, 0, 0, 0, 0],
        "mystery" => [0; 9],
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let mut spellcasting = json!({});
    for (index, count) in slots.iter().enumerate() {
        spellcasting[format!("spell_slots_level_{}", index + 1)] = json!(count);
    }
    Json(json!({"level": level, "spellcasting": spellcasting})).into_response()
}

async fn spawn_fake_srd() -> String {
    let app = Router::new()
        .route("/api/classes/{index}", get(class))
        .route("/api/classes/{index}/levels/{level}", get(class_level));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake server");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn srd_source_infers_tiers_from_slot_rows() {
    let config = ContentConfig::default().with_base_url(spawn_fake_srd().await);
    let source = SrdContentSource::from_config(&config);

    assert_eq!(source.caster_tier("wizard").await.unwrap(), CasterTier::Full);
    assert_eq!(source.caster_tier("paladin").await.unwrap(), CasterTier::Half);
    assert_eq!(source.caster_tier("warlock").await.unwrap(), CasterTier::Pact);
    assert_eq!(source.caster_tier("fighter").await.unwrap(), CasterTier::None);
}

#[tokio::test]
async fn srd_source_errors_are_typed() {
    let config = ContentConfig::default().with_base_url(spawn_fake_srd().await);
    let source = SrdContentSource::from_config(&config);

    assert!(matches!(
        source.caster_tier("mystery").await,
        Err(ContentError::Malformed(_))
    ));
    assert!(matches!(
        source.caster_tier("eldritch knight").await,
        Err(ContentError::UnknownClass(_))
    ));
}

#[tokio::test]
async fn classifier_over_srd_falls_back_for_subclasses() {
    let config = ContentConfig::default().with_base_url(spawn_fake_srd().await);
    let classifier = CasterClassifier::from_config(&config);

    // Subclasses have no class resource; the built-in map still knows them.
    assert_eq!(classifier.classify("Eldritch Knight").await, CasterTier::Third);
    assert_eq!(classifier.classify("Warlock").await, CasterTier::Pact);
}
