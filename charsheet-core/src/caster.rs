//! Caster classification.
//!
//! Resolves a class name to a [`CasterTier`]. The synchronous path is a fixed
//! built-in map and is always available. [`CasterClassifier`] refines it by
//! asking a rules-content service, caching answers for an hour and falling
//! back to the built-in map whenever the service misbehaves.

use crate::cache::TtlCache;
use crate::content::{ContentConfig, RulesContentSource, SrdContentSource};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How long a rules-content answer stays cached.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// How strongly a class casts spells; selects the slot table that applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasterTier {
    Full,
    Half,
    /// Also accepts the legacy `"quarter"` tag.
    #[serde(alias = "quarter")]
    Third,
    Pact,
    #[default]
    None,
}

impl CasterTier {
    pub fn name(&self) -> &'static str {
        match self {
            CasterTier::Full => "full",
            CasterTier::Half => "half",
            CasterTier::Third => "third",
            CasterTier::Pact => "pact",
            CasterTier::None => "none",
        }
    }
}

impl fmt::Display for CasterTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Built-in caster tier for a class name. Unknown classes are non-casters.
pub fn classify_caster(class_name: &str) -> CasterTier {
    match class_name.trim().to_lowercase().as_str() {
        "bard" | "cleric" | "druid" | "sorcerer" | "wizard" => CasterTier::Full,
        "paladin" | "ranger" | "artificer" => CasterTier::Half,
        "eldritch knight" | "arcane trickster" => CasterTier::Third,
        "warlock" => CasterTier::Pact,
        _ => CasterTier::None,
    }
}

/// A tier resolved in the background for the class it was requested for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasterRefinement {
    pub class_id: String,
    pub tier: CasterTier,
}

/// Asynchronous caster classification with a TTL cache and a built-in fallback.
pub struct CasterClassifier {
    source: Option<Arc<dyn RulesContentSource>>,
    cache: TtlCache<String, CasterTier>,
}

impl CasterClassifier {
    pub fn new(source: Arc<dyn RulesContentSource>, cache: TtlCache<String, CasterTier>) -> Self {
        Self {
            source: Some(source),
            cache,
        }
    }

    /// A classifier that never leaves the process.
    pub fn offline() -> Self {
        Self {
            source: None,
            cache: TtlCache::new(DEFAULT_CACHE_TTL),
        }
    }

    /// Build the classifier described by `config`.
    pub fn from_config(config: &ContentConfig) -> Self {
        if !config.enabled {
            return Self::offline();
        }
        Self::new(
            Arc::new(SrdContentSource::from_config(config)),
            TtlCache::new(config.cache_ttl),
        )
    }

    /// Classify a class, preferring the content service.
    ///
    /// Never fails: a service error or malformed answer degrades to
    /// [`classify_caster`]. Only successful answers are cached.
    pub async fn classify(&self, class_name: &str) -> CasterTier {
        let key = class_name.trim().to_lowercase();

        if let Some(tier) = self.cache.get(&key).await {
            debug!(class = %key, %tier, "caster tier cache hit");
            return tier;
        }

        let Some(source) = &self.source else {
            return classify_caster(&key);
        };

        match source.caster_tier(&key).await {
            Ok(tier) => {
                debug!(class = %key, %tier, "caster tier fetched");
                self.cache.insert(key, tier).await;
                tier
            }
            Err(err) => {
                let fallback = classify_caster(&key);
                warn!(
                    class = %key,
                    error = %err,
                    %fallback,
                    "caster lookup failed, using built-in table"
                );
                fallback
            }
        }
    }

    /// Classify and tag the answer with the class id it belongs to.
    pub async fn refine(&self, class_id: &str) -> CasterRefinement {
        CasterRefinement {
            class_id: class_id.to_string(),
            tier: self.classify(class_id).await,
        }
    }

    /// Refine several classes concurrently, in input order.
    pub async fn refine_all<'a, I>(&self, class_ids: I) -> Vec<CasterRefinement>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.cache.cleanup_expired().await;
        join_all(class_ids.into_iter().map(|id| self.refine(id))).await
    }

    /// Forget any cached answer for a class.
    pub async fn invalidate(&self, class_name: &str) {
        self.cache.remove(&class_name.trim().to_lowercase()).await;
    }
}

impl fmt::Debug for CasterClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasterClassifier")
            .field("online", &self.source.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}
