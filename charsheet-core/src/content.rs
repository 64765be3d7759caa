//! Rules-content service seam.
//!
//! [`RulesContentSource`] is what the asynchronous caster classifier talks
//! to. [`SrdContentSource`] is the production implementation backed by the
//! SRD API; tests swap in a mock or a hand-written fake.

use crate::caster::{CasterTier, DEFAULT_CACHE_TTL};
use crate::edition::{MAX_LEVEL, SPELL_LEVELS};
use async_trait::async_trait;
use srd_client::{class_index, SrdClient};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from a rules-content lookup.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content request failed: {0}")]
    Request(String),

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Malformed content: {0}")]
    Malformed(String),
}

impl From<srd_client::Error> for ContentError {
    fn from(err: srd_client::Error) -> Self {
        match err {
            srd_client::Error::NotFound(path) => ContentError::UnknownClass(path),
            srd_client::Error::Parse(msg) => ContentError::Malformed(msg),
            err @ (srd_client::Error::Network(_) | srd_client::Error::Api { .. }) => {
                ContentError::Request(err.to_string())
            }
        }
    }
}

/// Anything that can answer "what kind of caster is this class?".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RulesContentSource: Send + Sync {
    async fn caster_tier(&self, class_name: &str) -> Result<CasterTier, ContentError>;
}

// ============================================================================
// Configuration
// ============================================================================

/// Settings for the optional rules-content service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    /// When false, classification never leaves the process.
    pub enabled: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: srd_client::DEFAULT_BASE_URL.to_string(),
            timeout: srd_client::DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            enabled: true,
        }
    }
}

impl ContentConfig {
    pub const BASE_URL_VAR: &'static str = "SRD_API_BASE_URL";
    pub const TIMEOUT_VAR: &'static str = "SRD_API_TIMEOUT_SECS";
    pub const CACHE_TTL_VAR: &'static str = "SRD_CACHE_TTL_SECS";
    pub const ENABLED_VAR: &'static str = "SRD_REFINE";

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Defaults overridden by the `SRD_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    /// Unparseable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(Self::BASE_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(secs) = parse_secs(&lookup, Self::TIMEOUT_VAR) {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_secs(&lookup, Self::CACHE_TTL_VAR) {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(Self::ENABLED_VAR) {
            match parse_flag(&raw) {
                Some(enabled) => config.enabled = enabled,
                None => warn!(var = Self::ENABLED_VAR, value = %raw, "ignoring unrecognised flag"),
            }
        }

        config
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!(var = key, value = %raw, "ignoring non-numeric duration");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// SRD-backed source
// ============================================================================

/// Classifies casters from the SRD API's class resources.
#[derive(Debug, Clone)]
pub struct SrdContentSource {
    client: SrdClient,
}

impl SrdContentSource {
    pub fn new(client: SrdClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ContentConfig) -> Self {
        Self::new(SrdClient::with_timeout(config.base_url.clone(), config.timeout))
    }
}

#[async_trait]
impl RulesContentSource for SrdContentSource {
    async fn caster_tier(&self, class_name: &str) -> Result<CasterTier, ContentError> {
        let index = class_index(class_name);
        let class = self.client.class(&index).await?;
        if class.spellcasting.is_none() {
            return Ok(CasterTier::None);
        }

        let capstone = self.client.class_level(&index, MAX_LEVEL).await?;
        let row = capstone
            .spellcasting
            .map(|spellcasting| spellcasting.slot_row())
            .ok_or_else(|| {
                ContentError::Malformed(format!("{index}: no spellcasting at level {MAX_LEVEL}"))
            })?;

        let tier = tier_from_slot_row(&row)
            .ok_or_else(|| {
                ContentError::Malformed(format!("{index}: unrecognised slot row {row:?}"))
            })?;
        debug!(class = %index, %tier, "inferred caster tier from slot progression");
        Ok(tier)
    }
}

/// Infer a caster tier from a class's level-20 slot row.
///
/// A single populated spell level above 1st with nothing below it is pact
/// magic. Otherwise the highest slot level reached decides: 9th is full,
/// 5th is half, 4th is third.
pub fn tier_from_slot_row(row: &[u8; SPELL_LEVELS]) -> Option<CasterTier> {
    let populated: Vec<usize> = row
        .iter()
        .enumerate()
        .filter(|(_, slots)| **slots > 0)
        .map(|(index, _)| index)
        .collect();

    match populated.as_slice() {
        [] => None,
        [only] if *only > 0 => Some(CasterTier::Pact),
        [.., highest] => match highest + 1 {
            9 => Some(CasterTier::Full),
            5 => Some(CasterTier::Half),
            4 => Some(CasterTier::Third),
            _ => None,
        },
    }
}
