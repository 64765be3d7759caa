//! Minimal client for the D&D 5e SRD rules-content API.
//!
//! Read-only access to the class and class-level resources served by
//! <https://www.dnd5eapi.co> (or any server exposing the same routes).
//! Only the fields the character engine needs are modelled; everything
//! else in the payload is ignored.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Public SRD API host.
pub const DEFAULT_BASE_URL: &str = "https://www.dnd5eapi.co";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when talking to the SRD API.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// SRD API client.
#[derive(Debug, Clone)]
pub struct SrdClient {
    client: reqwest::Client,
    base_url: String,
}

impl SrdClient {
    /// Create a client for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .default_headers(default_headers())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/classes/{index}`
    pub async fn class(&self, index: &str) -> Result<ClassResource, Error> {
        self.get_json(&format!("/api/classes/{index}")).await
    }

    /// `GET /api/classes/{index}/levels/{level}`
    pub async fn class_level(&self, index: &str, level: u8) -> Result<ClassLevelResource, Error> {
        self.get_json(&format!("/api/classes/{index}/levels/{level}"))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(Error::NotFound(path.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }
        }

        response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }
}

impl Default for SrdClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// API index for a class name: `"Eldritch Knight"` -> `"eldritch-knight"`.
pub fn class_index(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

// ============================================================================
// Resources
// ============================================================================

/// A link to another API resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReference {
    pub index: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// `/api/classes/{index}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassResource {
    pub index: String,
    pub name: String,
    pub hit_die: u8,
    #[serde(default)]
    pub saving_throws: Vec<ApiReference>,
    /// Absent for classes without spellcasting.
    #[serde(default)]
    pub spellcasting: Option<ClassSpellcasting>,
}

/// Spellcasting summary on a class resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpellcasting {
    /// Class level at which spellcasting starts.
    pub level: u8,
    pub spellcasting_ability: ApiReference,
}

/// `/api/classes/{index}/levels/{level}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLevelResource {
    pub level: u8,
    #[serde(default)]
    pub prof_bonus: Option<i32>,
    #[serde(default)]
    pub spellcasting: Option<LevelSpellcasting>,
}

/// Spellcasting progression at one class level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpellcasting {
    #[serde(default)]
    pub cantrips_known: Option<u8>,
    #[serde(default)]
    pub spells_known: Option<u8>,
    #[serde(default)]
    pub spell_slots_level_1: u8,
    #[serde(default)]
    pub spell_slots_level_2: u8,
    #[serde(default)]
    pub spell_slots_level_3: u8,
    #[serde(default)]
    pub spell_slots_level_4: u8,
    #[serde(default)]
    pub spell_slots_level_5: u8,
    #[serde(default)]
    pub spell_slots_level_6: u8,
    #[serde(default)]
    pub spell_slots_level_7: u8,
    #[serde(default)]
    pub spell_slots_level_8: u8,
    #[serde(default)]
    pub spell_slots_level_9: u8,
}

impl LevelSpellcasting {
    /// Slots for spell levels 1 through 9.
    pub fn slot_row(&self) -> [u8; 9] {
        [
            self.spell_slots_level_1,
            self.spell_slots_level_2,
            self.spell_slots_level_3,
            self.spell_slots_level_4,
            self.spell_slots_level_5,
            self.spell_slots_level_6,
            self.spell_slots_level_7,
            self.spell_slots_level_8,
            self.spell_slots_level_9,
        ]
    }
}
