//! Card text from Scryfall
//!
//! Metadata only enriches cards; a card that cannot be looked up keeps
//! `metadata: None` and the analysis carries on.

use super::{parse_mana_requirements, DataError, DataResult};
use crate::cache::ResponseCache;
use crate::models::CardMetadata;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const SCRYFALL_BASE_URL: &str = "https://api.scryfall.com";

/// Scryfall asks for at most ten requests per second
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Lookup of card text by name within a set
pub trait CardMetadataProvider {
    fn card_metadata(&self, name: &str, set_code: &str) -> DataResult<Option<CardMetadata>>;

    /// Metadata for many cards. Failures are logged and the card skipped.
    fn batch_metadata(&self, names: &[String], set_code: &str) -> BTreeMap<String, CardMetadata> {
        let mut found = BTreeMap::new();
        for name in names {
            match self.card_metadata(name, set_code) {
                Ok(Some(meta)) => {
                    found.insert(name.clone(), meta);
                }
                Ok(None) => debug!("No metadata for {}", name),
                Err(e) => warn!("Metadata lookup failed for {}: {}", name, e),
            }
        }
        info!("Loaded metadata for {}/{} cards", found.len(), names.len());
        found
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ImageUris {
    normal: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CardFace {
    image_uris: Option<ImageUris>,
    oracle_text: Option<String>,
    mana_cost: Option<String>,
}

/// The subset of a Scryfall card object we read
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ScryfallCard {
    oracle_text: Option<String>,
    mana_cost: Option<String>,
    type_line: Option<String>,
    power: Option<String>,
    toughness: Option<String>,
    keywords: Vec<String>,
    cmc: Option<f64>,
    image_uris: Option<ImageUris>,
    scryfall_uri: Option<String>,
    card_faces: Vec<CardFace>,
}

impl From<ScryfallCard> for CardMetadata {
    fn from(card: ScryfallCard) -> Self {
        let front = card.card_faces.into_iter().next();

        // Double-faced cards keep text, cost and image on their faces
        let (face_text, face_cost, face_image) = match front {
            Some(face) => (
                face.oracle_text,
                face.mana_cost,
                face.image_uris.and_then(|i| i.normal),
            ),
            None => (None, None, None),
        };
        let oracle_text = card.oracle_text.or(face_text);
        let mana_cost = card.mana_cost.filter(|c| !c.is_empty()).or(face_cost);
        let image_uri = card.image_uris.and_then(|i| i.normal).or(face_image);

        CardMetadata {
            mana: parse_mana_requirements(mana_cost.as_deref().unwrap_or("")),
            oracle_text,
            mana_cost,
            type_line: card.type_line,
            power: card.power,
            toughness: card.toughness,
            keywords: card.keywords,
            cmc: card.cmc,
            image_uri,
            scryfall_uri: card.scryfall_uri,
        }
    }
}

pub struct ScryfallClient {
    base_url: String,
    agent: ureq::Agent,
    cache: Option<ResponseCache>,
    last_request: Mutex<Option<Instant>>,
}

impl ScryfallClient {
    pub fn new(cache: Option<ResponseCache>) -> Self {
        Self {
            base_url: SCRYFALL_BASE_URL.to_string(),
            agent: ureq::config::Config::builder()
                .http_status_as_error(false)
                .timeout_global(Some(Duration::from_secs(15)))
                .build()
                .new_agent(),
            cache,
            last_request: Mutex::new(None),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sleep until the minimum interval since the previous request has passed
    fn throttle(&self) {
        let Ok(mut last) = self.last_request.lock() else {
            return;
        };
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                std::thread::sleep(MIN_REQUEST_INTERVAL - elapsed);
            }
        }
        *last = Some(Instant::now());
    }

    fn fetch_named(&self, name: &str, set_code: &str) -> DataResult<Option<Value>> {
        let cache_args = ["scryfall_card", name, set_code];
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(&cache_args)) {
            return Ok(Some(cached));
        }

        self.throttle();
        let url = format!("{}/cards/named", self.base_url);
        let set = set_code.to_lowercase();
        let mut request = self.agent.get(&url).query("exact", name);
        if !set.is_empty() {
            request = request.query("set", &set);
        }
        let response = request
            .header("Accept", "application/json")
            .call()
            .map_err(|e| DataError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        match status {
            404 => {
                debug!("Card not found on Scryfall: {}", name);
                return Ok(None);
            }
            429 | 500..=599 => {
                warn!("Temporary HTTP error {} for {}, skipping {}", status, url, name);
                return Ok(None);
            }
            s if s >= 400 => return Err(DataError::Http { url, status }),
            _ => {}
        }

        let value: Value = response
            .into_body()
            .read_json()
            .map_err(|e| DataError::Parse {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&cache_args, &value) {
                warn!("Failed to cache Scryfall card {}: {}", name, e);
            }
        }
        Ok(Some(value))
    }
}

impl CardMetadataProvider for ScryfallClient {
    fn card_metadata(&self, name: &str, set_code: &str) -> DataResult<Option<CardMetadata>> {
        let Some(value) = self.fetch_named(name, set_code)? else {
            return Ok(None);
        };
        let card: ScryfallCard = serde_json::from_value(value)?;
        Ok(Some(card.into()))
    }
}

/// Per-set metadata cache owned by one analyzer run
///
/// Keys are upper-cased set codes. Dropping or clearing it releases all
/// looked-up cards; nothing is shared across analyzers.
#[derive(Debug, Default)]
pub struct CardMetadataCache {
    sets: HashMap<String, BTreeMap<String, CardMetadata>>,
}

impl CardMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for `names`, fetching only those not already cached
    pub fn get_or_fetch(
        &mut self,
        provider: &dyn CardMetadataProvider,
        set_code: &str,
        names: &[String],
    ) -> BTreeMap<String, CardMetadata> {
        let set = self.sets.entry(set_code.to_uppercase()).or_default();
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !set.contains_key(n.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            set.extend(provider.batch_metadata(&missing, set_code));
        }

        names
            .iter()
            .filter_map(|n| set.get(n).map(|m| (n.clone(), m.clone())))
            .collect()
    }

    pub fn get(&self, set_code: &str, name: &str) -> Option<&CardMetadata> {
        self.sets.get(&set_code.to_uppercase())?.get(name)
    }

    pub fn len(&self) -> usize {
        self.sets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }
}
