//! 17lands HTTP client
//!
//! Sync HTTP via ureq. Every successful response is stored raw in the
//! [`ResponseCache`] and decoded on the way out, so a cached run and a live
//! run go through the same record mapping.

use super::{CardRecord, ColorRecord, DataError, DataResult, DraftDataSource, TrophyDeckRecord};
use crate::cache::ResponseCache;
use crate::models::PlayDrawStats;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const SEVENTEEN_LANDS_BASE_URL: &str = "https://www.17lands.com";

const CARD_RATINGS_ENDPOINT: &str = "/card_ratings/data";
const COLOR_RATINGS_ENDPOINT: &str = "/color_ratings/data";
const TROPHIES_ENDPOINT: &str = "/data/trophies";
const PLAY_DRAW_ENDPOINT: &str = "/data/play_draw";

const USER_AGENT: &str = concat!("draftmeta/", env!("CARGO_PKG_VERSION"));

pub struct SeventeenLandsClient {
    base_url: String,
    agent: ureq::Agent,
    cache: Option<ResponseCache>,
}

fn make_agent(timeout_secs: u64) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build()
        .new_agent()
}

fn decode<T: DeserializeOwned>(url: &str, value: Value) -> DataResult<T> {
    serde_json::from_value(value).map_err(|e| DataError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

impl SeventeenLandsClient {
    pub fn new(cache: Option<ResponseCache>) -> Self {
        Self {
            base_url: SEVENTEEN_LANDS_BASE_URL.to_string(),
            agent: make_agent(30),
            cache,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// GET `endpoint` with query `params`, going through the response cache.
    ///
    /// `cache_args` identifies the request in the cache; the base URL is not
    /// part of the key.
    fn get_json(&self, endpoint: &str, params: &[(&str, &str)], cache_args: &[&str]) -> DataResult<Value> {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(cache_args)) {
            info!("Using cached {}", cache_args.join(" "));
            return Ok(cached);
        }

        let url = self.url(endpoint);
        debug!("GET {} {:?}", url, params);

        let mut request = self
            .agent
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json");
        for (key, value) in params {
            request = request.query(*key, *value);
        }

        let response = request.call().map_err(|e| DataError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(DataError::Http { url, status });
        }

        let text = response
            .into_body()
            .read_to_string()
            .map_err(|e| DataError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| DataError::Parse {
            url: url.clone(),
            message: e.to_string(),
        })?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(cache_args, &value) {
                warn!("Failed to cache {}: {}", cache_args.join(" "), e);
            }
        }
        Ok(value)
    }
}

impl DraftDataSource for SeventeenLandsClient {
    fn fetch_card_ratings(&self, expansion: &str, format: &str) -> DataResult<Vec<CardRecord>> {
        info!("Fetching card ratings for {} {}", expansion, format);
        let value = self.get_json(
            CARD_RATINGS_ENDPOINT,
            &[("expansion", expansion), ("format", format)],
            &["card_ratings", expansion, format],
        )?;
        let records: Vec<CardRecord> = decode(&self.url(CARD_RATINGS_ENDPOINT), value)?;
        info!("Loaded {} cards for {} {}", records.len(), expansion, format);
        Ok(records)
    }

    fn fetch_color_ratings(&self, expansion: &str, format: &str) -> DataResult<Vec<ColorRecord>> {
        info!("Fetching color ratings for {} {}", expansion, format);
        let value = self.get_json(
            COLOR_RATINGS_ENDPOINT,
            &[("expansion", expansion), ("format", format)],
            &["color_ratings", expansion, format],
        )?;
        decode(&self.url(COLOR_RATINGS_ENDPOINT), value)
    }

    fn fetch_archetype_ratings(
        &self,
        expansion: &str,
        format: &str,
        colors: &str,
    ) -> DataResult<Vec<CardRecord>> {
        debug!("Fetching archetype card ratings for {} {}", expansion, colors);
        let value = self.get_json(
            CARD_RATINGS_ENDPOINT,
            &[("expansion", expansion), ("format", format), ("colors", colors)],
            &["card_ratings_archetype", expansion, format, colors],
        )?;
        decode(&self.url(CARD_RATINGS_ENDPOINT), value)
    }

    fn fetch_trophy_decks(&self, expansion: &str, format: &str) -> DataResult<Vec<TrophyDeckRecord>> {
        info!("Fetching trophy decks for {} {}", expansion, format);
        let value = self.get_json(
            TROPHIES_ENDPOINT,
            &[("expansion", expansion), ("format", format)],
            &["trophies", expansion, format],
        )?;
        decode(&self.url(TROPHIES_ENDPOINT), value)
    }

    fn fetch_play_draw_stats(&self, expansion: &str, format: &str) -> DataResult<Option<PlayDrawStats>> {
        let value = self.get_json(
            PLAY_DRAW_ENDPOINT,
            &[("expansion", expansion), ("format", format)],
            &["play_draw", expansion, format],
        )?;
        if value.is_null() {
            return Ok(None);
        }
        decode(&self.url(PLAY_DRAW_ENDPOINT), value).map(Some)
    }
}
