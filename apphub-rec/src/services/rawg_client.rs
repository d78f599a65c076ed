//! Game catalog client (RAWG)
//!
//! Same search-then-detail flow as the film client, plus a storefront
//! list (name + purchase URL) resolved from the detail response.

use crate::config::GameConfig;
use crate::services::placeholder::gradient_image;
use crate::services::CatalogError;
use apphub_common::config::is_valid_key;
use apphub_common::types::EnrichedOption;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct GameSearchResponse {
    #[serde(default)]
    results: Vec<GameSummary>,
}

#[derive(Debug, Deserialize)]
struct GameSummary {
    id: i64,
    slug: String,
    name: String,
    released: Option<String>,
    background_image: Option<String>,
    rating: Option<f64>,
    metacritic: Option<i64>,
    #[serde(default)]
    genres: Vec<NamedRef>,
    #[serde(default)]
    platforms: Vec<PlatformWrap>,
    #[serde(default)]
    stores: Vec<StoreWrap>,
}

#[derive(Debug, Deserialize)]
struct GameDetails {
    id: i64,
    slug: String,
    name: String,
    released: Option<String>,
    description_raw: Option<String>,
    background_image: Option<String>,
    background_image_additional: Option<String>,
    website: Option<String>,
    rating: Option<f64>,
    metacritic: Option<i64>,
    playtime: Option<i64>,
    esrb_rating: Option<NamedRef>,
    #[serde(default)]
    genres: Vec<NamedRef>,
    #[serde(default)]
    platforms: Vec<PlatformWrap>,
    #[serde(default)]
    stores: Vec<StoreWrap>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlatformWrap {
    platform: NamedRef,
}

#[derive(Debug, Deserialize)]
struct StoreWrap {
    url: Option<String>,
    store: StoreRef,
}

#[derive(Debug, Deserialize)]
struct StoreRef {
    name: String,
    domain: Option<String>,
}

/// Storefront entry: display name plus a purchase URL when known
fn store_entries(stores: &[StoreWrap]) -> Vec<Value> {
    stores
        .iter()
        .map(|s| {
            json!({
                "name": s.store.name,
                "url": s.url.clone().or_else(|| s.store.domain.clone()),
            })
        })
        .collect()
}

/// Game catalog client
pub struct GameClient {
    http: reqwest::Client,
    config: GameConfig,
}

impl GameClient {
    pub fn new(http: reqwest::Client, config: GameConfig) -> Self {
        Self { http, config }
    }

    /// Search for one game; `Ok(None)` means no catalog match
    pub async fn search(&self, query: &str) -> Result<Option<EnrichedOption>, CatalogError> {
        if !is_valid_key(&self.config.api_key) {
            warn!("RAWG API key not configured, skipping game lookup");
            return Ok(None);
        }

        let clean = clean_search_query(query);
        debug!(query = %clean, original = %query, "RAWG search");

        let url = format!("{}/games", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("search", clean.as_str()),
                ("page_size", "1"),
            ])
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        let page: GameSearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let Some(summary) = page.results.into_iter().next() else {
            debug!(query = %query, "No RAWG results");
            return Ok(None);
        };

        let details = self.fetch_details(summary.id).await?;
        Ok(Some(option_from_details(&details)))
    }

    /// Top-rated games from the last year, used as result padding
    pub async fn popular(&self, count: usize) -> Result<Vec<EnrichedOption>, CatalogError> {
        if !is_valid_key(&self.config.api_key) || count == 0 {
            return Ok(Vec::new());
        }

        let today = chrono::Utc::now().date_naive();
        let last_year = today - chrono::Days::new(365);
        let dates = format!("{},{}", last_year, today);

        let url = format!("{}/games", self.config.base_url);
        let page_size = count.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("dates", dates.as_str()),
                ("ordering", "-rating"),
                ("page_size", page_size.as_str()),
            ])
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        let page: GameSearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(page.results.iter().take(count).map(option_from_summary).collect())
    }

    async fn fetch_details(&self, id: i64) -> Result<GameDetails, CatalogError> {
        let url = format!("{}/games/{}", self.config.base_url, id);
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

fn option_from_details(details: &GameDetails) -> EnrichedOption {
    let stores = store_entries(&details.stores);
    let rawg_link = format!("https://rawg.io/games/{}", details.slug);
    let description_raw = details.description_raw.clone().unwrap_or_default();

    let source_url = details
        .website
        .clone()
        .filter(|w| !w.is_empty())
        .or_else(|| stores.first().and_then(|s| s["url"].as_str().map(str::to_string)))
        .unwrap_or_else(|| rawg_link.clone());

    let mut extra = serde_json::Map::new();
    if let Some(rating) = details.rating {
        extra.insert("rating".into(), Value::String(format!("{}/5", rating)));
    }
    if let Some(released) = &details.released {
        extra.insert("releaseDate".into(), Value::String(released.clone()));
    }
    if !details.genres.is_empty() {
        extra.insert("genres".into(), Value::String(join_names(&details.genres)));
    }
    if !details.platforms.is_empty() {
        let platforms = details
            .platforms
            .iter()
            .take(5)
            .map(|p| p.platform.name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        extra.insert("platforms".into(), Value::String(platforms));
    }
    if let Some(playtime) = details.playtime.filter(|p| *p > 0) {
        extra.insert("playtime".into(), Value::String(format!("{} hours avg", playtime)));
    }
    if let Some(metacritic) = details.metacritic {
        extra.insert("metacritic".into(), Value::String(format!("{}/100", metacritic)));
    }
    extra.insert("stores".into(), Value::Array(stores));
    extra.insert("rawgLink".into(), Value::String(rawg_link));
    if let Some(esrb) = &details.esrb_rating {
        extra.insert("esrbRating".into(), Value::String(esrb.name.clone()));
    }

    EnrichedOption {
        id: details.id.to_string(),
        title: details.name.clone(),
        snippet: if description_raw.is_empty() {
            "No description available".to_string()
        } else {
            truncate_chars(&description_raw, 200)
        },
        description: Some(truncate_chars(&description_raw, 400)),
        image: Some(
            details
                .background_image
                .clone()
                .or_else(|| details.background_image_additional.clone())
                .unwrap_or_else(|| gradient_image(&details.name)),
        ),
        source_url: Some(source_url),
        extra,
    }
}

fn option_from_summary(summary: &GameSummary) -> EnrichedOption {
    let stores = store_entries(&summary.stores);
    let rawg_link = format!("https://rawg.io/games/{}", summary.slug);

    let source_url = stores
        .first()
        .and_then(|s| s["url"].as_str().map(str::to_string))
        .unwrap_or_else(|| rawg_link.clone());

    let mut extra = serde_json::Map::new();
    if let Some(rating) = summary.rating {
        extra.insert("rating".into(), Value::String(format!("{}/5", rating)));
    }
    if let Some(released) = &summary.released {
        extra.insert("releaseDate".into(), Value::String(released.clone()));
    }
    if !summary.genres.is_empty() {
        extra.insert("genres".into(), Value::String(join_names(&summary.genres)));
    }
    if !summary.platforms.is_empty() {
        let platforms = summary
            .platforms
            .iter()
            .take(3)
            .map(|p| p.platform.name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        extra.insert("platforms".into(), Value::String(platforms));
    }
    if let Some(metacritic) = summary.metacritic {
        extra.insert("metacritic".into(), Value::String(format!("{}/100", metacritic)));
    }
    extra.insert("stores".into(), Value::Array(stores));
    extra.insert("rawgLink".into(), Value::String(rawg_link));

    let genres = if summary.genres.is_empty() {
        "Game".to_string()
    } else {
        join_names(&summary.genres)
    };

    EnrichedOption {
        id: summary.id.to_string(),
        title: summary.name.clone(),
        snippet: genres,
        description: Some(format!(
            "Released: {}",
            summary.released.as_deref().unwrap_or("TBA")
        )),
        image: Some(
            summary
                .background_image
                .clone()
                .unwrap_or_else(|| gradient_image(&summary.name)),
        ),
        source_url: Some(source_url),
        extra,
    }
}

/// Strip a trailing "game", "video game", or "gameplay" suffix
fn clean_search_query(query: &str) -> String {
    let trimmed = query.trim();
    let lower = trimmed.to_ascii_lowercase();
    for suffix in [" video game", " game", " gameplay"] {
        if lower.ends_with(suffix) {
            return trimmed[..trimmed.len() - suffix.len()].trim().to_string();
        }
    }
    trimmed.to_string()
}

fn join_names(refs: &[NamedRef]) -> String {
    refs.iter().map(|r| r.name.clone()).collect::<Vec<_>>().join(", ")
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaning_strips_game_suffixes_only() {
        assert_eq!(clean_search_query("Hades game"), "Hades");
        assert_eq!(clean_search_query("Elden Ring video game"), "Elden Ring");
        assert_eq!(clean_search_query("Celeste gameplay"), "Celeste");
        assert_eq!(clean_search_query("Doom 2016"), "Doom 2016");
        assert_eq!(clean_search_query("Game of Thrones"), "Game of Thrones");
    }

    #[test]
    fn details_map_to_an_enriched_option() {
        let details: GameDetails = serde_json::from_value(json!({
            "id": 3328,
            "slug": "the-witcher-3-wild-hunt",
            "name": "The Witcher 3: Wild Hunt",
            "released": "2015-05-18",
            "description_raw": "Geralt of Rivia takes on one last contract.",
            "background_image": "https://media.rawg.io/witcher3.jpg",
            "rating": 4.65,
            "metacritic": 92,
            "playtime": 46,
            "esrb_rating": {"name": "Mature"},
            "genres": [{"name": "RPG"}],
            "platforms": [{"platform": {"name": "PC"}}, {"platform": {"name": "PlayStation 5"}}],
            "stores": [
                {"url": "https://store.steampowered.com/app/292030", "store": {"name": "Steam", "domain": "store.steampowered.com"}},
                {"url": null, "store": {"name": "GOG", "domain": "gog.com"}}
            ]
        }))
        .unwrap();

        let option = option_from_details(&details);
        assert_eq!(option.id, "3328");
        assert_eq!(option.extra["rating"], "4.65/5");
        assert_eq!(option.extra["metacritic"], "92/100");
        assert_eq!(option.extra["playtime"], "46 hours avg");
        assert_eq!(option.extra["esrbRating"], "Mature");
        assert_eq!(option.extra["platforms"], "PC, PlayStation 5");

        let stores = option.extra["stores"].as_array().unwrap();
        assert_eq!(stores[0]["url"], "https://store.steampowered.com/app/292030");
        // Missing store URL falls back to the domain
        assert_eq!(stores[1]["url"], "gog.com");
        assert_eq!(
            option.extra["rawgLink"],
            "https://rawg.io/games/the-witcher-3-wild-hunt"
        );
    }

    #[test]
    fn empty_description_gets_a_placeholder_snippet() {
        let details: GameDetails = serde_json::from_value(json!({
            "id": 1,
            "slug": "mystery",
            "name": "Mystery"
        }))
        .unwrap();

        let option = option_from_details(&details);
        assert_eq!(option.snippet, "No description available");
        assert_eq!(option.source_url.as_deref(), Some("https://rawg.io/games/mystery"));
        // No background image: the option still carries a placeholder
        assert!(option
            .image
            .as_deref()
            .unwrap()
            .starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn summary_mapping_uses_genres_as_snippet() {
        let summary: GameSummary = serde_json::from_value(json!({
            "id": 2,
            "slug": "hades",
            "name": "Hades",
            "released": "2020-09-17",
            "genres": [{"name": "Roguelike"}, {"name": "Action"}]
        }))
        .unwrap();

        let option = option_from_summary(&summary);
        assert_eq!(option.snippet, "Roguelike, Action");
        assert_eq!(option.description.as_deref(), Some("Released: 2020-09-17"));
    }
}
