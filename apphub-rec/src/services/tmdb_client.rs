//! Film/TV catalog client (TMDB)
//!
//! Search-then-detail flow: a text search takes the provider's
//! top-ranked hit, then a second request fetches full details including
//! credits and regional watch providers. Query cleaning strips media
//! nouns but keeps embedded release years, since years disambiguate
//! identically-titled works; a zero-hit search retries once with a
//! trailing year stripped.

use crate::config::FilmConfig;
use crate::services::placeholder::gradient_image;
use crate::services::CatalogError;
use apphub_common::config::is_valid_key;
use apphub_common::types::{Answers, EnrichedOption};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Which TMDB media family to search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// TMDB URL path segment
    fn path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Derive from the survey's `mediaType` answer; "series" means TV
    pub fn from_answers(answers: &Answers) -> Self {
        match answers.get("mediaType").map(|v| v.joined()).as_deref() {
            Some("series") => MediaKind::Tv,
            _ => MediaKind::Movie,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TitleSummary>,
}

#[derive(Debug, Deserialize)]
struct TitleSummary {
    id: i64,
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TitleDetails {
    id: i64,
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    tagline: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f64>,
    runtime: Option<i64>,
    #[serde(default)]
    genres: Vec<NamedRef>,
    credits: Option<Credits>,
    #[serde(rename = "watch/providers")]
    watch_providers: Option<ProvidersEnvelope>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct ProvidersEnvelope {
    #[serde(default)]
    results: std::collections::HashMap<String, RegionProviders>,
}

#[derive(Debug, Default, Deserialize)]
struct RegionProviders {
    link: Option<String>,
    #[serde(default)]
    flatrate: Vec<ProviderRef>,
    #[serde(default)]
    rent: Vec<ProviderRef>,
    #[serde(default)]
    buy: Vec<ProviderRef>,
}

#[derive(Debug, Deserialize)]
struct ProviderRef {
    provider_id: i64,
    provider_name: String,
    logo_path: Option<String>,
}

/// Film/TV catalog client
pub struct FilmClient {
    http: reqwest::Client,
    config: FilmConfig,
}

impl FilmClient {
    pub fn new(http: reqwest::Client, config: FilmConfig) -> Self {
        Self { http, config }
    }

    /// Search for one title; `Ok(None)` means no catalog match
    pub async fn search(
        &self,
        query: &str,
        kind: MediaKind,
    ) -> Result<Option<EnrichedOption>, CatalogError> {
        if !is_valid_key(&self.config.api_key) {
            warn!("TMDB API key not configured, skipping film/TV lookup");
            return Ok(None);
        }

        let clean = clean_search_query(query);
        debug!(query = %clean, original = %query, kind = kind.path(), "TMDB search");

        let mut hit = self.search_once(&clean, kind).await?;

        // Retry once with a trailing year stripped
        if hit.is_none() {
            if let Some(without_year) = strip_trailing_year(&clean) {
                debug!(query = %without_year, "TMDB retry without year");
                hit = self.search_once(&without_year, kind).await?;
            }
        }

        let Some(summary) = hit else {
            debug!(query = %query, "No TMDB results");
            return Ok(None);
        };

        let details = self.fetch_details(summary.id, kind).await?;
        Ok(Some(self.option_from_details(&details, kind)))
    }

    /// Provider-curated popular titles, used as result padding
    pub async fn popular(
        &self,
        kind: MediaKind,
        count: usize,
    ) -> Result<Vec<EnrichedOption>, CatalogError> {
        if !is_valid_key(&self.config.api_key) || count == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/{}/popular", self.config.base_url, kind.path());
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.config.api_key.as_str()), ("page", "1")])
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        let page: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let mut options = Vec::with_capacity(count.min(page.results.len()));
        for summary in page.results.into_iter().take(count) {
            // A failed detail fetch degrades to the summary fields
            match self.fetch_details(summary.id, kind).await {
                Ok(details) => options.push(self.option_from_details(&details, kind)),
                Err(e) => {
                    warn!(id = summary.id, error = %e, "TMDB detail fetch failed, using summary");
                    options.push(self.option_from_summary(&summary, kind));
                }
            }
        }

        Ok(options)
    }

    async fn search_once(
        &self,
        query: &str,
        kind: MediaKind,
    ) -> Result<Option<TitleSummary>, CatalogError> {
        let url = format!("{}/search/{}", self.config.base_url, kind.path());
        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("query", query),
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

        let page: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(page.results.into_iter().next())
    }

    async fn fetch_details(
        &self,
        id: i64,
        kind: MediaKind,
    ) -> Result<TitleDetails, CatalogError> {
        let url = format!("{}/{}/{}", self.config.base_url, kind.path(), id);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("append_to_response", "credits,watch/providers"),
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

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    fn option_from_details(&self, details: &TitleDetails, kind: MediaKind) -> EnrichedOption {
        let title = details
            .title
            .clone()
            .or_else(|| details.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let overview = details.overview.clone().unwrap_or_default();

        // Every option carries an image; a title with no artwork gets a
        // deterministic gradient placeholder
        let image = self
            .poster_url(details.poster_path.as_deref(), details.backdrop_path.as_deref())
            .unwrap_or_else(|| gradient_image(&title));
        let tmdb_link = format!("https://www.themoviedb.org/{}/{}", kind.path(), details.id);

        // US region watch providers, bucketed by acquisition model
        let us = details
            .watch_providers
            .as_ref()
            .and_then(|p| p.results.get("US"));
        let source_url = us
            .and_then(|p| p.link.clone())
            .unwrap_or_else(|| tmdb_link.clone());

        let mut extra = serde_json::Map::new();
        if let Some(year) = release_year(details.release_date.as_deref(), details.first_air_date.as_deref()) {
            extra.insert("year".into(), Value::String(year));
        }
        if let Some(avg) = details.vote_average {
            extra.insert("rating".into(), Value::String(format!("{:.1}/10", avg)));
        }
        if let Some(runtime) = details.runtime {
            extra.insert("duration".into(), Value::String(format!("{} min", runtime)));
        }
        if !details.genres.is_empty() {
            extra.insert("genres".into(), Value::String(join_names(&details.genres)));
        }
        if let Some(credits) = &details.credits {
            if !credits.cast.is_empty() {
                let cast: Vec<&NamedRef> = credits.cast.iter().take(5).collect();
                let names = cast.iter().map(|c| c.name.clone()).collect::<Vec<_>>().join(", ");
                extra.insert("cast".into(), Value::String(names));
            }
        }
        extra.insert(
            "streamingServices".into(),
            self.service_list(us.map(|p| p.flatrate.as_slice()).unwrap_or_default()),
        );
        extra.insert(
            "rentalServices".into(),
            self.service_list(us.map(|p| p.rent.as_slice()).unwrap_or_default()),
        );
        extra.insert(
            "purchaseServices".into(),
            self.service_list(us.map(|p| p.buy.as_slice()).unwrap_or_default()),
        );
        extra.insert("tmdbLink".into(), Value::String(tmdb_link));

        EnrichedOption {
            id: details.id.to_string(),
            title,
            snippet: overview.clone(),
            description: Some(
                details
                    .tagline
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| truncate_chars(&overview, 150)),
            ),
            image: Some(image),
            source_url: Some(source_url),
            extra,
        }
    }

    fn option_from_summary(&self, summary: &TitleSummary, kind: MediaKind) -> EnrichedOption {
        let title = summary
            .title
            .clone()
            .or_else(|| summary.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let overview = summary.overview.clone().unwrap_or_default();
        let image = self
            .poster_url(summary.poster_path.as_deref(), summary.backdrop_path.as_deref())
            .unwrap_or_else(|| gradient_image(&title));
        let tmdb_link = format!("https://www.themoviedb.org/{}/{}", kind.path(), summary.id);

        let mut extra = serde_json::Map::new();
        if let Some(year) = release_year(summary.release_date.as_deref(), summary.first_air_date.as_deref()) {
            extra.insert("year".into(), Value::String(year));
        }
        if let Some(avg) = summary.vote_average {
            extra.insert("rating".into(), Value::String(format!("{:.1}/10", avg)));
        }
        extra.insert("tmdbLink".into(), Value::String(tmdb_link.clone()));

        EnrichedOption {
            id: summary.id.to_string(),
            title,
            snippet: overview.clone(),
            description: Some(truncate_chars(&overview, 150)),
            image: Some(image),
            source_url: Some(tmdb_link),
            extra,
        }
    }

    fn poster_url(&self, poster: Option<&str>, backdrop: Option<&str>) -> Option<String> {
        poster
            .or(backdrop)
            .map(|path| format!("{}/w500{}", self.config.image_base, path))
    }

    fn service_list(&self, providers: &[ProviderRef]) -> Value {
        Value::Array(
            providers
                .iter()
                .map(|p| {
                    json!({
                        "name": p.provider_name,
                        "logo": p
                            .logo_path
                            .as_deref()
                            .map(|path| format!("{}/original{}", self.config.image_base, path)),
                        "id": p.provider_id,
                    })
                })
                .collect(),
        )
    }
}

/// Strip one trailing media noun (movie/film/show/series/tv), keep years
fn clean_search_query(query: &str) -> String {
    let trimmed = query.trim();
    if let Some((head, tail)) = trimmed.rsplit_once(char::is_whitespace) {
        let suffix = tail.to_ascii_lowercase();
        if matches!(suffix.as_str(), "movie" | "film" | "show" | "series" | "tv") {
            return head.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Remove a trailing 4-digit year; `None` when the query has none
fn strip_trailing_year(query: &str) -> Option<String> {
    let (head, tail) = query.trim().rsplit_once(char::is_whitespace)?;
    if tail.len() == 4 && tail.chars().all(|c| c.is_ascii_digit()) {
        Some(head.trim().to_string())
    } else {
        None
    }
}

fn release_year(release_date: Option<&str>, first_air_date: Option<&str>) -> Option<String> {
    release_date
        .or(first_air_date)
        .filter(|d| !d.is_empty())
        .and_then(|d| d.split('-').next())
        .map(str::to_string)
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
    use apphub_common::types::AnswerValue;

    #[test]
    fn cleaning_strips_media_nouns_but_keeps_years() {
        assert_eq!(clean_search_query("Inception movie"), "Inception");
        assert_eq!(clean_search_query("Severance TV"), "Severance");
        assert_eq!(clean_search_query("Inception 2010"), "Inception 2010");
        assert_eq!(clean_search_query("Dune"), "Dune");
    }

    #[test]
    fn year_stripping_only_matches_four_digits() {
        assert_eq!(strip_trailing_year("Inception 2010").as_deref(), Some("Inception"));
        assert_eq!(strip_trailing_year("Blade Runner 2049 2017").as_deref(), Some("Blade Runner 2049"));
        assert!(strip_trailing_year("Inception").is_none());
        assert!(strip_trailing_year("Area 51").is_none());
    }

    #[test]
    fn media_kind_from_answers() {
        let mut answers = Answers::new();
        assert_eq!(MediaKind::from_answers(&answers), MediaKind::Movie);
        answers.insert("mediaType".into(), AnswerValue::Text("series".into()));
        assert_eq!(MediaKind::from_answers(&answers), MediaKind::Tv);
        answers.insert("mediaType".into(), AnswerValue::Text("movie".into()));
        assert_eq!(MediaKind::from_answers(&answers), MediaKind::Movie);
    }

    #[test]
    fn details_map_to_an_enriched_option() {
        let client = FilmClient::new(reqwest::Client::new(), crate::config::FilmConfig::default());
        let details: TitleDetails = serde_json::from_value(json!({
            "id": 27205,
            "title": "Inception",
            "overview": "A thief who steals corporate secrets.",
            "tagline": "Your mind is the scene of the crime.",
            "poster_path": "/inception.jpg",
            "release_date": "2010-07-15",
            "vote_average": 8.37,
            "runtime": 148,
            "genres": [{"name": "Action"}, {"name": "Science Fiction"}],
            "credits": {"cast": [
                {"name": "Leonardo DiCaprio"}, {"name": "Joseph Gordon-Levitt"},
                {"name": "Elliot Page"}, {"name": "Tom Hardy"},
                {"name": "Ken Watanabe"}, {"name": "Cillian Murphy"}
            ]},
            "watch/providers": {"results": {"US": {
                "link": "https://www.themoviedb.org/movie/27205/watch",
                "flatrate": [{"provider_id": 8, "provider_name": "Netflix", "logo_path": "/nflx.jpg"}],
                "rent": [{"provider_id": 2, "provider_name": "Apple TV", "logo_path": "/atv.jpg"}]
            }}}
        }))
        .unwrap();

        let option = client.option_from_details(&details, MediaKind::Movie);
        assert_eq!(option.id, "27205");
        assert_eq!(option.title, "Inception");
        assert_eq!(option.extra["year"], "2010");
        assert_eq!(option.extra["rating"], "8.4/10");
        assert_eq!(option.extra["duration"], "148 min");
        assert_eq!(option.extra["genres"], "Action, Science Fiction");
        // Cast capped at 5 names
        let cast = option.extra["cast"].as_str().unwrap();
        assert_eq!(cast.split(", ").count(), 5);
        assert_eq!(
            option.image.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/inception.jpg")
        );
        assert_eq!(
            option.source_url.as_deref(),
            Some("https://www.themoviedb.org/movie/27205/watch")
        );
        let streaming = option.extra["streamingServices"].as_array().unwrap();
        assert_eq!(streaming[0]["name"], "Netflix");
        assert_eq!(
            streaming[0]["logo"],
            "https://image.tmdb.org/t/p/original/nflx.jpg"
        );
        assert_eq!(option.extra["rentalServices"].as_array().unwrap().len(), 1);
        assert_eq!(option.extra["purchaseServices"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn tv_details_use_name_and_first_air_date() {
        let client = FilmClient::new(reqwest::Client::new(), crate::config::FilmConfig::default());
        let details: TitleDetails = serde_json::from_value(json!({
            "id": 95396,
            "name": "Severance",
            "first_air_date": "2022-02-17"
        }))
        .unwrap();

        let option = client.option_from_details(&details, MediaKind::Tv);
        assert_eq!(option.title, "Severance");
        assert_eq!(option.extra["year"], "2022");
        assert_eq!(option.extra["tmdbLink"], "https://www.themoviedb.org/tv/95396");
    }

    #[test]
    fn hit_without_artwork_gets_a_placeholder_image() {
        let client = FilmClient::new(reqwest::Client::new(), crate::config::FilmConfig::default());
        let details: TitleDetails = serde_json::from_value(json!({
            "id": 42,
            "title": "Obscure Short",
            "release_date": "1998-01-01"
        }))
        .unwrap();

        let option = client.option_from_details(&details, MediaKind::Movie);
        // No poster or backdrop: the option still carries an image
        let image = option.image.as_deref().unwrap();
        assert!(image.starts_with("data:image/svg+xml;base64,"));
        // Deterministic: same title, same placeholder
        assert_eq!(image, gradient_image("Obscure Short"));
    }

    #[test]
    fn summary_mapping_degrades_gracefully() {
        let client = FilmClient::new(reqwest::Client::new(), crate::config::FilmConfig::default());
        let summary: TitleSummary = serde_json::from_value(json!({
            "id": 603,
            "title": "The Matrix",
            "overview": "A hacker learns the truth.",
            "backdrop_path": "/matrix.jpg",
            "release_date": "1999-03-30",
            "vote_average": 8.2
        }))
        .unwrap();

        let option = client.option_from_summary(&summary, MediaKind::Movie);
        assert_eq!(option.id, "603");
        assert_eq!(option.extra["year"], "1999");
        // Backdrop used when no poster exists
        assert_eq!(
            option.image.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/matrix.jpg")
        );
    }
}
