//! Recommendation orchestrator
//!
//! Single entry point for the survey flow: asks the chat model for
//! candidates, routes by category (and intent, for entertainment) to an
//! enrichment strategy, replaces model claims with verified catalog
//! data where a match exists, degrades to flagged AI fallbacks where it
//! does not, and pads short lists with provider popular results up to
//! the target count. Only the chat call and the response parse are
//! terminal; every catalog failure is absorbed into degraded output.
//!
//! Candidates are enriched one at a time, in list order. Latency grows
//! with candidate count, which the product accepts in exchange for
//! keeping the pipeline free of fan-out machinery.

use crate::config::ProvidersConfig;
use crate::error::RecError;
use crate::services::chat_client::ChatClient;
use crate::services::placeholder::gradient_image;
use crate::services::rawg_client::GameClient;
use crate::services::tmdb_client::{FilmClient, MediaKind};
use crate::services::yelp_client::DiningClient;
use crate::services::{build_http_client, CatalogError};
use apphub_common::types::{Answers, Category, EnrichedOption, Intent, RawCandidate};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

/// Guaranteed result count per orchestration call
const TARGET_COUNT: usize = 8;

/// Recommendation orchestrator
pub struct Recommender {
    chat: ChatClient,
    films: FilmClient,
    games: GameClient,
    dining: DiningClient,
}

impl Recommender {
    /// Build the pipeline from injected provider configuration
    pub fn new(config: &ProvidersConfig) -> Result<Self, CatalogError> {
        let http = build_http_client()?;
        Ok(Self {
            chat: ChatClient::new(http.clone(), config.chat.clone()),
            films: FilmClient::new(http.clone(), config.films.clone()),
            games: GameClient::new(http.clone(), config.games.clone()),
            dining: DiningClient::new(http, config.dining.clone()),
        })
    }

    /// Produce enriched recommendations for a completed survey
    pub async fn get_recommendations(
        &self,
        category: Category,
        answers: &Answers,
    ) -> Result<Vec<EnrichedOption>, RecError> {
        let candidates = self.chat.get_candidates(category, answers).await?;

        let mut options = match category {
            Category::Entertainment => self.enrich_entertainment(&candidates, answers).await,
            Category::Eat => self.enrich_dining(&candidates, answers).await,
            Category::Travel => enrich_travel(&candidates),
            Category::Gift | Category::Buy => enrich_shopping(&candidates),
        };

        options.truncate(TARGET_COUNT);

        info!(
            category = category.as_str(),
            count = options.len(),
            "Recommendations ready"
        );

        Ok(options)
    }

    async fn enrich_entertainment(
        &self,
        candidates: &[RawCandidate],
        answers: &Answers,
    ) -> Vec<EnrichedOption> {
        match Intent::from_answers(answers) {
            Intent::Watch => self.enrich_watch(candidates, answers).await,
            Intent::Play => self.enrich_play(candidates).await,
            Intent::Listen => enrich_listen(candidates),
            Intent::Read => enrich_read(candidates),
        }
    }

    /// Watch intent: verify each candidate against the film/TV catalog
    async fn enrich_watch(
        &self,
        candidates: &[RawCandidate],
        answers: &Answers,
    ) -> Vec<EnrichedOption> {
        let kind = MediaKind::from_answers(answers);
        let mut results = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            match self.films.search(&candidate.search_query, kind).await {
                Ok(Some(option)) => results.push(verified_option(candidate, option)),
                Ok(None) => results.push(watch_fallback(candidate)),
                Err(e) => {
                    warn!(title = %candidate.title, error = %e, "Film lookup failed, using AI fallback");
                    results.push(watch_fallback(candidate));
                }
            }
        }

        if results.len() < TARGET_COUNT {
            match self.films.popular(kind, TARGET_COUNT - results.len()).await {
                Ok(popular) => results.extend(popular),
                Err(e) => warn!(error = %e, "Popular film padding failed"),
            }
        }

        results
    }

    /// Play intent: verify each candidate against the game catalog
    async fn enrich_play(&self, candidates: &[RawCandidate]) -> Vec<EnrichedOption> {
        let mut results = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            match self.games.search(&candidate.search_query).await {
                Ok(Some(option)) => results.push(verified_option(candidate, option)),
                Ok(None) => results.push(play_fallback(candidate)),
                Err(e) => {
                    warn!(title = %candidate.title, error = %e, "Game lookup failed, using AI fallback");
                    results.push(play_fallback(candidate));
                }
            }
        }

        if results.len() < TARGET_COUNT {
            match self.games.popular(TARGET_COUNT - results.len()).await {
                Ok(popular) => results.extend(popular),
                Err(e) => warn!(error = %e, "Popular game padding failed"),
            }
        }

        results
    }

    /// Eat: one batch business search, topped up from the candidates
    async fn enrich_dining(
        &self,
        candidates: &[RawCandidate],
        answers: &Answers,
    ) -> Vec<EnrichedOption> {
        let cuisine = answers.get("cuisine");
        let term = cuisine
            .map(|v| v.joined())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "restaurants".to_string());
        // The categories filter wants bare-comma aliases, not prose
        let categories = cuisine.map(|v| v.csv()).filter(|s| !s.is_empty());
        let location = answers
            .get("location")
            .map(|v| v.joined())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.dining.default_location().to_string());

        let businesses = match self
            .dining
            .search_businesses(&term, &location, categories.as_deref(), TARGET_COUNT)
            .await
        {
            Ok(businesses) => businesses,
            Err(e) => {
                warn!(error = %e, "Business search failed, using AI fallback");
                Vec::new()
            }
        };

        if businesses.is_empty() {
            return enrich_generic(candidates);
        }

        let mut results = businesses;
        if results.len() < TARGET_COUNT {
            let needed = TARGET_COUNT - results.len();
            results.extend(candidates.iter().take(needed).map(generic_option));
        }
        results
    }
}

/// Merge a catalog hit with its originating candidate: verified catalog
/// data wins, but the snippet stays the model's reason so the
/// personalization context survives enrichment
fn verified_option(candidate: &RawCandidate, mut option: EnrichedOption) -> EnrichedOption {
    option.snippet = candidate.reason.clone();
    option
}

/// AI fallback for the watch path, flagged so the UI can mark it unverified
fn watch_fallback(candidate: &RawCandidate) -> EnrichedOption {
    let source_url = format!(
        "https://www.themoviedb.org/search?query={}",
        urlencoding::encode(&candidate.title)
    );
    let mut option = ai_option(candidate, "ai", &candidate.search_query, Some(source_url));
    option
        .extra
        .insert("aiGenerated".into(), Value::Bool(true));
    option
}

/// AI fallback for the play path
fn play_fallback(candidate: &RawCandidate) -> EnrichedOption {
    let source_url = format!(
        "https://rawg.io/search?query={}",
        urlencoding::encode(&candidate.title)
    );
    let image_query = format!("{} video game", candidate.search_query);
    let mut option = ai_option(candidate, "ai", &image_query, Some(source_url));
    option
        .extra
        .insert("aiGenerated".into(), Value::Bool(true));
    option
}

/// Listen intent: AI data with music-flavored placeholder imagery
fn enrich_listen(candidates: &[RawCandidate]) -> Vec<EnrichedOption> {
    candidates
        .iter()
        .map(|candidate| {
            let source_url = format!(
                "https://www.youtube.com/results?search_query={}",
                urlencoding::encode(&candidate.title)
            );
            let image_query = format!("{} music album", candidate.search_query);
            let mut option = ai_option(candidate, "music", &image_query, Some(source_url));
            option.extra.insert("aiGenerated".into(), Value::Bool(true));
            option.extra.insert("type".into(), Value::String("music".into()));
            option
        })
        .collect()
}

/// Read intent: AI data with book-flavored placeholder imagery
fn enrich_read(candidates: &[RawCandidate]) -> Vec<EnrichedOption> {
    candidates
        .iter()
        .map(|candidate| {
            let source_url = format!(
                "https://www.goodreads.com/search?q={}",
                urlencoding::encode(&candidate.title)
            );
            let image_query = format!("{} book cover", candidate.search_query);
            let mut option = ai_option(candidate, "book", &image_query, Some(source_url));
            option.extra.insert("aiGenerated".into(), Value::Bool(true));
            option.extra.insert("type".into(), Value::String("book".into()));
            option
        })
        .collect()
}

fn enrich_travel(candidates: &[RawCandidate]) -> Vec<EnrichedOption> {
    candidates
        .iter()
        .map(|candidate| {
            let image_query = format!("{} travel destination", candidate.search_query);
            let mut option = ai_option(candidate, "travel", &image_query, None);
            option
                .extra
                .insert("type".into(), Value::String("destination".into()));
            option
        })
        .collect()
}

fn enrich_shopping(candidates: &[RawCandidate]) -> Vec<EnrichedOption> {
    candidates
        .iter()
        .map(|candidate| {
            let mut option = ai_option(candidate, "shop", &candidate.search_query, None);
            option.extra.insert(
                "searchQuery".into(),
                Value::String(candidate.search_query.clone()),
            );
            option
        })
        .collect()
}

fn enrich_generic(candidates: &[RawCandidate]) -> Vec<EnrichedOption> {
    candidates.iter().map(generic_option).collect()
}

fn generic_option(candidate: &RawCandidate) -> EnrichedOption {
    ai_option(candidate, "gen", &candidate.search_query, None)
}

/// Build an option straight from a candidate: synthetic unique id,
/// the model's reason as snippet, and a gradient placeholder image
fn ai_option(
    candidate: &RawCandidate,
    id_prefix: &str,
    image_query: &str,
    source_url: Option<String>,
) -> EnrichedOption {
    EnrichedOption {
        id: format!("{}-{}", id_prefix, Uuid::new_v4()),
        title: candidate.title.clone(),
        snippet: candidate.reason.clone(),
        description: Some(candidate.description.clone()),
        image: Some(gradient_image(image_query)),
        source_url,
        extra: serde_json::Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apphub_common::types::AnswerValue;
    use std::collections::HashSet;

    fn candidate(title: &str) -> RawCandidate {
        RawCandidate {
            title: title.to_string(),
            description: format!("{} description", title),
            reason: format!("because you asked about {}", title),
            search_query: title.to_string(),
        }
    }

    fn candidates(count: usize) -> Vec<RawCandidate> {
        (0..count).map(|i| candidate(&format!("Pick {}", i))).collect()
    }

    fn unconfigured() -> Recommender {
        Recommender::new(&ProvidersConfig::default()).unwrap()
    }

    #[test]
    fn watch_fallback_is_flagged_and_complete() {
        let option = watch_fallback(&candidate("Inception"));
        assert!(option.id.starts_with("ai-"));
        assert!(option.is_ai_generated());
        assert_eq!(option.snippet, "because you asked about Inception");
        assert!(option.image.as_deref().unwrap().starts_with("data:image/svg+xml"));
        assert!(option
            .source_url
            .as_deref()
            .unwrap()
            .contains("themoviedb.org/search"));
    }

    #[test]
    fn catalog_hits_keep_the_model_reason_as_snippet() {
        let candidate = candidate("Inception");
        let mut extra = serde_json::Map::new();
        extra.insert("year".into(), Value::String("2010".into()));
        let hit = EnrichedOption {
            id: "27205".into(),
            title: "Inception".into(),
            snippet: "A thief who steals corporate secrets.".into(),
            description: Some("Your mind is the scene of the crime.".into()),
            image: Some("https://image.tmdb.org/t/p/w500/inception.jpg".into()),
            source_url: Some("https://www.themoviedb.org/movie/27205".into()),
            extra,
        };

        let merged = verified_option(&candidate, hit);
        // Catalog fields survive, only the snippet is replaced
        assert_eq!(merged.snippet, "because you asked about Inception");
        assert_eq!(merged.id, "27205");
        assert_eq!(merged.title, "Inception");
        assert_eq!(merged.extra["year"], "2010");
        assert_eq!(
            merged.description.as_deref(),
            Some("Your mind is the scene of the crime.")
        );
        assert!(!merged.is_ai_generated());
    }

    #[test]
    fn search_links_are_url_encoded() {
        let option = watch_fallback(&candidate("Crouching Tiger, Hidden Dragon"));
        let url = option.source_url.unwrap();
        assert!(url.contains("Crouching%20Tiger%2C%20Hidden%20Dragon"));
    }

    #[test]
    fn listen_and_read_carry_type_tags() {
        let listen = enrich_listen(&candidates(2));
        assert_eq!(listen.len(), 2);
        assert!(listen[0].id.starts_with("music-"));
        assert_eq!(listen[0].extra["type"], "music");
        assert!(listen[0].is_ai_generated());

        let read = enrich_read(&candidates(1));
        assert!(read[0].id.starts_with("book-"));
        assert_eq!(read[0].extra["type"], "book");
        assert!(read[0]
            .source_url
            .as_deref()
            .unwrap()
            .contains("goodreads.com"));
    }

    #[test]
    fn travel_and_shopping_are_not_flagged() {
        let travel = enrich_travel(&candidates(3));
        assert!(travel[0].id.starts_with("travel-"));
        assert_eq!(travel[0].extra["type"], "destination");
        assert!(!travel[0].is_ai_generated());

        let shopping = enrich_shopping(&candidates(3));
        assert!(shopping[0].id.starts_with("shop-"));
        assert_eq!(shopping[0].extra["searchQuery"], "Pick 0");
        assert!(!shopping[0].is_ai_generated());
    }

    #[test]
    fn fallback_ids_are_unique() {
        let options: Vec<EnrichedOption> =
            candidates(8).iter().map(generic_option).collect();
        let ids: HashSet<&str> = options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids.len(), 8);
    }

    #[tokio::test]
    async fn watch_without_catalog_keys_yields_eight_fallbacks() {
        // No TMDB key: every search self-disables to no-match and the
        // popular padding is empty, so all 8 slots are AI fallbacks.
        let recommender = unconfigured();
        let answers = Answers::new();
        let results = recommender.enrich_watch(&candidates(8), &answers).await;
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|o| o.is_ai_generated()));
        // Input candidate order is preserved
        assert_eq!(results[0].title, "Pick 0");
        assert_eq!(results[7].title, "Pick 7");
    }

    #[tokio::test]
    async fn dining_without_keys_degrades_to_generic() {
        let recommender = unconfigured();
        let mut answers = Answers::new();
        answers.insert(
            "cuisine".into(),
            AnswerValue::List(vec!["italian".into(), "asian".into()]),
        );
        let results = recommender.enrich_dining(&candidates(8), &answers).await;
        assert_eq!(results.len(), 8);
        // Generic dining fallback is unflagged, matching the original path
        assert!(results.iter().all(|o| !o.is_ai_generated()));
        assert!(results.iter().all(|o| o.id.starts_with("gen-")));
    }

    #[tokio::test]
    async fn unconfigured_chat_rejects_before_any_enrichment() {
        let recommender = unconfigured();
        let err = recommender
            .get_recommendations(Category::Travel, &Answers::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RecError::Config(_)));
    }
}
