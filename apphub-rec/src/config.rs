//! Provider configuration for apphub-rec
//!
//! Every external collaborator (chat completion, film/TV catalog, game
//! catalog, business search) is configured here. The struct is loaded
//! once at startup with ENV > TOML priority and injected into the
//! clients; leaf code never reads environment state directly.

use apphub_common::config::{config_path, is_valid_key, load_toml_config};
use apphub_common::Result;
use serde::Deserialize;
use tracing::info;

/// Chat-completion provider settings (Groq-compatible endpoint)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_key: String,
    pub url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 2000,
            // Elevated for variety; the product wants re-rolls to differ
            temperature: 1.2,
        }
    }
}

/// Film/TV catalog settings (TMDB)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilmConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base: String,
}

impl Default for FilmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base: "https://image.tmdb.org/t/p".to_string(),
        }
    }
}

/// Game catalog settings (RAWG)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.rawg.io/api".to_string(),
        }
    }
}

/// Business search settings (Yelp)
///
/// `proxy_url`, when set, replaces the base URL entirely; deployments
/// behind browser CORS restrictions route through their own proxy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiningConfig {
    pub api_key: String,
    pub base_url: String,
    pub proxy_url: Option<String>,
    pub default_location: String,
}

impl Default for DiningConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.yelp.com/v3".to_string(),
            proxy_url: None,
            default_location: "San Francisco, CA".to_string(),
        }
    }
}

/// Full provider configuration for the recommendation service
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub chat: ChatConfig,
    pub films: FilmConfig,
    pub games: GameConfig,
    pub dining: DiningConfig,
}

impl ProvidersConfig {
    /// Load from the service TOML file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = config_path("apphub-rec");
        let mut config: ProvidersConfig = load_toml_config(&path)?;
        config.apply_env_overrides();
        config.log_key_status();
        Ok(config)
    }

    /// Environment variables take priority over the TOML file
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("APPHUB_CHAT_API_KEY") {
            self.chat.api_key = key;
        }
        if let Ok(key) = std::env::var("APPHUB_TMDB_API_KEY") {
            self.films.api_key = key;
        }
        if let Ok(key) = std::env::var("APPHUB_RAWG_API_KEY") {
            self.games.api_key = key;
        }
        if let Ok(key) = std::env::var("APPHUB_YELP_API_KEY") {
            self.dining.api_key = key;
        }
        if let Ok(url) = std::env::var("APPHUB_YELP_PROXY_URL") {
            if !url.trim().is_empty() {
                self.dining.proxy_url = Some(url);
            }
        }
    }

    fn log_key_status(&self) {
        info!(
            chat = self.chat_configured(),
            films = self.films_configured(),
            games = self.games_configured(),
            dining = self.dining_configured(),
            "Provider key status"
        );
    }

    pub fn chat_configured(&self) -> bool {
        is_valid_key(&self.chat.api_key)
    }

    pub fn films_configured(&self) -> bool {
        is_valid_key(&self.films.api_key)
    }

    pub fn games_configured(&self) -> bool {
        is_valid_key(&self.games.api_key)
    }

    pub fn dining_configured(&self) -> bool {
        is_valid_key(&self.dining.api_key)
    }
}
