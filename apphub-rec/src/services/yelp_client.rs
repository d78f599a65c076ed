//! Business search client (Yelp)
//!
//! Single-call search, no separate detail fetch. The search is
//! location-scoped; callers without a user location get the configured
//! fallback. A configured proxy URL replaces the base URL entirely for
//! deployments that cannot reach the provider directly.

use crate::config::DiningConfig;
use crate::services::placeholder::gradient_image;
use crate::services::CatalogError;
use apphub_common::config::is_valid_key;
use apphub_common::types::EnrichedOption;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct BusinessSearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Debug, Deserialize)]
struct Business {
    id: String,
    name: String,
    url: Option<String>,
    image_url: Option<String>,
    rating: Option<f64>,
    price: Option<String>,
    phone: Option<String>,
    review_count: Option<i64>,
    location: Option<BusinessLocation>,
    #[serde(default)]
    categories: Vec<BusinessCategory>,
}

#[derive(Debug, Deserialize)]
struct BusinessLocation {
    address1: Option<String>,
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BusinessCategory {
    title: String,
}

/// Business search client
pub struct DiningClient {
    http: reqwest::Client,
    config: DiningConfig,
}

impl DiningClient {
    pub fn new(http: reqwest::Client, config: DiningConfig) -> Self {
        Self { http, config }
    }

    /// Fallback location used when the survey carries none
    pub fn default_location(&self) -> &str {
        &self.config.default_location
    }

    /// Location-scoped business search
    ///
    /// Returns up to `limit` businesses; an unconfigured key
    /// short-circuits to an empty list.
    pub async fn search_businesses(
        &self,
        term: &str,
        location: &str,
        categories: Option<&str>,
        limit: usize,
    ) -> Result<Vec<EnrichedOption>, CatalogError> {
        if !is_valid_key(&self.config.api_key) {
            warn!("Yelp API key not configured, skipping business search");
            return Ok(Vec::new());
        }

        let base = self
            .config
            .proxy_url
            .as_deref()
            .unwrap_or(&self.config.base_url);
        let url = format!("{}/businesses/search", base);

        debug!(term = %term, location = %location, "Yelp business search");

        let limit = limit.to_string();
        let mut params = vec![
            ("term", term),
            ("location", location),
            ("limit", limit.as_str()),
        ];
        if let Some(categories) = categories.filter(|c| !c.is_empty()) {
            params.push(("categories", categories));
        }

        let response = self
            .http
            .get(&url)
            .query(&params)
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        let page: BusinessSearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(page.businesses.iter().map(option_from_business).collect())
    }
}

fn option_from_business(business: &Business) -> EnrichedOption {
    let categories = business
        .categories
        .iter()
        .map(|c| c.title.clone())
        .collect::<Vec<_>>()
        .join(", ");
    let rating = business.rating.unwrap_or(0.0);
    let price = business.price.as_deref().unwrap_or("$$");
    let city = business
        .location
        .as_ref()
        .and_then(|l| l.city.clone())
        .unwrap_or_default();

    let mut extra = serde_json::Map::new();
    extra.insert("rating".into(), Value::String(format!("{}/5", rating)));
    if let Some(price) = &business.price {
        extra.insert("price".into(), Value::String(price.clone()));
    }
    if let Some(phone) = &business.phone {
        extra.insert("phone".into(), Value::String(phone.clone()));
    }
    if let Some(address) = business.location.as_ref().and_then(|l| l.address1.clone()) {
        extra.insert("address".into(), Value::String(address));
    }
    if !city.is_empty() {
        extra.insert("city".into(), Value::String(city.clone()));
    }
    if let Some(count) = business.review_count {
        extra.insert("reviewCount".into(), Value::Number(count.into()));
    }
    if !categories.is_empty() {
        extra.insert("categories".into(), Value::String(categories.clone()));
    }

    EnrichedOption {
        id: business.id.clone(),
        title: business.name.clone(),
        snippet: categories,
        description: Some(format!("{} ⭐ • {} • {}", rating, price, city)),
        image: Some(
            business
                .image_url
                .clone()
                .unwrap_or_else(|| gradient_image(&business.name)),
        ),
        source_url: business.url.clone(),
        extra,
    }
}
