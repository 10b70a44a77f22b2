// Client for the hosted keyword-suggestion function. The suggestion is an
// optional enrichment: every failure path (unconfigured endpoint, timeout,
// HTTP error, malformed body) degrades to the empty response and the search
// proceeds on plain keyword matching.

use crate::config::Settings;
use crate::models::{AiResponse, VehicleProfile};
use crate::normalize::normalize;
use cached::{Cached, TimedSizedCache};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::json;
use std::sync::Mutex;
use thiserror::Error;
use tokio::time::{timeout, Duration};

const CACHE_SIZE: usize = 200;
const CACHE_TTL_SECS: u64 = 600;

// Suggestions are billed per call; identical queries within the TTL reuse
// the cached answer.
static SUGGESTION_CACHE: Lazy<Mutex<TimedSizedCache<String, AiResponse>>> =
    Lazy::new(|| Mutex::new(TimedSizedCache::with_size_and_lifespan(CACHE_SIZE, CACHE_TTL_SECS)));

#[derive(Debug, Error)]
enum SuggestError {
    #[error("suggester endpoint not configured")]
    Unconfigured,
    #[error("suggestion request timed out after {0}s")]
    Timeout(u64),
    #[error("suggestion request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Asks the suggestion service for a part type, rationale, and keyword list
/// for `query`. Never fails: any error is logged and traded for
/// `AiResponse::default()`. Single attempt, bounded by the configured
/// timeout.
pub async fn fetch_suggestion(
    client: &Client,
    settings: &Settings,
    query: &str,
    vehicle: Option<&VehicleProfile>,
) -> AiResponse {
    let cache_key = cache_key(query, vehicle);
    if let Ok(mut cache) = SUGGESTION_CACHE.lock() {
        if let Some(hit) = cache.cache_get(&cache_key) {
            tracing::debug!(query, "Suggestion cache hit");
            return hit.clone();
        }
    }

    match request_suggestion(client, settings, query, vehicle).await {
        Ok(response) => {
            if let Ok(mut cache) = SUGGESTION_CACHE.lock() {
                cache.cache_set(cache_key, response.clone());
            }
            response
        }
        Err(e) => {
            tracing::warn!(query, error = %e, "Keyword suggestion unavailable, degrading to plain search");
            AiResponse::default()
        }
    }
}

async fn request_suggestion(
    client: &Client,
    settings: &Settings,
    query: &str,
    vehicle: Option<&VehicleProfile>,
) -> Result<AiResponse, SuggestError> {
    let url = settings
        .suggester_url
        .as_deref()
        .ok_or(SuggestError::Unconfigured)?;

    let payload = json!({
        "query": query,
        "vehicle": vehicle,
    });

    let mut request = client.post(url).json(&payload);
    if let Some(api_key) = settings.suggester_api_key.as_deref() {
        request = request.bearer_auth(api_key);
    }

    let deadline = Duration::from_secs(settings.suggester_timeout_secs);
    let response = timeout(deadline, request.send())
        .await
        .map_err(|_| SuggestError::Timeout(settings.suggester_timeout_secs))??
        .error_for_status()?;

    let suggestion = timeout(deadline, response.json::<AiResponse>())
        .await
        .map_err(|_| SuggestError::Timeout(settings.suggester_timeout_secs))??;

    tracing::debug!(
        query,
        part_type = %suggestion.suggested_part_type,
        keywords = suggestion.keywords.len(),
        "Received keyword suggestion"
    );
    Ok(suggestion)
}

fn cache_key(query: &str, vehicle: Option<&VehicleProfile>) -> String {
    let model = vehicle.map(|v| normalize(&v.model)).unwrap_or_default();
    format!("{}|{}", normalize(query.trim()), model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_ignores_case_and_accents() {
        assert_eq!(cache_key("Freio Tração", None), cache_key("freio tracao", None));
    }

    #[test]
    fn cache_key_separates_vehicles() {
        let onix = VehicleProfile {
            model: "Onix".to_string(),
            ..Default::default()
        };
        let gol = VehicleProfile {
            model: "Gol".to_string(),
            ..Default::default()
        };
        assert_ne!(cache_key("freio", Some(&onix)), cache_key("freio", Some(&gol)));
    }

    #[tokio::test]
    async fn unconfigured_endpoint_degrades_to_empty_response() {
        let settings = Settings {
            server_address: "127.0.0.1:0".to_string(),
            firebase_project_id: None,
            suggester_url: None,
            suggester_api_key: None,
            suggester_timeout_secs: 1,
        };
        let client = Client::new();
        let response = fetch_suggestion(&client, &settings, "freio dianteiro", None).await;
        assert!(response.suggested_part_type.is_empty());
        assert!(response.keywords.is_empty());
    }
}
