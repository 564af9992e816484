// ============================================================================
// API Client : backend HTTP
// ============================================================================
// Implémentation reqwest de MarketApi :
// - GET  {base}/quotes
// - GET  {base}/ohlcv?symbol&interval&outputsize
// - POST {base}/ai/analyze
// - GET  {base}/news?symbol
//
// CONCEPTS RUST :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Serde : désérialisation JSON automatique
// 3. #[instrument] : un span tracing par appel, avec ses paramètres
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::api::{AnalysisRequest, HistoryQuery, MarketApi};
use crate::error::ApiError;
use crate::models::{Asset, Candle, NewsItem};

// ============================================================================
// Structures pour parser les réponses JSON
// ============================================================================

/// Réponse de GET /ohlcv
///
/// `values` absent ou vide = pas de données (pas une erreur de transport)
#[derive(Debug, Deserialize)]
struct OhlcvResponse {
    #[serde(default)]
    values: Option<Vec<Candle>>,
}

/// Réponse de POST /ai/analyze
#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    analysis: String,
}

/// Réponse de GET /news
#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

// ============================================================================
// Client
// ============================================================================

/// Client du backend
///
/// CONCEPT RUST : Client réutilisable
/// - reqwest::Client garde un pool de connexions
/// - Cloner un Client est peu coûteux (Arc interne)
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Crée un client pour `base_url` (ex: "http://localhost:3000/api")
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        debug!(base_url, ?timeout, "Creating HTTP client");
        let client = Client::builder()
            .user_agent(concat!("coinpulse/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Construit l'URL complète d'un endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Vérifie le statut HTTP puis désérialise le JSON
    async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, ApiError> {
        let status = response.status();
        debug!(status = %status, endpoint, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, endpoint, "Backend returned error status");
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{}: {}", endpoint, e)))
    }
}

#[async_trait]
impl MarketApi for HttpApi {
    #[instrument(skip(self))]
    async fn fetch_quotes(&self) -> Result<Vec<Asset>, ApiError> {
        let response = self.client.get(self.url("/quotes")).send().await?;
        let assets: Vec<Asset> = Self::decode(response, "/quotes").await?;

        info!(assets = assets.len(), "Fetched quote list");
        Ok(assets)
    }

    #[instrument(skip(self, query), fields(interval = %query.interval, outputsize = query.outputsize))]
    async fn fetch_ohlcv(&self, symbol: &str, query: &HistoryQuery) -> Result<Vec<Candle>, ApiError> {
        let outputsize = query.outputsize.to_string();
        let response = self
            .client
            .get(self.url("/ohlcv"))
            .query(&[
                ("symbol", symbol),
                ("interval", query.interval.as_str()),
                ("outputsize", outputsize.as_str()),
            ])
            .send()
            .await?;

        let body: OhlcvResponse = Self::decode(response, "/ohlcv").await?;
        let candles = body.values.unwrap_or_default();

        info!(candles = candles.len(), "Fetched OHLCV history");
        Ok(candles)
    }

    #[instrument(skip(self, request), fields(symbol = %request.symbol, news = request.news.len()))]
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("/ai/analyze"))
            .json(request)
            .send()
            .await?;

        let body: AnalysisResponse = Self::decode(response, "/ai/analyze").await?;

        info!(chars = body.analysis.chars().count(), "Fetched AI analysis");
        Ok(body.analysis)
    }

    #[instrument(skip(self))]
    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, ApiError> {
        let response = self
            .client
            .get(self.url("/news"))
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        let body: NewsResponse = Self::decode(response, "/news").await?;

        info!(items = body.news.len(), "Fetched news");
        Ok(body.news)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trims_trailing_slash() {
        let api = HttpApi::new("http://localhost:3000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.url("/quotes"), "http://localhost:3000/api/quotes");
    }

    #[test]
    fn test_ohlcv_missing_values_is_no_data() {
        let body: OhlcvResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(body.values.unwrap_or_default().is_empty());

        let body: OhlcvResponse = serde_json::from_str(r#"{"values":[]}"#).unwrap();
        assert!(body.values.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_ohlcv_values_parsed() {
        let json = r#"{"values":[
            {"datetime":"2024-05-02","open":"2","high":"2","low":"2","close":"2","volume":"10"},
            {"datetime":"2024-05-01","open":1,"high":1,"low":1,"close":1}
        ]}"#;
        let body: OhlcvResponse = serde_json::from_str(json).unwrap();
        let values = body.values.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].close, 2.0);
        assert_eq!(values[1].volume, None);
    }

    #[test]
    fn test_news_response_parsed() {
        let json = r#"{"news":[{"title":"BTC rallies","url":"https://example.com/a"}]}"#;
        let body: NewsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.news, vec![NewsItem::new("BTC rallies", "https://example.com/a")]);
    }

    // Test async nécessite tokio test runtime
    // Backend injoignable : l'erreur doit être une erreur réseau typée
    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let api = HttpApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        match api.fetch_quotes().await {
            Err(ApiError::Network(_)) => {}
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
