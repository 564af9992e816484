// ============================================================================
// Module : api
// ============================================================================
// Clients des services externes. Les fetchers sont sans état : une requête,
// une réponse, rien de retenu entre deux appels.
//
// CONCEPT RUST : trait async (async-trait)
// - MarketApi est le point de couture entre l'orchestrateur et le réseau
// - HttpApi l'implémente avec reqwest ; les tests utilisent un fake
// ============================================================================

pub mod http;
pub mod translate;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{Asset, Candle, IndicatorSnapshot, NewsItem};

pub use http::HttpApi;
pub use translate::{GoogleTranslator, Translator};

/// Paramètres d'historique envoyés à GET /ohlcv
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Intervalle des chandelles (ex: "1day", "4h")
    pub interval: String,
    /// Nombre de chandelles demandées
    pub outputsize: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            interval: "1day".to_string(),
            // 200 minimum pour la SMA 200, un peu de marge en plus
            outputsize: 300,
        }
    }
}

/// Corps de POST /ai/analyze
///
/// Les indicateurs sont arrondis ici, à la frontière, et valent null quand
/// ils sont indisponibles. `volume` est toujours null : l'indicateur de
/// volume n'est pas calculé.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub symbol: String,
    pub current_price: f64,
    pub percent_change_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub volume: Option<f64>,
    pub news: Vec<NewsItem>,
}

impl AnalysisRequest {
    /// Assemble la requête depuis l'actif, ses indicateurs et les news connues
    pub fn new(asset: &Asset, indicators: &IndicatorSnapshot, news: Vec<NewsItem>) -> Self {
        let rounded = indicators.rounded();

        Self {
            symbol: asset.symbol.clone(),
            current_price: asset.price,
            percent_change_24h: asset.change_24h,
            market_cap: asset.market_cap,
            rsi: rounded.rsi,
            macd: rounded.macd,
            sma50: rounded.sma50,
            sma200: rounded.sma200,
            volume: None,
            news,
        }
    }
}

/// Services backend consommés par l'orchestrateur
///
/// MarketDataFetcher : fetch_quotes + fetch_ohlcv
/// AnalysisFetcher : analyze
/// NewsFetcher : fetch_news
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// GET /quotes : liste des actifs (ordre quelconque)
    async fn fetch_quotes(&self) -> Result<Vec<Asset>, ApiError>;

    /// GET /ohlcv : chandelles brutes, non triées ; vide = pas de données
    async fn fetch_ohlcv(&self, symbol: &str, query: &HistoryQuery) -> Result<Vec<Candle>, ApiError>;

    /// POST /ai/analyze : texte libre en langue source
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, ApiError>;

    /// GET /news : actualités récentes de l'actif
    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::sample_asset;

    #[test]
    fn test_analysis_request_body() {
        let asset = sample_asset("BTC", 1);
        let indicators = IndicatorSnapshot {
            rsi: Some(61.23456),
            macd: Some(0.123456),
            sma50: Some(99.99999),
            ..IndicatorSnapshot::unavailable()
        };

        let request = AnalysisRequest::new(&asset, &indicators, vec![NewsItem::new("t", "u")]);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["symbol"], "BTC");
        assert_eq!(body["currentPrice"], 100.0);
        assert_eq!(body["percentChange24h"], -1.5);
        assert_eq!(body["rsi"], 61.23);
        assert_eq!(body["macd"], 0.1235);
        assert_eq!(body["sma50"], 100.0);
        assert!(body["sma200"].is_null());
        assert!(body["volume"].is_null());
        assert_eq!(body["news"][0]["title"], "t");
    }
}
