// ============================================================================
// Fakes pour les tests
// ============================================================================
// FakeApi et FakeTranslator répondent immédiatement depuis des tables
// préremplies et comptent les appels reçus.
// ============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{AnalysisRequest, HistoryQuery, MarketApi, Translator};
use crate::error::{ApiError, TranslationError};
use crate::i18n::Language;
use crate::models::{Asset, Candle, NewsItem};

#[derive(Default)]
pub struct FakeApi {
    pub quotes: Option<Result<Vec<Asset>, ApiError>>,
    pub ohlcv: HashMap<String, Result<Vec<Candle>, ApiError>>,
    pub analysis: HashMap<String, Result<String, ApiError>>,
    pub news: HashMap<String, Result<Vec<NewsItem>, ApiError>>,
    pub analysis_requests: Mutex<Vec<AnalysisRequest>>,
    pub news_calls: AtomicUsize,
}

impl FakeApi {
    pub fn with_quotes(assets: Vec<Asset>) -> Self {
        Self {
            quotes: Some(Ok(assets)),
            ..Self::default()
        }
    }

    pub fn history(mut self, symbol: &str, result: Result<Vec<Candle>, ApiError>) -> Self {
        self.ohlcv.insert(symbol.to_string(), result);
        self
    }

    pub fn analysis(mut self, symbol: &str, result: Result<String, ApiError>) -> Self {
        self.analysis.insert(symbol.to_string(), result);
        self
    }

    pub fn news(mut self, symbol: &str, result: Result<Vec<NewsItem>, ApiError>) -> Self {
        self.news.insert(symbol.to_string(), result);
        self
    }

    pub fn news_calls(&self) -> usize {
        self.news_calls.load(Ordering::SeqCst)
    }
}

fn missing(what: &str, symbol: &str) -> ApiError {
    ApiError::Network(format!("no fake {} for {}", what, symbol))
}

#[async_trait]
impl MarketApi for FakeApi {
    async fn fetch_quotes(&self) -> Result<Vec<Asset>, ApiError> {
        self.quotes
            .clone()
            .unwrap_or_else(|| Err(ApiError::Network("no fake quotes".to_string())))
    }

    async fn fetch_ohlcv(&self, symbol: &str, _query: &HistoryQuery) -> Result<Vec<Candle>, ApiError> {
        self.ohlcv
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Err(missing("ohlcv", symbol)))
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, ApiError> {
        if let Ok(mut requests) = self.analysis_requests.lock() {
            requests.push(request.clone());
        }
        self.analysis
            .get(&request.symbol)
            .cloned()
            .unwrap_or_else(|| Err(missing("analysis", &request.symbol)))
    }

    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, ApiError> {
        self.news_calls.fetch_add(1, Ordering::SeqCst);
        self.news
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Err(missing("news", symbol)))
    }
}

/// Traducteur qui préfixe le texte par la langue cible : "[fr] texte"
///
/// Un délai peut être associé à un texte pour forcer un ordre de complétion.
#[derive(Default)]
pub struct FakeTranslator {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub delays: HashMap<String, Duration>,
    pub completed: Mutex<Vec<String>>,
}

impl FakeTranslator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn delay(mut self, text: &str, delay: Duration) -> Self {
        self.delays.insert(text.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Textes dans l'ordre où leur traduction s'est terminée
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }
        if let Ok(mut completed) = self.completed.lock() {
            completed.push(text.to_string());
        }
        if self.fail {
            return Err(TranslationError::Status(503));
        }
        Ok(format!("[{}] {}", target.code(), text))
    }
}

/// Série de `len` chandelles journalières au close constant
pub fn flat_candles(len: usize, close: f64) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .map(|d| d + chrono::Duration::days(i as i64))
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            Candle::new(&date, close, close, close, close)
        })
        .collect()
}
