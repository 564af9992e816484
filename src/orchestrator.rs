// ============================================================================
// SelectionOrchestrator : machine à états du pipeline de données
// ============================================================================
// Coordonne : liste des actifs → historique OHLCV → indicateurs →
// (analyse IA ∥ news) → traduction → typewriter.
//
// PATTERN : un seul écrivain
// - Les tâches réseau ne touchent jamais l'état : elles renvoient des
//   messages `Outcome` sur un canal mpsc
// - `apply()` est le seul endroit où l'état change
// - Chaque message porte l'étiquette du cycle qui l'a produit ; un message
//   d'un cycle périmé est jeté sans bruit (génération différente)
//
// Les requêtes en vol ne sont jamais annulées côté transport : seuls leurs
// résultats sont ignorés. Le timer du typewriter est la seule ressource
// libérée explicitement.
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::api::{AnalysisRequest, HistoryQuery, MarketApi, Translator};
use crate::error::{ApiError, CycleError};
use crate::i18n::Language;
use crate::indicators;
use crate::models::ohlc::closes;
use crate::models::{prepare_asset_list, price_points, Asset, IndicatorSnapshot, NewsItem, PricePoint};
use crate::translation::{TitleCache, TranslationService};
use crate::typewriter::{Tick, TimerHandle, Typewriter, DEFAULT_CADENCE};

/// Résumé affiché quand l'historique est vide ou n'a pas pu être chargé
pub const NO_DATA_SUMMARY: &str = "No market data is available for this asset right now.";

// ============================================================================
// Configuration et états
// ============================================================================

/// Réglages du pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    pub history: HistoryQuery,
    pub typewriter_cadence: Duration,
    pub initial_language: Language,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history: HistoryQuery::default(),
            typewriter_cadence: DEFAULT_CADENCE,
            initial_language: Language::default(),
        }
    }
}

/// Sélection active : l'unique déclencheur des cycles de chargement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub symbol: Option<String>,
    pub language: Language,
    /// Incrémentée à chaque nouveau cycle de détail
    pub generation: u64,
}

/// États de la machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingQuotes,
    /// Échec du chargement initial : terminal, pas de retry
    QuotesFailed { reason: String },
    QuotesReady,
    LoadingDetail { symbol: String },
    DetailReady { symbol: String },
    DetailFailed { symbol: String, reason: String },
}

/// État d'un emplacement chargé de façon indépendante (résumé, news)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SlotStatus {
    #[default]
    Empty,
    Pending,
    Ready,
    Failed(String),
    /// Pas de requête : historique vide ou en échec
    Skipped,
}

impl SlotStatus {
    fn is_settled(&self) -> bool {
        !matches!(self, SlotStatus::Pending)
    }
}

/// Étiquette d'un cycle de détail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTag {
    pub generation: u64,
    pub symbol: String,
}

/// Étiquette d'une traduction : (langue, révision du contenu) au lancement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationTag {
    pub language: Language,
    pub revision: u64,
}

/// Historique préparé par la tâche de détail
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub points: Vec<PricePoint>,
    pub indicators: IndicatorSnapshot,
}

/// Messages renvoyés par les tâches asynchrones
#[derive(Debug)]
pub enum Outcome {
    QuotesLoaded(Result<Vec<Asset>, ApiError>),
    HistoryLoaded {
        tag: CycleTag,
        result: Result<History, ApiError>,
    },
    AnalysisLoaded {
        tag: CycleTag,
        result: Result<String, ApiError>,
    },
    NewsLoaded {
        tag: CycleTag,
        result: Result<Vec<NewsItem>, ApiError>,
    },
    SummaryTranslated {
        tag: TranslationTag,
        text: String,
    },
    /// Un titre à None est retombé sur l'original
    TitlesTranslated {
        tag: TranslationTag,
        titles: Vec<Option<String>>,
    },
    TypewriterTick {
        generation: u64,
    },
}

impl Outcome {
    /// Étiquette de cycle, pour les messages qui en portent une
    pub fn cycle(&self) -> Option<&CycleTag> {
        match self {
            Outcome::HistoryLoaded { tag, .. }
            | Outcome::AnalysisLoaded { tag, .. }
            | Outcome::NewsLoaded { tag, .. } => Some(tag),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct SummarySlot {
    /// Texte brut en langue source (ou placeholder)
    raw: Option<String>,
    status: SlotStatus,
    revision: u64,
}

#[derive(Debug, Default)]
struct NewsSlot {
    /// Symbole pour lequel `items` a été chargé
    symbol: Option<String>,
    items: Vec<NewsItem>,
    /// Titres affichés, même ordre que `items`
    titles: Vec<String>,
    status: SlotStatus,
    cache: TitleCache,
    revision: u64,
}

// ============================================================================
// Orchestrateur
// ============================================================================

/// Propriétaire exclusif de la sélection et des caches dérivés
pub struct Orchestrator {
    api: Arc<dyn MarketApi>,
    translation: TranslationService,
    settings: Settings,
    outcome_tx: UnboundedSender<Outcome>,

    selection: SelectionState,
    phase: Phase,
    assets: Vec<Asset>,
    chart: Vec<PricePoint>,
    indicators: IndicatorSnapshot,
    summary: SummarySlot,
    news: NewsSlot,
    /// Erreur visible (liste d'actifs ou historique)
    error: Option<String>,

    typewriter: Typewriter,
    timer: Option<TimerHandle>,
}

impl Orchestrator {
    /// Crée l'orchestrateur et le récepteur des messages de ses tâches
    ///
    /// L'appelant doit repasser chaque message reçu à `apply()`.
    pub fn new(
        api: Arc<dyn MarketApi>,
        translator: Arc<dyn Translator>,
        settings: Settings,
    ) -> (Self, UnboundedReceiver<Outcome>) {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let orchestrator = Self {
            api,
            translation: TranslationService::new(translator),
            selection: SelectionState {
                symbol: None,
                language: settings.initial_language,
                generation: 0,
            },
            settings,
            outcome_tx,
            phase: Phase::Idle,
            assets: Vec::new(),
            chart: Vec::new(),
            indicators: IndicatorSnapshot::unavailable(),
            summary: SummarySlot::default(),
            news: NewsSlot::default(),
            error: None,
            typewriter: Typewriter::new(),
            timer: None,
        };

        (orchestrator, outcome_rx)
    }

    // ========================================================================
    // Commandes
    // ========================================================================

    /// Démarrage : charge la liste des actifs (une seule fois)
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "Start ignored");
            return;
        }

        info!("Loading quote list");
        self.phase = Phase::LoadingQuotes;

        let api = Arc::clone(&self.api);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_quotes().await;
            let _ = tx.send(Outcome::QuotesLoaded(result));
        });
    }

    /// Change l'actif sélectionné et lance un nouveau cycle de détail
    ///
    /// Re-sélectionner le symbole courant relance le cycle (retry manuel).
    pub fn select(&mut self, symbol: &str) {
        if matches!(
            self.phase,
            Phase::Idle | Phase::LoadingQuotes | Phase::QuotesFailed { .. }
        ) {
            debug!(symbol, phase = ?self.phase, "Selection ignored in this phase");
            return;
        }

        let Some(asset) = self.assets.iter().find(|a| a.symbol == symbol).cloned() else {
            warn!(symbol, "Selection ignored: unknown symbol");
            return;
        };

        // News déjà connues pour ce symbole, jointes à la requête d'analyse
        let news_so_far = if self.news.symbol.as_deref() == Some(symbol)
            && self.news.status == SlotStatus::Ready
        {
            self.news.items.clone()
        } else {
            Vec::new()
        };

        self.selection.generation += 1;
        self.selection.symbol = Some(symbol.to_string());
        let tag = CycleTag {
            generation: self.selection.generation,
            symbol: symbol.to_string(),
        };
        info!(symbol, generation = tag.generation, "Starting detail cycle");

        self.reset_detail();
        self.summary.status = SlotStatus::Pending;
        self.news.status = SlotStatus::Pending;
        self.phase = Phase::LoadingDetail {
            symbol: symbol.to_string(),
        };

        let api = Arc::clone(&self.api);
        let tx = self.outcome_tx.clone();
        let query = self.settings.history.clone();
        tokio::spawn(run_detail_cycle(api, tag, asset, news_so_far, query, tx));
    }

    /// Change la langue d'affichage et retraduit le contenu courant
    ///
    /// Les données de marché ne sont pas rechargées.
    pub fn set_language(&mut self, language: Language) {
        if self.selection.language == language {
            return;
        }

        info!(from = %self.selection.language, to = %language, "Display language changed");
        self.selection.language = language;
        self.refresh_summary_display();
        self.refresh_news_titles();
    }

    pub fn toggle_language(&mut self) {
        self.set_language(self.selection.language.toggle());
    }

    // ========================================================================
    // Application des résultats
    // ========================================================================

    /// Applique le message d'une tâche ; seul point d'écriture de l'état
    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::QuotesLoaded(result) => self.on_quotes(result),

            Outcome::HistoryLoaded { tag, result } => {
                if self.is_current(&tag) {
                    self.on_history(tag, result);
                } else {
                    debug!(symbol = %tag.symbol, generation = tag.generation, "Discarding stale history");
                }
            }

            Outcome::AnalysisLoaded { tag, result } => {
                if self.is_current(&tag) {
                    self.on_analysis(result);
                } else {
                    debug!(symbol = %tag.symbol, generation = tag.generation, "Discarding stale analysis");
                }
            }

            Outcome::NewsLoaded { tag, result } => {
                if self.is_current(&tag) {
                    self.on_news(result);
                } else {
                    debug!(symbol = %tag.symbol, generation = tag.generation, "Discarding stale news");
                }
            }

            Outcome::SummaryTranslated { tag, text } => {
                if tag.language == self.selection.language && tag.revision == self.summary.revision {
                    self.show_summary(&text);
                } else {
                    debug!(?tag, "Discarding stale summary translation");
                }
            }

            Outcome::TitlesTranslated { tag, titles } => {
                if tag.language == self.selection.language
                    && tag.revision == self.news.revision
                    && titles.len() == self.news.items.len()
                {
                    // Les replis (None) ne vont pas en cache : retentés au prochain passage
                    self.news.cache.store(tag.language, &titles);
                    self.news.titles = titles
                        .into_iter()
                        .zip(&self.news.items)
                        .map(|(title, item)| title.unwrap_or_else(|| item.title.clone()))
                        .collect();
                } else {
                    debug!(?tag, "Discarding stale title translation");
                }
            }

            Outcome::TypewriterTick { generation } => match self.typewriter.advance(generation) {
                Tick::Advanced => {}
                Tick::Finished => self.stop_timer(),
                Tick::Stale => {}
            },
        }
    }

    fn is_current(&self, tag: &CycleTag) -> bool {
        tag.generation == self.selection.generation
            && self.selection.symbol.as_deref() == Some(tag.symbol.as_str())
    }

    fn on_quotes(&mut self, result: Result<Vec<Asset>, ApiError>) {
        if self.phase != Phase::LoadingQuotes {
            debug!(phase = ?self.phase, "Discarding unexpected quote list");
            return;
        }

        match result {
            Ok(assets) => {
                self.assets = prepare_asset_list(assets);
                self.phase = Phase::QuotesReady;
                info!(assets = self.assets.len(), "Quote list ready");

                // Auto-sélection du premier actif (rang le plus bas)
                match self.assets.first().map(|a| a.symbol.clone()) {
                    Some(symbol) => self.select(&symbol),
                    None => warn!("Quote list is empty, nothing to select"),
                }
            }
            Err(e) => {
                let reason = CycleError::QuoteList(e).to_string();
                error!(error = %reason, "Quote list failed");
                self.error = Some(reason.clone());
                self.phase = Phase::QuotesFailed { reason };
            }
        }
    }

    fn on_history(&mut self, tag: CycleTag, result: Result<History, ApiError>) {
        match result {
            Ok(history) if history.points.is_empty() => {
                info!(symbol = %tag.symbol, "No history for asset");
                self.chart.clear();
                self.indicators = IndicatorSnapshot::unavailable();
                self.settle_without_detail();
                self.phase = Phase::DetailReady { symbol: tag.symbol };
            }
            Ok(history) => {
                debug!(symbol = %tag.symbol, points = history.points.len(), "History committed");
                self.chart = history.points;
                self.indicators = history.indicators;
                self.finish_if_settled();
            }
            Err(source) => {
                let reason = CycleError::DetailFetch {
                    symbol: tag.symbol.clone(),
                    source,
                }
                .to_string();
                error!(error = %reason, "History fetch failed");

                self.chart.clear();
                self.indicators = IndicatorSnapshot::unavailable();
                self.error = Some(reason.clone());
                self.settle_without_detail();
                self.phase = Phase::DetailFailed {
                    symbol: tag.symbol,
                    reason,
                };
            }
        }
    }

    fn on_analysis(&mut self, result: Result<String, ApiError>) {
        match result {
            Ok(text) => {
                self.summary.raw = Some(text);
                self.summary.status = SlotStatus::Ready;
            }
            Err(e) => {
                let placeholder = CycleError::Analysis(e).to_string();
                warn!(error = %placeholder, "Analysis failed");
                self.summary.raw = Some(placeholder.clone());
                self.summary.status = SlotStatus::Failed(placeholder);
            }
        }

        self.refresh_summary_display();
        self.finish_if_settled();
    }

    fn on_news(&mut self, result: Result<Vec<NewsItem>, ApiError>) {
        self.news.cache.clear();
        self.news.symbol = self.selection.symbol.clone();

        match result {
            Ok(items) => {
                debug!(items = items.len(), "News committed");
                self.news.items = items;
                self.news.status = SlotStatus::Ready;
            }
            Err(e) => {
                let reason = CycleError::News(e).to_string();
                warn!(error = %reason, "News failed");
                self.news.items.clear();
                self.news.status = SlotStatus::Failed(reason);
            }
        }

        self.refresh_news_titles();
        self.finish_if_settled();
    }

    /// Historique vide ou en échec : placeholder de résumé, pas de news
    fn settle_without_detail(&mut self) {
        self.summary.raw = Some(NO_DATA_SUMMARY.to_string());
        self.summary.status = SlotStatus::Skipped;
        self.news.items.clear();
        self.news.status = SlotStatus::Skipped;

        self.refresh_summary_display();
        self.refresh_news_titles();
    }

    fn finish_if_settled(&mut self) {
        let symbol = match &self.phase {
            Phase::LoadingDetail { symbol } => symbol.clone(),
            _ => return,
        };

        if !self.chart.is_empty() && self.summary.status.is_settled() && self.news.status.is_settled() {
            info!(%symbol, "Detail cycle complete");
            self.phase = Phase::DetailReady { symbol };
        }
    }

    /// Efface tout l'état dérivé du cycle précédent
    fn reset_detail(&mut self) {
        self.chart.clear();
        self.indicators = IndicatorSnapshot::unavailable();
        self.error = None;

        self.summary.raw = None;
        self.summary.status = SlotStatus::Empty;
        self.summary.revision += 1;

        self.news.items.clear();
        self.news.titles.clear();
        self.news.cache.clear();
        self.news.status = SlotStatus::Empty;
        self.news.revision += 1;

        self.show_summary("");
    }

    // ========================================================================
    // Traduction et typewriter
    // ========================================================================

    /// Re-dérive le texte affiché du résumé pour la langue courante
    fn refresh_summary_display(&mut self) {
        self.summary.revision += 1;
        let language = self.selection.language;

        let Some(raw) = self.summary.raw.clone() else {
            self.show_summary("");
            return;
        };

        if self.translation.is_passthrough(language) {
            self.show_summary(&raw);
            return;
        }

        let tag = TranslationTag {
            language,
            revision: self.summary.revision,
        };
        let service = self.translation.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let text = service.translate(&raw, language).await;
            let _ = tx.send(Outcome::SummaryTranslated { tag, text });
        });
    }

    /// Re-dérive les titres affichés pour la langue courante
    ///
    /// Les titres originaux restent affichés tant que la traduction n'est pas
    /// arrivée.
    fn refresh_news_titles(&mut self) {
        self.news.revision += 1;
        let language = self.selection.language;
        let originals: Vec<String> = self.news.items.iter().map(|n| n.title.clone()).collect();

        if originals.is_empty() || self.translation.is_passthrough(language) {
            self.news.titles = originals;
            return;
        }

        if let Some(cached) = self.news.cache.get_all(language, originals.len()) {
            debug!(%language, titles = cached.len(), "Titles served from cache");
            self.news.titles = cached;
            return;
        }

        self.news.titles = originals.clone();

        let tag = TranslationTag {
            language,
            revision: self.news.revision,
        };
        let service = self.translation.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let titles = service.translate_batch(&originals, language).await;
            let _ = tx.send(Outcome::TitlesTranslated { tag, titles });
        });
    }

    /// Remplace le texte du typewriter et redémarre son timer
    fn show_summary(&mut self, text: &str) {
        self.stop_timer();
        let generation = self.typewriter.reset(text);

        if self.typewriter.is_complete() {
            return;
        }

        let tx = self.outcome_tx.clone();
        self.timer = Some(TimerHandle::spawn(self.settings.typewriter_cadence, move || {
            tx.send(Outcome::TypewriterTick { generation }).is_ok()
        }));
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    // ========================================================================
    // Lecture de l'état (UI)
    // ========================================================================

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn language(&self) -> Language {
        self.selection.language
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn selected_asset(&self) -> Option<&Asset> {
        let symbol = self.selection.symbol.as_deref()?;
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    pub fn chart(&self) -> &[PricePoint] {
        &self.chart
    }

    pub fn indicators(&self) -> &IndicatorSnapshot {
        &self.indicators
    }

    /// Texte brut du résumé (langue source), None tant qu'il n'est pas arrivé
    pub fn summary_raw(&self) -> Option<&str> {
        self.summary.raw.as_deref()
    }

    pub fn summary_status(&self) -> &SlotStatus {
        &self.summary.status
    }

    /// Partie révélée du résumé traduit
    pub fn summary_visible(&self) -> &str {
        self.typewriter.visible()
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn is_typing(&self) -> bool {
        self.timer.is_some()
    }

    /// News avec leur titre d'affichage (traduit si disponible)
    pub fn news(&self) -> impl Iterator<Item = (&str, &NewsItem)> {
        self.news
            .items
            .iter()
            .enumerate()
            .map(move |(i, item)| {
                let title = self
                    .news
                    .titles
                    .get(i)
                    .map(String::as_str)
                    .unwrap_or(item.title.as_str());
                (title, item)
            })
    }

    pub fn news_status(&self) -> &SlotStatus {
        &self.news.status
    }

    /// Message d'erreur spécifique aux news
    pub fn news_error(&self) -> Option<&str> {
        match &self.news.status {
            SlotStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::LoadingQuotes | Phase::LoadingDetail { .. })
    }
}

// ============================================================================
// Tâche d'un cycle de détail
// ============================================================================
// (a) OHLCV → (b) indicateurs → message HistoryLoaded
// puis, si l'historique n'est pas vide, (c) analyse et news en parallèle,
// chacune envoyant son message dès qu'elle se termine.
// ============================================================================

async fn run_detail_cycle(
    api: Arc<dyn MarketApi>,
    tag: CycleTag,
    asset: Asset,
    news_so_far: Vec<NewsItem>,
    query: HistoryQuery,
    tx: UnboundedSender<Outcome>,
) {
    let history = api.fetch_ohlcv(&tag.symbol, &query).await.map(|candles| {
        let points = price_points(&candles);
        let indicators = indicators::compute_snapshot(&closes(&points));
        History { points, indicators }
    });

    let next = match &history {
        Ok(h) if !h.points.is_empty() => Some(h.indicators),
        _ => None,
    };

    if tx
        .send(Outcome::HistoryLoaded {
            tag: tag.clone(),
            result: history,
        })
        .is_err()
    {
        return;
    }

    let Some(snapshot) = next else {
        return;
    };

    let request = AnalysisRequest::new(&asset, &snapshot, news_so_far);

    let analysis = async {
        let result = api.analyze(&request).await;
        let _ = tx.send(Outcome::AnalysisLoaded {
            tag: tag.clone(),
            result,
        });
    };

    let news = async {
        let result = api.fetch_news(&tag.symbol).await;
        let _ = tx.send(Outcome::NewsLoaded {
            tag: tag.clone(),
            result,
        });
    };

    tokio::join!(analysis, news);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{flat_candles, FakeApi, FakeTranslator};
    use crate::models::asset::sample_asset;
    use crate::models::Candle;

    fn settings() -> Settings {
        Settings {
            typewriter_cadence: Duration::from_millis(1),
            ..Settings::default()
        }
    }

    fn setup(api: FakeApi, translator: Arc<FakeTranslator>) -> (Orchestrator, UnboundedReceiver<Outcome>, Arc<FakeApi>) {
        let api = Arc::new(api);
        let (orch, rx) = Orchestrator::new(api.clone(), translator, settings());
        (orch, rx, api)
    }

    /// Prochain message hors ticks du typewriter
    async fn next_data(rx: &mut UnboundedReceiver<Outcome>) -> Outcome {
        loop {
            let outcome = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("timed out waiting for outcome")
                .expect("channel closed");
            if !matches!(outcome, Outcome::TypewriterTick { .. }) {
                return outcome;
            }
        }
    }

    async fn pump(orch: &mut Orchestrator, rx: &mut UnboundedReceiver<Outcome>, count: usize) {
        for _ in 0..count {
            let outcome = next_data(rx).await;
            orch.apply(outcome);
        }
    }

    fn two_news(prefix: &str) -> Vec<NewsItem> {
        vec![
            NewsItem::new(&format!("{} headline one", prefix), "https://example.com/1"),
            NewsItem::new(&format!("{} headline two", prefix), "https://example.com/2"),
        ]
    }

    fn happy_api() -> FakeApi {
        FakeApi::with_quotes(vec![sample_asset("ETH", 2), sample_asset("BTC", 1)])
            .history("BTC", Ok(flat_candles(60, 100.0)))
            .analysis("BTC", Ok("**BTC** looks stable.".to_string()))
            .news("BTC", Ok(two_news("BTC")))
            .history("ETH", Ok(flat_candles(40, 50.0)))
            .analysis("ETH", Ok("ETH summary".to_string()))
            .news("ETH", Ok(two_news("ETH")))
    }

    #[tokio::test]
    async fn test_quotes_sorted_and_lowest_rank_selected() {
        let assets = [3, 1, 5, 2, 4]
            .iter()
            .map(|&r| sample_asset(&format!("C{}", r), r))
            .collect();
        let (mut orch, mut rx, _) = setup(FakeApi::with_quotes(assets), Arc::default());

        orch.start();
        assert_eq!(orch.phase(), &Phase::LoadingQuotes);
        pump(&mut orch, &mut rx, 1).await;

        let ranks: Vec<u32> = orch.assets().iter().map(|a| a.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert_eq!(orch.selection().symbol.as_deref(), Some("C1"));
        assert_eq!(orch.phase(), &Phase::LoadingDetail { symbol: "C1".to_string() });
    }

    #[tokio::test]
    async fn test_full_cycle_in_source_language() {
        let translator = Arc::new(FakeTranslator::default());
        let (mut orch, mut rx, _) = setup(happy_api(), translator.clone());

        orch.start();
        pump(&mut orch, &mut rx, 4).await;

        assert_eq!(orch.phase(), &Phase::DetailReady { symbol: "BTC".to_string() });
        assert_eq!(orch.chart().len(), 60);
        assert_eq!(orch.indicators().sma50, Some(100.0));
        assert_eq!(orch.indicators().macd_histogram, Some(0.0));
        assert_eq!(orch.summary_raw(), Some("**BTC** looks stable."));
        assert_eq!(orch.typewriter().text(), "BTC looks stable.");
        assert_eq!(orch.news().count(), 2);
        assert_eq!(orch.error(), None);
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_cycle_never_commits() {
        for b_first in [true, false] {
            let (mut orch, mut rx, _) = setup(happy_api(), Arc::default());

            orch.start();
            pump(&mut orch, &mut rx, 1).await; // quotes → BTC auto-sélectionné
            orch.select("ETH");

            let mut btc = Vec::new();
            let mut eth = Vec::new();
            for _ in 0..6 {
                let outcome = next_data(&mut rx).await;
                match outcome.cycle().map(|t| t.symbol.as_str()) {
                    Some("BTC") => btc.push(outcome),
                    Some("ETH") => eth.push(outcome),
                    other => panic!("unexpected outcome for {:?}", other),
                }
            }

            // A (BTC) résout après B (ETH), ou l'inverse
            let ordered: Vec<Outcome> = if b_first {
                eth.into_iter().chain(btc).collect()
            } else {
                btc.into_iter().chain(eth).collect()
            };
            for outcome in ordered {
                orch.apply(outcome);
            }

            assert_eq!(orch.phase(), &Phase::DetailReady { symbol: "ETH".to_string() });
            assert_eq!(orch.chart().len(), 40);
            assert_eq!(orch.summary_raw(), Some("ETH summary"));
            let titles: Vec<&str> = orch.news().map(|(title, _)| title).collect();
            assert_eq!(titles, vec!["ETH headline one", "ETH headline two"]);
        }
    }

    #[tokio::test]
    async fn test_empty_history_clears_and_skips_news() {
        let api = FakeApi::with_quotes(vec![sample_asset("BTC", 1)])
            .history("BTC", Ok(Vec::new()))
            .news("BTC", Ok(two_news("BTC")));
        let (mut orch, mut rx, api) = setup(api, Arc::default());

        orch.start();
        pump(&mut orch, &mut rx, 2).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(orch.chart().is_empty());
        assert!(orch.indicators().is_empty());
        assert_eq!(orch.summary_raw(), Some(NO_DATA_SUMMARY));
        assert_eq!(orch.phase(), &Phase::DetailReady { symbol: "BTC".to_string() });
        assert_eq!(orch.news().count(), 0);
        assert_eq!(api.news_calls(), 0);
        assert!(api.analysis_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analysis_failure_does_not_block_news() {
        let api = FakeApi::with_quotes(vec![sample_asset("BTC", 1)])
            .history("BTC", Ok(flat_candles(30, 10.0)))
            .analysis(
                "BTC",
                Err(ApiError::Status {
                    endpoint: "/ai/analyze".to_string(),
                    status: 500,
                }),
            )
            .news("BTC", Ok(two_news("BTC")));
        let (mut orch, mut rx, _) = setup(api, Arc::default());

        orch.start();
        pump(&mut orch, &mut rx, 4).await;

        assert_eq!(orch.phase(), &Phase::DetailReady { symbol: "BTC".to_string() });
        assert_eq!(orch.news().count(), 2);
        assert_eq!(orch.news_error(), None);

        let summary = orch.summary_raw().unwrap();
        assert!(summary.contains("HTTP 500"), "summary = {}", summary);
        assert!(matches!(orch.summary_status(), SlotStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_news_failure_does_not_block_summary() {
        let api = FakeApi::with_quotes(vec![sample_asset("BTC", 1)])
            .history("BTC", Ok(flat_candles(30, 10.0)))
            .analysis("BTC", Ok("All good".to_string()))
            .news("BTC", Err(ApiError::Network("reset".to_string())));
        let (mut orch, mut rx, _) = setup(api, Arc::default());

        orch.start();
        pump(&mut orch, &mut rx, 4).await;

        assert_eq!(orch.summary_raw(), Some("All good"));
        assert_eq!(orch.summary_status(), &SlotStatus::Ready);
        assert_eq!(orch.news().count(), 0);
        assert!(orch.news_error().unwrap().contains("reset"));
        assert_eq!(orch.phase(), &Phase::DetailReady { symbol: "BTC".to_string() });
    }

    #[tokio::test]
    async fn test_history_failure_marks_detail_failed() {
        let api = FakeApi::with_quotes(vec![sample_asset("BTC", 1)])
            .history("BTC", Err(ApiError::Network("timeout".to_string())));
        let (mut orch, mut rx, api) = setup(api, Arc::default());

        orch.start();
        pump(&mut orch, &mut rx, 2).await;

        match orch.phase() {
            Phase::DetailFailed { symbol, reason } => {
                assert_eq!(symbol, "BTC");
                assert!(reason.contains("timeout"));
            }
            other => panic!("unexpected phase {:?}", other),
        }
        assert!(orch.error().is_some());
        assert!(orch.chart().is_empty());
        assert_eq!(orch.summary_raw(), Some(NO_DATA_SUMMARY));
        assert_eq!(api.news_calls(), 0);
    }

    #[tokio::test]
    async fn test_quote_failure_is_terminal() {
        let api = FakeApi {
            quotes: Some(Err(ApiError::Network("down".to_string()))),
            ..FakeApi::default()
        };
        let (mut orch, mut rx, _) = setup(api, Arc::default());

        orch.start();
        pump(&mut orch, &mut rx, 1).await;

        assert!(matches!(orch.phase(), Phase::QuotesFailed { .. }));
        assert!(orch.error().unwrap().contains("down"));

        orch.select("BTC");
        orch.start();
        assert!(matches!(orch.phase(), Phase::QuotesFailed { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_selection_ignored_while_loading_quotes_or_unknown() {
        let (mut orch, mut rx, _) = setup(happy_api(), Arc::default());

        orch.select("BTC");
        assert_eq!(orch.phase(), &Phase::Idle);

        orch.start();
        orch.select("BTC");
        assert_eq!(orch.phase(), &Phase::LoadingQuotes);

        pump(&mut orch, &mut rx, 1).await;
        let generation = orch.selection().generation;
        orch.select("DOGE");
        assert_eq!(orch.selection().generation, generation);
    }

    #[tokio::test]
    async fn test_language_toggle_translates_and_caches_titles() {
        let translator = Arc::new(FakeTranslator::default());
        let (mut orch, mut rx, _) = setup(happy_api(), translator.clone());

        orch.start();
        pump(&mut orch, &mut rx, 4).await;
        assert_eq!(translator.calls(), 0);

        orch.set_language(Language::Fr);
        pump(&mut orch, &mut rx, 2).await;

        assert_eq!(orch.typewriter().text(), "[fr] BTC looks stable.");
        assert_eq!(orch.typewriter().revealed(), 0);
        let titles: Vec<&str> = orch.news().map(|(title, _)| title).collect();
        assert_eq!(titles, vec!["[fr] BTC headline one", "[fr] BTC headline two"]);
        // Les titres originaux restent la source de vérité
        assert!(orch.news().all(|(_, item)| !item.title.starts_with("[fr]")));
        assert_eq!(translator.calls(), 3);

        // Retour à l'anglais : immédiat, sans appel
        orch.set_language(Language::En);
        assert_eq!(orch.typewriter().text(), "BTC looks stable.");
        assert_eq!(orch.news().next().unwrap().0, "BTC headline one");
        assert_eq!(translator.calls(), 3);

        // De nouveau en français : titres servis par le cache
        orch.toggle_language();
        assert_eq!(orch.news().next().unwrap().0, "[fr] BTC headline one");
        pump(&mut orch, &mut rx, 1).await;
        assert_eq!(orch.typewriter().text(), "[fr] BTC looks stable.");
        assert_eq!(translator.calls(), 4);
    }

    #[tokio::test]
    async fn test_translation_discarded_after_language_change() {
        let (mut orch, mut rx, _) = setup(happy_api(), Arc::default());

        orch.start();
        pump(&mut orch, &mut rx, 4).await;

        orch.set_language(Language::Fr);
        orch.set_language(Language::En);
        pump(&mut orch, &mut rx, 2).await;

        assert_eq!(orch.typewriter().text(), "BTC looks stable.");
        assert_eq!(orch.news().next().unwrap().0, "BTC headline one");
    }

    #[tokio::test]
    async fn test_translation_discarded_after_content_change() {
        let api = Arc::new(happy_api());
        let translator = Arc::new(FakeTranslator::default());
        let settings = Settings {
            initial_language: Language::Fr,
            ..settings()
        };
        let (mut orch, mut rx) = Orchestrator::new(api, translator, settings);

        orch.start();

        // Traductions BTC retenues jusqu'au changement de sélection
        let mut held = Vec::new();
        while held.len() < 2 {
            match next_data(&mut rx).await {
                outcome @ (Outcome::SummaryTranslated { .. } | Outcome::TitlesTranslated { .. }) => {
                    held.push(outcome)
                }
                outcome => orch.apply(outcome),
            }
        }

        orch.select("ETH");
        for outcome in held {
            orch.apply(outcome);
        }

        assert!(orch.news().all(|(title, _)| !title.contains("BTC")));
        assert!(!orch.typewriter().text().contains("BTC"));

        pump(&mut orch, &mut rx, 5).await;

        assert_eq!(orch.phase(), &Phase::DetailReady { symbol: "ETH".into() });
        assert_eq!(orch.news().next().unwrap().0, "[fr] ETH headline one");
        assert_eq!(orch.typewriter().text(), "[fr] ETH summary");
    }

    #[tokio::test]
    async fn test_failed_title_translation_is_retried() {
        let translator = Arc::new(FakeTranslator::failing());
        let (mut orch, mut rx, _) = setup(happy_api(), translator.clone());

        orch.start();
        pump(&mut orch, &mut rx, 4).await;

        orch.set_language(Language::Fr);
        pump(&mut orch, &mut rx, 2).await;
        assert_eq!(translator.calls(), 3);
        let titles: Vec<&str> = orch.news().map(|(title, _)| title).collect();
        assert_eq!(titles, vec!["BTC headline one", "BTC headline two"]);
        assert_eq!(orch.typewriter().text(), "BTC looks stable.");

        // Aucun repli en cache : le retour en français relance les appels
        orch.set_language(Language::En);
        orch.set_language(Language::Fr);
        pump(&mut orch, &mut rx, 2).await;
        assert_eq!(translator.calls(), 6);
    }

    #[tokio::test]
    async fn test_typewriter_ticks_and_stops() {
        let (mut orch, mut rx, _) = setup(happy_api(), Arc::default());

        orch.start();
        pump(&mut orch, &mut rx, 4).await;

        let generation = orch.typewriter().generation();
        assert_eq!(orch.typewriter().revealed(), 0);
        assert!(orch.is_typing());

        orch.apply(Outcome::TypewriterTick { generation });
        assert_eq!(orch.summary_visible(), "B");

        orch.apply(Outcome::TypewriterTick { generation: generation - 1 });
        assert_eq!(orch.typewriter().revealed(), 1);

        let total = orch.typewriter().total();
        for _ in 0..total {
            orch.apply(Outcome::TypewriterTick { generation });
        }
        assert_eq!(orch.summary_visible(), "BTC looks stable.");
        assert!(!orch.is_typing());

        // Une nouvelle sélection repart de zéro
        orch.select("ETH");
        assert_eq!(orch.typewriter().revealed(), 0);
        assert_eq!(orch.summary_visible(), "");
    }

    #[tokio::test]
    async fn test_reselect_sends_known_news_to_analysis() {
        let (mut orch, mut rx, api) = setup(happy_api(), Arc::default());

        orch.start();
        pump(&mut orch, &mut rx, 4).await;

        orch.select("BTC");
        pump(&mut orch, &mut rx, 3).await;

        let requests = api.analysis_requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].news.is_empty());
        assert_eq!(requests[1].news, two_news("BTC"));
        assert!(requests[1].volume.is_none());
    }

    #[tokio::test]
    async fn test_history_sorted_before_indicators() {
        let mut candles: Vec<Candle> = (0..28)
            .map(|i| {
                let close = 100.0 + i as f64;
                Candle::new(&format!("2024-02-{:02}", i + 1), close, close, close, close)
            })
            .collect();
        candles.reverse();

        let api = FakeApi::with_quotes(vec![sample_asset("BTC", 1)])
            .history("BTC", Ok(candles))
            .analysis("BTC", Ok("ok".to_string()))
            .news("BTC", Ok(Vec::new()));
        let (mut orch, mut rx, _) = setup(api, Arc::default());

        orch.start();
        pump(&mut orch, &mut rx, 2).await;

        let chart = orch.chart();
        assert_eq!(chart.len(), 28);
        assert!(chart.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        // Série croissante une fois triée : RSI à 100
        assert_eq!(orch.indicators().rsi, Some(100.0));
    }
}
