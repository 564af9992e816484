// ============================================================================
// Structure : IndicatorSnapshot
// ============================================================================
// Valeurs dérivées de la série de prix courante. Chaque champ est soit un
// nombre fini, soit None ("indisponible" : série trop courte ou sans
// variation). Le snapshot est toujours recalculé en entier.
//
// Les valeurs stockées sont en pleine précision ; l'arrondi ne se fait qu'une
// fois, à la frontière (affichage, corps de la requête d'analyse), via
// `rounded()`.
// ============================================================================

use serde::Serialize;

/// Décimales d'affichage
pub const RSI_DECIMALS: i32 = 2;
pub const MACD_DECIMALS: i32 = 4;
pub const SMA_DECIMALS: i32 = 4;

/// Indicateur de volume
///
/// Jamais calculé pour l'instant : la variante explicite évite de laisser
/// croire qu'un vrai indicateur de volume existe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolumeIndicator {
    #[default]
    NotComputed,
}

/// Indicateurs techniques en pleine précision
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub volume: VolumeIndicator,
}

/// Indicateurs arrondis pour l'affichage et les requêtes
///
/// CONCEPT RUST : type distinct pour les valeurs arrondies
/// - Impossible de ré-arrondir par erreur un snapshot déjà arrondi :
///   `rounded()` n'existe que sur IndicatorSnapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundedIndicators {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
}

impl IndicatorSnapshot {
    /// Snapshot où tout est indisponible (série vide, état effacé)
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Vrai si aucun indicateur n'a pu être calculé
    pub fn is_empty(&self) -> bool {
        self.rsi.is_none()
            && self.macd.is_none()
            && self.macd_signal.is_none()
            && self.macd_histogram.is_none()
            && self.sma50.is_none()
            && self.sma200.is_none()
    }

    /// Arrondit chaque valeur à sa précision d'affichage
    pub fn rounded(&self) -> RoundedIndicators {
        RoundedIndicators {
            rsi: self.rsi.map(|v| round_to(v, RSI_DECIMALS)),
            macd: self.macd.map(|v| round_to(v, MACD_DECIMALS)),
            macd_signal: self.macd_signal.map(|v| round_to(v, MACD_DECIMALS)),
            macd_histogram: self.macd_histogram.map(|v| round_to(v, MACD_DECIMALS)),
            sma50: self.sma50.map(|v| round_to(v, SMA_DECIMALS)),
            sma200: self.sma200.map(|v| round_to(v, SMA_DECIMALS)),
        }
    }
}

/// Arrondi à `decimals` décimales
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Formatte une valeur arrondie, ou le marqueur d'indisponibilité
pub fn format_reading(value: Option<f64>, decimals: usize, unavailable: &str) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => unavailable.to_string(),
    }
}
