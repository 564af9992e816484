// ============================================================================
// Structures : Candle (OHLCV) et PricePoint
// ============================================================================
// Candle : une chandelle telle que renvoyée par GET /ohlcv
// PricePoint : le couple (timestamp, close) utilisé par les indicateurs et le
// graphique.
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : type de chrono pour dates avec timezone UTC
// 2. f64 : floating point 64 bits pour les prix (précision suffisante)
// ============================================================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::de::{flexible_f64, flexible_opt_f64};

/// Une chandelle brute du backend
///
/// Le backend renvoie les valeurs dans le désordre et parfois sous forme de
/// chaînes ; le tri est fait par `price_points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// "2024-05-01", "2024-05-01 14:00:00" ou RFC 3339
    pub datetime: String,

    #[serde(deserialize_with = "flexible_f64")]
    pub open: f64,

    #[serde(deserialize_with = "flexible_f64")]
    pub high: f64,

    #[serde(deserialize_with = "flexible_f64")]
    pub low: f64,

    #[serde(deserialize_with = "flexible_f64")]
    pub close: f64,

    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub volume: Option<f64>,
}

impl Candle {
    /// Constructeur utilisé par les tests et les fakes
    pub fn new(datetime: &str, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            datetime: datetime.to_string(),
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    /// Timestamp UTC de la chandelle, None si le format est inconnu
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_datetime(&self.datetime)
    }
}

/// Un point de la série de prix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Parse les formats de date renvoyés par les backends OHLCV
///
/// CONCEPT RUST : Option chaining avec or_else
/// - Chaque format est essayé dans l'ordre, le premier qui réussit gagne
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Convertit des chandelles brutes en série de prix triée
///
/// Garanties sur le résultat :
/// - timestamps strictement croissants (un seul point par timestamp, le
///   dernier reçu gagne)
/// - uniquement des close finis
pub fn price_points(candles: &[Candle]) -> Vec<PricePoint> {
    let mut skipped = 0;
    let mut points: Vec<PricePoint> = candles
        .iter()
        .filter_map(|candle| match candle.timestamp() {
            Some(timestamp) if candle.close.is_finite() => Some(PricePoint {
                timestamp,
                close: candle.close,
            }),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, total = candles.len(), "Skipped candles with invalid datetime or close");
    }

    // Tri stable : à timestamp égal, l'ordre d'arrivée est conservé
    points.sort_by_key(|p| p.timestamp);

    // Déduplication en gardant la dernière occurrence
    let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match deduped.last_mut() {
            Some(last) if last.timestamp == point.timestamp => *last = point,
            _ => deduped.push(point),
        }
    }

    debug!(points = deduped.len(), "Built price series");
    deduped
}

/// Extrait les close (du plus ancien au plus récent)
pub fn closes(points: &[PricePoint]) -> Vec<f64> {
    points.iter().map(|p| p.close).collect()
}

/// Variation en pourcentage entre le premier et le dernier point
pub fn total_change_percent(points: &[PricePoint]) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if first.close == 0.0 {
        return None;
    }
    Some(((last.close - first.close) / first.close) * 100.0)
}

// ============================================================================
// Tests unitaires
// ============================================================================
