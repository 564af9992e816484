// ============================================================================
// IndicatorEngine : RSI, MACD, moyennes mobiles
// ============================================================================
// Fonctions pures sur une série de close (du plus ancien au plus récent).
// Aucune ne panique ni ne divise par zéro : une série trop courte ou sans
// variation donne None.
//
// CONCEPTS RUST :
// 1. Slices (&[f64]) : on emprunte la série, aucune copie
// 2. Option<f64> : "indisponible" est un état explicite, pas un NaN
// 3. windows(2) : itère sur les paires consécutives
// ============================================================================

use crate::models::{IndicatorSnapshot, VolumeIndicator};

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const SMA_SHORT: usize = 50;
pub const SMA_LONG: usize = 200;

/// Résultat MACD : ligne, signal, histogramme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Calcule tous les indicateurs avec les périodes par défaut
pub fn compute_snapshot(closes: &[f64]) -> IndicatorSnapshot {
    let macd = macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);

    IndicatorSnapshot {
        rsi: rsi(closes, RSI_PERIOD),
        macd: macd.map(|m| m.line),
        macd_signal: macd.map(|m| m.signal),
        macd_histogram: macd.map(|m| m.histogram),
        sma50: sma(closes, SMA_SHORT),
        sma200: sma(closes, SMA_LONG),
        volume: VolumeIndicator::NotComputed,
    }
}

// ============================================================================
// RSI (Wilder)
// ============================================================================

/// Relative Strength Index sur `period` variations
///
/// Moyennes initiales = moyenne simple des `period` premières variations,
/// puis lissage de Wilder : avg = (avg * (period - 1) + x) / period.
///
/// Il faut `period` variations, donc `period + 1` closes : avec period = 14,
/// 15 closes donnent une valeur et 14 closes donnent None. None aussi si la
/// série n'a aucun mouvement.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let p = period as f64;

    let (seed_gain, seed_loss) = deltas[..period]
        .iter()
        .fold((0.0, 0.0), |(g, l), &d| (g + d.max(0.0), l + (-d).max(0.0)));
    let mut avg_gain = seed_gain / p;
    let mut avg_loss = seed_loss / p;

    for &d in &deltas[period..] {
        avg_gain = (avg_gain * (p - 1.0) + d.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-d).max(0.0)) / p;
    }

    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return None;
    }
    if avg_gain == 0.0 && avg_loss == 0.0 {
        return None;
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    Some(value.clamp(0.0, 100.0))
}

// ============================================================================
// MACD
// ============================================================================

/// Série EMA complète, amorcée sur la première valeur
///
/// Mise à jour e += k * (x - e) : une série constante reste exactement
/// constante.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());

    let mut iter = values.iter();
    if let Some(&first) = iter.next() {
        let mut ema = first;
        out.push(ema);
        for &value in iter {
            ema += k * (value - ema);
            out.push(ema);
        }
    }

    out
}

/// MACD(fast, slow, signal) sur la dernière valeur de la série
///
/// La ligne MACD n'a de sens qu'à partir de l'index slow - 1 ; le signal est
/// l'EMA de cette portion. Indisponible tant que la série compte moins de
/// slow + signal points.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<Macd> {
    if fast == 0 || signal == 0 || fast >= slow || closes.len() < slow + signal {
        return None;
    }

    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);

    let line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal_series = ema_series(&line[slow - 1..], signal);

    let line_value = *line.last()?;
    let signal_value = *signal_series.last()?;
    let histogram = line_value - signal_value;

    if !(line_value.is_finite() && signal_value.is_finite() && histogram.is_finite()) {
        return None;
    }

    Some(Macd {
        line: line_value,
        signal: signal_value,
        histogram,
    })
}

// ============================================================================
// Moyennes mobiles simples
// ============================================================================

/// Moyenne des `period` derniers close
///
/// La moyenne est ancrée sur la première valeur de la fenêtre : une série
/// constante p donne exactement p.
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    mean_anchored(window)
}

/// SMA glissante alignée sur la série : None pour les period - 1 premiers
/// points (utilisée pour les courbes du graphique)
pub fn sma_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                None
            } else {
                mean_anchored(&closes[i + 1 - period..=i])
            }
        })
        .collect()
}

fn mean_anchored(window: &[f64]) -> Option<f64> {
    let anchor = *window.first()?;
    let offset: f64 = window.iter().map(|v| v - anchor).sum::<f64>() / window.len() as f64;
    let mean = anchor + offset;
    mean.is_finite().then_some(mean)
}

// ============================================================================
// Tests unitaires
// ============================================================================
