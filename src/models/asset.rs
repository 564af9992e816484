// ============================================================================
// Structure : Asset
// ============================================================================
// Un actif crypto tel que renvoyé par GET /quotes : identité + métriques du
// moment. Snapshot immuable, remplacé en bloc à chaque chargement de la liste.
// ============================================================================

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::de::{flexible_f64, flexible_id, flexible_opt_f64};

/// Actif avec ses métriques de marché
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,

    /// Symbole (ex: "BTC"), unique dans une liste
    pub symbol: String,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,

    #[serde(deserialize_with = "flexible_f64")]
    pub price: f64,

    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub volume_24h: Option<f64>,

    #[serde(default, rename = "change1h", deserialize_with = "flexible_opt_f64")]
    pub change_1h: Option<f64>,

    #[serde(default, rename = "change24h", deserialize_with = "flexible_opt_f64")]
    pub change_24h: Option<f64>,

    #[serde(default, rename = "change7d", deserialize_with = "flexible_opt_f64")]
    pub change_7d: Option<f64>,

    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub market_cap: Option<f64>,

    /// Rang par capitalisation (1 = plus gros)
    pub rank: u32,
}

impl Asset {
    /// Retourne true si l'actif est en hausse sur 24h
    pub fn is_positive(&self) -> bool {
        self.change_24h.map(|c| c >= 0.0).unwrap_or(false)
    }

    /// Formatte une ligne de liste : "BTC   Bitcoin        $64250.12  ▲ +1.24%"
    pub fn display(&self) -> String {
        let change_str = match self.change_24h {
            Some(change) => {
                let arrow = if change >= 0.0 { "▲" } else { "▼" };
                format!("{} {:+.2}%", arrow, change)
            }
            None => String::new(),
        };

        let truncated_name = if self.name.chars().count() <= 14 {
            self.name.clone()
        } else {
            let truncated: String = self.name.chars().take(13).collect();
            format!("{}…", truncated)
        };

        format!(
            "{:<6} {:<14} {:>12}  {}",
            self.symbol,
            truncated_name,
            format_price(self.price),
            change_str
        )
    }
}

/// Formatte un prix : 2 décimales au-dessus de 1$, plus en dessous
pub fn format_price(price: f64) -> String {
    if price.abs() >= 1.0 {
        format!("${:.2}", price)
    } else {
        format!("${:.6}", price)
    }
}

/// Formatte un grand montant : 1.23B, 456.70M, 12.00K
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.2}", value)
    }
}

/// Prépare la liste reçue du backend : tri par rang croissant, symboles uniques
///
/// En cas de doublon, l'entrée la mieux classée est conservée.
pub fn prepare_asset_list(mut assets: Vec<Asset>) -> Vec<Asset> {
    // sort_by_key est stable : à rang égal, l'ordre du backend est conservé
    assets.sort_by_key(|a| a.rank);

    let mut seen = HashSet::new();
    let before = assets.len();
    assets.retain(|a| seen.insert(a.symbol.clone()));

    if assets.len() < before {
        warn!(
            dropped = before - assets.len(),
            "Dropped assets with duplicate symbols"
        );
    }

    assets
}

#[cfg(test)]
pub(crate) fn sample_asset(symbol: &str, rank: u32) -> Asset {
    Asset {
        id: symbol.to_lowercase(),
        symbol: symbol.to_string(),
        name: format!("{} coin", symbol),
        price: 100.0 * rank as f64,
        volume_24h: Some(1_000_000.0),
        change_1h: Some(0.1),
        change_24h: Some(-1.5),
        change_7d: Some(4.2),
        market_cap: Some(5e9),
        rank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_sorted_by_rank() {
        let assets = [3, 1, 5, 2, 4]
            .iter()
            .map(|&r| sample_asset(&format!("C{}", r), r))
            .collect();

        let prepared = prepare_asset_list(assets);
        let ranks: Vec<u32> = prepared.iter().map(|a| a.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_duplicate_symbols_keep_best_rank() {
        let assets = vec![sample_asset("ETH", 7), sample_asset("BTC", 1), sample_asset("ETH", 2)];
        let prepared = prepare_asset_list(assets);
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[1].symbol, "ETH");
        assert_eq!(prepared[1].rank, 2);
    }

    #[test]
    fn test_deserialize_quote() {
        let json = r#"{
            "id": 1, "symbol": "BTC", "name": "Bitcoin", "price": "64250.5",
            "volume24h": 3.1e10, "change1h": 0.2, "change24h": -1.1,
            "change7d": null, "marketCap": 1.2e12, "rank": 1
        }"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.id, "1");
        assert_eq!(asset.price, 64250.5);
        assert_eq!(asset.change_7d, None);
        assert_eq!(asset.market_cap, Some(1.2e12));
        assert!(!asset.is_positive());
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_price(1234.567), "$1234.57");
        assert_eq!(format_price(0.00012), "$0.000120");
        assert_eq!(format_compact(1.5e9), "1.50B");
        assert_eq!(format_compact(250.0), "250.00");
    }
}
