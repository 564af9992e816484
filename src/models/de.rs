// ============================================================================
// Helpers de désérialisation tolérants
// ============================================================================
// Certains backends (Twelve Data, CoinMarketCap...) renvoient les nombres
// sous forme de chaînes ("123.45") et les ids sous forme de nombres.
// Ces helpers acceptent les deux formes.
//
// CONCEPT RUST : #[serde(untagged)]
// - Serde essaie chaque variante dans l'ordre jusqu'à ce qu'une matche
// ============================================================================

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// f64 depuis un nombre JSON ou une chaîne numérique
pub fn flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("nombre invalide : {:?}", s))),
    }
}

/// Option<f64> : null, absent, nombre ou chaîne numérique
///
/// À utiliser avec `#[serde(default)]` pour que l'absence donne None.
pub fn flexible_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("nombre invalide : {:?}", s))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Integer(i64),
    Text(String),
}

/// Identifiant sous forme de String, qu'il arrive en nombre ou en chaîne
pub fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdValue::deserialize(deserializer)? {
        IdValue::Integer(n) => n.to_string(),
        IdValue::Text(s) => s,
    })
}
