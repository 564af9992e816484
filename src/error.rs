// ============================================================================
// Erreurs typées
// ============================================================================
// - ApiError : erreur d'un appel au backend (quotes, ohlcv, analyse, news)
// - TranslationError : erreur de l'endpoint de traduction, jamais montrée
// - CycleError : taxonomie vue par l'orchestrateur, convertie en état
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère Display + std::error::Error
// - #[error("...")] définit le message affiché
// ============================================================================

use thiserror::Error;

/// Erreur d'un appel au backend
///
/// Les variantes ne contiennent que des String : l'erreur est Clone et peut
/// voyager dans les messages `Outcome` entre les tâches et l'orchestrateur.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Erreur de l'endpoint de traduction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Network(String),

    #[error("translation endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed translation response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        TranslationError::Network(err.to_string())
    }
}

/// Erreurs d'un cycle de chargement, telles que stockées dans l'état
///
/// Aucune ne traverse la frontière d'un cycle : l'orchestrateur les convertit
/// en état (message, placeholder, liste vide).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CycleError {
    /// Fatal au démarrage, pas de retry automatique
    #[error("Unable to load the asset list: {0}")]
    QuoteList(ApiError),

    /// Limité au symbole du cycle ; re-sélectionner relance
    #[error("Unable to load history for {symbol}: {source}")]
    DetailFetch { symbol: String, source: ApiError },

    /// Dégradé en placeholder de résumé
    #[error("AI analysis unavailable: {0}")]
    Analysis(ApiError),

    /// Dégradé en liste vide + flag
    #[error("News unavailable: {0}")]
    News(ApiError),

    /// Silencieux : repli sur le texte original
    #[error("Translation failed: {0}")]
    Translation(TranslationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_message_carries_reason() {
        let err = CycleError::Analysis(ApiError::Status {
            endpoint: "/ai/analyze".to_string(),
            status: 500,
        });
        assert_eq!(
            err.to_string(),
            "AI analysis unavailable: /ai/analyze returned HTTP 500"
        );
    }

    #[test]
    fn test_detail_error_names_symbol() {
        let err = CycleError::DetailFetch {
            symbol: "BTC".to_string(),
            source: ApiError::Network("timeout".to_string()),
        };
        assert!(err.to_string().contains("BTC"));
        assert!(err.to_string().contains("timeout"));
    }
}
