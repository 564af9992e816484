// ============================================================================
// API Client : traduction automatique
// ============================================================================
// Endpoint public "translate_a/single" (client=gtx) :
//   POST {url}?client=gtx&sl=en&tl=fr&dt=t   body: q=<texte>
// Réponse : tableau imbriqué, le premier élément liste les segments traduits
//   [[["Bonjour le monde","Hello world",...], ...], ...]
//
// Cet endpoint est considéré non fiable : toutes les erreurs remontent en
// TranslationError et le TranslationService les absorbe.
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::TranslationError;
use crate::i18n::Language;

/// Traducteur distant
#[async_trait]
pub trait Translator: Send + Sync {
    /// Traduit `text` de `source` vers `target`
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError>;
}

/// Client de l'endpoint gtx
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TranslationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    #[instrument(skip_all, fields(chars = text.chars().count(), from = %source, to = %target))]
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslationError::Malformed(e.to_string()))?;

        let translated = parse_segments(&body)?;
        debug!(chars = translated.chars().count(), "Translation received");
        Ok(translated)
    }
}

/// Concatène les segments traduits de la réponse gtx
fn parse_segments(body: &Value) -> Result<String, TranslationError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Malformed("missing segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(TranslationError::Malformed("empty translation".to_string()));
    }

    Ok(translated)
}
