// ============================================================================
// TranslationService : traduction best-effort
// ============================================================================
// Contrat :
// - langue cible == langue source → texte inchangé, aucun appel réseau
// - sinon appel au Translator ; en cas d'échec (réseau, réponse invalide),
//   on retourne le texte ORIGINAL. La traduction ne fait jamais échouer la
//   fonctionnalité qu'elle accompagne.
//
// La règle de course (résultat jeté si la langue ou le contenu a changé)
// est appliquée par l'orchestrateur via TranslationTag.
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::api::Translator;
use crate::error::CycleError;
use crate::i18n::Language;

/// Service de traduction partagé entre les tâches
///
/// CONCEPT RUST : Arc<dyn Trait>
/// - Clone ne copie que le pointeur, chaque tâche peut emporter le service
#[derive(Clone)]
pub struct TranslationService {
    translator: Arc<dyn Translator>,
}

impl TranslationService {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Vrai si la langue cible ne nécessite aucun travail
    pub fn is_passthrough(&self, target: Language) -> bool {
        target.is_source()
    }

    /// Traduit un texte ; retombe sur l'original en cas d'échec
    pub async fn translate(&self, text: &str, target: Language) -> String {
        self.try_translate(text, target)
            .await
            .unwrap_or_else(|| text.to_string())
    }

    /// Comme `translate`, mais None quand le texte a dû retomber sur l'original
    ///
    /// Permet à l'appelant de ne pas mettre en cache un repli.
    pub async fn try_translate(&self, text: &str, target: Language) -> Option<String> {
        if self.is_passthrough(target) || text.trim().is_empty() {
            return Some(text.to_string());
        }

        match self.translator.translate(text, Language::SOURCE, target).await {
            Ok(translated) if !translated.trim().is_empty() => Some(translated),
            Ok(_) => {
                debug!(%target, "Empty translation, keeping original text");
                None
            }
            Err(e) => {
                let err = CycleError::Translation(e);
                warn!(%target, error = %err, "Falling back to untranslated text");
                None
            }
        }
    }

    /// Traduit un lot en conservant l'ordre
    ///
    /// Chaque élément est best-effort : None pour un élément en repli.
    pub async fn translate_batch(&self, texts: &[String], target: Language) -> Vec<Option<String>> {
        if self.is_passthrough(target) {
            return texts.iter().cloned().map(Some).collect();
        }

        // join_all rend les résultats dans l'ordre des futures, quel que soit
        // l'ordre de complétion
        join_all(texts.iter().map(|text| self.try_translate(text, target))).await
    }
}

// ============================================================================
// Cache des titres traduits
// ============================================================================

/// Titres de news traduits, indexés par (langue, position)
///
/// Cache jetable : vidé dès que la liste de news est remplacée, jamais
/// considéré comme source de vérité.
#[derive(Debug, Default, Clone)]
pub struct TitleCache {
    entries: HashMap<(Language, usize), String>,
}

impl TitleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre les titres traduits d'un lot ; les replis ne sont pas gardés
    pub fn store(&mut self, language: Language, titles: &[Option<String>]) {
        for (index, title) in titles.iter().enumerate() {
            if let Some(title) = title {
                self.entries.insert((language, index), title.clone());
            }
        }
    }

    /// Retourne les `count` titres d'une langue s'ils sont tous en cache
    pub fn get_all(&self, language: Language, count: usize) -> Option<Vec<String>> {
        (0..count)
            .map(|index| self.entries.get(&(language, index)).cloned())
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
