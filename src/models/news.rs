// ============================================================================
// Structure : NewsItem
// ============================================================================
// Les titres non traduits font foi ; les titres traduits ne vivent que dans
// le cache jetable du TranslationService.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Une actualité liée à l'actif sélectionné
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
}

impl NewsItem {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}
