// ============================================================================
// Langues d'affichage et libellés fixes de l'interface
// ============================================================================
// Deux langues supportées : l'anglais (langue source du backend) et le
// français. Les contenus dynamiques (résumé IA, titres de news) passent par
// le TranslationService ; les libellés fixes de l'écran viennent de la table
// ci-dessous, sans appel réseau.
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Langue d'affichage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// Anglais : langue source de tous les contenus du backend
    #[default]
    En,
    /// Français
    Fr,
}

impl Language {
    /// Langue dans laquelle le backend produit les textes
    pub const SOURCE: Language = Language::En;

    /// Code ISO 639-1 envoyé à l'endpoint de traduction
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// Bascule vers l'autre langue (toggle de l'interface)
    pub fn toggle(&self) -> Language {
        match self {
            Language::En => Language::Fr,
            Language::Fr => Language::En,
        }
    }

    /// Vrai si aucun travail de traduction n'est nécessaire
    pub fn is_source(&self) -> bool {
        *self == Language::SOURCE
    }

    /// Libellé fixe de l'interface dans cette langue
    pub fn label(&self, label: Label) -> &'static str {
        match self {
            Language::En => label.english(),
            Language::Fr => label.french(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "fr" | "french" | "français" => Ok(Language::Fr),
            other => Err(format!("langue non supportée : {}", other)),
        }
    }
}

// ============================================================================
// Table des libellés
// ============================================================================
// CONCEPT RUST : enum + match exhaustif
// - Ajouter un libellé oblige à fournir les deux traductions
// ============================================================================

/// Libellés fixes affichés par l'interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Title,
    Assets,
    Price,
    MarketCap,
    Volume24h,
    Change1h,
    Change24h,
    Change7d,
    Rank,
    Indicators,
    Chart,
    Summary,
    News,
    Loading,
    NoNews,
    NewsError,
    Unavailable,
    Quit,
    Navigate,
    Language,
    ConfirmQuit,
}

impl Label {
    fn english(&self) -> &'static str {
        match self {
            Label::Title => " CoinPulse ",
            Label::Assets => " Assets ",
            Label::Price => "Price",
            Label::MarketCap => "Market cap",
            Label::Volume24h => "Volume 24h",
            Label::Change1h => "1h",
            Label::Change24h => "24h",
            Label::Change7d => "7d",
            Label::Rank => "Rank",
            Label::Indicators => " Indicators ",
            Label::Chart => " Price history ",
            Label::Summary => " AI summary ",
            Label::News => " News ",
            Label::Loading => "Loading...",
            Label::NoNews => "No news",
            Label::NewsError => "News unavailable",
            Label::Unavailable => "N/A",
            Label::Quit => " Quit  ",
            Label::Navigate => " Select asset  ",
            Label::Language => " Language",
            Label::ConfirmQuit => " again to quit, any other key to cancel",
        }
    }

    fn french(&self) -> &'static str {
        match self {
            Label::Title => " CoinPulse ",
            Label::Assets => " Actifs ",
            Label::Price => "Prix",
            Label::MarketCap => "Capitalisation",
            Label::Volume24h => "Volume 24h",
            Label::Change1h => "1h",
            Label::Change24h => "24h",
            Label::Change7d => "7j",
            Label::Rank => "Rang",
            Label::Indicators => " Indicateurs ",
            Label::Chart => " Historique des prix ",
            Label::Summary => " Résumé IA ",
            Label::News => " Actualités ",
            Label::Loading => "Chargement...",
            Label::NoNews => "Aucune actualité",
            Label::NewsError => "Actualités indisponibles",
            Label::Unavailable => "N/D",
            Label::Quit => " Quitter  ",
            Label::Navigate => " Choisir un actif  ",
            Label::Language => " Langue",
            Label::ConfirmQuit => " à nouveau pour quitter, autre touche pour annuler",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycles_between_two_languages() {
        assert_eq!(Language::En.toggle(), Language::Fr);
        assert_eq!(Language::Fr.toggle(), Language::En);
        assert!(Language::En.is_source());
        assert!(!Language::Fr.is_source());
    }

    #[test]
    fn test_parse_language() {
        assert_eq!("FR".parse::<Language>(), Ok(Language::Fr));
        assert_eq!(" en ".parse::<Language>(), Ok(Language::En));
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_labels_follow_language() {
        assert_eq!(Language::En.label(Label::News), " News ");
        assert_eq!(Language::Fr.label(Label::News), " Actualités ");
    }
}
