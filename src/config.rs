// ============================================================================
// Configuration
// ============================================================================
// Valeurs par défaut, surchargées par variables d'environnement :
//
//   COINPULSE_API_URL            URL de base du backend
//   COINPULSE_TRANSLATE_URL      endpoint de traduction (gtx)
//   COINPULSE_LANGUAGE           langue initiale (en / fr)
//   COINPULSE_OHLCV_INTERVAL     intervalle des chandelles (1day)
//   COINPULSE_OHLCV_OUTPUTSIZE   nombre de chandelles (300)
//   COINPULSE_TYPEWRITER_MS      cadence du typewriter (30)
//   COINPULSE_HTTP_TIMEOUT_SECS  timeout des requêtes HTTP (15)
//
// Une valeur invalide est une erreur : mieux vaut refuser de démarrer que
// tourner avec une config silencieusement ignorée.
// ============================================================================

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::api::HistoryQuery;
use crate::i18n::Language;
use crate::orchestrator::Settings;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Configuration complète du binaire
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub translate_url: String,
    pub language: Language,
    pub history: HistoryQuery,
    pub typewriter_cadence: Duration,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            translate_url: DEFAULT_TRANSLATE_URL.to_string(),
            language: Language::default(),
            history: HistoryQuery::default(),
            typewriter_cadence: Duration::from_millis(30),
            http_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    /// Lit la configuration depuis l'environnement du process
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture
    ///
    /// CONCEPT RUST : closure en paramètre
    /// - Les tests passent une HashMap au lieu de toucher l'environnement
    ///   global (partagé entre threads de test)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("COINPULSE_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let translate_url = lookup("COINPULSE_TRANSLATE_URL").unwrap_or(defaults.translate_url);

        let language = match lookup("COINPULSE_LANGUAGE") {
            Some(raw) => raw
                .parse::<Language>()
                .map_err(|e| anyhow!(e))
                .context("COINPULSE_LANGUAGE invalide")?,
            None => defaults.language,
        };

        let interval = lookup("COINPULSE_OHLCV_INTERVAL").unwrap_or(defaults.history.interval);
        let outputsize = parse_var(&lookup, "COINPULSE_OHLCV_OUTPUTSIZE")?.unwrap_or(defaults.history.outputsize);
        if outputsize == 0 {
            return Err(anyhow!("COINPULSE_OHLCV_OUTPUTSIZE doit être supérieur à 0"));
        }

        let typewriter_cadence = parse_var::<u64, _>(&lookup, "COINPULSE_TYPEWRITER_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.typewriter_cadence);
        if typewriter_cadence.is_zero() {
            return Err(anyhow!("COINPULSE_TYPEWRITER_MS doit être supérieur à 0"));
        }

        let http_timeout = parse_var::<u64, _>(&lookup, "COINPULSE_HTTP_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Ok(Self {
            api_url,
            translate_url,
            language,
            history: HistoryQuery { interval, outputsize },
            typewriter_cadence,
            http_timeout,
        })
    }

    /// Réglages de l'orchestrateur
    pub fn settings(&self) -> Settings {
        Settings {
            history: self.history.clone(),
            typewriter_cadence: self.typewriter_cadence,
            initial_language: self.language,
        }
    }
}

/// Parse une variable numérique optionnelle
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{} invalide", key))
}

/// Répertoire des logs
///
/// Linux   : ~/.local/share/coinpulse/logs/
/// macOS   : ~/Library/Application Support/coinpulse/logs/
/// Windows : C:\Users\<user>\AppData\Local\coinpulse\logs\
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("coinpulse").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.history.interval, "1day");
        assert_eq!(config.history.outputsize, 300);

        let settings = config.settings();
        assert_eq!(settings.typewriter_cadence, Duration::from_millis(30));
        assert_eq!(settings.initial_language, Language::En);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("COINPULSE_API_URL", "https://api.example.com/"),
            ("COINPULSE_LANGUAGE", "fr"),
            ("COINPULSE_OHLCV_INTERVAL", "4h"),
            ("COINPULSE_OHLCV_OUTPUTSIZE", "250"),
            ("COINPULSE_TYPEWRITER_MS", "10"),
            ("COINPULSE_HTTP_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.language, Language::Fr);
        assert_eq!(config.history, HistoryQuery { interval: "4h".to_string(), outputsize: 250 });
        assert_eq!(config.typewriter_cadence, Duration::from_millis(10));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.settings().initial_language, Language::Fr);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = config_from(&[("COINPULSE_OHLCV_OUTPUTSIZE", "lots")]).unwrap_err();
        assert!(err.to_string().contains("COINPULSE_OHLCV_OUTPUTSIZE"));

        assert!(config_from(&[("COINPULSE_LANGUAGE", "de")]).is_err());
        assert!(config_from(&[("COINPULSE_TYPEWRITER_MS", "0")]).is_err());
        assert!(config_from(&[("COINPULSE_OHLCV_OUTPUTSIZE", "0")]).is_err());
    }

    #[test]
    fn test_log_dir_ends_with_app_name() {
        assert!(log_dir().ends_with("coinpulse/logs") || log_dir().ends_with("logs"));
    }
}
