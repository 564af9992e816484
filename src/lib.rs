// ============================================================================
// CoinPulse - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;          // Clients backend et traduction
pub mod config;       // Configuration (variables d'environnement)
pub mod error;        // Erreurs typées
pub mod i18n;         // Langues et libellés fixes
pub mod indicators;   // RSI, MACD, SMA
pub mod models;       // Structures de données
pub mod orchestrator; // Machine à états du pipeline
pub mod translation;  // Traduction best-effort + cache des titres
pub mod typewriter;   // Révélation progressive du résumé
pub mod app;          // État de l'application
pub mod ui;           // Interface utilisateur
