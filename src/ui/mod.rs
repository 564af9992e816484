// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Rendu de l'écran principal
pub mod chart;     // Rendu du graphique ligne

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
