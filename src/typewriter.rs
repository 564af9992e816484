// ============================================================================
// TypewriterRenderer : révélation progressive du résumé
// ============================================================================
// Le texte (déjà traduit) est débarrassé de ses marqueurs markdown puis
// révélé caractère par caractère à cadence fixe (30ms par défaut).
//
// Deux pièces :
// - Typewriter : l'état pur (texte, compteur, génération), testable sans
//   runtime
// - TimerHandle : la tâche tokio qui émet les ticks ; annulée explicitement
//   à chaque redémarrage et au drop
//
// CONCEPT RUST : RAII
// - Drop sur TimerHandle abort la tâche : un timer oublié ne survit pas
// ============================================================================

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Cadence de référence : un caractère toutes les 30ms
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(30);

/// Retire les marqueurs d'emphase légers (markdown)
///
/// - `**gras**`, `__gras__`, `*italique*`, `` `code` `` → texte nu
/// - `# Titre` en début de ligne → `Titre`
/// - puces `* ` / `- ` en début de ligne → `• `
pub fn strip_markup(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];

            let body = if trimmed.starts_with('#') {
                trimmed.trim_start_matches('#').trim_start().to_string()
            } else if let Some(rest) = trimmed.strip_prefix("* ").or_else(|| trimmed.strip_prefix("- ")) {
                format!("• {}", rest)
            } else {
                trimmed.to_string()
            };

            let cleaned = body.replace("**", "").replace("__", "").replace(['*', '`'], "");
            format!("{}{}", indent, cleaned)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Résultat d'un tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Un caractère de plus est visible
    Advanced,
    /// Tout est visible : le timer doit être arrêté
    Finished,
    /// Tick d'un texte remplacé depuis : ignoré
    Stale,
}

/// État de la révélation
#[derive(Debug, Default, Clone)]
pub struct Typewriter {
    /// Texte nettoyé
    text: String,
    /// Offset (en octets) de fin de chaque caractère
    boundaries: Vec<usize>,
    /// Nombre de caractères visibles
    revealed: usize,
    /// Incrémentée à chaque nouveau texte
    generation: u64,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace le texte et repart de zéro caractère visible
    ///
    /// Retourne la nouvelle génération, à passer aux ticks du nouveau timer.
    pub fn reset(&mut self, text: &str) -> u64 {
        self.text = strip_markup(text);
        self.boundaries = self
            .text
            .char_indices()
            .map(|(offset, c)| offset + c.len_utf8())
            .collect();
        self.revealed = 0;
        self.generation += 1;

        debug!(generation = self.generation, units = self.total(), "Typewriter reset");
        self.generation
    }

    /// Révèle un caractère de plus si le tick appartient au texte courant
    pub fn advance(&mut self, generation: u64) -> Tick {
        if generation != self.generation {
            return Tick::Stale;
        }
        if self.revealed < self.total() {
            self.revealed += 1;
        }
        if self.is_complete() {
            Tick::Finished
        } else {
            Tick::Advanced
        }
    }

    /// Partie visible du texte
    pub fn visible(&self) -> &str {
        match self.revealed {
            0 => "",
            n => &self.text[..self.boundaries[n - 1]],
        }
    }

    /// Texte complet (nettoyé)
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    /// Nombre total de caractères à révéler
    pub fn total(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_complete(&self) -> bool {
        self.revealed >= self.total()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ============================================================================
// Timer
// ============================================================================

/// Handle de la tâche qui cadence la révélation
///
/// Une seule instance vivante à la fois : l'appelant annule l'ancienne avant
/// d'en créer une nouvelle.
#[derive(Debug)]
pub struct TimerHandle {
    handle: JoinHandle<()>,
}

impl TimerHandle {
    /// Démarre un timer qui appelle `on_tick` à chaque intervalle
    ///
    /// Le timer s'arrête de lui-même si `on_tick` retourne false (récepteur
    /// disparu). Doit être appelé depuis un runtime tokio.
    pub fn spawn<F>(cadence: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(cadence);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Le premier tick de tokio est immédiat : on part de zéro caractère
            interval.tick().await;

            loop {
                interval.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });

        Self { handle }
    }

    /// Arrête le timer
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
