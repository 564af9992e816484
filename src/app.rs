// ============================================================================
// Structure : App
// ============================================================================
// État de l'interface TUI autour de l'orchestrateur
//
// CONCEPTS RUST :
// 1. Composition : App possède l'Orchestrator, l'UI ne voit que App
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Encapsulation : le curseur et la sélection restent synchronisés
//
// PATTERN : "Application State"
// - Les composants de l'UI lisent depuis App
// - Les touches passent par les méthodes de App
// - Le curseur de la liste suit la sélection de l'orchestrateur
// ============================================================================

use crate::i18n::Language;
use crate::orchestrator::{Orchestrator, Outcome};

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Index de l'actif sous le curseur
    pub selected_index: usize,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression de 'q' : running = false (quit réel)
    /// - N'importe quelle autre touche : confirm_quit = false (annulation)
    pub confirm_quit: bool,

    orchestrator: Orchestrator,
}

impl App {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            running: true,
            selected_index: 0,
            confirm_quit: false,
            orchestrator,
        }
    }

    /// Lance le chargement initial de la liste d'actifs
    pub fn start(&mut self) {
        self.orchestrator.start();
    }

    /// Transmet le résultat d'une tâche à l'orchestrateur
    pub fn apply(&mut self, outcome: Outcome) {
        self.orchestrator.apply(outcome);
        self.sync_cursor();
    }

    /// Lecture seule pour le rendu
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn language(&self) -> Language {
        self.orchestrator.language()
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Remonte d'un actif et le sélectionne
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        let index = self.selected_index.saturating_sub(1);
        self.select_index(index);
    }

    /// Descend d'un actif et le sélectionne
    pub fn navigate_down(&mut self) {
        let max_index = self.orchestrator.assets().len().saturating_sub(1);
        let index = (self.selected_index + 1).min(max_index);
        self.select_index(index);
    }

    /// Sélectionne l'actif à `index` s'il est différent du courant
    fn select_index(&mut self, index: usize) {
        if index == self.selected_index && self.orchestrator.selection().symbol.is_some() {
            return;
        }

        let Some(symbol) = self.orchestrator.assets().get(index).map(|a| a.symbol.clone()) else {
            return;
        };

        self.selected_index = index;
        self.orchestrator.select(&symbol);
    }

    /// Replace le curseur sur l'actif sélectionné par l'orchestrateur
    fn sync_cursor(&mut self) {
        let Some(symbol) = self.orchestrator.selection().symbol.as_deref() else {
            return;
        };
        if let Some(index) = self.orchestrator.assets().iter().position(|a| a.symbol == symbol) {
            self.selected_index = index;
        }
    }

    pub fn toggle_language(&mut self) {
        self.orchestrator.toggle_language();
    }

    // ========================================================================
    // Quit en deux temps
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
