// ============================================================================
// CoinPulse - Dashboard crypto dans le terminal
// ============================================================================
// Liste des actifs, historique + indicateurs techniques, résumé IA révélé
// en typewriter, actualités ; le tout basculable en français.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop async : tokio::select! entre résultats réseau et clavier
// 3. Runtime current_thread : toutes les mutations d'état sur un seul thread
// 4. RAII : restauration du terminal même en cas d'erreur
// ============================================================================

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info};

use coinpulse::api::{GoogleTranslator, HttpApi};
use coinpulse::app::App;
use coinpulse::config::{self, Config};
use coinpulse::orchestrator::{Orchestrator, Outcome};
use coinpulse::ui::events::{is_down_event, is_language_event, is_quit_event, is_up_event, Event, EventHandler};
use coinpulse::ui::render;

/// Durée d'une frame quand aucun résultat n'arrive
const FRAME: Duration = Duration::from_millis(16);

// ============================================================================
// Logging
// ============================================================================
// La sortie standard appartient au TUI : les logs vont dans un fichier
// avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans :
/// - Linux : ~/.local/share/coinpulse/logs/coinpulse.log
/// - macOS : ~/Library/Application Support/coinpulse/logs/coinpulse.log
/// - Windows : C:\Users\<user>\AppData\Local\coinpulse\logs\coinpulse.log
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/coinpulse/logs/coinpulse.log
/// RUST_LOG=coinpulse=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = config::log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "coinpulse.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour coinpulse, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinpulse=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée
// ============================================================================
// CONCEPT : runtime current_thread
// - Les tâches réseau et le timer du typewriter tournent sur le même thread
//   que la boucle UI ; elles avancent pendant les await de la boucle
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    let config = Config::from_env().context("Configuration invalide")?;
    info!(api_url = %config.api_url, language = %config.language, "CoinPulse starting up");

    let api = HttpApi::new(&config.api_url, config.http_timeout).context("Échec de la création du client HTTP")?;
    let translator = GoogleTranslator::new(&config.translate_url, config.http_timeout)
        .context("Échec de la création du client de traduction")?;

    let (orchestrator, outcomes) = Orchestrator::new(Arc::new(api), Arc::new(translator), config.settings());
    let mut app = App::new(orchestrator);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    app.start();
    let result = run(&mut terminal, &mut app, outcomes).await;

    // Restaure le terminal AVANT de propager une éventuelle erreur
    restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        error!(error = %e, "Application error");
    }
    info!("CoinPulse shut down");
    result
}

// ============================================================================
// Boucle principale
// ============================================================================
// Render → attente (résultat réseau OU fin de frame) → clavier
// ============================================================================

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut outcomes: UnboundedReceiver<Outcome>,
) -> Result<()> {
    let events = EventHandler::new();

    while app.is_running() {
        terminal.draw(|frame| render(frame, app))?;

        tokio::select! {
            Some(outcome) = outcomes.recv() => {
                app.apply(outcome);
                // Vide la file : un seul rendu pour une rafale de résultats
                while let Ok(outcome) = outcomes.try_recv() {
                    app.apply(outcome);
                }
            }
            _ = tokio::time::sleep(FRAME) => {}
        }

        loop {
            match events.next(Duration::ZERO)? {
                Event::Tick => break,
                event => handle_event(app, event),
            }
        }
    }

    Ok(())
}

/// Traite un événement clavier
///
/// CONCEPT : Two-step quit
/// - Premier 'q' : demande confirmation
/// - Deuxième 'q' : quitte
/// - Toute autre touche annule la demande
fn handle_event(app: &mut App, event: Event) {
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            app.request_quit();
        }
        return;
    }

    if app.is_awaiting_quit_confirmation() {
        app.cancel_quit();
        return;
    }

    match event {
        e if is_up_event(&e) => app.navigate_up(),
        e if is_down_event(&e) => app.navigate_down(),
        e if is_language_event(&e) => app.toggle_language(),
        _ => {}
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Échec de l'entrée en alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de la création du terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
