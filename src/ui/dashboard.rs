// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Un seul écran :
//
//   ┌ header : actif sélectionné + métriques ───────────────────────┐
//   ├ actifs ─┬ graphique ─────────────────────────────────────────┤
//   │         ├ indicateurs ─┬ actualités ─────────────────────────┤
//   │         ├ résumé IA (typewriter) ────────────────────────────┤
//   ├ footer : raccourcis / confirmation / erreur ─────────────────┘
//
// Tous les libellés fixes passent par i18n : l'écran entier suit la langue.
//
// CONCEPTS RATATUI :
// 1. Layout : découpage de l'espace en zones imbriquées
// 2. List, Paragraph, Block : widgets de base
// 3. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::i18n::{Label, Language};
use crate::models::asset::{format_compact, format_price};
use crate::models::indicators::{format_reading, MACD_DECIMALS, RSI_DECIMALS, SMA_DECIMALS};
use crate::orchestrator::{Phase, SlotStatus};
use crate::ui::chart;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    render_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[1]);

    render_asset_list(frame, app, body[0]);

    let detail = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Graphique
            Constraint::Length(8),      // Indicateurs + news
            Constraint::Min(0),         // Résumé
        ])
        .split(body[1]);

    chart::render_chart(frame, app, detail[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(detail[1]);

    render_indicators(frame, app, middle[0]);
    render_news(frame, app, middle[1]);
    render_summary(frame, app, detail[2]);

    render_footer(frame, app, chunks[2]);
}

// ============================================================================
// Header : actif sélectionné
// ============================================================================

fn change_span(value: Option<f64>, language: Language) -> Span<'static> {
    match value {
        Some(change) => {
            let (arrow, color) = if change >= 0.0 {
                ("▲", Color::Green)
            } else {
                ("▼", Color::Red)
            };
            Span::styled(format!("{} {:+.2}%", arrow, change), Style::default().fg(color))
        }
        None => Span::styled(language.label(Label::Unavailable), Style::default().fg(Color::Gray)),
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let language = app.language();
    let orchestrator = app.orchestrator();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(language.label(Label::Title))
        .title_alignment(Alignment::Center);

    let label = |l: Label| Span::styled(format!("{}: ", language.label(l)), Style::default().fg(Color::Gray));

    let lines = match orchestrator.selected_asset() {
        Some(asset) => {
            let color = if asset.is_positive() { Color::Green } else { Color::Red };
            vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} ", asset.symbol),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("{}   ", asset.name)),
                    label(Label::Price),
                    Span::styled(
                        format_price(asset.price),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("   "),
                    label(Label::Rank),
                    Span::raw(format!("#{}", asset.rank)),
                ]),
                Line::from(vec![
                    label(Label::MarketCap),
                    Span::raw(
                        asset
                            .market_cap
                            .map(format_compact)
                            .unwrap_or_else(|| language.label(Label::Unavailable).to_string()),
                    ),
                    Span::raw("   "),
                    label(Label::Volume24h),
                    Span::raw(
                        asset
                            .volume_24h
                            .map(format_compact)
                            .unwrap_or_else(|| language.label(Label::Unavailable).to_string()),
                    ),
                    Span::raw("   "),
                    label(Label::Change1h),
                    change_span(asset.change_1h, language),
                    Span::raw("  "),
                    label(Label::Change24h),
                    change_span(asset.change_24h, language),
                    Span::raw("  "),
                    label(Label::Change7d),
                    change_span(asset.change_7d, language),
                ]),
            ]
        }
        None => vec![Line::from(Span::styled(
            language.label(Label::Loading),
            Style::default().fg(Color::Gray),
        ))],
    };

    let paragraph = Paragraph::new(lines).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Liste des actifs
// ============================================================================

fn render_asset_list(frame: &mut Frame, app: &App, area: Rect) {
    let language = app.language();
    let orchestrator = app.orchestrator();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(language.label(Label::Assets));

    if orchestrator.assets().is_empty() {
        let message = match orchestrator.phase() {
            Phase::QuotesFailed { reason } => Span::styled(reason.clone(), Style::default().fg(Color::Red)),
            _ => Span::styled(language.label(Label::Loading), Style::default().fg(Color::Gray)),
        };
        let paragraph = Paragraph::new(vec![Line::from(""), Line::from(message)])
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = orchestrator
        .assets()
        .iter()
        .map(|asset| {
            let style = if asset.is_positive() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };
            ListItem::new(asset.display()).style(style)
        })
        .collect();

    // CONCEPT RATATUI : ListState
    // - Le widget fait défiler la liste pour garder l'item sélectionné visible
    let mut state = ListState::default().with_selected(Some(app.selected_index));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    frame.render_stateful_widget(list, area, &mut state);
}

// ============================================================================
// Indicateurs
// ============================================================================

fn render_indicators(frame: &mut Frame, app: &App, area: Rect) {
    let language = app.language();
    let na = language.label(Label::Unavailable);
    let rounded = app.orchestrator().indicators().rounded();

    let row = |name: &str, value: Option<f64>, decimals: i32| {
        let style = if value.is_some() {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(vec![
            Span::styled(format!("{:<10}", name), Style::default().fg(Color::Gray)),
            Span::styled(format_reading(value, decimals as usize, na), style),
        ])
    };

    let lines = vec![
        row("RSI 14", rounded.rsi, RSI_DECIMALS),
        row("MACD", rounded.macd, MACD_DECIMALS),
        row("Signal", rounded.macd_signal, MACD_DECIMALS),
        row("Hist.", rounded.macd_histogram, MACD_DECIMALS),
        row("SMA 50", rounded.sma50, SMA_DECIMALS),
        row("SMA 200", rounded.sma200, SMA_DECIMALS),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(language.label(Label::Indicators));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Actualités
// ============================================================================

fn render_news(frame: &mut Frame, app: &App, area: Rect) {
    let language = app.language();
    let orchestrator = app.orchestrator();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(language.label(Label::News));

    let lines: Vec<Line> = match orchestrator.news_status() {
        SlotStatus::Pending => vec![Line::from(Span::styled(
            language.label(Label::Loading),
            Style::default().fg(Color::Gray),
        ))],
        SlotStatus::Failed(_) => vec![Line::from(Span::styled(
            language.label(Label::NewsError),
            Style::default().fg(Color::Red),
        ))],
        _ if orchestrator.news().next().is_none() => vec![Line::from(Span::styled(
            language.label(Label::NoNews),
            Style::default().fg(Color::Gray),
        ))],
        _ => orchestrator
            .news()
            .map(|(title, _item)| Line::from(vec![Span::styled("• ", Style::default().fg(Color::Yellow)), Span::raw(title.to_string())]))
            .collect(),
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Résumé IA
// ============================================================================

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let language = app.language();
    let orchestrator = app.orchestrator();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(language.label(Label::Summary));

    let style = match orchestrator.summary_status() {
        SlotStatus::Failed(_) | SlotStatus::Skipped => Style::default().fg(Color::Gray),
        _ => Style::default().fg(Color::White),
    };

    let mut text = if orchestrator.summary_status() == &SlotStatus::Pending {
        language.label(Label::Loading).to_string()
    } else {
        orchestrator.summary_visible().to_string()
    };
    if orchestrator.is_typing() {
        text.push('▌');
    }

    let lines: Vec<Line> = text.lines().map(|l| Line::from(Span::styled(l.to_string(), style))).collect();
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : raccourcis, confirmation de quit, erreur
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let language = app.language();
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                language.label(Label::ConfirmQuit),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if let Some(error) = app.orchestrator().error() {
        Line::from(Span::styled(format!("⚠ {}", error), Style::default().fg(Color::Red)))
    } else {
        Line::from(vec![
            key("[q]"),
            Span::raw(language.label(Label::Quit)),
            key("[↑↓ / j k]"),
            Span::raw(language.label(Label::Navigate)),
            key("[l]"),
            Span::raw(format!("{} ({})", language.label(Label::Language), language.code().to_uppercase())),
        ])
    };

    let paragraph = Paragraph::new(vec![line]).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
