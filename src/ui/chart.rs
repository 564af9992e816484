// ============================================================================
// Chart - Historique de prix de l'actif sélectionné
// ============================================================================
// Graphique ligne des close, avec les SMA 50 et 200 en surimpression
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : une série par courbe (close, SMA 50, SMA 200)
// 3. Axis : bornes et labels
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::i18n::Label;
use crate::indicators::{sma_series, SMA_LONG, SMA_SHORT};
use crate::models::ohlc::{closes, total_change_percent};

/// Points (x, y) d'une série SMA, en sautant les positions sans fenêtre complète
fn overlay_points(series: &[Option<f64>]) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .filter_map(|(i, value)| value.map(|v| (i as f64, v)))
        .collect()
}

/// Dessine le graphique de l'actif sélectionné
pub fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let orchestrator = app.orchestrator();
    let language = app.language();
    let history = orchestrator.chart();

    let title = match orchestrator.selected_asset() {
        Some(asset) => format!("{}- {} ", language.label(Label::Chart), asset.symbol),
        None => language.label(Label::Chart).to_string(),
    };

    if history.is_empty() {
        let message = if orchestrator.is_loading() {
            language.label(Label::Loading)
        } else {
            language.label(Label::Unavailable)
        };
        render_no_data(frame, area, &title, message);
        return;
    }

    let close_values = closes(history);
    let points: Vec<(f64, f64)> = close_values
        .iter()
        .enumerate()
        .map(|(i, &close)| (i as f64, close))
        .collect();
    let sma_short = overlay_points(&sma_series(&close_values, SMA_SHORT));
    let sma_long = overlay_points(&sma_series(&close_values, SMA_LONG));

    // Bornes calculées sur toutes les courbes affichées
    let (min_price, max_price) = points
        .iter()
        .chain(&sma_short)
        .chain(&sma_long)
        .fold((f64::MAX, f64::MIN), |(min, max), &(_x, y)| (min.min(y), max.max(y)));

    // Marge de 5% ; série plate : marge fixe pour garder une hauteur non nulle
    let margin = if max_price > min_price {
        (max_price - min_price) * 0.05
    } else {
        (max_price.abs() * 0.01).max(1.0)
    };
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let color = match total_change_percent(history) {
        Some(change) if change < 0.0 => Color::Red,
        _ => Color::Green,
    };

    let mut datasets = vec![Dataset::default()
        .name("close")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    if !sma_short.is_empty() {
        datasets.push(
            Dataset::default()
                .name(format!("SMA {}", SMA_SHORT))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Yellow))
                .data(&sma_short),
        );
    }
    if !sma_long.is_empty() {
        datasets.push(
            Dataset::default()
                .name(format!("SMA {}", SMA_LONG))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Magenta))
                .data(&sma_long),
        );
    }

    let first = history.first().map(|p| p.timestamp.format("%Y-%m-%d").to_string()).unwrap_or_default();
    let last = history.last().map(|p| p.timestamp.format("%Y-%m-%d").to_string()).unwrap_or_default();

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (points.len().saturating_sub(1)).max(1) as f64])
        .labels(vec![Span::raw(first), Span::raw(last)]);

    let y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("${:.2}", y_min)),
            Span::raw(format!("${:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("${:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Affiche un message à la place du graphique
fn render_no_data(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title.to_string());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
