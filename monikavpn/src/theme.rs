//! Palette and semantic styles for the dashboard.

use crate::models::ConnectionStatus;
use ratatui::style::{Color, Modifier, Style};

pub const INDIGO: Color = Color::Rgb(99, 102, 241); // #6366f1
pub const EMERALD: Color = Color::Rgb(16, 185, 129); // #10b981
pub const AMBER: Color = Color::Rgb(245, 158, 11); // #f59e0b
pub const ROSE: Color = Color::Rgb(244, 63, 94); // #f43f5e
pub const SLATE: Color = Color::Rgb(148, 163, 184); // #94a3b8
pub const BORDER: Color = Color::Rgb(71, 85, 105); // #475569
pub const BG_HIGHLIGHT: Color = Color::Rgb(30, 41, 59); // #1e293b

/// Downstream graph and labels.
pub const DOWNSTREAM: Color = INDIGO;
/// Upstream graph and labels.
pub const UPSTREAM: Color = EMERALD;

pub fn title_style() -> Style {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER)
}

pub fn border_focused() -> Style {
    Style::default().fg(INDIGO)
}

pub fn table_header() -> Style {
    Style::default().fg(SLATE).add_modifier(Modifier::BOLD)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn key_hint() -> Style {
    Style::default().fg(SLATE)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(INDIGO).add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default().fg(INDIGO).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(SLATE)
}

pub fn status_color(status: ConnectionStatus) -> Color {
    match status {
        ConnectionStatus::Disconnected => SLATE,
        ConnectionStatus::Connecting => AMBER,
        ConnectionStatus::Connected => EMERALD,
    }
}

pub fn error_style() -> Style {
    Style::default().fg(ROSE)
}
