use crate::models::RecommendationResult;
use crate::services::ServerCatalog;
use crate::theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    result: Option<&RecommendationResult>,
    catalog: &ServerCatalog,
    busy: bool,
) {
    let block = Block::default()
        .title(" AI Advisor ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default());

    let lines = if busy {
        vec![Line::from(Span::styled(
            "Analyzing network nodes...",
            Style::default().fg(theme::AMBER),
        ))]
    } else if let Some(result) = result {
        let heading = match catalog.find(&result.server_id) {
            Some(server) => format!("{} {}", server.flag, server.name),
            None => format!("Unknown server {}", result.server_id),
        };
        vec![
            Line::from(Span::styled(
                "AI Insights Generated",
                Style::default().fg(theme::INDIGO).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(heading, theme::title_style())),
            Line::from(Span::raw(format!("\"{}\"", result.reason))),
        ]
    } else {
        vec![
            Line::from("Describe what you are about to do and a server is picked for it."),
            Line::from(""),
            Line::from(vec![
                Span::styled("Enter", theme::key_hint_key()),
                Span::styled(" to ask", theme::key_hint()),
            ]),
        ]
    };

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
