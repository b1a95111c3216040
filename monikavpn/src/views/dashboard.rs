use crate::models::{ConnectionStatus, TelemetrySample};
use crate::services::session::Session;
use crate::services::telemetry::{DOWNSTREAM_RANGE, UPSTREAM_RANGE};
use crate::theme;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Sparkline},
    Frame,
};

pub fn button_label(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Disconnected => "Connect",
        ConnectionStatus::Connecting => "Shielding",
        ConnectionStatus::Connected => "Secure",
    }
}

pub fn status_label(status: ConnectionStatus) -> &'static str {
    if status == ConnectionStatus::Connected {
        "ENCRYPTED"
    } else {
        "READY"
    }
}

/// Newest downstream/upstream pair, zero when there is no sample yet.
pub fn latest_throughput(samples: &[TelemetrySample]) -> (u32, u32) {
    samples
        .last()
        .map(|s| (s.downstream, s.upstream))
        .unwrap_or((0, 0))
}

pub fn render(frame: &mut Frame, area: Rect, session: &Session, samples: &[TelemetrySample]) {
    let block = Block::default()
        .title(" Dashboard ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::vertical([
        Constraint::Length(1), // button + server
        Constraint::Length(1), // status + session clock
        Constraint::Length(1),
        Constraint::Length(1), // DL label
        Constraint::Length(3), // DL sparkline
        Constraint::Length(1), // UL label
        Constraint::Length(3), // UL sparkline
        Constraint::Min(0),
    ])
    .split(inner);

    let color = theme::status_color(session.status);
    let server = &session.selected_server;
    let header = Line::from(vec![
        Span::styled(
            format!("[ {} ]", button_label(session.status)),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("{} {}", server.flag, server.name), theme::title_style()),
        Span::styled(format!("  {}", server.ip), theme::key_hint()),
    ]);
    frame.render_widget(Paragraph::new(header), layout[0]);

    let status = Line::from(vec![
        Span::styled("Connection Status: ", theme::key_hint()),
        Span::styled(
            format!("{:<10}", status_label(session.status)),
            Style::default().fg(color),
        ),
        Span::styled("Active Session: ", theme::key_hint()),
        Span::raw(session.display_elapsed()),
    ]);
    frame.render_widget(Paragraph::new(status), layout[1]);

    let (down, up) = latest_throughput(samples);
    let downstream: Vec<u64> = samples.iter().map(|s| u64::from(s.downstream)).collect();
    let upstream: Vec<u64> = samples.iter().map(|s| u64::from(s.upstream)).collect();

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("Downstream: {} MB/s", down),
            Style::default().fg(theme::DOWNSTREAM),
        )),
        layout[3],
    );
    frame.render_widget(
        Sparkline::default()
            .data(&downstream)
            .max(u64::from(*DOWNSTREAM_RANGE.end()))
            .style(Style::default().fg(theme::DOWNSTREAM)),
        layout[4],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("Upstream: {} MB/s", up),
            Style::default().fg(theme::UPSTREAM),
        )),
        layout[5],
    );
    frame.render_widget(
        Sparkline::default()
            .data(&upstream)
            .max(u64::from(*UPSTREAM_RANGE.end()))
            .style(Style::default().fg(theme::UPSTREAM)),
        layout[6],
    );
}
