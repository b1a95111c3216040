use crate::models::{Region, Server};
use crate::theme;
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub struct ServerList<'a> {
    pub servers: &'a [&'a Server],
    pub selected_id: &'a str,
    pub cursor: usize,
    pub query: &'a str,
    pub region: Option<Region>,
}

pub fn render(frame: &mut Frame, area: Rect, list: &ServerList<'_>) {
    let mut title = vec![Span::styled(
        format!(" Servers · {} Active ", list.servers.len()),
        theme::title_style(),
    )];
    if let Some(region) = list.region {
        title.push(Span::styled(format!("[{}] ", region), theme::key_hint_key()));
    }
    if !list.query.is_empty() {
        title.push(Span::styled(format!("/{} ", list.query), theme::key_hint()));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());

    if list.servers.is_empty() {
        let empty = Paragraph::new(Span::styled("No matching nodes found", theme::key_hint()))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["", "ID", "Server", "Country", "IP", "Ping", "Load", "Region"])
        .style(theme::table_header());

    let rows: Vec<Row> = list
        .servers
        .iter()
        .map(|s| {
            let marker = if s.id == list.selected_id { "●" } else { " " };
            Row::new(vec![
                Cell::from(Span::styled(marker, Style::default().fg(theme::EMERALD))),
                Cell::from(s.id.as_str()),
                Cell::from(format!("{} {}", s.flag, s.name)),
                Cell::from(s.country.as_str()),
                Cell::from(s.ip.as_str()),
                Cell::from(format!("{} ms", s.ping)),
                Cell::from(format!("{}%", s.load)),
                Cell::from(s.region.to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(18),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Min(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(theme::table_selected())
        .highlight_symbol("› ");

    let mut state = TableState::default().with_selected(Some(list.cursor));
    frame.render_stateful_widget(table, area, &mut state);
}
