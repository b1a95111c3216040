use crate::models::{Protocol, SecurityModule, SettingsState};
use crate::theme;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

/// One selectable line of the settings panel, protocols first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    Protocol(Protocol),
    Module(SecurityModule),
}

pub fn rows() -> Vec<SettingsRow> {
    Protocol::all()
        .iter()
        .map(|p| SettingsRow::Protocol(*p))
        .chain(SecurityModule::all().iter().map(|m| SettingsRow::Module(*m)))
        .collect()
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            theme::border_focused()
        } else {
            theme::border_default()
        })
}

pub fn render(frame: &mut Frame, area: Rect, settings: &SettingsState, cursor: usize) {
    let columns =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    let protocols = Protocol::all().len();

    let items: Vec<ListItem> = Protocol::all()
        .iter()
        .map(|p| {
            let mark = if *p == settings.protocol { "(x)" } else { "( )" };
            ListItem::new(format!("{} {}", mark, p.name()))
        })
        .collect();
    let in_protocols = cursor < protocols;
    let list = List::new(items)
        .block(panel("Transmission Protocol", in_protocols))
        .highlight_style(theme::table_selected())
        .highlight_symbol("› ");
    let mut state = ListState::default().with_selected(in_protocols.then_some(cursor));
    frame.render_stateful_widget(list, columns[0], &mut state);

    let items: Vec<ListItem> = SecurityModule::all()
        .iter()
        .map(|m| {
            let (label, style) = if settings.is_enabled(*m) {
                ("ON", theme::key_hint_key())
            } else {
                ("OFF", theme::key_hint())
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<24}", m.name())),
                Span::styled(label, style),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(panel("Security Modules", !in_protocols))
        .highlight_style(theme::table_selected())
        .highlight_symbol("› ");
    let mut state =
        ListState::default().with_selected((!in_protocols).then(|| cursor - protocols));
    frame.render_stateful_widget(list, columns[1], &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::render_to_string;

    #[test]
    fn test_rows_cover_every_option() {
        let rows = rows();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0], SettingsRow::Protocol(Protocol::WireGuard));
        assert_eq!(rows[4], SettingsRow::Module(SecurityModule::KillSwitch));
    }

    #[test]
    fn test_render_defaults() {
        let text = render_to_string(100, 8, |f| {
            render(f, f.area(), &SettingsState::default(), 0)
        });
        assert!(text.contains("(x) WireGuard"));
        assert!(text.contains("( ) Shadowsocks"));

        let split = text.lines().find(|l| l.contains("Split Tunneling")).unwrap();
        assert!(split.trim_end().trim_end_matches('│').trim_end().ends_with("OFF"));
        let kill = text.lines().find(|l| l.contains("Advanced Kill Switch")).unwrap();
        assert!(kill.contains(" ON"));
    }
}
