//! Application core: event loop, key mapping, action dispatch and layout.

use crate::action::{Action, Screen};
use crate::console::{self, Command, Outcome};
use crate::error::AppError;
use crate::event::{Event, EventReader};
use crate::models::{ConnectionStatus, Region, Server, TelemetrySample};
use crate::services::servers::matches_query;
use crate::services::{Session, SessionEvent};
use crate::state::DashboardState;
use crate::theme;
use crate::tui::Tui;
use crate::views::{self, servers::ServerList, settings::SettingsRow};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
    Frame,
};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);
const RENDER_RATE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a `:` command.
    Command,
    /// Typing a `/` server search; the list filters as you type.
    Search,
}

#[derive(Debug, Clone, PartialEq)]
struct Notice {
    text: String,
    error: bool,
}

pub struct App {
    state: DashboardState,
    screen: Screen,
    running: bool,
    help_visible: bool,
    mode: InputMode,
    input: String,
    query: String,
    region: Option<Region>,
    server_cursor: usize,
    settings_cursor: usize,
    notice: Option<Notice>,
    busy: bool,
    // Copied from the state on every tick so rendering never awaits.
    session: Session,
    samples: Vec<TelemetrySample>,
}

impl App {
    pub async fn new(state: DashboardState) -> Self {
        let session = state.session().await;
        let samples = state.telemetry().await;
        Self {
            state,
            screen: Screen::Dashboard,
            running: true,
            help_visible: false,
            mode: InputMode::Normal,
            input: String::new(),
            query: String::new(),
            region: None,
            server_cursor: 0,
            settings_cursor: 0,
            notice: None,
            busy: false,
            session,
            samples,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    /// The server list after the region and search filters.
    pub fn visible_servers(&self) -> Vec<&Server> {
        let catalog = self.state.catalog();
        match self.region {
            None => catalog.filter(&self.query),
            Some(region) => catalog
                .in_region(region)
                .into_iter()
                .filter(|s| matches_query(s, &self.query))
                .collect(),
        }
    }

    pub async fn run(&mut self) -> Result<(), AppError> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        let mut events = EventReader::new(TICK_RATE, RENDER_RATE);
        let mut session_rx = self.state.subscribe();

        info!("Dashboard event loop started");
        while self.running {
            let action = tokio::select! {
                event = events.next() => match event {
                    Some(Event::Key(key)) => self.handle_key_event(key),
                    Some(Event::Resize(..)) | Some(Event::Render) => Some(Action::Render),
                    Some(Event::Tick) => Some(Action::Tick),
                    None => break,
                },
                event = session_rx.recv() => match event {
                    Ok(event) => Some(Action::Session(event)),
                    Err(RecvError::Lagged(n)) => {
                        debug!("Event loop skipped {} session events", n);
                        None
                    }
                    Err(RecvError::Closed) => break,
                },
            };
            let Some(action) = action else {
                continue;
            };

            match action {
                Action::Render => tui.draw(|frame| self.render(frame))?,
                Action::SubmitInput if self.mode == InputMode::Command => {
                    // A recommendation can take seconds; show that work is underway.
                    self.busy = true;
                    tui.draw(|frame| self.render(frame))?;
                    self.process_action(action).await;
                }
                other => self.process_action(other).await,
            }
        }

        events.stop();
        tui.exit();
        info!("Dashboard event loop ended");
        Ok(())
    }

    /// Input line first, then the help overlay, then global keys, then keys
    /// that mean something on the current screen.
    pub fn handle_key_event(&self, key: KeyEvent) -> Option<Action> {
        if self.mode != InputMode::Normal {
            return match key.code {
                KeyCode::Esc => Some(Action::CancelInput),
                KeyCode::Enter => Some(Action::SubmitInput),
                KeyCode::Backspace => Some(Action::InputBackspace),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Action::CancelInput)
                }
                KeyCode::Char(c) => Some(Action::InputChar(c)),
                _ => None,
            };
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
                Some(Action::Quit)
            }
            (_, KeyCode::Char('?')) => Some(Action::ToggleHelp),
            (_, KeyCode::Char(':')) => Some(Action::OpenCommand(String::new())),
            (_, KeyCode::Char('/')) => Some(Action::OpenSearch),
            (_, KeyCode::Char('c')) => Some(Action::ToggleConnection),
            (_, KeyCode::Char(c @ '1'..='9')) => {
                Screen::from_number(c as u8 - b'0').map(Action::SwitchScreen)
            }
            (_, KeyCode::Tab) => Some(Action::NextScreen),
            (_, KeyCode::Up) | (_, KeyCode::Char('k')) => Some(Action::ScrollUp),
            (_, KeyCode::Down) | (_, KeyCode::Char('j')) => Some(Action::ScrollDown),
            (_, KeyCode::Enter) => Some(Action::Activate),
            (_, KeyCode::Char('r')) if self.screen == Screen::Servers => Some(Action::CycleRegion),
            _ => None,
        }
    }

    pub async fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Tick => self.refresh().await,
            Action::Render => {}
            Action::SwitchScreen(screen) => self.screen = screen,
            Action::NextScreen => self.screen = self.screen.next(),
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::ScrollUp => self.move_cursor(-1),
            Action::ScrollDown => self.move_cursor(1),
            Action::Activate => self.activate().await,
            Action::CycleRegion => {
                self.region = next_region(self.region);
                self.server_cursor = 0;
            }
            Action::ToggleConnection => {
                self.state.toggle_connection().await;
                self.refresh().await;
            }
            Action::Session(event) => {
                match event {
                    SessionEvent::StatusChanged(ConnectionStatus::Connected) => {
                        self.notice = Some(Notice::info("Connected securely"));
                    }
                    SessionEvent::HandshakeFailed(reason) => {
                        let err = AppError::Handshake(reason);
                        self.notice = Some(Notice::error(err.user_friendly_message()));
                    }
                    _ => {}
                }
                self.refresh().await;
            }
            Action::OpenCommand(prefill) => {
                self.mode = InputMode::Command;
                self.input = prefill;
            }
            Action::OpenSearch => {
                self.mode = InputMode::Search;
                self.screen = Screen::Servers;
                self.input = self.query.clone();
            }
            Action::InputChar(c) => {
                self.input.push(c);
                self.sync_search();
            }
            Action::InputBackspace => {
                self.input.pop();
                self.sync_search();
            }
            Action::SubmitInput => match self.mode {
                InputMode::Command => self.run_command().await,
                _ => {
                    self.mode = InputMode::Normal;
                    self.input.clear();
                }
            },
            Action::CancelInput => {
                self.mode = InputMode::Normal;
                self.input.clear();
            }
        }
    }

    async fn refresh(&mut self) {
        self.session = self.state.session().await;
        self.samples = self.state.telemetry().await;
    }

    fn sync_search(&mut self) {
        if self.mode == InputMode::Search {
            self.query = self.input.clone();
            self.server_cursor = 0;
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = match self.screen {
            Screen::Servers => self.visible_servers().len(),
            Screen::Settings => views::settings::rows().len(),
            _ => return,
        };
        let cursor = if self.screen == Screen::Servers {
            &mut self.server_cursor
        } else {
            &mut self.settings_cursor
        };
        if len == 0 {
            *cursor = 0;
            return;
        }
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
    }

    async fn activate(&mut self) {
        match self.screen {
            Screen::Dashboard => {
                self.state.toggle_connection().await;
                self.refresh().await;
            }
            Screen::Servers => {
                let Some(id) = self
                    .visible_servers()
                    .get(self.server_cursor)
                    .map(|s| s.id.clone())
                else {
                    return;
                };
                match self.state.select_server(&id).await {
                    Ok(server) => {
                        self.notice = Some(Notice::info(format!(
                            "Selected {} {}",
                            server.flag, server.name
                        )));
                    }
                    Err(e) => self.notice = Some(Notice::error(e.user_friendly_message())),
                }
                self.refresh().await;
            }
            Screen::Recommendation => {
                self.mode = InputMode::Command;
                self.input = "recommend ".to_string();
            }
            Screen::Settings => match views::settings::rows().get(self.settings_cursor) {
                Some(SettingsRow::Protocol(protocol)) => self.state.set_protocol(*protocol),
                Some(SettingsRow::Module(module)) => {
                    self.state.toggle_module(*module);
                }
                None => {}
            },
        }
    }

    async fn run_command(&mut self) {
        let line = std::mem::take(&mut self.input);
        self.mode = InputMode::Normal;

        let result = match Command::parse(&line) {
            Ok(cmd) => console::execute(&mut self.state, cmd).await,
            Err(e) => Err(e),
        };
        self.busy = false;

        match result {
            Ok(Outcome::Notice(text)) => {
                self.notice = (!text.is_empty()).then(|| Notice::info(text));
            }
            Ok(Outcome::Show(screen)) => self.screen = screen,
            Ok(Outcome::Search(query)) => {
                self.query = query;
                self.region = None;
                self.server_cursor = 0;
                self.screen = Screen::Servers;
            }
            Ok(Outcome::Help) => self.help_visible = true,
            Ok(Outcome::Quit) => self.running = false,
            Err(e) => {
                warn!("Command {:?} failed: {}", line, e);
                self.notice = Some(Notice::error(e.user_friendly_message()));
            }
        }
        self.refresh().await;
    }

    pub fn render(&self, frame: &mut Frame) {
        let layout = Layout::vertical([
            Constraint::Length(1), // tabs
            Constraint::Min(1),    // screen
            Constraint::Length(1), // input line / notice
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

        self.render_tabs(frame, layout[0]);

        match self.screen {
            Screen::Dashboard => {
                views::dashboard::render(frame, layout[1], &self.session, &self.samples)
            }
            Screen::Servers => {
                let servers = self.visible_servers();
                let list = ServerList {
                    servers: &servers,
                    selected_id: &self.session.selected_server.id,
                    cursor: self.server_cursor,
                    query: &self.query,
                    region: self.region,
                };
                views::servers::render(frame, layout[1], &list);
            }
            Screen::Recommendation => views::recommendation::render(
                frame,
                layout[1],
                self.state.last_recommendation(),
                self.state.catalog(),
                self.busy,
            ),
            Screen::Settings => views::settings::render(
                frame,
                layout[1],
                self.state.settings(),
                self.settings_cursor,
            ),
        }

        self.render_input_line(frame, layout[2]);
        self.render_status_bar(frame, layout[3]);

        if self.help_visible {
            render_help_overlay(frame, frame.area());
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Screen::ALL
            .iter()
            .map(|&screen| {
                let style = if screen == self.screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", screen.number(), screen.label()),
                    style,
                ))
            })
            .collect();
        let selected = Screen::ALL
            .iter()
            .position(|&s| s == self.screen)
            .unwrap_or(0);
        frame.render_widget(Tabs::new(titles).select(selected), area);
    }

    fn render_input_line(&self, frame: &mut Frame, area: Rect) {
        let line = match self.mode {
            InputMode::Command => Line::from(format!(":{}█", self.input)),
            InputMode::Search => Line::from(format!("/{}█", self.input)),
            InputMode::Normal if self.busy => {
                Line::from(Span::styled("Working...", Style::default().fg(theme::AMBER)))
            }
            InputMode::Normal => match &self.notice {
                Some(notice) if notice.error => {
                    Line::from(Span::styled(notice.text.as_str(), theme::error_style()))
                }
                Some(notice) => Line::from(notice.text.as_str()),
                None => Line::default(),
            },
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status = self.session.status;
        let indicator = match status {
            ConnectionStatus::Connected => "●",
            ConnectionStatus::Connecting => "◐",
            ConnectionStatus::Disconnected => "○",
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" {} {} ", indicator, status),
                Style::default().fg(theme::status_color(status)),
            ),
            Span::raw(format!(
                "{}  {}",
                self.session.selected_server.name,
                self.session.display_elapsed()
            )),
            Span::styled(
                " │ c connect  : command  / search  ? help  q quit",
                theme::key_hint(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: true,
        }
    }
}

/// All regions, then back to no filter.
fn next_region(current: Option<Region>) -> Option<Region> {
    let all = Region::all();
    match current {
        None => all.first().copied(),
        Some(region) => all
            .iter()
            .position(|&r| r == region)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 64u16.min(area.width.saturating_sub(4));
    let height = 30u16.min(area.height.saturating_sub(2));
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());

    let keys = [
        ("1-4 Tab", "Switch screen"),
        ("c", "Connect / disconnect"),
        ("j/k ↑/↓", "Move"),
        ("Enter", "Select / toggle / ask"),
        ("r", "Cycle region (servers)"),
        ("/", "Search servers"),
        (":", "Command line"),
        ("q", "Quit"),
    ];
    let mut lines: Vec<Line> = keys
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("  {:<10}", key), theme::key_hint_key()),
                Span::styled(*what, theme::key_hint()),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.extend(
        console::help_text()
            .lines()
            .map(|l| Line::from(format!("  {}", l))),
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::RecommendationResult;
    use crate::services::{
        Recommender, ServerCatalog, SimulatedHandshake, TelemetryFeed,
    };
    use crate::views::render_to_string;
    use async_trait::async_trait;
    use rand::rngs::mock::StepRng;
    use std::sync::Arc;
    use tokio::time::sleep;

    struct TokyoRecommender;

    #[async_trait]
    impl Recommender for TokyoRecommender {
        async fn recommend(
            &self,
            _task: &str,
            _servers: &[crate::models::ServerSummary],
        ) -> Result<RecommendationResult, AppError> {
            Ok(RecommendationResult {
                server_id: "3".to_string(),
                reason: "Low latency in Asia".to_string(),
            })
        }
    }

    async fn app() -> App {
        let config = AppConfig::default();
        let state = DashboardState::with_parts(
            &config,
            ServerCatalog::default(),
            Arc::new(SimulatedHandshake::new(config.handshake_delay())),
            Arc::new(TokyoRecommender),
            TelemetryFeed::with_rng(config.telemetry_window, StepRng::new(0, 0)),
        )
        .unwrap();
        App::new(state).await
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_line(app: &mut App, open: Action, text: &str) {
        app.process_action(open).await;
        for c in text.chars() {
            app.process_action(Action::InputChar(c)).await;
        }
        app.process_action(Action::SubmitInput).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_mapping_depends_on_mode() {
        let mut app = app().await;
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('c'))),
            Some(Action::ToggleConnection)
        );
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('2'))),
            Some(Action::SwitchScreen(Screen::Servers))
        );
        assert_eq!(app.handle_key_event(key(KeyCode::Char('r'))), None);
        assert_eq!(
            app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );

        app.process_action(Action::OpenCommand(String::new())).await;
        assert_eq!(app.mode(), InputMode::Command);
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('c'))),
            Some(Action::InputChar('c'))
        );
        assert_eq!(
            app.handle_key_event(key(KeyCode::Esc)),
            Some(Action::CancelInput)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_from_keyboard_and_render() {
        let mut app = app().await;
        let action = app.handle_key_event(key(KeyCode::Char('c'))).unwrap();
        app.process_action(action).await;
        assert_eq!(app.state().status().await, ConnectionStatus::Connecting);

        sleep(Duration::from_millis(4700)).await;
        app.process_action(Action::Session(SessionEvent::StatusChanged(
            ConnectionStatus::Connected,
        )))
        .await;
        assert_eq!(app.notice(), Some("Connected securely"));

        let text = render_to_string(80, 20, |f| app.render(f));
        assert!(text.contains("[ Secure ]"));
        assert!(text.contains("ENCRYPTED"));
        assert!(text.contains("00:00:02"));
        // StepRng(0, 0) samples the bottom of both ranges
        assert!(text.contains("Downstream: 15 MB/s"));
        assert!(text.contains("Upstream: 5 MB/s"));
        assert!(text.contains("Connected securely"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_line_toggles_module() {
        let mut app = app().await;
        type_line(&mut app, Action::OpenCommand(String::new()), "module split").await;

        assert_eq!(app.mode(), InputMode::Normal);
        assert_eq!(app.notice(), Some("Split Tunneling: ON"));
        assert!(app.state().settings().split_tunneling);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_command_shows_error() {
        let mut app = app().await;
        type_line(&mut app, Action::OpenCommand(String::new()), "select 99").await;
        assert_eq!(app.notice(), Some("No server with id 99 in the catalog."));

        type_line(&mut app, Action::OpenCommand(String::new()), "launch").await;
        assert!(app.notice().unwrap().contains("launch"));
        assert!(app.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_then_select() {
        let mut app = app().await;
        type_line(&mut app, Action::OpenSearch, "tok").await;
        assert_eq!(app.screen(), Screen::Servers);
        assert_eq!(app.visible_servers().len(), 1);

        app.process_action(Action::Activate).await;
        assert_eq!(app.state().session().await.selected_server.id, "3");

        let text = render_to_string(100, 12, |f| app.render(f));
        assert!(text.contains("/tok"));
        assert!(text.contains("Selected"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_region_cycle_filters_list() {
        let mut app = app().await;
        app.process_action(Action::SwitchScreen(Screen::Servers)).await;
        assert_eq!(app.visible_servers().len(), 8);

        app.process_action(Action::CycleRegion).await;
        let servers = app.visible_servers();
        assert!(!servers.is_empty());
        assert!(servers.iter().all(|s| s.region == Region::Americas));

        app.process_action(Action::ScrollDown).await;
        app.process_action(Action::ScrollDown).await;
        app.process_action(Action::ScrollDown).await;
        app.process_action(Action::Activate).await;
        let selected = app.state().session().await.selected_server;
        assert_eq!(selected.region, Region::Americas);

        for _ in 0..Region::all().len() {
            app.process_action(Action::CycleRegion).await;
        }
        assert_eq!(app.visible_servers().len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recommend_command_shows_result() {
        let mut app = app().await;
        type_line(&mut app, Action::OpenCommand(String::new()), "ai Gaming in Asia").await;

        assert_eq!(app.screen(), Screen::Recommendation);
        assert_eq!(app.state().session().await.selected_server.id, "3");
        let text = render_to_string(80, 14, |f| app.render(f));
        assert!(text.contains("AI Insights Generated"));
        assert!(text.contains("\"Low latency in Asia\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_screen_activation() {
        let mut app = app().await;
        app.process_action(Action::SwitchScreen(Screen::Settings)).await;
        app.process_action(Action::ScrollDown).await;
        app.process_action(Action::Activate).await;
        assert_eq!(
            app.state().settings().protocol,
            crate::models::Protocol::OpenVpnTcp
        );

        for _ in 0..10 {
            app.process_action(Action::ScrollDown).await;
        }
        app.process_action(Action::Activate).await;
        assert!(app.state().settings().auto_connect);
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_overlay_lists_commands() {
        let mut app = app().await;
        type_line(&mut app, Action::OpenCommand(String::new()), "help").await;
        let text = render_to_string(80, 34, |f| app.render(f));
        assert!(text.contains("Keyboard Shortcuts"));
        assert!(text.contains("recommend"));

        let action = app.handle_key_event(key(KeyCode::Char('?'))).unwrap();
        app.process_action(action).await;
        let text = render_to_string(80, 34, |f| app.render(f));
        assert!(!text.contains("Keyboard Shortcuts"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit() {
        let mut app = app().await;
        let action = app.handle_key_event(key(KeyCode::Char('q'))).unwrap();
        app.process_action(action).await;
        assert!(!app.is_running());
    }
}
