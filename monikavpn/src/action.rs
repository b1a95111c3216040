//! Everything the dashboard can be asked to do. Key presses and session
//! events are mapped to an [`Action`]; only `App::process_action` mutates.

use crate::services::SessionEvent;
use std::fmt;

/// Primary screens, reachable with the number keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    Dashboard,
    Servers,
    Recommendation,
    Settings,
}

impl Screen {
    pub const ALL: [Screen; 4] = [
        Self::Dashboard,
        Self::Servers,
        Self::Recommendation,
        Self::Settings,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::Dashboard => 1,
            Self::Servers => 2,
            Self::Recommendation => 3,
            Self::Settings => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.number() == n)
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Servers => "Servers",
            Self::Recommendation => "AI Advisor",
            Self::Settings => "Settings",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Lifecycle
    Quit,
    Tick,
    Render,

    // Navigation
    SwitchScreen(Screen),
    NextScreen,
    ToggleHelp,
    ScrollUp,
    ScrollDown,
    /// Enter on the highlighted row of the current screen.
    Activate,
    CycleRegion,

    // Session
    ToggleConnection,
    Session(SessionEvent),

    // Input line: `:` for commands, `/` for the server search
    OpenCommand(String),
    OpenSearch,
    InputChar(char),
    InputBackspace,
    SubmitInput,
    CancelInput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_navigation() {
        assert_eq!(Screen::from_number(2), Some(Screen::Servers));
        assert_eq!(Screen::from_number(9), None);
        assert_eq!(Screen::Settings.next(), Screen::Dashboard);
        assert_eq!(Screen::Dashboard.next(), Screen::Servers);
    }
}
