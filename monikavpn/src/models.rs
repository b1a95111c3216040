use serde::{Deserialize, Serialize};

pub use monikavpn_common::{
    ConnectionStatus, Protocol, RecommendationResult, Region, Server, ServerSummary,
    TelemetrySample,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SecurityModule {
    KillSwitch,
    AdBlocker,
    SplitTunneling,
    AutoConnect,
}

impl SecurityModule {
    pub fn name(&self) -> &'static str {
        match self {
            SecurityModule::KillSwitch => "Advanced Kill Switch",
            SecurityModule::AdBlocker => "Ad-Blocker & Tracking",
            SecurityModule::SplitTunneling => "Split Tunneling",
            SecurityModule::AutoConnect => "Automated Connect",
        }
    }

    pub fn all() -> &'static [SecurityModule] {
        &[
            SecurityModule::KillSwitch,
            SecurityModule::AdBlocker,
            SecurityModule::SplitTunneling,
            SecurityModule::AutoConnect,
        ]
    }

    pub fn parse(input: &str) -> Option<SecurityModule> {
        match input.trim().to_lowercase().as_str() {
            "kill-switch" | "killswitch" => Some(SecurityModule::KillSwitch),
            "ad-blocker" | "adblocker" | "adblock" => Some(SecurityModule::AdBlocker),
            "split-tunneling" | "split" => Some(SecurityModule::SplitTunneling),
            "auto-connect" | "autoconnect" => Some(SecurityModule::AutoConnect),
            _ => None,
        }
    }
}

/// Settings panel state. Held in memory only.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SettingsState {
    pub protocol: Protocol,
    pub kill_switch: bool,
    pub ad_blocker: bool,
    pub split_tunneling: bool,
    pub auto_connect: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            protocol: Protocol::WireGuard,
            kill_switch: true,
            ad_blocker: true,
            split_tunneling: false,
            auto_connect: false,
        }
    }
}

impl SettingsState {
    pub fn is_enabled(&self, module: SecurityModule) -> bool {
        match module {
            SecurityModule::KillSwitch => self.kill_switch,
            SecurityModule::AdBlocker => self.ad_blocker,
            SecurityModule::SplitTunneling => self.split_tunneling,
            SecurityModule::AutoConnect => self.auto_connect,
        }
    }

    /// Flips the module and returns its new state.
    pub fn toggle(&mut self, module: SecurityModule) -> bool {
        let flag = match module {
            SecurityModule::KillSwitch => &mut self.kill_switch,
            SecurityModule::AdBlocker => &mut self.ad_blocker,
            SecurityModule::SplitTunneling => &mut self.split_tunneling,
            SecurityModule::AutoConnect => &mut self.auto_connect,
        };
        *flag = !*flag;
        *flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_match_panel() {
        let settings = SettingsState::default();
        assert_eq!(settings.protocol, Protocol::WireGuard);
        assert!(settings.is_enabled(SecurityModule::KillSwitch));
        assert!(settings.is_enabled(SecurityModule::AdBlocker));
        assert!(!settings.is_enabled(SecurityModule::SplitTunneling));
        assert!(!settings.is_enabled(SecurityModule::AutoConnect));
    }

    #[test]
    fn test_toggle_module() {
        let mut settings = SettingsState::default();
        assert!(settings.toggle(SecurityModule::SplitTunneling));
        assert!(!settings.toggle(SecurityModule::KillSwitch));
        assert!(!settings.kill_switch);
        assert_eq!(
            SecurityModule::parse("Split"),
            Some(SecurityModule::SplitTunneling)
        );
    }
}
