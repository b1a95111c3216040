//! The `:` command line. Lines are parsed with clap and run against the
//! dashboard state; the [`Outcome`] tells the app what to show next.

use crate::action::Screen;
use crate::error::AppError;
use crate::models::{Protocol, SecurityModule};
use crate::state::DashboardState;
use crate::views;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "command",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Connect or disconnect
    #[command(visible_alias = "t", alias = "connect", alias = "disconnect")]
    Toggle,
    /// Show the dashboard
    #[command(visible_alias = "s")]
    Status,
    /// List servers, optionally filtered by name, country or IP
    #[command(visible_alias = "ls")]
    Servers { query: Vec<String> },
    /// Choose a server by id
    Select { id: String },
    /// Ask for a server recommendation
    #[command(visible_alias = "ai")]
    Recommend {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        task: Vec<String>,
    },
    /// Show the settings panel
    Settings,
    /// wireguard, openvpn-tcp, openvpn-udp or shadowsocks
    Protocol {
        #[arg(value_parser = parse_protocol)]
        protocol: Protocol,
    },
    /// Toggle kill-switch, ad-blocker, split-tunneling or auto-connect
    Module {
        #[arg(value_parser = parse_module)]
        module: SecurityModule,
    },
    /// List commands
    Help,
    #[command(alias = "exit", alias = "q")]
    Quit,
}

fn parse_protocol(raw: &str) -> Result<Protocol, String> {
    Protocol::parse(raw).ok_or_else(|| format!("unknown protocol {:?}", raw))
}

fn parse_module(raw: &str) -> Result<SecurityModule, String> {
    SecurityModule::parse(raw).ok_or_else(|| format!("unknown module {:?}", raw))
}

impl Command {
    /// An empty line shows the dashboard.
    pub fn parse(line: &str) -> Result<Command, AppError> {
        if line.trim().is_empty() {
            return Ok(Command::Status);
        }
        CommandLine::try_parse_from(line.split_whitespace())
            .map(|cli| cli.command)
            .map_err(|e| AppError::Validation(first_line(&e.to_string())))
    }
}

fn first_line(text: &str) -> String {
    text.lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string()
}

/// Help text for the command line, generated from the definitions above.
pub fn help_text() -> String {
    CommandLine::command().render_help().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Notice(String),
    Show(Screen),
    /// Show the server list filtered by this query.
    Search(String),
    Help,
    Quit,
}

pub async fn execute(state: &mut DashboardState, cmd: Command) -> Result<Outcome, AppError> {
    debug!("Executing {:?}", cmd);
    let outcome = match cmd {
        Command::Toggle => {
            state.toggle_connection().await;
            Outcome::Notice(views::dashboard::button_label(state.status().await).to_string())
        }
        Command::Status => Outcome::Show(Screen::Dashboard),
        Command::Servers { query } => Outcome::Search(query.join(" ")),
        Command::Select { id } => {
            let server = state.select_server(&id).await?;
            Outcome::Notice(format!("Selected {} {}", server.flag, server.name))
        }
        Command::Recommend { task } => match state.recommend(&task.join(" ")).await? {
            Some(_) => Outcome::Show(Screen::Recommendation),
            None => Outcome::Notice(String::new()),
        },
        Command::Settings => Outcome::Show(Screen::Settings),
        Command::Protocol { protocol } => {
            state.set_protocol(protocol);
            Outcome::Notice(format!("Protocol: {}", protocol.name()))
        }
        Command::Module { module } => {
            let enabled = state.toggle_module(module);
            Outcome::Notice(format!(
                "{}: {}",
                module.name(),
                if enabled { "ON" } else { "OFF" }
            ))
        }
        Command::Help => Outcome::Help,
        Command::Quit => Outcome::Quit,
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definitions() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("").unwrap(), Command::Status);
        assert_eq!(Command::parse("  toggle ").unwrap(), Command::Toggle);
        assert_eq!(Command::parse("connect").unwrap(), Command::Toggle);
        assert_eq!(
            Command::parse("servers new york").unwrap(),
            Command::Servers {
                query: vec!["new".to_string(), "york".to_string()]
            }
        );
        assert_eq!(
            Command::parse("ls").unwrap(),
            Command::Servers { query: Vec::new() }
        );
        assert_eq!(
            Command::parse("ai Gaming in Asia").unwrap(),
            Command::Recommend {
                task: vec!["Gaming".to_string(), "in".to_string(), "Asia".to_string()]
            }
        );
        assert_eq!(
            Command::parse("protocol openvpn-udp").unwrap(),
            Command::Protocol {
                protocol: Protocol::OpenVpnUdp
            }
        );
        assert_eq!(
            Command::parse("module kill-switch").unwrap(),
            Command::Module {
                module: SecurityModule::KillSwitch
            }
        );
        assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Command::parse("select"), Err(AppError::Validation(_))));
        assert!(matches!(Command::parse("recommend"), Err(AppError::Validation(_))));
        assert!(matches!(Command::parse("launch"), Err(AppError::Validation(_))));

        let err = Command::parse("protocol ipsec").unwrap_err();
        assert!(err.to_string().contains("unknown protocol"));
    }

    #[test]
    fn test_help_lists_commands() {
        let help = help_text();
        for name in ["toggle", "servers", "recommend", "protocol", "module", "quit"] {
            assert!(help.contains(name), "missing {}", name);
        }
    }
}
