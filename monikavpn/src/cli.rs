use clap::Parser;
use std::path::PathBuf;

/// Terminal dashboard for a simulated VPN session.
#[derive(Parser, Debug)]
#[command(name = "monikavpn", version, about)]
pub struct Cli {
    /// Config file (defaults to monikavpn_config.json in the user config dir)
    #[arg(short, long, env = "MONIKA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file; the terminal is taken by the dashboard
    #[arg(long, env = "MONIKA_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from(["monikavpn", "-vv", "--config", "/tmp/monika.json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/monika.json")));
    }
}
