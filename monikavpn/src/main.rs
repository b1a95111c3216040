use clap::Parser;
use monikavpn::cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = monikavpn::run_app(cli) {
        eprintln!("monikavpn: {}", e.user_friendly_message());
        std::process::exit(1);
    }
}
