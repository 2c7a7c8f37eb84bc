pub mod api;
pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod event;
pub mod search;
pub mod ui;

use app::App;
use clap::Parser;
use cli::{Cli, CliCommand};
use config::load_config;

use api::SearchClient;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Initialize tracing (logs to stderr if RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let initial_term = cli.initial_term();

    match cli.command {
        // No subcommand or explicit `tui` → launch the interactive TUI.
        None | Some(CliCommand::Tui { .. }) => run_tui(initial_term).await,
        // `search` → non-interactive JSONL output.
        Some(cmd) => cli::run_command(cmd).await,
    }
}

/// Launch the interactive TUI.
async fn run_tui(initial_term: Option<String>) -> color_eyre::Result<()> {
    let config = load_config();
    let client = SearchClient::from_config(&config)?;
    tracing::info!(base_url = client.base_url(), "search client ready");

    let terminal = ratatui::init();
    let result = App::new(config, client).run(terminal, initial_term).await;
    ratatui::restore();
    result
}
