use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{self, eyre};

use crate::api::SearchClient;
use crate::api::types::SearchEntry;
use crate::command::term_from_location;
use crate::config::load_config;
use crate::search::cache::RequestCache;
use crate::search::normalize_term;
use crate::search::state::{Effect, Phase, Policy, SearchEvent, SearchState, transition};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "tubesearch", about = "TUI and CLI for paginated video search")]
pub struct Cli {
    /// Search term to open the TUI with
    #[arg(long, short)]
    pub query: Option<String>,
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Launch the interactive TUI (default)
    Tui {
        /// Search term, or a front-end location such as /search?q=cats
        location: Option<String>,
    },
    /// Search and print results (JSONL)
    Search {
        /// Search term
        term: String,
        /// First page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Number of pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
}

impl Cli {
    /// Term the TUI starts with: `--query` wins over a location argument.
    pub fn initial_term(&self) -> Option<String> {
        let from_location = match &self.command {
            Some(CliCommand::Tui { location: Some(location) }) => term_from_location(location),
            _ => None,
        };
        normalize_term(self.query.as_deref()).or(from_location)
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Print entries as JSONL to stdout.
fn print_entries(entries: &[SearchEntry]) -> eyre::Result<()> {
    for entry in entries {
        let line = serde_json::to_string(entry)?;
        println!("{line}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

/// Fetch `pages` pages starting at `page` and print every entry.
///
/// Runs the same transitions as the TUI, feeding each resolved page back in
/// and answering load-more until the page budget is spent or the backend
/// runs out of results.
pub async fn run_search(term: &str, page: u32, pages: u32) -> eyre::Result<()> {
    let term = normalize_term(Some(term)).ok_or_else(|| eyre!("search term is empty"))?;

    let config = load_config();
    let client = Arc::new(SearchClient::from_config(&config).map_err(|e| eyre!("{e}"))?);
    let mut cache = RequestCache::new();

    // Keep the requested start page instead of resetting to 1.
    let policy = Policy {
        reset_page_on_new_query: false,
        ..config.policy()
    };
    let mut state = SearchState {
        page: page.max(1),
        ..SearchState::new(policy)
    };
    let mut event = SearchEvent::TermChanged(Some(term));

    for _ in 0..pages.max(1) {
        let (next, effects) = transition(state, event);
        state = next;

        let mut resolved = None;
        for effect in effects {
            match effect {
                Effect::Invalidate(key) => {
                    cache.invalidate(&key);
                }
                Effect::Fetch(key) => {
                    let client = Arc::clone(&client);
                    let result = cache
                        .get_or_fetch(&key, move |key| async move {
                            client
                                .fetch_page(&key)
                                .await
                                .map_err(|e| Arc::new(e.to_string()))
                        })
                        .await;
                    resolved = Some(SearchEvent::PageResolved { key, result });
                }
            }
        }
        let Some(resolved) = resolved else {
            break;
        };

        let before = state.results.len();
        state = transition(state, resolved).0;
        if let Some(err) = state.error() {
            return Err(eyre!("page {} failed: {err}", state.page));
        }
        print_entries(&state.results[before..])?;

        if state.phase == (Phase::Loaded { exhausted: true }) {
            tracing::debug!(page = state.page, "no more results");
            break;
        }
        event = SearchEvent::LoadMore;
    }

    Ok(())
}

pub async fn run_command(cmd: CliCommand) -> eyre::Result<()> {
    match cmd {
        CliCommand::Tui { .. } => unreachable!("tui is handled in main"),
        CliCommand::Search { term, page, pages } => run_search(&term, page, pages).await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
