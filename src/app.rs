use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::api::SearchClient;
use crate::command::{self, Command};
use crate::config::AppConfig;
use crate::event::{AppEvent, Event, EventHandler};
use crate::search::PageKey;
use crate::search::cache::RequestCache;
use crate::search::state::{Effect, SearchEvent, SearchState, transition};
use crate::ui;
use crate::ui::results::grid_columns;

// ---------------------------------------------------------------------------
// App mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Command,
    Search,
}

/// Direction of a selection move in the result grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
    Left,
    Right,
}

/// Move a grid selection, staying within `len` items.
pub fn step_selection(index: usize, len: usize, columns: usize, step: Step) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len - 1;
    let columns = columns.max(1);
    let index = index.min(last);
    match step {
        Step::Up if index >= columns => index - columns,
        Step::Up => index,
        Step::Down if index + columns <= last => index + columns,
        Step::Down => index,
        Step::Left => index.saturating_sub(1),
        Step::Right => (index + 1).min(last),
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: AppConfig,
    pub mode: AppMode,

    // Search view state and the page cache behind it
    pub search: SearchState,
    pub cache: RequestCache,
    pub client: Arc<SearchClient>,

    // Grid selection
    pub selected_index: usize,
    pub columns: usize,

    // Input state
    pub command_input: String,
    pub search_input: String,

    // Overlays and status
    pub show_help: bool,
    pub error_detail: Option<String>,
    pub status_message: Option<String>,
    pub frame: usize,
}

impl App {
    pub fn new(config: AppConfig, client: SearchClient) -> Self {
        Self {
            running: true,
            events: EventHandler::new(config.tick_rate_fps),
            search: SearchState::new(config.policy()),
            cache: RequestCache::new(),
            client: Arc::new(client),
            mode: AppMode::Normal,
            selected_index: 0,
            columns: 1,
            command_input: String::new(),
            search_input: String::new(),
            show_help: false,
            error_detail: None,
            status_message: None,
            frame: 0,
            config,
        }
    }

    // -- Main event loop ----------------------------------------------------

    pub async fn run(
        mut self,
        mut terminal: DefaultTerminal,
        initial_term: Option<String>,
    ) -> color_eyre::Result<()> {
        if initial_term.is_some() {
            self.events.send(AppEvent::Navigate(initial_term));
        }

        while self.running {
            let size = terminal.size()?;
            // The result grid sits inside a one-cell border.
            self.columns = grid_columns(size.width.saturating_sub(2), self.config.max_columns);

            terminal.draw(|frame| ui::draw(frame, &self))?;
            match self.events.next().await? {
                Event::Tick => self.tick(),
                Event::Crossterm(event) => {
                    if let crossterm::event::Event::Key(key) = event
                        && key.kind == crossterm::event::KeyEventKind::Press
                    {
                        self.handle_key_event(key);
                    }
                }
                Event::App(app_event) => self.handle_app_event(*app_event),
            }
        }
        Ok(())
    }

    fn tick(&mut self) {
        if self.search.is_loading() {
            self.frame = self.frame.wrapping_add(1);
        }
    }

    // -- Key event routing --------------------------------------------------

    fn handle_key_event(&mut self, key: KeyEvent) {
        // Ctrl-C always quits.
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            self.events.send(AppEvent::Quit);
            return;
        }

        if self.error_detail.is_some() {
            self.handle_error_popup_key(key);
            return;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q' | '?')) {
                self.events.send(AppEvent::HideHelp);
            }
            return;
        }

        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Command => self.handle_command_key(key),
            AppMode::Search => self.handle_search_key(key),
        }
    }

    fn handle_error_popup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.error_detail = None;
            }
            KeyCode::Char('n') => {
                self.error_detail = None;
                self.events.send(AppEvent::LoadMore);
            }
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.events.send(AppEvent::Quit);
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(Step::Down),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(Step::Up),
            KeyCode::Char('h') | KeyCode::Left => self.move_selection(Step::Left),
            KeyCode::Char('l') | KeyCode::Right => self.move_selection(Step::Right),
            KeyCode::Enter if self.search.results.is_empty() => {
                self.events.send(AppEvent::LoadMore);
            }
            KeyCode::Enter | KeyCode::Char('o') => {
                self.open_selected();
            }
            KeyCode::Char('n') => {
                self.events.send(AppEvent::LoadMore);
            }
            KeyCode::Char('e') => {
                if let Some(err) = self.search.error() {
                    self.error_detail = Some(err.to_string());
                }
            }
            KeyCode::Char('/') => {
                self.mode = AppMode::Search;
                self.search_input.clear();
            }
            KeyCode::Char(':') => {
                self.mode = AppMode::Command;
                self.command_input.clear();
            }
            KeyCode::Char('?') => {
                self.events.send(AppEvent::ShowHelp);
            }
            _ => {}
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.command_input.clear();
            }
            KeyCode::Enter => {
                self.execute_command();
                self.mode = AppMode::Normal;
            }
            KeyCode::Backspace => {
                self.command_input.pop();
            }
            KeyCode::Char(c) => {
                self.command_input.push(c);
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.search_input.clear();
            }
            KeyCode::Enter => {
                if let Some(term) = command::term_from_location(&self.search_input) {
                    self.events.send(AppEvent::Navigate(Some(term)));
                }
                self.mode = AppMode::Normal;
            }
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
            }
            _ => {}
        }
    }

    // -- Command execution --------------------------------------------------

    fn execute_command(&mut self) {
        let input = self.command_input.clone();
        match command::parse_command(&input) {
            Some(Command::Search(term)) => {
                self.events.send(AppEvent::Navigate(Some(term)));
            }
            Some(Command::Open(location)) => match command::term_from_location(&location) {
                Some(term) => self.events.send(AppEvent::Navigate(Some(term))),
                None => {
                    self.status_message = Some(format!("No search term in: {location}"));
                }
            },
            Some(Command::More) => {
                self.events.send(AppEvent::LoadMore);
            }
            Some(Command::Clear) => {
                self.events.send(AppEvent::Navigate(None));
            }
            Some(Command::Help) => {
                self.events.send(AppEvent::ShowHelp);
            }
            Some(Command::Quit) => {
                self.events.send(AppEvent::Quit);
            }
            None => {
                self.status_message = Some(format!("Unknown command: {input}"));
            }
        }
        self.command_input.clear();
    }

    // -- Selection helpers --------------------------------------------------

    fn move_selection(&mut self, step: Step) {
        self.selected_index = step_selection(
            self.selected_index,
            self.search.results.len(),
            self.columns,
            step,
        );
    }

    fn open_selected(&mut self) {
        let Some(entry) = self.search.results.get(self.selected_index) else {
            return;
        };
        let url = self.client.url(&entry.watch_path());
        tracing::info!(
            %url,
            kind = entry.kind().label(),
            title = entry.title(),
            "opening entry"
        );
        if let Err(e) = open::that_detached(&url) {
            self.status_message = Some(format!("Could not open {url}: {e}"));
        }
    }

    // -- App event handling -------------------------------------------------

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => {
                self.running = false;
            }
            AppEvent::Navigate(term) => {
                tracing::info!(term = ?term, "navigate");
                self.status_message = None;
                self.error_detail = None;
                self.selected_index = 0;
                self.apply(SearchEvent::TermChanged(term));
                self.cache.retain_term(self.search.term.as_deref());
            }
            AppEvent::LoadMore => {
                if self.search.load_more_enabled() {
                    self.status_message = None;
                }
                self.apply(SearchEvent::LoadMore);
            }
            AppEvent::PageLoaded { key, result } => {
                self.apply(SearchEvent::PageResolved { key, result });
            }
            AppEvent::ShowHelp => {
                self.show_help = true;
            }
            AppEvent::HideHelp => {
                self.show_help = false;
            }
        }
    }

    /// Run one search transition and carry out the effects it asks for.
    fn apply(&mut self, event: SearchEvent) {
        let policy = self.search.policy;
        let state = std::mem::replace(&mut self.search, SearchState::new(policy));
        let (next, effects) = transition(state, event);
        self.search = next;

        for effect in effects {
            match effect {
                Effect::Invalidate(key) => {
                    self.cache.invalidate(&key);
                }
                Effect::Fetch(key) => self.dispatch_fetch(key),
            }
        }
    }

    /// Resolve a page through the cache on a spawned task; the result comes
    /// back as `AppEvent::PageLoaded`.
    fn dispatch_fetch(&mut self, key: PageKey) {
        let client = Arc::clone(&self.client);
        let exchange = self.cache.get_or_fetch(&key, move |key| async move {
            client
                .fetch_page(&key)
                .await
                .map_err(|e| Arc::new(e.to_string()))
        });
        let sender = self.events.sender();

        tokio::spawn(async move {
            let result = exchange.await;
            let _ = sender.send(Event::App(Box::new(AppEvent::PageLoaded { key, result })));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_steps_move_by_row() {
        assert_eq!(step_selection(0, 7, 3, Step::Down), 3);
        assert_eq!(step_selection(3, 7, 3, Step::Down), 6);
        assert_eq!(step_selection(4, 7, 3, Step::Down), 4);
        assert_eq!(step_selection(4, 7, 3, Step::Up), 1);
        assert_eq!(step_selection(1, 7, 3, Step::Up), 1);
    }

    #[test]
    fn horizontal_steps_stay_in_bounds() {
        assert_eq!(step_selection(0, 3, 3, Step::Left), 0);
        assert_eq!(step_selection(2, 3, 3, Step::Right), 2);
        assert_eq!(step_selection(1, 3, 3, Step::Right), 2);
    }

    #[test]
    fn empty_grid_selects_nothing() {
        assert_eq!(step_selection(5, 0, 2, Step::Down), 0);
    }

    #[test]
    fn single_column_moves_one_at_a_time() {
        assert_eq!(step_selection(0, 3, 1, Step::Down), 1);
        assert_eq!(step_selection(0, 3, 0, Step::Down), 1);
    }
}
