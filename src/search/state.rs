//! Query/page state and the accumulated result list.
//!
//! All transitions go through [`transition`], a pure function from the
//! current state and an event to the next state plus the side effects the
//! caller has to run (cache invalidation and fetches).

use crate::api::Page;
use crate::api::types::SearchEntry;
use crate::event::ApiResult;
use crate::search::{PageKey, normalize_term};

/// Caption of the load-more control while idle.
pub const LOAD_MORE_CAPTION: &str = "Load more";
/// Caption of the load-more control while a page is in flight.
pub const LOADING_CAPTION: &str = "Loading...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Start every new term from page 1.
    pub reset_page_on_new_query: bool,
    /// Drop responses that no longer match the term/page being loaded.
    pub discard_stale_responses: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            reset_page_on_new_query: true,
            discard_stale_responses: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// No term set.
    Idle,
    /// A fetch for this page is in flight.
    Loading(u32),
    /// The last page resolved. `exhausted` when it was null or empty.
    Loaded { exhausted: bool },
    /// The last fetch failed.
    Failed(std::sync::Arc<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub term: Option<String>,
    pub page: u32,
    pub results: Vec<SearchEntry>,
    pub phase: Phase,
    pub policy: Policy,
}

#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// The navigation source produced a (possibly absent) term.
    TermChanged(Option<String>),
    /// The user asked for the next page (or a retry after a failure).
    LoadMore,
    /// A fetch resolved.
    PageResolved { key: PageKey, result: ApiResult<Page> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Invalidate(PageKey),
    Fetch(PageKey),
}

impl SearchState {
    pub fn new(policy: Policy) -> Self {
        Self {
            term: None,
            page: 1,
            results: Vec::new(),
            phase: Phase::Idle,
            policy,
        }
    }

    /// Key for the current (term, page), if a term is set.
    pub fn current_key(&self) -> Option<PageKey> {
        self.term
            .as_ref()
            .map(|term| PageKey::new(term.clone(), self.page))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(e) => Some(e.as_str()),
            _ => None,
        }
    }

    /// Whether the load-more control accepts input.
    pub fn load_more_enabled(&self) -> bool {
        self.term.is_some() && !self.is_loading()
    }

    pub fn load_more_caption(&self) -> &'static str {
        if self.is_loading() {
            LOADING_CAPTION
        } else {
            LOAD_MORE_CAPTION
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

/// Apply one event to the state.
pub fn transition(state: SearchState, event: SearchEvent) -> (SearchState, Vec<Effect>) {
    match event {
        SearchEvent::TermChanged(term) => on_term_changed(state, term),
        SearchEvent::LoadMore => on_load_more(state),
        SearchEvent::PageResolved { key, result } => on_page_resolved(state, key, result),
    }
}

fn on_term_changed(state: SearchState, term: Option<String>) -> (SearchState, Vec<Effect>) {
    let term = normalize_term(term.as_deref());
    let page = if state.policy.reset_page_on_new_query {
        1
    } else {
        state.page
    };

    let Some(term) = term else {
        let next = SearchState {
            term: None,
            page,
            results: Vec::new(),
            phase: Phase::Idle,
            policy: state.policy,
        };
        return (next, Vec::new());
    };

    let key = PageKey::new(term.clone(), page);
    let next = SearchState {
        term: Some(term),
        page,
        results: Vec::new(),
        phase: Phase::Loading(page),
        policy: state.policy,
    };
    (next, vec![Effect::Fetch(key)])
}

fn on_load_more(state: SearchState) -> (SearchState, Vec<Effect>) {
    if !state.load_more_enabled() {
        return (state, Vec::new());
    }
    let Some(current) = state.current_key() else {
        return (state, Vec::new());
    };

    // A failed page is retried in place; otherwise move on to the next one.
    let next_page = match state.phase {
        Phase::Failed(_) => state.page,
        _ => state.page + 1,
    };
    let next_key = PageKey::new(current.term.clone(), next_page);

    let next = SearchState {
        page: next_page,
        phase: Phase::Loading(next_page),
        ..state
    };
    (
        next,
        vec![Effect::Invalidate(current), Effect::Fetch(next_key)],
    )
}

fn on_page_resolved(
    state: SearchState,
    key: PageKey,
    result: ApiResult<Page>,
) -> (SearchState, Vec<Effect>) {
    let expected = state.term.as_deref() == Some(key.term.as_str())
        && state.phase == Phase::Loading(key.page);

    if !expected {
        if state.policy.discard_stale_responses {
            tracing::debug!(%key, "discarding stale search response");
            return (state, Vec::new());
        }
        // Unguarded: late data is still appended, the phase is left alone.
        let results = match result {
            Ok(Some(entries)) => concat(state.results, entries),
            _ => state.results,
        };
        return (SearchState { results, ..state }, Vec::new());
    }

    let next = match result {
        Ok(Some(entries)) => {
            let exhausted = entries.is_empty();
            SearchState {
                results: concat(state.results, entries),
                phase: Phase::Loaded { exhausted },
                ..state
            }
        }
        Ok(None) => SearchState {
            phase: Phase::Loaded { exhausted: true },
            ..state
        },
        Err(e) => {
            tracing::warn!(%key, error = %e, "search page failed");
            SearchState {
                phase: Phase::Failed(e),
                ..state
            }
        }
    };
    (next, Vec::new())
}

fn concat(mut results: Vec<SearchEntry>, page: Vec<SearchEntry>) -> Vec<SearchEntry> {
    results.extend(page);
    results
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::types::{Channel, Playlist};
    use crate::ui::cards::{CardKind, card_kind};

    fn video(id: &str) -> SearchEntry {
        serde_json::from_value(serde_json::json!({"type": "video", "videoId": id})).unwrap()
    }

    fn channel(id: &str) -> SearchEntry {
        SearchEntry::Channel(
            serde_json::from_value::<Channel>(serde_json::json!({"authorId": id})).unwrap(),
        )
    }

    fn playlist(id: &str) -> SearchEntry {
        SearchEntry::Playlist(
            serde_json::from_value::<Playlist>(serde_json::json!({"playlistId": id})).unwrap(),
        )
    }

    fn keys(state: &SearchState) -> Vec<&str> {
        state.results.iter().map(SearchEntry::key).collect()
    }

    fn navigate(state: SearchState, term: &str) -> (SearchState, Vec<Effect>) {
        transition(state, SearchEvent::TermChanged(Some(term.to_owned())))
    }

    fn resolve(state: SearchState, term: &str, page: u32, result: ApiResult<Page>) -> SearchState {
        let (next, effects) = transition(
            state,
            SearchEvent::PageResolved {
                key: PageKey::new(term, page),
                result,
            },
        );
        assert!(effects.is_empty());
        next
    }

    #[test]
    fn starts_idle_without_term() {
        let state = SearchState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.load_more_enabled());
        assert_eq!(state.current_key(), None);
    }

    #[test]
    fn unset_term_issues_no_request() {
        let (state, effects) = transition(SearchState::default(), SearchEvent::TermChanged(None));
        assert!(effects.is_empty());
        assert_eq!(state.phase, Phase::Idle);

        let (state, effects) = navigate(state, "   ");
        assert!(effects.is_empty());
        assert_eq!(state.term, None);
    }

    #[test]
    fn first_page_renders_in_backend_order() {
        let (state, effects) = navigate(SearchState::default(), "cats");
        assert_eq!(effects, vec![Effect::Fetch(PageKey::new("cats", 1))]);
        assert!(state.is_loading());
        assert_eq!(state.load_more_caption(), LOADING_CAPTION);
        assert!(!state.load_more_enabled());

        let state = resolve(state, "cats", 1, Ok(Some(vec![video("v1"), channel("c1")])));
        let kinds: Vec<CardKind> = state.results.iter().map(card_kind).collect();
        assert_eq!(kinds, vec![CardKind::Video, CardKind::Channel]);
        assert_eq!(keys(&state), ["v1", "c1"]);
        assert_eq!(state.phase, Phase::Loaded { exhausted: false });
        assert_eq!(state.load_more_caption(), LOAD_MORE_CAPTION);
        assert!(state.load_more_enabled());
    }

    #[test]
    fn load_more_requests_next_page_and_appends() {
        let (state, _) = navigate(SearchState::default(), "cats");
        let state = resolve(state, "cats", 1, Ok(Some(vec![video("v1"), channel("c1")])));

        let (state, effects) = transition(state, SearchEvent::LoadMore);
        assert_eq!(
            effects,
            vec![
                Effect::Invalidate(PageKey::new("cats", 1)),
                Effect::Fetch(PageKey::new("cats", 2)),
            ]
        );
        assert_eq!(crate::api::page_path(&PageKey::new("cats", 2)), "/api/s?q=cats&p=2");
        assert_eq!(state.page, 2);

        let state = resolve(state, "cats", 2, Ok(Some(vec![playlist("p1")])));
        assert_eq!(keys(&state), ["v1", "c1", "p1"]);
        assert_eq!(card_kind(&state.results[2]), CardKind::Playlist);
    }

    #[test]
    fn accumulated_list_is_concatenation_of_pages() {
        let pages = vec![
            vec![video("a"), video("b")],
            vec![channel("c")],
            vec![playlist("d"), video("e")],
        ];

        let (mut state, _) = navigate(SearchState::default(), "mix");
        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                state = transition(state, SearchEvent::LoadMore).0;
            }
            state = resolve(state, "mix", i as u32 + 1, Ok(Some(page.clone())));
        }

        let expected: Vec<SearchEntry> = pages.into_iter().flatten().collect();
        assert_eq!(state.results, expected);
    }

    #[test]
    fn term_change_clears_results_and_restarts_at_page_one() {
        let (state, _) = navigate(SearchState::default(), "cats");
        let state = resolve(state, "cats", 1, Ok(Some(vec![video("v1")])));
        let (state, _) = transition(state, SearchEvent::LoadMore);
        let state = resolve(state, "cats", 2, Ok(Some(vec![video("v2")])));
        assert_eq!(state.page, 2);

        let (state, effects) = navigate(state, "dogs");
        assert!(state.results.is_empty());
        assert_eq!(state.term.as_deref(), Some("dogs"));
        assert_eq!(effects, vec![Effect::Fetch(PageKey::new("dogs", 1))]);
    }

    #[test]
    fn term_change_can_keep_page_counter() {
        let policy = Policy {
            reset_page_on_new_query: false,
            ..Policy::default()
        };
        let (state, _) = navigate(SearchState::new(policy), "cats");
        let state = resolve(state, "cats", 1, Ok(Some(vec![video("v1")])));
        let (state, _) = transition(state, SearchEvent::LoadMore);

        let (state, effects) = navigate(state, "dogs");
        assert!(state.results.is_empty());
        assert_eq!(effects, vec![Effect::Fetch(PageKey::new("dogs", 2))]);
    }

    #[test]
    fn null_page_renders_nothing_and_keeps_load_more_clickable() {
        let (state, _) = navigate(SearchState::default(), "cats");
        let state = resolve(state, "cats", 1, Ok(None));
        assert!(state.results.is_empty());
        assert_eq!(state.phase, Phase::Loaded { exhausted: true });
        assert_eq!(state.error(), None);
        assert!(state.load_more_enabled());
    }

    #[test]
    fn load_more_is_ignored_while_loading() {
        let (state, _) = navigate(SearchState::default(), "cats");
        let (state, effects) = transition(state, SearchEvent::LoadMore);
        assert!(effects.is_empty());
        assert_eq!(state.page, 1);
        assert_eq!(state.phase, Phase::Loading(1));
    }

    #[test]
    fn failure_is_retried_on_the_same_page() {
        let (state, _) = navigate(SearchState::default(), "cats");
        let state = resolve(state, "cats", 1, Err(Arc::new("connection refused".into())));
        assert_eq!(state.error(), Some("connection refused"));
        assert!(state.load_more_enabled());

        let (state, effects) = transition(state, SearchEvent::LoadMore);
        assert_eq!(
            effects,
            vec![
                Effect::Invalidate(PageKey::new("cats", 1)),
                Effect::Fetch(PageKey::new("cats", 1)),
            ]
        );
        assert_eq!(state.phase, Phase::Loading(1));
    }

    #[test]
    fn unknown_entry_does_not_stall_pagination() {
        let body = r#"[
            {"type": "video", "videoId": "v1"},
            {"type": "hashtag", "title": "cats"},
            {"type": "channel", "authorId": "c1"}
        ]"#;
        let page = crate::api::decode_page(body).map_err(|e| Arc::new(e.to_string()));

        let (state, _) = navigate(SearchState::default(), "cats");
        let state = resolve(state, "cats", 1, page);
        assert_eq!(keys(&state), ["v1", "c1"]);
        assert_eq!(state.error(), None);

        let (state, effects) = transition(state, SearchEvent::LoadMore);
        assert_eq!(
            effects,
            vec![
                Effect::Invalidate(PageKey::new("cats", 1)),
                Effect::Fetch(PageKey::new("cats", 2)),
            ]
        );
        assert_eq!(state.phase, Phase::Loading(2));
    }

    #[test]
    fn stale_response_for_abandoned_term_is_dropped() {
        let (state, _) = navigate(SearchState::default(), "cats");
        let (state, _) = navigate(state, "dogs");

        let state = resolve(state, "cats", 1, Ok(Some(vec![video("late")])));
        assert!(state.results.is_empty());
        assert_eq!(state.phase, Phase::Loading(1));

        let state = resolve(state, "dogs", 1, Ok(Some(vec![channel("d1")])));
        assert_eq!(keys(&state), ["d1"]);
    }

    #[test]
    fn stale_response_is_appended_when_unguarded() {
        let policy = Policy {
            discard_stale_responses: false,
            ..Policy::default()
        };
        let (state, _) = navigate(SearchState::new(policy), "cats");
        let (state, _) = navigate(state, "dogs");

        let state = resolve(state, "cats", 1, Ok(Some(vec![video("late")])));
        assert_eq!(keys(&state), ["late"]);
        assert_eq!(state.phase, Phase::Loading(1));
    }
}
