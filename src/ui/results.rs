use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};

use crate::search::state::{Phase, SearchState};
use crate::ui::cards::{CARD_HEIGHT, EntryCard};
use crate::ui::load_more::LoadMoreButton;
use crate::ui::text::truncate;

/// Number of grid columns for an area width.
///
/// One column below 60 cells, two below 100, three otherwise, never more
/// than `max_columns`.
pub fn grid_columns(width: u16, max_columns: u16) -> usize {
    let columns = match width {
        0..60 => 1,
        60..100 => 2,
        _ => 3,
    };
    columns.min(max_columns.max(1)) as usize
}

/// The search results view: a grid of cards with a load-more control below.
pub struct ResultsView<'a> {
    pub search: &'a SearchState,
    pub selected_index: usize,
    pub max_columns: u16,
    pub frame: usize,
}

impl<'a> ResultsView<'a> {
    pub fn new(search: &'a SearchState) -> Self {
        Self {
            search,
            selected_index: 0,
            max_columns: 3,
            frame: 0,
        }
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn max_columns(mut self, max_columns: u16) -> Self {
        self.max_columns = max_columns;
        self
    }

    pub fn frame(mut self, frame: usize) -> Self {
        self.frame = frame;
        self
    }
}

impl Widget for ResultsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match &self.search.term {
            Some(term) => format!(" Search: {term} "),
            None => " Search (press / to search) ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        block.render(area, buf);

        let error_height = u16::from(self.search.error().is_some());
        let [grid_area, error_area, button_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(error_height),
            Constraint::Length(3),
        ])
        .areas(inner);

        if self.search.results.is_empty() {
            let msg = match (&self.search.term, &self.search.phase) {
                (None, _) => "Nothing searched yet",
                (_, Phase::Loading(_)) => "Searching...",
                (_, Phase::Failed(_)) => "",
                _ => "No results",
            };
            if grid_area.height > 0 {
                buf.set_string(
                    grid_area.x + 1,
                    grid_area.y,
                    msg,
                    Style::default().fg(Color::DarkGray),
                );
            }
        } else {
            self.render_grid(grid_area, buf);
        }

        if let Some(err) = self.search.error() {
            let line = Line::from(vec![
                Span::styled(
                    format!(" Failed to load page {}: ", self.search.page),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    truncate(err.lines().next().unwrap_or_default(), error_area.width as usize),
                    Style::default().fg(Color::Red),
                ),
            ]);
            buf.set_line(error_area.x, error_area.y, &line, error_area.width);
        }

        if self.search.term.is_some() {
            LoadMoreButton::new(self.search)
                .frame(self.frame)
                .render(button_area, buf);
        }
    }
}

impl ResultsView<'_> {
    fn render_grid(&self, area: Rect, buf: &mut Buffer) {
        let entries = &self.search.results;
        let columns = grid_columns(area.width, self.max_columns);
        let rows = entries.len().div_ceil(columns);
        let selected = self.selected_index.min(entries.len() - 1);

        let heights = vec![CARD_HEIGHT; rows];
        let first_row = compute_scroll_start(&heights, selected / columns, area.height);

        let card_width = area.width / columns as u16;
        let mut y = area.y;
        for row in first_row..rows {
            if y >= area.y + area.height {
                break;
            }
            let height = CARD_HEIGHT.min(area.y + area.height - y);
            for col in 0..columns {
                let index = row * columns + col;
                let Some(entry) = entries.get(index) else {
                    break;
                };
                let x = area.x + col as u16 * card_width;
                let width = if col + 1 == columns {
                    area.x + area.width - x
                } else {
                    card_width
                };
                EntryCard::new(entry)
                    .selected(index == selected)
                    .render(Rect::new(x, y, width, height), buf);
            }
            y += height;
        }
    }
}

/// Find the smallest scroll start index so that the selected item fits
/// within the available height.
fn compute_scroll_start(heights: &[u16], selected: usize, available: u16) -> usize {
    if heights.is_empty() {
        return 0;
    }

    let selected = selected.min(heights.len() - 1);
    if available == 0 {
        return selected;
    }

    // Build a viewport that always includes the selected row and packs as
    // many previous rows as can fit above it.
    let mut start = selected;
    let mut used = heights[selected];

    while start > 0 {
        let next = used.saturating_add(heights[start - 1]);
        if next > available {
            break;
        }
        start -= 1;
        used = next;
    }

    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::SearchEntry;
    use crate::search::PageKey;
    use crate::search::state::{SearchEvent, transition};
    use serde_json::json;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn loaded(term: &str, page: Vec<serde_json::Value>) -> SearchState {
        let (state, _) = transition(
            SearchState::default(),
            SearchEvent::TermChanged(Some(term.into())),
        );
        let entries = page
            .into_iter()
            .map(|v| SearchEntry::from_value(v).unwrap())
            .collect();
        transition(
            state,
            SearchEvent::PageResolved {
                key: PageKey::new(term, 1),
                result: Ok(Some(entries)),
            },
        )
        .0
    }

    #[test]
    fn columns_follow_width() {
        assert_eq!(grid_columns(40, 3), 1);
        assert_eq!(grid_columns(80, 3), 2);
        assert_eq!(grid_columns(120, 3), 3);
        assert_eq!(grid_columns(120, 2), 2);
        assert_eq!(grid_columns(120, 0), 1);
    }

    #[test]
    fn renders_cards_in_result_order() {
        let state = loaded(
            "cats",
            vec![
                json!({"type": "video", "videoId": "v1", "title": "First clip"}),
                json!({"type": "channel", "authorId": "c1", "author": "Second chan"}),
            ],
        );
        let area = Rect::new(0, 0, 50, 24);
        let mut buf = Buffer::empty(area);
        ResultsView::new(&state).render(area, &mut buf);

        let text = buffer_text(&buf);
        let first = text.find("First clip").unwrap();
        let second = text.find("Second chan").unwrap();
        assert!(first < second);
        assert!(text.contains("Search: cats"));
        assert!(text.contains("Load more"));
    }

    #[test]
    fn failed_page_is_shown_inline() {
        let (state, _) = transition(
            SearchState::default(),
            SearchEvent::TermChanged(Some("cats".into())),
        );
        let (state, _) = transition(
            state,
            SearchEvent::PageResolved {
                key: PageKey::new("cats", 1),
                result: Err(std::sync::Arc::new("API error (status 502): bad gateway".into())),
            },
        );
        let area = Rect::new(0, 0, 80, 12);
        let mut buf = Buffer::empty(area);
        ResultsView::new(&state).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Failed to load page 1"));
        assert!(text.contains("Load more"));
    }

    #[test]
    fn handles_empty_grid() {
        assert_eq!(compute_scroll_start(&[], 0, 10), 0);
    }

    #[test]
    fn advances_when_selected_is_below_exactly_full_window() {
        let heights = [5, 5, 5];
        assert_eq!(compute_scroll_start(&heights, 2, 10), 1);
    }

    #[test]
    fn keeps_selected_row_visible_when_it_is_taller_than_viewport() {
        let heights = [3, 12, 4];
        assert_eq!(compute_scroll_start(&heights, 1, 8), 1);
    }

    #[test]
    fn clamps_selected_row_to_last() {
        let heights = [2, 2, 2];
        assert_eq!(compute_scroll_start(&heights, 99, 4), 1);
    }
}
