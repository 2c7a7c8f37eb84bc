use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::search::state::SearchState;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
/// Ticks per spinner frame.
const SPINNER_TICKS: usize = 6;

/// The "load more" control under the result grid.
///
/// Dimmed and showing the loading caption while a page is in flight.
pub struct LoadMoreButton<'a> {
    pub caption: &'a str,
    pub enabled: bool,
    pub loading: bool,
    pub frame: usize,
}

impl<'a> LoadMoreButton<'a> {
    pub fn new(state: &SearchState) -> Self {
        Self {
            caption: state.load_more_caption(),
            enabled: state.load_more_enabled(),
            loading: state.is_loading(),
            frame: 0,
        }
    }

    /// Animation frame for the loading spinner.
    pub fn frame(mut self, frame: usize) -> Self {
        self.frame = frame;
        self
    }
}

impl Widget for LoadMoreButton<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let style = if self.enabled {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style);

        let mut spans = Vec::new();
        if self.loading {
            spans.push(Span::styled(
                format!("{} ", SPINNER[(self.frame / SPINNER_TICKS) % SPINNER.len()]),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::styled(self.caption, style));
        if self.enabled {
            spans.push(Span::styled(" (n)", Style::default().fg(Color::DarkGray)));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::state::{LOAD_MORE_CAPTION, LOADING_CAPTION, SearchEvent, transition};

    fn render(state: &SearchState) -> (String, Buffer) {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        LoadMoreButton::new(state).render(area, &mut buf);
        let text = (0..area.width)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect::<String>();
        (text, buf)
    }

    #[test]
    fn disabled_with_loading_caption_while_in_flight() {
        let (state, _) = transition(
            SearchState::default(),
            SearchEvent::TermChanged(Some("cats".into())),
        );
        let button = LoadMoreButton::new(&state);
        assert!(!button.enabled);

        let (text, buf) = render(&state);
        assert!(text.contains(LOADING_CAPTION));
        assert_eq!(buf[(0, 0)].fg, Color::DarkGray);
    }

    #[test]
    fn enabled_with_idle_caption_once_resolved() {
        let (state, _) = transition(
            SearchState::default(),
            SearchEvent::TermChanged(Some("cats".into())),
        );
        let (state, _) = transition(
            state,
            SearchEvent::PageResolved {
                key: crate::search::PageKey::new("cats", 1),
                result: Ok(None),
            },
        );
        assert!(LoadMoreButton::new(&state).enabled);

        let (text, buf) = render(&state);
        assert!(text.contains(LOAD_MORE_CAPTION));
        assert_eq!(buf[(0, 0)].fg, Color::White);
    }
}
