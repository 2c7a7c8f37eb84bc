use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppMode};
use crate::search::state::Phase;
use crate::ui::text::truncate;

/// Bottom status bar showing mode, the active search, and status messages.
pub struct StatusBar<'a> {
    pub app: &'a App,
}

impl<'a> StatusBar<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        // Background
        let bg_style = Style::default().bg(Color::DarkGray).fg(Color::White);
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_style(bg_style);
        }

        let mut spans = Vec::new();

        // Mode indicator
        let mode_str = match self.app.mode {
            AppMode::Normal => " NORMAL ",
            AppMode::Command => " COMMAND ",
            AppMode::Search => " SEARCH ",
        };
        let mode_style = Style::default()
            .bg(match self.app.mode {
                AppMode::Normal => Color::Blue,
                AppMode::Command => Color::Magenta,
                AppMode::Search => Color::Yellow,
            })
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        spans.push(Span::styled(mode_str, mode_style));
        spans.push(Span::raw(" "));

        let search = &self.app.search;
        let summary = match &search.term {
            Some(term) => format!(
                "{term} \u{b7} page {} \u{b7} {} results",
                search.page,
                search.results.len()
            ),
            None => "tubesearch".to_string(),
        };
        spans.push(Span::styled(summary, bg_style));

        match &search.phase {
            Phase::Loading(_) => spans.push(Span::styled(
                " [loading...]",
                Style::default().bg(Color::DarkGray).fg(Color::Yellow),
            )),
            Phase::Loaded { exhausted: true } => spans.push(Span::styled(
                " [end]",
                Style::default().bg(Color::DarkGray).fg(Color::Gray),
            )),
            _ => {}
        }

        // Status message, or the fetch error (right-aligned)
        let message = self
            .app
            .status_message
            .as_deref()
            .or_else(|| search.error().map(|_| "fetch failed (e for details)"));
        if let Some(msg) = message {
            let left_width: usize = spans.iter().map(|s| s.width()).sum();
            let msg = truncate(msg, area.width as usize);
            let padding = right_align_padding(area.width as usize, left_width, &msg);
            if padding > 0 {
                spans.push(Span::styled(" ".repeat(padding), bg_style));
            }
            spans.push(Span::styled(
                msg,
                Style::default().bg(Color::DarkGray).fg(Color::Red),
            ));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

/// Blank cells between the left-hand spans and a right-aligned message.
fn right_align_padding(total: usize, left_width: usize, msg: &str) -> usize {
    total.saturating_sub(left_width + msg.width())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_counts_display_cells_not_bytes() {
        assert_eq!(right_align_padding(40, 10, "failed"), 24);
        // 6 cells, 18 bytes.
        assert_eq!(right_align_padding(40, 10, "\u{691c}\u{7d22}\u{5931}"), 24);
        assert_eq!(right_align_padding(40, 10, "caf\u{e9}"), 26);
    }

    #[test]
    fn padding_never_underflows() {
        assert_eq!(right_align_padding(10, 8, "too long message"), 0);
    }
}
