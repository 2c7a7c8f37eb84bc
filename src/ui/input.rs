use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthChar;

/// Single-line text prompt with a block cursor at the end.
pub struct TextInput<'a> {
    pub prompt: &'a str,
    pub text: &'a str,
    pub style: Style,
}

impl<'a> TextInput<'a> {
    pub fn new(prompt: &'a str, text: &'a str) -> Self {
        Self {
            prompt,
            text,
            style: Style::default().fg(Color::White),
        }
    }
}

/// The rightmost part of `display` that fits in `width` cells.
fn visible_tail(display: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = display.len();
    for (i, c) in display.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = i;
    }
    &display[start..]
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let display = format!("{}{}\u{2588}", self.prompt, self.text);
        let visible = visible_tail(&display, area.width as usize);
        buf.set_string(area.x, area.y, visible, self.style);
    }
}
