use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::api::types::{Channel, Playlist, SearchEntry, Video};
use crate::ui::text::{format_count, format_duration, format_published, truncate, wrap_text};

/// Height of every card in the grid, borders included.
pub const CARD_HEIGHT: u16 = 7;

const VERIFIED: &str = " \u{2713}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Video,
    Channel,
    Playlist,
}

/// Pick the card renderer for an entry from its discriminant.
pub fn card_kind(entry: &SearchEntry) -> CardKind {
    match entry {
        SearchEntry::Video(_) => CardKind::Video,
        SearchEntry::Channel(_) => CardKind::Channel,
        SearchEntry::Playlist(_) => CardKind::Playlist,
    }
}

/// A bordered card for any entry; dispatches to the variant's body.
pub struct EntryCard<'a> {
    pub entry: &'a SearchEntry,
    pub selected: bool,
}

impl<'a> EntryCard<'a> {
    pub fn new(entry: &'a SearchEntry) -> Self {
        Self {
            entry,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for EntryCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let (label, accent) = match card_kind(self.entry) {
            CardKind::Video => (" video ", Color::Red),
            CardKind::Channel => (" channel ", Color::Green),
            CardKind::Playlist => (" playlist ", Color::Magenta),
        };
        let border_style = if self.selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(label, Style::default().fg(accent)))
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let width = inner.width as usize;
        let lines = match self.entry {
            SearchEntry::Video(video) => VideoCard { video }.lines(width),
            SearchEntry::Channel(channel) => ChannelCard { channel }.lines(width),
            SearchEntry::Playlist(playlist) => PlaylistCard { playlist }.lines(width),
        };

        let title_style = if self.selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let lines: Vec<Line<'_>> = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| if i == 0 { line.patch_style(title_style) } else { line })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn author_line(author: &str, verified: bool, width: usize) -> Line<'static> {
    let mut spans = vec![Span::raw(truncate(author, width.saturating_sub(2)))];
    if verified {
        spans.push(Span::styled(VERIFIED, Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn description_lines(description: &str, width: usize, max: usize) -> Vec<Line<'static>> {
    wrap_text(description, width)
        .into_iter()
        .take(max)
        .map(|l| Line::from(Span::styled(l, dim())))
        .collect()
}

/// Body of a video card.
pub struct VideoCard<'a> {
    pub video: &'a Video,
}

impl VideoCard<'_> {
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let v = self.video;
        let title = Line::from(Span::styled(
            truncate(&v.title, width),
            Style::default().add_modifier(Modifier::BOLD),
        ));

        let views = if v.view_count_text.is_empty() {
            format!("{} views", format_count(v.view_count))
        } else {
            v.view_count_text.clone()
        };
        let mut meta = vec![views];
        let published = format_published(v.published, &v.published_text);
        if !published.is_empty() {
            meta.push(published);
        }
        if v.length_seconds > 0 {
            meta.push(format_duration(v.length_seconds));
        }
        let mut meta_spans = vec![Span::styled(meta.join(" \u{b7} "), dim())];
        if v.live_now {
            meta_spans.push(Span::styled(" [LIVE]", Style::default().fg(Color::Red)));
        }
        if v.premium {
            meta_spans.push(Span::styled(" [PREMIUM]", Style::default().fg(Color::Yellow)));
        }
        if v.is_upcoming {
            meta_spans.push(Span::styled(" [UPCOMING]", Style::default().fg(Color::Blue)));
        }

        let mut lines = vec![
            title,
            author_line(&v.author, v.author_verified, width),
            Line::from(meta_spans),
        ];
        lines.extend(description_lines(&v.description, width, 2));
        lines
    }
}

/// Body of a channel card.
pub struct ChannelCard<'a> {
    pub channel: &'a Channel,
}

impl ChannelCard<'_> {
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let c = self.channel;
        let mut header = vec![Span::styled(
            truncate(&c.author, width.saturating_sub(2)),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if c.author_verified {
            header.push(Span::styled(VERIFIED, Style::default().fg(Color::Cyan)));
        }

        let mut handle = truncate(&c.channel_handle, width);
        if c.auto_generated {
            handle.push_str(" [auto]");
        }

        let stats = format!(
            "{} subscribers \u{b7} {} videos",
            format_count(c.sub_count),
            format_count(c.video_count)
        );

        let mut lines = vec![
            Line::from(header),
            Line::from(Span::styled(handle, dim())),
            Line::from(Span::styled(truncate(&stats, width), dim())),
        ];
        lines.extend(description_lines(&c.description, width, 2));
        lines
    }
}

/// Body of a playlist card, listing the first embedded videos.
pub struct PlaylistCard<'a> {
    pub playlist: &'a Playlist,
}

impl PlaylistCard<'_> {
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let p = self.playlist;
        let title = Line::from(Span::styled(
            truncate(&p.title, width),
            Style::default().add_modifier(Modifier::BOLD),
        ));

        let mut byline = author_line(&p.author, p.author_verified, width);
        byline.spans.push(Span::styled(
            format!(" \u{b7} {} videos", format_count(p.video_count)),
            dim(),
        ));

        let mut lines = vec![title, byline];
        for video in p.videos.iter().take(3) {
            let duration = format_duration(video.length_seconds);
            let room = width.saturating_sub(duration.len() + 3);
            lines.push(Line::from(vec![
                Span::raw(format!("\u{2022} {}", truncate(&video.title, room))),
                Span::styled(format!(" {duration}"), dim()),
            ]));
        }
        lines
    }
}
