//! Custom widgets for the lab UI

use crate::data::LabStatus;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Labelled progress bar for objective completion
pub struct ProgressBar {
    done: usize,
    total: usize,
    label: String,
    color: Color,
    complete_color: Color,
}

impl ProgressBar {
    pub fn new(label: &str, done: usize, total: usize) -> Self {
        Self {
            done,
            total,
            label: label.to_string(),
            color: Color::Yellow,
            complete_color: Color::Green,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn complete_color(mut self, color: Color) -> Self {
        self.complete_color = color;
        self
    }

    fn is_complete(&self) -> bool {
        self.total > 0 && self.done >= self.total
    }
}

impl Widget for ProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }

        let color = if self.is_complete() { self.complete_color } else { self.color };

        let label = format!("{}: {}/{}", self.label, self.done, self.total);
        buf.set_stringn(area.x, area.y, &label, area.width as usize, Style::default().fg(color));

        if area.height > 1 {
            let inner = area.width - 2;
            let filled = if self.total == 0 {
                0
            } else {
                (self.done.min(self.total) as u16 * inner) / self.total as u16
            };

            let bar_y = area.y + 1;
            buf.set_string(area.x, bar_y, "[", Style::default());
            buf.set_string(area.x + area.width - 1, bar_y, "]", Style::default());

            for x in 0..filled {
                buf.set_string(area.x + 1 + x, bar_y, "█", Style::default().fg(color));
            }
            for x in filled..inner {
                buf.set_string(area.x + 1 + x, bar_y, "░", Style::default().fg(Color::DarkGray));
            }
        }
    }
}

/// Symbol + status text, e.g. `● RUNNING`
pub struct StatusBadge {
    status: LabStatus,
    suffix: Option<String>,
}

impl StatusBadge {
    pub fn new(status: LabStatus) -> Self {
        Self { status, suffix: None }
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

impl Widget for StatusBadge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let color = crate::tui::status_color(&self.status);
        let mut text = format!("{} {}", self.status.symbol(), self.status);
        if let Some(suffix) = self.suffix {
            text.push_str(&format!(" | {}", suffix));
        }
        buf.set_stringn(
            area.x,
            area.y,
            &text,
            area.width as usize,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
    }
}

/// Double-lined box with a centered title, used for the completion summary
pub struct BannerBox {
    title: String,
    content: Vec<String>,
    border_color: Color,
}

impl BannerBox {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
            border_color: Color::Green,
        }
    }

    pub fn content(mut self, lines: Vec<String>) -> Self {
        self.content = lines;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }
}

impl Widget for BannerBox {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let style = Style::default().fg(self.border_color);
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;

        // Borders
        buf.set_string(area.x, area.y, "╔", style);
        buf.set_string(right, area.y, "╗", style);
        buf.set_string(area.x, bottom, "╚", style);
        buf.set_string(right, bottom, "╝", style);
        for x in area.x + 1..right {
            buf.set_string(x, area.y, "═", style);
            buf.set_string(x, bottom, "═", style);
        }
        for y in area.y + 1..bottom {
            buf.set_string(area.x, y, "║", style);
            buf.set_string(right, y, "║", style);
        }

        // Title
        let title = format!(" {} ", self.title);
        let title_len = title.chars().count() as u16;
        if title_len + 2 <= area.width {
            let start = area.x + (area.width - title_len) / 2;
            buf.set_string(start, area.y, &title, style.add_modifier(Modifier::BOLD));
        }

        // Content
        let max_width = area.width.saturating_sub(4) as usize;
        for (i, line) in self.content.iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= bottom {
                break;
            }
            buf.set_stringn(area.x + 2, y, line, max_width, Style::default().fg(Color::White));
        }
    }
}
