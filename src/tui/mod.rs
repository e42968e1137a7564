//! Terminal User Interface
//!
//! Lab picker, lab workspace and completion screen, drawn with ratatui

pub mod app;
pub mod history;
pub mod widgets;

pub use app::App;

use crate::data::LabStatus;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme
pub struct Theme {
    pub fg: Color,
    pub accent: Color,
    pub alert: Color,
    pub success: Color,
    pub warning: Color,
    pub info: Color,
    pub border: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::White,
            accent: Color::Cyan,
            alert: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            info: Color::Blue,
            border: Color::DarkGray,
            muted: Color::DarkGray,
        }
    }
}

/// Get color for a lab status
pub fn status_color(status: &LabStatus) -> Color {
    match status {
        LabStatus::Starting => Color::Yellow,
        LabStatus::Running => Color::Green,
        LabStatus::Completed => Color::Cyan,
        LabStatus::Error => Color::Red,
    }
}

/// Style for one transcript line, picked from its leading marker
pub fn transcript_style(line: &str, prompt: &str) -> Style {
    let (color, bold) = if line.starts_with(prompt) {
        (Color::White, true)
    } else if line.starts_with("bash:") || line.starts_with("[!]") {
        (Color::Red, true)
    } else if line.starts_with("[+]") {
        (Color::Green, false)
    } else if line.starts_with("[*]") {
        (Color::Cyan, false)
    } else if line.starts_with("[INFO]") {
        (Color::Blue, false)
    } else if line.starts_with("+ ") || line.starts_with('/') {
        (Color::Magenta, false)
    } else if line.starts_with('+') || line.starts_with('|') || line.starts_with('=') {
        (Color::DarkGray, false)
    } else {
        (Color::Gray, false)
    };

    if bold {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// ASCII art logo
pub const LOGO: &str = r#"
 ██████╗██╗   ██╗██████╗ ███████╗██████╗ ██╗      █████╗ ██████╗
██╔════╝╚██╗ ██╔╝██╔══██╗██╔════╝██╔══██╗██║     ██╔══██╗██╔══██╗
██║      ╚████╔╝ ██████╔╝█████╗  ██████╔╝██║     ███████║██████╔╝
██║       ╚██╔╝  ██╔══██╗██╔══╝  ██╔══██╗██║     ██╔══██║██╔══██╗
╚██████╗   ██║   ██████╔╝███████╗██║  ██║███████╗██║  ██║██████╔╝
 ╚═════╝   ╚═╝   ╚═════╝ ╚══════╝╚═╝  ╚═╝╚══════╝╚═╝  ╚═╝╚═════╝
              hands-on security labs in your terminal
"#;

/// Smaller logo for header
pub const SMALL_LOGO: &str = " CYBERLAB ";

/// Help text
pub const HELP_TEXT: &str = r#"
╔═══════════════════════════════════════════════════════════╗
║                        CONTROLS                           ║
╠═══════════════════════════════════════════════════════════╣
║  ↑/↓    Choose a lab                                      ║
║  Enter  Open lab / submit command                         ║
║  Esc    Leave command mode / back to lab list             ║
║  ?      Toggle this help                                  ║
║  q      Quit (from the lab list)                          ║
╠═══════════════════════════════════════════════════════════╣
║                       IN A LAB                            ║
╠═══════════════════════════════════════════════════════════╣
║  : / Space  Type a command                                ║
║  ↑/↓        Command history (while typing)                ║
║  PgUp/PgDn  Scroll the terminal                           ║
║  Ctrl-R     Reset the lab                                 ║
║  Ctrl-S     Stop the lab                                  ║
║  f          Finish (once every objective is complete)     ║
╚═══════════════════════════════════════════════════════════╝
"#;

/// Header, content, status bar
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(10),     // Main content
            Constraint::Length(1),   // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Terminal on the left, lab details on the right
pub fn create_content_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(62),  // Terminal
            Constraint::Percentage(38),  // Objectives + target
        ])
        .split(area)
        .to_vec()
}

/// Objectives above the target application
pub fn create_side_layout(area: Rect, objective_count: usize) -> Vec<Rect> {
    let objectives_height = (objective_count as u16 + 4).max(6);
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(objectives_height),
            Constraint::Min(6),
        ])
        .split(area)
        .to_vec()
}

/// Centered popup rectangle clamped to the frame
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::DEFAULT_PROMPT;

    #[test]
    fn prompt_lines_are_bold() {
        let style = transcript_style("student@cyberlab:~$ nmap", DEFAULT_PROMPT);
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn not_found_is_red() {
        let style = transcript_style("bash: foo: command not found", DEFAULT_PROMPT);
        assert_eq!(style.fg, Some(Color::Red));
    }

    #[test]
    fn popup_fits_small_frames() {
        let area = Rect::new(0, 0, 20, 10);
        let popup = centered_rect(area, 70, 25);
        assert!(popup.width <= area.width && popup.height <= area.height);
    }
}
