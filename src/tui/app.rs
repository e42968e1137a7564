//! Main application state and rendering

use crate::config::LabConfig;
use crate::data::labs::{self, LabDefinition};
use crate::data::LabStatus;
use crate::lab::{self, LabEvent, LabHandle, LabSnapshot, UniformLatency};
use crate::tui::history::CommandHistory;
use crate::tui::widgets::{BannerBox, ProgressBar, StatusBadge};
use crate::tui::{centered_rect, styled_block, transcript_style, Theme, HELP_TEXT, LOGO, SMALL_LOGO};
use crate::tui::{create_content_layout, create_main_layout, create_side_layout};
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Application state
pub struct App {
    pub config: LabConfig,
    pub theme: Theme,
    pub running: bool,
    pub show_help: bool,
    pub current_screen: Screen,
    pub menu_state: ListState,
    pub input_buffer: String,
    pub input_mode: InputMode,
    pub history: CommandHistory,
    pub scroll: u16,
    pub notice: Option<String>,
    pub lab: Option<ActiveLab>,
    runtime: Handle,
}

/// Current screen being displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    LabSelect,
    Lab,
    Complete,
}

/// Input mode for the command prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
}

/// The lab currently open in the workspace
pub struct ActiveLab {
    pub definition: &'static LabDefinition,
    pub handle: LabHandle,
    pub events: mpsc::UnboundedReceiver<LabEvent>,
    pub finish_ready: bool,
    pub elapsed_secs: Option<i64>,
}

impl App {
    pub fn new(config: LabConfig, runtime: Handle) -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));
        let history = CommandHistory::new(config.ui.history_limit);

        let mut app = Self {
            config,
            theme: Theme::default(),
            running: true,
            show_help: false,
            current_screen: Screen::LabSelect,
            menu_state,
            input_buffer: String::new(),
            input_mode: InputMode::Normal,
            history,
            scroll: 0,
            notice: None,
            lab: None,
            runtime,
        };

        if let Some(lab_id) = app.config.ui.default_lab.clone() {
            app.open_lab(&lab_id);
        }
        app
    }

    /// Open a lab by id. Unknown ids run the default lab.
    pub fn open_lab(&mut self, lab_id: &str) {
        let definition = labs::lookup(lab_id);
        if definition.id != lab_id {
            warn!(requested = lab_id, "unknown lab, using default");
        }

        let latency = UniformLatency::from_config(&self.config.timing);
        let (handle, events) = {
            let _guard = self.runtime.enter();
            lab::spawn(lab_id, &self.config.ui.prompt, latency)
        };
        info!(lab = lab_id, "lab opened");

        self.lab = Some(ActiveLab {
            definition,
            handle,
            events,
            finish_ready: false,
            elapsed_secs: None,
        });
        self.current_screen = Screen::Lab;
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.scroll = 0;
        self.notice = None;
    }

    /// Drop the active lab and return to the picker
    pub fn close_lab(&mut self) {
        if let Some(lab) = self.lab.take() {
            info!(lab = lab.definition.id, "lab closed");
        }
        self.current_screen = Screen::LabSelect;
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.notice = None;
    }

    pub fn snapshot(&self) -> Option<LabSnapshot> {
        self.lab.as_ref().map(|lab| lab.handle.snapshot())
    }

    /// React to engine events since the last frame
    pub fn pump_events(&mut self) {
        let Some(lab) = self.lab.as_mut() else {
            return;
        };

        let mut notices = Vec::new();
        let mut finished = false;
        while let Ok(event) = lab.events.try_recv() {
            debug!(?event, "lab event");
            match event {
                LabEvent::ObjectiveCompleted { description, .. } => {
                    notices.push(format!("✔ Objective complete: {}", description));
                }
                LabEvent::AllObjectivesComplete => {
                    lab.finish_ready = true;
                    notices.push("All objectives complete! Press 'f' to finish the lab.".to_string());
                }
                LabEvent::StatusChanged(LabStatus::Starting) => {
                    lab.finish_ready = false;
                }
                LabEvent::StatusChanged(_) => {}
                LabEvent::Finished { elapsed_secs } => {
                    lab.elapsed_secs = Some(elapsed_secs);
                    finished = true;
                }
            }
        }

        if let Some(notice) = notices.pop() {
            self.notice = Some(notice);
        }
        if finished {
            self.current_screen = Screen::Complete;
        }
    }

    /// Handle keyboard input
    pub fn handle_input(&mut self) -> std::io::Result<bool> {
        self.pump_events();

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(true);
                }
                self.handle_key(key);
            }
        }
        Ok(self.running)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }
        self.notice = None;

        if self.input_mode == InputMode::Command {
            self.handle_command_key(key.code);
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter) {
                self.show_help = false;
            }
            return;
        }

        match self.current_screen {
            Screen::LabSelect => self.handle_select_key(key.code),
            Screen::Lab => self.handle_lab_key(key),
            Screen::Complete => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.close_lab();
                }
            }
        }
    }

    fn handle_command_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                self.submit_command();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Up => {
                if let Some(line) = self.history.previous() {
                    self.input_buffer = line.to_string();
                }
            }
            KeyCode::Down => {
                self.input_buffer = self.history.newer().map(str::to_string).unwrap_or_default();
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
    }

    fn handle_select_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up | KeyCode::Char('k') => self.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.navigate_down(),
            KeyCode::Enter => {
                let index = self.menu_state.selected().unwrap_or(0);
                if let Some(definition) = labs::catalogue().get(index) {
                    self.open_lab(definition.id);
                }
            }
            _ => {}
        }
    }

    fn handle_lab_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('r') => self.reset_lab(),
                KeyCode::Char('s') => self.stop_lab(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(':') | KeyCode::Char('/') | KeyCode::Char(' ') => {
                self.input_mode = InputMode::Command;
                self.input_buffer.clear();
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('f') | KeyCode::Char('F') => self.finish_lab(),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_add(5),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_sub(5),
            KeyCode::Esc => self.close_lab(),
            _ => {}
        }
    }

    /// Send the typed line to the engine
    fn submit_command(&mut self) {
        let line = std::mem::take(&mut self.input_buffer);
        self.history.push(&line);
        self.scroll = 0;

        let Some(handle) = self.lab.as_ref().map(|lab| lab.handle.clone()) else {
            return;
        };
        if let Err(err) = self.block_on(handle.execute(line)) {
            self.notice = Some(format!("✖ {}", err));
        }
    }

    fn reset_lab(&mut self) {
        let Some(handle) = self.lab.as_ref().map(|lab| lab.handle.clone()) else {
            return;
        };
        match self.block_on(handle.reset()) {
            Ok(()) => self.notice = Some("Lab reset. Rebooting environment...".to_string()),
            Err(err) => self.notice = Some(format!("✖ {}", err)),
        }
        if let Some(lab) = self.lab.as_mut() {
            lab.finish_ready = false;
        }
        self.scroll = 0;
    }

    fn stop_lab(&mut self) {
        let Some(handle) = self.lab.as_ref().map(|lab| lab.handle.clone()) else {
            return;
        };
        match self.block_on(handle.stop()) {
            Ok(()) => self.notice = Some("Lab stopped. Press Ctrl-R to start again.".to_string()),
            Err(err) => self.notice = Some(format!("✖ Cannot stop: {}", err)),
        }
    }

    fn finish_lab(&mut self) {
        let Some(lab) = self.lab.as_ref() else {
            return;
        };
        if !lab.handle.all_objectives_complete() {
            let (done, total) = lab.handle.snapshot().progress();
            self.notice = Some(format!("Finish unlocks when all objectives are complete ({}/{})", done, total));
            return;
        }
        let handle = lab.handle.clone();
        if let Err(err) = self.block_on(handle.finish()) {
            self.notice = Some(format!("✖ {}", err));
        }
        self.pump_events();
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn navigate_up(&mut self) {
        let i = self.menu_state.selected().unwrap_or(0);
        if i > 0 {
            self.menu_state.select(Some(i - 1));
        }
    }

    fn navigate_down(&mut self) {
        let max = labs::catalogue().len().saturating_sub(1);
        let i = self.menu_state.selected().unwrap_or(0);
        if i < max {
            self.menu_state.select(Some(i + 1));
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        match self.current_screen {
            Screen::LabSelect => self.render_lab_select(frame),
            Screen::Lab => self.render_lab(frame),
            Screen::Complete => self.render_complete(frame),
        }

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_lab_select(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),   // Logo
                Constraint::Min(5),      // Lab list
                Constraint::Length(6),   // Briefing
                Constraint::Length(1),   // Hints
            ])
            .split(area);

        let logo = Paragraph::new(LOGO)
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(logo, chunks[0]);

        let items: Vec<ListItem> = labs::catalogue()
            .iter()
            .map(|lab| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<30}", lab.title), Style::default().fg(self.theme.fg)),
                    Span::styled(lab.difficulty_stars(), Style::default().fg(self.theme.warning)),
                    Span::styled(
                        format!("  {} objectives", lab.objectives.len()),
                        Style::default().fg(self.theme.muted),
                    ),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(styled_block("Choose a lab", &self.theme))
            .highlight_style(Style::default().fg(Color::Black).bg(self.theme.accent))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, chunks[1], &mut self.menu_state);

        let selected = labs::catalogue()
            .get(self.menu_state.selected().unwrap_or(0))
            .unwrap_or_else(|| labs::default_lab());
        let briefing = Paragraph::new(selected.briefing)
            .style(Style::default().fg(self.theme.fg))
            .wrap(Wrap { trim: true })
            .block(styled_block("Briefing", &self.theme));
        frame.render_widget(briefing, chunks[2]);

        let hints = Paragraph::new(" ↑/↓ select | Enter open | ? help | q quit ")
            .style(Style::default().fg(self.theme.fg).bg(Color::DarkGray));
        frame.render_widget(hints, chunks[3]);
    }

    fn render_lab(&mut self, frame: &mut Frame) {
        let Some(snapshot) = self.snapshot() else {
            self.render_lab_select(frame);
            return;
        };

        let layout = create_main_layout(frame.area());
        self.render_header(frame, layout[0], &snapshot);

        let content = create_content_layout(layout[1]);
        self.render_terminal(frame, content[0], &snapshot);

        let side = create_side_layout(content[1], snapshot.objectives.len());
        self.render_objectives(frame, side[0], &snapshot);
        self.render_target(frame, side[1]);

        self.render_status_bar(frame, layout[2], &snapshot);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, snapshot: &LabSnapshot) {
        let header_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12),
                Constraint::Min(20),
                Constraint::Length(28),
            ])
            .split(area);

        let logo = Paragraph::new(SMALL_LOGO)
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(logo, header_layout[0]);

        let title = Paragraph::new(snapshot.title.clone())
            .style(Style::default().fg(self.theme.warning))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(title, header_layout[1]);

        let status_block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border));
        let inner = status_block.inner(header_layout[2]);
        frame.render_widget(status_block, header_layout[2]);
        let elapsed = (Utc::now() - snapshot.started_at).num_seconds().max(0);
        frame.render_widget(
            StatusBadge::new(snapshot.status).suffix(format_elapsed(elapsed)),
            inner,
        );
    }

    fn render_terminal(&self, frame: &mut Frame, area: Rect, snapshot: &LabSnapshot) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),      // Output
                Constraint::Length(3),   // Input line
            ])
            .split(area);

        let prompt = self.config.ui.prompt.as_str();
        let visible_lines = chunks[0].height.saturating_sub(2) as usize;
        let end = snapshot.transcript.len().saturating_sub(self.scroll as usize);
        let start = end.saturating_sub(visible_lines);
        let output_lines: Vec<Line> = snapshot.transcript[start..end]
            .iter()
            .map(|line| Line::from(Span::styled(line.as_str(), transcript_style(line, prompt))))
            .collect();

        let title = if self.scroll > 0 {
            format!("Terminal (scrolled {} lines)", self.scroll)
        } else {
            "Terminal".to_string()
        };
        let terminal = Paragraph::new(output_lines)
            .block(styled_block(&title, &self.theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(terminal, chunks[0]);

        let typing = self.input_mode == InputMode::Command;
        let (text, color) = match snapshot.status {
            _ if typing => (format!("{} {}_", prompt, self.input_buffer), Color::Green),
            LabStatus::Starting => ("Lab is starting, please wait...".to_string(), self.theme.warning),
            LabStatus::Running => (format!("{} [Press : or / to type a command]", prompt), self.theme.muted),
            LabStatus::Completed => ("Lab session ended. Press 'r' to restart or Esc to leave.".to_string(), self.theme.muted),
            LabStatus::Error => ("Lab engine stopped unexpectedly. Press Esc to leave.".to_string(), self.theme.alert),
        };

        let input = Paragraph::new(text)
            .style(Style::default().fg(color))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if typing { Color::Green } else { self.theme.border }))
                    .title(" Command "),
            );
        frame.render_widget(input, chunks[1]);
    }

    fn render_objectives(&self, frame: &mut Frame, area: Rect, snapshot: &LabSnapshot) {
        let block = styled_block("Objectives", &self.theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        let (done, total) = snapshot.progress();
        let bar = ProgressBar::new("Progress", done, total)
            .color(self.theme.warning)
            .complete_color(self.theme.success);
        frame.render_widget(bar, chunks[0]);

        let lines: Vec<Line> = if snapshot.objectives.is_empty() {
            vec![Line::from(Span::styled(
                "Objectives load once the lab is ready.",
                Style::default().fg(self.theme.muted),
            ))]
        } else {
            snapshot
                .objectives
                .iter()
                .map(|objective| {
                    let color = if objective.completed { self.theme.success } else { self.theme.fg };
                    Line::from(vec![
                        Span::styled(format!("{} ", objective.checkbox()), Style::default().fg(color)),
                        Span::styled(objective.description.as_str(), Style::default().fg(color)),
                    ])
                })
                .collect()
        };
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[1]);
    }

    fn render_target(&self, frame: &mut Frame, area: Rect) {
        let Some(lab) = self.lab.as_ref() else {
            return;
        };
        let target = &lab.definition.target;

        let mut lines = vec![
            Line::from(Span::styled(
                format!("⌂ {}", target.url),
                Style::default().fg(self.theme.info).add_modifier(Modifier::UNDERLINED),
            )),
            Line::from(""),
        ];
        lines.extend(
            target
                .body
                .iter()
                .map(|line| Line::from(Span::styled(*line, Style::default().fg(self.theme.fg)))),
        );

        let panel = Paragraph::new(lines).block(styled_block(&format!("Target: {}", target.name), &self.theme));
        frame.render_widget(panel, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, snapshot: &LabSnapshot) {
        let finish_hint = if self.lab.as_ref().is_some_and(|lab| lab.finish_ready)
            && snapshot.status == LabStatus::Running
        {
            " | f FINISH"
        } else {
            ""
        };
        let text = match &self.notice {
            Some(notice) => format!(" {} ", notice),
            None => format!(" : command | ^R reset | ^S stop{} | Esc labs | ? help ", finish_hint),
        };

        let status = Paragraph::new(text).style(Style::default().fg(self.theme.fg).bg(Color::DarkGray));
        frame.render_widget(status, area);
    }

    fn render_complete(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let Some(lab) = self.lab.as_ref() else {
            return;
        };
        let snapshot = lab.handle.snapshot();

        let mut content = vec![
            String::new(),
            format!("Lab:        {}", lab.definition.title),
            format!("Time:       {}", format_elapsed(lab.elapsed_secs.unwrap_or(0))),
            format!("Objectives: {}/{}", snapshot.progress().0, snapshot.progress().1),
            String::new(),
        ];
        content.extend(
            snapshot
                .objectives
                .iter()
                .map(|o| format!("{} {}", o.checkbox(), o.description)),
        );
        content.push(String::new());
        content.push("Press Enter to return to the lab list".to_string());

        let popup = centered_rect(area, 64, content.len() as u16 + 2);
        frame.render_widget(
            BannerBox::new("LAB COMPLETE")
                .content(content)
                .border_color(self.theme.success),
            popup,
        );
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let popup_area = centered_rect(frame.area(), 64, 22);
        frame.render_widget(Clear, popup_area);

        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.accent)));
        frame.render_widget(help, popup_area);
    }
}

/// mm:ss
pub fn format_elapsed(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char(c))
        }
    }

    fn type_line(app: &mut App, line: &str) {
        app.handle_key(key(KeyCode::Char(':')));
        for c in line.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
    }

    fn fast_config() -> LabConfig {
        let mut config = LabConfig::default();
        config.timing.boot_delay_ms = 0;
        config.timing.response_delay_min_ms = 0;
        config.timing.response_delay_max_ms = 0;
        config
    }

    fn wait_for(app: &App, pred: impl Fn(&LabSnapshot) -> bool) {
        for _ in 0..200 {
            if app.snapshot().is_some_and(|s| pred(&s)) {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("condition not reached");
    }

    #[test]
    fn elapsed_is_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(125), "02:05");
        assert_eq!(format_elapsed(-3), "00:00");
    }

    #[test]
    fn picker_opens_selected_lab() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = App::new(fast_config(), runtime.handle().clone());
        assert_eq!(app.current_screen, Screen::LabSelect);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.current_screen, Screen::Lab);
        assert_eq!(app.lab.as_ref().map(|l| l.definition.id), Some(labs::catalogue()[0].id));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.current_screen, Screen::LabSelect);
        assert!(app.lab.is_none());
    }

    #[test]
    fn full_lab_run_reaches_completion_screen() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut config = fast_config();
        config.ui.default_lab = Some("default".to_string());
        let mut app = App::new(config, runtime.handle().clone());
        wait_for(&app, |s| s.status == LabStatus::Running);

        type_line(&mut app, "scan");
        type_line(&mut app, "sqlmap");
        wait_for(&app, |s| s.all_objectives_complete());

        app.pump_events();
        assert!(app.lab.as_ref().is_some_and(|l| l.finish_ready));

        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.current_screen, Screen::Complete);
        assert_eq!(app.snapshot().map(|s| s.status), Some(LabStatus::Completed));
        assert_eq!(app.history.len(), 2);
    }

    #[test]
    fn finish_is_refused_with_open_objectives() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut config = fast_config();
        config.ui.default_lab = Some("injection".to_string());
        let mut app = App::new(config, runtime.handle().clone());
        wait_for(&app, |s| s.status == LabStatus::Running);

        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.current_screen, Screen::Lab);
        assert!(app.notice.as_deref().is_some_and(|n| n.contains("0/4")));

        app.handle_key(key(KeyCode::PageUp));
        assert!(app.notice.is_none());
    }

    #[test]
    fn ctrl_r_resets_and_plain_r_does_not() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut config = fast_config();
        config.timing.boot_delay_ms = 300;
        config.ui.default_lab = Some("injection".to_string());
        let mut app = App::new(config, runtime.handle().clone());
        wait_for(&app, |s| s.status == LabStatus::Running);

        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.snapshot().map(|s| s.status), Some(LabStatus::Running));

        app.handle_key(ctrl('r'));
        assert_eq!(app.snapshot().map(|s| s.status), Some(LabStatus::Starting));
        assert!(app.notice.as_deref().is_some_and(|n| n.contains("reset")));
    }

    #[test]
    fn ctrl_s_stops_the_lab() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut config = fast_config();
        config.ui.default_lab = Some("recon".to_string());
        let mut app = App::new(config, runtime.handle().clone());
        wait_for(&app, |s| s.status == LabStatus::Running);

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.snapshot().map(|s| s.status), Some(LabStatus::Running));

        app.handle_key(ctrl('s'));
        assert_eq!(app.snapshot().map(|s| s.status), Some(LabStatus::Completed));
        assert_eq!(app.current_screen, Screen::Lab);
    }

    #[test]
    fn history_recall_fills_input() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut config = fast_config();
        config.ui.default_lab = Some("recon".to_string());
        let mut app = App::new(config, runtime.handle().clone());
        wait_for(&app, |s| s.status == LabStatus::Running);

        type_line(&mut app, "nikto");
        app.handle_key(key(KeyCode::Char(':')));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.input_buffer, "nikto");
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn command_while_starting_shows_notice() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut config = LabConfig::default();
        config.ui.default_lab = Some("injection".to_string());
        let mut app = App::new(config, runtime.handle().clone());

        type_line(&mut app, "nmap");
        assert!(app.notice.as_deref().is_some_and(|n| n.contains("not running")));
    }
}
