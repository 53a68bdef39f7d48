//! The catalog-search TUI: basic/advanced query panels, results view, error
//! banner and database loading. Owns all page-level state (database handle,
//! current result, error flag) and replaces it wholesale rather than mutating
//! it incrementally.

use crate::config::{Config, RendererKind};
use crate::data::catalog_db::{spawn_load, CatalogDb, LoadOutcome};
use crate::data::exporter::Exporter;
use crate::data::result_set::ResultSet;
use crate::sql::command_source::{command_for_editor, resolve_command};
use crate::sql::query_builder::{SearchForm, TypeFilter};
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tui_input::{backend::crossterm::EventHandler, Input};

/// Mutually exclusive input panels
#[derive(Clone, Copy, PartialEq)]
pub enum ViewMode {
    Basic,
    Advanced,
}

#[derive(Clone, Copy, PartialEq)]
enum AppMode {
    Edit,
    Results,
    LoadPrompt,
}

/// Field selector choices: (wire value, display label)
const FIELD_CHOICES: [(&str, &str); 3] = [
    ("filename", "File Name"),
    ("relpath", "Relative Path"),
    ("filekey", "Unique Id"),
];

// Basic panel focus order: search box, field selector, type boxes, all, dups
const FOCUS_SEARCH: usize = 0;
const FOCUS_FIELD: usize = 1;
const FOCUS_TYPES: usize = 2;
const FOCUS_ALL: usize = FOCUS_TYPES + TypeFilter::ALL.len();
const FOCUS_DUPLICATES: usize = FOCUS_ALL + 1;

pub struct App {
    config: Config,

    view: ViewMode,
    mode: AppMode,

    // Basic search form state, captured into a SearchForm at execute time
    search_input: Input,
    field_idx: usize,
    type_checked: [bool; TypeFilter::ALL.len()],
    all_types: bool,
    include_duplicates: bool,
    focus: usize,

    // Advanced free-text editor
    editor: Input,

    // Database handle and load plumbing
    db: Option<CatalogDb>,
    load_generation: u64,
    load_rx: Option<Receiver<LoadOutcome>>,
    load_input: Input,
    loading: Option<PathBuf>,

    // Current result, replaced per execution
    result: Option<ResultSet>,
    table_state: TableState,

    // Error banner and status line
    error: Option<String>,
    status_message: String,

    show_help: bool,
    show_logs: bool,
    clipboard: Option<arboard::Clipboard>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, db: Option<CatalogDb>) -> Self {
        let include_duplicates = config.behavior.include_duplicates_default;
        let status_message = if db.is_some() {
            "Database loaded - Enter runs the search, F1 for help".to_string()
        } else {
            "No database loaded - press F5 to load a catalog database".to_string()
        };

        Self {
            config,
            view: ViewMode::Basic,
            mode: AppMode::Edit,
            search_input: Input::default(),
            field_idx: 0,
            type_checked: [false; TypeFilter::ALL.len()],
            all_types: true,
            include_duplicates,
            focus: FOCUS_SEARCH,
            editor: Input::default(),
            db,
            load_generation: 0,
            load_rx: None,
            load_input: Input::default(),
            loading: None,
            result: None,
            table_state: TableState::default(),
            error: None,
            status_message,
            show_help: false,
            show_logs: false,
            clipboard: arboard::Clipboard::new().ok(),
            should_quit: false,
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.ui(f))?;
            self.poll_load();

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    /// Capture the basic form as an immutable snapshot
    fn snapshot_form(&self) -> SearchForm {
        SearchForm {
            text: self.search_input.value().to_string(),
            field: FIELD_CHOICES[self.field_idx].0.to_string(),
            types: TypeFilter::ALL
                .iter()
                .zip(self.type_checked.iter())
                .filter(|(_, &checked)| checked)
                .map(|(t, _)| *t)
                .collect(),
            all_types: self.all_types,
            include_duplicates: self.include_duplicates,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                } else if self.show_logs {
                    self.show_logs = false;
                } else if self.mode == AppMode::LoadPrompt {
                    self.mode = AppMode::Edit;
                } else if self.mode == AppMode::Results {
                    self.mode = AppMode::Edit;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            KeyCode::F(1) => {
                self.show_help = !self.show_help;
                return;
            }
            KeyCode::F(12) => {
                self.show_logs = !self.show_logs;
                return;
            }
            KeyCode::F(5) => {
                self.mode = AppMode::LoadPrompt;
                return;
            }
            KeyCode::F(2) => {
                self.export_csv();
                return;
            }
            KeyCode::F(3) => {
                self.export_query();
                return;
            }
            KeyCode::F(4) => {
                self.export_json();
                return;
            }
            KeyCode::Tab if self.mode != AppMode::LoadPrompt => {
                self.switch_view();
                return;
            }
            _ => {}
        }

        match self.mode {
            AppMode::LoadPrompt => self.handle_load_prompt_key(key),
            AppMode::Results => self.handle_results_key(key),
            AppMode::Edit => match self.view {
                ViewMode::Basic => self.handle_basic_key(key),
                ViewMode::Advanced => self.handle_advanced_key(key),
            },
        }
    }

    fn handle_load_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let path = PathBuf::from(self.load_input.value().trim());
                if path.as_os_str().is_empty() {
                    self.status_message = "Enter a database path".to_string();
                    return;
                }
                self.start_load(path);
                self.mode = AppMode::Edit;
            }
            _ => {
                self.load_input.handle_event(&Event::Key(key));
            }
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let row_count = self.result.as_ref().map(|r| r.row_count()).unwrap_or(0);
        if row_count == 0 {
            return;
        }

        match key.code {
            KeyCode::Up => self.move_selection(-1, row_count),
            KeyCode::Down => self.move_selection(1, row_count),
            KeyCode::PageUp => self.move_selection(-10, row_count),
            KeyCode::PageDown => self.move_selection(10, row_count),
            KeyCode::Home => self.table_state.select(Some(0)),
            KeyCode::End => self.table_state.select(Some(row_count - 1)),
            KeyCode::Enter => self.activate_row(),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize, row_count: usize) {
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, row_count as isize - 1) as usize;
        self.table_state.select(Some(next));
    }

    fn handle_basic_key(&mut self, key: KeyEvent) {
        match key.code {
            // Enter executes from anywhere in the form (default submit is
            // suppressed by there being no form to submit)
            KeyCode::Enter => self.execute(),
            KeyCode::Up if self.focus > FOCUS_SEARCH => self.focus -= 1,
            KeyCode::Down if self.focus < FOCUS_DUPLICATES => self.focus += 1,
            KeyCode::Left | KeyCode::Right if self.focus == FOCUS_FIELD => {
                let len = FIELD_CHOICES.len();
                self.field_idx = if key.code == KeyCode::Right {
                    (self.field_idx + 1) % len
                } else {
                    (self.field_idx + len - 1) % len
                };
            }
            KeyCode::Char(' ') if self.focus == FOCUS_FIELD => {
                self.field_idx = (self.field_idx + 1) % FIELD_CHOICES.len();
            }
            KeyCode::Char(' ') if self.focus == FOCUS_ALL => {
                self.all_types = !self.all_types;
            }
            KeyCode::Char(' ') if self.focus == FOCUS_DUPLICATES => {
                self.include_duplicates = !self.include_duplicates;
            }
            KeyCode::Char(' ')
                if (FOCUS_TYPES..FOCUS_ALL).contains(&self.focus) && !self.all_types =>
            {
                // Individual boxes are disabled while "all" is checked
                let idx = self.focus - FOCUS_TYPES;
                self.type_checked[idx] = !self.type_checked[idx];
            }
            _ if self.focus == FOCUS_SEARCH => {
                self.search_input.handle_event(&Event::Key(key));
            }
            _ => {}
        }
    }

    fn handle_advanced_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.execute(),
            _ => {
                self.editor.handle_event(&Event::Key(key));
            }
        }
    }

    /// Toggle basic/advanced. Switching to advanced seeds the editor with the
    /// command the basic form would run right now; switching back never
    /// pushes edits into the form.
    fn switch_view(&mut self) {
        match self.view {
            ViewMode::Basic => match command_for_editor(&self.snapshot_form()) {
                Ok(seed) => {
                    self.editor = Input::from(seed);
                    self.view = ViewMode::Advanced;
                }
                Err(e) => self.show_error(e.to_string()),
            },
            ViewMode::Advanced => {
                self.view = ViewMode::Basic;
            }
        }
    }

    /// Run the current command. Every failure path lands in the error banner;
    /// the banner is cleared when the next attempt starts.
    fn execute(&mut self) {
        self.error = None;

        let (basic_visible, advanced_visible) = match self.view {
            ViewMode::Basic => (true, false),
            ViewMode::Advanced => (false, true),
        };

        let command = match resolve_command(
            basic_visible,
            advanced_visible,
            &self.snapshot_form(),
            self.editor.value(),
        ) {
            Ok(command) => command,
            Err(e) => return self.set_error(e.to_string()),
        };

        let Some(db) = self.db.as_ref() else {
            return self.set_error("No database loaded - press F5 to load a catalog database");
        };

        tracing::info!(target: "query", "executing: {}", command);
        match db.run_command(&command) {
            Ok((result, warning)) => {
                self.status_message = match warning {
                    Some(warning) => warning,
                    None => format!("{} rows", result.row_count()),
                };
                self.table_state.select(Some(0));
                self.result = Some(result);
                self.mode = AppMode::Results;
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Execution failure: terminal for the attempt, the prior result is
    /// cleared, not kept.
    fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(target: "app", "{}", message);
        self.error = Some(message);
        self.result = None;
        self.mode = AppMode::Edit;
    }

    /// Non-execution failure (export, load, view seeding): shown in the
    /// banner, but the rendered result stays on screen.
    fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(target: "app", "{}", message);
        self.error = Some(message);
    }

    fn start_load(&mut self, path: PathBuf) {
        self.load_generation += 1;
        let (tx, rx) = std::sync::mpsc::channel();
        spawn_load(path.clone(), self.load_generation, tx);
        self.load_rx = Some(rx);
        self.loading = Some(path);
        self.status_message = "Loading database...".to_string();
    }

    /// Install a finished load, discarding completions superseded by a newer
    /// load request.
    fn poll_load(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };
        let mut outcomes = Vec::new();
        while let Ok(outcome) = rx.try_recv() {
            outcomes.push(outcome);
        }
        self.load_rx = Some(rx);

        for outcome in outcomes {
            if outcome.generation != self.load_generation {
                tracing::debug!(target: "db", "discarding stale load of {:?}", outcome.source);
                continue;
            }

            self.loading = None;
            match outcome.result {
                Ok(db) => {
                    self.db = Some(db);
                    self.status_message =
                        format!("Loaded database from {}", outcome.source.display());
                    if self.config.behavior.execute_on_load {
                        self.execute();
                    }
                }
                Err(e) => self.show_error(e.to_string()),
            }
        }
    }

    /// Open the selected row's link: the URI rides in the last column, the
    /// label in the first. The TUI rendition copies the URI to the clipboard.
    fn activate_row(&mut self) {
        let Some(result) = self.result.as_ref() else {
            return;
        };
        let Some(selected) = self.table_state.selected() else {
            return;
        };

        match result.link_target(selected) {
            Some(target) => {
                let label = result.link_label(selected);
                match self.clipboard.as_mut() {
                    Some(clipboard) => match clipboard.set_text(target.clone()) {
                        Ok(()) => {
                            self.status_message = format!("Copied link for {}: {}", label, target);
                        }
                        Err(e) => {
                            self.status_message = format!("Clipboard unavailable: {}", e);
                        }
                    },
                    None => {
                        self.status_message = format!("Link for {}: {}", label, target);
                    }
                }
            }
            None => {
                self.status_message = "No link available for this row".to_string();
            }
        }
    }

    fn export_csv(&mut self) {
        let Some(result) = self.result.as_ref() else {
            self.status_message = "No results to export - run a query first".to_string();
            return;
        };
        // Export what the active renderer showed: the grid renames known
        // columns, so its CSV carries the mapped titles
        let view;
        let snapshot = match self.config.display.renderer {
            RendererKind::Manual => result,
            RendererKind::Grid => {
                let titles = crate::ui::grid::map_columns(&result.columns)
                    .into_iter()
                    .map(|col| col.title)
                    .collect();
                view = ResultSet::new(titles, result.rows.clone());
                &view
            }
        };
        let outcome = Exporter::export_csv(
            snapshot,
            &self.config.export_dir(),
            &self.config.export.filename_stem,
        );
        self.report_export(outcome);
    }

    fn export_json(&mut self) {
        let Some(result) = self.result.as_ref() else {
            self.status_message = "No results to export - run a query first".to_string();
            return;
        };
        let outcome = Exporter::export_json(
            result,
            &self.config.export_dir(),
            &self.config.export.filename_stem,
        );
        self.report_export(outcome);
    }

    /// Export the basic search's SQL text, not its result
    fn export_query(&mut self) {
        let outcome = command_for_editor(&self.snapshot_form())
            .map_err(anyhow::Error::from)
            .and_then(|sql| {
                Exporter::export_query(
                    &sql,
                    &self.config.export_dir(),
                    &self.config.export.filename_stem,
                )
            });
        self.report_export(outcome);
    }

    fn report_export(&mut self, outcome: Result<String>) {
        match outcome {
            Ok(message) => {
                tracing::info!(target: "export", "{}", message);
                self.status_message = message;
            }
            Err(e) => self.show_error(e.to_string()),
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let panel_height = match self.view {
            ViewMode::Basic => 9,
            ViewMode::Advanced => 3,
        };
        // Error banner has a fixed expanded height, zero when hidden
        let banner_height = if self.error.is_some() { 3 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(panel_height),
                Constraint::Min(5),
                Constraint::Length(banner_height),
                Constraint::Length(1),
            ])
            .split(f.area());

        match self.view {
            ViewMode::Basic => self.render_basic_panel(f, chunks[0]),
            ViewMode::Advanced => self.render_advanced_panel(f, chunks[0]),
        }

        self.render_results(f, chunks[1]);

        if let Some(error) = &self.error {
            let banner = Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::White).bg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title("Error"))
                .wrap(Wrap { trim: true });
            f.render_widget(banner, chunks[2]);
        }

        self.render_status_bar(f, chunks[3]);

        if self.mode == AppMode::LoadPrompt {
            self.render_load_prompt(f);
        }
        if self.show_help {
            self.render_help_popup(f);
        }
        if self.show_logs {
            self.render_log_popup(f);
        }
    }

    fn focus_style(&self, control: usize) -> Style {
        if self.mode == AppMode::Edit && self.focus == control {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    }

    fn checkbox(checked: bool) -> &'static str {
        if checked {
            "[x]"
        } else {
            "[ ]"
        }
    }

    fn render_basic_panel(&self, f: &mut Frame, area: Rect) {
        let mut lines = Vec::new();

        lines.push(Line::from(vec![
            Span::styled("Search: ", self.focus_style(FOCUS_SEARCH)),
            Span::raw(self.search_input.value()),
        ]));
        lines.push(Line::from(""));

        let mut field_spans = vec![Span::styled("Field:  ", self.focus_style(FOCUS_FIELD))];
        for (idx, (_, label)) in FIELD_CHOICES.iter().enumerate() {
            let marker = if idx == self.field_idx { "(o) " } else { "( ) " };
            field_spans.push(Span::raw(format!("{}{}   ", marker, label)));
        }
        lines.push(Line::from(field_spans));
        lines.push(Line::from(""));

        let mut type_spans = vec![Span::raw("Types:  ")];
        for (idx, filter) in TypeFilter::ALL.iter().enumerate() {
            let style = if self.all_types {
                Style::default().fg(Color::DarkGray)
            } else {
                self.focus_style(FOCUS_TYPES + idx)
            };
            type_spans.push(Span::styled(
                format!("{} {}  ", Self::checkbox(self.type_checked[idx]), filter.label()),
                style,
            ));
        }
        lines.push(Line::from(type_spans));
        lines.push(Line::from(""));

        lines.push(Line::from(vec![
            Span::raw("        "),
            Span::styled(
                format!("{} All types", Self::checkbox(self.all_types)),
                self.focus_style(FOCUS_ALL),
            ),
            Span::raw("   "),
            Span::styled(
                format!(
                    "{} Include duplicates",
                    Self::checkbox(self.include_duplicates)
                ),
                self.focus_style(FOCUS_DUPLICATES),
            ),
        ]));

        let panel = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Basic Search (Tab switches to SQL)"),
        );
        f.render_widget(panel, area);

        if self.mode == AppMode::Edit && self.focus == FOCUS_SEARCH {
            f.set_cursor_position((
                area.x + 9 + self.search_input.visual_cursor() as u16,
                area.y + 1,
            ));
        }
    }

    fn render_advanced_panel(&self, f: &mut Frame, area: Rect) {
        let style = if self.mode == AppMode::Edit {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let panel = Paragraph::new(self.editor.value()).style(style).block(
            Block::default()
                .borders(Borders::ALL)
                .title("SQL Command (Tab switches to basic search)"),
        );
        f.render_widget(panel, area);

        if self.mode == AppMode::Edit {
            f.set_cursor_position((
                area.x + self.editor.visual_cursor() as u16 + 1,
                area.y + 1,
            ));
        }
    }

    fn render_results(&mut self, f: &mut Frame, area: Rect) {
        let Some(result) = self.result.as_ref() else {
            let placeholder = Paragraph::new(vec![
                Line::from("No results to display"),
                Line::from(""),
                Line::from("Enter - execute search    Tab - basic/advanced"),
                Line::from("F5 - load database        F2/F3/F4 - export CSV/query/JSON"),
            ])
            .block(Block::default().borders(Borders::ALL).title("Results"));
            f.render_widget(placeholder, area);
            return;
        };

        match self.config.display.renderer {
            RendererKind::Manual => {
                let ctx = crate::ui::table::TableContext {
                    result,
                    show_row_numbers: self.config.display.show_row_numbers,
                    max_rows: self.config.display.max_display_rows,
                };
                crate::ui::table::render_table(f, area, &ctx, &mut self.table_state);
            }
            RendererKind::Grid => {
                let grid = crate::ui::grid::build_grid(result);
                let text = grid.to_string();
                let scroll = self.table_state.selected().unwrap_or(0) as u16;
                let paragraph = Paragraph::new(text)
                    .block(Block::default().borders(Borders::ALL).title(format!(
                        "Results ({} rows)",
                        result.row_count()
                    )))
                    .scroll((scroll, 0));
                f.render_widget(paragraph, area);
            }
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let mode_label = match self.mode {
            AppMode::Edit => match self.view {
                ViewMode::Basic => "BASIC",
                ViewMode::Advanced => "SQL",
            },
            AppMode::Results => "RESULTS",
            AppMode::LoadPrompt => "LOAD",
        };

        let mut spans = vec![
            Span::styled(self.status_message.as_str(), Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled(
                mode_label,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ];
        if self.loading.is_some() {
            spans.push(Span::styled(
                " | loading...",
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::raw(" | F1=Help Esc=Back/Exit"));

        let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
        f.render_widget(status, area);
    }

    fn render_load_prompt(&self, f: &mut Frame) {
        let area = centered_rect(70, 20, f.area());
        f.render_widget(Clear, area);

        let prompt = Paragraph::new(self.load_input.value()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Load database file (Enter to load, Esc to cancel)"),
        );
        f.render_widget(prompt, area);
        f.set_cursor_position((
            area.x + self.load_input.visual_cursor() as u16 + 1,
            area.y + 1,
        ));
    }

    fn render_help_popup(&self, f: &mut Frame) {
        let area = centered_rect(70, 60, f.area());
        f.render_widget(Clear, area);

        let help_text = vec![
            Line::from(vec![Span::styled(
                "Catalog Search Help",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from("Basic view:"),
            Line::from("  Up/Down   - move between form controls"),
            Line::from("  Space     - toggle checkbox / cycle field"),
            Line::from("  Enter     - execute the search"),
            Line::from(""),
            Line::from("Advanced view:"),
            Line::from("  type SQL, Enter executes it as-is"),
            Line::from(""),
            Line::from("Results:"),
            Line::from("  Up/Down/PgUp/PgDn - navigate rows"),
            Line::from("  Enter     - copy the row's link to the clipboard"),
            Line::from("  Esc       - back to the form"),
            Line::from(""),
            Line::from("Global:"),
            Line::from("  Tab - basic/advanced   F5 - load database"),
            Line::from("  F2 - export CSV        F3 - export query text"),
            Line::from("  F4 - export JSON       F12 - log view"),
        ];

        let popup = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: true });
        f.render_widget(popup, area);
    }

    fn render_log_popup(&self, f: &mut Frame) {
        let area = centered_rect(90, 70, f.area());
        f.render_widget(Clear, area);

        let lines: Vec<Line> = match crate::logging::get_log_buffer() {
            Some(buffer) => buffer
                .get_recent(area.height.saturating_sub(2) as usize)
                .iter()
                .map(|entry| Line::from(entry.format_for_display()))
                .collect(),
            None => vec![Line::from("Logging not initialized")],
        };

        let popup = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Logs"));
        f.render_widget(popup, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::result_set::CellValue;
    use anyhow::anyhow;

    fn catalog_db(generation: u64) -> CatalogDb {
        let file = tempfile::NamedTempFile::new().unwrap();
        let conn = rusqlite::Connection::open(file.path()).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE Catalog ("File Name" TEXT, "Link Path" TEXT);
            INSERT INTO Catalog VALUES ('a.pdf', 'file:///docs/a.pdf');
            "#,
        )
        .unwrap();
        drop(conn);
        let bytes = std::fs::read(file.path()).unwrap();
        CatalogDb::from_bytes(&bytes, generation).unwrap()
    }

    fn one_row_result() -> ResultSet {
        ResultSet::new(
            vec!["File Name".to_string(), "Link Path".to_string()],
            vec![vec![
                CellValue::Text("a.pdf".to_string()),
                CellValue::Text("file:///docs/a.pdf".to_string()),
            ]],
        )
    }

    fn outcome(generation: u64, result: Result<CatalogDb>) -> LoadOutcome {
        LoadOutcome {
            generation,
            result,
            source: PathBuf::from("catalog.db"),
        }
    }

    #[test]
    fn export_failure_keeps_the_displayed_result() {
        let mut config = Config::default();
        config.export.directory = Some(PathBuf::from("/no/such/dir/for/exports"));
        let mut app = App::new(config, None);
        app.result = Some(one_row_result());

        app.export_csv();

        assert!(app.error.is_some());
        assert!(app.result.is_some());
    }

    #[test]
    fn failed_load_keeps_the_displayed_result() {
        let mut app = App::new(Config::default(), Some(catalog_db(1)));
        app.result = Some(one_row_result());

        app.load_generation = 2;
        let (tx, rx) = std::sync::mpsc::channel();
        app.load_rx = Some(rx);
        tx.send(outcome(2, Err(anyhow!("read failed")))).unwrap();
        app.poll_load();

        assert!(app.error.is_some());
        assert!(app.result.is_some());
        // The previous handle stays installed too
        assert_eq!(app.db.as_ref().unwrap().generation(), 1);
    }

    #[test]
    fn execution_failure_clears_the_displayed_result() {
        let mut app = App::new(Config::default(), Some(catalog_db(1)));
        app.result = Some(one_row_result());
        app.view = ViewMode::Advanced;
        app.editor = Input::from("SELECT * FROM NoSuchTable".to_string());

        app.execute();

        assert!(app.error.is_some());
        assert!(app.result.is_none());
    }

    #[test]
    fn stale_load_is_discarded_whichever_order_it_arrives() {
        let mut app = App::new(Config::default(), None);
        app.load_generation = 2;

        // Superseded completion first, current one second
        let (tx, rx) = std::sync::mpsc::channel();
        app.load_rx = Some(rx);
        tx.send(outcome(1, Ok(catalog_db(1)))).unwrap();
        tx.send(outcome(2, Ok(catalog_db(2)))).unwrap();
        app.poll_load();
        assert_eq!(app.db.as_ref().unwrap().generation(), 2);

        // A late stale completion must not clobber the installed handle
        let (tx, rx) = std::sync::mpsc::channel();
        app.load_rx = Some(rx);
        tx.send(outcome(1, Ok(catalog_db(1)))).unwrap();
        app.poll_load();
        assert_eq!(app.db.as_ref().unwrap().generation(), 2);
    }
}

/// Set up the terminal, run the app, restore the terminal
pub fn run_app(config: Config, db: Option<CatalogDb>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, db);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}
