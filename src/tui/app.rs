use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::warn;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::{DayRepo, GoalsRepo};
use crate::models::{Counter, DayRecord, DayScore, Goals, Heat, Prayer, StatisticsReport, Streak};
use crate::tracker::{
    aggregate_statistics_with_window, compute_streaks, render_heatmap, score_day, DimensionSet,
};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::checklist::ChecklistItem;
use crate::tui::widgets::{checklist, counters, header, score, statusbar, streak};
use crate::utils::clock::Clock;
use crate::utils::hijri::hijri_string;
use crate::utils::input::parse_amount;
use crate::utils::report;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusSection {
    Checklist,
    Counters,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Amount(Counter),
    ConfirmReset,
}

pub struct App {
    pub view: View,
    pub focus_section: FocusSection,
    pub focus_idx: usize,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>,
    pub status: Option<String>,

    config: AppConfig,
    clock: Clock,
    dims: DimensionSet,
    user: String,
    items: Vec<ChecklistItem>,

    // Cached state, refreshed after every action and on day rollover
    pub today_key: String,
    pub hijri: Option<String>,
    pub goals: Goals,
    pub record: DayRecord,
    pub score: DayScore,
    pub streak: Streak,
    pub heatmap: Vec<Heat>,
    pub stats: Option<StatisticsReport>,
}

impl App {
    pub fn new(config: AppConfig, clock: Clock, user: &str) -> Result<Self> {
        let dims = config.tracker.dimension_set()?;
        let items = Prayer::ALL
            .iter()
            .map(|p| ChecklistItem::Mosque(*p))
            .chain(dims.flags().map(ChecklistItem::Flag))
            .collect();
        let goals = config.goals;
        let record = DayRecord::default();
        let score = score_day(&record, &goals, &dims);

        Ok(App {
            view: View::Dashboard,
            focus_section: FocusSection::Checklist,
            focus_idx: 0,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
            status: None,

            today_key: clock.today_key(),
            hijri: None,
            goals,
            record,
            score,
            streak: Streak::default(),
            heatmap: Vec::new(),
            stats: None,

            config,
            clock,
            dims,
            user: user.to_string(),
            items,
        })
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        let today = self.clock.today();
        self.today_key = self.clock.today_key();
        self.hijri = hijri_string(today, self.config.display.hijri_offset);

        self.goals = GoalsRepo::resolve(conn, &self.user, &self.config.goals)?;
        DayRepo::ensure(conn, &self.user, &self.today_key, self.clock.now())?;
        let days = DayRepo::get_all(conn, &self.user)?;
        self.record = days.get(&self.today_key).cloned().unwrap_or_default();

        self.score = score_day(&self.record, &self.goals, &self.dims);
        self.streak = compute_streaks(&days, today, &self.goals, &self.dims);
        let window = self.config.tracker.heatmap_window;
        self.heatmap = render_heatmap(&days, &self.goals, &self.dims, window);
        self.stats =
            aggregate_statistics_with_window(&days, &self.goals, &self.dims, today, window);
        Ok(())
    }

    /// Picks up a new day when the clock crosses midnight.
    pub fn tick(&mut self, conn: &Connection) {
        if self.clock.today_key() != self.today_key {
            self.refresh(conn);
        }
    }

    fn refresh(&mut self, conn: &Connection) {
        if let Err(e) = self.load(conn) {
            warn!("Reload failed: {:#}", e);
            self.status = Some(format!("✗ {}", e));
        }
    }

    /// Runs a write and reloads; failures land in the status bar.
    fn apply<F>(&mut self, conn: &Connection, message: String, write: F)
    where
        F: FnOnce(&Connection, &str, &str) -> Result<DayRecord>,
    {
        match write(conn, &self.user, &self.today_key) {
            Ok(_) => {
                self.status = Some(message);
                self.refresh(conn);
            }
            Err(e) => {
                warn!("Update failed: {:#}", e);
                self.status = Some(format!("✗ {}", e));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.input_mode {
            InputMode::Amount(counter) => self.handle_amount_input(key, conn, counter),
            InputMode::ConfirmReset => self.handle_reset_confirm(key, conn),
            InputMode::Normal => match self.view {
                View::Dashboard => self.handle_dashboard_key(key, conn),
                View::Stats => self.handle_stats_key(key),
                View::Help => self.handle_help_key(key),
            },
        }
    }

    fn focus_len(&self) -> usize {
        match self.focus_section {
            FocusSection::Checklist => self.items.len(),
            FocusSection::Counters => Counter::ALL.len(),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) {
        self.status = None;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Char('R') => {
                self.input_mode = InputMode::ConfirmReset;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.focus_idx + 1 < self.focus_len() {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Tab => {
                self.focus_section = match self.focus_section {
                    FocusSection::Checklist => FocusSection::Counters,
                    FocusSection::Counters => FocusSection::Checklist,
                };
                self.focus_idx = 0;
            }
            KeyCode::Enter | KeyCode::Char(' ') => match self.focus_section {
                FocusSection::Checklist => self.toggle_focused(conn),
                FocusSection::Counters => self.open_amount_popup(),
            },
            // a always works on counters, switching focus if needed
            KeyCode::Char('a') => {
                if self.focus_section != FocusSection::Counters {
                    self.focus_section = FocusSection::Counters;
                    self.focus_idx = 0;
                }
                self.open_amount_popup();
            }
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q')) {
            self.view = View::Dashboard;
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            self.view = View::Dashboard;
        }
    }

    fn handle_reset_confirm(&mut self, key: KeyEvent, conn: &Connection) {
        self.input_mode = InputMode::Normal;
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            let now = self.clock.now();
            self.apply(conn, "🧹 Today's marks cleared".to_string(), |c, u, d| {
                DayRepo::reset(c, u, d, now)
            });
        } else {
            self.status = Some("Reset cancelled".to_string());
        }
    }

    fn open_amount_popup(&mut self) {
        if let Some(counter) = Counter::ALL.get(self.focus_idx) {
            self.input_mode = InputMode::Amount(*counter);
            self.input_buffer.clear();
            self.input_error = None;
        }
    }

    fn handle_amount_input(&mut self, key: KeyEvent, conn: &Connection, counter: Counter) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => match parse_amount(&self.input_buffer) {
                Ok(amount) => {
                    self.input_mode = InputMode::Normal;
                    self.input_buffer.clear();
                    self.input_error = None;
                    let now = self.clock.now();
                    let message = format!("{} +{} {}", counter.icon(), amount, counter.display_name());
                    self.apply(conn, message, |c, u, d| {
                        DayRepo::increment(c, u, d, counter, amount, now)
                    });
                }
                Err(e) => {
                    self.input_error = Some(e.to_string());
                }
            },
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == ',' => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn toggle_focused(&mut self, conn: &Connection) {
        let Some(item) = self.items.get(self.focus_idx).copied() else {
            return;
        };
        let now = self.clock.now();
        let message = format!(
            "{}: {}",
            item.label(),
            if item.is_done(&self.record) { "unmarked" } else { "done" }
        );
        self.apply(conn, message, |c, u, d| match item {
            ChecklistItem::Mosque(p) => DayRepo::toggle_prayer(c, u, d, p, now),
            ChecklistItem::Flag(f) => DayRepo::toggle_flag(c, u, d, f, now),
        });
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        match self.input_mode {
            InputMode::Amount(counter) => self.draw_amount_input(frame, counter),
            InputMode::ConfirmReset => self.draw_reset_confirm(frame),
            InputMode::Normal => {}
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let title = report::title(&self.clock, &self.config.tracker.campaign_name);
        let gregorian = self.clock.today().format("%A, %b %d, %Y").to_string();
        header::render(frame, outer_chunks[0], &title, self.hijri.as_deref(), &gregorian);

        statusbar::render(frame, outer_chunks[2], self.status.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(outer_chunks[1]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(self.items.len() as u16 + 2), Constraint::Min(0)])
            .split(columns[0]);

        checklist::render(
            frame,
            left_chunks[0],
            &self.items,
            &self.record,
            self.focus_idx,
            self.focus_section == FocusSection::Checklist,
        );

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(Counter::ALL.len() as u16 + 2), // counters
                Constraint::Length(4),                             // score
                Constraint::Length(7),                             // streak
                Constraint::Min(0),
            ])
            .split(columns[1]);

        counters::render(
            frame,
            right_chunks[0],
            &self.record,
            &self.goals,
            self.focus_idx,
            self.focus_section == FocusSection::Counters,
        );
        score::render(frame, right_chunks[1], &self.score, self.dims.total_checks());
        streak::render(frame, right_chunks[2], &self.streak, &self.heatmap);
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::gold().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let lines: Vec<Line> = match &self.stats {
            None => vec![Line::from(Span::styled(
                "  No data yet. Mark something today and check back.",
                theme::dim(),
            ))],
            Some(stats) => {
                let text = report::statistics_report(
                    stats,
                    &self.goals,
                    self.config.tracker.heatmap_window,
                );
                text.lines()
                    .map(|l| {
                        let style = if l.starts_with('—') || l.starts_with("📊") {
                            theme::gold().add_modifier(Modifier::BOLD)
                        } else {
                            theme::bold()
                        };
                        Line::from(Span::styled(format!("  {}", l), style))
                    })
                    .collect()
            }
        };

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).max(12),
        }
        .intersection(area);

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [Enter]      ", "Toggle item / add to goal"),
            ("  [a]          ", "Add to the focused goal"),
            ("  [Tab]        ", "Switch checklist / goals"),
            ("  [↑ ↓]        ", "Navigate items"),
            ("  [R]          ", "Reset today"),
            ("  [s]          ", "Stats view"),
            ("  [?]          ", "Toggle help"),
            ("  [q] / [Esc]  ", "Quit"),
        ];
        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::gold()),
                Span::styled(label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn popup_area(frame: &Frame, height: u16) -> Rect {
        let area = frame.area();
        Rect {
            x: area.width / 4,
            y: (area.height / 2).saturating_sub(3),
            width: area.width / 2,
            height,
        }
        .intersection(area)
    }

    fn draw_amount_input(&self, frame: &mut Frame, counter: Counter) {
        let height = if self.input_error.is_some() { 7 } else { 5 };
        let popup_area = Self::popup_area(frame, height);

        frame.render_widget(Clear, popup_area);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(format!("  {} to add: ", counter.display_name()), theme::dim()),
                Span::styled(
                    self.input_buffer.as_str(),
                    theme::gold().add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", theme::amber()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Type a number, then [Enter]  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if self.input_error.is_some() {
            theme::red()
        } else {
            theme::amber()
        };

        let block = Block::default()
            .title(Span::styled(
                format!(" {} {} ", counter.icon(), counter.display_name()),
                theme::gold(),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }

    fn draw_reset_confirm(&self, frame: &mut Frame) {
        let popup_area = Self::popup_area(frame, 5);
        frame.render_widget(Clear, popup_area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Clear every mark and count for today?",
                theme::bold(),
            )),
            Line::from(Span::styled("  [y] yes  ·  any other key cancels", theme::dim())),
        ];

        let block = Block::default()
            .title(Span::styled(" Reset Today ", theme::red()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::red())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig, user: &str) -> Result<()> {
    let clock = config.tracker.clock()?;
    let mut app = App::new(config, clock, user)?;
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(1000);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e).context("Drawing dashboard");
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key, &conn);
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Tick) => app.tick(&conn),
            Ok(Event::Resize) => {}
            Err(e) => break Err(e).context("Reading terminal events"),
        }
    };

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::Flag;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;

    fn app() -> (Connection, App) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let clock = Clock::pinned(
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 18),
        );
        let mut app = App::new(AppConfig::default(), clock, "local").unwrap();
        app.load(&conn).unwrap();
        (conn, app)
    }

    fn press(app: &mut App, conn: &Connection, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), conn);
    }

    #[test]
    fn checklist_lists_prayers_then_active_flags() {
        let (_, app) = app();
        assert_eq!(app.items.len(), 5 + 5);
        assert_eq!(app.items[0], ChecklistItem::Mosque(Prayer::Fajr));
        assert_eq!(app.items[5], ChecklistItem::Flag(Flag::Taraweeh));
    }

    #[test]
    fn enter_toggles_the_focused_item() {
        let (conn, mut app) = app();
        press(&mut app, &conn, KeyCode::Down);
        press(&mut app, &conn, KeyCode::Enter);
        assert!(app.record.attended(Prayer::Dhuhr));
        assert_eq!(app.status.as_deref(), Some("🕌 Dhuhr: done"));
        press(&mut app, &conn, KeyCode::Enter);
        assert!(!app.record.attended(Prayer::Dhuhr));
    }

    #[test]
    fn amount_popup_adds_to_the_counter() {
        let (conn, mut app) = app();
        press(&mut app, &conn, KeyCode::Char('a'));
        assert_eq!(app.input_mode, InputMode::Amount(Counter::QuranPages));
        press(&mut app, &conn, KeyCode::Enter);
        assert!(app.input_error.is_some());
        for c in "21".chars() {
            press(&mut app, &conn, KeyCode::Char(c));
        }
        press(&mut app, &conn, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.record.quran_pages, 21);
        assert_eq!(app.score.completed, 1);
        assert_eq!(app.streak.current, 1);
    }

    #[test]
    fn reset_needs_confirmation() {
        let (conn, mut app) = app();
        press(&mut app, &conn, KeyCode::Enter);
        press(&mut app, &conn, KeyCode::Char('R'));
        press(&mut app, &conn, KeyCode::Char('n'));
        assert!(app.record.attended(Prayer::Fajr));
        press(&mut app, &conn, KeyCode::Char('R'));
        press(&mut app, &conn, KeyCode::Char('y'));
        assert!(!app.record.attended(Prayer::Fajr));
    }

    #[test]
    fn views_switch_and_quit() {
        let (conn, mut app) = app();
        press(&mut app, &conn, KeyCode::Char('s'));
        assert_eq!(app.view, View::Stats);
        assert!(app.stats.is_some());
        press(&mut app, &conn, KeyCode::Esc);
        assert_eq!(app.view, View::Dashboard);
        press(&mut app, &conn, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
