use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::info;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::{GoalsRepo, UserRepo};
use crate::models::{Counter, Goals};
use crate::session::GoalSetup;
use crate::tracker::ChecklistPreset;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::utils::format::format_amount;
use crate::utils::input::DEFAULT_KEYWORD;

// ─── Wizard steps ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Welcome,
    /// One screen per counter, driven by `GoalSetup`.
    Goal,
    Checklist,
    TimezoneOffset,
    HijriOffset,
    Confirm,
}

const CHECKLISTS: [(ChecklistPreset, &str); 2] = [
    (
        ChecklistPreset::Extended,
        "Extended  (adds morning & evening adhkar, duha)",
    ),
    (ChecklistPreset::Base, "Base  (goals, mosque, taraweeh, tahajjud)"),
];

const HIJRI_OFFSETS: [(i32, &str); 3] = [
    (0, "Same day as astronomical calculation"),
    (-1, "One day after (local moon sighting)"),
    (1, "One day before"),
];

// ─── Wizard state ─────────────────────────────────────────────────────────────

struct SetupWizard {
    step: Step,
    input: String,
    error: Option<String>,

    goals: GoalSetup,
    checklist_idx: usize,
    tz_minutes: i32,
    hijri_idx: usize,

    should_quit: bool,
    confirmed: bool,
}

impl SetupWizard {
    fn new(existing: &AppConfig, goals: Goals) -> Self {
        let checklist_idx = CHECKLISTS
            .iter()
            .position(|(p, _)| *p == existing.tracker.checklist)
            .unwrap_or(0);
        let hijri_idx = HIJRI_OFFSETS
            .iter()
            .position(|(o, _)| *o == existing.display.hijri_offset)
            .unwrap_or(0);

        Self {
            step: Step::Welcome,
            input: String::new(),
            error: None,

            goals: GoalSetup::new(goals),
            checklist_idx,
            tz_minutes: existing.tracker.timezone_offset,
            hijri_idx,

            should_quit: false,
            confirmed: false,
        }
    }

    fn step_number(&self) -> usize {
        let goal_steps = GoalSetup::TOTAL_STEPS;
        match self.step {
            Step::Welcome => 0,
            Step::Goal => 1 + self.goals.step_number(),
            Step::Checklist => goal_steps + 1,
            Step::TimezoneOffset => goal_steps + 2,
            Step::HijriOffset => goal_steps + 3,
            Step::Confirm => goal_steps + 4,
        }
    }

    const TOTAL_STEPS: usize = GoalSetup::TOTAL_STEPS + 3;

    fn advance(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => Step::Goal,
            Step::Goal if !self.goals.is_complete() => Step::Goal,
            Step::Goal => Step::Checklist,
            Step::Checklist => Step::TimezoneOffset,
            Step::TimezoneOffset => Step::HijriOffset,
            Step::HijriOffset => Step::Confirm,
            Step::Confirm => {
                self.confirmed = true;
                Step::Confirm
            }
        };
        self.prefill();
    }

    fn go_back(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => {
                self.should_quit = true;
                Step::Welcome
            }
            // The goal sequence only moves forward; going back restarts it
            // with the answers so far as the new defaults.
            Step::Goal | Step::Checklist => {
                self.goals = GoalSetup::new(self.goals.collected());
                Step::Welcome
            }
            Step::TimezoneOffset => Step::Checklist,
            Step::HijriOffset => Step::TimezoneOffset,
            Step::Confirm => Step::HijriOffset,
        };
        self.prefill();
    }

    fn prefill(&mut self) {
        self.input = match self.step {
            Step::Goal => self
                .goals
                .current()
                .map(|c| self.goals.default_for(c).to_string())
                .unwrap_or_default(),
            Step::TimezoneOffset => format_tz(self.tz_minutes),
            _ => String::new(),
        };
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.step {
            Step::Welcome => {
                if key.code == KeyCode::Esc {
                    self.should_quit = true;
                } else {
                    self.advance();
                }
            }

            Step::Goal => self.handle_text_input(key),
            Step::TimezoneOffset => self.handle_text_input(key),

            Step::Checklist => {
                Self::handle_choice(key, &mut self.checklist_idx, CHECKLISTS.len());
                self.handle_choice_nav(key);
            }

            Step::HijriOffset => {
                Self::handle_choice(key, &mut self.hijri_idx, HIJRI_OFFSETS.len());
                self.handle_choice_nav(key);
            }

            Step::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => {
                    self.confirmed = true;
                }
                KeyCode::Esc | KeyCode::Char('n') => self.go_back(),
                _ => {}
            },
        }
    }

    fn handle_choice(key: KeyEvent, idx: &mut usize, len: usize) {
        match key.code {
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') | KeyCode::Char('h') => {
                *idx = idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') | KeyCode::Char('l') => {
                if *idx + 1 < len {
                    *idx += 1;
                }
            }
            KeyCode::Char(c) => {
                if let Some(n) = c.to_digit(10) {
                    let n = n as usize;
                    if (1..=len).contains(&n) {
                        *idx = n - 1;
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_choice_nav(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.advance(),
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn handle_text_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.go_back(),
            KeyCode::Enter => {
                let val = self.input.trim().to_string();
                match self.commit_text_input(&val) {
                    Ok(()) => self.advance(),
                    Err(e) => self.error = Some(e),
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
            }
            KeyCode::Tab => {
                self.input = match self.step {
                    Step::Goal => DEFAULT_KEYWORD.to_string(),
                    Step::TimezoneOffset => "+3".to_string(),
                    _ => self.input.clone(),
                };
                self.error = None;
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.error = None;
            }
            _ => {}
        }
    }

    fn commit_text_input(&mut self, val: &str) -> std::result::Result<(), String> {
        match self.step {
            Step::Goal => self.goals.submit(val).map(|_| ()).map_err(|e| e.to_string()),
            Step::TimezoneOffset => {
                self.tz_minutes =
                    parse_tz(val).map_err(|_| "Use format like +3, -5, or +5:30".to_string())?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn build_config(&self, existing: &AppConfig) -> AppConfig {
        let mut config = existing.clone();
        config.tracker.checklist = CHECKLISTS[self.checklist_idx].0;
        config.tracker.timezone_offset = self.tz_minutes;
        config.display.hijri_offset = HIJRI_OFFSETS[self.hijri_idx].0;
        config
    }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn draw(frame: &mut Frame, wizard: &SetupWizard) {
    let area = frame.area();

    frame.render_widget(Block::default().style(theme::base()), area);

    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(24),
            Constraint::Min(0),
        ])
        .split(area);

    let hchunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(64),
            Constraint::Min(0),
        ])
        .split(vchunks[1]);

    let box_area = hchunks[1];
    frame.render_widget(Clear, box_area);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface())
        .title(Span::styled(
            "  عبادة  ibadah  ·  Goals  ",
            theme::gold().add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    frame.render_widget(outer_block, box_area);

    let inner = Rect {
        x: box_area.x + 2,
        y: box_area.y + 1,
        width: box_area.width.saturating_sub(4),
        height: box_area.height.saturating_sub(2),
    };

    match wizard.step {
        Step::Welcome => draw_welcome(frame, inner),
        Step::Checklist => draw_choice(
            frame,
            inner,
            "Daily Checklist",
            "Which items count toward your daily score?",
            &CHECKLISTS.map(|(_, label)| label),
            wizard.checklist_idx,
        ),
        Step::HijriOffset => draw_choice(
            frame,
            inner,
            "Hijri Date",
            "When does your region start each Islamic month?",
            &HIJRI_OFFSETS.map(|(_, label)| label),
            wizard.hijri_idx,
        ),
        Step::Confirm => draw_confirm(frame, inner, wizard),
        Step::Goal | Step::TimezoneOffset => draw_text_step(frame, inner, wizard),
    }

    draw_progress(frame, inner, wizard.step_number(), SetupWizard::TOTAL_STEPS);
}

fn draw_progress(frame: &mut Frame, area: Rect, current: usize, total: usize) {
    let mut spans = vec![Span::styled("  ", theme::dim())];
    for i in 1..=total {
        if i < current {
            spans.push(Span::styled("● ", theme::green()));
        } else if i == current {
            spans.push(Span::styled("◉ ", theme::gold()));
        } else {
            spans.push(Span::styled("○ ", theme::dim()));
        }
    }
    let progress_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), progress_area);
}

fn content_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + 2,
        width: area.width,
        height: area.height.saturating_sub(2),
    }
}

fn draw_welcome(frame: &mut Frame, area: Rect) {
    let bullet = |text: &'static str| {
        Line::from(vec![
            Span::styled("  ●  ", theme::gold()),
            Span::styled(text, theme::dim()),
        ])
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "بِسۡمِ ٱللَّهِ ٱلرَّحۡمَٰنِ ٱلرَّحِيمِ",
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to ibadah",
            theme::bold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Set your daily goals for the month of worship.",
            theme::dim(),
        )),
        Line::from(""),
        bullet("Quran pages, istighfar, dhikr, charity and dua"),
        bullet("Which habits make up your daily checklist"),
        bullet("Timezone and Hijri date preference"),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Press  Enter  to begin  ·  Esc  to cancel",
            theme::dim(),
        )),
    ];

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_text_step(frame: &mut Frame, area: Rect, wizard: &SetupWizard) {
    let (title, subtitle, hint) = match (wizard.step, wizard.goals.current()) {
        (Step::Goal, Some(counter)) => (
            format!("{} {}", counter.icon(), counter.display_name()),
            counter.setup_question().to_string(),
            format!(
                "[Tab] '{}' keeps {}",
                DEFAULT_KEYWORD,
                format_amount(counter, wizard.goals.default_for(counter) as u64)
            ),
        ),
        _ => (
            "UTC Offset".to_string(),
            "Decides when your day rolls over".to_string(),
            "e.g.  +3  for Riyadh  ·  +5:30  for IST  ·  -5  for EST".to_string(),
        ),
    };

    let cursor = if wizard.input.len() < 40 { "█" } else { "" };

    let mut lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(title, theme::gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim())),
        Line::from(""),
        Line::from(""),
    ];

    let input_display = format!("  {}{}  ", wizard.input, cursor);
    let input_width = area.width.saturating_sub(8) as usize;
    let padded = format!("{:<width$}", input_display, width = input_width);

    let input_style = if wizard.error.is_some() {
        theme::red()
    } else {
        theme::amber()
    };

    lines.push(Line::from(Span::styled(padded, input_style.add_modifier(Modifier::BOLD))));
    lines.push(Line::from(""));

    match &wizard.error {
        Some(err) => lines.push(Line::from(Span::styled(
            format!("  ✗  {}", err),
            theme::red(),
        ))),
        None => lines.push(Line::from(Span::styled(hint, theme::dim()))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter  confirm   ·   Esc  back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_choice(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    subtitle: &str,
    options: &[&str],
    selected: usize,
) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, theme::gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim())),
        Line::from(""),
        Line::from(""),
    ];

    for (i, opt) in options.iter().enumerate() {
        if i == selected {
            lines.push(Line::from(vec![
                Span::styled("  ◉  ", theme::gold()),
                Span::styled(*opt, theme::gold().add_modifier(Modifier::BOLD)),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::styled("  ○  ", theme::dim()),
                Span::styled(*opt, theme::dim()),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "↑↓  or  1 2 3  choose   ·   Enter  confirm   ·   Esc  back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_confirm(frame: &mut Frame, area: Rect, wizard: &SetupWizard) {
    let goals = wizard.goals.collected();
    let row = |label: String, value: String| {
        Line::from(vec![
            Span::styled(format!("  {:<16}", label), theme::dim()),
            Span::styled(value, theme::bold()),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Confirm Goals", theme::gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];
    for counter in Counter::ALL {
        lines.push(row(
            counter.display_name().to_string(),
            format_amount(counter, goals.get(counter) as u64),
        ));
    }
    lines.push(Line::from(""));
    lines.push(row(
        "Checklist".to_string(),
        format!("{:?}", CHECKLISTS[wizard.checklist_idx].0),
    ));
    lines.push(row("UTC Offset".to_string(), format_tz(wizard.tz_minutes)));
    lines.push(row(
        "Hijri Offset".to_string(),
        format!("{:+} days", HIJRI_OFFSETS[wizard.hijri_idx].0),
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter  save   ·   Esc  go back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

// ─── Public entry point ──────────────────────────────────────────────────────

/// Runs the full-screen goal wizard. Returns `false` when the user quit
/// before confirming; nothing is saved in that case.
pub fn run_setup_tui(conn: &Connection, config: &mut AppConfig, user: &str) -> Result<bool> {
    let current = GoalsRepo::resolve(conn, user, &config.goals)?;
    let mut wizard = SetupWizard::new(config, current);
    let mut terminal = ratatui::init();
    let events = EventHandler::new(100);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| draw(frame, &wizard)) {
            break Err(e).context("Drawing setup wizard");
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                wizard.handle_key(key);
                if wizard.should_quit {
                    break Ok(false);
                }
                if wizard.confirmed {
                    break Ok(true);
                }
            }
            Ok(Event::Tick) | Ok(Event::Resize) => {}
            Err(e) => break Err(e).context("Reading terminal events"),
        }
    };

    ratatui::restore();

    if result? {
        *config = wizard.build_config(config);
        config.save()?;
        save_goals(conn, user, &wizard.goals.collected())?;
        UserRepo::set_setup_done(conn, user, true)?;
        info!("{} finished goal setup", user);
        return Ok(true);
    }
    Ok(false)
}

pub fn save_goals(conn: &Connection, user: &str, goals: &Goals) -> Result<()> {
    UserRepo::ensure(conn, user)?;
    for counter in Counter::ALL {
        GoalsRepo::set(conn, user, counter, goals.get(counter))?;
    }
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn format_tz(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "+" };
    let abs = minutes.abs();
    let h = abs / 60;
    let m = abs % 60;
    if m == 0 {
        format!("{}{}", sign, h)
    } else {
        format!("{}{}:{:02}", sign, h, m)
    }
}

/// Accepts "5:30", "+5:30", "-5:30", "5", "+5", "5.5".
pub fn parse_tz(s: &str) -> Result<i32> {
    let s = s.trim().trim_start_matches('+');
    let negative = s.starts_with('-');
    let s = s.trim_start_matches('-');
    let sign = if negative { -1 } else { 1 };

    let minutes = if s.contains(':') {
        let mut parts = s.splitn(2, ':');
        let h: i32 = parts.next().unwrap_or("0").parse()?;
        let m: i32 = parts.next().unwrap_or("0").parse()?;
        h * 60 + m
    } else if s.contains('.') {
        let h: f64 = s.parse()?;
        (h * 60.0).round() as i32
    } else {
        let h: i32 = s.parse()?;
        h * 60
    };

    Ok(sign * minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crossterm::event::KeyModifiers;

    fn press(wizard: &mut SetupWizard, code: KeyCode) {
        wizard.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(wizard: &mut SetupWizard, text: &str) {
        for _ in 0..wizard.input.len() {
            press(wizard, KeyCode::Backspace);
        }
        for c in text.chars() {
            press(wizard, KeyCode::Char(c));
        }
        press(wizard, KeyCode::Enter);
    }

    #[test]
    fn walks_goals_then_preferences() {
        let mut wizard = SetupWizard::new(&AppConfig::default(), Goals::default());
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::Goal);
        assert_eq!(wizard.input, "20");

        type_text(&mut wizard, "x");
        assert!(wizard.error.is_some());
        assert_eq!(wizard.step_number(), 1);

        type_text(&mut wizard, "15");
        for _ in 1..GoalSetup::TOTAL_STEPS {
            press(&mut wizard, KeyCode::Enter);
        }
        assert_eq!(wizard.step, Step::Checklist);
        assert_eq!(wizard.goals.collected().quran_pages, 15);
        assert_eq!(wizard.goals.collected().istighfar, 500);

        press(&mut wizard, KeyCode::Char('2'));
        press(&mut wizard, KeyCode::Enter);
        type_text(&mut wizard, "+5:30");
        press(&mut wizard, KeyCode::Down);
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::Confirm);
        press(&mut wizard, KeyCode::Enter);
        assert!(wizard.confirmed);

        let config = wizard.build_config(&AppConfig::default());
        assert_eq!(config.tracker.checklist, ChecklistPreset::Base);
        assert_eq!(config.tracker.timezone_offset, 330);
        assert_eq!(config.display.hijri_offset, -1);
    }

    #[test]
    fn escape_from_goals_restarts_with_answers_kept() {
        let mut wizard = SetupWizard::new(&AppConfig::default(), Goals::default());
        press(&mut wizard, KeyCode::Enter);
        type_text(&mut wizard, "7");
        press(&mut wizard, KeyCode::Esc);
        assert_eq!(wizard.step, Step::Welcome);
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.input, "7");
        press(&mut wizard, KeyCode::Esc);
        press(&mut wizard, KeyCode::Esc);
        assert!(wizard.should_quit);
    }

    #[test]
    fn tz_offsets_parse() {
        assert_eq!(parse_tz("+5:30").unwrap(), 330);
        assert_eq!(parse_tz("-3").unwrap(), -180);
        assert_eq!(parse_tz("5.5").unwrap(), 330);
        assert!(parse_tz("east").is_err());
        assert_eq!(format_tz(-330), "-5:30");
    }

    #[test]
    fn save_goals_writes_every_counter() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let goals = Goals {
            dhikr: 33,
            ..Goals::default()
        };
        save_goals(&conn, "local", &goals).unwrap();
        let stored = GoalsRepo::get(&conn, "local").unwrap().unwrap();
        assert_eq!(stored.dhikr, Some(33));
        assert_eq!(stored.quran_pages, Some(20));
    }
}
