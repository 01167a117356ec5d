use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dayboard_core::{
    session::{NameInput, MAX_NAME_LEN},
    Background, Dashboard, DashboardState,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::block_font;

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Theme {
    sky: Color,
    text: Color,
    accent: Color,
    muted: Color,
}

impl Theme {
    fn for_background(background: Background) -> Self {
        match background {
            Background::Sunrise => Self {
                sky: Color::Rgb(250, 190, 140),
                text: Color::Rgb(40, 24, 16),
                accent: Color::Rgb(170, 60, 30),
                muted: Color::Rgb(110, 70, 50),
            },
            Background::Afternoon => Self {
                sky: Color::Rgb(140, 200, 235),
                text: Color::Rgb(10, 30, 50),
                accent: Color::Rgb(0, 80, 150),
                muted: Color::Rgb(50, 90, 120),
            },
            Background::Evening => Self {
                sky: Color::Rgb(18, 22, 58),
                text: Color::Rgb(230, 230, 245),
                accent: Color::Rgb(250, 210, 90),
                muted: Color::Rgb(130, 135, 170),
            },
        }
    }

    fn login() -> Self {
        Self {
            sky: Color::Black,
            text: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
        }
    }

    fn base(&self) -> Style {
        Style::default().bg(self.sky).fg(self.text)
    }
}

fn sky_art(background: Background) -> &'static [&'static str] {
    match background {
        Background::Sunrise => &[r"    \ | /    ", r"  -- .-. --  ", r"~~~~(   )~~~~"],
        Background::Afternoon => &[r"  \  |  /  ", r"-- ( O ) --", r"  /  |  \  "],
        Background::Evening => &[r"  *    _  . ", r" .    ( `)  ", r"   *   `  * "],
    }
}

/// Which view the current state calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Splash,
    Login,
    Dashboard,
}

impl Screen {
    fn for_state(state: &DashboardState) -> Self {
        if state.loading {
            Screen::Splash
        } else if !state.session.is_logged_in() {
            Screen::Login
        } else {
            Screen::Dashboard
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal frontend: renders dashboard snapshots and forwards user actions.
pub struct DayboardApp {
    dashboard: Dashboard,
    name_input: NameInput,
    should_quit: bool,
}

impl DayboardApp {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            name_input: NameInput::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut revisions = Some(self.dashboard.subscribe());

        let outcome = loop {
            let state = self.dashboard.snapshot();
            if let Err(err) = terminal.draw(|frame| self.draw(frame, &state)) {
                break Err(err.into());
            }
            if self.should_quit {
                break Ok(());
            }

            let mut revisions_closed = false;
            tokio::select! {
                maybe_event = event_rx.recv() => {
                    match maybe_event {
                        Some(event) => self.process_app_event(event),
                        None => break Ok(()),
                    }
                }
                changed = wait_for_revision(&mut revisions) => {
                    if !changed {
                        revisions_closed = true;
                    }
                }
            }
            if revisions_closed {
                warn!("Dashboard revision channel closed");
                revisions = None;
            }
        };

        self.dashboard.unmount();
        restore_terminal(&mut terminal)?;
        info!("Terminal restored");
        outcome
    }

    fn process_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key)
            }
            AppEvent::Input(_) | AppEvent::Tick => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let screen = Screen::for_state(&self.dashboard.snapshot());
        match screen {
            Screen::Splash => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    self.should_quit = true;
                }
            }
            Screen::Login => self.handle_login_key(key),
            Screen::Dashboard => match key.code {
                KeyCode::Char('r') => {
                    debug!("Quote refresh requested");
                    self.dashboard.refresh_quote();
                }
                KeyCode::Char('l') => {
                    info!("Logging out");
                    self.dashboard.logout();
                    self.name_input.clear();
                }
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if self.dashboard.login(&self.name_input.value()) {
                    info!("Display name accepted");
                }
                self.name_input.clear();
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Backspace => self.name_input.backspace(),
            KeyCode::Delete => self.name_input.delete(),
            KeyCode::Left => self.name_input.move_cursor(-1),
            KeyCode::Right => self.name_input.move_cursor(1),
            KeyCode::Home => self.name_input.move_home(),
            KeyCode::End => self.name_input.move_end(),
            KeyCode::Char(ch) => {
                self.name_input.insert(ch);
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame, state: &DashboardState) {
        match Screen::for_state(state) {
            Screen::Splash => self.draw_splash(frame, state),
            Screen::Login => self.draw_login(frame),
            Screen::Dashboard => self.draw_dashboard(frame, state),
        }
    }

    fn draw_splash(&self, frame: &mut Frame, state: &DashboardState) {
        let theme = Theme::for_background(state.background);
        let area = frame.size();
        frame.render_widget(Block::default().style(theme.base()), area);

        let text = Paragraph::new(Line::from(Span::styled(
            "loading...",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(text, centered_rect(area.width, 1, area));
    }

    fn draw_login(&self, frame: &mut Frame) {
        let theme = Theme::login();
        let area = frame.size();
        frame.render_widget(Block::default().style(theme.base()), area);

        let prompt_area = centered_rect(40, 7, area);
        frame.render_widget(Clear, prompt_area);

        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(theme.accent)),
            Span::raw(self.name_input.value()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" continue  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]);
        let limit = Line::from(Span::styled(
            format!("up to {MAX_NAME_LEN} characters"),
            Style::default().fg(theme.muted),
        ));

        let paragraph = Paragraph::new(vec![
            Line::from("hello, what is your name?"),
            input_line,
            Line::from(""),
            helper,
            limit,
        ])
        .style(theme.base())
        .block(Block::default().borders(Borders::ALL).title("dayboard"))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, prompt_area);

        let cursor_x = (prompt_area.x + 3 + self.name_input.cursor() as u16)
            .min(prompt_area.x + prompt_area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, prompt_area.y + 2);
    }

    fn draw_dashboard(&self, frame: &mut Frame, state: &DashboardState) {
        let theme = Theme::for_background(state.background);
        let area = frame.size();
        frame.render_widget(Block::default().style(theme.base()), area);

        let clock_height = block_font::HEIGHT as u16;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(clock_height + 3),
                Constraint::Length(8),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_quote(frame, layout[0], state, &theme);
        self.render_sky(frame, layout[1], state.background, &theme);
        self.render_clock(frame, layout[2], state, &theme);
        self.render_details(frame, layout[3], state, &theme);

        let footer = Paragraph::new(Line::from(vec![
            Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" new quote  "),
            Span::styled("l", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" log out  "),
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]))
        .style(Style::default().fg(theme.muted))
        .alignment(Alignment::Center);
        frame.render_widget(footer, layout[4]);
    }

    fn render_quote(&self, frame: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
        let lines = match &state.quote {
            Some(quote) => vec![
                Line::from(Span::styled(
                    format!("\"{}\"", quote.content),
                    Style::default().add_modifier(Modifier::ITALIC),
                )),
                Line::from(vec![
                    Span::styled(
                        format!("- {} ", quote.author),
                        Style::default().fg(theme.accent),
                    ),
                    Span::styled("[r]", Style::default().fg(theme.muted)),
                ]),
            ],
            None => vec![Line::from("")],
        };
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inset(area, 2));
    }

    fn render_sky(&self, frame: &mut Frame, area: Rect, background: Background, theme: &Theme) {
        let lines: Vec<Line> = sky_art(background)
            .iter()
            .map(|row| Line::from(Span::styled(*row, Style::default().fg(theme.accent))))
            .collect();
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Right), inset(area, 2));
    }

    fn render_clock(&self, frame: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
        let label = &state.clock.time_label;
        let abbreviation = state
            .timezone
            .as_ref()
            .map(|tz| tz.abbreviation.clone())
            .unwrap_or_default();

        let mut lines = vec![Line::from(Span::styled(
            state.greeting_line(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];

        if block_font::width(label) + abbreviation.len() + 1 <= area.width as usize {
            let rows = block_font::render(label);
            let last = rows.len().saturating_sub(1);
            for (index, row) in rows.into_iter().enumerate() {
                let mut spans = vec![Span::styled(row, Style::default().fg(theme.text))];
                if index == last && !abbreviation.is_empty() {
                    spans.push(Span::styled(
                        format!(" {abbreviation}"),
                        Style::default().fg(theme.muted),
                    ));
                }
                lines.push(Line::from(spans));
            }
        } else {
            lines.push(Line::from(vec![
                Span::styled(label.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!(" {abbreviation}"), Style::default().fg(theme.muted)),
            ]));
        }

        if let Some(location) = state.location_line() {
            lines.push(Line::from(Span::styled(
                location,
                Style::default().fg(theme.muted),
            )));
        }

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
        let label = Style::default().fg(theme.muted);
        let mut lines = vec![
            Line::from(Span::styled(
                state.date.localized_date.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("Name day: ", label),
                Span::raw(
                    state
                        .nameday
                        .as_ref()
                        .map(|n| n.name.clone())
                        .unwrap_or_default(),
                ),
            ]),
        ];

        if let Some(weather) = state.weather_line() {
            let mut spans = vec![Span::raw(weather)];
            if let Some(icon) = state.weather().map(|w| w.icon_url.as_str()) {
                spans.push(Span::styled(format!("  {icon}"), label));
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::from(vec![
            Span::styled("Day of week: ", label),
            Span::raw(state.date.weekday_name.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Month: ", label),
            Span::raw(state.date.month_name.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Day of year: ", label),
            Span::raw(
                state
                    .timezone
                    .as_ref()
                    .map(|tz| tz.day_of_year.to_string())
                    .unwrap_or_default(),
            ),
        ]));

        let panel = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.muted))
                .title("today"),
        );
        frame.render_widget(panel, centered_rect(48, area.height, area));
    }
}

async fn wait_for_revision(revisions: &mut Option<tokio::sync::watch::Receiver<u64>>) -> bool {
    match revisions.as_mut() {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn inset(area: Rect, margin: u16) -> Rect {
    let width = area.width.saturating_sub(margin * 2);
    Rect::new(area.x + margin.min(area.width), area.y, width, area.height)
}
