use super::keys::{input_from_key, TerminalInput};
use super::prompt::{PromptFieldEditor, PromptView};
use super::surface::TerminalSurface;
use crate::host::{Actor, RenderSurface};
use crate::menu::{ListMenu, MenuContext, MenuLifecycle};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::io;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Continue,
    Quit,
}

/// One terminal user driving the menus through the keyboard.
pub struct TerminalSession {
    ctx: Rc<MenuContext>,
    surface: Rc<TerminalSurface>,
    prompt: Rc<PromptFieldEditor>,
    actor: Actor,
    home: Rc<ListMenu>,
}

impl TerminalSession {
    pub fn new(
        ctx: Rc<MenuContext>,
        surface: Rc<TerminalSurface>,
        prompt: Rc<PromptFieldEditor>,
        actor: Actor,
        home: Rc<ListMenu>,
    ) -> Self {
        Self {
            ctx,
            surface,
            prompt,
            actor,
            home,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn surface(&self) -> &TerminalSurface {
        &self.surface
    }

    pub fn start(&self) {
        self.home.show(&self.actor);
    }

    pub fn tick(&self) {
        self.ctx.tick();
    }

    pub fn handle_key(&self, key: KeyEvent) -> SessionStep {
        if self.prompt.is_prompting() {
            self.prompt.handle_key(key);
            return SessionStep::Continue;
        }
        match input_from_key(key) {
            Some(input) => self.apply(input),
            None => SessionStep::Continue,
        }
    }

    pub fn apply(&self, input: TerminalInput) -> SessionStep {
        match input {
            TerminalInput::Click(kind) => {
                if self.surface.is_open() {
                    self.ctx
                        .router()
                        .handle_click(&self.actor, self.surface.selected_slot(), kind);
                }
            }
            TerminalInput::Move(direction) => self.surface.move_cursor(direction),
            TerminalInput::Close => {
                if self.surface.is_open() {
                    self.surface.close(&self.actor.id);
                    self.ctx.router().handle_closed(&self.actor.id);
                }
            }
            TerminalInput::Reopen => {
                if !self.surface.is_open() {
                    self.home.show(&self.actor);
                }
            }
            TerminalInput::Quit => return SessionStep::Quit,
        }
        SessionStep::Continue
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        self.surface.draw(frame);
        if let Some(view) = self.prompt.view() {
            draw_prompt(frame, &view);
        }
    }

    pub fn run<B: Backend>(&self, terminal: &mut Terminal<B>) -> Result<(), String> {
        self.start();
        loop {
            self.tick();
            terminal
                .draw(|frame| self.draw(frame))
                .map_err(|e| format!("failed to render menu: {e}"))?;
            if !event::poll(Duration::from_millis(250))
                .map_err(|e| format!("failed to poll menu input: {e}"))?
            {
                continue;
            }
            let ev = event::read().map_err(|e| format!("failed to read menu input: {e}"))?;
            let Event::Key(key) = ev else {
                continue;
            };
            if self.handle_key(key) == SessionStep::Quit {
                return Ok(());
            }
        }
    }
}

/// Runs `session` on the real terminal, restoring it afterwards.
pub fn run_terminal_session(session: &TerminalSession) -> Result<(), String> {
    let mut stdout = io::stdout();
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    execute!(stdout, EnterAlternateScreen, Hide)
        .map_err(|e| format!("failed to enter menu screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create menu terminal: {e}"))?;
    let result = session.run(&mut terminal);
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(terminal.backend_mut(), Show, LeaveAlternateScreen)
        .map_err(|e| format!("failed to leave menu screen: {e}"))?;
    result
}

fn draw_prompt(frame: &mut Frame<'_>, view: &PromptView) {
    let area = centered_rect(60, 5, frame.area());
    frame.render_widget(Clear, area);
    let prompt = Paragraph::new(vec![
        Line::from(format!("> {}", view.buffer)),
        Line::from("Enter apply, Esc cancel"),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(view.label.clone()),
    );
    frame.render_widget(prompt, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
