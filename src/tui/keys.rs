use crate::host::ClickKind;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalInput {
    Click(ClickKind),
    Move(CursorMove),
    Close,
    Reopen,
    Quit,
}

pub const KEY_HINTS: &str =
    "Arrows move | Enter select | e edit | i set icon | x confirm delete | Esc close | q quit";

pub fn input_from_key(key: KeyEvent) -> Option<TerminalInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TerminalInput::Quit)
        }
        KeyCode::Char('q') => Some(TerminalInput::Quit),
        KeyCode::Esc => Some(TerminalInput::Close),
        KeyCode::Up | KeyCode::Char('k') => Some(TerminalInput::Move(CursorMove::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(TerminalInput::Move(CursorMove::Down)),
        KeyCode::Left | KeyCode::Char('h') => Some(TerminalInput::Move(CursorMove::Left)),
        KeyCode::Right | KeyCode::Char('l') => Some(TerminalInput::Move(CursorMove::Right)),
        KeyCode::Enter if shift => Some(TerminalInput::Click(ClickKind::ShiftPrimary)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(TerminalInput::Click(ClickKind::Primary)),
        KeyCode::Char('e') => Some(TerminalInput::Click(ClickKind::Secondary)),
        KeyCode::Char('E') => Some(TerminalInput::Click(ClickKind::ShiftSecondary)),
        KeyCode::Char('i') | KeyCode::Char('I') => {
            Some(TerminalInput::Click(ClickKind::ShiftPrimary))
        }
        KeyCode::Char('x') => Some(TerminalInput::Click(ClickKind::Drop)),
        KeyCode::Char('m') => Some(TerminalInput::Click(ClickKind::Middle)),
        KeyCode::Char('o') => Some(TerminalInput::Reopen),
        _ => None,
    }
}
