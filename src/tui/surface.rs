use super::keys::{CursorMove, KEY_HINTS};
use crate::host::{Actor, MenuFrame, MessageSink, RenderSurface, GRID_COLUMNS};
use crate::shared::ids::ActorId;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;
use std::cell::{Cell as StdCell, RefCell};

const CELL_WIDTH: u16 = 12;
const MESSAGE_HISTORY: usize = 3;

struct OpenFrame {
    actor: ActorId,
    frame: MenuFrame,
}

/// Single-viewer grid surface drawn with ratatui.
#[derive(Default)]
pub struct TerminalSurface {
    open: RefCell<Option<OpenFrame>>,
    cursor: StdCell<usize>,
    messages: RefCell<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceViewModel {
    pub title: String,
    pub page_line: Option<String>,
    /// Row-major labels, `GRID_COLUMNS` per row.
    pub grid: Vec<Vec<String>>,
    pub selected: usize,
    pub detail: Vec<String>,
    pub messages: Vec<String>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.borrow().is_some()
    }

    pub fn open_menu(&self) -> Option<u64> {
        self.open.borrow().as_ref().map(|open| open.frame.menu_id)
    }

    pub fn selected_slot(&self) -> usize {
        self.cursor.get()
    }

    pub fn select(&self, slot: usize) {
        let limit = self.slot_count();
        self.cursor.set(slot.min(limit.saturating_sub(1)));
    }

    pub fn move_cursor(&self, direction: CursorMove) {
        let slots = self.slot_count();
        if slots == 0 {
            return;
        }
        let current = self.cursor.get();
        let next = match direction {
            CursorMove::Up => current.checked_sub(GRID_COLUMNS).unwrap_or(current),
            CursorMove::Down => {
                let below = current + GRID_COLUMNS;
                if below < slots {
                    below
                } else {
                    current
                }
            }
            CursorMove::Left if current % GRID_COLUMNS > 0 => current - 1,
            CursorMove::Right if current % GRID_COLUMNS + 1 < GRID_COLUMNS && current + 1 < slots => {
                current + 1
            }
            CursorMove::Left | CursorMove::Right => current,
        };
        self.cursor.set(next);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    fn slot_count(&self) -> usize {
        self.open
            .borrow()
            .as_ref()
            .map_or(0, |open| open.frame.cells.len())
    }

    pub fn view_model(&self) -> Option<SurfaceViewModel> {
        let open = self.open.borrow();
        let frame = &open.as_ref()?.frame;
        let selected = self.cursor.get();
        let grid = frame
            .cells
            .chunks(GRID_COLUMNS)
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Some(cell) => short_label(cell.lines.first().map(String::as_str), cell.icon.path()),
                        None => String::new(),
                    })
                    .collect()
            })
            .collect();
        let detail = frame
            .cell(selected)
            .map(|cell| {
                let mut lines = vec![format!("[{}]", cell.icon)];
                lines.extend(cell.lines.iter().cloned());
                lines
            })
            .unwrap_or_default();
        let messages = self.messages.borrow();
        let recent = messages
            .iter()
            .skip(messages.len().saturating_sub(MESSAGE_HISTORY))
            .cloned()
            .collect();
        Some(SurfaceViewModel {
            title: frame.title.clone(),
            page_line: frame
                .page
                .map(|page| format!("Page {} / {}", page.index + 1, page.total)),
            grid,
            selected,
            detail,
            messages: recent,
        })
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        match self.view_model() {
            Some(view_model) => draw_menu(frame, &view_model),
            None => draw_idle(frame, &self.messages()),
        }
    }
}

fn short_label(first_line: Option<&str>, icon_path: &str) -> String {
    let label = first_line.filter(|line| !line.is_empty()).unwrap_or(icon_path);
    let width = usize::from(CELL_WIDTH) - 1;
    if label.chars().count() <= width {
        return label.to_string();
    }
    let mut short: String = label.chars().take(width - 1).collect();
    short.push('~');
    short
}

impl RenderSurface for TerminalSurface {
    fn open(&self, actor: &Actor, frame: MenuFrame) {
        let slots = frame.cells.len();
        let reopened = self
            .open
            .borrow()
            .as_ref()
            .is_some_and(|open| open.frame.menu_id == frame.menu_id);
        if !reopened || self.cursor.get() >= slots {
            self.cursor.set(0);
        }
        *self.open.borrow_mut() = Some(OpenFrame {
            actor: actor.id.clone(),
            frame,
        });
    }

    fn close(&self, actor: &ActorId) {
        let mut open = self.open.borrow_mut();
        if open.as_ref().is_some_and(|open| &open.actor == actor) {
            *open = None;
        }
    }
}

impl MessageSink for TerminalSurface {
    fn send_message(&self, _actor: &ActorId, text: &str) {
        self.messages.borrow_mut().push(text.to_string());
    }
}

fn draw_menu(frame: &mut Frame<'_>, view_model: &SurfaceViewModel) {
    let grid_height = u16::try_from(view_model.grid.len()).unwrap_or(u16::MAX).saturating_add(2);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(grid_height),
            Constraint::Min(4),
            Constraint::Length(5),
        ])
        .split(frame.area());

    let mut header_lines = vec![Line::from(Span::styled(
        view_model.title.clone(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];
    if let Some(page_line) = &view_model.page_line {
        header_lines.push(Line::from(page_line.clone()));
    }
    let header = Paragraph::new(header_lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let rows = view_model.grid.iter().enumerate().map(|(row_index, row)| {
        let cells = row.iter().enumerate().map(|(column, label)| {
            let slot = row_index * GRID_COLUMNS + column;
            let text = if label.is_empty() { "·".to_string() } else { label.clone() };
            let mut cell = Cell::from(text);
            if slot == view_model.selected {
                cell = cell.style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::REVERSED),
                );
            }
            cell
        });
        Row::new(cells.collect::<Vec<_>>())
    });
    let grid = Table::new(rows, [Constraint::Length(CELL_WIDTH); GRID_COLUMNS])
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(grid, chunks[1]);

    let detail = Paragraph::new(
        view_model
            .detail
            .iter()
            .map(|line| Line::from(line.clone()))
            .collect::<Vec<_>>(),
    )
    .block(Block::default().borders(Borders::ALL).title("Selected"));
    frame.render_widget(detail, chunks[2]);

    let mut footer_lines = vec![Line::from(KEY_HINTS)];
    footer_lines.extend(view_model.messages.iter().map(|line| Line::from(line.clone())));
    let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, chunks[3]);
}

fn draw_idle(frame: &mut Frame<'_>, messages: &[String]) {
    let mut lines = vec![
        Line::from("No menu open."),
        Line::from("o reopens the list | q quit"),
    ];
    lines.extend(
        messages
            .iter()
            .rev()
            .take(MESSAGE_HISTORY)
            .rev()
            .map(|line| Line::from(line.clone())),
    );
    let idle = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(idle, frame.area());
}
