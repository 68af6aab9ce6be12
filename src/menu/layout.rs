//! Character-keyed grid layouts and the builder that resolves them into a
//! [`MenuFrame`] plus the slot → action table used for click dispatch.

use crate::host::{FrameCell, MenuFrame, PageIndicator, GRID_COLUMNS};
use crate::shared::ids::IconRef;
use std::collections::BTreeMap;

pub const BLANK_SYMBOL: char = ' ';

pub const ITEM_SYMBOL: char = 'p';
pub const FIRST_PAGE_SYMBOL: char = 'b';
pub const PREVIOUS_PAGE_SYMBOL: char = 'l';
pub const NEXT_PAGE_SYMBOL: char = 'n';
pub const LAST_PAGE_SYMBOL: char = 'e';
pub const CONTROLS_SYMBOL: char = 'i';

pub const BACK_SYMBOL: char = 'b';
pub const INFO_SYMBOL: char = 'i';
pub const EDIT_NAME_SYMBOL: char = 'n';
pub const EDIT_DESCRIPTION_SYMBOL: char = 'd';
pub const EDIT_LOCATION_SYMBOL: char = 'l';
pub const EDIT_VISIBILITY_SYMBOL: char = 'v';
pub const DELETE_SYMBOL: char = 'x';

const LIST_ITEM_ROW: &str = " ppppppp ";
const LIST_CONTROL_ROW: &str = "bl  i  ne";
const EDIT_ROWS: [&str; 3] = ["b       i", "  n d l  ", "    v   x"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    rows: Vec<[char; GRID_COLUMNS]>,
}

impl GridLayout {
    /// Rows shorter than the grid are padded with blanks; extra columns are dropped.
    pub fn from_rows(rows: &[&str]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                let mut cells = [BLANK_SYMBOL; GRID_COLUMNS];
                for (cell, symbol) in cells.iter_mut().zip(row.chars()) {
                    *cell = symbol;
                }
                cells
            })
            .collect();
        Self { rows }
    }

    /// List menu layout: `rows - 1` item rows above one control row.
    pub fn list(rows: usize) -> Self {
        let mut template = vec![LIST_ITEM_ROW; rows.saturating_sub(1).max(1)];
        template.push(LIST_CONTROL_ROW);
        Self::from_rows(&template)
    }

    pub fn editor() -> Self {
        Self::from_rows(&EDIT_ROWS)
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn slot_count(&self) -> usize {
        self.rows.len() * GRID_COLUMNS
    }

    pub fn symbol_at(&self, slot: usize) -> Option<char> {
        self.rows
            .get(slot / GRID_COLUMNS)
            .map(|row| row[slot % GRID_COLUMNS])
    }

    pub fn slots_of(&self, symbol: char) -> Vec<usize> {
        (0..self.slot_count())
            .filter(|slot| self.symbol_at(*slot) == Some(symbol))
            .collect()
    }
}

pub type ActionTable<A> = BTreeMap<usize, A>;

/// One rendered cell; clickable when it carries an action.
#[derive(Debug, Clone)]
pub struct Button<A> {
    pub icon: IconRef,
    pub lines: Vec<String>,
    pub action: Option<A>,
}

impl<A> Button<A> {
    pub fn new(icon: IconRef, lines: Vec<String>, action: A) -> Self {
        Self {
            icon,
            lines,
            action: Some(action),
        }
    }

    pub fn display(icon: IconRef, lines: Vec<String>) -> Self {
        Self {
            icon,
            lines,
            action: None,
        }
    }
}

pub struct FrameBuilder<A> {
    layout: GridLayout,
    cells: Vec<Option<FrameCell>>,
    actions: ActionTable<A>,
    filler: Option<IconRef>,
    page: Option<PageIndicator>,
}

impl<A> FrameBuilder<A> {
    pub fn new(layout: &GridLayout) -> Self {
        Self {
            layout: layout.clone(),
            cells: vec![None; layout.slot_count()],
            actions: ActionTable::new(),
            filler: None,
            page: None,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Background for every cell left empty; air leaves them blank.
    pub fn filler(&mut self, icon: &IconRef) {
        self.filler = Some(icon.clone()).filter(|icon| !icon.is_air());
    }

    pub fn page(&mut self, indicator: PageIndicator) {
        self.page = Some(indicator);
    }

    /// Places `button` in the first free slot keyed by `symbol`.
    pub fn set(&mut self, symbol: char, button: Button<A>) -> bool {
        let free = self
            .layout
            .slots_of(symbol)
            .into_iter()
            .find(|slot| self.cells[*slot].is_none());
        match free {
            Some(slot) => {
                self.place(slot, symbol, button);
                true
            }
            None => false,
        }
    }

    /// Fills the slots keyed by `symbol` in reading order; returns how many were placed.
    pub fn fill_group(&mut self, symbol: char, buttons: impl IntoIterator<Item = Button<A>>) -> usize {
        let slots = self.layout.slots_of(symbol);
        let mut placed = 0;
        for (slot, button) in slots.into_iter().zip(buttons) {
            self.place(slot, symbol, button);
            placed += 1;
        }
        placed
    }

    fn place(&mut self, slot: usize, symbol: char, button: Button<A>) {
        let clickable = button.action.is_some();
        if let Some(action) = button.action {
            self.actions.insert(slot, action);
        }
        self.cells[slot] = Some(FrameCell {
            symbol,
            icon: button.icon,
            lines: button.lines,
            clickable,
        });
    }

    pub fn finish(self, menu_id: u64, title: String) -> (MenuFrame, ActionTable<A>) {
        let Self {
            layout,
            mut cells,
            actions,
            filler,
            page,
        } = self;
        if let Some(filler) = filler {
            for cell in cells.iter_mut().filter(|cell| cell.is_none()) {
                *cell = Some(FrameCell {
                    symbol: BLANK_SYMBOL,
                    icon: filler.clone(),
                    lines: Vec::new(),
                    clickable: false,
                });
            }
        }
        let frame = MenuFrame {
            menu_id,
            title,
            rows: layout.rows(),
            cells,
            page,
        };
        (frame, actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon(path: &str) -> IconRef {
        IconRef::parse(path).expect("icon")
    }

    #[test]
    fn list_layout_reserves_last_row_for_controls() {
        let layout = GridLayout::list(4);
        assert_eq!(layout.rows(), 4);
        assert_eq!(layout.slots_of(ITEM_SYMBOL).len(), 21);
        assert_eq!(layout.slots_of(FIRST_PAGE_SYMBOL), vec![27]);
        assert_eq!(layout.slots_of(LAST_PAGE_SYMBOL), vec![35]);
        assert_eq!(layout.slots_of(CONTROLS_SYMBOL), vec![31]);
    }

    #[test]
    fn short_rows_are_padded_with_blanks() {
        let layout = GridLayout::from_rows(&["ab", "abcdefghijkl"]);
        assert_eq!(layout.symbol_at(2), Some(BLANK_SYMBOL));
        assert_eq!(layout.symbol_at(17), Some('i'));
        assert_eq!(layout.symbol_at(18), None);
    }

    #[test]
    fn group_fill_stops_at_slot_count() {
        let layout = GridLayout::from_rows(&["pp p     "]);
        let mut builder = FrameBuilder::new(&layout);
        let placed = builder.fill_group(
            'p',
            (0..5).map(|n| Button::new(icon("stone"), vec![n.to_string()], n)),
        );
        assert_eq!(placed, 3);
        let (frame, actions) = builder.finish(7, "t".to_string());
        assert_eq!(actions.get(&3), Some(&2));
        assert_eq!(frame.slots_of('p'), vec![0, 1, 3]);
    }

    #[test]
    fn filler_covers_only_unused_cells() {
        let layout = GridLayout::from_rows(&["b   i    "]);
        let mut builder: FrameBuilder<u8> = FrameBuilder::new(&layout);
        builder.set('b', Button::new(icon("barrier"), vec!["Back".to_string()], 1));
        builder.set('i', Button::display(icon("knowledge_book"), Vec::new()));
        builder.filler(&icon("gray_stained_glass_pane"));
        let (frame, actions) = builder.finish(1, "edit".to_string());

        assert_eq!(actions.len(), 1);
        assert!(frame.cell(0).is_some_and(|cell| cell.clickable));
        assert!(frame.cell(4).is_some_and(|cell| !cell.clickable));
        assert_eq!(
            frame.cell(8).map(|cell| cell.icon.as_str()),
            Some("minecraft:gray_stained_glass_pane")
        );
    }

    #[test]
    fn air_filler_leaves_cells_empty() {
        let layout = GridLayout::editor();
        let mut builder: FrameBuilder<u8> = FrameBuilder::new(&layout);
        builder.filler(&icon("air"));
        let (frame, _) = builder.finish(1, "edit".to_string());
        assert!(frame.cells.iter().all(Option::is_none));
        assert_eq!(frame.rows, 3);
    }
}
