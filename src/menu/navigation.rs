use super::lifecycle::{Menu, MenuLifecycle};
use super::list_menu::ListMenu;
use crate::host::Actor;
use crate::position::{MenuType, PositionHandle};
use crate::shared::errors::MenuError;
use std::rc::{Rc, Weak};

/// Return address of an edit menu: the list it was opened from and the page
/// the actor was on at that moment.
#[derive(Debug, Clone)]
pub struct NavigationTarget {
    menu: Weak<ListMenu>,
    page: usize,
}

impl NavigationTarget {
    pub fn new(menu: &Rc<ListMenu>, page: usize) -> Self {
        Self {
            menu: Rc::downgrade(menu),
            page,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn menu(&self) -> Option<Rc<ListMenu>> {
        self.menu.upgrade()
    }

    /// Shows the parent list to `actor` at the remembered page.
    pub fn return_to(&self, actor: &Actor) -> Result<(), MenuError> {
        let parent = self
            .menu()
            .ok_or(MenuError::PreconditionNotMet("parent list menu is gone"))?;
        parent.core().ensure_alive()?;
        parent.set_page_number(actor, self.page);
        parent.show(actor);
        Ok(())
    }
}

/// Immutable (record, parent, page) triple an edit menu is built from.
#[derive(Debug, Clone)]
pub struct MenuBinding {
    position: PositionHandle,
    return_to: NavigationTarget,
    menu_type: MenuType,
}

impl MenuBinding {
    pub fn new(position: PositionHandle, return_to: NavigationTarget, menu_type: MenuType) -> Self {
        Self {
            position,
            return_to,
            menu_type,
        }
    }

    pub fn position(&self) -> &PositionHandle {
        &self.position
    }

    pub fn return_to(&self) -> &NavigationTarget {
        &self.return_to
    }

    pub fn page(&self) -> usize {
        self.return_to.page
    }

    pub fn menu_type(&self) -> MenuType {
        self.menu_type
    }
}
