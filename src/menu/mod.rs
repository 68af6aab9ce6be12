pub mod edit_menu;
pub mod icon_tag;
pub mod layout;
pub mod lifecycle;
pub mod list_menu;
pub mod navigation;
pub mod paging;
pub mod permission;

pub use edit_menu::{EditAction, EditMenu};
pub use icon_tag::{get_icon, set_icon, ICON_TAG_KEY};
pub use layout::{ActionTable, Button, FrameBuilder, GridLayout};
pub use lifecycle::{ClickTarget, Collaborators, Menu, MenuContext, MenuCore, MenuLifecycle, MenuRouter};
pub use list_menu::{ListAction, ListMenu};
pub use navigation::{MenuBinding, NavigationTarget};
pub use paging::{total_pages, PageAction, PageState};
pub use permission::{can_edit, Capability};
