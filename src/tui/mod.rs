//! Terminal host for the menus: a ratatui grid surface, keyboard mapping and
//! a text prompt standing in for the host's field capture.

pub mod keys;
pub mod prompt;
pub mod session;
pub mod surface;

pub use keys::{input_from_key, CursorMove, TerminalInput};
pub use prompt::{PromptFieldEditor, PromptView};
pub use session::{run_terminal_session, SessionStep, TerminalSession};
pub use surface::{SurfaceViewModel, TerminalSurface};
