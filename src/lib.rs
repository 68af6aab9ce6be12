pub mod config;
pub mod host;
pub mod locale;
pub mod menu;
pub mod position;
pub mod shared;
pub mod tui;
