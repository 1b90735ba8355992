pub mod app;
pub mod audio;
pub mod chat_message;
pub mod chat_panel;
pub mod chat_view;
pub mod config;
pub mod constants;
pub mod errors;
pub mod key_handlers;
pub mod latest_message;
pub mod logging;
pub mod timer;
pub mod transport;
pub mod typing_indicator;
pub mod ui;

pub use app::App;
pub use chat_panel::{ChatPanel, PanelOptions, TypingState};
pub use errors::{ChatterError, ChatterResult};
