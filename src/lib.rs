pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod form;
pub mod model;
pub mod notification;
pub mod registry;
pub mod submission;
pub mod ui;

pub use console::AdminConsole;
pub use error::{ConsoleError, NetworkError, ValidationError};
