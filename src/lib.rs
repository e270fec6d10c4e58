//! winconsole - an owned Windows console for GUI and background processes
//!
//! A [`ConsoleSession`] allocates a console for the current process, points
//! stdin/stdout/stderr at it, and drives its window: title, close button,
//! visibility, always-on-top and size. Dropping the session sends stdio to
//! `NUL` and releases the console.
//!
//! # Features
//!
//! - **Stdio redirection**: `println!` and friends reach the new console
//! - **Window control**: hide/minimize/restore, topmost, close button, resize
//! - **Best effort**: OS failures are logged and kept in
//!   [`ConsoleSession::last_error`], never raised
//! - **Testable**: all OS calls go through [`ConsoleBackend`]
//!
//! # Quick Start
//!
//! ```ignore
//! use winconsole::ConsoleSession;
//!
//! let mut console = ConsoleSession::new(Some("Debug output"));
//! console.disable_close_button().set_always_on_top();
//! println!("visible columns: {}", console.columns());
//! ```

pub mod config;
pub mod core;

pub use crate::config::{ConsoleConfig, StartState, WindowConfig};
pub use crate::core::backend::{
    BufferInfo, ConsoleBackend, ConsoleError, ShowCommand, StreamTarget, WindowHandle, WindowRect,
    ZOrder,
};
pub use crate::core::session::ConsoleSession;
#[cfg(windows)]
pub use crate::core::win32::Win32Console;
