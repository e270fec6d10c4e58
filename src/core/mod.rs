//! Core console session components.
//!
//! - **backend**: the OS capability trait and its value types
//! - **win32**: Win32 implementation of the backend (Windows only)
//! - **session**: the owned console session built on a backend
//!
//! # Architecture
//!
//! ```text
//! ConsoleSession<B>
//! └── B: ConsoleBackend
//!     ├── Win32Console (AllocConsole, SetStdHandle, SetWindowPos, ...)
//!     └── FakeConsole (tests)
//! ```

pub mod backend;
pub mod session;
#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub(crate) mod fake;
