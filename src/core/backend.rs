//! OS capability boundary
//!
//! Everything a [`ConsoleSession`](super::session::ConsoleSession) does to the
//! operating system goes through [`ConsoleBackend`]. The production
//! implementation lives in [`win32`](super::win32); tests use a recording fake.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Failed to allocate console: {0}")]
    Allocate(String),

    #[error("Failed to free console: {0}")]
    Free(String),

    #[error("Failed to redirect standard streams: {0}")]
    Redirect(String),

    #[error("Failed to set console title: {0}")]
    Title(String),

    #[error("Failed to change window visibility: {0}")]
    Show(String),

    #[error("Failed to change window z-order: {0}")]
    ZOrder(String),

    #[error("Failed to update system menu: {0}")]
    Menu(String),

    #[error("Failed to query screen buffer info: {0}")]
    BufferInfo(String),

    #[error("Failed to query window rectangle: {0}")]
    WindowRect(String),

    #[error("Failed to resize window: {0}")]
    Resize(String),

    #[error("Failed to post close request: {0}")]
    PostClose(String),

    #[error("No console window")]
    NoWindow,
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Raw window handle value, kept opaque so the session logic stays portable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Window bounds as reported by the OS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl WindowRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Screen buffer state. Only the visible region is tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferInfo {
    /// Visible region in character cells
    pub window: WindowRect,
}

/// Visibility commands understood by [`ConsoleBackend::show`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowCommand {
    Hide,
    Minimize,
    Restore,
    Normal,
}

/// Stacking policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    TopMost,
    NotTopMost,
}

/// Where stdin/stdout/stderr should point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTarget {
    /// The console's own input/output buffers
    Console,
    /// The null device
    Discard,
}

/// Operations a console session needs from the host OS.
///
/// Each method maps to one native call (or a short fixed sequence of them).
/// Implementations report failures; deciding whether a failure matters is
/// left to the session.
pub trait ConsoleBackend {
    fn allocate(&self) -> Result<()>;

    fn free(&self) -> Result<()>;

    /// Window attached to the process console, if any
    fn console_window(&self) -> Option<WindowHandle>;

    fn redirect_streams(&self, target: StreamTarget) -> Result<()>;

    fn set_title(&self, title: &str) -> Result<()>;

    fn show(&self, window: WindowHandle, command: ShowCommand) -> Result<()>;

    /// Change stacking without moving or resizing the window
    fn set_z_order(&self, window: WindowHandle, order: ZOrder) -> Result<()>;

    /// Enable or disable the close item of the window's system menu
    fn set_close_enabled(&self, window: WindowHandle, enabled: bool) -> Result<()>;

    /// Screen buffer info of the current standard output
    fn buffer_info(&self) -> Result<BufferInfo>;

    fn window_rect(&self, window: WindowHandle) -> Result<WindowRect>;

    /// Resize in place, leaving position and z-order alone
    fn resize(&self, window: WindowHandle, width: i32, height: i32) -> Result<()>;

    /// Ask the window to close asynchronously
    fn post_close(&self, window: WindowHandle) -> Result<()>;
}
