//! Console session management
//!
//! A [`ConsoleSession`] owns the process console from allocation to release.
//! Its operations are best effort: OS failures are logged and kept in
//! [`ConsoleSession::last_error`] instead of being returned.

use tracing::{debug, info, warn};

use super::backend::{
    ConsoleBackend, ConsoleError, Result, ShowCommand, StreamTarget, WindowHandle, WindowRect,
    ZOrder,
};
#[cfg(windows)]
use super::win32::Win32Console;

/// The process console and its redirected standard streams
///
/// Move-only: dropping the session closes the console.
pub struct ConsoleSession<B: ConsoleBackend> {
    backend: B,
    /// Console window, if the OS reported one
    window: Option<WindowHandle>,
    /// Console allocated and streams redirected to it
    open: bool,
    /// Most recent OS failure
    last_error: Option<ConsoleError>,
}

#[cfg(windows)]
impl ConsoleSession<Win32Console> {
    /// Allocate a console for this process and point stdio at it
    pub fn new(title: Option<&str>) -> Self {
        Self::with_backend(Win32Console::new(), title)
    }
}

impl<B: ConsoleBackend> ConsoleSession<B> {
    /// Open a session through an explicit backend
    pub fn with_backend(backend: B, title: Option<&str>) -> Self {
        let mut session = Self {
            backend,
            window: None,
            open: false,
            last_error: None,
        };
        session.create(title);
        session
    }

    fn create(&mut self, title: Option<&str>) {
        // A failed allocation means the process already has a console that
        // belongs to someone else; its window must never be closed by us
        let allocated = self.backend.allocate();
        let owns_console = allocated.is_ok();
        self.note(allocated);

        let result = self.backend.redirect_streams(StreamTarget::Console);
        self.note(result);

        if let Some(title) = title {
            self.set_title(title);
        }

        self.window = if owns_console {
            self.backend.console_window()
        } else {
            None
        };
        if owns_console && self.window.is_none() {
            self.note(Err(ConsoleError::NoWindow));
        }
        self.open = true;

        info!("Console session opened (window: {:?})", self.window);
    }

    /// Log and remember a failed OS call
    fn note(&mut self, result: Result<()>) {
        if let Err(e) = result {
            warn!("{}", e);
            self.last_error = Some(e);
        }
    }

    fn on_window(
        &mut self,
        op: &str,
        f: impl FnOnce(&B, WindowHandle) -> Result<()>,
    ) -> &mut Self {
        match self.window {
            Some(window) => {
                let result = f(&self.backend, window);
                self.note(result);
            }
            None => debug!("{}: no console window", op),
        }
        self
    }

    /// Release the console
    ///
    /// Stdio is pointed at the null device before the console is freed, then
    /// the window is asked to close. Does nothing if already closed.
    pub fn close(&mut self) {
        if !self.open {
            debug!("Console session already closed");
            return;
        }

        let result = self.backend.redirect_streams(StreamTarget::Discard);
        self.note(result);

        let result = self.backend.free();
        self.note(result);

        if let Some(window) = self.window.take() {
            let result = self.backend.post_close(window);
            self.note(result);
        }
        self.open = false;

        info!("Console session closed");
    }

    /// Close the current console and open a fresh one
    pub fn reallocate_console(&mut self, title: Option<&str>) -> &mut Self {
        self.close();
        self.create(title);
        self
    }

    /// Set the window title. Empty titles are ignored.
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        if title.is_empty() {
            return self;
        }
        let result = self.backend.set_title(title);
        self.note(result);
        self
    }

    pub fn enable_close_button(&mut self) -> &mut Self {
        self.on_window("enable_close_button", |b, w| b.set_close_enabled(w, true))
    }

    pub fn disable_close_button(&mut self) -> &mut Self {
        self.on_window("disable_close_button", |b, w| b.set_close_enabled(w, false))
    }

    /// Hide the window completely, including from the taskbar
    pub fn hide(&mut self) -> &mut Self {
        self.on_window("hide", |b, w| b.show(w, ShowCommand::Hide))
    }

    pub fn minimize(&mut self) -> &mut Self {
        self.on_window("minimize", |b, w| b.show(w, ShowCommand::Minimize))
    }

    /// Bring the window back from minimized or hidden
    pub fn restore(&mut self) -> &mut Self {
        self.on_window("restore", |b, w| b.show(w, ShowCommand::Restore))
    }

    /// Keep the window above all non-topmost windows
    pub fn set_always_on_top(&mut self) -> &mut Self {
        self.stack(ZOrder::TopMost)
    }

    pub fn remove_always_on_top(&mut self) -> &mut Self {
        self.stack(ZOrder::NotTopMost)
    }

    fn stack(&mut self, order: ZOrder) -> &mut Self {
        self.on_window("set_z_order", |b, w| {
            let placed = b.set_z_order(w, order);
            let shown = b.show(w, ShowCommand::Normal);
            placed.and(shown)
        })
    }

    /// Visible width of the stdout screen buffer in cells, 0 if unknown
    ///
    /// This is `right - left` of the visible region, one less than the
    /// inclusive column count.
    pub fn columns(&self) -> i32 {
        match self.backend.buffer_info() {
            Ok(info) => info.window.right - info.window.left,
            Err(e) => {
                debug!("columns: {}", e);
                0
            }
        }
    }

    /// Resize to `width` pixels, keeping the current height
    ///
    /// Returns false only if the current bounds could not be read.
    pub fn set_width(&mut self, width: i32) -> bool {
        self.resize_with(|rect| (width, rect.height()))
    }

    /// Resize to `height` pixels, keeping the current width
    pub fn set_height(&mut self, height: i32) -> bool {
        self.resize_with(|rect| (rect.width(), height))
    }

    pub fn multiply_width(&mut self, factor: f32) -> bool {
        self.resize_with(|rect| ((rect.width() as f32 * factor) as i32, rect.height()))
    }

    pub fn multiply_height(&mut self, factor: f32) -> bool {
        self.resize_with(|rect| (rect.width(), (rect.height() as f32 * factor) as i32))
    }

    fn resize_with(&mut self, size: impl FnOnce(WindowRect) -> (i32, i32)) -> bool {
        let Some(window) = self.window else {
            debug!("resize: no console window");
            return false;
        };
        let rect = match self.backend.window_rect(window) {
            Ok(rect) => rect,
            Err(e) => {
                self.note(Err(e));
                return false;
            }
        };
        let (width, height) = size(rect);
        debug!("Resizing console window to {}x{}", width, height);
        let result = self.backend.resize(window, width, height);
        self.note(result);
        true
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn window(&self) -> Option<WindowHandle> {
        self.window
    }

    /// Most recent OS failure seen by any operation
    pub fn last_error(&self) -> Option<&ConsoleError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<ConsoleError> {
        self.last_error.take()
    }
}

impl<B: ConsoleBackend> Drop for ConsoleSession<B> {
    fn drop(&mut self) {
        self.close();
    }
}
