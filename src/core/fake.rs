//! Recording backend for tests

use std::cell::RefCell;
use std::rc::Rc;

use super::backend::{
    BufferInfo, ConsoleBackend, ConsoleError, Result, ShowCommand, StreamTarget, WindowHandle,
    WindowRect, ZOrder,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Allocate,
    Free,
    ConsoleWindow,
    Redirect(StreamTarget),
    SetTitle(String),
    Show(WindowHandle, ShowCommand),
    SetZOrder(WindowHandle, ZOrder),
    SetCloseEnabled(WindowHandle, bool),
    BufferInfo,
    WindowRect(WindowHandle),
    Resize(WindowHandle, i32, i32),
    PostClose(WindowHandle),
}

/// Canned answers for the queries
#[derive(Debug, Clone)]
pub struct FakeState {
    pub calls: Vec<Call>,
    /// Returned by successive `console_window` calls; repeats the last one
    pub windows: Vec<Option<WindowHandle>>,
    pub buffer: Option<BufferInfo>,
    pub rect: Option<WindowRect>,
    pub fail_allocate: bool,
    pub fail_free: bool,
    pub fail_redirect: bool,
    pub fail_title: bool,
    pub fail_resize: bool,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            windows: vec![Some(WindowHandle(0x100))],
            buffer: Some(BufferInfo {
                window: WindowRect::new(0, 0, 119, 29),
            }),
            rect: Some(WindowRect::new(100, 50, 900, 650)),
            fail_allocate: false,
            fail_free: false,
            fail_redirect: false,
            fail_title: false,
            fail_resize: false,
        }
    }
}

/// Clones share state, so a test can keep one while the session owns another
#[derive(Debug, Clone, Default)]
pub struct FakeConsole {
    state: Rc<RefCell<FakeState>>,
}

impl FakeConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.borrow_mut());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl ConsoleBackend for FakeConsole {
    fn allocate(&self) -> Result<()> {
        self.record(Call::Allocate);
        if self.state.borrow().fail_allocate {
            return Err(ConsoleError::Allocate("Access is denied.".into()));
        }
        Ok(())
    }

    fn free(&self) -> Result<()> {
        self.record(Call::Free);
        if self.state.borrow().fail_free {
            return Err(ConsoleError::Free("The handle is invalid.".into()));
        }
        Ok(())
    }

    fn console_window(&self) -> Option<WindowHandle> {
        self.record(Call::ConsoleWindow);
        let mut state = self.state.borrow_mut();
        if state.windows.len() > 1 {
            state.windows.remove(0)
        } else {
            state.windows.first().copied().flatten()
        }
    }

    fn redirect_streams(&self, target: StreamTarget) -> Result<()> {
        self.record(Call::Redirect(target));
        if self.state.borrow().fail_redirect {
            return Err(ConsoleError::Redirect("The system cannot find the file specified.".into()));
        }
        Ok(())
    }

    fn set_title(&self, title: &str) -> Result<()> {
        self.record(Call::SetTitle(title.to_string()));
        if self.state.borrow().fail_title {
            return Err(ConsoleError::Title("Invalid handle".into()));
        }
        Ok(())
    }

    fn show(&self, window: WindowHandle, command: ShowCommand) -> Result<()> {
        self.record(Call::Show(window, command));
        Ok(())
    }

    fn set_z_order(&self, window: WindowHandle, order: ZOrder) -> Result<()> {
        self.record(Call::SetZOrder(window, order));
        Ok(())
    }

    fn set_close_enabled(&self, window: WindowHandle, enabled: bool) -> Result<()> {
        self.record(Call::SetCloseEnabled(window, enabled));
        Ok(())
    }

    fn buffer_info(&self) -> Result<BufferInfo> {
        self.record(Call::BufferInfo);
        self.state
            .borrow()
            .buffer
            .ok_or_else(|| ConsoleError::BufferInfo("The handle is invalid.".into()))
    }

    fn window_rect(&self, window: WindowHandle) -> Result<WindowRect> {
        self.record(Call::WindowRect(window));
        self.state
            .borrow()
            .rect
            .ok_or_else(|| ConsoleError::WindowRect("Invalid window handle.".into()))
    }

    fn resize(&self, window: WindowHandle, width: i32, height: i32) -> Result<()> {
        self.record(Call::Resize(window, width, height));
        if self.state.borrow().fail_resize {
            return Err(ConsoleError::Resize("Access is denied.".into()));
        }
        Ok(())
    }

    fn post_close(&self, window: WindowHandle) -> Result<()> {
        self.record(Call::PostClose(window));
        Ok(())
    }
}
