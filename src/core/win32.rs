//! Win32 console backend
//!
//! Binds [`ConsoleBackend`] to the real console and window APIs. Only the
//! wide-character entry points are used.

use std::cell::RefCell;
use std::io::Write;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{
    CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE, HWND, LPARAM, RECT, WPARAM,
};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Console::{
    AllocConsole, FreeConsole, GetConsoleScreenBufferInfo, GetConsoleWindow, GetStdHandle,
    SetConsoleTitleW, SetStdHandle, CONSOLE_SCREEN_BUFFER_INFO, STD_ERROR_HANDLE, STD_HANDLE,
    STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnableMenuItem, GetSystemMenu, GetWindowRect, PostMessageW, SetWindowPos, ShowWindow,
    HWND_NOTOPMOST, HWND_TOPMOST, MF_BYCOMMAND, MF_DISABLED, MF_ENABLED, MF_GRAYED, SC_CLOSE,
    SWP_DRAWFRAME, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SWP_SHOWWINDOW, SW_HIDE, SW_MINIMIZE,
    SW_NORMAL, SW_RESTORE, WM_CLOSE,
};

use super::backend::{
    BufferInfo, ConsoleBackend, ConsoleError, Result, ShowCommand, StreamTarget, WindowHandle,
    WindowRect, ZOrder,
};

/// Device names opened for each standard stream, in stdin/stdout/stderr order
const CONSOLE_DEVICES: [&str; 3] = ["CONIN$", "CONOUT$", "CONOUT$"];
const DISCARD_DEVICE: &str = "NUL";

/// Console backend backed by the Win32 API
pub struct Win32Console {
    /// Handles opened by the last redirect, released on the next one
    std_handles: RefCell<Vec<HANDLE>>,
}

impl Win32Console {
    pub fn new() -> Self {
        Self {
            std_handles: RefCell::new(Vec::new()),
        }
    }
}

impl Default for Win32Console {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode as a null-terminated UTF-16 string
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut _)
}

unsafe fn open_device(name: &str) -> windows::core::Result<HANDLE> {
    let wide = to_wide(name);
    CreateFileW(
        PCWSTR(wide.as_ptr()),
        (GENERIC_READ | GENERIC_WRITE).0,
        FILE_SHARE_READ | FILE_SHARE_WRITE,
        None,
        OPEN_EXISTING,
        FILE_ATTRIBUTE_NORMAL,
        HANDLE::default(),
    )
}

impl ConsoleBackend for Win32Console {
    fn allocate(&self) -> Result<()> {
        unsafe { AllocConsole().map_err(|e| ConsoleError::Allocate(e.to_string())) }
    }

    fn free(&self) -> Result<()> {
        unsafe { FreeConsole().map_err(|e| ConsoleError::Free(e.to_string())) }
    }

    fn console_window(&self) -> Option<WindowHandle> {
        let window = unsafe { GetConsoleWindow() };
        if window.0.is_null() {
            None
        } else {
            Some(WindowHandle(window.0 as isize))
        }
    }

    fn redirect_streams(&self, target: StreamTarget) -> Result<()> {
        // Anything still buffered belongs to the old target
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        let streams: [STD_HANDLE; 3] = [STD_INPUT_HANDLE, STD_OUTPUT_HANDLE, STD_ERROR_HANDLE];
        let mut opened = Vec::with_capacity(streams.len());
        let mut failure = None;

        unsafe {
            for (i, stream) in streams.into_iter().enumerate() {
                let device = match target {
                    StreamTarget::Console => CONSOLE_DEVICES[i],
                    StreamTarget::Discard => DISCARD_DEVICE,
                };
                let result = open_device(device).and_then(|handle| {
                    opened.push(handle);
                    SetStdHandle(stream, handle)
                });
                if let Err(e) = result {
                    tracing::debug!("Redirecting std handle {} to {} failed: {}", i, device, e);
                    failure.get_or_insert(e);
                }
            }

            let previous = self.std_handles.replace(opened);
            for handle in previous {
                let _ = CloseHandle(handle);
            }
        }

        match failure {
            Some(e) => Err(ConsoleError::Redirect(e.to_string())),
            None => Ok(()),
        }
    }

    fn set_title(&self, title: &str) -> Result<()> {
        let wide = to_wide(title);
        unsafe {
            SetConsoleTitleW(PCWSTR(wide.as_ptr())).map_err(|e| ConsoleError::Title(e.to_string()))
        }
    }

    fn show(&self, window: WindowHandle, command: ShowCommand) -> Result<()> {
        let cmd = match command {
            ShowCommand::Hide => SW_HIDE,
            ShowCommand::Minimize => SW_MINIMIZE,
            ShowCommand::Restore => SW_RESTORE,
            ShowCommand::Normal => SW_NORMAL,
        };
        // The return value is the previous visibility, not a success flag
        unsafe {
            let _ = ShowWindow(hwnd(window), cmd);
        }
        Ok(())
    }

    fn set_z_order(&self, window: WindowHandle, order: ZOrder) -> Result<()> {
        let insert_after = match order {
            ZOrder::TopMost => HWND_TOPMOST,
            ZOrder::NotTopMost => HWND_NOTOPMOST,
        };
        unsafe {
            SetWindowPos(
                hwnd(window),
                insert_after,
                0,
                0,
                0,
                0,
                SWP_DRAWFRAME | SWP_NOMOVE | SWP_NOSIZE | SWP_SHOWWINDOW,
            )
            .map_err(|e| ConsoleError::ZOrder(e.to_string()))
        }
    }

    fn set_close_enabled(&self, window: WindowHandle, enabled: bool) -> Result<()> {
        let flags = if enabled {
            MF_BYCOMMAND | MF_ENABLED
        } else {
            MF_BYCOMMAND | MF_DISABLED | MF_GRAYED
        };
        unsafe {
            let menu = GetSystemMenu(hwnd(window), false);
            if menu.0.is_null() {
                return Err(ConsoleError::Menu("window has no system menu".to_string()));
            }
            // -1 means the item does not exist
            if EnableMenuItem(menu, SC_CLOSE, flags).0 == -1 {
                return Err(ConsoleError::Menu("close item not found".to_string()));
            }
        }
        Ok(())
    }

    fn buffer_info(&self) -> Result<BufferInfo> {
        let mut info = CONSOLE_SCREEN_BUFFER_INFO::default();
        unsafe {
            let output =
                GetStdHandle(STD_OUTPUT_HANDLE).map_err(|e| ConsoleError::BufferInfo(e.to_string()))?;
            GetConsoleScreenBufferInfo(output, &mut info)
                .map_err(|e| ConsoleError::BufferInfo(e.to_string()))?;
        }
        let w = info.srWindow;
        Ok(BufferInfo {
            window: WindowRect::new(
                w.Left as i32,
                w.Top as i32,
                w.Right as i32,
                w.Bottom as i32,
            ),
        })
    }

    fn window_rect(&self, window: WindowHandle) -> Result<WindowRect> {
        let mut rect = RECT::default();
        unsafe {
            GetWindowRect(hwnd(window), &mut rect)
                .map_err(|e| ConsoleError::WindowRect(e.to_string()))?;
        }
        Ok(WindowRect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn resize(&self, window: WindowHandle, width: i32, height: i32) -> Result<()> {
        unsafe {
            SetWindowPos(
                hwnd(window),
                HWND::default(),
                0,
                0,
                width,
                height,
                SWP_NOMOVE | SWP_NOZORDER,
            )
            .map_err(|e| ConsoleError::Resize(e.to_string()))
        }
    }

    fn post_close(&self, window: WindowHandle) -> Result<()> {
        // Posted rather than DestroyWindow: the console window belongs to conhost
        unsafe {
            PostMessageW(hwnd(window), WM_CLOSE, WPARAM(0), LPARAM(0))
                .map_err(|e| ConsoleError::PostClose(e.to_string()))
        }
    }
}
