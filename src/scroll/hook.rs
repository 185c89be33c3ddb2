use crate::scroll::engine::PointerEventHandler;
use crate::scroll::state::RawPointerEvent;
use anyhow::anyhow;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};

/// `dwExtraInfo` marker placed on every input we synthesize.
pub const INJECT_TAG: usize = 0x5442_5343; // "TBSC"

/// Only input we synthesized ourselves is skipped. Aux buttons injected by
/// other tools (button remappers) still start gestures.
pub fn should_ignore_event(extra_info: usize) -> bool {
    extra_info == INJECT_TAG
}

/// Zero-capacity, so a send only completes while `install` is still waiting
/// for the hook thread.
#[cfg_attr(not(windows), allow(dead_code))]
fn ready_channel() -> (SyncSender<anyhow::Result<u32>>, Receiver<anyhow::Result<u32>>) {
    mpsc::sync_channel(0)
}

/// Hands the hook thread id to the installer. `false` when the installer
/// already gave up, in which case the thread must remove its hook and exit.
#[cfg_attr(not(windows), allow(dead_code))]
fn announce_ready(ready_tx: &SyncSender<anyhow::Result<u32>>, thread_id: u32) -> bool {
    ready_tx.send(Ok(thread_id)).is_ok()
}

/// Subscription to the OS low-level pointer stream.
///
/// Both `install` and `uninstall` are no-ops when already in that state.
pub trait HookBackend: Send {
    fn install(&mut self, handler: Box<dyn PointerEventHandler>) -> anyhow::Result<()>;
    fn uninstall(&mut self) -> anyhow::Result<()>;
    fn is_installed(&self) -> bool;
}

#[cfg(windows)]
pub use win_hook::DefaultHookBackend;

#[cfg(not(windows))]
#[derive(Debug, Default)]
pub struct DefaultHookBackend;

#[cfg(not(windows))]
impl HookBackend for DefaultHookBackend {
    fn install(&mut self, _handler: Box<dyn PointerEventHandler>) -> anyhow::Result<()> {
        Err(anyhow!("low-level mouse hooks are not supported on this platform"))
    }

    fn uninstall(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn is_installed(&self) -> bool {
        false
    }
}

#[derive(Clone, Default)]
pub struct MockHookBackend {
    state: Arc<MockHookState>,
}

#[derive(Default)]
struct MockHookState {
    install_count: AtomicUsize,
    uninstall_count: AtomicUsize,
    fail_install: AtomicBool,
    handler: Mutex<Option<Box<dyn PointerEventHandler>>>,
}

impl MockHookBackend {
    pub fn new() -> (Self, MockHookHandle) {
        let state = Arc::new(MockHookState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            MockHookHandle { state },
        )
    }
}

impl HookBackend for MockHookBackend {
    fn install(&mut self, handler: Box<dyn PointerEventHandler>) -> anyhow::Result<()> {
        if self.state.fail_install.load(Ordering::SeqCst) {
            return Err(anyhow!("hook installation refused"));
        }
        let mut guard = self.state.handler.lock().map_err(|_| anyhow!("lock"))?;
        if guard.is_none() {
            self.state.install_count.fetch_add(1, Ordering::SeqCst);
            *guard = Some(handler);
        }
        Ok(())
    }

    fn uninstall(&mut self) -> anyhow::Result<()> {
        let mut guard = self.state.handler.lock().map_err(|_| anyhow!("lock"))?;
        if guard.is_some() {
            self.state.uninstall_count.fetch_add(1, Ordering::SeqCst);
        }
        *guard = None;
        Ok(())
    }

    fn is_installed(&self) -> bool {
        match self.state.handler.lock() {
            Ok(guard) => guard.is_some(),
            Err(_) => false,
        }
    }
}

pub struct MockHookHandle {
    state: Arc<MockHookState>,
}

impl MockHookHandle {
    pub fn install_count(&self) -> usize {
        self.state.install_count.load(Ordering::SeqCst)
    }

    pub fn uninstall_count(&self) -> usize {
        self.state.uninstall_count.load(Ordering::SeqCst)
    }

    pub fn is_installed(&self) -> bool {
        match self.state.handler.lock() {
            Ok(guard) => guard.is_some(),
            Err(_) => false,
        }
    }

    pub fn set_fail_install(&self, fail: bool) {
        self.state.fail_install.store(fail, Ordering::SeqCst);
    }

    /// Feeds `event` to the installed handler. `None` when nothing is
    /// installed, otherwise whether the event was suppressed.
    pub fn emit(&self, event: RawPointerEvent) -> Option<bool> {
        match self.state.handler.lock() {
            Ok(mut guard) => guard.as_mut().map(|handler| handler.handle(event)),
            Err(_) => None,
        }
    }
}

#[cfg(windows)]
mod win_hook {
    use super::{announce_ready, ready_channel, should_ignore_event, HookBackend};
    use crate::scroll::engine::PointerEventHandler;
    use crate::scroll::geometry::Point;
    use crate::scroll::state::{PointerEventKind, RawPointerEvent};
    use anyhow::anyhow;
    use once_cell::sync::OnceCell;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{CallNextHookEx, HHOOK};

    struct HookThread {
        thread_id: u32,
        join: std::thread::JoinHandle<()>,
    }

    #[derive(Default)]
    pub struct DefaultHookBackend {
        hook_thread: Option<HookThread>,
    }

    impl HookBackend for DefaultHookBackend {
        fn install(&mut self, handler: Box<dyn PointerEventHandler>) -> anyhow::Result<()> {
            if self.hook_thread.is_some() {
                return Ok(());
            }

            hook_dispatch().set_handler(Some(handler));
            hook_dispatch().set_enabled(true);

            use std::time::Duration;
            use windows::Win32::System::LibraryLoader::GetModuleHandleW;
            use windows::Win32::System::Threading::GetCurrentThreadId;
            use windows::Win32::UI::WindowsAndMessaging::{
                DispatchMessageW, GetMessageW, PeekMessageW, SetWindowsHookExW, TranslateMessage,
                UnhookWindowsHookEx, MSG, PM_NOREMOVE, WH_MOUSE_LL,
            };

            // install() only returns once the hook thread is actually ready.
            let (ready_tx, ready_rx) = ready_channel();

            let join = std::thread::Builder::new()
                .name("scroll-hook".into())
                .spawn(move || {
                    // Ensure the thread has a message queue.
                    let mut msg = MSG::default();
                    unsafe {
                        let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
                    }

                    let thread_id = unsafe { GetCurrentThreadId() };

                    let hmodule = match unsafe { GetModuleHandleW(None) } {
                        Ok(h) => h,
                        Err(e) => {
                            let _ = ready_tx.send(Err(anyhow!(e)));
                            return;
                        }
                    };

                    let mouse_hook = match unsafe {
                        SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), hmodule, 0)
                    } {
                        Ok(h) if !h.0.is_null() => h,
                        Ok(_) => {
                            let _ = ready_tx.send(Err(anyhow!(windows::core::Error::from_win32())));
                            return;
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(anyhow!(e)));
                            return;
                        }
                    };

                    if !announce_ready(&ready_tx, thread_id) {
                        // install() timed out and returned; nobody could
                        // ever remove this hook.
                        unsafe {
                            let _ = UnhookWindowsHookEx(mouse_hook);
                        }
                        return;
                    }

                    // WH_MOUSE_LL callbacks are delivered through this loop.
                    loop {
                        let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                        if r.0 == 0 || r.0 == -1 {
                            break;
                        }
                        unsafe {
                            let _ = TranslateMessage(&msg);
                            DispatchMessageW(&msg);
                        }
                    }

                    unsafe {
                        let _ = UnhookWindowsHookEx(mouse_hook);
                    }
                })?;

            let thread_id = match ready_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(Ok(id)) => id,
                Ok(Err(err)) => {
                    hook_dispatch().set_enabled(false);
                    hook_dispatch().set_handler(None);
                    let _ = join.join();
                    return Err(err);
                }
                Err(_) => {
                    hook_dispatch().set_enabled(false);
                    hook_dispatch().set_handler(None);
                    // The late thread's announcement now fails, so it
                    // unhooks and exits on its own; joining could block.
                    drop(ready_rx);
                    drop(join);
                    return Err(anyhow!("hook thread did not signal readiness"));
                }
            };

            self.hook_thread = Some(HookThread { thread_id, join });
            Ok(())
        }

        fn uninstall(&mut self) -> anyhow::Result<()> {
            hook_dispatch().set_enabled(false);

            if let Some(th) = self.hook_thread.take() {
                use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};
                unsafe {
                    let _ = PostThreadMessageW(th.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
                }
                let _ = th.join.join();
            }

            hook_dispatch().set_handler(None);
            Ok(())
        }

        fn is_installed(&self) -> bool {
            self.hook_thread.is_some()
        }
    }

    struct HookDispatch {
        enabled: AtomicBool,
        handler: Mutex<Option<Box<dyn PointerEventHandler>>>,
    }

    impl HookDispatch {
        fn set_enabled(&self, enabled: bool) {
            self.enabled.store(enabled, Ordering::Release);
        }

        fn is_enabled(&self) -> bool {
            self.enabled.load(Ordering::Acquire)
        }

        fn set_handler(&self, handler: Option<Box<dyn PointerEventHandler>>) {
            if let Ok(mut guard) = self.handler.lock() {
                *guard = handler;
            }
        }

        /// Never waits: a busy handler means the event passes through.
        fn dispatch(&self, event: RawPointerEvent) -> bool {
            match self.handler.try_lock() {
                Ok(mut guard) => guard
                    .as_mut()
                    .map(|handler| handler.handle(event))
                    .unwrap_or(false),
                Err(_) => false,
            }
        }
    }

    static HOOK_DISPATCH: OnceCell<HookDispatch> = OnceCell::new();

    fn hook_dispatch() -> &'static HookDispatch {
        HOOK_DISPATCH.get_or_init(|| HookDispatch {
            enabled: AtomicBool::new(false),
            handler: Mutex::new(None),
        })
    }

    fn pass_on(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
        unsafe { CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param) }
    }

    unsafe extern "system" fn mouse_hook_proc(
        n_code: i32,
        w_param: WPARAM,
        l_param: LPARAM,
    ) -> LRESULT {
        use windows::Win32::UI::WindowsAndMessaging::{
            HC_ACTION, MSLLHOOKSTRUCT, WM_MOUSEMOVE, WM_XBUTTONDOWN, WM_XBUTTONUP,
        };

        if n_code != HC_ACTION as i32 {
            return pass_on(n_code, w_param, l_param);
        }

        let dispatch = hook_dispatch();
        if !dispatch.is_enabled() {
            return pass_on(n_code, w_param, l_param);
        }

        let info = &*(l_param.0 as *const MSLLHOOKSTRUCT);
        if should_ignore_event(info.dwExtraInfo) {
            return pass_on(n_code, w_param, l_param);
        }

        // High word of mouseData holds the XBUTTON index.
        let button = ((info.mouseData >> 16) & 0xFFFF) as u16;
        let kind = match w_param.0 as u32 {
            WM_MOUSEMOVE => PointerEventKind::Move,
            WM_XBUTTONDOWN => PointerEventKind::AuxButtonDown(button),
            WM_XBUTTONUP => PointerEventKind::AuxButtonUp(button),
            _ => return pass_on(n_code, w_param, l_param),
        };

        let event = RawPointerEvent {
            kind,
            pos: Point::new(info.pt.x, info.pt.y),
        };

        if dispatch.dispatch(event) {
            LRESULT(1)
        } else {
            pass_on(n_code, w_param, l_param)
        }
    }
}
