use crate::scroll::config::LiveConfig;
use crate::scroll::dispatcher::{DispatchStats, Dispatcher, InjectionSink};
use crate::scroll::engine::{CursorControl, ScrollEngine};
use crate::scroll::hook::{DefaultHookBackend, HookBackend};
use crate::settings::Settings;
use std::sync::Arc;

#[cfg(windows)]
fn default_sink() -> Arc<dyn InjectionSink> {
    Arc::new(crate::scroll::win::SendInputSink)
}

#[cfg(not(windows))]
fn default_sink() -> Arc<dyn InjectionSink> {
    Arc::new(UnsupportedSink)
}

#[cfg(windows)]
fn default_cursor() -> Arc<dyn CursorControl> {
    Arc::new(crate::scroll::win::SystemCursor)
}

#[cfg(not(windows))]
fn default_cursor() -> Arc<dyn CursorControl> {
    Arc::new(crate::scroll::engine::NullCursor)
}

#[cfg(not(windows))]
#[derive(Debug)]
struct UnsupportedSink;

#[cfg(not(windows))]
impl InjectionSink for UnsupportedSink {
    fn inject(&self, _batch: &[crate::scroll::state::InputRecord]) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("input injection is not supported on this platform"))
    }
}

/// Owns the hook subscription and the dispatcher behind it.
///
/// `start`/`stop` double as resume/pause: stopping removes the hook entirely
/// rather than ignoring events.
pub struct ScrollService {
    settings: Settings,
    live: Arc<LiveConfig>,
    backend: Box<dyn HookBackend>,
    sink: Arc<dyn InjectionSink>,
    cursor: Arc<dyn CursorControl>,
    dispatcher: Option<Dispatcher>,
}

impl Default for ScrollService {
    fn default() -> Self {
        Self::new_with_backend(Box::new(DefaultHookBackend::default()))
    }
}

impl ScrollService {
    pub fn new_with_backend(backend: Box<dyn HookBackend>) -> Self {
        Self::new_with_parts(backend, default_sink(), default_cursor())
    }

    pub fn new_with_parts(
        backend: Box<dyn HookBackend>,
        sink: Arc<dyn InjectionSink>,
        cursor: Arc<dyn CursorControl>,
    ) -> Self {
        let settings = Settings::default();
        Self {
            live: Arc::new(LiveConfig::new(settings.config_snapshot())),
            settings,
            backend,
            sink,
            cursor,
            dispatcher: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn live_config(&self) -> Arc<LiveConfig> {
        Arc::clone(&self.live)
    }

    pub fn is_running(&self) -> bool {
        self.backend.is_installed()
    }

    pub fn stats(&self) -> Option<Arc<DispatchStats>> {
        self.dispatcher.as_ref().map(Dispatcher::stats)
    }

    /// Installs the hook. Fails when the OS refuses the subscription.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.backend.is_installed() {
            return Ok(());
        }

        if self.dispatcher.is_none() {
            let dispatcher =
                Dispatcher::spawn(Arc::clone(&self.sink), self.settings.dispatcher_config())?;
            self.dispatcher = Some(dispatcher);
        }
        let sender = match self.dispatcher.as_ref() {
            Some(dispatcher) => dispatcher.sender(),
            None => return Err(anyhow::anyhow!("dispatcher unavailable")),
        };

        let engine = ScrollEngine::new(Arc::clone(&self.live), Arc::clone(&self.cursor), sender);
        if let Err(err) = self.backend.install(Box::new(engine)) {
            tracing::error!(?err, "failed to install mouse hook");
            return Err(err.context("failed to install mouse hook"));
        }
        tracing::info!("mouse hook installed");
        Ok(())
    }

    /// Removes the hook. The dispatcher keeps running for a later `start`.
    pub fn stop(&mut self) {
        if !self.backend.is_installed() {
            return;
        }
        if let Err(err) = self.backend.uninstall() {
            tracing::error!(?err, "failed to uninstall mouse hook");
            return;
        }
        tracing::info!("mouse hook removed");
    }

    /// Applies new settings. Gesture options take effect on the next event;
    /// a changed dispatch schedule restarts the dispatcher.
    pub fn update_settings(&mut self, settings: Settings) -> anyhow::Result<()> {
        let settings = settings.normalized();
        self.live.store(settings.config_snapshot());

        let reschedule = self
            .dispatcher
            .as_ref()
            .is_some_and(|d| d.config() != settings.dispatcher_config());
        self.settings = settings;

        if reschedule {
            let was_running = self.is_running();
            self.stop();
            if let Some(mut dispatcher) = self.dispatcher.take() {
                dispatcher.shutdown();
            }
            if was_running {
                self.start()?;
            }
        }
        Ok(())
    }

    /// Removes the hook and flushes the dispatcher.
    pub fn shutdown(&mut self) {
        self.stop();
        if let Some(mut dispatcher) = self.dispatcher.take() {
            dispatcher.shutdown();
        }
    }
}

impl Drop for ScrollService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
