use crate::scroll::config::ConfigSnapshot;
use crate::scroll::dispatcher::{DispatchPolicy, DispatcherConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";

const MIN_DISPATCH_INTERVAL_MS: u64 = 1;
const MAX_DISPATCH_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Start a scroll gesture with aux button 1 (back).
    #[serde(default = "default_true")]
    pub use_x1: bool,
    /// Start a scroll gesture with aux button 2 (forward).
    #[serde(default = "default_true")]
    pub use_x2: bool,
    /// Once one axis scrolls, drop the other axis' pending motion.
    #[serde(default)]
    pub prefer_axis: bool,
    /// Send a middle click when the trigger is released without moving.
    #[serde(default)]
    pub emulate_middle_button: bool,
    #[serde(default)]
    pub reverse_vertical_scroll: bool,
    /// How often queued wheel input is flushed to the OS.
    #[serde(default = "default_dispatch_interval_ms")]
    pub dispatch_interval_ms: u64,
    #[serde(default)]
    pub dispatch_policy: DispatchPolicy,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving a copy of the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_dispatch_interval_ms() -> u64 {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_x1: true,
            use_x2: true,
            prefer_axis: false,
            emulate_middle_button: false,
            reverse_vertical_scroll: false,
            dispatch_interval_ms: default_dispatch_interval_ms(),
            dispatch_policy: DispatchPolicy::default(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl Settings {
    /// `settings.json` in the per-user config directory, or the working
    /// directory when none is known.
    pub fn default_path() -> PathBuf {
        dirs_next::config_dir()
            .map(|dir| dir.join("trackball_scroll").join(SETTINGS_FILE))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings.normalized())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// At least one trigger button stays enabled and the dispatch interval
    /// stays within bounds.
    pub fn normalized(mut self) -> Self {
        if !self.use_x1 && !self.use_x2 {
            tracing::warn!("settings disable both trigger buttons; enabling aux button 1");
            self.use_x1 = true;
        }
        self.dispatch_interval_ms = self
            .dispatch_interval_ms
            .clamp(MIN_DISPATCH_INTERVAL_MS, MAX_DISPATCH_INTERVAL_MS);
        self
    }

    pub fn toggle_use_x1(&mut self) {
        self.use_x1 = !self.use_x1;
        if !self.use_x1 && !self.use_x2 {
            self.use_x2 = true;
        }
    }

    pub fn toggle_use_x2(&mut self) {
        self.use_x2 = !self.use_x2;
        if !self.use_x1 && !self.use_x2 {
            self.use_x1 = true;
        }
    }

    pub fn config_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            use_aux_button1: self.use_x1,
            use_aux_button2: self.use_x2,
            prefer_single_axis: self.prefer_axis,
            emulate_middle_click: self.emulate_middle_button,
            reverse_vertical_scroll: self.reverse_vertical_scroll,
        }
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            interval: Duration::from_millis(
                self.dispatch_interval_ms
                    .clamp(MIN_DISPATCH_INTERVAL_MS, MAX_DISPATCH_INTERVAL_MS),
            ),
            policy: self.dispatch_policy,
        }
    }
}
