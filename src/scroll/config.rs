use std::sync::atomic::{AtomicU8, Ordering};

/// Auxiliary (back/forward) pointer buttons that can start a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuxButton {
    X1,
    X2,
}

impl AuxButton {
    /// Maps the OS button index (`XBUTTON1 = 1`, `XBUTTON2 = 2`).
    pub fn from_index(index: u16) -> Option<Self> {
        match index {
            1 => Some(AuxButton::X1),
            2 => Some(AuxButton::X2),
            _ => None,
        }
    }
}

/// Options read by the state machine on every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub use_aux_button1: bool,
    pub use_aux_button2: bool,
    pub prefer_single_axis: bool,
    pub emulate_middle_click: bool,
    pub reverse_vertical_scroll: bool,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            use_aux_button1: true,
            use_aux_button2: true,
            prefer_single_axis: false,
            emulate_middle_click: false,
            reverse_vertical_scroll: false,
        }
    }
}

const USE_X1: u8 = 1 << 0;
const USE_X2: u8 = 1 << 1;
const PREFER_AXIS: u8 = 1 << 2;
const EMULATE_MIDDLE: u8 = 1 << 3;
const REVERSE_VERTICAL: u8 = 1 << 4;

impl ConfigSnapshot {
    pub fn is_trigger(&self, button: AuxButton) -> bool {
        match button {
            AuxButton::X1 => self.use_aux_button1,
            AuxButton::X2 => self.use_aux_button2,
        }
    }

    /// Re-enables aux button 1 when no trigger button is left enabled.
    pub fn normalized(mut self) -> Self {
        if !self.use_aux_button1 && !self.use_aux_button2 {
            tracing::warn!("no trigger button enabled; re-enabling aux button 1");
            self.use_aux_button1 = true;
        }
        self
    }

    fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.use_aux_button1 {
            bits |= USE_X1;
        }
        if self.use_aux_button2 {
            bits |= USE_X2;
        }
        if self.prefer_single_axis {
            bits |= PREFER_AXIS;
        }
        if self.emulate_middle_click {
            bits |= EMULATE_MIDDLE;
        }
        if self.reverse_vertical_scroll {
            bits |= REVERSE_VERTICAL;
        }
        bits
    }

    fn from_bits(bits: u8) -> Self {
        Self {
            use_aux_button1: bits & USE_X1 != 0,
            use_aux_button2: bits & USE_X2 != 0,
            prefer_single_axis: bits & PREFER_AXIS != 0,
            emulate_middle_click: bits & EMULATE_MIDDLE != 0,
            reverse_vertical_scroll: bits & REVERSE_VERTICAL != 0,
        }
    }
}

/// Configuration shared between the shell and the hook thread.
///
/// Stored as a single byte so the hook callback can take a consistent
/// snapshot without ever waiting on a lock.
#[derive(Debug)]
pub struct LiveConfig {
    bits: AtomicU8,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self::new(ConfigSnapshot::default())
    }
}

impl LiveConfig {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            bits: AtomicU8::new(snapshot.normalized().to_bits()),
        }
    }

    pub fn load(&self) -> ConfigSnapshot {
        ConfigSnapshot::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn store(&self, snapshot: ConfigSnapshot) {
        self.bits
            .store(snapshot.normalized().to_bits(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_round_trip_every_flag() {
        let snapshot = ConfigSnapshot {
            use_aux_button1: false,
            use_aux_button2: true,
            prefer_single_axis: true,
            emulate_middle_click: false,
            reverse_vertical_scroll: true,
        };
        assert_eq!(ConfigSnapshot::from_bits(snapshot.to_bits()), snapshot);
    }

    #[test]
    fn live_config_never_stores_without_trigger() {
        let live = LiveConfig::default();
        live.store(ConfigSnapshot {
            use_aux_button1: false,
            use_aux_button2: false,
            ..ConfigSnapshot::default()
        });
        let loaded = live.load();
        assert!(loaded.use_aux_button1 || loaded.use_aux_button2);
    }

    #[test]
    fn unknown_button_index_is_not_mapped() {
        assert_eq!(AuxButton::from_index(0), None);
        assert_eq!(AuxButton::from_index(3), None);
        assert_eq!(AuxButton::from_index(2), Some(AuxButton::X2));
    }
}
