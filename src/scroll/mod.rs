pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod geometry;
pub mod hook;
pub mod service;
pub mod state;
#[cfg(windows)]
pub mod win;

pub use config::{AuxButton, ConfigSnapshot, LiveConfig};
pub use dispatcher::{
    drain_into, queue, DispatchPolicy, DispatchSender, DispatchStats, Dispatcher,
    DispatcherConfig, InjectionSink,
};
pub use engine::{CursorControl, NullCursor, PointerEventHandler, ScrollEngine};
pub use geometry::{MotionUnwarp, Point, SCROLL_THRESHOLD_PX, WHEEL_DELTA};
pub use hook::{
    should_ignore_event, DefaultHookBackend, HookBackend, MockHookBackend, MockHookHandle,
    INJECT_TAG,
};
pub use service::ScrollService;
pub use state::{
    process, GestureState, InputKind, InputRecord, PointerEventKind, RawPointerEvent,
    SynthesizedEvent, Transition,
};
