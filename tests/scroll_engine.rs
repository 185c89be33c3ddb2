use std::sync::{Arc, Mutex};

use trackball_scroll::scroll::{
    drain_into, queue, ConfigSnapshot, CursorControl, DispatchStats, GestureState, InjectionSink,
    InputKind, InputRecord, LiveConfig, Point, PointerEventHandler, RawPointerEvent, ScrollEngine,
    WHEEL_DELTA,
};

const DISPLAY: Point = Point::new(640, 360);

#[derive(Default)]
struct RecordingCursor {
    warps: Mutex<Vec<Point>>,
}

impl RecordingCursor {
    fn warps(&self) -> Vec<Point> {
        self.warps.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl CursorControl for RecordingCursor {
    fn position(&self) -> Option<Point> {
        Some(DISPLAY)
    }

    fn warp(&self, to: Point) {
        if let Ok(mut guard) = self.warps.lock() {
            guard.push(to);
        }
    }
}

#[derive(Default)]
struct CollectSink {
    records: Mutex<Vec<InputRecord>>,
}

impl InjectionSink for CollectSink {
    fn inject(&self, batch: &[InputRecord]) -> anyhow::Result<()> {
        if let Ok(mut guard) = self.records.lock() {
            guard.extend_from_slice(batch);
        }
        Ok(())
    }
}

struct Harness {
    engine: ScrollEngine,
    live: Arc<LiveConfig>,
    cursor: Arc<RecordingCursor>,
    rx: std::sync::mpsc::Receiver<trackball_scroll::scroll::SynthesizedEvent>,
}

impl Harness {
    fn new(config: ConfigSnapshot) -> Self {
        let live = Arc::new(LiveConfig::new(config));
        let cursor = Arc::new(RecordingCursor::default());
        let (sender, rx) = queue();
        let engine = ScrollEngine::new(live.clone(), cursor.clone(), sender);
        Self {
            engine,
            live,
            cursor,
            rx,
        }
    }

    fn drain(&self) -> Vec<InputRecord> {
        let sink = CollectSink::default();
        drain_into(&self.rx, &sink, &DispatchStats::default());
        sink.records.into_inner().unwrap_or_default()
    }
}

#[test]
fn gesture_warps_cursor_and_queues_ticks() {
    let mut h = Harness::new(ConfigSnapshot::default());

    assert!(h.engine.handle(RawPointerEvent::aux_down(1, 100, 100)));
    assert!(matches!(
        h.engine.state(),
        GestureState::Armed {
            origin_display: DISPLAY,
            ..
        }
    ));
    assert!(h.cursor.warps().is_empty());

    assert!(h.engine.handle(RawPointerEvent::moved(112, 100)));
    assert_eq!(h.cursor.warps(), vec![DISPLAY]);

    let records = h.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, InputKind::HorizontalWheel);
    assert_eq!(records[0].magnitude, WHEEL_DELTA);

    assert!(h.engine.handle(RawPointerEvent::aux_up(1, 100, 100)));
    assert!(h.engine.state().is_idle());
}

#[test]
fn motion_against_pinned_cursor_accumulates() {
    let mut h = Harness::new(ConfigSnapshot::default());
    h.engine.handle(RawPointerEvent::aux_down(1, 100, 100));

    // The cursor never leaves (100, 100), so each sample is pin + motion.
    h.engine.handle(RawPointerEvent::moved(100, 106));
    assert!(h.drain().is_empty());
    h.engine.handle(RawPointerEvent::moved(100, 106));

    let records = h.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, InputKind::VerticalWheel);
    assert_eq!(records[0].magnitude, -WHEEL_DELTA);
}

#[test]
fn config_changes_apply_to_the_next_event() {
    let mut h = Harness::new(ConfigSnapshot::default());

    h.engine.handle(RawPointerEvent::aux_down(2, 5, 5));
    assert!(!h.engine.handle(RawPointerEvent::aux_up(2, 5, 5)));
    assert!(h.drain().is_empty());

    h.live.store(ConfigSnapshot {
        emulate_middle_click: true,
        ..ConfigSnapshot::default()
    });
    h.engine.handle(RawPointerEvent::aux_down(2, 5, 5));
    assert!(h.engine.handle(RawPointerEvent::aux_up(2, 5, 5)));

    let kinds: Vec<InputKind> = h.drain().iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![InputKind::MiddleDown, InputKind::MiddleUp]);
}

#[test]
fn drag_release_sends_no_middle_click() {
    let mut h = Harness::new(ConfigSnapshot {
        emulate_middle_click: true,
        ..ConfigSnapshot::default()
    });

    assert!(h.engine.handle(RawPointerEvent::aux_down(1, 100, 100)));
    assert!(h.engine.handle(RawPointerEvent::moved(103, 100)));
    assert!(h.engine.handle(RawPointerEvent::aux_up(1, 100, 100)));
    assert!(h.engine.state().is_idle());

    let records = h.drain();
    assert!(!records
        .iter()
        .any(|r| matches!(r.kind, InputKind::MiddleDown | InputKind::MiddleUp)));
    assert!(records.is_empty());
}

#[test]
fn idle_moves_pass_through_untouched() {
    let mut h = Harness::new(ConfigSnapshot::default());
    assert!(!h.engine.handle(RawPointerEvent::moved(300, 300)));
    assert!(h.cursor.warps().is_empty());
    assert!(h.drain().is_empty());
}

#[test]
fn stopped_dispatcher_does_not_break_the_hook() {
    let (sender, rx) = queue();
    drop(rx);
    let mut engine = ScrollEngine::new(
        Arc::new(LiveConfig::default()),
        Arc::new(RecordingCursor::default()),
        sender,
    );

    engine.handle(RawPointerEvent::aux_down(1, 0, 0));
    assert!(engine.handle(RawPointerEvent::moved(40, 0)));
    assert!(matches!(engine.state(), GestureState::Scrolling { .. }));
}
