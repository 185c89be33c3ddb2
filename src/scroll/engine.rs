use crate::scroll::config::LiveConfig;
use crate::scroll::dispatcher::DispatchSender;
use crate::scroll::geometry::{MotionUnwarp, Point};
use crate::scroll::state::{process, GestureState, PointerEventKind, RawPointerEvent};
use std::sync::Arc;

/// Display cursor access needed while a gesture pins the pointer.
pub trait CursorControl: Send + Sync {
    fn position(&self) -> Option<Point>;
    fn warp(&self, to: Point);
}

/// Cursor control for platforms without a pointer to move.
#[derive(Debug, Default)]
pub struct NullCursor;

impl CursorControl for NullCursor {
    fn position(&self) -> Option<Point> {
        None
    }

    fn warp(&self, _to: Point) {}
}

/// Receives every raw pointer event on the hook thread.
pub trait PointerEventHandler: Send {
    /// Returns `true` when the original event must be swallowed.
    fn handle(&mut self, event: RawPointerEvent) -> bool;
}

/// Drives the gesture state machine from the hook callback.
pub struct ScrollEngine {
    state: GestureState,
    unwarp: Option<MotionUnwarp>,
    config: Arc<LiveConfig>,
    cursor: Arc<dyn CursorControl>,
    sender: DispatchSender,
}

impl ScrollEngine {
    pub fn new(
        config: Arc<LiveConfig>,
        cursor: Arc<dyn CursorControl>,
        sender: DispatchSender,
    ) -> Self {
        Self {
            state: GestureState::Idle,
            unwarp: None,
            config,
            cursor,
            sender,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Moves arrive relative to the pinned cursor; give the state machine the
    /// continuous path instead.
    fn translate(&mut self, event: RawPointerEvent) -> RawPointerEvent {
        match (event.kind, self.unwarp.as_mut()) {
            (PointerEventKind::Move, Some(unwarp)) => RawPointerEvent {
                kind: event.kind,
                pos: unwarp.apply(event.pos),
            },
            _ => event,
        }
    }
}

impl PointerEventHandler for ScrollEngine {
    fn handle(&mut self, event: RawPointerEvent) -> bool {
        let config = self.config.load();
        let translated = self.translate(event);
        let cursor = &self.cursor;
        let transition = process(self.state, &translated, &config, || {
            cursor.position().unwrap_or(event.pos)
        });

        if let Some(to) = transition.warp_to {
            self.cursor.warp(to);
        }

        if let Some(emit) = transition.emit {
            if !self.sender.enqueue(emit) {
                tracing::debug!("dispatcher stopped; dropping synthesized input");
            }
        }

        match transition.next {
            GestureState::Idle => self.unwarp = None,
            GestureState::Armed { origin, .. } => {
                if matches!(event.kind, PointerEventKind::AuxButtonDown(_)) {
                    self.unwarp = Some(MotionUnwarp::new(origin));
                }
            }
            GestureState::Scrolling { .. } => {}
        }

        if std::mem::discriminant(&self.state) != std::mem::discriminant(&transition.next) {
            tracing::debug!(from = ?self.state, to = ?transition.next, "gesture transition");
        }
        self.state = transition.next;
        transition.suppress
    }
}
