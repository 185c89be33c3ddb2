//! Gesture interpretation.
//!
//! [`process`] is a pure transition function: it never touches the OS, so the
//! whole press/move/release grammar can be driven from plain unit tests. The
//! hook shell owns the current [`GestureState`] and performs the side effects
//! a [`Transition`] asks for.

use crate::scroll::config::{AuxButton, ConfigSnapshot};
use crate::scroll::geometry::{exceeds_threshold, tick_delta, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Move,
    /// Aux button pressed; carries the raw OS button index.
    AuxButtonDown(u16),
    AuxButtonUp(u16),
}

/// One low-level pointer message, positioned in raw OS coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPointerEvent {
    pub kind: PointerEventKind,
    pub pos: Point,
}

impl RawPointerEvent {
    pub fn moved(x: i32, y: i32) -> Self {
        Self {
            kind: PointerEventKind::Move,
            pos: Point::new(x, y),
        }
    }

    pub fn aux_down(button: u16, x: i32, y: i32) -> Self {
        Self {
            kind: PointerEventKind::AuxButtonDown(button),
            pos: Point::new(x, y),
        }
    }

    pub fn aux_up(button: u16, x: i32, y: i32) -> Self {
        Self {
            kind: PointerEventKind::AuxButtonUp(button),
            pos: Point::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Trigger held, no movement yet.
    Armed {
        trigger: AuxButton,
        origin: Point,
        origin_display: Point,
    },
    /// Trigger held and moving. The accumulators hold displacement since the
    /// last tick on each axis.
    Scrolling {
        trigger: AuxButton,
        origin: Point,
        origin_display: Point,
        x_accum: i32,
        y_accum: i32,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    MiddleDown,
    MiddleUp,
    HorizontalWheel,
    VerticalWheel,
}

/// A single primitive input to synthesize.
///
/// For wheel records `magnitude` follows the OS convention: positive scrolls
/// up (vertical) or right (horizontal). Button records carry zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRecord {
    pub kind: InputKind,
    pub magnitude: i32,
    pub pos: Point,
}

/// An ordered, non-empty group of records that must be injected together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedEvent {
    records: Vec<InputRecord>,
}

impl SynthesizedEvent {
    /// Returns `None` for an empty record list.
    pub fn new(records: Vec<InputRecord>) -> Option<Self> {
        if records.is_empty() {
            None
        } else {
            Some(Self { records })
        }
    }

    pub fn middle_click(pos: Point) -> Self {
        Self {
            records: vec![
                InputRecord {
                    kind: InputKind::MiddleDown,
                    magnitude: 0,
                    pos,
                },
                InputRecord {
                    kind: InputKind::MiddleUp,
                    magnitude: 0,
                    pos,
                },
            ],
        }
    }

    pub fn records(&self) -> &[InputRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<InputRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Outcome of feeding one event to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: GestureState,
    /// Whether the original event must be swallowed.
    pub suppress: bool,
    pub emit: Option<SynthesizedEvent>,
    /// Display position the cursor should be moved back to.
    pub warp_to: Option<Point>,
}

impl Transition {
    fn pass(next: GestureState) -> Self {
        Self {
            next,
            suppress: false,
            emit: None,
            warp_to: None,
        }
    }

    fn swallow(next: GestureState) -> Self {
        Self {
            next,
            suppress: true,
            emit: None,
            warp_to: None,
        }
    }
}

fn trigger_for(button: u16, config: &ConfigSnapshot) -> Option<AuxButton> {
    AuxButton::from_index(button).filter(|b| config.is_trigger(*b))
}

fn releases(trigger: AuxButton, button: u16) -> bool {
    AuxButton::from_index(button) == Some(trigger)
}

/// Computes the next gesture state for `event`.
///
/// `display_cursor` is only called when a gesture starts, to capture the
/// cursor position in display coordinates alongside the raw origin.
pub fn process<F>(
    state: GestureState,
    event: &RawPointerEvent,
    config: &ConfigSnapshot,
    display_cursor: F,
) -> Transition
where
    F: FnOnce() -> Point,
{
    match (state, event.kind) {
        (_, PointerEventKind::AuxButtonDown(button)) => match trigger_for(button, config) {
            // A press while a gesture is live means the release was lost;
            // start over from the new position.
            Some(trigger) => Transition::swallow(GestureState::Armed {
                trigger,
                origin: event.pos,
                origin_display: display_cursor(),
            }),
            None => Transition::pass(state),
        },
        (GestureState::Idle, _) => Transition::pass(GestureState::Idle),
        (GestureState::Armed { trigger, .. }, PointerEventKind::AuxButtonUp(button))
            if releases(trigger, button) =>
        {
            if config.emulate_middle_click {
                Transition {
                    next: GestureState::Idle,
                    suppress: true,
                    emit: Some(SynthesizedEvent::middle_click(event.pos)),
                    warp_to: None,
                }
            } else {
                Transition::pass(GestureState::Idle)
            }
        }
        (GestureState::Scrolling { trigger, .. }, PointerEventKind::AuxButtonUp(button))
            if releases(trigger, button) =>
        {
            Transition::swallow(GestureState::Idle)
        }
        (_, PointerEventKind::AuxButtonUp(_)) => Transition::pass(state),
        (
            GestureState::Armed {
                trigger,
                origin,
                origin_display,
            },
            PointerEventKind::Move,
        ) => scroll_step(trigger, origin, origin_display, 0, 0, event.pos, config),
        (
            GestureState::Scrolling {
                trigger,
                origin,
                origin_display,
                x_accum,
                y_accum,
            },
            PointerEventKind::Move,
        ) => scroll_step(
            trigger,
            origin,
            origin_display,
            x_accum,
            y_accum,
            event.pos,
            config,
        ),
    }
}

fn scroll_step(
    trigger: AuxButton,
    origin: Point,
    origin_display: Point,
    x_accum: i32,
    y_accum: i32,
    pos: Point,
    config: &ConfigSnapshot,
) -> Transition {
    let delta = pos - origin;
    let mut x = x_accum.saturating_add(delta.x);
    let mut y = y_accum.saturating_add(delta.y);
    let mut records = Vec::new();

    if exceeds_threshold(x) {
        records.push(InputRecord {
            kind: InputKind::HorizontalWheel,
            magnitude: tick_delta(x),
            pos,
        });
        x = 0;
        if config.prefer_single_axis {
            y = 0;
        }
    }

    if exceeds_threshold(y) {
        // Screen y grows downwards while a positive wheel delta scrolls up.
        let magnitude = if config.reverse_vertical_scroll {
            tick_delta(y)
        } else {
            -tick_delta(y)
        };
        records.push(InputRecord {
            kind: InputKind::VerticalWheel,
            magnitude,
            pos,
        });
        y = 0;
        if config.prefer_single_axis {
            x = 0;
        }
    }

    Transition {
        next: GestureState::Scrolling {
            trigger,
            origin: pos,
            origin_display,
            x_accum: x,
            y_accum: y,
        },
        suppress: true,
        emit: SynthesizedEvent::new(records),
        warp_to: Some(origin_display),
    }
}
