use std::ops::{Add, Sub};

/// Displacement in pixels an axis has to exceed before a wheel tick fires.
pub const SCROLL_THRESHOLD_PX: i32 = 10;

/// One wheel notch as defined by the OS (`WHEEL_DELTA`).
pub const WHEEL_DELTA: i32 = 120;

/// Integer screen position, in whatever coordinate space produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from(value: (i32, i32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

/// True once `accum` is strictly beyond the threshold in either direction.
pub fn exceeds_threshold(accum: i32) -> bool {
    accum.unsigned_abs() > SCROLL_THRESHOLD_PX as u32
}

/// Wheel delta for one tick in the direction of `accum`.
pub fn tick_delta(accum: i32) -> i32 {
    if accum > 0 {
        WHEEL_DELTA
    } else {
        -WHEEL_DELTA
    }
}

/// Rebuilds a continuous pointer path while the cursor is held in place.
///
/// When move events are suppressed the OS cursor never leaves the pinned
/// point, so each raw sample is `pinned + motion_since_last_sample`. Summing
/// those offsets yields the position the pointer would have reached, which is
/// what the gesture state machine expects to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionUnwarp {
    pinned: Point,
    virtual_pos: Point,
}

impl MotionUnwarp {
    pub fn new(pinned: Point) -> Self {
        Self {
            pinned,
            virtual_pos: pinned,
        }
    }

    pub fn apply(&mut self, raw: Point) -> Point {
        self.virtual_pos = self.virtual_pos + (raw - self.pinned);
        self.virtual_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        assert!(!exceeds_threshold(10));
        assert!(!exceeds_threshold(-10));
        assert!(exceeds_threshold(11));
        assert!(exceeds_threshold(-11));
    }

    #[test]
    fn unwarp_accumulates_offsets_from_pin() {
        let mut unwarp = MotionUnwarp::new(Point::new(100, 100));
        assert_eq!(unwarp.apply(Point::new(104, 99)), Point::new(104, 99));
        assert_eq!(unwarp.apply(Point::new(104, 99)), Point::new(108, 98));
        assert_eq!(unwarp.apply(Point::new(100, 100)), Point::new(108, 98));
    }
}
