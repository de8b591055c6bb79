//! Edge-scroll repeat timer.
//!
//! While an open hand rests near the left or right edge of the camera view
//! the carousel scrolls repeatedly in that direction.  The timer is a plain
//! owned value: the host calls [`EdgeScroller::poll`] from its own scheduler
//! and cancellation is immediate.  At most one timer exists at a time.

use tracing::debug;

/// Scroll direction requested by an edge band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Left,
    Right,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Horizontal zone of a mirrored palm position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeZone {
    Left,
    Center,
    Right,
}

impl EdgeZone {
    /// Bands are inclusive: `x <= threshold` is left, `x >= 1 - threshold`
    /// is right, everything strictly between is center.
    pub fn classify(normalized_x: f64, threshold: f64) -> Self {
        if normalized_x <= threshold {
            Self::Left
        } else if normalized_x >= 1.0 - threshold {
            Self::Right
        } else {
            Self::Center
        }
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        match self {
            Self::Left => Some(ScrollDirection::Left),
            Self::Right => Some(ScrollDirection::Right),
            Self::Center => None,
        }
    }
}

/// A running repeat timer.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeScrollTimer {
    pub direction: ScrollDirection,
    /// When the timer was started (ms).
    pub started_ms: f64,
    /// Next repeat deadline (ms).
    pub next_fire_ms: f64,
    /// Repeats fired so far, excluding the immediate one.
    pub repeats: u64,
}

/// Owner of the single edge-scroll timer slot.
#[derive(Debug, Clone)]
pub struct EdgeScroller {
    timer: Option<EdgeScrollTimer>,
    /// Repeat period (ms).
    pub interval_ms: f64,
}

impl EdgeScroller {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            timer: None,
            interval_ms,
        }
    }

    /// Request scrolling in `direction`.
    ///
    /// Returns `Some(direction)` when a new timer was started and the caller
    /// must fire the immediate scroll.  Requesting the direction that is
    /// already running is a no-op; a different direction replaces the old
    /// timer.
    pub fn start(&mut self, direction: ScrollDirection, now_ms: f64) -> Option<ScrollDirection> {
        if self.direction() == Some(direction) {
            return None;
        }
        self.stop();
        debug!("Edge scroll started: {}", direction.as_str());
        self.timer = Some(EdgeScrollTimer {
            direction,
            started_ms: now_ms,
            next_fire_ms: now_ms + self.interval_ms,
            repeats: 0,
        });
        Some(direction)
    }

    /// Cancel the running timer.  Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                debug!(
                    "Edge scroll stopped: {} after {} repeats",
                    timer.direction.as_str(),
                    timer.repeats
                );
                true
            }
            None => false,
        }
    }

    /// Fire at most one due repeat.
    ///
    /// A host that polls late does not get a burst of catch-up repeats; the
    /// next deadline is re-anchored to `now_ms` instead.
    pub fn poll(&mut self, now_ms: f64) -> Option<ScrollDirection> {
        let interval = self.interval_ms;
        let timer = self.timer.as_mut()?;
        if now_ms < timer.next_fire_ms {
            return None;
        }
        timer.repeats += 1;
        timer.next_fire_ms += interval;
        if timer.next_fire_ms <= now_ms {
            timer.next_fire_ms = now_ms + interval;
        }
        Some(timer.direction)
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.timer.as_ref().map(|t| t.direction)
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// When the host should next call [`poll`](Self::poll).
    pub fn next_deadline(&self) -> Option<f64> {
        self.timer.as_ref().map(|t| t.next_fire_ms)
    }

    pub fn timer(&self) -> Option<&EdgeScrollTimer> {
        self.timer.as_ref()
    }
}

// ── Tests ──────────────────────────────────────────────────
