//! Output side of the engine: where interaction events go.
//!
//! The engine never knows who is listening.  It calls an
//! [`InteractionSink`] synchronously, and the host decides whether that
//! means a direct call, a queue or a channel.

use std::sync::mpsc::Sender;

use super::classifier::RawGesture;
use super::edge_scroll::ScrollDirection;

// ── Events ─────────────────────────────────────────────────

/// Events emitted by the interaction dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    /// The effective gesture changed.
    GestureChange {
        gesture: RawGesture,
        previous: RawGesture,
    },
    /// The index finger was just raised.
    IndexUp,
    /// An ok sign was just made.
    Ok,
    /// Open hand in the center band; `x` is the mirrored palm position.
    PositionUpdate { x: f64 },
    /// Open hand in an edge band (immediate or repeat).
    EdgeScroll { direction: ScrollDirection },
}

impl InteractionEvent {
    /// Event name for s-expression output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GestureChange { .. } => "gesture-change",
            Self::IndexUp => "index-up",
            Self::Ok => "ok",
            Self::PositionUpdate { .. } => "position-update",
            Self::EdgeScroll { .. } => "edge-scroll",
        }
    }
}

// ── Sink trait ─────────────────────────────────────────────

/// Receiver of engine output.  Every method defaults to a no-op, so a host
/// only implements the channels it cares about.
pub trait InteractionSink {
    fn on_gesture_change(&mut self, _gesture: RawGesture, _previous: RawGesture) {}
    fn on_index_up(&mut self) {}
    fn on_ok(&mut self) {}
    fn on_position_update(&mut self, _normalized_x: f64) {}
    fn on_edge_scroll(&mut self, _direction: ScrollDirection) {}

    /// Whether a gesture-change listener is registered.  The engine only
    /// dispatches, and only starts the debounce window, for registered
    /// listeners.
    fn handles_gesture_change(&self) -> bool {
        true
    }
    fn handles_index_up(&self) -> bool {
        true
    }
    fn handles_ok(&self) -> bool {
        true
    }

    /// Route an [`InteractionEvent`] to the matching method.
    fn emit(&mut self, event: InteractionEvent) {
        match event {
            InteractionEvent::GestureChange { gesture, previous } => {
                self.on_gesture_change(gesture, previous)
            }
            InteractionEvent::IndexUp => self.on_index_up(),
            InteractionEvent::Ok => self.on_ok(),
            InteractionEvent::PositionUpdate { x } => self.on_position_update(x),
            InteractionEvent::EdgeScroll { direction } => self.on_edge_scroll(direction),
        }
    }
}

impl<S: InteractionSink + ?Sized> InteractionSink for &mut S {
    fn on_gesture_change(&mut self, gesture: RawGesture, previous: RawGesture) {
        (**self).on_gesture_change(gesture, previous)
    }
    fn on_index_up(&mut self) {
        (**self).on_index_up()
    }
    fn on_ok(&mut self) {
        (**self).on_ok()
    }
    fn on_position_update(&mut self, normalized_x: f64) {
        (**self).on_position_update(normalized_x)
    }
    fn on_edge_scroll(&mut self, direction: ScrollDirection) {
        (**self).on_edge_scroll(direction)
    }
    fn handles_gesture_change(&self) -> bool {
        (**self).handles_gesture_change()
    }
    fn handles_index_up(&self) -> bool {
        (**self).handles_index_up()
    }
    fn handles_ok(&self) -> bool {
        (**self).handles_ok()
    }
}

impl<S: InteractionSink + ?Sized> InteractionSink for Box<S> {
    fn on_gesture_change(&mut self, gesture: RawGesture, previous: RawGesture) {
        (**self).on_gesture_change(gesture, previous)
    }
    fn on_index_up(&mut self) {
        (**self).on_index_up()
    }
    fn on_ok(&mut self) {
        (**self).on_ok()
    }
    fn on_position_update(&mut self, normalized_x: f64) {
        (**self).on_position_update(normalized_x)
    }
    fn on_edge_scroll(&mut self, direction: ScrollDirection) {
        (**self).on_edge_scroll(direction)
    }
    fn handles_gesture_change(&self) -> bool {
        (**self).handles_gesture_change()
    }
    fn handles_index_up(&self) -> bool {
        (**self).handles_index_up()
    }
    fn handles_ok(&self) -> bool {
        (**self).handles_ok()
    }
}

/// Records every event in order.
impl InteractionSink for Vec<InteractionEvent> {
    fn on_gesture_change(&mut self, gesture: RawGesture, previous: RawGesture) {
        self.push(InteractionEvent::GestureChange { gesture, previous });
    }
    fn on_index_up(&mut self) {
        self.push(InteractionEvent::IndexUp);
    }
    fn on_ok(&mut self) {
        self.push(InteractionEvent::Ok);
    }
    fn on_position_update(&mut self, normalized_x: f64) {
        self.push(InteractionEvent::PositionUpdate { x: normalized_x });
    }
    fn on_edge_scroll(&mut self, direction: ScrollDirection) {
        self.push(InteractionEvent::EdgeScroll { direction });
    }
}

/// Forwards events over a channel.  A hung-up receiver drops events.
impl InteractionSink for Sender<InteractionEvent> {
    fn on_gesture_change(&mut self, gesture: RawGesture, previous: RawGesture) {
        let _ = self.send(InteractionEvent::GestureChange { gesture, previous });
    }
    fn on_index_up(&mut self) {
        let _ = self.send(InteractionEvent::IndexUp);
    }
    fn on_ok(&mut self) {
        let _ = self.send(InteractionEvent::Ok);
    }
    fn on_position_update(&mut self, normalized_x: f64) {
        let _ = self.send(InteractionEvent::PositionUpdate { x: normalized_x });
    }
    fn on_edge_scroll(&mut self, direction: ScrollDirection) {
        let _ = self.send(InteractionEvent::EdgeScroll { direction });
    }
}

// ── Callback slots ─────────────────────────────────────────

type Slot<F> = Option<Box<F>>;

/// Five optional closures, one per output channel.
#[derive(Default)]
pub struct Callbacks {
    pub on_gesture_change: Slot<dyn FnMut(RawGesture, RawGesture)>,
    pub on_index_up: Slot<dyn FnMut()>,
    pub on_ok: Slot<dyn FnMut()>,
    pub on_position_update: Slot<dyn FnMut(f64)>,
    pub on_edge_scroll: Slot<dyn FnMut(ScrollDirection)>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture_change(mut self, f: impl FnMut(RawGesture, RawGesture) + 'static) -> Self {
        self.on_gesture_change = Some(Box::new(f));
        self
    }

    pub fn index_up(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_index_up = Some(Box::new(f));
        self
    }

    pub fn ok(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_ok = Some(Box::new(f));
        self
    }

    pub fn position_update(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.on_position_update = Some(Box::new(f));
        self
    }

    pub fn edge_scroll(mut self, f: impl FnMut(ScrollDirection) + 'static) -> Self {
        self.on_edge_scroll = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_gesture_change", &self.on_gesture_change.is_some())
            .field("on_index_up", &self.on_index_up.is_some())
            .field("on_ok", &self.on_ok.is_some())
            .field("on_position_update", &self.on_position_update.is_some())
            .field("on_edge_scroll", &self.on_edge_scroll.is_some())
            .finish()
    }
}

impl InteractionSink for Callbacks {
    fn on_gesture_change(&mut self, gesture: RawGesture, previous: RawGesture) {
        if let Some(f) = self.on_gesture_change.as_mut() {
            f(gesture, previous);
        }
    }
    fn on_index_up(&mut self) {
        if let Some(f) = self.on_index_up.as_mut() {
            f();
        }
    }
    fn on_ok(&mut self) {
        if let Some(f) = self.on_ok.as_mut() {
            f();
        }
    }
    fn on_position_update(&mut self, normalized_x: f64) {
        if let Some(f) = self.on_position_update.as_mut() {
            f(normalized_x);
        }
    }
    fn on_edge_scroll(&mut self, direction: ScrollDirection) {
        if let Some(f) = self.on_edge_scroll.as_mut() {
            f(direction);
        }
    }
    fn handles_gesture_change(&self) -> bool {
        self.on_gesture_change.is_some()
    }
    fn handles_index_up(&self) -> bool {
        self.on_index_up.is_some()
    }
    fn handles_ok(&self) -> bool {
        self.on_ok.is_some()
    }
}

// ── Tests ──────────────────────────────────────────────────
