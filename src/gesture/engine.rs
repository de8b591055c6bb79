//! Interaction dispatcher: the per-frame entry point.
//!
//! [`GestureEngine`] runs the whole pipeline for one frame (features, raw
//! label, majority vote) and turns the effective label plus palm position
//! into sink calls: one-shot triggers, position updates, gesture changes and
//! edge-scroll repeats.  Repeats are host-driven through [`GestureEngine::tick`].

use tracing::{debug, info, warn};

use super::classifier::{classify, RawGesture};
use super::edge_scroll::{EdgeScroller, EdgeZone, ScrollDirection};
use super::features::{extract_features, HandFeatures};
use super::landmarks::FrameSample;
use super::sink::InteractionSink;
use super::stabilizer::{GestureHistory, DEFAULT_HISTORY_SIZE, DEFAULT_STABLE_MIN};

// ── Configuration ──────────────────────────────────────────

/// Engine tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Frames in the majority-vote window.
    pub history_size: usize,
    /// Minimum votes for the window majority to win.
    pub stable_min: usize,
    /// Minimum time (ms) between dispatched events.
    pub debounce_ms: f64,
    /// Width of each edge band in mirrored x.
    pub edge_threshold: f64,
    /// Edge-scroll repeat period (ms).
    pub edge_scroll_interval_ms: f64,
    /// Record a [`DebugFrame`] for every processed frame.
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            stable_min: DEFAULT_STABLE_MIN,
            debounce_ms: 400.0,
            edge_threshold: 0.18,
            edge_scroll_interval_ms: 200.0,
            debug: false,
        }
    }
}

// ── Debug snapshot ─────────────────────────────────────────

/// Per-frame classification detail, kept only in debug mode.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugFrame {
    pub raw: RawGesture,
    /// Window majority, if it reached the vote threshold.
    pub stable: Option<RawGesture>,
    pub effective: RawGesture,
    pub features: HandFeatures,
    /// Share of the window holding the raw label.
    pub confidence: f64,
}

/// Engine state as seen by a debugging host.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    /// Last recorded frame; `None` until a frame is processed in debug mode.
    pub frame: Option<DebugFrame>,
    pub current: RawGesture,
    pub previous: RawGesture,
    pub history: Vec<RawGesture>,
}

// ── Engine ─────────────────────────────────────────────────

/// Gesture recognition engine delivering events to an owned sink.
pub struct GestureEngine<S: InteractionSink> {
    config: EngineConfig,
    history: GestureHistory,
    current: RawGesture,
    previous: RawGesture,
    /// Time of the last dispatched event; `None` lets the first event through.
    last_event_ms: Option<f64>,
    scroller: EdgeScroller,
    /// Palm center (landmark 9) of the last processed frame.
    hand_position: (f64, f64),
    last_debug: Option<DebugFrame>,
    frames_processed: u64,
    disposed: bool,
    sink: S,
}

impl<S: InteractionSink> GestureEngine<S> {
    /// Create an engine with default tunables.
    pub fn new(sink: S) -> Self {
        Self::with_config(EngineConfig::default(), sink)
    }

    pub fn with_config(config: EngineConfig, sink: S) -> Self {
        info!(
            history_size = config.history_size,
            stable_min = config.stable_min,
            debounce_ms = config.debounce_ms,
            "Gesture engine created"
        );
        Self {
            history: GestureHistory::new(config.history_size, config.stable_min),
            scroller: EdgeScroller::new(config.edge_scroll_interval_ms),
            config,
            current: RawGesture::None,
            previous: RawGesture::None,
            last_event_ms: None,
            hand_position: (0.5, 0.5),
            last_debug: None,
            frames_processed: 0,
            disposed: false,
            sink,
        }
    }

    /// Process one estimator callback.
    ///
    /// `None` means no hand was detected: nothing is recorded and every
    /// piece of state, including a running edge-scroll timer, is left as is.
    pub fn process(&mut self, frame: Option<&FrameSample>, now_ms: f64) {
        if self.disposed {
            return;
        }
        let Some(frame) = frame else {
            return;
        };

        let palm = frame.palm_center();
        self.hand_position = (palm.x, palm.y);
        self.frames_processed += 1;

        let features = extract_features(frame);
        let raw = classify(&features, frame);
        let effective = self.history.push(raw);

        if self.config.debug {
            self.last_debug = Some(DebugFrame {
                raw,
                stable: self.history.stable(),
                effective,
                confidence: self.history.confidence(raw),
                features,
            });
        }

        self.dispatch(effective, 1.0 - palm.x, now_ms);
    }

    fn dispatch(&mut self, effective: RawGesture, normalized_x: f64, now_ms: f64) {
        match effective {
            RawGesture::IndexUp | RawGesture::Ok => {
                self.scroller.stop();
                let registered = if effective == RawGesture::IndexUp {
                    self.sink.handles_index_up()
                } else {
                    self.sink.handles_ok()
                };
                if self.current != effective && registered && self.debounce_elapsed(now_ms) {
                    debug!("Trigger: {}", effective.as_str());
                    if effective == RawGesture::IndexUp {
                        self.sink.on_index_up();
                    } else {
                        self.sink.on_ok();
                    }
                    self.last_event_ms = Some(now_ms);
                }
            }
            RawGesture::Open => {
                match EdgeZone::classify(normalized_x, self.config.edge_threshold).direction() {
                    Some(direction) => {
                        if let Some(direction) = self.scroller.start(direction, now_ms) {
                            self.sink.on_edge_scroll(direction);
                        }
                    }
                    None => {
                        self.scroller.stop();
                        self.sink.on_position_update(normalized_x);
                    }
                }
            }
            RawGesture::Closed | RawGesture::None => {
                self.scroller.stop();
            }
        }

        if effective != self.current {
            self.previous = self.current;
            self.current = effective;
            // Unregistered listeners leave the debounce window untouched.
            let registered = self.sink.handles_gesture_change();
            if registered && self.debounce_elapsed(now_ms) {
                debug!(
                    "Gesture change: {} -> {}",
                    self.previous.as_str(),
                    self.current.as_str()
                );
                self.sink.on_gesture_change(self.current, self.previous);
                self.last_event_ms = Some(now_ms);
            } else if registered {
                debug!(
                    "Gesture change {} -> {} within debounce",
                    self.previous.as_str(),
                    self.current.as_str()
                );
            }
        }
    }

    fn debounce_elapsed(&self, now_ms: f64) -> bool {
        self.last_event_ms
            .map_or(true, |last| now_ms - last >= self.config.debounce_ms)
    }

    /// Fire a due edge-scroll repeat.  Returns the direction fired, if any.
    pub fn tick(&mut self, now_ms: f64) -> Option<ScrollDirection> {
        if self.disposed {
            return None;
        }
        let direction = self.scroller.poll(now_ms)?;
        self.sink.on_edge_scroll(direction);
        Some(direction)
    }

    /// When the host should next call [`tick`](Self::tick).
    pub fn next_deadline(&self) -> Option<f64> {
        if self.disposed {
            return None;
        }
        self.scroller.next_deadline()
    }

    /// Cancel the edge-scroll timer and stop reacting to input.  Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scroller.stop();
        self.disposed = true;
        info!(frames = self.frames_processed, "Gesture engine disposed");
    }

    // ── Accessors ──────────────────────────────────────────

    pub fn current_gesture(&self) -> RawGesture {
        self.current
    }

    pub fn previous_gesture(&self) -> RawGesture {
        self.previous
    }

    /// Palm center of the last processed frame, `(0.5, 0.5)` before any.
    pub fn hand_position(&self) -> (f64, f64) {
        self.hand_position
    }

    pub fn edge_scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroller.direction()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn history(&self) -> &GestureHistory {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Change tunables at runtime.
    ///
    /// A new repeat period applies from the next started timer.  Changing
    /// the window size or vote threshold clears the history.
    pub fn update_config(&mut self, f: impl FnOnce(&mut EngineConfig)) {
        f(&mut self.config);
        self.scroller.interval_ms = self.config.edge_scroll_interval_ms;
        if self.history.capacity() != self.config.history_size
            || self.history.stable_min() != self.config.stable_min
        {
            self.history = GestureHistory::new(self.config.history_size, self.config.stable_min);
        }
        if !self.config.debug {
            self.last_debug = None;
        }
    }

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.update_config(|c| c.debug = enabled);
    }

    pub fn debug_info(&self) -> DebugInfo {
        if !self.config.debug {
            warn!("Debug mode is off; debug info has no frame detail");
        }
        DebugInfo {
            frame: self.last_debug.clone(),
            current: self.current,
            previous: self.previous,
            history: self.history.to_vec(),
        }
    }

    // ── S-expression reports ───────────────────────────────

    pub fn status_sexp(&self) -> String {
        let edge = self
            .scroller
            .direction()
            .map(|d| format!(":{}", d.as_str()))
            .unwrap_or_else(|| "nil".to_string());
        let mut s = format!(
            "(:gesture :{} :previous :{} :hand-x {:.3} :hand-y {:.3} :edge-scroll {} :history-len {} :frames {} :disposed {}",
            self.current.as_str(),
            self.previous.as_str(),
            self.hand_position.0,
            self.hand_position.1,
            edge,
            self.history.len(),
            self.frames_processed,
            if self.disposed { "t" } else { "nil" },
        );
        if let Some(timer) = self.scroller.timer() {
            s.push_str(&format!(
                " :edge-scroll-since {:.0} :edge-scroll-repeats {}",
                timer.started_ms, timer.repeats
            ));
        }
        if let Some(frame) = &self.last_debug {
            s.push_str(&format!(
                " :raw :{} :confidence {:.2}",
                frame.raw.as_str(),
                frame.confidence
            ));
        }
        s.push(')');
        s
    }

    pub fn config_sexp(&self) -> String {
        format!(
            "(:history-size {} :stable-min {} :debounce-ms {:.0} :edge-threshold {:.2} :edge-scroll-interval-ms {:.0} :debug {})",
            self.config.history_size,
            self.config.stable_min,
            self.config.debounce_ms,
            self.config.edge_threshold,
            self.config.edge_scroll_interval_ms,
            if self.config.debug { "t" } else { "nil" },
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
