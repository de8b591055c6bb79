//! Gesture subsystem: hand landmarks in, interaction events out.
//!
//! Provides:
//! - `landmarks`: the 21-point hand model and geometry helpers
//! - `features`: per-finger extension scores and hand aggregates
//! - `classifier`: rule-based per-frame labels
//! - `stabilizer`: majority vote over recent labels
//! - `edge_scroll`: edge bands and the repeat timer
//! - `engine`: per-frame dispatch with debounce
//! - `sink`: where events are delivered

pub mod classifier;
pub mod edge_scroll;
pub mod engine;
pub mod features;
pub mod landmarks;
pub mod sink;
pub mod stabilizer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use classifier::{classify, RawGesture};
pub use edge_scroll::{EdgeZone, ScrollDirection};
pub use engine::{DebugFrame, DebugInfo, EngineConfig, GestureEngine};
pub use features::{extract_features, HandFeatures};
pub use landmarks::{Finger, FrameSample, HandLandmark, Landmark, LANDMARK_COUNT};
pub use sink::{Callbacks, InteractionEvent, InteractionSink};
pub use stabilizer::GestureHistory;
