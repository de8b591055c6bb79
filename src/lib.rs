//! Arcana gesture engine.
//!
//! Converts a per-frame stream of 21 hand landmarks into debounced
//! interaction events: gesture changes, index-up and ok triggers, palm
//! position updates and edge-scroll repeats.  The `replay` module drives an
//! engine from a recorded s-expression landmark stream.

pub mod gesture;
pub mod replay;

pub use gesture::{EngineConfig, FrameSample, GestureEngine, InteractionEvent, InteractionSink};
