//! Synthetic hand poses shared by the gesture tests.
//!
//! Right hand facing the camera, wrist near the bottom of the image,
//! palm scale ≈ 0.196.

use super::landmarks::{FrameSample, Landmark, LANDMARK_COUNT};

const WRIST: Landmark = Landmark::new(0.50, 0.80, 0.0);

fn lm(x: f64, y: f64, z: f64) -> Landmark {
    Landmark::new(x, y, z)
}

fn hand(
    thumb: [Landmark; 4],
    index: [Landmark; 4],
    middle: [Landmark; 4],
    ring: [Landmark; 4],
    pinky: [Landmark; 4],
) -> FrameSample {
    let mut lms = [Landmark::default(); LANDMARK_COUNT];
    lms[0] = WRIST;
    for (f, chain) in [thumb, index, middle, ring, pinky].iter().enumerate() {
        lms[1 + f * 4..5 + f * 4].copy_from_slice(chain);
    }
    FrameSample::new(lms)
}

fn thumb_out() -> [Landmark; 4] {
    [lm(0.42, 0.76, 0.0), lm(0.36, 0.71, 0.0), lm(0.32, 0.66, 0.0), lm(0.29, 0.61, 0.0)]
}

fn thumb_tucked() -> [Landmark; 4] {
    [lm(0.44, 0.76, 0.0), lm(0.40, 0.70, -0.02), lm(0.43, 0.66, -0.05), lm(0.47, 0.66, -0.06)]
}

fn index_straight() -> [Landmark; 4] {
    [lm(0.44, 0.60, 0.0), lm(0.43, 0.50, 0.0), lm(0.425, 0.45, 0.0), lm(0.42, 0.40, 0.0)]
}

fn middle_straight() -> [Landmark; 4] {
    [lm(0.50, 0.58, 0.0), lm(0.50, 0.47, 0.0), lm(0.50, 0.42, 0.0), lm(0.50, 0.36, 0.0)]
}

fn ring_straight() -> [Landmark; 4] {
    [lm(0.56, 0.60, 0.0), lm(0.57, 0.50, 0.0), lm(0.575, 0.45, 0.0), lm(0.58, 0.40, 0.0)]
}

fn pinky_straight() -> [Landmark; 4] {
    [lm(0.61, 0.63, 0.0), lm(0.63, 0.55, 0.0), lm(0.64, 0.51, 0.0), lm(0.65, 0.47, 0.0)]
}

/// Finger folded over: pip pushed forward, tip tucked back toward the palm.
fn curled(mcp_x: f64, mcp_y: f64) -> [Landmark; 4] {
    [
        lm(mcp_x, mcp_y, 0.0),
        lm(mcp_x, mcp_y - 0.05, -0.04),
        lm(mcp_x, mcp_y - 0.01, -0.07),
        lm(mcp_x, mcp_y + 0.03, -0.05),
    ]
}

/// All five fingers extended upward.
pub fn open_hand() -> FrameSample {
    hand(thumb_out(), index_straight(), middle_straight(), ring_straight(), pinky_straight())
}

/// Every finger curled, thumb folded across.
pub fn fist() -> FrameSample {
    hand(
        thumb_tucked(),
        curled(0.44, 0.60),
        curled(0.50, 0.58),
        curled(0.56, 0.60),
        curled(0.61, 0.63),
    )
}

/// Index finger straight up, the rest curled.
pub fn index_up() -> FrameSample {
    hand(
        thumb_tucked(),
        [lm(0.44, 0.60, 0.0), lm(0.44, 0.50, 0.0), lm(0.44, 0.45, 0.0), lm(0.44, 0.40, 0.0)],
        curled(0.50, 0.58),
        curled(0.56, 0.60),
        curled(0.61, 0.63),
    )
}

/// Thumb tip touching the bent index tip, other three fingers raised.
pub fn ok_sign() -> FrameSample {
    hand(
        [lm(0.42, 0.76, 0.0), lm(0.37, 0.70, 0.0), lm(0.36, 0.64, 0.0), lm(0.38, 0.59, 0.0)],
        [lm(0.44, 0.60, 0.0), lm(0.41, 0.53, -0.02), lm(0.39, 0.56, -0.03), lm(0.385, 0.575, -0.02)],
        middle_straight(),
        ring_straight(),
        pinky_straight(),
    )
}

/// Every landmark at the same point.
pub fn collapsed() -> FrameSample {
    FrameSample::new([lm(0.5, 0.5, 0.0); LANDMARK_COUNT])
}

/// Shift a pose horizontally so the palm center (landmark 9) sits at `palm_x`.
pub fn at_palm_x(frame: &FrameSample, palm_x: f64) -> FrameSample {
    let dx = palm_x - frame.palm_center().x;
    let mut lms = *frame.landmarks();
    for p in lms.iter_mut() {
        p.x += dx;
    }
    FrameSample::new(lms)
}
