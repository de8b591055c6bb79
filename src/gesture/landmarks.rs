//! Hand landmark data structures and geometry helpers.
//!
//! Models the 21-point hand layout produced by single-camera hand pose
//! estimators.  Coordinates are normalized image space: x and y roughly in
//! [0, 1] with y growing downward, z relative depth.

use anyhow::ensure;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks in anatomical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }
}

/// The four non-thumb fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }

    /// Joint chain from knuckle to tip: `[mcp, pip, dip, tip]`.
    pub fn chain(&self) -> [HandLandmark; 4] {
        use HandLandmark::*;
        match self {
            Self::Index => [IndexMcp, IndexPip, IndexDip, IndexTip],
            Self::Middle => [MiddleMcp, MiddlePip, MiddleDip, MiddleTip],
            Self::Ring => [RingMcp, RingPip, RingDip, RingTip],
            Self::Pinky => [PinkyMcp, PinkyPip, PinkyDip, PinkyTip],
        }
    }
}

// ── Landmark point ─────────────────────────────────────────

/// One tracked joint position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Vector from `origin` to `self`.
    pub fn sub(&self, origin: &Landmark) -> [f64; 3] {
        [self.x - origin.x, self.y - origin.y, self.z - origin.z]
    }
}

// ── Frame sample ───────────────────────────────────────────

/// All 21 landmarks of one detected hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSample {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl FrameSample {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build a sample from an estimator's landmark list.
    ///
    /// Fails unless exactly 21 landmarks are supplied.
    pub fn from_slice(landmarks: &[Landmark]) -> anyhow::Result<Self> {
        ensure!(
            landmarks.len() == LANDMARK_COUNT,
            "expected {} landmarks, got {}",
            LANDMARK_COUNT,
            landmarks.len()
        );
        let mut out = [Landmark::default(); LANDMARK_COUNT];
        out.copy_from_slice(landmarks);
        Ok(Self { landmarks: out })
    }

    pub fn get(&self, landmark: HandLandmark) -> &Landmark {
        &self.landmarks[landmark.index()]
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    /// Palm center used for pointing (middle-finger knuckle).
    pub fn palm_center(&self) -> &Landmark {
        self.get(HandLandmark::MiddleMcp)
    }

    /// Per-frame normalization scalar from palm width and height.
    ///
    /// Uses 2D distances and never drops below 0.08, so tiny or collapsed
    /// hands do not blow up the relative thresholds.
    pub fn palm_scale(&self) -> f64 {
        let width = distance2(self.get(HandLandmark::IndexMcp), self.get(HandLandmark::PinkyMcp));
        let height = distance2(self.get(HandLandmark::Wrist), self.get(HandLandmark::MiddleMcp));
        ((width + height) / 2.0).max(MIN_PALM_SCALE)
    }
}

/// Lower bound for [`FrameSample::palm_scale`].
pub const MIN_PALM_SCALE: f64 = 0.08;

// ── Geometry ───────────────────────────────────────────────

const EPSILON: f64 = 1e-6;

fn magnitude(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Euclidean distance in 3D.
pub fn distance3(a: &Landmark, b: &Landmark) -> f64 {
    magnitude(&a.sub(b))
}

/// Euclidean distance in the image plane.
pub fn distance2(a: &Landmark, b: &Landmark) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Angle at `b` (degrees) between the bones `b→a` and `b→c`.
///
/// A zero-length bone yields 180°.
pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    let v1 = a.sub(b);
    let v2 = c.sub(b);
    let mag1 = magnitude(&v1);
    let mag2 = magnitude(&v2);
    if mag1 < EPSILON || mag2 < EPSILON {
        return 180.0;
    }
    let cos = (dot(&v1, &v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Unit vector of `v`, or `fallback` when `v` is (nearly) zero.
pub fn normalize(v: [f64; 3], fallback: [f64; 3]) -> [f64; 3] {
    let mag = magnitude(&v);
    if mag < EPSILON {
        return fallback;
    }
    [v[0] / mag, v[1] / mag, v[2] / mag]
}

// ── Tests ──────────────────────────────────────────────────
