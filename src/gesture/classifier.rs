//! Rule-based static gesture classification.
//!
//! Each frame is classified independently.  Rules are evaluated in priority
//! order (ok, index-up, open/closed) because one hand shape can satisfy
//! several of them at once; the first match wins.

use super::features::HandFeatures;
use super::landmarks::{distance3, joint_angle, normalize, FrameSample, HandLandmark};

// ── Gesture types ──────────────────────────────────────────

/// Per-frame gesture label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RawGesture {
    /// Nothing recognized.
    #[default]
    None,
    /// Fingers spread, palm toward the camera.
    Open,
    /// Fist.
    Closed,
    /// Index finger raised alone.
    IndexUp,
    /// Thumb and index tips pinched into a ring.
    Ok,
}

impl RawGesture {
    /// String representation for event output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::IndexUp => "index-up",
            Self::Ok => "ok",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "index-up" => Some(Self::IndexUp),
            "ok" => Some(Self::Ok),
            _ => None,
        }
    }
}

// ── Classification ─────────────────────────────────────────

/// Classify one frame.  Pure: no state is read or written.
pub fn classify(features: &HandFeatures, frame: &FrameSample) -> RawGesture {
    if is_ok(features, frame) {
        return RawGesture::Ok;
    }
    if is_index_up(features, frame) {
        return RawGesture::IndexUp;
    }

    match (is_open(features), is_closed(features)) {
        (true, false) => RawGesture::Open,
        (false, true) => RawGesture::Closed,
        (true, true) if features.open_score >= features.closed_score => RawGesture::Open,
        (true, true) => RawGesture::Closed,
        (false, false) => RawGesture::None,
    }
}

/// Pinch score out of 6; the pinch distance itself is worth two points.
fn ok_score(features: &HandFeatures, frame: &FrameSample) -> u32 {
    let ps = features.palm_scale;
    let thumb_tip = frame.get(HandLandmark::ThumbTip);
    let index_tip = frame.get(HandLandmark::IndexTip);
    let index_mcp = frame.get(HandLandmark::IndexMcp);
    let wrist = frame.get(HandLandmark::Wrist);

    let pinch_ratio = distance3(thumb_tip, index_tip) / ps;
    let pinch = pinch_ratio > 0.02 && pinch_ratio < 0.20;

    let tips_close = (thumb_tip.x - index_tip.x).abs() < ps * 0.15
        && (thumb_tip.y - index_tip.y).abs() < ps * 0.15;

    let not_fist = distance3(index_tip, index_mcp) > ps * 0.03
        && distance3(index_tip, wrist) > distance3(index_mcp, wrist);

    let others_extended = [features.middle, features.ring, features.pinky]
        .iter()
        .filter(|f| f.extended)
        .count();
    let others_ok = others_extended >= 1 || features.curled_count <= 3;

    let highest_other_tip = frame
        .get(HandLandmark::MiddleTip)
        .y
        .min(frame.get(HandLandmark::RingTip).y)
        .min(frame.get(HandLandmark::PinkyTip).y);
    let pinch_y = (thumb_tip.y + index_tip.y) / 2.0;
    let others_level = highest_other_tip <= pinch_y + ps * 0.05;

    let mut score = 0;
    if pinch {
        score += 2;
    }
    for check in [tips_close, not_fist, others_ok, others_level] {
        if check {
            score += 1;
        }
    }
    score
}

fn is_ok(features: &HandFeatures, frame: &FrameSample) -> bool {
    ok_score(features, frame) >= 4
}

fn is_index_up(features: &HandFeatures, frame: &FrameSample) -> bool {
    if !features.index.extended || features.index.extension_score < 0.6 {
        return false;
    }
    if features.middle.extended || features.ring.extended || features.pinky.extended {
        return false;
    }
    if features.curled_count < 2 {
        return false;
    }

    let ps = features.palm_scale;
    let wrist = frame.get(HandLandmark::Wrist);
    let index_tip = frame.get(HandLandmark::IndexTip);
    let index_mcp = frame.get(HandLandmark::IndexMcp);
    let thumb_tip = frame.get(HandLandmark::ThumbTip);
    let middle_tip = frame.get(HandLandmark::MiddleTip);

    // Image y grows downward, so "up" is negative y.
    let direction = normalize(index_tip.sub(index_mcp), [0.0, -1.0, 0.0]);
    let vertical = -direction[1] > 0.65;

    let above_middle = index_tip.y < middle_tip.y - ps * 0.08;
    let above_thumb = !features.thumb.extended || index_tip.y < thumb_tip.y - ps * 0.03;
    let above_mcp = index_tip.y < index_mcp.y - ps * 0.06;
    let above_wrist = index_tip.y < wrist.y - ps * 0.10;

    let straight = joint_angle(
        index_mcp,
        frame.get(HandLandmark::IndexPip),
        frame.get(HandLandmark::IndexDip),
    ) > 160.0;
    let long_enough = distance3(index_tip, index_mcp) > ps * 0.45 * 0.7;

    vertical && above_middle && above_thumb && above_mcp && above_wrist && straight && long_enough
}

fn is_open(f: &HandFeatures) -> bool {
    let mut score = 0;
    if f.extended_count >= 4 {
        score += 2;
    } else if f.extended_count >= 3 {
        score += 1;
    }
    if f.index.extended && f.middle.extended {
        score += 1;
    }
    if f.avg_extension_score > 0.2 {
        score += 1;
    }
    if f.open_ratio_avg > 1.15 {
        score += 1;
    }
    if f.curled_count <= 2 {
        score += 1;
    }
    score >= 4
}

fn is_closed(f: &HandFeatures) -> bool {
    let conditions = [
        f.extended_count <= 1,
        f.curled_count >= 2 || f.folded_count >= 3,
        f.open_ratio_avg < 1.08,
        f.avg_extension_score < 0.1,
        !f.index.extended || !f.middle.extended,
    ];
    conditions.iter().filter(|c| **c).count() >= 3
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::features::extract_features;
    use crate::gesture::fixtures;

    fn run(frame: &FrameSample) -> RawGesture {
        classify(&extract_features(frame), frame)
    }

    #[test]
    fn test_open_hand() {
        assert_eq!(run(&fixtures::open_hand()), RawGesture::Open);
    }

    #[test]
    fn test_fist() {
        assert_eq!(run(&fixtures::fist()), RawGesture::Closed);
    }

    #[test]
    fn test_index_up() {
        assert_eq!(run(&fixtures::index_up()), RawGesture::IndexUp);
    }

    #[test]
    fn test_ok_sign() {
        let frame = fixtures::ok_sign();
        let features = extract_features(&frame);
        assert_eq!(ok_score(&features, &frame), 6);
        assert_eq!(classify(&features, &frame), RawGesture::Ok);
    }

    #[test]
    fn test_ok_takes_priority_over_open() {
        // Three raised fingers alone would score as open.
        let features = extract_features(&fixtures::ok_sign());
        assert!(is_open(&features));
        assert_eq!(run(&fixtures::ok_sign()), RawGesture::Ok);
    }

    #[test]
    fn test_index_up_rejected_when_pointing_down() {
        // Mirror the pose vertically: finger points toward the bottom of the image.
        let base = fixtures::index_up();
        let mut lms = *base.landmarks();
        for p in lms.iter_mut() {
            p.y = 1.0 - p.y;
        }
        let frame = FrameSample::new(lms);
        let features = extract_features(&frame);
        assert!(!is_index_up(&features, &frame));
    }

    #[test]
    fn test_deterministic() {
        let frame = fixtures::ok_sign();
        let first = run(&frame);
        for _ in 0..10 {
            assert_eq!(run(&frame), first);
        }
        assert_eq!(run(&fixtures::fist()), RawGesture::Closed);
        assert_eq!(run(&frame), first);
    }

    #[test]
    fn test_collapsed_hand_does_not_panic() {
        assert_eq!(run(&fixtures::collapsed()), RawGesture::Closed);
    }

    #[test]
    fn test_translation_invariant() {
        for x in [0.1, 0.5, 0.9] {
            let frame = fixtures::at_palm_x(&fixtures::open_hand(), x);
            assert_eq!(run(&frame), RawGesture::Open, "palm x {}", x);
        }
    }

    #[test]
    fn test_gesture_as_str_roundtrip() {
        for g in [
            RawGesture::None,
            RawGesture::Open,
            RawGesture::Closed,
            RawGesture::IndexUp,
            RawGesture::Ok,
        ] {
            assert_eq!(RawGesture::parse(g.as_str()), Some(g));
        }
        assert_eq!(RawGesture::IndexUp.as_str(), "index-up");
        assert_eq!(RawGesture::parse("thumbsup"), None);
    }
}
