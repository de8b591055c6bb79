//! Per-frame hand feature extraction.
//!
//! Turns one [`FrameSample`] into per-finger extension scores and the
//! hand-level aggregates the classifier rules are written against.  All
//! distance thresholds are relative to the frame's palm scale, so the
//! result does not depend on how far the hand is from the camera.

use super::landmarks::{distance3, joint_angle, Finger, FrameSample, HandLandmark};

// ── Thresholds ─────────────────────────────────────────────

/// Score at or above which a finger counts as extended.
pub const EXTENDED_SCORE: f64 = 0.5;
/// Score at or below which a finger counts as curled.
pub const CURLED_SCORE: f64 = -0.2;
/// Thumb score at or below which the thumb counts as curled.
pub const THUMB_CURLED_SCORE: f64 = -0.3;

// ── Feature types ──────────────────────────────────────────

/// Extension state of one non-thumb finger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerFeature {
    /// Additive score in [-0.7, 1.0] from joint angle, radial gap and height.
    pub extension_score: f64,
    pub extended: bool,
    pub curled: bool,
    /// Tip-to-palm-center distance over knuckle-to-palm-center distance.
    pub tip_palm_ratio: f64,
    /// Tip sits no farther from the palm center than the knuckle does.
    pub folded: bool,
}

/// Extension state of the thumb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbFeature {
    pub extension_score: f64,
    pub extended: bool,
    pub curled: bool,
}

/// Everything the classifier needs to know about one frame's hand shape.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFeatures {
    pub palm_scale: f64,
    pub thumb: ThumbFeature,
    pub index: FingerFeature,
    pub middle: FingerFeature,
    pub ring: FingerFeature,
    pub pinky: FingerFeature,
    pub extended_count: usize,
    pub curled_count: usize,
    pub folded_count: usize,
    pub open_ratio_avg: f64,
    pub open_ratio_min: f64,
    pub open_ratio_max: f64,
    pub avg_extension_score: f64,
    pub open_score: f64,
    pub closed_score: f64,
}

impl HandFeatures {
    pub fn finger(&self, finger: Finger) -> &FingerFeature {
        match finger {
            Finger::Index => &self.index,
            Finger::Middle => &self.middle,
            Finger::Ring => &self.ring,
            Finger::Pinky => &self.pinky,
        }
    }
}

// ── Extraction ─────────────────────────────────────────────

/// Compute the feature vector for one frame.  Total and deterministic.
pub fn extract_features(frame: &FrameSample) -> HandFeatures {
    let palm_scale = frame.palm_scale();

    let fingers = Finger::ALL.map(|f| finger_feature(frame, f, palm_scale));
    let thumb = thumb_feature(frame, palm_scale);

    let extended_count = fingers.iter().filter(|f| f.extended).count();
    let curled_count = fingers.iter().filter(|f| f.curled).count();
    let folded_count = fingers.iter().filter(|f| f.folded).count();

    let ratios = fingers.map(|f| f.tip_palm_ratio);
    let open_ratio_avg = ratios.iter().sum::<f64>() / ratios.len() as f64;
    let open_ratio_min = ratios.iter().copied().fold(f64::INFINITY, f64::min);
    let open_ratio_max = ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let avg_extension_score =
        fingers.iter().map(|f| f.extension_score).sum::<f64>() / fingers.len() as f64;

    let open_score = extended_count as f64
        + if thumb.extended { 0.6 } else { 0.0 }
        + avg_extension_score * 0.5;
    let closed_score = curled_count as f64
        + if thumb.curled { 0.6 } else { 0.0 }
        - avg_extension_score * 0.3;

    let [index, middle, ring, pinky] = fingers;
    HandFeatures {
        palm_scale,
        thumb,
        index,
        middle,
        ring,
        pinky,
        extended_count,
        curled_count,
        folded_count,
        open_ratio_avg,
        open_ratio_min,
        open_ratio_max,
        avg_extension_score,
        open_score,
        closed_score,
    }
}

fn finger_feature(frame: &FrameSample, finger: Finger, palm_scale: f64) -> FingerFeature {
    let [mcp, pip, dip, tip] = finger.chain().map(|l| *frame.get(l));
    let wrist = frame.get(HandLandmark::Wrist);
    let palm = frame.palm_center();

    let pip_angle = joint_angle(&mcp, &pip, &dip);
    let dip_angle = joint_angle(&pip, &dip, &tip);
    let avg_angle = (pip_angle + dip_angle) / 2.0;

    let extension_gap = distance3(&tip, wrist) - distance3(&mcp, wrist);
    let y_extension_norm = (wrist.y - tip.y) / palm_scale;

    let mut score = 0.0;
    if avg_angle > 155.0 {
        score += 0.4;
    } else if avg_angle > 140.0 {
        score += 0.2;
    } else if avg_angle < 110.0 {
        score -= 0.3;
    }

    if extension_gap > palm_scale * 0.08 {
        score += 0.3;
    } else if extension_gap < palm_scale * 0.02 {
        score -= 0.2;
    }

    if y_extension_norm > 0.15 {
        score += 0.3;
    } else if y_extension_norm < 0.05 {
        score -= 0.2;
    }

    // The middle knuckle is the palm center itself, so its ratio is huge.
    let tip_palm = distance3(&tip, palm);
    let mcp_palm = distance3(&mcp, palm);

    FingerFeature {
        extension_score: score,
        extended: score >= EXTENDED_SCORE,
        curled: score <= CURLED_SCORE,
        tip_palm_ratio: tip_palm / mcp_palm.max(1e-6),
        folded: tip_palm < mcp_palm + palm_scale * 0.01,
    }
}

fn thumb_feature(frame: &FrameSample, palm_scale: f64) -> ThumbFeature {
    let wrist = frame.get(HandLandmark::Wrist);
    let mcp = frame.get(HandLandmark::ThumbMcp);
    let ip = frame.get(HandLandmark::ThumbIp);
    let tip = frame.get(HandLandmark::ThumbTip);

    let angle = joint_angle(mcp, ip, tip);
    let gap = distance3(tip, wrist) - distance3(mcp, wrist);

    let angle_part = if angle > 150.0 {
        0.5
    } else if angle < 120.0 {
        -0.3
    } else {
        0.0
    };
    let gap_part = if gap > palm_scale * 0.05 {
        0.5
    } else if gap < palm_scale * 0.015 {
        -0.3
    } else {
        0.0
    };
    let score = angle_part + gap_part;

    ThumbFeature {
        extension_score: score,
        extended: score >= EXTENDED_SCORE,
        curled: score <= THUMB_CURLED_SCORE,
    }
}

// ── Tests ──────────────────────────────────────────────────
