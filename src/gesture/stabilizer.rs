//! Majority-vote smoothing over recent raw classifications.

use std::collections::VecDeque;

use super::classifier::RawGesture;

/// Default number of frames in the voting window.
pub const DEFAULT_HISTORY_SIZE: usize = 6;
/// Default minimum votes for a label to count as stable.
pub const DEFAULT_STABLE_MIN: usize = 4;

/// Bounded window of the most recent raw labels.
#[derive(Debug, Clone)]
pub struct GestureHistory {
    entries: VecDeque<RawGesture>,
    capacity: usize,
    stable_min: usize,
}

impl Default for GestureHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE, DEFAULT_STABLE_MIN)
    }
}

impl GestureHistory {
    pub fn new(capacity: usize, stable_min: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            stable_min,
        }
    }

    /// Record this frame's raw label and return the effective label.
    ///
    /// The effective label is the window majority when it has at least
    /// `stable_min` votes, and the raw label itself otherwise.  There is no
    /// hold-last-stable behavior.
    pub fn push(&mut self, raw: RawGesture) -> RawGesture {
        self.entries.push_back(raw);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.stable().unwrap_or(raw)
    }

    /// Majority label of the current window, if it reaches `stable_min` votes.
    pub fn stable(&self) -> Option<RawGesture> {
        // Ties keep the label that appeared first in the window.
        let mut tally: Vec<(RawGesture, usize)> = Vec::with_capacity(5);
        for g in &self.entries {
            match tally.iter_mut().find(|(label, _)| label == g) {
                Some((_, count)) => *count += 1,
                None => tally.push((*g, 1)),
            }
        }

        let mut top: Option<(RawGesture, usize)> = None;
        for (label, count) in tally {
            if top.map_or(true, |(_, best)| count > best) {
                top = Some((label, count));
            }
        }

        match top {
            Some((label, count)) if count >= self.stable_min => Some(label),
            _ => None,
        }
    }

    /// Fraction of the window holding `gesture` (0.0 when empty).
    pub fn confidence(&self, gesture: RawGesture) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let count = self.entries.iter().filter(|g| **g == gesture).count();
        count as f64 / self.entries.len() as f64
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stable_min(&self) -> usize {
        self.stable_min
    }

    /// Oldest-first copy of the window.
    pub fn to_vec(&self) -> Vec<RawGesture> {
        self.entries.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ── Tests ──────────────────────────────────────────────────
