//! # hand_gesture
//!
//! Turns one hand's 21 normalized landmark points into two scalar signals:
//!
//! * **finger count**: how many of the four non-thumb fingers are raised
//!   (0–4), from a tip-above-mid-joint check;
//! * **grip strength**: a continuous 0.0 (open hand) … 1.0 (closed fist)
//!   estimate, normalized by palm size so it does not depend on how far the
//!   hand is from the camera.
//!
//! Landmarks follow the usual 21-point hand topology in camera space, where
//! `x` grows to the right and `y` grows **downward**:
//!
//! | Index | Point | Index | Point |
//! |---|---|---|---|
//! | 0 | wrist | 5 / 9 / 13 / 17 | index / middle / ring / pinky base knuckle (MCP) |
//! | 1–4 | thumb CMC → tip | 6 / 10 / 14 / 18 | mid-joints (PIP) |
//! | | | 8 / 12 / 16 / 20 | fingertips |
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::{quantify, synthetic::HandPose};
//!
//! let hand = HandPose::with_extended(2).landmarks();
//! let sample = quantify(Some(&hand));
//! assert_eq!(sample.finger_count, 2);
//! ```

use std::ops::Index;

pub mod synthetic;

// ════════════════════════════════════════════════════════════════════════════
// Topology
// ════════════════════════════════════════════════════════════════════════════

/// Number of points in one hand's landmark set.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// The four non-thumb fingers, in landmark order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// Base knuckle (MCP) landmark index.
    pub fn mcp(self) -> usize {
        match self {
            Finger::Index  => INDEX_MCP,
            Finger::Middle => MIDDLE_MCP,
            Finger::Ring   => RING_MCP,
            Finger::Pinky  => PINKY_MCP,
        }
    }

    /// Mid-joint (PIP) landmark index.
    pub fn pip(self) -> usize { self.mcp() + 1 }

    /// Distal joint (DIP) landmark index.
    pub fn dip(self) -> usize { self.mcp() + 2 }

    /// Fingertip landmark index.
    pub fn tip(self) -> usize { self.mcp() + 3 }

    pub fn name(self) -> &'static str {
        match self {
            Finger::Index  => "index",
            Finger::Middle => "middle",
            Finger::Ring   => "ring",
            Finger::Pinky  => "pinky",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark / HandLandmarks
// ════════════════════════════════════════════════════════════════════════════

/// One tracked keypoint in normalized camera space.
///
/// `z` is relative depth and is `0.0` when the detector does not report it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// A landmark with no depth information.
    pub const fn planar(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }
}

/// Conversion failure at the boundary to the external detector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LandmarkError {
    #[error("expected {expected} hand landmarks, found {found}")]
    WrongCount { expected: usize, found: usize },
}

/// A complete 21-point landmark set for one hand, fixed for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        HandLandmarks { points }
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }

    pub fn wrist(&self) -> Landmark { self.points[WRIST] }

    /// Copy of this hand with every point's offset from the wrist multiplied
    /// by `k` (the wrist itself stays put).
    pub fn scaled_about_wrist(&self, k: f32) -> Self {
        let w = self.wrist();
        let mut points = self.points;
        for p in points.iter_mut() {
            p.x = w.x + (p.x - w.x) * k;
            p.y = w.y + (p.y - w.y) * k;
            p.z = w.z + (p.z - w.z) * k;
        }
        HandLandmarks { points }
    }
}

impl Index<usize> for HandLandmarks {
    type Output = Landmark;
    fn index(&self, i: usize) -> &Landmark { &self.points[i] }
}

impl TryFrom<&[Landmark]> for HandLandmarks {
    type Error = LandmarkError;

    fn try_from(slice: &[Landmark]) -> Result<Self, Self::Error> {
        let points: [Landmark; LANDMARK_COUNT] = slice.try_into()
            .map_err(|_| LandmarkError::WrongCount {
                expected: LANDMARK_COUNT,
                found:    slice.len(),
            })?;
        Ok(HandLandmarks { points })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Geometry
// ════════════════════════════════════════════════════════════════════════════

/// Euclidean distance in the image plane (x, y); depth is ignored.
pub fn distance(a: Landmark, b: Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Euclidean distance including depth.
pub fn distance_3d(a: Landmark, b: Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Planar distance between the wrists of the first two hands, or `0.0` when
/// fewer than two hands were detected.
pub fn hand_distance(hands: &[HandLandmarks]) -> f32 {
    match hands {
        [first, second, ..] => distance(first.wrist(), second.wrist()),
        _ => 0.0,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Quantifier
// ════════════════════════════════════════════════════════════════════════════

/// Slope of the ratio → curl mapping. Together with the implicit inflection
/// at ratio 0.5 this is an empirical calibration, not a geometric constant.
pub const CURL_SLOPE: f32 = 2.0;

/// Status line reported when the detector found no hand.
pub const NO_HAND_STATUS: &str = "No hands detected";

/// Per-frame output of the quantifier.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureSample {
    /// Extended non-thumb fingers, 0–4.
    pub finger_count:  u8,
    /// 0.0 (open) … 1.0 (fist).
    pub grip_strength: f32,
    pub status_text:   String,
}

impl GestureSample {
    pub fn no_hand() -> Self {
        GestureSample {
            finger_count:  0,
            grip_strength: 0.0,
            status_text:   NO_HAND_STATUS.to_string(),
        }
    }

    pub fn is_hand(&self) -> bool { self.status_text != NO_HAND_STATUS }
}

/// A finger counts as extended when its tip is above (smaller `y` than) its
/// mid-joint. Only meaningful for an upright, camera-facing hand; rotated
/// hands are misclassified.
pub fn is_extended(hand: &HandLandmarks, finger: Finger) -> bool {
    hand[finger.tip()].y < hand[finger.pip()].y
}

/// Number of extended non-thumb fingers (0–4).
pub fn count_fingers(hand: &HandLandmarks) -> u8 {
    Finger::ALL.iter().filter(|&&f| is_extended(hand, f)).count() as u8
}

/// Wrist → middle-finger base knuckle distance, the scale normalizer.
pub fn palm_size(hand: &HandLandmarks) -> f32 {
    distance(hand[WRIST], hand[MIDDLE_MCP])
}

/// Curl of one finger in `[0, 1]` given the hand's palm size.
///
/// `ratio = |tip − mcp| / palm`, `curl = clamp((1 − ratio) · 2)`.
pub fn finger_curl(hand: &HandLandmarks, finger: Finger, palm: f32) -> f32 {
    let ratio = distance(hand[finger.tip()], hand[finger.mcp()]) / palm;
    let curl  = (1.0 - ratio) * CURL_SLOPE;
    // 0/0 for a fully degenerate hand
    if curl.is_nan() { return 0.0; }
    curl.clamp(0.0, 1.0)
}

/// Mean curl of the four non-thumb fingers.
pub fn grip_strength(hand: &HandLandmarks) -> f32 {
    let palm  = palm_size(hand);
    let total: f32 = Finger::ALL.iter().map(|&f| finger_curl(hand, f, palm)).sum();
    total / Finger::ALL.len() as f32
}

/// Quantify one frame. `None` means the detector reported no hand.
pub fn quantify(hand: Option<&HandLandmarks>) -> GestureSample {
    let Some(hand) = hand else {
        return GestureSample::no_hand();
    };
    let finger_count  = count_fingers(hand);
    let grip_strength = grip_strength(hand);
    GestureSample {
        finger_count,
        grip_strength,
        status_text: format!("Hand! Fingers: {}, Grip: {:.2}", finger_count, grip_strength),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::HandPose;
    use proptest::prelude::*;

    #[test]
    fn distance_is_planar() {
        let a = Landmark::new(0.0, 0.0, 5.0);
        let b = Landmark::new(3.0, 4.0, -5.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-6);
        assert!((distance_3d(a, b) - 125f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn finger_indices_follow_topology() {
        assert_eq!(Finger::Index.tip(),  INDEX_TIP);
        assert_eq!(Finger::Middle.pip(), MIDDLE_PIP);
        assert_eq!(Finger::Ring.dip(),   RING_DIP);
        assert_eq!(Finger::Pinky.mcp(),  PINKY_MCP);
    }

    #[test]
    fn wrong_point_count_rejected() {
        let pts = vec![Landmark::default(); 20];
        let err = HandLandmarks::try_from(pts.as_slice()).unwrap_err();
        assert_eq!(err, LandmarkError::WrongCount { expected: 21, found: 20 });
    }

    #[test]
    fn no_hand_sample() {
        let s = quantify(None);
        assert_eq!(s.finger_count, 0);
        assert_eq!(s.grip_strength, 0.0);
        assert_eq!(s.status_text, "No hands detected");
        assert!(!s.is_hand());
    }

    #[test]
    fn all_tips_above_mid_joints_counts_four() {
        let hand = HandPose::open().landmarks();
        assert_eq!(count_fingers(&hand), 4);
    }

    #[test]
    fn counts_each_extended_prefix() {
        for n in 0..=4u8 {
            let hand = HandPose::with_extended(n).landmarks();
            assert_eq!(count_fingers(&hand), n, "pose with {} raised", n);
        }
    }

    #[test]
    fn open_hand_has_low_grip() {
        let g = grip_strength(&HandPose::open().landmarks());
        assert!(g < 0.2, "open grip {}", g);
    }

    #[test]
    fn fist_has_full_grip() {
        let s = quantify(Some(&HandPose::fist().landmarks()));
        assert!(s.grip_strength > 0.9, "fist grip {}", s.grip_strength);
        assert_eq!(s.finger_count, 0);
    }

    #[test]
    fn status_text_reports_values() {
        let s = quantify(Some(&HandPose::with_extended(3).landmarks()));
        assert!(s.status_text.starts_with("Hand! Fingers: 3, Grip: "));
        assert!(s.is_hand());
    }

    #[test]
    fn degenerate_hand_stays_in_range() {
        let hand = HandLandmarks::new([Landmark::planar(0.5, 0.5); LANDMARK_COUNT]);
        let g = grip_strength(&hand);
        assert!((0.0..=1.0).contains(&g));
    }

    #[test]
    fn hand_distance_needs_two_hands() {
        let a = HandPose::open().landmarks();
        assert_eq!(hand_distance(&[]), 0.0);
        assert_eq!(hand_distance(&[a.clone()]), 0.0);
        let b = HandPose::open().at(0.8, 0.8).landmarks();
        assert!(hand_distance(&[a, b]) > 0.0);
    }

    fn arb_hand() -> impl Strategy<Value = HandLandmarks> {
        prop::collection::vec((0.0f32..1.0, 0.0f32..1.0, -0.2f32..0.2), LANDMARK_COUNT)
            .prop_map(|v| {
                let pts: Vec<Landmark> = v.into_iter()
                    .map(|(x, y, z)| Landmark::new(x, y, z))
                    .collect();
                HandLandmarks::try_from(pts.as_slice()).unwrap()
            })
    }

    proptest! {
        #[test]
        fn grip_always_clamped(hand in arb_hand()) {
            let g = grip_strength(&hand);
            prop_assert!((0.0..=1.0).contains(&g), "grip {}", g);
        }

        #[test]
        fn grip_scale_invariant(hand in arb_hand(), k in 0.1f32..10.0) {
            prop_assume!(palm_size(&hand) > 0.05);
            let g0 = grip_strength(&hand);
            let g1 = grip_strength(&hand.scaled_about_wrist(k));
            prop_assert!((g0 - g1).abs() < 1e-3, "{} vs {}", g0, g1);
        }

        #[test]
        fn finger_count_bounded(hand in arb_hand()) {
            prop_assert!(count_fingers(&hand) <= 4);
        }
    }
}
